//! Two-stage reconstruction
//!
//! **Stage order matters**: `projection` turns a random spectrum estimate
//! into something consistent with the measured amplitudes window by window;
//! `gradient` then polishes the same estimate against the global
//! amplitude-squared loss. Both mutate one `Grid` in place and run a fixed
//! caller-chosen number of steps with no convergence test.
//!
//! The projection stage is strictly sequential within an outer loop (each
//! window reads the state its predecessors just wrote). The gradient stage
//! snapshots the estimate per iteration and fans the per-window work out
//! across rayon workers.

pub mod gradient;
pub mod projection;

pub use gradient::{amplitude_loss, refine};
pub use projection::project;
