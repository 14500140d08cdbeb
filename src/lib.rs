//! Fourier ptychographic phase retrieval
//!
//! Reconstructs a complex-valued 2D signal from intensity-only sub-aperture
//! measurements of its Fourier spectrum. Measurements lose all phase and may
//! carry Poisson photon noise; the recovered signal matches the original up
//! to an unrecoverable global phase.
//!
//! Pipeline: `synthesize` builds the fixed measurement set from a ground
//! truth, `solver::projection` turns a random spectrum estimate into one
//! consistent with the measured amplitudes, `solver::gradient` polishes it
//! against the global amplitude-squared loss, and `metric` scores the result
//! phase-invariantly. `reconstruct::run_trial` wires the whole thing up.

pub mod config;
pub mod fft;
pub mod forward;
pub mod geometry;
pub mod grid;
pub mod mask;
pub mod metric;
pub mod reconstruct;
pub mod solver;
pub mod synthesize;
pub mod tracing_init;

pub use config::{ConfigError, TrialConfig};
pub use grid::Grid;
pub use metric::phase_invariant_mse;
pub use reconstruct::{run_trial, run_trials, TrialOutcome};
