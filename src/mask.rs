//! Per-window phase mask
//!
//! The solvers treat a mask as an opaque L×L complex multiplier applied to
//! every extracted window. The projection stage divides by it, so a mask with
//! a zero-modulus entry is refused at construction.

use rand::Rng;
use rustfft::num_complex::Complex;
use snafu::prelude::*;

use crate::grid::Grid;

#[derive(Debug, Snafu)]
pub enum MaskError {
    #[snafu(display("mask entry ({row}, {col}) has zero modulus"))]
    ZeroEntry { row: usize, col: usize },

    #[snafu(display("mask side {side} does not match window size {l}"))]
    SideMismatch { side: usize, l: usize },
}

/// Invertible complex multiplier applied per window.
#[derive(Debug, Clone)]
pub struct PhaseMask {
    values: Grid,
}

impl PhaseMask {
    /// Wrap externally supplied mask values, refusing any zero entry.
    pub fn from_values(values: Grid) -> Result<Self, MaskError> {
        let side = values.side();
        for r in 0..side {
            for c in 0..side {
                if values.at(r, c).norm() == 0.0 {
                    return ZeroEntrySnafu { row: r, col: c }.fail();
                }
            }
        }
        Ok(Self { values })
    }

    /// Uniform random unit-modulus phase mask.
    pub fn random_phase<R: Rng + ?Sized>(side: usize, rng: &mut R) -> Self {
        let values = Grid::from_fn(side, |_, _| {
            let phase = 2.0 * std::f64::consts::PI * rng.random::<f64>();
            Complex::new(phase.cos(), phase.sin())
        });
        Self { values }
    }

    pub fn side(&self) -> usize {
        self.values.side()
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> Complex<f64> {
        self.values.at(row, col)
    }
}
