//! 2D FFT engine over rustfft
//!
//! Wraps rustfft's 1D plans into row/column 2D transforms on a `Grid`.
//! Convention: `forward` is unnormalized, `inverse` carries the full
//! 1/(n*n) factor, so `forward(inverse(x)) == x`. `fftshift` is the even-size
//! quadrant swap that centers the zero frequency; for even sides the shift is
//! its own inverse, and all configured sizes here are even.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::grid::Grid;

/// Cached forward/inverse plans for one transform size.
///
/// Plans are `Arc<dyn Fft>` and shareable across rayon workers.
pub struct Fft2 {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl Fft2 {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        Self {
            size,
            forward,
            inverse,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Unnormalized forward 2D transform, in place.
    pub fn forward(&self, grid: &mut Grid) {
        assert_eq!(grid.side(), self.size, "grid side does not match plan size");
        self.process_2d(grid, &self.forward);
    }

    /// Inverse 2D transform, in place, normalized by 1/(n*n).
    pub fn inverse(&self, grid: &mut Grid) {
        assert_eq!(grid.side(), self.size, "grid side does not match plan size");
        self.process_2d(grid, &self.inverse);
        grid.scale(1.0 / (self.size * self.size) as f64);
    }

    fn process_2d(&self, grid: &mut Grid, plan: &Arc<dyn Fft<f64>>) {
        let n = self.size;

        // Rows are contiguous.
        for row in grid.data_mut().chunks_exact_mut(n) {
            plan.process(row);
        }

        // Columns via gather/scatter through a scratch buffer.
        let mut column = vec![Complex::new(0.0, 0.0); n];
        for c in 0..n {
            let data = grid.data_mut();
            for r in 0..n {
                column[r] = data[r * n + c];
            }
            plan.process(&mut column);
            for r in 0..n {
                data[r * n + c] = column[r];
            }
        }
    }
}

/// Center the zero frequency by swapping diagonal quadrants, in place.
///
/// Requires an even side; equal to its own inverse in that case.
pub fn fftshift(grid: &mut Grid) {
    let n = grid.side();
    assert!(n % 2 == 0, "fftshift requires an even side, got {}", n);
    let h = n / 2;
    for r in 0..h {
        for c in 0..h {
            // top-left <-> bottom-right
            let a = grid.at(r, c);
            let b = grid.at(r + h, c + h);
            grid.set(r, c, b);
            grid.set(r + h, c + h, a);
            // top-right <-> bottom-left
            let a = grid.at(r, c + h);
            let b = grid.at(r + h, c);
            grid.set(r, c + h, b);
            grid.set(r + h, c, a);
        }
    }
}
