//! Square complex raster used for signals, spectra, and propagated fields
//!
//! Row-major `Complex<f64>` storage with (row, col) addressing. Both solver
//! stages mutate one `Grid` in place (the spectrum estimate); everything else
//! is read-only after construction.

use rustfft::num_complex::Complex;

/// Square complex-valued 2D array, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    side: usize,
    data: Vec<Complex<f64>>,
}

impl Grid {
    /// All-zero grid with the given side length.
    pub fn zeros(side: usize) -> Self {
        Self {
            side,
            data: vec![Complex::new(0.0, 0.0); side * side],
        }
    }

    /// Build a grid by evaluating `f(row, col)` at every cell.
    pub fn from_fn<F>(side: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Complex<f64>,
    {
        let mut data = Vec::with_capacity(side * side);
        for r in 0..side {
            for c in 0..side {
                data.push(f(r, c));
            }
        }
        Self { side, data }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> Complex<f64> {
        self.data[row * self.side + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Complex<f64>) {
        self.data[row * self.side + col] = value;
    }

    pub fn data(&self) -> &[Complex<f64>] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.data
    }

    /// Multiply every cell by a real factor.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Largest absolute difference to another grid of the same side.
    ///
    /// Panics if the sides differ; callers compare like with like.
    pub fn max_abs_diff(&self, other: &Grid) -> f64 {
        assert_eq!(self.side, other.side, "grid side mismatch");
        self.data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }
}
