//! Forward measurement model and its adjoint
//!
//! One window goes through: mask multiply → symmetric zero-pad to M×M →
//! zero-frequency-centering shift → inverse transform → magnitude → scale
//! by M. The same chain backs measurement synthesis, the projection stage,
//! and the gradient loss, so it lives here exactly once.
//!
//! The gradient stage needs the adjoint of the linear part of that chain
//! (everything but the magnitude), derived by hand:
//!
//! - inverse transform (with its 1/M² factor) → forward transform · 1/M²
//! - centering shift → the same shift (a self-inverse permutation for even M)
//! - zero-pad → center crop
//! - mask multiply → conjugate-mask multiply

use rustfft::num_complex::Complex;

use crate::fft::{fftshift, Fft2};
use crate::grid::Grid;
use crate::mask::PhaseMask;

/// Simulates one sub-aperture measurement; holds the frame-size FFT plans
/// and the optional mask.
pub struct ForwardModel {
    l: usize,
    pad: usize,
    m: usize,
    fft: Fft2,
    mask: Option<PhaseMask>,
}

impl ForwardModel {
    pub fn new(l: usize, pad: usize, mask: Option<PhaseMask>) -> Self {
        let m = l + 2 * pad;
        if let Some(mask) = &mask {
            assert_eq!(mask.side(), l, "mask side must match window size");
        }
        Self {
            l,
            pad,
            m,
            fft: Fft2::new(m),
            mask,
        }
    }

    /// Frame side M = L + 2*pad.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Complex M×M field reaching the sensor for one spectrum window.
    ///
    /// Mask multiply, pad, shift, inverse transform. Both solver stages need
    /// the full complex field, not just its magnitude.
    pub fn propagate(&self, window: &Grid) -> Grid {
        debug_assert_eq!(window.side(), self.l);
        let mut field = Grid::zeros(self.m);
        for r in 0..self.l {
            for c in 0..self.l {
                let mut v = window.at(r, c);
                if let Some(mask) = &self.mask {
                    v *= mask.at(r, c);
                }
                field.set(r + self.pad, c + self.pad, v);
            }
        }
        fftshift(&mut field);
        self.fft.inverse(&mut field);
        field
    }

    /// Noiseless amplitude frame: elementwise |field| scaled by M.
    pub fn amplitude(&self, window: &Grid) -> Vec<f64> {
        let scale = self.m as f64;
        self.propagate(window)
            .data()
            .iter()
            .map(|v| v.norm() * scale)
            .collect()
    }

    /// Invert `propagate`: forward transform, un-shift, crop, un-mask.
    ///
    /// The projection stage uses this on a magnitude-corrected field. The
    /// division by the mask is why masks must be invertible.
    pub fn backproject(&self, field: &mut Grid) -> Grid {
        debug_assert_eq!(field.side(), self.m);
        self.fft.forward(field);
        fftshift(field);

        let mut window = Grid::zeros(self.l);
        for r in 0..self.l {
            for c in 0..self.l {
                let mut v = field.at(r + self.pad, c + self.pad);
                if let Some(mask) = &self.mask {
                    v /= mask.at(r, c);
                }
                window.set(r, c, v);
            }
        }
        window
    }

    /// Adjoint of the linear chain, pushing a field-domain cotangent back to
    /// the window domain.
    ///
    /// `cotangent` is consumed as scratch. Forward transform scaled by 1/M²
    /// (adjoint of the normalized inverse), the self-inverse shift, center
    /// crop (adjoint of zero-pad), conjugate mask (adjoint of mask multiply).
    pub fn adjoint(&self, cotangent: &mut Grid) -> Grid {
        debug_assert_eq!(cotangent.side(), self.m);
        self.fft.forward(cotangent);
        cotangent.scale(1.0 / (self.m * self.m) as f64);
        fftshift(cotangent);

        let mut window = Grid::zeros(self.l);
        for r in 0..self.l {
            for c in 0..self.l {
                let mut v = cotangent.at(r + self.pad, c + self.pad);
                if let Some(mask) = &self.mask {
                    v *= mask.at(r, c).conj();
                }
                window.set(r, c, v);
            }
        }
        window
    }
}

/// Inner product of two equally sized complex rasters, conjugate-linear in
/// the first argument.
pub(crate) fn inner_product(a: &Grid, b: &Grid) -> Complex<f64> {
    debug_assert_eq!(a.side(), b.side());
    a.data()
        .iter()
        .zip(b.data().iter())
        .map(|(x, y)| x.conj() * y)
        .sum()
}
