//! Measurement synthesis
//!
//! Produces the fixed measurement set for one trial: a synthetic
//! complex-Gaussian ground truth, its centered and energy-normalized
//! spectrum, one amplitude frame per window, and (optionally) Poisson
//! photon-count corruption of those frames.
//!
//! The normalization by N·√counts makes multiply-covered spectrum pixels
//! carry proportionally less per-measurement energy; `recover_signal`
//! undoes the same chain at the end of the pipeline.

use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};
use rustfft::num_complex::Complex;
use tracing::debug;

use crate::fft::{fftshift, Fft2};
use crate::forward::ForwardModel;
use crate::geometry::WindowGeometry;
use crate::grid::Grid;

/// Fixed set of amplitude frames, one per window, in geometry order.
#[derive(Debug, Clone)]
pub struct MeasurementSet {
    frame_side: usize,
    frames: Vec<Vec<f64>>,
}

impl MeasurementSet {
    pub fn frame_side(&self) -> usize {
        self.frame_side
    }

    pub fn frame(&self, index: usize) -> &[f64] {
        &self.frames[index]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Synthetic complex-Gaussian signal with expected photon count `budget`
/// per element.
pub fn gaussian_signal<R: Rng + ?Sized>(n: usize, budget: f64, rng: &mut R) -> Grid {
    let normal = Normal::new(0.0, (budget / 2.0).sqrt())
        .expect("standard deviation from a validated positive budget");
    Grid::from_fn(n, |_, _| Complex::new(normal.sample(rng), normal.sample(rng)))
}

/// Independent random real array with the same per-element energy, used to
/// seed the spectrum estimate without peeking at the truth.
pub fn random_real_signal<R: Rng + ?Sized>(n: usize, budget: f64, rng: &mut R) -> Grid {
    let normal = Normal::new(0.0, (budget / 2.0).sqrt())
        .expect("standard deviation from a validated positive budget");
    Grid::from_fn(n, |_, _| Complex::new(normal.sample(rng), 0.0))
}

/// Centered spectrum of `signal`, normalized by N·√counts.
pub fn normalized_spectrum(signal: &Grid, geom: &WindowGeometry, fft: &Fft2) -> Grid {
    let n = geom.n();
    debug_assert_eq!(signal.side(), n);
    let mut spectrum = signal.clone();
    fft.forward(&mut spectrum);
    fftshift(&mut spectrum);
    for r in 0..n {
        for c in 0..n {
            let norm = n as f64 * (geom.count_at(r, c) as f64).sqrt();
            spectrum.set(r, c, spectrum.at(r, c) / norm);
        }
    }
    spectrum
}

/// Undo `normalized_spectrum`: rescale by N·√counts, un-shift, inverse
/// transform. Yields the reconstructed signal for a final estimate.
pub fn recover_signal(estimate: &Grid, geom: &WindowGeometry, fft: &Fft2) -> Grid {
    let n = geom.n();
    debug_assert_eq!(estimate.side(), n);
    let mut signal = Grid::from_fn(n, |r, c| {
        estimate.at(r, c) * (n as f64 * (geom.count_at(r, c) as f64).sqrt())
    });
    fftshift(&mut signal);
    fft.inverse(&mut signal);
    signal
}

/// Build the measurement set for a ground-truth signal.
///
/// Every window of the normalized spectrum runs through the forward model.
/// With noise enabled, each squared amplitude is replaced by a Poisson draw
/// with that mean (photon-count sensor semantics) and the frame becomes the
/// square root of the count; a zero mean stays an exact zero count.
pub fn synthesize<R: Rng + ?Sized>(
    signal: &Grid,
    geom: &WindowGeometry,
    model: &ForwardModel,
    fft: &Fft2,
    noise: bool,
    rng: &mut R,
) -> MeasurementSet {
    let spectrum = normalized_spectrum(signal, geom, fft);

    let mut frames = Vec::with_capacity(geom.total_frames());
    for &coord in geom.coords() {
        let window = geom.extract(&spectrum, coord);
        let mut frame = model.amplitude(&window);
        if noise {
            for a in &mut frame {
                let mean = *a * *a;
                let count = if mean > 0.0 {
                    Poisson::new(mean)
                        .expect("positive finite mean")
                        .sample(rng)
                } else {
                    0.0
                };
                *a = count.sqrt();
            }
        }
        frames.push(frame);
    }

    debug!(
        frames = frames.len(),
        frame_side = model.m(),
        noise,
        "measurement set synthesized"
    );

    MeasurementSet {
        frame_side: model.m(),
        frames,
    }
}
