//! Gradient refinement of the spectrum estimate
//!
//! Minimizes the global amplitude-squared loss
//!
//!   loss = Σ over windows, pixels of (measured - M·|field|)²
//!
//! with a hand-derived Wirtinger gradient: treating the estimate and its
//! conjugate as independent, the magnitude contributes
//! ∂|g|/∂ḡ = g / (2|g|), so the field-domain cotangent for one pixel is
//!
//!   r = M · (M·|g| - measured) · g / |g|        (zero where |g| = 0)
//!
//! and the window gradient is the forward-model adjoint of `r`. Window
//! gradients scatter-add into an N×N accumulator with the same wrap
//! splitting the projection stage uses for write-back, get divided by the
//! coverage counts, and step the estimate by the learning rate.
//!
//! Per-window work reads one immutable snapshot of the estimate, so it runs
//! on rayon; only the final reduction is sequential.

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use tracing::debug;

use crate::forward::ForwardModel;
use crate::geometry::WindowGeometry;
use crate::grid::Grid;
use crate::synthesize::MeasurementSet;

/// Loss and window-domain gradient for one window of the snapshot.
fn window_gradient(
    estimate: &Grid,
    geom: &WindowGeometry,
    model: &ForwardModel,
    measurements: &MeasurementSet,
    index: usize,
) -> (f64, Grid) {
    let coord = geom.coords()[index];
    let window = geom.extract(estimate, coord);
    let mut field = model.propagate(&window);

    let m_scale = model.m() as f64;
    let mut loss = 0.0;
    for (value, &measured) in field
        .data_mut()
        .iter_mut()
        .zip(measurements.frame(index).iter())
    {
        let magnitude = value.norm();
        let amplitude = magnitude * m_scale;
        let diff = amplitude - measured;
        loss += diff * diff;
        *value = if magnitude > 0.0 {
            *value * (m_scale * diff / magnitude)
        } else {
            Complex::new(0.0, 0.0)
        };
    }

    (loss, model.adjoint(&mut field))
}

/// Global amplitude-mismatch loss of `estimate` against the measurement set.
pub fn amplitude_loss(
    estimate: &Grid,
    geom: &WindowGeometry,
    model: &ForwardModel,
    measurements: &MeasurementSet,
) -> f64 {
    let m_scale = model.m() as f64;
    (0..geom.total_frames())
        .into_par_iter()
        .map(|index| {
            let window = geom.extract(estimate, geom.coords()[index]);
            let field = model.propagate(&window);
            field
                .data()
                .iter()
                .zip(measurements.frame(index).iter())
                .map(|(value, &measured)| {
                    let diff = value.norm() * m_scale - measured;
                    diff * diff
                })
                .sum::<f64>()
        })
        .sum()
}

/// Run `iterations` gradient steps on `estimate`, in place.
///
/// Returns the loss evaluated at the start of each iteration so callers can
/// watch the curve; tests assert on it.
pub fn refine(
    estimate: &mut Grid,
    geom: &WindowGeometry,
    model: &ForwardModel,
    measurements: &MeasurementSet,
    iterations: usize,
    learning_rate: f64,
) -> Vec<f64> {
    debug_assert_eq!(estimate.side(), geom.n());
    debug_assert_eq!(measurements.len(), geom.total_frames());

    let n = geom.n();
    let mut losses = Vec::with_capacity(iterations);

    for iteration in 0..iterations {
        // Read-only snapshot semantics: all windows see this iteration's
        // estimate, unlike the sequential projection sweeps.
        let snapshot: &Grid = estimate;
        let per_window: Vec<(f64, Grid)> = (0..geom.total_frames())
            .into_par_iter()
            .map(|index| window_gradient(snapshot, geom, model, measurements, index))
            .collect();

        let mut loss = 0.0;
        let mut accumulator = Grid::zeros(n);
        for (index, (window_loss, block)) in per_window.iter().enumerate() {
            loss += window_loss;
            geom.accumulate(&mut accumulator, geom.coords()[index], block);
        }

        for r in 0..n {
            for c in 0..n {
                let normalized = accumulator.at(r, c) / geom.count_at(r, c) as f64;
                let updated = estimate.at(r, c) - normalized * learning_rate;
                estimate.set(r, c, updated);
            }
        }

        debug!(iteration, loss, "gradient step");
        losses.push(loss);
    }

    losses
}
