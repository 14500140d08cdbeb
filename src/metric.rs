//! Global-phase-invariant reconstruction error
//!
//! Phase retrieval can never pin down a global phase, so the score is the
//! minimum per-pixel MSE over all phase rotations of the estimate:
//!
//!   mse = (|<x,x>| + |<x̂,x̂>| - 2|<x,x̂>|) / N²
//!
//! with the complex inner product conjugate-linear in its first argument.

use crate::forward::inner_product;
use crate::grid::Grid;

/// Minimum mean squared error between `truth` and any global phase rotation
/// of `estimate`.
pub fn phase_invariant_mse(truth: &Grid, estimate: &Grid) -> f64 {
    assert_eq!(
        truth.side(),
        estimate.side(),
        "signal and estimate sizes differ"
    );
    let n2 = (truth.side() * truth.side()) as f64;
    let xx = inner_product(truth, truth).norm();
    let ee = inner_product(estimate, estimate).norm();
    let xe = inner_product(truth, estimate).norm();
    (xx + ee - 2.0 * xe) / n2
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rustfft::num_complex::Complex;

    use crate::synthesize::gaussian_signal;

    fn rotated(g: &Grid, psi: f64) -> Grid {
        let w = Complex::new(psi.cos(), psi.sin());
        Grid::from_fn(g.side(), |r, c| g.at(r, c) * w)
    }

    #[test]
    fn test_zero_at_identity() {
        let x = gaussian_signal(8, 1.0, &mut StdRng::seed_from_u64(1));
        assert!(phase_invariant_mse(&x, &x).abs() < 1e-12);
    }

    #[test]
    fn test_zero_under_global_phase() {
        let x = gaussian_signal(8, 1.0, &mut StdRng::seed_from_u64(2));
        for psi in [0.3, 1.7, -2.4] {
            let mse = phase_invariant_mse(&x, &rotated(&x, psi));
            assert!(mse.abs() < 1e-10, "psi {}: mse {}", psi, mse);
        }
    }

    #[test]
    fn test_score_invariant_under_estimate_rotation() {
        let mut rng = StdRng::seed_from_u64(3);
        let x = gaussian_signal(8, 1.0, &mut rng);
        let e = gaussian_signal(8, 1.0, &mut rng);

        let base = phase_invariant_mse(&x, &e);
        for psi in [0.9, 2.2, -0.6] {
            let m = phase_invariant_mse(&x, &rotated(&e, psi));
            assert!((m - base).abs() < 1e-9 * (1.0 + base.abs()));
        }
    }

    #[test]
    fn test_positive_for_distinct_signals() {
        let mut rng = StdRng::seed_from_u64(4);
        let x = gaussian_signal(8, 1.0, &mut rng);
        let e = gaussian_signal(8, 1.0, &mut rng);
        assert!(phase_invariant_mse(&x, &e) > 0.0);
    }
}
