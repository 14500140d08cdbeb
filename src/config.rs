//! Trial configuration
//!
//! One immutable configuration object per run. Every component takes what it
//! needs from here instead of reading process-wide state; all fatal
//! configuration errors surface in `validate` before anything runs.

use snafu::prelude::*;

use crate::geometry::GeometryError;

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("invalid window geometry: {source}"))]
    Geometry { source: GeometryError },

    #[snafu(display("image size {n} must be even (shift needs a half-size swap)"))]
    OddImageSize { n: usize },

    #[snafu(display("frame size {m} must be even (shift needs a half-size swap)"))]
    OddFrameSize { m: usize },

    #[snafu(display("photon budget must be positive, got {budget}"))]
    NonPositiveBudget { budget: f64 },
}

/// Immutable parameters for one reconstruction run.
#[derive(Debug, Clone)]
pub struct TrialConfig {
    /// Signal side length N.
    pub n: usize,
    /// Sub-aperture side length L.
    pub l: usize,
    /// Stride between window top-left corners; must divide N.
    pub pitch: usize,
    /// Symmetric zero-pad per side; frame side M = L + 2*pad.
    pub pad: usize,
    /// Apply a random unit-modulus phase mask per window.
    pub mask_enabled: bool,
    /// Corrupt measurements with Poisson photon counting.
    pub noise_enabled: bool,
    /// Expected photon count per signal element.
    pub photon_budget: f64,
    /// Independent reconstructions to run.
    pub trials: usize,
    /// Alternating-projections outer loops (K1).
    pub projection_loops: usize,
    /// Gradient refinement iterations (K2).
    pub gradient_iterations: usize,
    /// Gradient step size.
    pub learning_rate: f64,
    /// Base RNG seed; each trial derives its own stream from it.
    pub seed: u64,
}

impl TrialConfig {
    /// Frame side M = L + 2*pad.
    pub fn frame_side(&self) -> usize {
        self.l + 2 * self.pad
    }

    /// Reject fatal configuration errors before a run starts.
    ///
    /// Geometry divisibility and coverage are re-checked by
    /// `WindowGeometry::new`; this catches everything cheap up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::geometry::WindowGeometry::new(self.n, self.l, self.pitch)
            .map(|_| ())
            .context(GeometrySnafu)?;
        ensure!(self.n % 2 == 0, OddImageSizeSnafu { n: self.n });
        ensure!(
            self.frame_side() % 2 == 0,
            OddFrameSizeSnafu {
                m: self.frame_side()
            }
        );
        ensure!(
            self.photon_budget > 0.0,
            NonPositiveBudgetSnafu {
                budget: self.photon_budget
            }
        );
        Ok(())
    }

    /// Experience-tuned projection-loop count, K1 ≈ 1000/L.
    ///
    /// Only validated on the geometries it was tuned with; callers opt in
    /// rather than getting it by default.
    pub fn heuristic_projection_loops(l: usize) -> usize {
        (1000 / l).max(1)
    }
}

impl Default for TrialConfig {
    /// Baseline geometry: N=256, L=64, pitch 16, M=128.
    fn default() -> Self {
        Self {
            n: 256,
            l: 64,
            pitch: 16,
            pad: 32,
            mask_enabled: false,
            noise_enabled: false,
            photon_budget: 1e6,
            trials: 1,
            projection_loops: 100,
            gradient_iterations: 50,
            learning_rate: 0.5,
            seed: 0,
        }
    }
}
