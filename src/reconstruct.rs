//! One-trial reconstruction pipeline
//!
//! Wires the components together in the order the problem demands:
//! synthesize measurements once, seed the spectrum estimate from an
//! independent random real array, run the projection stage, hand the same
//! estimate to the gradient stage, undo the energy normalization, score.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::{ConfigError, TrialConfig};
use crate::fft::Fft2;
use crate::forward::ForwardModel;
use crate::geometry::WindowGeometry;
use crate::grid::Grid;
use crate::mask::PhaseMask;
use crate::metric::phase_invariant_mse;
use crate::solver;
use crate::synthesize;

/// Result of one reconstruction trial.
#[derive(Debug)]
pub struct TrialOutcome {
    /// Global-phase-invariant MSE against the ground truth.
    pub mse: f64,
    /// Amplitude-mismatch loss at the start of each gradient iteration.
    pub loss_history: Vec<f64>,
    /// Reconstructed signal.
    pub reconstruction: Grid,
}

/// Run a single trial with a seed derived from the config seed and the
/// trial index.
pub fn run_trial(config: &TrialConfig, trial_index: usize) -> Result<TrialOutcome, ConfigError> {
    config.validate()?;

    let geom = WindowGeometry::new(config.n, config.l, config.pitch)
        .expect("geometry validated by config");
    let fft = Fft2::new(config.n);
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(trial_index as u64));

    let mask = config
        .mask_enabled
        .then(|| PhaseMask::random_phase(config.l, &mut rng));
    let model = ForwardModel::new(config.l, config.pad, mask);

    let signal = synthesize::gaussian_signal(config.n, config.photon_budget, &mut rng);
    let measurements = synthesize::synthesize(
        &signal,
        &geom,
        &model,
        &fft,
        config.noise_enabled,
        &mut rng,
    );

    info!(
        trial_index,
        n = config.n,
        l = config.l,
        pitch = config.pitch,
        frames = geom.total_frames(),
        mask = config.mask_enabled,
        noise = config.noise_enabled,
        "trial configured"
    );

    // Random real init keeps the estimate independent of the truth while
    // sharing the synthesizer's energy convention.
    let seed_signal = synthesize::random_real_signal(config.n, config.photon_budget, &mut rng);
    let mut estimate = synthesize::normalized_spectrum(&seed_signal, &geom, &fft);

    solver::project(
        &mut estimate,
        &geom,
        &model,
        &measurements,
        config.projection_loops,
        &mut rng,
    );

    let loss_history = solver::refine(
        &mut estimate,
        &geom,
        &model,
        &measurements,
        config.gradient_iterations,
        config.learning_rate,
    );

    let reconstruction = synthesize::recover_signal(&estimate, &geom, &fft);
    let mse = phase_invariant_mse(&signal, &reconstruction);

    info!(trial_index, mse, "trial complete");

    Ok(TrialOutcome {
        mse,
        loss_history,
        reconstruction,
    })
}

/// Run all configured trials, each with its own derived seed.
pub fn run_trials(config: &TrialConfig) -> Result<Vec<TrialOutcome>, ConfigError> {
    (0..config.trials)
        .map(|trial| run_trial(config, trial))
        .collect()
}
