//! End-to-end reconstruction tests
//!
//! Small geometries run the full pipeline in CI time; the full-scale
//! scenarios are `#[ignore]`d and run on demand with
//! `cargo test --release -- --ignored`.

use rand::rngs::StdRng;
use rand::SeedableRng;

use rustyptycho::fft::Fft2;
use rustyptycho::forward::ForwardModel;
use rustyptycho::geometry::WindowGeometry;
use rustyptycho::mask::PhaseMask;
use rustyptycho::solver::{amplitude_loss, project, refine};
use rustyptycho::synthesize::{
    gaussian_signal, normalized_spectrum, random_real_signal, recover_signal, synthesize,
};
use rustyptycho::{phase_invariant_mse, run_trial, run_trials, TrialConfig};

/// Small noiseless geometry: 64 windows, 4x coverage, M = 2L.
fn small_config() -> TrialConfig {
    TrialConfig {
        n: 32,
        l: 8,
        pitch: 4,
        pad: 4,
        mask_enabled: false,
        noise_enabled: false,
        photon_budget: 1.0,
        trials: 1,
        projection_loops: 40,
        gradient_iterations: 20,
        learning_rate: 0.5,
        seed: 7,
    }
}

#[test]
fn test_projection_cuts_amplitude_mismatch() {
    let cfg = small_config();
    let geom = WindowGeometry::new(cfg.n, cfg.l, cfg.pitch).unwrap();
    let model = ForwardModel::new(cfg.l, cfg.pad, None);
    let fft = Fft2::new(cfg.n);
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let signal = gaussian_signal(cfg.n, cfg.photon_budget, &mut rng);
    let measurements = synthesize(&signal, &geom, &model, &fft, false, &mut rng);

    let seed_signal = random_real_signal(cfg.n, cfg.photon_budget, &mut rng);
    let mut estimate = normalized_spectrum(&seed_signal, &geom, &fft);

    let initial = amplitude_loss(&estimate, &geom, &model, &measurements);
    project(
        &mut estimate,
        &geom,
        &model,
        &measurements,
        cfg.projection_loops,
        &mut rng,
    );
    let after = amplitude_loss(&estimate, &geom, &model, &measurements);

    assert!(
        after < 0.5 * initial,
        "projections barely moved the loss: {} -> {}",
        initial,
        after
    );
}

#[test]
fn test_gradient_stage_does_not_worsen_loss() {
    let cfg = small_config();
    let geom = WindowGeometry::new(cfg.n, cfg.l, cfg.pitch).unwrap();
    let model = ForwardModel::new(cfg.l, cfg.pad, None);
    let fft = Fft2::new(cfg.n);
    let mut rng = StdRng::seed_from_u64(11);

    let signal = gaussian_signal(cfg.n, cfg.photon_budget, &mut rng);
    let measurements = synthesize(&signal, &geom, &model, &fft, false, &mut rng);

    let seed_signal = random_real_signal(cfg.n, cfg.photon_budget, &mut rng);
    let mut estimate = normalized_spectrum(&seed_signal, &geom, &fft);
    project(&mut estimate, &geom, &model, &measurements, 20, &mut rng);

    let losses = refine(&mut estimate, &geom, &model, &measurements, 20, 0.5);
    let first = losses.first().copied().unwrap();
    let last = losses.last().copied().unwrap();
    assert!(
        last <= first * 1.05,
        "gradient refinement worsened the loss: {} -> {}",
        first,
        last
    );
}

#[test]
fn test_full_pipeline_beats_random_init() {
    let cfg = small_config();
    let outcome = run_trial(&cfg, 0).unwrap();

    // Score a fresh random initialization the same way the pipeline scores
    // its result; the reconstruction must do clearly better.
    let geom = WindowGeometry::new(cfg.n, cfg.l, cfg.pitch).unwrap();
    let fft = Fft2::new(cfg.n);
    let mut rng = StdRng::seed_from_u64(1234);
    let baseline_truth = gaussian_signal(cfg.n, cfg.photon_budget, &mut rng);
    let random = normalized_spectrum(
        &random_real_signal(cfg.n, cfg.photon_budget, &mut rng),
        &geom,
        &fft,
    );
    let random_recon = recover_signal(&random, &geom, &fft);
    let random_mse = phase_invariant_mse(&baseline_truth, &random_recon);

    assert!(outcome.mse.is_finite());
    assert!(
        outcome.mse < random_mse,
        "pipeline mse {} not better than random baseline {}",
        outcome.mse,
        random_mse
    );
}

#[test]
fn test_pipeline_with_mask_and_noise_completes() {
    let cfg = TrialConfig {
        mask_enabled: true,
        noise_enabled: true,
        photon_budget: 1e6,
        projection_loops: 15,
        gradient_iterations: 10,
        ..small_config()
    };
    let outcomes = run_trials(&cfg).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].mse.is_finite());
    assert!(outcomes[0].mse >= 0.0);
    assert_eq!(outcomes[0].reconstruction.side(), cfg.n);
}

#[test]
fn test_masked_projection_fixed_point() {
    // The fixed-point property must survive the mask divide path.
    let (n, l, pitch, pad) = (16, 8, 4, 4);
    let geom = WindowGeometry::new(n, l, pitch).unwrap();
    let fft = Fft2::new(n);
    let mut rng = StdRng::seed_from_u64(77);
    let mask = PhaseMask::random_phase(l, &mut rng);
    let model = ForwardModel::new(l, pad, Some(mask));

    let signal = gaussian_signal(n, 1.0, &mut rng);
    let measurements = synthesize(&signal, &geom, &model, &fft, false, &mut rng);

    let truth = normalized_spectrum(&signal, &geom, &fft);
    let mut estimate = truth.clone();
    project(&mut estimate, &geom, &model, &measurements, 2, &mut rng);

    assert!(
        estimate.max_abs_diff(&truth) < 1e-9,
        "masked fixed point drifted by {}",
        estimate.max_abs_diff(&truth)
    );
}

// Full-scale scenarios. Slow; run with --release -- --ignored.

#[test]
#[ignore]
fn full_scale_noiseless_baseline() {
    let cfg = TrialConfig {
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
    };
    let outcome = run_trial(&cfg, 0).unwrap();
    // Noiseless, heavily redundant coverage: the residual must be a small
    // fraction of the per-pixel signal power (global-phase residual
    // dominates; exact value is stochastic but bounded).
    assert!(outcome.mse.is_finite());
    assert!(
        outcome.mse < 0.01 * cfg.photon_budget,
        "mse {} too large for noiseless baseline",
        outcome.mse
    );
}

#[test]
#[ignore]
fn full_scale_more_projections_never_worse() {
    let base = TrialConfig {
        n: 256,
        l: 64,
        pitch: 16,
        pad: 32,
        photon_budget: 1e6,
        projection_loops: 100,
        gradient_iterations: 50,
        seed: 5,
        ..TrialConfig::default()
    };
    let long = TrialConfig {
        projection_loops: 500,
        ..base.clone()
    };

    let short_run = run_trial(&base, 0).unwrap();
    let long_run = run_trial(&long, 0).unwrap();
    assert!(
        long_run.mse <= short_run.mse * 1.01,
        "more noiseless projection loops worsened mse: {} -> {}",
        short_run.mse,
        long_run.mse
    );
}

#[test]
#[ignore]
fn full_scale_masked_noisy_window_sweep() {
    for l in [16usize, 32, 64, 128] {
        let cfg = TrialConfig {
            n: 256,
            l,
            pitch: l / 4,
            pad: l / 2,
            mask_enabled: true,
            noise_enabled: true,
            photon_budget: 1e6,
            trials: 2,
            projection_loops: TrialConfig::heuristic_projection_loops(l),
            gradient_iterations: 50,
            learning_rate: 0.5,
            seed: 3,
        };
        let outcomes = run_trials(&cfg).unwrap();
        let mean: f64 = outcomes.iter().map(|o| o.mse).sum::<f64>() / outcomes.len() as f64;
        // Mask and photon noise leave a residual, but with this coverage
        // redundancy the mean error must stay a small, L-independent
        // fraction of the per-pixel signal power.
        assert!(mean.is_finite(), "L={}: mean mse {}", l, mean);
        assert!(
            mean < 0.05 * cfg.photon_budget,
            "L={}: mean mse {} too large for masked noisy sweep",
            l,
            mean
        );
    }
}
