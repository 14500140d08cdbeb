//! Sweep the sub-aperture size and report mean reconstruction error
//!
//! For each L, frame side M = 2L and pitch L/4, with mask and Poisson
//! noise enabled, run a batch of trials and print mean MSE per L.
//!
//! Usage:
//!   ptychosweep [OPTIONS]
//!
//! Options:
//!   -n, --size <N>       Signal side length (default: 256)
//!   -t, --trials <T>     Trials per L (default: 4)
//!       --budget <B>     Expected photons per element (default: 1e6)
//!       --seed <S>       Base RNG seed (default: 0)
//!       --heuristic-k1   Use the K1 = 1000/L tuning
//!   -h, --help           Show this help message

use rustyptycho::tracing_init::init_tracing;
use rustyptycho::TrialConfig;

const SWEEP_L: [usize; 4] = [16, 32, 64, 128];

struct SweepArgs {
    n: usize,
    trials: usize,
    budget: f64,
    seed: u64,
    heuristic_k1: bool,
}

fn parse_args() -> Result<SweepArgs, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut sweep = SweepArgs {
        n: 256,
        trials: 4,
        budget: 1e6,
        seed: 0,
        heuristic_k1: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-n" | "--size" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --size")?;
                sweep.n = value.parse().map_err(|_| "Invalid size".to_string())?;
            }
            "-t" | "--trials" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --trials")?;
                sweep.trials = value.parse().map_err(|_| "Invalid trial count".to_string())?;
            }
            "--budget" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --budget")?;
                sweep.budget = value.parse().map_err(|_| "Invalid budget".to_string())?;
            }
            "--seed" => {
                i += 1;
                let value = args.get(i).ok_or("Missing value for --seed")?;
                sweep.seed = value.parse().map_err(|_| "Invalid seed".to_string())?;
            }
            "--heuristic-k1" => sweep.heuristic_k1 = true,
            "-h" | "--help" => {
                println!("Usage: ptychosweep [OPTIONS]");
                println!("  -n, --size <N>      Signal side length (default: 256)");
                println!("  -t, --trials <T>    Trials per L (default: 4)");
                println!("      --budget <B>    Photons per element (default: 1e6)");
                println!("      --seed <S>      Base RNG seed (default: 0)");
                println!("      --heuristic-k1  Use K1 = 1000/L");
                std::process::exit(0);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(sweep)
}

fn main() {
    init_tracing();

    let sweep = match parse_args() {
        Ok(sweep) => sweep,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    };

    println!("{:>6} {:>8} {:>8} {:>6} {:>12}", "L", "M", "pitch", "K1", "mean mse");

    for l in SWEEP_L {
        let k1 = if sweep.heuristic_k1 {
            TrialConfig::heuristic_projection_loops(l)
        } else {
            100
        };
        let config = TrialConfig {
            n: sweep.n,
            l,
            pitch: l / 4,
            pad: l / 2,
            mask_enabled: true,
            noise_enabled: true,
            photon_budget: sweep.budget,
            trials: sweep.trials,
            projection_loops: k1,
            gradient_iterations: 50,
            learning_rate: 0.5,
            seed: sweep.seed,
        };

        match rustyptycho::run_trials(&config) {
            Ok(outcomes) => {
                let mean: f64 =
                    outcomes.iter().map(|o| o.mse).sum::<f64>() / outcomes.len().max(1) as f64;
                println!(
                    "{:>6} {:>8} {:>8} {:>6} {:>12.6}",
                    l,
                    config.frame_side(),
                    config.pitch,
                    k1,
                    mean
                );
            }
            Err(error) => {
                eprintln!("L={}: configuration error: {}", l, error);
            }
        }
    }
}
