//! Ptychographic reconstruction trials from the command line
//!
//! Usage:
//!   rustyptycho [OPTIONS]
//!
//! Options:
//!   -n, --size <N>        Signal side length (default: 256)
//!   -l, --window <L>      Sub-aperture side length (default: 64)
//!   -p, --pitch <D>       Window stride, must divide N (default: 16)
//!       --pad <P>         Zero-pad per side, frame side M = L + 2P (default: 32)
//!       --mask            Apply a random phase mask per window
//!       --noise           Poisson photon noise on measurements
//!       --budget <B>      Expected photons per element (default: 1e6)
//!   -t, --trials <T>      Number of independent trials (default: 1)
//!       --k1 <K1>         Projection outer loops (default: 100)
//!       --k2 <K2>         Gradient iterations (default: 50)
//!       --eta <E>         Gradient learning rate (default: 0.5)
//!       --seed <S>        Base RNG seed (default: 0)
//!   -h, --help            Show this help message

use rustyptycho::tracing_init::init_tracing;
use rustyptycho::TrialConfig;

fn parse_args() -> Result<TrialConfig, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = TrialConfig::default();

    let mut i = 1;
    while i < args.len() {
        let take_value = |i: &mut usize| -> Result<String, String> {
            *i += 1;
            args.get(*i)
                .cloned()
                .ok_or_else(|| format!("Missing value for {}", args[*i - 1]))
        };

        match args[i].as_str() {
            "-n" | "--size" => {
                config.n = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid size".to_string())?;
            }
            "-l" | "--window" => {
                config.l = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid window size".to_string())?;
            }
            "-p" | "--pitch" => {
                config.pitch = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid pitch".to_string())?;
            }
            "--pad" => {
                config.pad = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid pad".to_string())?;
            }
            "--mask" => config.mask_enabled = true,
            "--noise" => config.noise_enabled = true,
            "--budget" => {
                config.photon_budget = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid photon budget".to_string())?;
            }
            "-t" | "--trials" => {
                config.trials = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid trial count".to_string())?;
            }
            "--k1" => {
                config.projection_loops = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid K1".to_string())?;
            }
            "--k2" => {
                config.gradient_iterations = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid K2".to_string())?;
            }
            "--eta" => {
                config.learning_rate = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid learning rate".to_string())?;
            }
            "--seed" => {
                config.seed = take_value(&mut i)?
                    .parse()
                    .map_err(|_| "Invalid seed".to_string())?;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    Ok(config)
}

fn print_help() {
    println!("Usage: rustyptycho [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -n, --size <N>     Signal side length (default: 256)");
    println!("  -l, --window <L>   Sub-aperture side length (default: 64)");
    println!("  -p, --pitch <D>    Window stride, must divide N (default: 16)");
    println!("      --pad <P>      Zero-pad per side (default: 32)");
    println!("      --mask         Apply a random phase mask per window");
    println!("      --noise        Poisson photon noise on measurements");
    println!("      --budget <B>   Expected photons per element (default: 1e6)");
    println!("  -t, --trials <T>   Number of independent trials (default: 1)");
    println!("      --k1 <K1>      Projection outer loops (default: 100)");
    println!("      --k2 <K2>      Gradient iterations (default: 50)");
    println!("      --eta <E>      Gradient learning rate (default: 0.5)");
    println!("      --seed <S>     Base RNG seed (default: 0)");
}

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Run with --help for usage.");
            std::process::exit(1);
        }
    };

    println!(
        "N={} L={} pitch={} M={} mask={} noise={} trials={}",
        config.n,
        config.l,
        config.pitch,
        config.frame_side(),
        config.mask_enabled,
        config.noise_enabled,
        config.trials
    );

    let outcomes = match rustyptycho::run_trials(&config) {
        Ok(outcomes) => outcomes,
        Err(error) => {
            eprintln!("Configuration error: {}", error);
            std::process::exit(1);
        }
    };

    let mut sum = 0.0;
    for (trial, outcome) in outcomes.iter().enumerate() {
        println!("trial {:2}: mse = {:.6}", trial, outcome.mse);
        sum += outcome.mse;
    }
    if !outcomes.is_empty() {
        println!("mean mse over {} trials: {:.6}", outcomes.len(), sum / outcomes.len() as f64);
    }
}
