//! Gauntlet - Top-down Arena Combat Loop
//!
//! Runs one headless gauntlet and prints the result.

use gauntlet::cli;
use gauntlet::headless::run_headless;

fn main() {
    let args = cli::parse_args();

    let config = match args.to_run_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    match run_headless(config) {
        Ok(result) => {
            println!(
                "{}: phase {}, {} kills, {:.0} damage dealt, {:.0} taken, {:.1}s",
                result.outcome.label(),
                result.summary.final_phase,
                result.summary.monsters_killed,
                result.summary.damage_dealt,
                result.summary.damage_taken,
                result.summary.elapsed_secs
            );
        }
        Err(e) => {
            eprintln!("Headless run failed: {}", e);
            std::process::exit(1);
        }
    }
}
