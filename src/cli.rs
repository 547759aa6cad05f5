//! Command-line interface for Gauntlet
//!
//! Every flag overrides the matching field of the JSON config.

use clap::Parser;
use std::path::PathBuf;

use crate::headless::HeadlessRunConfig;

/// Top-down arena gauntlet, simulated headless
#[derive(Parser, Debug)]
#[command(name = "gauntlet")]
#[command(about = "Top-down arena gauntlet, simulated headless")]
#[command(version)]
pub struct Args {
    /// JSON run configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output path for the run log
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum run duration in simulated seconds
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Phase to start at
    #[arg(long)]
    pub start_phase: Option<u32>,

    /// Step the simulation in real time instead of fast-forwarding
    #[arg(long)]
    pub realtime: bool,
}

impl Args {
    /// Load the config file (or defaults) and apply the flag overrides.
    pub fn to_run_config(&self) -> Result<HeadlessRunConfig, String> {
        let mut config = match &self.config {
            Some(path) => HeadlessRunConfig::load_from_file(path)?,
            None => HeadlessRunConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.random_seed = Some(seed);
        }
        if let Some(output) = &self.output {
            config.output_path = Some(output.to_string_lossy().into_owned());
        }
        if let Some(max_duration) = self.max_duration {
            config.max_duration_secs = max_duration;
        }
        if let Some(start_phase) = self.start_phase {
            config.start_phase = start_phase;
        }
        if self.realtime {
            config.fast_forward = false;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
