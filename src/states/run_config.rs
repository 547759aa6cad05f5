//! Run configuration resource
//!
//! Settings fixed for the lifetime of one run: where it starts and how the
//! random source is seeded.

use bevy::prelude::*;
use std::path::PathBuf;

use super::play_run::constants::FINAL_PHASE;

#[derive(Resource, Debug, Clone)]
pub struct RunSettings {
    /// Phase the run begins at (1 for a normal run)
    pub start_phase: u32,
    /// Seed for `GameRng`; `None` seeds from entropy
    pub random_seed: Option<u64>,
    /// Enemy definitions file; `None` uses the embedded table
    pub enemies_path: Option<PathBuf>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            start_phase: 1,
            random_seed: None,
            enemies_path: None,
        }
    }
}

impl RunSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.start_phase == 0 || self.start_phase > FINAL_PHASE {
            return Err(format!(
                "start_phase must be between 1 and {}, got {}",
                FINAL_PHASE, self.start_phase
            ));
        }
        Ok(())
    }
}
