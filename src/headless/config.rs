//! JSON configuration parsing for headless mode
//!
//! Parses a JSON run configuration and converts it to the game's `RunSettings`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::states::play_run::constants::FINAL_PHASE;
use crate::states::play_run::{PowerUpId, RecoveryChoice};
use crate::states::run_config::RunSettings;

/// Headless run configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessRunConfig {
    /// Random seed for deterministic run reproduction
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Maximum run duration in simulated seconds (default: 1800)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Custom output path for the run log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Phase to start at (default: 1)
    #[serde(default = "default_start_phase")]
    pub start_phase: u32,
    /// Step simulated time as fast as possible instead of in real time
    #[serde(default = "default_fast_forward")]
    pub fast_forward: bool,
    /// Autopilot draft order, most wanted first (power-up ids such as "damage_plus")
    #[serde(default)]
    pub draft_preference: Vec<String>,
    /// Autopilot choice on recovery phases (default: heal)
    #[serde(default = "default_recovery_choice")]
    pub recovery_choice: RecoveryChoice,
    /// Enemy definitions file overriding the built-in table
    #[serde(default)]
    pub enemies_path: Option<PathBuf>,
    /// Install the log plugin
    #[serde(default = "default_enable_logging")]
    pub enable_logging: bool,
    /// Log filter passed to the log plugin
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_max_duration() -> f32 {
    1800.0
}

fn default_start_phase() -> u32 {
    1
}

fn default_fast_forward() -> bool {
    true
}

fn default_recovery_choice() -> RecoveryChoice {
    RecoveryChoice::Heal
}

fn default_enable_logging() -> bool {
    true
}

fn default_log_filter() -> String {
    "info,wgpu=error,naga=warn".to_string()
}

impl Default for HeadlessRunConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            max_duration_secs: default_max_duration(),
            output_path: None,
            start_phase: default_start_phase(),
            fast_forward: default_fast_forward(),
            draft_preference: Vec::new(),
            recovery_choice: default_recovery_choice(),
            enemies_path: None,
            enable_logging: default_enable_logging(),
            log_filter: default_log_filter(),
        }
    }
}

impl HeadlessRunConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, String> {
        let config: HeadlessRunConfig = serde_json::from_str(contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.max_duration_secs > 0.0) {
            return Err("max_duration_secs must be positive".to_string());
        }
        if self.start_phase == 0 || self.start_phase > FINAL_PHASE {
            return Err(format!(
                "start_phase must be between 1 and {}, got {}",
                FINAL_PHASE, self.start_phase
            ));
        }
        self.draft_preferences()?;
        Ok(())
    }

    /// Parsed draft preference order
    pub fn draft_preferences(&self) -> Result<Vec<PowerUpId>, String> {
        self.draft_preference
            .iter()
            .map(|name| PowerUpId::parse(name))
            .collect()
    }

    /// Convert to the game's RunSettings
    pub fn to_run_settings(&self) -> RunSettings {
        RunSettings {
            start_phase: self.start_phase,
            random_seed: self.random_seed,
            enemies_path: self.enemies_path.clone(),
        }
    }
}
