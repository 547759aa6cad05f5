//! Headless mode for automated runs
//!
//! This module runs a full gauntlet without any graphical output, with the
//! autopilot at the controls, suitable for automated testing and balance checks.
//!
//! ## Usage
//!
//! ```bash
//! # Run a seeded headless gauntlet
//! cargo run --release -- --config run_config.json --seed 42
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "random_seed": 42,
//!   "max_duration_secs": 900,
//!   "start_phase": 1,
//!   "draft_preference": ["multi_arrow", "damage_plus", "attack_speed"],
//!   "recovery_choice": "heal"
//! }
//! ```

pub mod autopilot;
pub mod config;
pub mod runner;

pub use config::HeadlessRunConfig;
pub use runner::{run_headless, RunOutcome, RunResult};
