//! Gauntlet - Top-down Arena Combat Loop
//!
//! A fifty-phase arena gauntlet: waves of enemies, two bosses, power-up
//! drafts and recovery phases, simulated on bevy's ECS.
//!
//! This library exposes the core game modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod headless;
pub mod states;

// Re-export commonly used types
pub use combat::log::{RunLog, RunLogEventType};
pub use headless::{HeadlessRunConfig, RunOutcome, RunResult};
pub use states::play_run::GauntletCorePlugin;
pub use states::run_config::RunSettings;
