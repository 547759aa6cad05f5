//! Game state management
//!
//! The run configuration and the play-run scene.

pub mod play_run;
pub mod run_config;

pub use run_config::RunSettings;
