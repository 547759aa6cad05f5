//! Headless run execution
//!
//! Runs a whole gauntlet without any graphical output, driven by the
//! autopilot, suitable for automated testing and balance checks.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::combat::events::{RestartReason, RunSummary, SceneTransition};
use crate::combat::log::{RunLog, RunMetadata};
use crate::states::play_run::systems::{PhaseState, RunSystemPhase};
use crate::states::play_run::{GauntletCorePlugin, Player};

use super::autopilot::{self, AutopilotSettings};
use super::config::HeadlessRunConfig;

/// Simulated seconds per update.
const TICK_SECS: f64 = 1.0 / 60.0;

/// How a headless run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunOutcome {
    /// Advanced past the final phase
    Victory,
    /// The player died
    Defeated,
    /// Hit the configured duration limit
    TimedOut,
}

impl RunOutcome {
    pub fn label(self) -> &'static str {
        match self {
            RunOutcome::Victory => "Victory",
            RunOutcome::Defeated => "Defeated",
            RunOutcome::TimedOut => "TimedOut",
        }
    }
}

/// Result of a completed headless run
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub outcome: RunOutcome,
    /// Statistics at the moment the run ended
    pub summary: RunSummary,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    /// Where the run log was written, if saving succeeded
    pub log_path: Option<String>,
}

/// Resource to track headless run state
#[derive(Resource)]
pub struct HeadlessRunState {
    /// Simulated seconds before the run is called off
    pub max_duration: f32,
    /// Custom output path for the run log
    pub output_path: Option<String>,
    pub random_seed: Option<u64>,
    /// Whether the run has ended
    pub run_complete: bool,
    /// Populated when the run ends
    pub result: Option<RunResult>,
}

/// Plugin for headless run execution
pub struct HeadlessPlugin {
    pub config: HeadlessRunConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let draft_preference = match self.config.draft_preferences() {
            Ok(preferences) => preferences,
            Err(e) => panic!("Invalid headless configuration: {}", e),
        };

        app.add_plugins(GauntletCorePlugin {
            settings: self.config.to_run_settings(),
        })
        .insert_resource(AutopilotSettings {
            draft_preference,
            recovery_choice: self.config.recovery_choice,
        })
        .insert_resource(HeadlessRunState {
            max_duration: self.config.max_duration_secs,
            output_path: self.config.output_path.clone(),
            random_seed: self.config.random_seed,
            run_complete: false,
            result: None,
        });

        app.add_systems(
            Update,
            (autopilot::autopilot_movement, autopilot::autopilot_choices)
                .before(RunSystemPhase::Timers),
        )
        .add_systems(
            Update,
            headless_check_run_end.after(RunSystemPhase::PhaseEvaluation),
        )
        .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

/// Detect the end of the run: a scene transition or the time limit.
fn headless_check_run_end(
    time: Res<Time>,
    phase: Res<PhaseState>,
    run_log: Res<RunLog>,
    player: Query<&Player>,
    mut transitions: EventReader<SceneTransition>,
    mut headless_state: ResMut<HeadlessRunState>,
) {
    if headless_state.run_complete {
        return;
    }

    let mut ended: Option<(RunOutcome, RunSummary)> = None;
    for transition in transitions.read() {
        match transition {
            SceneTransition::RunSummary(summary) => {
                ended = Some((RunOutcome::Victory, summary.clone()));
            }
            SceneTransition::Restart { reason } => {
                if *reason == RestartReason::PlayerDied {
                    let power_ups = player.get_single().map(|p| p.power_ups.clone()).unwrap_or_default();
                    ended = Some((RunOutcome::Defeated, phase.summary(time.elapsed_secs(), &power_ups)));
                }
            }
        }
    }

    if ended.is_none() {
        let elapsed = time.elapsed_secs() - phase.run_started_at;
        if elapsed >= headless_state.max_duration {
            info!("Run timed out after {:.1}s in phase {}", elapsed, phase.current_phase);
            let power_ups = player.get_single().map(|p| p.power_ups.clone()).unwrap_or_default();
            ended = Some((RunOutcome::TimedOut, phase.summary(time.elapsed_secs(), &power_ups)));
        }
    }

    let Some((outcome, summary)) = ended else {
        return;
    };

    let metadata = RunMetadata {
        outcome: outcome.label().to_string(),
        random_seed: headless_state.random_seed,
        summary: summary.clone(),
    };
    let log_path = match run_log.save_to_file(&metadata, headless_state.output_path.as_deref()) {
        Ok(path) => {
            println!("Run complete ({}). Log saved to: {}", outcome.label(), path);
            Some(path)
        }
        Err(e) => {
            eprintln!("Failed to save run log: {}", e);
            None
        }
    };

    headless_state.result = Some(RunResult {
        outcome,
        summary,
        random_seed: headless_state.random_seed,
        log_path,
    });
    headless_state.run_complete = true;
}

/// Exit the app when the run is complete
fn headless_exit_on_complete(headless_state: Res<HeadlessRunState>, mut exit: EventWriter<AppExit>) {
    if headless_state.run_complete {
        exit.send(AppExit::Success);
    }
}

/// Build the headless app without running it.
pub fn build_headless_app(config: HeadlessRunConfig) -> App {
    let mut app = App::new();
    // Minimal plugins - no window, no rendering
    app.add_plugins(MinimalPlugins).add_plugins(TransformPlugin);
    if config.enable_logging {
        app.add_plugins(LogPlugin {
            filter: config.log_filter.clone(),
            ..default()
        });
    }
    if config.fast_forward {
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            TICK_SECS,
        )));
    }
    app.add_plugins(HeadlessPlugin { config });
    app
}

/// Run a headless gauntlet with the given configuration
pub fn run_headless(config: HeadlessRunConfig) -> Result<RunResult, String> {
    config.validate()?;

    println!("Starting headless run...");
    println!("  Start phase: {}", config.start_phase);
    println!("  Seed: {:?}", config.random_seed);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let fast_forward = config.fast_forward;
    let mut app = build_headless_app(config);
    app.finish();
    app.cleanup();

    // Drive updates directly so the result can be read back afterwards.
    let tick = Duration::from_secs_f64(TICK_SECS);
    loop {
        let started = Instant::now();
        app.update();
        if app.should_exit().is_some() {
            break;
        }
        if !fast_forward {
            if let Some(rest) = tick.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    let state = app
        .world_mut()
        .remove_resource::<HeadlessRunState>()
        .ok_or_else(|| "Headless run state missing".to_string())?;
    state
        .result
        .ok_or_else(|| "Run ended without a result".to_string())
}
