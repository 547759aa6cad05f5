//! Play Run Scene - Top-down Arena Gauntlet
//!
//! One run is fifty phases fought in a 540x540 arena. The player moves freely
//! and auto-fires at the nearest enemy while standing still.
//!
//! ## Phases
//! - **Normal**: obstacles plus five weighted enemies; kill them all
//! - **Boss** (every 10th): spider on 10 and 30, mage on 20, 40 and 50
//! - **Recovery** (5, 15, 25, 35, 45): choose heal or empower, no enemies
//! - Even normal phases offer a three-card power-up draft once cleared
//! - Clearing opens the door at the top edge; walking into it advances
//!
//! ## Flow
//! 1. `start_run`: spawns the player; the controller starts in `Spawning`
//! 2. `spawn_phase_wave`: sweeps the last wave, spawns the next
//! 3. Per-tick systems run in the order laid out in `systems`
//! 4. Advancing past phase 50 emits a run summary; death emits a restart

pub mod combat_core;
pub mod components;
pub mod constants;
pub mod enemies;
pub mod enemy_config;
pub mod phase_flow;
pub mod player;
pub mod power_ups;
pub mod projectiles;
pub mod scheduler;
pub mod spawning;
pub mod systems;

pub use components::*;
pub use phase_flow::{PhaseStage, PhaseState, RecoveryChoice};
pub use power_ups::{PowerUpDraft, PowerUpId};

use bevy::prelude::*;

use super::run_config::RunSettings;
use crate::combat::CombatPlugin;
use enemy_config::EnemyConfigPlugin;
use scheduler::{DelayedActions, TimerFired};

/// Installs the run resources, events and the ordered encounter loop.
///
/// Add `MinimalPlugins` (or `DefaultPlugins`) before this plugin.
#[derive(Default)]
pub struct GauntletCorePlugin {
    pub settings: RunSettings,
}

impl Plugin for GauntletCorePlugin {
    fn build(&self, app: &mut App) {
        if let Err(e) = self.settings.validate() {
            panic!("Invalid run settings: {}", e);
        }

        let rng = match self.settings.random_seed {
            Some(seed) => GameRng::from_seed(seed),
            None => GameRng::from_entropy(),
        };

        if !app.world().contains_resource::<enemy_config::EnemyDefinitions>() {
            app.add_plugins(EnemyConfigPlugin {
                path: self.settings.enemies_path.clone(),
            });
        }

        app.add_plugins(CombatPlugin)
            .add_event::<TimerFired>()
            .insert_resource(self.settings.clone())
            .insert_resource(rng)
            .insert_resource(PhaseState::new(self.settings.start_phase))
            .init_resource::<Arena>()
            .init_resource::<ControlIntent>()
            .init_resource::<DelayedActions>()
            .init_resource::<PowerUpDraft>()
            .add_systems(Startup, systems::start_run);

        systems::configure_run_system_ordering(app);
        systems::add_core_run_systems(app, || true);
    }
}
