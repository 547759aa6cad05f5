//! Combat plumbing
//!
//! Events shared by the encounter systems and the run log:
//! - Damage and defeat reports
//! - Phase, draft and recovery inputs
//! - Presentation cues and scene transitions

use bevy::prelude::*;

pub mod events;
pub mod log;

use events::*;

/// Registers run events and the run log.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app
            // Combat reports
            .add_event::<DamageDealt>()
            .add_event::<EnemyDefeated>()
            .add_event::<BossDefeated>()
            // Controller inputs
            .add_event::<AdvancePhaseRequested>()
            .add_event::<DraftSelection>()
            .add_event::<RecoveryChoiceMade>()
            .add_event::<ResetRun>()
            // Outward
            .add_event::<PresentationCue>()
            .add_event::<SceneTransition>()
            // Resources
            .init_resource::<log::RunLog>();
    }
}
