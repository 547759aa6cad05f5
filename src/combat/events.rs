//! Run events
//!
//! Events crossing module boundaries. Combat systems report what happened
//! (damage, defeats); the phase controller owns every counter that reacts to
//! it. Presentation and scene events flow outward to whatever renders the run.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::states::play_run::components::DamageOutcome;
use crate::states::play_run::enemies::EnemyKind;
use crate::states::play_run::phase_flow::RecoveryChoice;
use crate::states::play_run::power_ups::PowerUpId;

/// Who dealt damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    PlayerArrow,
    /// The player's retaliation on body contact.
    PlayerContact,
    EnemyContact(EnemyKind),
    EnemyProjectile(EnemyKind),
    /// A mage warning circle.
    Blast,
}

impl DamageSource {
    pub fn label(&self) -> &'static str {
        match self {
            DamageSource::PlayerArrow => "Arrow",
            DamageSource::PlayerContact => "Player contact",
            DamageSource::EnemyContact(kind) => kind.name(),
            DamageSource::EnemyProjectile(kind) => match kind {
                EnemyKind::PlantShooter => "Plant projectile",
                EnemyKind::StoneShooter => "Stone projectile",
                EnemyKind::TornadoShooter => "Tornado",
                _ => "Projectile",
            },
            DamageSource::Blast => "Blast",
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, DamageSource::PlayerArrow | DamageSource::PlayerContact)
    }
}

/// Who took damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageTarget {
    Player,
    Enemy(EnemyKind),
}

impl DamageTarget {
    pub fn label(&self) -> &'static str {
        match self {
            DamageTarget::Player => "Player",
            DamageTarget::Enemy(kind) => kind.name(),
        }
    }
}

/// A hit that landed.
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageDealt {
    pub source: DamageSource,
    pub target: DamageTarget,
    pub amount: f32,
    pub outcome: DamageOutcome,
}

/// An enemy completed its death transition and counts as a kill.
#[derive(Event, Debug, Clone, Copy)]
pub struct EnemyDefeated {
    pub entity: Entity,
    pub kind: EnemyKind,
    pub position: Vec2,
}

/// The boss of `phase` is gone for good.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossDefeated {
    pub phase: u32,
}

/// Requests a phase advance. The controller decides whether it is allowed.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct AdvancePhaseRequested;

/// Input: pick the draft offer at this index.
#[derive(Event, Debug, Clone, Copy)]
pub struct DraftSelection(pub usize);

/// Input: the recovery-phase choice.
#[derive(Event, Debug, Clone, Copy)]
pub struct RecoveryChoiceMade(pub RecoveryChoice);

/// Input: abandon the current run and start over from phase 1.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ResetRun;

/// Cues for the presentation layer. The core never reads these back.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum PresentationCue {
    /// Damage text and hit feedback. `health_fraction` is what remains
    /// after the hit, for health bars.
    Hit {
        entity: Entity,
        amount: f32,
        health_fraction: f32,
    },
    /// Brief tint on a boss body.
    Flash { entity: Entity },
    Died { entity: Entity, position: Vec2 },
    DoorVisibility { visible: bool },
    FadeOut { entity: Entity },
    FadeIn { entity: Entity },
    WarningPlaced { position: Vec2, radius: f32 },
    WarningDetonated { position: Vec2, hit: bool },
    PhaseEntered { phase: u32 },
    DraftOpened { offers: Vec<PowerUpId> },
    RecoveryOffered { phase: u32 },
}

/// End-of-run statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Seconds from the start of the run
    pub elapsed_secs: f32,
    pub monsters_killed: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub final_phase: u32,
    /// Phases cleared
    pub score: u32,
    pub power_ups: Vec<PowerUpId>,
}

/// Why the run restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestartReason {
    PlayerDied,
    Requested,
}

/// Scene change requested from the presentation layer. Emitted once per run.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum SceneTransition {
    RunSummary(RunSummary),
    Restart { reason: RestartReason },
}
