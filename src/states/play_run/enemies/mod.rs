//! Enemy Variants
//!
//! Every enemy is one `CombatEntity` plus behaviour components selected from a
//! closed `EnemyKind`. The kind is the only dispatch key: base stats come from
//! `EnemyDefinitions`, movement from `MovementPattern::for_kind`, attacks from
//! `RangedAttack::for_kind`, and the two bosses add their own components.
//!
//! ## Submodules
//!
//! - `movement`: chase, roam, move/pause and bounce locomotion
//! - `ranged`: aimed, spray and homing projectile attacks
//! - `splitting_boss`: the three-tier spider lineage
//! - `mage_boss`: fury, reposition, teleport and warning circles

pub mod mage_boss;
pub mod movement;
pub mod ranged;
pub mod splitting_boss;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::components::{CombatEntity, Enemy, GameRng, Hitbox, WaveEntity};
use super::enemy_config::EnemyDefinitions;

pub use mage_boss::MageBoss;
pub use movement::MovementPattern;
pub use ranged::{AttackPattern, RangedAttack};
pub use splitting_boss::{BossTier, SplittingBoss};

/// Closed set of enemy variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Chases the player.
    Melee,
    /// Roams in random grid directions.
    Animal,
    /// Stationary, fires aimed shots.
    PlantShooter,
    /// Moves then pauses; sprays bouncing shots while paused.
    StoneShooter,
    /// Moves then pauses; fires homing shots on a fixed interval.
    TornadoShooter,
    /// Splitting boss (large tier when spawned by a phase).
    SpiderBoss,
    /// Teleporting boss.
    MageBoss,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 7] = [
        EnemyKind::Melee,
        EnemyKind::Animal,
        EnemyKind::PlantShooter,
        EnemyKind::StoneShooter,
        EnemyKind::TornadoShooter,
        EnemyKind::SpiderBoss,
        EnemyKind::MageBoss,
    ];

    /// Kinds that make up normal waves.
    pub const NORMAL: [EnemyKind; 5] = [
        EnemyKind::Animal,
        EnemyKind::Melee,
        EnemyKind::PlantShooter,
        EnemyKind::StoneShooter,
        EnemyKind::TornadoShooter,
    ];

    /// Position in `ALL`, used to index stat tables.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Melee => "Melee Chaser",
            EnemyKind::Animal => "Animal",
            EnemyKind::PlantShooter => "Plant Shooter",
            EnemyKind::StoneShooter => "Stone Shooter",
            EnemyKind::TornadoShooter => "Tornado Shooter",
            EnemyKind::SpiderBoss => "Spider",
            EnemyKind::MageBoss => "Explosive Mage",
        }
    }

    pub fn is_boss(self) -> bool {
        matches!(self, EnemyKind::SpiderBoss | EnemyKind::MageBoss)
    }
}

/// Which boss a boss phase fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossKind {
    Spider,
    Mage,
}

impl BossKind {
    pub fn enemy_kind(self) -> EnemyKind {
        match self {
            BossKind::Spider => EnemyKind::SpiderBoss,
            BossKind::Mage => EnemyKind::MageBoss,
        }
    }
}

/// Spawn one enemy of `kind` at `position`, scaled for `phase`.
///
/// A `SpiderBoss` spawned this way is always the large tier; split children go
/// through `splitting_boss::spawn_tier` and are not phase-scaled.
pub fn spawn_enemy(
    commands: &mut Commands,
    defs: &EnemyDefinitions,
    rng: &mut GameRng,
    kind: EnemyKind,
    position: Vec2,
    now: f32,
    phase: u32,
) -> Entity {
    if kind == EnemyKind::SpiderBoss {
        return splitting_boss::spawn_tier(commands, defs, rng, BossTier::Large, position, now, Some(phase));
    }

    let stats = defs.stats(kind);
    let mut combat = CombatEntity::new(stats.max_health, stats.damage, stats.invincibility);
    combat.apply_phase_buff(phase);

    let mut entity = commands.spawn((
        WaveEntity,
        Enemy {
            kind,
            speed: stats.speed,
        },
        combat,
        Hitbox::new(stats.hitbox.0, stats.hitbox.1),
        Transform::from_xyz(position.x, position.y, 0.0),
        MovementPattern::for_kind(kind, now, rng),
    ));

    if let Some(attack) = RangedAttack::for_kind(kind, now) {
        entity.insert(attack);
    }
    if kind == EnemyKind::MageBoss {
        entity.insert(MageBoss::new(now));
    }

    entity.id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in EnemyKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_normal_kinds_exclude_bosses() {
        assert!(EnemyKind::NORMAL.iter().all(|k| !k.is_boss()));
        assert!(EnemyKind::SpiderBoss.is_boss());
        assert_eq!(BossKind::Mage.enemy_kind(), EnemyKind::MageBoss);
    }
}
