//! Splitting boss ("spider")
//!
//! A large spider splits into two medium spiders on death, each of which
//! splits into two small ones. Small spiders leave nothing behind. A lineage
//! therefore never exceeds seven bodies.
//!
//! Children are spawned during the parent's death resolution, before the
//! parent is despawned, so the live count never drops to zero mid-split. The
//! phase is told about the defeat by a lineage check scheduled 0.1 s after
//! each death, once the roster reflects the new children.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{EnemyKind, MovementPattern};
use crate::states::play_run::components::{Arena, CombatEntity, Enemy, GameRng, Hitbox, WaveEntity};
use crate::states::play_run::constants::*;
use crate::states::play_run::enemy_config::EnemyDefinitions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossTier {
    Large,
    Medium,
    Small,
}

impl BossTier {
    pub const ALL: [BossTier; 3] = [BossTier::Large, BossTier::Medium, BossTier::Small];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The tier spawned when this one dies.
    pub fn child(self) -> Option<BossTier> {
        match self {
            BossTier::Large => Some(BossTier::Medium),
            BossTier::Medium => Some(BossTier::Small),
            BossTier::Small => None,
        }
    }
}

/// Marks a spider body and its tier.
#[derive(Component, Debug, Clone, Copy)]
pub struct SplittingBoss {
    pub tier: BossTier,
}

/// Children a dying tier leaves behind: exactly two of the next tier, or none.
pub type SplitChildren = SmallVec<[(BossTier, Vec2); 2]>;

/// Where the children of a dying spider appear.
pub fn split_children(tier: BossTier, position: Vec2, arena: &Arena, rng: &mut GameRng) -> SplitChildren {
    let mut children = SplitChildren::new();
    let Some(child) = tier.child() else {
        return children;
    };
    let bounds = arena.inset(SPLIT_SPAWN_INSET);
    for _ in 0..2 {
        let offset = Vec2::new(
            rng.random_range(-SPLIT_SPAWN_OFFSET, SPLIT_SPAWN_OFFSET),
            rng.random_range(-SPLIT_SPAWN_OFFSET, SPLIT_SPAWN_OFFSET),
        );
        children.push((child, bounds.clamp_point(position + offset)));
    }
    children
}

/// Spawn one spider body. `phase` scales the body like any phase spawn; split
/// children pass `None` and keep their tier's base stats.
pub fn spawn_tier(
    commands: &mut Commands,
    defs: &EnemyDefinitions,
    rng: &mut GameRng,
    tier: BossTier,
    position: Vec2,
    now: f32,
    phase: Option<u32>,
) -> Entity {
    let base = defs.stats(EnemyKind::SpiderBoss);
    let tier_stats = defs.tier(tier);

    let mut combat = CombatEntity::new(tier_stats.max_health, base.damage, base.invincibility);
    if let Some(phase) = phase {
        combat.apply_phase_buff(phase);
    }

    commands
        .spawn((
            WaveEntity,
            Enemy {
                kind: EnemyKind::SpiderBoss,
                speed: tier_stats.speed,
            },
            SplittingBoss { tier },
            combat,
            Hitbox::new(tier_stats.size, tier_stats.size),
            Transform::from_xyz(position.x, position.y, 0.0),
            MovementPattern::for_kind(EnemyKind::SpiderBoss, now, rng),
        ))
        .id()
}

/// Live spider bodies among `bodies`.
pub fn live_lineage<'a>(bodies: impl IntoIterator<Item = &'a CombatEntity>) -> usize {
    bodies.into_iter().filter(|c| c.is_alive()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_chain_terminates() {
        assert_eq!(BossTier::Large.child(), Some(BossTier::Medium));
        assert_eq!(BossTier::Medium.child(), Some(BossTier::Small));
        assert_eq!(BossTier::Small.child(), None);
    }

    #[test]
    fn test_full_lineage_is_seven_bodies() {
        let arena = Arena::default();
        let mut rng = GameRng::from_seed(21);
        let mut queue = vec![(BossTier::Large, arena.center())];
        let mut bodies = 0;
        while let Some((tier, pos)) = queue.pop() {
            bodies += 1;
            let children = split_children(tier, pos, &arena, &mut rng);
            assert!(children.len() == 0 || children.len() == 2);
            queue.extend(children);
        }
        assert_eq!(bodies, 7);
    }

    #[test]
    fn test_children_stay_inside_inset_bounds() {
        let arena = Arena::default();
        let mut rng = GameRng::from_seed(8);
        let inner = arena.inset(SPLIT_SPAWN_INSET);
        for _ in 0..50 {
            for (_, pos) in split_children(BossTier::Large, Vec2::new(5.0, 5.0), &arena, &mut rng) {
                assert!(inner.contains(pos), "{:?} escaped", pos);
            }
        }
    }

    #[test]
    fn test_live_lineage_ignores_dying_bodies() {
        let alive = CombatEntity::new(750.0, 150.0, 0.3);
        let mut dying = CombatEntity::new(750.0, 150.0, 0.3);
        dying.take_damage(1000.0, 0.0);
        assert_eq!(live_lineage([&alive, &dying]), 1);
    }
}
