//! Ranged attack patterns for the plant, stone and tornado shooters.

use bevy::prelude::*;

use super::{EnemyKind, MovementPattern};
use crate::states::play_run::components::{CombatEntity, Enemy, GameRng, Player};
use crate::states::play_run::constants::*;
use crate::states::play_run::projectiles::{aim_direction, spawn_projectile, Projectile, ProjectileMotion};

/// What a ranged enemy fires when its timer elapses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackPattern {
    /// One straight shot aimed at the player.
    AimedShot { speed: f32 },
    /// `count` bouncing shots at random angles. Fires only while paused.
    RandomSpray { count: u32, speed: f32, max_bounces: u32 },
    /// One homing shot with a lifetime.
    HomingShot { speed: f32, ttl: f32, hit_radius: f32 },
}

/// Attack timer and pattern for a ranged enemy.
#[derive(Component, Debug, Clone)]
pub struct RangedAttack {
    pub pattern: AttackPattern,
    pub interval: f32,
    pub next_attack_at: f32,
}

impl RangedAttack {
    /// Ranged attack for `kind`, first shot one interval after `now`.
    pub fn for_kind(kind: EnemyKind, now: f32) -> Option<Self> {
        let (pattern, interval) = match kind {
            EnemyKind::PlantShooter => (
                AttackPattern::AimedShot {
                    speed: PLANT_PROJECTILE_SPEED,
                },
                PLANT_SHOT_INTERVAL,
            ),
            EnemyKind::StoneShooter => (
                AttackPattern::RandomSpray {
                    count: STONE_PROJECTILE_COUNT,
                    speed: STONE_PROJECTILE_SPEED,
                    max_bounces: STONE_MAX_BOUNCES,
                },
                STONE_SHOT_INTERVAL,
            ),
            EnemyKind::TornadoShooter => (
                AttackPattern::HomingShot {
                    speed: TORNADO_PROJECTILE_SPEED,
                    ttl: TORNADO_PROJECTILE_TTL,
                    hit_radius: TORNADO_HIT_RADIUS,
                },
                TORNADO_SHOT_INTERVAL,
            ),
            _ => return None,
        };
        Some(Self {
            pattern,
            interval,
            next_attack_at: now + interval,
        })
    }

    /// Whether the attack may fire at `now` given the owner's movement state.
    pub fn ready(&self, now: f32, movement: Option<&MovementPattern>) -> bool {
        if now < self.next_attack_at {
            return false;
        }
        match self.pattern {
            AttackPattern::RandomSpray { .. } => movement.map(|m| m.is_paused()).unwrap_or(true),
            _ => true,
        }
    }

    /// Build the projectiles of one volley from `origin`.
    pub fn volley(
        &self,
        owner: Entity,
        owner_kind: EnemyKind,
        damage: f32,
        origin: Vec2,
        player: Vec2,
        now: f32,
        rng: &mut GameRng,
    ) -> Vec<Projectile> {
        let base = Projectile {
            owner,
            owner_kind,
            velocity: Vec2::ZERO,
            motion: ProjectileMotion::Straight,
            damage,
            hit_radius: PROJECTILE_HIT_RADIUS,
            expires_at: None,
        };
        match self.pattern {
            AttackPattern::AimedShot { speed } => vec![Projectile {
                velocity: aim_direction(origin, player) * speed,
                ..base
            }],
            AttackPattern::RandomSpray {
                count,
                speed,
                max_bounces,
            } => (0..count)
                .map(|_| Projectile {
                    velocity: rng.unit_direction() * speed,
                    motion: ProjectileMotion::Bouncing {
                        bounces: 0,
                        max_bounces,
                    },
                    ..base.clone()
                })
                .collect(),
            AttackPattern::HomingShot { speed, ttl, hit_radius } => vec![Projectile {
                velocity: aim_direction(origin, player) * speed,
                motion: ProjectileMotion::Homing { speed },
                hit_radius,
                expires_at: Some(now + ttl),
                ..base
            }],
        }
    }
}

/// Fire every ranged enemy whose timer has elapsed. Runs only while enemies are active.
pub fn fire_ranged_attacks(
    mut commands: Commands,
    time: Res<Time>,
    mut rng: ResMut<GameRng>,
    player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut shooters: Query<(Entity, &Transform, &Enemy, &CombatEntity, &mut RangedAttack, Option<&MovementPattern>)>,
) {
    let Ok(player_transform) = player.get_single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let now = time.elapsed_secs();

    for (entity, transform, enemy, combat, mut attack, movement) in shooters.iter_mut() {
        if !combat.is_alive() || !attack.ready(now, movement) {
            continue;
        }
        attack.next_attack_at = now + attack.interval;

        let origin = transform.translation.truncate();
        for projectile in attack.volley(entity, enemy.kind, combat.damage, origin, player_pos, now, &mut rng) {
            spawn_projectile(&mut commands, origin, projectile);
        }
    }
}
