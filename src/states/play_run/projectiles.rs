//! Projectile Systems
//!
//! Hostile projectiles fired by ranged enemies and the player's arrows.
//!
//! A hostile projectile belongs to the enemy that fired it through a weak
//! `owner` reference: when the owner is gone or dead the projectile is
//! despawned on the next tick. Every projectile is despawned in the same step
//! in which it hits, is blocked, leaves the arena, exhausts its bounces or
//! expires, so a projectile can damage at most once.

use bevy::prelude::*;

use crate::combat::events::{DamageDealt, DamageSource, DamageTarget, PresentationCue};
use super::components::*;
use super::constants::*;
use super::enemies::{EnemyKind, SplittingBoss};

/// How a hostile projectile travels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileMotion {
    Straight,
    /// Reflects off arena walls until `max_bounces` is spent.
    Bouncing { bounces: u32, max_bounces: u32 },
    /// Re-aims at the player every tick.
    Homing { speed: f32 },
}

/// A projectile fired by an enemy.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    pub owner: Entity,
    pub owner_kind: EnemyKind,
    pub velocity: Vec2,
    pub motion: ProjectileMotion,
    pub damage: f32,
    pub hit_radius: f32,
    /// Run-clock expiry, for projectiles with a lifetime.
    pub expires_at: Option<f32>,
}

/// An arrow fired by the player at a specific enemy.
#[derive(Component, Debug, Clone)]
pub struct Arrow {
    pub target: Entity,
    pub velocity: Vec2,
    pub damage: f32,
}

/// What happened to a projectile during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileFate {
    Flying,
    HitPlayer,
    Blocked,
    OutOfBounds,
    BouncesExhausted,
    Expired,
}

impl ProjectileFate {
    pub fn despawns(self) -> bool {
        !matches!(self, ProjectileFate::Flying)
    }
}

/// Unit vector from `from` toward `to`, straight down when the points coincide.
pub fn aim_direction(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    if delta.length_squared() <= f32::EPSILON || !delta.is_finite() {
        Vec2::Y
    } else {
        delta.normalize()
    }
}

impl Projectile {
    /// Advance one step of `dt` seconds and report the outcome.
    pub fn step(
        &mut self,
        position: &mut Vec2,
        dt: f32,
        now: f32,
        player: Vec2,
        arena: &Arena,
        obstacles: &[Vec2],
    ) -> ProjectileFate {
        if let Some(expires_at) = self.expires_at {
            if now >= expires_at {
                return ProjectileFate::Expired;
            }
        }

        if let ProjectileMotion::Homing { speed } = self.motion {
            self.velocity = aim_direction(*position, player) * speed;
        }
        *position += self.velocity * dt;

        match &mut self.motion {
            ProjectileMotion::Bouncing { bounces, max_bounces } => {
                let outside_x = position.x < arena.min.x || position.x > arena.max.x;
                let outside_y = position.y < arena.min.y || position.y > arena.max.y;
                if outside_x || outside_y {
                    if *bounces >= *max_bounces {
                        return ProjectileFate::BouncesExhausted;
                    }
                    if outside_x {
                        self.velocity.x = -self.velocity.x;
                    }
                    if outside_y {
                        self.velocity.y = -self.velocity.y;
                    }
                    *position = arena.clamp_point(*position);
                    *bounces += 1;
                }
            }
            ProjectileMotion::Homing { .. } => {
                if !arena.inset(-HOMING_OUT_OF_BOUNDS_SLACK).contains(*position) {
                    return ProjectileFate::OutOfBounds;
                }
            }
            ProjectileMotion::Straight => {
                if !arena.contains(*position) {
                    return ProjectileFate::OutOfBounds;
                }
            }
        }

        if blocked_by_obstacle(*position, obstacles.iter().copied(), OBSTACLE_BLOCK_RADIUS) {
            return ProjectileFate::Blocked;
        }
        if position.distance(player) < self.hit_radius {
            return ProjectileFate::HitPlayer;
        }
        ProjectileFate::Flying
    }
}

/// Spawn a hostile projectile owned by `owner`.
pub fn spawn_projectile(commands: &mut Commands, position: Vec2, projectile: Projectile) -> Entity {
    commands
        .spawn((
            WaveEntity,
            Transform::from_xyz(position.x, position.y, 1.0),
            projectile,
        ))
        .id()
}

/// Spawn an arrow from `from` aimed at `target_position`.
pub fn spawn_arrow(commands: &mut Commands, from: Vec2, target: Entity, target_position: Vec2, damage: f32) -> Entity {
    commands
        .spawn((
            WaveEntity,
            Transform::from_xyz(from.x, from.y, 1.0),
            Arrow {
                target,
                velocity: aim_direction(from, target_position) * ARROW_SPEED,
                damage,
            },
        ))
        .id()
}

/// Advance hostile projectiles: owner check, motion, bounds, obstacles, player hit.
pub fn move_hostile_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    arena: Res<Arena>,
    mut projectiles: Query<(Entity, &mut Transform, &mut Projectile), (Without<Player>, Without<Obstacle>)>,
    owners: Query<&CombatEntity, (With<Enemy>, Without<Player>)>,
    obstacles: Query<&Transform, (With<Obstacle>, Without<Projectile>)>,
    mut player: Query<(Entity, &Transform, &mut CombatEntity), (With<Player>, Without<Enemy>)>,
    mut damage_events: EventWriter<DamageDealt>,
    mut cues: EventWriter<PresentationCue>,
) {
    let Ok((player_entity, player_transform, mut player_combat)) = player.get_single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let obstacle_positions: Vec<Vec2> = obstacles.iter().map(|t| t.translation.truncate()).collect();
    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    for (entity, mut transform, mut projectile) in projectiles.iter_mut() {
        let owner_alive = owners.get(projectile.owner).map(|c| c.is_alive()).unwrap_or(false);
        if !owner_alive {
            commands.entity(entity).despawn();
            continue;
        }

        let mut position = transform.translation.truncate();
        let fate = projectile.step(&mut position, dt, now, player_pos, &arena, &obstacle_positions);
        transform.translation.x = position.x;
        transform.translation.y = position.y;

        if fate == ProjectileFate::HitPlayer {
            let outcome = player_combat.take_damage(projectile.damage, now);
            if outcome.landed() {
                damage_events.send(DamageDealt {
                    source: DamageSource::EnemyProjectile(projectile.owner_kind),
                    target: DamageTarget::Player,
                    amount: projectile.damage,
                    outcome,
                });
                cues.send(PresentationCue::Hit {
                    entity: player_entity,
                    amount: projectile.damage,
                    health_fraction: player_combat.health_fraction(),
                });
            }
        }
        if fate.despawns() {
            commands.entity(entity).despawn();
        }
    }
}

/// Advance arrows and resolve hits against their own target.
///
/// An arrow whose target already died keeps flying until it leaves the arena
/// or meets an obstacle.
pub fn move_arrows(
    mut commands: Commands,
    time: Res<Time>,
    arena: Res<Arena>,
    mut arrows: Query<(Entity, &mut Transform, &Arrow), (Without<Enemy>, Without<Obstacle>)>,
    mut targets: Query<(&Transform, &mut CombatEntity, &Enemy, Option<&SplittingBoss>), Without<Arrow>>,
    obstacles: Query<&Transform, (With<Obstacle>, Without<Arrow>, Without<Enemy>)>,
    mut damage_events: EventWriter<DamageDealt>,
    mut cues: EventWriter<PresentationCue>,
) {
    let obstacle_positions: Vec<Vec2> = obstacles.iter().map(|t| t.translation.truncate()).collect();
    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    for (entity, mut transform, arrow) in arrows.iter_mut() {
        transform.translation.x += arrow.velocity.x * dt;
        transform.translation.y += arrow.velocity.y * dt;
        let position = transform.translation.truncate();

        if let Ok((target_transform, mut combat, enemy, splitting)) = targets.get_mut(arrow.target) {
            if combat.is_alive() && position.distance(target_transform.translation.truncate()) < ARROW_HIT_RADIUS {
                let outcome = combat.take_damage(arrow.damage, now);
                if outcome.landed() {
                    damage_events.send(DamageDealt {
                        source: DamageSource::PlayerArrow,
                        target: DamageTarget::Enemy(enemy.kind),
                        amount: arrow.damage,
                        outcome,
                    });
                    cues.send(PresentationCue::Hit {
                        entity: arrow.target,
                        amount: arrow.damage,
                        health_fraction: combat.health_fraction(),
                    });
                    if splitting.is_some() {
                        cues.send(PresentationCue::Flash { entity: arrow.target });
                    }
                }
                commands.entity(entity).despawn();
                continue;
            }
        }

        if blocked_by_obstacle(position, obstacle_positions.iter().copied(), OBSTACLE_BLOCK_RADIUS)
            || !arena.contains(position)
        {
            commands.entity(entity).despawn();
        }
    }
}
