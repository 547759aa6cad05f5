//! Teleporting mage boss
//!
//! Three independent timers drive the mage: reposition (walk to a point away
//! from the player), teleport (fade out, relocate, fade in, frozen meanwhile)
//! and attack (place warning circles that detonate after a fuse). Dropping to
//! 30% health puts it into fury once: shorter attack interval and multi-circle
//! volleys whose extra circles are placed through the delayed-action queue.
//!
//! On death every pending circle is despawned and queued placements are
//! cancelled (see `combat_core::resolve_deaths`).

use bevy::prelude::*;

use crate::combat::events::{DamageDealt, DamageSource, DamageTarget, PresentationCue};
use crate::combat::log::{RunLog, RunLogEventType};
use crate::states::play_run::components::{Arena, CombatEntity, Enemy, GameRng, Player, WaveEntity};
use crate::states::play_run::constants::*;
use crate::states::play_run::scheduler::{DelayedAction, DelayedActions, TimerFired};

/// Teleport cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeleportState {
    Ready,
    FadingOut { relocate_at: f32 },
    FadingIn { done_at: f32 },
}

/// Mage behaviour state.
#[derive(Component, Debug, Clone)]
pub struct MageBoss {
    pub fury: bool,
    pub attack_interval: f32,
    pub next_attack_at: f32,
    pub next_reposition_at: f32,
    pub move_target: Option<Vec2>,
    pub next_teleport_at: f32,
    pub teleport: TeleportState,
}

impl MageBoss {
    pub fn new(now: f32) -> Self {
        Self {
            fury: false,
            attack_interval: MAGE_ATTACK_INTERVAL,
            next_attack_at: now + MAGE_ATTACK_INTERVAL,
            next_reposition_at: now,
            move_target: None,
            next_teleport_at: now + MAGE_TELEPORT_INTERVAL,
            teleport: TeleportState::Ready,
        }
    }

    /// Enter fury if health has dropped to the threshold. Returns true only on
    /// the call that made the transition.
    pub fn check_fury(&mut self, combat: &CombatEntity) -> bool {
        if self.fury || combat.health > combat.max_health * MAGE_FURY_THRESHOLD {
            return false;
        }
        self.fury = true;
        self.attack_interval = MAGE_FURY_ATTACK_INTERVAL;
        true
    }

    /// Movement and attacks are suspended during either fade.
    pub fn is_frozen(&self) -> bool {
        !matches!(self.teleport, TeleportState::Ready)
    }
}

/// A pending blast. Damages the player only if inside `radius` at detonation.
#[derive(Component, Debug, Clone)]
pub struct WarningCircle {
    pub owner: Entity,
    pub radius: f32,
    pub detonate_at: f32,
    pub damage: f32,
}

/// Random point in the movement area at least the minimum distance from the
/// player. Falls back to the corner farthest from the player.
pub fn pick_reposition_target(arena: &Arena, player: Vec2, rng: &mut GameRng) -> Vec2 {
    let area = arena.inset(MAGE_MOVE_INSET);
    for _ in 0..PLACEMENT_ATTEMPTS {
        let candidate = area.random_point(rng);
        if candidate.distance(player) >= MAGE_REPOSITION_MIN_PLAYER_DISTANCE {
            return candidate;
        }
    }
    [
        area.min,
        area.max,
        Vec2::new(area.min.x, area.max.y),
        Vec2::new(area.max.x, area.min.y),
    ]
    .into_iter()
    .max_by(|a, b| a.distance(player).total_cmp(&b.distance(player)))
    .unwrap_or(area.min)
}

/// Where the next warning circle goes: usually near the player, sometimes anywhere.
pub fn pick_blast_position(arena: &Arena, player: Vec2, rng: &mut GameRng) -> Vec2 {
    let area = arena.inset(BLAST_PLACEMENT_INSET);
    let position = if rng.chance(BLAST_NEAR_PLAYER_CHANCE) {
        player
            + Vec2::new(
                rng.random_range(-BLAST_NEAR_PLAYER_OFFSET, BLAST_NEAR_PLAYER_OFFSET),
                rng.random_range(-BLAST_NEAR_PLAYER_OFFSET, BLAST_NEAR_PLAYER_OFFSET),
            )
    } else {
        area.random_point(rng)
    };
    area.clamp_point(position)
}

fn spawn_warning_circle(
    commands: &mut Commands,
    cues: &mut EventWriter<PresentationCue>,
    owner: Entity,
    damage: f32,
    position: Vec2,
    now: f32,
) {
    commands.spawn((
        WaveEntity,
        Transform::from_xyz(position.x, position.y, 0.5),
        WarningCircle {
            owner,
            radius: BLAST_RADIUS,
            detonate_at: now + BLAST_FUSE_SECS,
            damage,
        },
    ));
    cues.send(PresentationCue::WarningPlaced {
        position,
        radius: BLAST_RADIUS,
    });
}

/// Fury check, teleport cycle, reposition walk and attack timer for each live mage.
pub fn mage_boss_behavior(
    mut commands: Commands,
    time: Res<Time>,
    arena: Res<Arena>,
    mut rng: ResMut<GameRng>,
    mut scheduler: ResMut<DelayedActions>,
    mut run_log: ResMut<RunLog>,
    mut cues: EventWriter<PresentationCue>,
    player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut mages: Query<(Entity, &mut Transform, &mut MageBoss, &CombatEntity, &Enemy), Without<Player>>,
) {
    let Ok(player_transform) = player.get_single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let now = time.elapsed_secs();
    let dt = time.delta_secs();

    for (entity, mut transform, mut mage, combat, enemy) in mages.iter_mut() {
        if !combat.is_alive() {
            continue;
        }

        if mage.check_fury(combat) {
            info!("Mage boss enters fury at {:.0} health", combat.health);
            run_log.log(
                RunLogEventType::BossEvent,
                format!("Mage boss enters fury at {:.0} health", combat.health),
            );
        }

        match mage.teleport {
            TeleportState::Ready if now >= mage.next_teleport_at => {
                mage.teleport = TeleportState::FadingOut {
                    relocate_at: now + MAGE_FADE_SECS,
                };
                cues.send(PresentationCue::FadeOut { entity });
                continue;
            }
            TeleportState::Ready => {}
            TeleportState::FadingOut { relocate_at } => {
                if now >= relocate_at {
                    let destination = arena.inset(MAGE_MOVE_INSET).random_point(&mut rng);
                    transform.translation.x = destination.x;
                    transform.translation.y = destination.y;
                    mage.move_target = None;
                    run_log.log(
                        RunLogEventType::BossEvent,
                        format!("Mage boss teleports to ({:.0}, {:.0})", destination.x, destination.y),
                    );
                    mage.teleport = TeleportState::FadingIn {
                        done_at: now + MAGE_FADE_SECS,
                    };
                    cues.send(PresentationCue::FadeIn { entity });
                }
                continue;
            }
            TeleportState::FadingIn { done_at } => {
                if now >= done_at {
                    mage.teleport = TeleportState::Ready;
                    mage.next_teleport_at = now + MAGE_TELEPORT_INTERVAL;
                } else {
                    continue;
                }
            }
        }

        if now >= mage.next_reposition_at {
            mage.move_target = Some(pick_reposition_target(&arena, player_pos, &mut rng));
            mage.next_reposition_at = now + MAGE_REPOSITION_INTERVAL;
        }

        if let Some(target) = mage.move_target {
            let position = transform.translation.truncate();
            let to_target = target - position;
            if to_target.length() <= MAGE_ARRIVAL_TOLERANCE {
                mage.move_target = None;
            } else {
                let step = (enemy.speed * dt).min(to_target.length());
                let next = position + to_target.normalize() * step;
                transform.translation.x = next.x;
                transform.translation.y = next.y;
            }
        }

        if now >= mage.next_attack_at {
            mage.next_attack_at = now + mage.attack_interval;
            let position = pick_blast_position(&arena, player_pos, &mut rng);
            spawn_warning_circle(&mut commands, &mut cues, entity, combat.damage, position, now);

            if mage.fury {
                let count = rng.random_u32_inclusive(MAGE_FURY_CIRCLES_MIN, MAGE_FURY_CIRCLES_MAX);
                for i in 1..count {
                    scheduler.schedule(
                        now,
                        MAGE_FURY_CIRCLE_STAGGER * i as f32,
                        DelayedAction::PlaceWarningCircle { owner: entity },
                    );
                }
            }
        }
    }
}

/// Place the staggered circles of a fury volley. Stale owners are ignored.
pub fn place_scheduled_circles(
    mut commands: Commands,
    time: Res<Time>,
    arena: Res<Arena>,
    mut rng: ResMut<GameRng>,
    mut fired: EventReader<TimerFired>,
    mut cues: EventWriter<PresentationCue>,
    player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mages: Query<(&CombatEntity, &MageBoss)>,
) {
    let Ok(player_transform) = player.get_single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let now = time.elapsed_secs();

    for TimerFired(action) in fired.read() {
        let DelayedAction::PlaceWarningCircle { owner } = *action else {
            continue;
        };
        let Ok((combat, mage)) = mages.get(owner) else {
            continue;
        };
        if !combat.is_alive() || mage.is_frozen() {
            continue;
        }
        let position = pick_blast_position(&arena, player_pos, &mut rng);
        spawn_warning_circle(&mut commands, &mut cues, owner, combat.damage, position, now);
    }
}

/// Detonate circles whose fuse has run out.
pub fn detonate_warning_circles(
    mut commands: Commands,
    time: Res<Time>,
    circles: Query<(Entity, &Transform, &WarningCircle)>,
    mut player: Query<(Entity, &Transform, &mut CombatEntity), With<Player>>,
    mut damage_events: EventWriter<DamageDealt>,
    mut cues: EventWriter<PresentationCue>,
) {
    let Ok((player_entity, player_transform, mut player_combat)) = player.get_single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let now = time.elapsed_secs();

    for (entity, transform, circle) in circles.iter() {
        if now < circle.detonate_at {
            continue;
        }
        let position = transform.translation.truncate();
        let hit = position.distance(player_pos) <= circle.radius;
        if hit {
            let outcome = player_combat.take_damage(circle.damage, now);
            if outcome.landed() {
                damage_events.send(DamageDealt {
                    source: DamageSource::Blast,
                    target: DamageTarget::Player,
                    amount: circle.damage,
                    outcome,
                });
                cues.send(PresentationCue::Hit {
                    entity: player_entity,
                    amount: circle.damage,
                    health_fraction: player_combat.health_fraction(),
                });
            }
        }
        cues.send(PresentationCue::WarningDetonated { position, hit });
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fury_triggers_once_at_threshold() {
        let mut mage = MageBoss::new(0.0);
        let mut combat = CombatEntity::new(12500.0, 350.0, 0.3);

        combat.health = 3751.0;
        assert!(!mage.check_fury(&combat));

        combat.health = 3750.0;
        assert!(mage.check_fury(&combat));
        assert_eq!(mage.attack_interval, MAGE_FURY_ATTACK_INTERVAL);

        combat.health = 100.0;
        assert!(!mage.check_fury(&combat));
        assert_eq!(mage.attack_interval, MAGE_FURY_ATTACK_INTERVAL, "interval never re-halves");
    }

    #[test]
    fn test_reposition_keeps_distance_from_player() {
        let arena = Arena::default();
        let mut rng = GameRng::from_seed(31);
        let player = arena.center();
        for _ in 0..50 {
            let target = pick_reposition_target(&arena, player, &mut rng);
            assert!(target.distance(player) >= MAGE_REPOSITION_MIN_PLAYER_DISTANCE);
            assert!(arena.inset(MAGE_MOVE_INSET).contains(target));
        }
    }

    #[test]
    fn test_blast_positions_are_clamped() {
        let arena = Arena::default();
        let mut rng = GameRng::from_seed(2);
        let area = arena.inset(BLAST_PLACEMENT_INSET);
        for _ in 0..100 {
            let pos = pick_blast_position(&arena, Vec2::new(0.0, 0.0), &mut rng);
            assert!(area.contains(pos), "{:?} outside placement area", pos);
        }
    }

    #[test]
    fn test_frozen_only_while_fading() {
        let mut mage = MageBoss::new(0.0);
        assert!(!mage.is_frozen());
        mage.teleport = TeleportState::FadingOut { relocate_at: 1.0 };
        assert!(mage.is_frozen());
        mage.teleport = TeleportState::FadingIn { done_at: 1.0 };
        assert!(mage.is_frozen());
    }
}
