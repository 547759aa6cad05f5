//! Enemy locomotion patterns.

use bevy::prelude::*;

use super::EnemyKind;
use crate::states::play_run::components::{
    blocked_by_obstacle, Arena, CombatEntity, Enemy, GameRng, Hitbox, Obstacle, Player,
};
use crate::states::play_run::constants::*;

/// How an enemy moves. The mage boss moves through its own behaviour system
/// and uses `Scripted`.
#[derive(Component, Debug, Clone, PartialEq)]
pub enum MovementPattern {
    /// Walk straight at the player, refusing steps that touch an obstacle.
    Chase,
    /// Walk in a grid direction that changes every `turn_interval`.
    Roam {
        direction: Vec2,
        next_turn_at: f32,
        turn_interval: f32,
    },
    Stationary,
    /// Alternate a moving stretch in a random direction with a pause.
    MovePause {
        direction: Vec2,
        moving: bool,
        toggle_at: f32,
        move_secs: f32,
        pause_secs: f32,
    },
    /// Random walk that reverses an axis before crossing an inner wall.
    Bounce {
        direction: Vec2,
        next_turn_at: f32,
        turn_interval: f32,
        margin: f32,
    },
    Scripted,
}

impl MovementPattern {
    pub fn for_kind(kind: EnemyKind, now: f32, rng: &mut GameRng) -> Self {
        match kind {
            EnemyKind::Melee => MovementPattern::Chase,
            EnemyKind::Animal => MovementPattern::Roam {
                direction: rng.grid_direction(),
                next_turn_at: now + ROAM_TURN_INTERVAL,
                turn_interval: ROAM_TURN_INTERVAL,
            },
            EnemyKind::PlantShooter => MovementPattern::Stationary,
            EnemyKind::StoneShooter => MovementPattern::move_pause(now, STONE_MOVE_SECS, STONE_PAUSE_SECS, rng),
            EnemyKind::TornadoShooter => {
                MovementPattern::move_pause(now, TORNADO_MOVE_SECS, TORNADO_PAUSE_SECS, rng)
            }
            EnemyKind::SpiderBoss => MovementPattern::Bounce {
                direction: rng.grid_direction(),
                next_turn_at: now + SPIDER_TURN_INTERVAL,
                turn_interval: SPIDER_TURN_INTERVAL,
                margin: SPIDER_BOUNCE_MARGIN,
            },
            EnemyKind::MageBoss => MovementPattern::Scripted,
        }
    }

    fn move_pause(now: f32, move_secs: f32, pause_secs: f32, rng: &mut GameRng) -> Self {
        MovementPattern::MovePause {
            direction: rng.unit_direction(),
            moving: true,
            toggle_at: now + move_secs,
            move_secs,
            pause_secs,
        }
    }

    /// True while a move/pause walker is standing still.
    pub fn is_paused(&self) -> bool {
        matches!(self, MovementPattern::MovePause { moving: false, .. })
    }

    /// Advance timers and return the position this pattern wants next.
    ///
    /// Obstacle and bounds handling is left to the caller except for `Bounce`,
    /// which needs the arena to decide its reflection.
    pub fn next_position(
        &mut self,
        position: Vec2,
        player: Vec2,
        speed: f32,
        dt: f32,
        now: f32,
        arena: &Arena,
        rng: &mut GameRng,
    ) -> Vec2 {
        let step = speed * dt;
        match self {
            MovementPattern::Chase => {
                let to_player = player - position;
                if to_player.length() > 1.0 {
                    position + to_player.normalize() * step
                } else {
                    position
                }
            }
            MovementPattern::Roam {
                direction,
                next_turn_at,
                turn_interval,
            } => {
                if now >= *next_turn_at {
                    *direction = rng.grid_direction();
                    *next_turn_at = now + *turn_interval;
                }
                position + *direction * step
            }
            MovementPattern::Stationary | MovementPattern::Scripted => position,
            MovementPattern::MovePause {
                direction,
                moving,
                toggle_at,
                move_secs,
                pause_secs,
            } => {
                if now >= *toggle_at {
                    *moving = !*moving;
                    if *moving {
                        *direction = rng.unit_direction();
                        *toggle_at = now + *move_secs;
                    } else {
                        *toggle_at = now + *pause_secs;
                    }
                }
                if *moving {
                    position + *direction * step
                } else {
                    position
                }
            }
            MovementPattern::Bounce {
                direction,
                next_turn_at,
                turn_interval,
                margin,
            } => {
                if now >= *next_turn_at {
                    *direction = rng.grid_direction();
                    *next_turn_at = now + *turn_interval;
                }
                let inner = arena.inset(*margin);
                let probe = position + *direction * step;
                if probe.x < inner.min.x || probe.x > inner.max.x {
                    direction.x = -direction.x;
                }
                if probe.y < inner.min.y || probe.y > inner.max.y {
                    direction.y = -direction.y;
                }
                position + *direction * step
            }
        }
    }

    /// Whether this pattern refuses steps into obstacles.
    fn respects_obstacles(&self) -> bool {
        matches!(self, MovementPattern::Chase | MovementPattern::Roam { .. })
    }
}

/// Move every live enemy according to its pattern. Runs only while enemies are active.
pub fn move_enemies(
    time: Res<Time>,
    arena: Res<Arena>,
    mut rng: ResMut<GameRng>,
    player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    obstacles: Query<&Transform, (With<Obstacle>, Without<Enemy>, Without<Player>)>,
    mut enemies: Query<(&mut Transform, &mut MovementPattern, &Enemy, &CombatEntity, &Hitbox), Without<Player>>,
) {
    let Ok(player_transform) = player.get_single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let obstacle_positions: Vec<Vec2> = obstacles.iter().map(|t| t.translation.truncate()).collect();
    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    for (mut transform, mut pattern, enemy, combat, hitbox) in enemies.iter_mut() {
        if !combat.is_alive() {
            continue;
        }
        let position = transform.translation.truncate();
        let next = pattern.next_position(position, player_pos, enemy.speed, dt, now, &arena, &mut rng);
        if next == position {
            continue;
        }
        if pattern.respects_obstacles()
            && blocked_by_obstacle(next, obstacle_positions.iter().copied(), OBSTACLE_BLOCK_RADIUS)
        {
            continue;
        }
        let clamped = arena.clamp_box(next, hitbox.half_extents);
        transform.translation.x = clamped.x;
        transform.translation.y = clamped.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chase_steps_toward_player() {
        let arena = Arena::default();
        let mut rng = GameRng::from_seed(1);
        let mut pattern = MovementPattern::Chase;
        let next = pattern.next_position(
            Vec2::new(100.0, 100.0),
            Vec2::new(200.0, 100.0),
            48.0,
            0.5,
            0.0,
            &arena,
            &mut rng,
        );
        assert_eq!(next, Vec2::new(124.0, 100.0));
    }

    #[test]
    fn test_move_pause_alternates() {
        let arena = Arena::default();
        let mut rng = GameRng::from_seed(3);
        let mut pattern = MovementPattern::for_kind(EnemyKind::StoneShooter, 0.0, &mut rng);
        assert!(!pattern.is_paused());

        let start = Vec2::new(200.0, 200.0);
        pattern.next_position(start, Vec2::ZERO, 72.0, 0.1, 1.0, &arena, &mut rng);
        assert!(pattern.is_paused());
        let held = pattern.next_position(start, Vec2::ZERO, 72.0, 0.1, 1.5, &arena, &mut rng);
        assert_eq!(held, start);

        pattern.next_position(start, Vec2::ZERO, 72.0, 0.1, 2.5, &arena, &mut rng);
        assert!(!pattern.is_paused());
    }

    #[test]
    fn test_bounce_reverses_at_inner_wall() {
        let arena = Arena::default();
        let mut rng = GameRng::from_seed(5);
        let mut pattern = MovementPattern::Bounce {
            direction: Vec2::new(-1.0, 0.0),
            next_turn_at: 100.0,
            turn_interval: SPIDER_TURN_INTERVAL,
            margin: SPIDER_BOUNCE_MARGIN,
        };
        let next = pattern.next_position(Vec2::new(41.0, 200.0), Vec2::ZERO, 60.0, 0.1, 0.0, &arena, &mut rng);
        assert!(next.x > 41.0, "should have bounced, got {:?}", next);
    }

    #[test]
    fn test_stationary_never_moves() {
        let arena = Arena::default();
        let mut rng = GameRng::from_seed(5);
        let mut pattern = MovementPattern::for_kind(EnemyKind::PlantShooter, 0.0, &mut rng);
        let pos = Vec2::new(10.0, 10.0);
        assert_eq!(pattern.next_position(pos, Vec2::ZERO, 100.0, 1.0, 0.0, &arena, &mut rng), pos);
    }
}
