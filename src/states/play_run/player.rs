//! Player Controller
//!
//! Movement from the polled `ControlIntent`, obstacle blocking per axis, and
//! auto-fire: while standing still the player looses a volley at the nearest
//! live enemy whenever the arrow cooldown allows. Extra arrows of a
//! multi-arrow volley follow through the delayed-action queue and re-acquire
//! the nearest enemy when they fire.

use bevy::prelude::*;

use super::components::*;
use super::constants::*;
use super::projectiles::spawn_arrow;
use super::scheduler::{DelayedAction, DelayedActions, TimerFired};

/// Spawn the player at the start position with base stats.
pub fn spawn_player(commands: &mut Commands) -> Entity {
    let start = Player::start_position();
    commands
        .spawn((
            Player::default(),
            Player::combat_entity(),
            Player::hitbox(),
            Transform::from_xyz(start.x, start.y, 2.0),
        ))
        .id()
}

/// The closest live enemy to `from`.
pub fn nearest_enemy<'a>(
    from: Vec2,
    enemies: impl IntoIterator<Item = (Entity, Vec2, &'a CombatEntity)>,
) -> Option<(Entity, Vec2)> {
    enemies
        .into_iter()
        .filter(|(_, _, combat)| combat.is_alive())
        .map(|(entity, position, _)| (entity, position))
        .min_by(|a, b| a.1.distance_squared(from).total_cmp(&b.1.distance_squared(from)))
}

/// Intent vector clamped to unit length.
fn movement_direction(intent: &ControlIntent) -> Vec2 {
    let m = intent.movement;
    if !m.is_finite() {
        Vec2::ZERO
    } else if m.length_squared() > 1.0 {
        m.normalize()
    } else {
        m
    }
}

/// Apply the polled movement intent.
pub fn move_player(
    time: Res<Time>,
    arena: Res<Arena>,
    intent: Res<ControlIntent>,
    obstacles: Query<&Transform, (With<Obstacle>, Without<Player>)>,
    mut player: Query<(&mut Transform, &Player, &CombatEntity, &Hitbox)>,
) {
    let Ok((mut transform, player, combat, hitbox)) = player.get_single_mut() else {
        return;
    };
    if !player.can_move || !combat.is_alive() {
        return;
    }
    let direction = movement_direction(&intent);
    if direction == Vec2::ZERO {
        return;
    }

    let obstacle_positions: Vec<Vec2> = obstacles.iter().map(|t| t.translation.truncate()).collect();
    let step = direction * player.movement_speed * time.delta_secs();
    let mut position = transform.translation.truncate();

    // Resolve each axis separately so the player can slide along an obstacle.
    let try_x = Vec2::new(position.x + step.x, position.y);
    if !blocked_by_obstacle(try_x, obstacle_positions.iter().copied(), PLAYER_OBSTACLE_RADIUS) {
        position.x = try_x.x;
    }
    let try_y = Vec2::new(position.x, position.y + step.y);
    if !blocked_by_obstacle(try_y, obstacle_positions.iter().copied(), PLAYER_OBSTACLE_RADIUS) {
        position.y = try_y.y;
    }

    let clamped = arena.clamp_box(position, hitbox.half_extents);
    transform.translation.x = clamped.x;
    transform.translation.y = clamped.y;
}

/// Start a volley when the player is standing still and the cooldown is up.
pub fn player_auto_fire(
    mut commands: Commands,
    time: Res<Time>,
    intent: Res<ControlIntent>,
    mut scheduler: ResMut<DelayedActions>,
    mut player: Query<(Entity, &Transform, &mut Player, &CombatEntity), Without<Enemy>>,
    enemies: Query<(Entity, &Transform, &CombatEntity), With<Enemy>>,
) {
    let Ok((player_entity, transform, mut player, combat)) = player.get_single_mut() else {
        return;
    };
    let now = time.elapsed_secs();
    if !combat.is_alive() || !player.can_move || movement_direction(&intent) != Vec2::ZERO {
        return;
    }
    if !player.volley_ready(now) {
        return;
    }

    let origin = transform.translation.truncate();
    let Some((target, target_pos)) = nearest_enemy(
        origin,
        enemies.iter().map(|(e, t, c)| (e, t.translation.truncate(), c)),
    ) else {
        return;
    };

    player.last_volley_at = Some(now);
    spawn_arrow(&mut commands, origin, target, target_pos, player.arrow_damage);
    for i in 1..player.multi_arrow {
        scheduler.schedule(
            now,
            MULTI_ARROW_STAGGER * i as f32,
            DelayedAction::FireArrow {
                shooter: player_entity,
            },
        );
    }
}

/// Fire the staggered arrows of a multi-arrow volley.
pub fn fire_scheduled_arrows(
    mut commands: Commands,
    mut fired: EventReader<TimerFired>,
    player: Query<(&Transform, &Player, &CombatEntity), Without<Enemy>>,
    enemies: Query<(Entity, &Transform, &CombatEntity), With<Enemy>>,
) {
    for TimerFired(action) in fired.read() {
        let DelayedAction::FireArrow { shooter } = *action else {
            continue;
        };
        let Ok((transform, player, combat)) = player.get(shooter) else {
            continue;
        };
        if !combat.is_alive() {
            continue;
        }
        let origin = transform.translation.truncate();
        if let Some((target, target_pos)) = nearest_enemy(
            origin,
            enemies.iter().map(|(e, t, c)| (e, t.translation.truncate(), c)),
        ) {
            spawn_arrow(&mut commands, origin, target, target_pos, player.arrow_damage);
        }
    }
}
