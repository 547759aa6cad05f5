//! Integration tests for combat resolution
//!
//! These tests verify that:
//! - Body contact lands once per invincibility window and retaliation once per cooldown
//! - Contact resolves during the spawn grace period
//! - Retaliation against a spider flashes it
//! - Warning circles check the player's position at detonation, not placement
//! - Hostile projectiles vanish once their shooter dies

mod common;

use bevy::prelude::*;
use common::*;
use gauntlet::combat::events::PresentationCue;
use gauntlet::states::play_run::constants::{ARENA_SIZE, BLAST_RADIUS, PROJECTILE_HIT_RADIUS};
use gauntlet::states::play_run::enemies::mage_boss::WarningCircle;
use gauntlet::states::play_run::enemies::SplittingBoss;
use gauntlet::states::play_run::projectiles::{Projectile, ProjectileMotion};
use gauntlet::states::play_run::{CombatEntity, Enemy, Obstacle, Player, WaveEntity};

/// Arrows deal nothing, so only contact and blasts change health.
fn disarm_player(app: &mut App) {
    let world = app.world_mut();
    let mut query = world.query::<&mut Player>();
    for mut player in query.iter_mut(world) {
        player.arrow_damage = 0.0;
    }
}

fn player_entity(app: &mut App) -> Entity {
    let world = app.world_mut();
    let mut query = world.query_filtered::<Entity, With<Player>>();
    query.single(world)
}

fn health_of(app: &App, entity: Entity) -> f32 {
    app.world()
        .get::<CombatEntity>(entity)
        .map(|c| c.health)
        .unwrap_or(0.0)
}

/// Total health lost by `entities` since `before`.
fn health_lost(app: &App, entities: &[Entity], before: &[f32]) -> Vec<f32> {
    entities
        .iter()
        .zip(before)
        .map(|(entity, start)| start - health_of(app, *entity))
        .collect()
}

// =============================================================================
// Body contact
// =============================================================================

#[test]
fn test_contact_trades_hits_on_their_own_cooldowns() {
    let mut app = test_app(1, 41);
    disarm_player(&mut app);
    let player = player_entity(&mut app);
    let start = Player::start_position();

    let stacked: Vec<Entity> = {
        let world = app.world_mut();
        let mut query = world.query_filtered::<(Entity, &mut Transform, &mut CombatEntity), With<Enemy>>();
        query
            .iter_mut(world)
            .take(2)
            .map(|(entity, mut transform, mut combat)| {
                transform.translation.x = start.x;
                transform.translation.y = start.y;
                combat.damage = 25.0;
                entity
            })
            .collect()
    };
    assert_eq!(stacked.len(), 2);
    let before: Vec<f32> = stacked.iter().map(|e| health_of(&app, *e)).collect();

    app.update();
    assert!(!phase(&app).enemies_active, "contact resolves during the grace period");
    assert_eq!(health_of(&app, player), 1975.0, "only one body lands inside the window");
    let mut lost = health_lost(&app, &stacked, &before);
    lost.sort_by(f32::total_cmp);
    assert_eq!(lost, vec![0.0, 10.0], "one retaliation across both bodies");
    assert!(recorded(&app).cues.contains(&PresentationCue::Hit {
        entity: player,
        amount: 25.0,
        health_fraction: 1975.0 / 2000.0,
    }));

    step(&mut app, 0.5);
    assert_eq!(health_of(&app, player), 1975.0);
    let lost: f32 = health_lost(&app, &stacked, &before).iter().sum();
    assert_eq!(lost, 10.0, "retaliation is still cooling down");

    step(&mut app, 0.7);
    assert_eq!(health_of(&app, player), 1950.0);
    let lost: f32 = health_lost(&app, &stacked, &before).iter().sum();
    assert_eq!(lost, 20.0, "retaliation lands again after its cooldown");
}

#[test]
fn test_retaliation_flashes_spider() {
    let mut app = test_app(10, 42);
    disarm_player(&mut app);

    let (spider, position) = {
        let world = app.world_mut();
        let mut query = world.query_filtered::<(Entity, &Transform), With<SplittingBoss>>();
        let (entity, transform) = query.single(world);
        (entity, transform.translation.truncate())
    };
    move_player_to(&mut app, position);
    app.update();

    let cues = &recorded(&app).cues;
    assert!(cues.contains(&PresentationCue::Flash { entity: spider }));
    assert!(cues.iter().any(|cue| matches!(
        cue,
        PresentationCue::Hit { entity, amount, .. } if *entity == spider && *amount == 10.0
    )));
}

// =============================================================================
// Warning circles
// =============================================================================

/// Arena corner (inset by 60) farthest from `point`.
fn far_corner(point: Vec2) -> Vec2 {
    let low = 60.0;
    let high = ARENA_SIZE - 60.0;
    [
        Vec2::new(low, low),
        Vec2::new(high, low),
        Vec2::new(low, high),
        Vec2::new(high, high),
    ]
    .into_iter()
    .max_by(|a, b| a.distance(point).total_cmp(&b.distance(point)))
    .unwrap()
}

/// Wait for the mage's first circle and move it away from the mage.
/// Returns the circle and a spot just outside its radius.
fn staged_circle(app: &mut App) -> (WarningCircle, Vec2, Vec2) {
    // The first circle goes down two seconds after the mage spawns.
    step(app, 2.3);
    let mage = {
        let world = app.world_mut();
        let mut query = world.query_filtered::<&Transform, (With<Enemy>, Without<WarningCircle>)>();
        query.single(world).translation.truncate()
    };
    let center = far_corner(mage);
    let world = app.world_mut();
    let mut query = world.query::<(&mut Transform, &WarningCircle)>();
    let (mut transform, circle) = query.single_mut(world);
    transform.translation.x = center.x;
    transform.translation.y = center.y;
    let outside = center + (Vec2::splat(ARENA_SIZE / 2.0) - center).normalize() * (BLAST_RADIUS + 40.0);
    (circle.clone(), center, outside)
}

fn run_past_detonation(app: &mut App, circle: &WarningCircle) {
    let mut ticks = 0;
    while now(app) <= circle.detonate_at && ticks < 100 {
        app.update();
        ticks += 1;
    }
}

#[test]
fn test_circle_spares_player_who_leaves_before_detonation() {
    let mut app = test_app(40, 24);
    disarm_player(&mut app);
    let player = player_entity(&mut app);

    let (circle, center, outside) = staged_circle(&mut app);
    move_player_to(&mut app, center);
    app.update();
    assert!(now(&app) < circle.detonate_at);
    let before = health_of(&app, player);

    move_player_to(&mut app, outside);
    run_past_detonation(&mut app, &circle);

    assert!(recorded(&app).cues.contains(&PresentationCue::WarningDetonated {
        position: center,
        hit: false,
    }));
    assert_eq!(health_of(&app, player), before);
}

#[test]
fn test_circle_hits_player_who_walks_in_before_detonation() {
    let mut app = test_app(40, 25);
    disarm_player(&mut app);
    let player = player_entity(&mut app);

    let (circle, center, outside) = staged_circle(&mut app);
    move_player_to(&mut app, outside);
    app.update();
    let before = health_of(&app, player);

    move_player_to(&mut app, center);
    run_past_detonation(&mut app, &circle);

    assert!(recorded(&app).cues.contains(&PresentationCue::WarningDetonated {
        position: center,
        hit: true,
    }));
    // Phase-scaled mage damage rides on the circle.
    assert!(circle.damage > 350.0);
    assert_eq!(health_of(&app, player), before - circle.damage);
}

// =============================================================================
// Projectile ownership
// =============================================================================

#[test]
fn test_projectile_vanishes_when_its_shooter_dies() {
    let mut app = test_app(1, 43);
    disarm_player(&mut app);
    step(&mut app, 1.6);
    assert!(phase(&app).enemies_active);

    let (shooter, kind) = {
        let world = app.world_mut();
        let obstacles: Vec<Entity> = world
            .query_filtered::<Entity, With<Obstacle>>()
            .iter(world)
            .collect();
        for obstacle in obstacles {
            world.despawn(obstacle);
        }
        let mut query = world.query::<(Entity, &Enemy, &CombatEntity)>();
        let (entity, enemy, _) = query
            .iter(world)
            .find(|(_, _, combat)| combat.is_alive())
            .unwrap();
        (entity, enemy.kind)
    };

    let projectile = app
        .world_mut()
        .spawn((
            WaveEntity,
            Transform::from_xyz(ARENA_SIZE / 2.0, 200.0, 1.0),
            Projectile {
                owner: shooter,
                owner_kind: kind,
                velocity: Vec2::ZERO,
                motion: ProjectileMotion::Straight,
                damage: 25.0,
                hit_radius: PROJECTILE_HIT_RADIUS,
                expires_at: None,
            },
        ))
        .id();

    app.update();
    assert!(app.world().get::<Projectile>(projectile).is_some(), "owner alive, still flying");

    {
        let mut combat = app.world_mut().get_mut::<CombatEntity>(shooter).unwrap();
        combat.invincible_until = f32::NEG_INFINITY;
        let lethal = combat.health + 1.0;
        combat.take_damage(lethal, 0.0);
    }
    app.update();
    assert!(app.world().get::<Projectile>(projectile).is_none());
}
