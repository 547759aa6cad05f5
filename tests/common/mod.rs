//! Shared harness for integration tests: a headless app stepped in fixed
//! 50 ms ticks, plus helpers to poke at the run from outside.

#![allow(dead_code)]

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use gauntlet::combat::events::{PresentationCue, SceneTransition};
use gauntlet::states::play_run::{CombatEntity, Enemy, GauntletCorePlugin, PhaseState, Player};
use gauntlet::RunSettings;

pub const TICK: f32 = 0.05;

/// Scene transitions and cues seen so far.
#[derive(Resource, Default)]
pub struct Recorded {
    pub transitions: Vec<SceneTransition>,
    pub cues: Vec<PresentationCue>,
}

fn record(
    mut recorded: ResMut<Recorded>,
    mut transitions: EventReader<SceneTransition>,
    mut cues: EventReader<PresentationCue>,
) {
    recorded.transitions.extend(transitions.read().cloned());
    recorded.cues.extend(cues.read().cloned());
}

/// A seeded app at `start_phase`, already past its first update.
pub fn test_app(start_phase: u32, seed: u64) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(TICK)))
        .add_plugins(GauntletCorePlugin {
            settings: RunSettings {
                start_phase,
                random_seed: Some(seed),
                enemies_path: None,
            },
        })
        .init_resource::<Recorded>()
        .add_systems(Last, record);
    app.finish();
    app.cleanup();
    app.update();
    app
}

pub fn step(app: &mut App, secs: f32) {
    let ticks = (secs / TICK).ceil() as usize;
    for _ in 0..ticks {
        app.update();
    }
}

pub fn phase(app: &App) -> PhaseState {
    app.world().resource::<PhaseState>().clone()
}

pub fn now(app: &App) -> f32 {
    app.world().resource::<Time>().elapsed_secs()
}

/// Player whose arrows do nothing and who cannot realistically die.
pub fn make_player_inert(app: &mut App) {
    let world = app.world_mut();
    let mut query = world.query::<(&mut Player, &mut CombatEntity)>();
    for (mut player, mut combat) in query.iter_mut(world) {
        player.arrow_damage = 0.0;
        combat.max_health = 1.0e9;
        combat.health = 1.0e9;
    }
}

pub fn player_state(app: &mut App) -> (Player, CombatEntity) {
    let world = app.world_mut();
    let mut query = world.query::<(&Player, &CombatEntity)>();
    let (player, combat) = query.single(world);
    (player.clone(), combat.clone())
}

pub fn move_player_to(app: &mut App, position: Vec2) {
    let world = app.world_mut();
    let mut query = world.query_filtered::<&mut Transform, With<Player>>();
    for mut transform in query.iter_mut(world) {
        transform.translation.x = position.x;
        transform.translation.y = position.y;
    }
}

/// Standing here overlaps the door.
pub fn door_position() -> Vec2 {
    Vec2::new(270.0, 40.0)
}

/// Deal a lethal hit to every live enemy matching `filter`. Returns how many.
pub fn kill_enemies_where(app: &mut App, filter: impl Fn(&Enemy) -> bool) -> usize {
    let world = app.world_mut();
    let mut query = world.query::<(&Enemy, &mut CombatEntity)>();
    let mut killed = 0;
    for (enemy, mut combat) in query.iter_mut(world) {
        if combat.is_alive() && filter(enemy) {
            combat.invincible_until = f32::NEG_INFINITY;
            let lethal = combat.health + 1.0;
            combat.take_damage(lethal, 0.0);
            killed += 1;
        }
    }
    killed
}

pub fn kill_all_enemies(app: &mut App) -> usize {
    kill_enemies_where(app, |_| true)
}

pub fn live_enemies(app: &mut App) -> Vec<(Enemy, CombatEntity)> {
    let world = app.world_mut();
    let mut query = world.query::<(&Enemy, &CombatEntity)>();
    query
        .iter(world)
        .filter(|(_, c)| c.is_alive())
        .map(|(e, c)| (e.clone(), c.clone()))
        .collect()
}

pub fn recorded(app: &App) -> &Recorded {
    app.world().resource::<Recorded>()
}

pub fn send<E: Event>(app: &mut App, event: E) {
    app.world_mut().send_event(event);
}
