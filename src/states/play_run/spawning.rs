//! Wave spawning
//!
//! Builds the wave for the phase the controller just entered: obstacles and
//! five weighted enemies for a normal phase, the routed boss for a boss phase,
//! nothing but a choice for a recovery phase.

use bevy::prelude::*;

use crate::combat::events::PresentationCue;
use crate::combat::log::{RunLog, RunLogEventType};
use super::components::*;
use super::constants::*;
use super::enemies::spawn_enemy;
use super::enemy_config::EnemyDefinitions;
use super::phase_flow::{PhaseKind, PhaseStage, PhaseState};
use super::scheduler::{DelayedAction, DelayedActions};

/// Centre of grid cell (`col`, `row`).
pub fn cell_center(col: u32, row: u32) -> Vec2 {
    Vec2::new(
        (col as f32 + 0.5) * CELL_SIZE,
        (row as f32 + 0.5) * CELL_SIZE,
    )
}

/// Distinct obstacle cells, all clear of the player's start position.
pub fn obstacle_cells(rng: &mut GameRng, player_start: Vec2) -> Vec<Vec2> {
    let candidates: Vec<Vec2> = (0..GRID_CELLS)
        .flat_map(|row| (0..GRID_CELLS).map(move |col| cell_center(col, row)))
        .filter(|cell| cell.distance(player_start) > OBSTACLE_PLAYER_CLEARANCE)
        .collect();
    let count = rng.random_u32_inclusive(OBSTACLE_COUNT_MIN, OBSTACLE_COUNT_MAX) as usize;
    rng.sample_indices(candidates.len(), count.min(candidates.len()))
        .into_iter()
        .map(|i| candidates[i])
        .collect()
}

/// A spawn point at least `ENEMY_MIN_SPAWN_DISTANCE` from the player when one
/// can be found; otherwise the farthest candidate tried.
pub fn enemy_spawn_position(arena: &Arena, player: Vec2, rng: &mut GameRng) -> Vec2 {
    let area = arena.inset(ENEMY_SPAWN_INSET);
    let mut best = area.min;
    let mut best_distance = -1.0;
    for _ in 0..PLACEMENT_ATTEMPTS {
        let candidate = area.random_point(rng);
        let distance = candidate.distance(player);
        if distance >= ENEMY_MIN_SPAWN_DISTANCE {
            return candidate;
        }
        if distance > best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}

pub fn boss_spawn_position(arena: &Arena) -> Vec2 {
    Vec2::new(arena.center().x, arena.min.y + BOSS_SPAWN_Y)
}

/// Sweep the previous wave and spawn the current phase's wave.
///
/// Runs only while the controller is in `PhaseStage::Spawning`. Enemies start
/// inert; `EnableEnemies` activates them after the grace period.
pub fn spawn_phase_wave(
    mut commands: Commands,
    time: Res<Time>,
    arena: Res<Arena>,
    defs: Res<EnemyDefinitions>,
    mut rng: ResMut<GameRng>,
    mut phase: ResMut<PhaseState>,
    mut scheduler: ResMut<DelayedActions>,
    mut run_log: ResMut<RunLog>,
    wave: Query<Entity, With<WaveEntity>>,
    mut player: Query<(&mut Transform, &mut Player, &CombatEntity)>,
    mut cues: EventWriter<PresentationCue>,
) {
    if phase.stage != PhaseStage::Spawning {
        return;
    }
    let now = time.elapsed_secs();

    for entity in wave.iter() {
        commands.entity(entity).despawn();
    }
    scheduler.cancel_entity_actions();

    let start = Player::start_position();
    if let Ok((mut transform, mut player, combat)) = player.get_single_mut() {
        transform.translation.x = start.x;
        transform.translation.y = start.y;
        player.can_move = combat.is_alive();
    }

    phase.begin_phase();
    let current = phase.current_phase;
    cues.send(PresentationCue::PhaseEntered { phase: current });

    match phase.kind() {
        PhaseKind::Recovery => {
            phase.stage = PhaseStage::RecoveryChoice;
            cues.send(PresentationCue::RecoveryOffered { phase: current });
            run_log.log(
                RunLogEventType::PhaseEvent,
                format!("Phase {} entered: recovery", current),
            );
            info!("Phase {}: recovery", current);
            return;
        }
        PhaseKind::Boss(boss) => {
            spawn_enemy(
                &mut commands,
                &defs,
                &mut rng,
                boss.enemy_kind(),
                boss_spawn_position(&arena),
                now,
                current,
            );
            run_log.log(
                RunLogEventType::BossEvent,
                format!("Phase {} entered: {} appears", current, boss.enemy_kind().name()),
            );
            info!("Phase {}: {}", current, boss.enemy_kind().name());
        }
        PhaseKind::Normal => {
            for cell in obstacle_cells(&mut rng, start) {
                commands.spawn((
                    WaveEntity,
                    Obstacle,
                    Transform::from_xyz(cell.x, cell.y, 0.0),
                ));
            }
            for _ in 0..NORMAL_WAVE_SIZE {
                let kind = defs.roll_normal_kind(&mut rng);
                let position = enemy_spawn_position(&arena, start, &mut rng);
                spawn_enemy(&mut commands, &defs, &mut rng, kind, position, now, current);
            }
            run_log.log(
                RunLogEventType::PhaseEvent,
                format!("Phase {} entered: {} enemies", current, NORMAL_WAVE_SIZE),
            );
            info!("Phase {}: {} enemies", current, NORMAL_WAVE_SIZE);
        }
    }

    scheduler.schedule(
        now,
        SPAWN_GRACE_PERIOD,
        DelayedAction::EnableEnemies { phase: current },
    );
    phase.stage = PhaseStage::Active;
}
