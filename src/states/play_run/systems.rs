//! Run Systems API
//!
//! Stable entry point for the encounter loop. The headless runner and tests
//! import from here rather than from the internal modules.
//!
//! ## System Phases
//!
//! Run systems execute in six ordered phases each tick:
//!
//! 1. **Timers** - Delayed-action dispatch, run clock
//! 2. **Player** - Movement, auto-fire, staggered arrows
//! 3. **Projectiles** - Arrows, hostile projectiles, warning circles
//! 4. **Enemies** - Movement, ranged attacks, boss behaviour
//! 5. **Collision** - Body contact, death resolution
//! 6. **PhaseEvaluation** - Statistics, draft, recovery, door, advance, wave spawn
//!
//! Enemy behaviour and hostile projectiles only run while
//! `PhaseState::enemies_active` is set. Body contact resolves every tick,
//! including the spawn grace period.
//!
//! ## Usage
//!
//! ```ignore
//! use gauntlet::states::play_run::systems;
//!
//! systems::configure_run_system_ordering(&mut app);
//! systems::add_core_run_systems(&mut app, || true);
//! ```

use bevy::prelude::*;

// === Phase 1: Timers ===
pub use super::scheduler::dispatch_delayed_actions;
pub use super::phase_flow::track_run_time;

// === Phase 2: Player ===
pub use super::player::{fire_scheduled_arrows, move_player, player_auto_fire};

// === Phase 3: Projectiles ===
pub use super::enemies::mage_boss::detonate_warning_circles;
pub use super::projectiles::{move_arrows, move_hostile_projectiles};

// === Phase 4: Enemies ===
pub use super::enemies::mage_boss::{mage_boss_behavior, place_scheduled_circles};
pub use super::enemies::movement::move_enemies;
pub use super::enemies::ranged::fire_ranged_attacks;

// === Phase 5: Collision ===
pub use super::combat_core::{resolve_contact_damage, resolve_deaths};

// === Phase 6: Phase Evaluation ===
pub use super::phase_flow::{
    apply_draft_selection, apply_recovery_choice, check_player_death, enemies_active,
    evaluate_phase, handle_phase_advance, handle_phase_timers, handle_reset_run, record_damage,
    record_kills, start_run,
};
pub use super::spawning::spawn_phase_wave;

// === Components and Resources ===
pub use super::components::{
    Arena, CombatEntity, ControlIntent, Enemy, GameRng, Hitbox, LifeState, Obstacle, Player,
    WaveEntity,
};
pub use super::phase_flow::{PhaseStage, PhaseState};

/// System set labels for run system ordering.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunSystemPhase {
    Timers,
    Player,
    Projectiles,
    Enemies,
    Collision,
    PhaseEvaluation,
}

/// Configures the ordering between run system phases.
///
/// Call this once during app setup before adding run systems.
pub fn configure_run_system_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            RunSystemPhase::Timers,
            RunSystemPhase::Player,
            RunSystemPhase::Projectiles,
            RunSystemPhase::Enemies,
            RunSystemPhase::Collision,
            RunSystemPhase::PhaseEvaluation,
        )
            .chain(),
    );
}

/// Adds the encounter loop systems to the app.
///
/// # Arguments
/// * `app` - The Bevy App to add systems to
/// * `run_condition` - Gate for the whole loop (`|| true` when headless)
pub fn add_core_run_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    // Phase 1: Timers
    app.add_systems(
        Update,
        (dispatch_delayed_actions, track_run_time)
            .chain()
            .in_set(RunSystemPhase::Timers)
            .run_if(run_condition.clone()),
    );

    // Phase 2: Player
    app.add_systems(
        Update,
        (move_player, player_auto_fire, fire_scheduled_arrows)
            .chain()
            .in_set(RunSystemPhase::Player)
            .run_if(run_condition.clone()),
    );

    // Flush spawned arrows before they move
    app.add_systems(
        Update,
        apply_deferred
            .after(RunSystemPhase::Player)
            .before(RunSystemPhase::Projectiles)
            .run_if(run_condition.clone()),
    );

    // Phase 3: Projectiles
    app.add_systems(
        Update,
        (
            move_arrows,
            (move_hostile_projectiles, detonate_warning_circles)
                .chain()
                .run_if(enemies_active),
        )
            .chain()
            .in_set(RunSystemPhase::Projectiles)
            .run_if(run_condition.clone()),
    );

    // Phase 4: Enemies
    app.add_systems(
        Update,
        (
            move_enemies,
            fire_ranged_attacks,
            mage_boss_behavior,
            place_scheduled_circles,
        )
            .chain()
            .in_set(RunSystemPhase::Enemies)
            .run_if(enemies_active)
            .run_if(run_condition.clone()),
    );

    // Flush projectiles and circles before collision
    app.add_systems(
        Update,
        apply_deferred
            .after(RunSystemPhase::Enemies)
            .before(RunSystemPhase::Collision)
            .run_if(run_condition.clone()),
    );

    // Phase 5: Collision
    app.add_systems(
        Update,
        (resolve_contact_damage, resolve_deaths)
            .chain()
            .in_set(RunSystemPhase::Collision)
            .run_if(run_condition.clone()),
    );

    // Flush despawns and split children before the controller looks
    app.add_systems(
        Update,
        apply_deferred
            .after(RunSystemPhase::Collision)
            .before(RunSystemPhase::PhaseEvaluation)
            .run_if(run_condition.clone()),
    );

    // Phase 6: Phase Evaluation
    app.add_systems(
        Update,
        (
            check_player_death,
            record_damage,
            record_kills,
            handle_phase_timers,
            apply_draft_selection,
            apply_recovery_choice,
            evaluate_phase,
            handle_phase_advance,
            handle_reset_run,
            apply_deferred,
            spawn_phase_wave,
        )
            .chain()
            .in_set(RunSystemPhase::PhaseEvaluation)
            .run_if(run_condition),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_phase_ordering() {
        assert_ne!(RunSystemPhase::Timers, RunSystemPhase::Player);
        assert_ne!(RunSystemPhase::Collision, RunSystemPhase::PhaseEvaluation);
    }
}
