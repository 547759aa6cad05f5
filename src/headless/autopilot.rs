//! Autopilot input for headless runs
//!
//! Stands in for a human at the controls: writes `ControlIntent` every tick
//! and answers draft and recovery prompts. The policy is deliberately plain:
//! stand still and let auto-fire work, step away from anything that gets too
//! close, walk to the door once it opens.

use bevy::prelude::*;

use crate::combat::events::{DraftSelection, RecoveryChoiceMade};
use crate::states::play_run::constants::*;
use crate::states::play_run::enemies::mage_boss::WarningCircle;
use crate::states::play_run::projectiles::Projectile;
use crate::states::play_run::{
    blocked_by_obstacle, CombatEntity, ControlIntent, Enemy, Obstacle, PhaseStage, PhaseState,
    Player, PowerUpDraft, PowerUpId, RecoveryChoice,
};

/// Enemies closer than this push the player away.
const ENEMY_AVOID_RADIUS: f32 = 110.0;
/// Hostile projectiles closer than this push the player away.
const PROJECTILE_AVOID_RADIUS: f32 = 70.0;
/// Extra room kept from a warning circle's edge.
const CIRCLE_AVOID_MARGIN: f32 = 30.0;
/// Look-ahead used to detect an obstacle in the walking direction.
const OBSTACLE_PROBE: f32 = 20.0;

/// Autopilot preferences.
#[derive(Resource, Debug, Clone)]
pub struct AutopilotSettings {
    /// Draft picks, most wanted first. Unlisted offers rank last.
    pub draft_preference: Vec<PowerUpId>,
    pub recovery_choice: RecoveryChoice,
}

impl Default for AutopilotSettings {
    fn default() -> Self {
        Self {
            draft_preference: Vec::new(),
            recovery_choice: RecoveryChoice::Heal,
        }
    }
}

impl AutopilotSettings {
    /// Index of the most preferred offer.
    pub fn pick(&self, offers: &[PowerUpId]) -> usize {
        offers
            .iter()
            .enumerate()
            .min_by_key(|(_, id)| {
                self.draft_preference
                    .iter()
                    .position(|p| p == *id)
                    .unwrap_or(usize::MAX)
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// Sum of repulsion from every threat within its radius. Zero when safe.
pub fn threat_avoidance(player: Vec2, threats: impl IntoIterator<Item = (Vec2, f32)>) -> Vec2 {
    threats
        .into_iter()
        .filter_map(|(at, radius)| {
            let away = player - at;
            let distance = away.length();
            (distance < radius).then(|| {
                let push = 1.0 - distance / radius;
                away.normalize_or(Vec2::Y) * push
            })
        })
        .sum()
}

/// Direction toward `target`, sidestepping an obstacle directly ahead.
pub fn path_toward(from: Vec2, target: Vec2, obstacles: &[Vec2]) -> Vec2 {
    let direction = (target - from).normalize_or_zero();
    if direction == Vec2::ZERO {
        return direction;
    }
    let ahead = from + direction * OBSTACLE_PROBE;
    if !blocked_by_obstacle(ahead, obstacles.iter().copied(), PLAYER_OBSTACLE_RADIUS) {
        return direction;
    }
    let side = if from.x <= ARENA_SIZE / 2.0 { 1.0 } else { -1.0 };
    Vec2::new(side, 0.0)
}

/// Write this tick's movement intent.
pub fn autopilot_movement(
    phase: Res<PhaseState>,
    mut intent: ResMut<ControlIntent>,
    player: Query<(&Transform, &Player, &CombatEntity)>,
    enemies: Query<(&Transform, &CombatEntity), With<Enemy>>,
    projectiles: Query<&Transform, With<Projectile>>,
    circles: Query<(&Transform, &WarningCircle)>,
    obstacles: Query<&Transform, With<Obstacle>>,
) {
    intent.movement = Vec2::ZERO;
    let Ok((transform, player, combat)) = player.get_single() else {
        return;
    };
    if !player.can_move || !combat.is_alive() {
        return;
    }
    let position = transform.translation.truncate();
    let obstacle_positions: Vec<Vec2> = obstacles.iter().map(|t| t.translation.truncate()).collect();

    if phase.stage == PhaseStage::DoorOpen {
        let door = Vec2::new(DOOR_POSITION.0, 0.0);
        intent.movement = path_toward(position, door, &obstacle_positions);
        return;
    }
    if !phase.enemies_active {
        return;
    }

    let threats = enemies
        .iter()
        .filter(|(_, c)| c.is_alive())
        .map(|(t, _)| (t.translation.truncate(), ENEMY_AVOID_RADIUS))
        .chain(
            projectiles
                .iter()
                .map(|t| (t.translation.truncate(), PROJECTILE_AVOID_RADIUS)),
        )
        .chain(
            circles
                .iter()
                .map(|(t, c)| (t.translation.truncate(), c.radius + CIRCLE_AVOID_MARGIN)),
        );
    let push = threat_avoidance(position, threats);
    if push.length_squared() > 1e-4 {
        intent.movement = push.normalize();
    }
}

/// Answer an open draft or recovery prompt.
pub fn autopilot_choices(
    settings: Res<AutopilotSettings>,
    phase: Res<PhaseState>,
    draft: Res<PowerUpDraft>,
    mut selections: EventWriter<DraftSelection>,
    mut recovery: EventWriter<RecoveryChoiceMade>,
) {
    match phase.stage {
        PhaseStage::PowerUpDraft if draft.is_open() && draft.chosen().is_none() => {
            selections.send(DraftSelection(settings.pick(draft.offers())));
        }
        PhaseStage::RecoveryChoice if phase.recovery_choice.is_none() => {
            recovery.send(RecoveryChoiceMade(settings.recovery_choice));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_follows_preference() {
        let settings = AutopilotSettings {
            draft_preference: vec![PowerUpId::MultiArrow, PowerUpId::Damage],
            ..default()
        };
        let offers = [PowerUpId::Heal, PowerUpId::Damage, PowerUpId::MultiArrow];
        assert_eq!(settings.pick(&offers), 2);
        assert_eq!(settings.pick(&[PowerUpId::Heal, PowerUpId::MaxHealth]), 0);
        assert_eq!(AutopilotSettings::default().pick(&[]), 0);
    }

    #[test]
    fn test_threat_avoidance_pushes_away() {
        let player = Vec2::new(100.0, 100.0);
        let push = threat_avoidance(player, [(Vec2::new(150.0, 100.0), 110.0)]);
        assert!(push.x < 0.0);
        assert_eq!(threat_avoidance(player, [(Vec2::new(400.0, 400.0), 110.0)]), Vec2::ZERO);
    }

    #[test]
    fn test_path_sidesteps_obstacle() {
        let from = Vec2::new(200.0, 300.0);
        let target = Vec2::new(200.0, 0.0);
        assert_eq!(path_toward(from, target, &[]), Vec2::new(0.0, -1.0));
        let blocked = path_toward(from, target, &[Vec2::new(200.0, 270.0)]);
        assert_eq!(blocked, Vec2::new(1.0, 0.0));
    }
}
