//! Phase Flow Systems
//!
//! The phase controller owns all run state (`PhaseState`). Other systems
//! report through events; only the systems in this module and
//! `spawning::spawn_phase_wave` write the counters and flags.
//!
//! ## Stages
//!
//! ```text
//! Spawning -> Active -> Cleared -> [PowerUpDraft] -> DoorOpen -> advance
//!    ^                                                             |
//!    +------------------ next phase (or RecoveryChoice) -----------+
//! ```
//!
//! Advancing past the final phase ends the run with a summary; the player's
//! death ends it with a restart request. A boss phase cannot advance until its
//! boss is defeated, whatever the door is showing.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::events::*;
use crate::combat::log::{RunLog, RunLogEventType};
use super::components::*;
use super::constants::*;
use super::enemies::splitting_boss::{live_lineage, SplittingBoss};
use super::enemies::BossKind;
use super::power_ups::{draw_offers, PowerUpDraft, PowerUpId};
use super::scheduler::{DelayedAction, DelayedActions, TimerFired};

// ============================================================================
// Phase Classification
// ============================================================================

pub fn is_boss_phase(phase: u32) -> bool {
    phase > 0 && phase % BOSS_PHASE_INTERVAL == 0
}

pub fn is_recovery_phase(phase: u32) -> bool {
    RECOVERY_PHASES.contains(&phase)
}

/// Even phases that are neither boss nor recovery phases offer one draft.
pub fn qualifies_for_power_up(phase: u32) -> bool {
    phase % 2 == 0 && !is_boss_phase(phase) && !is_recovery_phase(phase)
}

/// Spider on 10 and 30, mage on 20, 40 and 50. Beyond the final phase the
/// pattern continues: mage on multiples of 20, spider otherwise.
pub fn boss_for_phase(phase: u32) -> BossKind {
    match phase {
        10 | 30 => BossKind::Spider,
        20 | 40 | 50 => BossKind::Mage,
        p if p % 20 == 0 => BossKind::Mage,
        _ => BossKind::Spider,
    }
}

/// The one wave type a phase gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    Normal,
    Boss(BossKind),
    Recovery,
}

impl PhaseKind {
    pub fn of(phase: u32) -> Self {
        if is_boss_phase(phase) {
            PhaseKind::Boss(boss_for_phase(phase))
        } else if is_recovery_phase(phase) {
            PhaseKind::Recovery
        } else {
            PhaseKind::Normal
        }
    }

    /// Kills needed before the phase can clear.
    pub fn kill_target(self) -> u32 {
        match self {
            PhaseKind::Normal => NORMAL_WAVE_SIZE,
            PhaseKind::Boss(_) => BOSS_KILL_TARGET,
            PhaseKind::Recovery => 0,
        }
    }
}

// ============================================================================
// Phase State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStage {
    /// Wave not yet spawned; `spawn_phase_wave` picks this up.
    Spawning,
    Active,
    /// Kill target met (and boss defeated on boss phases).
    Cleared,
    PowerUpDraft,
    DoorOpen,
    RecoveryChoice,
    RunComplete,
    GameOver,
}

/// Outcome of an advance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseAdvance {
    /// Boss phase without a defeated boss. Nothing changed.
    Blocked,
    Entered(u32),
    Complete,
}

/// Recovery-phase reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryChoice {
    /// Restore health, capped at max.
    Heal,
    /// Permanently raise arrow damage.
    Empower,
}

impl RecoveryChoice {
    pub fn apply(self, player: &mut Player, combat: &mut CombatEntity) {
        match self {
            RecoveryChoice::Heal => {
                combat.heal(RECOVERY_HEAL);
            }
            RecoveryChoice::Empower => player.arrow_damage += RECOVERY_ARROW_DAMAGE,
        }
    }
}

/// All run-scoped state. Written only by the phase controller.
#[derive(Resource, Debug, Clone)]
pub struct PhaseState {
    pub current_phase: u32,
    pub monsters_to_kill: u32,
    pub killed_this_phase: u32,
    /// Kills across the whole run
    pub monsters_killed: u32,
    pub boss_defeated: bool,
    pub power_up_offered: bool,
    pub enemies_active: bool,
    pub door_visible: bool,
    pub stage: PhaseStage,
    /// Phases cleared
    pub score: u32,
    pub recovery_choice: Option<RecoveryChoice>,
    pub run_started_at: f32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PhaseState {
    /// Fresh run state starting at `start_phase` (clamped into 1..=final).
    pub fn new(start_phase: u32) -> Self {
        let current_phase = start_phase.clamp(1, FINAL_PHASE);
        Self {
            current_phase,
            monsters_to_kill: PhaseKind::of(current_phase).kill_target(),
            killed_this_phase: 0,
            monsters_killed: 0,
            boss_defeated: false,
            power_up_offered: false,
            enemies_active: false,
            door_visible: false,
            stage: PhaseStage::Spawning,
            score: 0,
            recovery_choice: None,
            run_started_at: 0.0,
            damage_dealt: 0.0,
            damage_taken: 0.0,
        }
    }

    pub fn kind(&self) -> PhaseKind {
        PhaseKind::of(self.current_phase)
    }

    /// False once the run has completed or ended in death.
    pub fn is_running(&self) -> bool {
        !matches!(self.stage, PhaseStage::RunComplete | PhaseStage::GameOver)
    }

    /// Reset per-phase counters for the wave about to spawn.
    pub fn begin_phase(&mut self) {
        self.monsters_to_kill = self.kind().kill_target();
        self.killed_this_phase = 0;
        self.boss_defeated = false;
        self.power_up_offered = false;
        self.door_visible = false;
        self.enemies_active = false;
        self.recovery_choice = None;
    }

    pub fn record_kill(&mut self) {
        self.monsters_killed += 1;
        self.killed_this_phase += 1;
    }

    /// The boss lineage is gone; the kill target counts as met.
    pub fn mark_boss_defeated(&mut self) {
        self.boss_defeated = true;
        self.killed_this_phase = self.killed_this_phase.max(self.monsters_to_kill);
    }

    pub fn is_cleared(&self) -> bool {
        self.killed_this_phase >= self.monsters_to_kill
            && (!is_boss_phase(self.current_phase) || self.boss_defeated)
    }

    pub fn should_offer_power_up(&self) -> bool {
        qualifies_for_power_up(self.current_phase) && !self.power_up_offered
    }

    /// Move to the next phase, or finish the run after the final phase.
    pub fn advance(&mut self) -> PhaseAdvance {
        if is_boss_phase(self.current_phase) && !self.boss_defeated {
            return PhaseAdvance::Blocked;
        }
        self.score += 1;
        self.door_visible = false;
        if self.current_phase >= FINAL_PHASE {
            self.stage = PhaseStage::RunComplete;
            self.enemies_active = false;
            return PhaseAdvance::Complete;
        }
        self.current_phase += 1;
        self.killed_this_phase = 0;
        self.boss_defeated = false;
        self.power_up_offered = false;
        self.stage = PhaseStage::Spawning;
        PhaseAdvance::Entered(self.current_phase)
    }

    pub fn summary(&self, now: f32, power_ups: &[PowerUpId]) -> RunSummary {
        RunSummary {
            elapsed_secs: (now - self.run_started_at).max(0.0),
            monsters_killed: self.monsters_killed,
            damage_dealt: self.damage_dealt,
            damage_taken: self.damage_taken,
            final_phase: self.current_phase.min(FINAL_PHASE),
            score: self.score,
            power_ups: power_ups.to_vec(),
        }
    }
}

/// Run condition: enemy behaviour, hostile projectiles and contact damage.
pub fn enemies_active(phase: Res<PhaseState>) -> bool {
    phase.enemies_active
}

// ============================================================================
// Systems
// ============================================================================

/// Spawn the player. The wave follows from `PhaseStage::Spawning`.
pub fn start_run(
    mut commands: Commands,
    time: Res<Time>,
    mut phase: ResMut<PhaseState>,
    mut run_log: ResMut<RunLog>,
) {
    super::player::spawn_player(&mut commands);
    phase.run_started_at = time.elapsed_secs();
    run_log.clear();
    run_log.log(
        RunLogEventType::RunEvent,
        format!("Run started at phase {}", phase.current_phase),
    );
    info!("Run started at phase {}", phase.current_phase);
}

/// Keep the log clock in step with the run.
pub fn track_run_time(time: Res<Time>, phase: Res<PhaseState>, mut run_log: ResMut<RunLog>) {
    if phase.is_running() {
        run_log.run_time = (time.elapsed_secs() - phase.run_started_at).max(0.0);
    }
}

/// End the run when the player's lethal hit has landed.
pub fn check_player_death(
    mut phase: ResMut<PhaseState>,
    mut run_log: ResMut<RunLog>,
    mut player: Query<(&mut Player, &mut CombatEntity)>,
    mut transitions: EventWriter<SceneTransition>,
) {
    let Ok((mut player, mut combat)) = player.get_single_mut() else {
        return;
    };
    if combat.life != LifeState::Dying || !phase.is_running() {
        return;
    }
    combat.begin_removal();

    phase.stage = PhaseStage::GameOver;
    phase.enemies_active = false;
    phase.door_visible = false;
    // Power-ups do not carry over into the next attempt.
    *player = Player {
        can_move: false,
        ..Player::default()
    };

    run_log.log(
        RunLogEventType::RunEvent,
        format!("Player died in phase {}", phase.current_phase),
    );
    info!("Player died in phase {}", phase.current_phase);
    transitions.send(SceneTransition::Restart {
        reason: RestartReason::PlayerDied,
    });
}

/// Fold landed hits into the run statistics and the log.
pub fn record_damage(
    mut phase: ResMut<PhaseState>,
    mut run_log: ResMut<RunLog>,
    mut damage_events: EventReader<DamageDealt>,
) {
    for damage in damage_events.read() {
        match damage.target {
            DamageTarget::Player => phase.damage_taken += damage.amount,
            DamageTarget::Enemy(_) => {
                if damage.source.is_player() {
                    phase.damage_dealt += damage.amount;
                }
            }
        }
        run_log.log_damage(damage);
    }
}

/// The single writer of kill counters and the boss-defeated flag.
pub fn record_kills(
    mut phase: ResMut<PhaseState>,
    mut run_log: ResMut<RunLog>,
    mut defeated: EventReader<EnemyDefeated>,
    mut boss_defeated: EventReader<BossDefeated>,
) {
    for _ in defeated.read() {
        if phase.is_running() {
            phase.record_kill();
        }
    }
    for event in boss_defeated.read() {
        if event.phase == phase.current_phase && !phase.boss_defeated {
            phase.mark_boss_defeated();
            run_log.log(
                RunLogEventType::BossEvent,
                format!("Boss of phase {} defeated", event.phase),
            );
            info!("Boss of phase {} defeated", event.phase);
        }
    }
}

/// Handle the delayed actions that belong to the phase controller.
pub fn handle_phase_timers(
    mut fired: EventReader<TimerFired>,
    mut phase: ResMut<PhaseState>,
    mut draft: ResMut<PowerUpDraft>,
    mut run_log: ResMut<RunLog>,
    mut player: Query<&mut Player>,
    spiders: Query<&CombatEntity, With<SplittingBoss>>,
    mut advance: EventWriter<AdvancePhaseRequested>,
) {
    for TimerFired(action) in fired.read() {
        match *action {
            DelayedAction::EnableEnemies { phase: p } => {
                if p == phase.current_phase && matches!(phase.stage, PhaseStage::Active | PhaseStage::Cleared) {
                    phase.enemies_active = true;
                }
            }
            DelayedAction::CheckBossLineage { phase: p } => {
                if p != phase.current_phase || phase.boss_defeated || !phase.is_running() {
                    continue;
                }
                if live_lineage(spiders.iter()) == 0 {
                    phase.mark_boss_defeated();
                    run_log.log(
                        RunLogEventType::BossEvent,
                        format!("Spider lineage of phase {} destroyed", p),
                    );
                    info!("Spider lineage of phase {} destroyed", p);
                }
            }
            DelayedAction::ResumeAfterDraft { phase: p } => {
                if p != phase.current_phase || phase.stage != PhaseStage::PowerUpDraft {
                    continue;
                }
                draft.close();
                if let Ok(mut player) = player.get_single_mut() {
                    player.can_move = true;
                }
                phase.enemies_active = true;
                phase.stage = PhaseStage::Cleared;
            }
            DelayedAction::AdvancePhase { phase: p } => {
                if p == phase.current_phase && phase.stage == PhaseStage::RecoveryChoice {
                    advance.send(AdvancePhaseRequested);
                }
            }
            DelayedAction::FireArrow { .. } | DelayedAction::PlaceWarningCircle { .. } => {}
        }
    }
}

/// Apply the first valid draft selection; later ones are ignored.
pub fn apply_draft_selection(
    time: Res<Time>,
    phase: Res<PhaseState>,
    mut draft: ResMut<PowerUpDraft>,
    mut scheduler: ResMut<DelayedActions>,
    mut run_log: ResMut<RunLog>,
    mut selections: EventReader<DraftSelection>,
    mut player: Query<(&mut Player, &mut CombatEntity)>,
) {
    for DraftSelection(index) in selections.read() {
        if phase.stage != PhaseStage::PowerUpDraft {
            continue;
        }
        let Some(id) = draft.select(*index) else {
            continue;
        };
        if let Ok((mut player, mut combat)) = player.get_single_mut() {
            id.apply(&mut player, &mut combat);
        }
        scheduler.schedule(
            time.elapsed_secs(),
            DRAFT_RESUME_DELAY,
            DelayedAction::ResumeAfterDraft {
                phase: phase.current_phase,
            },
        );
        run_log.log(
            RunLogEventType::PowerUp,
            format!("Took {}", id.definition().name),
        );
        info!("Power-up taken: {}", id.definition().name);
    }
}

/// Apply the first recovery choice of a recovery phase and queue the advance.
pub fn apply_recovery_choice(
    time: Res<Time>,
    mut phase: ResMut<PhaseState>,
    mut scheduler: ResMut<DelayedActions>,
    mut run_log: ResMut<RunLog>,
    mut choices: EventReader<RecoveryChoiceMade>,
    mut player: Query<(&mut Player, &mut CombatEntity)>,
) {
    for RecoveryChoiceMade(choice) in choices.read() {
        if phase.stage != PhaseStage::RecoveryChoice || phase.recovery_choice.is_some() {
            continue;
        }
        if let Ok((mut player, mut combat)) = player.get_single_mut() {
            choice.apply(&mut player, &mut combat);
        }
        phase.recovery_choice = Some(*choice);
        scheduler.schedule(
            time.elapsed_secs(),
            RECOVERY_ADVANCE_DELAY,
            DelayedAction::AdvancePhase {
                phase: phase.current_phase,
            },
        );
        run_log.log(
            RunLogEventType::PhaseEvent,
            format!("Recovery choice: {:?}", choice),
        );
    }
}

/// Drive the per-tick stage transitions: clear detection, draft, door.
pub fn evaluate_phase(
    mut phase: ResMut<PhaseState>,
    mut draft: ResMut<PowerUpDraft>,
    mut rng: ResMut<GameRng>,
    mut run_log: ResMut<RunLog>,
    mut player: Query<(&Transform, &Hitbox, &mut Player)>,
    enemies: Query<&CombatEntity, With<Enemy>>,
    mut advance: EventWriter<AdvancePhaseRequested>,
    mut cues: EventWriter<PresentationCue>,
) {
    if phase.stage == PhaseStage::Active && phase.is_cleared() {
        phase.stage = PhaseStage::Cleared;
        run_log.log(
            RunLogEventType::PhaseEvent,
            format!("Phase {} cleared", phase.current_phase),
        );
    }

    if phase.stage == PhaseStage::Cleared {
        if phase.should_offer_power_up() {
            let offers = draw_offers(&mut rng);
            cues.send(PresentationCue::DraftOpened {
                offers: offers.to_vec(),
            });
            run_log.log(
                RunLogEventType::PowerUp,
                format!("Draft offered: {:?}", offers.as_slice()),
            );
            draft.open(offers);
            phase.power_up_offered = true;
            phase.enemies_active = false;
            phase.stage = PhaseStage::PowerUpDraft;
            if let Ok((_, _, mut player)) = player.get_single_mut() {
                player.can_move = false;
            }
        } else if enemies.iter().all(|c| !c.is_alive()) {
            phase.door_visible = true;
            phase.stage = PhaseStage::DoorOpen;
            cues.send(PresentationCue::DoorVisibility { visible: true });
            run_log.log(RunLogEventType::PhaseEvent, "Door opened".to_string());
        }
    }

    if phase.stage == PhaseStage::DoorOpen && phase.door_visible {
        let Ok((transform, hitbox, _)) = player.get_single() else {
            return;
        };
        let door = Hitbox {
            half_extents: Vec2::new(DOOR_HALF_EXTENTS.0, DOOR_HALF_EXTENTS.1),
        };
        let door_pos = Vec2::new(DOOR_POSITION.0, DOOR_POSITION.1);
        if hitbox.overlaps(transform.translation.truncate(), &door, door_pos) {
            advance.send(AdvancePhaseRequested);
        }
    }
}

/// Resolve advance requests. At most one advance per tick.
pub fn handle_phase_advance(
    time: Res<Time>,
    mut phase: ResMut<PhaseState>,
    mut run_log: ResMut<RunLog>,
    mut requests: EventReader<AdvancePhaseRequested>,
    mut player: Query<&mut Player>,
    mut transitions: EventWriter<SceneTransition>,
    mut cues: EventWriter<PresentationCue>,
) {
    if requests.read().count() == 0 || !phase.is_running() {
        return;
    }
    let door_was_visible = phase.door_visible;

    match phase.advance() {
        PhaseAdvance::Blocked => {
            debug!("Advance ignored: boss of phase {} still alive", phase.current_phase);
        }
        PhaseAdvance::Entered(next) => {
            if door_was_visible {
                cues.send(PresentationCue::DoorVisibility { visible: false });
            }
            run_log.log(RunLogEventType::PhaseEvent, format!("Advancing to phase {}", next));
        }
        PhaseAdvance::Complete => {
            let power_ups = match player.get_single_mut() {
                Ok(mut player) => {
                    player.can_move = false;
                    player.power_ups.clone()
                }
                Err(_) => Vec::new(),
            };
            let summary = phase.summary(time.elapsed_secs(), &power_ups);
            run_log.log(
                RunLogEventType::RunEvent,
                format!(
                    "Run complete: {} kills, {:.0} damage dealt, {:.0} taken in {:.1}s",
                    summary.monsters_killed, summary.damage_dealt, summary.damage_taken, summary.elapsed_secs
                ),
            );
            info!("Run complete after {:.1}s", summary.elapsed_secs);
            transitions.send(SceneTransition::RunSummary(summary));
        }
    }
}

/// Restart from phase 1. The wave sweep happens in `spawn_phase_wave`.
pub fn handle_reset_run(
    time: Res<Time>,
    mut resets: EventReader<ResetRun>,
    mut phase: ResMut<PhaseState>,
    mut draft: ResMut<PowerUpDraft>,
    mut scheduler: ResMut<DelayedActions>,
    mut run_log: ResMut<RunLog>,
    mut player: Query<(&mut Player, &mut CombatEntity, &mut Transform)>,
    mut transitions: EventWriter<SceneTransition>,
) {
    if resets.read().count() == 0 {
        return;
    }
    let was_running = phase.is_running();

    *phase = PhaseState::new(1);
    phase.run_started_at = time.elapsed_secs();
    draft.close();
    scheduler.clear();

    if let Ok((mut player, mut combat, mut transform)) = player.get_single_mut() {
        *player = Player::default();
        *combat = Player::combat_entity();
        let start = Player::start_position();
        transform.translation.x = start.x;
        transform.translation.y = start.y;
    }

    run_log.clear();
    run_log.log(RunLogEventType::RunEvent, "Run reset".to_string());
    info!("Run reset");

    if was_running {
        transitions.send(SceneTransition::Restart {
            reason: RestartReason::Requested,
        });
    }
}
