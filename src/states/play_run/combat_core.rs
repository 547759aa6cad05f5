//! Core combat resolution: body contact and the death transition.

use bevy::prelude::*;

use crate::combat::events::{
    BossDefeated, DamageDealt, DamageSource, DamageTarget, EnemyDefeated, PresentationCue,
};
use crate::combat::log::{RunLog, RunLogEventType};
use super::components::*;
use super::constants::*;
use super::enemies::mage_boss::WarningCircle;
use super::enemies::splitting_boss::{self, split_children, SplittingBoss};
use super::enemies::MageBoss;
use super::enemy_config::EnemyDefinitions;
use super::phase_flow::PhaseState;
use super::scheduler::{DelayedAction, DelayedActions};

/// Resolve body contact between the player and live enemies.
///
/// Every overlapping enemy attempts its damage (the player's own invincibility
/// window decides whether it lands). The player answers with retaliation
/// damage at most once per retaliation cooldown, across all enemies.
pub fn resolve_contact_damage(
    time: Res<Time>,
    mut player: Query<(Entity, &Transform, &Hitbox, &mut CombatEntity, &mut Player), Without<Enemy>>,
    mut enemies: Query<
        (Entity, &Transform, &Hitbox, &mut CombatEntity, &Enemy, Option<&SplittingBoss>),
        Without<Player>,
    >,
    mut damage_events: EventWriter<DamageDealt>,
    mut cues: EventWriter<PresentationCue>,
) {
    let Ok((player_entity, player_transform, player_hitbox, mut player_combat, mut player_stats)) =
        player.get_single_mut()
    else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let now = time.elapsed_secs();

    for (enemy_entity, transform, hitbox, mut enemy_combat, enemy, splitting) in enemies.iter_mut() {
        if !enemy_combat.is_alive() || !player_combat.is_alive() {
            continue;
        }
        if !player_hitbox.overlaps(player_pos, hitbox, transform.translation.truncate()) {
            continue;
        }

        let outcome = player_combat.take_damage(enemy_combat.damage, now);
        if outcome.landed() {
            damage_events.send(DamageDealt {
                source: DamageSource::EnemyContact(enemy.kind),
                target: DamageTarget::Player,
                amount: enemy_combat.damage,
                outcome,
            });
            cues.send(PresentationCue::Hit {
                entity: player_entity,
                amount: enemy_combat.damage,
                health_fraction: player_combat.health_fraction(),
            });
        }

        if player_stats.retaliation_ready(now) {
            player_stats.last_retaliation_at = Some(now);
            let outcome = enemy_combat.take_damage(CONTACT_RETALIATION_DAMAGE, now);
            if outcome.landed() {
                damage_events.send(DamageDealt {
                    source: DamageSource::PlayerContact,
                    target: DamageTarget::Enemy(enemy.kind),
                    amount: CONTACT_RETALIATION_DAMAGE,
                    outcome,
                });
                cues.send(PresentationCue::Hit {
                    entity: enemy_entity,
                    amount: CONTACT_RETALIATION_DAMAGE,
                    health_fraction: enemy_combat.health_fraction(),
                });
                if splitting.is_some() {
                    cues.send(PresentationCue::Flash { entity: enemy_entity });
                }
            }
        }
    }
}

/// Finish the death of every `Dying` enemy.
///
/// Runs the removal exactly once per entity: reports the kill, spawns split
/// children before the parent goes, schedules the lineage check, clears a
/// mage's circles and queued placements, then despawns.
pub fn resolve_deaths(
    mut commands: Commands,
    time: Res<Time>,
    arena: Res<Arena>,
    defs: Res<EnemyDefinitions>,
    phase: Res<PhaseState>,
    mut rng: ResMut<GameRng>,
    mut scheduler: ResMut<DelayedActions>,
    mut run_log: ResMut<RunLog>,
    mut enemies: Query<(
        Entity,
        &Transform,
        &Enemy,
        &mut CombatEntity,
        Option<&SplittingBoss>,
        Option<&MageBoss>,
    )>,
    circles: Query<(Entity, &WarningCircle)>,
    mut defeated: EventWriter<EnemyDefeated>,
    mut boss_defeated: EventWriter<BossDefeated>,
    mut cues: EventWriter<PresentationCue>,
) {
    let now = time.elapsed_secs();

    for (entity, transform, enemy, mut combat, splitting, mage) in enemies.iter_mut() {
        if combat.life != LifeState::Dying {
            continue;
        }
        if !combat.begin_removal() {
            continue;
        }
        let position = transform.translation.truncate();

        defeated.send(EnemyDefeated {
            entity,
            kind: enemy.kind,
            position,
        });
        cues.send(PresentationCue::Died { entity, position });
        run_log.log(RunLogEventType::Death, format!("{} defeated", enemy.kind.name()));

        if let Some(boss) = splitting {
            let children = split_children(boss.tier, position, &arena, &mut rng);
            for (tier, child_pos) in &children {
                splitting_boss::spawn_tier(&mut commands, &defs, &mut rng, *tier, *child_pos, now, None);
            }
            if !children.is_empty() {
                info!("{:?} spider split into {} children", boss.tier, children.len());
                run_log.log(
                    RunLogEventType::BossEvent,
                    format!("{:?} spider split into {} children", boss.tier, children.len()),
                );
            }
            scheduler.schedule(
                now,
                LINEAGE_CHECK_DELAY,
                DelayedAction::CheckBossLineage {
                    phase: phase.current_phase,
                },
            );
        }

        if mage.is_some() {
            for (circle_entity, circle) in circles.iter() {
                if circle.owner == entity {
                    commands.entity(circle_entity).despawn();
                }
            }
            boss_defeated.send(BossDefeated {
                phase: phase.current_phase,
            });
            run_log.log(RunLogEventType::BossEvent, "Mage boss defeated".to_string());
        }

        scheduler.cancel_owned_by(entity);
        commands.entity(entity).despawn();
        combat.debug_validate();
    }
}
