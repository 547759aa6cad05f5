//! Integration tests for boss phases
//!
//! These tests verify that:
//! - The spider lineage splits 1 -> 2 -> 4 and only then clears the phase
//! - Split children keep their tier's base health
//! - The mage enters fury once at 30% health and clears the phase on death
//! - Fury and teleports are written to the run log

mod common;

use common::*;
use gauntlet::combat::log::{RunLog, RunLogEventType};
use gauntlet::states::play_run::enemies::mage_boss::WarningCircle;
use gauntlet::states::play_run::enemies::{BossTier, EnemyKind, MageBoss, SplittingBoss};
use gauntlet::states::play_run::{CombatEntity, PhaseStage};

fn boss_log(app: &bevy::prelude::App) -> Vec<String> {
    app.world()
        .resource::<RunLog>()
        .filter_by_type(RunLogEventType::BossEvent)
        .into_iter()
        .map(|e| e.message.clone())
        .collect()
}

fn spider_tiers(app: &mut bevy::prelude::App) -> Vec<(BossTier, f32)> {
    let world = app.world_mut();
    let mut query = world.query::<(&SplittingBoss, &CombatEntity)>();
    query
        .iter(world)
        .filter(|(_, c)| c.is_alive())
        .map(|(s, c)| (s.tier, c.max_health))
        .collect()
}

#[test]
fn test_spider_phase_spawns_one_large_body() {
    let mut app = test_app(10, 21);

    let tiers = spider_tiers(&mut app);
    assert_eq!(tiers.len(), 1);
    assert_eq!(tiers[0].0, BossTier::Large);
    // Phase-scaled: 2500 + 9 * 20
    assert_eq!(tiers[0].1, 2680.0);
    assert_eq!(phase(&app).monsters_to_kill, 1);
}

#[test]
fn test_spider_lineage_must_be_destroyed_to_clear() {
    let mut app = test_app(30, 22);
    make_player_inert(&mut app);

    kill_all_enemies(&mut app);
    app.update();
    let mediums = spider_tiers(&mut app);
    assert_eq!(mediums.len(), 2);
    assert!(mediums.iter().all(|(tier, hp)| *tier == BossTier::Medium && *hp == 1250.0));

    step(&mut app, 0.2);
    let state = phase(&app);
    assert!(!state.boss_defeated, "children still alive");
    assert_eq!(state.stage, PhaseStage::Active);

    kill_all_enemies(&mut app);
    app.update();
    let smalls = spider_tiers(&mut app);
    assert_eq!(smalls.len(), 4);
    assert!(smalls.iter().all(|(tier, hp)| *tier == BossTier::Small && *hp == 750.0));

    kill_all_enemies(&mut app);
    app.update();
    assert!(spider_tiers(&mut app).is_empty(), "small spiders do not split");
    assert!(!phase(&app).boss_defeated, "lineage check is delayed");

    step(&mut app, 0.2);
    let state = phase(&app);
    assert!(state.boss_defeated);
    assert_eq!(state.monsters_killed, 7);
    assert_eq!(state.stage, PhaseStage::DoorOpen);
}

#[test]
fn test_mage_enters_fury_once() {
    let mut app = test_app(20, 23);
    make_player_inert(&mut app);
    step(&mut app, 1.6);
    assert!(phase(&app).enemies_active);

    let threshold_health = {
        let world = app.world_mut();
        let mut query = world.query::<(&MageBoss, &mut CombatEntity)>();
        let (mage, mut combat) = query.single_mut(world);
        assert!(!mage.fury);
        combat.health = combat.max_health * 0.3;
        combat.health
    };
    app.update();

    let world = app.world_mut();
    let mut query = world.query::<(&MageBoss, &CombatEntity)>();
    let (mage, combat) = query.single(world);
    assert!(mage.fury);
    assert_eq!(mage.attack_interval, 1.2);
    assert_eq!(combat.health, threshold_health, "fury does not touch health");

    step(&mut app, 0.5);
    let world = app.world_mut();
    let mut query = world.query::<&MageBoss>();
    assert_eq!(query.single(world).attack_interval, 1.2);

    let fury_entries = boss_log(&app)
        .iter()
        .filter(|m| m.starts_with("Mage boss enters fury"))
        .count();
    assert_eq!(fury_entries, 1);
}

#[test]
fn test_mage_teleport_is_logged() {
    let mut app = test_app(20, 26);
    make_player_inert(&mut app);
    assert!(!boss_log(&app).iter().any(|m| m.contains("teleports")));

    // First teleport starts eight seconds after spawn, relocation follows the fade.
    step(&mut app, 8.6);
    let teleports = boss_log(&app)
        .iter()
        .filter(|m| m.starts_with("Mage boss teleports to"))
        .count();
    assert_eq!(teleports, 1);
}

#[test]
fn test_mage_death_clears_phase_and_circles() {
    let mut app = test_app(40, 24);
    make_player_inert(&mut app);
    // The first circle goes down two seconds after the mage spawns.
    step(&mut app, 2.3);
    {
        let world = app.world_mut();
        let mut circles = world.query::<&WarningCircle>();
        assert_eq!(circles.iter(world).count(), 1);
    }

    assert_eq!(kill_enemies_where(&mut app, |e| e.kind == EnemyKind::MageBoss), 1);
    app.update();

    let state = phase(&app);
    assert!(state.boss_defeated);
    assert_eq!(state.stage, PhaseStage::DoorOpen);

    let world = app.world_mut();
    let mut circles = world.query::<&WarningCircle>();
    assert_eq!(circles.iter(world).count(), 0);
}
