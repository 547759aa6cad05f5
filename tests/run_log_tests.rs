//! Integration tests for the run log
//!
//! These tests verify that:
//! - Damage entries use the "<source> hits <target> for <amount>" format
//! - Phase lifecycle events are recorded
//! - Saved logs are valid JSON carrying the run metadata

mod common;

use common::*;
use gauntlet::combat::events::{DamageDealt, DamageSource, DamageTarget, RunSummary};
use gauntlet::combat::log::{RunLog, RunLogEventType, RunMetadata};
use gauntlet::states::play_run::enemies::EnemyKind;
use gauntlet::states::play_run::DamageOutcome;
use regex::Regex;

fn damage_pattern() -> Regex {
    Regex::new(r"^[A-Za-z ]+ hits [A-Za-z ]+ for \d+( \(lethal\))?$").unwrap()
}

#[test]
fn test_damage_entries_follow_format() {
    let mut app = test_app(1, 31);

    send(
        &mut app,
        DamageDealt {
            source: DamageSource::PlayerArrow,
            target: DamageTarget::Enemy(EnemyKind::Animal),
            amount: 200.0,
            outcome: DamageOutcome::Wounded,
        },
    );
    send(
        &mut app,
        DamageDealt {
            source: DamageSource::Blast,
            target: DamageTarget::Player,
            amount: 350.0,
            outcome: DamageOutcome::Lethal,
        },
    );
    app.update();

    let log = app.world().resource::<RunLog>();
    let damage = log.filter_by_type(RunLogEventType::Damage);
    let messages: Vec<&str> = damage.iter().map(|e| e.message.as_str()).collect();
    assert!(messages.contains(&"Arrow hits Animal for 200"));
    assert!(messages.contains(&"Blast hits Player for 350 (lethal)"));

    let pattern = damage_pattern();
    for message in &messages {
        assert!(pattern.is_match(message), "bad damage entry: {}", message);
    }

    let state = phase(&app);
    assert_eq!(state.damage_dealt, 200.0);
    assert_eq!(state.damage_taken, 350.0);
}

#[test]
fn test_simulated_damage_entries_follow_format() {
    let mut app = test_app(1, 32);
    step(&mut app, 6.0);

    let pattern = damage_pattern();
    let log = app.world().resource::<RunLog>();
    for entry in log.filter_by_type(RunLogEventType::Damage) {
        assert!(pattern.is_match(&entry.message), "bad damage entry: {}", entry.message);
    }
}

#[test]
fn test_phase_lifecycle_is_logged() {
    let app = test_app(1, 33);
    let log = app.world().resource::<RunLog>();

    let starts = log.filter_by_type(RunLogEventType::RunEvent);
    assert_eq!(starts[0].message, "Run started at phase 1");

    let entered = Regex::new(r"^Phase \d+ entered: \d+ enemies$").unwrap();
    assert!(log
        .filter_by_type(RunLogEventType::PhaseEvent)
        .iter()
        .any(|e| entered.is_match(&e.message)));
}

#[test]
fn test_saved_log_round_trips_metadata() {
    let mut log = RunLog::default();
    log.run_time = 4.5;
    log.log(RunLogEventType::PhaseEvent, "Phase 1 cleared".to_string());
    log.log_damage(&DamageDealt {
        source: DamageSource::PlayerArrow,
        target: DamageTarget::Enemy(EnemyKind::Melee),
        amount: 200.0,
        outcome: DamageOutcome::Wounded,
    });

    let metadata = RunMetadata {
        outcome: "Victory".to_string(),
        random_seed: Some(99),
        summary: RunSummary {
            elapsed_secs: 4.5,
            monsters_killed: 5,
            damage_dealt: 200.0,
            damage_taken: 0.0,
            final_phase: 1,
            score: 1,
            power_ups: Vec::new(),
        },
    };

    let path = std::env::temp_dir().join("gauntlet_run_log_test.json");
    let written = log
        .save_to_file(&metadata, Some(path.to_str().unwrap()))
        .unwrap();

    let contents = std::fs::read_to_string(&written).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["metadata"]["outcome"], "Victory");
    assert_eq!(json["metadata"]["random_seed"], 99);
    assert_eq!(json["metadata"]["summary"]["monsters_killed"], 5);
    assert_eq!(json["damage_by_source"]["Arrow"], 200.0);
    assert_eq!(json["entries"].as_array().unwrap().len(), 2);
    assert_eq!(json["entries"][1]["timestamp"], 4.5);

    let _ = std::fs::remove_file(written);
}
