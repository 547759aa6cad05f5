//! Integration tests for headless run execution
//!
//! These tests verify that:
//! - Headless runs end with a result and a saved log
//! - Seeded runs are reproducible
//! - JSON configs load from disk and reject bad values

use gauntlet::headless::{run_headless, HeadlessRunConfig, RunOutcome};
use gauntlet::states::play_run::{PowerUpId, RecoveryChoice};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("gauntlet_{}.json", name))
}

/// Helper to create a short, quiet, seeded run config
fn create_config(seed: u64, max_duration_secs: f32, output: &str) -> HeadlessRunConfig {
    HeadlessRunConfig {
        random_seed: Some(seed),
        max_duration_secs,
        output_path: Some(temp_path(output).to_string_lossy().into_owned()),
        enable_logging: false,
        draft_preference: vec!["multi_arrow".to_string(), "damage_plus".to_string()],
        ..HeadlessRunConfig::default()
    }
}

#[test]
fn test_headless_run_ends_with_result_and_log() {
    let config = create_config(42, 20.0, "headless_result");
    let result = run_headless(config).expect("run should finish");

    assert_ne!(result.outcome, RunOutcome::Victory, "fifty phases do not fit in 20s");
    assert_eq!(result.random_seed, Some(42));
    assert!(result.summary.final_phase >= 1);

    let path = result.log_path.expect("log should be saved");
    let contents = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(json["metadata"]["outcome"], result.outcome.label());
    assert!(json["entries"].as_array().map_or(false, |e| !e.is_empty()));
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let first = run_headless(create_config(7, 15.0, "repro_a")).unwrap();
    let second = run_headless(create_config(7, 15.0, "repro_b")).unwrap();

    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first.summary.final_phase, second.summary.final_phase);
    assert_eq!(first.summary.monsters_killed, second.summary.monsters_killed);
    assert_eq!(first.summary.damage_dealt, second.summary.damage_dealt);
    assert_eq!(first.summary.damage_taken, second.summary.damage_taken);

    for result in [first, second] {
        if let Some(path) = result.log_path {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[test]
fn test_config_loads_from_file() {
    let path = temp_path("config_load");
    std::fs::write(
        &path,
        r#"{
            "random_seed": 5,
            "start_phase": 15,
            "draft_preference": ["attack_speed"],
            "recovery_choice": "empower",
            "fast_forward": false
        }"#,
    )
    .unwrap();

    let config = HeadlessRunConfig::load_from_file(&path).unwrap();
    assert_eq!(config.random_seed, Some(5));
    assert_eq!(config.start_phase, 15);
    assert_eq!(config.recovery_choice, RecoveryChoice::Empower);
    assert_eq!(config.draft_preferences().unwrap(), vec![PowerUpId::AttackSpeed]);
    assert!(!config.fast_forward);
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_invalid_config_is_rejected_before_running() {
    let config = HeadlessRunConfig {
        start_phase: 0,
        enable_logging: false,
        ..HeadlessRunConfig::default()
    };
    assert!(run_headless(config).is_err());

    assert!(HeadlessRunConfig::load_from_file(&temp_path("does_not_exist")).is_err());
}
