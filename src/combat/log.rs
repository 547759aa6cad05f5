//! Run logging
//!
//! Records run events for post-run analysis and the headless report.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use super::events::{DamageDealt, RunSummary};

/// A single entry in the run log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    /// Timestamp in run time (seconds since the run started)
    pub timestamp: f32,
    /// The type of event
    pub event_type: RunLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of run log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunLogEventType {
    /// Damage dealt or taken
    Damage,
    /// Enemy or player died
    Death,
    /// Phase entered, cleared, door opened
    PhaseEvent,
    /// Draft offered or power-up taken
    PowerUp,
    /// Boss split, fury, teleport, defeat
    BossEvent,
    /// Run start, completion, reset
    RunEvent,
}

/// Metadata written alongside the entries when a log is saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// "Victory", "Defeated" or "TimedOut"
    pub outcome: String,
    pub random_seed: Option<u64>,
    pub summary: RunSummary,
}

#[derive(Serialize)]
struct SavedRunLog<'a> {
    metadata: &'a RunMetadata,
    damage_by_source: HashMap<String, f32>,
    entries: &'a [RunLogEntry],
}

/// The run log resource storing all events
#[derive(Resource, Default, Debug)]
pub struct RunLog {
    /// All log entries in chronological order
    pub entries: Vec<RunLogEntry>,
    /// Current run time
    pub run_time: f32,
}

impl RunLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.run_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: RunLogEventType, message: String) {
        self.entries.push(RunLogEntry {
            timestamp: self.run_time,
            event_type,
            message,
        });
    }

    /// Log a landed hit in the standard format:
    /// `"<source> hits <target> for <amount>"`, with a `" (lethal)"` suffix on kills.
    pub fn log_damage(&mut self, damage: &DamageDealt) {
        let lethal = matches!(
            damage.outcome,
            crate::states::play_run::components::DamageOutcome::Lethal
        );
        self.log(
            RunLogEventType::Damage,
            format!(
                "{} hits {} for {:.0}{}",
                damage.source.label(),
                damage.target.label(),
                damage.amount,
                if lethal { " (lethal)" } else { "" }
            ),
        );
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: RunLogEventType) -> Vec<&RunLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&RunLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Sum damage per source label, parsed back out of damage entries.
    pub fn total_damage_by_source(&self) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in self.filter_by_type(RunLogEventType::Damage) {
            let Some((source, rest)) = entry.message.split_once(" hits ") else {
                continue;
            };
            let Some((_, amount)) = rest.rsplit_once(" for ") else {
                continue;
            };
            let amount = amount.trim_end_matches(" (lethal)");
            if let Ok(value) = amount.parse::<f32>() {
                *totals.entry(source.to_string()).or_insert(0.0) += value;
            }
        }
        totals
    }

    /// Save the log as pretty JSON. Without an explicit path, writes to
    /// `run_logs/run_<unix-seconds>.json`. Returns the path written.
    pub fn save_to_file(&self, metadata: &RunMetadata, output_path: Option<&str>) -> Result<String, String> {
        let path = match output_path {
            Some(path) => path.to_string(),
            None => {
                let stamp = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                format!("run_logs/run_{}.json", stamp)
            }
        };

        if let Some(parent) = Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
            }
        }

        let saved = SavedRunLog {
            metadata,
            damage_by_source: self.total_damage_by_source(),
            entries: &self.entries,
        };
        let json = serde_json::to_string_pretty(&saved)
            .map_err(|e| format!("Failed to serialize run log: {}", e))?;
        std::fs::write(&path, json).map_err(|e| format!("Failed to write {}: {}", path, e))?;
        Ok(path)
    }
}
