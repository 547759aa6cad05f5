//! Data-Driven Enemy Configuration
//!
//! Base stats for every `EnemyKind` and the splitting-boss tier table, loaded
//! from `assets/config/enemies.ron`. The file is embedded at compile time as
//! the default, and a different file can be supplied for balance experiments.
//!
//! ## Usage
//! ```ignore
//! fn my_system(defs: Res<EnemyDefinitions>) {
//!     let plant = defs.stats(EnemyKind::PlantShooter);
//!     println!("Plant health: {}", plant.max_health);
//! }
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::components::GameRng;
use super::enemies::{BossTier, EnemyKind};

/// Embedded copy of the default enemy table.
pub const DEFAULT_ENEMIES_RON: &str = include_str!("../../../assets/config/enemies.ron");

/// Base stats for one enemy kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyStats {
    /// Display name
    pub name: String,
    pub max_health: f32,
    /// Contact and projectile damage
    pub damage: f32,
    /// Movement speed in px/s (0 for stationary kinds)
    pub speed: f32,
    /// Invincibility window after a landed hit, in seconds
    pub invincibility: f32,
    /// Collision box (width, height)
    pub hitbox: (f32, f32),
    /// Relative weight in normal waves (bosses use 0)
    #[serde(default)]
    pub spawn_weight: u32,
}

/// Stats for one splitting-boss tier.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BossTierStats {
    pub max_health: f32,
    pub speed: f32,
    /// Square hitbox side
    pub size: f32,
}

/// Raw file layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemiesConfig {
    pub enemies: HashMap<EnemyKind, EnemyStats>,
    pub spider_tiers: HashMap<BossTier, BossTierStats>,
}

/// Validated enemy tables, indexed by the closed enums.
#[derive(Resource, Clone, Debug)]
pub struct EnemyDefinitions {
    enemies: Vec<EnemyStats>,
    tiers: Vec<BossTierStats>,
    total_spawn_weight: u32,
}

impl Default for EnemyDefinitions {
    /// Parse the embedded table. The embedded file is covered by tests, so a
    /// failure here is a build defect.
    fn default() -> Self {
        Self::from_ron_str(DEFAULT_ENEMIES_RON)
            .unwrap_or_else(|e| panic!("Embedded enemy table is invalid: {}", e))
    }
}

impl EnemyDefinitions {
    /// Build from a parsed config, rejecting missing kinds, missing tiers and
    /// nonsensical numbers.
    pub fn new(mut config: EnemiesConfig) -> Result<Self, String> {
        let mut enemies = Vec::with_capacity(EnemyKind::ALL.len());
        let mut missing = Vec::new();
        for kind in EnemyKind::ALL {
            match config.enemies.remove(&kind) {
                Some(stats) => {
                    Self::validate_stats(kind, &stats)?;
                    enemies.push(stats);
                }
                None => missing.push(kind),
            }
        }
        if !missing.is_empty() {
            return Err(format!("Missing enemy definitions: {:?}", missing));
        }

        let mut tiers = Vec::with_capacity(BossTier::ALL.len());
        for tier in BossTier::ALL {
            let stats = config
                .spider_tiers
                .remove(&tier)
                .ok_or_else(|| format!("Missing spider tier: {:?}", tier))?;
            if stats.max_health <= 0.0 || stats.size <= 0.0 || stats.speed < 0.0 {
                return Err(format!("Spider tier {:?} has invalid stats", tier));
            }
            tiers.push(stats);
        }

        let total_spawn_weight = EnemyKind::NORMAL
            .iter()
            .map(|kind| enemies[kind.index()].spawn_weight)
            .sum();
        if total_spawn_weight == 0 {
            return Err("Normal enemy spawn weights sum to zero".to_string());
        }

        Ok(Self {
            enemies,
            tiers,
            total_spawn_weight,
        })
    }

    fn validate_stats(kind: EnemyKind, stats: &EnemyStats) -> Result<(), String> {
        if !(stats.max_health > 0.0) {
            return Err(format!("{:?}: max_health must be positive", kind));
        }
        if stats.damage < 0.0 || stats.speed < 0.0 || stats.invincibility < 0.0 {
            return Err(format!("{:?}: damage, speed and invincibility must not be negative", kind));
        }
        if stats.hitbox.0 <= 0.0 || stats.hitbox.1 <= 0.0 {
            return Err(format!("{:?}: hitbox must be positive", kind));
        }
        Ok(())
    }

    /// Parse and validate RON text.
    pub fn from_ron_str(contents: &str) -> Result<Self, String> {
        let config: EnemiesConfig =
            ron::from_str(contents).map_err(|e| format!("Failed to parse enemy table: {}", e))?;
        Self::new(config)
    }

    /// Load and validate a RON file.
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let definitions = Self::from_ron_str(&contents)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        info!("Loaded enemy definitions from {}", path.display());
        Ok(definitions)
    }

    pub fn stats(&self, kind: EnemyKind) -> &EnemyStats {
        &self.enemies[kind.index()]
    }

    pub fn tier(&self, tier: BossTier) -> &BossTierStats {
        &self.tiers[tier.index()]
    }

    /// Weighted pick among the normal kinds.
    pub fn roll_normal_kind(&self, rng: &mut GameRng) -> EnemyKind {
        let mut roll = rng.random_u32_inclusive(0, self.total_spawn_weight - 1);
        for kind in EnemyKind::NORMAL {
            let weight = self.stats(kind).spawn_weight;
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        EnemyKind::Melee
    }
}

/// Bevy plugin that installs `EnemyDefinitions`, from a file when one is given.
#[derive(Default)]
pub struct EnemyConfigPlugin {
    pub path: Option<PathBuf>,
}

impl Plugin for EnemyConfigPlugin {
    fn build(&self, app: &mut App) {
        let loaded = match &self.path {
            Some(path) => EnemyDefinitions::load_from_file(path),
            None => EnemyDefinitions::from_ron_str(DEFAULT_ENEMIES_RON),
        };
        match loaded {
            Ok(definitions) => {
                app.insert_resource(definitions);
            }
            Err(e) => {
                // Config must be valid before a run starts
                panic!("Failed to load enemy definitions: {}", e);
            }
        }
    }
}
