//! Run Constants
//!
//! Centralized location for the timing, geometry and balance numbers used by
//! the encounter loop. Per-enemy base stats live in `assets/config/enemies.ron`;
//! everything here is behaviour tuning that the systems reference directly.
//!
//! All distances are in arena pixels and all durations in seconds of run time.
//! The arena uses screen orientation: `y` grows downward, so the door sits at
//! the top edge and the player starts at the bottom.

// ============================================================================
// Arena Geometry
// ============================================================================

/// Side length of one grid cell.
pub const CELL_SIZE: f32 = 60.0;

/// The arena is a square grid of this many cells per side.
pub const GRID_CELLS: u32 = 9;

/// Arena width and height (9 cells of 60 px).
pub const ARENA_SIZE: f32 = CELL_SIZE * GRID_CELLS as f32;

/// Player start position: horizontally centred, 30 px above the bottom edge.
pub const PLAYER_START: (f32, f32) = (ARENA_SIZE / 2.0, ARENA_SIZE - 30.0);

/// Door centre, just beyond the top edge.
pub const DOOR_POSITION: (f32, f32) = (ARENA_SIZE / 2.0, -20.0);

/// Half extents of the door's trigger rectangle.
pub const DOOR_HALF_EXTENTS: (f32, f32) = (40.0, 50.0);

// ============================================================================
// Obstacles
// ============================================================================

/// Obstacles generated on a normal phase (inclusive range).
pub const OBSTACLE_COUNT_MIN: u32 = 3;
pub const OBSTACLE_COUNT_MAX: u32 = 5;

/// Obstacles never occupy a cell whose centre is this close to the player start.
pub const OBSTACLE_PLAYER_CLEARANCE: f32 = 120.0;

/// Enemies and hostile projectiles are blocked within this distance of an obstacle.
pub const OBSTACLE_BLOCK_RADIUS: f32 = 30.0;

/// The player is blocked within this distance of an obstacle.
pub const PLAYER_OBSTACLE_RADIUS: f32 = 40.0;

// ============================================================================
// Phase Structure
// ============================================================================

/// Last phase of a run; clearing it completes the run.
pub const FINAL_PHASE: u32 = 50;

/// Every phase divisible by this is a boss phase.
pub const BOSS_PHASE_INTERVAL: u32 = 10;

/// Phases that replace combat with a recovery choice.
pub const RECOVERY_PHASES: [u32; 5] = [5, 15, 25, 35, 45];

/// Kills required to clear a normal phase (and the size of its wave).
pub const NORMAL_WAVE_SIZE: u32 = 5;

/// Kills required on a boss phase, in addition to the boss-defeated signal.
pub const BOSS_KILL_TARGET: u32 = 1;

/// Enemies stay inert this long after a wave spawns.
pub const SPAWN_GRACE_PERIOD: f32 = 1.5;

/// Normal enemies spawn at least this far from the player.
pub const ENEMY_MIN_SPAWN_DISTANCE: f32 = 400.0;

/// Normal enemies spawn inside the arena inset by this margin.
pub const ENEMY_SPAWN_INSET: f32 = 30.0;

/// Random placement attempts before falling back to the best candidate seen.
pub const PLACEMENT_ATTEMPTS: u32 = 64;

/// Bosses spawn horizontally centred at this height.
pub const BOSS_SPAWN_Y: f32 = 100.0;

/// Per-phase buff: max health added for each phase after the first.
pub const PHASE_HEALTH_BUFF: f32 = 20.0;

/// Per-phase buff: damage added for each phase after the first.
pub const PHASE_DAMAGE_BUFF: f32 = 3.0;

// ============================================================================
// Player
// ============================================================================

pub const PLAYER_MAX_HEALTH: f32 = 2000.0;
pub const PLAYER_INVINCIBILITY: f32 = 1.0;
pub const PLAYER_SPEED: f32 = 180.0;
pub const PLAYER_HALF_EXTENTS: (f32, f32) = (30.0, 40.0);

/// Base arrow damage and cooldown between volleys.
pub const ARROW_DAMAGE: f32 = 200.0;
pub const ARROW_COOLDOWN: f32 = 1.0;

/// Attack-speed upgrades never push the cooldown below this.
pub const ARROW_COOLDOWN_FLOOR: f32 = 0.15;

pub const ARROW_SPEED: f32 = 400.0;

/// An arrow connects when it is this close to its target.
pub const ARROW_HIT_RADIUS: f32 = 30.0;

/// Delay between consecutive arrows of one multi-arrow volley.
pub const MULTI_ARROW_STAGGER: f32 = 0.3;

/// Damage the player deals back on body contact, at most once per cooldown.
pub const CONTACT_RETALIATION_DAMAGE: f32 = 10.0;
pub const CONTACT_RETALIATION_COOLDOWN: f32 = 1.0;

// ============================================================================
// Ranged Enemies
// ============================================================================

/// Default distance at which a hostile projectile strikes the player.
pub const PROJECTILE_HIT_RADIUS: f32 = 30.0;

pub const PLANT_SHOT_INTERVAL: f32 = 2.0;
pub const PLANT_PROJECTILE_SPEED: f32 = 120.0;

pub const STONE_SHOT_INTERVAL: f32 = 2.5;
pub const STONE_PROJECTILE_SPEED: f32 = 120.0;
pub const STONE_PROJECTILE_COUNT: u32 = 3;
pub const STONE_MAX_BOUNCES: u32 = 3;
pub const STONE_MOVE_SECS: f32 = 1.0;
pub const STONE_PAUSE_SECS: f32 = 1.5;

pub const TORNADO_SHOT_INTERVAL: f32 = 3.5;
pub const TORNADO_PROJECTILE_SPEED: f32 = 72.0;
pub const TORNADO_PROJECTILE_TTL: f32 = 4.0;
pub const TORNADO_HIT_RADIUS: f32 = 35.0;
pub const TORNADO_MOVE_SECS: f32 = 1.0;
pub const TORNADO_PAUSE_SECS: f32 = 2.0;

/// Homing projectiles survive this far outside the arena before despawning.
pub const HOMING_OUT_OF_BOUNDS_SLACK: f32 = 30.0;

/// Roaming enemies pick a new direction this often.
pub const ROAM_TURN_INTERVAL: f32 = 1.5;

// ============================================================================
// Splitting Boss
// ============================================================================

pub const SPIDER_TURN_INTERVAL: f32 = 2.0;

/// The spider bounces off an inner wall inset by this margin.
pub const SPIDER_BOUNCE_MARGIN: f32 = 40.0;

/// Children appear within this offset of the parent on each axis.
pub const SPLIT_SPAWN_OFFSET: f32 = 100.0;

/// Children are clamped into the arena inset by this margin.
pub const SPLIT_SPAWN_INSET: f32 = 50.0;

/// Delay before the lineage is re-checked after a tier dies.
pub const LINEAGE_CHECK_DELAY: f32 = 0.1;

// ============================================================================
// Mage Boss
// ============================================================================

/// Health fraction at or below which the mage enters fury.
pub const MAGE_FURY_THRESHOLD: f32 = 0.3;
pub const MAGE_ATTACK_INTERVAL: f32 = 2.0;
pub const MAGE_FURY_ATTACK_INTERVAL: f32 = 1.2;
pub const MAGE_REPOSITION_INTERVAL: f32 = 3.0;
pub const MAGE_REPOSITION_MIN_PLAYER_DISTANCE: f32 = 150.0;
pub const MAGE_ARRIVAL_TOLERANCE: f32 = 5.0;
pub const MAGE_MOVE_INSET: f32 = 60.0;
pub const MAGE_TELEPORT_INTERVAL: f32 = 8.0;
pub const MAGE_FADE_SECS: f32 = 0.3;

/// Fury volleys place between these many circles (inclusive).
pub const MAGE_FURY_CIRCLES_MIN: u32 = 3;
pub const MAGE_FURY_CIRCLES_MAX: u32 = 5;
pub const MAGE_FURY_CIRCLE_STAGGER: f32 = 0.2;

/// Chance that a circle is placed near the player rather than anywhere.
pub const BLAST_NEAR_PLAYER_CHANCE: f32 = 0.7;
pub const BLAST_NEAR_PLAYER_OFFSET: f32 = 80.0;
pub const BLAST_PLACEMENT_INSET: f32 = 40.0;
pub const BLAST_RADIUS: f32 = 50.0;
pub const BLAST_FUSE_SECS: f32 = 1.0;

// ============================================================================
// Power-Ups & Recovery
// ============================================================================

/// Number of distinct options shown by a draft.
pub const DRAFT_OFFER_COUNT: usize = 3;

/// Gameplay resumes this long after a draft selection.
pub const DRAFT_RESUME_DELAY: f32 = 1.0;

pub const RECOVERY_HEAL: f32 = 100.0;
pub const RECOVERY_ARROW_DAMAGE: f32 = 50.0;

/// The phase advances this long after a recovery choice.
pub const RECOVERY_ADVANCE_DELAY: f32 = 2.5;
