//! Component Definitions for Play Run
//!
//! This module contains the ECS components, resources and small value types
//! shared by every stage of the encounter loop.
//!
//! ## Groups
//!
//! - Resources: `GameRng`, `Arena`, `ControlIntent`
//! - Combat: `CombatEntity`, `LifeState`, `DamageOutcome`, `Hitbox`
//! - Actors: `Player`, `Enemy`, `Obstacle`, `WaveEntity`
//!
//! Projectile, arrow and warning-circle components live next to the systems
//! that move them (`projectiles`, `enemies::mage_boss`).

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::constants::*;
use super::enemies::EnemyKind;
use super::power_ups::PowerUpId;

// ============================================================================
// Resources
// ============================================================================

/// Seeded random number generator for deterministic runs.
///
/// When a seed is provided (e.g., via headless config), the same seed and the
/// same inputs always produce the same run. Without a seed, uses system entropy.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }

    /// Uniform integer in `min..=max`.
    pub fn random_u32_inclusive(&mut self, min: u32, max: u32) -> u32 {
        self.rng.gen_range(min..=max)
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    pub fn random_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// `amount` distinct indices below `len`, in random order.
    pub fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, len, amount.min(len)).into_vec()
    }

    /// Returns true with probability `p`.
    pub fn chance(&mut self, p: f32) -> bool {
        self.random_f32() < p
    }

    /// A direction whose components are each drawn from {-1, 0, 1}, normalized.
    /// May be zero (standing still is a valid roam step).
    pub fn grid_direction(&mut self) -> Vec2 {
        let x = self.rng.gen_range(-1i32..=1) as f32;
        let y = self.rng.gen_range(-1i32..=1) as f32;
        Vec2::new(x, y).normalize_or_zero()
    }

    /// A uniformly random unit vector.
    pub fn unit_direction(&mut self) -> Vec2 {
        let angle = self.random_range(0.0, std::f32::consts::TAU);
        Vec2::from_angle(angle)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Axis-aligned playable area. `y` grows downward (screen orientation).
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::splat(ARENA_SIZE),
        }
    }
}

impl Arena {
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// The arena shrunk by `margin` on every side. Degenerate insets collapse to the centre.
    pub fn inset(&self, margin: f32) -> Arena {
        let min = self.min + Vec2::splat(margin);
        let max = self.max - Vec2::splat(margin);
        if min.x > max.x || min.y > max.y {
            let c = self.center();
            return Arena { min: c, max: c };
        }
        Arena { min, max }
    }

    /// Clamp a point so it lies inside the arena.
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }

    /// Clamp a centre so a box of `half_extents` stays fully inside.
    pub fn clamp_box(&self, center: Vec2, half_extents: Vec2) -> Vec2 {
        self.inset_xy(half_extents).clamp_point(center)
    }

    fn inset_xy(&self, half_extents: Vec2) -> Arena {
        let min = self.min + half_extents;
        let max = self.max - half_extents;
        Arena {
            min: min.min(self.center()),
            max: max.max(self.center()),
        }
    }

    pub fn random_point(&self, rng: &mut GameRng) -> Vec2 {
        Vec2::new(
            rng.random_range(self.min.x, self.max.x),
            rng.random_range(self.min.y, self.max.y),
        )
    }
}

/// Movement requested by the input collaborator, polled once per tick.
///
/// Zero means "stand still", which is also when the player auto-fires.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ControlIntent {
    pub movement: Vec2,
}

// ============================================================================
// Combat Entity
// ============================================================================

/// Where an entity is in its combat lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifeState {
    #[default]
    Alive,
    /// Lethal damage landed; removal is pending.
    Dying,
    /// Removal has run. Terminal.
    Dead,
}

/// Result of a single damage attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Dead, invincible, or the amount was not a positive finite number.
    Ignored,
    Wounded,
    Lethal,
}

impl DamageOutcome {
    pub fn landed(self) -> bool {
        !matches!(self, DamageOutcome::Ignored)
    }
}

/// Shared combat state for the player and every enemy variant.
///
/// Variant behaviour (movement, attacks, splitting, teleporting) lives in
/// separate components; this one only owns health, damage intake and the
/// death transition.
#[derive(Component, Debug, Clone)]
pub struct CombatEntity {
    pub health: f32,
    pub max_health: f32,
    /// Damage this entity deals on contact or through its projectiles.
    pub damage: f32,
    /// Run-clock time until which incoming damage is ignored.
    pub invincible_until: f32,
    pub invincibility_duration: f32,
    pub life: LifeState,
}

impl CombatEntity {
    pub fn new(max_health: f32, damage: f32, invincibility_duration: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            damage,
            invincible_until: f32::NEG_INFINITY,
            invincibility_duration,
            life: LifeState::Alive,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    pub fn is_invincible(&self, now: f32) -> bool {
        now < self.invincible_until
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// Apply damage at run time `now`.
    ///
    /// A landed hit opens an invincibility window; a lethal hit clamps health
    /// to zero and moves the entity to `Dying`. Nothing else happens here:
    /// removal and bookkeeping are `begin_removal`'s job.
    pub fn take_damage(&mut self, amount: f32, now: f32) -> DamageOutcome {
        if !self.is_alive() || self.is_invincible(now) {
            return DamageOutcome::Ignored;
        }
        if !amount.is_finite() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }

        self.health -= amount;
        self.invincible_until = now + self.invincibility_duration;

        if self.health <= 0.0 {
            self.health = 0.0;
            self.life = LifeState::Dying;
            DamageOutcome::Lethal
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Restore health, capped at max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Transition to `Dead`. Returns false when removal already ran, so callers
    /// can bail before doing any bookkeeping twice.
    pub fn begin_removal(&mut self) -> bool {
        if self.life == LifeState::Dead {
            return false;
        }
        self.life = LifeState::Dead;
        self.health = 0.0;
        true
    }

    /// Phase scaling applied to freshly spawned enemies: raises max health and
    /// damage, then refills health to the new max.
    pub fn apply_phase_buff(&mut self, phase: u32) {
        let steps = phase.saturating_sub(1) as f32;
        self.max_health += PHASE_HEALTH_BUFF * steps;
        self.damage += PHASE_DAMAGE_BUFF * steps;
        self.health = self.max_health;
    }

    /// Debug validation of invariants.
    pub fn debug_validate(&self) {
        debug_assert!(self.health >= 0.0, "health went negative: {}", self.health);
        debug_assert!(
            self.health <= self.max_health,
            "health {} above max {}",
            self.health,
            self.max_health
        );
        debug_assert!(
            self.is_alive() || self.health == 0.0,
            "dead entity kept {} health",
            self.health
        );
    }
}

/// Axis-aligned collision box centred on the entity's transform.
#[derive(Component, Debug, Clone, Copy)]
pub struct Hitbox {
    pub half_extents: Vec2,
}

impl Hitbox {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            half_extents: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn overlaps(&self, at: Vec2, other: &Hitbox, other_at: Vec2) -> bool {
        let delta = (at - other_at).abs();
        let reach = self.half_extents + other.half_extents;
        delta.x < reach.x && delta.y < reach.y
    }
}

// ============================================================================
// Actors
// ============================================================================

/// The player's offensive stats and run-scoped upgrades.
#[derive(Component, Debug, Clone)]
pub struct Player {
    pub arrow_damage: f32,
    pub arrow_cooldown: f32,
    pub last_volley_at: Option<f32>,
    pub movement_speed: f32,
    /// Arrows per volley.
    pub multi_arrow: u32,
    /// Cleared while a draft is open or the run has ended.
    pub can_move: bool,
    pub last_retaliation_at: Option<f32>,
    /// Power-ups taken this run, in order.
    pub power_ups: Vec<PowerUpId>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            arrow_damage: ARROW_DAMAGE,
            arrow_cooldown: ARROW_COOLDOWN,
            last_volley_at: None,
            movement_speed: PLAYER_SPEED,
            multi_arrow: 1,
            can_move: true,
            last_retaliation_at: None,
            power_ups: Vec::new(),
        }
    }
}

impl Player {
    pub fn start_position() -> Vec2 {
        Vec2::new(PLAYER_START.0, PLAYER_START.1)
    }

    pub fn hitbox() -> Hitbox {
        Hitbox {
            half_extents: Vec2::new(PLAYER_HALF_EXTENTS.0, PLAYER_HALF_EXTENTS.1),
        }
    }

    pub fn combat_entity() -> CombatEntity {
        CombatEntity::new(PLAYER_MAX_HEALTH, 0.0, PLAYER_INVINCIBILITY)
    }

    /// Whether a new volley may start at `now`.
    pub fn volley_ready(&self, now: f32) -> bool {
        match self.last_volley_at {
            Some(last) => now - last >= self.arrow_cooldown,
            None => true,
        }
    }

    /// Whether contact retaliation is off cooldown at `now`.
    pub fn retaliation_ready(&self, now: f32) -> bool {
        match self.last_retaliation_at {
            Some(last) => now - last >= CONTACT_RETALIATION_COOLDOWN,
            None => true,
        }
    }
}

/// Marks a hostile roster member and carries its dispatch key.
#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Movement speed in px/s.
    pub speed: f32,
}

/// Static blocker placed on a grid cell.
#[derive(Component, Debug, Clone, Copy)]
pub struct Obstacle;

/// Everything that belongs to the current wave and is swept when a phase starts.
#[derive(Component, Debug, Clone, Copy)]
pub struct WaveEntity;

/// True when `point` is closer than `radius` to any obstacle centre.
pub fn blocked_by_obstacle(point: Vec2, obstacles: impl IntoIterator<Item = Vec2>, radius: f32) -> bool {
    obstacles
        .into_iter()
        .any(|obstacle| obstacle.distance(point) < radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_twice_inside_window_lands_once() {
        let mut entity = CombatEntity::new(700.0, 25.0, 0.2);
        assert_eq!(entity.take_damage(100.0, 1.0), DamageOutcome::Wounded);
        assert_eq!(entity.take_damage(100.0, 1.1), DamageOutcome::Ignored);
        assert_eq!(entity.health, 600.0);

        // Window closed
        assert_eq!(entity.take_damage(100.0, 1.2), DamageOutcome::Wounded);
        assert_eq!(entity.health, 500.0);
    }

    #[test]
    fn test_lethal_damage_clamps_and_transitions() {
        let mut entity = CombatEntity::new(100.0, 0.0, 0.2);
        assert_eq!(entity.take_damage(250.0, 0.0), DamageOutcome::Lethal);
        assert_eq!(entity.health, 0.0);
        assert_eq!(entity.life, LifeState::Dying);
        assert_eq!(entity.take_damage(10.0, 5.0), DamageOutcome::Ignored);
        entity.debug_validate();
    }

    #[test]
    fn test_malformed_damage_is_ignored() {
        let mut entity = CombatEntity::new(100.0, 0.0, 0.2);
        assert_eq!(entity.take_damage(-50.0, 0.0), DamageOutcome::Ignored);
        assert_eq!(entity.take_damage(f32::NAN, 0.0), DamageOutcome::Ignored);
        assert_eq!(entity.take_damage(f32::INFINITY, 0.0), DamageOutcome::Ignored);
        assert_eq!(entity.health, 100.0);
        // No window was opened by the ignored hits.
        assert!(!entity.is_invincible(0.0));
    }

    #[test]
    fn test_begin_removal_is_idempotent() {
        let mut entity = CombatEntity::new(100.0, 0.0, 0.2);
        entity.take_damage(100.0, 0.0);
        assert!(entity.begin_removal());
        assert!(!entity.begin_removal());
        assert_eq!(entity.life, LifeState::Dead);
    }

    #[test]
    fn test_phase_buff_scales_from_phase_two() {
        let mut entity = CombatEntity::new(700.0, 25.0, 0.2);
        entity.apply_phase_buff(1);
        assert_eq!(entity.max_health, 700.0);

        let mut entity = CombatEntity::new(700.0, 25.0, 0.2);
        entity.health = 10.0;
        entity.apply_phase_buff(4);
        assert_eq!(entity.max_health, 760.0);
        assert_eq!(entity.health, 760.0);
        assert_eq!(entity.damage, 34.0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut entity = CombatEntity::new(2000.0, 0.0, 1.0);
        entity.health = 1950.0;
        assert_eq!(entity.heal(100.0), 50.0);
        assert_eq!(entity.health, 2000.0);
    }

    #[test]
    fn test_hitbox_overlap() {
        let a = Hitbox::new(60.0, 80.0);
        let b = Hitbox::new(60.0, 70.0);
        assert!(a.overlaps(Vec2::new(0.0, 0.0), &b, Vec2::new(59.0, 0.0)));
        assert!(!a.overlaps(Vec2::new(0.0, 0.0), &b, Vec2::new(61.0, 0.0)));
    }

    #[test]
    fn test_arena_clamp_box_keeps_hitbox_inside() {
        let arena = Arena::default();
        let clamped = arena.clamp_box(Vec2::new(-100.0, 600.0), Vec2::new(30.0, 40.0));
        assert_eq!(clamped, Vec2::new(30.0, ARENA_SIZE - 40.0));
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = GameRng::from_seed(7);
        let mut b = GameRng::from_seed(7);
        for _ in 0..10 {
            assert_eq!(a.random_f32(), b.random_f32());
        }
        let picks = a.sample_indices(7, 3);
        assert_eq!(picks.len(), 3);
        assert_ne!(picks[0], picks[1]);
    }
}
