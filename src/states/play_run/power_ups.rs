//! Power-Up Draft
//!
//! A fixed catalog of seven upgrades and the draft that offers three of them.
//! An upgrade is applied once, at selection, and folded permanently into the
//! player's stats for the rest of the run.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::components::{CombatEntity, GameRng, Player};
use super::constants::{ARROW_COOLDOWN_FLOOR, DRAFT_OFFER_COUNT};

/// Stable identifier for a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpId {
    Damage,
    DamagePlus,
    AttackSpeed,
    MovementSpeed,
    MultiArrow,
    Heal,
    MaxHealth,
}

/// One catalog entry.
pub struct PowerUp {
    pub id: PowerUpId,
    pub name: &'static str,
    pub description: &'static str,
    pub effect: fn(&mut Player, &mut CombatEntity),
}

fn add_damage(player: &mut Player, _: &mut CombatEntity) {
    player.arrow_damage += 25.0;
}

fn add_more_damage(player: &mut Player, _: &mut CombatEntity) {
    player.arrow_damage += 50.0;
}

fn faster_arrows(player: &mut Player, _: &mut CombatEntity) {
    player.arrow_cooldown = (player.arrow_cooldown * 0.7).max(ARROW_COOLDOWN_FLOOR);
}

fn faster_movement(player: &mut Player, _: &mut CombatEntity) {
    player.movement_speed *= 1.1;
}

fn extra_arrow(player: &mut Player, _: &mut CombatEntity) {
    player.multi_arrow += 1;
}

fn heal(_: &mut Player, combat: &mut CombatEntity) {
    combat.heal(250.0);
}

fn more_health(_: &mut Player, combat: &mut CombatEntity) {
    combat.max_health += 200.0;
    combat.heal(100.0);
}

pub static CATALOG: [PowerUp; 7] = [
    PowerUp {
        id: PowerUpId::Damage,
        name: "Sharpened Arrows",
        description: "+25 arrow damage",
        effect: add_damage,
    },
    PowerUp {
        id: PowerUpId::DamagePlus,
        name: "Heavy Arrows",
        description: "+50 arrow damage",
        effect: add_more_damage,
    },
    PowerUp {
        id: PowerUpId::AttackSpeed,
        name: "Quick Draw",
        description: "Arrow cooldown reduced by 30%",
        effect: faster_arrows,
    },
    PowerUp {
        id: PowerUpId::MovementSpeed,
        name: "Light Boots",
        description: "+10% movement speed",
        effect: faster_movement,
    },
    PowerUp {
        id: PowerUpId::MultiArrow,
        name: "Multi-Arrow",
        description: "+1 arrow per volley",
        effect: extra_arrow,
    },
    PowerUp {
        id: PowerUpId::Heal,
        name: "Potion",
        description: "Restore 250 health",
        effect: heal,
    },
    PowerUp {
        id: PowerUpId::MaxHealth,
        name: "Vitality",
        description: "+200 max health and restore 100",
        effect: more_health,
    },
];

impl PowerUpId {
    pub fn definition(self) -> &'static PowerUp {
        &CATALOG[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerUpId::Damage => "damage",
            PowerUpId::DamagePlus => "damage_plus",
            PowerUpId::AttackSpeed => "attack_speed",
            PowerUpId::MovementSpeed => "movement_speed",
            PowerUpId::MultiArrow => "multi_arrow",
            PowerUpId::Heal => "heal",
            PowerUpId::MaxHealth => "max_health",
        }
    }

    pub fn parse(name: &str) -> Result<Self, String> {
        CATALOG
            .iter()
            .map(|p| p.id)
            .find(|id| id.as_str() == name)
            .ok_or_else(|| {
                let valid: Vec<&str> = CATALOG.iter().map(|p| p.id.as_str()).collect();
                format!("Unknown power-up: '{}'. Valid power-ups: {}", name, valid.join(", "))
            })
    }

    /// Apply this upgrade to the player and record it.
    pub fn apply(self, player: &mut Player, combat: &mut CombatEntity) {
        (self.definition().effect)(player, combat);
        player.power_ups.push(self);
    }
}

pub type DraftOffers = SmallVec<[PowerUpId; DRAFT_OFFER_COUNT]>;

/// Distinct catalog entries for one draft, in random order.
pub fn draw_offers(rng: &mut GameRng) -> DraftOffers {
    rng.sample_indices(CATALOG.len(), DRAFT_OFFER_COUNT)
        .into_iter()
        .map(|i| CATALOG[i].id)
        .collect()
}

/// The current draft, if one is open.
#[derive(Resource, Debug, Default)]
pub struct PowerUpDraft {
    offers: DraftOffers,
    chosen: Option<PowerUpId>,
    open: bool,
}

impl PowerUpDraft {
    pub fn open(&mut self, offers: DraftOffers) {
        self.offers = offers;
        self.chosen = None;
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn offers(&self) -> &[PowerUpId] {
        &self.offers
    }

    pub fn chosen(&self) -> Option<PowerUpId> {
        self.chosen
    }

    /// Lock in the offer at `index`. Returns `None` when no draft is open, a
    /// choice was already made, or the index is out of range.
    pub fn select(&mut self, index: usize) -> Option<PowerUpId> {
        if !self.open || self.chosen.is_some() {
            return None;
        }
        let id = *self.offers.get(index)?;
        self.chosen = Some(id);
        Some(id)
    }

    pub fn close(&mut self) {
        self.open = false;
        self.offers.clear();
        self.chosen = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_matches_ids() {
        for (i, entry) in CATALOG.iter().enumerate() {
            assert_eq!(entry.id as usize, i);
            assert_eq!(PowerUpId::parse(entry.id.as_str()), Ok(entry.id));
        }
        assert!(PowerUpId::parse("laser").is_err());
    }

    #[test]
    fn test_offers_are_distinct() {
        let mut rng = GameRng::from_seed(17);
        for _ in 0..50 {
            let offers = draw_offers(&mut rng);
            assert_eq!(offers.len(), DRAFT_OFFER_COUNT);
            assert_ne!(offers[0], offers[1]);
            assert_ne!(offers[1], offers[2]);
            assert_ne!(offers[0], offers[2]);
        }
    }

    #[test]
    fn test_select_only_once() {
        let mut draft = PowerUpDraft::default();
        assert_eq!(draft.select(0), None);

        draft.open(DraftOffers::from_slice(&[PowerUpId::Heal, PowerUpId::MultiArrow, PowerUpId::Damage]));
        assert_eq!(draft.select(5), None);
        assert_eq!(draft.select(1), Some(PowerUpId::MultiArrow));
        assert_eq!(draft.select(0), None);
    }

    #[test]
    fn test_attack_speed_respects_floor() {
        let mut player = Player::default();
        let mut combat = Player::combat_entity();
        for _ in 0..20 {
            PowerUpId::AttackSpeed.apply(&mut player, &mut combat);
        }
        assert_eq!(player.arrow_cooldown, ARROW_COOLDOWN_FLOOR);
        assert_eq!(player.power_ups.len(), 20);
    }

    #[test]
    fn test_max_health_raises_cap_and_heals() {
        let mut player = Player::default();
        let mut combat = Player::combat_entity();
        combat.health = 1000.0;
        PowerUpId::MaxHealth.apply(&mut player, &mut combat);
        assert_eq!(combat.max_health, 2200.0);
        assert_eq!(combat.health, 1100.0);

        PowerUpId::Heal.apply(&mut player, &mut combat);
        assert_eq!(combat.health, 1350.0);
    }
}
