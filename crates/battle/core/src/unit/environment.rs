//! Battlefield-wide facts a unit consults for derived queries.

use std::collections::BTreeSet;

use super::info::{BattleSide, UnitId, UnitInfo};

/// Read-only battlefield oracle supplied once per battle.
pub trait UnitEnvironment: Send + Sync {
    /// Returns true if the unit's side fields an ammunition cart.
    fn unit_has_ammo_cart(&self, unit: &dyn UnitInfo) -> bool;

    /// Returns true if an adjacent enemy locks the unit into melee.
    fn battle_is_unit_blocked(&self, _unit: &dyn UnitInfo) -> bool {
        false
    }
}

/// Table-driven environment: per-side ammo carts and an explicit set of
/// melee-locked units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleEnvironment {
    #[cfg_attr(feature = "serde", serde(default))]
    pub attacker_ammo_cart: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub defender_ammo_cart: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub blocked: BTreeSet<UnitId>,
}

impl BattleEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ammo_cart(mut self, side: BattleSide) -> Self {
        match side {
            BattleSide::Attacker => self.attacker_ammo_cart = true,
            BattleSide::Defender => self.defender_ammo_cart = true,
        }
        self
    }

    pub fn with_blocked(mut self, unit: UnitId) -> Self {
        self.blocked.insert(unit);
        self
    }
}

impl UnitEnvironment for BattleEnvironment {
    fn unit_has_ammo_cart(&self, unit: &dyn UnitInfo) -> bool {
        match unit.unit_side() {
            BattleSide::Attacker => self.attacker_ammo_cart,
            BattleSide::Defender => self.defender_ammo_cart,
        }
    }

    fn battle_is_unit_blocked(&self, unit: &dyn UnitInfo) -> bool {
        self.blocked.contains(&unit.unit_id())
    }
}
