//! Combatants: identity, environment, health and derived combat state.

pub mod counters;
pub mod environment;
pub mod health;
pub mod info;
pub mod state;

pub use counters::{TurnFlags, UnitMarkers, UsageCounter};
pub use environment::{BattleEnvironment, UnitEnvironment};
pub use health::{HealLevel, HealPower, UnitHealth};
pub use info::{BattleHex, BattleSide, CreatureId, CreatureType, UnitId, UnitInfo, UnitRecord, UnitSlot};
pub use state::UnitState;

use crate::bonus::{BonusBearer, BonusList, Selector};

/// Read-only view of a unit as effects see it.
///
/// Effects only inspect targets; every change goes through the mutation
/// channel.
pub trait Unit {
    fn info(&self) -> &dyn UnitInfo;

    fn unit_id(&self) -> UnitId {
        self.info().unit_id()
    }

    /// Bonuses matching `selector` that apply to this unit.
    fn unit_bonuses(&self, selector: &Selector) -> BonusList;

    fn has_unit_bonus(&self, selector: &Selector) -> bool {
        !self.unit_bonuses(selector).is_empty()
    }

    fn alive(&self) -> bool;

    fn is_ghost(&self) -> bool;

    fn is_dead(&self) -> bool {
        !self.alive() && !self.is_ghost()
    }

    fn is_valid_target(&self, allow_dead: bool) -> bool;

    fn count(&self) -> i32;

    fn first_hp_left(&self) -> i32;

    fn max_health(&self) -> i32;

    fn available_health(&self) -> i64;

    fn total_health(&self) -> i64;

    fn position(&self) -> BattleHex;
}

impl<B: BonusBearer> Unit for UnitState<'_, B> {
    fn info(&self) -> &dyn UnitInfo {
        UnitState::info(self)
    }

    fn unit_bonuses(&self, selector: &Selector) -> BonusList {
        self.bonuses(selector)
    }

    fn alive(&self) -> bool {
        UnitState::alive(self)
    }

    fn is_ghost(&self) -> bool {
        UnitState::is_ghost(self)
    }

    fn is_dead(&self) -> bool {
        UnitState::is_dead(self)
    }

    fn is_valid_target(&self, allow_dead: bool) -> bool {
        UnitState::is_valid_target(self, allow_dead)
    }

    fn count(&self) -> i32 {
        UnitState::count(self)
    }

    fn first_hp_left(&self) -> i32 {
        UnitState::first_hp_left(self)
    }

    fn max_health(&self) -> i32 {
        UnitState::max_health(self)
    }

    fn available_health(&self) -> i64 {
        UnitState::available_health(self)
    }

    fn total_health(&self) -> i64 {
        UnitState::total_health(self)
    }

    fn position(&self) -> BattleHex {
        UnitState::position(self)
    }
}
