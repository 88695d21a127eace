//! Storage-facing capability for anything that carries bonuses.

use super::list::BonusList;
use super::record::Bonus;
use super::selector::Selector;
use super::types::BonusType;

/// Capability to hold bonuses and answer selector queries over them.
///
/// Units implement it through [`BonusNode`]; artifacts, commanders or test
/// doubles can provide their own storage. Consumers depend only on this
/// trait, never on how bonuses are stored.
pub trait BonusBearer {
    /// Returns every bonus matching `selector`.
    fn select(&self, selector: &Selector) -> BonusList;

    fn add_new_bonus(&mut self, bonus: Bonus);

    /// Removes the first bonus equal to `bonus`.
    fn remove_bonus(&mut self, bonus: &Bonus) -> bool;

    /// Removes every bonus matching `selector` and returns them.
    fn remove_bonuses(&mut self, selector: &Selector) -> BonusList;

    /// Replaces the bonus sharing `bonus`'s identity. Returns false if none.
    fn update_bonus(&mut self, bonus: Bonus) -> bool;

    /// Advances turn-limited bonuses by one round, returning the expired ones.
    fn tick_turns(&mut self) -> BonusList;

    /// Monotonic counter bumped by every mutation; derived-value caches key on it.
    fn revision(&self) -> u64;

    fn has_bonus(&self, selector: &Selector) -> bool {
        !self.select(selector).is_empty()
    }

    fn value_of(&self, selector: &Selector) -> i32 {
        self.select(selector).total_value()
    }

    fn has_bonus_of_type(&self, kind: BonusType) -> bool {
        self.has_bonus(&Selector::kind(kind))
    }

    fn value_of_type(&self, kind: BonusType) -> i32 {
        self.value_of(&Selector::kind(kind))
    }
}

/// Plain bonus storage: a list plus a revision counter.
#[derive(Clone, Debug, Default)]
pub struct BonusNode {
    bonuses: BonusList,
    revision: u64,
}

impl BonusNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node pre-populated with `bonuses`.
    pub fn with_bonuses(bonuses: impl IntoIterator<Item = Bonus>) -> Self {
        Self {
            bonuses: bonuses.into_iter().collect(),
            revision: 0,
        }
    }

    pub fn bonuses(&self) -> &BonusList {
        &self.bonuses
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl BonusBearer for BonusNode {
    fn select(&self, selector: &Selector) -> BonusList {
        self.bonuses.select(selector)
    }

    fn add_new_bonus(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
        self.touch();
    }

    fn remove_bonus(&mut self, bonus: &Bonus) -> bool {
        let removed = self.bonuses.remove(bonus);
        if removed {
            self.touch();
        }
        removed
    }

    fn remove_bonuses(&mut self, selector: &Selector) -> BonusList {
        let removed = self.bonuses.remove_if(selector);
        if !removed.is_empty() {
            self.touch();
        }
        removed
    }

    fn update_bonus(&mut self, bonus: Bonus) -> bool {
        let updated = self.bonuses.replace_same(bonus);
        if updated {
            self.touch();
        }
        updated
    }

    fn tick_turns(&mut self) -> BonusList {
        let expired = self.bonuses.tick_turns();
        // Remaining turn counters changed even when nothing expired.
        self.touch();
        expired
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
