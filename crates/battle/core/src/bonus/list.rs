//! Ordered multiset of bonuses.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::aggregate::ValueStack;
use super::record::Bonus;
use super::selector::Selector;

/// Bonuses owned by one bearer, in insertion order.
///
/// Insertion order is observable through [`iter`](Self::iter) but never
/// affects an aggregate: every reduction here is a sum, min, max or "any".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BonusList {
    bonuses: Vec<Arc<Bonus>>,
}

impl BonusList {
    pub fn new() -> Self {
        Self {
            bonuses: Vec::new(),
        }
    }

    pub fn push(&mut self, bonus: Bonus) {
        self.bonuses.push(Arc::new(bonus));
    }

    pub fn push_shared(&mut self, bonus: Arc<Bonus>) {
        self.bonuses.push(bonus);
    }

    /// Removes the first bonus equal to `bonus`. Returns true if one was found.
    pub fn remove(&mut self, bonus: &Bonus) -> bool {
        match self.bonuses.iter().position(|b| b.as_ref() == bonus) {
            Some(index) => {
                self.bonuses.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes exactly this shared instance. Returns true if it was present.
    pub fn remove_shared(&mut self, bonus: &Arc<Bonus>) -> bool {
        match self.bonuses.iter().position(|b| Arc::ptr_eq(b, bonus)) {
            Some(index) => {
                self.bonuses.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes every bonus matching the selector and returns them.
    pub fn remove_if(&mut self, selector: &Selector) -> BonusList {
        let mut removed = BonusList::new();
        self.bonuses.retain(|b| {
            if selector.matches(b) {
                removed.bonuses.push(Arc::clone(b));
                false
            } else {
                true
            }
        });
        removed
    }

    /// Swaps the first bonus with the same identity as `bonus` for `bonus`.
    ///
    /// Returns false (and changes nothing) if there is no such bonus.
    pub fn replace_same(&mut self, bonus: Bonus) -> bool {
        match self.bonuses.iter().position(|b| b.same_identity(&bonus)) {
            Some(index) => {
                self.bonuses[index] = Arc::new(bonus);
                true
            }
            None => false,
        }
    }

    /// Advances every turn-limited bonus by one round and returns the ones
    /// that ran out.
    pub fn tick_turns(&mut self) -> BonusList {
        let mut expired = BonusList::new();
        let mut kept = Vec::with_capacity(self.bonuses.len());
        for bonus in self.bonuses.drain(..) {
            match bonus.ticked() {
                Some(next) if next == *bonus => kept.push(bonus),
                Some(next) => kept.push(Arc::new(next)),
                None => expired.bonuses.push(bonus),
            }
        }
        self.bonuses = kept;
        expired
    }

    /// Returns a new list holding the bonuses matching `selector`.
    pub fn select(&self, selector: &Selector) -> BonusList {
        Self {
            bonuses: self
                .bonuses
                .iter()
                .filter(|b| selector.matches(b))
                .cloned()
                .collect(),
        }
    }

    /// Keeps only the bonuses for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&Bonus) -> bool) {
        self.bonuses.retain(|b| keep(b));
    }

    pub fn has_any(&self, selector: &Selector) -> bool {
        self.bonuses.iter().any(|b| selector.matches(b))
    }

    /// Folds the matching bonuses with the value-type rules.
    pub fn total(&self, selector: &Selector) -> i32 {
        self.select(selector).total_value()
    }

    /// Folds the whole list with the value-type rules, after collapsing
    /// stacking groups to their strongest member.
    pub fn total_value(&self) -> i32 {
        self.stacked().collect::<ValueStack>().total()
    }

    /// Plain sum of values, ignoring value types.
    pub fn sum_values(&self) -> i32 {
        self.stacked().map(|b| b.value).sum()
    }

    pub fn max_value(&self) -> Option<i32> {
        self.bonuses.iter().map(|b| b.value).max()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bonus> + '_ {
        self.bonuses.iter().map(|b| b.as_ref())
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    /// Iterates bonuses with every stacking group reduced to its highest value.
    fn stacked(&self) -> impl Iterator<Item = &Bonus> + '_ {
        let mut groups: BTreeMap<&str, &Bonus> = BTreeMap::new();
        for bonus in self.iter() {
            if let Some(key) = bonus.stacking.as_deref() {
                groups
                    .entry(key)
                    .and_modify(|best| {
                        if bonus.value > best.value {
                            *best = bonus;
                        }
                    })
                    .or_insert(bonus);
            }
        }
        self.iter()
            .filter(|b| b.stacking.is_none())
            .chain(groups.into_values())
    }
}

impl FromIterator<Bonus> for BonusList {
    fn from_iter<T: IntoIterator<Item = Bonus>>(iter: T) -> Self {
        Self {
            bonuses: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl Extend<Bonus> for BonusList {
    fn extend<T: IntoIterator<Item = Bonus>>(&mut self, iter: T) {
        self.bonuses.extend(iter.into_iter().map(Arc::new));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::{BonusSource, BonusSubtype, BonusType, PrimarySkill};

    fn attack(value: i32) -> Bonus {
        Bonus::primary_skill(PrimarySkill::Attack, value)
    }

    #[test]
    fn select_and_total() {
        let list: BonusList = [
            attack(5),
            attack(3),
            Bonus::primary_skill(PrimarySkill::Defense, 7),
            Bonus::new(BonusType::StacksSpeed, 4),
        ]
        .into_iter()
        .collect();

        let sel = Selector::type_subtype(
            BonusType::PrimarySkill,
            BonusSubtype::PrimarySkill(PrimarySkill::Attack),
        );
        assert_eq!(list.select(&sel).len(), 2);
        assert_eq!(list.total(&sel), 8);
        assert!(list.has_any(&Selector::kind(BonusType::StacksSpeed)));
        assert!(!list.has_any(&Selector::kind(BonusType::Shooter)));
        assert_eq!(list.total(&Selector::kind(BonusType::Shooter)), 0);
    }

    #[test]
    fn removal_by_value_and_by_predicate() {
        let mut list: BonusList = [
            attack(5),
            attack(5).with_source(BonusSource::SpellEffect, 1),
            attack(2).with_source(BonusSource::SpellEffect, 2),
        ]
        .into_iter()
        .collect();

        assert!(list.remove(&attack(5)));
        assert!(!list.remove(&attack(5)));
        assert_eq!(list.len(), 2);

        let removed = list.remove_if(&Selector::source(BonusSource::SpellEffect, 2));
        assert_eq!(removed.len(), 1);
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().next().unwrap().source_id, 1);
    }

    #[test]
    fn shared_identity_removal() {
        let mut list = BonusList::new();
        let shared = Arc::new(attack(1));
        list.push(attack(1));
        list.push_shared(Arc::clone(&shared));

        assert!(list.remove_shared(&shared));
        assert!(!list.remove_shared(&shared));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn stacking_group_keeps_strongest() {
        let list: BonusList = [
            attack(3).with_stacking("bless"),
            attack(6).with_stacking("bless"),
            attack(1),
        ]
        .into_iter()
        .collect();

        assert_eq!(list.total_value(), 7);
        assert_eq!(list.sum_values(), 7);
    }

    #[test]
    fn tick_turns_expires_and_counts_down() {
        let mut list: BonusList = [
            attack(1).with_turns(1),
            attack(2).with_turns(3),
            attack(4),
        ]
        .into_iter()
        .collect();

        let expired = list.tick_turns();
        assert_eq!(expired.len(), 1);
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().map(|b| b.turns_remain).collect::<Vec<_>>(), vec![2, 0]);
    }

    #[test]
    fn replace_same_refreshes() {
        let mut list: BonusList = [attack(1).with_source(BonusSource::SpellEffect, 3).with_turns(1)]
            .into_iter()
            .collect();

        assert!(list.replace_same(attack(1).with_source(BonusSource::SpellEffect, 3).with_turns(4)));
        assert_eq!(list.iter().next().unwrap().turns_remain, 4);
        assert!(!list.replace_same(attack(1).with_source(BonusSource::SpellEffect, 9)));
    }
}
