//! Folding a selection of bonuses into a single number.
//!
//! All value types fold with commutative operations (sums, min, max), so the
//! result never depends on the order bonuses were added in:
//! `BaseNumber → %Base → Additive → %All → IndependentMax → IndependentMin`

use super::record::Bonus;
use super::types::ValueType;

/// Running totals for each value type.
///
/// # Example
/// ```
/// # use battle_core::bonus::{Bonus, BonusType, ValueStack, ValueType};
/// let mut stack = ValueStack::new();
/// stack.add(&Bonus::new(BonusType::StacksSpeed, 10).with_value_type(ValueType::BaseNumber));
/// stack.add(&Bonus::new(BonusType::StacksSpeed, 50).with_value_type(ValueType::PercentToBase));
/// stack.add(&Bonus::new(BonusType::StacksSpeed, 2));
///
/// // 10 + 10 × 50% + 2 = 17
/// assert_eq!(stack.total(), 17);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueStack {
    base: i64,
    percent_to_base: i64,
    additive: i64,
    percent_to_all: i64,
    independent_max: Option<i32>,
    independent_min: Option<i32>,
    dependent_count: usize,
}

impl ValueStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one bonus to the running totals.
    pub fn add(&mut self, bonus: &Bonus) {
        let value = i64::from(bonus.value);
        match bonus.value_type {
            ValueType::BaseNumber => self.base += value,
            ValueType::PercentToBase => self.percent_to_base += value,
            ValueType::Additive => self.additive += value,
            ValueType::PercentToAll => self.percent_to_all += value,
            ValueType::IndependentMax => {
                self.independent_max = Some(
                    self.independent_max
                        .map_or(bonus.value, |current| current.max(bonus.value)),
                );
            }
            ValueType::IndependentMin => {
                self.independent_min = Some(
                    self.independent_min
                        .map_or(bonus.value, |current| current.min(bonus.value)),
                );
            }
        }
        if !matches!(
            bonus.value_type,
            ValueType::IndependentMax | ValueType::IndependentMin
        ) {
            self.dependent_count += 1;
        }
    }

    /// Returns the folded value.
    ///
    /// # Formula
    /// ```text
    /// modified = base + base × %Base / 100 + additive
    /// result   = modified × (100 + %All) / 100
    /// result   = max(result, indepMax)   (indepMax alone if nothing else)
    /// result   = min(result, indepMin)   (indepMin alone if nothing else)
    /// ```
    pub fn total(&self) -> i32 {
        let modified = self.base + (self.base * self.percent_to_base) / 100 + self.additive;
        let mut result = (modified * (100 + self.percent_to_all)) / 100;

        if let Some(floor) = self.independent_max {
            let floor = i64::from(floor);
            result = if self.dependent_count > 0 {
                result.max(floor)
            } else {
                floor
            };
        }
        if let Some(cap) = self.independent_min {
            let cap = i64::from(cap);
            result = if self.dependent_count > 0 {
                result.min(cap)
            } else {
                cap
            };
        }

        result.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    /// Returns true if nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.dependent_count == 0 && self.independent_max.is_none() && self.independent_min.is_none()
    }
}

impl<'a> FromIterator<&'a Bonus> for ValueStack {
    fn from_iter<T: IntoIterator<Item = &'a Bonus>>(iter: T) -> Self {
        let mut stack = ValueStack::new();
        for bonus in iter {
            stack.add(bonus);
        }
        stack
    }
}

/// Bounds a derived stat is clamped to.
///
/// Each derived query picks the domain its value lives in; centralising them
/// keeps the clamping rules in one place.
#[derive(Clone, Copy, Debug)]
pub struct StatBounds {
    pub min: i32,
    pub max: i32,
}

impl StatBounds {
    /// Attack, defence, speed: never negative.
    pub const NON_NEGATIVE: Self = Self {
        min: 0,
        max: i32::MAX,
    };

    /// Per-unit health: a living creature has at least one hit point.
    pub const UNIT_HEALTH: Self = Self {
        min: 1,
        max: i32::MAX,
    };

    /// No bounds.
    pub const UNCLAMPED: Self = Self {
        min: i32::MIN,
        max: i32::MAX,
    };

    pub fn clamp(self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::BonusType;

    fn bonus(value: i32, value_type: ValueType) -> Bonus {
        Bonus::new(BonusType::StacksSpeed, value).with_value_type(value_type)
    }

    #[test]
    fn full_formula() {
        let stack: ValueStack = [
            bonus(20, ValueType::BaseNumber),
            bonus(50, ValueType::PercentToBase),
            bonus(4, ValueType::Additive),
            bonus(10, ValueType::PercentToAll),
        ]
        .iter()
        .collect();

        // (20 + 10 + 4) × 1.10 = 37.4 → 37
        assert_eq!(stack.total(), 37);
    }

    #[test]
    fn order_does_not_matter() {
        let bonuses = [
            bonus(7, ValueType::Additive),
            bonus(-3, ValueType::Additive),
            bonus(25, ValueType::PercentToAll),
            bonus(12, ValueType::BaseNumber),
            bonus(9, ValueType::IndependentMin),
        ];
        let forward: ValueStack = bonuses.iter().collect();
        let backward: ValueStack = bonuses.iter().rev().collect();
        assert_eq!(forward.total(), backward.total());
    }

    #[test]
    fn independent_bounds() {
        let floor_only: ValueStack = [bonus(6, ValueType::IndependentMax)].iter().collect();
        assert_eq!(floor_only.total(), 6);

        let raised: ValueStack = [bonus(2, ValueType::Additive), bonus(6, ValueType::IndependentMax)]
            .iter()
            .collect();
        assert_eq!(raised.total(), 6);

        let capped: ValueStack = [bonus(20, ValueType::Additive), bonus(8, ValueType::IndependentMin)]
            .iter()
            .collect();
        assert_eq!(capped.total(), 8);
    }

    #[test]
    fn empty_stack_is_zero() {
        let stack = ValueStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.total(), 0);
    }

    #[test]
    fn bounds_clamp() {
        assert_eq!(StatBounds::NON_NEGATIVE.clamp(-4), 0);
        assert_eq!(StatBounds::UNIT_HEALTH.clamp(0), 1);
        assert_eq!(StatBounds::UNCLAMPED.clamp(-4), -4);
    }
}
