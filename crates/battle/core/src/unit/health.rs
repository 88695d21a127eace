//! Stack health bookkeeping.
//!
//! A stack is `full_units` untouched creatures plus one front creature with
//! `first_hp_left` hit points. Per-unit maximum health is a derived stat, so
//! it is passed in rather than stored.

/// How far a heal may restore a stack.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HealLevel {
    /// Only the wounded front creature.
    #[default]
    Heal,
    /// Raise dead creatures, up to the starting stack size.
    Resurrect,
    /// No limit beyond the largest stack a count can hold.
    Overheal,
}

/// Whether raised creatures survive the battle.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum HealPower {
    /// Raised creatures vanish when the battle ends.
    OneBattle,
    #[default]
    Permanent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitHealth {
    first_hp_left: i32,
    full_units: i32,
    resurrected: i32,
}

impl UnitHealth {
    /// A fresh stack of `base_amount` creatures at full health.
    pub fn new(max_health: i32, base_amount: i32) -> Self {
        Self {
            first_hp_left: if base_amount > 0 { max_health } else { 0 },
            full_units: (base_amount - 1).max(0),
            resurrected: 0,
        }
    }

    /// Health pool the stack can be restored up to.
    pub fn total(max_health: i32, base_amount: i32) -> i64 {
        i64::from(max_health) * i64::from(base_amount)
    }

    /// Wipes the stack out.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn count(&self) -> i32 {
        self.full_units + i32::from(self.first_hp_left > 0)
    }

    pub fn first_hp_left(&self) -> i32 {
        self.first_hp_left
    }

    /// Creatures raised for this battle only.
    pub fn resurrected(&self) -> i32 {
        self.resurrected
    }

    pub fn available(&self, max_health: i32) -> i64 {
        i64::from(self.first_hp_left) + i64::from(max_health) * i64::from(self.full_units)
    }

    /// Applies `amount` damage and returns how much was actually absorbed.
    pub fn damage(&mut self, amount: i64, max_health: i32) -> i64 {
        let amount = amount.max(0);
        let old_count = self.count();

        let absorbed = if amount >= i64::from(self.first_hp_left) {
            let available = self.available(max_health);
            let absorbed = amount.min(available);
            let remaining = available - absorbed;
            if remaining <= 0 {
                self.full_units = 0;
                self.first_hp_left = 0;
            } else {
                self.set_from_total(remaining, max_health);
            }
            absorbed
        } else {
            self.first_hp_left -= amount as i32;
            amount
        };

        self.add_resurrected(self.count() - old_count);
        absorbed
    }

    /// Restores up to `amount` health and returns how much was applied.
    pub fn heal(
        &mut self,
        amount: i64,
        level: HealLevel,
        power: HealPower,
        max_health: i32,
        base_amount: i32,
    ) -> i64 {
        let old_count = self.count();
        let max_heal = match level {
            HealLevel::Heal => i64::from((max_health - self.first_hp_left).max(0)),
            HealLevel::Resurrect => {
                (Self::total(max_health, base_amount) - self.available(max_health)).max(0)
            }
            HealLevel::Overheal => {
                (Self::total(max_health.max(1), i32::MAX) - self.available(max_health)).max(0)
            }
        };
        let amount = amount.clamp(0, max_heal);
        if amount == 0 {
            return 0;
        }

        let available = self.available(max_health) + amount;
        self.set_from_total(available, max_health);

        if power == HealPower::OneBattle {
            self.add_resurrected(self.count() - old_count);
        }
        amount
    }

    /// Removes creatures that were only raised for this battle.
    pub fn take_resurrected(&mut self, max_health: i32) {
        if self.resurrected == 0 {
            return;
        }
        let available = self.available(max_health)
            - i64::from(self.resurrected) * i64::from(max_health);
        if available <= 0 {
            self.full_units = 0;
            self.first_hp_left = 0;
        } else {
            self.set_from_total(available, max_health);
        }
        self.resurrected = 0;
    }

    fn set_from_total(&mut self, total: i64, max_health: i32) {
        let max_health = i64::from(max_health.max(1));
        let mut first = total % max_health;
        let mut full = total / max_health;
        if first == 0 && full >= 1 {
            first = max_health;
            full -= 1;
        }
        self.first_hp_left = first as i32;
        self.full_units = full.min(i64::from(i32::MAX)) as i32;
    }

    fn add_resurrected(&mut self, delta: i32) {
        self.resurrected = (self.resurrected + delta).max(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HP: i32 = 123;
    const AMOUNT: i32 = 100;

    #[test]
    fn fresh_stack() {
        let health = UnitHealth::new(HP, AMOUNT);
        assert_eq!(health.count(), AMOUNT);
        assert_eq!(health.first_hp_left(), HP);
        assert_eq!(health.available(HP), 12_300);
        assert_eq!(UnitHealth::total(HP, AMOUNT), 12_300);
    }

    #[test]
    fn damage_wounds_then_kills() {
        let mut health = UnitHealth::new(10, 5);

        assert_eq!(health.damage(3, 10), 3);
        assert_eq!(health.count(), 5);
        assert_eq!(health.first_hp_left(), 7);

        // 7 + 10 finishes two creatures exactly
        assert_eq!(health.damage(17, 10), 17);
        assert_eq!(health.count(), 3);
        assert_eq!(health.first_hp_left(), 10);

        assert_eq!(health.damage(1_000, 10), 30);
        assert_eq!(health.count(), 0);
        assert_eq!(health.available(10), 0);
    }

    #[test]
    fn heal_levels() {
        let mut health = UnitHealth::new(10, 5);
        health.damage(25, 10); // 2 dead, front at 5

        // Plain heal tops the front creature only
        assert_eq!(health.heal(100, HealLevel::Heal, HealPower::Permanent, 10, 5), 5);
        assert_eq!(health.count(), 3);

        // Resurrection is capped at the starting pool
        assert_eq!(health.heal(100, HealLevel::Resurrect, HealPower::Permanent, 10, 5), 20);
        assert_eq!(health.count(), 5);

        assert_eq!(health.heal(10, HealLevel::Overheal, HealPower::Permanent, 10, 5), 10);
        assert_eq!(health.count(), 6);
    }

    #[test]
    fn one_battle_resurrection_is_reverted() {
        let mut health = UnitHealth::new(10, 5);
        health.damage(30, 10);
        assert_eq!(health.count(), 2);

        health.heal(20, HealLevel::Resurrect, HealPower::OneBattle, 10, 5);
        assert_eq!(health.count(), 4);
        assert_eq!(health.resurrected(), 2);

        // Dying again eats into the raised creatures first
        health.damage(10, 10);
        assert_eq!(health.resurrected(), 1);

        health.take_resurrected(10);
        assert_eq!(health.count(), 2);
        assert_eq!(health.resurrected(), 0);
    }

    #[test]
    fn overheal_stops_at_the_largest_stack() {
        let mut health = UnitHealth::new(10, 5);

        let healed = health.heal(i64::MAX, HealLevel::Overheal, HealPower::Permanent, 10, 5);
        assert_eq!(healed, UnitHealth::total(10, i32::MAX) - 50);
        assert_eq!(health.count(), i32::MAX);
        assert_eq!(health.first_hp_left(), 10);

        assert_eq!(health.heal(i64::MAX, HealLevel::Overheal, HealPower::OneBattle, 10, 5), 0);
        assert_eq!(health.resurrected(), 0);
    }
}
