use crate::env::BattleRng;
use crate::mutation::{BattleMutation, UnitOperation};
use crate::unit::{HealLevel, HealPower, Unit};

use super::mechanics::Mechanics;
use super::unit_effect::UnitEffectOptions;
use super::Effect;

/// Restores health by the cast's effect value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Heal {
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal_level: HealLevel,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal_power: HealPower,
    /// Skip targets that would not get at least this many whole creatures back.
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_full_units: i32,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub options: UnitEffectOptions,
}

impl Heal {
    pub const NAME: &'static str = "core:heal";

    pub fn new(heal_level: HealLevel, heal_power: HealPower) -> Self {
        Self {
            heal_level,
            heal_power,
            min_full_units: 0,
            options: UnitEffectOptions::default(),
        }
    }

    pub fn with_min_full_units(mut self, min_full_units: i32) -> Self {
        self.min_full_units = min_full_units;
        self
    }

    /// Health `unit` could absorb at this heal level.
    pub fn injuries(&self, unit: &dyn Unit) -> i64 {
        match self.heal_level {
            HealLevel::Heal => i64::from((unit.max_health() - unit.first_hp_left()).max(0)),
            HealLevel::Resurrect => (unit.total_health() - unit.available_health()).max(0),
            HealLevel::Overheal => i64::MAX,
        }
    }
}

impl Effect for Heal {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &UnitEffectOptions {
        &self.options
    }

    fn allows_dead(&self) -> bool {
        self.heal_level != HealLevel::Heal
    }

    fn is_valid_target(&self, m: &dyn Mechanics, unit: &dyn Unit) -> bool {
        if self.heal_level == HealLevel::Heal && !unit.alive() {
            return false;
        }
        let injuries = self.injuries(unit);
        if injuries == 0 {
            return false;
        }
        if self.min_full_units > 0 {
            let gained = m.effect_value().min(injuries);
            return gained >= i64::from(self.min_full_units) * i64::from(unit.max_health());
        }
        true
    }

    fn prepare(
        &self,
        _rng: &mut dyn BattleRng,
        m: &dyn Mechanics,
        units: &[&dyn Unit],
    ) -> BattleMutation {
        let mut mutation = BattleMutation::new();
        let amount = m.effect_value();
        if amount <= 0 {
            return mutation;
        }
        for unit in units {
            mutation.push(
                unit.unit_id(),
                UnitOperation::Heal {
                    amount,
                    level: self.heal_level,
                    power: self.heal_power,
                },
            );
            mutation.add_log(format!(
                "{} restores up to {} health to {}",
                m.spell_name(),
                amount.min(self.injuries(*unit)),
                unit.info().unit_type().name
            ));
        }
        mutation
    }
}
