use crate::env::BattleRng;
use crate::mutation::{BattleMutation, UnitOperation};
use crate::unit::Unit;

use super::mechanics::Mechanics;
use super::unit_effect::UnitEffectOptions;
use super::Effect;

/// Deals damage derived from the cast's effect value.
///
/// By default the effect value is the damage itself. `kill_by_percentage`
/// reads it as a share of the stack to destroy, `kill_by_count` as a number
/// of creatures.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Damage {
    #[cfg_attr(feature = "serde", serde(default))]
    pub kill_by_percentage: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kill_by_count: bool,
    /// Damage varies by up to this many percent either way.
    #[cfg_attr(feature = "serde", serde(default))]
    pub variance_percent: u8,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub options: UnitEffectOptions,
}

impl Damage {
    pub const NAME: &'static str = "core:damage";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn kill_by_percentage() -> Self {
        Self {
            kill_by_percentage: true,
            ..Self::default()
        }
    }

    pub fn kill_by_count() -> Self {
        Self {
            kill_by_count: true,
            ..Self::default()
        }
    }

    pub fn with_variance(mut self, percent: u8) -> Self {
        self.variance_percent = percent;
        self
    }

    /// Damage before variance.
    pub fn base_damage(&self, m: &dyn Mechanics, unit: &dyn Unit) -> i64 {
        let value = m.effect_value();
        let max_health = i64::from(unit.max_health());
        if self.kill_by_percentage {
            (i64::from(unit.count()).saturating_mul(value) / 100).saturating_mul(max_health)
        } else if self.kill_by_count {
            value.saturating_mul(max_health)
        } else {
            value
        }
    }

    fn roll(&self, rng: &mut dyn BattleRng, base: i64) -> i64 {
        if self.variance_percent == 0 || base <= 0 {
            return base;
        }
        let spread = i64::from(self.variance_percent);
        let percent = rng.range_i64(-spread, spread);
        base.saturating_add(base.saturating_mul(percent) / 100).max(0)
    }
}

impl Effect for Damage {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &UnitEffectOptions {
        &self.options
    }

    fn is_valid_target(&self, _m: &dyn Mechanics, unit: &dyn Unit) -> bool {
        unit.alive()
    }

    fn prepare(
        &self,
        rng: &mut dyn BattleRng,
        m: &dyn Mechanics,
        units: &[&dyn Unit],
    ) -> BattleMutation {
        let mut mutation = BattleMutation::new();
        for unit in units {
            let amount = self.roll(rng, self.base_damage(m, *unit));
            if amount <= 0 {
                continue;
            }
            mutation.push(unit.unit_id(), UnitOperation::Damage { amount });
            mutation.add_log(format!(
                "{} does {} damage to {}",
                m.spell_name(),
                amount,
                unit.info().unit_type().name
            ));
        }
        mutation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::fixtures::*;
    use crate::effect::{CastContext, EffectTarget};
    use crate::env::{Positiveness, SeededRng, SpellDefinition, SpellId};
    use crate::mutation::PendingMutations;

    fn bolt() -> SpellDefinition {
        SpellDefinition::new(SpellId(17), "Lightning Bolt", Positiveness::Negative)
    }

    #[test]
    fn damage_modes() {
        let spells = spells();
        let bolt = bolt();
        let m = CastContext::new(&spells, &bolt).with_value(50);
        let info = record(1, 10);
        let unit = unit(&info);

        assert_eq!(Damage::new().base_damage(&m, &unit), 50);
        // half of 10 creatures at 35 hp
        assert_eq!(Damage::kill_by_percentage().base_damage(&m, &unit), 175);
        assert_eq!(Damage::kill_by_count().base_damage(&m, &unit), 50 * 35);
    }

    #[test]
    fn huge_values_saturate() {
        let spells = spells();
        let bolt = bolt();
        let m = CastContext::new(&spells, &bolt).with_value(i64::MAX);
        let info = record(1, 10);
        let unit = unit(&info);

        assert_eq!(Damage::kill_by_count().base_damage(&m, &unit), i64::MAX);
        assert_eq!(Damage::kill_by_percentage().base_damage(&m, &unit), i64::MAX);

        let target: EffectTarget = [&unit as &dyn Unit].into_iter().collect();
        let mut ledger = PendingMutations::new();
        Damage::new()
            .with_variance(50)
            .apply(&mut ledger, &mut SeededRng::new(3), &m, &target)
            .unwrap();
        let (_, packet) = ledger.drain().next().unwrap();
        assert!(matches!(
            packet.changes[0].ops[0],
            UnitOperation::Damage { amount } if amount > 0
        ));
    }

    #[test]
    fn variance_is_bounded_and_deterministic() {
        let spells = spells();
        let bolt = bolt();
        let m = CastContext::new(&spells, &bolt).with_value(100);
        let info = record(1, 10);
        let unit = unit(&info);
        let target: EffectTarget = [&unit as &dyn Unit].into_iter().collect();
        let effect = Damage::new().with_variance(20);

        let amount = |seed| {
            let mut ledger = PendingMutations::new();
            effect
                .apply(&mut ledger, &mut SeededRng::new(seed), &m, &target)
                .unwrap();
            let (_, packet) = ledger.drain().next().unwrap();
            match packet.changes[0].ops[0] {
                UnitOperation::Damage { amount } => amount,
                ref other => panic!("unexpected op {other:?}"),
            }
        };

        for seed in 0..16 {
            let a = amount(seed);
            assert!((80..=120).contains(&a), "{a}");
            assert_eq!(a, amount(seed));
        }
    }

    #[test]
    fn immune_unit_is_skipped() {
        use crate::bonus::{Bonus, BonusSubtype, BonusType};

        let spells = spells();
        let bolt = bolt();
        let m = CastContext::new(&spells, &bolt).with_value(10).with_level(2);
        let info = record(1, 10);
        let mut immune = unit(&info);
        immune.add_bonus(
            Bonus::new(BonusType::SpellImmunity, 1).with_subtype(BonusSubtype::Spell(17)),
        );
        let info2 = record(2, 10);
        let mut high_level = unit(&info2);
        high_level.add_bonus(Bonus::new(BonusType::LevelSpellImmunity, 3));

        let target: EffectTarget = [&immune as &dyn Unit, &high_level as &dyn Unit]
            .into_iter()
            .collect();
        assert!(Damage::new().filter_target(&m, &target).is_empty());

        let ability = CastContext::new(&spells, &bolt).with_value(10).as_ability();
        assert_eq!(Damage::new().filter_target(&ability, &target).len(), 2);
    }
}
