use crate::bonus::{Bonus, BonusDuration, BonusSource, Selector};
use crate::env::BattleRng;
use crate::mutation::{BattleMutation, UnitOperation};
use crate::unit::Unit;

use super::mechanics::Mechanics;
use super::unit_effect::UnitEffectOptions;
use super::Effect;

/// Places spell bonuses for the cast's duration.
///
/// The configured bonuses are templates: source and source id are taken from
/// the cast. Templates without a specific lifetime last the cast's duration.
/// A non-cumulative cast refreshes bonuses the target already has from the
/// same spell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timed {
    #[cfg_attr(feature = "serde", serde(default))]
    pub cumulative: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub bonus: Vec<Bonus>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub options: UnitEffectOptions,
}

impl Timed {
    pub const NAME: &'static str = "core:timed";

    pub fn new(bonus: Vec<Bonus>) -> Self {
        Self {
            cumulative: false,
            bonus,
            options: UnitEffectOptions::default(),
        }
    }

    pub fn cumulative(mut self) -> Self {
        self.cumulative = true;
        self
    }

    /// The bonuses this cast places, stamped with its spell and duration.
    pub fn converted_bonuses(&self, m: &dyn Mechanics) -> Vec<Bonus> {
        self.bonus
            .iter()
            .map(|template| {
                let mut bonus = template
                    .clone()
                    .with_source(BonusSource::SpellEffect, m.spell_id().0);
                if bonus.duration.is_empty()
                    || bonus.duration.is_permanent()
                    || bonus.duration.contains(BonusDuration::N_TURNS)
                {
                    bonus = bonus.with_turns(m.effect_duration());
                }
                bonus
            })
            .collect()
    }
}

impl Effect for Timed {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &UnitEffectOptions {
        &self.options
    }

    fn is_valid_target(&self, _m: &dyn Mechanics, _unit: &dyn Unit) -> bool {
        !self.bonus.is_empty()
    }

    fn prepare(
        &self,
        _rng: &mut dyn BattleRng,
        m: &dyn Mechanics,
        units: &[&dyn Unit],
    ) -> BattleMutation {
        let mut mutation = BattleMutation::new();
        let bonuses = self.converted_bonuses(m);
        for unit in units {
            let existing = unit.unit_bonuses(&Selector::source(
                BonusSource::SpellEffect,
                m.spell_id().0,
            ));
            for bonus in &bonuses {
                let refresh =
                    !self.cumulative && existing.iter().any(|b| b.same_identity(bonus));
                let op = if refresh {
                    UnitOperation::UpdateBonus(bonus.clone())
                } else {
                    UnitOperation::AddBonus(bonus.clone())
                };
                mutation.push(unit.unit_id(), op);
            }
            mutation.add_log(format!(
                "{} casts {} on {}",
                m.caster()
                    .map_or_else(|| String::from("Someone"), |id| id.to_string()),
                m.spell_name(),
                unit.info().unit_type().name
            ));
        }
        mutation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::{BonusSubtype, BonusType, PrimarySkill};
    use crate::effect::fixtures::*;
    use crate::effect::{CastContext, EffectTarget};
    use crate::env::{SeededRng, SpellOracle};
    use crate::mutation::PendingMutations;

    fn bless_template() -> Bonus {
        Bonus::new(BonusType::PrimarySkill, 3)
            .with_subtype(BonusSubtype::PrimarySkill(PrimarySkill::Attack))
    }

    #[test]
    fn stamps_spell_and_duration() {
        let spells = spells();
        let bless = spells.spell(BLESS).unwrap();
        let m = CastContext::new(&spells, bless).with_duration(4);

        let converted = Timed::new(vec![bless_template()]).converted_bonuses(&m);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].spell(), Some(BLESS));
        assert_eq!(converted[0].turns_remain, 4);
        assert!(converted[0].duration.contains(BonusDuration::N_TURNS));
    }

    #[test]
    fn non_cumulative_cast_refreshes() {
        let spells = spells();
        let bless = spells.spell(BLESS).unwrap();
        let m = CastContext::new(&spells, bless).with_duration(4);
        let info = record(1, 10);
        let mut unit = unit(&info);
        unit.add_bonus(
            bless_template()
                .with_source(BonusSource::SpellEffect, BLESS.0)
                .with_turns(1),
        );

        let target: EffectTarget = [&unit as &dyn Unit].into_iter().collect();
        let mut ledger = PendingMutations::new();

        Timed::new(vec![bless_template()])
            .apply(&mut ledger, &mut SeededRng::new(0), &m, &target)
            .unwrap();
        Timed::new(vec![bless_template()])
            .cumulative()
            .apply(&mut ledger, &mut SeededRng::new(0), &m, &target)
            .unwrap();

        let packets: Vec<_> = ledger.drain().map(|(_, p)| p).collect();
        assert!(matches!(packets[0].changes[0].ops[0], UnitOperation::UpdateBonus(_)));
        assert!(matches!(packets[1].changes[0].ops[0], UnitOperation::AddBonus(_)));
        assert!(packets[0].log[0].contains("Bless"));
    }
}
