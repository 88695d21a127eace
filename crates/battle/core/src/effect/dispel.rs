use crate::bonus::{Bonus, BonusList, BonusSource, Selector};
use crate::env::{BattleRng, Positiveness, SpellDefinition, SpellId};
use crate::mutation::{BattleMutation, UnitOperation};
use crate::unit::Unit;

use super::mechanics::Mechanics;
use super::unit_effect::UnitEffectOptions;
use super::Effect;

/// Strips spell bonuses of the configured categories.
///
/// Only bonuses placed by a known, dispellable, battle spell qualify; the
/// category comes from that spell's positiveness.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dispel {
    #[cfg_attr(feature = "serde", serde(default))]
    pub positive: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub negative: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub neutral: bool,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub options: UnitEffectOptions,
}

impl Dispel {
    pub const NAME: &'static str = "core:dispel";

    pub fn new(positive: bool, negative: bool, neutral: bool) -> Self {
        Self {
            positive,
            negative,
            neutral,
            options: UnitEffectOptions::default(),
        }
    }

    fn accepts_category(&self, spell: &SpellDefinition) -> bool {
        match spell.positiveness {
            Positiveness::Positive => self.positive,
            Positiveness::Negative => self.negative,
            Positiveness::Neutral => self.neutral,
        }
    }

    /// Bonuses of `unit` this dispel would remove.
    pub fn dispellable_bonuses(&self, m: &dyn Mechanics, unit: &dyn Unit) -> BonusList {
        let mut bonuses = unit.unit_bonuses(&Selector::source_type(BonusSource::SpellEffect));
        bonuses.retain(|bonus| {
            bonus
                .spell()
                .and_then(|id| m.spells().spell(id))
                .is_some_and(|spell| {
                    spell.dispellable && !spell.adventure && self.accepts_category(spell)
                })
        });
        bonuses
    }
}

impl Effect for Dispel {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &UnitEffectOptions {
        &self.options
    }

    fn is_valid_target(&self, m: &dyn Mechanics, unit: &dyn Unit) -> bool {
        !self.dispellable_bonuses(m, unit).is_empty()
    }

    fn prepare(
        &self,
        _rng: &mut dyn BattleRng,
        m: &dyn Mechanics,
        units: &[&dyn Unit],
    ) -> BattleMutation {
        let mut mutation = BattleMutation::new();
        for unit in units {
            let removed = self.dispellable_bonuses(m, *unit);
            let mut spells: Vec<SpellId> = Vec::new();
            for bonus in removed.iter() {
                if let Some(id) = bonus.spell()
                    && !spells.contains(&id)
                {
                    spells.push(id);
                }
                mutation.push(unit.unit_id(), UnitOperation::RemoveBonus(Bonus::clone(bonus)));
            }
            for id in spells {
                let name = m.spells().spell(id).map_or("unknown spell", |s| s.name.as_str());
                mutation.add_log(format!(
                    "{} is no longer affected by {}",
                    unit.info().unit_type().name,
                    name
                ));
            }
        }
        mutation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::BattleState;
    use crate::bonus::{BonusBearer, BonusNode, BonusSubtype, BonusType, PrimarySkill};
    use crate::config::BattleConfig;
    use crate::effect::fixtures::*;
    use crate::effect::{CastContext, EffectTarget};
    use crate::env::{SeededRng, SpellOracle};
    use crate::mutation::{PendingMutations, UnitFields};
    use crate::unit::{BattleEnvironment, BattleHex, UnitId};

    fn on_attack(spell: SpellId, value: i32) -> Bonus {
        spell_bonus(spell, BonusType::PrimarySkill, value)
            .with_subtype(BonusSubtype::PrimarySkill(PrimarySkill::Attack))
    }

    fn dispel_spell() -> SpellDefinition {
        SpellDefinition::new(SpellId(35), "Dispel", Positiveness::Positive)
    }

    #[test]
    fn removes_only_the_configured_category() {
        let spells = spells();
        let dispel_spell = SpellDefinition::new(SpellId(35), "Dispel", Positiveness::Positive);
        let m = CastContext::new(&spells, &dispel_spell);
        let info = record(1, 10);
        let mut unit = unit(&info);
        unit.add_bonus(spell_bonus(BLESS, BonusType::PrimarySkill, 3));
        unit.add_bonus(spell_bonus(CURSE, BonusType::PrimarySkill, -3));
        unit.add_bonus(spell_bonus(SLOW, BonusType::StacksSpeed, -2));

        let dispel = Dispel::new(false, true, false);
        let target: EffectTarget = [&unit as &dyn Unit].into_iter().collect();
        let mut ledger = PendingMutations::new();
        let receipt = dispel
            .apply(&mut ledger, &mut SeededRng::new(1), &m, &target)
            .unwrap()
            .unwrap();

        let mutation = ledger.get(receipt.ticket()).unwrap();
        assert_eq!(mutation.op_count(), 2);
        assert!(mutation.changes[0].ops.iter().all(|op| matches!(
            op,
            UnitOperation::RemoveBonus(b) if b.spell() != Some(BLESS)
        )));
        assert_eq!(mutation.log.len(), 2);
        assert!(mutation.log[0].contains("Curse"));
    }

    #[test]
    fn no_matching_bonus_submits_nothing() {
        let spells = spells();
        let dispel_spell = SpellDefinition::new(SpellId(35), "Dispel", Positiveness::Positive);
        let m = CastContext::new(&spells, &dispel_spell);
        let info = record(1, 10);
        let mut unit = unit(&info);
        unit.add_bonus(spell_bonus(BLESS, BonusType::PrimarySkill, 3));
        let before = unit.bearer().revision();

        let dispel = Dispel::new(false, true, true);
        assert!(!dispel.is_valid_target(&m, &unit));

        let target: EffectTarget = [&unit as &dyn Unit].into_iter().collect();
        let mut ledger = PendingMutations::new();
        let receipt = dispel
            .apply(&mut ledger, &mut SeededRng::new(1), &m, &target)
            .unwrap();
        assert!(receipt.is_none());
        assert!(ledger.is_empty());
        assert_eq!(unit.bearer().revision(), before);
    }

    #[test]
    fn protected_spells_survive() {
        let spells = spells();
        assert!(spells.spell(CLONE).is_some());
        let dispel_spell = SpellDefinition::new(SpellId(35), "Dispel", Positiveness::Positive);
        let m = CastContext::new(&spells, &dispel_spell);
        let info = record(1, 10);
        let mut unit = unit(&info);
        unit.add_bonus(spell_bonus(CLONE, BonusType::LifetimeMarker, 1));
        unit.add_bonus(spell_bonus(FLY, BonusType::StacksSpeed, 1));
        unit.add_bonus(spell_bonus(SpellId(999), BonusType::StacksSpeed, 1));

        let dispel = Dispel::new(true, true, true);
        assert!(dispel.dispellable_bonuses(&m, &unit).is_empty());
    }

    #[test]
    fn applied_dispel_leaves_other_bonuses_alone() {
        let spells = spells();
        let dispel_spell = dispel_spell();
        let m = CastContext::new(&spells, &dispel_spell);
        let info = record(1, 10);
        let env = BattleEnvironment::new();
        let mut bonuses = base();
        bonuses.add_new_bonus(on_attack(BLESS, 3));
        bonuses.add_new_bonus(on_attack(CURSE, -3));
        bonuses.add_new_bonus(spell_bonus(SLOW, BonusType::StacksSpeed, -2));
        let mut battle = BattleState::new(BattleConfig::new(), &env);
        battle.add_unit(&info, bonuses, BattleHex::new(3, 4)).unwrap();

        let dispel = Dispel::new(false, true, false);
        let mut ledger = PendingMutations::new();
        let receipt = dispel
            .apply(
                &mut ledger,
                &mut SeededRng::new(1),
                &m,
                &battle.target(&[UnitId(1)]),
            )
            .unwrap()
            .unwrap();
        let mutation = ledger.commit(receipt.ticket()).unwrap();
        let applied = battle.apply_mutation(&mutation).unwrap();
        assert!(applied.rejected.is_empty());

        let unit = battle.unit(UnitId(1)).unwrap();
        let from = |spell: SpellId| Selector::source(BonusSource::SpellEffect, spell.0);
        assert!(unit.bearer().has_bonus(&from(BLESS)));
        assert!(!unit.bearer().has_bonus(&from(CURSE)));
        assert!(!unit.bearer().has_bonus(&from(SLOW)));
        // Four innate stats plus Bless
        assert_eq!(unit.bonuses(&Selector::all()).len(), 5);
        assert_eq!(unit.attack(false), 13);
        assert_eq!(unit.defence(false), 12);
        assert_eq!(unit.initiative(), 5);
        assert_eq!(unit.max_health(), 35);
    }

    #[test]
    fn overlapping_dispels_from_one_snapshot() {
        let spells = spells();
        let dispel_spell = dispel_spell();
        let m = CastContext::new(&spells, &dispel_spell);
        let records = [record(1, 10), record(2, 10)];
        let env = BattleEnvironment::new();
        let mut battle = BattleState::new(BattleConfig::new(), &env);
        for (i, info) in records.iter().enumerate() {
            let mut bonuses: BonusNode = base();
            bonuses.add_new_bonus(on_attack(CURSE, -3));
            battle
                .add_unit(info, bonuses, BattleHex::new(3 + i as i16, 4))
                .unwrap();
        }
        assert_eq!(battle.unit(UnitId(2)).unwrap().attack(false), 7);

        // Both casts see the same state: each would strip unit 1.
        let dispel = Dispel::new(false, true, false);
        let mut ledger = PendingMutations::new();
        let mut rng = SeededRng::new(1);
        let first = dispel
            .apply(&mut ledger, &mut rng, &m, &battle.target(&[UnitId(1)]))
            .unwrap()
            .unwrap()
            .ticket();
        let second = dispel
            .apply(
                &mut ledger,
                &mut rng,
                &m,
                &battle.target(&[UnitId(1), UnitId(2)]),
            )
            .unwrap()
            .unwrap()
            .ticket();
        let first = ledger.commit(first).unwrap();
        let second = ledger.commit(second).unwrap();

        battle.apply_mutation(&first).unwrap();
        let applied = battle.apply_mutation(&second).unwrap();

        assert_eq!(applied.rejected.len(), 1);
        assert_eq!(applied.rejected[0].0, UnitId(1));
        assert!(applied.delta(UnitId(1)).is_none());
        assert_eq!(applied.delta(UnitId(2)).unwrap().fields, UnitFields::BONUSES);
        assert_eq!(battle.unit(UnitId(1)).unwrap().attack(false), 10);
        assert_eq!(battle.unit(UnitId(2)).unwrap().attack(false), 10);
        assert_eq!(battle.applied_count(), 2);
    }
}
