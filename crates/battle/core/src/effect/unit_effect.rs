//! Target screening shared by every effect that acts on units.

use crate::bonus::{BonusSubtype, BonusType, Selector};
use crate::unit::Unit;

use super::mechanics::Mechanics;

/// Options every unit effect accepts in its configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitEffectOptions {
    /// Reach units that would otherwise be immune.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ignore_immunity: bool,
}

impl UnitEffectOptions {
    /// Returns false if the unit is immune to this magic effect.
    ///
    /// Immunity comes from `SpellImmunity` for the specific spell, or from
    /// `LevelSpellImmunity` at or above the cast level. Non-magic effects
    /// always get through.
    pub fn is_receptive(&self, m: &dyn Mechanics, unit: &dyn Unit) -> bool {
        if self.ignore_immunity || !m.is_magic_effect() {
            return true;
        }
        let spell = Selector::type_subtype(
            BonusType::SpellImmunity,
            BonusSubtype::Spell(m.spell_id().0),
        );
        if unit.has_unit_bonus(&spell) {
            return false;
        }
        match unit
            .unit_bonuses(&Selector::kind(BonusType::LevelSpellImmunity))
            .max_value()
        {
            Some(level) => level < i32::from(m.effect_level()),
            None => true,
        }
    }
}
