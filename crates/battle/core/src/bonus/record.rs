//! The modifier record itself.

use crate::env::SpellId;

use super::limiter::BonusLimiter;
use super::types::{
    BonusDuration, BonusSource, BonusSubtype, BonusType, EffectRange, PrimarySkill, ValueType,
};

/// A single stat or capability adjustment.
///
/// Bonuses are value objects: once a bonus is stored in a
/// [`BonusList`](super::BonusList) it is shared behind an `Arc` and never
/// changed in place. Expiry bookkeeping produces a fresh bonus (see
/// [`Bonus::ticked`]) that replaces the old one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bonus {
    pub kind: BonusType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subtype: BonusSubtype,
    pub value: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value_type: ValueType,
    #[cfg_attr(feature = "serde", serde(default = "default_duration"))]
    pub duration: BonusDuration,
    /// Rounds left for [`BonusDuration::N_TURNS`] bonuses.
    #[cfg_attr(feature = "serde", serde(default))]
    pub turns_remain: u16,
    #[cfg_attr(feature = "serde", serde(default))]
    pub source: BonusSource,
    /// Identifier within the source (spell id, creature id, ...).
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_id: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect_range: EffectRange,
    /// Bonuses sharing a stacking key do not stack; the strongest one counts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stacking: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub limiter: Option<BonusLimiter>,
}

#[cfg(feature = "serde")]
fn default_duration() -> BonusDuration {
    BonusDuration::PERMANENT
}

impl Bonus {
    /// Creates a permanent, additive, unrestricted creature-ability bonus.
    pub fn new(kind: BonusType, value: i32) -> Self {
        Self {
            kind,
            subtype: BonusSubtype::None,
            value,
            value_type: ValueType::Additive,
            duration: BonusDuration::PERMANENT,
            turns_remain: 0,
            source: BonusSource::CreatureAbility,
            source_id: 0,
            effect_range: EffectRange::NoLimit,
            stacking: None,
            limiter: None,
        }
    }

    /// Creates an attack or defence bonus.
    pub fn primary_skill(skill: PrimarySkill, value: i32) -> Self {
        Self::new(BonusType::PrimarySkill, value).with_subtype(BonusSubtype::PrimarySkill(skill))
    }

    pub fn with_subtype(mut self, subtype: BonusSubtype) -> Self {
        self.subtype = subtype;
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_source(mut self, source: BonusSource, source_id: u32) -> Self {
        self.source = source;
        self.source_id = source_id;
        self
    }

    pub fn with_duration(mut self, duration: BonusDuration) -> Self {
        self.duration = duration;
        self
    }

    /// Limits the bonus to `turns` rounds.
    pub fn with_turns(mut self, turns: u16) -> Self {
        self.duration |= BonusDuration::N_TURNS;
        self.duration.remove(BonusDuration::PERMANENT);
        self.turns_remain = turns;
        self
    }

    pub fn with_effect_range(mut self, range: EffectRange) -> Self {
        self.effect_range = range;
        self
    }

    pub fn with_stacking(mut self, key: impl Into<String>) -> Self {
        self.stacking = Some(key.into());
        self
    }

    pub fn with_limiter(mut self, limiter: BonusLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Returns true if the bonus was put there by a spell or ability effect.
    pub fn is_spell_effect(&self) -> bool {
        self.source == BonusSource::SpellEffect
    }

    /// Returns the spell id if this bonus is a spell effect.
    pub fn spell(&self) -> Option<SpellId> {
        self.is_spell_effect().then_some(SpellId(self.source_id))
    }

    /// Returns true if both bonuses describe the same adjustment from the same
    /// origin, ignoring value and remaining lifetime.
    ///
    /// Non-cumulative re-application refreshes a bonus with the same identity
    /// instead of stacking a second copy.
    pub fn same_identity(&self, other: &Bonus) -> bool {
        self.kind == other.kind
            && self.subtype == other.subtype
            && self.source == other.source
            && self.source_id == other.source_id
    }

    /// Returns true if the bonus is still in effect `turn` rounds from now.
    pub fn active_at(&self, turn: u32) -> bool {
        !self.duration.contains(BonusDuration::N_TURNS) || u32::from(self.turns_remain) > turn
    }

    /// Returns the bonus as it will look after one round has elapsed, or `None`
    /// if it runs out.
    pub fn ticked(&self) -> Option<Bonus> {
        if !self.duration.contains(BonusDuration::N_TURNS) {
            return Some(self.clone());
        }
        let turns_remain = self.turns_remain.saturating_sub(1);
        (turns_remain > 0).then(|| Bonus {
            turns_remain,
            ..self.clone()
        })
    }
}
