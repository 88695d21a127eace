//! Composable predicates over bonuses.

use std::fmt;
use std::sync::Arc;

use super::record::Bonus;
use super::types::{BonusDuration, BonusSource, BonusSubtype, BonusType, ValueType};

/// A predicate deciding which bonuses a query is interested in.
///
/// Selectors are cheap to clone and combine. They never fail: a selector
/// built from a type/subtype pair that no bonus carries simply matches
/// nothing.
///
/// # Example
/// ```
/// # use battle_core::bonus::{Bonus, BonusType, Selector};
/// let melee_attacks = Selector::kind(BonusType::AdditionalAttack).and(Selector::effect_range(false));
/// assert!(melee_attacks.matches(&Bonus::new(BonusType::AdditionalAttack, 1)));
/// ```
#[derive(Clone)]
pub struct Selector(Arc<dyn Fn(&Bonus) -> bool + Send + Sync>);

impl Selector {
    /// Wraps an arbitrary predicate.
    pub fn new(predicate: impl Fn(&Bonus) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    pub fn all() -> Self {
        Self::new(|_| true)
    }

    pub fn none() -> Self {
        Self::new(|_| false)
    }

    pub fn kind(kind: BonusType) -> Self {
        Self::new(move |b| b.kind == kind)
    }

    pub fn type_subtype(kind: BonusType, subtype: BonusSubtype) -> Self {
        Self::new(move |b| b.kind == kind && b.subtype == subtype)
    }

    pub fn source(source: BonusSource, source_id: u32) -> Self {
        Self::new(move |b| b.source == source && b.source_id == source_id)
    }

    pub fn source_type(source: BonusSource) -> Self {
        Self::new(move |b| b.source == source)
    }

    /// Bonuses that count toward a melee (`false`) or ranged (`true`) query.
    pub fn effect_range(ranged: bool) -> Self {
        Self::new(move |b| b.effect_range.applies_to(ranged))
    }

    /// Bonuses still in effect `turn` rounds from now.
    pub fn turns(turn: u32) -> Self {
        Self::new(move |b| b.active_at(turn))
    }

    /// Bonuses whose lifetime includes any of the given classes.
    pub fn duration(duration: BonusDuration) -> Self {
        Self::new(move |b| b.duration.intersects(duration))
    }

    pub fn value_type(value_type: ValueType) -> Self {
        Self::new(move |b| b.value_type == value_type)
    }

    pub fn and(self, other: Selector) -> Self {
        Self::new(move |b| self.matches(b) && other.matches(b))
    }

    pub fn or(self, other: Selector) -> Self {
        Self::new(move |b| self.matches(b) || other.matches(b))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::new(move |b| !self.matches(b))
    }

    #[inline]
    pub fn matches(&self, bonus: &Bonus) -> bool {
        (self.0)(bonus)
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Selector(..)")
    }
}
