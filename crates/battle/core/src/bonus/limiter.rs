//! Context-dependent gates on individual bonuses.
//!
//! A selector decides whether a caller is *asking* for a bonus; a limiter
//! decides whether the bonus *applies* to the bearer at all. Limiters are
//! evaluated against the bearer's identity, never against the query.

use crate::unit::{BattleSide, CreatureId};

use super::list::BonusList;
use super::types::BonusType;

/// Restriction carried by a bonus.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BonusLimiter {
    /// Only units of the given creature type.
    UnitType(CreatureId),
    /// Only units fighting for the given side.
    Side(BattleSide),
    /// Only bearers that also carry a bonus of the given type.
    HasBonus(BonusType),
}

/// Identity of the bearer a limiter is evaluated against.
#[derive(Clone, Copy, Debug)]
pub struct LimiterContext<'a> {
    pub creature: CreatureId,
    pub side: BattleSide,
    /// Every bonus of the bearer, before limiting.
    pub bonuses: &'a BonusList,
}

impl BonusLimiter {
    /// Returns true if the bonus applies in the given context.
    pub fn accepts(&self, ctx: &LimiterContext<'_>) -> bool {
        match self {
            BonusLimiter::UnitType(creature) => *creature == ctx.creature,
            BonusLimiter::Side(side) => *side == ctx.side,
            BonusLimiter::HasBonus(kind) => ctx
                .bonuses
                .iter()
                .any(|b| b.kind == *kind && b.limiter.is_none()),
        }
    }
}
