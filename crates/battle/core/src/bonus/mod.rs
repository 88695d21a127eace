//! Bonus system - modifiers, selection, and aggregation.
//!
//! Every number a unit reports in combat is the fold of a selection of
//! bonuses. Base stats are bonuses too (source `CreatureAbility`), so "no
//! bonuses" naturally means zero and callers never special-case absence.
//!
//! # Architecture
//!
//! ```text
//! [ Bonus ]  immutable record (type, subtype, value, duration, source, range, limiter)
//!      ↓
//! [ BonusList ]  ordered multiset, owned by exactly one bearer
//!      ↓
//! [ BonusBearer ]  select(selector) / add / remove capability
//!      ↓
//! [ ValueStack ]  order-independent fold into a single number
//! ```

pub mod aggregate;
pub mod bearer;
pub mod cache;
pub mod limiter;
pub mod list;
pub mod record;
pub mod selector;
pub mod types;

pub use aggregate::{StatBounds, ValueStack};
pub use bearer::{BonusBearer, BonusNode};
pub use cache::{RangedTotals, ValueCache};
pub use limiter::{BonusLimiter, LimiterContext};
pub use list::BonusList;
pub use record::Bonus;
pub use selector::Selector;
pub use types::{
    BonusDuration, BonusSource, BonusSubtype, BonusType, EffectRange, PrimarySkill, ValueType,
};
