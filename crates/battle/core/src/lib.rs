//! Deterministic unit state and bonus aggregation for turn-based battles.
//!
//! `battle-core` holds the rules shared by authorities and replicas: bonus
//! records and their folding into combat numbers, per-unit combat state, the
//! spell effects that target units, and the mutation packets those effects
//! emit. Effects never write to units directly. They submit a
//! [`mutation::BattleMutation`] through a [`mutation::BattleStateProxy`], and
//! only [`battle::BattleState::apply_mutation`] changes state.
pub mod battle;
pub mod bonus;
pub mod config;
pub mod effect;
pub mod env;
pub mod error;
pub mod mutation;
pub mod unit;

pub use battle::{BattleState, Casualties, MutationError, RoundReport};
pub use bonus::{
    Bonus, BonusBearer, BonusDuration, BonusLimiter, BonusList, BonusNode, BonusSource,
    BonusSubtype, BonusType, EffectRange, PrimarySkill, RangedTotals, Selector, StatBounds,
    ValueStack, ValueType,
};
pub use config::BattleConfig;
pub use effect::{
    CastContext, Damage, Destination, Dispel, Effect, EffectTarget, Heal, Mechanics, Timed,
    UnitEffectOptions,
};
pub use env::{
    BattleRng, PcgRng, Positiveness, RngOracle, SeededRng, SpellDefinition, SpellId, SpellOracle,
    SpellTable, compute_seed,
};
pub use error::{BattleError, ErrorContext, ErrorSeverity};
pub use mutation::{
    AppliedMutation, BattleMutation, BattleStateProxy, MutationTicket, PacketError,
    PendingMutations, ProxyError, SubmitReceipt, UnitChanges, UnitDelta, UnitFields, UnitOperation,
};
pub use unit::{
    BattleEnvironment, BattleHex, BattleSide, CreatureId, CreatureType, HealLevel, HealPower,
    TurnFlags, Unit, UnitEnvironment, UnitHealth, UnitId, UnitInfo, UnitMarkers, UnitRecord,
    UnitSlot, UnitState, UsageCounter,
};
