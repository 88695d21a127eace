//! Read-only oracles: spell tables and deterministic randomness.
//!
//! Effects consult these through the cast [`Mechanics`](crate::effect::Mechanics)
//! rather than holding them, so the same effect configuration can run against
//! any table or generator.

mod rng;
mod spells;

pub use rng::{BattleRng, PcgRng, RngOracle, SeededRng, compute_seed};
pub use spells::{Positiveness, SpellDefinition, SpellId, SpellOracle, SpellTable};
