//! The authoritative arena: owns every [`UnitState`](crate::unit::UnitState)
//! of one battle and is the only place packets are applied.

mod error;
mod state;

pub use error::MutationError;
pub use state::{BattleState, Casualties, RoundReport};
