//! Event system for the battle runtime.
//!
//! - [`EventBus`]: topic-based broadcast channels
//! - [`types`]: typed events per topic
//!
//! The [`Topic::Mutation`] stream is totally ordered by commit sequence;
//! replaying it from the start reproduces the authority's state.

mod bus;
pub mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{Change, Commit, MutationEvent, Rejection, ReplicaId, RoundEvent, UnitEvent};
