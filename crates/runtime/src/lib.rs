//! Mutation channels and orchestration for battles built on `battle-core`.
//!
//! Effects submit [`battle_core::BattleMutation`]s through a
//! [`battle_core::BattleStateProxy`]. This crate provides the proxies and the
//! machinery around them:
//! - [`session`] applies every submission immediately, in-process
//! - [`authority`] owns the canonical battle and totally orders changes
//! - [`replica`] follows the authority's commit stream and proposes packets
//!   through [`ReplicaProxy`]
//! - [`events`] provides the topic-based bus observers subscribe to
pub mod authority;
pub mod config;
pub mod error;
pub mod events;
pub mod replica;
pub mod session;
pub mod setup;

mod commit;
mod handle;

pub use authority::{Authority, Command};
pub use commit::Outcome;
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use events::{
    Change, Commit, Event, EventBus, MutationEvent, Rejection, ReplicaId, RoundEvent, Topic,
    UnitEvent,
};
pub use handle::AuthorityHandle;
pub use replica::{Replica, ReplicaProxy, Resolution, SyncReport};
pub use session::LocalSession;
pub use setup::{BattleSetup, UnitSetup};
