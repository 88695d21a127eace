//! Mutation packets and the channel effects submit them through.
//!
//! ```text
//! Effect ──submit──▶ BattleStateProxy ──(local | replicated)──▶ BattleState::apply_mutation
//!                          │
//!                   PendingMutations  propose → commit / reject
//! ```

mod fields;
mod packet;
mod pending;
mod proxy;

pub use fields::{AppliedMutation, UnitDelta, UnitFields};
pub use packet::{BattleMutation, PacketError, UnitChanges, UnitOperation};
pub use pending::{MutationTicket, PendingMutations};
pub use proxy::{BattleStateProxy, ProxyError, SubmitReceipt};
