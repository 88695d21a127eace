//! Event types for different topics.

use std::fmt;

use battle_core::{BattleMutation, Casualties, MutationTicket, UnitFields, UnitId};
use serde::{Deserialize, Serialize};

/// Identity of a replica proposing mutations to the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReplicaId(pub u32);

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "replica-{}", self.0)
    }
}

/// A state change in the battle's total order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change {
    /// A packet submitted through a proxy. `origin`/`local` identify the
    /// proposer's own ledger entry; both are `None` for authority-local
    /// submissions.
    Mutation {
        origin: Option<ReplicaId>,
        local: Option<MutationTicket>,
        mutation: BattleMutation,
    },
    StartRound,
    UnitGetsTurn(UnitId),
    AfterAttack {
        attacker: UnitId,
        defender: UnitId,
        ranged: bool,
        retaliation: bool,
    },
}

/// A change the authority applied, with its position in the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub seq: MutationTicket,
    /// Round the change was applied in.
    pub round: u32,
    pub change: Change,
}

/// A proposal the authority refused. Nothing was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub origin: Option<ReplicaId>,
    pub local: Option<MutationTicket>,
    pub code: String,
    pub reason: String,
}

/// Events on the ordered mutation stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MutationEvent {
    Committed(Commit),
    Rejected(Rejection),
}

/// Events related to round management (lightweight)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RoundEvent {
    Started {
        round: u32,
        /// Bonuses that ran out at the boundary.
        expired: usize,
        removed: Vec<UnitId>,
    },
    Finished {
        casualties: Vec<Casualties>,
    },
}

/// Events related to individual units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UnitEvent {
    Changed {
        unit: UnitId,
        fields: UnitFields,
        health_change: i64,
    },
    Died {
        unit: UnitId,
        round: u32,
    },
}
