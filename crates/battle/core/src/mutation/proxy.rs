//! The mutation channel contract.

use crate::error::{BattleError, ErrorSeverity};

use super::packet::{BattleMutation, PacketError};
use super::pending::MutationTicket;

/// Sink through which effects submit state changes.
///
/// Implementations decide when a submitted mutation becomes visible: a local
/// session applies it before the next query, a replica only after the
/// authority confirms it. Effects must not assume either.
pub trait BattleStateProxy {
    fn submit(&mut self, mutation: BattleMutation) -> Result<SubmitReceipt, ProxyError>;
}

/// What happened to a submitted mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubmitReceipt {
    /// Already applied to the state this proxy fronts.
    Applied(MutationTicket),
    /// Recorded; visible once committed.
    Pending(MutationTicket),
}

impl SubmitReceipt {
    pub const fn ticket(&self) -> MutationTicket {
        match self {
            Self::Applied(ticket) | Self::Pending(ticket) => *ticket,
        }
    }

    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Mutation channel failures surfaced to the effect's caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("mutation channel closed")]
    ChannelClosed,

    #[error("pending queue full ({capacity} proposals)")]
    QueueFull { capacity: usize },

    #[error("unknown mutation ticket {0}")]
    UnknownTicket(MutationTicket),

    #[error("mutation {ticket} rejected: {reason}")]
    Rejected {
        ticket: MutationTicket,
        reason: String,
    },

    #[error(transparent)]
    Packet(#[from] PacketError),
}

impl BattleError for ProxyError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ChannelClosed | Self::QueueFull { .. } => ErrorSeverity::Recoverable,
            Self::Rejected { .. } => ErrorSeverity::Validation,
            Self::UnknownTicket(_) => ErrorSeverity::Internal,
            Self::Packet(e) => e.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ChannelClosed => "PROXY_CHANNEL_CLOSED",
            Self::QueueFull { .. } => "PROXY_QUEUE_FULL",
            Self::UnknownTicket(_) => "PROXY_UNKNOWN_TICKET",
            Self::Rejected { .. } => "PROXY_REJECTED",
            Self::Packet(e) => e.error_code(),
        }
    }
}

impl<P: BattleStateProxy + ?Sized> BattleStateProxy for &mut P {
    fn submit(&mut self, mutation: BattleMutation) -> Result<SubmitReceipt, ProxyError> {
        (**self).submit(mutation)
    }
}
