//! Common error infrastructure for battle-core.
//!
//! Domain errors (`MutationError`, `ProxyError`) live next to the code that
//! raises them; this module holds what they share.
//!
//! # Design Principles
//!
//! - **Type Safety**: each failure surface has its own error enum
//! - **Rich Context**: errors carry the unit and round they were raised for
//! - **Severity Classification**: errors are categorized for recovery strategies

use crate::unit::UnitId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: may succeed later or through another route
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistency
/// - **Fatal**: battle state can no longer be trusted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: mutation channel closed, authority busy.
    Recoverable,

    /// Examples: unknown unit in a packet, stale ticket.
    Validation,

    /// Examples: ledger desync between replica and authority.
    Internal,

    /// Examples: packet version mismatch mid-battle.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug rather than bad input.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to errors for diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Unit the failing operation targeted (if applicable).
    pub unit: Option<UnitId>,

    /// Battle round at the time of error.
    pub round: u32,

    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(round: u32) -> Self {
        Self {
            unit: None,
            round,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_unit(mut self, unit: UnitId) -> Self {
        self.unit = Some(unit);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all battle-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Not every error carries context (e.g. errors wrapped from codecs).
    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Stable identifier for this error variant, for logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
