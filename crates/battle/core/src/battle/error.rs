use crate::error::{BattleError, ErrorContext, ErrorSeverity};
use crate::mutation::PacketError;
use crate::unit::UnitId;

/// Errors raised while changing battle state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("unit {unit} is not part of this battle")]
    UnknownUnit { unit: UnitId, context: ErrorContext },

    #[error("unit {0} is already part of this battle")]
    DuplicateUnit(UnitId),

    #[error("battle is full ({limit} units)")]
    TooManyUnits { limit: usize },

    #[error("unit {unit} has no matching bonus to {action}")]
    MissingBonus {
        unit: UnitId,
        action: &'static str,
        context: ErrorContext,
    },

    #[error(transparent)]
    Packet(#[from] PacketError),
}

impl BattleError for MutationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownUnit { .. } | Self::DuplicateUnit(_) | Self::TooManyUnits { .. } => {
                ErrorSeverity::Validation
            }
            // A replica missing a bonus the authority had means the two diverged.
            Self::MissingBonus { .. } => ErrorSeverity::Internal,
            Self::Packet(e) => e.severity(),
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::UnknownUnit { context, .. } | Self::MissingBonus { context, .. } => Some(context),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownUnit { .. } => "MUTATION_UNKNOWN_UNIT",
            Self::DuplicateUnit(_) => "MUTATION_DUPLICATE_UNIT",
            Self::TooManyUnits { .. } => "MUTATION_TOO_MANY_UNITS",
            Self::MissingBonus { .. } => "MUTATION_MISSING_BONUS",
            Self::Packet(e) => e.error_code(),
        }
    }
}
