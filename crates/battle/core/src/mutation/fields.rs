use bitflags::bitflags;

use crate::unit::UnitId;

use super::packet::UnitOperation;

bitflags! {
    /// Which parts of a unit a mutation touched.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct UnitFields: u8 {
        const BONUSES  = 1 << 0;
        const HEALTH   = 1 << 1;
        const POSITION = 1 << 2;
        const FLAGS    = 1 << 3;
    }
}

impl UnitFields {
    /// Fields an operation may change.
    pub fn of(op: &UnitOperation) -> Self {
        match op {
            UnitOperation::AddBonus(_)
            | UnitOperation::UpdateBonus(_)
            | UnitOperation::RemoveBonus(_)
            | UnitOperation::RemoveBonuses(_) => Self::BONUSES,
            UnitOperation::Damage { .. } | UnitOperation::Heal { .. } => Self::HEALTH,
            UnitOperation::SetPosition(_) => Self::POSITION,
            UnitOperation::SetFlags(_) => Self::FLAGS,
        }
    }
}

/// Per-unit summary of an applied mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitDelta {
    pub unit: UnitId,
    pub fields: UnitFields,
    /// Health lost (positive) or restored (negative) by this mutation.
    pub health_change: i64,
    /// Set if the unit went from alive to dead.
    pub died: bool,
}

impl UnitDelta {
    pub fn new(unit: UnitId) -> Self {
        Self {
            unit,
            fields: UnitFields::empty(),
            health_change: 0,
            died: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Outcome of applying one [`BattleMutation`](super::BattleMutation).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedMutation {
    pub deltas: Vec<UnitDelta>,
    pub log: Vec<String>,
    /// Operations dropped because they did not apply (lenient mode only).
    pub skipped: usize,
    /// Units whose changes were discarded, with the reason (strict mode only).
    pub rejected: Vec<(UnitId, String)>,
}

impl AppliedMutation {
    pub fn delta(&self, unit: UnitId) -> Option<&UnitDelta> {
        self.deltas.iter().find(|d| d.unit == unit)
    }

    pub fn deaths(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.deltas.iter().filter(|d| d.died).map(|d| d.unit)
    }
}
