//! Versioned state-change packets.
//!
//! A [`BattleMutation`] is the only write path from effects into battle
//! state. It is applied verbatim by the authority and replayed by every
//! replica, so it carries values, not instructions to recompute them.

use crate::bonus::{Bonus, BonusDuration};
use crate::config::BattleConfig;
use crate::error::{BattleError, ErrorSeverity};
use crate::unit::{BattleHex, HealLevel, HealPower, TurnFlags, UnitId};

/// One change to one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitOperation {
    AddBonus(Bonus),
    /// Replaces the bonus with the same identity (refresh).
    UpdateBonus(Bonus),
    RemoveBonus(Bonus),
    /// Removes every bonus whose lifetime includes any of the given classes.
    RemoveBonuses(BonusDuration),
    Damage {
        amount: i64,
    },
    Heal {
        amount: i64,
        level: HealLevel,
        power: HealPower,
    },
    SetPosition(BattleHex),
    SetFlags(TurnFlags),
}

/// All operations a packet performs on one unit, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitChanges {
    pub unit: UnitId,
    pub ops: Vec<UnitOperation>,
}

impl UnitChanges {
    pub fn new(unit: UnitId) -> Self {
        Self {
            unit,
            ops: Vec::new(),
        }
    }
}

/// A batch of unit changes plus the battle-log lines describing them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleMutation {
    pub version: u16,
    pub changes: Vec<UnitChanges>,
    pub log: Vec<String>,
}

impl BattleMutation {
    pub fn new() -> Self {
        Self {
            version: BattleConfig::PACKET_VERSION,
            changes: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Appends `op` to the change set of `unit`, creating it on first use.
    pub fn push(&mut self, unit: UnitId, op: UnitOperation) {
        self.unit_changes(unit).ops.push(op);
    }

    pub fn with(mut self, unit: UnitId, op: UnitOperation) -> Self {
        self.push(unit, op);
        self
    }

    pub fn add_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn unit_changes(&mut self, unit: UnitId) -> &mut UnitChanges {
        let index = match self.changes.iter().position(|c| c.unit == unit) {
            Some(index) => index,
            None => {
                self.changes.push(UnitChanges::new(unit));
                self.changes.len() - 1
            }
        };
        &mut self.changes[index]
    }

    /// Units touched by this packet, in first-touch order.
    pub fn units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.changes.iter().map(|c| c.unit)
    }

    pub fn op_count(&self) -> usize {
        self.changes.iter().map(|c| c.ops.len()).sum()
    }

    /// True if the packet changes nothing. Log lines alone do not count.
    pub fn is_empty(&self) -> bool {
        self.changes.iter().all(|c| c.ops.is_empty())
    }

    /// Folds another packet into this one, preserving operation order.
    pub fn merge(&mut self, other: BattleMutation) {
        for changes in other.changes {
            self.unit_changes(changes.unit).ops.extend(changes.ops);
        }
        self.log.extend(other.log);
    }
}

impl Default for BattleMutation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "serde")]
impl BattleMutation {
    /// Encodes the packet into its wire form.
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        bincode::serialize(self).map_err(|e| PacketError::Codec(e.to_string()))
    }

    /// Decodes a packet, rejecting versions this build does not understand.
    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        let packet: BattleMutation =
            bincode::deserialize(bytes).map_err(|e| PacketError::Codec(e.to_string()))?;
        if packet.version != BattleConfig::PACKET_VERSION {
            return Err(PacketError::UnsupportedVersion {
                found: packet.version,
                expected: BattleConfig::PACKET_VERSION,
            });
        }
        Ok(packet)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("unsupported packet version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("packet codec failed: {0}")]
    Codec(String),
}

impl BattleError for PacketError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnsupportedVersion { .. } => ErrorSeverity::Fatal,
            Self::Codec(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion { .. } => "PACKET_UNSUPPORTED_VERSION",
            Self::Codec(_) => "PACKET_CODEC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bonus::{BonusSource, BonusType};

    fn haste() -> Bonus {
        Bonus::new(BonusType::StacksSpeed, 3)
            .with_source(BonusSource::SpellEffect, 53)
            .with_turns(3)
    }

    #[test]
    fn ops_group_by_unit() {
        let mut packet = BattleMutation::new();
        packet.push(UnitId(1), UnitOperation::AddBonus(haste()));
        packet.push(UnitId(2), UnitOperation::Damage { amount: 10 });
        packet.push(UnitId(1), UnitOperation::SetFlags(TurnFlags::MOVED));

        assert_eq!(packet.units().collect::<Vec<_>>(), vec![UnitId(1), UnitId(2)]);
        assert_eq!(packet.op_count(), 3);
        assert_eq!(packet.changes[0].ops.len(), 2);
    }

    #[test]
    fn log_only_packet_is_empty() {
        let mut packet = BattleMutation::new();
        packet.add_log("nothing happens");
        assert!(packet.is_empty());

        packet.unit_changes(UnitId(4));
        assert!(packet.is_empty());
    }

    #[test]
    fn merge_keeps_order() {
        let mut a = BattleMutation::new().with(UnitId(1), UnitOperation::Damage { amount: 1 });
        let b = BattleMutation::new()
            .with(UnitId(1), UnitOperation::Damage { amount: 2 })
            .with(UnitId(3), UnitOperation::SetPosition(BattleHex::new(1, 1)));
        a.merge(b);

        assert_eq!(
            a.changes[0].ops,
            vec![
                UnitOperation::Damage { amount: 1 },
                UnitOperation::Damage { amount: 2 }
            ]
        );
        assert_eq!(a.changes.len(), 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn wire_form_rejects_foreign_versions() {
        let mut packet = BattleMutation::new().with(UnitId(1), UnitOperation::AddBonus(haste()));
        packet.add_log("Haste is cast");
        let bytes = packet.encode().unwrap();
        assert_eq!(BattleMutation::decode(&bytes).unwrap(), packet);

        packet.version = 99;
        let bytes = packet.encode().unwrap();
        assert!(matches!(
            BattleMutation::decode(&bytes),
            Err(PacketError::UnsupportedVersion { found: 99, .. })
        ));
    }
}
