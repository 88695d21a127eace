//! Static identity of a combatant.
//!
//! Everything in this module is read-only from the point of view of the
//! battle: it is supplied when a unit state is created and never mutated.

use core::fmt;

/// Identifier of a unit within one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Identifier of a creature type in the static creature tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureId(pub u32);

/// Which army a unit fights for.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BattleSide {
    #[default]
    Attacker,
    Defender,
}

impl BattleSide {
    pub const fn opposite(self) -> Self {
        match self {
            BattleSide::Attacker => BattleSide::Defender,
            BattleSide::Defender => BattleSide::Attacker,
        }
    }
}

/// Where a unit came from within its army.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnitSlot {
    /// Regular army slot.
    Army(u8),
    /// Summoned or cloned during the battle.
    Summoned,
    /// Fortification turret; never a valid target.
    Turret(u8),
}

impl Default for UnitSlot {
    fn default() -> Self {
        UnitSlot::Army(0)
    }
}

/// Battlefield hex in offset coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleHex {
    pub x: i16,
    pub y: i16,
}

impl BattleHex {
    pub const FIELD_WIDTH: i16 = 17;
    pub const FIELD_HEIGHT: i16 = 11;
    pub const INVALID: Self = Self { x: -1, y: -1 };

    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    pub const fn is_valid(&self) -> bool {
        self.x >= 0 && self.x < Self::FIELD_WIDTH && self.y >= 0 && self.y < Self::FIELD_HEIGHT
    }
}

impl Default for BattleHex {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Static description of a creature type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatureType {
    pub id: CreatureId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub level: u8,
}

impl CreatureType {
    pub fn new(id: CreatureId, name: impl Into<String>, level: u8) -> Self {
        Self {
            id,
            name: name.into(),
            level,
        }
    }
}

/// Read-only identity provider for a unit.
pub trait UnitInfo: Send + Sync {
    fn unit_id(&self) -> UnitId;

    fn unit_side(&self) -> BattleSide;

    fn unit_slot(&self) -> UnitSlot;

    fn unit_type(&self) -> &CreatureType;

    /// Stack size the unit entered the battle with.
    fn unit_base_amount(&self) -> i32;

    fn is_turret(&self) -> bool {
        matches!(self.unit_slot(), UnitSlot::Turret(_))
    }

    fn creature_id(&self) -> CreatureId {
        self.unit_type().id
    }
}

/// Owned [`UnitInfo`] record, as produced by army setup.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitRecord {
    pub id: UnitId,
    pub side: BattleSide,
    #[cfg_attr(feature = "serde", serde(default))]
    pub slot: UnitSlot,
    pub creature: CreatureType,
    pub base_amount: i32,
}

impl UnitRecord {
    pub fn new(id: UnitId, side: BattleSide, creature: CreatureType, base_amount: i32) -> Self {
        Self {
            id,
            side,
            slot: UnitSlot::default(),
            creature,
            base_amount,
        }
    }

    pub fn with_slot(mut self, slot: UnitSlot) -> Self {
        self.slot = slot;
        self
    }
}

impl UnitInfo for UnitRecord {
    fn unit_id(&self) -> UnitId {
        self.id
    }

    fn unit_side(&self) -> BattleSide {
        self.side
    }

    fn unit_slot(&self) -> UnitSlot {
        self.slot
    }

    fn unit_type(&self) -> &CreatureType {
        &self.creature
    }

    fn unit_base_amount(&self) -> i32 {
        self.base_amount
    }
}
