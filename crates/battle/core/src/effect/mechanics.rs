//! Read-only description of one effect invocation.

use crate::env::{SpellDefinition, SpellId, SpellOracle};
use crate::unit::{BattleSide, UnitId};

/// What an effect may ask about the cast that triggered it.
pub trait Mechanics {
    fn caster(&self) -> Option<UnitId>;

    fn caster_side(&self) -> BattleSide;

    fn spell_id(&self) -> SpellId;

    /// Display name used in battle-log lines.
    fn spell_name(&self) -> &str;

    /// Skill level the effect is cast at (0 = basic).
    fn effect_level(&self) -> u8;

    fn effect_power(&self) -> i32;

    /// Rounds a timed bonus lasts.
    fn effect_duration(&self) -> u16;

    /// Magnitude for damage and healing.
    fn effect_value(&self) -> i64;

    /// Creature abilities bypass spell immunities; spells do not.
    fn is_magic_effect(&self) -> bool;

    fn spells(&self) -> &dyn SpellOracle;
}

/// Plain [`Mechanics`] built by whoever resolves the cast.
#[derive(Clone, Copy)]
pub struct CastContext<'a> {
    spells: &'a dyn SpellOracle,
    spell: &'a SpellDefinition,
    caster: Option<UnitId>,
    side: BattleSide,
    level: u8,
    power: i32,
    duration: u16,
    value: i64,
    magic: bool,
}

impl<'a> CastContext<'a> {
    pub fn new(spells: &'a dyn SpellOracle, spell: &'a SpellDefinition) -> Self {
        Self {
            spells,
            spell,
            caster: None,
            side: BattleSide::Attacker,
            level: 0,
            power: 0,
            duration: 1,
            value: 0,
            magic: true,
        }
    }

    pub fn with_caster(mut self, caster: UnitId, side: BattleSide) -> Self {
        self.caster = Some(caster);
        self.side = side;
        self
    }

    pub fn with_side(mut self, side: BattleSide) -> Self {
        self.side = side;
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn with_power(mut self, power: i32) -> Self {
        self.power = power;
        self
    }

    pub fn with_duration(mut self, duration: u16) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = value;
        self
    }

    /// Marks the invocation as a creature ability rather than a spell.
    pub fn as_ability(mut self) -> Self {
        self.magic = false;
        self
    }
}

impl Mechanics for CastContext<'_> {
    fn caster(&self) -> Option<UnitId> {
        self.caster
    }

    fn caster_side(&self) -> BattleSide {
        self.side
    }

    fn spell_id(&self) -> SpellId {
        self.spell.id
    }

    fn spell_name(&self) -> &str {
        &self.spell.name
    }

    fn effect_level(&self) -> u8 {
        self.level
    }

    fn effect_power(&self) -> i32 {
        self.power
    }

    fn effect_duration(&self) -> u16 {
        self.duration
    }

    fn effect_value(&self) -> i64 {
        self.value
    }

    fn is_magic_effect(&self) -> bool {
        self.magic
    }

    fn spells(&self) -> &dyn SpellOracle {
        self.spells
    }
}

impl core::fmt::Debug for CastContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CastContext")
            .field("spell", &self.spell.id)
            .field("caster", &self.caster)
            .field("level", &self.level)
            .field("duration", &self.duration)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
