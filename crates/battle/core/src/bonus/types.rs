//! Vocabulary shared by every modifier: what it affects, where it came from,
//! how long it lives, and how its value folds into a total.

use bitflags::bitflags;

/// What a bonus modifies.
///
/// Unknown combinations of type and subtype are legal; they simply never match
/// a selector that asks for something else.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum BonusType {
    /// Attack or defence, discriminated by [`PrimarySkill`] subtype.
    PrimarySkill,
    /// Initiative / movement speed.
    StacksSpeed,
    /// Hit points of a single unit in the stack.
    StackHealth,
    /// Presence grants ranged attacks.
    Shooter,
    /// Ammunition available per battle.
    Shots,
    /// Trades defence for attack at `value` percent.
    InFrenzy,
    /// Extra attacks per turn, gated by effect range.
    AdditionalAttack,
    /// Extra retaliations per round.
    AdditionalRetaliation,
    /// The unit never retaliates.
    NoRetaliation,
    /// The unit retaliates against every attack.
    UnlimitedRetaliations,
    /// War machines: no retaliation, no morale.
    SiegeWeapon,
    /// The unit can cast spells.
    SpellCaster,
    /// Number of casts per battle.
    Casts,
    /// The unit skips its turns while present.
    NotActive,
    /// Immunity to the spell named by the subtype.
    SpellImmunity,
    /// Immunity to every spell up to `value` level.
    LevelSpellImmunity,
    /// Marker whose removal ends a clone's life.
    LifetimeMarker,
}

/// Discriminator for primary-skill bonuses.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum PrimarySkill {
    Attack,
    Defense,
}

/// Secondary discriminator of a bonus type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BonusSubtype {
    #[default]
    None,
    PrimarySkill(PrimarySkill),
    /// Spell identifier, used by spell immunities.
    Spell(u32),
    Other(i32),
}

/// Provenance of a bonus.
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
pub enum BonusSource {
    /// Innate ability of the creature type; base stats live here.
    #[default]
    CreatureAbility,
    /// Applied by a spell or ability effect; `source_id` is the spell.
    SpellEffect,
    Artifact,
    SecondarySkill,
    Terrain,
    Other,
}

/// How a bonus value contributes to a total.
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
pub enum ValueType {
    /// Summed into the base before percentage-to-base scaling.
    BaseNumber,
    /// Plain addition after base scaling.
    #[default]
    Additive,
    /// Percentage of the base number.
    PercentToBase,
    /// Percentage applied to everything else.
    PercentToAll,
    /// Lower floor: the total is at least this.
    IndependentMax,
    /// Upper cap: the total is at most this.
    IndependentMin,
}

/// Combat modes in which a bonus counts.
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
pub enum EffectRange {
    #[default]
    NoLimit,
    OnlyMelee,
    OnlyDistance,
}

impl EffectRange {
    /// Returns true if a bonus with this range counts toward a query in the
    /// given combat mode.
    pub const fn applies_to(self, ranged: bool) -> bool {
        match self {
            EffectRange::NoLimit => true,
            EffectRange::OnlyMelee => !ranged,
            EffectRange::OnlyDistance => ranged,
        }
    }
}

bitflags! {
    /// Lifetime classes of a bonus.
    ///
    /// A bonus expires as soon as *any* of its flagged conditions triggers, so
    /// `N_TURNS | UNTIL_BEING_ATTACKED` ends either after the turn count runs
    /// out or when the bearer is hit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct BonusDuration: u16 {
        const PERMANENT            = 1 << 0;
        /// Until the end of the combat.
        const ONE_BATTLE           = 1 << 1;
        /// Counted down by `turns_remain` at every round start.
        const N_TURNS              = 1 << 2;
        const UNTIL_ATTACK         = 1 << 3;
        const UNTIL_BEING_ATTACKED = 1 << 4;
        /// Until the bearer's next turn begins.
        const UNIT_GETS_TURN       = 1 << 5;
        /// Until the current round ends.
        const UNTIL_ROUND_END      = 1 << 6;
    }
}

impl BonusDuration {
    /// Returns true if this bonus outlives the battle.
    pub fn is_permanent(self) -> bool {
        self == BonusDuration::PERMANENT
    }
}
