//! Spell definitions consulted by effects.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Identifier of a spell in the static spell tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellId(pub u32);

impl core::fmt::Display for SpellId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "spell#{}", self.0)
    }
}

/// Whether a spell helps or harms its target.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Positiveness {
    Positive,
    Negative,
    #[default]
    Neutral,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellDefinition {
    pub id: SpellId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub positiveness: Positiveness,
    /// False for effects that survive dispelling (e.g. curses of artifacts).
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub dispellable: bool,
    /// Adventure-map spells never leave battle bonuses behind to dispel.
    #[cfg_attr(feature = "serde", serde(default))]
    pub adventure: bool,
    #[cfg_attr(feature = "serde", serde(default = "default_level"))]
    pub level: u8,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

#[cfg(feature = "serde")]
fn default_level() -> u8 {
    1
}

impl SpellDefinition {
    pub fn new(id: SpellId, name: impl Into<String>, positiveness: Positiveness) -> Self {
        Self {
            id,
            name: name.into(),
            positiveness,
            dispellable: true,
            adventure: false,
            level: 1,
        }
    }

    pub fn with_dispellable(mut self, dispellable: bool) -> Self {
        self.dispellable = dispellable;
        self
    }

    pub fn with_adventure(mut self, adventure: bool) -> Self {
        self.adventure = adventure;
        self
    }

    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }
}

/// Read-only spell lookup.
pub trait SpellOracle: Send + Sync {
    fn spell(&self, id: SpellId) -> Option<&SpellDefinition>;
}

/// In-memory spell table.
#[derive(Clone, Debug, Default)]
pub struct SpellTable {
    spells: BTreeMap<SpellId, Arc<SpellDefinition>>,
}

impl SpellTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a definition and returns the one it replaced, if any.
    pub fn insert(&mut self, spell: SpellDefinition) -> Option<Arc<SpellDefinition>> {
        self.spells.insert(spell.id, Arc::new(spell))
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellDefinition> + '_ {
        self.spells.values().map(|s| s.as_ref())
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SpellDefinition> {
        self.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

impl FromIterator<SpellDefinition> for SpellTable {
    fn from_iter<T: IntoIterator<Item = SpellDefinition>>(iter: T) -> Self {
        let mut table = Self::new();
        for spell in iter {
            table.insert(spell);
        }
        table
    }
}

impl SpellOracle for SpellTable {
    fn spell(&self, id: SpellId) -> Option<&SpellDefinition> {
        self.spells.get(&id).map(|s| s.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id_and_name() {
        let table: SpellTable = [
            SpellDefinition::new(SpellId(41), "bless", Positiveness::Positive),
            SpellDefinition::new(SpellId(42), "curse", Positiveness::Negative),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.spell(SpellId(42)).map(|s| s.name.as_str()), Some("curse"));
        assert!(table.spell(SpellId(7)).is_none());
        assert_eq!(table.find_by_name("BLESS").map(|s| s.id), Some(SpellId(41)));
    }

    #[test]
    fn positiveness_parses_case_insensitively() {
        assert_eq!("NEGATIVE".parse::<Positiveness>().ok(), Some(Positiveness::Negative));
        assert_eq!(Positiveness::Positive.to_string(), "positive");
    }
}
