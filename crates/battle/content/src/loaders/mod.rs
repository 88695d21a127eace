//! Content loaders for reading battle data from files.
//!
//! Catalogs are strongly typed RON. Effect files may be RON, TOML or JSON;
//! they are read into a [`serde_json::Value`] first so the effect registry can
//! dispatch on the effect name before the configuration is typed.

pub mod creatures;
pub mod effects;
pub mod factory;
pub mod scenario;
pub mod spells;

pub use creatures::{CreatureCatalog, CreatureLoader, CreatureTemplate};
pub use effects::{EffectFactoryFn, EffectLoader, EffectRegistry, EffectSpec};
pub use factory::ContentFactory;
pub use scenario::{CastSpec, PlacedUnit, Scenario, ScenarioLoader, UnitSpec};
pub use spells::SpellLoader;

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Parses a data file into a JSON value, picking the format from the extension.
pub(crate) fn read_value(path: &Path) -> LoadResult<serde_json::Value> {
    let content = read_file(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let value = match extension.as_deref() {
        Some("ron") => parse_ron(&content),
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML at {}", path.display())),
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON at {}", path.display())),
        other => anyhow::bail!(
            "Unsupported data format {:?} for {}",
            other.unwrap_or(""),
            path.display()
        ),
    };
    value.with_context(|| format!("Failed to load {}", path.display()))
}

pub(crate) fn parse_ron(content: &str) -> LoadResult<serde_json::Value> {
    ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse RON: {}", e))
}
