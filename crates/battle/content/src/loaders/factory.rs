//! Content factory for loading all battle content from a data directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use battle_core::{Effect, SpellTable};

use crate::loaders::{
    CreatureCatalog, CreatureLoader, EffectLoader, EffectRegistry, LoadResult, Scenario,
    ScenarioLoader, SpellLoader,
};

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── spells.ron
/// ├── creatures.ron
/// ├── effects/
/// │   ├── haste.ron
/// │   └── cure.toml
/// └── scenarios/
///     └── skirmish.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
    registry: EffectRegistry,
}

impl ContentFactory {
    /// Creates a factory over `data_dir` that knows the core effects.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_registry(data_dir, EffectRegistry::default())
    }

    pub fn with_registry(data_dir: impl Into<PathBuf>, registry: EffectRegistry) -> Self {
        Self {
            data_dir: data_dir.into(),
            registry,
        }
    }

    /// The data shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load the spell catalog from `spells.ron`.
    pub fn load_spells(&self) -> LoadResult<SpellTable> {
        SpellLoader::load(&self.data_dir.join("spells.ron"))
    }

    /// Load the creature catalog from `creatures.ron`.
    pub fn load_creatures(&self) -> LoadResult<CreatureCatalog> {
        CreatureLoader::load(&self.data_dir.join("creatures.ron"))
    }

    /// Load every effect under `effects/`, keyed by file stem.
    pub fn load_effects(&self) -> LoadResult<BTreeMap<String, Box<dyn Effect>>> {
        EffectLoader::load_dir(&self.data_dir.join("effects"), &self.registry)
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EffectRegistry {
        &mut self.registry
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert!(factory.registry().contains("core:timed"));
    }

    #[test]
    fn bundled_content_is_consistent() {
        let factory = ContentFactory::bundled();
        let spells = factory.load_spells().unwrap();
        let creatures = factory.load_creatures().unwrap();
        let effects = factory.load_effects().unwrap();
        let scenario = factory.load_scenario("skirmish").unwrap();

        for unit in &scenario.units {
            assert!(creatures.find(&unit.creature).is_some(), "{}", unit.creature);
        }
        for cast in &scenario.casts {
            assert!(spells.find_by_name(&cast.spell).is_some(), "{}", cast.spell);
            assert!(effects.contains_key(&cast.effect), "{}", cast.effect);
        }
    }

    #[test]
    fn missing_directory_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        let err = factory.load_spells().unwrap_err();
        assert!(err.to_string().contains("spells.ron"));
    }
}
