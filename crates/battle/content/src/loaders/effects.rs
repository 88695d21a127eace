//! Effect configurations and the factory registry that builds them.
//!
//! An effect file names its kind under `effect` and carries the kind's
//! parameters next to it:
//!
//! ```toml
//! effect = "core:heal"
//! heal_level = "Resurrect"
//! heal_power = "OneBattle"
//! min_full_units = 1
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use battle_core::{Damage, Dispel, Effect, Heal, Timed};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::loaders::{LoadResult, read_value};

/// Builds an effect from its parameters.
pub type EffectFactoryFn = fn(Value) -> LoadResult<Box<dyn Effect>>;

/// One effect configuration: the registry name plus free-form parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    pub effect: String,
    #[serde(flatten)]
    pub config: Map<String, Value>,
}

impl EffectSpec {
    pub fn from_value(value: Value) -> LoadResult<Self> {
        serde_json::from_value(value).context("effect configuration must name its `effect`")
    }
}

fn typed<E>(config: Value) -> LoadResult<Box<dyn Effect>>
where
    E: Effect + DeserializeOwned + 'static,
{
    let effect: E = serde_json::from_value(config)?;
    Ok(Box::new(effect))
}

/// Name → constructor table for effects.
///
/// [`EffectRegistry::default`] knows the core effects. Callers register their
/// own kinds under new names; re-registering a name replaces its factory.
#[derive(Clone)]
pub struct EffectRegistry {
    factories: BTreeMap<String, EffectFactoryFn>,
}

impl EffectRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: EffectFactoryFn,
    ) -> Option<EffectFactoryFn> {
        self.factories.insert(name.into(), factory)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    pub fn build(&self, spec: &EffectSpec) -> LoadResult<Box<dyn Effect>> {
        let factory = self
            .factories
            .get(&spec.effect)
            .ok_or_else(|| anyhow::anyhow!("unknown effect `{}`", spec.effect))?;
        factory(Value::Object(spec.config.clone()))
            .with_context(|| format!("invalid configuration for `{}`", spec.effect))
    }

    pub fn build_value(&self, value: Value) -> LoadResult<Box<dyn Effect>> {
        self.build(&EffectSpec::from_value(value)?)
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Dispel::NAME, typed::<Dispel>);
        registry.register(Timed::NAME, typed::<Timed>);
        registry.register(Heal::NAME, typed::<Heal>);
        registry.register(Damage::NAME, typed::<Damage>);
        registry
    }
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

/// Loader for effect files.
pub struct EffectLoader;

impl EffectLoader {
    /// Load one effect file (`.ron`, `.toml` or `.json`).
    pub fn load(path: &Path, registry: &EffectRegistry) -> LoadResult<Box<dyn Effect>> {
        let value = read_value(path)?;
        registry
            .build_value(value)
            .with_context(|| format!("Failed to build effect from {}", path.display()))
    }

    /// Load every effect file of a directory, keyed by file stem.
    ///
    /// Expected directory structure:
    /// ```text
    /// effects/
    ///   ├── haste.ron
    ///   ├── cure.toml
    ///   └── lightning_bolt.json
    /// ```
    pub fn load_dir(
        dir: &Path,
        registry: &EffectRegistry,
    ) -> LoadResult<BTreeMap<String, Box<dyn Effect>>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        let mut effects = BTreeMap::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let stem = stem.to_owned();
            let effect = Self::load(&path, registry)?;
            if effects.insert(stem.clone(), effect).is_some() {
                anyhow::bail!("effect `{}` is defined twice in {}", stem, dir.display());
            }
        }
        Ok(effects)
    }
}
