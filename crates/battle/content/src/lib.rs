//! Data-driven battle content and loaders.
//!
//! This crate reads static battle data from RON/TOML/JSON files:
//! - Creature catalog (base stats as bonuses, via RON)
//! - Spell catalog (positiveness, dispel rules, via RON)
//! - Effect configurations (RON, TOML or JSON, built through [`EffectRegistry`])
//! - Scenarios for the simulator (armies and scripted casts, via RON)
//!
//! Content feeds oracles and unit setup; it never appears in battle state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    CastSpec, ContentFactory, CreatureCatalog, CreatureLoader, CreatureTemplate, EffectFactoryFn,
    EffectLoader, EffectRegistry, EffectSpec, LoadResult, PlacedUnit, Scenario, ScenarioLoader,
    SpellLoader, UnitSpec,
};
