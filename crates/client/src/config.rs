//! Simulator configuration and its environment loader.
use std::env;
use std::path::PathBuf;

use battle_runtime::RuntimeConfig;

/// How scripted casts reach the battle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SimMode {
    /// One in-process session; every cast is visible immediately.
    #[default]
    Local,
    /// An authority task plus a replica that proposes every cast.
    Replicated,
}

/// Configuration for one simulator run.
#[derive(Clone, Debug, Default)]
pub struct SimConfig {
    /// Content root; the bundled data when unset.
    pub content_dir: Option<PathBuf>,
    pub scenario: String,
    /// Overrides the scenario's seed.
    pub seed: Option<u64>,
    /// Rounds to play; the scenario's last scripted round when unset.
    pub rounds: Option<u32>,
    pub mode: SimMode,
    /// Also write logs to `battle-sim.log` in this directory.
    pub log_dir: Option<PathBuf>,
    pub runtime: RuntimeConfig,
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// - `BATTLE_CONTENT_DIR`
    /// - `BATTLE_SCENARIO` (default: `skirmish`)
    /// - `BATTLE_SEED`
    /// - `BATTLE_ROUNDS`
    /// - `BATTLE_MODE` (`local` or `replicated`)
    /// - `BATTLE_LOG_DIR`
    ///
    /// Runtime tuning is read by [`RuntimeConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self {
            scenario: "skirmish".to_string(),
            runtime: RuntimeConfig::from_env(),
            ..Self::default()
        };

        config.content_dir = env::var_os("BATTLE_CONTENT_DIR").map(PathBuf::from);
        if let Ok(scenario) = env::var("BATTLE_SCENARIO")
            && !scenario.trim().is_empty()
        {
            config.scenario = scenario.trim().to_string();
        }
        config.seed = read_env::<u64>("BATTLE_SEED");
        config.rounds = read_env::<u32>("BATTLE_ROUNDS").map(|rounds| rounds.max(1));
        if let Some(mode) = read_env::<SimMode>("BATTLE_MODE") {
            config.mode = mode;
        }
        config.log_dir = env::var_os("BATTLE_LOG_DIR").map(PathBuf::from);

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Replicated".parse::<SimMode>().unwrap(), SimMode::Replicated);
        assert_eq!("local".parse::<SimMode>().unwrap(), SimMode::Local);
        assert!("remote".parse::<SimMode>().is_err());
        assert_eq!(SimMode::Replicated.to_string(), "replicated");
    }
}
