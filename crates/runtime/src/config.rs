//! Runtime configuration and its environment loader.

use std::env;

use battle_core::BattleConfig;

/// Runtime configuration shared by sessions, the authority and replicas.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Capacity of each event-bus topic.
    pub event_buffer_size: usize,
    /// Capacity of the authority's command queue.
    pub command_buffer_size: usize,
    /// Proposals a replica may have in flight; `None` for no limit.
    pub max_in_flight: Option<usize>,
    /// Seed for the battle's random stream.
    pub seed: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            event_buffer_size: 256,
            command_buffer_size: 32,
            max_in_flight: Some(16),
            seed: 0,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_MAX_ROUNDS` - Round limit (default: 100)
    /// - `BATTLE_STRICT_MUTATIONS` - Reject packets with stale operations (default: true)
    /// - `BATTLE_EVENT_BUFFER` - Event bus capacity per topic (default: 256)
    /// - `BATTLE_COMMAND_BUFFER` - Authority command queue size (default: 32)
    /// - `BATTLE_MAX_IN_FLIGHT` - Pending proposals per replica, 0 for unlimited (default: 16)
    /// - `BATTLE_SEED` - Random seed (default: 0)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(rounds) = read_env::<u32>("BATTLE_MAX_ROUNDS") {
            config.battle.max_rounds = rounds.max(1);
        }
        if let Some(strict) = read_env_bool("BATTLE_STRICT_MUTATIONS") {
            config.battle.strict_mutations = strict;
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_COMMAND_BUFFER") {
            config.command_buffer_size = capacity.max(1);
        }
        if let Some(limit) = read_env::<usize>("BATTLE_MAX_IN_FLIGHT") {
            config.max_in_flight = (limit > 0).then_some(limit);
        }
        if let Some(seed) = read_env::<u64>("BATTLE_SEED") {
            config.seed = seed;
        }

        config
    }

    pub fn with_battle(mut self, battle: BattleConfig) -> Self {
        self.battle = battle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
