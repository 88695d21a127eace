//! Deterministic random numbers for chance-based effects.
//!
//! Given the same battle seed and the same sequence of draws, every replica
//! rolls the same values, so authority and replicas agree on outcomes.

/// Stateless generator: maps a seed to a value.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Random value in `[min, max]` inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// PCG-XSH-RR: 32-bit output from 64-bit state.
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Derives the seed for one draw.
///
/// * `battle_seed` - fixed when the battle starts
/// * `round` - current battle round
/// * `unit` - unit the draw is for
/// * `draw` - index of the draw within the round
pub fn compute_seed(battle_seed: u64, round: u32, unit: u32, draw: u32) -> u64 {
    let mut hash = battle_seed;
    hash ^= u64::from(round).wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(unit).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(draw).wrapping_mul(0x85ebca6b);

    // avalanche
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// Stream of draws handed to effects.
pub trait BattleRng {
    fn next_u32(&mut self) -> u32;

    /// Random value in `[min, max]` inclusive.
    fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        if min >= max {
            return min;
        }
        let span = (max - min + 1) as u64;
        min + (u64::from(self.next_u32()) % span) as i64
    }
}

/// [`BattleRng`] over an [`RngOracle`], advancing a draw counter per call.
#[derive(Clone, Debug)]
pub struct SeededRng<R: RngOracle = PcgRng> {
    oracle: R,
    battle_seed: u64,
    round: u32,
    unit: u32,
    draws: u32,
}

impl SeededRng<PcgRng> {
    pub fn new(battle_seed: u64) -> Self {
        Self::with_oracle(PcgRng, battle_seed)
    }
}

impl<R: RngOracle> SeededRng<R> {
    pub fn with_oracle(oracle: R, battle_seed: u64) -> Self {
        Self {
            oracle,
            battle_seed,
            round: 0,
            unit: 0,
            draws: 0,
        }
    }

    /// Scopes subsequent draws to a round and acting unit.
    pub fn scope(&mut self, round: u32, unit: u32) {
        self.round = round;
        self.unit = unit;
        self.draws = 0;
    }
}

impl<R: RngOracle> BattleRng for SeededRng<R> {
    fn next_u32(&mut self) -> u32 {
        let seed = compute_seed(self.battle_seed, self.round, self.unit, self.draws);
        self.draws = self.draws.wrapping_add(1);
        self.oracle.next_u32(seed)
    }
}
