#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that gates the tower's fire rate and rolls shot damage.

use idle_defence_core::TowerStats;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Damage resolved for a single shot at the moment it is fired.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shot {
    /// Damage carried by the projectile, critical multiplier included.
    pub damage: f32,
    /// Whether the critical roll succeeded.
    pub critical: bool,
}

/// Tower combat system owning the deterministic critical-hit stream.
#[derive(Debug, Clone)]
pub struct TowerCombat {
    rng: ChaCha8Rng,
}

impl TowerCombat {
    /// Creates a combat system whose critical rolls derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Resolves the damage of a shot fired with the provided stats.
    ///
    /// Exactly one uniform draw is consumed per shot.
    pub fn roll_shot(&mut self, stats: &TowerStats) -> Shot {
        let roll: f32 = self.rng.gen();
        let critical = roll < stats.critical_chance;
        let damage = if critical {
            stats.damage * stats.critical_multiplier
        } else {
            stats.damage
        };
        Shot { damage, critical }
    }
}

/// Reports whether a full cooldown window separates `now` from the last shot.
///
/// A tower that never fired is always ready.
#[must_use]
pub fn cooldown_elapsed(last_attack_time: Option<f64>, now: f64, cooldown: f64) -> bool {
    match last_attack_time {
        None => cooldown.is_finite(),
        Some(last) => now - last >= cooldown,
    }
}
