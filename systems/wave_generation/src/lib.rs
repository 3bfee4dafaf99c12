#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave configuration system: an authored table for the opening waves and a
//! procedural extrapolation for every wave beyond it.

use std::collections::BTreeMap;

use idle_defence_core::{EnemyKind, WaveConfig};
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

/// Last wave covered by the authored table.
pub const AUTHORED_WAVES: u32 = 10;

const BASE_ENEMY_COUNT: u32 = 15;
const ENEMIES_PER_WAVE: u32 = 3;
const BASE_SPAWN_INTERVAL: f32 = 2.0;
const SPAWN_INTERVAL_STEP: f32 = 0.1;
const AUTHORED_INTERVAL_FLOOR: f32 = 0.5;
const PROCEDURAL_INTERVAL_FLOOR: f32 = 0.3;
const HEALTH_STEP: f32 = 0.2;
const SPEED_STEP: f32 = 0.1;

/// Reasons an authored wave override is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WaveConfigError {
    /// Waves are numbered from one.
    #[error("wave numbers start at 1")]
    ZeroWave,
    /// The wave has no enemy kinds to draw from.
    #[error("wave {wave} has an empty enemy pool")]
    EmptyPool {
        /// Wave the override targets.
        wave: u32,
    },
    /// The spawn interval is negative or not a number.
    #[error("wave {wave} has invalid spawn interval {interval}")]
    InvalidInterval {
        /// Wave the override targets.
        wave: u32,
        /// Offending interval in seconds.
        interval: f32,
    },
}

/// Produces the configuration of any wave number.
#[derive(Clone, Debug)]
pub struct WaveConfigManager {
    authored: BTreeMap<u32, WaveConfig>,
}

impl WaveConfigManager {
    /// Creates the manager with the built-in table for waves 1 through 10.
    #[must_use]
    pub fn new() -> Self {
        let mut authored = BTreeMap::new();
        for config in opening_waves() {
            let _ = authored.insert(config.wave_number, config);
        }
        for wave in 4..=AUTHORED_WAVES {
            let _ = authored.insert(wave, derived_config(wave, AUTHORED_INTERVAL_FLOOR));
        }
        log::debug!("wave table ready with {} authored waves", authored.len());
        Self { authored }
    }

    /// Replaces authored entries with the provided configurations.
    ///
    /// Overrides may extend the table past wave 10. Every override is
    /// validated before any entry is replaced.
    pub fn with_overrides<I>(mut self, overrides: I) -> Result<Self, WaveConfigError>
    where
        I: IntoIterator<Item = WaveConfig>,
    {
        let overrides: Vec<WaveConfig> = overrides.into_iter().collect();
        for config in &overrides {
            validate(config)?;
        }
        for config in overrides {
            log::info!("wave {} overridden", config.wave_number);
            let _ = self.authored.insert(config.wave_number, config);
        }
        Ok(self)
    }

    /// Returns the configuration of `wave_number`.
    ///
    /// Wave zero is treated as the first wave. Waves missing from the table
    /// are derived procedurally, so every wave number yields a configuration.
    #[must_use]
    pub fn get_wave_config(&self, wave_number: u32) -> WaveConfig {
        let wave = wave_number.max(1);
        self.authored
            .get(&wave)
            .cloned()
            .unwrap_or_else(|| derived_config(wave, PROCEDURAL_INTERVAL_FLOOR))
    }

    /// Draws one enemy kind uniformly from the pool of `wave_number`.
    ///
    /// An empty pool is reported instead of substituting a kind.
    pub fn get_random_enemy_type<R>(
        &self,
        wave_number: u32,
        rng: &mut R,
    ) -> Result<EnemyKind, WaveConfigError>
    where
        R: Rng + ?Sized,
    {
        let config = self.get_wave_config(wave_number);
        config
            .enemy_type_pool
            .choose(rng)
            .copied()
            .ok_or(WaveConfigError::EmptyPool {
                wave: config.wave_number,
            })
    }
}

impl Default for WaveConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Enemy pool for a wave, shifting toward tougher kinds as waves advance.
#[must_use]
pub fn enemy_pool_for_wave(wave_number: u32) -> Vec<EnemyKind> {
    use EnemyKind::{Boss, Goblin, Orc};

    match wave_number {
        0..=3 => vec![Goblin, Goblin, Orc],
        4..=6 => vec![Goblin, Orc, Orc],
        7..=9 if wave_number % 3 == 0 => vec![Orc, Orc, Boss],
        7..=9 => vec![Goblin, Orc, Orc],
        _ if wave_number % 2 == 0 => vec![Orc, Boss, Boss],
        _ => vec![Goblin, Orc, Boss],
    }
}

fn opening_waves() -> [WaveConfig; 3] {
    use EnemyKind::{Goblin, Orc};

    [
        WaveConfig {
            wave_number: 1,
            total_enemies: 10,
            enemy_type_pool: vec![Goblin, Goblin, Goblin],
            spawn_interval: 2.0,
            health_multiplier: 1.0,
            speed_multiplier: 1.0,
        },
        WaveConfig {
            wave_number: 2,
            total_enemies: 15,
            enemy_type_pool: vec![Goblin, Goblin, Orc],
            spawn_interval: 1.8,
            health_multiplier: 1.2,
            speed_multiplier: 1.1,
        },
        WaveConfig {
            wave_number: 3,
            total_enemies: 20,
            enemy_type_pool: vec![Goblin, Orc, Orc],
            spawn_interval: 1.5,
            health_multiplier: 1.4,
            speed_multiplier: 1.2,
        },
    ]
}

fn derived_config(wave_number: u32, interval_floor: f32) -> WaveConfig {
    let wave = wave_number as f32;
    WaveConfig {
        wave_number,
        total_enemies: BASE_ENEMY_COUNT.saturating_add(wave_number.saturating_mul(ENEMIES_PER_WAVE)),
        enemy_type_pool: enemy_pool_for_wave(wave_number),
        spawn_interval: (BASE_SPAWN_INTERVAL - wave * SPAWN_INTERVAL_STEP).max(interval_floor),
        health_multiplier: 1.0 + wave * HEALTH_STEP,
        speed_multiplier: 1.0 + wave * SPEED_STEP,
    }
}

fn validate(config: &WaveConfig) -> Result<(), WaveConfigError> {
    if config.wave_number == 0 {
        return Err(WaveConfigError::ZeroWave);
    }
    if config.enemy_type_pool.is_empty() {
        return Err(WaveConfigError::EmptyPool {
            wave: config.wave_number,
        });
    }
    if config.spawn_interval.is_nan() || config.spawn_interval < 0.0 {
        return Err(WaveConfigError::InvalidInterval {
            wave: config.wave_number,
            interval: config.spawn_interval,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn first_wave_is_ten_goblins_every_two_seconds() {
        let manager = WaveConfigManager::new();
        let config = manager.get_wave_config(1);
        assert_eq!(config.total_enemies, 10);
        assert_eq!(config.spawn_interval, 2.0);
        assert!(config
            .enemy_type_pool
            .iter()
            .all(|kind| *kind == EnemyKind::Goblin));
    }

    #[test]
    fn wave_zero_maps_to_first_wave() {
        let manager = WaveConfigManager::new();
        assert_eq!(manager.get_wave_config(0), manager.get_wave_config(1));
    }

    #[test]
    fn table_waves_follow_the_tier_formula() {
        let manager = WaveConfigManager::new();
        let config = manager.get_wave_config(9);
        assert_eq!(config.total_enemies, 42);
        assert_eq!(
            config.enemy_type_pool,
            vec![EnemyKind::Orc, EnemyKind::Orc, EnemyKind::Boss]
        );
        assert!((config.spawn_interval - 1.1).abs() < 1e-5);
        assert!((config.health_multiplier - 2.8).abs() < 1e-5);
        assert!((config.speed_multiplier - 1.9).abs() < 1e-5);
    }

    #[test]
    fn procedural_waves_extend_past_the_table() {
        let manager = WaveConfigManager::new();
        let eleven = manager.get_wave_config(11);
        assert_eq!(eleven.wave_number, 11);
        assert_eq!(eleven.total_enemies, 48);
        assert_eq!(
            eleven.enemy_type_pool,
            vec![EnemyKind::Goblin, EnemyKind::Orc, EnemyKind::Boss]
        );

        let twelve = manager.get_wave_config(12);
        assert_eq!(
            twelve.enemy_type_pool,
            vec![EnemyKind::Orc, EnemyKind::Boss, EnemyKind::Boss]
        );
    }

    #[test]
    fn spawn_interval_never_drops_below_floor() {
        let manager = WaveConfigManager::new();
        for wave in [10, 15, 18, 50, 1_000, u32::MAX] {
            let config = manager.get_wave_config(wave);
            assert!(config.spawn_interval >= 0.3, "wave {wave}");
            assert!(config.total_enemies >= 15, "wave {wave}");
        }
        assert!(manager.get_wave_config(10).spawn_interval >= 0.5);
    }

    #[test]
    fn random_draws_come_from_the_pool() {
        let manager = WaveConfigManager::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut orcs = 0;
        for _ in 0..3_000 {
            let kind = manager
                .get_random_enemy_type(2, &mut rng)
                .expect("authored pool");
            assert_ne!(kind, EnemyKind::Boss);
            if kind == EnemyKind::Orc {
                orcs += 1;
            }
        }
        assert!((800..1_200).contains(&orcs), "roughly one in three, got {orcs}");
    }

    #[test]
    fn empty_pool_draws_fail_instead_of_defaulting() {
        let broken = WaveConfig {
            wave_number: 1,
            total_enemies: 5,
            enemy_type_pool: Vec::new(),
            spawn_interval: 1.0,
            health_multiplier: 1.0,
            speed_multiplier: 1.0,
        };
        let manager = WaveConfigManager {
            authored: BTreeMap::from([(1, broken)]),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            manager.get_random_enemy_type(1, &mut rng),
            Err(WaveConfigError::EmptyPool { wave: 1 })
        );
    }

    #[test]
    fn overrides_replace_authored_entries() {
        let custom = WaveConfig {
            wave_number: 2,
            total_enemies: 3,
            enemy_type_pool: vec![EnemyKind::Boss],
            spawn_interval: 0.5,
            health_multiplier: 1.0,
            speed_multiplier: 1.0,
        };
        let manager = WaveConfigManager::new()
            .with_overrides([custom.clone()])
            .expect("valid override");
        assert_eq!(manager.get_wave_config(2), custom);
        assert_eq!(manager.get_wave_config(3).total_enemies, 20);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let empty = WaveConfig {
            wave_number: 4,
            total_enemies: 3,
            enemy_type_pool: Vec::new(),
            spawn_interval: 1.0,
            health_multiplier: 1.0,
            speed_multiplier: 1.0,
        };
        assert_eq!(
            WaveConfigManager::new().with_overrides([empty.clone()]).err(),
            Some(WaveConfigError::EmptyPool { wave: 4 })
        );

        let zero = WaveConfig {
            wave_number: 0,
            enemy_type_pool: vec![EnemyKind::Orc],
            ..empty
        };
        assert_eq!(
            WaveConfigManager::new().with_overrides([zero]).err(),
            Some(WaveConfigError::ZeroWave)
        );
    }
}
