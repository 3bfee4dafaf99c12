#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame driver for a single battle session.
//!
//! Each frame runs the wave manager, spawns the enemies it scheduled at
//! perimeter positions, advances the battle, and credits score.

use idle_defence_core::{
    ArenaConfig, BattleConfig, BattleOutcome, EnemyHandle, GameState, PlayerProgress, SaveRecord,
    TowerConfig, WaveConfig,
};
use idle_defence_system_spawning::{EnemySpawner, WaveManager};
use idle_defence_system_upgrades::{UpgradeError, UpgradeSystem};
use idle_defence_system_wave_generation::{WaveConfigError, WaveConfigManager};
use idle_defence_world::{BattleManager, DefeatedEnemy, Tower};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

const RNG_STREAM_TOWER: &str = "tower";
const RNG_STREAM_WAVES: &str = "waves";
const RNG_STREAM_SPAWNER: &str = "spawner";

/// Everything needed to start a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed from which every random stream of the session derives.
    pub seed: u64,
    /// Battle space bounds.
    pub arena: ArenaConfig,
    /// Battle tuning.
    pub battle: BattleConfig,
    /// Starting tower.
    pub tower: TowerConfig,
    /// Authored wave overrides.
    pub waves: Vec<WaveConfig>,
}

/// Reasons a session cannot be created or advanced.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A wave configuration was rejected.
    #[error("invalid wave configuration")]
    Waves(#[from] WaveConfigError),
}

/// Everything that happened during one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Enemies spawned this frame.
    pub spawned: Vec<EnemyHandle>,
    /// Enemies defeated this frame.
    pub defeated: Vec<DefeatedEnemy>,
    /// Enemies that breached the tower this frame.
    pub escaped: usize,
    /// Wave running at the end of the frame.
    pub wave: u32,
    /// Whether a wave was cleared at the start of this frame.
    pub wave_cleared: bool,
    /// Whether the battle is still running.
    pub outcome: BattleOutcome,
}

/// A running battle with its economy and upgrade shop.
#[derive(Debug)]
pub struct Session {
    state: GameState,
    tower: Tower,
    battle: BattleManager,
    waves: WaveManager,
    spawner: EnemySpawner,
    upgrades: UpgradeSystem,
    elapsed: f64,
    frames: u64,
}

impl Session {
    /// Creates a session with the tower at the arena centre and the battle
    /// already started.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let configs = WaveConfigManager::new().with_overrides(config.waves)?;
        let center = config.arena.center();

        let mut state = GameState::new();
        let _ = state.start_battle();

        log::info!("session started with seed {}", config.seed);
        Ok(Self {
            state,
            tower: Tower::new(
                center,
                &config.tower,
                &config.battle,
                derive_stream_seed(config.seed, RNG_STREAM_TOWER),
            ),
            battle: BattleManager::new(config.battle, center),
            waves: WaveManager::new(
                configs,
                derive_stream_seed(config.seed, RNG_STREAM_WAVES),
            ),
            spawner: EnemySpawner::new(
                config.arena,
                derive_stream_seed(config.seed, RNG_STREAM_SPAWNER),
            ),
            upgrades: UpgradeSystem::new(),
            elapsed: 0.0,
            frames: 0,
        })
    }

    /// Creates a session that resumes the economy, wave and upgrades stored
    /// in `record`.
    ///
    /// The tower starts from `config` with every saved upgrade level applied
    /// and the saved wave is restarted from its first spawn.
    pub fn from_record(config: SessionConfig, record: &SaveRecord) -> Result<Self, SessionError> {
        let mut session = Self::new(config)?;
        session.state.player_progress = record.restore_progress();
        session.upgrades.load_levels(&record.upgrades);
        session.upgrades.apply_levels(session.tower.stats_mut());
        session.waves.start_wave(record.current_wave);
        log::info!(
            "session resumed at wave {} with {} coins",
            record.current_wave,
            record.coins
        );
        Ok(session)
    }

    /// Advances the session by one frame of `delta_time` seconds.
    ///
    /// Once the tower has fallen every call reports the loss and changes
    /// nothing.
    pub fn advance(&mut self, delta_time: f32) -> Result<FrameReport, SessionError> {
        if self.is_over() {
            return Ok(FrameReport {
                wave: self.waves.current_wave(),
                outcome: BattleOutcome::TowerDestroyed,
                ..FrameReport::default()
            });
        }

        self.frames += 1;
        self.elapsed += f64::from(delta_time.max(0.0));

        let wave_before = self.state.player_progress.current_wave;
        let kinds = self
            .waves
            .update(delta_time, &mut self.state.player_progress)?;
        let wave_cleared = self.state.player_progress.current_wave > wave_before;

        let scaling = self.waves.current_config().scaling();
        let spawned = kinds
            .into_iter()
            .map(|kind| {
                let position = self.spawner.get_random_spawn_position();
                self.battle.spawn_scaled_enemy(kind, position, scaling)
            })
            .collect();

        let tick = self.battle.update(
            delta_time,
            &mut self.tower,
            &mut self.state,
            &mut self.waves,
        );

        let wave = self.waves.current_wave();
        for defeated in &tick.defeated {
            self.state
                .player_progress
                .add_score(defeated.reward.saturating_mul(u64::from(wave)));
        }

        Ok(FrameReport {
            spawned,
            defeated: tick.defeated,
            escaped: tick.escaped,
            wave,
            wave_cleared,
            outcome: tick.outcome,
        })
    }

    /// Whether the tower has fallen.
    #[must_use]
    pub fn is_over(&self) -> bool {
        !self.tower.is_alive()
    }

    /// Buys the next level of upgrade `id` with the session's coins.
    ///
    /// Returns the new level.
    pub fn purchase_upgrade(&mut self, id: &str) -> Result<u32, UpgradeError> {
        self.upgrades.apply_upgrade(
            id,
            self.tower.stats_mut(),
            &mut self.state.player_progress,
        )
    }

    /// Captures progress and upgrade levels for an external save service.
    #[must_use]
    pub fn save_record(&self) -> SaveRecord {
        SaveRecord::capture(&self.state.player_progress, self.upgrades.levels())
    }

    /// Player economy.
    #[must_use]
    pub const fn progress(&self) -> &PlayerProgress {
        &self.state.player_progress
    }

    /// Screen state of the game.
    #[must_use]
    pub const fn game_state(&self) -> &GameState {
        &self.state
    }

    /// The defended tower.
    #[must_use]
    pub const fn tower(&self) -> &Tower {
        &self.tower
    }

    /// The battle with its live enemies and projectiles.
    #[must_use]
    pub const fn battle(&self) -> &BattleManager {
        &self.battle
    }

    /// Wave pacing state.
    #[must_use]
    pub const fn waves(&self) -> &WaveManager {
        &self.waves
    }

    /// Upgrade shop.
    #[must_use]
    pub const fn upgrades(&self) -> &UpgradeSystem {
        &self.upgrades
    }

    /// Simulated seconds since the session started.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Frames advanced while the battle was running.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

/// Derives an independent seed for the random stream named `label`.
fn derive_stream_seed(seed: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
