#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave pacing and perimeter spawn placement.
//!
//! [`WaveManager`] decides when and what to spawn and when a wave is over.
//! [`EnemySpawner`] decides where newly scheduled enemies enter the arena.

use idle_defence_core::{
    ArenaConfig, DefeatLedger, EnemyKind, PlayerProgress, Position, WaveConfig,
    WAVE_CLEAR_BONUS_PER_WAVE,
};
use idle_defence_system_wave_generation::{WaveConfigError, WaveConfigManager};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Observable lifecycle of the wave manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WavePhase {
    /// No wave has been started yet.
    Idle,
    /// The current wave is spawning or waiting for its enemies to resolve.
    InProgress,
    /// The current wave was cleared; the next update starts the following one.
    Complete,
}

/// Drives spawn timing for the active wave and tracks its completion.
#[derive(Clone, Debug)]
pub struct WaveManager {
    configs: WaveConfigManager,
    rng: ChaCha8Rng,
    active: WaveConfig,
    current_wave: u32,
    wave_in_progress: bool,
    enemies_spawned: u32,
    enemies_defeated: u32,
    enemies_escaped: u32,
    spawn_timer: f32,
}

impl WaveManager {
    /// Creates an idle manager whose composition draws derive from `seed`.
    #[must_use]
    pub fn new(configs: WaveConfigManager, seed: u64) -> Self {
        let active = configs.get_wave_config(1);
        Self {
            configs,
            rng: ChaCha8Rng::seed_from_u64(seed),
            active,
            current_wave: 0,
            wave_in_progress: false,
            enemies_spawned: 0,
            enemies_defeated: 0,
            enemies_escaped: 0,
            spawn_timer: 0.0,
        }
    }

    /// Starts `wave_number`, resetting every counter and the spawn timer.
    ///
    /// Wave zero is treated as the first wave.
    pub fn start_wave(&mut self, wave_number: u32) {
        let wave = wave_number.max(1);
        self.active = self.configs.get_wave_config(wave);
        self.current_wave = wave;
        self.wave_in_progress = true;
        self.enemies_spawned = 0;
        self.enemies_defeated = 0;
        self.enemies_escaped = 0;
        self.spawn_timer = 0.0;

        log::info!(
            "wave {wave} started: {} enemies every {}s",
            self.active.total_enemies,
            self.active.spawn_interval
        );
    }

    /// Advances the spawn timer and returns the kinds to spawn this update.
    ///
    /// Starts the next wave first when none is running. At most one enemy is
    /// scheduled per call and the timer restarts from zero after each spawn.
    /// A cleared wave pays its bonus into `progress` and advances the
    /// player's wave counter.
    ///
    /// Fails when the active wave has no enemy kinds to draw from.
    pub fn update(
        &mut self,
        delta_time: f32,
        progress: &mut PlayerProgress,
    ) -> Result<Vec<EnemyKind>, WaveConfigError> {
        if !self.wave_in_progress {
            self.start_wave(self.current_wave.saturating_add(1));
        }

        let mut scheduled = Vec::new();
        self.spawn_timer += delta_time.max(0.0);
        if self.spawn_timer >= self.active.spawn_interval
            && self.enemies_spawned < self.active.total_enemies
        {
            let kind = self
                .configs
                .get_random_enemy_type(self.current_wave, &mut self.rng)?;
            self.enemies_spawned += 1;
            self.spawn_timer = 0.0;
            log::debug!(
                "scheduling {kind}, {}/{} spawned",
                self.enemies_spawned,
                self.active.total_enemies
            );
            scheduled.push(kind);
        }

        self.check_completion(progress);
        Ok(scheduled)
    }

    fn check_completion(&mut self, progress: &mut PlayerProgress) {
        let total = self.active.total_enemies;
        let resolved = self.enemies_defeated.saturating_add(self.enemies_escaped);
        if !self.wave_in_progress || self.enemies_spawned < total || resolved < total {
            return;
        }

        self.wave_in_progress = false;
        progress.add_coins(u64::from(self.current_wave) * WAVE_CLEAR_BONUS_PER_WAVE);
        progress.current_wave = progress.current_wave.saturating_add(1);
        log::info!(
            "wave {} completed: {} defeated, {} escaped",
            self.current_wave,
            self.enemies_defeated,
            self.enemies_escaped
        );
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        match (self.wave_in_progress, self.current_wave) {
            (true, _) => WavePhase::InProgress,
            (false, 0) => WavePhase::Idle,
            (false, _) => WavePhase::Complete,
        }
    }

    /// Configuration of the current wave, or of the first wave while idle.
    #[must_use]
    pub const fn current_config(&self) -> &WaveConfig {
        &self.active
    }

    /// Number of the current wave, zero before the first one starts.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Whether a wave is running.
    #[must_use]
    pub const fn is_wave_in_progress(&self) -> bool {
        self.wave_in_progress
    }

    /// Enemies scheduled during the current wave.
    #[must_use]
    pub const fn enemies_spawned(&self) -> u32 {
        self.enemies_spawned
    }

    /// Enemies of the current wave killed so far.
    #[must_use]
    pub const fn enemies_defeated(&self) -> u32 {
        self.enemies_defeated
    }

    /// Enemies of the current wave that breached the tower.
    #[must_use]
    pub const fn enemies_escaped(&self) -> u32 {
        self.enemies_escaped
    }

    /// Seconds accumulated toward the next spawn.
    #[must_use]
    pub const fn spawn_timer(&self) -> f32 {
        self.spawn_timer
    }
}

impl DefeatLedger for WaveManager {
    fn on_enemy_defeated(&mut self) {
        self.enemies_defeated = self.enemies_defeated.saturating_add(1);
        log::debug!(
            "enemy defeated, {}/{}",
            self.enemies_defeated,
            self.active.total_enemies
        );
    }

    fn on_enemy_escaped(&mut self) {
        self.enemies_escaped = self.enemies_escaped.saturating_add(1);
        log::debug!(
            "enemy escaped, {}/{}",
            self.enemies_escaped,
            self.active.total_enemies
        );
    }
}

/// Edge of the arena an enemy enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Above the top edge.
    Top,
    /// Right of the right edge.
    Right,
    /// Below the bottom edge.
    Bottom,
    /// Left of the left edge.
    Left,
}

impl Side {
    const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];
}

/// Picks spawn points just outside the arena perimeter.
#[derive(Clone, Debug)]
pub struct EnemySpawner {
    arena: ArenaConfig,
    rng: ChaCha8Rng,
}

impl EnemySpawner {
    /// Creates a spawner for `arena` whose draws derive from `seed`.
    #[must_use]
    pub fn new(arena: ArenaConfig, seed: u64) -> Self {
        Self {
            arena,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Returns a point `spawn_margin` outside a uniformly chosen side.
    ///
    /// The coordinate along the side stays at least `spawn_margin` away from
    /// both corners.
    pub fn get_random_spawn_position(&mut self) -> Position {
        let side = Side::ALL[self.rng.gen_range(0..Side::ALL.len())];
        self.spawn_position_on(side)
    }

    /// Returns one spawn position per enemy of a wave.
    pub fn get_spawn_positions_for_wave(&mut self, enemy_count: usize) -> Vec<Position> {
        (0..enemy_count)
            .map(|_| self.get_random_spawn_position())
            .collect()
    }

    fn spawn_position_on(&mut self, side: Side) -> Position {
        let ArenaConfig {
            width,
            height,
            spawn_margin,
        } = self.arena;

        match side {
            Side::Top => Position::new(self.along(width), -spawn_margin),
            Side::Right => Position::new(width + spawn_margin, self.along(height)),
            Side::Bottom => Position::new(self.along(width), height + spawn_margin),
            Side::Left => Position::new(-spawn_margin, self.along(height)),
        }
    }

    fn along(&mut self, extent: f32) -> f32 {
        let low = self.arena.spawn_margin;
        let high = extent - self.arena.spawn_margin;
        if high <= low {
            return extent / 2.0;
        }
        self.rng.gen_range(low..=high)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn idle_until_first_update() {
        let mut manager = WaveManager::new(WaveConfigManager::new(), 1);
        assert_eq!(manager.phase(), WavePhase::Idle);
        assert_eq!(manager.current_wave(), 0);

        let mut progress = PlayerProgress::default();
        let spawned = manager.update(0.1, &mut progress).expect("wave draw");
        assert!(spawned.is_empty());
        assert_eq!(manager.phase(), WavePhase::InProgress);
        assert_eq!(manager.current_wave(), 1);
    }

    #[test]
    fn timer_resets_fully_after_a_spawn() {
        let mut manager = WaveManager::new(WaveConfigManager::new(), 1);
        let mut progress = PlayerProgress::default();
        let spawned = manager.update(5.0, &mut progress).expect("wave draw");
        assert_eq!(spawned.len(), 1, "a long frame still spawns only once");
        assert_eq!(manager.spawn_timer(), 0.0);
        assert_eq!(manager.enemies_spawned(), 1);
    }

    #[test]
    fn start_wave_resets_counters() {
        let mut manager = WaveManager::new(WaveConfigManager::new(), 1);
        let mut progress = PlayerProgress::default();
        let _ = manager.update(5.0, &mut progress).expect("wave draw");
        manager.on_enemy_defeated();
        manager.on_enemy_escaped();

        manager.start_wave(4);
        assert_eq!(manager.current_wave(), 4);
        assert_eq!(manager.enemies_spawned(), 0);
        assert_eq!(manager.enemies_defeated(), 0);
        assert_eq!(manager.enemies_escaped(), 0);
        assert_eq!(manager.current_config().total_enemies, 27);
    }

    #[test]
    fn spawn_positions_lie_outside_the_perimeter() {
        let arena = ArenaConfig::default();
        let mut spawner = EnemySpawner::new(arena, 9);
        let mut sides = HashSet::new();
        for position in spawner.get_spawn_positions_for_wave(400) {
            let outside_x = position.x == -50.0 || position.x == arena.width + 50.0;
            let outside_y = position.y == -50.0 || position.y == arena.height + 50.0;
            assert!(outside_x ^ outside_y, "{position:?} sits on exactly one side");
            if outside_x {
                assert!((50.0..=arena.height - 50.0).contains(&position.y));
            } else {
                assert!((50.0..=arena.width - 50.0).contains(&position.x));
            }

            let side = match (position.x, position.y) {
                (_, y) if y < 0.0 => Side::Top,
                (x, _) if x > arena.width => Side::Right,
                (_, y) if y > arena.height => Side::Bottom,
                _ => Side::Left,
            };
            let _ = sides.insert(side);
        }

        for side in Side::ALL {
            assert!(sides.contains(&side), "{side:?} never chosen in 400 draws");
        }
    }

    #[test]
    fn tiny_arenas_spawn_at_side_midpoints() {
        let arena = ArenaConfig {
            width: 60.0,
            height: 60.0,
            spawn_margin: 50.0,
        };
        let mut spawner = EnemySpawner::new(arena, 3);
        let position = spawner.spawn_position_on(Side::Top);
        assert_eq!(position, Position::new(30.0, -50.0));
    }
}
