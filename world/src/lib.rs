#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for Idle Defence.
//!
//! The [`BattleManager`] owns every live enemy and projectile and is the only
//! place where projectile damage is applied. Systems and adapters observe the
//! battle through the read-only [`query`] module.

mod enemies;
mod projectiles;
mod tower;

pub use enemies::{Enemy, EnemyArena};
pub use projectiles::{Flight, Projectile};
pub use tower::Tower;

use idle_defence_core::{
    ArrivalPolicy, BattleConfig, BattleOutcome, DefeatLedger, EnemyHandle, EnemyKind,
    EnemyScaling, GameState, Position, SpawnError,
};

/// Enemy removed from the battle because its health reached zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefeatedEnemy {
    /// Handle the enemy was addressed by while alive.
    pub handle: EnemyHandle,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Coins credited for the kill.
    pub reward: u64,
    /// Experience credited to the tower.
    pub experience: u32,
    /// Where the enemy died.
    pub position: Position,
}

/// Everything that happened during a single battle tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Enemies defeated this tick, in slot order.
    pub defeated: Vec<DefeatedEnemy>,
    /// Number of enemies removed after breaching the tower.
    pub escaped: usize,
    /// Projectiles whose target died or left before they connected.
    pub lost_projectiles: usize,
    /// Whether the battle is still running.
    pub outcome: BattleOutcome,
}

/// Orchestrates enemies, the tower and projectiles for one battle.
#[derive(Debug)]
pub struct BattleManager {
    config: BattleConfig,
    tower_position: Position,
    enemies: EnemyArena,
    projectiles: Vec<Projectile>,
}

impl BattleManager {
    /// Creates an empty battle whose enemies walk toward `tower_position`.
    #[must_use]
    pub fn new(config: BattleConfig, tower_position: Position) -> Self {
        Self {
            config,
            tower_position,
            enemies: EnemyArena::new(),
            projectiles: Vec::new(),
        }
    }

    /// Spawns an unscaled enemy walking straight from `position` to the tower.
    pub fn spawn_enemy(&mut self, kind: EnemyKind, position: Position) -> EnemyHandle {
        self.spawn_scaled_enemy(kind, position, EnemyScaling::IDENTITY)
    }

    /// Spawns an enemy with wave multipliers applied to its archetype.
    pub fn spawn_scaled_enemy(
        &mut self,
        kind: EnemyKind,
        position: Position,
        scaling: EnemyScaling,
    ) -> EnemyHandle {
        let enemy = Enemy::direct(kind, position, self.tower_position, scaling, &self.config);
        self.insert(enemy)
    }

    /// Spawns an enemy that follows `path`, whose last point should be the
    /// tower.
    pub fn spawn_enemy_on_path(
        &mut self,
        kind: EnemyKind,
        path: Vec<Position>,
        scaling: EnemyScaling,
    ) -> Result<EnemyHandle, SpawnError> {
        let enemy = Enemy::on_path(kind, path, scaling, &self.config)?;
        Ok(self.insert(enemy))
    }

    fn insert(&mut self, enemy: Enemy) -> EnemyHandle {
        let position = enemy.position();
        let kind = enemy.kind();
        let handle = self.enemies.insert(enemy);
        log::debug!(
            "spawned {kind} as {handle:?} at ({}, {})",
            position.x,
            position.y
        );
        handle
    }

    /// Advances the battle by one tick.
    ///
    /// Enemies move and siege first, then the tower fires, then projectiles
    /// resolve, then defeated enemies are swept and rewarded. A tower
    /// destroyed by siege ends the battle through `game_state` and skips the
    /// remaining steps of the tick.
    pub fn update<L>(
        &mut self,
        delta_time: f32,
        tower: &mut Tower,
        game_state: &mut GameState,
        ledger: &mut L,
    ) -> TickReport
    where
        L: DefeatLedger + ?Sized,
    {
        let mut report = TickReport::default();
        if !tower.is_alive() {
            report.outcome = BattleOutcome::TowerDestroyed;
            return report;
        }

        if self.advance_enemies(delta_time, tower, ledger, &mut report) {
            log::info!("tower destroyed, battle lost");
            game_state.end_battle(false);
            report.outcome = BattleOutcome::TowerDestroyed;
            return report;
        }

        self.projectiles
            .extend(tower.update(delta_time, &self.enemies));

        report.lost_projectiles = self.resolve_projectiles();

        let fallen: Vec<EnemyHandle> = self
            .enemies
            .iter()
            .filter(|(_, enemy)| !enemy.is_alive())
            .map(|(handle, _)| handle)
            .collect();
        for handle in fallen {
            let Some(enemy) = self.enemies.remove(handle) else {
                continue;
            };
            let archetype = enemy.kind().archetype();
            ledger.on_enemy_defeated();

            let progress = &mut game_state.player_progress;
            progress.add_coins(archetype.reward);
            progress.enemies_defeated = progress.enemies_defeated.saturating_add(1);
            tower.add_experience(archetype.experience);

            log::debug!("{} defeated as {handle:?}", enemy.kind());
            report.defeated.push(DefeatedEnemy {
                handle,
                kind: enemy.kind(),
                reward: archetype.reward,
                experience: archetype.experience,
                position: enemy.position(),
            });
        }

        self.projectiles.retain(Projectile::is_active);
        report
    }

    /// Moves every live enemy and applies siege damage for those in contact.
    ///
    /// Returns `true` when siege damage destroyed the tower.
    fn advance_enemies<L>(
        &mut self,
        delta_time: f32,
        tower: &mut Tower,
        ledger: &mut L,
        report: &mut TickReport,
    ) -> bool
    where
        L: DefeatLedger + ?Sized,
    {
        let mut breached = Vec::new();
        let mut destroyed = false;
        for (handle, enemy) in self.enemies.iter_mut() {
            if !enemy.is_alive() || !enemy.update(delta_time) {
                continue;
            }

            let damage = self.config.siege_damage(enemy.max_health());
            destroyed = tower.take_damage(damage);
            if self.config.arrival == ArrivalPolicy::Breach {
                breached.push(handle);
            }
            if destroyed {
                break;
            }
        }

        if destroyed {
            return true;
        }

        for handle in breached {
            if let Some(enemy) = self.enemies.remove(handle) {
                log::debug!("{} breached the tower as {handle:?}", enemy.kind());
                ledger.on_enemy_escaped();
                report.escaped += 1;
            }
        }
        false
    }

    /// Advances every projectile and applies damage on arrival.
    ///
    /// Returns how many projectiles lost their target.
    fn resolve_projectiles(&mut self) -> usize {
        let mut lost = 0;
        for projectile in &mut self.projectiles {
            let handle = projectile.target();
            match projectile.update(self.enemies.get(handle)) {
                Flight::Arrived => {}
                Flight::TargetLost => {
                    lost += 1;
                    continue;
                }
                Flight::InFlight | Flight::Spent => continue,
            }

            if let Some(enemy) = self.enemies.get_mut(handle) {
                let killed = enemy.take_damage(projectile.damage());
                log::debug!(
                    "projectile hit {handle:?} for {}{}",
                    projectile.damage(),
                    if killed { ", target down" } else { "" }
                );
            }
        }
        lost
    }

    /// Resolves a handle to the live enemy behind it.
    #[must_use]
    pub fn enemy(&self, handle: EnemyHandle) -> Option<&Enemy> {
        self.enemies.get(handle)
    }

    /// Number of enemies currently in the battle.
    #[must_use]
    pub const fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Number of projectiles still travelling.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    /// Number of enemies currently in contact with the tower.
    #[must_use]
    pub fn enemies_at_tower(&self) -> usize {
        self.enemies
            .iter()
            .filter(|(_, enemy)| enemy.reached_end())
            .count()
    }

    /// Position enemies walk toward.
    #[must_use]
    pub const fn tower_position(&self) -> Position {
        self.tower_position
    }

    /// Configuration the battle was created with.
    #[must_use]
    pub const fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Removes every enemy and projectile.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.projectiles.clear();
    }
}

/// Read-only snapshots of the battle for adapters.
pub mod query {
    use idle_defence_core::{EnemyHandle, EnemyKind, Position, TowerStats};

    use super::{BattleManager, Tower};

    /// Captures every live enemy in slot order.
    #[must_use]
    pub fn enemies(battle: &BattleManager) -> Vec<EnemySnapshot> {
        battle
            .enemies
            .iter()
            .map(|(handle, enemy)| EnemySnapshot {
                handle,
                kind: enemy.kind(),
                position: enemy.position(),
                health: enemy.health(),
                max_health: enemy.max_health(),
                reached_end: enemy.reached_end(),
            })
            .collect()
    }

    /// Captures every projectile still in flight.
    #[must_use]
    pub fn projectiles(battle: &BattleManager) -> Vec<ProjectileSnapshot> {
        battle
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                position: projectile.position(),
                target: projectile.target(),
                critical: projectile.is_critical(),
            })
            .collect()
    }

    /// Captures the tower's health and progression.
    #[must_use]
    pub fn tower(tower: &Tower) -> TowerSnapshot {
        TowerSnapshot {
            position: tower.position(),
            health: tower.health(),
            max_health: tower.max_health(),
            level: tower.level(),
            experience: tower.experience(),
            experience_to_next_level: tower.experience_to_next_level(),
            stats: *tower.stats(),
        }
    }

    /// Immutable view of a single enemy.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Handle addressing the enemy.
        pub handle: EnemyHandle,
        /// Archetype of the enemy.
        pub kind: EnemyKind,
        /// Current position.
        pub position: Position,
        /// Remaining health.
        pub health: f32,
        /// Health the enemy spawned with.
        pub max_health: f32,
        /// Whether the enemy is in contact with the tower.
        pub reached_end: bool,
    }

    /// Immutable view of a projectile.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Current position.
        pub position: Position,
        /// Enemy the projectile chases.
        pub target: EnemyHandle,
        /// Whether the shot rolled a critical hit.
        pub critical: bool,
    }

    /// Immutable view of the tower.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct TowerSnapshot {
        /// Fixed position.
        pub position: Position,
        /// Remaining health.
        pub health: f32,
        /// Maximum health.
        pub max_health: f32,
        /// Current level.
        pub level: u32,
        /// Experience toward the next level.
        pub experience: u64,
        /// Experience required for the next level.
        pub experience_to_next_level: u64,
        /// Combat statistics.
        pub stats: TowerStats,
    }
}
