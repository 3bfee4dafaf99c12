//! The defended tower: stats, progression, target engagement and firing.

use idle_defence_core::{BattleConfig, EnemyHandle, Position, TowerConfig, TowerStats};
use idle_defence_system_tower_combat::{cooldown_elapsed, TowerCombat};
use idle_defence_system_tower_targeting::{in_range, TargetCandidate, TowerTargeting};

use crate::{EnemyArena, Projectile};

const LEVEL_DAMAGE_GROWTH: f32 = 1.1;
const LEVEL_ATTACK_SPEED_GROWTH: f32 = 1.05;

/// The single tower defended during a battle session.
#[derive(Debug, Clone)]
pub struct Tower {
    position: Position,
    stats: TowerStats,
    health: f32,
    max_health: f32,
    level: u32,
    experience: u64,
    experience_to_next_level: u64,
    current_target: Option<EnemyHandle>,
    last_attack_time: Option<f64>,
    clock: f64,
    projectile_speed: f32,
    shots_fired: u64,
    targeting: TowerTargeting,
    combat: TowerCombat,
}

impl Tower {
    /// Creates a level-one tower at `position`.
    ///
    /// `seed` drives the critical-hit rolls.
    #[must_use]
    pub fn new(position: Position, config: &TowerConfig, battle: &BattleConfig, seed: u64) -> Self {
        let max_health = config.max_health.max(0.0);
        log::info!("tower created at ({}, {})", position.x, position.y);
        Self {
            position,
            stats: config.stats,
            health: max_health,
            max_health,
            level: 1,
            experience: 0,
            experience_to_next_level: u64::from(config.experience_to_next_level.max(1)),
            current_target: None,
            last_attack_time: None,
            clock: 0.0,
            projectile_speed: battle.projectile_speed,
            shots_fired: 0,
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(seed),
        }
    }

    /// Advances the tower's clock, engages a target and fires when ready.
    ///
    /// Returns the projectiles fired during this call.
    pub fn update(&mut self, delta_time: f32, enemies: &EnemyArena) -> Vec<Projectile> {
        self.clock += f64::from(delta_time.max(0.0));
        let now = self.clock;

        let engaged = self
            .current_target
            .and_then(|handle| enemies.get(handle))
            .is_some_and(|enemy| enemy.is_alive());
        if !engaged {
            let candidates = enemies
                .iter()
                .filter(|(_, enemy)| enemy.is_alive())
                .map(|(handle, enemy)| TargetCandidate::new(handle, enemy.position()));
            self.current_target =
                self.targeting
                    .acquire(self.position, self.stats.attack_range, candidates);
        }

        let Some(handle) = self.current_target else {
            return Vec::new();
        };

        if !cooldown_elapsed(self.last_attack_time, now, self.stats.attack_cooldown()) {
            return Vec::new();
        }

        let target_in_range = enemies
            .get(handle)
            .is_some_and(|enemy| in_range(self.position, self.stats.attack_range, enemy.position()));
        if !target_in_range {
            self.current_target = None;
            return Vec::new();
        }

        let shot = self.combat.roll_shot(&self.stats);
        self.last_attack_time = Some(now);
        self.shots_fired += 1;
        log::debug!(
            "tower fired at {handle:?} for {} damage{}",
            shot.damage,
            if shot.critical { " (critical)" } else { "" }
        );

        vec![Projectile::new(
            self.position,
            handle,
            shot.damage,
            self.projectile_speed,
            shot.critical,
        )]
    }

    /// Credits experience, levelling up as many times as it covers.
    pub fn add_experience(&mut self, amount: u32) {
        self.experience = self.experience.saturating_add(u64::from(amount));
        log::debug!(
            "tower gained {amount} xp, {}/{}",
            self.experience,
            self.experience_to_next_level
        );

        while self.experience >= self.experience_to_next_level {
            self.level_up();
        }
    }

    /// Raises the level by one, spending the current threshold.
    ///
    /// Leftover experience carries over. The next threshold is
    /// `floor(threshold * 1.5)`, saturating at `u64::MAX`. Damage and attack
    /// speed grow with every level.
    pub fn level_up(&mut self) {
        self.level = self.level.saturating_add(1);
        self.experience = self.experience.saturating_sub(self.experience_to_next_level);
        let threshold = self.experience_to_next_level;
        self.experience_to_next_level = threshold.saturating_add(threshold / 2).max(1);

        self.stats.damage *= LEVEL_DAMAGE_GROWTH;
        self.stats.attack_speed *= LEVEL_ATTACK_SPEED_GROWTH;

        log::info!("tower reached level {}", self.level);
    }

    /// Applies siege damage, clamping health at zero.
    ///
    /// Returns `true` only for the hit that destroys the tower.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        !self.is_alive()
    }

    /// Reports whether the tower still stands.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Remaining health as a fraction of maximum health, in `[0, 1]`.
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Fixed position of the tower.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current combat statistics.
    #[must_use]
    pub const fn stats(&self) -> &TowerStats {
        &self.stats
    }

    /// Mutable access for upgrades applied between ticks.
    ///
    /// Projectiles already in flight keep the damage they were fired with.
    pub fn stats_mut(&mut self) -> &mut TowerStats {
        &mut self.stats
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Current level, starting at one.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Experience accumulated toward the next level.
    #[must_use]
    pub const fn experience(&self) -> u64 {
        self.experience
    }

    /// Experience required for the next level.
    #[must_use]
    pub const fn experience_to_next_level(&self) -> u64 {
        self.experience_to_next_level
    }

    /// Enemy currently engaged, which may since have died.
    #[must_use]
    pub const fn current_target(&self) -> Option<EnemyHandle> {
        self.current_target
    }

    /// Simulation time of the last shot.
    #[must_use]
    pub const fn last_attack_time(&self) -> Option<f64> {
        self.last_attack_time
    }

    /// Number of shots fired since creation.
    #[must_use]
    pub const fn shots_fired(&self) -> u64 {
        self.shots_fired
    }
}
