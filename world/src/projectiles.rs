//! Guided shots travelling from the tower toward a single enemy.

use idle_defence_core::{EnemyHandle, Position};

use crate::Enemy;

/// Result of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Flight {
    /// Still travelling toward its target.
    InFlight,
    /// Reached its target on this tick. Damage is applied by the battle.
    Arrived,
    /// The target died or left the battle before the projectile connected.
    TargetLost,
    /// Already resolved on an earlier tick; nothing happens.
    Spent,
}

/// A single projectile aimed at one enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    position: Position,
    target: EnemyHandle,
    damage: f32,
    speed: f32,
    critical: bool,
    active: bool,
}

impl Projectile {
    /// Creates an active projectile at `start` aimed at `target`.
    ///
    /// `damage` is final: later stat changes on the tower do not affect it.
    #[must_use]
    pub const fn new(
        start: Position,
        target: EnemyHandle,
        damage: f32,
        speed: f32,
        critical: bool,
    ) -> Self {
        Self {
            position: start,
            target,
            damage,
            speed,
            critical,
            active: true,
        }
    }

    /// Advances the projectile toward `target`, the enemy its handle resolves
    /// to, or `None` when the handle is stale.
    ///
    /// The projectile leaves [`Flight::InFlight`] exactly once; every later
    /// call reports [`Flight::Spent`]. It never mutates the enemy.
    pub fn update(&mut self, target: Option<&Enemy>) -> Flight {
        if !self.active {
            return Flight::Spent;
        }

        let Some(enemy) = target.filter(|enemy| enemy.is_alive()) else {
            self.active = false;
            return Flight::TargetLost;
        };

        let offset = enemy.position() - self.position;
        let distance = offset.length();
        if distance < self.speed + enemy.radius() {
            self.active = false;
            return Flight::Arrived;
        }

        self.position += offset / distance * self.speed;
        Flight::InFlight
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Handle of the enemy the projectile chases.
    #[must_use]
    pub const fn target(&self) -> EnemyHandle {
        self.target
    }

    /// Damage delivered on arrival.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Whether the shot rolled a critical hit.
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        self.critical
    }

    /// Whether the projectile is still travelling.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_defence_core::{BattleConfig, EnemyKind, EnemyScaling};

    fn orc_at(x: f32) -> Enemy {
        Enemy::direct(
            EnemyKind::Orc,
            Position::new(x, 0.0),
            Position::new(x + 500.0, 0.0),
            EnemyScaling::IDENTITY,
            &BattleConfig::default(),
        )
    }

    fn projectile() -> Projectile {
        Projectile::new(Position::ZERO, EnemyHandle::new(0, 0), 10.0, 5.0, false)
    }

    #[test]
    fn travels_toward_target() {
        let enemy = orc_at(100.0);
        let mut shot = projectile();
        assert_eq!(shot.update(Some(&enemy)), Flight::InFlight);
        assert_eq!(shot.position(), Position::new(5.0, 0.0));
        assert!(shot.is_active());
    }

    #[test]
    fn arrival_resolves_once() {
        let enemy = orc_at(24.0);
        let mut shot = projectile();
        assert_eq!(shot.update(Some(&enemy)), Flight::Arrived);
        assert!(!shot.is_active());
        assert_eq!(shot.position(), Position::ZERO, "no movement on arrival");
        assert_eq!(shot.update(Some(&enemy)), Flight::Spent);
        assert_eq!(shot.update(None), Flight::Spent);
    }

    #[test]
    fn dead_or_missing_target_is_lost() {
        let mut enemy = orc_at(100.0);
        let _ = enemy.take_damage(1_000.0);

        let mut shot = projectile();
        assert_eq!(shot.update(Some(&enemy)), Flight::TargetLost);
        assert!(!shot.is_active());

        let mut orphan = projectile();
        assert_eq!(orphan.update(None), Flight::TargetLost);
        assert_eq!(orphan.update(None), Flight::Spent);
    }
}
