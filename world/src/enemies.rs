//! Enemy actors and the generation-checked arena that owns them.

use idle_defence_core::{
    BattleConfig, EnemyHandle, EnemyKind, EnemyScaling, Position, SpawnError,
};

/// A single enemy walking its path toward the tower.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    kind: EnemyKind,
    health: f32,
    max_health: f32,
    speed: f32,
    radius: f32,
    distance_scale: f32,
    waypoint_epsilon: f32,
    position: Position,
    path: Vec<Position>,
    path_index: usize,
    reached_end: bool,
}

impl Enemy {
    /// Creates an enemy walking straight from `spawn` to `destination`.
    #[must_use]
    pub fn direct(
        kind: EnemyKind,
        spawn: Position,
        destination: Position,
        scaling: EnemyScaling,
        config: &BattleConfig,
    ) -> Self {
        Self::from_path(kind, vec![spawn, destination], scaling, config)
    }

    /// Creates an enemy following `path`, which must hold the spawn point,
    /// any intermediate waypoints, and the tower position last.
    pub fn on_path(
        kind: EnemyKind,
        path: Vec<Position>,
        scaling: EnemyScaling,
        config: &BattleConfig,
    ) -> Result<Self, SpawnError> {
        if path.len() < 2 {
            return Err(SpawnError::MalformedPath {
                waypoints: path.len(),
            });
        }
        Ok(Self::from_path(kind, path, scaling, config))
    }

    fn from_path(
        kind: EnemyKind,
        path: Vec<Position>,
        scaling: EnemyScaling,
        config: &BattleConfig,
    ) -> Self {
        let archetype = kind.archetype();
        let max_health = (archetype.base_health * scaling.health_multiplier).max(0.0);
        Self {
            kind,
            health: max_health,
            max_health,
            speed: (archetype.base_speed * scaling.speed_multiplier).max(0.0),
            radius: config.enemy_radius,
            distance_scale: config.distance_scale,
            waypoint_epsilon: config.waypoint_epsilon,
            position: path[0],
            path,
            path_index: 1,
            reached_end: false,
        }
    }

    /// Advances the enemy along its path.
    ///
    /// Waypoints reached mid-tick hand the unused movement over to the next
    /// leg. Returns `true` once the final waypoint is reached and on every
    /// call afterwards.
    pub fn update(&mut self, delta_time: f32) -> bool {
        if self.reached_end {
            return true;
        }

        let mut budget = self.speed * self.distance_scale * delta_time.max(0.0);
        while let Some(&waypoint) = self.path.get(self.path_index) {
            let distance = self.position.distance(waypoint);
            if distance > self.waypoint_epsilon && distance > budget {
                self.position += (waypoint - self.position) / distance * budget;
                return false;
            }

            budget = (budget - distance).max(0.0);
            self.position = waypoint;
            if self.path_index + 1 == self.path.len() {
                break;
            }
            self.path_index += 1;
        }

        self.reached_end = true;
        true
    }

    /// Applies damage, clamping health at zero.
    ///
    /// Returns `true` only for the hit that takes the enemy from alive to dead.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        !self.is_alive()
    }

    /// Reports whether the enemy still has health left.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Remaining health as a fraction of the starting health, in `[0, 1]`.
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Archetype of the enemy.
    #[must_use]
    pub const fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Health the enemy spawned with.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Movement speed after wave scaling.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Collision radius used by projectiles.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Waypoints from the spawn point to the tower.
    #[must_use]
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    /// Index of the waypoint currently approached.
    #[must_use]
    pub const fn path_index(&self) -> usize {
        self.path_index
    }

    /// Whether the enemy has arrived at the tower.
    #[must_use]
    pub const fn reached_end(&self) -> bool {
        self.reached_end
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    enemy: Option<Enemy>,
}

/// Owning storage for live enemies addressed through [`EnemyHandle`]s.
///
/// Iteration follows slot order, which keeps every per-tick pass
/// deterministic for a given spawn and removal history.
#[derive(Clone, Debug, Default)]
pub struct EnemyArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl EnemyArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an enemy and returns the handle addressing it.
    pub fn insert(&mut self, enemy: Enemy) -> EnemyHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.enemy = Some(enemy);
            return EnemyHandle::new(index, slot.generation);
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            enemy: Some(enemy),
        });
        EnemyHandle::new(index, 0)
    }

    /// Removes the enemy behind `handle`, invalidating every copy of it.
    pub fn remove(&mut self, handle: EnemyHandle) -> Option<Enemy> {
        let slot = self.slot_mut(handle)?;
        let enemy = slot.enemy.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        self.len -= 1;
        Some(enemy)
    }

    /// Resolves a handle, returning `None` when it is stale.
    #[must_use]
    pub fn get(&self, handle: EnemyHandle) -> Option<&Enemy> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.enemy.as_ref()
    }

    /// Resolves a handle mutably, returning `None` when it is stale.
    pub fn get_mut(&mut self, handle: EnemyHandle) -> Option<&mut Enemy> {
        self.slot_mut(handle)?.enemy.as_mut()
    }

    /// Number of live entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the arena holds no enemies.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over live enemies in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EnemyHandle, &Enemy)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.enemy
                .as_ref()
                .map(|enemy| (EnemyHandle::new(index as u32, slot.generation), enemy))
        })
    }

    /// Iterates mutably over live enemies in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EnemyHandle, &mut Enemy)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.enemy
                .as_mut()
                .map(|enemy| (EnemyHandle::new(index as u32, generation), enemy))
        })
    }

    /// Removes every enemy, invalidating all outstanding handles.
    pub fn clear(&mut self) {
        let handles: Vec<EnemyHandle> = self.iter().map(|(handle, _)| handle).collect();
        for handle in handles {
            let _ = self.remove(handle);
        }
    }

    fn slot_mut(&mut self, handle: EnemyHandle) -> Option<&mut Slot> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        (slot.generation == handle.generation()).then_some(slot)
    }
}
