#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Idle Defence simulation.
//!
//! This crate defines the vocabulary that connects the authoritative battle
//! state, the pure systems that feed it, and the adapters that drive it. The
//! battle owns every mutable actor; systems receive read-only views or
//! explicit configuration and respond with requests such as enemy kinds to
//! spawn. Nothing in here performs I/O.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod progress;

pub use progress::{GameState, GameStateKind, PlayerProgress, SaveRecord};

/// Two-dimensional battle-space coordinate measured in screen units.
pub type Position = glam::Vec2;

/// Coins awarded per wave number when a wave is cleared.
pub const WAVE_CLEAR_BONUS_PER_WAVE: u64 = 10;

/// Visual appearance applied to an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EnemyColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl EnemyColor {
    /// Creates a new enemy color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Immutable archetype shared by every enemy of the same kind.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyType {
    /// Human readable archetype name.
    pub name: &'static str,
    /// Health an enemy of this archetype starts with before wave scaling.
    pub base_health: f32,
    /// Movement speed before wave scaling, in units per normalised frame.
    pub base_speed: f32,
    /// Presentation color.
    pub color: EnemyColor,
    /// Coins credited to the player when the enemy is defeated.
    pub reward: u64,
    /// Experience credited to the tower when the enemy is defeated.
    pub experience: u32,
}

const GOBLIN: EnemyType = EnemyType {
    name: "Goblin",
    base_health: 50.0,
    base_speed: 1.5,
    color: EnemyColor::from_rgb(50, 180, 50),
    reward: 5,
    experience: 10,
};

const ORC: EnemyType = EnemyType {
    name: "Orc",
    base_health: 100.0,
    base_speed: 1.0,
    color: EnemyColor::from_rgb(180, 50, 50),
    reward: 10,
    experience: 20,
};

const BOSS: EnemyType = EnemyType {
    name: "Boss",
    base_health: 300.0,
    base_speed: 0.7,
    color: EnemyColor::from_rgb(180, 50, 180),
    reward: 30,
    experience: 50,
};

/// Identifier of an enemy archetype in the fixed registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    /// Fast, fragile melee enemy.
    Goblin,
    /// Slower enemy with twice the goblin's health.
    Orc,
    /// Slow, heavily armoured enemy that appears in later waves.
    Boss,
}

impl EnemyKind {
    /// Every registered archetype in registry order.
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Goblin, EnemyKind::Orc, EnemyKind::Boss];

    /// Looks up the archetype registered for this kind.
    #[must_use]
    pub const fn archetype(self) -> &'static EnemyType {
        match self {
            Self::Goblin => &GOBLIN,
            Self::Orc => &ORC,
            Self::Boss => &BOSS,
        }
    }

    /// Stable textual identifier used in configuration files.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Goblin => "goblin",
            Self::Orc => "orc",
            Self::Boss => "boss",
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for EnemyKind {
    type Err = UnknownEnemyKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == value)
            .ok_or_else(|| UnknownEnemyKind(value.to_owned()))
    }
}

/// Textual enemy identifier that does not name a registered archetype.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown enemy type `{0}`")]
pub struct UnknownEnemyKind(pub String);

/// Generation-checked reference to an enemy stored in the battle arena.
///
/// A handle stays valid until the enemy is removed. Afterwards the slot's
/// generation moves on and every lookup through the stale handle misses,
/// even if the slot is reused by a later spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyHandle {
    index: u32,
    generation: u32,
}

impl EnemyHandle {
    /// Creates a handle pointing at the provided slot and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the arena.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation the slot had when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Combat statistics of the tower.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerStats {
    /// Damage dealt by a single non-critical shot.
    pub damage: f32,
    /// Shots per second.
    pub attack_speed: f32,
    /// Radius within which enemies can be targeted.
    pub attack_range: f32,
    /// Probability in `[0, 1]` that a shot is critical.
    pub critical_chance: f32,
    /// Damage multiplier applied to critical shots.
    pub critical_multiplier: f32,
}

impl TowerStats {
    /// Seconds that must elapse between two shots.
    ///
    /// Non-positive attack speeds never fire.
    #[must_use]
    pub fn attack_cooldown(&self) -> f64 {
        if self.attack_speed > 0.0 {
            1.0 / f64::from(self.attack_speed)
        } else {
            f64::INFINITY
        }
    }
}

impl Default for TowerStats {
    fn default() -> Self {
        Self {
            damage: 10.0,
            attack_speed: 1.0,
            attack_range: 200.0,
            critical_chance: 0.1,
            critical_multiplier: 2.0,
        }
    }
}

/// Starting configuration of the tower for a session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    /// Combat statistics at level one.
    #[serde(flatten)]
    pub stats: TowerStats,
    /// Health the tower starts with.
    pub max_health: f32,
    /// Experience required for the first level-up.
    pub experience_to_next_level: u32,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            stats: TowerStats::default(),
            max_health: 1_000.0,
            experience_to_next_level: 100,
        }
    }
}

/// Multipliers a wave applies to the archetype of every enemy it spawns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyScaling {
    /// Factor applied to the archetype's base health.
    pub health_multiplier: f32,
    /// Factor applied to the archetype's base speed.
    pub speed_multiplier: f32,
}

impl EnemyScaling {
    /// Scaling that leaves the archetype untouched.
    pub const IDENTITY: Self = Self {
        health_multiplier: 1.0,
        speed_multiplier: 1.0,
    };
}

impl Default for EnemyScaling {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Immutable description of a single wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// One-based wave number the configuration applies to.
    pub wave_number: u32,
    /// Number of enemies the wave spawns in total.
    pub total_enemies: u32,
    /// Weighted pool of kinds; duplicates raise a kind's draw probability.
    pub enemy_type_pool: Vec<EnemyKind>,
    /// Seconds between two consecutive spawns.
    pub spawn_interval: f32,
    /// Factor applied to every spawned enemy's health.
    #[serde(default = "unit_multiplier")]
    pub health_multiplier: f32,
    /// Factor applied to every spawned enemy's speed.
    #[serde(default = "unit_multiplier")]
    pub speed_multiplier: f32,
}

impl WaveConfig {
    /// Scaling applied to enemies spawned while this wave runs.
    #[must_use]
    pub const fn scaling(&self) -> EnemyScaling {
        EnemyScaling {
            health_multiplier: self.health_multiplier,
            speed_multiplier: self.speed_multiplier,
        }
    }
}

fn unit_multiplier() -> f32 {
    1.0
}

/// Screen bounds of the battle space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Visible width in screen units.
    pub width: f32,
    /// Visible height in screen units.
    pub height: f32,
    /// Distance outside the visible area at which enemies appear.
    pub spawn_margin: f32,
}

impl ArenaConfig {
    /// Centre of the arena, where the tower stands.
    #[must_use]
    pub fn center(&self) -> Position {
        Position::new((self.width / 2.0).floor(), (self.height / 2.0).floor())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 700.0,
            spawn_margin: 50.0,
        }
    }
}

/// Decides what happens to an enemy once it reaches the tower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalPolicy {
    /// The enemy stays at the tower, deals siege damage every tick, and
    /// remains a valid target until it dies.
    #[default]
    Siege,
    /// The enemy deals a single tick of siege damage, leaves the battle, and
    /// counts as accounted for in wave completion.
    Breach,
}

/// Tunables of the battle simulation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Collision radius of an enemy.
    pub enemy_radius: f32,
    /// Distance at which an enemy counts as standing on a waypoint.
    pub waypoint_epsilon: f32,
    /// Converts archetype speed into units per second.
    pub distance_scale: f32,
    /// Distance a projectile covers per tick.
    pub projectile_speed: f32,
    /// Siege damage per tick is the enemy's maximum health divided by this.
    pub siege_divisor: f32,
    /// Fate of enemies that reach the tower.
    pub arrival: ArrivalPolicy,
}

impl BattleConfig {
    /// Siege damage a lingering enemy with the provided maximum health deals
    /// per tick. Never less than one.
    #[must_use]
    pub fn siege_damage(&self, max_health: f32) -> f32 {
        let divisor = self.siege_divisor.max(1.0);
        (max_health / divisor).floor().max(1.0)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            enemy_radius: 20.0,
            waypoint_epsilon: 5.0,
            distance_scale: 60.0,
            projectile_speed: 5.0,
            siege_divisor: 50.0,
            arrival: ArrivalPolicy::Siege,
        }
    }
}

/// Terminal signal of a battle tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BattleOutcome {
    /// The tower still stands.
    #[default]
    Ongoing,
    /// The tower's health reached zero; the battle is lost.
    TowerDestroyed,
}

/// Receiver of enemy accounting notifications emitted by the battle.
///
/// The wave scheduler implements this so the battle can report removals
/// without depending on the scheduler's crate.
pub trait DefeatLedger {
    /// Called once for every enemy removed because its health reached zero.
    fn on_enemy_defeated(&mut self);

    /// Called once for every enemy removed after breaching the tower.
    fn on_enemy_escaped(&mut self);
}

/// Ledger that discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLedger;

impl DefeatLedger for NullLedger {
    fn on_enemy_defeated(&mut self) {}

    fn on_enemy_escaped(&mut self) {}
}

/// Reasons the battle rejects a spawn request.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The path needs a spawn point and the tower position at minimum.
    #[error("enemy path needs at least 2 waypoints, got {waypoints}")]
    MalformedPath {
        /// Number of waypoints supplied.
        waypoints: usize,
    },
}
