#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower upgrade shop: a fixed catalogue of stat upgrades bought with coins.

use std::{collections::BTreeMap, fmt, str::FromStr};

use idle_defence_core::{PlayerProgress, TowerStats};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stat an upgrade improves.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Damage per shot.
    Damage,
    /// Shots per second.
    AttackSpeed,
    /// Targeting radius.
    AttackRange,
    /// Probability of a critical hit.
    CriticalChance,
    /// Damage factor of critical hits.
    CriticalMultiplier,
}

impl UpgradeKind {
    /// Every upgrade in catalogue order.
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::Damage,
        UpgradeKind::AttackSpeed,
        UpgradeKind::AttackRange,
        UpgradeKind::CriticalChance,
        UpgradeKind::CriticalMultiplier,
    ];

    /// Stable textual identifier used in save records.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            UpgradeKind::Damage => "damage",
            UpgradeKind::AttackSpeed => "attack_speed",
            UpgradeKind::AttackRange => "attack_range",
            UpgradeKind::CriticalChance => "critical_chance",
            UpgradeKind::CriticalMultiplier => "critical_multiplier",
        }
    }

    /// Catalogue entry describing the upgrade.
    #[must_use]
    pub const fn upgrade(self) -> &'static Upgrade {
        match self {
            UpgradeKind::Damage => &DAMAGE,
            UpgradeKind::AttackSpeed => &ATTACK_SPEED,
            UpgradeKind::AttackRange => &ATTACK_RANGE,
            UpgradeKind::CriticalChance => &CRITICAL_CHANCE,
            UpgradeKind::CriticalMultiplier => &CRITICAL_MULTIPLIER,
        }
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for UpgradeKind {
    type Err = UpgradeError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        UpgradeKind::ALL
            .into_iter()
            .find(|kind| kind.id() == id)
            .ok_or_else(|| UpgradeError::Unknown(id.to_owned()))
    }
}

/// How a purchased level changes its stat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Multiplies the stat.
    Scale(f32),
    /// Adds to the stat.
    Add(f32),
}

impl Effect {
    fn apply(self, value: &mut f32) {
        match self {
            Effect::Scale(factor) => *value *= factor,
            Effect::Add(amount) => *value += amount,
        }
    }
}

/// Catalogue entry of a single upgrade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Upgrade {
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Price of the first level; level `n + 1` costs `base_cost * (n + 1)`.
    pub base_cost: u64,
    /// Change applied per level.
    pub effect: Effect,
    /// Highest purchasable level.
    pub max_level: u32,
}

const DAMAGE: Upgrade = Upgrade {
    name: "Damage",
    description: "Increases tower damage",
    base_cost: 50,
    effect: Effect::Scale(1.2),
    max_level: 20,
};

const ATTACK_SPEED: Upgrade = Upgrade {
    name: "Attack speed",
    description: "Increases shots per second",
    base_cost: 75,
    effect: Effect::Scale(1.15),
    max_level: 15,
};

const ATTACK_RANGE: Upgrade = Upgrade {
    name: "Range",
    description: "Increases the targeting radius",
    base_cost: 100,
    effect: Effect::Scale(1.1),
    max_level: 10,
};

const CRITICAL_CHANCE: Upgrade = Upgrade {
    name: "Critical chance",
    description: "Increases the chance of a critical hit",
    base_cost: 150,
    effect: Effect::Add(0.05),
    max_level: 5,
};

const CRITICAL_MULTIPLIER: Upgrade = Upgrade {
    name: "Critical multiplier",
    description: "Increases critical hit damage",
    base_cost: 200,
    effect: Effect::Add(0.3),
    max_level: 3,
};

/// Reasons an upgrade cannot be bought.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UpgradeError {
    /// The identifier names no upgrade.
    #[error("unknown upgrade `{0}`")]
    Unknown(String),
    /// The upgrade is already at its highest level.
    #[error("{kind} is already at max level {max_level}")]
    MaxLevel {
        /// Upgrade requested.
        kind: UpgradeKind,
        /// Highest purchasable level.
        max_level: u32,
    },
    /// The player cannot afford the next level.
    #[error("{kind} costs {cost} coins but only {coins} are available")]
    InsufficientCoins {
        /// Upgrade requested.
        kind: UpgradeKind,
        /// Price of the next level.
        cost: u64,
        /// Coins the player holds.
        coins: u64,
    },
}

/// Shop view of one upgrade for the player's current levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeInfo {
    /// Upgrade described.
    pub kind: UpgradeKind,
    /// Display name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Level owned by the player.
    pub current_level: u32,
    /// Highest purchasable level.
    pub max_level: u32,
    /// Price of the next level.
    pub next_cost: u64,
    /// Whether another level can be bought, coins aside.
    pub can_upgrade: bool,
}

/// Tracks purchased upgrade levels and applies purchases to the tower.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpgradeSystem {
    levels: BTreeMap<UpgradeKind, u32>,
}

impl UpgradeSystem {
    /// Creates a shop where no upgrade has been bought.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Level currently owned for `kind`.
    #[must_use]
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.levels.get(&kind).copied().unwrap_or(0)
    }

    /// Price of the next level of `kind`.
    #[must_use]
    pub fn upgrade_cost(&self, kind: UpgradeKind) -> u64 {
        kind.upgrade()
            .base_cost
            .saturating_mul(u64::from(self.level(kind)) + 1)
    }

    /// Checks whether `id` can be bought with `coins`, returning its price.
    pub fn can_upgrade(&self, id: &str, coins: u64) -> Result<u64, UpgradeError> {
        let kind: UpgradeKind = id.parse()?;
        self.check(kind, coins)
    }

    fn check(&self, kind: UpgradeKind, coins: u64) -> Result<u64, UpgradeError> {
        let max_level = kind.upgrade().max_level;
        if self.level(kind) >= max_level {
            return Err(UpgradeError::MaxLevel { kind, max_level });
        }

        let cost = self.upgrade_cost(kind);
        if coins < cost {
            return Err(UpgradeError::InsufficientCoins { kind, cost, coins });
        }
        Ok(cost)
    }

    /// Buys the next level of `id`, spending coins from `progress` and
    /// improving `stats`.
    ///
    /// Returns the new level. Nothing changes when the purchase is rejected.
    pub fn apply_upgrade(
        &mut self,
        id: &str,
        stats: &mut TowerStats,
        progress: &mut PlayerProgress,
    ) -> Result<u32, UpgradeError> {
        let kind: UpgradeKind = id.parse()?;
        let cost = self.check(kind, progress.coins)?;
        if !progress.spend_coins(cost) {
            return Err(UpgradeError::InsufficientCoins {
                kind,
                cost,
                coins: progress.coins,
            });
        }

        let level = self.levels.entry(kind).or_insert(0);
        *level += 1;
        let level = *level;

        kind.upgrade().effect.apply(stat_of(kind, stats));

        log::info!("upgrade {kind} bought to level {level} for {cost} coins");
        Ok(level)
    }

    /// Shop view of `id`.
    pub fn upgrade_info(&self, id: &str) -> Result<UpgradeInfo, UpgradeError> {
        let kind: UpgradeKind = id.parse()?;
        Ok(self.info(kind))
    }

    /// Shop view of every upgrade in catalogue order.
    #[must_use]
    pub fn all_upgrades_info(&self) -> Vec<UpgradeInfo> {
        UpgradeKind::ALL.into_iter().map(|kind| self.info(kind)).collect()
    }

    fn info(&self, kind: UpgradeKind) -> UpgradeInfo {
        let upgrade = kind.upgrade();
        let current_level = self.level(kind);
        UpgradeInfo {
            kind,
            name: upgrade.name,
            description: upgrade.description,
            current_level,
            max_level: upgrade.max_level,
            next_cost: self.upgrade_cost(kind),
            can_upgrade: current_level < upgrade.max_level,
        }
    }

    /// Owned levels keyed by upgrade identifier, every upgrade included.
    #[must_use]
    pub fn levels(&self) -> BTreeMap<String, u32> {
        UpgradeKind::ALL
            .into_iter()
            .map(|kind| (kind.id().to_owned(), self.level(kind)))
            .collect()
    }

    /// Applies every owned level to freshly created `stats`, as if each
    /// level had just been bought in order.
    pub fn apply_levels(&self, stats: &mut TowerStats) {
        for (&kind, &level) in &self.levels {
            let stat = stat_of(kind, stats);
            for _ in 0..level {
                kind.upgrade().effect.apply(stat);
            }
        }
    }

    /// Restores owned levels from a saved map.
    ///
    /// Unknown identifiers are skipped and levels are capped at each
    /// upgrade's maximum. Tower stats are not touched; see
    /// [`UpgradeSystem::apply_levels`].
    pub fn load_levels(&mut self, saved: &BTreeMap<String, u32>) {
        for (id, level) in saved {
            match id.parse::<UpgradeKind>() {
                Ok(kind) => {
                    let _ = self
                        .levels
                        .insert(kind, (*level).min(kind.upgrade().max_level));
                }
                Err(_) => log::warn!("ignoring saved level for unknown upgrade `{id}`"),
            }
        }
    }
}

fn stat_of(kind: UpgradeKind, stats: &mut TowerStats) -> &mut f32 {
    match kind {
        UpgradeKind::Damage => &mut stats.damage,
        UpgradeKind::AttackSpeed => &mut stats.attack_speed,
        UpgradeKind::AttackRange => &mut stats.attack_range,
        UpgradeKind::CriticalChance => &mut stats.critical_chance,
        UpgradeKind::CriticalMultiplier => &mut stats.critical_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_round_trip_through_parse() {
        for kind in UpgradeKind::ALL {
            assert_eq!(kind.id().parse::<UpgradeKind>(), Ok(kind));
        }
        assert_eq!(
            "armor".parse::<UpgradeKind>(),
            Err(UpgradeError::Unknown("armor".to_owned()))
        );
    }

    #[test]
    fn cost_grows_linearly_with_level() {
        let mut shop = UpgradeSystem::new();
        assert_eq!(shop.upgrade_cost(UpgradeKind::AttackRange), 100);
        let saved = BTreeMap::from([("attack_range".to_owned(), 3)]);
        shop.load_levels(&saved);
        assert_eq!(shop.upgrade_cost(UpgradeKind::AttackRange), 400);
    }

    #[test]
    fn effects_scale_or_add() {
        let mut value = 10.0;
        Effect::Scale(1.5).apply(&mut value);
        assert_eq!(value, 15.0);
        Effect::Add(0.5).apply(&mut value);
        assert_eq!(value, 15.5);
    }
}
