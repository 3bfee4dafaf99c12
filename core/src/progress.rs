//! Session-scoped economy and the flat record exchanged with save services.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Coins a fresh session starts with.
const STARTING_COINS: u64 = 100;
/// Coins paid per cleared wave when a battle ends in victory.
const VICTORY_REWARD_PER_WAVE: u64 = 10;

/// Player economy for a single session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    /// Spendable soft currency.
    pub coins: u64,
    /// Premium currency awarded for victories.
    pub diamonds: u64,
    /// Accumulated score.
    pub score: u64,
    /// Wave the player is currently on.
    pub current_wave: u32,
    /// Enemies defeated during the session.
    pub enemies_defeated: u64,
}

impl PlayerProgress {
    /// Credits the provided amount of coins.
    pub fn add_coins(&mut self, amount: u64) {
        self.coins = self.coins.saturating_add(amount);
        log::debug!("added {amount} coins, total {}", self.coins);
    }

    /// Spends coins when the balance covers the amount.
    ///
    /// Returns `false` and leaves the balance untouched otherwise.
    #[must_use]
    pub fn spend_coins(&mut self, amount: u64) -> bool {
        if self.coins < amount {
            return false;
        }
        self.coins -= amount;
        log::debug!("spent {amount} coins, remaining {}", self.coins);
        true
    }

    /// Credits the provided amount of diamonds.
    pub fn add_diamonds(&mut self, amount: u64) {
        self.diamonds = self.diamonds.saturating_add(amount);
    }

    /// Adds points to the score.
    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            coins: STARTING_COINS,
            diamonds: 0,
            score: 0,
            current_wave: 1,
            enemies_defeated: 0,
        }
    }
}

/// Top-level screens the game moves between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GameStateKind {
    /// Entry screen between battles.
    #[default]
    Lobby,
    /// A battle is being simulated.
    Battle,
    /// The upgrade shop is open.
    Upgrade,
    /// The session is over.
    GameOver,
}

/// Session state shared by the battle, the wave scheduler and the shop.
#[derive(Clone, Debug, Default)]
pub struct GameState {
    kind: GameStateKind,
    /// Economy of the running session.
    pub player_progress: PlayerProgress,
    game_active: bool,
    victory: bool,
}

impl GameState {
    /// Creates a game state parked in the lobby.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen currently active.
    #[must_use]
    pub const fn kind(&self) -> GameStateKind {
        self.kind
    }

    /// Reports whether a battle is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.game_active
    }

    /// Outcome of the most recently finished battle.
    #[must_use]
    pub const fn victory(&self) -> bool {
        self.victory
    }

    /// Switches to the provided screen.
    pub fn change_state(&mut self, kind: GameStateKind) {
        log::info!("game state changed: {:?} -> {:?}", self.kind, kind);
        self.kind = kind;
    }

    /// Starts a new battle with fresh progress. Only valid from the lobby.
    ///
    /// Returns whether a battle was started.
    pub fn start_battle(&mut self) -> bool {
        if self.kind != GameStateKind::Lobby {
            return false;
        }
        self.change_state(GameStateKind::Battle);
        self.game_active = true;
        self.victory = false;
        self.player_progress = PlayerProgress::default();
        log::info!("new battle started");
        true
    }

    /// Ends the running battle and returns to the lobby.
    ///
    /// Victories pay coins proportional to the wave reached plus a diamond.
    pub fn end_battle(&mut self, victory: bool) {
        self.victory = victory;
        self.game_active = false;

        if victory {
            let reward =
                u64::from(self.player_progress.current_wave) * VICTORY_REWARD_PER_WAVE;
            self.player_progress.add_coins(reward);
            self.player_progress.add_diamonds(1);
            log::info!("battle won, reward {reward} coins and 1 diamond");
        } else {
            log::info!("battle lost, tower destroyed");
        }

        self.change_state(GameStateKind::Lobby);
    }
}

/// Flat record exchanged with external save and load services.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Spendable soft currency.
    pub coins: u64,
    /// Premium currency.
    pub diamonds: u64,
    /// Accumulated score.
    pub score: u64,
    /// Wave the player had reached.
    pub current_wave: u32,
    /// Enemies defeated.
    pub enemies_defeated: u64,
    /// Purchased level per upgrade identifier.
    #[serde(default)]
    pub upgrades: BTreeMap<String, u32>,
}

impl SaveRecord {
    /// Captures the persisted subset of a session.
    #[must_use]
    pub fn capture(progress: &PlayerProgress, upgrades: BTreeMap<String, u32>) -> Self {
        Self {
            coins: progress.coins,
            diamonds: progress.diamonds,
            score: progress.score,
            current_wave: progress.current_wave,
            enemies_defeated: progress.enemies_defeated,
            upgrades,
        }
    }

    /// Rebuilds the economy stored in the record.
    #[must_use]
    pub fn restore_progress(&self) -> PlayerProgress {
        PlayerProgress {
            coins: self.coins,
            diamonds: self.diamonds,
            score: self.score,
            current_wave: self.current_wave,
            enemies_defeated: self.enemies_defeated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spend_fails_without_mutation_when_short() {
        let mut progress = PlayerProgress {
            coins: 40,
            ..PlayerProgress::default()
        };
        assert!(!progress.spend_coins(41));
        assert_eq!(progress.coins, 40);
    }

    #[test]
    fn spend_deducts_exact_amount() {
        let mut progress = PlayerProgress::default();
        assert!(progress.spend_coins(100));
        assert_eq!(progress.coins, 0);
        assert!(progress.spend_coins(0));
        assert!(!progress.spend_coins(1));
    }

    #[test]
    fn battle_lifecycle_returns_to_lobby() {
        let mut state = GameState::new();
        assert!(state.start_battle());
        assert_eq!(state.kind(), GameStateKind::Battle);
        assert!(state.is_active());
        assert!(!state.start_battle(), "battle already running");

        state.player_progress.current_wave = 4;
        state.end_battle(true);
        assert_eq!(state.kind(), GameStateKind::Lobby);
        assert!(!state.is_active());
        assert!(state.victory());
        assert_eq!(state.player_progress.coins, 140);
        assert_eq!(state.player_progress.diamonds, 1);
    }

    #[test]
    fn defeat_pays_nothing() {
        let mut state = GameState::new();
        let _ = state.start_battle();
        state.end_battle(false);
        assert!(!state.victory());
        assert_eq!(state.player_progress.coins, 100);
        assert_eq!(state.player_progress.diamonds, 0);
    }

    #[test]
    fn save_record_round_trips_through_json() {
        let progress = PlayerProgress {
            coins: 12,
            diamonds: 3,
            score: 900,
            current_wave: 7,
            enemies_defeated: 81,
        };
        let mut upgrades = BTreeMap::new();
        let _ = upgrades.insert("damage".to_owned(), 2);
        let record = SaveRecord::capture(&progress, upgrades);

        let json = serde_json::to_string(&record).expect("serialize");
        let restored: SaveRecord = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored, record);
        assert_eq!(restored.restore_progress(), progress);
    }
}
