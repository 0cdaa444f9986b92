//! Game configuration.
//!
//! `GameConfig` carries the numeric knobs of a game (seats, life, hand
//! sizes, land drops, seed). Card content is not configuration; it arrives
//! as `CardDefinition` values.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Complete game configuration.
///
/// ```
/// use ccg_kernel::core::{GameConfig, PlayerId};
///
/// let config = GameConfig::new(2)
///     .with_starting_life(30)
///     .with_starting_player(PlayerId::new(1))
///     .with_seed(99);
/// assert_eq!(config.starting_life, 30);
/// assert_eq!(config.max_hand_size, 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players (1-255).
    pub player_count: usize,

    pub starting_life: i32,

    /// Cards drawn by each player before the first turn.
    pub opening_hand_size: usize,

    /// Hand size enforced during cleanup.
    pub max_hand_size: usize,

    /// Land drops per turn.
    pub lands_per_turn: u32,

    /// Whose turn is first.
    pub starting_player: PlayerId,

    /// The starting player skips the draw of the first turn.
    pub skip_first_draw: bool,

    /// Seed for library shuffles.
    pub seed: u64,
}

impl GameConfig {
    /// Configuration with conventional defaults for `player_count` seats.
    pub fn new(player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            starting_life: 20,
            opening_hand_size: 7,
            max_hand_size: 7,
            lands_per_turn: 1,
            starting_player: PlayerId::new(0),
            skip_first_draw: true,
            seed: 0,
        }
    }

    #[must_use]
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    #[must_use]
    pub fn with_opening_hand_size(mut self, size: usize) -> Self {
        self.opening_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.max_hand_size = size;
        self
    }

    #[must_use]
    pub fn with_lands_per_turn(mut self, lands: u32) -> Self {
        self.lands_per_turn = lands;
        self
    }

    #[must_use]
    pub fn with_starting_player(mut self, player: PlayerId) -> Self {
        self.starting_player = player;
        self
    }

    #[must_use]
    pub fn with_first_draw(mut self) -> Self {
        self.skip_first_draw = false;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.player_count, 2);
        assert_eq!(config.starting_life, 20);
        assert_eq!(config.opening_hand_size, 7);
        assert_eq!(config.lands_per_turn, 1);
        assert!(config.skip_first_draw);
    }

    #[test]
    fn test_builder() {
        let config = GameConfig::new(4)
            .with_opening_hand_size(0)
            .with_max_hand_size(5)
            .with_lands_per_turn(2)
            .with_first_draw();

        assert_eq!(config.player_count, 4);
        assert_eq!(config.opening_hand_size, 0);
        assert_eq!(config.max_hand_size, 5);
        assert_eq!(config.lands_per_turn, 2);
        assert!(!config.skip_first_draw);
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig::new(3).with_seed(12);
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    #[should_panic(expected = "Must have at least 1 player")]
    fn test_zero_players() {
        GameConfig::new(0);
    }
}
