//! Identity for everything that can be referenced by an effect.
//!
//! Players and game objects share one id space so that "any target"
//! requirements, damage recipients and event fields can hold either.
//!
//! ## ID Layout
//!
//! - `0..player_count`: players
//! - `player_count..`: game objects, allocated monotonically and never reused
//!
//! A card that changes zones becomes a new object with a fresh id, so a stale
//! id held by a stack object or continuation simply stops resolving.
//!
//! ```
//! use ccg_kernel::core::{EntityId, PlayerId};
//!
//! let player_count = 2;
//! let p1 = EntityId::player(PlayerId::new(1));
//! assert_eq!(p1.as_player(player_count), Some(PlayerId::new(1)));
//!
//! let bear = EntityId(7);
//! assert!(bear.is_object(player_count));
//! ```

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Identifier of a player or game object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// First id available for game objects.
    #[must_use]
    pub const fn first_object(player_count: usize) -> u32 {
        player_count as u32
    }

    /// Entity id of a player.
    #[must_use]
    pub const fn player(id: PlayerId) -> Self {
        Self(id.0 as u32)
    }

    #[must_use]
    pub const fn is_player(self, player_count: usize) -> bool {
        self.0 < player_count as u32
    }

    #[must_use]
    pub const fn is_object(self, player_count: usize) -> bool {
        !self.is_player(player_count)
    }

    /// The player this id names, if it names one.
    #[must_use]
    pub fn as_player(self, player_count: usize) -> Option<PlayerId> {
        if self.is_player(player_count) {
            Some(PlayerId::new(self.0 as u8))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<PlayerId> for EntityId {
    fn from(player: PlayerId) -> Self {
        Self::player(player)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
