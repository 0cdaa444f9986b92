//! Players, per-player storage and per-player game data.
//!
//! ## PlayerId
//!
//! 0-based seat index. Turn order is seat order.
//!
//! ## PlayerMap
//!
//! `Vec`-backed storage indexable by `PlayerId`.
//!
//! ## PlayerState
//!
//! Life total, mana pool and the per-turn counters the rules consult.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::mana::ManaPool;

/// Seat index of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All seats of a game with `player_count` players.
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// The next seat in turn order, wrapping around.
    #[must_use]
    pub fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + 1) % player_count) as u8)
    }

    /// Seats in APNAP order: `active` first, then the others in turn order.
    ///
    /// ```
    /// use ccg_kernel::core::PlayerId;
    ///
    /// let order: Vec<_> = PlayerId::apnap(PlayerId::new(2), 4).collect();
    /// assert_eq!(order, vec![PlayerId(2), PlayerId(3), PlayerId(0), PlayerId(1)]);
    /// ```
    pub fn apnap(active: PlayerId, player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count).map(move |offset| PlayerId(((active.index() + offset) % player_count) as u8))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Build one entry per player from a factory.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            data: PlayerId::all(player_count).map(factory).collect(),
        }
    }

    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (PlayerId(i as u8), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data.iter_mut().enumerate().map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// Why a player left the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// Life total reached 0 or less.
    ZeroLife,
    /// Attempted to draw from an empty library.
    DrewFromEmptyLibrary,
}

impl std::fmt::Display for LossReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroLife => write!(f, "life total reached zero"),
            Self::DrewFromEmptyLibrary => write!(f, "drew from an empty library"),
        }
    }
}

/// Mutable per-player game data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub life: i32,
    pub mana_pool: ManaPool,
    /// Lands played during the current turn.
    pub lands_played: u32,
    /// Set when a draw was attempted with an empty library; checked as a
    /// state-based action.
    pub drew_from_empty: bool,
    /// `Some` once the player has lost.
    pub lost: Option<LossReason>,
}

impl PlayerState {
    #[must_use]
    pub fn new(life: i32) -> Self {
        Self {
            life,
            mana_pool: ManaPool::default(),
            lands_played: 0,
            drew_from_empty: false,
            lost: None,
        }
    }

    #[must_use]
    pub fn in_game(&self) -> bool {
        self.lost.is_none()
    }
}
