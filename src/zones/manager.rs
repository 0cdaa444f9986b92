//! Zone manager for object locations and movement.
//!
//! The `ZoneManager` tracks which zone every object is in and the order of
//! each zone's contents. Every zone is ordered; for libraries the last index
//! is the top card, for the stack zone the last index is the most recent
//! spell.
//!
//! Backed by persistent `im` collections so cloning a `GameState` is cheap
//! and the old snapshot is unaffected by later moves.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameRng, PlayerId};

/// The kind of zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
}

impl Zone {
    /// Libraries, hands and graveyards belong to a player.
    #[must_use]
    pub const fn is_per_player(self) -> bool {
        matches!(self, Zone::Library | Zone::Hand | Zone::Graveyard)
    }

    #[must_use]
    pub const fn is_public(self) -> bool {
        !matches!(self, Zone::Library | Zone::Hand)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Stack => "stack",
            Zone::Exile => "exile",
        };
        f.write_str(name)
    }
}

/// A concrete zone: the kind plus its owner for per-player zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId {
    pub zone: Zone,
    pub owner: Option<PlayerId>,
}

impl ZoneId {
    pub const BATTLEFIELD: ZoneId = ZoneId { zone: Zone::Battlefield, owner: None };
    pub const STACK: ZoneId = ZoneId { zone: Zone::Stack, owner: None };
    pub const EXILE: ZoneId = ZoneId { zone: Zone::Exile, owner: None };

    #[must_use]
    pub const fn library(player: PlayerId) -> Self {
        Self { zone: Zone::Library, owner: Some(player) }
    }

    #[must_use]
    pub const fn hand(player: PlayerId) -> Self {
        Self { zone: Zone::Hand, owner: Some(player) }
    }

    #[must_use]
    pub const fn graveyard(player: PlayerId) -> Self {
        Self { zone: Zone::Graveyard, owner: Some(player) }
    }

    /// The zone of kind `zone` that an object owned by `owner` goes to.
    #[must_use]
    pub const fn for_owner(zone: Zone, owner: PlayerId) -> Self {
        if zone.is_per_player() {
            Self { zone, owner: Some(owner) }
        } else {
            Self { zone, owner: None }
        }
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.owner {
            Some(owner) => write!(f, "{owner}'s {}", self.zone),
            None => write!(f, "{}", self.zone),
        }
    }
}

/// Position for inserting an object into a zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    #[default]
    Top,
    Bottom,
    /// Insert at a specific index (0 = bottom).
    Index(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneManager {
    locations: OrdMap<EntityId, ZoneId>,
    contents: OrdMap<ZoneId, Vector<EntityId>>,
}

impl ZoneManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `entity` in `zone`. An entity already tracked is moved.
    pub fn add(&mut self, entity: EntityId, zone: ZoneId, position: ZonePosition) {
        self.remove(entity);
        self.locations.insert(entity, zone);
        let order = self.contents.entry(zone).or_insert_with(Vector::new);
        match position {
            ZonePosition::Top => order.push_back(entity),
            ZonePosition::Bottom => order.push_front(entity),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, entity);
            }
        }
    }

    /// Stop tracking `entity`; returns the zone it was in.
    pub fn remove(&mut self, entity: EntityId) -> Option<ZoneId> {
        let zone = self.locations.remove(&entity)?;
        if let Some(order) = self.contents.get_mut(&zone) {
            order.retain(|e| *e != entity);
        }
        Some(zone)
    }

    #[must_use]
    pub fn zone_of(&self, entity: EntityId) -> Option<ZoneId> {
        self.locations.get(&entity).copied()
    }

    #[must_use]
    pub fn is_in(&self, entity: EntityId, zone: Zone) -> bool {
        self.zone_of(entity).is_some_and(|z| z.zone == zone)
    }

    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.locations.contains_key(&entity)
    }

    /// Contents of `zone`, bottom to top.
    pub fn cards(&self, zone: ZoneId) -> impl Iterator<Item = EntityId> + '_ {
        self.contents.get(&zone).into_iter().flat_map(|v| v.iter().copied())
    }

    #[must_use]
    pub fn len(&self, zone: ZoneId) -> usize {
        self.contents.get(&zone).map_or(0, Vector::len)
    }

    #[must_use]
    pub fn is_empty(&self, zone: ZoneId) -> bool {
        self.len(zone) == 0
    }

    #[must_use]
    pub fn top(&self, zone: ZoneId) -> Option<EntityId> {
        self.contents.get(&zone)?.last().copied()
    }

    pub fn shuffle(&mut self, zone: ZoneId, rng: &mut GameRng) {
        if let Some(order) = self.contents.get_mut(&zone) {
            let mut cards: Vec<EntityId> = order.iter().copied().collect();
            rng.shuffle(&mut cards);
            *order = cards.into_iter().collect();
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.locations.len()
    }
}
