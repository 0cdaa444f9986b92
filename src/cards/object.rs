//! Game objects: a card definition placed in a zone.
//!
//! A `GameObject` carries only the per-instance components (owner,
//! controller, tapped state, damage, counters). What the object *is* comes
//! from its shared `CardDefinition` plus the layer projection; nothing here
//! caches projected values.
//!
//! Moving an object between zones ends it. The zone manager hands out a new
//! `EntityId` and a fresh `GameObject` for the destination, so stale
//! references (an aura's `attached_to`, a chosen target) stop resolving.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

use super::definition::CardDefinition;

/// Counter kinds tracked on permanents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    PlusOne,
    MinusOne,
    Charge,
    Loyalty,
}

impl std::fmt::Display for CounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CounterKind::PlusOne => write!(f, "+1/+1"),
            CounterKind::MinusOne => write!(f, "-1/-1"),
            CounterKind::Charge => write!(f, "charge"),
            CounterKind::Loyalty => write!(f, "loyalty"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameObject {
    pub id: EntityId,
    pub card: Arc<CardDefinition>,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub tapped: bool,
    /// Damage marked this turn.
    pub damage: u32,
    /// Marked damage included a deathtouch source.
    pub deathtouch_damage: bool,
    pub counters: BTreeMap<CounterKind, u32>,
    /// Time the object entered its current zone.
    pub timestamp: u64,
    pub summoning_sick: bool,
    pub attached_to: Option<EntityId>,
    pub is_token: bool,
    /// Activated ability index -> turn it was last activated.
    pub activations: BTreeMap<usize, u32>,
}

impl GameObject {
    #[must_use]
    pub fn new(id: EntityId, card: Arc<CardDefinition>, owner: PlayerId, timestamp: u64) -> Self {
        Self {
            id,
            card,
            owner,
            controller: owner,
            tapped: false,
            damage: 0,
            deathtouch_damage: false,
            counters: BTreeMap::new(),
            timestamp,
            summoning_sick: false,
            attached_to: None,
            is_token: false,
            activations: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn counter(&self, kind: CounterKind) -> u32 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    pub fn add_counters(&mut self, kind: CounterKind, amount: u32) {
        if amount > 0 {
            *self.counters.entry(kind).or_insert(0) += amount;
        }
    }

    /// Remove up to `amount` counters; returns how many were removed.
    pub fn remove_counters(&mut self, kind: CounterKind, amount: u32) -> u32 {
        let Some(current) = self.counters.get_mut(&kind) else {
            return 0;
        };
        let removed = amount.min(*current);
        *current -= removed;
        if *current == 0 {
            self.counters.remove(&kind);
        }
        removed
    }

    /// Net power/toughness change from +1/+1 and -1/-1 counters.
    #[must_use]
    pub fn counter_bonus(&self) -> i32 {
        let plus = i32::try_from(self.counter(CounterKind::PlusOne)).unwrap_or(i32::MAX);
        let minus = i32::try_from(self.counter(CounterKind::MinusOne)).unwrap_or(i32::MAX);
        plus.saturating_sub(minus)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.card.characteristics.name
    }

    #[must_use]
    pub fn activated_on_turn(&self, ability: usize, turn: u32) -> bool {
        self.activations.get(&ability) == Some(&turn)
    }
}
