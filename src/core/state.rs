//! The authoritative game state.
//!
//! `GameState` is a plain value. Every transition clones it (cheap: the
//! collections are `im` persistent structures) and mutates the clone, so a
//! caller holding an old state keeps an unchanged snapshot.
//!
//! ## Contents
//!
//! - Objects and their zones
//! - Stored continuous effects (projection is derived, never stored)
//! - The stack and the queue of triggers waiting to be put on it
//! - Turn, step and priority
//! - At most one pending decision
//! - The event log and the action history
//!
//! ## Identity counters
//!
//! Entity ids, timestamps and decision ids are allocated from counters in
//! the state itself, so replaying the same actions from the same state
//! yields identical ids.

use std::sync::Arc;

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::action::ActionRecord;
use super::config::GameConfig;
use super::entity::EntityId;
use super::player::{PlayerId, PlayerMap, PlayerState};
use super::rng::{GameRng, GameRngState};
use crate::cards::{CardDefinition, GameObject};
use crate::decision::{Decision, DecisionId, DecisionRequest, PendingDecision, ResumePoint};
use crate::layers::{project, ContinuousEffect, EffectId, ProjectedObject, Projection};
use crate::rules::{CombatState, Step, TurnState};
use crate::stack::StackObject;
use crate::triggers::{GameEvent, PendingTrigger};
use crate::zones::{Zone, ZoneId, ZoneManager, ZonePosition};

/// How a finished game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(PlayerId),
    /// Every remaining player lost simultaneously.
    Draw,
}

impl GameResult {
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Encode(#[source] bincode::Error),

    #[error("snapshot decoding failed: {0}")]
    Decode(#[source] bincode::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    pub turn: TurnState,
    pub players: PlayerMap<PlayerState>,
    pub objects: OrdMap<EntityId, GameObject>,
    pub zones: ZoneManager,
    /// Continuous effects created by resolved spells and abilities.
    pub effects: Vector<ContinuousEffect>,
    /// Bottom to top.
    pub stack: Vector<StackObject>,
    pub pending: Option<PendingDecision>,
    /// Triggered abilities waiting to be put on the stack, in placement
    /// order.
    pub triggers: Vector<PendingTrigger>,
    pub combat: Option<CombatState>,
    pub events: Vector<GameEvent>,
    /// Events before this index have been scanned for triggers.
    pub trigger_cursor: usize,
    /// Projected objects as they last existed on the battlefield. Cleared
    /// whenever nothing in flight can still refer to them.
    pub last_known: OrdMap<EntityId, ProjectedObject>,
    pub rng: GameRngState,
    pub result: Option<GameResult>,
    pub history: Vector<ActionRecord>,
    next_entity: u32,
    next_timestamp: u64,
    next_decision: u64,
}

impl GameState {
    /// An empty game: no cards anywhere, turn 1 not yet begun.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let player_count = config.player_count;
        let starting_life = config.starting_life;
        Self {
            turn: TurnState::new(config.starting_player),
            players: PlayerMap::new(player_count, |_| PlayerState::new(starting_life)),
            objects: OrdMap::new(),
            zones: ZoneManager::new(),
            effects: Vector::new(),
            stack: Vector::new(),
            pending: None,
            triggers: Vector::new(),
            combat: None,
            events: Vector::new(),
            trigger_cursor: 0,
            last_known: OrdMap::new(),
            rng: GameRngState::new(config.seed),
            result: None,
            history: Vector::new(),
            next_entity: EntityId::first_object(player_count),
            next_timestamp: 1,
            next_decision: 1,
            config,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.config.player_count
    }

    // === Identity ===

    pub fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    pub fn next_timestamp(&mut self) -> u64 {
        let ts = self.next_timestamp;
        self.next_timestamp += 1;
        ts
    }

    /// A fresh effect id. Ids share the timestamp counter, so an effect's
    /// id orders it against object timestamps.
    pub fn next_effect_id(&mut self) -> EffectId {
        EffectId(self.next_timestamp())
    }

    /// Forget last-known information once the stack, the trigger queue and
    /// the unscanned events are all empty and no decision is pending.
    pub fn prune_last_known(&mut self) {
        let settled = self.stack.is_empty()
            && self.triggers.is_empty()
            && self.pending.is_none()
            && self.trigger_cursor >= self.events.len();
        if settled && !self.last_known.is_empty() {
            tracing::trace!(entries = self.last_known.len(), "last-known information pruned");
            self.last_known.clear();
        }
    }

    // === Objects ===

    /// Create an object for `card` in `zone`, on top.
    pub fn add_card(&mut self, card: Arc<CardDefinition>, owner: PlayerId, zone: ZoneId) -> EntityId {
        let id = self.alloc_entity();
        let timestamp = self.next_timestamp();
        self.objects.insert(id, GameObject::new(id, card, owner, timestamp));
        self.zones.add(id, zone, ZonePosition::Top);
        id
    }

    /// Put a permanent directly onto the battlefield, ready to use.
    pub fn put_onto_battlefield(&mut self, card: Arc<CardDefinition>, controller: PlayerId) -> EntityId {
        self.add_card(card, controller, ZoneId::BATTLEFIELD)
    }

    #[must_use]
    pub fn object(&self, id: EntityId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// Objects in every zone of a kind, bottom to top. Per-player zones
    /// are visited in player order.
    #[must_use]
    pub fn objects_in(&self, zone: Zone) -> Vec<EntityId> {
        if zone.is_per_player() {
            PlayerId::all(self.player_count())
                .flat_map(|p| self.zones.cards(ZoneId::for_owner(zone, p)))
                .collect()
        } else {
            self.zones.cards(ZoneId { zone, owner: None }).collect()
        }
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> Vec<EntityId> {
        self.zones.cards(ZoneId::hand(player)).collect()
    }

    /// Bottom to top.
    #[must_use]
    pub fn library(&self, player: PlayerId) -> Vec<EntityId> {
        self.zones.cards(ZoneId::library(player)).collect()
    }

    #[must_use]
    pub fn graveyard(&self, player: PlayerId) -> Vec<EntityId> {
        self.zones.cards(ZoneId::graveyard(player)).collect()
    }

    #[must_use]
    pub fn battlefield(&self) -> Vec<EntityId> {
        self.objects_in(Zone::Battlefield)
    }

    /// Permanents controlled by `player`, judged by `view`.
    #[must_use]
    pub fn permanents_of(&self, view: &Projection, player: PlayerId) -> Vec<EntityId> {
        self.battlefield()
            .into_iter()
            .filter(|id| view.controller(*id) == Some(player))
            .collect()
    }

    pub fn shuffle_library(&mut self, player: PlayerId) {
        let mut rng = GameRng::from_state(&self.rng);
        self.zones.shuffle(ZoneId::library(player), &mut rng);
        self.rng = rng.state();
    }

    /// Current characteristics of everything.
    #[must_use]
    pub fn project(&self) -> Projection {
        project(self)
    }

    // === Turn ===

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.turn.active
    }

    #[must_use]
    pub fn priority_player(&self) -> Option<PlayerId> {
        self.turn.priority
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.turn.step
    }

    /// Players still in the game, in seat order.
    pub fn players_in_game(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().filter(|(_, p)| p.in_game()).map(|(id, _)| id)
    }

    /// Players still in the game in APNAP order.
    #[must_use]
    pub fn apnap(&self) -> Vec<PlayerId> {
        PlayerId::apnap(self.turn.active, self.player_count())
            .filter(|p| self.players[*p].in_game())
            .collect()
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    // === Decisions ===

    #[must_use]
    pub fn pending_decision(&self) -> Option<&Decision> {
        self.pending.as_ref().map(|p| &p.decision)
    }

    /// Make `request` the pending decision.
    pub fn ask(&mut self, request: DecisionRequest, resume: ResumePoint) -> DecisionId {
        let id = DecisionId(self.next_decision);
        self.next_decision += 1;
        tracing::debug!(%id, player = %request.player, prompt = %request.prompt, "decision pending");
        self.pending = Some(PendingDecision {
            decision: Decision::from_request(id, request),
            resume,
        });
        id
    }

    // === Events ===

    pub fn emit(&mut self, event: GameEvent) {
        tracing::trace!(?event, "event");
        self.events.push_back(event);
    }

    /// Everything that has happened, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    // === Snapshots ===

    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(SnapshotError::Encode)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, SnapshotError> {
        bincode::deserialize(bytes).map_err(SnapshotError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;
    use crate::mana::ManaCost;

    fn bear() -> Arc<CardDefinition> {
        Arc::new(CardDefinition::creature(CardId::new(1), "Bear", ManaCost::parse("{1}{G}").unwrap(), 2, 2))
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(GameConfig::new(3).with_starting_life(25));
        assert_eq!(state.player_count(), 3);
        assert_eq!(state.players[PlayerId::new(2)].life, 25);
        assert!(state.pending_decision().is_none());
        assert!(!state.is_over());
    }

    #[test]
    fn test_object_ids_start_after_players() {
        let mut state = GameState::new(GameConfig::new(2));
        let first = state.add_card(bear(), PlayerId::new(0), ZoneId::hand(PlayerId::new(0)));
        let second = state.add_card(bear(), PlayerId::new(1), ZoneId::hand(PlayerId::new(1)));
        assert_eq!(first, EntityId(2));
        assert_eq!(second, EntityId(3));
        assert!(state.object(second).unwrap().timestamp > state.object(first).unwrap().timestamp);
    }

    #[test]
    fn test_objects_in_visits_players_in_order() {
        let mut state = GameState::new(GameConfig::new(2));
        let b = state.add_card(bear(), PlayerId::new(1), ZoneId::hand(PlayerId::new(1)));
        let a = state.add_card(bear(), PlayerId::new(0), ZoneId::hand(PlayerId::new(0)));
        assert_eq!(state.objects_in(Zone::Hand), vec![a, b]);
        assert_eq!(state.hand(PlayerId::new(1)), vec![b]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut state = GameState::new(GameConfig::new(2));
        let snapshot = state.clone();
        state.put_onto_battlefield(bear(), PlayerId::new(0));
        assert_eq!(state.battlefield().len(), 1);
        assert!(snapshot.battlefield().is_empty());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut state = GameState::new(GameConfig::new(2).with_seed(5));
        state.put_onto_battlefield(bear(), PlayerId::new(0));
        let bytes = state.encode().unwrap();
        let back = GameState::decode(&bytes).unwrap();
        assert_eq!(state, back);
    }

    #[test]
    fn test_shuffle_advances_rng() {
        let mut state = GameState::new(GameConfig::new(2).with_seed(1));
        for _ in 0..10 {
            state.add_card(bear(), PlayerId::new(0), ZoneId::library(PlayerId::new(0)));
        }
        let before = state.rng.clone();
        state.shuffle_library(PlayerId::new(0));
        assert_ne!(state.rng, before);
        assert_eq!(state.library(PlayerId::new(0)).len(), 10);
    }

    #[test]
    fn test_game_result() {
        assert!(GameResult::Winner(PlayerId::new(1)).is_winner(PlayerId::new(1)));
        assert!(!GameResult::Draw.is_winner(PlayerId::new(0)));
    }
}
