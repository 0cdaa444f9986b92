//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use ccg_kernel::cards::{
    Ability, ActivatedAbility, ActivationCost, CardDefinition, CardId, Keyword, StaticAbility, TriggeredAbility,
};
use ccg_kernel::core::{Action, EntityId, GameConfig, GameState, PlayerId};
use ccg_kernel::decision::{DecisionKind, Response};
use ccg_kernel::effects::{Effect, Filter, PlayerRef, TargetSpec};
use ccg_kernel::mana::{Color, CostReduction, ManaCost, ManaType};
use ccg_kernel::rules::{Engine, Step};
use ccg_kernel::stack::priority;
use ccg_kernel::triggers::{EventPattern, ObjectPattern};
use ccg_kernel::zones::ZoneId;

pub fn p(n: u8) -> PlayerId {
    PlayerId::new(n)
}

pub fn cost(text: &str) -> ManaCost {
    ManaCost::parse(text).expect("valid mana cost")
}

// =============================================================================
// Cards
// =============================================================================

pub fn land(name: &str, color: Color) -> Arc<CardDefinition> {
    Arc::new(CardDefinition::basic_land(CardId::new(100), name, name, ManaType::Colored(color)))
}

pub fn mountain() -> Arc<CardDefinition> {
    land("Mountain", Color::Red)
}

pub fn plains() -> Arc<CardDefinition> {
    land("Plains", Color::White)
}

pub fn vanilla(name: &str, power: i32, toughness: i32) -> CardDefinition {
    CardDefinition::creature(CardId::new(200), name, ManaCost::generic(2), power, toughness)
}

pub fn creature(name: &str, power: i32, toughness: i32) -> Arc<CardDefinition> {
    Arc::new(vanilla(name, power, toughness))
}

/// 3/2 first strike. When it enters, gain 2 life.
/// "{T}, Pay 1 life: deal 1 damage to any target."
pub fn duelist() -> Arc<CardDefinition> {
    Arc::new(
        CardDefinition::creature(CardId::new(1), "Sunlit Duelist", cost("{2}{W}"), 3, 2)
            .with_keyword(Keyword::FirstStrike)
            .with_ability(Ability::Triggered(TriggeredAbility::new(
                "gain 2 life",
                EventPattern::self_enters(),
                Effect::gain_life(PlayerRef::Controller, 2),
            )))
            .with_ability(Ability::Activated(
                ActivatedAbility::new("deal 1 damage", ActivationCost::tap().with_life(1), Effect::damage_target(0, 1))
                    .with_target(TargetSpec::any_target()),
            )),
    )
}

/// "Whenever another creature enters, you gain 1 life."
pub fn warden() -> Arc<CardDefinition> {
    Arc::new(
        CardDefinition::creature(CardId::new(2), "Soul Warden", cost("{W}"), 1, 1).with_ability(Ability::Triggered(
            TriggeredAbility::new(
                "gain 1 life",
                EventPattern::EntersBattlefield(ObjectPattern::Matching(Filter::creatures().other())),
                Effect::gain_life(PlayerRef::Controller, 1),
            ),
        )),
    )
}

/// Instant: deal 2 damage to any target.
pub fn shock() -> Arc<CardDefinition> {
    Arc::new(
        CardDefinition::instant(CardId::new(3), "Shock", cost("{R}"), Effect::damage_target(0, 2))
            .with_spell_target(TargetSpec::any_target()),
    )
}

/// Instant: target player gains `amount` life.
pub fn salve(amount: i32) -> Arc<CardDefinition> {
    Arc::new(
        CardDefinition::instant(CardId::new(4), "Salve", ManaCost::FREE, Effect::gain_life(PlayerRef::Target(0), amount))
            .with_spell_target(TargetSpec::player()),
    )
}

/// "Goblin spells you cast cost {1} less to cast."
pub fn warchief() -> Arc<CardDefinition> {
    Arc::new(
        CardDefinition::creature(CardId::new(5), "Goblin Warchief", cost("{1}{R}{R}"), 2, 2)
            .with_subtype("Goblin")
            .with_ability(Ability::Static(StaticAbility::cost_reduction(
                "Goblin spells you cast cost {1} less",
                CostReduction::generic(Filter::spells().with_subtype("Goblin").you_control(), 1),
            ))),
    )
}

pub fn goblin(name: &str, mana: &str) -> Arc<CardDefinition> {
    Arc::new(CardDefinition::creature(CardId::new(6), name, cost(mana), 2, 2).with_subtype("Goblin"))
}

// =============================================================================
// Game setup
// =============================================================================

/// Two players in player 0's first main phase, player 0 holding priority.
pub fn main_phase() -> GameState {
    main_phase_with(GameConfig::new(2))
}

pub fn main_phase_with(config: GameConfig) -> GameState {
    let mut state = GameState::new(config);
    state.turn.number = 1;
    state.turn.step = Step::Main1;
    priority::grant(&mut state, p(0));
    state
}

pub fn to_hand(state: &mut GameState, card: Arc<CardDefinition>, player: PlayerId) -> EntityId {
    state.add_card(card, player, ZoneId::hand(player))
}

pub fn to_library(state: &mut GameState, card: Arc<CardDefinition>, player: PlayerId, count: usize) {
    for _ in 0..count {
        state.add_card(Arc::clone(&card), player, ZoneId::library(player));
    }
}

pub fn lands(state: &mut GameState, card: Arc<CardDefinition>, player: PlayerId, count: usize) -> Vec<EntityId> {
    (0..count).map(|_| state.put_onto_battlefield(Arc::clone(&card), player)).collect()
}

/// The permanent with this name.
pub fn permanent(state: &GameState, name: &str) -> EntityId {
    state
        .battlefield()
        .into_iter()
        .find(|id| state.object(*id).is_some_and(|o| o.name() == name))
        .unwrap_or_else(|| panic!("no permanent named {name}"))
}

pub fn apply(state: &GameState, player: PlayerId, action: Action) -> GameState {
    let label = format!("{action:?}");
    Engine::apply(state, player, action).unwrap_or_else(|e| panic!("{label} by {player} failed: {e}"))
}

/// The priority holder passes.
pub fn pass(state: &GameState) -> GameState {
    let holder = state.priority_player().expect("someone holds priority");
    apply(state, holder, Action::PassPriority)
}

/// Pass until the current top of the stack has left it, or a decision is
/// pending.
pub fn resolve_top(state: &GameState) -> GameState {
    let top = state.stack.back().map(|o| o.id).expect("stack is not empty");
    let mut state = state.clone();
    while state.pending_decision().is_none() && state.stack.iter().any(|o| o.id == top) {
        state = pass(&state);
    }
    state
}

/// Pass until the step changes.
pub fn pass_step(state: &GameState) -> GameState {
    let step = state.step();
    let turn = state.turn.number;
    let mut state = state.clone();
    while state.step() == step && state.turn.number == turn && state.pending_decision().is_none() {
        state = pass(&state);
    }
    state
}

/// Answer the pending decision.
pub fn answer(state: &GameState, response: Response) -> GameState {
    let decision = state.pending_decision().expect("a decision is pending").clone();
    apply(state, decision.player, Action::respond(decision.id, response))
}

/// Items of the pending ordering decision.
pub fn ordering_items(state: &GameState) -> Vec<EntityId> {
    match state.pending_decision().map(|d| &d.kind) {
        Some(DecisionKind::OrderObjects { items }) => items.clone(),
        other => panic!("expected an ordering decision, got {other:?}"),
    }
}
