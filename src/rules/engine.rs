//! The game engine: the single entry point that moves a game forward.
//!
//! `Engine::apply` takes a state, a player and an action and returns the
//! next state or the reason the action is illegal. The input state is
//! never touched. Between actions the engine runs everything that happens
//! without a player's input:
//!
//! 1. State-based actions, repeated until nothing changes
//! 2. Triggered abilities, gathered and put on the stack in APNAP order
//! 3. Priority for the active player, or the next step when a step has
//!    no priority
//!
//! The loop stops as soon as a player has something to do: priority, a
//! combat declaration, or a pending decision.
//!
//! ## Implementation Notes
//!
//! - Every transition is deterministic; shuffles draw from the seeded RNG
//!   stored in the state
//! - A rejected action returns `Err` and the caller keeps its old state
//! - A response to a decision must name the pending decision's id

use std::sync::Arc;

use crate::cards::CardDefinition;
use crate::core::error::{DeclarationKind, EngineError, IllegalAction, InvariantViolation};
use crate::core::{Action, ActionRecord, GameConfig, GameState, PlayerId};
use crate::decision::{DecisionId, Response, ResumePoint};
use crate::stack::{self, priority, PassOutcome};
use crate::triggers;
use crate::zones::ZoneId;

use super::turn::{self, Step};
use super::{actions, casting, combat, sba};

/// Entry points for building and advancing games.
#[derive(Clone, Copy, Debug, Default)]
pub struct Engine;

impl Engine {
    /// A game before its first turn: each player's deck shuffled into
    /// their library and opening hands drawn.
    ///
    /// `decks[i]` belongs to player `i`; missing decks leave a player
    /// with an empty library.
    #[must_use]
    pub fn new_game(config: GameConfig, decks: &[Vec<Arc<CardDefinition>>]) -> GameState {
        let mut state = GameState::new(config);
        for player in PlayerId::all(state.player_count()) {
            let Some(deck) = decks.get(player.index()) else {
                continue;
            };
            for card in deck {
                state.add_card(Arc::clone(card), player, ZoneId::library(player));
            }
            state.shuffle_library(player);
        }
        for player in PlayerId::all(state.player_count()) {
            let available = state.library(player).len();
            let count = state.config.opening_hand_size.min(available);
            actions::draw(&mut state, player, u32::try_from(count).unwrap_or(u32::MAX));
        }
        state.trigger_cursor = state.events.len();
        tracing::info!(players = state.player_count(), seed = state.config.seed, "new game");
        state
    }

    /// Begin the first turn and run until a player has something to do.
    #[must_use]
    pub fn start(mut state: GameState) -> GameState {
        let first = state.config.starting_player;
        turn::begin_turn(&mut state, first);
        run(&mut state);
        state
    }

    /// Apply `action` by `player` to a copy of `state`.
    pub fn apply(state: &GameState, player: PlayerId, action: Action) -> Result<GameState, EngineError> {
        let mut next = state.clone();
        apply_in_place(&mut next, player, &action)?;
        let sequence = u32::try_from(next.history.len()).unwrap_or(u32::MAX);
        let turn = next.turn.number;
        next.history.push_back(ActionRecord::new(player, action, turn, sequence));
        Ok(next)
    }

    /// The player the game is waiting on, if any.
    #[must_use]
    pub fn waiting_on(state: &GameState) -> Option<PlayerId> {
        if state.is_over() {
            return None;
        }
        if let Some(decision) = state.pending_decision() {
            return Some(decision.player);
        }
        if let Some((_, player)) = state.turn.awaiting {
            return Some(player);
        }
        state.turn.priority
    }
}

fn apply_in_place(state: &mut GameState, player: PlayerId, action: &Action) -> Result<(), EngineError> {
    if state.is_over() {
        return Err(IllegalAction::GameOver.into());
    }
    if player.index() >= state.player_count() || !state.players[player].in_game() {
        return Err(IllegalAction::NoPriority(player).into());
    }

    if let Action::Respond { decision, response } = action {
        respond(state, player, *decision, response)?;
        run(state);
        return Ok(());
    }
    if let Some(pending) = state.pending_decision() {
        return Err(IllegalAction::DecisionPending(pending.player).into());
    }

    match action {
        Action::DeclareAttackers(declarations) => {
            expect_declaration(state, player, DeclarationKind::Attackers)?;
            combat::declare_attackers(state, player, declarations)?;
        }
        Action::DeclareBlockers(declarations) => {
            expect_declaration(state, player, DeclarationKind::Blockers)?;
            combat::declare_blockers(state, player, declarations)?;
            if state.turn.awaiting.is_none() {
                combat::ask_blocker_order(state);
            }
        }
        _ => {
            if let Some((kind, awaited)) = state.turn.awaiting {
                return Err(IllegalAction::DeclarationPending { player: awaited, kind }.into());
            }
            if state.turn.priority != Some(player) {
                return Err(IllegalAction::NoPriority(player).into());
            }
            match action {
                Action::PassPriority => pass(state, player),
                Action::PlayLand { card } => {
                    casting::play_land(state, player, *card)?;
                }
                Action::CastSpell { card, targets, payment } => {
                    casting::cast(state, player, *card, targets, payment)?;
                }
                Action::ActivateAbility {
                    source,
                    ability,
                    targets,
                    payment,
                } => casting::activate(state, player, *source, *ability, targets, payment)?,
                Action::DeclareAttackers(_) | Action::DeclareBlockers(_) | Action::Respond { .. } => {}
            }
        }
    }
    run(state);
    Ok(())
}

fn expect_declaration(state: &GameState, player: PlayerId, kind: DeclarationKind) -> Result<(), IllegalAction> {
    match state.turn.awaiting {
        Some((awaited, awaited_player)) if awaited == kind && awaited_player == player => Ok(()),
        Some((awaited, awaited_player)) if awaited == kind => Err(IllegalAction::DeclarationPending {
            player: awaited_player,
            kind,
        }),
        _ => Err(IllegalAction::UnexpectedDeclaration(kind)),
    }
}

fn pass(state: &mut GameState, player: PlayerId) {
    if stack::pass(state, player) != PassOutcome::AllPassed {
        return;
    }
    if state.stack.is_empty() {
        turn::advance_step(state);
    } else {
        let outcome = stack::resolve_top(state);
        tracing::trace!(?outcome, "top of stack");
    }
}

fn respond(
    state: &mut GameState,
    player: PlayerId,
    decision: DecisionId,
    response: &Response,
) -> Result<(), EngineError> {
    let Some(pending) = state.pending.as_ref() else {
        return Err(InvariantViolation::NoPendingDecision.into());
    };
    if pending.decision.id != decision {
        return Err(InvariantViolation::DecisionMismatch {
            expected: pending.decision.id,
            got: decision,
        }
        .into());
    }
    if pending.decision.player != player {
        return Err(IllegalAction::NotYourDecision(pending.decision.player).into());
    }
    pending.decision.check(response)?;

    let Some(pending) = state.pending.take() else {
        return Err(InvariantViolation::NoPendingDecision.into());
    };
    let mismatch = || EngineError::from(InvariantViolation::ResponseKindMismatch(decision));
    tracing::debug!(%decision, %player, "decision answered");
    match pending.resume {
        ResumePoint::StackObject(id) => {
            stack::resolve::answer(state, id, response)?;
        }
        ResumePoint::TriggerOrder { player } => {
            let Response::Order(order) = response else {
                return Err(mismatch());
            };
            triggers::apply_order(state, player, order);
        }
        ResumePoint::TriggerTargets => {
            let Response::Targets(targets) = response else {
                return Err(mismatch());
            };
            triggers::apply_targets(state, targets.clone());
        }
        ResumePoint::BlockerOrder { attacker } => {
            let Response::Order(order) = response else {
                return Err(mismatch());
            };
            combat::apply_blocker_order(state, attacker, order.clone());
            combat::ask_blocker_order(state);
        }
        ResumePoint::CleanupDiscard { player } => {
            let Response::Cards(cards) = response else {
                return Err(mismatch());
            };
            turn::cleanup_discard(state, player, cards);
        }
    }
    Ok(())
}

/// Advance until some player has to act.
fn run(state: &mut GameState) {
    loop {
        if state.is_over() || state.pending.is_some() {
            return;
        }
        let acted = sba::check(state);
        if state.is_over() {
            return;
        }
        let triggered = triggers::collect(state) > 0;
        if triggers::place(state) {
            return;
        }
        state.prune_last_known();
        if state.turn.awaiting.is_some() || state.turn.priority.is_some() {
            return;
        }

        let step = state.turn.step;
        if step == Step::Cleanup {
            if acted || triggered || !state.stack.is_empty() {
                state.turn.cleanup_again = true;
                priority::grant_active(state);
                return;
            }
            turn::advance_step(state);
        } else if step.has_priority() {
            priority::grant_active(state);
            return;
        } else {
            turn::advance_step(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cards::CardId;
    use crate::mana::ManaCost;

    fn p(n: u8) -> PlayerId {
        PlayerId::new(n)
    }

    fn deck(n: usize) -> Vec<Arc<CardDefinition>> {
        let bear = Arc::new(CardDefinition::creature(CardId::new(1), "Bear", ManaCost::generic(2), 2, 2));
        vec![bear; n]
    }

    fn started() -> GameState {
        let config = GameConfig::new(2).with_seed(7);
        Engine::start(Engine::new_game(config, &[deck(20), deck(20)]))
    }

    #[test]
    fn test_new_game_draws_opening_hands() {
        let state = Engine::new_game(GameConfig::new(2), &[deck(20), deck(20)]);
        assert_eq!(state.hand(p(0)).len(), 7);
        assert_eq!(state.library(p(1)).len(), 13);
        assert_eq!(state.turn.number, 0);
    }

    #[test]
    fn test_start_stops_in_upkeep_with_priority() {
        let state = started();
        assert_eq!(state.turn.number, 1);
        assert_eq!(state.step(), Step::Upkeep);
        assert_eq!(state.priority_player(), Some(p(0)));
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let state = started();
        let before = state.clone();
        let next = Engine::apply(&state, p(0), Action::PassPriority).unwrap();
        assert_eq!(state, before);
        assert_eq!(next.priority_player(), Some(p(1)));
        assert_eq!(next.history.len(), 1);
    }

    #[test]
    fn test_wrong_player_cannot_pass() {
        let state = started();
        let err = Engine::apply(&state, p(1), Action::PassPriority).unwrap_err();
        assert_eq!(err, EngineError::Illegal(IllegalAction::NoPriority(p(1))));
    }

    #[test]
    fn test_both_passing_advances_step() {
        let state = started();
        let state = Engine::apply(&state, p(0), Action::PassPriority).unwrap();
        let state = Engine::apply(&state, p(1), Action::PassPriority).unwrap();
        // The starting player skips the first draw but the step still
        // happens.
        assert_eq!(state.step(), Step::Draw);
        assert_eq!(state.priority_player(), Some(p(0)));
    }

    #[test]
    fn test_response_without_decision_is_invariant_violation() {
        let state = started();
        let err = Engine::apply(&state, p(0), Action::respond(DecisionId(1), Response::YesNo(true))).unwrap_err();
        assert_eq!(err, EngineError::Invariant(InvariantViolation::NoPendingDecision));
    }

    #[test]
    fn test_game_over_rejects_actions() {
        let mut state = started();
        state.players[p(1)].life = 0;
        let state = Engine::apply(&state, p(0), Action::PassPriority).unwrap();
        assert!(state.is_over());
        let err = Engine::apply(&state, p(0), Action::PassPriority).unwrap_err();
        assert_eq!(err, EngineError::Illegal(IllegalAction::GameOver));
    }
}
