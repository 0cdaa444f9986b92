//! Turn structure: steps, turn-based actions and step skipping.

use serde::{Deserialize, Serialize};

use crate::core::error::DeclarationKind;
use crate::core::{GameState, PlayerId};
use crate::decision::{DecisionKind, DecisionRequest, ResumePoint};
use crate::layers::Duration;
use crate::triggers::GameEvent;

use super::actions;
use super::combat::{self, CombatState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    Main1,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    FirstStrikeDamage,
    CombatDamage,
    EndCombat,
    Main2,
    End,
    Cleanup,
}

impl Step {
    pub const ALL: [Step; 13] = [
        Step::Untap,
        Step::Upkeep,
        Step::Draw,
        Step::Main1,
        Step::BeginCombat,
        Step::DeclareAttackers,
        Step::DeclareBlockers,
        Step::FirstStrikeDamage,
        Step::CombatDamage,
        Step::EndCombat,
        Step::Main2,
        Step::End,
        Step::Cleanup,
    ];

    /// The step after this one in the same turn.
    #[must_use]
    pub fn next(self) -> Option<Step> {
        let index = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(index + 1).copied()
    }

    #[must_use]
    pub fn is_main(self) -> bool {
        matches!(self, Step::Main1 | Step::Main2)
    }

    /// Whether players normally receive priority in this step.
    #[must_use]
    pub fn has_priority(self) -> bool {
        !matches!(self, Step::Untap | Step::Cleanup)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Turn, step and priority bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// 0 before the first turn begins.
    pub number: u32,
    pub active: PlayerId,
    pub step: Step,
    pub priority: Option<PlayerId>,
    /// Consecutive passes since the last action.
    pub passes: usize,
    /// A combat declaration the engine is waiting for.
    pub awaiting: Option<(DeclarationKind, PlayerId)>,
    /// Something happened during cleanup; another cleanup step follows.
    pub cleanup_again: bool,
}

impl TurnState {
    #[must_use]
    pub fn new(starting_player: PlayerId) -> Self {
        Self {
            number: 0,
            active: starting_player,
            step: Step::Untap,
            priority: None,
            passes: 0,
            awaiting: None,
            cleanup_again: false,
        }
    }
}

/// Start `player`'s turn at the untap step.
pub fn begin_turn(state: &mut GameState, player: PlayerId) {
    state.turn.number += 1;
    state.turn.active = player;
    state.combat = None;
    for (_, p) in state.players.iter_mut() {
        p.lands_played = 0;
    }
    tracing::debug!(turn = state.turn.number, %player, "turn began");
    state.emit(GameEvent::TurnBegan {
        turn: state.turn.number,
        active: player,
    });
    enter_step(state, Step::Untap);
}

/// Move to the next step that is not skipped, starting the next turn after
/// cleanup.
pub fn advance_step(state: &mut GameState) {
    loop {
        if state.is_over() {
            return;
        }
        if state.turn.step == Step::Cleanup && std::mem::take(&mut state.turn.cleanup_again) {
            enter_step(state, Step::Cleanup);
            return;
        }
        let Some(step) = state.turn.step.next() else {
            let next = next_active(state);
            begin_turn(state, next);
            return;
        };
        if enter_step(state, step) {
            return;
        }
    }
}

fn next_active(state: &GameState) -> PlayerId {
    let count = state.player_count();
    let mut candidate = state.turn.active.next(count);
    for _ in 0..count {
        if state.players[candidate].in_game() {
            return candidate;
        }
        candidate = candidate.next(count);
    }
    state.turn.active
}

/// Enter `step` and perform its turn-based actions. Returns `false` if the
/// step is skipped.
pub fn enter_step(state: &mut GameState, step: Step) -> bool {
    state.turn.step = step;
    state.turn.priority = None;
    state.turn.passes = 0;
    state.turn.awaiting = None;
    for (_, p) in state.players.iter_mut() {
        p.mana_pool.clear();
    }

    let active = state.turn.active;
    let entered = match step {
        Step::DeclareAttackers => combat::any_can_attack(state),
        Step::DeclareBlockers => combat::any_can_block(state),
        Step::FirstStrikeDamage => combat::has_first_strike(state),
        Step::CombatDamage => state.combat.as_ref().is_some_and(CombatState::has_attackers),
        _ => true,
    };
    if !entered {
        tracing::trace!(%step, "step skipped");
        return false;
    }

    tracing::debug!(%step, %active, "step began");
    state.emit(GameEvent::StepBegan { step, active });

    match step {
        Step::Untap => untap(state, active),
        Step::Draw => {
            let first_turn = state.turn.number == 1 && active == state.config.starting_player;
            if !(first_turn && state.config.skip_first_draw) {
                actions::draw(state, active, 1);
            }
        }
        Step::BeginCombat => state.combat = Some(CombatState::default()),
        Step::DeclareAttackers => state.turn.awaiting = Some((DeclarationKind::Attackers, active)),
        Step::DeclareBlockers => {
            if let Some(defender) = combat::next_defender(state) {
                state.turn.awaiting = Some((DeclarationKind::Blockers, defender));
            }
        }
        Step::FirstStrikeDamage => combat::deal_damage(state, true),
        Step::CombatDamage => combat::deal_damage(state, false),
        Step::Main2 => state.combat = None,
        Step::Cleanup => cleanup(state),
        Step::Upkeep | Step::Main1 | Step::EndCombat | Step::End => {}
    }
    true
}

fn untap(state: &mut GameState, active: PlayerId) {
    let view = state.project();
    for id in state.permanents_of(&view, active) {
        actions::untap(state, id);
        if let Some(obj) = state.object_mut(id) {
            obj.summoning_sick = false;
        }
    }
}

/// Discard to hand size, or finish cleanup straight away.
fn cleanup(state: &mut GameState) {
    state.combat = None;
    let active = state.turn.active;
    let hand = state.hand(active);
    let max = state.config.max_hand_size;
    if hand.len() > max {
        let excess = hand.len() - max;
        let request = DecisionRequest::new(
            active,
            DecisionKind::ChooseCards {
                candidates: hand,
                min: excess,
                max: excess,
            },
            format!("Discard {excess} card(s) to hand size"),
        );
        state.ask(request, ResumePoint::CleanupDiscard { player: active });
        return;
    }
    finish_cleanup(state);
}

/// Remove marked damage and end "until end of turn" effects.
pub fn finish_cleanup(state: &mut GameState) {
    for id in state.battlefield() {
        if let Some(obj) = state.object_mut(id) {
            obj.damage = 0;
            obj.deathtouch_damage = false;
        }
    }
    state.effects.retain(|e| e.duration != Duration::UntilEndOfTurn);
}

/// Apply the cleanup discard, then finish cleanup.
pub fn cleanup_discard(state: &mut GameState, player: PlayerId, cards: &[crate::core::EntityId]) {
    for card in cards {
        actions::discard(state, player, *card);
    }
    finish_cleanup(state);
}
