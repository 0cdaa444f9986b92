//! Priority passing.
//!
//! Players pass priority in turn order, skipping players who have left the
//! game. When every remaining player has passed in succession, the top of
//! the stack resolves (or, with an empty stack, the step ends). Any other
//! action resets the count and the acting player keeps priority.

use crate::core::{GameState, PlayerId};

/// What a pass led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Priority moved to the next player.
    Passed(PlayerId),
    /// All players passed in succession.
    AllPassed,
}

/// Record a pass by the priority holder.
pub fn pass(state: &mut GameState, player: PlayerId) -> PassOutcome {
    state.turn.passes += 1;
    let remaining = state.players_in_game().count();
    if state.turn.passes >= remaining {
        state.turn.priority = None;
        return PassOutcome::AllPassed;
    }
    let next = next_in_game(state, player);
    state.turn.priority = Some(next);
    PassOutcome::Passed(next)
}

/// Give priority to `player` and start counting passes afresh.
pub fn grant(state: &mut GameState, player: PlayerId) {
    state.turn.priority = Some(player);
    state.turn.passes = 0;
}

/// The player who acted keeps priority.
pub fn retain(state: &mut GameState, player: PlayerId) {
    grant(state, player);
}

/// After a resolution or at the start of a step, the active player
/// receives priority.
pub fn grant_active(state: &mut GameState) {
    let active = state.turn.active;
    if state.players[active].in_game() {
        grant(state, active);
    } else {
        let next = next_in_game(state, active);
        grant(state, next);
    }
}

fn next_in_game(state: &GameState, after: PlayerId) -> PlayerId {
    let count = state.player_count();
    let mut candidate = after.next(count);
    for _ in 0..count {
        if state.players[candidate].in_game() {
            return candidate;
        }
        candidate = candidate.next(count);
    }
    after
}
