//! The decision/response protocol.
//!
//! The kernel never decides anything on a player's behalf. Whenever a rule
//! or an effect needs a choice it stores exactly one [`PendingDecision`] in
//! the game state and stops. The caller answers with
//! `Action::Respond { decision, response }`; the answer resumes the saved
//! work exactly where it stopped.
//!
//! ## Where suspended work lives
//!
//! - `ResumePoint::StackObject`: the continuation is inside the resolving
//!   stack object.
//! - Trigger ordering and trigger targets: the queued triggers in the state.
//! - Blocker ordering and cleanup discard: the combat state and the turn.

mod request;

pub use request::{Decision, DecisionId, DecisionKind, DecisionRequest, Response};

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// Where to continue once the pending decision is answered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResumePoint {
    /// The resolving stack object with this id.
    StackObject(EntityId),
    /// The order in which a player's simultaneous triggers go on the stack.
    TriggerOrder { player: PlayerId },
    /// Targets for the trigger at the front of the queue.
    TriggerTargets,
    /// Damage assignment order of the blockers of an attacker.
    BlockerOrder { attacker: EntityId },
    /// Discarding down to maximum hand size.
    CleanupDiscard { player: PlayerId },
}

/// The single outstanding question of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub decision: Decision,
    pub resume: ResumePoint,
}
