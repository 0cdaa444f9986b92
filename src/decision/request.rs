//! Decisions and responses.
//!
//! A `Decision` is a typed question to exactly one player together with the
//! bounds of a legal answer. `Decision::check` enforces those bounds; it
//! does not look at the game, so anything that depends on the board (a
//! target that became illegal) is re-checked by whoever applies the answer.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, IllegalAction, InvariantViolation};
use crate::core::{EntityId, PlayerId};
use crate::effects::TargetSpec;

/// Identifier of a decision. Every decision a game issues gets a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub u64);

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "decision {}", self.0)
    }
}

/// What is being asked, with the legal-choice bounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    /// Choose targets for one requirement from `legal`.
    ChooseTargets { spec: TargetSpec, legal: Vec<EntityId> },
    /// Pick one of the labelled options.
    ChooseOption { options: Vec<String> },
    YesNo,
    /// Choose between `min` and `max` distinct entries of `candidates`.
    ChooseCards { candidates: Vec<EntityId>, min: usize, max: usize },
    /// Return `items` in the desired order.
    OrderObjects { items: Vec<EntityId> },
    ChooseNumber { min: i32, max: i32 },
}

/// The answer to a decision. The variant must match the decision's kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Targets(Vec<EntityId>),
    Option(usize),
    YesNo(bool),
    Cards(Vec<EntityId>),
    Order(Vec<EntityId>),
    Number(i32),
}

/// A question waiting for one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub id: DecisionId,
    pub player: PlayerId,
    pub kind: DecisionKind,
    /// Human-readable context ("Discard 2 cards").
    pub prompt: String,
}

/// A decision before it has been given an id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub player: PlayerId,
    pub kind: DecisionKind,
    pub prompt: String,
}

impl DecisionRequest {
    #[must_use]
    pub fn new(player: PlayerId, kind: DecisionKind, prompt: impl Into<String>) -> Self {
        Self {
            player,
            kind,
            prompt: prompt.into(),
        }
    }
}

impl Decision {
    #[must_use]
    pub fn from_request(id: DecisionId, request: DecisionRequest) -> Self {
        Self {
            id,
            player: request.player,
            kind: request.kind,
            prompt: request.prompt,
        }
    }

    /// Check that `response` answers this decision within its bounds.
    ///
    /// A response of the wrong kind is a protocol error; one of the right
    /// kind with out-of-bounds content is an illegal action.
    pub fn check(&self, response: &Response) -> Result<(), EngineError> {
        let invalid = |reason: String| -> Result<(), EngineError> { Err(IllegalAction::InvalidResponse(reason).into()) };
        match (&self.kind, response) {
            (DecisionKind::ChooseTargets { spec, legal }, Response::Targets(chosen)) => {
                if chosen.len() < spec.min || chosen.len() > spec.max {
                    return invalid(format!("choose {} to {} targets", spec.min, spec.max));
                }
                check_subset(chosen, legal).or_else(invalid)
            }
            (DecisionKind::ChooseOption { options }, Response::Option(index)) => {
                if *index >= options.len() {
                    return invalid(format!("option {index} does not exist"));
                }
                Ok(())
            }
            (DecisionKind::YesNo, Response::YesNo(_)) => Ok(()),
            (DecisionKind::ChooseCards { candidates, min, max }, Response::Cards(chosen)) => {
                if chosen.len() < *min || chosen.len() > *max {
                    return invalid(format!("choose {min} to {max} cards"));
                }
                check_subset(chosen, candidates).or_else(invalid)
            }
            (DecisionKind::OrderObjects { items }, Response::Order(order)) => {
                if order.len() != items.len() {
                    return invalid(format!("order all {} objects", items.len()));
                }
                check_subset(order, items).or_else(invalid)
            }
            (DecisionKind::ChooseNumber { min, max }, Response::Number(n)) => {
                if n < min || n > max {
                    return invalid(format!("choose a number from {min} to {max}"));
                }
                Ok(())
            }
            _ => Err(InvariantViolation::ResponseKindMismatch(self.id).into()),
        }
    }
}

fn check_subset(chosen: &[EntityId], allowed: &[EntityId]) -> Result<(), String> {
    for (i, id) in chosen.iter().enumerate() {
        if !allowed.contains(id) {
            return Err(format!("{id} is not a legal choice"));
        }
        if chosen[..i].contains(id) {
            return Err(format!("{id} chosen more than once"));
        }
    }
    Ok(())
}
