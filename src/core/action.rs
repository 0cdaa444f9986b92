//! Player actions.
//!
//! An `Action` is everything a player can submit to `Engine::apply`. The
//! set is closed: pass priority, play a land, cast a spell, activate an
//! ability, declare attackers or blockers, and answer the pending decision.
//!
//! ```
//! use ccg_kernel::core::{Action, EntityId, PaymentStrategy};
//!
//! // "Cast card #12 targeting #20, tapping whatever the solver picks."
//! let cast = Action::CastSpell {
//!     card: EntityId(12),
//!     targets: vec![vec![EntityId(20)]],
//!     payment: PaymentStrategy::Auto,
//! };
//! assert!(!cast.is_pass());
//! ```

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::player::PlayerId;
use crate::decision::{DecisionId, Response};

/// How the mana cost of a spell or ability is paid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStrategy {
    /// Let the solver pick sources among everything available.
    #[default]
    Auto,
    /// Only these permanents may be tapped; floating mana is always used.
    Explicit(Vec<EntityId>),
}

/// One attacking creature and the player it attacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackDeclaration {
    pub attacker: EntityId,
    pub defender: PlayerId,
}

/// One blocking creature and the attacker it blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDeclaration {
    pub blocker: EntityId,
    pub attacker: EntityId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    PassPriority,

    PlayLand { card: EntityId },

    /// `targets` holds one group per target requirement of the spell.
    CastSpell {
        card: EntityId,
        targets: Vec<Vec<EntityId>>,
        payment: PaymentStrategy,
    },

    /// `ability` indexes the source's current (projected) abilities.
    ActivateAbility {
        source: EntityId,
        ability: usize,
        targets: Vec<Vec<EntityId>>,
        payment: PaymentStrategy,
    },

    DeclareAttackers(Vec<AttackDeclaration>),

    /// Declared by one defending player at a time.
    DeclareBlockers(Vec<BlockDeclaration>),

    Respond { decision: DecisionId, response: Response },
}

impl Action {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Action::PassPriority)
    }

    /// `CastSpell` with no targets and automatic payment.
    #[must_use]
    pub fn cast(card: EntityId) -> Self {
        Action::CastSpell {
            card,
            targets: Vec::new(),
            payment: PaymentStrategy::Auto,
        }
    }

    /// `CastSpell` with a single target and automatic payment.
    #[must_use]
    pub fn cast_targeting(card: EntityId, target: EntityId) -> Self {
        Action::CastSpell {
            card,
            targets: vec![vec![target]],
            payment: PaymentStrategy::Auto,
        }
    }

    #[must_use]
    pub fn activate(source: EntityId, ability: usize, targets: Vec<Vec<EntityId>>) -> Self {
        Action::ActivateAbility {
            source,
            ability,
            targets,
            payment: PaymentStrategy::Auto,
        }
    }

    #[must_use]
    pub fn respond(decision: DecisionId, response: Response) -> Self {
        Action::Respond { decision, response }
    }
}

/// A recorded action with metadata for history tracking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: Action,

    /// Turn number when action was taken.
    pub turn: u32,

    /// Sequence number within the game (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    #[must_use]
    pub fn new(player: PlayerId, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            turn,
            sequence,
        }
    }
}
