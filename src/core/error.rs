//! Error taxonomy.
//!
//! Two classes reach callers:
//!
//! - [`IllegalAction`]: the submitted action breaks a game rule. Returned
//!   synchronously; the input state is untouched. Every variant renders a
//!   stable reason suitable for display ("cannot block: fear").
//! - [`InvariantViolation`]: the caller broke the protocol (answered a
//!   decision that is not pending, sent the wrong response kind). This is a
//!   caller bug, not a rules outcome.
//!
//! A target becoming illegal during resolution is not an error at all; it is
//! recorded as a `GameEvent::Fizzled` and resolution continues.

use crate::core::{EntityId, PlayerId};
use crate::decision::DecisionId;
use crate::effects::TargetError;
use crate::mana::PaymentError;

/// Result of `Engine::apply`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Illegal(#[from] IllegalAction),

    #[error("engine invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl EngineError {
    #[must_use]
    pub fn is_illegal(&self) -> bool {
        matches!(self, Self::Illegal(_))
    }
}

/// A rule-violating action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IllegalAction {
    #[error("the game is over")]
    GameOver,

    #[error("{0} does not have priority")]
    NoPriority(PlayerId),

    #[error("a decision is pending for {0}")]
    DecisionPending(PlayerId),

    #[error("the pending decision belongs to {0}")]
    NotYourDecision(PlayerId),

    #[error("{player} must declare {kind} first")]
    DeclarationPending { player: PlayerId, kind: DeclarationKind },

    #[error("no {0} declaration is expected now")]
    UnexpectedDeclaration(DeclarationKind),

    #[error("cannot cast: {0}")]
    CannotCast(CastRestriction),

    #[error("cannot activate: {0}")]
    CannotActivate(ActivationRestriction),

    #[error("cannot play land: {0}")]
    CannotPlayLand(LandRestriction),

    #[error("cannot pay: {0}")]
    CannotPay(#[from] PaymentError),

    #[error("illegal target: {0}")]
    IllegalTarget(#[from] TargetError),

    #[error("cannot attack: {0}")]
    CannotAttack(AttackRestriction),

    #[error("cannot block: {0}")]
    CannotBlock(BlockRestriction),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Which combat declaration is awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DeclarationKind {
    Attackers,
    Blockers,
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attackers => write!(f, "attackers"),
            Self::Blockers => write!(f, "blockers"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CastRestriction {
    #[error("{0} is not in your hand")]
    NotInHand(EntityId),

    #[error("lands are played, not cast")]
    IsLand,

    #[error("only at sorcery speed")]
    SorcerySpeed,

    #[error("wrong number of target groups (expected {expected})")]
    TargetGroups { expected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActivationRestriction {
    #[error("{0} has no ability {1}")]
    NoSuchAbility(EntityId, usize),

    #[error("{0} is not in the required zone")]
    WrongZone(EntityId),

    #[error("you do not control {0}")]
    NotController(EntityId),

    #[error("{0} is already tapped")]
    Tapped(EntityId),

    #[error("{0} has summoning sickness")]
    SummoningSick(EntityId),

    #[error("not enough life")]
    InsufficientLife,

    #[error("only once each turn")]
    OncePerTurn,

    #[error("only at sorcery speed")]
    SorcerySpeed,

    #[error("wrong number of target groups (expected {expected})")]
    TargetGroups { expected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LandRestriction {
    #[error("{0} is not a land")]
    NotALand(EntityId),

    #[error("{0} is not in your hand")]
    NotInHand(EntityId),

    #[error("only during your main phase with an empty stack")]
    Timing,

    #[error("no land drops left this turn")]
    NoLandDropsLeft,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttackRestriction {
    #[error("{0} is not a creature you control")]
    NotYourCreature(EntityId),

    #[error("{0} is tapped")]
    Tapped(EntityId),

    #[error("{0} has summoning sickness")]
    SummoningSick(EntityId),

    #[error("defender")]
    Defender,

    #[error("{0} is not an opponent")]
    InvalidDefender(EntityId),

    #[error("{0} is declared twice")]
    Duplicate(EntityId),

    #[error("{0} must attack if able")]
    MustAttack(EntityId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockRestriction {
    #[error("{0} is not a creature you control")]
    NotYourCreature(EntityId),

    #[error("{0} is not attacking you")]
    NotAttackingYou(EntityId),

    #[error("{0} is tapped")]
    Tapped(EntityId),

    #[error("{0} blocks more than one attacker")]
    Duplicate(EntityId),

    #[error("can't block")]
    CantBlock,

    #[error("flying")]
    Flying,

    #[error("fear")]
    Fear,

    #[error("power restriction")]
    PowerRestriction,

    #[error("protection")]
    Protection,

    #[error("unblockable")]
    Unblockable,

    #[error("menace")]
    Menace,

    #[error("{0} must block if able")]
    MustBlock(EntityId),
}

/// Protocol misuse by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("no decision is pending")]
    NoPendingDecision,

    #[error("response names {got} but {expected} is pending")]
    DecisionMismatch { expected: DecisionId, got: DecisionId },

    #[error("response kind does not match decision {0}")]
    ResponseKindMismatch(DecisionId),

    #[error("{0}")]
    Corrupt(String),
}
