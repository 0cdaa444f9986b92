//! Game events.
//!
//! Events record what happened, in order. They are appended to
//! `GameState::events` and never removed, so the log can be replayed by
//! observers and tests. The kernel reads them back for one purpose only:
//! matching triggered abilities.
//!
//! Zone changes name both identities of the object: `old` (the id it had
//! before the move) and `new` (the id it has now).

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::rules::Step;
use crate::zones::Zone;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    TurnBegan { turn: u32, active: PlayerId },

    StepBegan { step: Step, active: PlayerId },

    ZoneChanged {
        old: EntityId,
        new: EntityId,
        owner: PlayerId,
        /// Controller just before the move.
        controller: PlayerId,
        from: Zone,
        to: Zone,
    },

    SpellCast { spell: EntityId, controller: PlayerId },

    AbilityActivated { source: EntityId, controller: PlayerId },

    DamageDealt {
        source: EntityId,
        /// A player or an object.
        target: EntityId,
        amount: u32,
        combat: bool,
    },

    LifeGained { player: PlayerId, amount: u32 },

    LifeLost { player: PlayerId, amount: u32 },

    CardDrawn { player: PlayerId, card: EntityId },

    Discarded { player: PlayerId, card: EntityId },

    Sacrificed { player: PlayerId, permanent: EntityId },

    Shuffled { player: PlayerId },

    Tapped { permanent: EntityId },

    Untapped { permanent: EntityId },

    CountersAdded { permanent: EntityId, amount: u32 },

    TokenCreated { token: EntityId, controller: PlayerId },

    ControlChanged { permanent: EntityId, controller: PlayerId },

    AttackerDeclared { attacker: EntityId, defender: PlayerId },

    BlockerDeclared { blocker: EntityId, attacker: EntityId },

    /// A stack object finished resolving.
    StackResolved { object: EntityId },

    /// A target was illegal when used. `target` is `None` when the whole
    /// stack object was removed for lack of legal targets.
    Fizzled { object: EntityId, target: Option<EntityId> },

    Countered { object: EntityId },

    ManaAdded { player: PlayerId, amount: u32 },

    LandPlayed { player: PlayerId, land: EntityId },

    PlayerLost { player: PlayerId },

    GameEnded { winner: Option<PlayerId> },
}

impl GameEvent {
    /// The object that left the battlefield, if this event is such a move.
    #[must_use]
    pub fn left_battlefield(&self) -> Option<EntityId> {
        match self {
            GameEvent::ZoneChanged {
                old,
                from: Zone::Battlefield,
                to,
                ..
            } if *to != Zone::Battlefield => Some(*old),
            _ => None,
        }
    }

    /// Whether this event is a creature or other permanent going to a
    /// graveyard from the battlefield.
    #[must_use]
    pub fn is_death(&self) -> bool {
        matches!(
            self,
            GameEvent::ZoneChanged {
                from: Zone::Battlefield,
                to: Zone::Graveyard,
                ..
            }
        )
    }
}
