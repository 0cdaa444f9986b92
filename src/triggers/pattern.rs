//! Trigger conditions: which events a triggered ability reacts to.
//!
//! A pattern is matched against one event from the point of view of the
//! ability's source and controller. Object patterns are judged with the
//! projection as it is when triggers are gathered, extended with the
//! last-known information of objects that left the battlefield, so "when
//! this creature dies" sees the creature as it last existed.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::{Filter, FilterContext};
use crate::layers::Projection;
use crate::rules::Step;
use crate::zones::Zone;

use super::event::GameEvent;

/// Whose event, relative to the ability's controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerScope {
    You,
    Opponent,
    #[default]
    Any,
}

impl PlayerScope {
    #[must_use]
    pub fn accepts(self, you: PlayerId, player: PlayerId) -> bool {
        match self {
            PlayerScope::You => player == you,
            PlayerScope::Opponent => player != you,
            PlayerScope::Any => true,
        }
    }
}

/// Which object an event must be about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectPattern {
    /// The ability's own source.
    This,
    /// Any object matching; the filter's zone is ignored.
    Matching(Filter),
}

impl ObjectPattern {
    fn matches(&self, state: &GameState, view: &Projection, ctx: &FilterContext, object: EntityId) -> bool {
        match self {
            ObjectPattern::This => ctx.source == Some(object),
            ObjectPattern::Matching(filter) => filter.matches_object(state, view, ctx, object),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPattern {
    EntersBattlefield(ObjectPattern),
    /// A creature put into a graveyard from the battlefield.
    Dies(ObjectPattern),
    LeavesBattlefield(ObjectPattern),
    SpellCast { spell: Filter, by: PlayerScope },
    Attacks(ObjectPattern),
    DealsDamage(ObjectPattern),
    BeginningOfStep { step: Step, whose: PlayerScope },
    CardDrawn(PlayerScope),
    LifeGained(PlayerScope),
}

/// What a matched event was about, for `ObjectRef::Triggering` and
/// `PlayerRef::Triggering`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriggerMatch {
    pub object: Option<EntityId>,
    pub player: Option<PlayerId>,
}

impl EventPattern {
    /// "When this enters the battlefield".
    #[must_use]
    pub fn self_enters() -> Self {
        EventPattern::EntersBattlefield(ObjectPattern::This)
    }

    /// "When this dies".
    #[must_use]
    pub fn self_dies() -> Self {
        EventPattern::Dies(ObjectPattern::This)
    }

    /// "At the beginning of your upkeep".
    #[must_use]
    pub fn your_upkeep() -> Self {
        EventPattern::BeginningOfStep {
            step: Step::Upkeep,
            whose: PlayerScope::You,
        }
    }

    /// Whether the pattern looks back in time at objects that have left
    /// the battlefield.
    #[must_use]
    pub fn looks_back(&self) -> bool {
        matches!(
            self,
            EventPattern::Dies(_) | EventPattern::LeavesBattlefield(_) | EventPattern::EntersBattlefield(ObjectPattern::This)
        )
    }

    /// Match `event` for an ability of `source` controlled by `controller`.
    #[must_use]
    pub fn matches(
        &self,
        state: &GameState,
        view: &Projection,
        event: &GameEvent,
        source: EntityId,
        controller: PlayerId,
    ) -> Option<TriggerMatch> {
        let ctx = FilterContext::new(controller, Some(source));
        let object = |id: EntityId| TriggerMatch {
            object: Some(id),
            player: view.controller(id),
        };
        match (self, event) {
            (EventPattern::EntersBattlefield(pattern), GameEvent::ZoneChanged { new, to: Zone::Battlefield, .. }) => {
                pattern.matches(state, view, &ctx, *new).then(|| object(*new))
            }
            (EventPattern::Dies(pattern), GameEvent::ZoneChanged { old, .. }) if event.is_death() => {
                let was_creature = view.get(*old).is_some_and(|o| o.is_creature());
                (was_creature && pattern.matches(state, view, &ctx, *old)).then(|| object(*old))
            }
            (EventPattern::LeavesBattlefield(pattern), _) => {
                let old = event.left_battlefield()?;
                pattern.matches(state, view, &ctx, old).then(|| object(old))
            }
            (EventPattern::SpellCast { spell, by }, GameEvent::SpellCast { spell: id, controller: caster }) => {
                (by.accepts(controller, *caster) && spell.matches_object(state, view, &ctx, *id)).then_some(TriggerMatch {
                    object: Some(*id),
                    player: Some(*caster),
                })
            }
            (EventPattern::Attacks(pattern), GameEvent::AttackerDeclared { attacker, defender }) => {
                pattern.matches(state, view, &ctx, *attacker).then_some(TriggerMatch {
                    object: Some(*attacker),
                    player: Some(*defender),
                })
            }
            (EventPattern::DealsDamage(pattern), GameEvent::DamageDealt { source: dealer, target, .. }) => {
                pattern.matches(state, view, &ctx, *dealer).then_some(TriggerMatch {
                    object: Some(*target),
                    player: target.as_player(state.player_count()),
                })
            }
            (EventPattern::BeginningOfStep { step, whose }, GameEvent::StepBegan { step: began, active }) => {
                (step == began && whose.accepts(controller, *active)).then_some(TriggerMatch {
                    object: None,
                    player: Some(*active),
                })
            }
            (EventPattern::CardDrawn(scope), GameEvent::CardDrawn { player, card }) => {
                scope.accepts(controller, *player).then_some(TriggerMatch {
                    object: Some(*card),
                    player: Some(*player),
                })
            }
            (EventPattern::LifeGained(scope), GameEvent::LifeGained { player, .. }) => {
                scope.accepts(controller, *player).then_some(TriggerMatch {
                    object: None,
                    player: Some(*player),
                })
            }
            _ => None,
        }
    }
}
