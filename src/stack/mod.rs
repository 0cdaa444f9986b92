//! The stack.
//!
//! Spells, activated abilities and triggered abilities wait here until all
//! players pass priority in succession; then the top object resolves. The
//! stack is strictly LIFO.
//!
//! ## Key Types
//!
//! - [`StackObject`]: A spell or ability with its chosen targets, its
//!   effect tree and, while it is paused on a decision, its continuation
//! - [`priority`]: Pass counting and priority hand-off
//! - [`resolve`]: Resolution of the top object
//!
//! A spell's `StackObject::id` is the id of its card object in the stack
//! zone. Abilities get a fresh id with no object behind it.

pub mod priority;
pub mod resolve;

pub use priority::{pass, PassOutcome};
pub use resolve::resolve_top;

use serde::{Deserialize, Serialize};

use crate::cards::FizzlePolicy;
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::{Condition, Continuation, Effect, FilterContext, ForEachSet, TargetSpec};
use crate::layers::Projection;
use crate::mana::ColorSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackObjectKind {
    Spell,
    Ability,
    Trigger,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackObject {
    pub id: EntityId,
    pub kind: StackObjectKind,
    pub controller: PlayerId,
    /// The spell itself, or the permanent whose ability this is.
    pub source: EntityId,
    /// Colors of the source when the object was created, for protection
    /// checks after the source is gone.
    pub source_colors: ColorSet,
    /// One group per target requirement.
    pub targets: Vec<Vec<EntityId>>,
    pub target_specs: Vec<TargetSpec>,
    pub effect: Effect,
    pub fizzle: FizzlePolicy,
    /// Intervening "if" clause, checked again on resolution.
    pub condition: Option<Condition>,
    pub triggering: Option<EntityId>,
    pub triggering_player: Option<PlayerId>,
    /// Present while resolution is paused on a decision.
    pub continuation: Option<Continuation>,
    pub description: String,
}

impl StackObject {
    /// A new stack object with no targets.
    #[must_use]
    pub fn new(
        id: EntityId,
        kind: StackObjectKind,
        controller: PlayerId,
        source: EntityId,
        effect: Effect,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            controller,
            source,
            source_colors: ColorSet::COLORLESS,
            targets: Vec::new(),
            target_specs: Vec::new(),
            effect,
            fizzle: FizzlePolicy::default(),
            condition: None,
            triggering: None,
            triggering_player: None,
            continuation: None,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn with_targets(mut self, specs: Vec<TargetSpec>, targets: Vec<Vec<EntityId>>) -> Self {
        self.target_specs = specs;
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn is_resolving(&self) -> bool {
        self.continuation.is_some()
    }

    /// Fix the members of every `ForEach` over players or a filter, as
    /// they are now.
    pub fn lock_sets(&mut self, state: &GameState, view: &Projection) {
        let ctx = FilterContext::new(self.controller, Some(self.source));
        let controller = self.controller;
        self.effect.lock_sets(&mut |set| match set {
            ForEachSet::Players => Some(state.apnap().into_iter().map(EntityId::player).collect()),
            ForEachSet::Opponents => Some(
                state
                    .apnap()
                    .into_iter()
                    .filter(|p| *p != controller)
                    .map(EntityId::player)
                    .collect(),
            ),
            ForEachSet::Objects(filter) => Some(filter.select(state, view, &ctx)),
            _ => None,
        });
    }
}

/// Put `object` on top of the stack.
pub fn push(state: &mut GameState, mut object: StackObject) {
    let view = state.project();
    object.lock_sets(state, &view);
    tracing::debug!(id = %object.id, kind = ?object.kind, controller = %object.controller, what = %object.description, "stack push");
    state.stack.push_back(object);
}

/// Position of a stack object, bottom = 0.
#[must_use]
pub fn position(state: &GameState, id: EntityId) -> Option<usize> {
    state.stack.iter().position(|o| o.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::effects::PlayerRef;

    #[test]
    fn test_push_is_lifo() {
        let mut state = GameState::new(GameConfig::new(2));
        for n in 0..3 {
            let id = state.alloc_entity();
            let object = StackObject::new(
                id,
                StackObjectKind::Ability,
                PlayerId::new(0),
                EntityId(0),
                Effect::Nothing,
                format!("ability {n}"),
            );
            push(&mut state, object);
        }
        let order: Vec<_> = state.stack.iter().map(|o| o.description.clone()).collect();
        assert_eq!(order, vec!["ability 0", "ability 1", "ability 2"]);
        assert_eq!(state.stack.back().map(|o| o.description.as_str()), Some("ability 2"));
    }

    #[test]
    fn test_players_locked_in_apnap_order() {
        let mut state = GameState::new(GameConfig::new(3));
        state.turn.active = PlayerId::new(1);
        let id = state.alloc_entity();
        let effect = Effect::for_each(ForEachSet::Players, Effect::draw(PlayerRef::Iterated, 1));
        push(
            &mut state,
            StackObject::new(id, StackObjectKind::Ability, PlayerId::new(0), EntityId(0), effect, "wheel"),
        );
        let Effect::ForEach { set, .. } = &state.stack[0].effect else {
            panic!("expected for-each");
        };
        assert_eq!(*set, ForEachSet::Fixed(vec![EntityId(1), EntityId(2), EntityId(0)]));
    }
}
