//! Gathering triggered abilities and putting them on the stack.
//!
//! [`collect`] scans events that have not been scanned yet. For each event
//! it asks every triggered ability of every permanent (and, for
//! leaves-the-battlefield patterns, of every permanent that just left)
//! whether it matches. Matches are queued in APNAP order.
//!
//! [`place`] moves queued triggers to the stack. A player with two or more
//! simultaneous triggers chooses their order, and every trigger's targets
//! are chosen as it is put on the stack. Both are ordinary decisions.

use serde::{Deserialize, Serialize};

use crate::cards::{Ability, TriggeredAbility};
use crate::core::{EntityId, GameState, PlayerId};
use crate::decision::{DecisionKind, DecisionRequest, ResumePoint};
use crate::effects::{legal_targets, FilterContext, TargetContext};
use crate::mana::ColorSet;
use crate::stack::{self, StackObject, StackObjectKind};

use super::event::GameEvent;

/// A triggered ability waiting to be put on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTrigger {
    /// Becomes the stack object's id.
    pub id: EntityId,
    pub source: EntityId,
    pub controller: PlayerId,
    pub source_colors: ColorSet,
    pub ability: TriggeredAbility,
    pub triggering: Option<EntityId>,
    pub triggering_player: Option<PlayerId>,
    /// Targets chosen so far, one group per requirement.
    pub targets: Vec<Vec<EntityId>>,
    /// The controller has fixed this trigger's place in the queue.
    pub ordered: bool,
}

impl PendingTrigger {
    fn into_stack_object(self) -> StackObject {
        let mut object = StackObject::new(
            self.id,
            StackObjectKind::Trigger,
            self.controller,
            self.source,
            self.ability.effect,
            self.ability.description,
        )
        .with_targets(self.ability.targets, self.targets);
        object.source_colors = self.source_colors;
        object.fizzle = self.ability.fizzle;
        object.condition = self.ability.condition;
        object.triggering = self.triggering;
        object.triggering_player = self.triggering_player;
        object
    }
}

/// Queue every trigger caused by events since the last scan. Returns how
/// many were queued.
pub fn collect(state: &mut GameState) -> usize {
    let start = state.trigger_cursor;
    if start >= state.events.len() {
        return 0;
    }
    let events: Vec<GameEvent> = state.events.iter().skip(start).cloned().collect();
    state.trigger_cursor = state.events.len();

    let mut view = state.project();
    let departed: Vec<EntityId> = events.iter().filter_map(GameEvent::left_battlefield).collect();
    for id in &departed {
        if let Some(last) = state.last_known.get(id) {
            view.insert(last.clone());
        }
    }
    let battlefield = state.battlefield();

    let mut found = Vec::new();
    for event in &events {
        for (source, departed) in battlefield
            .iter()
            .map(|id| (*id, false))
            .chain(departed.iter().map(|id| (*id, true)))
        {
            let Some(obj) = view.get(source) else {
                continue;
            };
            if !state.players[obj.controller].in_game() {
                continue;
            }
            for ability in obj.abilities.iter().filter_map(Ability::as_triggered) {
                if departed && !ability.trigger.looks_back() {
                    continue;
                }
                let Some(matched) = ability.trigger.matches(state, &view, event, source, obj.controller) else {
                    continue;
                };
                if let Some(condition) = &ability.condition {
                    let ctx = FilterContext::new(obj.controller, Some(source));
                    if !condition.evaluate(state, &view, &ctx, 0) {
                        continue;
                    }
                }
                found.push((source, obj.controller, obj.characteristics.colors, ability.clone(), matched));
            }
        }
    }

    let order = state.apnap();
    found.sort_by_key(|(_, controller, ..)| order.iter().position(|p| p == controller).unwrap_or(usize::MAX));
    let queued = found.len();
    for (source, controller, source_colors, ability, matched) in found {
        tracing::debug!(%source, %controller, what = %ability.description, "triggered");
        let id = state.alloc_entity();
        state.triggers.push_back(PendingTrigger {
            id,
            source,
            controller,
            source_colors,
            ability,
            triggering: matched.object,
            triggering_player: matched.player,
            targets: Vec::new(),
            ordered: false,
        });
    }
    queued
}

/// Put queued triggers on the stack until the queue is empty or a player
/// has to decide something. Returns `true` if a decision is now pending.
pub fn place(state: &mut GameState) -> bool {
    while let Some(front) = state.triggers.front().cloned() {
        let player = front.controller;

        let unordered: Vec<EntityId> = state
            .triggers
            .iter()
            .filter(|t| t.controller == player && !t.ordered)
            .map(|t| t.id)
            .collect();
        if unordered.len() >= 2 {
            let request = DecisionRequest::new(
                player,
                DecisionKind::OrderObjects { items: unordered },
                "Order your triggered abilities (first goes on the stack first)",
            );
            state.ask(request, ResumePoint::TriggerOrder { player });
            return true;
        }

        if let Some(spec) = front.ability.targets.get(front.targets.len()) {
            let view = state.project();
            let ctx = TargetContext {
                controller: player,
                source: front.source,
                source_colors: front.source_colors,
            };
            let legal = legal_targets(state, &view, spec, &ctx);
            if legal.len() < spec.min {
                tracing::warn!(source = %front.source, what = %front.ability.description, "trigger has no legal targets; removed");
                state.triggers.pop_front();
                continue;
            }
            if legal.is_empty() || spec.max == 0 {
                if let Some(t) = state.triggers.front_mut() {
                    t.targets.push(Vec::new());
                }
                continue;
            }
            let request = DecisionRequest::new(
                player,
                DecisionKind::ChooseTargets {
                    spec: spec.clone(),
                    legal,
                },
                format!("Choose targets for {}", front.ability.description),
            );
            state.ask(request, ResumePoint::TriggerTargets);
            return true;
        }

        state.triggers.pop_front();
        stack::push(state, front.into_stack_object());
    }
    false
}

/// Apply a player's ordering of their queued triggers. `order` lists them
/// in the order they go on the stack.
pub fn apply_order(state: &mut GameState, player: PlayerId, order: &[EntityId]) {
    let slots: Vec<usize> = state
        .triggers
        .iter()
        .enumerate()
        .filter(|(_, t)| t.controller == player && !t.ordered)
        .map(|(i, _)| i)
        .collect();
    let mut reordered: Vec<PendingTrigger> = order
        .iter()
        .filter_map(|id| slots.iter().map(|i| &state.triggers[*i]).find(|t| t.id == *id).cloned())
        .collect();
    if reordered.len() != slots.len() {
        tracing::warn!(%player, "trigger order does not cover every trigger; keeping queue order");
        reordered = slots.iter().map(|i| state.triggers[*i].clone()).collect();
    }
    for (slot, mut trigger) in slots.into_iter().zip(reordered) {
        trigger.ordered = true;
        state.triggers.set(slot, trigger);
    }
}

/// Record targets for the next requirement of the front trigger.
pub fn apply_targets(state: &mut GameState, targets: Vec<EntityId>) {
    if let Some(front) = state.triggers.front_mut() {
        front.targets.push(targets);
    }
}
