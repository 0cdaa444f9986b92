//! Resolution of the top stack object.
//!
//! On first resolution the object's targets are checked against its fizzle
//! policy and its intervening "if" clause is checked again. Then its effect
//! tree runs. If the tree stops on a decision the continuation is stored
//! in the object, which stays on top of the stack until the answer arrives.

use crate::cards::FizzlePolicy;
use crate::core::error::{EngineError, InvariantViolation};
use crate::core::{EntityId, GameState};
use crate::decision::{DecisionId, Response, ResumePoint};
use crate::effects::{check_target, executor, Bindings, Continuation, FilterContext, Outcome};
use crate::layers::Projection;
use crate::rules::actions;
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZonePosition};

use super::{position, StackObject, StackObjectKind};

/// What an attempt to resolve led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved(EntityId),
    /// Removed without resolving: every target was illegal, or the
    /// intervening condition no longer held.
    Removed(EntityId),
    Waiting(DecisionId),
    Empty,
}

/// Resolve the top of the stack.
pub fn resolve_top(state: &mut GameState) -> Resolution {
    let Some(top) = state.stack.back().cloned() else {
        return Resolution::Empty;
    };
    if let Some(cont) = top.continuation {
        return drive(state, top.id, cont);
    }

    let view = state.project();
    if fizzles(state, &view, &top) {
        tracing::debug!(id = %top.id, what = %top.description, "fizzled");
        state.stack.pop_back();
        if top.kind == StackObjectKind::Spell && state.zones.is_in(top.id, Zone::Stack) {
            actions::move_object(state, top.id, Zone::Graveyard, ZonePosition::Top);
        }
        state.emit(GameEvent::Fizzled {
            object: top.id,
            target: None,
        });
        return Resolution::Removed(top.id);
    }
    if let Some(condition) = &top.condition {
        let ctx = FilterContext::new(top.controller, Some(top.source));
        if !condition.evaluate(state, &view, &ctx, 0) {
            tracing::debug!(id = %top.id, "intervening condition no longer holds");
            state.stack.pop_back();
            return Resolution::Removed(top.id);
        }
    }

    let bindings = Bindings::new(top.id, top.source, top.controller)
        .with_source_colors(top.source_colors)
        .with_targets(top.target_specs.clone(), top.targets.clone())
        .with_triggering(top.triggering, top.triggering_player);
    drive(state, top.id, Continuation::new(top.effect, bindings))
}

/// Apply the answer to a decision raised while `id` was resolving, then
/// keep resolving it.
pub fn answer(state: &mut GameState, id: EntityId, response: &Response) -> Result<Resolution, EngineError> {
    let cont = position(state, id)
        .and_then(|index| state.stack.get_mut(index))
        .and_then(|object| object.continuation.take());
    let Some(mut cont) = cont else {
        return Err(InvariantViolation::Corrupt(format!("{id} is not waiting on a decision")).into());
    };
    executor::resume(state, &mut cont, response)?;
    Ok(drive(state, id, cont))
}

fn drive(state: &mut GameState, id: EntityId, mut cont: Continuation) -> Resolution {
    match executor::run(state, &mut cont) {
        Outcome::Suspended(request) => {
            let Some(object) = position(state, id).and_then(|index| state.stack.get_mut(index)) else {
                return Resolution::Removed(id);
            };
            object.continuation = Some(cont);
            Resolution::Waiting(state.ask(request, ResumePoint::StackObject(id)))
        }
        Outcome::Completed => finish(state, id),
    }
}

fn finish(state: &mut GameState, id: EntityId) -> Resolution {
    let Some(index) = position(state, id) else {
        // Countered or removed by its own effect.
        return Resolution::Removed(id);
    };
    let object = state.stack.remove(index);

    if object.kind == StackObjectKind::Spell && state.zones.is_in(id, Zone::Stack) {
        let view = state.project();
        let permanent = view.get(id).is_some_and(|o| o.characteristics.is_permanent());
        let aura = state.object(id).is_some_and(|o| o.card.is_aura());
        if permanent {
            let enchanted = aura.then(|| object.targets.first().and_then(|t| t.first()).copied()).flatten();
            if let Some(new_id) = actions::move_object_under(state, id, Zone::Battlefield, ZonePosition::Top, object.controller) {
                if let Some(permanent) = state.object_mut(new_id) {
                    permanent.attached_to = enchanted;
                }
            }
        } else {
            actions::move_object(state, id, Zone::Graveyard, ZonePosition::Top);
        }
    }

    tracing::debug!(%id, what = %object.description, "resolved");
    state.emit(GameEvent::StackResolved { object: id });
    Resolution::Resolved(id)
}

/// Whether the object is removed for illegal targets.
fn fizzles(state: &GameState, view: &Projection, object: &StackObject) -> bool {
    if object.fizzle == FizzlePolicy::Never {
        return false;
    }
    let ctx = crate::effects::TargetContext {
        controller: object.controller,
        source: object.source,
        source_colors: object.source_colors,
    };
    let mut chosen = 0;
    let mut illegal = 0;
    for (slot, targets) in object.targets.iter().enumerate() {
        let Some(spec) = object.target_specs.get(slot) else {
            continue;
        };
        for target in targets {
            chosen += 1;
            if check_target(state, view, spec, &ctx, *target).is_err() {
                illegal += 1;
            }
        }
    }
    match object.fizzle {
        FizzlePolicy::AllTargetsIllegal => chosen > 0 && illegal == chosen,
        FizzlePolicy::AnyTargetIllegal => illegal > 0,
        FizzlePolicy::Never => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cards::{CardDefinition, CardId};
    use crate::core::{GameConfig, PlayerId};
    use crate::effects::{Effect, PlayerRef, TargetSpec};
    use crate::mana::ManaCost;
    use crate::stack::push;
    use crate::zones::ZoneId;

    fn p(n: u8) -> PlayerId {
        PlayerId::new(n)
    }

    fn bear() -> Arc<CardDefinition> {
        Arc::new(CardDefinition::creature(CardId::new(1), "Bear", ManaCost::parse("{1}{G}").unwrap(), 2, 2))
    }

    #[test]
    fn test_empty_stack() {
        let mut state = GameState::new(GameConfig::new(2));
        assert_eq!(resolve_top(&mut state), Resolution::Empty);
    }

    #[test]
    fn test_creature_spell_enters_battlefield() {
        let mut state = GameState::new(GameConfig::new(2));
        let spell = state.add_card(bear(), p(1), ZoneId::STACK);
        push(
            &mut state,
            StackObject::new(spell, StackObjectKind::Spell, p(1), spell, Effect::Nothing, "Bear"),
        );

        assert_eq!(resolve_top(&mut state), Resolution::Resolved(spell));
        assert!(state.stack.is_empty());
        let permanents = state.battlefield();
        assert_eq!(permanents.len(), 1);
        assert_eq!(state.object(permanents[0]).unwrap().controller, p(1));
    }

    #[test]
    fn test_all_targets_illegal_fizzles() {
        let mut state = GameState::new(GameConfig::new(2));
        let victim = state.put_onto_battlefield(bear(), p(1));
        let id = state.alloc_entity();
        let object = StackObject::new(id, StackObjectKind::Ability, p(0), EntityId(0), Effect::damage_target(0, 2), "ping")
            .with_targets(vec![TargetSpec::creature()], vec![vec![victim]]);
        push(&mut state, object);
        actions::destroy(&mut state, victim);

        assert_eq!(resolve_top(&mut state), Resolution::Removed(id));
        assert!(state
            .events()
            .any(|e| matches!(e, GameEvent::Fizzled { object, target: None } if *object == id)));
    }

    #[test]
    fn test_paused_resolution_keeps_object_on_top() {
        let mut state = GameState::new(GameConfig::new(2));
        let id = state.alloc_entity();
        let effect = Effect::may("Draw?", Effect::draw(PlayerRef::Controller, 1));
        push(
            &mut state,
            StackObject::new(id, StackObjectKind::Ability, p(0), EntityId(0), effect, "maybe draw"),
        );
        state.add_card(bear(), p(0), ZoneId::library(p(0)));

        let Resolution::Waiting(decision) = resolve_top(&mut state) else {
            panic!("expected a decision");
        };
        assert_eq!(state.pending_decision().map(|d| d.id), Some(decision));
        assert!(state.stack[0].is_resolving());

        state.pending = None;
        assert_eq!(answer(&mut state, id, &Response::YesNo(true)), Ok(Resolution::Resolved(id)));
        assert_eq!(state.hand(p(0)).len(), 1);
        assert!(state.stack.is_empty());
    }
}
