//! Effect tree execution.
//!
//! [`run`] pops frames off a [`Continuation`] until the tree is done or a
//! player has to be asked something. In the latter case the `Await` frame
//! stays on top and the question is returned; [`resume`] applies the
//! answer and the caller runs the continuation again.
//!
//! References to targets are re-validated at each use. A target that has
//! become illegal is skipped and recorded as `GameEvent::Fizzled`; the
//! rest of the effect still happens.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::cards::CardDefinition;
use crate::core::error::{EngineError, InvariantViolation};
use crate::core::{EntityId, GameState, PlayerId};
use crate::decision::{DecisionKind, DecisionRequest, Response};
use crate::layers::{self, Affected, ContinuousEffect, Duration, Modification, Projection};
use crate::rules::actions;
use crate::triggers::GameEvent;
use crate::zones::Zone;

use super::continuation::{AwaitKind, Continuation, Frame, TagValue};
use super::effect::{Amount, DiscardCount, Effect, ForEachSet, ObjectRef, PlayerRef};
use super::filter::{Filter, FilterContext};
use super::targeting::check_target;

/// How far a call to [`run`] got.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Waiting for an answer to this question.
    Suspended(DecisionRequest),
}

/// Run `cont` until it completes or needs a decision.
pub fn run(state: &mut GameState, cont: &mut Continuation) -> Outcome {
    while let Some(frame) = cont.frames.pop() {
        match frame {
            Frame::Eval(effect) => {
                if let Some(request) = eval(state, cont, effect) {
                    return Outcome::Suspended(request);
                }
            }
            Frame::Sequence { mut remaining } => {
                if let Some(next) = remaining.pop_front() {
                    cont.frames.push(Frame::Sequence { remaining });
                    cont.frames.push(Frame::Eval(next));
                }
            }
            Frame::Composite {
                mut remaining,
                base,
                total,
                started,
            } => {
                let total = if started {
                    total.saturating_add(cont.bindings.previous)
                } else {
                    total
                };
                if let Some(next) = remaining.pop_front() {
                    cont.bindings.previous = base;
                    cont.frames.push(Frame::Composite {
                        remaining,
                        base,
                        total,
                        started: true,
                    });
                    cont.frames.push(Frame::Eval(next));
                } else {
                    cont.bindings.previous = total;
                }
            }
            Frame::ForEach {
                items,
                next,
                effect,
                started,
            } => {
                if started {
                    cont.bindings.iterated.pop();
                }
                if let Some(item) = items.get(next).copied() {
                    cont.bindings.iterated.push(item);
                    cont.frames.push(Frame::ForEach {
                        items,
                        next: next + 1,
                        effect: effect.clone(),
                        started: true,
                    });
                    cont.frames.push(Frame::Eval(effect));
                } else {
                    cont.bindings.previous = count(items.len());
                }
            }
            Frame::Repeat {
                condition,
                effect,
                remaining,
            } => {
                let view = state.project();
                let ctx = filter_context(cont);
                if remaining > 0 && condition.evaluate(state, &view, &ctx, cont.bindings.previous) {
                    cont.frames.push(Frame::Repeat {
                        condition,
                        effect: effect.clone(),
                        remaining: remaining - 1,
                    });
                    cont.frames.push(Frame::Eval(effect));
                }
            }
            Frame::Tag { name } => {
                let previous = cont.bindings.previous;
                cont.bindings.tags.entry(name).or_default().amount = previous;
            }
            Frame::Await { kind, request } => {
                cont.frames.push(Frame::Await {
                    kind,
                    request: request.clone(),
                });
                return Outcome::Suspended(request);
            }
        }
    }
    Outcome::Completed
}

/// Apply an answer to the question `cont` is waiting on. The response must
/// already have passed `Decision::check`.
pub fn resume(state: &mut GameState, cont: &mut Continuation, response: &Response) -> Result<(), EngineError> {
    let Some(Frame::Await { kind, .. }) = cont.frames.pop() else {
        return Err(InvariantViolation::Corrupt("continuation is not waiting on a decision".into()).into());
    };
    match (kind, response) {
        (AwaitKind::May { effect }, Response::YesNo(true)) => cont.frames.push(Frame::Eval(*effect)),
        (AwaitKind::May { .. }, Response::YesNo(false)) => cont.bindings.previous = 0,
        (AwaitKind::Mode { mut effects }, Response::Option(index)) => {
            if *index >= effects.len() {
                return Err(InvariantViolation::Corrupt(format!("mode {index} out of range")).into());
            }
            cont.frames.push(Frame::Eval(effects.swap_remove(*index)));
        }
        (AwaitKind::ChooseObjects { tag }, Response::Cards(chosen)) => {
            cont.bindings.previous = count(chosen.len());
            cont.bindings.tags.insert(
                tag,
                TagValue {
                    amount: count(chosen.len()),
                    objects: chosen.clone(),
                },
            );
        }
        (AwaitKind::Discard { player }, Response::Cards(chosen)) => {
            let discarded = chosen.iter().filter(|card| actions::discard(state, player, **card)).count();
            cont.bindings.previous = count(discarded);
        }
        (AwaitKind::Sacrifice { .. }, Response::Cards(chosen)) => {
            let sacrificed = chosen.iter().filter(|id| actions::sacrifice(state, **id)).count();
            cont.bindings.previous = count(sacrificed);
        }
        (AwaitKind::Number { tag }, Response::Number(n)) => {
            cont.bindings.previous = *n;
            cont.bindings.tags.entry(tag).or_default().amount = *n;
        }
        (kind, response) => {
            return Err(InvariantViolation::Corrupt(format!("{response:?} does not answer {kind:?}")).into());
        }
    }
    Ok(())
}

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn non_negative(n: i32) -> u32 {
    u32::try_from(n).unwrap_or(0)
}

fn filter_context(cont: &Continuation) -> FilterContext {
    FilterContext::new(cont.bindings.controller, Some(cont.bindings.source))
}

fn ask(cont: &mut Continuation, kind: AwaitKind, request: DecisionRequest) -> Option<DecisionRequest> {
    cont.frames.push(Frame::Await {
        kind,
        request: request.clone(),
    });
    Some(request)
}

/// Execute one effect node. Combinators push frames; primitives act
/// immediately and set the running result.
fn eval(state: &mut GameState, cont: &mut Continuation, effect: Effect) -> Option<DecisionRequest> {
    match effect {
        Effect::Nothing => cont.bindings.previous = 0,

        Effect::DealDamage { to, amount } => {
            let amount = non_negative(amount_of(state, cont, &amount));
            let source = cont.bindings.source;
            let mut total: u32 = 0;
            for target in use_objects(state, cont, &to) {
                total = total.saturating_add(actions::deal_damage(state, source, target, amount, false));
            }
            cont.bindings.previous = i32::try_from(total).unwrap_or(i32::MAX);
        }

        Effect::GainLife { player, amount } => {
            let amount = non_negative(amount_of(state, cont, &amount));
            cont.bindings.previous = match use_player(state, cont, &player) {
                Some(p) => {
                    actions::gain_life(state, p, amount);
                    i32::try_from(amount).unwrap_or(i32::MAX)
                }
                None => 0,
            };
        }

        Effect::LoseLife { player, amount } => {
            let amount = non_negative(amount_of(state, cont, &amount));
            cont.bindings.previous = match use_player(state, cont, &player) {
                Some(p) => {
                    actions::lose_life(state, p, amount);
                    i32::try_from(amount).unwrap_or(i32::MAX)
                }
                None => 0,
            };
        }

        Effect::Draw { player, amount } => {
            let amount = non_negative(amount_of(state, cont, &amount));
            cont.bindings.previous = match use_player(state, cont, &player) {
                Some(p) => i32::try_from(actions::draw(state, p, amount)).unwrap_or(i32::MAX),
                None => 0,
            };
        }

        Effect::Discard { player, count: how_many } => {
            let Some(p) = use_player(state, cont, &player) else {
                cont.bindings.previous = 0;
                return None;
            };
            let hand = state.hand(p);
            let (n, exact) = match &how_many {
                DiscardCount::Exactly(amount) => (non_negative(amount_of(state, cont, amount)) as usize, true),
                DiscardCount::UpTo(amount) => (non_negative(amount_of(state, cont, amount)) as usize, false),
            };
            let n = n.min(hand.len());
            if n == 0 {
                cont.bindings.previous = 0;
            } else if exact && n == hand.len() {
                let discarded = hand.iter().filter(|card| actions::discard(state, p, **card)).count();
                cont.bindings.previous = count(discarded);
            } else {
                let request = DecisionRequest::new(
                    p,
                    DecisionKind::ChooseCards {
                        candidates: hand,
                        min: if exact { n } else { 0 },
                        max: n,
                    },
                    if exact {
                        format!("Discard {n} card(s)")
                    } else {
                        format!("Discard up to {n} card(s)")
                    },
                );
                return ask(cont, AwaitKind::Discard { player: p }, request);
            }
        }

        Effect::MoveZone { object, to, position } => {
            let moved = use_objects(state, cont, &object)
                .into_iter()
                .filter(|id| actions::move_object(state, *id, to, position).is_some())
                .count();
            cont.bindings.previous = count(moved);
        }

        Effect::Destroy { object } => {
            let destroyed = use_objects(state, cont, &object)
                .into_iter()
                .filter(|id| actions::destroy(state, *id))
                .count();
            cont.bindings.previous = count(destroyed);
        }

        Effect::Sacrifice { object } => {
            let sacrificed = use_objects(state, cont, &object)
                .into_iter()
                .filter(|id| actions::sacrifice(state, *id))
                .count();
            cont.bindings.previous = count(sacrificed);
        }

        Effect::SacrificePermanents { player, filter, count: n } => {
            let Some(p) = use_player(state, cont, &player) else {
                cont.bindings.previous = 0;
                return None;
            };
            let n = non_negative(amount_of(state, cont, &n)) as usize;
            let view = state.project();
            let ctx = FilterContext::new(p, Some(cont.bindings.source));
            let candidates: Vec<EntityId> = Filter { zone: Zone::Battlefield, ..filter }
                .select(state, &view, &ctx)
                .into_iter()
                .filter(|id| view.controller(*id) == Some(p))
                .collect();
            if n == 0 || candidates.is_empty() {
                cont.bindings.previous = 0;
            } else if candidates.len() <= n {
                let sacrificed = candidates.iter().filter(|id| actions::sacrifice(state, **id)).count();
                cont.bindings.previous = count(sacrificed);
            } else {
                let request = DecisionRequest::new(
                    p,
                    DecisionKind::ChooseCards {
                        candidates,
                        min: n,
                        max: n,
                    },
                    format!("Sacrifice {n} permanent(s)"),
                );
                return ask(cont, AwaitKind::Sacrifice { player: p }, request);
            }
        }

        Effect::ModifyStats {
            object,
            power,
            toughness,
            duration,
        } => {
            let power = amount_of(state, cont, &power);
            let toughness = amount_of(state, cont, &toughness);
            let ids = use_objects(state, cont, &object);
            let ids = on_battlefield(state, ids);
            for id in &ids {
                add_effect(state, cont, Affected::Object(*id), Modification::pump(power, toughness), duration);
            }
            cont.bindings.previous = count(ids.len());
        }

        Effect::ModifyStatsAll {
            filter,
            power,
            toughness,
            duration,
        } => {
            let power = amount_of(state, cont, &power);
            let toughness = amount_of(state, cont, &toughness);
            let view = state.project();
            let ids = filter.select(state, &view, &filter_context(cont));
            let affected = ids.len();
            if affected > 0 {
                add_effect(state, cont, Affected::Objects(ids), Modification::pump(power, toughness), duration);
            }
            cont.bindings.previous = count(affected);
        }

        Effect::GrantKeyword { object, keyword, duration } => {
            let ids = use_objects(state, cont, &object);
            let ids = on_battlefield(state, ids);
            for id in &ids {
                add_effect(state, cont, Affected::Object(*id), Modification::AddKeyword(keyword), duration);
            }
            cont.bindings.previous = count(ids.len());
        }

        Effect::GrantAbility { object, ability, duration } => {
            let ids = use_objects(state, cont, &object);
            let ids = on_battlefield(state, ids);
            for id in &ids {
                add_effect(state, cont, Affected::Object(*id), Modification::AddAbility(ability.clone()), duration);
            }
            cont.bindings.previous = count(ids.len());
        }

        Effect::Tap { object } => {
            let tapped = use_objects(state, cont, &object)
                .into_iter()
                .filter(|id| actions::tap(state, *id))
                .count();
            cont.bindings.previous = count(tapped);
        }

        Effect::Untap { object } => {
            let untapped = use_objects(state, cont, &object)
                .into_iter()
                .filter(|id| actions::untap(state, *id))
                .count();
            cont.bindings.previous = count(untapped);
        }

        Effect::ChangeControl { object, to, duration } => {
            let Some(new_controller) = use_player(state, cont, &to) else {
                cont.bindings.previous = 0;
                return None;
            };
            let ids = use_objects(state, cont, &object);
            let ids = on_battlefield(state, ids);
            for id in &ids {
                add_effect(state, cont, Affected::Object(*id), Modification::ChangeController(new_controller), duration);
                if let Some(obj) = state.object_mut(*id) {
                    obj.summoning_sick = true;
                }
                state.emit(GameEvent::ControlChanged {
                    permanent: *id,
                    controller: new_controller,
                });
            }
            cont.bindings.previous = count(ids.len());
        }

        Effect::CreateToken {
            definition,
            count: n,
            controller,
        } => {
            let n = non_negative(amount_of(state, cont, &n));
            let Some(p) = use_player(state, cont, &controller) else {
                cont.bindings.previous = 0;
                return None;
            };
            for _ in 0..n {
                actions::create_token(state, definition.clone(), p);
            }
            cont.bindings.previous = i32::try_from(n).unwrap_or(i32::MAX);
        }

        Effect::CreateTokenCopy { object, controller } => {
            let original = use_objects(state, cont, &object)
                .into_iter()
                .find_map(|id| copied_card(state, id));
            let controller = use_player(state, cont, &controller);
            cont.bindings.previous = match (original, controller) {
                (Some(card), Some(p)) => {
                    actions::create_token(state, card, p);
                    1
                }
                _ => 0,
            };
        }

        Effect::AddCounters { object, kind, amount } => {
            let amount = non_negative(amount_of(state, cont, &amount));
            let added = use_objects(state, cont, &object)
                .into_iter()
                .filter(|id| actions::add_counters(state, *id, kind, amount))
                .count();
            cont.bindings.previous = count(added);
        }

        Effect::AddMana { player, mana } => {
            let Some(p) = use_player(state, cont, &player) else {
                cont.bindings.previous = 0;
                return None;
            };
            for unit in &mana {
                state.players[p].mana_pool.add(*unit, 1);
            }
            let amount = u32::try_from(mana.len()).unwrap_or(u32::MAX);
            state.emit(GameEvent::ManaAdded { player: p, amount });
            cont.bindings.previous = count(mana.len());
        }

        Effect::CounterSpell { spell } => {
            let countered = use_objects(state, cont, &spell)
                .into_iter()
                .filter(|id| actions::counter_spell(state, *id))
                .count();
            cont.bindings.previous = count(countered);
        }

        Effect::Shuffle { player } => {
            cont.bindings.previous = match use_player(state, cont, &player) {
                Some(p) => {
                    state.shuffle_library(p);
                    state.emit(GameEvent::Shuffled { player: p });
                    1
                }
                None => 0,
            };
        }

        Effect::Sequence(children) => cont.frames.push(Frame::Sequence {
            remaining: VecDeque::from(children),
        }),

        Effect::Composite(children) => cont.frames.push(Frame::Composite {
            remaining: VecDeque::from(children),
            base: cont.bindings.previous,
            total: 0,
            started: false,
        }),

        Effect::Conditional {
            condition,
            then,
            otherwise,
        } => {
            let view = state.project();
            let holds = condition.evaluate(state, &view, &filter_context(cont), cont.bindings.previous);
            cont.frames.push(Frame::Eval(if holds { *then } else { *otherwise }));
        }

        Effect::May { player, prompt, effect } => {
            let Some(p) = use_player(state, cont, &player) else {
                cont.bindings.previous = 0;
                return None;
            };
            let request = DecisionRequest::new(p, DecisionKind::YesNo, prompt);
            return ask(cont, AwaitKind::May { effect }, request);
        }

        Effect::RepeatWhile { condition, effect, max } => cont.frames.push(Frame::Repeat {
            condition,
            effect: *effect,
            remaining: max,
        }),

        Effect::ForEach { set, effect } => {
            let items = members(state, cont, &set);
            cont.frames.push(Frame::ForEach {
                items,
                next: 0,
                effect: *effect,
                started: false,
            });
        }

        Effect::Tag { name, effect } => {
            cont.frames.push(Frame::Tag { name });
            cont.frames.push(Frame::Eval(*effect));
        }

        Effect::ChooseMode { player, modes } => {
            let Some(p) = use_player(state, cont, &player) else {
                cont.bindings.previous = 0;
                return None;
            };
            let options = modes.iter().map(|m| m.label.clone()).collect();
            let effects = modes.into_iter().map(|m| m.effect).collect();
            let request = DecisionRequest::new(p, DecisionKind::ChooseOption { options }, "Choose one");
            return ask(cont, AwaitKind::Mode { effects }, request);
        }

        Effect::ChooseObjects {
            player,
            filter,
            min,
            max,
            tag,
        } => {
            let Some(p) = use_player(state, cont, &player) else {
                cont.bindings.previous = 0;
                return None;
            };
            let view = state.project();
            let candidates = filter.select(state, &view, &FilterContext::new(p, Some(cont.bindings.source)));
            if candidates.len() <= min {
                cont.bindings.previous = count(candidates.len());
                cont.bindings.tags.insert(
                    tag,
                    TagValue {
                        amount: count(candidates.len()),
                        objects: candidates,
                    },
                );
            } else {
                let max = max.min(candidates.len());
                let request = DecisionRequest::new(
                    p,
                    DecisionKind::ChooseCards { candidates, min, max },
                    format!("Choose {min} to {max}"),
                );
                return ask(cont, AwaitKind::ChooseObjects { tag }, request);
            }
        }

        Effect::ChooseNumber { player, min, max, tag } => {
            let Some(p) = use_player(state, cont, &player) else {
                cont.bindings.previous = 0;
                return None;
            };
            let request = DecisionRequest::new(p, DecisionKind::ChooseNumber { min, max }, format!("Choose a number from {min} to {max}"));
            return ask(cont, AwaitKind::Number { tag }, request);
        }
    }
    None
}

fn add_effect(state: &mut GameState, cont: &Continuation, affected: Affected, modification: Modification, duration: Duration) {
    let id = state.next_effect_id();
    let effect = ContinuousEffect::new(id, cont.bindings.source, cont.bindings.controller, affected, modification).with_duration(duration);
    state.effects.push_back(effect);
}

fn on_battlefield(state: &GameState, ids: Vec<EntityId>) -> Vec<EntityId> {
    ids.into_iter().filter(|id| state.zones.is_in(*id, Zone::Battlefield)).collect()
}

/// Resolve the members of a `ForEach` set.
fn members(state: &mut GameState, cont: &Continuation, set: &ForEachSet) -> Vec<EntityId> {
    match set {
        ForEachSet::Fixed(ids) => ids.clone(),
        ForEachSet::Targets(slot) => use_objects(state, cont, &ObjectRef::Target(*slot)),
        ForEachSet::Tagged(name) => cont.bindings.tag(name).map(|t| t.objects.clone()).unwrap_or_default(),
        ForEachSet::Players => state.apnap().into_iter().map(EntityId::player).collect(),
        ForEachSet::Opponents => state
            .apnap()
            .into_iter()
            .filter(|p| *p != cont.bindings.controller)
            .map(EntityId::player)
            .collect(),
        ForEachSet::Objects(filter) => {
            let view = state.project();
            filter.select(state, &view, &filter_context(cont))
        }
    }
}

/// A card carrying the copiable values of `id`, for a token copy.
fn copied_card(state: &GameState, id: EntityId) -> Option<Arc<CardDefinition>> {
    let card = &state.object(id)?.card;
    let (characteristics, abilities) = layers::copiable_values(state, id)?;
    Some(Arc::new(CardDefinition {
        characteristics,
        abilities,
        ..CardDefinition::clone(card)
    }))
}

/// Resolve an object reference for use, emitting `Fizzled` for targets
/// that are no longer legal.
fn use_objects(state: &mut GameState, cont: &Continuation, reference: &ObjectRef) -> Vec<EntityId> {
    let view = state.project();
    let (ids, fizzled) = resolve_objects(state, &view, cont, reference);
    for target in fizzled {
        tracing::debug!(object = %cont.bindings.object, %target, "target no longer legal");
        state.emit(GameEvent::Fizzled {
            object: cont.bindings.object,
            target: Some(target),
        });
    }
    ids
}

fn use_player(state: &mut GameState, cont: &Continuation, reference: &PlayerRef) -> Option<PlayerId> {
    let view = state.project();
    let (player, fizzled) = resolve_player(state, &view, cont, reference);
    for target in fizzled {
        state.emit(GameEvent::Fizzled {
            object: cont.bindings.object,
            target: Some(target),
        });
    }
    player
}

/// Legal targets of `slot`, and the ones that are no longer legal.
fn targets(state: &GameState, view: &Projection, cont: &Continuation, slot: usize) -> (Vec<EntityId>, Vec<EntityId>) {
    let bindings = &cont.bindings;
    let Some(chosen) = bindings.targets.get(slot) else {
        return (Vec::new(), Vec::new());
    };
    let Some(spec) = bindings.target_specs.get(slot) else {
        return (chosen.clone(), Vec::new());
    };
    let ctx = bindings.target_context();
    chosen
        .iter()
        .copied()
        .partition(|id| check_target(state, view, spec, &ctx, *id).is_ok())
}

fn resolve_objects(
    state: &GameState,
    view: &Projection,
    cont: &Continuation,
    reference: &ObjectRef,
) -> (Vec<EntityId>, Vec<EntityId>) {
    let bindings = &cont.bindings;
    let ids = match reference {
        ObjectRef::Source => vec![bindings.source],
        ObjectRef::Target(slot) => return targets(state, view, cont, *slot),
        ObjectRef::Iterated => bindings.iterated.last().copied().into_iter().collect(),
        ObjectRef::Chosen(tag) => bindings
            .tag(tag)
            .map(|t| {
                t.objects
                    .iter()
                    .copied()
                    .filter(|id| state.objects.contains_key(id) || id.is_player(state.player_count()))
                    .collect()
            })
            .unwrap_or_default(),
        ObjectRef::Triggering => bindings.triggering.into_iter().collect(),
        ObjectRef::AttachedTo => state
            .object(bindings.source)
            .and_then(|o| o.attached_to)
            .into_iter()
            .collect(),
        ObjectRef::Specific(id) => vec![*id],
        ObjectRef::Player(player) => {
            let (player, fizzled) = resolve_player(state, view, cont, player);
            return (player.map(EntityId::player).into_iter().collect(), fizzled);
        }
    };
    (ids, Vec::new())
}

fn resolve_player(
    state: &GameState,
    view: &Projection,
    cont: &Continuation,
    reference: &PlayerRef,
) -> (Option<PlayerId>, Vec<EntityId>) {
    let bindings = &cont.bindings;
    let player_count = state.player_count();
    let (player, fizzled) = match reference {
        PlayerRef::Controller => (Some(bindings.controller), Vec::new()),
        PlayerRef::Target(slot) => {
            let (legal, fizzled) = targets(state, view, cont, *slot);
            (legal.into_iter().find_map(|id| id.as_player(player_count)), fizzled)
        }
        PlayerRef::Iterated => (bindings.iterated.last().and_then(|id| id.as_player(player_count)), Vec::new()),
        PlayerRef::Active => (Some(state.turn.active), Vec::new()),
        PlayerRef::ControllerOf(object) => {
            let (ids, fizzled) = resolve_objects(state, view, cont, object);
            let controller = ids.first().and_then(|id| {
                id.as_player(player_count)
                    .or_else(|| view.controller(*id))
                    .or_else(|| state.last_known.get(id).map(|o| o.controller))
            });
            (controller, fizzled)
        }
        PlayerRef::Triggering => (bindings.triggering_player, Vec::new()),
        PlayerRef::Specific(p) => (Some(*p), Vec::new()),
    };
    (player.filter(|p| state.players[*p].in_game()), fizzled)
}

fn amount_of(state: &GameState, cont: &Continuation, amount: &Amount) -> i32 {
    let bindings = &cont.bindings;
    match amount {
        Amount::Fixed(n) => *n,
        Amount::Previous => bindings.previous,
        Amount::Tagged(name) => bindings.tag(name).map_or(0, |t| t.amount),
        Amount::CountOf(filter) => {
            let view = state.project();
            count(filter.count(state, &view, &filter_context(cont)))
        }
        Amount::PowerOf(object) => {
            let view = state.project();
            let (ids, _) = resolve_objects(state, &view, cont, object);
            ids.first()
                .and_then(|id| view.power(*id).or_else(|| state.last_known.get(id).and_then(|o| o.power())))
                .unwrap_or(0)
        }
        Amount::HandSize(player) => {
            let view = state.project();
            let (player, _) = resolve_player(state, &view, cont, player);
            player.map_or(0, |p| count(state.hand(p).len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cards::{CardDefinition, CardId};
    use crate::core::GameConfig;
    use crate::effects::{Bindings, TargetSpec};
    use crate::zones::ZoneId;
    use crate::mana::ManaCost;

    fn p(n: u8) -> PlayerId {
        PlayerId::new(n)
    }

    fn bear() -> Arc<CardDefinition> {
        Arc::new(CardDefinition::creature(CardId::new(1), "Bear", ManaCost::parse("{1}{G}").unwrap(), 2, 2))
    }

    fn continuation(state: &mut GameState, effect: Effect) -> Continuation {
        let source = state.put_onto_battlefield(bear(), p(0));
        let object = state.alloc_entity();
        Continuation::new(effect, Bindings::new(object, source, p(0)))
    }

    #[test]
    fn test_sequence_passes_previous() {
        let mut state = GameState::new(GameConfig::new(2));
        for _ in 0..3 {
            state.add_card(bear(), p(0), ZoneId::library(p(0)));
        }
        let effect = Effect::sequence([
            Effect::draw(PlayerRef::Controller, 2),
            Effect::GainLife {
                player: PlayerRef::Controller,
                amount: Amount::Previous,
            },
        ]);
        let mut cont = continuation(&mut state, effect);

        assert_eq!(run(&mut state, &mut cont), Outcome::Completed);
        assert_eq!(state.hand(p(0)).len(), 2);
        assert_eq!(state.players[p(0)].life, 22);
    }

    #[test]
    fn test_composite_sums_children() {
        let mut state = GameState::new(GameConfig::new(2));
        let effect = Effect::composite([
            Effect::lose_life(PlayerRef::Specific(p(1)), 2),
            Effect::lose_life(PlayerRef::Specific(p(1)), 3),
        ]);
        let mut cont = continuation(&mut state, effect);

        assert_eq!(run(&mut state, &mut cont), Outcome::Completed);
        assert_eq!(cont.bindings.previous, 5);
        assert_eq!(state.players[p(1)].life, 15);
    }

    #[test]
    fn test_may_suspends_and_resumes() {
        let mut state = GameState::new(GameConfig::new(2));
        let mut cont = continuation(&mut state, Effect::may("Gain 3 life?", Effect::gain_life(PlayerRef::Controller, 3)));

        let Outcome::Suspended(request) = run(&mut state, &mut cont) else {
            panic!("expected a question");
        };
        assert_eq!(request.kind, DecisionKind::YesNo);
        assert_eq!(request.player, p(0));
        assert_eq!(state.players[p(0)].life, 20);

        resume(&mut state, &mut cont, &Response::YesNo(true)).unwrap();
        assert_eq!(run(&mut state, &mut cont), Outcome::Completed);
        assert_eq!(state.players[p(0)].life, 23);
    }

    #[test]
    fn test_declined_may_does_nothing() {
        let mut state = GameState::new(GameConfig::new(2));
        let mut cont = continuation(&mut state, Effect::may("Gain 3 life?", Effect::gain_life(PlayerRef::Controller, 3)));
        run(&mut state, &mut cont);
        resume(&mut state, &mut cont, &Response::YesNo(false)).unwrap();
        assert_eq!(run(&mut state, &mut cont), Outcome::Completed);
        assert_eq!(state.players[p(0)].life, 20);
        assert_eq!(cont.bindings.previous, 0);
    }

    #[test]
    fn test_for_each_binds_iterated() {
        let mut state = GameState::new(GameConfig::new(3));
        let effect = Effect::for_each(ForEachSet::Opponents, Effect::lose_life(PlayerRef::Iterated, 1));
        let mut cont = continuation(&mut state, effect);

        assert_eq!(run(&mut state, &mut cont), Outcome::Completed);
        assert_eq!(state.players[p(0)].life, 20);
        assert_eq!(state.players[p(1)].life, 19);
        assert_eq!(state.players[p(2)].life, 19);
        assert!(cont.bindings.iterated.is_empty());
    }

    #[test]
    fn test_discard_whole_hand_without_asking() {
        let mut state = GameState::new(GameConfig::new(2));
        state.add_card(bear(), p(0), ZoneId::hand(p(0)));
        let effect = Effect::Discard {
            player: PlayerRef::Controller,
            count: DiscardCount::Exactly(Amount::Fixed(2)),
        };
        let mut cont = continuation(&mut state, effect);

        assert_eq!(run(&mut state, &mut cont), Outcome::Completed);
        assert!(state.hand(p(0)).is_empty());
        assert_eq!(cont.bindings.previous, 1);
    }

    #[test]
    fn test_discard_asks_when_there_is_a_choice() {
        let mut state = GameState::new(GameConfig::new(2));
        let a = state.add_card(bear(), p(0), ZoneId::hand(p(0)));
        state.add_card(bear(), p(0), ZoneId::hand(p(0)));
        let effect = Effect::Discard {
            player: PlayerRef::Controller,
            count: DiscardCount::Exactly(Amount::Fixed(1)),
        };
        let mut cont = continuation(&mut state, effect);

        let Outcome::Suspended(request) = run(&mut state, &mut cont) else {
            panic!("expected a question");
        };
        assert!(matches!(request.kind, DecisionKind::ChooseCards { min: 1, max: 1, .. }));
        resume(&mut state, &mut cont, &Response::Cards(vec![a])).unwrap();
        assert_eq!(run(&mut state, &mut cont), Outcome::Completed);
        assert_eq!(state.hand(p(0)).len(), 1);
        assert_eq!(state.graveyard(p(0)).len(), 1);
    }

    #[test]
    fn test_illegal_target_is_skipped() {
        let mut state = GameState::new(GameConfig::new(2));
        let victim = state.put_onto_battlefield(bear(), p(1));
        let mut cont = continuation(&mut state, Effect::damage_target(0, 3));
        cont.bindings.target_specs = vec![TargetSpec::creature()];
        cont.bindings.targets = vec![vec![victim]];
        actions::move_object(&mut state, victim, Zone::Hand, crate::zones::ZonePosition::Top);

        assert_eq!(run(&mut state, &mut cont), Outcome::Completed);
        assert_eq!(cont.bindings.previous, 0);
        assert!(state
            .events()
            .any(|e| matches!(e, GameEvent::Fizzled { target: Some(t), .. } if *t == victim)));
    }

    #[test]
    fn test_tag_records_result() {
        let mut state = GameState::new(GameConfig::new(2));
        let effect = Effect::sequence([
            Effect::tag("lost", Effect::lose_life(PlayerRef::Specific(p(1)), 4)),
            Effect::gain_life(PlayerRef::Controller, 1),
            Effect::GainLife {
                player: PlayerRef::Controller,
                amount: Amount::Tagged("lost".into()),
            },
        ]);
        let mut cont = continuation(&mut state, effect);
        run(&mut state, &mut cont);
        assert_eq!(state.players[p(0)].life, 25);
    }

    #[test]
    fn test_choose_mode() {
        let mut state = GameState::new(GameConfig::new(2));
        let effect = Effect::choose_mode([
            crate::effects::Mode::new("Gain 2", Effect::gain_life(PlayerRef::Controller, 2)),
            crate::effects::Mode::new("Opponent loses 2", Effect::lose_life(PlayerRef::Specific(p(1)), 2)),
        ]);
        let mut cont = continuation(&mut state, effect);
        let Outcome::Suspended(request) = run(&mut state, &mut cont) else {
            panic!("expected a question");
        };
        assert!(matches!(&request.kind, DecisionKind::ChooseOption { options } if options.len() == 2));
        resume(&mut state, &mut cont, &Response::Option(1)).unwrap();
        run(&mut state, &mut cont);
        assert_eq!(state.players[p(1)].life, 18);
        assert_eq!(state.players[p(0)].life, 20);
    }

    #[test]
    fn test_resume_without_question_is_invariant_violation() {
        let mut state = GameState::new(GameConfig::new(2));
        let mut cont = continuation(&mut state, Effect::Nothing);
        run(&mut state, &mut cont);
        let err = resume(&mut state, &mut cont, &Response::YesNo(true)).unwrap_err();
        assert!(!err.is_illegal());
    }
}
