//! Casting spells, activating abilities and playing lands.
//!
//! Every check runs before anything changes: a rejected action leaves no
//! tapped lands, spent mana or moved cards behind.

use crate::cards::{Ability, ActivatedAbility, CardType, Keyword, ManaAbility, StaticEffect, Timing};
use crate::core::error::{ActivationRestriction, CastRestriction, IllegalAction, LandRestriction};
use crate::core::{EntityId, GameState, PaymentStrategy, PlayerId};
use crate::effects::{validate_selection, FilterContext, TargetContext, TargetSpec};
use crate::layers::Projection;
use crate::mana::{effective_cost, solve, CostReduction, ManaCost, ManaPayment, ManaSource, PaymentError};
use crate::stack::{self, priority, StackObject, StackObjectKind};
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZonePosition};

use super::actions;

/// Main phase of `player`'s own turn with an empty stack.
#[must_use]
pub fn sorcery_timing(state: &GameState, player: PlayerId) -> bool {
    state.turn.active == player && state.turn.step.is_main() && state.stack.is_empty()
}

/// Untapped permanents `player` can tap for mana right now.
#[must_use]
pub fn mana_sources(state: &GameState, view: &Projection, player: PlayerId) -> Vec<ManaSource> {
    state
        .permanents_of(view, player)
        .into_iter()
        .filter(|id| can_tap(state, view, *id))
        .filter_map(|id| {
            let ability = view.get(id)?.abilities.iter().find_map(Ability::as_mana)?;
            Some(ManaSource::new(id, ability.produces.iter().copied()))
        })
        .collect()
}

fn can_tap(state: &GameState, view: &Projection, id: EntityId) -> bool {
    let Some(obj) = state.object(id) else {
        return false;
    };
    let sick = obj.summoning_sick && view.get(id).is_some_and(|o| o.is_creature()) && !view.has_keyword(id, Keyword::Haste);
    !obj.tapped && !sick
}

/// Cost reductions from static abilities on the battlefield that apply to
/// `spell` cast by its owner.
fn reductions_for(state: &GameState, view: &Projection, spell: EntityId) -> Vec<CostReduction> {
    let mut found = Vec::new();
    for id in state.battlefield() {
        let Some(obj) = view.get(id) else {
            continue;
        };
        let ctx = FilterContext::new(obj.controller, Some(id));
        for ability in obj.abilities.iter().filter_map(Ability::as_static) {
            let StaticEffect::CostReduction(reduction) = &ability.effect else {
                continue;
            };
            if let Some(condition) = &ability.condition {
                if !condition.evaluate(state, view, &ctx, 0) {
                    continue;
                }
            }
            if reduction.spells.matches_object(state, view, &ctx, spell) {
                found.push(reduction.clone());
            }
        }
    }
    found
}

/// The cost `player` would pay to cast `card` now.
#[must_use]
pub fn spell_cost(state: &GameState, view: &Projection, card: EntityId) -> ManaCost {
    let base = view.get(card).map(|o| o.characteristics.mana_cost).unwrap_or_default();
    let reductions = reductions_for(state, view, card);
    effective_cost(&base, &reductions)
}

/// Find a payment for `cost` without changing anything. `exclude` is a
/// source already committed to another part of the cost.
fn plan_payment(
    state: &GameState,
    view: &Projection,
    player: PlayerId,
    cost: &ManaCost,
    strategy: &PaymentStrategy,
    exclude: Option<EntityId>,
) -> Result<ManaPayment, IllegalAction> {
    let mut sources = mana_sources(state, view, player);
    sources.retain(|s| Some(s.id) != exclude);
    if let PaymentStrategy::Explicit(allowed) = strategy {
        if let Some(missing) = allowed.iter().find(|id| !sources.iter().any(|s| s.id == **id)) {
            return Err(PaymentError::UnavailableSource(*missing).into());
        }
        sources.retain(|s| allowed.contains(&s.id));
    }
    Ok(solve(cost, &state.players[player].mana_pool, &sources)?)
}

fn apply_payment(state: &mut GameState, player: PlayerId, payment: &ManaPayment) {
    for id in &payment.tapped {
        actions::tap(state, *id);
    }
    let pool = &mut state.players[player].mana_pool;
    for mana in &payment.from_pool {
        pool.spend(*mana);
    }
    for mana in &payment.floating {
        pool.add(*mana, 1);
    }
    tracing::trace!(%player, tapped = payment.tapped.len(), floating = payment.floating.len(), "mana paid");
}

fn check_targets(
    state: &GameState,
    view: &Projection,
    specs: &[TargetSpec],
    ctx: &TargetContext,
    chosen: &[Vec<EntityId>],
) -> Result<(), IllegalAction> {
    for (spec, group) in specs.iter().zip(chosen) {
        validate_selection(state, view, spec, ctx, group)?;
    }
    Ok(())
}

/// Cast `card` from `player`'s hand.
pub fn cast(
    state: &mut GameState,
    player: PlayerId,
    card: EntityId,
    targets: &[Vec<EntityId>],
    payment: &PaymentStrategy,
) -> Result<EntityId, IllegalAction> {
    if !state.hand(player).contains(&card) {
        return Err(IllegalAction::CannotCast(CastRestriction::NotInHand(card)));
    }
    let view = state.project();
    let Some(spell) = view.get(card) else {
        return Err(IllegalAction::CannotCast(CastRestriction::NotInHand(card)));
    };
    if spell.has_type(CardType::Land) {
        return Err(IllegalAction::CannotCast(CastRestriction::IsLand));
    }
    let instant_speed = spell.has_type(CardType::Instant) || spell.has_keyword(Keyword::Flash);
    if !instant_speed && !sorcery_timing(state, player) {
        return Err(IllegalAction::CannotCast(CastRestriction::SorcerySpeed));
    }

    let Some(definition) = state.object(card).map(|o| o.card.clone()) else {
        return Err(IllegalAction::CannotCast(CastRestriction::NotInHand(card)));
    };
    let specs = &definition.spell.targets;
    if targets.len() != specs.len() {
        return Err(IllegalAction::CannotCast(CastRestriction::TargetGroups { expected: specs.len() }));
    }
    let source_colors = spell.characteristics.colors;
    let ctx = TargetContext {
        controller: player,
        source: card,
        source_colors,
    };
    check_targets(state, &view, specs, &ctx, targets)?;

    let cost = spell_cost(state, &view, card);
    let plan = plan_payment(state, &view, player, &cost, payment, None)?;

    apply_payment(state, player, &plan);
    let Some(id) = actions::move_object_under(state, card, Zone::Stack, ZonePosition::Top, player) else {
        return Err(IllegalAction::CannotCast(CastRestriction::NotInHand(card)));
    };
    let mut object = StackObject::new(
        id,
        StackObjectKind::Spell,
        player,
        id,
        definition.spell.effect.clone(),
        definition.name(),
    )
    .with_targets(specs.clone(), targets.to_vec());
    object.source_colors = source_colors;
    object.fizzle = definition.spell.fizzle;

    tracing::debug!(%player, spell = %id, name = definition.name(), %cost, "spell cast");
    stack::push(state, object);
    state.emit(GameEvent::SpellCast { spell: id, controller: player });
    priority::retain(state, player);
    Ok(id)
}

/// Activate ability `index` of `source`. Mana abilities resolve at once;
/// anything else goes on the stack.
pub fn activate(
    state: &mut GameState,
    player: PlayerId,
    source: EntityId,
    index: usize,
    targets: &[Vec<EntityId>],
    payment: &PaymentStrategy,
) -> Result<(), IllegalAction> {
    let view = state.project();
    let Some(ability) = view.get(source).and_then(|o| o.abilities.get(index)).cloned() else {
        return Err(IllegalAction::CannotActivate(ActivationRestriction::NoSuchAbility(source, index)));
    };
    if !state.zones.is_in(source, Zone::Battlefield) {
        return Err(IllegalAction::CannotActivate(ActivationRestriction::WrongZone(source)));
    }
    if view.controller(source) != Some(player) {
        return Err(IllegalAction::CannotActivate(ActivationRestriction::NotController(source)));
    }
    match ability {
        Ability::Mana(mana) => activate_mana(state, &view, player, source, &mana),
        Ability::Activated(activated) => activate_ability(state, &view, player, source, index, activated, targets, payment),
        Ability::Triggered(_) | Ability::Static(_) => {
            Err(IllegalAction::CannotActivate(ActivationRestriction::NoSuchAbility(source, index)))
        }
    }
}

fn check_tap_cost(state: &GameState, view: &Projection, source: EntityId) -> Result<(), IllegalAction> {
    if state.object(source).is_some_and(|o| o.tapped) {
        return Err(IllegalAction::CannotActivate(ActivationRestriction::Tapped(source)));
    }
    if !can_tap(state, view, source) {
        return Err(IllegalAction::CannotActivate(ActivationRestriction::SummoningSick(source)));
    }
    Ok(())
}

fn activate_mana(
    state: &mut GameState,
    view: &Projection,
    player: PlayerId,
    source: EntityId,
    ability: &ManaAbility,
) -> Result<(), IllegalAction> {
    check_tap_cost(state, view, source)?;
    actions::tap(state, source);
    let mut amount = 0;
    for unit in &ability.produces {
        if let Some(mana) = unit.options().next() {
            state.players[player].mana_pool.add(mana, 1);
            amount += 1;
        }
    }
    tracing::debug!(%player, %source, amount, "mana ability");
    state.emit(GameEvent::ManaAdded { player, amount });
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn activate_ability(
    state: &mut GameState,
    view: &Projection,
    player: PlayerId,
    source: EntityId,
    index: usize,
    ability: ActivatedAbility,
    targets: &[Vec<EntityId>],
    payment: &PaymentStrategy,
) -> Result<(), IllegalAction> {
    let cost = &ability.cost;
    if cost.tap {
        check_tap_cost(state, view, source)?;
    }
    if i64::from(state.players[player].life) < i64::from(cost.life) {
        return Err(IllegalAction::CannotActivate(ActivationRestriction::InsufficientLife));
    }
    let turn = state.turn.number;
    if ability.once_per_turn && state.object(source).is_some_and(|o| o.activated_on_turn(index, turn)) {
        return Err(IllegalAction::CannotActivate(ActivationRestriction::OncePerTurn));
    }
    if ability.timing == Timing::Sorcery && !sorcery_timing(state, player) {
        return Err(IllegalAction::CannotActivate(ActivationRestriction::SorcerySpeed));
    }
    if targets.len() != ability.targets.len() {
        return Err(IllegalAction::CannotActivate(ActivationRestriction::TargetGroups {
            expected: ability.targets.len(),
        }));
    }
    let source_colors = view.get(source).map(|o| o.characteristics.colors).unwrap_or_default();
    let ctx = TargetContext {
        controller: player,
        source,
        source_colors,
    };
    check_targets(state, view, &ability.targets, &ctx, targets)?;

    let exclude = (cost.tap || cost.sacrifice_self).then_some(source);
    let plan = plan_payment(state, view, player, &cost.mana, payment, exclude)?;

    apply_payment(state, player, &plan);
    if cost.tap {
        actions::tap(state, source);
    }
    if cost.life > 0 {
        actions::lose_life(state, player, cost.life);
    }
    if let Some(obj) = state.object_mut(source) {
        obj.activations.insert(index, turn);
    }
    if cost.sacrifice_self {
        actions::sacrifice(state, source);
    }

    let id = state.alloc_entity();
    let mut object = StackObject::new(id, StackObjectKind::Ability, player, source, ability.effect, ability.description)
        .with_targets(ability.targets, targets.to_vec());
    object.source_colors = source_colors;
    object.fizzle = ability.fizzle;

    tracing::debug!(%player, %source, index, "ability activated");
    stack::push(state, object);
    state.emit(GameEvent::AbilityActivated { source, controller: player });
    priority::retain(state, player);
    Ok(())
}

/// Play `card` from `player`'s hand as their land for the turn.
pub fn play_land(state: &mut GameState, player: PlayerId, card: EntityId) -> Result<EntityId, IllegalAction> {
    if !state.hand(player).contains(&card) {
        return Err(IllegalAction::CannotPlayLand(LandRestriction::NotInHand(card)));
    }
    let is_land = state.project().get(card).is_some_and(|o| o.has_type(CardType::Land));
    if !is_land {
        return Err(IllegalAction::CannotPlayLand(LandRestriction::NotALand(card)));
    }
    if !sorcery_timing(state, player) {
        return Err(IllegalAction::CannotPlayLand(LandRestriction::Timing));
    }
    if state.players[player].lands_played >= state.config.lands_per_turn {
        return Err(IllegalAction::CannotPlayLand(LandRestriction::NoLandDropsLeft));
    }

    let Some(land) = actions::move_object_under(state, card, Zone::Battlefield, ZonePosition::Top, player) else {
        return Err(IllegalAction::CannotPlayLand(LandRestriction::NotInHand(card)));
    };
    state.players[player].lands_played += 1;
    tracing::debug!(%player, %land, "land played");
    state.emit(GameEvent::LandPlayed { player, land });
    priority::retain(state, player);
    Ok(land)
}
