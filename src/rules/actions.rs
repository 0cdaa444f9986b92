//! Primitive game mutations.
//!
//! Every change the effect executor, the turn structure and the
//! state-based actions make to objects, life totals and zones goes through
//! these functions, so each one emits its event exactly once.

use std::sync::Arc;

use crate::cards::{CardDefinition, CounterKind, GameObject, Keyword};
use crate::core::{EntityId, GameState, LossReason, PlayerId};
use crate::layers::{Affected, Duration};
use crate::mana::ColorSet;
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZoneId, ZonePosition};

/// Move an object to `to` (the owner's zone for per-player kinds). The
/// object gets a new id; the new id is returned.
pub fn move_object(state: &mut GameState, id: EntityId, to: Zone, position: ZonePosition) -> Option<EntityId> {
    let owner = state.object(id)?.owner;
    move_object_under(state, id, to, position, owner)
}

/// Like [`move_object`], naming the controller the object has in its new
/// zone. Only meaningful for the battlefield and the stack; elsewhere the
/// owner controls it.
pub fn move_object_under(
    state: &mut GameState,
    id: EntityId,
    to: Zone,
    position: ZonePosition,
    controller: PlayerId,
) -> Option<EntityId> {
    let old = state.objects.get(&id)?.clone();
    let from = state.zones.zone_of(id)?;

    let previous_controller = if from.zone == Zone::Battlefield {
        let view = state.project();
        let last = view.get(id).cloned();
        let controller = last.as_ref().map_or(old.controller, |o| o.controller);
        if let Some(last) = last {
            state.last_known.insert(id, last);
        }
        controller
    } else {
        old.controller
    };

    state.zones.remove(id);
    state.objects.remove(&id);
    if from.zone == Zone::Battlefield {
        state
            .effects
            .retain(|e| !(e.source == id && e.duration == Duration::WhileSourcePresent) && e.affected != Affected::Object(id));
        if let Some(combat) = state.combat.as_mut() {
            combat.remove(id);
        }
    }

    let new_id = state.alloc_entity();
    let timestamp = state.next_timestamp();
    let mut object = GameObject::new(new_id, old.card.clone(), old.owner, timestamp);
    object.is_token = old.is_token;
    if matches!(to, Zone::Battlefield | Zone::Stack) {
        object.controller = controller;
    }
    object.summoning_sick = to == Zone::Battlefield;
    state.objects.insert(new_id, object);
    state.zones.add(new_id, ZoneId::for_owner(to, old.owner), position);

    tracing::debug!(%id, %new_id, from = %from.zone, %to, name = %old.name(), "zone change");
    state.emit(GameEvent::ZoneChanged {
        old: id,
        new: new_id,
        owner: old.owner,
        controller: previous_controller,
        from: from.zone,
        to,
    });
    Some(new_id)
}

/// Draw `count` cards. Returns how many were drawn; drawing from an empty
/// library marks the player for the state-based loss.
pub fn draw(state: &mut GameState, player: PlayerId, count: u32) -> u32 {
    let mut drawn = 0;
    for _ in 0..count {
        let Some(top) = state.zones.top(ZoneId::library(player)) else {
            state.players[player].drew_from_empty = true;
            break;
        };
        if let Some(card) = move_object(state, top, Zone::Hand, ZonePosition::Top) {
            state.emit(GameEvent::CardDrawn { player, card });
            drawn += 1;
        }
    }
    drawn
}

/// Discard one card from `player`'s hand.
pub fn discard(state: &mut GameState, player: PlayerId, card: EntityId) -> bool {
    if state.zones.zone_of(card) != Some(ZoneId::hand(player)) {
        return false;
    }
    let Some(new_id) = move_object(state, card, Zone::Graveyard, ZonePosition::Top) else {
        return false;
    };
    state.emit(GameEvent::Discarded { player, card: new_id });
    true
}

pub fn gain_life(state: &mut GameState, player: PlayerId, amount: u32) {
    if amount == 0 || !state.players[player].in_game() {
        return;
    }
    state.players[player].life = state.players[player].life.saturating_add(life_delta(amount));
    state.emit(GameEvent::LifeGained { player, amount });
}

pub fn lose_life(state: &mut GameState, player: PlayerId, amount: u32) {
    if amount == 0 || !state.players[player].in_game() {
        return;
    }
    state.players[player].life = state.players[player].life.saturating_sub(life_delta(amount));
    state.emit(GameEvent::LifeLost { player, amount });
}

fn life_delta(amount: u32) -> i32 {
    i32::try_from(amount).unwrap_or(i32::MAX)
}

/// What a damage source is at the moment it deals damage.
struct DamageSource {
    controller: Option<PlayerId>,
    colors: ColorSet,
    deathtouch: bool,
    lifelink: bool,
}

fn damage_source(state: &GameState, view: &crate::layers::Projection, source: EntityId) -> DamageSource {
    let seen = view.get(source).or_else(|| state.last_known.get(&source));
    match seen {
        Some(obj) => DamageSource {
            controller: Some(obj.controller),
            colors: obj.characteristics.colors,
            deathtouch: obj.has_keyword(Keyword::Deathtouch),
            lifelink: obj.has_keyword(Keyword::Lifelink),
        },
        None => DamageSource {
            controller: source.as_player(state.player_count()),
            colors: ColorSet::COLORLESS,
            deathtouch: false,
            lifelink: false,
        },
    }
}

/// Deal damage from `source` to a player or a creature. Returns the damage
/// actually dealt (zero if prevented by protection or if the recipient is
/// gone).
pub fn deal_damage(state: &mut GameState, source: EntityId, target: EntityId, amount: u32, combat: bool) -> u32 {
    if amount == 0 {
        return 0;
    }
    let view = state.project();
    let dealer = damage_source(state, &view, source);

    if let Some(player) = target.as_player(state.player_count()) {
        if !state.players[player].in_game() {
            return 0;
        }
        state.players[player].life = state.players[player].life.saturating_sub(life_delta(amount));
        state.emit(GameEvent::DamageDealt {
            source,
            target,
            amount,
            combat,
        });
        state.emit(GameEvent::LifeLost { player, amount });
    } else {
        let Some(recipient) = view.get(target) else {
            return 0;
        };
        if !state.zones.is_in(target, Zone::Battlefield) || !recipient.is_creature() {
            return 0;
        }
        let protected = recipient.characteristics.keywords.iter().any(|k| match k {
            Keyword::ProtectionFrom(color) => dealer.colors.contains(*color),
            _ => false,
        });
        if protected {
            tracing::debug!(%source, %target, "damage prevented by protection");
            return 0;
        }
        let Some(obj) = state.object_mut(target) else {
            return 0;
        };
        obj.damage = obj.damage.saturating_add(amount);
        obj.deathtouch_damage |= dealer.deathtouch;
        state.emit(GameEvent::DamageDealt {
            source,
            target,
            amount,
            combat,
        });
    }

    if dealer.lifelink {
        if let Some(controller) = dealer.controller {
            gain_life(state, controller, amount);
        }
    }
    amount
}

/// Destroy a permanent. Indestructible permanents survive.
pub fn destroy(state: &mut GameState, id: EntityId) -> bool {
    if !state.zones.is_in(id, Zone::Battlefield) {
        return false;
    }
    let view = state.project();
    if view.has_keyword(id, Keyword::Indestructible) {
        return false;
    }
    move_object(state, id, Zone::Graveyard, ZonePosition::Top).is_some()
}

/// Sacrifice a permanent. Indestructible does not help.
pub fn sacrifice(state: &mut GameState, id: EntityId) -> bool {
    if !state.zones.is_in(id, Zone::Battlefield) {
        return false;
    }
    let view = state.project();
    let Some(player) = view.controller(id) else {
        return false;
    };
    if move_object(state, id, Zone::Graveyard, ZonePosition::Top).is_none() {
        return false;
    }
    state.emit(GameEvent::Sacrificed { player, permanent: id });
    true
}

/// Counter a spell: it leaves the stack for its owner's graveyard.
pub fn counter_spell(state: &mut GameState, id: EntityId) -> bool {
    let Some(index) = state.stack.iter().position(|o| o.id == id) else {
        return false;
    };
    state.stack.remove(index);
    if state.zones.is_in(id, Zone::Stack) {
        move_object(state, id, Zone::Graveyard, ZonePosition::Top);
    }
    tracing::debug!(%id, "countered");
    state.emit(GameEvent::Countered { object: id });
    true
}

/// Create a token on the battlefield.
pub fn create_token(state: &mut GameState, card: Arc<CardDefinition>, controller: PlayerId) -> EntityId {
    let id = state.alloc_entity();
    let timestamp = state.next_timestamp();
    let mut token = GameObject::new(id, card, controller, timestamp);
    token.is_token = true;
    token.summoning_sick = true;
    state.objects.insert(id, token);
    state.zones.add(id, ZoneId::BATTLEFIELD, ZonePosition::Top);
    state.emit(GameEvent::TokenCreated { token: id, controller });
    id
}

pub fn tap(state: &mut GameState, id: EntityId) -> bool {
    if !state.zones.is_in(id, Zone::Battlefield) {
        return false;
    }
    match state.object_mut(id) {
        Some(obj) if !obj.tapped => {
            obj.tapped = true;
            state.emit(GameEvent::Tapped { permanent: id });
            true
        }
        _ => false,
    }
}

pub fn untap(state: &mut GameState, id: EntityId) -> bool {
    match state.object_mut(id) {
        Some(obj) if obj.tapped => {
            obj.tapped = false;
            state.emit(GameEvent::Untapped { permanent: id });
            true
        }
        _ => false,
    }
}

pub fn add_counters(state: &mut GameState, id: EntityId, kind: CounterKind, amount: u32) -> bool {
    if amount == 0 || !state.zones.is_in(id, Zone::Battlefield) {
        return false;
    }
    let Some(obj) = state.object_mut(id) else {
        return false;
    };
    obj.add_counters(kind, amount);
    state.emit(GameEvent::CountersAdded { permanent: id, amount });
    true
}

/// Remove `player` from the game: they lose, and every object they own
/// leaves with them.
pub fn lose_game(state: &mut GameState, player: PlayerId, reason: LossReason) {
    if !state.players[player].in_game() {
        return;
    }
    tracing::info!(%player, %reason, "player lost");
    state.players[player].lost = Some(reason);
    state.emit(GameEvent::PlayerLost { player });

    state.stack.retain(|o| o.controller != player);
    state.triggers.retain(|t| t.controller != player);
    let owned: Vec<EntityId> = state
        .objects
        .values()
        .filter(|o| o.owner == player)
        .map(|o| o.id)
        .collect();
    for id in owned {
        state.zones.remove(id);
        state.objects.remove(&id);
    }
    state.effects.retain(|e| e.controller != player);
    if state.turn.priority == Some(player) {
        state.turn.priority = None;
    }
}
