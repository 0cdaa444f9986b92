//! State-based actions.
//!
//! Each pass looks at one projection and collects every action that
//! applies, then performs them all at once. Passes repeat until one finds
//! nothing to do.

use crate::cards::{CounterKind, Keyword};
use crate::core::{EntityId, GameResult, GameState, LossReason, PlayerId};
use crate::effects::{FilterContext, TargetKind};
use crate::layers::Projection;
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZonePosition};

use super::actions;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StateBasedAction {
    PlayerLoses(PlayerId, LossReason),
    ZeroToughness(EntityId),
    LethalDamage(EntityId),
    AuraFallsOff(EntityId),
    TokenCeases(EntityId),
    AnnihilateCounters(EntityId, u32),
}

/// Perform state-based actions until none apply. Returns whether any were
/// performed.
pub fn check(state: &mut GameState) -> bool {
    let mut any = false;
    loop {
        if state.is_over() {
            return any;
        }
        let found = collect(state);
        if found.is_empty() {
            return any;
        }
        any = true;
        tracing::debug!(count = found.len(), "state-based actions");
        for action in found {
            perform(state, action);
        }
        end_game_if_decided(state);
    }
}

fn collect(state: &GameState) -> Vec<StateBasedAction> {
    let mut found = Vec::new();
    for (player, p) in state.players.iter() {
        if !p.in_game() {
            continue;
        }
        if p.life <= 0 {
            found.push(StateBasedAction::PlayerLoses(player, LossReason::ZeroLife));
        } else if p.drew_from_empty {
            found.push(StateBasedAction::PlayerLoses(player, LossReason::DrewFromEmptyLibrary));
        }
    }

    let view = state.project();
    for id in state.battlefield() {
        let (Some(obj), Some(projected)) = (state.object(id), view.get(id)) else {
            continue;
        };
        if projected.is_creature() {
            let toughness = projected.toughness().unwrap_or(0);
            if toughness <= 0 {
                found.push(StateBasedAction::ZeroToughness(id));
            } else if !projected.has_keyword(Keyword::Indestructible)
                && (i64::from(obj.damage) >= i64::from(toughness) || (obj.damage > 0 && obj.deathtouch_damage))
            {
                found.push(StateBasedAction::LethalDamage(id));
            }
        }
        if obj.card.is_aura() && !aura_attachment_legal(state, &view, id) {
            found.push(StateBasedAction::AuraFallsOff(id));
        }
        let plus = obj.counter(CounterKind::PlusOne);
        let minus = obj.counter(CounterKind::MinusOne);
        if plus > 0 && minus > 0 {
            found.push(StateBasedAction::AnnihilateCounters(id, plus.min(minus)));
        }
    }

    for obj in state.objects.values() {
        if obj.is_token && !state.zones.is_in(obj.id, Zone::Battlefield) {
            found.push(StateBasedAction::TokenCeases(obj.id));
        }
    }
    found
}

/// An aura must be attached to a permanent its enchant requirement still
/// accepts, and which has no protection from the aura's colors.
fn aura_attachment_legal(state: &GameState, view: &Projection, aura: EntityId) -> bool {
    let Some(obj) = state.object(aura) else {
        return false;
    };
    let Some(host) = obj.attached_to else {
        return false;
    };
    let Some(enchanted) = view.get(host) else {
        return false;
    };
    if !state.zones.is_in(host, Zone::Battlefield) {
        return false;
    }
    let colors = view.get(aura).map(|a| a.characteristics.colors).unwrap_or_default();
    let protected = enchanted
        .characteristics
        .keywords
        .iter()
        .any(|k| matches!(k, Keyword::ProtectionFrom(c) if colors.contains(*c)));
    if protected {
        return false;
    }
    let ctx = FilterContext::new(obj.controller, Some(aura));
    match obj.card.spell.targets.first().map(|spec| &spec.kind) {
        Some(TargetKind::Object(filter) | TargetKind::ObjectOrPlayer { objects: filter, .. }) => {
            filter.matches(state, view, &ctx, host)
        }
        Some(TargetKind::Player(_)) => false,
        None => true,
    }
}

fn perform(state: &mut GameState, action: StateBasedAction) {
    match action {
        StateBasedAction::PlayerLoses(player, reason) => actions::lose_game(state, player, reason),
        StateBasedAction::ZeroToughness(id) | StateBasedAction::LethalDamage(id) | StateBasedAction::AuraFallsOff(id) => {
            if state.zones.is_in(id, Zone::Battlefield) {
                actions::move_object(state, id, Zone::Graveyard, ZonePosition::Top);
            }
        }
        StateBasedAction::TokenCeases(id) => {
            state.zones.remove(id);
            state.objects.remove(&id);
        }
        StateBasedAction::AnnihilateCounters(id, amount) => {
            if let Some(obj) = state.object_mut(id) {
                obj.remove_counters(CounterKind::PlusOne, amount);
                obj.remove_counters(CounterKind::MinusOne, amount);
            }
        }
    }
}

/// End the game once at most one player remains. A solitaire game ends
/// in a draw when its only player loses.
pub fn end_game_if_decided(state: &mut GameState) {
    if state.is_over() {
        return;
    }
    let remaining: Vec<PlayerId> = state.players_in_game().collect();
    let result = match remaining.as_slice() {
        [] => GameResult::Draw,
        [winner] if state.player_count() > 1 => GameResult::Winner(*winner),
        _ => return,
    };
    let winner = match result {
        GameResult::Winner(p) => Some(p),
        GameResult::Draw => None,
    };
    tracing::info!(?result, "game over");
    state.result = Some(result);
    state.turn.priority = None;
    state.emit(GameEvent::GameEnded { winner });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cards::{CardDefinition, CardId};
    use crate::core::GameConfig;
    use crate::effects::{Filter, TargetSpec};
    use crate::mana::ManaCost;

    fn p(n: u8) -> PlayerId {
        PlayerId::new(n)
    }

    fn creature(power: i32, toughness: i32) -> Arc<CardDefinition> {
        Arc::new(CardDefinition::creature(CardId::new(1), "Creature", ManaCost::generic(1), power, toughness))
    }

    #[test]
    fn test_nothing_to_do() {
        let mut state = GameState::new(GameConfig::new(2));
        state.put_onto_battlefield(creature(2, 2), p(0));
        assert!(!check(&mut state));
    }

    #[test]
    fn test_lethal_damage_destroys() {
        let mut state = GameState::new(GameConfig::new(2));
        let bear = state.put_onto_battlefield(creature(2, 2), p(0));
        state.object_mut(bear).unwrap().damage = 2;

        assert!(check(&mut state));
        assert!(state.battlefield().is_empty());
        assert_eq!(state.graveyard(p(0)).len(), 1);
    }

    #[test]
    fn test_indestructible_survives_damage_but_not_zero_toughness() {
        let mut state = GameState::new(GameConfig::new(2));
        let card = CardDefinition::creature(CardId::new(2), "Wall", ManaCost::generic(1), 0, 3).with_keyword(Keyword::Indestructible);
        let wall = state.put_onto_battlefield(Arc::new(card), p(0));
        state.object_mut(wall).unwrap().damage = 5;
        assert!(!check(&mut state));

        state.object_mut(wall).unwrap().add_counters(CounterKind::MinusOne, 3);
        assert!(check(&mut state));
        assert!(state.battlefield().is_empty());
    }

    #[test]
    fn test_deathtouch_damage_is_lethal() {
        let mut state = GameState::new(GameConfig::new(2));
        let giant = state.put_onto_battlefield(creature(5, 5), p(0));
        {
            let obj = state.object_mut(giant).unwrap();
            obj.damage = 1;
            obj.deathtouch_damage = true;
        }
        assert!(check(&mut state));
        assert!(state.battlefield().is_empty());
    }

    #[test]
    fn test_counters_annihilate() {
        let mut state = GameState::new(GameConfig::new(2));
        let bear = state.put_onto_battlefield(creature(2, 2), p(0));
        {
            let obj = state.object_mut(bear).unwrap();
            obj.add_counters(CounterKind::PlusOne, 3);
            obj.add_counters(CounterKind::MinusOne, 1);
        }
        assert!(check(&mut state));
        let obj = state.object(bear).unwrap();
        assert_eq!(obj.counter(CounterKind::PlusOne), 2);
        assert_eq!(obj.counter(CounterKind::MinusOne), 0);
    }

    #[test]
    fn test_unattached_aura_goes_to_graveyard() {
        let mut state = GameState::new(GameConfig::new(2));
        let aura = CardDefinition::aura(CardId::new(3), "Might", ManaCost::generic(1), TargetSpec::object(Filter::creatures()));
        let host = state.put_onto_battlefield(creature(2, 2), p(0));
        let might = state.put_onto_battlefield(Arc::new(aura), p(0));
        state.object_mut(might).unwrap().attached_to = Some(host);
        assert!(!check(&mut state));

        actions::destroy(&mut state, host);
        assert!(check(&mut state));
        assert!(state.battlefield().is_empty());
    }

    #[test]
    fn test_last_player_standing_wins() {
        let mut state = GameState::new(GameConfig::new(3));
        state.players[p(1)].life = 0;
        state.players[p(2)].drew_from_empty = true;

        assert!(check(&mut state));
        assert_eq!(state.result, Some(GameResult::Winner(p(0))));
        assert_eq!(state.players[p(2)].lost, Some(LossReason::DrewFromEmptyLibrary));
        assert!(state.events().any(|e| matches!(e, GameEvent::GameEnded { winner: Some(w) } if *w == p(0))));
    }

    #[test]
    fn test_simultaneous_loss_is_a_draw() {
        let mut state = GameState::new(GameConfig::new(2));
        state.players[p(0)].life = 0;
        state.players[p(1)].life = -3;
        check(&mut state);
        assert_eq!(state.result, Some(GameResult::Draw));
    }

    #[test]
    fn test_token_ceases_off_battlefield() {
        let mut state = GameState::new(GameConfig::new(2));
        let token = actions::create_token(&mut state, creature(1, 1), p(0));
        actions::destroy(&mut state, token);
        assert!(check(&mut state));
        assert!(state.graveyard(p(0)).is_empty());
    }
}
