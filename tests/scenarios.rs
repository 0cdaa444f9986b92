//! End-to-end scenarios driven through `Engine::apply`.

mod common;

use std::sync::Arc;

use ccg_kernel::cards::{CardDefinition, CardId, Keyword};
use ccg_kernel::core::{Action, AttackDeclaration, BlockDeclaration};
use ccg_kernel::decision::Response;
use ccg_kernel::effects::{Amount, DiscardCount, Effect, PlayerRef, TargetSpec};
use ccg_kernel::mana::{Color, ManaType};
use ccg_kernel::rules::{casting, Step};
use ccg_kernel::stack::StackObjectKind;
use ccg_kernel::zones::Zone;

use common::*;

// =============================================================================
// Creature with a trigger and an activated ability
// =============================================================================

/// Casting the duelist gains 2 life from its enters trigger; activating
/// its ability later costs 1 life and kills a 1-toughness creature.
#[test]
fn test_duelist_trigger_and_ping() {
    let mut state = main_phase();
    lands(&mut state, plains(), p(0), 3);
    let card = to_hand(&mut state, duelist(), p(0));
    let squire = state.put_onto_battlefield(creature("Squire", 1, 1), p(1));

    let state = apply(&state, p(0), Action::cast(card));
    assert_eq!(state.stack.len(), 1);
    assert_eq!(state.priority_player(), Some(p(0)));

    let state = resolve_top(&state);
    let duelist_id = permanent(&state, "Sunlit Duelist");
    assert_eq!(state.stack.len(), 1);
    assert_eq!(state.stack[0].kind, StackObjectKind::Trigger);
    assert_eq!(state.stack[0].source, duelist_id);

    let mut state = resolve_top(&state);
    assert!(state.stack.is_empty());
    assert_eq!(state.players[p(0)].life, 22);

    state.object_mut(duelist_id).expect("duelist").summoning_sick = false;
    let state = apply(&state, p(0), Action::activate(duelist_id, 1, vec![vec![squire]]));
    assert_eq!(state.players[p(0)].life, 21);
    assert!(state.object(duelist_id).expect("duelist").tapped);

    let state = resolve_top(&state);
    assert!(!state.zones.is_in(squire, Zone::Battlefield));
    assert_eq!(state.graveyard(p(1)).len(), 1);
    assert_eq!(state.players[p(0)].life, 21);
    assert_eq!(state.players[p(1)].life, 20);
}

/// A summoning-sick creature cannot pay a tap cost.
#[test]
fn test_duelist_cannot_ping_while_sick() {
    let mut state = main_phase();
    lands(&mut state, plains(), p(0), 3);
    let card = to_hand(&mut state, duelist(), p(0));

    let state = resolve_top(&apply(&state, p(0), Action::cast(card)));
    let state = resolve_top(&state);
    let duelist_id = permanent(&state, "Sunlit Duelist");

    let result = ccg_kernel::Engine::apply(&state, p(0), Action::activate(duelist_id, 1, vec![vec![p(1).into()]]));
    assert!(result.is_err());
}

// =============================================================================
// Trample damage assignment
// =============================================================================

/// A 6/6 trampler blocked by toughness 2 and 3 creatures, ordered (2, 3),
/// assigns lethal damage to each and the last point to the defender.
#[test]
fn test_trample_assigns_excess_to_player() {
    let mut state = main_phase();
    let wurm = state.put_onto_battlefield(
        Arc::new(vanilla("Craw Wurm", 6, 6).with_keyword(Keyword::Trample)),
        p(0),
    );
    let small = state.put_onto_battlefield(creature("Wall of Reeds", 1, 2), p(1));
    let large = state.put_onto_battlefield(creature("Wall of Stone", 1, 3), p(1));

    // Main 1 -> beginning of combat -> declare attackers.
    let state = pass_step(&state);
    assert_eq!(state.step(), Step::BeginCombat);
    let state = pass_step(&state);
    assert_eq!(state.step(), Step::DeclareAttackers);
    assert_eq!(ccg_kernel::Engine::waiting_on(&state), Some(p(0)));

    let state = apply(
        &state,
        p(0),
        Action::DeclareAttackers(vec![AttackDeclaration {
            attacker: wurm,
            defender: p(1),
        }]),
    );
    let state = pass_step(&state);
    assert_eq!(state.step(), Step::DeclareBlockers);
    assert_eq!(ccg_kernel::Engine::waiting_on(&state), Some(p(1)));

    let state = apply(
        &state,
        p(1),
        Action::DeclareBlockers(vec![
            BlockDeclaration {
                blocker: large,
                attacker: wurm,
            },
            BlockDeclaration {
                blocker: small,
                attacker: wurm,
            },
        ]),
    );
    let mut items = ordering_items(&state);
    items.sort();
    let mut expected = vec![small, large];
    expected.sort();
    assert_eq!(items, expected);
    assert_eq!(state.pending_decision().map(|d| d.player), Some(p(0)));

    let state = answer(&state, Response::Order(vec![small, large]));
    assert_eq!(state.priority_player(), Some(p(0)));

    let state = pass_step(&state);
    assert_eq!(state.step(), Step::CombatDamage);
    assert_eq!(state.players[p(1)].life, 19);
    assert!(!state.zones.is_in(small, Zone::Battlefield));
    assert!(!state.zones.is_in(large, Zone::Battlefield));
    assert!(state.zones.is_in(wurm, Zone::Battlefield));
    assert_eq!(state.object(wurm).map(|o| o.damage), Some(2));
}

// =============================================================================
// Discard then draw the same number
// =============================================================================

/// "Target player discards two cards, then draws that many. You draw a
/// card." Costs {1}{B}.
fn recycle() -> Arc<CardDefinition> {
    let effect = Effect::sequence([
        Effect::Discard {
            player: PlayerRef::Target(0),
            count: DiscardCount::Exactly(Amount::Fixed(2)),
        },
        Effect::Draw {
            player: PlayerRef::Target(0),
            amount: Amount::Previous,
        },
        Effect::draw(PlayerRef::Controller, 1),
    ]);
    Arc::new(CardDefinition::sorcery(CardId::new(30), "Recycle", cost("{1}{B}"), effect).with_spell_target(TargetSpec::player()))
}

fn recycle_setup() -> (ccg_kernel::GameState, ccg_kernel::EntityId) {
    let mut state = main_phase();
    for player in [p(0), p(1)] {
        to_library(&mut state, creature("Filler", 1, 1), player, 10);
    }
    let card = to_hand(&mut state, recycle(), p(0));
    let pool = &mut state.players[p(0)].mana_pool;
    pool.add(ManaType::Colored(Color::Black), 1);
    pool.add(ManaType::Colorless, 1);
    (state, card)
}

/// Against an opponent with an empty hand nothing is discarded or drawn
/// back; only the caster draws.
#[test]
fn test_recycle_on_empty_handed_opponent() {
    let (state, card) = recycle_setup();
    let caster_before = state.hand(p(0)).len() - 1;

    let state = apply(&state, p(0), Action::cast_targeting(card, p(1).into()));
    assert!(state.players[p(0)].mana_pool.is_empty());
    let state = resolve_top(&state);

    assert!(state.pending_decision().is_none());
    assert!(state.hand(p(1)).is_empty());
    assert_eq!(state.hand(p(0)).len(), caster_before + 1);
}

/// Targeting yourself with three other cards in hand: discard two of
/// your choice, draw two, then draw one more.
#[test]
fn test_recycle_on_self_nets_one_card() {
    let (mut state, card) = recycle_setup();
    let keep = to_hand(&mut state, creature("Keeper", 2, 2), p(0));
    let a = to_hand(&mut state, creature("Chaff", 1, 1), p(0));
    let b = to_hand(&mut state, creature("Chaff", 1, 1), p(0));
    let before = state.hand(p(0)).len() - 1;

    let state = apply(&state, p(0), Action::cast_targeting(card, p(0).into()));
    let state = resolve_top(&state);
    let decision = state.pending_decision().expect("discard choice");
    assert_eq!(decision.player, p(0));

    let state = answer(&state, Response::Cards(vec![a, b]));
    assert!(state.stack.is_empty());
    assert_eq!(state.hand(p(0)).len(), before + 1);
    assert!(state.hand(p(0)).contains(&keep));
    assert_eq!(state.graveyard(p(0)).len(), 3);
}

// =============================================================================
// Cost reduction
// =============================================================================

/// Each warchief takes {1} off Goblin spells; generic cost never goes
/// below zero and colored requirements are untouched.
#[test]
fn test_goblin_cost_reduction_floors() {
    let mut state = main_phase();
    let raider = to_hand(&mut state, goblin("Goblin Raider", "{2}{R}"), p(0));
    let chief = to_hand(&mut state, goblin("Goblin Chieftain", "{1}{R}{R}"), p(0));
    let elf = to_hand(&mut state, Arc::new(vanilla("Elf", 1, 1)), p(0));

    let view = state.project();
    assert_eq!(casting::spell_cost(&state, &view, raider), cost("{2}{R}"));

    state.put_onto_battlefield(warchief(), p(0));
    let view = state.project();
    assert_eq!(casting::spell_cost(&state, &view, raider), cost("{1}{R}"));
    assert_eq!(casting::spell_cost(&state, &view, elf), cost("{2}"));

    state.put_onto_battlefield(warchief(), p(0));
    let view = state.project();
    assert_eq!(casting::spell_cost(&state, &view, raider), cost("{R}"));
    assert_eq!(casting::spell_cost(&state, &view, chief), cost("{R}{R}"));

    state.put_onto_battlefield(warchief(), p(0));
    let view = state.project();
    assert_eq!(casting::spell_cost(&state, &view, raider), cost("{R}"));
    assert_eq!(casting::spell_cost(&state, &view, chief), cost("{R}{R}"));
}

/// An opponent's warchief does not discount your goblins.
#[test]
fn test_cost_reduction_is_controller_scoped() {
    let mut state = main_phase();
    let raider = to_hand(&mut state, goblin("Goblin Raider", "{2}{R}"), p(0));
    state.put_onto_battlefield(warchief(), p(1));
    let view = state.project();
    assert_eq!(casting::spell_cost(&state, &view, raider), cost("{2}{R}"));
}
