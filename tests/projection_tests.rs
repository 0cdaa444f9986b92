//! Characteristic projection through the layer system.

mod common;

use std::sync::Arc;

use ccg_kernel::cards::{Ability, AffectedSpec, CardDefinition, CardId, CardType, Keyword, StaticAbility};
use ccg_kernel::effects::{run, Amount, Bindings, Continuation, Effect, Filter, ObjectRef, Outcome, PlayerRef, TargetSpec};
use ccg_kernel::layers::{project, Affected, ContinuousEffect, Duration, Modification};
use ccg_kernel::mana::ManaCost;
use ccg_kernel::{EntityId, GameState, PlayerId};

use common::*;

fn add_effect(state: &mut GameState, controller: PlayerId, affected: Affected, modification: Modification) {
    let id = state.next_effect_id();
    let timestamp = state.next_timestamp();
    let source = EntityId::from(controller);
    state
        .effects
        .push_back(ContinuousEffect::new(id, source, controller, affected, modification).with_timestamp(timestamp));
}

/// "Other creatures you control get +1/+1."
fn anthem() -> Arc<CardDefinition> {
    Arc::new(
        CardDefinition::new(CardId::new(70), "Banner", ManaCost::generic(3))
            .with_type(CardType::Enchantment)
            .with_ability(Ability::Static(StaticAbility::continuous(
                "other creatures you control get +1/+1",
                AffectedSpec::Matching(Filter::creatures().you_control().other()),
                Modification::pump(1, 1),
            ))),
    )
}

/// Run `effect` to completion as if a spell controlled by player 0 were
/// resolving.
fn resolve_effect(state: &mut GameState, effect: Effect) {
    let object = state.alloc_entity();
    let source = state.put_onto_battlefield(creature("Caster", 0, 1), p(0));
    let mut cont = Continuation::new(effect, Bindings::new(object, source, p(0)));
    assert_eq!(run(state, &mut cont), Outcome::Completed);
}

fn pt(state: &GameState, id: EntityId) -> (Option<i32>, Option<i32>) {
    let view = project(state);
    (view.power(id), view.toughness(id))
}

// =============================================================================
// Purity
// =============================================================================

/// Projecting twice gives the same result and leaves the state alone.
#[test]
fn test_projection_is_pure() {
    let mut state = main_phase();
    let bear = state.put_onto_battlefield(creature("Bear", 2, 2), p(0));
    state.put_onto_battlefield(anthem(), p(0));
    add_effect(&mut state, p(0), Affected::Object(bear), Modification::AddKeyword(Keyword::Flying));

    let before = state.clone();
    let first = project(&state);
    let second = project(&state);
    assert_eq!(first, second);
    assert_eq!(state, before);
    assert_eq!(first.power(bear), Some(3));
    assert!(first.has_keyword(bear, Keyword::Flying));
}

/// Removing an effect restores the projection exactly.
#[test]
fn test_removing_effect_restores_projection() {
    let mut state = main_phase();
    let bear = state.put_onto_battlefield(creature("Bear", 2, 2), p(0));
    let before = project(&state);

    add_effect(&mut state, p(1), Affected::Object(bear), Modification::ChangeController(p(1)));
    let stolen = project(&state);
    assert_eq!(stolen.controller(bear), Some(p(1)));
    assert_ne!(stolen, before);

    state.effects.pop_back();
    assert_eq!(project(&state), before);
}

/// Every object in every zone is projected.
#[test]
fn test_projection_covers_all_zones() {
    let mut state = main_phase();
    let in_hand = to_hand(&mut state, creature("Bear", 2, 2), p(0));
    let on_field = state.put_onto_battlefield(creature("Elk", 3, 3), p(1));
    let view = project(&state);
    assert!(view.contains(in_hand));
    assert!(view.contains(on_field));
    assert_eq!(view.len(), 2);
}

// =============================================================================
// Layer order
// =============================================================================

/// Setting power and toughness applies before modifications, whatever the
/// timestamps.
#[test]
fn test_set_applies_before_modify() {
    let mut state = main_phase();
    let bear = state.put_onto_battlefield(creature("Bear", 2, 2), p(0));
    add_effect(&mut state, p(0), Affected::Object(bear), Modification::pump(1, 1));
    add_effect(
        &mut state,
        p(0),
        Affected::Object(bear),
        Modification::SetPowerToughness { power: 0, toughness: 1 },
    );
    assert_eq!(pt(&state, bear), (Some(1), Some(2)));
}

/// Switching happens after every other power/toughness change.
#[test]
fn test_switch_applies_last() {
    let mut state = main_phase();
    let wall = state.put_onto_battlefield(creature("Wall", 1, 4), p(0));
    add_effect(&mut state, p(0), Affected::Object(wall), Modification::SwitchPowerToughness);
    add_effect(&mut state, p(0), Affected::Object(wall), Modification::pump(2, 0));
    assert_eq!(pt(&state, wall), (Some(4), Some(3)));
}

/// A static ability stops applying once its source loses all abilities.
#[test]
fn test_losing_abilities_turns_off_static() {
    let mut state = main_phase();
    let bear = state.put_onto_battlefield(creature("Bear", 2, 2), p(0));
    let banner = state.put_onto_battlefield(anthem(), p(0));
    assert_eq!(pt(&state, bear), (Some(3), Some(3)));

    add_effect(&mut state, p(1), Affected::Object(banner), Modification::LoseAllAbilities);
    assert_eq!(pt(&state, bear), (Some(2), Some(2)));
}

/// A stolen creature stops benefiting from its old controller's anthem and
/// starts benefiting from the new one's.
#[test]
fn test_control_change_moves_anthem_bonus() {
    let mut state = main_phase();
    let bear = state.put_onto_battlefield(creature("Bear", 2, 2), p(0));
    state.put_onto_battlefield(anthem(), p(1));
    assert_eq!(pt(&state, bear), (Some(2), Some(2)));

    add_effect(&mut state, p(1), Affected::Object(bear), Modification::ChangeController(p(1)));
    assert_eq!(pt(&state, bear), (Some(3), Some(3)));
}

/// Counters apply after modification effects in the same sublayer.
#[test]
fn test_counters_combine_with_pump() {
    let mut state = main_phase();
    let bear = state.put_onto_battlefield(creature("Bear", 2, 2), p(0));
    if let Some(obj) = state.object_mut(bear) {
        obj.add_counters(ccg_kernel::cards::CounterKind::PlusOne, 2);
    }
    add_effect(&mut state, p(0), Affected::Object(bear), Modification::SetPowerToughness { power: 1, toughness: 1 });
    add_effect(&mut state, p(0), Affected::Object(bear), Modification::pump(0, 1));
    assert_eq!(pt(&state, bear), (Some(3), Some(4)));
}

// =============================================================================
// Granted abilities and auras
// =============================================================================

/// A static ability granted by an effect applies like a printed one.
#[test]
fn test_granted_static_ability_applies() {
    let mut state = main_phase();
    let holder = state.put_onto_battlefield(creature("Holder", 1, 1), p(0));
    let bear = state.put_onto_battlefield(creature("Bear", 2, 2), p(0));
    let Some(Ability::Static(banner)) = anthem().abilities.first().cloned() else {
        panic!("banner has a static ability");
    };

    resolve_effect(
        &mut state,
        Effect::GrantAbility {
            object: ObjectRef::Specific(holder),
            ability: Box::new(Ability::Static(banner)),
            duration: Duration::UntilEndOfTurn,
        },
    );

    let view = project(&state);
    assert_eq!(view.get(holder).map(|o| o.abilities.len()), Some(1));
    assert_eq!(view.power(bear), Some(3));
    assert_eq!(view.power(holder), Some(1));
}

/// An aura's bonus is gone for the rest of a resolution once the aura is
/// sacrificed partway through it.
#[test]
fn test_aura_bonus_ends_when_sacrificed_mid_resolution() {
    let mut state = main_phase();
    let bear = state.put_onto_battlefield(creature("Bear", 2, 2), p(0));
    let strength = CardDefinition::aura(CardId::new(71), "Giant Strength", ManaCost::generic(2), TargetSpec::creature())
        .with_ability(Ability::Static(StaticAbility::continuous(
            "enchanted creature gets +2/+2",
            AffectedSpec::AttachedTo,
            Modification::pump(2, 2),
        )))
        .with_ability(Ability::Static(StaticAbility::continuous(
            "enchanted creature has flying",
            AffectedSpec::AttachedTo,
            Modification::AddKeyword(Keyword::Flying),
        )));
    let aura = state.put_onto_battlefield(Arc::new(strength), p(0));
    if let Some(obj) = state.object_mut(aura) {
        obj.attached_to = Some(bear);
    }
    assert_eq!(pt(&state, bear), (Some(4), Some(4)));

    resolve_effect(
        &mut state,
        Effect::sequence([
            Effect::Sacrifice {
                object: ObjectRef::Specific(aura),
            },
            Effect::GainLife {
                player: PlayerRef::Controller,
                amount: Amount::PowerOf(ObjectRef::Specific(bear)),
            },
        ]),
    );

    assert_eq!(state.players[p(0)].life, 22);
    assert_eq!(pt(&state, bear), (Some(2), Some(2)));
    assert!(!project(&state).has_keyword(bear, Keyword::Flying));
}

// =============================================================================
// Copies
// =============================================================================

/// A token copy of a creature that is itself a copy takes the copied
/// values, not the printed ones or later modifications.
#[test]
fn test_token_copy_of_a_copy_takes_copiable_values() {
    let mut state = main_phase();
    let dragon = state.put_onto_battlefield(
        Arc::new(vanilla("Dragon", 5, 5).with_keyword(Keyword::Flying)),
        p(1),
    );
    let clone = state.put_onto_battlefield(creature("Clone", 0, 0), p(0));
    add_effect(&mut state, p(0), Affected::Object(clone), Modification::CopyOf(dragon));
    add_effect(&mut state, p(0), Affected::Object(clone), Modification::pump(1, 1));
    assert_eq!(pt(&state, clone), (Some(6), Some(6)));

    let before = state.battlefield();
    resolve_effect(
        &mut state,
        Effect::CreateTokenCopy {
            object: ObjectRef::Specific(clone),
            controller: PlayerRef::Controller,
        },
    );
    let token = state
        .battlefield()
        .into_iter()
        .find(|id| !before.contains(id) && state.object(*id).is_some_and(|o| o.is_token))
        .expect("token created");

    let view = project(&state);
    let copied = view.get(token).expect("token projected");
    assert_eq!(copied.characteristics.name, "Dragon");
    assert_eq!(copied.power(), Some(5));
    assert!(copied.has_keyword(Keyword::Flying));
    assert_eq!(copied.controller, p(0));
}

/// Copying a copy follows the inner copy even when its effect is newer.
#[test]
fn test_copy_effect_reads_copied_values_of_a_copy() {
    let mut state = main_phase();
    let dragon = state.put_onto_battlefield(creature("Dragon", 5, 5), p(1));
    let first = state.put_onto_battlefield(creature("Clone", 0, 0), p(0));
    let second = state.put_onto_battlefield(creature("Clone", 0, 0), p(0));
    add_effect(&mut state, p(0), Affected::Object(second), Modification::CopyOf(first));
    add_effect(&mut state, p(0), Affected::Object(first), Modification::CopyOf(dragon));

    assert_eq!(pt(&state, second), (Some(5), Some(5)));
}
