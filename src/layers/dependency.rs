//! Ordering of effects inside one layer.
//!
//! Effect A depends on effect B when applying B first would change whether
//! A applies or which objects A applies to. Dependent effects wait for the
//! effects they depend on; otherwise effects apply in timestamp order.
//!
//! The graph is rebuilt for every projection from the view as it stands at
//! the start of the layer. Ordering repeatedly takes the oldest effect whose
//! dependencies have all been applied. When every remaining effect waits on
//! another (a cycle), the oldest remaining effect goes next, so ordering
//! always terminates.

use crate::core::GameState;

use super::continuous::{ContinuousEffect, Modification};
use super::projector::{affected_ids, apply_to, is_active, Projection};

/// Order `effects` (all in one layer) for application.
#[must_use]
pub fn order<'a>(state: &GameState, view: &Projection, effects: &[&'a ContinuousEffect]) -> Vec<&'a ContinuousEffect> {
    let mut by_time: Vec<&ContinuousEffect> = effects.to_vec();
    by_time.sort_by_key(|e| e.timestamp);
    if by_time.len() <= 1 {
        return by_time;
    }

    let n = by_time.len();
    let mut depends_on = vec![vec![false; n]; n];
    let mut any = false;
    for (b, effect_b) in by_time.iter().enumerate() {
        if !is_active(state, view, effect_b) {
            continue;
        }
        let mut after_b = view.clone();
        apply_to(state, &mut after_b, &effect_b.modification, &affected_ids(state, view, effect_b));
        if after_b == *view {
            continue;
        }
        for (a, effect_a) in by_time.iter().enumerate() {
            if a != b && changes_applicability(state, view, &after_b, effect_a) {
                depends_on[a][b] = true;
                any = true;
            }
        }
    }
    if !any {
        return by_time;
    }

    let mut done = vec![false; n];
    let mut ordered = Vec::with_capacity(n);
    while ordered.len() < n {
        let ready = (0..n).find(|&a| !done[a] && (0..n).all(|b| done[b] || !depends_on[a][b]));
        let next = match ready {
            Some(a) => a,
            None => {
                tracing::trace!("dependency cycle; falling back to timestamp order");
                (0..n).find(|&a| !done[a]).unwrap_or(0)
            }
        };
        done[next] = true;
        ordered.push(by_time[next]);
    }
    ordered
}

fn changes_applicability(state: &GameState, before: &Projection, after: &Projection, effect: &ContinuousEffect) -> bool {
    is_active(state, before, effect) != is_active(state, after, effect)
        || affected_ids(state, before, effect) != affected_ids(state, after, effect)
        || changes_copied_values(before, after, effect)
}

/// A copy effect depends on anything that changes what it copies.
fn changes_copied_values(before: &Projection, after: &Projection, effect: &ContinuousEffect) -> bool {
    match &effect.modification {
        Modification::CopyOf(original) => before.get(*original) != after.get(*original),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cards::{CardDefinition, CardId, CardType};
    use crate::core::{EntityId, GameConfig, PlayerId};
    use crate::effects::Filter;
    use crate::layers::{project, Affected, Modification};
    use crate::mana::ManaCost;

    fn artifact(id: u32) -> Arc<CardDefinition> {
        Arc::new(CardDefinition::new(CardId::new(id), "Relic", ManaCost::generic(1)).with_type(CardType::Artifact))
    }

    #[test]
    fn test_timestamp_order_without_dependency() {
        let mut state = GameState::new(GameConfig::new(2));
        let id = state.put_onto_battlefield(artifact(1), PlayerId::new(0));
        let mut subtype = |name: &str| {
            let modification = Modification::AddSubtype(crate::cards::Subtype::new(name));
            ContinuousEffect::new(state.next_effect_id(), EntityId(0), PlayerId::new(0), Affected::Object(id), modification)
        };
        let early = subtype("A");
        let late = subtype("B");

        let view = project(&state);
        let ordered = order(&state, &view, &[&late, &early]);
        assert_eq!(ordered[0].id, early.id);
    }

    #[test]
    fn test_dependent_effect_waits_despite_older_timestamp() {
        // Older: "artifact creatures gain Goblin". Newer: "artifacts become
        // creatures". The first depends on the second.
        let mut state = GameState::new(GameConfig::new(2));
        let relic = state.put_onto_battlefield(artifact(1), PlayerId::new(0));
        let tribal = ContinuousEffect::new(
            state.next_effect_id(),
            EntityId(0),
            PlayerId::new(0),
            Affected::Matching(Filter::creatures().with_type(CardType::Artifact)),
            Modification::AddSubtype(crate::cards::Subtype::new("Goblin")),
        );
        let animate = ContinuousEffect::new(
            state.next_effect_id(),
            EntityId(0),
            PlayerId::new(0),
            Affected::Matching(Filter::permanents().with_type(CardType::Artifact)),
            Modification::AddCardType(CardType::Creature),
        );

        let view = project(&state);
        let ordered = order(&state, &view, &[&tribal, &animate]);
        assert_eq!(ordered[0].id, animate.id);

        state.effects.push_back(tribal);
        state.effects.push_back(animate);
        let view = project(&state);
        assert!(view.get(relic).unwrap().characteristics.has_subtype("Goblin"));
    }

    #[test]
    fn test_cycle_falls_back_to_timestamp() {
        let mut state = GameState::new(GameConfig::new(2));
        let card = CardDefinition::new(CardId::new(1), "Relic", ManaCost::generic(1))
            .with_type(CardType::Artifact)
            .with_type(CardType::Enchantment);
        let relic = state.put_onto_battlefield(Arc::new(card), PlayerId::new(0));
        // Each removes the type the other one selects on.
        let a = ContinuousEffect::new(
            state.next_effect_id(),
            EntityId(0),
            PlayerId::new(0),
            Affected::Matching(Filter::permanents().with_type(CardType::Artifact)),
            Modification::RemoveCardType(CardType::Enchantment),
        );
        let b = ContinuousEffect::new(
            state.next_effect_id(),
            EntityId(0),
            PlayerId::new(0),
            Affected::Matching(Filter::permanents().with_type(CardType::Enchantment)),
            Modification::RemoveCardType(CardType::Artifact),
        );
        let view = project(&state);
        let ordered = order(&state, &view, &[&b, &a]);
        assert_eq!(ordered[0].id, a.id);
        assert_eq!(ordered[1].id, b.id);

        state.effects.push_back(a);
        state.effects.push_back(b);
        let chars = project(&state).get(relic).unwrap().characteristics.clone();
        assert!(chars.has_type(CardType::Artifact));
        assert!(!chars.has_type(CardType::Enchantment));
    }

    #[test]
    fn test_copy_of_a_copy_waits_for_the_inner_copy() {
        let mut state = GameState::new(GameConfig::new(2));
        let dragon = Arc::new(CardDefinition::creature(CardId::new(2), "Dragon", ManaCost::generic(6), 5, 5));
        let clone = Arc::new(CardDefinition::creature(CardId::new(3), "Clone", ManaCost::generic(4), 0, 0));
        let dragon = state.put_onto_battlefield(dragon, PlayerId::new(0));
        let first = state.put_onto_battlefield(Arc::clone(&clone), PlayerId::new(0));
        let second = state.put_onto_battlefield(clone, PlayerId::new(0));
        // The older effect copies the clone that only later becomes a dragon.
        let outer = ContinuousEffect::new(
            state.next_effect_id(),
            EntityId(0),
            PlayerId::new(0),
            Affected::Object(second),
            Modification::CopyOf(first),
        );
        let inner = ContinuousEffect::new(
            state.next_effect_id(),
            EntityId(0),
            PlayerId::new(0),
            Affected::Object(first),
            Modification::CopyOf(dragon),
        );
        let view = project(&state);
        let ordered = order(&state, &view, &[&outer, &inner]);
        assert_eq!(ordered[0].id, inner.id);
        assert_eq!(ordered[1].id, outer.id);
    }
}
