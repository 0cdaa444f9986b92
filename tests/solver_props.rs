//! The mana solver agrees with an exhaustive search on small boards.

use proptest::prelude::*;

use ccg_kernel::mana::{solve, Color, ManaCost, ManaPool, ManaSource, ManaSymbol, ManaType, ManaUnit};
use ccg_kernel::EntityId;

fn arb_type() -> impl Strategy<Value = ManaType> {
    prop::sample::select(ManaType::ALL.to_vec())
}

fn arb_unit() -> impl Strategy<Value = ManaUnit> {
    prop_oneof![
        4 => arb_type().prop_map(ManaUnit::of),
        1 => Just(ManaUnit::any_color()),
        2 => (arb_type(), arb_type()).prop_map(|(a, b)| ManaUnit::one_of(&[a, b])),
    ]
}

fn arb_sources() -> impl Strategy<Value = Vec<ManaSource>> {
    prop::collection::vec(prop::collection::vec(arb_unit(), 1..=2), 0..=6).prop_map(|units| {
        units
            .into_iter()
            .enumerate()
            .map(|(i, u)| ManaSource::new(EntityId(100 + i as u32), u))
            .collect()
    })
}

fn arb_cost() -> impl Strategy<Value = ManaCost> {
    (0u32..=3, 0u32..=2, 0u32..=2, 0u32..=1).prop_map(|(generic, white, red, colorless)| {
        ManaCost::generic(generic)
            .with_colored(Color::White, white)
            .with_colored(Color::Red, red)
            .with_colorless(colorless)
    })
}

fn arb_pool() -> impl Strategy<Value = ManaPool> {
    prop::collection::vec(arb_type(), 0..=2).prop_map(|types| {
        let mut pool = ManaPool::default();
        for mana in types {
            pool.add(mana, 1);
        }
        pool
    })
}

/// Whether `symbols` can each be paid by a distinct unit.
fn assignable(symbols: &[ManaSymbol], units: &[ManaUnit], used: &mut Vec<bool>) -> bool {
    let Some((first, rest)) = symbols.split_first() else {
        return true;
    };
    for i in 0..units.len() {
        if used[i] || !units[i].can_pay(*first) {
            continue;
        }
        used[i] = true;
        if assignable(rest, units, used) {
            return true;
        }
        used[i] = false;
    }
    false
}

/// Fewest sources that make the cost payable, by trying every subset.
fn brute_force(cost: &ManaCost, pool: &ManaPool, sources: &[ManaSource]) -> Option<usize> {
    let symbols = cost.symbols();
    let floating: Vec<ManaUnit> = pool.units().into_iter().map(ManaUnit::of).collect();
    let mut best: Option<usize> = None;
    for mask in 0u32..(1 << sources.len()) {
        let size = mask.count_ones() as usize;
        if best.is_some_and(|b| b <= size) {
            continue;
        }
        let mut units = floating.clone();
        for (i, source) in sources.iter().enumerate() {
            if mask & (1 << i) != 0 {
                units.extend(source.units.iter().copied());
            }
        }
        if assignable(&symbols, &units, &mut vec![false; units.len()]) {
            best = Some(size);
        }
    }
    best
}

proptest! {
    #[test]
    fn solver_matches_exhaustive_search(cost in arb_cost(), pool in arb_pool(), sources in arb_sources()) {
        let expected = brute_force(&cost, &pool, &sources);
        match solve(&cost, &pool, &sources) {
            Ok(payment) => {
                prop_assert_eq!(Some(payment.tapped.len()), expected);
                let mut tapped = payment.tapped.clone();
                tapped.sort();
                tapped.dedup();
                prop_assert_eq!(tapped.len(), payment.tapped.len());
                prop_assert!(tapped.iter().all(|id| sources.iter().any(|s| s.id == *id)));
                prop_assert_eq!(payment.assignments.len(), cost.symbols().len());
                for assignment in &payment.assignments {
                    prop_assert!(assignment.symbol.accepts(assignment.mana));
                }
            }
            Err(_) => prop_assert_eq!(expected, None),
        }
    }

    #[test]
    fn floating_mana_alone_never_taps(cost in arb_cost(), pool in arb_pool()) {
        let sources: Vec<ManaSource> = Vec::new();
        if let Ok(payment) = solve(&cost, &pool, &sources) {
            prop_assert!(payment.tapped.is_empty());
            prop_assert!(payment.from_pool.len() <= pool.total() as usize);
        }
    }
}
