//! Cost reduction ("Goblin spells you cast cost {1} less").

use serde::{Deserialize, Serialize};

use crate::effects::Filter;

use super::cost::{Color, ManaCost};

/// A static reduction applied to spells matching `spells`.
///
/// The filter's zone is ignored; it is matched against the spell being
/// cast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostReduction {
    pub spells: Filter,
    pub generic: u32,
    /// Per-color reduction, indexed by `Color::index`.
    pub colored: [u32; 5],
}

impl CostReduction {
    #[must_use]
    pub fn generic(spells: Filter, amount: u32) -> Self {
        Self {
            spells,
            generic: amount,
            colored: [0; 5],
        }
    }

    #[must_use]
    pub fn with_colored(mut self, color: Color, amount: u32) -> Self {
        self.colored[color.index()] += amount;
        self
    }
}

/// Apply every reduction to `base`.
///
/// The generic portion and each colored portion floor at zero on their own;
/// an unused generic reduction never touches colored symbols and a reduction
/// of one color never pays for another.
#[must_use]
pub fn effective_cost<'a>(base: &ManaCost, reductions: impl IntoIterator<Item = &'a CostReduction>) -> ManaCost {
    let mut cost = *base;
    for reduction in reductions {
        cost.generic = cost.generic.saturating_sub(reduction.generic);
        for (pips, cut) in cost.colored.iter_mut().zip(reduction.colored) {
            *pips = pips.saturating_sub(cut);
        }
    }
    cost
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblins() -> Filter {
        Filter::permanents().with_subtype("Goblin")
    }

    #[test]
    fn test_generic_floors_at_zero() {
        let base = ManaCost::parse("{2}{R}").unwrap();
        let one = CostReduction::generic(goblins(), 1);
        let cost = effective_cost(&base, [&one, &one, &one]);
        assert_eq!(cost, ManaCost::parse("{R}").unwrap());
    }

    #[test]
    fn test_colored_requirement_survives_generic_reductions() {
        let base = ManaCost::parse("{R}{R}").unwrap();
        let two = CostReduction::generic(goblins(), 2);
        assert_eq!(effective_cost(&base, [&two, &two]), base);
    }

    #[test]
    fn test_colored_reduction_is_per_color() {
        let base = ManaCost::parse("{1}{G}{R}").unwrap();
        let red = CostReduction::generic(goblins(), 0).with_colored(Color::Red, 2);
        let cost = effective_cost(&base, [&red]);
        assert_eq!(cost, ManaCost::parse("{1}{G}").unwrap());
    }

    #[test]
    fn test_no_reductions_is_identity() {
        let base = ManaCost::parse("{3}{U}").unwrap();
        assert_eq!(effective_cost(&base, []), base);
    }
}
