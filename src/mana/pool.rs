//! Floating mana.

use serde::{Deserialize, Serialize};

use super::cost::ManaType;

/// Mana a player has produced but not yet spent. Emptied between steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    /// Indexed by `ManaType::index`.
    amounts: [u32; 6],
}

impl ManaPool {
    pub fn add(&mut self, mana: ManaType, amount: u32) {
        self.amounts[mana.index()] += amount;
    }

    /// Remove one unit; `false` if none of that type is floating.
    pub fn spend(&mut self, mana: ManaType) -> bool {
        let slot = &mut self.amounts[mana.index()];
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    #[must_use]
    pub fn amount(&self, mana: ManaType) -> u32 {
        self.amounts[mana.index()]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.amounts.iter().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// One entry per floating unit, in `ManaType::ALL` order.
    #[must_use]
    pub fn units(&self) -> Vec<ManaType> {
        ManaType::ALL
            .into_iter()
            .flat_map(|mana| std::iter::repeat(mana).take(self.amount(mana) as usize))
            .collect()
    }

    pub fn clear(&mut self) {
        self.amounts = [0; 6];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mana::Color;

    #[test]
    fn test_add_and_spend() {
        let mut pool = ManaPool::default();
        pool.add(ManaType::Colored(Color::Red), 2);
        pool.add(ManaType::Colorless, 1);

        assert_eq!(pool.total(), 3);
        assert!(pool.spend(ManaType::Colored(Color::Red)));
        assert!(!pool.spend(ManaType::Colored(Color::Blue)));
        assert_eq!(pool.amount(ManaType::Colored(Color::Red)), 1);
    }

    #[test]
    fn test_units_and_clear() {
        let mut pool = ManaPool::default();
        pool.add(ManaType::Colorless, 1);
        pool.add(ManaType::Colored(Color::White), 1);
        assert_eq!(pool.units(), vec![ManaType::Colored(Color::White), ManaType::Colorless]);

        pool.clear();
        assert!(pool.is_empty());
    }
}
