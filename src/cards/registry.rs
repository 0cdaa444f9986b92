//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores the definitions available to a game and builds
//! decks out of them. Definitions are handed out as `Arc`s so every object
//! created from the same card shares one copy.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::characteristics::CardType;
use super::definition::{CardDefinition, CardId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("card {0} is already registered")]
    Duplicate(CardId),

    #[error("card {0} is not registered")]
    Unknown(CardId),
}

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use ccg_kernel::cards::{CardDefinition, CardId, CardRegistry};
/// use ccg_kernel::mana::ManaCost;
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::creature(CardId::new(1), "Bear", ManaCost::generic(2), 2, 2)).unwrap();
///
/// let deck = registry.build_deck(&[(CardId::new(1), 4)]).unwrap();
/// assert_eq!(deck.len(), 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, Arc<CardDefinition>>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, card: CardDefinition) -> Result<Arc<CardDefinition>, RegistryError> {
        if self.cards.contains_key(&card.id) {
            return Err(RegistryError::Duplicate(card.id));
        }
        let card = Arc::new(card);
        self.cards.insert(card.id, Arc::clone(&card));
        Ok(card)
    }

    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&Arc<CardDefinition>> {
        self.cards.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All definitions, ordered by id.
    #[must_use]
    pub fn iter(&self) -> Vec<&Arc<CardDefinition>> {
        let mut cards: Vec<_> = self.cards.values().collect();
        cards.sort_by_key(|c| c.id);
        cards
    }

    pub fn find_by_type(&self, card_type: CardType) -> impl Iterator<Item = &Arc<CardDefinition>> {
        self.cards.values().filter(move |c| c.characteristics.has_type(card_type))
    }

    /// Expand `(card, copies)` pairs into a deck list, in the given order.
    pub fn build_deck(&self, list: &[(CardId, usize)]) -> Result<Vec<Arc<CardDefinition>>, RegistryError> {
        let mut deck = Vec::with_capacity(list.iter().map(|(_, n)| n).sum());
        for &(id, copies) in list {
            let card = self.get(id).ok_or(RegistryError::Unknown(id))?;
            deck.extend(std::iter::repeat_n(card, copies).cloned());
        }
        Ok(deck)
    }
}
