//! Card types, subtypes, keywords and the characteristics bundle.
//!
//! `Characteristics` is what a card says about itself. The projector starts
//! from it and rewrites it layer by layer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::mana::{Color, ColorSet, ManaCost};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Creature,
    Enchantment,
    Instant,
    Land,
    Sorcery,
}

impl CardType {
    /// Permanents enter the battlefield when they resolve.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Supertype {
    Basic,
    Legendary,
}

/// Creature, land or spell subtype ("Goblin", "Aura", "Forest").
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subtype(pub String);

impl Subtype {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for Subtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keyword abilities the rules engine knows how to enforce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keyword {
    // === Evasion ===
    Flying,
    Reach,
    Fear,
    Menace,
    Unblockable,
    /// Can't be blocked by creatures with power this value or less.
    CantBeBlockedByPowerOrLess(i32),

    // === Combat damage ===
    FirstStrike,
    DoubleStrike,
    Trample,
    Deathtouch,
    Lifelink,

    // === Attack / block requirements ===
    Vigilance,
    Haste,
    Defender,
    CantBlock,
    MustAttack,
    MustBlock,

    // === Protection ===
    Indestructible,
    Hexproof,
    Shroud,
    ProtectionFrom(Color),

    // === Casting ===
    Flash,
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::CantBeBlockedByPowerOrLess(n) => {
                write!(f, "can't be blocked by creatures with power {n} or less")
            }
            Keyword::ProtectionFrom(color) => write!(f, "protection from {color}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// The printed (copiable) characteristics of a card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub name: String,
    pub mana_cost: ManaCost,
    pub colors: ColorSet,
    pub supertypes: BTreeSet<Supertype>,
    pub card_types: BTreeSet<CardType>,
    pub subtypes: BTreeSet<Subtype>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub keywords: BTreeSet<Keyword>,
}

impl Characteristics {
    /// Characteristics with the given name and cost; colors follow the cost.
    #[must_use]
    pub fn new(name: impl Into<String>, mana_cost: ManaCost) -> Self {
        Self {
            name: name.into(),
            colors: mana_cost.colors(),
            mana_cost,
            supertypes: BTreeSet::new(),
            card_types: BTreeSet::new(),
            subtypes: BTreeSet::new(),
            power: None,
            toughness: None,
            keywords: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    #[must_use]
    pub fn has_subtype(&self, name: &str) -> bool {
        self.subtypes.iter().any(|s| s.0 == name)
    }

    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.card_types.is_empty() && self.card_types.iter().all(|t| t.is_permanent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_default_to_cost() {
        let chars = Characteristics::new("Goblin Guide", ManaCost::parse("{R}").unwrap());
        assert!(chars.colors.contains(Color::Red));
        assert_eq!(chars.colors.len(), 1);
    }

    #[test]
    fn test_permanence() {
        let mut chars = Characteristics::new("Shock", ManaCost::parse("{R}").unwrap());
        chars.card_types.insert(CardType::Instant);
        assert!(!chars.is_permanent());

        let mut bear = Characteristics::new("Bear", ManaCost::parse("{1}{G}").unwrap());
        bear.card_types.insert(CardType::Creature);
        assert!(bear.is_permanent());
    }

    #[test]
    fn test_subtype_lookup() {
        let mut chars = Characteristics::new("Raider", ManaCost::generic(1));
        chars.subtypes.insert(Subtype::new("Goblin"));
        assert!(chars.has_subtype("Goblin"));
        assert!(!chars.has_subtype("Elf"));
    }

    #[test]
    fn test_keyword_display() {
        assert_eq!(Keyword::Flying.to_string(), "Flying");
        assert_eq!(Keyword::ProtectionFrom(Color::Black).to_string(), "protection from black");
        assert_eq!(
            Keyword::CantBeBlockedByPowerOrLess(2).to_string(),
            "can't be blocked by creatures with power 2 or less"
        );
    }
}
