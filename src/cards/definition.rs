//! Card definitions - static card data.
//!
//! `CardDefinition` holds the printed properties of a card: characteristics,
//! abilities and, for instants, sorceries and auras, what the spell does on
//! resolution. Definitions are shared between objects through `Arc`.
//!
//! Instance-specific data (damage, counters, tapped) is stored separately
//! in `GameObject`.

use serde::{Deserialize, Serialize};

use crate::effects::{Effect, TargetSpec};
use crate::mana::{ColorSet, ManaCost, ManaType, ManaUnit};

use super::ability::{Ability, FizzlePolicy, ManaAbility, SpellAbility};
use super::characteristics::{CardType, Characteristics, Keyword, Subtype, Supertype};

/// Unique identifier for a card definition.
///
/// This identifies the "type" of card (e.g., "Lightning Bolt"),
/// not a specific object in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use ccg_kernel::cards::{CardDefinition, CardId, Keyword};
/// use ccg_kernel::mana::ManaCost;
///
/// let knight = CardDefinition::creature(CardId::new(1), "White Knight", ManaCost::parse("{W}{W}").unwrap(), 2, 2)
///     .with_keyword(Keyword::FirstStrike);
///
/// assert_eq!(knight.characteristics.power, Some(2));
/// assert!(knight.characteristics.keywords.contains(&Keyword::FirstStrike));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub characteristics: Characteristics,
    pub abilities: Vec<Ability>,
    /// Resolution behavior for instants, sorceries and auras.
    pub spell: SpellAbility,
}

impl CardDefinition {
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>, cost: ManaCost) -> Self {
        Self {
            id,
            characteristics: Characteristics::new(name, cost),
            abilities: Vec::new(),
            spell: SpellAbility::default(),
        }
    }

    #[must_use]
    pub fn creature(id: CardId, name: impl Into<String>, cost: ManaCost, power: i32, toughness: i32) -> Self {
        let mut card = Self::new(id, name, cost).with_type(CardType::Creature);
        card.characteristics.power = Some(power);
        card.characteristics.toughness = Some(toughness);
        card
    }

    #[must_use]
    pub fn instant(id: CardId, name: impl Into<String>, cost: ManaCost, effect: Effect) -> Self {
        Self::new(id, name, cost).with_type(CardType::Instant).with_spell_effect(effect)
    }

    #[must_use]
    pub fn sorcery(id: CardId, name: impl Into<String>, cost: ManaCost, effect: Effect) -> Self {
        Self::new(id, name, cost).with_type(CardType::Sorcery).with_spell_effect(effect)
    }

    /// A basic land tapping for one mana of `mana`.
    #[must_use]
    pub fn basic_land(id: CardId, name: impl Into<String>, subtype: &str, mana: ManaType) -> Self {
        Self::new(id, name, ManaCost::FREE)
            .with_supertype(Supertype::Basic)
            .with_type(CardType::Land)
            .with_subtype(subtype)
            .with_ability(Ability::Mana(ManaAbility::new([ManaUnit::of(mana)])))
    }

    /// An aura: its single spell target is the object it enchants.
    #[must_use]
    pub fn aura(id: CardId, name: impl Into<String>, cost: ManaCost, enchant: TargetSpec) -> Self {
        Self::new(id, name, cost)
            .with_type(CardType::Enchantment)
            .with_subtype("Aura")
            .with_spell_target(enchant)
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.characteristics.card_types.insert(card_type);
        self
    }

    #[must_use]
    pub fn with_supertype(mut self, supertype: Supertype) -> Self {
        self.characteristics.supertypes.insert(supertype);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: &str) -> Self {
        self.characteristics.subtypes.insert(Subtype::new(subtype));
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.characteristics.keywords.insert(keyword);
        self
    }

    /// Override the colors derived from the mana cost.
    #[must_use]
    pub fn with_colors(mut self, colors: ColorSet) -> Self {
        self.characteristics.colors = colors;
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    #[must_use]
    pub fn with_spell_effect(mut self, effect: Effect) -> Self {
        self.spell.effect = effect;
        self
    }

    #[must_use]
    pub fn with_spell_target(mut self, spec: TargetSpec) -> Self {
        self.spell.targets.push(spec);
        self
    }

    #[must_use]
    pub fn with_fizzle(mut self, policy: FizzlePolicy) -> Self {
        self.spell.fizzle = policy;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.characteristics.name
    }

    #[must_use]
    pub fn is_aura(&self) -> bool {
        self.characteristics.has_type(CardType::Enchantment) && self.characteristics.has_subtype("Aura")
    }

    /// Mana abilities, in printed order.
    pub fn mana_abilities(&self) -> impl Iterator<Item = &ManaAbility> {
        self.abilities.iter().filter_map(Ability::as_mana)
    }
}
