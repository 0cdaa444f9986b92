//! Card system: characteristics, abilities, definitions, objects, registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card definitions
//! - `Characteristics`: Name, cost, colors, types, P/T, keywords
//! - `Ability`: Triggered, activated, mana and static ability descriptors
//! - `CardDefinition`: Printed card data, shared through `Arc`
//! - `GameObject`: A definition placed in a zone, with its own components
//! - `CardRegistry`: Definition lookup and deck building

pub mod ability;
pub mod characteristics;
pub mod definition;
pub mod object;
pub mod registry;

pub use ability::{
    Ability, ActivatedAbility, ActivationCost, AffectedSpec, FizzlePolicy, ManaAbility, SpellAbility, StaticAbility,
    StaticEffect, Timing, TriggeredAbility,
};
pub use characteristics::{CardType, Characteristics, Keyword, Subtype, Supertype};
pub use definition::{CardDefinition, CardId};
pub use object::{CounterKind, GameObject};
pub use registry::{CardRegistry, RegistryError};
