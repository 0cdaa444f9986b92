//! # ccg-kernel
//!
//! A rules kernel for a turn-based, stack-driven trading card game in the
//! Magic: The Gathering mold.
//!
//! ## Design Principles
//!
//! 1. **Pure Transitions**: `Engine::apply(state, player, action)` returns a
//!    new `GameState` or a typed reason the action is illegal. The input
//!    state is never mutated.
//!
//! 2. **Decisions Are Data**: When a rule or an effect needs a player's
//!    choice, the kernel stores one pending decision and stops. Paused
//!    effect trees live in the state as serializable continuations.
//!
//! 3. **Projection, Not Mutation**: Continuous effects never rewrite
//!    objects. Current characteristics are recomputed through the layer
//!    system on every query.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: Cheap cloning via `im-rs`, so every
//!   transition can keep the previous state around.
//!
//! - **N-Player**: Turn order, priority and APNAP ordering work for any
//!   number of seats.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, players, state, actions, RNG, configuration, errors
//! - `zones`: Zone membership and ordering
//! - `cards`: Card definitions, abilities and game objects
//! - `mana`: Costs, pools, cost reduction and the payment solver
//! - `layers`: Continuous effects and characteristic projection
//! - `effects`: Effect trees, filters, targeting and the executor
//! - `decision`: The decision/response protocol
//! - `triggers`: Game events and triggered abilities
//! - `stack`: Stack objects, priority and resolution
//! - `rules`: Turn structure, casting, combat, state-based actions, engine

pub mod cards;
pub mod core;
pub mod decision;
pub mod effects;
pub mod layers;
pub mod mana;
pub mod rules;
pub mod stack;
pub mod triggers;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, AttackDeclaration, BlockDeclaration, EngineError, EntityId, GameConfig, GameResult,
    GameState, IllegalAction, InvariantViolation, PaymentStrategy, PlayerId, PlayerMap,
};

pub use crate::zones::{Zone, ZoneId, ZonePosition};

pub use crate::cards::{Ability, CardDefinition, CardId, CardRegistry, CardType, Keyword};

pub use crate::decision::{Decision, DecisionId, DecisionKind, Response};

pub use crate::effects::{Effect, Filter, TargetSpec};

pub use crate::layers::{project, Projection};

pub use crate::mana::{Color, ManaCost, ManaType};

pub use crate::rules::{Engine, Step};

pub use crate::triggers::{EventPattern, GameEvent};
