//! Core engine types: entities, players, state, actions, RNG, configuration
//! and errors.

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionRecord, AttackDeclaration, BlockDeclaration, PaymentStrategy};
pub use config::GameConfig;
pub use entity::EntityId;
pub use error::{
    ActivationRestriction, AttackRestriction, BlockRestriction, CastRestriction, DeclarationKind, EngineError,
    IllegalAction, InvariantViolation, LandRestriction,
};
pub use player::{LossReason, PlayerId, PlayerMap, PlayerState};
pub use rng::{GameRng, GameRngState};
pub use state::{GameResult, GameState, SnapshotError};
