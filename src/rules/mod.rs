//! Game rules: turn structure, casting, combat, state-based actions and
//! the engine that ties them together.
//!
//! The engine calls into these modules; none of them decides anything on
//! a player's behalf. Anything that needs a choice becomes a pending
//! decision.

pub mod actions;
pub mod casting;
pub mod combat;
pub mod engine;
pub mod sba;
pub mod turn;

pub use combat::{Attacker, CombatState};
pub use engine::Engine;
pub use turn::{Step, TurnState};
