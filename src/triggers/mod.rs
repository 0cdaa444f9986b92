//! Events and triggered abilities.
//!
//! ## Key Types
//!
//! - [`GameEvent`]: What happened, appended to the state's event log
//! - [`EventPattern`]: Which events a triggered ability reacts to
//! - [`PendingTrigger`]: A triggered ability waiting to go on the stack
//!
//! Triggers are gathered from the event log whenever a player would
//! receive priority, after state-based actions. They go on the stack in
//! APNAP order, each player ordering their own simultaneous triggers.

pub mod collector;
pub mod event;
pub mod pattern;

pub use collector::{apply_order, apply_targets, collect, place, PendingTrigger};
pub use event::GameEvent;
pub use pattern::{EventPattern, ObjectPattern, PlayerScope, TriggerMatch};
