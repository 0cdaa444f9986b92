//! Layered characteristic projection.
//!
//! ## Key Types
//!
//! - `ContinuousEffect`: A modification with a source, duration and
//!   affected-object spec
//! - `Layer`: Fixed application order (copy, control, type, color, ability,
//!   power/toughness sublayers)
//! - `Projection`: The derived view of every object, recomputed per query
//!
//! `project(state)` is the entry point; it is pure and never cached.
//! `copiable_values` stops after the copy layer, for token copies.

pub mod continuous;
pub mod dependency;
pub mod projector;

pub use continuous::{Affected, ContinuousEffect, Duration, EffectId, Layer, Modification, PtValue};
pub use projector::{copiable_values, project, ProjectedObject, Projection};
