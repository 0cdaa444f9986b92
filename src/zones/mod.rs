//! Zone system for object locations.
//!
//! ## Key Types
//!
//! - `Zone`: Library, hand, battlefield, graveyard, stack, exile
//! - `ZoneId`: A zone kind plus its owner for per-player zones
//! - `ZoneManager`: Location tracking and ordered contents
//! - `ZonePosition`: Position specifier for insertion

pub mod manager;

pub use manager::{Zone, ZoneId, ZoneManager, ZonePosition};
