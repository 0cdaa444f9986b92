//! Mana: costs, floating pools, cost reduction and the payment solver.
//!
//! ## Key Types
//!
//! - `ManaCost`, `ManaSymbol`, `ManaType`, `Color`, `ColorSet`
//! - `ManaPool`: floating mana, emptied between steps
//! - `CostReduction` / `effective_cost`: static "costs {1} less" effects
//! - `solve`: finds which sources to tap for a cost, or proves none exists

pub mod cost;
pub mod pool;
pub mod reduction;
pub mod solver;

pub use cost::{Color, ColorSet, ManaCost, ManaCostParseError, ManaSymbol, ManaType};
pub use pool::ManaPool;
pub use reduction::{effective_cost, CostReduction};
pub use solver::{can_pay, solve, ManaPayment, ManaSource, ManaUnit, PaymentError, PaymentSource, SymbolPayment};
