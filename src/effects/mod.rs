//! Effects: what spells and abilities do.
//!
//! ## Key Types
//!
//! - `Effect`: A node of a declarative effect tree (primitives,
//!   combinators, decision points)
//! - `Filter` / `Condition`: Predicates over objects and the game
//! - `TargetSpec`: A target requirement and its legality rules
//! - `Continuation`: The saved remainder of a tree paused on a decision
//! - [`executor`]: Runs a continuation against the game state
//!
//! ## Results
//!
//! Every effect produces an integer result (damage dealt, cards drawn,
//! objects moved). A `Sequence` feeds each child the result of the one
//! before it through `Amount::Previous`; a `Composite` feeds every child
//! the result from before it and produces the sum.

pub mod continuation;
pub mod effect;
pub mod executor;
pub mod filter;
pub mod targeting;

pub use continuation::{Bindings, Continuation, TagValue};
pub use effect::{Amount, DiscardCount, Effect, ForEachSet, Mode, ObjectRef, PlayerRef};
pub use executor::{resume, run, Outcome};
pub use filter::{Condition, ControllerFilter, Filter, FilterContext};
pub use targeting::{
    can_satisfy, check_target, legal_targets, validate_selection, TargetContext, TargetError, TargetKind, TargetSpec,
};
