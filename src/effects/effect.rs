//! Effect trees.
//!
//! An `Effect` is data: a closed vocabulary of primitives ("deal 3 damage",
//! "draw a card"), combinators that compose them, and decision points that
//! ask a player something mid-resolution. Card behavior is built by
//! composing these; nothing here runs code supplied by a card.
//!
//! ## Results
//!
//! Every effect produces an `i32` result when it completes (damage dealt,
//! cards drawn, objects affected, the number chosen). The most recent result
//! is available to later effects as `Amount::Previous`; `Tag` stores it
//! under a name for `Amount::Tagged`.
//!
//! ## References
//!
//! `ObjectRef` and `PlayerRef` name things relative to the resolving object:
//! its source, controller, chosen targets, the object currently visited by a
//! `ForEach`, objects recorded by `ChooseObjects`. Target references are
//! re-checked immediately before each use.
//!
//! ```
//! use ccg_kernel::effects::{Amount, Effect, PlayerRef};
//!
//! // "Deal 3 damage to any target. You gain 1 life."
//! let effect = Effect::sequence([
//!     Effect::damage_target(0, 3),
//!     Effect::gain_life(PlayerRef::Controller, 1),
//! ]);
//! assert!(matches!(effect, Effect::Sequence(ref children) if children.len() == 2));
//! assert_eq!(Amount::from(2), Amount::Fixed(2));
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::{Ability, CardDefinition, CounterKind, Keyword};
use crate::core::{EntityId, PlayerId};
use crate::layers::Duration;
use crate::mana::ManaType;
use crate::zones::{Zone, ZonePosition};

use super::filter::{Condition, Filter};

/// A player, relative to the resolving object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRef {
    /// Controller of the resolving spell or ability.
    Controller,
    /// The first still-legal player chosen for a target slot.
    Target(usize),
    /// The player currently visited by `ForEach`.
    Iterated,
    /// Whose turn it is.
    Active,
    /// Current controller of an object (owner once it has left play).
    ControllerOf(Box<ObjectRef>),
    /// The player named by the triggering event.
    Triggering,
    Specific(PlayerId),
}

/// One or more objects (or players), relative to the resolving object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectRef {
    /// The source of the resolving spell or ability.
    Source,
    /// Every still-legal target of a slot. Illegal ones are skipped.
    Target(usize),
    /// The object currently visited by `ForEach`.
    Iterated,
    /// Objects recorded under a tag by `ChooseObjects`.
    Chosen(String),
    /// The object named by the triggering event.
    Triggering,
    /// Whatever the source is attached to.
    AttachedTo,
    Specific(EntityId),
    /// A player, for effects that accept players and objects alike
    /// (damage).
    Player(PlayerRef),
}

/// A number, fixed or computed at the moment of use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Amount {
    Fixed(i32),
    /// Result of the most recently completed effect.
    Previous,
    /// Result recorded by `Tag`, `ChooseObjects` or `ChooseNumber`.
    Tagged(String),
    /// Objects matching, judged from the controller's side.
    CountOf(Filter),
    /// Power of the first referenced object.
    PowerOf(ObjectRef),
    /// Cards in a player's hand.
    HandSize(PlayerRef),
}

impl From<i32> for Amount {
    fn from(n: i32) -> Self {
        Amount::Fixed(n)
    }
}

/// How many cards a discard takes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscardCount {
    /// Exactly this many, or the whole hand if smaller.
    Exactly(Amount),
    /// The discarding player picks any number up to this.
    UpTo(Amount),
}

/// The items a `ForEach` visits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForEachSet {
    /// Every player still in the game, in turn order from the active player.
    Players,
    /// Every opponent of the controller still in the game.
    Opponents,
    /// The chosen targets of a slot.
    Targets(usize),
    /// Objects matching a filter.
    Objects(Filter),
    /// Objects recorded under a tag.
    Tagged(String),
    /// An already-fixed list; filters and player sets become this when the
    /// object is put on the stack.
    Fixed(Vec<EntityId>),
}

/// One option of a modal effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub label: String,
    pub effect: Effect,
}

impl Mode {
    #[must_use]
    pub fn new(label: impl Into<String>, effect: Effect) -> Self {
        Self {
            label: label.into(),
            effect,
        }
    }
}

/// A node of an effect tree.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    // === Primitives ===
    #[default]
    Nothing,

    /// Damage to each referenced object or player.
    DealDamage { to: ObjectRef, amount: Amount },

    GainLife { player: PlayerRef, amount: Amount },

    LoseLife { player: PlayerRef, amount: Amount },

    Draw { player: PlayerRef, amount: Amount },

    /// The discarding player chooses which cards, when there is a choice.
    Discard { player: PlayerRef, count: DiscardCount },

    MoveZone { object: ObjectRef, to: Zone, position: ZonePosition },

    Destroy { object: ObjectRef },

    /// Sacrifice specific permanents (usually the source).
    Sacrifice { object: ObjectRef },

    /// A player sacrifices `count` permanents of their choice matching
    /// `filter`.
    SacrificePermanents { player: PlayerRef, filter: Filter, count: Amount },

    ModifyStats { object: ObjectRef, power: Amount, toughness: Amount, duration: Duration },

    /// Affects the objects matching when the effect resolves; creatures
    /// entering later are not affected.
    ModifyStatsAll { filter: Filter, power: Amount, toughness: Amount, duration: Duration },

    GrantKeyword { object: ObjectRef, keyword: Keyword, duration: Duration },

    GrantAbility { object: ObjectRef, ability: Box<Ability>, duration: Duration },

    Tap { object: ObjectRef },

    Untap { object: ObjectRef },

    ChangeControl { object: ObjectRef, to: PlayerRef, duration: Duration },

    CreateToken { definition: Arc<CardDefinition>, count: Amount, controller: PlayerRef },

    /// A token that copies the copiable values of the referenced object.
    CreateTokenCopy { object: ObjectRef, controller: PlayerRef },

    AddCounters { object: ObjectRef, kind: CounterKind, amount: Amount },

    AddMana { player: PlayerRef, mana: Vec<ManaType> },

    CounterSpell { spell: ObjectRef },

    /// Shuffle a player's library.
    Shuffle { player: PlayerRef },

    // === Combinators ===
    /// Children in order. Each sees the result of the one before it; the
    /// result is the last child's.
    Sequence(Vec<Effect>),

    /// Children in order, all seeing the result from before the composite;
    /// the result is the sum of the children's results.
    Composite(Vec<Effect>),

    Conditional { condition: Condition, then: Box<Effect>, otherwise: Box<Effect> },

    /// "You may ...". A declined effect never runs and never asks anything.
    May { player: PlayerRef, prompt: String, effect: Box<Effect> },

    /// Run `effect` while `condition` holds, at most `max` times.
    RepeatWhile { condition: Condition, effect: Box<Effect>, max: u32 },

    ForEach { set: ForEachSet, effect: Box<Effect> },

    /// Record the result of `effect` under `name`.
    Tag { name: String, effect: Box<Effect> },

    // === Decision points ===
    ChooseMode { player: PlayerRef, modes: Vec<Mode> },

    /// Choose between `min` and `max` objects matching `filter`, recorded
    /// under `tag`.
    ChooseObjects { player: PlayerRef, filter: Filter, min: usize, max: usize, tag: String },

    ChooseNumber { player: PlayerRef, min: i32, max: i32, tag: String },
}

impl Effect {
    #[must_use]
    pub fn sequence(effects: impl IntoIterator<Item = Effect>) -> Self {
        Effect::Sequence(effects.into_iter().collect())
    }

    #[must_use]
    pub fn composite(effects: impl IntoIterator<Item = Effect>) -> Self {
        Effect::Composite(effects.into_iter().collect())
    }

    /// Damage to every target of `slot`.
    #[must_use]
    pub fn damage_target(slot: usize, amount: i32) -> Self {
        Effect::DealDamage {
            to: ObjectRef::Target(slot),
            amount: Amount::Fixed(amount),
        }
    }

    #[must_use]
    pub fn gain_life(player: PlayerRef, amount: i32) -> Self {
        Effect::GainLife {
            player,
            amount: Amount::Fixed(amount),
        }
    }

    #[must_use]
    pub fn lose_life(player: PlayerRef, amount: i32) -> Self {
        Effect::LoseLife {
            player,
            amount: Amount::Fixed(amount),
        }
    }

    #[must_use]
    pub fn draw(player: PlayerRef, amount: i32) -> Self {
        Effect::Draw {
            player,
            amount: Amount::Fixed(amount),
        }
    }

    #[must_use]
    pub fn destroy(object: ObjectRef) -> Self {
        Effect::Destroy { object }
    }

    /// "+N/+N until end of turn".
    #[must_use]
    pub fn pump(object: ObjectRef, power: i32, toughness: i32) -> Self {
        Effect::ModifyStats {
            object,
            power: Amount::Fixed(power),
            toughness: Amount::Fixed(toughness),
            duration: Duration::UntilEndOfTurn,
        }
    }

    #[must_use]
    pub fn conditional(condition: Condition, then: Effect) -> Self {
        Effect::Conditional {
            condition,
            then: Box::new(then),
            otherwise: Box::new(Effect::Nothing),
        }
    }

    #[must_use]
    pub fn may(prompt: impl Into<String>, effect: Effect) -> Self {
        Effect::May {
            player: PlayerRef::Controller,
            prompt: prompt.into(),
            effect: Box::new(effect),
        }
    }

    #[must_use]
    pub fn for_each(set: ForEachSet, effect: Effect) -> Self {
        Effect::ForEach {
            set,
            effect: Box::new(effect),
        }
    }

    #[must_use]
    pub fn tag(name: impl Into<String>, effect: Effect) -> Self {
        Effect::Tag {
            name: name.into(),
            effect: Box::new(effect),
        }
    }

    #[must_use]
    pub fn choose_mode(modes: impl IntoIterator<Item = Mode>) -> Self {
        Effect::ChooseMode {
            player: PlayerRef::Controller,
            modes: modes.into_iter().collect(),
        }
    }

    /// Whether the tree contains a node that can stop to ask a player.
    #[must_use]
    pub fn has_decision_point(&self) -> bool {
        match self {
            Effect::May { .. }
            | Effect::ChooseMode { .. }
            | Effect::ChooseObjects { .. }
            | Effect::ChooseNumber { .. }
            | Effect::Discard { .. }
            | Effect::SacrificePermanents { .. } => true,
            Effect::Sequence(children) | Effect::Composite(children) => children.iter().any(Effect::has_decision_point),
            Effect::Conditional { then, otherwise, .. } => then.has_decision_point() || otherwise.has_decision_point(),
            Effect::RepeatWhile { effect, .. } | Effect::ForEach { effect, .. } | Effect::Tag { effect, .. } => {
                effect.has_decision_point()
            }
            _ => false,
        }
    }

    /// Replace every snapshot-able `ForEach` set in the tree using `fix`.
    ///
    /// `fix` returns the fixed list for a set, or `None` to leave it (tags
    /// and targets are resolved at use).
    pub fn lock_sets(&mut self, fix: &mut impl FnMut(&ForEachSet) -> Option<Vec<EntityId>>) {
        match self {
            Effect::ForEach { set, effect } => {
                if let Some(fixed) = fix(set) {
                    *set = ForEachSet::Fixed(fixed);
                }
                effect.lock_sets(fix);
            }
            Effect::Sequence(children) | Effect::Composite(children) => {
                for child in children {
                    child.lock_sets(fix);
                }
            }
            Effect::Conditional { then, otherwise, .. } => {
                then.lock_sets(fix);
                otherwise.lock_sets(fix);
            }
            Effect::May { effect, .. } | Effect::RepeatWhile { effect, .. } | Effect::Tag { effect, .. } => {
                effect.lock_sets(fix);
            }
            Effect::ChooseMode { modes, .. } => {
                for mode in modes {
                    mode.effect.lock_sets(fix);
                }
            }
            _ => {}
        }
    }
}
