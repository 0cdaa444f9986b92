//! Saved position inside an effect tree.
//!
//! Executing an effect tree is a loop over an explicit stack of frames
//! rather than recursion, so stopping to ask a player a question is just
//! returning with the frames left in place. A `Continuation` is that frame
//! stack plus everything accumulated so far (tags, the running result, the
//! object being iterated). It is an ordinary serializable value stored in
//! the paused `StackObject`.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::decision::DecisionRequest;
use crate::mana::ColorSet;

use super::effect::Effect;
use super::filter::Condition;
use super::targeting::{TargetContext, TargetSpec};

/// A value recorded under a tag.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagValue {
    pub amount: i32,
    pub objects: Vec<EntityId>,
}

/// Everything an effect tree can refer to while it runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    /// The stack object being resolved.
    pub object: EntityId,
    pub source: EntityId,
    pub controller: PlayerId,
    pub source_colors: ColorSet,
    pub targets: Vec<Vec<EntityId>>,
    pub target_specs: Vec<TargetSpec>,
    pub triggering: Option<EntityId>,
    pub triggering_player: Option<PlayerId>,
    /// Innermost `ForEach` item last.
    pub iterated: Vec<EntityId>,
    pub tags: BTreeMap<String, TagValue>,
    /// Result of the most recently completed effect.
    pub previous: i32,
}

impl Bindings {
    #[must_use]
    pub fn new(object: EntityId, source: EntityId, controller: PlayerId) -> Self {
        Self {
            object,
            source,
            controller,
            source_colors: ColorSet::COLORLESS,
            targets: Vec::new(),
            target_specs: Vec::new(),
            triggering: None,
            triggering_player: None,
            iterated: Vec::new(),
            tags: BTreeMap::new(),
            previous: 0,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, specs: Vec<TargetSpec>, targets: Vec<Vec<EntityId>>) -> Self {
        self.target_specs = specs;
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn with_source_colors(mut self, colors: ColorSet) -> Self {
        self.source_colors = colors;
        self
    }

    #[must_use]
    pub fn with_triggering(mut self, object: Option<EntityId>, player: Option<PlayerId>) -> Self {
        self.triggering = object;
        self.triggering_player = player;
        self
    }

    #[must_use]
    pub fn target_context(&self) -> TargetContext {
        TargetContext {
            controller: self.controller,
            source: self.source,
            source_colors: self.source_colors,
        }
    }

    #[must_use]
    pub fn tag(&self, name: &str) -> Option<&TagValue> {
        self.tags.get(name)
    }
}

/// What a paused tree is waiting for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum AwaitKind {
    May { effect: Box<Effect> },
    Mode { effects: Vec<Effect> },
    ChooseObjects { tag: String },
    Discard { player: PlayerId },
    Sacrifice { player: PlayerId },
    Number { tag: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Frame {
    /// An effect not yet started.
    Eval(Effect),
    Sequence {
        remaining: VecDeque<Effect>,
    },
    Composite {
        remaining: VecDeque<Effect>,
        base: i32,
        total: i32,
        started: bool,
    },
    ForEach {
        items: Vec<EntityId>,
        next: usize,
        effect: Effect,
        started: bool,
    },
    Repeat {
        condition: Condition,
        effect: Effect,
        remaining: u32,
    },
    /// Record the result of the child under `name` once it completes.
    Tag {
        name: String,
    },
    Await {
        kind: AwaitKind,
        request: DecisionRequest,
    },
}

/// The remaining work of a partially executed effect tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuation {
    pub(crate) frames: Vec<Frame>,
    pub bindings: Bindings,
}

impl Continuation {
    /// A continuation that has not started `effect` yet.
    #[must_use]
    pub fn new(effect: Effect, bindings: Bindings) -> Self {
        Self {
            frames: vec![Frame::Eval(effect)],
            bindings,
        }
    }

    /// The question this continuation is paused on, if any.
    #[must_use]
    pub fn waiting_on(&self) -> Option<&DecisionRequest> {
        match self.frames.last() {
            Some(Frame::Await { request, .. }) => Some(request),
            _ => None,
        }
    }
}
