//! Ability descriptors.
//!
//! Abilities are data. A triggered ability pairs an event pattern with an
//! effect tree; an activated ability pairs a cost with one; a static ability
//! generates continuous effects or cost reductions while its source is on
//! the battlefield. None of them carry executable code.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::effects::{Condition, Effect, Filter, TargetSpec};
use crate::layers::Modification;
use crate::mana::{CostReduction, ManaCost, ManaUnit};
use crate::triggers::EventPattern;

/// Any ability printed on or granted to an object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    Triggered(TriggeredAbility),
    Activated(ActivatedAbility),
    Mana(ManaAbility),
    Static(StaticAbility),
}

impl Ability {
    #[must_use]
    pub fn as_triggered(&self) -> Option<&TriggeredAbility> {
        match self {
            Ability::Triggered(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_static(&self) -> Option<&StaticAbility> {
        match self {
            Ability::Static(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mana(&self) -> Option<&ManaAbility> {
        match self {
            Ability::Mana(m) => Some(m),
            _ => None,
        }
    }
}

/// What happens to a stack object whose targets became illegal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FizzlePolicy {
    /// Removed only when every chosen target is illegal.
    #[default]
    AllTargetsIllegal,
    /// Removed as soon as any chosen target is illegal.
    AnyTargetIllegal,
    /// Always resolves; illegal targets are skipped use by use.
    Never,
}

/// The part of an instant, sorcery or aura that acts on resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellAbility {
    pub targets: Vec<TargetSpec>,
    pub effect: Effect,
    pub fizzle: FizzlePolicy,
}

/// "When/Whenever/At ..., effect."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub description: String,
    pub trigger: EventPattern,
    /// Intervening "if": checked when the event happens and again on
    /// resolution.
    pub condition: Option<Condition>,
    pub targets: Vec<TargetSpec>,
    pub effect: Effect,
    pub fizzle: FizzlePolicy,
}

impl TriggeredAbility {
    #[must_use]
    pub fn new(description: impl Into<String>, trigger: EventPattern, effect: Effect) -> Self {
        Self {
            description: description.into(),
            trigger,
            condition: None,
            targets: Vec::new(),
            effect,
            fizzle: FizzlePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, spec: TargetSpec) -> Self {
        self.targets.push(spec);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// When an activated ability may be activated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timing {
    /// Any time its controller has priority.
    #[default]
    Instant,
    /// Main phase of its controller's turn with an empty stack.
    Sorcery,
}

/// Costs paid to activate an ability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationCost {
    pub mana: ManaCost,
    /// `{T}`
    pub tap: bool,
    pub life: u32,
    pub sacrifice_self: bool,
}

impl ActivationCost {
    #[must_use]
    pub fn tap() -> Self {
        Self { tap: true, ..Self::default() }
    }

    #[must_use]
    pub fn mana(cost: ManaCost) -> Self {
        Self { mana: cost, ..Self::default() }
    }

    #[must_use]
    pub fn with_life(mut self, life: u32) -> Self {
        self.life = life;
        self
    }

    #[must_use]
    pub fn with_sacrifice_self(mut self) -> Self {
        self.sacrifice_self = true;
        self
    }
}

/// "Cost: effect."
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub description: String,
    pub cost: ActivationCost,
    pub targets: Vec<TargetSpec>,
    pub effect: Effect,
    pub timing: Timing,
    pub once_per_turn: bool,
    pub fizzle: FizzlePolicy,
}

impl ActivatedAbility {
    #[must_use]
    pub fn new(description: impl Into<String>, cost: ActivationCost, effect: Effect) -> Self {
        Self {
            description: description.into(),
            cost,
            targets: Vec::new(),
            effect,
            timing: Timing::default(),
            once_per_turn: false,
            fizzle: FizzlePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_target(mut self, spec: TargetSpec) -> Self {
        self.targets.push(spec);
        self
    }

    #[must_use]
    pub fn sorcery_speed(mut self) -> Self {
        self.timing = Timing::Sorcery;
        self
    }

    #[must_use]
    pub fn once_per_turn(mut self) -> Self {
        self.once_per_turn = true;
        self
    }
}

/// "{T}: Add ..." Resolves immediately, never uses the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaAbility {
    pub produces: SmallVec<[ManaUnit; 2]>,
}

impl ManaAbility {
    #[must_use]
    pub fn new(produces: impl IntoIterator<Item = ManaUnit>) -> Self {
        Self {
            produces: produces.into_iter().collect(),
        }
    }
}

/// Which objects a static continuous effect applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AffectedSpec {
    /// The object with the ability.
    Source,
    /// The object the source is attached to ("enchanted creature").
    AttachedTo,
    /// Every permanent matching the filter.
    Matching(Filter),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticEffect {
    Continuous {
        affected: AffectedSpec,
        modification: Modification,
    },
    CostReduction(CostReduction),
}

/// A static ability, optionally gated on a condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAbility {
    pub description: String,
    pub effect: StaticEffect,
    pub condition: Option<Condition>,
}

impl StaticAbility {
    #[must_use]
    pub fn continuous(description: impl Into<String>, affected: AffectedSpec, modification: Modification) -> Self {
        Self {
            description: description.into(),
            effect: StaticEffect::Continuous { affected, modification },
            condition: None,
        }
    }

    #[must_use]
    pub fn cost_reduction(description: impl Into<String>, reduction: CostReduction) -> Self {
        Self {
            description: description.into(),
            effect: StaticEffect::CostReduction(reduction),
            condition: None,
        }
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}
