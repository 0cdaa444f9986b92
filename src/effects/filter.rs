//! Object filters and conditions.
//!
//! Filters select objects by their *projected* characteristics, so "each
//! Goblin you control" sees a creature that became a Goblin through a
//! continuous effect. Both are evaluated against whichever `Projection` the
//! caller hands in: the finished one during resolution, or the in-progress
//! one while the projector is still applying layers.

use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Keyword, Subtype};
use crate::core::{EntityId, GameState, PlayerId};
use crate::layers::Projection;
use crate::mana::ColorSet;
use crate::zones::Zone;

/// Whose objects a filter accepts, relative to the evaluating player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerFilter {
    #[default]
    Any,
    You,
    Opponent,
}

impl ControllerFilter {
    #[must_use]
    pub fn accepts(self, you: PlayerId, player: PlayerId) -> bool {
        match self {
            ControllerFilter::Any => true,
            ControllerFilter::You => player == you,
            ControllerFilter::Opponent => player != you,
        }
    }
}

/// Who is asking: the controller of the ability and its source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterContext {
    pub controller: PlayerId,
    pub source: Option<EntityId>,
}

impl FilterContext {
    #[must_use]
    pub const fn new(controller: PlayerId, source: Option<EntityId>) -> Self {
        Self { controller, source }
    }
}

/// A predicate over objects in one zone.
///
/// Empty lists mean "no restriction". `card_types` and `subtypes` match if
/// any listed entry matches; `keywords` must all be present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub zone: Zone,
    pub card_types: Vec<CardType>,
    pub excluded_types: Vec<CardType>,
    pub subtypes: Vec<Subtype>,
    pub colors: Option<ColorSet>,
    /// Off the battlefield and stack an object's controller is its owner.
    pub controller: ControllerFilter,
    pub keywords: Vec<Keyword>,
    pub tapped: Option<bool>,
    pub exclude_source: bool,
    pub power_at_most: Option<i32>,
    pub power_at_least: Option<i32>,
    pub name: Option<String>,
}

impl Default for Filter {
    fn default() -> Self {
        Self::permanents()
    }
}

impl Filter {
    /// Every permanent.
    #[must_use]
    pub fn permanents() -> Self {
        Self::in_zone(Zone::Battlefield)
    }

    #[must_use]
    pub fn in_zone(zone: Zone) -> Self {
        Self {
            zone,
            card_types: Vec::new(),
            excluded_types: Vec::new(),
            subtypes: Vec::new(),
            colors: None,
            controller: ControllerFilter::Any,
            keywords: Vec::new(),
            tapped: None,
            exclude_source: false,
            power_at_most: None,
            power_at_least: None,
            name: None,
        }
    }

    #[must_use]
    pub fn creatures() -> Self {
        Self::permanents().with_type(CardType::Creature)
    }

    #[must_use]
    pub fn lands() -> Self {
        Self::permanents().with_type(CardType::Land)
    }

    /// Spells on the stack.
    #[must_use]
    pub fn spells() -> Self {
        Self::in_zone(Zone::Stack)
    }

    #[must_use]
    pub fn cards_in_hand() -> Self {
        Self::in_zone(Zone::Hand)
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.card_types.push(card_type);
        self
    }

    #[must_use]
    pub fn without_type(mut self, card_type: CardType) -> Self {
        self.excluded_types.push(card_type);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: &str) -> Self {
        self.subtypes.push(Subtype::new(subtype));
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: ColorSet) -> Self {
        self.colors = Some(colors);
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    #[must_use]
    pub fn you_control(mut self) -> Self {
        self.controller = ControllerFilter::You;
        self
    }

    #[must_use]
    pub fn opponents_control(mut self) -> Self {
        self.controller = ControllerFilter::Opponent;
        self
    }

    #[must_use]
    pub fn tapped(mut self, tapped: bool) -> Self {
        self.tapped = Some(tapped);
        self
    }

    #[must_use]
    pub fn other(mut self) -> Self {
        self.exclude_source = true;
        self
    }

    #[must_use]
    pub fn power_at_most(mut self, power: i32) -> Self {
        self.power_at_most = Some(power);
        self
    }

    #[must_use]
    pub fn power_at_least(mut self, power: i32) -> Self {
        self.power_at_least = Some(power);
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Whether `id` matches, judged by `view`.
    #[must_use]
    pub fn matches(&self, state: &GameState, view: &Projection, ctx: &FilterContext, id: EntityId) -> bool {
        state.zones.is_in(id, self.zone) && self.matches_object(state, view, ctx, id)
    }

    /// Like `matches`, without the zone check. Used for spells being cast,
    /// which are judged before they reach the stack.
    #[must_use]
    pub fn matches_object(&self, state: &GameState, view: &Projection, ctx: &FilterContext, id: EntityId) -> bool {
        if self.exclude_source && ctx.source == Some(id) {
            return false;
        }
        let Some(obj) = view.get(id) else {
            return false;
        };
        let chars = &obj.characteristics;

        if !self.controller.accepts(ctx.controller, obj.controller) {
            return false;
        }
        if !self.card_types.is_empty() && !self.card_types.iter().any(|t| chars.has_type(*t)) {
            return false;
        }
        if self.excluded_types.iter().any(|t| chars.has_type(*t)) {
            return false;
        }
        if !self.subtypes.is_empty() && !self.subtypes.iter().any(|s| chars.subtypes.contains(s)) {
            return false;
        }
        if let Some(colors) = self.colors {
            if !chars.colors.intersects(colors) {
                return false;
            }
        }
        if !self.keywords.iter().all(|k| chars.keywords.contains(k)) {
            return false;
        }
        if let Some(tapped) = self.tapped {
            if state.objects.get(&id).is_none_or(|o| o.tapped != tapped) {
                return false;
            }
        }
        if let Some(max) = self.power_at_most {
            if chars.power.is_none_or(|p| p > max) {
                return false;
            }
        }
        if let Some(min) = self.power_at_least {
            if chars.power.is_none_or(|p| p < min) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if chars.name != *name {
                return false;
            }
        }
        true
    }

    /// All matching objects, in zone order. Per-player zones are visited in
    /// player order.
    #[must_use]
    pub fn select(&self, state: &GameState, view: &Projection, ctx: &FilterContext) -> Vec<EntityId> {
        state
            .objects_in(self.zone)
            .into_iter()
            .filter(|id| self.matches(state, view, ctx, *id))
            .collect()
    }

    #[must_use]
    pub fn count(&self, state: &GameState, view: &Projection, ctx: &FilterContext) -> usize {
        self.select(state, view, ctx).len()
    }
}

/// A yes/no question about the game, used by intervening "if" clauses,
/// conditional effects and conditional static abilities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// At least `count` objects match (controller-relative filters are
    /// judged from the ability controller's side).
    Count { filter: Filter, at_least: usize },
    /// The ability controller's life total is at least this.
    LifeAtLeast(i32),
    LifeAtMost(i32),
    /// It is the ability controller's turn.
    YourTurn,
    /// The ability controller has at most this many cards in hand.
    HandSizeAtMost(usize),
    /// The previous effect in the tree produced at least this result.
    PreviousAtLeast(i32),
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    #[must_use]
    pub fn controls(filter: Filter, at_least: usize) -> Self {
        Condition::Count {
            filter: filter.you_control(),
            at_least,
        }
    }

    #[must_use]
    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    /// `previous` is the running result of the enclosing effect tree; it is
    /// zero outside resolution.
    #[must_use]
    pub fn evaluate(&self, state: &GameState, view: &Projection, ctx: &FilterContext, previous: i32) -> bool {
        let you = ctx.controller;
        match self {
            Condition::Count { filter, at_least } => filter.count(state, view, ctx) >= *at_least,
            Condition::LifeAtLeast(n) => state.players[you].life >= *n,
            Condition::LifeAtMost(n) => state.players[you].life <= *n,
            Condition::YourTurn => state.turn.active == you,
            Condition::HandSizeAtMost(n) => state.hand(you).len() <= *n,
            Condition::PreviousAtLeast(n) => previous >= *n,
            Condition::Not(inner) => !inner.evaluate(state, view, ctx, previous),
            Condition::All(all) => all.iter().all(|c| c.evaluate(state, view, ctx, previous)),
            Condition::Any(any) => any.iter().any(|c| c.evaluate(state, view, ctx, previous)),
        }
    }
}
