//! Target requirements and legality.
//!
//! A `TargetSpec` says what a spell or ability may target and how many.
//! Legality is always judged against a projection, so a creature that lost
//! hexproof this turn is targetable and one that gained protection is not.
//! The same check runs at declaration and again immediately before each use
//! during resolution.

use serde::{Deserialize, Serialize};

use crate::cards::Keyword;
use crate::core::{EntityId, GameState, PlayerId};
use crate::layers::Projection;
use crate::mana::{Color, ColorSet};

use super::filter::{ControllerFilter, Filter, FilterContext};

/// What one target slot accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Player(ControllerFilter),
    Object(Filter),
    /// "Any target": an object matching the filter, or a player.
    ObjectOrPlayer { objects: Filter, players: ControllerFilter },
}

/// One target requirement ("target creature", "up to two target players").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub kind: TargetKind,
    pub min: usize,
    pub max: usize,
}

impl TargetSpec {
    #[must_use]
    pub fn new(kind: TargetKind) -> Self {
        Self { kind, min: 1, max: 1 }
    }

    #[must_use]
    pub fn object(filter: Filter) -> Self {
        Self::new(TargetKind::Object(filter))
    }

    #[must_use]
    pub fn creature() -> Self {
        Self::object(Filter::creatures())
    }

    #[must_use]
    pub fn permanent() -> Self {
        Self::object(Filter::permanents())
    }

    #[must_use]
    pub fn spell() -> Self {
        Self::object(Filter::spells())
    }

    #[must_use]
    pub fn player() -> Self {
        Self::new(TargetKind::Player(ControllerFilter::Any))
    }

    #[must_use]
    pub fn opponent() -> Self {
        Self::new(TargetKind::Player(ControllerFilter::Opponent))
    }

    /// Creature or player.
    #[must_use]
    pub fn any_target() -> Self {
        Self::new(TargetKind::ObjectOrPlayer {
            objects: Filter::creatures(),
            players: ControllerFilter::Any,
        })
    }

    #[must_use]
    pub fn with_count(mut self, min: usize, max: usize) -> Self {
        self.min = min;
        self.max = max.max(min);
        self
    }

    /// "Up to N targets".
    #[must_use]
    pub fn up_to(self, max: usize) -> Self {
        self.with_count(0, max)
    }

    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.min > 0
    }
}

/// Who is targeting, and with what.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetContext {
    pub controller: PlayerId,
    pub source: EntityId,
    /// Colors of the source, for protection.
    pub source_colors: ColorSet,
}

impl TargetContext {
    /// Context for `source`, reading its colors from `view` when it exists.
    #[must_use]
    pub fn new(view: &Projection, controller: PlayerId, source: EntityId) -> Self {
        let source_colors = view.get(source).map_or(ColorSet::COLORLESS, |o| o.characteristics.colors);
        Self {
            controller,
            source,
            source_colors,
        }
    }

    fn filter_context(&self) -> FilterContext {
        FilterContext::new(self.controller, Some(self.source))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("{0} does not exist")]
    NoSuchObject(EntityId),

    #[error("{0} is not a legal choice for this target")]
    NotAllowed(EntityId),

    #[error("{0} has hexproof")]
    Hexproof(EntityId),

    #[error("{0} has shroud")]
    Shroud(EntityId),

    #[error("{target} has protection from {color}")]
    Protection { target: EntityId, color: Color },

    #[error("{0} has left the game")]
    PlayerOut(PlayerId),

    #[error("{0} chosen more than once")]
    Duplicate(EntityId),

    #[error("expected {min} to {max} targets, got {got}")]
    Count { min: usize, max: usize, got: usize },
}

/// Check one target against one requirement.
pub fn check_target(
    state: &GameState,
    view: &Projection,
    spec: &TargetSpec,
    ctx: &TargetContext,
    target: EntityId,
) -> Result<(), TargetError> {
    let player_count = state.player_count();
    if let Some(player) = target.as_player(player_count) {
        let accepts = match &spec.kind {
            TargetKind::Player(filter) | TargetKind::ObjectOrPlayer { players: filter, .. } => *filter,
            TargetKind::Object(_) => return Err(TargetError::NotAllowed(target)),
        };
        if !state.players[player].in_game() {
            return Err(TargetError::PlayerOut(player));
        }
        if !accepts.accepts(ctx.controller, player) {
            return Err(TargetError::NotAllowed(target));
        }
        return Ok(());
    }

    let filter = match &spec.kind {
        TargetKind::Object(filter) | TargetKind::ObjectOrPlayer { objects: filter, .. } => filter,
        TargetKind::Player(_) => return Err(TargetError::NotAllowed(target)),
    };
    let Some(obj) = view.get(target) else {
        return Err(TargetError::NoSuchObject(target));
    };
    if !filter.matches(state, view, &ctx.filter_context(), target) {
        return Err(TargetError::NotAllowed(target));
    }
    if obj.has_keyword(Keyword::Shroud) {
        return Err(TargetError::Shroud(target));
    }
    if obj.has_keyword(Keyword::Hexproof) && obj.controller != ctx.controller {
        return Err(TargetError::Hexproof(target));
    }
    for keyword in &obj.characteristics.keywords {
        if let Keyword::ProtectionFrom(color) = keyword {
            if ctx.source_colors.contains(*color) {
                return Err(TargetError::Protection { target, color: *color });
            }
        }
    }
    Ok(())
}

/// Every legal choice for `spec`: players first, then objects in zone order.
#[must_use]
pub fn legal_targets(state: &GameState, view: &Projection, spec: &TargetSpec, ctx: &TargetContext) -> Vec<EntityId> {
    let mut found: Vec<EntityId> = Vec::new();
    if matches!(spec.kind, TargetKind::Player(_) | TargetKind::ObjectOrPlayer { .. }) {
        found.extend(PlayerId::all(state.player_count()).map(EntityId::player));
    }
    match &spec.kind {
        TargetKind::Object(filter) | TargetKind::ObjectOrPlayer { objects: filter, .. } => {
            found.extend(state.objects_in(filter.zone));
        }
        TargetKind::Player(_) => {}
    }
    found.retain(|id| check_target(state, view, spec, ctx, *id).is_ok());
    found
}

/// Validate a full selection for one requirement: count, duplicates and
/// each target's legality.
pub fn validate_selection(
    state: &GameState,
    view: &Projection,
    spec: &TargetSpec,
    ctx: &TargetContext,
    chosen: &[EntityId],
) -> Result<(), TargetError> {
    if chosen.len() < spec.min || chosen.len() > spec.max {
        return Err(TargetError::Count {
            min: spec.min,
            max: spec.max,
            got: chosen.len(),
        });
    }
    for (i, target) in chosen.iter().enumerate() {
        if chosen[..i].contains(target) {
            return Err(TargetError::Duplicate(*target));
        }
        check_target(state, view, spec, ctx, *target)?;
    }
    Ok(())
}

/// Whether a requirement can be met at all.
#[must_use]
pub fn can_satisfy(state: &GameState, view: &Projection, spec: &TargetSpec, ctx: &TargetContext) -> bool {
    legal_targets(state, view, spec, ctx).len() >= spec.min
}
