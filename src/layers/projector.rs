//! The layered characteristic projector.
//!
//! `project` is a pure function of the game state. It starts every object
//! from its printed characteristics and applies continuous effects layer by
//! layer, ordering effects inside a layer with [`super::dependency::order`].
//!
//! ## Effect sources
//!
//! - Effects stored in `GameState::effects`, created when a spell or ability
//!   resolved ("target creature gets +3/+3 until end of turn").
//! - Effects generated on the fly from static abilities of battlefield
//!   objects, read after the copy layer so a copy gets the statics of what it
//!   copies, and read again after the ability layer so a granted static
//!   applies in the power/toughness layers. They carry the source's
//!   timestamp and stop applying as soon as the source loses its abilities.
//!
//! ## Filters
//!
//! `Affected::Matching` filters and static-ability conditions are evaluated
//! against the in-progress projection immediately before the effect
//! applies. The resulting set is fixed for that application; an effect that
//! changes the very characteristic its filter tests does not re-select.
//!
//! Nothing is cached. Callers project again after every mutation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cards::{Ability, CardType, Characteristics, Keyword, StaticEffect};
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::FilterContext;
use crate::zones::Zone;

use super::continuous::{Affected, ContinuousEffect, Duration, EffectId, Layer, Modification, PtValue};
use super::dependency;

/// An object as it currently is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedObject {
    pub id: EntityId,
    pub characteristics: Characteristics,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub abilities: Vec<Ability>,
    pub lost_all_abilities: bool,
}

impl ProjectedObject {
    #[must_use]
    pub fn power(&self) -> Option<i32> {
        self.characteristics.power
    }

    #[must_use]
    pub fn toughness(&self) -> Option<i32> {
        self.characteristics.toughness
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.characteristics.keywords.contains(&keyword)
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.characteristics.has_type(card_type)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }
}

/// The projected view of every object in the game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    objects: BTreeMap<EntityId, ProjectedObject>,
}

impl Projection {
    /// Printed characteristics, before any effect.
    #[must_use]
    pub fn base(state: &GameState) -> Self {
        let objects = state
            .objects
            .iter()
            .map(|(id, obj)| {
                let projected = ProjectedObject {
                    id: *id,
                    characteristics: obj.card.characteristics.clone(),
                    owner: obj.owner,
                    controller: obj.controller,
                    abilities: obj.card.abilities.clone(),
                    lost_all_abilities: false,
                };
                (*id, projected)
            })
            .collect();
        Self { objects }
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&ProjectedObject> {
        self.objects.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.objects.contains_key(&id)
    }

    #[must_use]
    pub fn power(&self, id: EntityId) -> Option<i32> {
        self.get(id)?.power()
    }

    #[must_use]
    pub fn toughness(&self, id: EntityId) -> Option<i32> {
        self.get(id)?.toughness()
    }

    #[must_use]
    pub fn controller(&self, id: EntityId) -> Option<PlayerId> {
        self.get(id).map(|o| o.controller)
    }

    #[must_use]
    pub fn has_keyword(&self, id: EntityId, keyword: Keyword) -> bool {
        self.get(id).is_some_and(|o| o.has_keyword(keyword))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectedObject> {
        self.objects.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Add an object that is no longer in the game, such as the last-known
    /// information of a permanent that just left the battlefield.
    pub(crate) fn insert(&mut self, object: ProjectedObject) {
        self.objects.entry(object.id).or_insert(object);
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut ProjectedObject> {
        self.objects.get_mut(&id)
    }
}

/// Compute the current characteristics of every object.
#[must_use]
pub fn project(state: &GameState) -> Projection {
    project_through(state, Layer::PowerToughnessSwitch)
}

/// The copiable values of an object: its characteristics and abilities once
/// copy effects have applied, and nothing later.
#[must_use]
pub fn copiable_values(state: &GameState, id: EntityId) -> Option<(Characteristics, Vec<Ability>)> {
    let view = project_through(state, Layer::Copy);
    let object = view.get(id)?;
    Some((object.characteristics.clone(), object.abilities.clone()))
}

fn project_through(state: &GameState, last: Layer) -> Projection {
    let mut view = Projection::base(state);
    let stored: Vec<ContinuousEffect> = state.effects.iter().cloned().collect();
    let mut generated: Vec<ContinuousEffect> = Vec::new();

    for layer in Layer::ALL.into_iter().take_while(|l| *l <= last) {
        match layer {
            // Statics are read after copy effects have settled, and again
            // once granted abilities are known.
            Layer::Control | Layer::PowerToughnessDefine => generated = static_effects(state, &view),
            _ => {}
        }
        let in_layer: Vec<&ContinuousEffect> = stored
            .iter()
            .chain(generated.iter())
            .filter(|e| e.layer() == layer)
            .collect();

        for effect in dependency::order(state, &view, &in_layer) {
            if !is_active(state, &view, effect) {
                continue;
            }
            let ids = affected_ids(state, &view, effect);
            apply_to(state, &mut view, &effect.modification, &ids);
        }

        if layer == Layer::PowerToughnessModify {
            apply_counters(state, &mut view);
        }
    }
    tracing::trace!(objects = view.len(), effects = stored.len() + generated.len(), "projected");
    view
}

/// Continuous effects generated by the static abilities of permanents.
fn static_effects(state: &GameState, view: &Projection) -> Vec<ContinuousEffect> {
    let mut effects = Vec::new();
    for id in state.objects_in(Zone::Battlefield) {
        let (Some(obj), Some(projected)) = (state.objects.get(&id), view.get(id)) else {
            continue;
        };
        for ability in &projected.abilities {
            let Some(static_ability) = ability.as_static() else {
                continue;
            };
            let StaticEffect::Continuous { affected, modification } = &static_ability.effect else {
                continue;
            };
            let affected = match affected {
                crate::cards::AffectedSpec::Source => Affected::Source,
                crate::cards::AffectedSpec::AttachedTo => Affected::AttachedTo,
                crate::cards::AffectedSpec::Matching(filter) => Affected::Matching(filter.clone()),
            };
            let mut effect = ContinuousEffect::new(EffectId(0), id, projected.controller, affected, modification.clone())
                .with_duration(Duration::WhileSourcePresent)
                .with_timestamp(obj.timestamp);
            effect.condition = static_ability.condition.clone();
            effect.from_static = true;
            effects.push(effect);
        }
    }
    effects
}

/// The player an effect acts for: a static follows its source's current
/// controller.
pub(crate) fn effect_controller(view: &Projection, effect: &ContinuousEffect) -> PlayerId {
    if effect.from_static {
        view.controller(effect.source).unwrap_or(effect.controller)
    } else {
        effect.controller
    }
}

/// Whether an effect applies at all right now.
pub(crate) fn is_active(state: &GameState, view: &Projection, effect: &ContinuousEffect) -> bool {
    if effect.from_static && view.get(effect.source).is_none_or(|o| o.lost_all_abilities) {
        return false;
    }
    match &effect.condition {
        Some(condition) => {
            let ctx = FilterContext::new(effect_controller(view, effect), Some(effect.source));
            condition.evaluate(state, view, &ctx, 0)
        }
        None => true,
    }
}

/// The objects an effect applies to, judged by `view`.
pub(crate) fn affected_ids(state: &GameState, view: &Projection, effect: &ContinuousEffect) -> Vec<EntityId> {
    let mut ids = match &effect.affected {
        Affected::Object(id) => vec![*id],
        Affected::Objects(ids) => ids.clone(),
        Affected::Source => vec![effect.source],
        Affected::AttachedTo => state
            .objects
            .get(&effect.source)
            .and_then(|o| o.attached_to)
            .into_iter()
            .collect(),
        Affected::Matching(filter) => {
            let ctx = FilterContext::new(effect_controller(view, effect), Some(effect.source));
            filter.select(state, view, &ctx)
        }
    };
    ids.retain(|id| view.contains(*id));
    ids
}

pub(crate) fn apply_to(state: &GameState, view: &mut Projection, modification: &Modification, ids: &[EntityId]) {
    for &id in ids {
        // Values that read the view are computed before borrowing mutably.
        let copied = match modification {
            Modification::CopyOf(original) => view
                .get(*original)
                .map(|o| (o.characteristics.clone(), o.abilities.clone())),
            _ => None,
        };
        let defined = match modification {
            Modification::DefinePowerToughness { power, toughness } => {
                let Some(controller) = view.controller(id) else {
                    continue;
                };
                let ctx = FilterContext::new(controller, Some(id));
                let eval = |value: &PtValue| match value {
                    PtValue::Fixed(n) => *n,
                    PtValue::CountOf(filter) => i32::try_from(filter.count(state, view, &ctx)).unwrap_or(i32::MAX),
                };
                Some((eval(power), eval(toughness)))
            }
            _ => None,
        };

        let Some(obj) = view.get_mut(id) else {
            continue;
        };
        let chars = &mut obj.characteristics;
        match modification {
            Modification::CopyOf(_) => {
                if let Some((characteristics, abilities)) = copied {
                    obj.characteristics = characteristics;
                    obj.abilities = abilities;
                }
            }
            Modification::ChangeController(player) => obj.controller = *player,
            Modification::AddCardType(t) => {
                chars.card_types.insert(*t);
            }
            Modification::RemoveCardType(t) => {
                chars.card_types.remove(t);
            }
            Modification::AddSubtype(s) => {
                chars.subtypes.insert(s.clone());
            }
            Modification::SetColors(colors) => chars.colors = *colors,
            Modification::AddColors(colors) => chars.colors = chars.colors.union(*colors),
            Modification::AddKeyword(k) => {
                chars.keywords.insert(*k);
            }
            Modification::RemoveKeyword(k) => {
                chars.keywords.remove(k);
            }
            Modification::AddAbility(ability) => obj.abilities.push((**ability).clone()),
            Modification::LoseAllAbilities => {
                chars.keywords.clear();
                obj.abilities.clear();
                obj.lost_all_abilities = true;
            }
            Modification::DefinePowerToughness { .. } => {
                if let Some((p, t)) = defined {
                    chars.power = Some(p);
                    chars.toughness = Some(t);
                }
            }
            Modification::SetPowerToughness { power, toughness } => {
                chars.power = Some(*power);
                chars.toughness = Some(*toughness);
            }
            Modification::ModifyPowerToughness { power, toughness } => {
                chars.power = chars.power.map(|p| p + power);
                chars.toughness = chars.toughness.map(|t| t + toughness);
            }
            Modification::SwitchPowerToughness => {
                std::mem::swap(&mut chars.power, &mut chars.toughness);
            }
        }
    }
}

fn apply_counters(state: &GameState, view: &mut Projection) {
    for (id, obj) in &state.objects {
        let bonus = obj.counter_bonus();
        if bonus == 0 {
            continue;
        }
        if let Some(projected) = view.get_mut(*id) {
            let chars = &mut projected.characteristics;
            chars.power = chars.power.map(|p| p + bonus);
            chars.toughness = chars.toughness.map(|t| t + bonus);
        }
    }
}
