//! Continuous effects and the layer they apply in.

use serde::{Deserialize, Serialize};

use crate::cards::{Ability, CardType, Keyword, Subtype};
use crate::core::{EntityId, PlayerId};
use crate::effects::{Condition, Filter};
use crate::mana::ColorSet;

/// Application order. Earlier layers never see the results of later ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Copy,
    Control,
    Type,
    Color,
    Ability,
    /// Characteristic-defining power/toughness.
    PowerToughnessDefine,
    PowerToughnessSet,
    /// Modifications, then counters.
    PowerToughnessModify,
    PowerToughnessSwitch,
}

impl Layer {
    pub const ALL: [Layer; 9] = [
        Layer::Copy,
        Layer::Control,
        Layer::Type,
        Layer::Color,
        Layer::Ability,
        Layer::PowerToughnessDefine,
        Layer::PowerToughnessSet,
        Layer::PowerToughnessModify,
        Layer::PowerToughnessSwitch,
    ];
}

/// A power or toughness value defined by a characteristic-defining ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PtValue {
    Fixed(i32),
    /// Number of objects matching, judged from the object's controller.
    CountOf(Filter),
}

/// What a continuous effect does to each affected object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modification {
    /// Take the copiable values of another object.
    CopyOf(EntityId),
    ChangeController(PlayerId),
    AddCardType(CardType),
    RemoveCardType(CardType),
    AddSubtype(Subtype),
    SetColors(ColorSet),
    AddColors(ColorSet),
    AddKeyword(Keyword),
    RemoveKeyword(Keyword),
    AddAbility(Box<Ability>),
    LoseAllAbilities,
    DefinePowerToughness { power: PtValue, toughness: PtValue },
    SetPowerToughness { power: i32, toughness: i32 },
    ModifyPowerToughness { power: i32, toughness: i32 },
    SwitchPowerToughness,
}

impl Modification {
    #[must_use]
    pub fn layer(&self) -> Layer {
        match self {
            Modification::CopyOf(_) => Layer::Copy,
            Modification::ChangeController(_) => Layer::Control,
            Modification::AddCardType(_) | Modification::RemoveCardType(_) | Modification::AddSubtype(_) => Layer::Type,
            Modification::SetColors(_) | Modification::AddColors(_) => Layer::Color,
            Modification::AddKeyword(_)
            | Modification::RemoveKeyword(_)
            | Modification::AddAbility(_)
            | Modification::LoseAllAbilities => Layer::Ability,
            Modification::DefinePowerToughness { .. } => Layer::PowerToughnessDefine,
            Modification::SetPowerToughness { .. } => Layer::PowerToughnessSet,
            Modification::ModifyPowerToughness { .. } => Layer::PowerToughnessModify,
            Modification::SwitchPowerToughness => Layer::PowerToughnessSwitch,
        }
    }

    #[must_use]
    pub fn pump(power: i32, toughness: i32) -> Self {
        Modification::ModifyPowerToughness { power, toughness }
    }
}

/// When an effect stops applying.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    /// Removed in the cleanup step.
    #[default]
    UntilEndOfTurn,
    /// Removed when the source leaves the battlefield.
    WhileSourcePresent,
    Indefinite,
}

/// Which objects an effect applies to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affected {
    Object(EntityId),
    /// A set locked when the effect was created.
    Objects(Vec<EntityId>),
    Source,
    /// Whatever the source is attached to when the effect applies.
    AttachedTo,
    /// Re-evaluated on every projection, just before the effect applies.
    Matching(Filter),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u64);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuousEffect {
    pub id: EffectId,
    pub source: EntityId,
    pub controller: PlayerId,
    pub affected: Affected,
    pub modification: Modification,
    pub duration: Duration,
    pub timestamp: u64,
    /// Static abilities may be conditional.
    pub condition: Option<Condition>,
    /// Generated by a static ability; stops applying if the source loses
    /// its abilities.
    pub from_static: bool,
}

impl ContinuousEffect {
    #[must_use]
    pub fn new(id: EffectId, source: EntityId, controller: PlayerId, affected: Affected, modification: Modification) -> Self {
        Self {
            id,
            source,
            controller,
            affected,
            modification,
            duration: Duration::default(),
            timestamp: id.0,
            condition: None,
            from_static: false,
        }
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn layer(&self) -> Layer {
        self.modification.layer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_order() {
        let mut sorted = Layer::ALL;
        sorted.sort();
        assert_eq!(sorted, Layer::ALL);
        assert!(Layer::Ability < Layer::PowerToughnessSet);
    }

    #[test]
    fn test_modification_layers() {
        assert_eq!(Modification::pump(1, 1).layer(), Layer::PowerToughnessModify);
        assert_eq!(Modification::LoseAllAbilities.layer(), Layer::Ability);
        assert_eq!(Modification::ChangeController(PlayerId::new(1)).layer(), Layer::Control);
        assert_eq!(Modification::AddSubtype(Subtype::new("Goblin")).layer(), Layer::Type);
    }
}
