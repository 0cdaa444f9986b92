//! Combat: declarations, blocker ordering and damage.
//!
//! Attackers are declared by the active player, each naming the opponent
//! it attacks. Every attacked player then declares blockers, in turn
//! order. An attacker blocked by two or more creatures has its blockers
//! ordered by the attacking player; damage is assigned in that order.

use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Keyword};
use crate::core::error::{AttackRestriction, BlockRestriction, DeclarationKind, IllegalAction};
use crate::core::{AttackDeclaration, BlockDeclaration, EntityId, GameState, PlayerId};
use crate::decision::{DecisionKind, DecisionRequest, ResumePoint};
use crate::layers::Projection;
use crate::mana::Color;
use crate::triggers::GameEvent;
use crate::zones::Zone;

use super::actions;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attacker {
    pub id: EntityId,
    pub defender: PlayerId,
    /// In damage assignment order once `ordered` is set.
    pub blockers: Vec<EntityId>,
    /// Stays set even if every blocker leaves combat.
    pub blocked: bool,
    pub ordered: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub attackers: Vec<Attacker>,
    /// Defending players who have declared blockers.
    pub declared: Vec<PlayerId>,
    /// Creatures that had first strike or double strike when the
    /// first-strike damage step began.
    pub struck_first: Vec<EntityId>,
}

impl CombatState {
    #[must_use]
    pub fn has_attackers(&self) -> bool {
        !self.attackers.is_empty()
    }

    #[must_use]
    pub fn attacker(&self, id: EntityId) -> Option<&Attacker> {
        self.attackers.iter().find(|a| a.id == id)
    }

    #[must_use]
    pub fn is_attacking(&self, id: EntityId) -> bool {
        self.attacker(id).is_some()
    }

    /// The attacker `id` is blocking.
    #[must_use]
    pub fn blocking(&self, id: EntityId) -> Option<EntityId> {
        self.attackers.iter().find(|a| a.blockers.contains(&id)).map(|a| a.id)
    }

    /// Take a creature out of combat.
    pub fn remove(&mut self, id: EntityId) {
        self.attackers.retain(|a| a.id != id);
        for attacker in &mut self.attackers {
            attacker.blockers.retain(|b| *b != id);
        }
    }
}

fn creature_of(view: &Projection, id: EntityId, player: PlayerId) -> bool {
    view.get(id).is_some_and(|o| o.is_creature() && o.controller == player)
}

/// Whether `id` could attack this turn.
pub fn check_attacker(state: &GameState, view: &Projection, id: EntityId) -> Result<(), AttackRestriction> {
    let active = state.turn.active;
    if !state.zones.is_in(id, Zone::Battlefield) || !creature_of(view, id, active) {
        return Err(AttackRestriction::NotYourCreature(id));
    }
    let Some(obj) = state.object(id) else {
        return Err(AttackRestriction::NotYourCreature(id));
    };
    if obj.tapped {
        return Err(AttackRestriction::Tapped(id));
    }
    if view.has_keyword(id, Keyword::Defender) {
        return Err(AttackRestriction::Defender);
    }
    if obj.summoning_sick && !view.has_keyword(id, Keyword::Haste) {
        return Err(AttackRestriction::SummoningSick(id));
    }
    Ok(())
}

/// Whether the active player has any creature able to attack.
#[must_use]
pub fn any_can_attack(state: &GameState) -> bool {
    let view = state.project();
    let has_opponent = state.players_in_game().any(|p| p != state.turn.active);
    has_opponent
        && state
            .permanents_of(&view, state.turn.active)
            .into_iter()
            .any(|id| check_attacker(state, &view, id).is_ok())
}

pub fn declare_attackers(state: &mut GameState, player: PlayerId, declarations: &[AttackDeclaration]) -> Result<(), IllegalAction> {
    let view = state.project();
    let count = state.player_count();
    for (i, decl) in declarations.iter().enumerate() {
        if declarations[..i].iter().any(|d| d.attacker == decl.attacker) {
            return Err(IllegalAction::CannotAttack(AttackRestriction::Duplicate(decl.attacker)));
        }
        check_attacker(state, &view, decl.attacker).map_err(IllegalAction::CannotAttack)?;
        let defender_ok = decl.defender != player
            && decl.defender.index() < count
            && state.players[decl.defender].in_game();
        if !defender_ok {
            return Err(IllegalAction::CannotAttack(AttackRestriction::InvalidDefender(EntityId::player(
                decl.defender,
            ))));
        }
    }
    for id in state.permanents_of(&view, player) {
        let must = view.has_keyword(id, Keyword::MustAttack);
        if must && check_attacker(state, &view, id).is_ok() && !declarations.iter().any(|d| d.attacker == id) {
            return Err(IllegalAction::CannotAttack(AttackRestriction::MustAttack(id)));
        }
    }

    let mut attackers = Vec::with_capacity(declarations.len());
    for decl in declarations {
        if !view.has_keyword(decl.attacker, Keyword::Vigilance) {
            actions::tap(state, decl.attacker);
        }
        attackers.push(Attacker {
            id: decl.attacker,
            defender: decl.defender,
            blockers: Vec::new(),
            blocked: false,
            ordered: false,
        });
        state.emit(GameEvent::AttackerDeclared {
            attacker: decl.attacker,
            defender: decl.defender,
        });
    }
    tracing::debug!(%player, attackers = attackers.len(), "attackers declared");
    state.combat.get_or_insert_with(CombatState::default).attackers = attackers;
    state.turn.awaiting = None;
    Ok(())
}

/// Whether `blocker` may block `attacker`.
pub fn check_block(
    state: &GameState,
    view: &Projection,
    defender: PlayerId,
    blocker: EntityId,
    attacker: EntityId,
) -> Result<(), BlockRestriction> {
    if !state.zones.is_in(blocker, Zone::Battlefield) || !creature_of(view, blocker, defender) {
        return Err(BlockRestriction::NotYourCreature(blocker));
    }
    let attacking_you = state
        .combat
        .as_ref()
        .and_then(|c| c.attacker(attacker))
        .is_some_and(|a| a.defender == defender);
    if !attacking_you {
        return Err(BlockRestriction::NotAttackingYou(attacker));
    }
    if state.object(blocker).is_some_and(|o| o.tapped) {
        return Err(BlockRestriction::Tapped(blocker));
    }
    let (Some(blocking), Some(attacking)) = (view.get(blocker), view.get(attacker)) else {
        return Err(BlockRestriction::NotAttackingYou(attacker));
    };
    if blocking.has_keyword(Keyword::CantBlock) {
        return Err(BlockRestriction::CantBlock);
    }
    if attacking.has_keyword(Keyword::Unblockable) {
        return Err(BlockRestriction::Unblockable);
    }
    if attacking.has_keyword(Keyword::Flying) && !blocking.has_keyword(Keyword::Flying) && !blocking.has_keyword(Keyword::Reach) {
        return Err(BlockRestriction::Flying);
    }
    if attacking.has_keyword(Keyword::Fear)
        && !blocking.has_type(CardType::Artifact)
        && !blocking.characteristics.colors.contains(Color::Black)
    {
        return Err(BlockRestriction::Fear);
    }
    for keyword in &attacking.characteristics.keywords {
        match keyword {
            Keyword::CantBeBlockedByPowerOrLess(n) if blocking.power().unwrap_or(0) <= *n => {
                return Err(BlockRestriction::PowerRestriction);
            }
            Keyword::ProtectionFrom(color) if blocking.characteristics.colors.contains(*color) => {
                return Err(BlockRestriction::Protection);
            }
            _ => {}
        }
    }
    Ok(())
}

/// The next attacked player who has not declared blockers, in turn order.
#[must_use]
pub fn next_defender(state: &GameState) -> Option<PlayerId> {
    let combat = state.combat.as_ref()?;
    state
        .apnap()
        .into_iter()
        .find(|p| !combat.declared.contains(p) && combat.attackers.iter().any(|a| a.defender == *p))
}

/// Whether any attacked player has a creature able to block.
#[must_use]
pub fn any_can_block(state: &GameState) -> bool {
    let Some(combat) = state.combat.as_ref() else {
        return false;
    };
    let view = state.project();
    combat.attackers.iter().any(|a| {
        state
            .permanents_of(&view, a.defender)
            .into_iter()
            .any(|b| check_block(state, &view, a.defender, b, a.id).is_ok())
    })
}

pub fn declare_blockers(state: &mut GameState, player: PlayerId, declarations: &[BlockDeclaration]) -> Result<(), IllegalAction> {
    let view = state.project();
    for (i, decl) in declarations.iter().enumerate() {
        if declarations[..i].iter().any(|d| d.blocker == decl.blocker) {
            return Err(IllegalAction::CannotBlock(BlockRestriction::Duplicate(decl.blocker)));
        }
        check_block(state, &view, player, decl.blocker, decl.attacker).map_err(IllegalAction::CannotBlock)?;
    }
    for decl in declarations {
        let blockers = declarations.iter().filter(|d| d.attacker == decl.attacker).count();
        if view.has_keyword(decl.attacker, Keyword::Menace) && blockers < 2 {
            return Err(IllegalAction::CannotBlock(BlockRestriction::Menace));
        }
    }
    let attackers: Vec<EntityId> = state
        .combat
        .as_ref()
        .map(|c| c.attackers.iter().filter(|a| a.defender == player).map(|a| a.id).collect())
        .unwrap_or_default();
    for id in state.permanents_of(&view, player) {
        if !view.has_keyword(id, Keyword::MustBlock) || declarations.iter().any(|d| d.blocker == id) {
            continue;
        }
        if attackers.iter().any(|a| check_block(state, &view, player, id, *a).is_ok()) {
            return Err(IllegalAction::CannotBlock(BlockRestriction::MustBlock(id)));
        }
    }

    let Some(combat) = state.combat.as_mut() else {
        return Err(IllegalAction::UnexpectedDeclaration(DeclarationKind::Blockers));
    };
    for decl in declarations {
        if let Some(attacker) = combat.attackers.iter_mut().find(|a| a.id == decl.attacker) {
            attacker.blockers.push(decl.blocker);
            attacker.blocked = true;
        }
    }
    combat.declared.push(player);
    for decl in declarations {
        state.emit(GameEvent::BlockerDeclared {
            blocker: decl.blocker,
            attacker: decl.attacker,
        });
    }
    tracing::debug!(%player, blockers = declarations.len(), "blockers declared");
    state.turn.awaiting = next_defender(state).map(|p| (DeclarationKind::Blockers, p));
    Ok(())
}

/// Ask the attacking player to order the blockers of the next attacker
/// with two or more. Returns `true` if a decision is now pending.
pub fn ask_blocker_order(state: &mut GameState) -> bool {
    let active = state.turn.active;
    let next = state.combat.as_mut().and_then(|combat| {
        for attacker in &mut combat.attackers {
            if attacker.ordered {
                continue;
            }
            if attacker.blockers.len() < 2 {
                attacker.ordered = true;
                continue;
            }
            return Some((attacker.id, attacker.blockers.clone()));
        }
        None
    });
    let Some((attacker, items)) = next else {
        return false;
    };
    let request = DecisionRequest::new(active, DecisionKind::OrderObjects { items }, "Order blockers for damage assignment");
    state.ask(request, ResumePoint::BlockerOrder { attacker });
    true
}

pub fn apply_blocker_order(state: &mut GameState, attacker: EntityId, order: Vec<EntityId>) {
    if let Some(entry) = state.combat.as_mut().and_then(|c| c.attackers.iter_mut().find(|a| a.id == attacker)) {
        entry.blockers = order;
        entry.ordered = true;
    }
}

/// Whether any creature in combat has first strike or double strike.
#[must_use]
pub fn has_first_strike(state: &GameState) -> bool {
    let Some(combat) = state.combat.as_ref() else {
        return false;
    };
    let view = state.project();
    combat
        .attackers
        .iter()
        .flat_map(|a| std::iter::once(a.id).chain(a.blockers.iter().copied()))
        .any(|id| strikes_first(&view, id))
}

fn strikes_first(view: &Projection, id: EntityId) -> bool {
    view.has_keyword(id, Keyword::FirstStrike) || view.has_keyword(id, Keyword::DoubleStrike)
}

fn deals_damage_now(view: &Projection, combat: &CombatState, id: EntityId, first_strike: bool) -> bool {
    if first_strike {
        strikes_first(view, id)
    } else {
        !combat.struck_first.contains(&id) || view.has_keyword(id, Keyword::DoubleStrike)
    }
}

/// Assign and deal combat damage for one damage step.
pub fn deal_damage(state: &mut GameState, first_strike: bool) {
    let Some(combat) = state.combat.clone() else {
        return;
    };
    let view = state.project();
    let on_battlefield = |id: EntityId| state.zones.is_in(id, Zone::Battlefield);
    let mut assignments: Vec<(EntityId, EntityId, u32)> = Vec::new();

    for attacker in &combat.attackers {
        if !on_battlefield(attacker.id) || !deals_damage_now(&view, &combat, attacker.id, first_strike) {
            continue;
        }
        let power = u32::try_from(view.power(attacker.id).unwrap_or(0)).unwrap_or(0);
        if power == 0 {
            continue;
        }
        let defender = EntityId::player(attacker.defender);
        let blockers: Vec<EntityId> = attacker.blockers.iter().copied().filter(|b| on_battlefield(*b)).collect();
        let trample = view.has_keyword(attacker.id, Keyword::Trample);

        if !attacker.blocked {
            assignments.push((attacker.id, defender, power));
            continue;
        }
        if blockers.is_empty() {
            if trample {
                assignments.push((attacker.id, defender, power));
            }
            continue;
        }

        let deathtouch = view.has_keyword(attacker.id, Keyword::Deathtouch);
        let mut remaining = power;
        let mut split: Vec<(EntityId, u32)> = Vec::with_capacity(blockers.len());
        for blocker in &blockers {
            let lethal = lethal_damage(state, &view, *blocker, deathtouch);
            let assigned = lethal.min(remaining);
            remaining -= assigned;
            split.push((*blocker, assigned));
        }
        if remaining > 0 {
            if trample {
                split.push((defender, remaining));
            } else if let Some(last) = split.last_mut() {
                last.1 += remaining;
            }
        }
        assignments.extend(split.into_iter().filter(|(_, n)| *n > 0).map(|(target, n)| (attacker.id, target, n)));
    }

    for attacker in &combat.attackers {
        if !on_battlefield(attacker.id) {
            continue;
        }
        for blocker in &attacker.blockers {
            if !on_battlefield(*blocker) || !deals_damage_now(&view, &combat, *blocker, first_strike) {
                continue;
            }
            let power = u32::try_from(view.power(*blocker).unwrap_or(0)).unwrap_or(0);
            if power > 0 {
                assignments.push((*blocker, attacker.id, power));
            }
        }
    }

    if first_strike {
        let strikers: Vec<EntityId> = combat
            .attackers
            .iter()
            .flat_map(|a| std::iter::once(a.id).chain(a.blockers.iter().copied()))
            .filter(|id| on_battlefield(*id) && strikes_first(&view, *id))
            .collect();
        if let Some(combat) = state.combat.as_mut() {
            combat.struck_first = strikers;
        }
    }

    tracing::debug!(first_strike, assignments = assignments.len(), "combat damage");
    for (source, target, amount) in assignments {
        actions::deal_damage(state, source, target, amount, true);
    }
}

/// Damage still needed to destroy `blocker`, counting damage already
/// marked.
fn lethal_damage(state: &GameState, view: &Projection, blocker: EntityId, deathtouch: bool) -> u32 {
    let marked = state.object(blocker).map_or(0, |o| o.damage);
    if deathtouch {
        return u32::from(marked == 0);
    }
    let toughness = u32::try_from(view.toughness(blocker).unwrap_or(0)).unwrap_or(0);
    toughness.saturating_sub(marked)
}
