//! Mana payment search.
//!
//! Given an effective cost, the floating pool and the untapped sources a
//! player could tap, find which sources to tap and which unit pays which
//! symbol.
//!
//! ## Guarantees
//!
//! - Every colored and `{C}` symbol is paid by a unit able to produce it.
//! - The number of distinct sources tapped is minimal. A source producing
//!   several units therefore wins over several single-unit sources.
//! - Sources not needed stay untapped.
//! - Among minimal answers, the one producing the fewest unused units wins,
//!   then the one using the lowest source ids.
//! - If no assignment exists, the search proves it and nothing is tapped.
//!
//! ## Algorithm
//!
//! Sources with identical output are grouped, so a board of twelve basic
//! lands is three or four groups rather than twelve independent choices. For
//! each size `k = 0, 1, ..` every way of drawing `k` sources from the groups
//! is tested with a bipartite matching (symbols on one side, produced units on
//! the other). Floating mana is always available and is matched first.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::EntityId;

use super::cost::{ManaCost, ManaSymbol, ManaType};
use super::pool::ManaPool;

/// One unit of mana a source produces, as the set of types it may be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ManaUnit(u8);

impl ManaUnit {
    #[must_use]
    pub const fn of(mana: ManaType) -> Self {
        ManaUnit(1 << mana.index())
    }

    /// "One mana of any color."
    #[must_use]
    pub const fn any_color() -> Self {
        ManaUnit(0b01_1111)
    }

    #[must_use]
    pub fn one_of(options: &[ManaType]) -> Self {
        ManaUnit(options.iter().fold(0, |bits, m| bits | (1 << m.index())))
    }

    #[must_use]
    pub const fn can_be(self, mana: ManaType) -> bool {
        self.0 & (1 << mana.index()) != 0
    }

    #[must_use]
    pub fn union(self, other: ManaUnit) -> ManaUnit {
        ManaUnit(self.0 | other.0)
    }

    pub fn options(self) -> impl Iterator<Item = ManaType> {
        ManaType::ALL.into_iter().filter(move |m| self.can_be(*m))
    }

    #[must_use]
    pub fn can_pay(self, symbol: ManaSymbol) -> bool {
        self.options().any(|m| symbol.accepts(m))
    }

    /// The type this unit becomes when spent on `symbol`.
    ///
    /// Generic symbols take colorless when possible so colored options are
    /// not reported as spent on generic.
    fn pay_as(self, symbol: ManaSymbol) -> Option<ManaType> {
        if symbol == ManaSymbol::Generic && self.can_be(ManaType::Colorless) {
            return Some(ManaType::Colorless);
        }
        self.options().find(|m| symbol.accepts(*m))
    }

    fn first_option(self) -> Option<ManaType> {
        self.options().next()
    }
}

/// A permanent that can be tapped for mana, and what one tap yields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaSource {
    pub id: EntityId,
    pub units: SmallVec<[ManaUnit; 2]>,
}

impl ManaSource {
    #[must_use]
    pub fn new(id: EntityId, units: impl IntoIterator<Item = ManaUnit>) -> Self {
        Self {
            id,
            units: units.into_iter().collect(),
        }
    }

    /// A source yielding one unit of a fixed type.
    #[must_use]
    pub fn basic(id: EntityId, mana: ManaType) -> Self {
        Self::new(id, [ManaUnit::of(mana)])
    }
}

/// Where a symbol's mana came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentSource {
    Pool,
    Permanent(EntityId),
}

/// A symbol and the mana that paid it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolPayment {
    pub symbol: ManaSymbol,
    pub mana: ManaType,
    pub source: PaymentSource,
}

/// A complete payment plan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPayment {
    /// Sources to tap, ascending by id.
    pub tapped: Vec<EntityId>,
    /// Floating units spent.
    pub from_pool: Vec<ManaType>,
    /// Units produced by tapped sources but not spent; they go to the pool.
    pub floating: Vec<ManaType>,
    pub assignments: Vec<SymbolPayment>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("{cost} cannot be paid with the available mana")]
    Insufficient { cost: ManaCost },

    #[error("{0} is not an available mana source")]
    UnavailableSource(EntityId),
}

/// Search for a payment of `cost`.
pub fn solve(cost: &ManaCost, pool: &ManaPool, sources: &[ManaSource]) -> Result<ManaPayment, PaymentError> {
    let symbols = cost.symbols();
    if symbols.is_empty() {
        return Ok(ManaPayment::default());
    }

    let pool_units: Vec<ManaType> = pool.units();
    let groups = group_sources(sources);
    let max_sources: usize = groups.iter().map(|g| g.members.len()).sum();

    for k in 0..=max_sources {
        if pool_units.len() + best_case_units(&groups, k) < symbols.len() {
            continue;
        }

        let mut best: Option<Candidate> = None;
        let mut counts = vec![0usize; groups.len()];
        enumerate(&groups, 0, k, &mut counts, &mut |counts| {
            if let Some(candidate) = evaluate(&symbols, &pool_units, &groups, counts) {
                let better = best.as_ref().is_none_or(|b| candidate.waste < b.waste);
                if better {
                    best = Some(candidate);
                }
            }
        });

        if let Some(found) = best {
            tracing::trace!(sources = k, waste = found.waste, "mana payment found");
            return Ok(found.payment);
        }
    }

    Err(PaymentError::Insufficient { cost: *cost })
}

/// Whether `cost` is payable at all.
#[must_use]
pub fn can_pay(cost: &ManaCost, pool: &ManaPool, sources: &[ManaSource]) -> bool {
    solve(cost, pool, sources).is_ok()
}

#[derive(Debug)]
struct Group {
    units: SmallVec<[ManaUnit; 2]>,
    members: Vec<EntityId>,
}

fn group_sources(sources: &[ManaSource]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for source in sources {
        if source.units.is_empty() {
            continue;
        }
        let mut key = source.units.clone();
        key.sort_unstable();
        match groups.iter_mut().find(|g| g.units == key) {
            Some(group) => group.members.push(source.id),
            None => groups.push(Group {
                units: key,
                members: vec![source.id],
            }),
        }
    }
    for group in &mut groups {
        group.members.sort_unstable();
    }
    // Multi-unit sources first, then a stable order on output.
    groups.sort_by(|a, b| b.units.len().cmp(&a.units.len()).then_with(|| a.units.cmp(&b.units)));
    groups
}

fn best_case_units(groups: &[Group], k: usize) -> usize {
    let mut per_source: Vec<usize> = groups
        .iter()
        .flat_map(|g| std::iter::repeat(g.units.len()).take(g.members.len()))
        .collect();
    per_source.sort_unstable_by(|a, b| b.cmp(a));
    per_source.into_iter().take(k).sum()
}

/// Visit every way to take `remaining` sources from `groups[index..]`.
fn enumerate(groups: &[Group], index: usize, remaining: usize, counts: &mut [usize], visit: &mut dyn FnMut(&[usize])) {
    if index == groups.len() {
        if remaining == 0 {
            visit(counts);
        }
        return;
    }
    let available: usize = groups[index..].iter().map(|g| g.members.len()).sum();
    if available < remaining {
        return;
    }
    let take_max = remaining.min(groups[index].members.len());
    for take in (0..=take_max).rev() {
        counts[index] = take;
        enumerate(groups, index + 1, remaining - take, counts, visit);
    }
    counts[index] = 0;
}

struct Candidate {
    waste: usize,
    payment: ManaPayment,
}

#[derive(Clone, Copy)]
struct Slot {
    unit: ManaUnit,
    source: PaymentSource,
}

fn evaluate(symbols: &[ManaSymbol], pool_units: &[ManaType], groups: &[Group], counts: &[usize]) -> Option<Candidate> {
    let mut slots: Vec<Slot> = pool_units
        .iter()
        .map(|m| Slot {
            unit: ManaUnit::of(*m),
            source: PaymentSource::Pool,
        })
        .collect();
    let pool_len = slots.len();
    let mut tapped = Vec::new();
    for (group, &take) in groups.iter().zip(counts) {
        for id in group.members.iter().take(take) {
            tapped.push(*id);
            slots.extend(group.units.iter().map(|u| Slot {
                unit: *u,
                source: PaymentSource::Permanent(*id),
            }));
        }
    }
    if slots.len() < symbols.len() {
        return None;
    }

    // Floating mana first so it is spent before freshly produced mana.
    let mut owner: Vec<Option<usize>> = vec![None; slots.len()];
    for s in 0..symbols.len() {
        let mut seen = vec![false; slots.len()];
        augment(s, symbols, &slots, pool_len, &mut owner, &mut seen);
    }
    let mut matched = owner.iter().filter(|o| o.is_some()).count();
    for s in 0..symbols.len() {
        if owner.contains(&Some(s)) {
            continue;
        }
        let mut seen = vec![false; slots.len()];
        if augment(s, symbols, &slots, slots.len(), &mut owner, &mut seen) {
            matched += 1;
        }
    }
    if matched < symbols.len() {
        return None;
    }

    let mut payment = ManaPayment {
        tapped,
        ..ManaPayment::default()
    };
    let mut waste = 0;
    for (slot, assigned) in slots.iter().zip(&owner) {
        match (assigned, slot.source) {
            (Some(s), source) => {
                let symbol = symbols[*s];
                let mana = slot.unit.pay_as(symbol)?;
                if source == PaymentSource::Pool {
                    payment.from_pool.push(mana);
                }
                payment.assignments.push(SymbolPayment { symbol, mana, source });
            }
            (None, PaymentSource::Permanent(_)) => {
                waste += 1;
                if let Some(mana) = slot.unit.first_option() {
                    payment.floating.push(mana);
                }
            }
            (None, PaymentSource::Pool) => {}
        }
    }
    payment.tapped.sort_unstable();
    Some(Candidate { waste, payment })
}

/// Kuhn augmenting path restricted to `slots[..limit]`.
fn augment(
    symbol: usize,
    symbols: &[ManaSymbol],
    slots: &[Slot],
    limit: usize,
    owner: &mut [Option<usize>],
    seen: &mut [bool],
) -> bool {
    for u in 0..limit {
        if seen[u] || !slots[u].unit.can_pay(symbols[symbol]) {
            continue;
        }
        seen[u] = true;
        let free = match owner[u] {
            None => true,
            Some(other) => augment(other, symbols, slots, limit, owner, seen),
        };
        if free {
            owner[u] = Some(symbol);
            return true;
        }
    }
    false
}
