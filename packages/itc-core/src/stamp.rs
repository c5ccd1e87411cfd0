use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::GrowthPolicy;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::id::Id;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One lineage: the share of identity it owns and the history it has observed.
///
/// Stamps are values. Every operation returns new stamps and leaves its inputs intact, so a stamp
/// can be cloned into another thread while the original keeps evolving.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stamp {
    id: Id,
    event: Event,
}

impl Default for Stamp {
    fn default() -> Self {
        Self::seed()
    }
}

impl Stamp {
    pub fn new(id: Id, event: Event) -> Self {
        Self { id, event }
    }

    /// The unique starting stamp: full ownership, empty history.
    pub fn seed() -> Self {
        Self::new(Id::ONE, Event::ZERO)
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn into_parts(self) -> (Id, Event) {
        (self.id, self.event)
    }

    /// An anonymous stamp owns nothing and can only observe.
    pub fn is_anonymous(&self) -> bool {
        self.id.is_zero()
    }

    pub fn is_canonical(&self) -> bool {
        self.id.is_canonical() && self.event.is_canonical()
    }

    /// Split ownership in two; both halves keep the full history.
    pub fn fork(&self) -> (Stamp, Stamp) {
        let (a, b) = self.id.split();
        (
            Stamp::new(a, self.event.clone()),
            Stamp::new(b, self.event.clone()),
        )
    }

    /// Reunite two lineages that came from a common fork.
    ///
    /// Overlapping ownership is reported as [`Error::DomainMismatch`].
    pub fn join(&self, other: &Stamp) -> Result<Stamp> {
        let id = self.id.sum(&other.id)?;
        let event = self.event.join(&other.event)?;
        Ok(Stamp::new(id, event))
    }

    /// Try to record an event by raising parts of the history this lineage owns to values that
    /// are already implied elsewhere, without adding structure.
    pub fn fill(&self) -> Result<Event> {
        fill(&self.id, &self.event)
    }

    /// Record an event by adding structure, with the default [`GrowthPolicy`].
    pub fn grow(&self) -> Result<(Event, u64)> {
        self.grow_with(&GrowthPolicy::default())
    }

    /// Returns the grown history and the cost of the path that was chosen.
    pub fn grow_with(&self, policy: &GrowthPolicy) -> Result<(Event, u64)> {
        grow(&self.id, &self.event, policy)
    }

    /// A stamp for the same lineage with strictly more history.
    pub fn advance(&self) -> Result<Stamp> {
        self.advance_with(&GrowthPolicy::default())
    }

    /// Both trees are canonicalized first: on a non-canonical history `fill` may return a
    /// restructured tree with the same values, which would be taken for progress.
    pub fn advance_with(&self, policy: &GrowthPolicy) -> Result<Stamp> {
        let id = self.id.normalized();
        let event = self.event.normalized()?;
        let filled = fill(&id, &event)?;
        if filled != event {
            tracing::trace!(stamp = %self, event = %filled, "advanced by fill");
            return Ok(Stamp::new(id, filled));
        }
        let (grown, cost) = grow(&id, &event, policy)?;
        tracing::trace!(stamp = %self, event = %grown, cost, "advanced by grow");
        Ok(Stamp::new(id, grown))
    }

    /// An anonymous copy of this stamp's history, suitable for handing to another lineage.
    pub fn peek(&self) -> Stamp {
        Stamp::new(Id::ZERO, self.event.clone())
    }

    /// Advance, then return the advanced stamp together with a peek of it.
    pub fn send(&self) -> Result<(Stamp, Stamp)> {
        let advanced = self.advance()?;
        let message = advanced.peek();
        Ok((advanced, message))
    }

    /// Absorb another stamp's history (usually a peek) and record the receipt.
    pub fn receive(&self, other: &Stamp) -> Result<Stamp> {
        self.join(other)?.advance()
    }

    /// Join two lineages and immediately fork them again, so both carry the merged history.
    pub fn sync(&self, other: &Stamp) -> Result<(Stamp, Stamp)> {
        Ok(self.join(other)?.fork())
    }

    /// `true` when this stamp's history is dominated by `other`'s.
    pub fn leq(&self, other: &Stamp) -> bool {
        self.event.leq(&other.event)
    }

    /// [`Stamp::leq`] that rejects non-canonical histories.
    pub fn try_leq(&self, other: &Stamp) -> Result<bool> {
        self.event.try_leq(&other.event)
    }

    pub fn causal_cmp(&self, other: &Stamp) -> Option<Ordering> {
        self.event.causal_cmp(&other.event)
    }

    pub fn concurrent(&self, other: &Stamp) -> bool {
        self.causal_cmp(other).is_none()
    }
}

fn fill(id: &Id, event: &Event) -> Result<Event> {
    match (id, event) {
        (Id::Leaf(false), _) => Ok(event.clone()),
        (Id::Leaf(true), _) => Ok(Event::leaf(event.max()?)),
        (Id::Node(..), Event::Leaf(_)) => Ok(event.clone()),
        (Id::Node(il, ir), Event::Node { value, left, right }) => {
            if il.is_one() {
                let filled_right = fill(ir, right)?;
                let bound = left.max()?.max(filled_right.min()?);
                Event::node(*value, Event::leaf(bound), filled_right).normalize()
            } else if ir.is_one() {
                let filled_left = fill(il, left)?;
                let bound = right.max()?.max(filled_left.min()?);
                Event::node(*value, filled_left, Event::leaf(bound)).normalize()
            } else {
                // Neither half is fully owned: fill both halves independently.
                let filled_left = fill(il, left)?;
                let filled_right = fill(ir, right)?;
                Event::node(*value, filled_left, filled_right).normalize()
            }
        }
    }
}

fn grow(id: &Id, event: &Event, policy: &GrowthPolicy) -> Result<(Event, u64)> {
    match (id, event) {
        (Id::Leaf(true), Event::Leaf(n)) => {
            let next = n
                .checked_add(1)
                .ok_or_else(|| Error::Overflow(format!("incrementing {event}")))?;
            Ok((Event::leaf(next), 0))
        }
        (Id::Node(..), Event::Leaf(n)) => {
            let expanded = Event::node(*n, Event::ZERO, Event::ZERO);
            let (grown, cost) = grow(id, &expanded, policy)?;
            Ok((grown, cost.saturating_add(policy.expansion_penalty)))
        }
        (Id::Node(il, ir), Event::Node { value, left, right }) => {
            if il.is_zero() {
                let (grown, cost) = grow(ir, right, policy)?;
                let event = Event::from_shared(*value, Arc::clone(left), Arc::new(grown));
                Ok((event, cost.saturating_add(1)))
            } else if ir.is_zero() {
                let (grown, cost) = grow(il, left, policy)?;
                let event = Event::from_shared(*value, Arc::new(grown), Arc::clone(right));
                Ok((event, cost.saturating_add(1)))
            } else {
                let (grown_left, cost_left) = grow(il, left, policy)?;
                let (grown_right, cost_right) = grow(ir, right, policy)?;
                if cost_left < cost_right {
                    let event = Event::from_shared(*value, Arc::new(grown_left), Arc::clone(right));
                    Ok((event, cost_left.saturating_add(1)))
                } else {
                    let event = Event::from_shared(*value, Arc::clone(left), Arc::new(grown_right));
                    Ok((event, cost_right.saturating_add(1)))
                }
            }
        }
        (Id::Leaf(false), _) => {
            tracing::debug!(event = %event, "cannot grow history without ownership");
            Err(Error::DomainMismatch(format!(
                "id 0 owns nothing, cannot grow {event}"
            )))
        }
        (Id::Leaf(true), Event::Node { .. }) => {
            tracing::debug!(event = %event, "grow reached an unfilled interior history");
            Err(Error::DomainMismatch(format!(
                "id 1 over interior history {event}; fill collapses this shape"
            )))
        }
    }
}
