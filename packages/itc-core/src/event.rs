use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Offset-compressed history tree.
///
/// A leaf holds a count; an interior node holds an offset that applies to everything beneath it.
/// The effective value at a leaf is the sum of the offsets on its root path plus its own count.
///
/// Trees are immutable: every operation returns a new root and shares untouched subtrees with
/// its inputs through `Arc`, so handing a clone to another thread never exposes a mutation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    Leaf(u64),
    Node {
        value: u64,
        left: Arc<Event>,
        right: Arc<Event>,
    },
}

impl Default for Event {
    fn default() -> Self {
        Event::ZERO
    }
}

impl Event {
    pub const ZERO: Event = Event::Leaf(0);

    pub const fn leaf(value: u64) -> Self {
        Event::Leaf(value)
    }

    pub fn node(value: u64, left: Event, right: Event) -> Self {
        Event::Node {
            value,
            left: Arc::new(left),
            right: Arc::new(right),
        }
    }

    pub(crate) fn from_shared(value: u64, left: Arc<Event>, right: Arc<Event>) -> Self {
        Event::Node { value, left, right }
    }

    /// The node's own value: the count of a leaf, the offset of an interior node.
    pub fn value(&self) -> u64 {
        match self {
            Event::Leaf(value) | Event::Node { value, .. } => *value,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Event::Leaf(_))
    }

    pub fn children(&self) -> Option<(&Event, &Event)> {
        match self {
            Event::Leaf(_) => None,
            Event::Node { left, right, .. } => Some((left.as_ref(), right.as_ref())),
        }
    }

    fn with_value(&self, value: u64) -> Event {
        match self {
            Event::Leaf(_) => Event::Leaf(value),
            Event::Node { left, right, .. } => {
                Event::from_shared(value, Arc::clone(left), Arc::clone(right))
            }
        }
    }

    /// Raise the root value by `m`, keeping the shape.
    pub fn lift(&self, m: u64) -> Result<Event> {
        let value = self
            .value()
            .checked_add(m)
            .ok_or_else(|| Error::Overflow(format!("lifting {self} by {m}")))?;
        Ok(self.with_value(value))
    }

    /// Lower the root value by `m`. Fails if `m` exceeds the root's own value.
    pub fn sink(&self, m: u64) -> Result<Event> {
        let value = self.value().checked_sub(m).ok_or_else(|| {
            Error::InvariantViolation(format!(
                "cannot sink {self} by {m}: root value is {}",
                self.value()
            ))
        })?;
        Ok(self.with_value(value))
    }

    /// Smallest effective value anywhere in the tree.
    pub fn min(&self) -> Result<u64> {
        match self {
            Event::Leaf(value) => Ok(*value),
            Event::Node { value, left, right } => {
                let below = left.min()?.min(right.min()?);
                value
                    .checked_add(below)
                    .ok_or_else(|| Error::Overflow(format!("minimum of {self}")))
            }
        }
    }

    /// Largest effective value anywhere in the tree.
    pub fn max(&self) -> Result<u64> {
        match self {
            Event::Leaf(value) => Ok(*value),
            Event::Node { value, left, right } => {
                let below = left.max()?.max(right.max()?);
                value
                    .checked_add(below)
                    .ok_or_else(|| Error::Overflow(format!("maximum of {self}")))
            }
        }
    }

    /// Canonicalize this level only; both children must already be canonical.
    ///
    /// Two equal leaf children collapse into a single leaf. Otherwise the smaller of the two
    /// child root values is hoisted into this node's offset and sunk out of both children. For
    /// canonical children a root value is also the subtree minimum, so this never walks below
    /// the children. Non-canonical children are left as they are; use [`Event::normalized`].
    pub fn normalize(&self) -> Result<Event> {
        let Event::Node { value, left, right } = self else {
            return Ok(self.clone());
        };

        if let (Event::Leaf(l), Event::Leaf(r)) = (left.as_ref(), right.as_ref()) {
            if l == r {
                let collapsed = value
                    .checked_add(*l)
                    .ok_or_else(|| Error::Overflow(format!("collapsing {self}")))?;
                return Ok(Event::Leaf(collapsed));
            }
        }

        let m = left.value().min(right.value());
        if m == 0 {
            return Ok(self.clone());
        }
        let hoisted = value
            .checked_add(m)
            .ok_or_else(|| Error::Overflow(format!("hoisting {m} into {self}")))?;
        Ok(Event::node(hoisted, left.sink(m)?, right.sink(m)?))
    }

    /// Canonicalize the whole tree, leaves first.
    pub fn normalized(&self) -> Result<Event> {
        if self.is_canonical() {
            return Ok(self.clone());
        }
        self.normalized_below()
    }

    fn normalized_below(&self) -> Result<Event> {
        match self {
            Event::Leaf(_) => Ok(self.clone()),
            Event::Node { value, left, right } => {
                let left = left.normalized_below()?;
                let right = right.normalized_below()?;
                Event::node(*value, left, right).normalize()
            }
        }
    }

    pub fn is_canonical(&self) -> bool {
        match self {
            Event::Leaf(_) => true,
            Event::Node { left, right, .. } => {
                let collapsible = matches!(
                    (left.as_ref(), right.as_ref()),
                    (Event::Leaf(l), Event::Leaf(r)) if l == r
                );
                // For canonical children the root value is also the subtree minimum.
                !collapsible
                    && left.value().min(right.value()) == 0
                    && left.is_canonical()
                    && right.is_canonical()
            }
        }
    }

    /// `true` when every position of `self` is at or below the same position of `other`.
    ///
    /// The result is only causally meaningful when both trees are canonical; a leaf compared
    /// against an interior node looks at the node's own value, which is a lower bound of the
    /// node only after normalization. See [`Event::try_leq`] for the checked variant.
    pub fn leq(&self, other: &Event) -> bool {
        leq_lifted(self, 0, other, 0)
    }

    /// [`Event::leq`] that rejects non-canonical operands.
    pub fn try_leq(&self, other: &Event) -> Result<bool> {
        for tree in [self, other] {
            if !tree.is_canonical() {
                return Err(Error::NonCanonical(format!("cannot compare {tree}")));
            }
        }
        Ok(self.leq(other))
    }

    /// Causal order between two histories; `None` means they are concurrent.
    pub fn causal_cmp(&self, other: &Event) -> Option<Ordering> {
        match (self.leq(other), other.leq(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }

    /// Least upper bound of two histories. The result is normalized at every level it rebuilds.
    pub fn join(&self, other: &Event) -> Result<Event> {
        match (self, other) {
            (Event::Leaf(a), Event::Leaf(b)) => Ok(Event::Leaf(*a.max(b))),
            (Event::Leaf(a), Event::Node { .. }) => {
                Event::node(*a, Event::ZERO, Event::ZERO).join(other)
            }
            (Event::Node { .. }, Event::Leaf(b)) => {
                self.join(&Event::node(*b, Event::ZERO, Event::ZERO))
            }
            (Event::Node { value: n1, .. }, Event::Node { value: n2, .. }) if n1 > n2 => {
                other.join(self)
            }
            (
                Event::Node {
                    value: n1,
                    left: l1,
                    right: r1,
                },
                Event::Node {
                    value: n2,
                    left: l2,
                    right: r2,
                },
            ) => {
                let offset = n2 - n1;
                let left = l1.join(&l2.lift(offset)?)?;
                let right = r1.join(&r2.lift(offset)?)?;
                Event::node(*n1, left, right).normalize()
            }
        }
    }
}

// Lifts are carried as accumulated ancestor offsets instead of rebuilding nodes. The
// interior-vs-interior arm compares the roots and then each pair of lifted children.
fn leq_lifted(a: &Event, lift_a: u128, b: &Event, lift_b: u128) -> bool {
    let na = lift_a.saturating_add(u128::from(a.value()));
    let nb = lift_b.saturating_add(u128::from(b.value()));
    match (a, b) {
        (Event::Leaf(_), _) => na <= nb,
        (
            Event::Node {
                left: la,
                right: ra,
                ..
            },
            Event::Leaf(_),
        ) => na <= nb && leq_lifted(la, na, b, lift_b) && leq_lifted(ra, na, b, lift_b),
        (
            Event::Node {
                left: la,
                right: ra,
                ..
            },
            Event::Node {
                left: lb,
                right: rb,
                ..
            },
        ) => na <= nb && leq_lifted(la, na, lb, nb) && leq_lifted(ra, na, rb, nb),
    }
}
