use std::sync::Arc;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ownership tree over an abstract identity interval.
///
/// `Leaf(true)` owns its whole interval and `Leaf(false)` owns none of it. An interior node hands
/// each half of its interval to one child.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Id {
    Leaf(bool),
    Node(Arc<Id>, Arc<Id>),
}

impl Default for Id {
    fn default() -> Self {
        Id::ZERO
    }
}

impl Id {
    pub const ZERO: Id = Id::Leaf(false);
    pub const ONE: Id = Id::Leaf(true);

    pub const fn zero() -> Self {
        Id::ZERO
    }

    pub const fn one() -> Self {
        Id::ONE
    }

    pub fn node(left: Id, right: Id) -> Self {
        Id::Node(Arc::new(left), Arc::new(right))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Id::Leaf(_))
    }

    /// `true` for the zero leaf: owns nothing.
    pub fn is_zero(&self) -> bool {
        matches!(self, Id::Leaf(false))
    }

    /// `true` for the one leaf: owns everything.
    pub fn is_one(&self) -> bool {
        matches!(self, Id::Leaf(true))
    }

    pub fn children(&self) -> Option<(&Id, &Id)> {
        match self {
            Id::Leaf(_) => None,
            Id::Node(left, right) => Some((left.as_ref(), right.as_ref())),
        }
    }

    /// Divide ownership into two disjoint halves.
    ///
    /// The halves are two standalone roots, not the children of one tree. Subtrees that move to
    /// one side unchanged are shared with `self`.
    pub fn split(&self) -> (Id, Id) {
        match self {
            Id::Leaf(false) => (Id::ZERO, Id::ZERO),
            Id::Leaf(true) => (Id::node(Id::ONE, Id::ZERO), Id::node(Id::ZERO, Id::ONE)),
            Id::Node(left, right) if left.is_zero() => {
                let (a, b) = right.split();
                (Id::node(Id::ZERO, a), Id::node(Id::ZERO, b))
            }
            Id::Node(left, right) if right.is_zero() => {
                let (a, b) = left.split();
                (Id::node(a, Id::ZERO), Id::node(b, Id::ZERO))
            }
            Id::Node(left, right) => (
                Id::Node(Arc::clone(left), Arc::new(Id::ZERO)),
                Id::Node(Arc::new(Id::ZERO), Arc::clone(right)),
            ),
        }
    }

    /// Reunite two disjoint ownership trees; the inverse of [`Id::split`].
    ///
    /// A zero leaf on either side yields the other operand, which also covers the `0 + 0` pair
    /// that splitting a zero leaf produces. Both sides claiming the same interval (`1 + 1`, or a
    /// one leaf against an interior node) cannot come from a common split and is rejected with
    /// [`Error::DomainMismatch`].
    pub fn sum(&self, other: &Id) -> Result<Id> {
        match (self, other) {
            (Id::Leaf(false), _) => Ok(other.clone()),
            (_, Id::Leaf(false)) => Ok(self.clone()),
            (Id::Node(l1, r1), Id::Node(l2, r2)) => {
                Ok(Id::node(l1.sum(l2)?, r1.sum(r2)?).normalize())
            }
            _ => {
                tracing::debug!(left = %self, right = %other, "rejecting sum of overlapping ids");
                Err(Error::DomainMismatch(format!(
                    "ids {self} and {other} overlap and are not a split pair"
                )))
            }
        }
    }

    /// Collapse a node whose children are equal leaves.
    pub fn normalize(&self) -> Id {
        match self {
            Id::Node(left, right) => match (left.as_ref(), right.as_ref()) {
                (Id::Leaf(a), Id::Leaf(b)) if a == b => Id::Leaf(*a),
                _ => self.clone(),
            },
            Id::Leaf(_) => self.clone(),
        }
    }

    /// Canonicalize the whole tree, leaves first.
    pub fn normalized(&self) -> Id {
        match self {
            Id::Leaf(_) => self.clone(),
            Id::Node(left, right) => Id::node(left.normalized(), right.normalized()).normalize(),
        }
    }

    pub fn is_canonical(&self) -> bool {
        match self {
            Id::Leaf(_) => true,
            Id::Node(left, right) => {
                !matches!((left.as_ref(), right.as_ref()), (Id::Leaf(a), Id::Leaf(b)) if a == b)
                    && left.is_canonical()
                    && right.is_canonical()
            }
        }
    }
}
