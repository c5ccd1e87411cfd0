#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cost charged when `grow` has to expand a flat history leaf into a node.
pub const DEFAULT_EXPANSION_PENALTY: u64 = 1000;

/// Tunables for the grow half of `advance`.
///
/// The expansion penalty biases growth toward reusing structure that already exists in the
/// history tree: any path that has to turn a leaf into an interior node is charged this much on
/// top of its depth, so a path through existing nodes wins unless it is deeper than the penalty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrowthPolicy {
    pub expansion_penalty: u64,
}

impl GrowthPolicy {
    pub const fn new(expansion_penalty: u64) -> Self {
        Self { expansion_penalty }
    }

    pub fn with_expansion_penalty(mut self, expansion_penalty: u64) -> Self {
        self.expansion_penalty = expansion_penalty;
        self
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXPANSION_PENALTY)
    }
}
