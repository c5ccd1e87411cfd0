#![forbid(unsafe_code)]
//! Interval Tree Clocks: causality tracking for a population of actors that grows and shrinks.
//! An [`Id`] tree records which part of the identity space a lineage owns, an [`Event`] tree
//! records the history it has seen, and a [`Stamp`] pairs the two. Lineages are created with
//! [`Stamp::fork`], record events with [`Stamp::advance`] and merge with [`Stamp::join`];
//! [`Stamp::leq`] gives the causal partial order.
//!
//! All trees are immutable and share structure through `Arc`, so stamps can move freely between
//! threads. Counters are `u64` with checked arithmetic: anything that would wrap fails with
//! [`Error::Overflow`] instead.

pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod render;
pub mod stamp;

pub use config::{GrowthPolicy, DEFAULT_EXPANSION_PENALTY};
pub use error::{Error, Result};
pub use event::Event;
pub use id::Id;
pub use render::MAX_PARSE_DEPTH;
pub use stamp::Stamp;
