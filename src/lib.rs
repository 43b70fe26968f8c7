//! # ordered-containers
//! An in-memory ordered associative container library built on a B-tree
//! node layout.
//!
//! ## Features
//! - Four container flavors over any totally-ordered key type: [`OrderedSet`],
//!   [`OrderedMultiSet`], [`OrderedMap`], [`OrderedMultiMap`].
//! - Bidirectional positional [`Cursor`]s with `lower_bound`/`upper_bound`
//!   ranged queries and a stable end sentinel.
//! - Lazy `keys`/`values`/`items` views that walk the tree without
//!   materializing a `Vec`.
//! - A validated, construction-time branching factor and a pluggable
//!   [`Comparator`], defaulting to natural order.
//!
//! ## Usage
//! This crate has no binary; it is consumed in-process as a library. See
//! each facade's module for examples.
// =====================================================================
// File: lib.rs
//
// Description:
//   Crate root: wires together the shared B-tree engine (`tree`, private)
//   and the four public facades built on it. The facades are the only
//   public surface; `tree` exposes only `Cursor` outward.
// =====================================================================
pub mod branching;
pub mod comparator;
pub mod error;

mod tree;
mod views;

pub mod map;
pub mod multimap;
pub mod multiset;
pub mod set;

pub use branching::BranchingFactor;
pub use comparator::{Comparator, NaturalOrder};
pub use error::{OrderedContainerError, OrderedResult};
pub use map::OrderedMap;
pub use multimap::OrderedMultiMap;
pub use multiset::OrderedMultiSet;
pub use set::OrderedSet;
pub use tree::Cursor;
pub use views::{Items, Keys, Values};
