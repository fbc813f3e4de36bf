//! Red-black rank maps for Rust.
//!
//! This crate provides [`RankMap`] and [`MultiRankMap`], ordered maps that answer
//! order-statistic queries in O(log n):
//!
//! - [`get_rank`](RankMap::get_rank) - Get the sorted position of a key
//! - [`get_key_by_rank`](RankMap::get_key_by_rank) - Get the key at a sorted position
//! - [`nearest_less`](RankMap::nearest_less) and friends - Find the neighbour of a key together with its rank
//! - Indexing by [`Rank`] - e.g., `map[Rank(0)]` for the first value
//!
//! A [`MultiRankMap`] gives every key a count, so that the key occupies that many
//! consecutive ranks; [`adjust_count`](MultiRankMap::adjust_count) grows or shrinks it.
//!
//! # Example
//!
//! ```
//! use rank_rbtree::{RankMap, Rank};
//!
//! let mut scores = RankMap::new();
//! scores.add("Alice", 100).unwrap();
//! scores.add("Bob", 85).unwrap();
//! scores.add("Carol", 92).unwrap();
//!
//! assert_eq!(scores.get(&"Bob"), Ok(&85));
//! assert_eq!(scores.len(), 3);
//!
//! // Keys are sorted alphabetically.
//! assert_eq!(scores.get_key_by_rank(1), Ok(&"Bob"));
//! assert_eq!(scores.get_rank(&"Carol"), Ok(2));
//! assert_eq!(scores[Rank(0)], 100);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Pluggable order** - Keys are compared through a [`Comparer`], not necessarily `Ord`
//! - **Node store policies** - Nodes live in a flat arena that discards, retains or caps
//!   freed nodes, see [`AllocationMode`]
//! - **Two cursors** - A fast cursor that detects concurrent modification, and a robust
//!   cursor that keeps going through it
//!
//! # Implementation
//!
//! The maps are red-black trees with top-down insertion and deletion. Instead of a
//! subtree size, each node stores its position relative to its parent; a rotation
//! re-bases a constant number of offsets and a change in an entry's count updates
//! only the nodes on one search path.

#![cfg_attr(not(test), no_std)]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod comparer;
mod error;
mod inspect;
mod nearest;
mod order_statistic;
mod raw;

pub mod multi_rank_map;
pub mod rank_map;

pub use comparer::{CompareFn, Comparer, NaturalOrder};
pub use error::{Error, Result};
pub use inspect::{Inspector, NodeView};
pub use multi_rank_map::MultiRankMap;
pub use nearest::Nearest;
pub use order_statistic::Rank;
pub use rank_map::RankMap;
pub use raw::AllocationMode;
