//! Collection types shared across Lamina crates.
//!
//! This module provides:
//! - Re-exports of hash collections using AHash
//! - SparseSet, a generational arena addressed by [`sparse_set::IndexSlot`]

pub mod sparse_set;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
