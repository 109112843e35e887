//! Lamina Core
//!
//! Geometry, collections, logging and profiling shared by the Lamina scene
//! graph crates.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod profiling;

pub use geometry::{Edge, IPos, IRect, ISize, Location, Pos, Rect, Size};
