//! Core types, identifiers, and errors for the cgviz visualizer.
//!
//! This crate provides the foundational types used across all other cgviz crates:
//! - Value types (colors, value ranges, bounding boxes, point-of-view and trace records)
//! - Opaque handles into the external scene renderer
//! - The identifier parser for file-name encoded keys
//! - Error types

pub mod errors;
pub mod handles;
pub mod ids;
pub mod types;

pub use errors::*;
pub use handles::*;
pub use ids::*;
pub use types::*;

pub use glam::{DMat4, DVec3};
