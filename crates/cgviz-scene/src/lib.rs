//! Scene synchronization for the cgviz visualizer.
//!
//! This crate provides:
//! - The [`SceneRenderer`] interface to the host's retained-mode scene graph
//! - [`HeadlessRenderer`], an in-memory renderer used by tests and tools
//! - A mirror of the render graph and the per-scenario [`GroupRegistry`]
//! - Entity drafts that are either committed whole or discarded
//! - Geometry, materials, and the reusable point-of-view templates

mod bounds;
mod entity;
mod geometry;
mod graph;
mod material;
mod registry;
mod renderer;
mod templates;

pub use bounds::compute_group_bounds;
pub use entity::EntityDraft;
pub use geometry::{cylinder, plane, Geometry, Mesh};
pub use graph::{NodeKind, Ownership, SceneGraph, SceneNode};
pub use material::{Material, Shading};
pub use registry::GroupRegistry;
pub use renderer::{HeadlessNode, HeadlessRenderer, RenderEvent, SceneRenderer};
pub use templates::{pov_transform, PovTemplate, PovTemplateConfig, PovTemplates};
