//! Opaque handles into the external scene renderer.
//!
//! The renderer owns the actual GPU/WebGL objects; the visualizer only
//! stores the handles it was given back.

/// A node (container, mesh, line, point cloud) in the render graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

/// A geometry buffer owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryId(pub u32);

/// A material owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaterialId(pub u32);

/// A renderer resource that must be released explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceId {
    Geometry(GeometryId),
    Material(MaterialId),
}

impl From<GeometryId> for ResourceId {
    fn from(id: GeometryId) -> Self {
        ResourceId::Geometry(id)
    }
}

impl From<MaterialId> for ResourceId {
    fn from(id: MaterialId) -> Self {
        ResourceId::Material(id)
    }
}
