//! Render entities under construction.
//!
//! An [`EntityDraft`] collects every node and resource created for one
//! entity. Nothing is attached to a category container until the draft is
//! committed through the registry, and a failed build discards the draft
//! so no partial entity is left behind.

use cgviz_core::{BoundingBox, DMat4, GeometryId, MaterialId, NodeId, ResourceId, SceneError};

use crate::geometry::Geometry;
use crate::graph::{NodeKind, SceneNode};
use crate::material::Material;
use crate::renderer::SceneRenderer;

/// A detached entity: one root node plus its descendants.
#[derive(Debug)]
pub struct EntityDraft {
    root: NodeId,
    /// Root first, descendants in creation order.
    nodes: Vec<(NodeId, SceneNode)>,
}

impl EntityDraft {
    fn single(node: NodeId, mirror: SceneNode) -> Self {
        Self {
            root: node,
            nodes: vec![(node, mirror)],
        }
    }

    /// An empty container.
    pub fn container<R: SceneRenderer + ?Sized>(
        renderer: &mut R,
        name: &str,
    ) -> Result<Self, SceneError> {
        let node = renderer.create_container(name)?;
        Ok(Self::single(node, SceneNode::new(name, NodeKind::Container)))
    }

    /// A container filled by `fill`. Discarded when `fill` fails.
    pub fn build_container<R, E, F>(renderer: &mut R, name: &str, fill: F) -> Result<Self, E>
    where
        R: SceneRenderer + ?Sized,
        E: From<SceneError>,
        F: FnOnce(&mut R, &mut EntityDraft) -> Result<(), E>,
    {
        let mut draft = Self::container(renderer, name)?;
        match fill(renderer, &mut draft) {
            Ok(()) => Ok(draft),
            Err(err) => {
                draft.discard(renderer);
                Err(err)
            }
        }
    }

    /// A drawable that owns a fresh geometry and material.
    ///
    /// The node kind follows the geometry: triangles become a mesh, a line
    /// strip a polyline and a point set a point cloud.
    pub fn drawable<R: SceneRenderer + ?Sized>(
        renderer: &mut R,
        name: &str,
        geometry: &Geometry,
        material: &Material,
    ) -> Result<Self, SceneError> {
        let kind = match geometry {
            Geometry::Triangles(_) => NodeKind::Mesh,
            Geometry::Polyline { .. } => NodeKind::Polyline,
            Geometry::Points { .. } => NodeKind::Points,
        };

        let g = renderer.create_geometry(geometry)?;
        let m = match renderer.create_material(material) {
            Ok(m) => m,
            Err(err) => {
                release_resource(renderer, g.into());
                return Err(err);
            }
        };
        let node = match create_node(renderer, kind, name, g, m) {
            Ok(node) => node,
            Err(err) => {
                release_resource(renderer, g.into());
                release_resource(renderer, m.into());
                return Err(err);
            }
        };

        let mirror = SceneNode::new(name, kind)
            .with_bounds(geometry.bounding_box())
            .with_resources([ResourceId::from(g), ResourceId::from(m)]);
        Ok(Self::single(node, mirror))
    }

    /// A mesh drawing shared resources it does not own.
    pub fn shared_mesh<R: SceneRenderer + ?Sized>(
        renderer: &mut R,
        name: &str,
        geometry: GeometryId,
        material: MaterialId,
        bounds: Option<BoundingBox>,
    ) -> Result<Self, SceneError> {
        let node = renderer.create_mesh(name, geometry, material)?;
        Ok(Self::single(
            node,
            SceneNode::new(name, NodeKind::Mesh).with_bounds(bounds),
        ))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn name(&self) -> &str {
        self.nodes.first().map_or("", |(_, node)| node.name.as_str())
    }

    /// Number of nodes in the draft, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Move `child` under the root of this draft.
    ///
    /// On failure the child is discarded and this draft is left unchanged.
    pub fn push<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        child: EntityDraft,
    ) -> Result<(), SceneError> {
        if let Err(err) = renderer.attach_child(self.root, child.root) {
            child.discard(renderer);
            return Err(err);
        }
        let child_root = child.root;
        for (id, mut node) in child.nodes {
            if id == child_root {
                node.parent = Some(self.root);
            }
            self.nodes.push((id, node));
        }
        if let Some((_, root)) = self.nodes.first_mut() {
            root.children.push(child_root);
        }
        Ok(())
    }

    /// Replace the local transform of the root node.
    pub fn set_transform<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        transform: &DMat4,
    ) -> Result<(), SceneError> {
        renderer.set_transform(self.root, transform)
    }

    /// Release every node and resource of the draft, children first.
    pub fn discard<R: SceneRenderer + ?Sized>(self, renderer: &mut R) {
        log::debug!("Discarding draft {}", self.name());
        for (id, node) in self.nodes.into_iter().rev() {
            release_node(renderer, id, &node);
        }
    }

    pub(crate) fn into_nodes(self) -> (NodeId, Vec<(NodeId, SceneNode)>) {
        (self.root, self.nodes)
    }
}

fn create_node<R: SceneRenderer + ?Sized>(
    renderer: &mut R,
    kind: NodeKind,
    name: &str,
    geometry: GeometryId,
    material: MaterialId,
) -> Result<NodeId, SceneError> {
    match kind {
        NodeKind::Polyline => renderer.create_polyline(name, geometry, material),
        NodeKind::Points => renderer.create_points(name, geometry, material),
        _ => renderer.create_mesh(name, geometry, material),
    }
}

/// Release a resource, logging failures.
pub(crate) fn release_resource<R: SceneRenderer + ?Sized>(renderer: &mut R, resource: ResourceId) {
    let result = match resource {
        ResourceId::Geometry(g) => renderer.release_geometry(g),
        ResourceId::Material(m) => renderer.release_material(m),
    };
    if let Err(err) = result {
        log::warn!("Failed to release {:?}: {}", resource, err);
    }
}

/// Release a node and the resources it owns, logging failures.
pub(crate) fn release_node<R: SceneRenderer + ?Sized>(renderer: &mut R, id: NodeId, node: &SceneNode) {
    if let Err(err) = renderer.release_node(id) {
        log::warn!("Failed to release node {} (#{}): {}", node.name, id.0, err);
    }
    for resource in &node.resources {
        release_resource(renderer, *resource);
    }
}
