//! The interface to the external scene renderer, and an in-memory implementation.

use cgviz_core::{Color, DMat4, DVec3, GeometryId, MaterialId, NodeId, SceneError};
use indexmap::IndexMap;

use crate::geometry::Geometry;
use crate::graph::NodeKind;
use crate::material::Material;

/// A retained-mode scene graph owned by the host.
///
/// The visualizer never frees anything implicitly: every geometry and
/// material it creates is released through [`SceneRenderer::release_geometry`]
/// and [`SceneRenderer::release_material`], and every node through
/// [`SceneRenderer::release_node`].
pub trait SceneRenderer {
    /// The scene root. Never released.
    fn root(&self) -> NodeId;

    fn create_container(&mut self, name: &str) -> Result<NodeId, SceneError>;

    fn create_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId, SceneError>;

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, SceneError>;

    fn create_mesh(
        &mut self,
        name: &str,
        geometry: GeometryId,
        material: MaterialId,
    ) -> Result<NodeId, SceneError>;

    fn create_polyline(
        &mut self,
        name: &str,
        geometry: GeometryId,
        material: MaterialId,
    ) -> Result<NodeId, SceneError>;

    fn create_points(
        &mut self,
        name: &str,
        geometry: GeometryId,
        material: MaterialId,
    ) -> Result<NodeId, SceneError>;

    /// Replace the local transform of a node.
    fn set_transform(&mut self, node: NodeId, transform: &DMat4) -> Result<(), SceneError>;

    fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError>;

    fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError>;

    /// Free a node. Its geometry and material stay alive.
    fn release_node(&mut self, node: NodeId) -> Result<(), SceneError>;

    fn release_geometry(&mut self, geometry: GeometryId) -> Result<(), SceneError>;

    fn release_material(&mut self, material: MaterialId) -> Result<(), SceneError>;
}

/// One call recorded by the [`HeadlessRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    CreateNode { node: NodeId, kind: NodeKind, name: String },
    CreateGeometry(GeometryId),
    CreateMaterial(MaterialId),
    SetTransform(NodeId),
    Attach { parent: NodeId, child: NodeId },
    Detach { parent: NodeId, child: NodeId },
    ReleaseNode(NodeId),
    ReleaseGeometry(GeometryId),
    ReleaseMaterial(MaterialId),
}

/// A node held by the [`HeadlessRenderer`].
#[derive(Debug, Clone)]
pub struct HeadlessNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub transform: DMat4,
    pub geometry: Option<GeometryId>,
    pub material: Option<MaterialId>,
}

/// A renderer that keeps everything in memory.
///
/// Tracks every live node, geometry and material and records each call,
/// which makes resource leaks and double releases observable.
#[derive(Debug)]
pub struct HeadlessRenderer {
    next_id: u32,
    root: NodeId,
    nodes: IndexMap<NodeId, HeadlessNode>,
    geometries: IndexMap<GeometryId, Geometry>,
    materials: IndexMap<MaterialId, Material>,
    events: Vec<RenderEvent>,
    create_budget: Option<usize>,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = IndexMap::new();
        nodes.insert(
            root,
            HeadlessNode {
                name: "Scene".to_string(),
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
                transform: DMat4::IDENTITY,
                geometry: None,
                material: None,
            },
        );
        Self {
            next_id: 1,
            root,
            nodes,
            geometries: IndexMap::new(),
            materials: IndexMap::new(),
            events: Vec::new(),
            create_budget: None,
        }
    }

    /// Let only `budget` more create calls succeed; `None` lifts the limit.
    pub fn set_create_budget(&mut self, budget: Option<usize>) {
        self.create_budget = budget;
    }

    fn next(&mut self) -> Result<u32, SceneError> {
        if let Some(budget) = self.create_budget.as_mut() {
            if *budget == 0 {
                return Err(SceneError::Renderer {
                    reason: "create budget exhausted".to_string(),
                });
            }
            *budget -= 1;
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut HeadlessNode, SceneError> {
        self.nodes.get_mut(&node).ok_or(SceneError::UnknownNode(node.0))
    }

    fn create_node(
        &mut self,
        name: &str,
        kind: NodeKind,
        geometry: Option<GeometryId>,
        material: Option<MaterialId>,
    ) -> Result<NodeId, SceneError> {
        if let Some(g) = geometry {
            if !self.geometries.contains_key(&g) {
                return Err(SceneError::Renderer {
                    reason: format!("unknown geometry #{}", g.0),
                });
            }
        }
        if let Some(m) = material {
            if !self.materials.contains_key(&m) {
                return Err(SceneError::Renderer {
                    reason: format!("unknown material #{}", m.0),
                });
            }
        }
        let node = NodeId(self.next()?);
        self.nodes.insert(
            node,
            HeadlessNode {
                name: name.to_string(),
                kind,
                parent: None,
                children: Vec::new(),
                transform: DMat4::IDENTITY,
                geometry,
                material,
            },
        );
        self.events.push(RenderEvent::CreateNode {
            node,
            kind,
            name: name.to_string(),
        });
        Ok(node)
    }

    pub fn node(&self, node: NodeId) -> Option<&HeadlessNode> {
        self.nodes.get(&node)
    }

    pub fn geometry(&self, geometry: GeometryId) -> Option<&Geometry> {
        self.geometries.get(&geometry)
    }

    pub fn material(&self, material: MaterialId) -> Option<&Material> {
        self.materials.get(&material)
    }

    /// Names of the children of a node, in attach order.
    pub fn child_names(&self, node: NodeId) -> Vec<&str> {
        self.nodes
            .get(&node)
            .into_iter()
            .flat_map(|n| n.children.iter())
            .filter_map(|child| self.nodes.get(child))
            .map(|child| child.name.as_str())
            .collect()
    }

    /// First live node with the given name, in creation order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name == name)
            .map(|(id, _)| *id)
    }

    /// Number of nodes reachable from the root, root excluded.
    pub fn attached_count(&self) -> usize {
        let mut stack = vec![self.root];
        let mut count = 0;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                count += node.children.len();
                stack.extend(node.children.iter().copied());
            }
        }
        count
    }

    /// Live nodes, root excluded.
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    /// Line colors of a polyline node.
    pub fn line_color(&self, node: NodeId) -> Option<Color> {
        let material = self.nodes.get(&node)?.material?;
        self.materials.get(&material).map(|m| m.color)
    }

    /// Points of a polyline node.
    pub fn polyline_points(&self, node: NodeId) -> Option<&[DVec3]> {
        let geometry = self.nodes.get(&node)?.geometry?;
        match self.geometries.get(&geometry)? {
            Geometry::Polyline { points } => Some(points),
            _ => None,
        }
    }

    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_container(&mut self, name: &str) -> Result<NodeId, SceneError> {
        self.create_node(name, NodeKind::Container, None, None)
    }

    fn create_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId, SceneError> {
        let id = GeometryId(self.next()?);
        self.geometries.insert(id, geometry.clone());
        self.events.push(RenderEvent::CreateGeometry(id));
        Ok(id)
    }

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, SceneError> {
        let id = MaterialId(self.next()?);
        self.materials.insert(id, material.clone());
        self.events.push(RenderEvent::CreateMaterial(id));
        Ok(id)
    }

    fn create_mesh(
        &mut self,
        name: &str,
        geometry: GeometryId,
        material: MaterialId,
    ) -> Result<NodeId, SceneError> {
        self.create_node(name, NodeKind::Mesh, Some(geometry), Some(material))
    }

    fn create_polyline(
        &mut self,
        name: &str,
        geometry: GeometryId,
        material: MaterialId,
    ) -> Result<NodeId, SceneError> {
        self.create_node(name, NodeKind::Polyline, Some(geometry), Some(material))
    }

    fn create_points(
        &mut self,
        name: &str,
        geometry: GeometryId,
        material: MaterialId,
    ) -> Result<NodeId, SceneError> {
        self.create_node(name, NodeKind::Points, Some(geometry), Some(material))
    }

    fn set_transform(&mut self, node: NodeId, transform: &DMat4) -> Result<(), SceneError> {
        self.node_mut(node)?.transform = *transform;
        self.events.push(RenderEvent::SetTransform(node));
        Ok(())
    }

    fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownNode(parent.0));
        }
        let previous = self.node_mut(child)?.parent.replace(parent);
        if let Some(previous) = previous {
            if let Some(old) = self.nodes.get_mut(&previous) {
                old.children.retain(|c| *c != child);
            }
        }
        self.node_mut(parent)?.children.push(child);
        self.events.push(RenderEvent::Attach { parent, child });
        Ok(())
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let node = self.node_mut(child)?;
        if node.parent != Some(parent) {
            return Err(SceneError::Renderer {
                reason: format!("node #{} is not a child of #{}", child.0, parent.0),
            });
        }
        node.parent = None;
        self.node_mut(parent)?.children.retain(|c| *c != child);
        self.events.push(RenderEvent::Detach { parent, child });
        Ok(())
    }

    fn release_node(&mut self, node: NodeId) -> Result<(), SceneError> {
        if node == self.root {
            return Err(SceneError::Renderer {
                reason: "the scene root cannot be released".to_string(),
            });
        }
        let removed = self
            .nodes
            .shift_remove(&node)
            .ok_or(SceneError::UnknownNode(node.0))?;
        if let Some(parent) = removed.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
        for child in removed.children {
            if let Some(child) = self.nodes.get_mut(&child) {
                child.parent = None;
            }
        }
        self.events.push(RenderEvent::ReleaseNode(node));
        Ok(())
    }

    fn release_geometry(&mut self, geometry: GeometryId) -> Result<(), SceneError> {
        self.geometries.shift_remove(&geometry).ok_or_else(|| SceneError::Renderer {
            reason: format!("geometry #{} released twice", geometry.0),
        })?;
        self.events.push(RenderEvent::ReleaseGeometry(geometry));
        Ok(())
    }

    fn release_material(&mut self, material: MaterialId) -> Result<(), SceneError> {
        self.materials.shift_remove(&material).ok_or_else(|| SceneError::Renderer {
            reason: format!("material #{} released twice", material.0),
        })?;
        self.events.push(RenderEvent::ReleaseMaterial(material));
        Ok(())
    }
}
