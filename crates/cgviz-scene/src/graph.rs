//! Mirror of the render graph.
//!
//! The registry records every node it creates or adopts here, so that
//! membership queries, bounds and recursive teardown never have to query
//! the renderer.

use cgviz_core::{BoundingBox, NodeId, ResourceId, SceneError};
use indexmap::IndexMap;
use smallvec::SmallVec;

/// What a node draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Root,
    Container,
    Mesh,
    Polyline,
    Points,
}

impl NodeKind {
    /// Whether the node carries geometry of its own.
    pub fn is_drawable(&self) -> bool {
        matches!(self, NodeKind::Mesh | NodeKind::Polyline | NodeKind::Points)
    }
}

/// Who releases a node and its resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    /// Released when removed from the scene.
    #[default]
    Owned,
    /// Only detached when removed; released by whoever lent it.
    Borrowed,
}

/// Renderer resources a node is responsible for releasing.
pub type Resources = SmallVec<[ResourceId; 2]>;

/// A node in the mirror.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Local bounding box, untransformed.
    pub bounds: Option<BoundingBox>,
    /// Released together with the node.
    pub resources: Resources,
    pub ownership: Ownership,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            children: Vec::new(),
            bounds: None,
            resources: SmallVec::new(),
            ownership: Ownership::Owned,
        }
    }

    pub fn with_bounds(mut self, bounds: Option<BoundingBox>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn borrowed(mut self) -> Self {
        self.ownership = Ownership::Borrowed;
        self
    }

    pub fn with_resources(mut self, resources: impl IntoIterator<Item = ResourceId>) -> Self {
        self.resources.extend(resources);
        self
    }
}

/// Arena of mirrored nodes keyed by renderer node id.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    root: NodeId,
    nodes: IndexMap<NodeId, SceneNode>,
}

impl SceneGraph {
    pub fn new(root: NodeId) -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(root, SceneNode::new("Scene", NodeKind::Root));
        Self { root, nodes }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a detached node.
    pub fn insert(&mut self, id: NodeId, node: SceneNode) {
        self.nodes.insert(id, node);
    }

    /// Attach `child` under `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownNode(parent.0));
        }
        self.detach(child)?;
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Detach a node from its parent, returning the former parent.
    pub fn detach(&mut self, child: NodeId) -> Result<Option<NodeId>, SceneError> {
        let node = self
            .nodes
            .get_mut(&child)
            .ok_or(SceneError::UnknownNode(child.0))?;
        let parent = node.parent.take();
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != child);
        }
        Ok(parent)
    }

    /// Remove a node and all of its descendants, children before parents.
    ///
    /// The subtree root is detached first.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<(NodeId, SceneNode)>, SceneError> {
        self.detach(id)?;
        let order = self.post_order(id);
        let mut removed = Vec::with_capacity(order.len());
        for node_id in order {
            if let Some(node) = self.nodes.shift_remove(&node_id) {
                removed.push((node_id, node));
            }
        }
        Ok(removed)
    }

    /// All nodes under `id` (inclusive), children before parents.
    pub fn post_order(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![(id, false)];
        while let Some((node_id, expanded)) = stack.pop() {
            if expanded {
                order.push(node_id);
                continue;
            }
            let Some(node) = self.nodes.get(&node_id) else { continue };
            stack.push((node_id, true));
            for child in node.children.iter().rev() {
                stack.push((*child, false));
            }
        }
        order
    }

    /// Every descendant of `id`, excluding `id`, depth first.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(&id)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            let node = self.nodes.get(&next)?;
            stack.extend(node.children.iter().rev().copied());
            Some((next, node))
        })
    }

    /// First descendant of `id` with the given name.
    pub fn find_descendant(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(id)
            .find(|(_, node)| node.name == name)
            .map(|(node_id, _)| node_id)
    }

    /// Direct child of `id` with the given name.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.nodes
            .get(&id)?
            .children
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).is_some_and(|n| n.name == name))
    }
}
