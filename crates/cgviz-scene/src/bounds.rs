//! Group bounds over the scene mirror.

use cgviz_core::{BoundingBox, NodeId, SpatialBounds};

use crate::graph::SceneGraph;

/// Union of the local bounding boxes of every drawable under `group`.
///
/// Boxes are not transformed by ancestor transforms, and the center is the
/// midpoint of the union. Returns `None` when nothing under the group has
/// bounds.
// TODO: transform each box by its node's world transform once the mirror tracks transforms.
pub fn compute_group_bounds(graph: &SceneGraph, group: NodeId) -> Option<SpatialBounds> {
    let own = graph
        .get(group)
        .filter(|node| node.kind.is_drawable())
        .and_then(|node| node.bounds);

    own.into_iter()
        .chain(
            graph
                .descendants(group)
                .filter(|(_, node)| node.kind.is_drawable())
                .filter_map(|(_, node)| node.bounds),
        )
        .reduce(|a, b| a.union(&b))
        .map(|union: BoundingBox| SpatialBounds::from_box(&union))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeKind, SceneNode};
    use cgviz_core::DVec3;

    #[test]
    fn test_group_bounds_union() {
        let mut g = SceneGraph::new(NodeId(0));
        g.insert(NodeId(1), SceneNode::new("group", NodeKind::Container));
        g.insert(
            NodeId(2),
            SceneNode::new("a", NodeKind::Mesh)
                .with_bounds(Some(BoundingBox::new(DVec3::ZERO, DVec3::ONE))),
        );
        g.insert(
            NodeId(3),
            SceneNode::new("b", NodeKind::Polyline)
                .with_bounds(Some(BoundingBox::new(DVec3::splat(-1.0), DVec3::splat(3.0)))),
        );
        g.attach(NodeId(0), NodeId(1)).unwrap();
        g.attach(NodeId(1), NodeId(2)).unwrap();
        g.attach(NodeId(1), NodeId(3)).unwrap();

        let bounds = compute_group_bounds(&g, NodeId(1)).unwrap();
        assert_eq!(bounds.min, DVec3::splat(-1.0));
        assert_eq!(bounds.max, DVec3::splat(3.0));
        assert_eq!(bounds.center, DVec3::ONE);
    }

    #[test]
    fn test_group_bounds_empty() {
        let mut g = SceneGraph::new(NodeId(0));
        g.insert(NodeId(1), SceneNode::new("group", NodeKind::Container));
        assert!(compute_group_bounds(&g, NodeId(1)).is_none());
        assert!(compute_group_bounds(&g, NodeId(7)).is_none());
    }
}
