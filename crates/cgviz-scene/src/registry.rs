//! Scene group registry.
//!
//! Every registered scenario owns a top-level container named after it,
//! holding one container per [`Category`]. An entity is shown exactly when
//! it is a child of its category container, so membership is the only
//! visibility state. The registry keeps a lookup table per category for
//! constant-time membership tests, and a mirror of the render graph for
//! traversals.

use cgviz_core::{
    BoundingBox, Category, NodeId, ScenarioId, SceneError, SpatialBounds,
};
use indexmap::IndexMap;

use crate::bounds::compute_group_bounds;
use crate::entity::{release_node, EntityDraft};
use crate::graph::{NodeKind, Ownership, SceneGraph, SceneNode};
use crate::renderer::SceneRenderer;

/// The containers of one scenario and the entities shown in them.
#[derive(Debug, Clone)]
struct ScenarioGroups {
    top: NodeId,
    containers: [NodeId; 4],
    entities: [IndexMap<String, NodeId>; 4],
}

fn slot(category: Category) -> usize {
    match category {
        Category::Universe => 0,
        Category::Povs => 1,
        Category::Traces => 2,
        Category::Kpis => 3,
    }
}

/// Per-scenario containers in the render graph.
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    graph: SceneGraph,
    scenarios: IndexMap<ScenarioId, ScenarioGroups>,
}

impl GroupRegistry {
    /// Create a registry mirroring a scene with the given root.
    pub fn new(root: NodeId) -> Self {
        Self {
            graph: SceneGraph::new(root),
            scenarios: IndexMap::new(),
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn is_registered(&self, scenario: &str) -> bool {
        self.scenarios.contains_key(scenario)
    }

    /// Registered scenarios in registration order.
    pub fn scenarios(&self) -> impl Iterator<Item = &ScenarioId> {
        self.scenarios.keys()
    }

    fn groups(&self, scenario: &str) -> Result<&ScenarioGroups, SceneError> {
        self.scenarios
            .get(scenario)
            .ok_or_else(|| SceneError::NotRegistered(scenario.to_string()))
    }

    /// Create the top-level container of a scenario and its four category
    /// containers, and attach them to the scene root.
    pub fn register_scenario<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        scenario: &str,
    ) -> Result<(), SceneError> {
        if self.is_registered(scenario) {
            return Err(SceneError::AlreadyRegistered(scenario.to_string()));
        }

        let draft = EntityDraft::build_container(renderer, scenario, |renderer, draft| {
            for category in Category::ALL {
                let container = EntityDraft::container(renderer, category.container_name())?;
                draft.push(renderer, container)?;
            }
            Ok::<(), SceneError>(())
        })?;
        if let Err(err) = renderer.attach_child(self.graph.root(), draft.root()) {
            draft.discard(renderer);
            return Err(err);
        }

        let (top, nodes) = draft.into_nodes();
        let mut containers = [top; 4];
        for (id, node) in nodes {
            if node.parent == Some(top) {
                if let Some(category) = Category::ALL
                    .iter()
                    .find(|c| c.container_name() == node.name)
                {
                    containers[slot(*category)] = id;
                }
            }
            self.graph.insert(id, node);
        }
        self.graph.attach(self.graph.root(), top)?;

        self.scenarios.insert(
            ScenarioId::from(scenario),
            ScenarioGroups {
                top,
                containers,
                entities: Default::default(),
            },
        );
        log::info!("Registered scenario {} in the scene", scenario);
        Ok(())
    }

    /// Tear down every container of a scenario.
    ///
    /// Owned nodes are released with their resources, borrowed nodes are
    /// only detached. Returns `false` if the scenario was not registered.
    pub fn unregister_scenario<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        scenario: &str,
    ) -> Result<bool, SceneError> {
        let Some(groups) = self.scenarios.shift_remove(scenario) else {
            return Ok(false);
        };

        if let Err(err) = renderer.detach_child(self.graph.root(), groups.top) {
            log::warn!("Failed to detach scenario {}: {}", scenario, err);
        }
        let removed = self.graph.remove_subtree(groups.top)?;
        let count = removed.len();
        for (id, node) in removed {
            dispose(renderer, id, &node);
        }
        log::info!("Removed scenario {} from the scene ({} nodes)", scenario, count);
        Ok(true)
    }

    /// Node of a category container.
    pub fn container(&self, scenario: &str, category: Category) -> Result<NodeId, SceneError> {
        Ok(self.groups(scenario)?.containers[slot(category)])
    }

    /// Whether an entity of that name is shown anywhere under the scenario.
    pub fn is_present(&self, scenario: &str, name: &str) -> bool {
        let Some(groups) = self.scenarios.get(scenario) else {
            return false;
        };
        groups.entities.iter().any(|names| names.contains_key(name))
            || self.graph.find_descendant(groups.top, name).is_some()
    }

    /// Whether a node of that name exists anywhere in the scene.
    pub fn is_in_scene(&self, name: &str) -> bool {
        self.graph.find_descendant(self.graph.root(), name).is_some()
    }

    /// Whether the entity is shown in that category of the scenario.
    pub fn is_present_in_category(&self, scenario: &str, category: Category, name: &str) -> bool {
        self.entity(scenario, category, name).is_some()
    }

    /// Root node of a shown entity.
    pub fn entity(&self, scenario: &str, category: Category, name: &str) -> Option<NodeId> {
        self.scenarios
            .get(scenario)?
            .entities[slot(category)]
            .get(name)
            .copied()
    }

    /// Names of the entities shown in a category, in insertion order.
    pub fn entity_names(&self, scenario: &str, category: Category) -> Vec<&str> {
        self.scenarios
            .get(scenario)
            .map(|g| g.entities[slot(category)].keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn check_vacant(&self, scenario: &str, category: Category, name: &str) -> Result<NodeId, SceneError> {
        let groups = self.groups(scenario)?;
        if groups.entities[slot(category)].contains_key(name) {
            return Err(SceneError::EntityExists {
                scenario: scenario.to_string(),
                category: category.to_string(),
                name: name.to_string(),
            });
        }
        Ok(groups.containers[slot(category)])
    }

    /// Attach a built entity to a category container.
    ///
    /// The category owns the entity afterwards. On failure the draft is
    /// discarded and the registry is unchanged.
    pub fn add_to_category<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        scenario: &str,
        category: Category,
        draft: EntityDraft,
    ) -> Result<NodeId, SceneError> {
        let container = match self.check_vacant(scenario, category, draft.name()) {
            Ok(container) => container,
            Err(err) => {
                draft.discard(renderer);
                return Err(err);
            }
        };
        if let Err(err) = renderer.attach_child(container, draft.root()) {
            draft.discard(renderer);
            return Err(err);
        }

        let name = draft.name().to_string();
        let (root, nodes) = draft.into_nodes();
        for (id, node) in nodes {
            self.graph.insert(id, node);
        }
        self.graph.attach(container, root)?;
        self.commit(scenario, category, name.clone(), root);
        log::info!("Added object {} in {}", name, scenario);
        Ok(root)
    }

    /// Attach a node owned elsewhere to a category container.
    ///
    /// Removing it later only detaches it.
    pub fn adopt<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        scenario: &str,
        category: Category,
        name: &str,
        node: NodeId,
        bounds: Option<BoundingBox>,
    ) -> Result<(), SceneError> {
        let container = self.check_vacant(scenario, category, name)?;
        renderer.attach_child(container, node)?;
        self.graph.insert(
            node,
            SceneNode::new(name, NodeKind::Mesh).with_bounds(bounds).borrowed(),
        );
        self.graph.attach(container, node)?;
        self.commit(scenario, category, name.to_string(), node);
        log::info!("Added object {} in {}", name, scenario);
        Ok(())
    }

    fn commit(&mut self, scenario: &str, category: Category, name: String, node: NodeId) {
        if let Some(groups) = self.scenarios.get_mut(scenario) {
            groups.entities[slot(category)].insert(name, node);
        }
    }

    /// Detach an entity from a category container and release what it owns.
    ///
    /// Returns `false` if the entity was not shown.
    pub fn remove_from_category<R: SceneRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        scenario: &str,
        category: Category,
        name: &str,
    ) -> Result<bool, SceneError> {
        let Some(groups) = self.scenarios.get_mut(scenario) else {
            return Err(SceneError::NotRegistered(scenario.to_string()));
        };
        let container = groups.containers[slot(category)];
        let Some(root) = groups.entities[slot(category)].shift_remove(name) else {
            return Ok(false);
        };

        if let Err(err) = renderer.detach_child(container, root) {
            log::warn!("Failed to detach {} from {}: {}", name, scenario, err);
        }
        for (id, node) in self.graph.remove_subtree(root)? {
            dispose(renderer, id, &node);
        }
        log::info!("Removed object {} from {}", name, scenario);
        Ok(true)
    }

    /// Bounds of every drawable under a category container.
    pub fn category_bounds(&self, scenario: &str, category: Category) -> Result<Option<SpatialBounds>, SceneError> {
        let container = self.container(scenario, category)?;
        Ok(compute_group_bounds(&self.graph, container))
    }
}

/// Release an owned node, or detach a borrowed one from its parent.
fn dispose<R: SceneRenderer + ?Sized>(renderer: &mut R, id: NodeId, node: &SceneNode) {
    match node.ownership {
        Ownership::Owned => release_node(renderer, id, node),
        Ownership::Borrowed => {
            if let Some(parent) = node.parent {
                if let Err(err) = renderer.detach_child(parent, id) {
                    log::warn!("Failed to detach {}: {}", node.name, err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{plane, Geometry};
    use crate::material::Material;
    use crate::renderer::HeadlessRenderer;
    use cgviz_core::{Color, DVec3};

    fn setup() -> (HeadlessRenderer, GroupRegistry) {
        let renderer = HeadlessRenderer::new();
        let registry = GroupRegistry::new(renderer.root());
        (renderer, registry)
    }

    fn ground(r: &mut HeadlessRenderer, name: &str) -> EntityDraft {
        EntityDraft::drawable(
            r,
            name,
            &Geometry::Triangles(plane(10.0, 10.0)),
            &Material::basic(Color::BLACK),
        )
        .unwrap()
    }

    #[test]
    fn test_register_creates_containers() {
        let (mut r, mut registry) = setup();
        registry.register_scenario(&mut r, "dummy").unwrap();

        let top = r.find_by_name("dummy").unwrap();
        assert_eq!(r.child_names(r.root()), vec!["dummy"]);
        assert_eq!(r.child_names(top), vec!["Universe", "PoVs", "Traces", "Kpis"]);
        assert_eq!(
            registry.container("dummy", Category::Traces).unwrap(),
            r.find_by_name("Traces").unwrap()
        );
    }

    #[test]
    fn test_register_twice_fails() {
        let (mut r, mut registry) = setup();
        registry.register_scenario(&mut r, "dummy").unwrap();
        assert_eq!(
            registry.register_scenario(&mut r, "dummy"),
            Err(SceneError::AlreadyRegistered("dummy".into()))
        );
        assert_eq!(r.live_nodes(), 5);
    }

    #[test]
    fn test_register_failure_leaves_nothing() {
        let (mut r, mut registry) = setup();
        r.set_create_budget(Some(3));
        assert!(registry.register_scenario(&mut r, "dummy").is_err());
        r.set_create_budget(None);
        assert_eq!(r.live_nodes(), 0);
        assert!(!registry.is_registered("dummy"));
    }

    #[test]
    fn test_add_and_remove_entity() {
        let (mut r, mut registry) = setup();
        registry.register_scenario(&mut r, "s").unwrap();
        let draft = ground(&mut r, "GroundPlane");
        registry.add_to_category(&mut r, "s", Category::Universe, draft).unwrap();

        assert!(registry.is_present_in_category("s", Category::Universe, "GroundPlane"));
        assert!(!registry.is_present_in_category("s", Category::Povs, "GroundPlane"));
        assert!(registry.is_present("s", "GroundPlane"));

        assert!(registry.remove_from_category(&mut r, "s", Category::Universe, "GroundPlane").unwrap());
        assert!(!registry.is_present("s", "GroundPlane"));
        assert_eq!((r.live_geometries(), r.live_materials()), (0, 0));
        assert!(!registry.remove_from_category(&mut r, "s", Category::Universe, "GroundPlane").unwrap());
    }

    #[test]
    fn test_add_existing_entity_discards_draft() {
        let (mut r, mut registry) = setup();
        registry.register_scenario(&mut r, "s").unwrap();
        let first = ground(&mut r, "GroundPlane");
        registry.add_to_category(&mut r, "s", Category::Universe, first).unwrap();

        let second = ground(&mut r, "GroundPlane");
        let err = registry
            .add_to_category(&mut r, "s", Category::Universe, second)
            .unwrap_err();
        assert!(matches!(err, SceneError::EntityExists { .. }));
        assert_eq!(r.live_geometries(), 1);
    }

    #[test]
    fn test_adopted_entity_is_only_detached() {
        let (mut r, mut registry) = setup();
        registry.register_scenario(&mut r, "s").unwrap();
        let g = r.create_geometry(&Geometry::Triangles(plane(1.0, 1.0))).unwrap();
        let m = r.create_material(&Material::default()).unwrap();
        let node = r.create_mesh("Building", g, m).unwrap();

        registry.adopt(&mut r, "s", Category::Universe, "Building", node, None).unwrap();
        assert!(registry.remove_from_category(&mut r, "s", Category::Universe, "Building").unwrap());
        assert!(r.node(node).is_some());
        assert_eq!(r.live_geometries(), 1);

        registry.adopt(&mut r, "s", Category::Universe, "Building", node, None).unwrap();
        registry.unregister_scenario(&mut r, "s").unwrap();
        assert!(r.node(node).is_some());
        assert!(r.node(node).unwrap().parent.is_none());
    }

    #[test]
    fn test_unregister_releases_everything() {
        let (mut r, mut registry) = setup();
        registry.register_scenario(&mut r, "s").unwrap();
        let draft = EntityDraft::build_container(&mut r, "Tx1_Rx1", |r, draft| {
            let line = EntityDraft::drawable(
                r,
                "0",
                &Geometry::Polyline { points: vec![DVec3::ZERO, DVec3::ONE] },
                &Material::line(Color::WHITE),
            )?;
            draft.push(r, line)
        })
        .unwrap();
        registry.add_to_category(&mut r, "s", Category::Traces, draft).unwrap();

        assert!(registry.unregister_scenario(&mut r, "s").unwrap());
        assert_eq!(r.live_nodes(), 0);
        assert_eq!((r.live_geometries(), r.live_materials()), (0, 0));
        assert!(!registry.is_present("s", "Tx1_Rx1"));
        assert!(!registry.is_in_scene("0"));
        assert_eq!(registry.graph().len(), 1);

        // Idempotent.
        assert!(!registry.unregister_scenario(&mut r, "s").unwrap());
    }

    #[test]
    fn test_is_present_scoped_to_scenario() {
        let (mut r, mut registry) = setup();
        registry.register_scenario(&mut r, "a").unwrap();
        registry.register_scenario(&mut r, "b").unwrap();
        let draft = ground(&mut r, "GroundPlane");
        registry.add_to_category(&mut r, "a", Category::Universe, draft).unwrap();

        assert!(registry.is_present("a", "GroundPlane"));
        assert!(!registry.is_present("b", "GroundPlane"));
        assert!(registry.is_in_scene("GroundPlane"));
    }

    #[test]
    fn test_unknown_scenario() {
        let (mut r, mut registry) = setup();
        let draft = ground(&mut r, "GroundPlane");
        assert!(matches!(
            registry.add_to_category(&mut r, "nope", Category::Universe, draft),
            Err(SceneError::NotRegistered(_))
        ));
        assert_eq!(r.live_geometries(), 0);
        assert!(registry.container("nope", Category::Kpis).is_err());
    }
}
