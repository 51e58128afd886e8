//! The viewer context.
//!
//! A [`Viewer`] owns everything the visualizer mutates: the renderer, the
//! scenario store, the group registry and the shared pov templates. It is
//! created by the application root and torn down with [`Viewer::teardown`].

use cgviz_core::{
    Category, Color, RangeScope, ScenarioId, SceneError, SpatialBounds, ValueRange, VizError,
};
use cgviz_io::{MtlMaterial, ReaderRegistry};
use cgviz_model::{ColorScale, Scenario, ScenarioStore, UniverseObject};
use cgviz_scene::{GroupRegistry, PovTemplateConfig, PovTemplates, SceneRenderer};
use indexmap::IndexMap;

use crate::config::{TraceColorDomain, ViewerConfig};
use crate::hooks::FrameHooks;

/// Pov templates and the configuration they were built from.
#[derive(Debug, Clone)]
struct LoadedTemplates {
    templates: PovTemplates,
    transmitter: PovTemplateConfig,
    receiver: PovTemplateConfig,
}

/// Application context of the visualizer.
pub struct Viewer<R: SceneRenderer> {
    pub(crate) renderer: R,
    pub(crate) config: ViewerConfig,
    pub(crate) store: ScenarioStore,
    pub(crate) registry: GroupRegistry,
    templates: Option<LoadedTemplates>,
    /// Material libraries read per scenario, applied to later universe objects.
    pub(crate) materials: IndexMap<ScenarioId, IndexMap<String, MtlMaterial>>,
    pub(crate) readers: ReaderRegistry,
}

impl<R: SceneRenderer> Viewer<R> {
    /// Create a viewer drawing into `renderer`.
    pub fn new(renderer: R, config: ViewerConfig) -> Self {
        let registry = GroupRegistry::new(renderer.root());
        log::info!("Viewer created");
        Self {
            renderer,
            config,
            store: ScenarioStore::new(),
            registry,
            templates: None,
            materials: IndexMap::new(),
            readers: ReaderRegistry::with_defaults(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// Colors apply to entities built afterwards. Changed pov templates are
    /// rebuilt the next time a pov is shown while no pov is visible.
    pub fn set_config(&mut self, config: ViewerConfig) {
        if self.config.templates_differ(&config) {
            log::info!("Pov templates changed");
        }
        self.config = config;
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    /// Readers used by [`Viewer::load_file`], open to custom readers.
    pub fn readers_mut(&mut self) -> &mut ReaderRegistry {
        &mut self.readers
    }

    /// Create an empty scenario and its scene containers.
    pub fn create_scenario(&mut self, id: &str) -> Result<(), VizError> {
        self.store.create_scenario(id)?;
        if let Err(err) = self.registry.register_scenario(&mut self.renderer, id) {
            self.store.remove_scenario(id);
            return Err(err.into());
        }
        log::info!("Created scenario {}", id);
        Ok(())
    }

    /// Remove a scenario, its containers and every resource it owns.
    ///
    /// Returns `false` if no such scenario exists.
    pub fn delete_scenario(&mut self, id: &str) -> Result<bool, VizError> {
        let unregistered = self.registry.unregister_scenario(&mut self.renderer, id)?;
        self.materials.shift_remove(id);
        let Some(scenario) = self.store.remove_scenario(id) else {
            return Ok(unregistered);
        };
        for object in scenario.universe.values() {
            release_universe_object(&mut self.renderer, object);
        }
        log::info!("Deleted scenario {}", id);
        Ok(true)
    }

    pub fn scenario(&self, id: &str) -> Result<&Scenario, VizError> {
        self.store.get(id)
    }

    /// Loaded scenario ids, in creation order.
    pub fn list_scenarios(&self) -> Vec<&str> {
        self.store.ids().map(ScenarioId::as_str).collect()
    }

    /// Whether an entity is shown in a category of a scenario.
    pub fn is_shown(&self, scenario: &str, category: Category, name: &str) -> bool {
        self.registry.is_present_in_category(scenario, category, name)
    }

    /// Whether an entity of that name is shown anywhere under a scenario.
    pub fn is_present(&self, scenario: &str, name: &str) -> bool {
        self.registry.is_present(scenario, name)
    }

    /// Trace power range of a scenario or of every scenario.
    pub fn value_range(&mut self, scope: &RangeScope) -> Result<ValueRange, VizError> {
        self.store.value_range(scope)
    }

    /// Color of a power value in a scope.
    ///
    /// A scenario without traces colors through the overall range.
    pub fn color(&mut self, scope: &RangeScope, value: f64) -> Result<Color, VizError> {
        let domain = self.color_domain(scope)?;
        Ok(ColorScale::new(self.config.trace_scheme, domain).color(value))
    }

    fn color_domain(&mut self, scope: &RangeScope) -> Result<ValueRange, VizError> {
        let range = self.store.value_range(scope)?;
        if range.is_empty() && matches!(scope, RangeScope::Scenario(_)) {
            return self.store.value_range(&RangeScope::Overall);
        }
        Ok(range)
    }

    /// Scale coloring the traces of a scenario.
    pub(crate) fn trace_scale(&mut self, scenario: &str) -> Result<ColorScale, VizError> {
        let scope = match self.config.trace_domain {
            TraceColorDomain::Scenario => RangeScope::Scenario(ScenarioId::from(scenario)),
            TraceColorDomain::Overall => RangeScope::Overall,
        };
        let domain = self.color_domain(&scope)?;
        Ok(ColorScale::new(self.config.trace_scheme, domain))
    }

    /// Universe bounds of a scenario, computed on first use.
    pub fn bounds(&mut self, scenario: &str) -> Result<SpatialBounds, VizError> {
        match self.store.get(scenario)?.bounds {
            Some(bounds) => Ok(bounds),
            None => self.store.compute_universe_bounds(scenario),
        }
    }

    fn povs_shown(&self) -> bool {
        self.registry
            .scenarios()
            .any(|id| !self.registry.entity_names(id.as_str(), Category::Povs).is_empty())
    }

    /// The pov templates, created on first use.
    pub(crate) fn ensure_templates(&mut self) -> Result<PovTemplates, SceneError> {
        if let Some(loaded) = &self.templates {
            let stale = loaded.transmitter != self.config.transmitter
                || loaded.receiver != self.config.receiver;
            if !stale || self.povs_shown() {
                return Ok(loaded.templates);
            }
        }
        if let Some(old) = self.templates.take() {
            old.templates.release(&mut self.renderer);
        }

        let templates = PovTemplates::create(
            &mut self.renderer,
            &self.config.transmitter,
            &self.config.receiver,
        )?;
        self.templates = Some(LoadedTemplates {
            templates,
            transmitter: self.config.transmitter.clone(),
            receiver: self.config.receiver.clone(),
        });
        log::debug!("Pov templates created");
        Ok(templates)
    }

    /// Hooks every viewer starts with: building the pov templates up front.
    pub fn default_hooks() -> FrameHooks<Self>
    where
        R: 'static,
    {
        let mut hooks = FrameHooks::new();
        hooks.register_initializer("pov_templates", |viewer: &mut Self| {
            viewer.ensure_templates()?;
            Ok(())
        });
        hooks
    }

    /// Delete every scenario, release the templates and hand back the renderer.
    pub fn teardown(mut self) -> R {
        let ids: Vec<String> = self.store.ids().map(|id| id.to_string()).collect();
        for id in ids {
            if let Err(err) = self.delete_scenario(&id) {
                log::warn!("Failed to delete scenario {}: {}", id, err);
            }
        }
        if let Some(loaded) = self.templates.take() {
            loaded.templates.release(&mut self.renderer);
        }
        log::info!("Viewer torn down");
        self.renderer
    }
}

/// Release the node and resources a universe object owns.
pub(crate) fn release_universe_object<R: SceneRenderer + ?Sized>(
    renderer: &mut R,
    object: &UniverseObject,
) {
    let mut results = vec![renderer.release_node(object.node)];
    if let Some(geometry) = object.geometry {
        results.push(renderer.release_geometry(geometry));
    }
    if let Some(material) = object.material {
        results.push(renderer.release_material(material));
    }
    for err in results.into_iter().filter_map(Result::err) {
        log::warn!("Failed to release universe object {}: {}", object.name, err);
    }
}
