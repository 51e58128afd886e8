//! Visibility toggles.
//!
//! Every single-entity toggle validates its target against the store before
//! touching the scene, then shows the entity if it is hidden and hides it
//! if it is shown. It returns whether the entity is shown afterwards.
//! Group toggles flip each member in sorted or insertion order.

use cgviz_core::{
    classify_pov_category, mast_entity_name, pov_entity_name, trace_entity_name, Category,
    DMat4, DVec3, PovRecord, SceneError, VizError, GROUND_PLANE,
};
use cgviz_scene::{plane, pov_transform, EntityDraft, Geometry, Material, SceneRenderer};

use crate::viewer::Viewer;

impl<R: SceneRenderer> Viewer<R> {
    fn hide(&mut self, scenario: &str, category: Category, name: &str) -> Result<bool, VizError> {
        Ok(self
            .registry
            .remove_from_category(&mut self.renderer, scenario, category, name)?)
    }

    /// Show or hide one point of view. Hiding it also hides its mast.
    pub fn toggle_pov(&mut self, scenario: &str, pov_type: &str, id: &str) -> Result<bool, VizError> {
        let record = self.store.get(scenario)?.pov(pov_type, id)?.clone();
        let name = pov_entity_name(pov_type, id);

        if self.is_shown(scenario, Category::Povs, &name) {
            self.hide(scenario, Category::Povs, &name)?;
            self.hide(scenario, Category::Povs, &mast_entity_name(pov_type, id))?;
            return Ok(false);
        }

        let templates = self.ensure_templates()?;
        let template = *templates.get(classify_pov_category(pov_type));
        let mut draft = EntityDraft::shared_mesh(
            &mut self.renderer,
            &name,
            template.geometry,
            template.material,
            template.bounds,
        )?;
        if let Err(err) = draft.set_transform(&mut self.renderer, &pov_transform(&record, template.dy)) {
            draft.discard(&mut self.renderer);
            return Err(err.into());
        }
        self.registry
            .add_to_category(&mut self.renderer, scenario, Category::Povs, draft)?;
        Ok(true)
    }

    /// Toggle every pov of a type, in ascending id order.
    pub fn toggle_povs_of_type(&mut self, scenario: &str, pov_type: &str) -> Result<(), VizError> {
        let ids = self.store.get(scenario)?.pov_ids_sorted(pov_type)?;
        for id in ids {
            self.toggle_pov(scenario, pov_type, &id)?;
        }
        Ok(())
    }

    /// Toggle every pov of every type.
    pub fn toggle_all_povs(&mut self, scenario: &str) -> Result<(), VizError> {
        let types: Vec<String> = self
            .store
            .get(scenario)?
            .pov_types()
            .map(String::from)
            .collect();
        for pov_type in types {
            self.toggle_povs_of_type(scenario, &pov_type)?;
        }
        Ok(())
    }

    /// Toggle the masts of the shown povs of a type.
    ///
    /// A mast is a vertical line from the ground to the pov. Masts of hidden
    /// povs are hidden.
    pub fn toggle_pov_type_masts(&mut self, scenario: &str, pov_type: &str) -> Result<(), VizError> {
        let target = self.store.get(scenario)?;
        let records = target
            .pov_ids_sorted(pov_type)?
            .iter()
            .map(|id| target.pov(pov_type, id).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        for record in records {
            let pov = pov_entity_name(pov_type, &record.id);
            let mast = mast_entity_name(pov_type, &record.id);
            let mast_shown = self.is_shown(scenario, Category::Povs, &mast);
            if mast_shown {
                self.hide(scenario, Category::Povs, &mast)?;
            } else if self.is_shown(scenario, Category::Povs, &pov) {
                self.show_mast(scenario, &mast, &record)?;
            }
        }
        Ok(())
    }

    fn show_mast(&mut self, scenario: &str, name: &str, pov: &PovRecord) -> Result<(), VizError> {
        let top = pov.position;
        let geometry = Geometry::Polyline {
            points: vec![DVec3::new(top.x, top.y, 0.0), top],
        };
        let material = Material::line(self.config.mast_color).with_name("mast");
        let draft = EntityDraft::drawable(&mut self.renderer, name, &geometry, &material)?;
        self.registry
            .add_to_category(&mut self.renderer, scenario, Category::Povs, draft)?;
        Ok(())
    }

    /// Show or hide one universe object.
    ///
    /// The object's node stays owned by the scenario; hiding only detaches it.
    pub fn toggle_universe_object(&mut self, scenario: &str, name: &str) -> Result<bool, VizError> {
        let object = self.store.get(scenario)?.universe_object(name)?;
        let (node, bounds) = (object.node, object.bounds);

        if self.is_shown(scenario, Category::Universe, name) {
            self.hide(scenario, Category::Universe, name)?;
            return Ok(false);
        }
        self.registry
            .adopt(&mut self.renderer, scenario, Category::Universe, name, node, bounds)?;
        Ok(true)
    }

    /// Toggle every universe object, then the ground plane.
    ///
    /// Does nothing for a scenario without universe objects.
    pub fn toggle_entire_universe(&mut self, scenario: &str) -> Result<(), VizError> {
        let names: Vec<String> = self.store.get(scenario)?.universe.keys().cloned().collect();
        if names.is_empty() {
            log::info!("Scenario {} has no universe", scenario);
            return Ok(());
        }
        for name in names {
            self.toggle_universe_object(scenario, &name)?;
        }
        self.toggle_ground_plane(scenario)?;
        Ok(())
    }

    /// Show or hide a flat plane at `z = 0` spanning the universe bounds.
    pub fn toggle_ground_plane(&mut self, scenario: &str) -> Result<bool, VizError> {
        self.store.get(scenario)?;
        if self.is_shown(scenario, Category::Universe, GROUND_PLANE) {
            self.hide(scenario, Category::Universe, GROUND_PLANE)?;
            return Ok(false);
        }

        let bounds = self.bounds(scenario)?;
        let span = bounds.span();
        let mut mesh = plane(span.x, span.y);
        mesh.transform(DMat4::from_translation(DVec3::new(
            bounds.min.x + span.x / 2.0,
            bounds.min.y + span.y / 2.0,
            0.0,
        )));
        let material = Material::phong(self.config.ground_plane_color, 30.0)
            .with_name(GROUND_PLANE)
            .double_sided();
        let draft = EntityDraft::drawable(
            &mut self.renderer,
            GROUND_PLANE,
            &Geometry::Triangles(mesh),
            &material,
        )?;
        self.registry
            .add_to_category(&mut self.renderer, scenario, Category::Universe, draft)?;
        Ok(true)
    }

    /// Show or hide the paths between a transmitter and a receiver.
    ///
    /// The paths are drawn as one group of polylines, each colored by its
    /// power.
    pub fn toggle_trace_between(&mut self, scenario: &str, tx: &str, rx: &str) -> Result<bool, VizError> {
        let paths = self.store.get(scenario)?.paths_between(tx, rx)?.to_vec();
        let name = trace_entity_name(tx, rx);

        if self.is_shown(scenario, Category::Traces, &name) {
            self.hide(scenario, Category::Traces, &name)?;
            return Ok(false);
        }

        let scale = self.trace_scale(scenario)?;
        let draft = EntityDraft::build_container(&mut self.renderer, &name, |renderer, draft| {
            for (index, path) in paths.iter().enumerate() {
                let geometry = Geometry::Polyline {
                    points: path.points().collect(),
                };
                let material = Material::line(scale.color(path.power));
                let line = EntityDraft::drawable(renderer, &format!("path_{}", index), &geometry, &material)?;
                draft.push(renderer, line)?;
            }
            Ok::<(), SceneError>(())
        })?;
        self.registry
            .add_to_category(&mut self.renderer, scenario, Category::Traces, draft)?;
        Ok(true)
    }

    /// Toggle the traces from a transmitter to each of its receivers.
    pub fn toggle_all_traces_from(&mut self, scenario: &str, tx: &str) -> Result<(), VizError> {
        let receivers = self.store.get(scenario)?.receivers_of(tx)?;
        for rx in receivers {
            self.toggle_trace_between(scenario, tx, &rx)?;
        }
        Ok(())
    }

    /// Toggle every trace of a scenario.
    pub fn toggle_all_traces(&mut self, scenario: &str) -> Result<(), VizError> {
        let transmitters: Vec<String> = self
            .store
            .get(scenario)?
            .transmitters()
            .map(String::from)
            .collect();
        for tx in transmitters {
            self.toggle_all_traces_from(scenario, &tx)?;
        }
        Ok(())
    }
}
