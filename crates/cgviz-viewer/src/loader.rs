//! Loading decoded source files into a scenario.

use cgviz_core::{parse_pov_tag, Category, ScenarioId, SceneError, VizError};
use cgviz_io::{LoadReport, ObjObject, SourceFile};
use cgviz_model::{KpiTable, UniverseObject};
use cgviz_scene::{Geometry, Material, SceneRenderer};

use crate::viewer::{release_universe_object, Viewer};

impl<R: SceneRenderer> Viewer<R> {
    /// Decode one file and merge its content into an existing scenario.
    ///
    /// Universe objects pick their material from the libraries loaded
    /// earlier into the same scenario.
    pub fn load_file(&mut self, scenario: &str, file_name: &str, content: &str) -> Result<(), VizError> {
        self.store.get(scenario)?;
        let source = self.readers.decode(file_name, content)?;
        self.apply(scenario, file_name, source)
    }

    /// Create a scenario from a set of `(file name, content)` pairs.
    ///
    /// A file that fails to decode or apply is recorded in the report and
    /// the rest still load. Material libraries are applied before any
    /// geometry, whatever their position in `files`.
    pub fn load_scenario<I, N, C>(&mut self, id: &str, files: I) -> Result<LoadReport, VizError>
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        self.create_scenario(id)?;

        let mut report = LoadReport::new();
        let mut decoded = Vec::new();
        for (name, content) in files {
            let name = name.as_ref();
            match self.readers.decode(name, content.as_ref()) {
                Ok(source) => decoded.push((name.to_string(), source)),
                Err(err) => report.record_failure(name, err),
            }
        }
        decoded.sort_by_key(|(_, source)| !matches!(source, SourceFile::Materials(_)));

        for (name, source) in decoded {
            let result = self.apply(id, &name, source);
            report.record(&name, result);
        }

        self.finish_load(id)?;
        log::info!("Loaded scenario {}: {}", id, report);
        Ok(report)
    }

    /// Apply a decoded file. A file is applied whole or not at all.
    fn apply(&mut self, scenario: &str, file_name: &str, source: SourceFile) -> Result<(), VizError> {
        log::debug!("Applying {} from {} to {}", source.label(), file_name, scenario);
        self.store.get(scenario)?;
        match source {
            SourceFile::Povs(entries) => {
                for entry in &entries {
                    parse_pov_tag(&entry.tag)?;
                }
                for entry in entries {
                    self.store.add_pov(scenario, &entry.tag, entry.placement)?;
                }
            }
            SourceFile::Traces(entries) => {
                for entry in entries {
                    self.store
                        .add_trace_pair(scenario, &entry.tx, &entry.rx, entry.paths)?;
                }
            }
            SourceFile::Kpis(raw) => {
                self.store.set_kpis(scenario, KpiTable::process(&raw))?;
            }
            SourceFile::Universe(model) => {
                let mut uploaded = Vec::with_capacity(model.objects.len());
                for object in model.objects {
                    match self.upload_universe_object(scenario, object) {
                        Ok(object) => uploaded.push(object),
                        Err(err) => {
                            for object in &uploaded {
                                release_universe_object(&mut self.renderer, object);
                            }
                            return Err(err);
                        }
                    }
                }
                for object in uploaded {
                    self.store_universe_object(scenario, object)?;
                }
            }
            SourceFile::Materials(library) => {
                self.materials
                    .entry(ScenarioId::from(scenario))
                    .or_default()
                    .extend(library);
            }
        }
        Ok(())
    }

    /// Upload an object's geometry and material as a detached mesh.
    fn upload_universe_object(&mut self, scenario: &str, object: ObjObject) -> Result<UniverseObject, VizError> {
        let ObjObject { name, mesh, material } = object;

        let surface = material
            .as_deref()
            .and_then(|m| self.materials.get(scenario)?.get(m))
            .copied()
            .unwrap_or_default();
        let bounds = mesh.bounding_box();

        let geometry = self.renderer.create_geometry(&Geometry::Triangles(mesh))?;
        let material = Material::phong(surface.diffuse, surface.shininess)
            .with_name(material.unwrap_or_else(|| name.clone()))
            .double_sided();
        let material = match self.renderer.create_material(&material) {
            Ok(material) => material,
            Err(err) => {
                warn_on_release(&name, self.renderer.release_geometry(geometry));
                return Err(err.into());
            }
        };
        let node = match self.renderer.create_mesh(&name, geometry, material) {
            Ok(node) => node,
            Err(err) => {
                warn_on_release(&name, self.renderer.release_geometry(geometry));
                warn_on_release(&name, self.renderer.release_material(material));
                return Err(err.into());
            }
        };

        Ok(UniverseObject {
            name,
            node,
            geometry: Some(geometry),
            material: Some(material),
            bounds,
        })
    }

    /// Store an uploaded object. A replaced object that was shown is
    /// swapped for the new one in the scene.
    fn store_universe_object(&mut self, scenario: &str, object: UniverseObject) -> Result<(), VizError> {
        let (name, node, bounds) = (object.name.clone(), object.node, object.bounds);
        let shown = self.is_shown(scenario, Category::Universe, &name);

        let Some(old) = self.store.add_universe_object(scenario, object)? else {
            return Ok(());
        };
        log::debug!("Universe object {} replaced in {}", old.name, scenario);
        if shown {
            self.registry
                .remove_from_category(&mut self.renderer, scenario, Category::Universe, &old.name)?;
        }
        release_universe_object(&mut self.renderer, &old);
        if shown {
            self.registry
                .adopt(&mut self.renderer, scenario, Category::Universe, &name, node, bounds)?;
        }
        Ok(())
    }

    /// Derive the ranges and bounds a loaded scenario needs.
    fn finish_load(&mut self, id: &str) -> Result<(), VizError> {
        let scenario = self.store.get(id)?;
        let has_traces = !scenario.traces.is_empty();
        let has_universe = !scenario.universe.is_empty();

        if has_traces {
            self.store.compute_trace_range(id)?;
        }
        if has_universe {
            if let Err(err) = self.store.compute_universe_bounds(id) {
                log::warn!("No universe bounds for {}: {}", id, err);
            }
        }
        Ok(())
    }
}

fn warn_on_release(name: &str, result: Result<(), SceneError>) {
    if let Err(err) = result {
        log::warn!("Failed to release resources of {}: {}", name, err);
    }
}
