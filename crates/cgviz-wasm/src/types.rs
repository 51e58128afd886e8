//! JavaScript-friendly views of the viewer's data.

use cgviz_core::{SpatialBounds, ValueRange};
use cgviz_io::LoadReport;
use cgviz_model::Scenario;
use cgviz_scene::Geometry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One source file handed over by the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileJs {
    pub name: String,
    pub content: String,
}

/// Summary of a loaded scenario for menus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioJs {
    pub id: String,
    /// Pov ids per type, sorted.
    pub povs: IndexMap<String, Vec<String>>,
    /// Receivers per transmitter.
    pub traces: IndexMap<String, Vec<String>>,
    pub universe: Vec<String>,
    pub kpis: Vec<String>,
    pub path_count: usize,
    pub value_range: Option<ValueRange>,
    pub bounds: Option<SpatialBounds>,
}

impl From<&Scenario> for ScenarioJs {
    fn from(scenario: &Scenario) -> Self {
        let povs = scenario
            .povs
            .iter()
            .map(|(pov_type, ids)| {
                let mut ids: Vec<String> = ids.keys().cloned().collect();
                ids.sort();
                (pov_type.clone(), ids)
            })
            .collect();
        let traces = scenario
            .traces
            .iter()
            .map(|(tx, receivers)| (tx.clone(), receivers.keys().cloned().collect()))
            .collect();

        Self {
            id: scenario.id.to_string(),
            povs,
            traces,
            universe: scenario.universe.keys().cloned().collect(),
            kpis: scenario
                .kpis
                .as_ref()
                .map(|table| table.names.clone())
                .unwrap_or_default(),
            path_count: scenario.path_count(),
            value_range: scenario.value_range.filter(|range| !range.is_empty()),
            bounds: scenario.bounds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureJs {
    pub file: String,
    pub kind: String,
    pub error: String,
}

/// Outcome of a scenario load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReportJs {
    pub loaded: Vec<String>,
    pub failed: Vec<FailureJs>,
}

impl From<&LoadReport> for LoadReportJs {
    fn from(report: &LoadReport) -> Self {
        Self {
            loaded: report.loaded.clone(),
            failed: report
                .failed
                .iter()
                .map(|failure| FailureJs {
                    file: failure.file.clone(),
                    kind: format!("{:?}", failure.error.kind()),
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Flat buffers of a geometry, in the layout the scene object expects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffers {
    pub kind: &'static str,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub colors: Vec<f32>,
}

impl From<&Geometry> for GeometryBuffers {
    fn from(geometry: &Geometry) -> Self {
        match geometry {
            Geometry::Triangles(mesh) => Self {
                kind: "triangles",
                positions: mesh.flat_vertices(),
                normals: mesh.flat_normals(),
                indices: mesh.indices.clone(),
                colors: Vec::new(),
            },
            Geometry::Polyline { .. } => Self {
                kind: "polyline",
                positions: geometry.flat_positions(),
                ..Default::default()
            },
            Geometry::Points { .. } => Self {
                kind: "points",
                positions: geometry.flat_positions(),
                colors: geometry.flat_colors(),
                ..Default::default()
            },
        }
    }
}
