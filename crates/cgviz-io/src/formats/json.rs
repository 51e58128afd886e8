//! JSON simulation output: points of view, traces and kpis.
//!
//! Every file exists in two layouts. The per-entity layout keys the entity
//! by the file name (`qcmPov.Rx22.json`, `qcmTrace.Tx01-Rx17.json`); the
//! aggregated layout gathers one type or one transmitter per file
//! (`qcmPov.Rx.json` holds `{id: descriptor}`, `qcmTrace.Tx01.json` holds
//! `{rx: [paths]}`). The layout is told apart by the shape of the content.

use cgviz_core::{
    file_segment, parse_trace_file_name, DVec3, DecodeError, TracePath, VizError,
};
use cgviz_model::{KpiSample, PovPlacement, RawKpis};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::registry::SourceReader;
use crate::source::{base_name, json_error, shape_error, PovEntry, SourceFile, TraceEntry};

/// Key of the metadata entry of a kpi file.
const KPI_INFO_KEY: &str = "nfo";

#[derive(Debug, Deserialize)]
struct PovDescriptor {
    #[serde(default)]
    tag: Option<String>,
    position: [f64; 3],
    azimuth: f64,
    elevation: f64,
}

impl PovDescriptor {
    fn placement(&self) -> PovPlacement {
        PovPlacement {
            position: DVec3::from_array(self.position),
            azimuth: self.azimuth,
            elevation: self.elevation,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PovContent {
    Single(PovDescriptor),
    Aggregated(IndexMap<String, PovDescriptor>),
}

#[derive(Debug, Deserialize)]
struct PathDescriptor {
    #[serde(rename = "P")]
    power: f64,
    #[serde(rename = "XData")]
    xs: Vec<f64>,
    #[serde(rename = "YData")]
    ys: Vec<f64>,
    #[serde(rename = "ZData")]
    zs: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TraceContent {
    Single(Vec<PathDescriptor>),
    Aggregated(IndexMap<String, Vec<PathDescriptor>>),
}

#[derive(Debug, Deserialize)]
struct KpiInfo {
    #[serde(rename = "KPIS")]
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KpiPoint {
    #[serde(rename = "XYZ")]
    xyz: [f64; 3],
    #[serde(rename = "KPIS")]
    values: IndexMap<String, Vec<Option<f64>>>,
}

fn has_prefix(file_name: &str, prefix: &str) -> bool {
    let name = base_name(file_name);
    name.starts_with(prefix) && name.to_ascii_lowercase().ends_with(".json")
}

/// Reads `qcmPov.*.json` files.
#[derive(Debug, Default)]
pub struct PovReader;

impl PovReader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceReader for PovReader {
    fn name(&self) -> &'static str {
        "pov"
    }

    fn can_read(&self, file_name: &str) -> bool {
        has_prefix(file_name, "qcmPov.")
    }

    fn read(&self, file_name: &str, content: &str) -> Result<SourceFile, VizError> {
        let name = base_name(file_name);
        let segment = file_segment(name).unwrap_or_default();
        let content: PovContent =
            serde_json::from_str(content).map_err(|e| json_error(name, e))?;

        let entries = match content {
            PovContent::Single(descriptor) => {
                let tag = descriptor.tag.clone().unwrap_or_else(|| segment.to_string());
                vec![PovEntry {
                    tag,
                    placement: descriptor.placement(),
                }]
            }
            PovContent::Aggregated(descriptors) => descriptors
                .into_iter()
                .map(|(id, descriptor)| PovEntry {
                    tag: format!("{}{}", segment, id),
                    placement: descriptor.placement(),
                })
                .collect(),
        };
        Ok(SourceFile::Povs(entries))
    }
}

/// Reads `qcmTrace.*.json` files.
#[derive(Debug, Default)]
pub struct TraceReader;

impl TraceReader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceReader for TraceReader {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn can_read(&self, file_name: &str) -> bool {
        has_prefix(file_name, "qcmTrace.")
    }

    fn read(&self, file_name: &str, content: &str) -> Result<SourceFile, VizError> {
        let name = base_name(file_name);
        let content: TraceContent =
            serde_json::from_str(content).map_err(|e| json_error(name, e))?;

        let entries = match content {
            TraceContent::Single(paths) => {
                let pair = parse_trace_file_name(name)?;
                vec![TraceEntry {
                    tx: pair.tx,
                    rx: pair.rx,
                    paths: decode_paths(name, paths)?,
                }]
            }
            TraceContent::Aggregated(receivers) => {
                let tx = file_segment(name).unwrap_or_default().to_string();
                receivers
                    .into_iter()
                    .map(|(rx, paths)| {
                        Ok(TraceEntry {
                            tx: tx.clone(),
                            rx,
                            paths: decode_paths(name, paths)?,
                        })
                    })
                    .collect::<Result<Vec<_>, DecodeError>>()?
            }
        };
        Ok(SourceFile::Traces(entries))
    }
}

fn decode_paths(file: &str, paths: Vec<PathDescriptor>) -> Result<Vec<TracePath>, DecodeError> {
    paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| {
            if path.xs.len() != path.ys.len() || path.xs.len() != path.zs.len() {
                return Err(shape_error(
                    file,
                    format!(
                        "path {} has {} x, {} y and {} z coordinates",
                        index,
                        path.xs.len(),
                        path.ys.len(),
                        path.zs.len()
                    ),
                ));
            }
            Ok(TracePath::new(path.power, path.xs, path.ys, path.zs))
        })
        .collect()
}

/// Reads `qcmKpis*.json` files.
#[derive(Debug, Default)]
pub struct KpiReader;

impl KpiReader {
    pub fn new() -> Self {
        Self
    }
}

impl SourceReader for KpiReader {
    fn name(&self) -> &'static str {
        "kpis"
    }

    fn can_read(&self, file_name: &str) -> bool {
        has_prefix(file_name, "qcmKpis")
    }

    fn read(&self, file_name: &str, content: &str) -> Result<SourceFile, VizError> {
        let name = base_name(file_name);
        let mut entries: IndexMap<String, serde_json::Value> =
            serde_json::from_str(content).map_err(|e| json_error(name, e))?;

        let info = entries
            .shift_remove(KPI_INFO_KEY)
            .ok_or_else(|| shape_error(name, "missing \"nfo\" entry"))?;
        let info: KpiInfo = serde_json::from_value(info).map_err(|e| json_error(name, e))?;

        let mut raw = RawKpis {
            names: info.names,
            ..RawKpis::default()
        };
        for (tag, points) in entries {
            let points: Vec<KpiPoint> =
                serde_json::from_value(points).map_err(|e| json_error(name, e))?;
            let samples = points
                .into_iter()
                .map(|point| KpiSample {
                    position: DVec3::from_array(point.xyz),
                    values: raw
                        .names
                        .iter()
                        .map(|kpi| {
                            let value = point
                                .values
                                .get(kpi)
                                .and_then(|v| v.first().copied().flatten());
                            (kpi.clone(), value)
                        })
                        .collect(),
                })
                .collect();
            raw.transmitters.insert(tag, samples);
        }

        if raw.transmitters.is_empty() {
            return Err(shape_error(name, "no transmitter entries").into());
        }
        log::debug!(
            "Decoded {} kpis for {} transmitters from {}",
            raw.names.len(),
            raw.transmitters.len(),
            name
        );
        Ok(SourceFile::Kpis(raw))
    }
}
