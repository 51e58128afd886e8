//! Per-scenario storage of parsed simulation output.
//!
//! Inserts are keyed overwrites so that files of one scenario can arrive in
//! any order: a repeated `(type, id)` or `(tx, rx)` key replaces the previous
//! record, the last file wins.

use cgviz_core::{
    parse_pov_tag, parse_trace_file_name, BoundingBox, DVec3, EntityKind,
    GeometryId, MaterialId, NodeId, PovRecord, ScenarioId, SpatialBounds, StoreError, TracePath,
    ValueRange, VizError,
};
use indexmap::IndexMap;

use crate::kpi::KpiTable;

/// Placement part of a point-of-view descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PovPlacement {
    pub position: DVec3,
    /// Radians.
    pub azimuth: f64,
    /// Radians.
    pub elevation: f64,
}

/// A named piece of static universe geometry, already uploaded to the renderer.
///
/// The scenario owns the handles; showing the object only attaches the node.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseObject {
    pub name: String,
    pub node: NodeId,
    pub geometry: Option<GeometryId>,
    pub material: Option<MaterialId>,
    /// Local bounding box of the geometry.
    pub bounds: Option<BoundingBox>,
}

/// One loaded directory of simulation output.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub id: ScenarioId,
    /// `povs[type][id]`
    pub povs: IndexMap<String, IndexMap<String, PovRecord>>,
    /// `traces[tx][rx]`
    pub traces: IndexMap<String, IndexMap<String, Vec<TracePath>>>,
    pub universe: IndexMap<String, UniverseObject>,
    pub kpis: Option<KpiTable>,
    /// `None` until universe bounds have been computed.
    pub bounds: Option<SpatialBounds>,
    /// `None` until the trace range has been computed.
    pub value_range: Option<ValueRange>,
}

impl Scenario {
    /// Create an empty scenario.
    pub fn new(id: ScenarioId) -> Self {
        Self {
            id,
            povs: IndexMap::new(),
            traces: IndexMap::new(),
            universe: IndexMap::new(),
            kpis: None,
            bounds: None,
            value_range: None,
        }
    }

    fn unknown(&self, kind: EntityKind, name: impl Into<String>) -> VizError {
        VizError::unknown(kind, self.id.as_str(), name)
    }

    /// Point-of-view types in insertion order.
    pub fn pov_types(&self) -> impl Iterator<Item = &str> {
        self.povs.keys().map(String::as_str)
    }

    /// Ids of one point-of-view type, sorted ascending as strings.
    pub fn pov_ids_sorted(&self, pov_type: &str) -> Result<Vec<String>, VizError> {
        let ids = self
            .povs
            .get(pov_type)
            .ok_or_else(|| self.unknown(EntityKind::PovType, pov_type))?;
        let mut ids: Vec<String> = ids.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Look up one point of view.
    pub fn pov(&self, pov_type: &str, id: &str) -> Result<&PovRecord, VizError> {
        self.povs
            .get(pov_type)
            .and_then(|ids| ids.get(id))
            .ok_or_else(|| self.unknown(EntityKind::Pov, format!("{}{}", pov_type, id)))
    }

    pub fn pov_count(&self) -> usize {
        self.povs.values().map(IndexMap::len).sum()
    }

    /// Transmitter ids with traces, in insertion order.
    pub fn transmitters(&self) -> impl Iterator<Item = &str> {
        self.traces.keys().map(String::as_str)
    }

    /// Receiver ids reached from one transmitter, in insertion order.
    pub fn receivers_of(&self, tx: &str) -> Result<Vec<String>, VizError> {
        self.traces
            .get(tx)
            .map(|rx| rx.keys().cloned().collect())
            .ok_or_else(|| self.unknown(EntityKind::Transmitter, tx))
    }

    /// All paths between a transmitter and a receiver.
    pub fn paths_between(&self, tx: &str, rx: &str) -> Result<&[TracePath], VizError> {
        self.traces
            .get(tx)
            .and_then(|receivers| receivers.get(rx))
            .map(Vec::as_slice)
            .ok_or_else(|| self.unknown(EntityKind::Trace, format!("{}-{}", tx, rx)))
    }

    /// Iterate over every path of every `(tx, rx)` pair.
    pub fn all_paths(&self) -> impl Iterator<Item = &TracePath> {
        self.traces.values().flat_map(|rx| rx.values()).flatten()
    }

    pub fn path_count(&self) -> usize {
        self.all_paths().count()
    }

    pub fn universe_object(&self, name: &str) -> Result<&UniverseObject, VizError> {
        self.universe
            .get(name)
            .ok_or_else(|| self.unknown(EntityKind::UniverseObject, name))
    }
}

/// All loaded scenarios, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ScenarioStore {
    pub(crate) scenarios: IndexMap<ScenarioId, Scenario>,
    pub(crate) overall_range: Option<ValueRange>,
}

impl ScenarioStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty scenario. Fails if the id is already loaded.
    pub fn create_scenario(&mut self, id: impl Into<ScenarioId>) -> Result<&mut Scenario, VizError> {
        let id = id.into();
        if self.scenarios.contains_key(&id) {
            return Err(StoreError::DuplicateScenario(id.0).into());
        }
        log::info!("Create scenario {}", id);
        let scenario = self.scenarios.entry(id.clone()).or_insert_with(|| Scenario::new(id));
        Ok(scenario)
    }

    /// Remove a scenario, returning it so its renderer handles can be released.
    pub fn remove_scenario(&mut self, id: &str) -> Option<Scenario> {
        let removed = self.scenarios.shift_remove(id);
        if removed.is_some() {
            log::info!("Remove scenario {}", id);
            self.overall_range = None;
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.scenarios.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Result<&Scenario, VizError> {
        self.scenarios
            .get(id)
            .ok_or_else(|| VizError::unknown(EntityKind::Scenario, id, id))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Scenario, VizError> {
        self.scenarios
            .get_mut(id)
            .ok_or_else(|| VizError::unknown(EntityKind::Scenario, id, id))
    }

    /// Scenario ids in load order.
    pub fn ids(&self) -> impl Iterator<Item = &ScenarioId> {
        self.scenarios.keys()
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.values()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Insert a point of view parsed from a raw tag such as `Rx22`.
    pub fn add_pov(
        &mut self,
        scenario: &str,
        raw_tag: &str,
        placement: PovPlacement,
    ) -> Result<&PovRecord, VizError> {
        let tag = parse_pov_tag(raw_tag)?;
        let target = self.get_mut(scenario)?;
        let record = PovRecord {
            pov_type: tag.pov_type.clone(),
            id: tag.id.clone(),
            position: placement.position,
            azimuth: placement.azimuth,
            elevation: placement.elevation,
        };
        let ids = target.povs.entry(tag.pov_type).or_default();
        if ids.insert(tag.id.clone(), record).is_some() {
            log::debug!("Pov {} replaced in {}", raw_tag, scenario);
        }
        Ok(&ids[&tag.id])
    }

    /// Insert the paths of a trace file, keyed by the pair in its name.
    pub fn add_trace(
        &mut self,
        scenario: &str,
        file_name: &str,
        paths: Vec<TracePath>,
    ) -> Result<(), VizError> {
        let pair = parse_trace_file_name(file_name)?;
        self.add_trace_pair(scenario, &pair.tx, &pair.rx, paths)
    }

    /// Insert the paths between an explicit transmitter and receiver.
    pub fn add_trace_pair(
        &mut self,
        scenario: &str,
        tx: &str,
        rx: &str,
        paths: Vec<TracePath>,
    ) -> Result<(), VizError> {
        let target = self.get_mut(scenario)?;
        let replaced = target
            .traces
            .entry(tx.to_string())
            .or_default()
            .insert(rx.to_string(), paths)
            .is_some();
        if replaced {
            log::debug!("Trace {}-{} replaced in {}", tx, rx, scenario);
        }
        target.value_range = None;
        self.overall_range = None;
        Ok(())
    }

    /// Insert a universe object, returning the object it replaced, if any.
    pub fn add_universe_object(
        &mut self,
        scenario: &str,
        object: UniverseObject,
    ) -> Result<Option<UniverseObject>, VizError> {
        let target = self.get_mut(scenario)?;
        target.bounds = None;
        Ok(target.universe.insert(object.name.clone(), object))
    }

    /// Attach processed kpis to a scenario.
    pub fn set_kpis(&mut self, scenario: &str, kpis: KpiTable) -> Result<(), VizError> {
        self.get_mut(scenario)?.kpis = Some(kpis);
        Ok(())
    }
}
