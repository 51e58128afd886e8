//! Derived ranges and bounds over scenario data.

use cgviz_core::{
    BoundingBox, DVec3, EntityKind, RangeScope, SpatialBounds, ValueRange, VizError,
};

use crate::store::{Scenario, ScenarioStore};

/// Power range over every path of a scenario, rescanned from scratch.
///
/// Returns [`ValueRange::EMPTY`] when the scenario has no paths.
pub fn trace_range(scenario: &Scenario) -> ValueRange {
    scenario.all_paths().map(|p| p.power).collect()
}

/// Extent of the universe objects of a scenario.
///
/// `min`/`max` are the extremal corners over all objects, `center` is the
/// mean of the per-object centers. Objects without bounds are skipped.
pub fn universe_bounds(scenario: &Scenario) -> Option<SpatialBounds> {
    let boxes: Vec<&BoundingBox> = scenario
        .universe
        .values()
        .filter_map(|object| object.bounds.as_ref())
        .collect();

    let first = boxes.first()?;
    let mut min = first.min;
    let mut max = first.max;
    let mut center_sum = DVec3::ZERO;
    for bounds in &boxes {
        min = min.min(bounds.min);
        max = max.max(bounds.max);
        center_sum += bounds.center();
    }

    Some(SpatialBounds {
        min,
        max,
        center: center_sum / boxes.len() as f64,
    })
}

impl ScenarioStore {
    /// Recompute and store the trace range of one scenario.
    pub fn compute_trace_range(&mut self, id: &str) -> Result<ValueRange, VizError> {
        let scenario = self.get_mut(id)?;
        let range = trace_range(scenario);
        log::debug!("Trace range of {}: [{}, {}]", id, range.min, range.max);
        scenario.value_range = Some(range);
        Ok(range)
    }

    /// Recompute every scenario's range and fold them into the overall range.
    pub fn compute_overall_range(&mut self) -> ValueRange {
        let mut overall = ValueRange::EMPTY;
        for scenario in self.scenarios.values_mut() {
            let range = trace_range(scenario);
            scenario.value_range = Some(range);
            overall.merge(&range);
        }
        log::debug!("Overall trace range: [{}, {}]", overall.min, overall.max);
        self.overall_range = Some(overall);
        overall
    }

    /// The range of a scope, computed on first use after any trace insert.
    pub fn value_range(&mut self, scope: &RangeScope) -> Result<ValueRange, VizError> {
        match scope {
            RangeScope::Scenario(id) => {
                let cached = self.get(id.as_str())?.value_range;
                match cached {
                    Some(range) => Ok(range),
                    None => self.compute_trace_range(id.as_str()),
                }
            }
            RangeScope::Overall => match self.overall_range {
                Some(range) => Ok(range),
                None => Ok(self.compute_overall_range()),
            },
        }
    }

    /// The last computed range of a scope, without recomputing.
    pub fn cached_range(&self, scope: &RangeScope) -> Option<ValueRange> {
        match scope {
            RangeScope::Scenario(id) => self.scenarios.get(id.as_str())?.value_range,
            RangeScope::Overall => self.overall_range,
        }
    }

    /// Recompute and store the universe bounds of one scenario.
    ///
    /// Fails when the scenario has no universe object with bounds.
    pub fn compute_universe_bounds(&mut self, id: &str) -> Result<SpatialBounds, VizError> {
        let scenario = self.get_mut(id)?;
        let bounds = universe_bounds(scenario)
            .ok_or_else(|| VizError::unknown(EntityKind::UniverseBounds, id, "universe"))?;
        scenario.bounds = Some(bounds);
        Ok(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::UniverseObject;
    use cgviz_core::{ErrorKind, NodeId, TracePath};
    use proptest::prelude::*;

    fn path(power: f64) -> TracePath {
        TracePath::new(power, vec![0.0], vec![0.0], vec![0.0])
    }

    fn object(name: &str, min: DVec3, max: DVec3) -> UniverseObject {
        UniverseObject {
            name: name.into(),
            node: NodeId(0),
            geometry: None,
            material: None,
            bounds: Some(BoundingBox::new(min, max)),
        }
    }

    #[test]
    fn test_trace_range_empty() {
        let mut store = ScenarioStore::new();
        store.create_scenario("s").unwrap();
        let range = store.compute_trace_range("s").unwrap();
        assert!(range.is_empty());
        assert_eq!(store.get("s").unwrap().value_range, Some(ValueRange::EMPTY));
    }

    #[test]
    fn test_trace_range_rescans() {
        let mut store = ScenarioStore::new();
        store.create_scenario("s").unwrap();
        store.add_trace_pair("s", "Tx1", "Rx1", vec![path(-80.0), path(-20.0)]).unwrap();
        assert_eq!(store.compute_trace_range("s").unwrap(), ValueRange::new(-80.0, -20.0));

        // Replacing the pair must shrink the range, not only widen it.
        store.add_trace_pair("s", "Tx1", "Rx1", vec![path(-50.0)]).unwrap();
        assert_eq!(store.compute_trace_range("s").unwrap(), ValueRange::new(-50.0, -50.0));
    }

    #[test]
    fn test_trace_range_single_decreasing_sequence() {
        // Every value must update both ends independently.
        let mut store = ScenarioStore::new();
        store.create_scenario("s").unwrap();
        store
            .add_trace_pair("s", "Tx1", "Rx1", vec![path(3.0), path(2.0), path(1.0)])
            .unwrap();
        assert_eq!(store.compute_trace_range("s").unwrap(), ValueRange::new(1.0, 3.0));
    }

    #[test]
    fn test_overall_range_folds_scenarios() {
        let mut store = ScenarioStore::new();
        store.create_scenario("a").unwrap();
        store.create_scenario("b").unwrap();
        store.add_trace_pair("a", "Tx1", "Rx1", vec![path(1.0), path(4.0)]).unwrap();
        store.add_trace_pair("b", "Tx1", "Rx1", vec![path(-2.0)]).unwrap();

        assert_eq!(store.value_range(&RangeScope::Overall).unwrap(), ValueRange::new(-2.0, 4.0));
        assert_eq!(
            store.cached_range(&RangeScope::Scenario("b".into())),
            Some(ValueRange::new(-2.0, -2.0))
        );

        store.remove_scenario("b");
        assert_eq!(store.cached_range(&RangeScope::Overall), None);
        assert_eq!(store.value_range(&RangeScope::Overall).unwrap(), ValueRange::new(1.0, 4.0));
    }

    #[test]
    fn test_value_range_unknown_scenario() {
        let mut store = ScenarioStore::new();
        let err = store.value_range(&RangeScope::parse("dummy")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEntity);
    }

    #[test]
    fn test_universe_bounds_mean_center() {
        let mut store = ScenarioStore::new();
        store.create_scenario("s").unwrap();
        store
            .add_universe_object("s", object("a", DVec3::ZERO, DVec3::splat(2.0)))
            .unwrap();
        store
            .add_universe_object("s", object("b", DVec3::splat(2.0), DVec3::splat(10.0)))
            .unwrap();

        let bounds = store.compute_universe_bounds("s").unwrap();
        assert_eq!(bounds.min, DVec3::ZERO);
        assert_eq!(bounds.max, DVec3::splat(10.0));
        // Mean of (1,1,1) and (6,6,6), not the box midpoint (5,5,5).
        assert_eq!(bounds.center, DVec3::splat(3.5));
        assert_eq!(store.get("s").unwrap().bounds, Some(bounds));
    }

    #[test]
    fn test_universe_bounds_without_objects() {
        let mut store = ScenarioStore::new();
        store.create_scenario("s").unwrap();
        let err = store.compute_universe_bounds("s").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEntity);
    }

    proptest! {
        #[test]
        fn prop_trace_range_contains_every_power(
            powers in proptest::collection::vec(-150.0f64..50.0, 1..64)
        ) {
            let mut store = ScenarioStore::new();
            store.create_scenario("s").unwrap();
            let paths = powers.iter().map(|p| path(*p)).collect();
            store.add_trace_pair("s", "Tx1", "Rx1", paths).unwrap();

            let range = store.compute_trace_range("s").unwrap();
            for power in &powers {
                prop_assert!(range.min <= *power && *power <= range.max);
            }
        }
    }
}
