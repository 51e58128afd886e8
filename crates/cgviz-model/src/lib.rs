//! Scenario data model for the cgviz visualizer.
//!
//! This crate provides:
//! - The scenario store (points of view, traces, universe objects, kpis per scenario)
//! - Trace power ranges per scenario and across scenarios
//! - Universe bounds for framing and the ground plane
//! - KPI post-processing (per transmitter, best, worst, mean, sum)
//! - Color scales mapping values to colors

mod colormap;
mod kpi;
mod ranges;
mod store;

pub use colormap::{ColorScale, ColorScheme};
pub use kpi::{Extremes, KpiSample, KpiSource, KpiTable, RawKpis};
pub use ranges::{trace_range, universe_bounds};
pub use store::{PovPlacement, Scenario, ScenarioStore, UniverseObject};
