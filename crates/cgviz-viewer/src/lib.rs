//! The cgviz viewer context.
//!
//! [`Viewer`] ties the scenario store to a [`SceneRenderer`]: it loads
//! simulation output into scenarios and shows or hides their points of
//! view, traces, universe objects and kpi heatmaps.
//!
//! ```ignore
//! use cgviz_scene::HeadlessRenderer;
//! use cgviz_viewer::{Viewer, ViewerConfig};
//!
//! let mut viewer = Viewer::new(HeadlessRenderer::new(), ViewerConfig::default());
//! let report = viewer.load_scenario("run1", files)?;
//! viewer.toggle_all_povs("run1")?;
//! viewer.toggle_trace_between("run1", "Tx1", "Rx1")?;
//! ```
//!
//! [`SceneRenderer`]: cgviz_scene::SceneRenderer

pub mod config;
pub mod hooks;
mod heatmaps;
mod loader;
mod toggles;
mod viewer;

pub use config::{HeatmapStyle, TraceColorDomain, ViewerConfig};
pub use hooks::{Animator, FrameHooks, Initializer};
pub use viewer::Viewer;
