//! WebAssembly bindings for the cgviz visualizer.
//!
//! ## Example
//!
//! ```js
//! import init, { CgViz } from 'cgviz';
//!
//! await init();
//! const viz = new CgViz(scene, { trace_domain: 'overall' });
//! viz.runInitializers();
//!
//! const report = viz.loadScenario('run1', [
//!   { name: 'qcmPov.Tx1.json', content: txText },
//!   { name: 'qcmTrace.Tx1-Rx1.json', content: traceText },
//! ]);
//! viz.toggleAllPovs('run1');
//! viz.toggleTraceBetween('run1', 'Tx1', 'Rx1');
//! ```

use cgviz_core::{Category, RangeScope, SceneError, VizError};
use cgviz_viewer::{FrameHooks, Viewer, ViewerConfig};
use indexmap::IndexMap;
use wasm_bindgen::prelude::*;

mod logger;
mod renderer;
mod types;

pub use renderer::{JsRenderer, JsScene};
pub use types::*;

/// Install the panic hook and the console logger.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}

/// Change the console log level: `"error"`, `"warn"`, `"info"`, `"debug"` or `"trace"`.
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> Result<(), JsError> {
    let level = logger::parse_level(level)
        .ok_or_else(|| JsError::new(&format!("Unknown log level: {}", level)))?;
    logger::init(level);
    Ok(())
}

fn to_js(err: VizError) -> JsError {
    JsError::new(&err.to_string())
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsError::new(&format!("Conversion error: {}", e)))
}

fn parse_category(name: &str) -> Result<Category, JsError> {
    Category::ALL
        .into_iter()
        .find(|c| c.container_name().eq_ignore_ascii_case(name))
        .ok_or_else(|| JsError::new(&format!("Unknown category: {}", name)))
}

/// The visualizer, as seen from JavaScript.
#[wasm_bindgen]
pub struct CgViz {
    viewer: Viewer<JsRenderer>,
    hooks: FrameHooks<Viewer<JsRenderer>>,
}

#[wasm_bindgen]
impl CgViz {
    /// Create a visualizer drawing into `scene`, with an optional configuration object.
    #[wasm_bindgen(constructor)]
    pub fn new(scene: JsScene, config: JsValue) -> Result<CgViz, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            ViewerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
        };
        Ok(Self {
            viewer: Viewer::new(JsRenderer::new(scene), config),
            hooks: Viewer::default_hooks(),
        })
    }

    #[wasm_bindgen(js_name = version)]
    pub fn version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Replace the configuration with a JSON object; missing keys take defaults.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> Result<(), JsError> {
        let config: ViewerConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?;
        self.viewer.set_config(config);
        Ok(())
    }

    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        to_value(self.viewer.config())
    }

    /// Run the startup hooks once.
    #[wasm_bindgen(js_name = runInitializers)]
    pub fn run_initializers(&mut self) -> Result<(), JsError> {
        self.hooks.run_initializers(&mut self.viewer).map_err(to_js)
    }

    /// Call `callback()` once from `runInitializers`; a throw aborts the run.
    #[wasm_bindgen(js_name = registerInitializer)]
    pub fn register_initializer(&mut self, name: &str, callback: js_sys::Function) {
        let label = name.to_string();
        self.hooks.register_initializer(name, move |_viewer| {
            callback.call0(&JsValue::NULL).map(drop).map_err(|err| {
                VizError::from(SceneError::Renderer {
                    reason: format!("initializer {} failed: {:?}", label, err),
                })
            })
        });
    }

    /// Call `callback(time)` on every frame.
    #[wasm_bindgen(js_name = registerAnimator)]
    pub fn register_animator(&mut self, name: &str, callback: js_sys::Function) {
        let label = name.to_string();
        self.hooks.register_animator(name, move |_viewer, time| {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_f64(time)) {
                log::warn!("Animator {} failed: {:?}", label, err);
            }
        });
    }

    #[wasm_bindgen(js_name = removeAnimator)]
    pub fn remove_animator(&mut self, name: &str) -> bool {
        self.hooks.remove_animator(name)
    }

    /// Run every animator for one frame; `time` is in seconds.
    pub fn animate(&mut self, time: f64) {
        self.hooks.animate(&mut self.viewer, time);
    }

    #[wasm_bindgen(js_name = createScenario)]
    pub fn create_scenario(&mut self, id: &str) -> Result<(), JsError> {
        self.viewer.create_scenario(id).map_err(to_js)
    }

    #[wasm_bindgen(js_name = deleteScenario)]
    pub fn delete_scenario(&mut self, id: &str) -> Result<bool, JsError> {
        self.viewer.delete_scenario(id).map_err(to_js)
    }

    /// Merge one file into an existing scenario.
    #[wasm_bindgen(js_name = loadFile)]
    pub fn load_file(&mut self, scenario: &str, name: &str, content: &str) -> Result<(), JsError> {
        self.viewer.load_file(scenario, name, content).map_err(to_js)
    }

    /// Create a scenario from `[{name, content}]` and report per-file outcomes.
    #[wasm_bindgen(js_name = loadScenario)]
    pub fn load_scenario(&mut self, id: &str, files: JsValue) -> Result<JsValue, JsError> {
        let files: Vec<FileJs> = serde_wasm_bindgen::from_value(files)
            .map_err(|e| JsError::new(&format!("Invalid file list: {}", e)))?;
        let report = self
            .viewer
            .load_scenario(id, files.into_iter().map(|f| (f.name, f.content)))
            .map_err(to_js)?;
        to_value(&LoadReportJs::from(&report))
    }

    #[wasm_bindgen(js_name = getScenario)]
    pub fn get_scenario(&self, id: &str) -> Result<JsValue, JsError> {
        let scenario = self.viewer.scenario(id).map_err(to_js)?;
        to_value(&ScenarioJs::from(scenario))
    }

    #[wasm_bindgen(js_name = listScenarios)]
    pub fn list_scenarios(&self) -> Vec<String> {
        self.viewer
            .list_scenarios()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// `{min, max}` of a scenario or of `"overall"`, `null` without traces.
    #[wasm_bindgen(js_name = getValueRange)]
    pub fn get_value_range(&mut self, scope: &str) -> Result<JsValue, JsError> {
        let range = self
            .viewer
            .value_range(&RangeScope::parse(scope))
            .map_err(to_js)?;
        if range.is_empty() {
            return Ok(JsValue::NULL);
        }
        to_value(&range)
    }

    /// Hex color of a power value in a scope.
    #[wasm_bindgen(js_name = getColor)]
    pub fn get_color(&mut self, scope: &str, value: f64) -> Result<String, JsError> {
        let color = self
            .viewer
            .color(&RangeScope::parse(scope), value)
            .map_err(to_js)?;
        Ok(color.to_hex())
    }

    /// `{min, max, center}` of the universe of a scenario.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&mut self, scenario: &str) -> Result<JsValue, JsError> {
        let bounds = self.viewer.bounds(scenario).map_err(to_js)?;
        to_value(&bounds)
    }

    /// Whether an entity is shown in a category: `universe`, `povs`, `traces` or `kpis`.
    #[wasm_bindgen(js_name = isShown)]
    pub fn is_shown(&self, scenario: &str, category: &str, name: &str) -> Result<bool, JsError> {
        Ok(self.viewer.is_shown(scenario, parse_category(category)?, name))
    }

    #[wasm_bindgen(js_name = togglePov)]
    pub fn toggle_pov(&mut self, scenario: &str, pov_type: &str, id: &str) -> Result<bool, JsError> {
        self.viewer.toggle_pov(scenario, pov_type, id).map_err(to_js)
    }

    #[wasm_bindgen(js_name = togglePovsOfType)]
    pub fn toggle_povs_of_type(&mut self, scenario: &str, pov_type: &str) -> Result<(), JsError> {
        self.viewer.toggle_povs_of_type(scenario, pov_type).map_err(to_js)
    }

    #[wasm_bindgen(js_name = toggleAllPovs)]
    pub fn toggle_all_povs(&mut self, scenario: &str) -> Result<(), JsError> {
        self.viewer.toggle_all_povs(scenario).map_err(to_js)
    }

    #[wasm_bindgen(js_name = togglePovTypeMasts)]
    pub fn toggle_pov_type_masts(&mut self, scenario: &str, pov_type: &str) -> Result<(), JsError> {
        self.viewer.toggle_pov_type_masts(scenario, pov_type).map_err(to_js)
    }

    #[wasm_bindgen(js_name = toggleTraceBetween)]
    pub fn toggle_trace_between(&mut self, scenario: &str, tx: &str, rx: &str) -> Result<bool, JsError> {
        self.viewer.toggle_trace_between(scenario, tx, rx).map_err(to_js)
    }

    #[wasm_bindgen(js_name = toggleAllTracesFrom)]
    pub fn toggle_all_traces_from(&mut self, scenario: &str, tx: &str) -> Result<(), JsError> {
        self.viewer.toggle_all_traces_from(scenario, tx).map_err(to_js)
    }

    #[wasm_bindgen(js_name = toggleAllTraces)]
    pub fn toggle_all_traces(&mut self, scenario: &str) -> Result<(), JsError> {
        self.viewer.toggle_all_traces(scenario).map_err(to_js)
    }

    #[wasm_bindgen(js_name = toggleUniverseObject)]
    pub fn toggle_universe_object(&mut self, scenario: &str, name: &str) -> Result<bool, JsError> {
        self.viewer.toggle_universe_object(scenario, name).map_err(to_js)
    }

    #[wasm_bindgen(js_name = toggleEntireUniverse)]
    pub fn toggle_entire_universe(&mut self, scenario: &str) -> Result<(), JsError> {
        self.viewer.toggle_entire_universe(scenario).map_err(to_js)
    }

    #[wasm_bindgen(js_name = toggleGroundPlane)]
    pub fn toggle_ground_plane(&mut self, scenario: &str) -> Result<bool, JsError> {
        self.viewer.toggle_ground_plane(scenario).map_err(to_js)
    }

    /// Toggle a kpi heatmap drawn with the configured heatmap style.
    #[wasm_bindgen(js_name = toggleHeatmap)]
    pub fn toggle_heatmap(
        &mut self,
        scenario: &str,
        kpi: &str,
        pov_type: &str,
        source: &str,
    ) -> Result<bool, JsError> {
        let style = self.viewer.config().heatmap.clone();
        self.viewer
            .toggle_heatmap(scenario, kpi, pov_type, source, &style)
            .map_err(to_js)
    }

    /// Apply `{source: enabled}` flags to the heatmaps of one kpi.
    #[wasm_bindgen(js_name = syncHeatmaps)]
    pub fn sync_heatmaps(
        &mut self,
        scenario: &str,
        kpi: &str,
        pov_type: &str,
        flags: JsValue,
    ) -> Result<(), JsError> {
        let flags: IndexMap<String, bool> = serde_wasm_bindgen::from_value(flags)
            .map_err(|e| JsError::new(&format!("Invalid heatmap flags: {}", e)))?;
        let sources: Vec<(String, bool)> = flags.into_iter().collect();
        let style = self.viewer.config().heatmap.clone();
        self.viewer
            .sync_heatmaps(scenario, kpi, pov_type, &sources, &style)
            .map_err(to_js)
    }

    /// Delete every scenario and release every renderer resource.
    pub fn dispose(self) {
        self.viewer.teardown();
    }
}
