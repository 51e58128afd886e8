//! Viewer configuration.

use cgviz_core::Color;
use cgviz_model::ColorScheme;
use cgviz_scene::PovTemplateConfig;
use serde::{Deserialize, Serialize};

/// Which range colors the traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceColorDomain {
    /// The range of the scenario the trace belongs to.
    #[default]
    Scenario,
    /// The range over every loaded scenario.
    Overall,
}

/// Appearance of kpi heatmaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapStyle {
    /// Number of color steps.
    pub n_colors: usize,
    pub scheme: ColorScheme,
    pub reverse: bool,
    pub point_size: f32,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            n_colors: 10,
            scheme: ColorScheme::Spectral,
            reverse: false,
            point_size: 5.0,
        }
    }
}

/// Every tunable constant of the viewer.
///
/// Deserializes from partial JSON: missing keys keep their defaults and
/// unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub transmitter: PovTemplateConfig,
    pub receiver: PovTemplateConfig,
    pub ground_plane_color: Color,
    pub mast_color: Color,
    pub trace_scheme: ColorScheme,
    pub trace_domain: TraceColorDomain,
    pub heatmap: HeatmapStyle,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            transmitter: PovTemplateConfig::transmitter(),
            receiver: PovTemplateConfig::receiver(),
            ground_plane_color: Color::from_u32(0x29323C),
            mast_color: Color::WHITE,
            trace_scheme: ColorScheme::Spectral,
            trace_domain: TraceColorDomain::Scenario,
            heatmap: HeatmapStyle::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Whether the pov templates differ from `other`'s.
    pub fn templates_differ(&self, other: &ViewerConfig) -> bool {
        self.transmitter != other.transmitter || self.receiver != other.receiver
    }
}
