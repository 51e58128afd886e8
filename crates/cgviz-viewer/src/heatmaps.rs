//! Kpi heatmaps.
//!
//! A heatmap draws the grid points of a kpi as colored points. Its source
//! is one transmitter or a series derived over all of them.

use cgviz_core::{heatmap_entity_name, Category, EntityKind, VizError};
use cgviz_model::{ColorScale, KpiSource};
use cgviz_scene::{EntityDraft, Geometry, Material, SceneRenderer};

use crate::config::HeatmapStyle;
use crate::viewer::Viewer;

impl<R: SceneRenderer> Viewer<R> {
    /// Show or hide the heatmap of `kpi` from `source`, e.g. `"Best"` or `"1"`.
    pub fn toggle_heatmap(
        &mut self,
        scenario: &str,
        kpi: &str,
        pov_type: &str,
        source: &str,
        style: &HeatmapStyle,
    ) -> Result<bool, VizError> {
        let source = KpiSource::parse(source);
        let table = self
            .store
            .get(scenario)?
            .kpis
            .as_ref()
            .ok_or_else(|| VizError::unknown(EntityKind::Kpi, scenario, kpi))?;
        let values = table.values(scenario, kpi, &source)?;
        let domain = table.range(scenario, kpi, &source)?;
        let positions = table.coords.clone();

        let name = heatmap_entity_name(kpi, pov_type, &source.to_string());
        if self.is_shown(scenario, Category::Kpis, &name) {
            self.registry
                .remove_from_category(&mut self.renderer, scenario, Category::Kpis, &name)?;
            return Ok(false);
        }

        let scale = ColorScale::new(style.scheme, domain)
            .quantized(style.n_colors)
            .reversed(style.reverse);
        let colors = values.iter().map(|v| scale.color_or_missing(*v)).collect();
        let geometry = Geometry::Points { positions, colors };
        let material = Material::points(style.point_size).with_name(name.as_str());
        let draft = EntityDraft::drawable(&mut self.renderer, &name, &geometry, &material)?;
        self.registry
            .add_to_category(&mut self.renderer, scenario, Category::Kpis, draft)?;
        Ok(true)
    }

    /// Bring the heatmaps of one kpi in line with a set of source flags.
    ///
    /// A disabled source is hidden if shown. An enabled source is toggled,
    /// so the caller passes only the sources whose flag changed.
    pub fn sync_heatmaps<S: AsRef<str>>(
        &mut self,
        scenario: &str,
        kpi: &str,
        pov_type: &str,
        sources: &[(S, bool)],
        style: &HeatmapStyle,
    ) -> Result<(), VizError> {
        for (source, enabled) in sources {
            let source = source.as_ref();
            if *enabled {
                self.toggle_heatmap(scenario, kpi, pov_type, source, style)?;
                continue;
            }
            let name = heatmap_entity_name(kpi, pov_type, &KpiSource::parse(source).to_string());
            if self.is_shown(scenario, Category::Kpis, &name) {
                self.registry
                    .remove_from_category(&mut self.renderer, scenario, Category::Kpis, &name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cgviz_core::{Color, DVec3, ErrorKind};
    use cgviz_model::{KpiSample, KpiTable, RawKpis};
    use cgviz_scene::HeadlessRenderer;
    use indexmap::IndexMap;

    use super::*;
    use crate::config::ViewerConfig;

    fn sample(x: f64, sinr: Option<f64>) -> KpiSample {
        KpiSample {
            position: DVec3::new(x, 0.0, 1.5),
            values: IndexMap::from([("SINR".to_string(), sinr)]),
        }
    }

    fn viewer() -> Viewer<HeadlessRenderer> {
        let mut v = Viewer::new(HeadlessRenderer::new(), ViewerConfig::default());
        v.create_scenario("s").unwrap();
        let raw = RawKpis {
            names: vec!["SINR".to_string()],
            transmitters: IndexMap::from([
                ("Tx1".to_string(), vec![sample(0.0, Some(1.0)), sample(1.0, Some(-4.0)), sample(2.0, None)]),
                ("Tx2".to_string(), vec![sample(0.0, Some(3.0)), sample(1.0, Some(-6.0)), sample(2.0, None)]),
            ]),
        };
        v.store.set_kpis("s", KpiTable::process(&raw)).unwrap();
        v
    }

    fn point_colors(v: &Viewer<HeadlessRenderer>, name: &str) -> Vec<Color> {
        let node = v.renderer().find_by_name(name).unwrap();
        let geometry = v.renderer().node(node).unwrap().geometry.unwrap();
        match v.renderer().geometry(geometry).unwrap() {
            Geometry::Points { colors, .. } => colors.clone(),
            other => panic!("not a point cloud: {:?}", other),
        }
    }

    #[test]
    fn test_toggle_heatmap() {
        let mut v = viewer();
        let style = HeatmapStyle::default();

        assert!(v.toggle_heatmap("s", "SINR", "Tx", "Best", &style).unwrap());
        assert!(v.is_shown("s", Category::Kpis, "SINR_Tx_Best"));
        let colors = point_colors(&v, "SINR_Tx_Best");
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[2], ColorScale::MISSING);
        assert_ne!(colors[0], colors[1]);

        assert!(!v.toggle_heatmap("s", "SINR", "Tx", "Best", &style).unwrap());
        assert_eq!(v.renderer().live_geometries(), 0);
    }

    #[test]
    fn test_heatmap_reverse() {
        let mut v = viewer();
        let style = HeatmapStyle::default();
        let reversed = HeatmapStyle {
            reverse: true,
            ..HeatmapStyle::default()
        };
        v.toggle_heatmap("s", "SINR", "Tx", "1", &style).unwrap();
        v.toggle_heatmap("s", "SINR", "Rx", "1", &reversed).unwrap();
        let plain = point_colors(&v, "SINR_Tx_1");
        let flipped = point_colors(&v, "SINR_Rx_1");
        assert_ne!(plain[0], flipped[0]);
    }

    #[test]
    fn test_heatmap_unknown_kpi() {
        let mut v = viewer();
        let style = HeatmapStyle::default();
        let err = v.toggle_heatmap("s", "RSRP", "Tx", "Best", &style).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEntity);
        let err = v.toggle_heatmap("s", "SINR", "Tx", "7", &style).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEntity);

        v.create_scenario("bare").unwrap();
        let err = v.toggle_heatmap("bare", "SINR", "Tx", "Best", &style).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEntity);
    }

    #[test]
    fn test_sync_heatmaps() {
        let mut v = viewer();
        let style = HeatmapStyle::default();
        v.sync_heatmaps("s", "SINR", "Tx", &[("Best", true), ("Mean", true)], &style)
            .unwrap();
        assert_eq!(
            v.registry().entity_names("s", Category::Kpis),
            ["SINR_Tx_Best", "SINR_Tx_Mean"]
        );

        v.sync_heatmaps("s", "SINR", "Tx", &[("Best", false), ("Worst", false)], &style)
            .unwrap();
        assert_eq!(v.registry().entity_names("s", Category::Kpis), ["SINR_Tx_Mean"]);
    }
}
