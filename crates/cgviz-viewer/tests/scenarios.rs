//! Whole-scenario tests against the headless renderer.

use cgviz_core::{Category, Color, ErrorKind, RangeScope};
use cgviz_scene::{HeadlessRenderer, RenderEvent};
use cgviz_viewer::{TraceColorDomain, Viewer, ViewerConfig};
use proptest::prelude::*;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pov(x: f64, y: f64, z: f64) -> String {
    format!(r#"{{"position": [{}, {}, {}], "azimuth": 0.5, "elevation": 0.1}}"#, x, y, z)
}

fn base_files() -> Vec<(String, String)> {
    vec![
        ("qcmPov.Tx1.json".into(), pov(0.0, 0.0, 30.0)),
        ("qcmPov.Tx2.json".into(), pov(50.0, 0.0, 30.0)),
        ("qcmPov.Rx1.json".into(), pov(25.0, 25.0, 1.5)),
        (
            "qcmTrace.Tx1-Rx1.json".into(),
            r#"[{"P": 3.5, "XData": [0, 25], "YData": [0, 25], "ZData": [30, 1.5]}]"#.into(),
        ),
    ]
}

const CITY_OBJ: &str = "
mtllib city.mtl
o Tower
v 0 0 0
v 10 0 0
v 10 10 0
v 0 10 40
usemtl glass
f 1 2 3 4
o Hall
v 20 20 0
v 40 20 0
v 40 30 10
f 5 6 7
";

const CITY_MTL: &str = "
newmtl glass
Ns 80
Kd 0.2 0.4 0.6
";

const KPIS: &str = r#"{
    "nfo": {"KPIS": ["SINR"]},
    "Tx1": [
        {"XYZ": [0, 0, 1.5], "KPIS": {"SINR": [4.0]}},
        {"XYZ": [10, 0, 1.5], "KPIS": {"SINR": [-2.0]}}
    ],
    "Tx2": [
        {"XYZ": [0, 0, 1.5], "KPIS": {"SINR": [1.0]}},
        {"XYZ": [10, 0, 1.5], "KPIS": {"SINR": [6.0]}}
    ]
}"#;

fn full_files() -> Vec<(String, String)> {
    let mut files = base_files();
    files.push(("city.obj".into(), CITY_OBJ.into()));
    files.push(("city.mtl".into(), CITY_MTL.into()));
    files.push(("qcmKpis.json".into(), KPIS.into()));
    files
}

fn viewer() -> Viewer<HeadlessRenderer> {
    init_logs();
    Viewer::new(HeadlessRenderer::new(), ViewerConfig::default())
}

/// Children of every category container plus the live resource counts.
fn snapshot(v: &Viewer<HeadlessRenderer>, scenario: &str) -> (Vec<Vec<String>>, usize, usize, usize) {
    let children = Category::ALL
        .iter()
        .map(|category| {
            let container = v.registry().container(scenario, *category).unwrap();
            v.renderer()
                .child_names(container)
                .into_iter()
                .map(String::from)
                .collect()
        })
        .collect();
    let r = v.renderer();
    (children, r.live_nodes(), r.live_geometries(), r.live_materials())
}

#[test]
fn test_end_to_end_trace() {
    let mut v = viewer();
    let report = v.load_scenario("s", base_files()).unwrap();
    assert!(report.is_ok(), "{}", report);
    assert_eq!(report.loaded.len(), 4);

    assert!(v.toggle_trace_between("s", "Tx1", "Rx1").unwrap());
    let traces = v.registry().container("s", Category::Traces).unwrap();
    assert_eq!(v.renderer().child_names(traces), ["Tx1_Rx1"]);

    assert!(!v.toggle_trace_between("s", "Tx1", "Rx1").unwrap());
    assert!(v.renderer().child_names(traces).is_empty());
}

#[test]
fn test_toggles_are_idempotent() {
    let mut v = viewer();
    let report = v.load_scenario("s", full_files()).unwrap();
    assert!(report.is_ok(), "{}", report);
    // Templates stay allocated once built, so build them before the baseline.
    v.toggle_pov("s", "Tx", "1").unwrap();
    v.toggle_pov("s", "Tx", "1").unwrap();
    let before = snapshot(&v, "s");
    let style = v.config().heatmap.clone();

    v.toggle_all_povs("s").unwrap();
    v.toggle_pov_type_masts("s", "Tx").unwrap();
    v.toggle_all_traces("s").unwrap();
    v.toggle_entire_universe("s").unwrap();
    v.toggle_heatmap("s", "SINR", "Tx", "Coverage", &style).unwrap();
    assert_ne!(snapshot(&v, "s"), before);

    v.toggle_heatmap("s", "SINR", "Tx", "Coverage", &style).unwrap();
    v.toggle_entire_universe("s").unwrap();
    v.toggle_all_traces("s").unwrap();
    v.toggle_all_povs("s").unwrap();
    assert_eq!(snapshot(&v, "s"), before);
}

#[test]
fn test_failed_toggle_changes_nothing() {
    let mut v = viewer();
    v.load_scenario("s", base_files()).unwrap();
    let before = snapshot(&v, "s");
    let events = v.renderer().events().len();

    for err in [
        v.toggle_pov("s", "Tx", "3").unwrap_err(),
        v.toggle_povs_of_type("s", "UE").unwrap_err(),
        v.toggle_trace_between("s", "Tx2", "Rx1").unwrap_err(),
        v.toggle_all_traces_from("s", "Tx9").unwrap_err(),
        v.toggle_universe_object("s", "Tower").unwrap_err(),
        v.toggle_all_povs("other").unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::UnknownEntity, "{}", err);
    }
    assert_eq!(snapshot(&v, "s"), before);
    assert_eq!(v.renderer().events().len(), events);
}

#[test]
fn test_delete_scenario_releases_everything() {
    let mut v = viewer();
    v.load_scenario("s", full_files()).unwrap();
    v.load_scenario("t", base_files()).unwrap();
    let t_before = snapshot(&v, "t");

    v.toggle_all_povs("s").unwrap();
    v.toggle_pov_type_masts("s", "Rx").unwrap();
    v.toggle_all_traces("s").unwrap();
    v.toggle_entire_universe("s").unwrap();
    let style = v.config().heatmap.clone();
    v.toggle_heatmap("s", "SINR", "Tx", "Best", &style).unwrap();
    let names = [
        "Tx_1", "Tx_2", "Rx_1", "mast_Rx_1", "Tx1_Rx1", "Tower", "Hall", "GroundPlane",
        "SINR_Tx_Best",
    ];
    for name in names {
        assert!(v.is_present("s", name), "{} not shown", name);
    }

    assert!(v.delete_scenario("s").unwrap());
    for name in names {
        assert!(!v.is_present("s", name));
        assert!(v.renderer().find_by_name(name).is_none(), "{} leaked", name);
    }
    assert!(v.scenario("s").is_err());
    assert_eq!(v.list_scenarios(), ["t"]);
    assert!(!v.delete_scenario("s").unwrap());

    // The other scenario is untouched. Resource counts are global, so only
    // its containers are compared.
    assert_eq!(snapshot(&v, "t").0, t_before.0);

    let r = v.teardown();
    assert_eq!(r.live_nodes(), 0);
    assert_eq!(r.live_geometries(), 0);
    assert_eq!(r.live_materials(), 0);
}

#[test]
fn test_batch_toggle_order() {
    let mut v = viewer();
    let files: Vec<(String, String)> = ["Rx3", "Rx10", "Rx1", "Rx2"]
        .iter()
        .map(|tag| (format!("qcmPov.{}.json", tag), pov(1.0, 1.0, 1.0)))
        .collect();
    v.load_scenario("s", files).unwrap();
    v.renderer_mut().clear_events();

    v.toggle_povs_of_type("s", "Rx").unwrap();
    let created: Vec<&str> = v
        .renderer()
        .events()
        .iter()
        .filter_map(|e| match e {
            RenderEvent::CreateNode { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(created, ["Rx_1", "Rx_10", "Rx_2", "Rx_3"]);
}

#[test]
fn test_per_file_failures_are_isolated() {
    let mut v = viewer();
    let mut files = base_files();
    files.push(("qcmPov.Rx2.json".into(), "{not json".into()));
    files.push(("qcmTrace.bad.name.json".into(), "[]".into()));
    files.push(("notes.txt".into(), "hello".into()));

    let report = v.load_scenario("s", files).unwrap();
    assert_eq!(report.loaded.len(), 4);
    let failed: Vec<&str> = report.failed.iter().map(|f| f.file.as_str()).collect();
    assert_eq!(failed, ["qcmPov.Rx2.json", "qcmTrace.bad.name.json", "notes.txt"]);
    assert_eq!(report.failed[1].error.kind(), ErrorKind::AmbiguousTraceName);
    assert_eq!(report.failed[0].error.kind(), ErrorKind::DecodeError);

    let scenario = v.scenario("s").unwrap();
    assert_eq!(scenario.pov_count(), 3);
    assert_eq!(scenario.value_range.unwrap().min, 3.5);

    let err = v.load_scenario("s", base_files()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateScenario);
}

#[test]
fn test_failed_pov_file_inserts_nothing() {
    let mut v = viewer();
    let aggregated = format!(r#"{{"1": {}, "x": {}}}"#, pov(1.0, 1.0, 1.5), pov(2.0, 2.0, 1.5));
    let report = v
        .load_scenario("s", [("qcmPov.Rx.json".to_string(), aggregated)])
        .unwrap();
    assert!(report.loaded.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].error.kind(), ErrorKind::MalformedTag);
    assert_eq!(v.scenario("s").unwrap().pov_count(), 0);
}

#[test]
fn test_failed_universe_file_uploads_nothing() {
    let mut v = viewer();
    v.load_scenario("s", base_files()).unwrap();
    let before = snapshot(&v, "s");

    // Tower takes three creates; Hall fails on its material.
    v.renderer_mut().set_create_budget(Some(4));
    let err = v.load_file("s", "city.obj", CITY_OBJ).unwrap_err();
    v.renderer_mut().set_create_budget(None);

    assert_eq!(err.kind(), ErrorKind::Scene);
    assert!(v.scenario("s").unwrap().universe.is_empty());
    assert!(v.renderer().find_by_name("Tower").is_none());
    assert_eq!(snapshot(&v, "s"), before);
}

#[test]
fn test_reloaded_universe_object_stays_shown() {
    let mut v = viewer();
    v.load_scenario("s", full_files()).unwrap();
    let old = v.scenario("s").unwrap().universe_object("Hall").unwrap().node;
    assert!(v.toggle_universe_object("s", "Hall").unwrap());

    v.load_file("s", "extra.obj", "o Hall\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
        .unwrap();
    let new = v.scenario("s").unwrap().universe_object("Hall").unwrap().node;
    assert_ne!(new, old);
    assert!(v.renderer().node(old).is_none());
    assert!(v.is_shown("s", Category::Universe, "Hall"));
    assert_eq!(v.registry().entity("s", Category::Universe, "Hall"), Some(new));
    let universe = v.registry().container("s", Category::Universe).unwrap();
    assert_eq!(v.renderer().child_names(universe), ["Hall"]);

    // Hidden objects stay hidden.
    v.load_file("s", "extra.obj", "o Tower\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
        .unwrap();
    assert!(!v.is_shown("s", Category::Universe, "Tower"));
}

#[test]
fn test_universe_materials_and_bounds() {
    let mut v = viewer();
    v.load_scenario("s", full_files()).unwrap();

    let scenario = v.scenario("s").unwrap();
    let tower = scenario.universe_object("Tower").unwrap().clone();
    let hall = scenario.universe_object("Hall").unwrap().clone();
    let bounds = scenario.bounds.unwrap();
    assert_eq!(bounds.min.x, 0.0);
    assert_eq!(bounds.max.x, 40.0);
    assert_eq!(bounds.max.z, 40.0);

    let glass = v.renderer().material(tower.material.unwrap()).unwrap();
    assert_eq!(glass.color, Color::rgb(0.2, 0.4, 0.6));
    let plain = v.renderer().material(hall.material.unwrap()).unwrap();
    assert_eq!(plain.color, Color::WHITE);

    // Loading a file into an existing scenario replaces the object.
    v.load_file("s", "extra.obj", "o Hall\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
        .unwrap();
    assert!(v.renderer().node(hall.node).is_none());
    assert_eq!(v.scenario("s").unwrap().universe.len(), 2);
}

#[test]
fn test_color_domains() {
    let mut v = viewer();
    v.load_scenario("low", base_files()).unwrap();
    let mut files = base_files();
    files[3].1 = r#"[{"P": -20, "XData": [0], "YData": [0], "ZData": [0]}]"#.into();
    v.load_scenario("high", files).unwrap();

    let overall = v.value_range(&RangeScope::Overall).unwrap();
    assert_eq!((overall.min, overall.max), (-20.0, 3.5));
    let own = v.value_range(&RangeScope::parse("high")).unwrap();
    assert_eq!((own.min, own.max), (-20.0, -20.0));

    // The same power colors differently against the overall range.
    let mut config = v.config().clone();
    config.trace_domain = TraceColorDomain::Overall;
    v.set_config(config);
    v.toggle_trace_between("low", "Tx1", "Rx1").unwrap();
    let group = v.registry().entity("low", Category::Traces, "Tx1_Rx1").unwrap();
    let path = v.renderer().node(group).unwrap().children[0];
    let expected = v.color(&RangeScope::Overall, 3.5).unwrap();
    assert_eq!(v.renderer().line_color(path), Some(expected));
}

proptest! {
    #[test]
    fn prop_toggle_sequence_twice_restores(picks in proptest::collection::vec(0usize..3, 0..12)) {
        let mut v = Viewer::new(HeadlessRenderer::new(), ViewerConfig::default());
        v.load_scenario("s", base_files()).unwrap();
        v.toggle_pov("s", "Rx", "1").unwrap();
        v.toggle_pov("s", "Rx", "1").unwrap();
        let before = snapshot(&v, "s");

        let povs = [("Tx", "1"), ("Tx", "2"), ("Rx", "1")];
        for _ in 0..2 {
            for pick in &picks {
                let (pov_type, id) = povs[*pick];
                v.toggle_pov("s", pov_type, id).unwrap();
            }
        }
        prop_assert_eq!(snapshot(&v, "s"), before);
    }
}
