// Integration tests for the report pipeline:
//   area and count overlap through Report, percent of regional totals,
//   collection union, datasource caching, and the error taxonomy.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use approx::assert_relative_eq;
use mpa_report::{
    format::{percent_with_edge, round_lower, square_meter_to_kilometer},
    AreaMethod, BasicSettings, DataClass, Datasource, DatasourceSource, Geography, GeometryKind, MemSource, Metric,
    MetricGroup, MetricGroupType, Objective, ObjectiveStatus, Project, Report, ReportError, Sketch,
};
use serde_json::{json, Value};

/// Counts fetches that reach the underlying source.
struct CountingSource {
    inner: MemSource,
    fetches: AtomicUsize,
}

impl CountingSource {
    fn new(inner: MemSource) -> Self { Self { inner, fetches: AtomicUsize::new(0) } }

    fn fetches(&self) -> usize { self.fetches.load(Ordering::SeqCst) }
}

impl DatasourceSource for CountingSource {
    fn get(&self, url: &str) -> anyhow::Result<Arc<[u8]>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.get(url)
    }

    fn has(&self, url: &str) -> bool { self.inner.has(url) }
}

fn ring(x0: f64, y0: f64, x1: f64, y1: f64) -> Value {
    json!([[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]])
}

fn polygon_feature(x0: f64, y0: f64, x1: f64, y1: f64, properties: Value) -> Value {
    json!({ "type": "Feature", "properties": properties, "geometry": { "type": "Polygon", "coordinates": ring(x0, y0, x1, y1) } })
}

fn point_feature(x: f64, y: f64, properties: Value) -> Value {
    json!({ "type": "Feature", "properties": properties, "geometry": { "type": "Point", "coordinates": [x, y] } })
}

fn collection(features: Vec<Value>) -> String {
    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> geo::Polygon<f64> {
    geo::Rect::new(geo::coord! { x: x0, y: y0 }, geo::coord! { x: x1, y: y1 }).to_polygon()
}

fn planar_project() -> Project {
    Project::new(BasicSettings { area_method: AreaMethod::Planar })
        .with_geography(Geography::new("raet", "Raet NP").with_group("default-boundary"))
}

#[test]
fn size_report_is_five_percent_of_the_park() {
    // 280 km² park and a 14 km² sketch inside it.
    let source = MemSource::default()
        .with_file("boundary.json", collection(vec![polygon_feature(0.0, 0.0, 20_000.0, 14_000.0, json!({}))]));
    let project = planar_project()
        .with_datasource(Datasource::vector("boundary", GeometryKind::Polygon, "boundary.json"))
        .with_metric_group(
            MetricGroup::new("boundaryAreaOverlap", MetricGroupType::AreaOverlap, vec![DataClass::new("boundary", "Raet NP")])
                .with_datasource("boundary"),
        )
        .with_precalc([Metric::new("area", 280_000_000.0).with_class_id("boundary-total").with_geography_id("raet")]);
    let sketch = Sketch::new("mpa", "North reef", rect(1000.0, 1000.0, 4500.0, 5000.0));

    let report = Report::new(&project, "boundaryAreaOverlap", &source).unwrap();
    let (result, warnings) = report.run_with_percent(&sketch, None).unwrap();
    assert!(warnings.is_empty());
    assert_eq!(result.metrics.len(), 2);

    let raw = &result.metrics[0];
    assert_eq!(raw.metric_id, "boundaryAreaOverlap");
    assert_eq!(raw.class_id(), Some("boundary"));
    assert_eq!(raw.sketch_id(), Some("mpa"));
    assert_relative_eq!(raw.value, 14_000_000.0, epsilon = 1e-3);

    let percent = &result.metrics[1];
    assert_eq!(percent.metric_id, "boundaryAreaOverlapPerc");
    assert_relative_eq!(percent.value, 0.05, epsilon = 1e-12);

    assert_eq!(round_lower(square_meter_to_kilometer(raw.value), 1.0), "14");
    assert_eq!(percent_with_edge(percent.value()), "5%");
}

#[test]
fn size_objectives_report_protection_and_minimum_size() {
    let source = MemSource::default()
        .with_file("boundary.json", collection(vec![polygon_feature(0.0, 0.0, 20_000.0, 14_000.0, json!({}))]));
    let project = planar_project()
        .with_datasource(Datasource::vector("boundary", GeometryKind::Polygon, "boundary.json"))
        .with_objective(Objective::percent("protection", "30% of Raet NP in no-take MPAs", 0.3))
        .with_objective(Objective::minimum_value("minSize", "12 km² minimum size", 12_000_000.0))
        .with_metric_group(
            MetricGroup::new("size", MetricGroupType::AreaOverlap, vec![DataClass::new("boundary", "Raet NP")])
                .with_datasource("boundary")
                .with_objective("protection"),
        )
        .with_metric_group(
            MetricGroup::new("minSize", MetricGroupType::AreaOverlap, vec![DataClass::new("boundary", "Raet NP")])
                .with_datasource("boundary")
                .with_objective("minSize"),
        )
        .with_precalc([Metric::new("area", 280_000_000.0).with_class_id("boundary-total").with_geography_id("raet")]);
    let sketch = Sketch::new("mpa", "North reef", rect(1000.0, 1000.0, 4500.0, 5000.0));

    let report = Report::new(&project, "size", &source).unwrap();
    let (result, _) = report.run_with_percent(&sketch, None).unwrap();
    let objectives = report.objectives(&result.metrics).unwrap();
    assert_eq!(objectives.len(), 1);
    assert_eq!(objectives[0].metric_id, "sizePerc");
    assert_eq!(objectives[0].status, ObjectiveStatus::NotMet);

    let report = Report::new(&project, "minSize", &source).unwrap();
    let result = report.run(&sketch).unwrap();
    let objectives = report.objectives(&result.metrics).unwrap();
    assert_eq!(objectives[0].sketch_id.as_deref(), Some("mpa"));
    assert_eq!(objectives[0].status, ObjectiveStatus::Met);
}

fn nest_source() -> MemSource {
    MemSource::default().with_file("nests.json", collection(vec![
        point_feature(1.0, 1.0, json!({ "species": "tjeld" })),
        point_feature(2.0, 2.0, json!({ "species": "tjeld" })),
        point_feature(50.0, 50.0, json!({ "species": "svartbak" })),
        point_feature(3.0, 3.0, json!({ "species": "makrellterne" })),
        point_feature(4.0, 4.0, json!({ "species": null })),
    ]))
}

fn nest_project() -> Project {
    planar_project()
        .with_datasource(Datasource::vector("nests", GeometryKind::Point, "nests.json"))
        .with_metric_group(
            MetricGroup::new("seabirdNests", MetricGroupType::CountOverlap, vec![
                DataClass::new("tjeld", "Eurasian oystercatcher"),
                DataClass::new("svartbak", "Great black-backed gull"),
                DataClass::new("makrellterne", "Common tern"),
            ])
            .with_datasource("nests")
            .with_class_key("species"),
        )
        .with_precalc([
            Metric::new("count", 0.0).with_class_id("nests-svartbak").with_geography_id("raet"),
            Metric::new("count", 4.0).with_class_id("nests-makrellterne").with_geography_id("raet"),
        ])
}

#[test]
fn seabird_nests_distinguish_zero_and_missing_totals() {
    let source = CountingSource::new(nest_source());
    let project = nest_project();
    let sketch = Sketch::new("mpa", "Skerries", rect(0.0, 0.0, 10.0, 10.0));

    let report = Report::new(&project, "seabirdNests", &source).unwrap();
    let (result, warnings) = report.run_with_percent(&sketch, Some("raet")).unwrap();

    // Three classes share one datasource URL.
    assert_eq!(source.fetches(), 1);

    let rows = result.metrics.iter()
        .map(|m| (m.metric_id.as_str(), m.class_id().unwrap(), m.value()))
        .collect::<Vec<_>>();
    assert_eq!(rows, [
        ("seabirdNests", "tjeld", Some(2.0)),
        ("seabirdNests", "svartbak", Some(0.0)),
        ("seabirdNests", "makrellterne", Some(1.0)),
        ("seabirdNestsPerc", "tjeld", None),
        ("seabirdNestsPerc", "svartbak", Some(0.0)),
        ("seabirdNestsPerc", "makrellterne", Some(0.25)),
    ]);

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].class_id.as_deref(), Some("tjeld"));
    assert_eq!(percent_with_edge(result.metrics[3].value()), "N/A");
}

#[test]
fn collection_area_counts_overlap_once() {
    // Two 5 km² children that share 2 km²; their union is 8 km².
    let source = MemSource::default()
        .with_file("sea.json", collection(vec![polygon_feature(-100_000.0, -100_000.0, 100_000.0, 100_000.0, json!({}))]));
    let project = planar_project()
        .with_datasource(Datasource::vector("sea", GeometryKind::Polygon, "sea.json"))
        .with_metric_group(
            MetricGroup::new("size", MetricGroupType::AreaOverlap, vec![DataClass::new("sea", "Sea")]).with_datasource("sea"),
        );
    let plan = Sketch::collection("plan", "Plan", vec![
        Sketch::new("west", "West", rect(0.0, 0.0, 2500.0, 2000.0)),
        Sketch::new("east", "East", rect(1500.0, 0.0, 4000.0, 2000.0)),
    ]);

    let result = Report::new(&project, "size", &source).unwrap().run(&plan).unwrap();
    let value = |id: &str| result.metrics.iter().find(|m| m.sketch_id() == Some(id)).map(|m| m.value).unwrap();

    assert_eq!(result.metrics.len(), 3);
    assert_relative_eq!(value("west"), 5_000_000.0, epsilon = 1e-3);
    assert_relative_eq!(value("east"), 5_000_000.0, epsilon = 1e-3);
    assert_relative_eq!(value("plan"), 8_000_000.0, epsilon = 1e-3);
    assert!(value("plan") <= value("west") + value("east"));
}

#[test]
fn child_table_lists_every_child_and_class() {
    let source = nest_source();
    let project = nest_project();
    let plan = Sketch::collection("plan", "Plan", vec![
        Sketch::new("inner", "Inner", rect(0.0, 0.0, 2.5, 2.5)),
        Sketch::new("outer", "Outer", rect(20.0, 20.0, 30.0, 30.0)),
    ]);

    let report = Report::new(&project, "seabirdNests", &source).unwrap();
    let result = report.run(&plan).unwrap();
    let rows = report.child_table(&plan, &result.metrics, "seabirdNests");

    assert_eq!(rows.iter().map(|r| r.sketch_id.as_str()).collect::<Vec<_>>(), ["inner", "outer"]);
    assert!(rows.iter().all(|r| r.values.len() == 3));
    assert_eq!(rows[0].value("tjeld"), Some(2.0));
    assert_eq!(rows[1].value("tjeld"), Some(0.0));
}

#[test]
fn raster_datasource_for_area_overlap_is_a_configuration_error() {
    let source = CountingSource::new(MemSource::default());
    let project = planar_project()
        .with_datasource(Datasource::raster("depth", "depth.json"))
        .with_metric_group(
            MetricGroup::new("sand", MetricGroupType::AreaOverlap, vec![DataClass::new("sand", "Sand")]).with_datasource("depth"),
        );
    let sketch = Sketch::new("mpa", "MPA", rect(0.0, 0.0, 10.0, 10.0));

    let result = Report::new(&project, "sand", &source).unwrap().run(&sketch);
    assert!(matches!(result, Err(ReportError::Configuration(_))));
    assert_eq!(source.fetches(), 0);
}

#[test]
fn point_datasource_for_area_overlap_is_a_configuration_error() {
    let source = CountingSource::new(nest_source());
    let project = planar_project()
        .with_datasource(Datasource::vector("nests", GeometryKind::Point, "nests.json"))
        .with_metric_group(
            MetricGroup::new("nestArea", MetricGroupType::AreaOverlap, vec![DataClass::new("tjeld", "Tjeld")])
                .with_datasource("nests")
                .with_class_key("species"),
        );
    let sketch = Sketch::new("mpa", "MPA", rect(0.0, 0.0, 10.0, 10.0));

    match Report::new(&project, "nestArea", &source).unwrap().run(&sketch) {
        Err(ReportError::Configuration(message)) => assert!(message.contains("point")),
        other => panic!("expected Configuration, got {other:?}"),
    }
    assert_eq!(source.fetches(), 0);
}

#[test]
fn geodesic_within_distance_counts_nearby_cables() {
    // A cable about 2.2 km east of the sketch whose ends are far outside the search radius.
    let cable = json!({
        "type": "Feature",
        "properties": { "kind": "power" },
        "geometry": { "type": "LineString", "coordinates": [[0.12, -1.0], [0.12, 1.0]] }
    });
    let source = MemSource::default().with_file("cables.json", collection(vec![cable]));
    let project = Project::new(BasicSettings { area_method: AreaMethod::Geodesic })
        .with_datasource(Datasource::vector("cables", GeometryKind::Line, "cables.json"))
        .with_metric_group(
            MetricGroup::new("cables", MetricGroupType::CountOverlap, vec![DataClass::new("power", "Power")])
                .with_datasource("cables")
                .with_class_key("kind")
                .with_within_distance(3000.0),
        );
    let sketch = Sketch::new("mpa", "MPA", rect(0.0, 0.0, 0.1, 0.1));

    let result = Report::new(&project, "cables", &source).unwrap().run(&sketch).unwrap();
    assert_eq!(result.metrics[0].value(), Some(1.0));
}

#[test]
fn empty_or_missing_datasource_is_data_unavailable() {
    let source = MemSource::default().with_file("sand.json", collection(vec![]));
    let project = planar_project()
        .with_datasource(Datasource::vector("sand", GeometryKind::Polygon, "sand.json"))
        .with_datasource(Datasource::vector("kelp", GeometryKind::Polygon, "kelp.json"))
        .with_metric_group(
            MetricGroup::new("sand", MetricGroupType::AreaOverlap, vec![DataClass::new("sand", "Sand")]).with_datasource("sand"),
        )
        .with_metric_group(
            MetricGroup::new("kelp", MetricGroupType::AreaOverlap, vec![DataClass::new("kelp", "Kelp")]).with_datasource("kelp"),
        );
    let sketch = Sketch::new("mpa", "MPA", rect(0.0, 0.0, 10.0, 10.0));

    match Report::new(&project, "sand", &source).unwrap().run(&sketch) {
        Err(ReportError::DataUnavailable { datasource_id, class_id, .. }) => {
            assert_eq!(datasource_id, "sand");
            assert_eq!(class_id, "sand");
        }
        other => panic!("expected DataUnavailable, got {other:?}"),
    }
    assert!(matches!(
        Report::new(&project, "kelp", &source).unwrap().run(&sketch),
        Err(ReportError::DataUnavailable { .. })
    ));
}

#[test]
fn features_outside_the_class_or_sketch_give_zero_not_an_error() {
    let source = nest_source();
    let project = nest_project();
    let sketch = Sketch::new("far", "Far away", rect(500.0, 500.0, 510.0, 510.0));

    let result = Report::new(&project, "seabirdNests", &source).unwrap().run(&sketch).unwrap();
    assert_eq!(result.metrics.len(), 3);
    assert!(result.metrics.iter().all(|m| m.value == 0.0 && m.value.is_sign_positive()));

    let json = serde_json::to_string(&result).unwrap();
    assert!(!json.contains("-0.0"));
}

#[test]
fn result_json_keeps_absent_percent_as_null() {
    let source = nest_source();
    let project = nest_project();
    let sketch = Sketch::new("mpa", "Skerries", rect(0.0, 0.0, 10.0, 10.0));

    let (result, _) = Report::new(&project, "seabirdNests", &source).unwrap()
        .run_with_percent(&sketch, None)
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["metrics"][3]["metricId"], "seabirdNestsPerc");
    assert!(json["metrics"][3]["value"].is_null());
    assert!(json["metrics"][0]["groupId"].is_null());

    let back: mpa_report::ReportResult = serde_json::from_value(json).unwrap();
    assert!(back.metrics[3].is_absent());
    assert_eq!(back.metrics[0].value(), Some(2.0));
}
