use serde_json::json;

use crate::{
    error::ReportError,
    metric::{DataClass, Metric},
    raster::{raster_stats, DepthStats, Raster, RasterStats},
    sketch::Sketch,
};

use super::{levels, level_metric, OverlapOptions};

/// Per class, number of cells inside each sketch level whose value equals the
/// class's `numeric_value`. Metrics are ordered by class, then sketch level.
pub fn overlap_raster_class(
    metric_id: &str,
    raster: &Raster,
    sketch: &Sketch,
    classes: &[DataClass],
    options: &OverlapOptions,
) -> Result<Vec<Metric>, ReportError> {
    let targets = classes.iter()
        .map(|class| class.numeric_value
            .map(|value| (class.class_id.as_str(), value))
            .ok_or_else(|| ReportError::config(format!(
                "Class '{}' of '{metric_id}' has no numericValue for raster class overlap", class.class_id
            ))))
        .collect::<Result<Vec<_>, _>>()?;

    // Sample each level once and count every class from the same cells.
    let samples = levels(sketch, options.include_children).into_iter()
        .map(|level| {
            let values = level.shape.as_ref().map(|s| raster.values_within(s)).unwrap_or_default();
            (level.sketch, values)
        })
        .collect::<Vec<_>>();

    Ok(targets.iter()
        .flat_map(|&(class_id, target)| samples.iter().map(move |(sketch, values)| {
            let count = values.iter().filter(|&&v| v == target).count();
            level_metric(metric_id, Some(class_id), sketch, count as f64)
        }))
        .collect())
}

/// Cell statistics per sketch level. The value is the sum of valid cells; the
/// remaining statistics ride along in `extra`.
pub fn overlap_raster_stats(
    metric_id: &str,
    class_id: Option<&str>,
    raster: &Raster,
    sketch: &Sketch,
    options: &OverlapOptions,
) -> Vec<Metric> {
    levels(sketch, options.include_children).into_iter()
        .map(|level| {
            let stats = level.shape.as_ref().map(|s| raster_stats(raster, s)).unwrap_or_default();
            level_metric(metric_id, class_id, level.sketch, stats.sum)
                .with_extra("count", stats.count)
                .with_extra("min", json!(stats.min))
                .with_extra("max", json!(stats.max))
                .with_extra("mean", json!(stats.mean))
        })
        .collect()
}

/// Depth summary for every child of a collection and for the collection
/// itself (or for the single sketch). Values stay as elevations.
pub fn depth_stats(raster: &Raster, sketch: &Sketch) -> Vec<DepthStats> {
    levels(sketch, true).into_iter()
        .map(|level| {
            let stats = level.shape.as_ref().map(|s| raster_stats(raster, s)).unwrap_or_default();
            let RasterStats { min, max, mean, .. } = stats;
            DepthStats {
                sketch_id: level.sketch.id().to_string(),
                sketch_name: level.sketch.name().to_string(),
                is_collection: level.sketch.is_collection(),
                min,
                max,
                mean,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::{coord, MultiPolygon, Rect};
    use ndarray::array;

    use crate::geom::AreaMethod;

    use super::*;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::from(Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon())
    }

    fn bathymetry() -> Raster {
        Raster::new(
            array![
                [-10.0, -20.0, -30.0, -40.0],
                [-15.0, -25.0, -35.0, -45.0],
            ],
            coord! { x: 0.0, y: 20.0 },
            (10.0, 10.0),
            None,
        )
    }

    fn depth_classes() -> Raster {
        Raster::new(
            array![[1.0, 1.0, 2.0, 3.0], [1.0, 2.0, 2.0, 3.0]],
            coord! { x: 0.0, y: 20.0 },
            (10.0, 10.0),
            Some(0.0),
        )
    }

    fn plan() -> Sketch {
        let west = Sketch::new("west", "West", square(0.0, 0.0, 20.0, 20.0));
        let east = Sketch::new("east", "East", square(20.0, 0.0, 40.0, 20.0));
        Sketch::collection("plan", "Plan", vec![west, east])
    }

    #[test]
    fn counts_cells_per_class() {
        let classes = [DataClass::new("shallow", "Shallow").with_numeric_value(1.0), DataClass::new("deep", "Deep").with_numeric_value(3.0)];
        let metrics = overlap_raster_class("depthClasses", &depth_classes(), &plan(), &classes, &OverlapOptions::new(AreaMethod::Planar)).unwrap();

        let rows = metrics.iter().map(|m| (m.class_id().unwrap(), m.sketch_id().unwrap(), m.value)).collect::<Vec<_>>();
        assert_eq!(rows, [
            ("shallow", "west", 3.0), ("shallow", "east", 0.0), ("shallow", "plan", 3.0),
            ("deep", "west", 0.0), ("deep", "east", 2.0), ("deep", "plan", 2.0),
        ]);
    }

    #[test]
    fn class_without_numeric_value_is_a_configuration_error() {
        let classes = [DataClass::new("shallow", "Shallow")];
        let result = overlap_raster_class("depthClasses", &depth_classes(), &plan(), &classes, &OverlapOptions::default());
        assert!(matches!(result, Err(ReportError::Configuration(_))));
    }

    #[test]
    fn depth_stats_per_child_and_collection() {
        let stats = depth_stats(&bathymetry(), &plan());
        assert_eq!(stats.len(), 3);

        let west = &stats[0];
        assert_eq!((west.min, west.max, west.mean), (Some(-25.0), Some(-10.0), Some(-17.5)));
        assert!(!west.is_collection);

        let overall = &stats[2];
        assert!(overall.is_collection);
        assert_eq!((overall.min, overall.max), (Some(-45.0), Some(-10.0)));
    }

    #[test]
    fn raster_stats_metrics_carry_extremes() {
        let sketch = Sketch::new("west", "West", square(0.0, 0.0, 20.0, 20.0));
        let metrics = overlap_raster_stats("depth", None, &bathymetry(), &sketch, &OverlapOptions::default());
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].value, -70.0);
        let extra = metrics[0].extra.as_ref().unwrap();
        assert_eq!(extra["count"], json!(4));
        assert_eq!(extra["min"], json!(-25.0));
    }
}
