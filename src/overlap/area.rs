use geo::{BooleanOps, BoundingRect, MultiPolygon};

use crate::{feature::Feature, geom::SpatialIndex, metric::Metric, sketch::Sketch};

use super::{levels, level_metric, OverlapOptions};

/// Area (m²) of the sketch covered by `features`, one metric per sketch level.
///
/// `features` must already be filtered to the class. Non-polygonal features
/// contribute nothing. A collection is intersected once through the union of
/// its children so overlapping children are not counted twice.
pub fn overlap_area(
    metric_id: &str,
    class_id: Option<&str>,
    features: &[&Feature],
    sketch: &Sketch,
    options: &OverlapOptions,
) -> Vec<Metric> {
    let index = SpatialIndex::new(
        features.iter().enumerate()
            .filter_map(|(i, f)| f.bbox().filter(|_| f.polygons().is_some()).map(|b| (i, b)))
    );

    levels(sketch, options.include_children).into_iter()
        .map(|level| {
            let value = level.shape.as_ref()
                .map_or(0.0, |shape| covered_area(shape, features, &index, options));
            level_metric(metric_id, class_id, level.sketch, value)
        })
        .collect()
}

/// Sum of intersection areas, visiting candidates in input order.
fn covered_area(shape: &MultiPolygon<f64>, features: &[&Feature], index: &SpatialIndex, options: &OverlapOptions) -> f64 {
    let Some(rect) = shape.bounding_rect() else { return 0.0 };

    index.candidates(&rect, (0.0, 0.0)).into_iter()
        .filter_map(|i| features[i].polygons())
        .map(|polygons| {
            let clipped = shape.intersection(&*polygons);
            if clipped.0.is_empty() { 0.0 } else { options.area_method.area(&clipped) }
        })
        .fold(0.0, |total, area| total + area)
}
