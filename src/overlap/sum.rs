use geo::{BoundingRect, Geometry, Intersects, MultiPolygon};
use tracing::debug;

use crate::{feature::Feature, geom::SpatialIndex, metric::Metric, sketch::Sketch};

use super::{levels, level_metric, OverlapOptions};

/// What to add up for each qualifying feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SumOptions {
    /// Numeric property to sum; `None` counts features.
    pub sum_property: Option<String>,
    /// Features within this many meters of the sketch also qualify.
    pub within_distance: Option<f64>,
}

impl SumOptions {
    /// Count features intersecting the sketch.
    pub fn count() -> Self { Self::default() }

    pub fn sum(property: impl Into<String>) -> Self {
        Self { sum_property: Some(property.into()), within_distance: None }
    }

    pub fn within(mut self, meters: f64) -> Self {
        self.within_distance = Some(meters);
        self
    }

    #[inline] fn distance(&self) -> f64 { self.within_distance.unwrap_or(0.0).max(0.0) }
}

/// Sum (or count) of features intersecting or near each sketch level.
///
/// `features` must already be filtered to the class. Contributions are added
/// in input order.
pub fn overlap_sum(
    metric_id: &str,
    class_id: Option<&str>,
    features: &[&Feature],
    sketch: &Sketch,
    sum: &SumOptions,
    options: &OverlapOptions,
) -> Vec<Metric> {
    let index = SpatialIndex::new(
        features.iter().enumerate()
            .filter_map(|(i, f)| f.bbox().map(|b| (i, b)))
    );

    levels(sketch, options.include_children).into_iter()
        .map(|level| {
            let value = level.shape.as_ref()
                .map_or(0.0, |shape| sum_within(shape, features, &index, sum, options));
            level_metric(metric_id, class_id, level.sketch, value)
        })
        .collect()
}

fn sum_within(
    shape: &MultiPolygon<f64>,
    features: &[&Feature],
    index: &SpatialIndex,
    sum: &SumOptions,
    options: &OverlapOptions,
) -> f64 {
    let Some(rect) = shape.bounding_rect() else { return 0.0 };
    let distance = sum.distance();
    let pad = options.area_method.padding(&rect, distance);

    index.candidates(&rect, pad).into_iter()
        .map(|i| features[i])
        .filter(|feature| feature.geometry()
            .is_some_and(|geometry| qualifies(geometry, shape, distance, options)))
        .map(|feature| contribution(feature, sum))
        .fold(0.0, |total, value| total + value)
}

fn qualifies(geometry: &Geometry<f64>, shape: &MultiPolygon<f64>, distance: f64, options: &OverlapOptions) -> bool {
    if geometry.intersects(shape) { return true }
    if distance <= 0.0 { return false }

    options.area_method.distance_between(geometry, shape) <= distance
}

fn contribution(feature: &Feature, sum: &SumOptions) -> f64 {
    let Some(property) = sum.sum_property.as_deref() else { return 1.0 };

    match feature.property_f64(property) {
        Some(value) => value,
        None => {
            debug!("Feature has no numeric '{property}' value; counting it as 0");
            0.0
        }
    }
}
