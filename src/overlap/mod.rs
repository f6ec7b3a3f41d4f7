//! Raw overlap between a sketch (or collection) and classified reference data.
//!
//! Every function here reports one metric per sketch level: each child of a
//! collection (when `include_children` is set) and the collection itself,
//! whose value is computed once against the union of its children.

mod area;
mod raster;
mod sum;

pub use area::overlap_area;
pub use raster::{depth_stats, overlap_raster_class, overlap_raster_stats};
pub use sum::{overlap_sum, SumOptions};

use geo::MultiPolygon;

use crate::{geom::AreaMethod, metric::Metric, sketch::{union_of_children, Sketch}};

/// Options shared by all overlap modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapOptions {
    pub area_method: AreaMethod,
    /// Also report every child of a collection.
    pub include_children: bool,
}

impl Default for OverlapOptions {
    fn default() -> Self {
        Self { area_method: AreaMethod::default(), include_children: true }
    }
}

impl OverlapOptions {
    pub fn new(area_method: AreaMethod) -> Self {
        Self { area_method, ..Self::default() }
    }
}

/// One sketch to report on, with the shape used for its overlap.
pub(crate) struct Level<'a> {
    pub sketch: &'a Sketch,
    pub shape: Option<MultiPolygon<f64>>,
}

/// Sketch levels to report, children first (depth first), the outer sketch last.
pub(crate) fn levels(sketch: &Sketch, include_children: bool) -> Vec<Level<'_>> {
    let mut out = Vec::new();
    collect_levels(sketch, include_children, &mut out);
    out
}

fn collect_levels<'a>(sketch: &'a Sketch, include_children: bool, out: &mut Vec<Level<'a>>) {
    if sketch.is_collection() && include_children {
        for child in sketch.children() {
            collect_levels(child, include_children, out);
        }
    }
    out.push(Level { sketch, shape: union_of_children(sketch) });
}

/// Metric for one level with the given class.
pub(crate) fn level_metric(metric_id: &str, class_id: Option<&str>, sketch: &Sketch, value: f64) -> Metric {
    let metric = Metric::new(metric_id, value).with_sketch_id(sketch.id());
    match class_id {
        Some(class_id) => metric.with_class_id(class_id),
        None => metric,
    }
}
