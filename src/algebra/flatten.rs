use ahash::AHashMap;
use serde::Serialize;

use crate::{metric::{DataClass, Metric}, sketch::SketchProperties};

/// One class value in a flattened row; `None` marks a missing or absent metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassValue {
    pub class_id: String,
    pub value: Option<f64>,
}

/// A sketch with a value for every class, in class order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchClassRow {
    pub sketch_id: String,
    pub sketch_name: String,
    pub values: Vec<ClassValue>,
}

impl SketchClassRow {
    /// Value for `class_id`, if that class is in the row and has a value.
    pub fn value(&self, class_id: &str) -> Option<f64> {
        self.values.iter().find(|v| v.class_id == class_id).and_then(|v| v.value)
    }
}

/// One row per sketch (input order), each with every class (class order).
///
/// The first metric for a (sketch, class) pair wins. Sketches without metrics
/// still get a row; classes not in `classes` are ignored.
pub fn flatten_by_sketch_all_class(
    metrics: &[Metric],
    classes: &[DataClass],
    sketches: &[SketchProperties],
) -> Vec<SketchClassRow> {
    let mut lookup: AHashMap<(&str, &str), &Metric> = AHashMap::new();
    for metric in metrics {
        if let (Some(sketch_id), Some(class_id)) = (metric.sketch_id(), metric.class_id()) {
            lookup.entry((sketch_id, class_id)).or_insert(metric);
        }
    }

    sketches.iter()
        .map(|sketch| SketchClassRow {
            sketch_id: sketch.id.clone(),
            sketch_name: sketch.name.clone(),
            values: classes.iter()
                .map(|class| ClassValue {
                    class_id: class.class_id.clone(),
                    value: lookup.get(&(sketch.id.as_str(), class.class_id.as_str())).and_then(|m| m.value()),
                })
                .collect(),
        })
        .collect()
}
