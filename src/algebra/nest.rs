use std::collections::HashMap;

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::metric::Metric;

/// A metric identity field usable as a nesting key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    MetricId,
    ClassId,
    SketchId,
    GroupId,
    GeographyId,
}

impl MetricField {
    /// The field's value on `metric`, `"null"` when unset.
    pub fn value_of<'a>(&self, metric: &'a Metric) -> &'a str {
        let value = match self {
            MetricField::MetricId => Some(metric.metric_id.as_str()),
            MetricField::ClassId => metric.class_id(),
            MetricField::SketchId => metric.sketch_id(),
            MetricField::GroupId => metric.group_id(),
            MetricField::GeographyId => metric.geography_id(),
        };
        value.unwrap_or("null")
    }
}

/// Default nesting path: by sketch, then by metric.
pub const DEFAULT_NEST_PATH: [MetricField; 2] = [MetricField::SketchId, MetricField::MetricId];

/// Metrics grouped by a key path. Branch keys keep first-seen order.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedMetrics {
    Leaf(Vec<Metric>),
    Branch {
        keys: Vec<String>,
        children: HashMap<String, NestedMetrics, ahash::RandomState>,
    },
}

impl NestedMetrics {
    /// Follow `path` down the tree.
    pub fn get(&self, path: &[&str]) -> Option<&NestedMetrics> {
        let Some((first, rest)) = path.split_first() else { return Some(self) };
        match self {
            NestedMetrics::Leaf(_) => None,
            NestedMetrics::Branch { children, .. } => children.get(*first)?.get(rest),
        }
    }

    /// Metrics at `path`, if it ends at a leaf.
    pub fn metrics(&self, path: &[&str]) -> Option<&[Metric]> {
        match self.get(path)? {
            NestedMetrics::Leaf(metrics) => Some(metrics),
            NestedMetrics::Branch { .. } => None,
        }
    }

    /// Keys of a branch in first-seen order; empty for a leaf.
    pub fn keys(&self) -> &[String] {
        match self {
            NestedMetrics::Leaf(_) => &[],
            NestedMetrics::Branch { keys, .. } => keys,
        }
    }
}

/// Group metrics along `path`, e.g. [`DEFAULT_NEST_PATH`]. Leaves keep input
/// order. An empty path yields a single leaf.
pub fn nest_metrics(metrics: &[Metric], path: &[MetricField]) -> NestedMetrics {
    let Some((field, rest)) = path.split_first() else {
        return NestedMetrics::Leaf(metrics.to_vec());
    };

    let mut keys = Vec::new();
    let mut groups: HashMap<&str, Vec<Metric>, ahash::RandomState> = HashMap::default();
    for metric in metrics {
        let key = field.value_of(metric);
        groups.entry(key)
            .or_insert_with(|| { keys.push(key.to_string()); Vec::new() })
            .push(metric.clone());
    }

    let children = keys.iter()
        .map(|key| (key.clone(), nest_metrics(&groups[key.as_str()], rest)))
        .collect();

    NestedMetrics::Branch { keys, children }
}

impl Serialize for NestedMetrics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NestedMetrics::Leaf(metrics) => metrics.serialize(serializer),
            NestedMetrics::Branch { keys, children } => {
                let mut map = serializer.serialize_map(Some(keys.len()))?;
                for key in keys {
                    map.serialize_entry(key, &children[key])?;
                }
                map.end()
            }
        }
    }
}
