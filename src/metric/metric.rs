use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identity of a metric within a collection: two metrics with the same key
/// describe the same quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetricKey {
    pub metric_id: String,
    pub class_id: Option<String>,
    pub group_id: Option<String>,
    pub geography_id: Option<String>,
    pub sketch_id: Option<String>,
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |v: &Option<String>| v.clone().unwrap_or_else(|| "null".into());
        write!(f, "{}|{}|{}|{}|{}",
            self.metric_id,
            part(&self.class_id),
            part(&self.group_id),
            part(&self.geography_id),
            part(&self.sketch_id),
        )
    }
}

/// A single computed value for one (metric, class, sketch) triple.
///
/// An absent value (e.g. a percent with no regional total to divide by) is
/// stored as NaN, serialized as JSON `null` and read back as absent. Two
/// absent values compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub metric_id: String,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub sketch_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub geography_id: Option<String>,
    #[serde(deserialize_with = "absent_as_nan")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Map<String, Value>>,
}

fn absent_as_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Metric {
    /// Create a metric with no class, sketch, group or geography.
    pub fn new(metric_id: impl Into<String>, value: f64) -> Self {
        Self {
            metric_id: metric_id.into(),
            class_id: None,
            sketch_id: None,
            group_id: None,
            geography_id: None,
            value,
            extra: None,
        }
    }

    /// A metric whose value is absent.
    pub fn absent(metric_id: impl Into<String>) -> Self { Self::new(metric_id, f64::NAN) }

    pub fn with_class_id(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    pub fn with_sketch_id(mut self, sketch_id: impl Into<String>) -> Self {
        self.sketch_id = Some(sketch_id.into());
        self
    }

    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_geography_id(mut self, geography_id: impl Into<String>) -> Self {
        self.geography_id = Some(geography_id.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.get_or_insert_with(Map::new).insert(key.into(), value.into());
        self
    }

    /// True if this metric carries no value.
    #[inline] pub fn is_absent(&self) -> bool { self.value.is_nan() }

    /// The value, or `None` if absent.
    #[inline] pub fn value(&self) -> Option<f64> { (!self.is_absent()).then_some(self.value) }

    #[inline] pub fn class_id(&self) -> Option<&str> { self.class_id.as_deref() }

    #[inline] pub fn sketch_id(&self) -> Option<&str> { self.sketch_id.as_deref() }

    #[inline] pub fn group_id(&self) -> Option<&str> { self.group_id.as_deref() }

    #[inline] pub fn geography_id(&self) -> Option<&str> { self.geography_id.as_deref() }

    /// Synthetic identity key for grouping.
    pub fn key(&self) -> MetricKey {
        MetricKey {
            metric_id: self.metric_id.clone(),
            class_id: self.class_id.clone(),
            group_id: self.group_id.clone(),
            geography_id: self.geography_id.clone(),
            sketch_id: self.sketch_id.clone(),
        }
    }
}

impl PartialEq for Metric {
    fn eq(&self, other: &Self) -> bool {
        self.metric_id == other.metric_id
            && self.class_id == other.class_id
            && self.sketch_id == other.sketch_id
            && self.group_id == other.group_id
            && self.geography_id == other.geography_id
            && self.value() == other.value()
            && self.extra == other.extra
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "Metric({} = {})", self.key(), value),
            None => write!(f, "Metric({} = N/A)", self.key()),
        }
    }
}

/// Output of a report computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub metrics: Vec<Metric>,
}

impl ReportResult {
    pub fn new(metrics: Vec<Metric>) -> Self { Self { metrics } }

    /// Metrics with the given metric id, in result order.
    pub fn with_metric_id<'a>(&'a self, metric_id: &'a str) -> impl Iterator<Item = &'a Metric> + 'a {
        self.metrics.iter().filter(move |m| m.metric_id == metric_id)
    }
}
