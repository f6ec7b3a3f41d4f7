//! Percent of regional totals.

use std::fmt;

use ahash::AHashMap;
use tracing::warn;

use crate::metric::Metric;

/// Raised (not thrown) when a metric has no matching precalculated total.
/// The corresponding percent metric is absent, which is not the same as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTotalWarning {
    pub metric_id: String,
    pub class_id: Option<String>,
    pub sketch_id: Option<String>,
    pub group_id: Option<String>,
}

impl fmt::Display for MissingTotalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f, "no total for metric '{}' class {} (sketch {}, group {})",
            self.metric_id,
            self.class_id.as_deref().unwrap_or("null"),
            self.sketch_id.as_deref().unwrap_or("null"),
            self.group_id.as_deref().unwrap_or("null"),
        )
    }
}

/// Percent metrics in input order, plus a warning for every missing total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PercentMetrics {
    pub metrics: Vec<Metric>,
    pub warnings: Vec<MissingTotalWarning>,
}

/// Express each metric as a fraction of the total with the same class and group.
///
/// A zero total gives `0`. A missing total gives an absent value and a
/// [`MissingTotalWarning`]. The output keeps every id of its input metric
/// except `metric_id`, which becomes `metric_id_override` when given.
pub fn to_percent_metric(metrics: &[Metric], totals: &[Metric], metric_id_override: Option<&str>) -> PercentMetrics {
    // First total wins for a (class, group) pair.
    let mut lookup = AHashMap::with_capacity(totals.len());
    for total in totals {
        lookup.entry((total.class_id(), total.group_id())).or_insert(total.value);
    }

    let mut result = PercentMetrics::default();
    for metric in metrics {
        let mut percent = metric.clone();
        if let Some(id) = metric_id_override {
            percent.metric_id = id.to_string();
        }

        percent.value = match lookup.get(&(metric.class_id(), metric.group_id())) {
            None => {
                let warning = MissingTotalWarning {
                    metric_id: metric.metric_id.clone(),
                    class_id: metric.class_id.clone(),
                    sketch_id: metric.sketch_id.clone(),
                    group_id: metric.group_id.clone(),
                };
                warn!("{warning}");
                result.warnings.push(warning);
                f64::NAN
            }
            Some(_) if metric.is_absent() => f64::NAN,
            Some(&total) if total == 0.0 => 0.0,
            Some(&total) => metric.value / total,
        };

        result.metrics.push(percent);
    }

    result
}
