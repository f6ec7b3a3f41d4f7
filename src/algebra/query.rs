use crate::metric::Metric;

/// Metrics belonging to any of `sketch_ids`, in input order.
pub fn metrics_with_sketch_id<'a>(metrics: &'a [Metric], sketch_ids: &[&str]) -> Vec<&'a Metric> {
    metrics.iter()
        .filter(|m| m.sketch_id().is_some_and(|id| sketch_ids.contains(&id)))
        .collect()
}

/// First metric (input order) matching `predicate`.
pub fn first_matching_metric(metrics: &[Metric], predicate: impl Fn(&Metric) -> bool) -> Option<&Metric> {
    metrics.iter().find(|&m| predicate(m))
}
