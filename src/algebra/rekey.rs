use crate::metric::Metric;

/// Normalize the identity of every metric so equal keys mean equal quantities.
///
/// Empty-string ids become null and an empty `extra` is dropped. Order is
/// preserved and rekeying twice changes nothing.
pub fn rekey_metrics(metrics: Vec<Metric>) -> Vec<Metric> {
    metrics.into_iter().map(rekey_metric).collect()
}

/// Normalize a single metric's identity.
pub fn rekey_metric(mut metric: Metric) -> Metric {
    for id in [&mut metric.class_id, &mut metric.sketch_id, &mut metric.group_id, &mut metric.geography_id] {
        if id.as_deref().is_some_and(str::is_empty) { *id = None }
    }
    if metric.extra.as_ref().is_some_and(|extra| extra.is_empty()) {
        metric.extra = None;
    }
    metric
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::*;

    #[test]
    fn blank_ids_become_null() {
        let mut metric = Metric::new("sand", 1.0).with_class_id("").with_sketch_id("mpa").with_group_id("");
        metric.extra = Some(Map::new());

        let rekeyed = rekey_metric(metric);
        assert_eq!(rekeyed.class_id(), None);
        assert_eq!(rekeyed.group_id(), None);
        assert_eq!(rekeyed.sketch_id(), Some("mpa"));
        assert!(rekeyed.extra.is_none());
        assert_eq!(rekeyed.key().to_string(), "sand|null|null|null|mpa");
    }

    #[test]
    fn rekey_is_idempotent() {
        let metrics = vec![
            Metric::new("sand", 1.0).with_class_id("").with_sketch_id("a"),
            Metric::absent("sandPerc").with_class_id("sand").with_geography_id(""),
            Metric::new("sand", 2.0).with_extra("note", "kept"),
        ];

        let once = rekey_metrics(metrics);
        let twice = rekey_metrics(once.clone());
        assert_eq!(once, twice);
    }
}
