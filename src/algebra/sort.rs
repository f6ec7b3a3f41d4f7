use std::cmp::Ordering;

use crate::metric::{Metric, MetricGroup};

/// Rank of a class id: null first, then the group's class order, then
/// unknown classes by name.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum ClassRank<'a> {
    Null,
    Known(usize),
    Unknown(&'a str),
}

fn class_rank<'a>(class_id: Option<&'a str>, group: Option<&MetricGroup>) -> ClassRank<'a> {
    match (class_id, group) {
        (None, _) => ClassRank::Null,
        (Some(id), Some(group)) => group.class_index(id).map_or(ClassRank::Unknown(id), ClassRank::Known),
        (Some(id), None) => ClassRank::Unknown(id),
    }
}

/// Total order on metrics: metricId, class (in group order when a group is
/// given), sketchId, groupId, geographyId. Null ids sort first.
pub fn compare_metrics(a: &Metric, b: &Metric, group: Option<&MetricGroup>) -> Ordering {
    a.metric_id.cmp(&b.metric_id)
        .then_with(|| class_rank(a.class_id(), group).cmp(&class_rank(b.class_id(), group)))
        .then_with(|| a.sketch_id().cmp(&b.sketch_id()))
        .then_with(|| a.group_id().cmp(&b.group_id()))
        .then_with(|| a.geography_id().cmp(&b.geography_id()))
}

/// Sort metrics deterministically. The sort is stable, so metrics with equal
/// keys keep their input order.
pub fn sort_metrics(mut metrics: Vec<Metric>, group: Option<&MetricGroup>) -> Vec<Metric> {
    metrics.sort_by(|a, b| compare_metrics(a, b, group));
    metrics
}

#[cfg(test)]
mod tests {
    use crate::metric::{DataClass, MetricGroupType};

    use super::*;

    fn nests() -> MetricGroup {
        MetricGroup::new("nests", MetricGroupType::SumOverlap, vec![
            DataClass::new("tjeld", "Oystercatcher"),
            DataClass::new("svartbak", "Great black-backed gull"),
            DataClass::new("makrellterne", "Common tern"),
        ])
    }

    fn metric(metric_id: &str, class_id: &str, sketch_id: &str) -> Metric {
        Metric::new(metric_id, 0.0).with_class_id(class_id).with_sketch_id(sketch_id)
    }

    fn ids(metrics: &[Metric]) -> Vec<String> {
        metrics.iter()
            .map(|m| format!("{}/{}/{}", m.metric_id, m.class_id().unwrap_or("-"), m.sketch_id().unwrap_or("-")))
            .collect()
    }

    #[test]
    fn classes_follow_group_order() {
        let metrics = vec![
            metric("nestsPerc", "tjeld", "a"),
            metric("nests", "makrellterne", "a"),
            metric("nests", "tjeld", "b"),
            metric("nests", "tjeld", "a"),
            metric("nests", "svartbak", "a"),
        ];

        let sorted = sort_metrics(metrics, Some(&nests()));
        assert_eq!(ids(&sorted), [
            "nests/tjeld/a", "nests/tjeld/b", "nests/svartbak/a", "nests/makrellterne/a", "nestsPerc/tjeld/a",
        ]);
    }

    #[test]
    fn unknown_classes_sort_after_known_and_null_first() {
        let metrics = vec![
            metric("nests", "zzz", "a"),
            metric("nests", "aaa", "a"),
            metric("nests", "makrellterne", "a"),
            Metric::new("nests", 0.0).with_sketch_id("a"),
        ];

        let sorted = sort_metrics(metrics, Some(&nests()));
        assert_eq!(ids(&sorted), ["nests/-/a", "nests/makrellterne/a", "nests/aaa/a", "nests/zzz/a"]);
    }

    #[test]
    fn every_permutation_sorts_the_same() {
        let base = vec![
            metric("nests", "svartbak", "b"),
            metric("nests", "tjeld", "b"),
            metric("nests", "svartbak", "a"),
            metric("nests", "tjeld", "a"),
        ];
        let expected = ids(&sort_metrics(base.clone(), Some(&nests())));

        // Rotations and reversal cover the distinct orders that matter here.
        for shift in 0..base.len() {
            let mut input = base.clone();
            input.rotate_left(shift);
            assert_eq!(ids(&sort_metrics(input.clone(), Some(&nests()))), expected);
            input.reverse();
            assert_eq!(ids(&sort_metrics(input, Some(&nests()))), expected);
        }
    }

    #[test]
    fn without_group_classes_sort_by_name() {
        let sorted = sort_metrics(vec![metric("m", "b", "x"), metric("m", "a", "x")], None);
        assert_eq!(ids(&sorted), ["m/a/x", "m/b/x"]);
    }
}
