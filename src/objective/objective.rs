use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::ReportError,
    metric::{Metric, MetricGroup},
};

/// Which metric an objective's target applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectiveMeasure {
    /// Fraction of the regional total, read from the group's percent metrics.
    #[default]
    Percent,
    /// Raw metric value that must be exceeded, e.g. a minimum size in m².
    MinimumValue,
}

/// A planning target, e.g. "30% of the park in no-take MPAs".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub objective_id: String,
    #[serde(default)]
    pub short_desc: String,
    pub target: f64,
    #[serde(default)]
    pub measure: ObjectiveMeasure,
}

impl Objective {
    /// Objective met when the percent metric reaches `target` (a fraction).
    pub fn percent(objective_id: impl Into<String>, short_desc: impl Into<String>, target: f64) -> Self {
        Self {
            objective_id: objective_id.into(),
            short_desc: short_desc.into(),
            target,
            measure: ObjectiveMeasure::Percent,
        }
    }

    /// Objective met when the raw metric value exceeds `target`.
    pub fn minimum_value(objective_id: impl Into<String>, short_desc: impl Into<String>, target: f64) -> Self {
        Self { measure: ObjectiveMeasure::MinimumValue, ..Self::percent(objective_id, short_desc, target) }
    }

    /// Metric id this objective reads within `group`.
    pub fn metric_id(&self, group: &MetricGroup) -> String {
        match self.measure {
            ObjectiveMeasure::Percent => group.perc_metric_id(),
            ObjectiveMeasure::MinimumValue => group.metric_id.clone(),
        }
    }

    pub fn status(&self, value: Option<f64>) -> ObjectiveStatus {
        let Some(value) = value else { return ObjectiveStatus::Unknown };
        let met = match self.measure {
            ObjectiveMeasure::Percent => value >= self.target,
            ObjectiveMeasure::MinimumValue => value > self.target,
        };
        if met { ObjectiveStatus::Met } else { ObjectiveStatus::NotMet }
    }
}

/// Attainment of one objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectiveStatus {
    Met,
    NotMet,
    /// The value is absent, e.g. no regional total.
    Unknown,
}

/// Objective status for one (class, sketch) metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveResult {
    pub objective_id: String,
    pub metric_id: String,
    pub class_id: Option<String>,
    pub sketch_id: Option<String>,
    pub value: Option<f64>,
    pub target: f64,
    pub status: ObjectiveStatus,
}

/// Evaluate the objectives of `group` against `metrics`, in metric order.
///
/// Each class uses its own objective or else the group's. Only plain
/// per-class metrics (no group id) with the metric id the objective reads
/// are evaluated. An objective id missing from `objectives` is a
/// configuration error.
pub fn evaluate_objectives(
    group: &MetricGroup,
    objectives: &[&Objective],
    metrics: &[Metric],
) -> Result<Vec<ObjectiveResult>, ReportError> {
    let mut results = Vec::new();

    for metric in metrics.iter().filter(|m| m.group_id.is_none()) {
        let Some(class) = metric.class_id().and_then(|id| group.class(id)) else { continue };
        let Some(objective_id) = group.class_objective_id(class) else { continue };

        let objective = objectives.iter()
            .find(|o| o.objective_id == objective_id)
            .ok_or_else(|| ReportError::config(format!(
                "metric group '{}' refers to unknown objective '{objective_id}'", group.metric_id
            )))?;
        if metric.metric_id != objective.metric_id(group) { continue }

        results.push(ObjectiveResult {
            objective_id: objective.objective_id.clone(),
            metric_id: metric.metric_id.clone(),
            class_id: metric.class_id.clone(),
            sketch_id: metric.sketch_id.clone(),
            value: metric.value(),
            target: objective.target,
            status: objective.status(metric.value()),
        });
    }

    debug!("Evaluated {} objective results for {}", results.len(), group.metric_id);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use crate::metric::{DataClass, MetricGroupType};

    use super::*;

    fn size_group() -> MetricGroup {
        MetricGroup::new("size", MetricGroupType::AreaOverlap, vec![
            DataClass::new("boundary", "Raet NP"),
            DataClass::new("core", "Core zone").with_objective("minSize"),
        ])
        .with_datasource("boundary")
        .with_objective("protection")
    }

    #[test]
    fn status_compares_against_target() {
        let protection = Objective::percent("protection", "30% protected", 0.3);
        assert_eq!(protection.status(Some(0.3)), ObjectiveStatus::Met);
        assert_eq!(protection.status(Some(0.05)), ObjectiveStatus::NotMet);
        assert_eq!(protection.status(None), ObjectiveStatus::Unknown);

        // A minimum size has to be exceeded, not just reached.
        let min_size = Objective::minimum_value("minSize", "12 km² minimum", 12_000_000.0);
        assert_eq!(min_size.status(Some(14_000_000.0)), ObjectiveStatus::Met);
        assert_eq!(min_size.status(Some(12_000_000.0)), ObjectiveStatus::NotMet);
    }

    #[test]
    fn classes_fall_back_to_the_group_objective() {
        let group = size_group();
        let protection = Objective::percent("protection", "30% protected", 0.3);
        let min_size = Objective::minimum_value("minSize", "12 km² minimum", 12_000_000.0);
        let metrics = [
            Metric::new("size", 14_000_000.0).with_class_id("boundary").with_sketch_id("mpa"),
            Metric::new("size", 14_000_000.0).with_class_id("core").with_sketch_id("mpa"),
            Metric::new("sizePerc", 0.05).with_class_id("boundary").with_sketch_id("mpa"),
            Metric::absent("sizePerc").with_class_id("core").with_sketch_id("mpa"),
            Metric::new("sizePerc", 0.9).with_class_id("boundary").with_sketch_id("mpa").with_group_id("zoneA"),
        ];

        let results = evaluate_objectives(&group, &[&protection, &min_size], &metrics).unwrap();
        let rows = results.iter()
            .map(|r| (r.objective_id.as_str(), r.metric_id.as_str(), r.class_id.as_deref().unwrap(), r.status))
            .collect::<Vec<_>>();
        assert_eq!(rows, [
            ("minSize", "size", "core", ObjectiveStatus::Met),
            ("protection", "sizePerc", "boundary", ObjectiveStatus::NotMet),
        ]);
    }

    #[test]
    fn unknown_objective_is_a_configuration_error() {
        let group = size_group();
        let metrics = [Metric::new("sizePerc", 0.5).with_class_id("boundary")];

        let result = evaluate_objectives(&group, &[], &metrics);
        assert!(matches!(result, Err(ReportError::Configuration(_))));
    }

    #[test]
    fn results_serialize_in_camel_case() {
        let group = size_group();
        let protection = Objective::percent("protection", "30% protected", 0.3);
        let metrics = [Metric::new("sizePerc", 0.31).with_class_id("boundary").with_sketch_id("mpa")];

        let results = evaluate_objectives(&group, &[&protection], &metrics).unwrap();
        let json = serde_json::to_value(&results[0]).unwrap();
        assert_eq!(json["objectiveId"], "protection");
        assert_eq!(json["status"], "met");

        let parsed: Objective = serde_json::from_str(
            r#"{ "objectiveId": "minSize", "target": 12000000, "measure": "minimumValue" }"#
        ).unwrap();
        assert_eq!(parsed.measure, ObjectiveMeasure::MinimumValue);
        assert_eq!(serde_json::to_value(ObjectiveStatus::NotMet).unwrap(), "notMet");
    }
}
