use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// How a metric group's raw values are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricGroupType {
    /// Intersection area (m²) with polygon features.
    AreaOverlap,
    /// Number of features intersecting (or near) the sketch.
    CountOverlap,
    /// Sum of a numeric feature property over intersecting (or near) features.
    SumOverlap,
    /// Number of raster cells per class value inside the sketch.
    RasterClassOverlap,
    /// Min/max/mean of raster values inside the sketch.
    RasterStats,
}

impl MetricGroupType {
    /// Statistic name used for this type's precalculated totals.
    pub fn default_precalc_stat(&self) -> &'static str {
        match self {
            MetricGroupType::AreaOverlap => "area",
            MetricGroupType::CountOverlap => "count",
            MetricGroupType::SumOverlap => "sum",
            MetricGroupType::RasterClassOverlap | MetricGroupType::RasterStats => "valid",
        }
    }

    /// True for types computed from raster datasources.
    #[inline]
    pub fn is_raster(&self) -> bool {
        matches!(self, MetricGroupType::RasterClassOverlap | MetricGroupType::RasterStats)
    }
}

impl fmt::Display for MetricGroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricGroupType::AreaOverlap => write!(f, "areaOverlap"),
            MetricGroupType::CountOverlap => write!(f, "countOverlap"),
            MetricGroupType::SumOverlap => write!(f, "sumOverlap"),
            MetricGroupType::RasterClassOverlap => write!(f, "rasterClassOverlap"),
            MetricGroupType::RasterStats => write!(f, "rasterStats"),
        }
    }
}

/// A named sub-category of a metric group, e.g. one habitat type or species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataClass {
    pub class_id: String,
    #[serde(default)]
    pub display: String,
    /// Overrides the group's datasource for this class.
    #[serde(default)]
    pub datasource_id: Option<String>,
    /// Overrides the group's class key for this class.
    #[serde(default)]
    pub class_key: Option<String>,
    #[serde(default)]
    pub layer_id: Option<String>,
    /// Raster cell value identifying this class.
    #[serde(default)]
    pub numeric_value: Option<f64>,
    /// Overrides the group's objective for this class.
    #[serde(default)]
    pub objective_id: Option<String>,
}

impl DataClass {
    pub fn new(class_id: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            display: display.into(),
            datasource_id: None,
            class_key: None,
            layer_id: None,
            numeric_value: None,
            objective_id: None,
        }
    }

    pub fn with_datasource(mut self, datasource_id: impl Into<String>) -> Self {
        self.datasource_id = Some(datasource_id.into());
        self
    }

    pub fn with_class_key(mut self, class_key: impl Into<String>) -> Self {
        self.class_key = Some(class_key.into());
        self
    }

    pub fn with_numeric_value(mut self, value: f64) -> Self {
        self.numeric_value = Some(value);
        self
    }

    pub fn with_objective(mut self, objective_id: impl Into<String>) -> Self {
        self.objective_id = Some(objective_id.into());
        self
    }
}

/// Static configuration for one report topic.
///
/// The order of `classes` is the canonical display and sort order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricGroup {
    pub metric_id: String,
    #[serde(rename = "type")]
    pub ty: MetricGroupType,
    pub classes: Vec<DataClass>,
    #[serde(default)]
    pub datasource_id: Option<String>,
    #[serde(default)]
    pub class_key: Option<String>,
    #[serde(default)]
    pub layer_id: Option<String>,
    /// Feature property summed by `sumOverlap` groups.
    #[serde(default)]
    pub sum_property: Option<String>,
    /// Features within this distance (meters) of the sketch also qualify.
    #[serde(default)]
    pub within_distance: Option<f64>,
    #[serde(default)]
    pub precalc_stat: Option<String>,
    #[serde(default)]
    pub objective_id: Option<String>,
}

impl MetricGroup {
    pub fn new(metric_id: impl Into<String>, ty: MetricGroupType, classes: Vec<DataClass>) -> Self {
        Self {
            metric_id: metric_id.into(),
            ty,
            classes,
            datasource_id: None,
            class_key: None,
            layer_id: None,
            sum_property: None,
            within_distance: None,
            precalc_stat: None,
            objective_id: None,
        }
    }

    pub fn with_datasource(mut self, datasource_id: impl Into<String>) -> Self {
        self.datasource_id = Some(datasource_id.into());
        self
    }

    pub fn with_class_key(mut self, class_key: impl Into<String>) -> Self {
        self.class_key = Some(class_key.into());
        self
    }

    pub fn with_within_distance(mut self, meters: f64) -> Self {
        self.within_distance = Some(meters);
        self
    }

    pub fn with_sum_property(mut self, property: impl Into<String>) -> Self {
        self.sum_property = Some(property.into());
        self
    }

    pub fn with_objective(mut self, objective_id: impl Into<String>) -> Self {
        self.objective_id = Some(objective_id.into());
        self
    }

    /// Metric id used for percent-of-total metrics, e.g. "sizePerc".
    #[inline] pub fn perc_metric_id(&self) -> String { format!("{}Perc", self.metric_id) }

    /// Statistic name of the precalculated totals for this group.
    #[inline]
    pub fn precalc_stat(&self) -> &str {
        self.precalc_stat.as_deref().unwrap_or(self.ty.default_precalc_stat())
    }

    #[inline]
    pub fn class(&self, class_id: &str) -> Option<&DataClass> {
        self.classes.iter().find(|c| c.class_id == class_id)
    }

    /// Position of `class_id` in the canonical class order.
    #[inline]
    pub fn class_index(&self, class_id: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.class_id == class_id)
    }

    /// Datasource bound to `class`, falling back to the group-level datasource.
    #[inline]
    pub fn class_datasource_id<'a>(&'a self, class: &'a DataClass) -> Option<&'a str> {
        class.datasource_id.as_deref().or(self.datasource_id.as_deref())
    }

    /// Property key selecting members of `class`, if features are classified.
    #[inline]
    pub fn class_key<'a>(&'a self, class: &'a DataClass) -> Option<&'a str> {
        class.class_key.as_deref().or(self.class_key.as_deref())
    }

    /// Objective of `class`, falling back to the group's.
    pub fn class_objective_id<'a>(&'a self, class: &'a DataClass) -> Option<&'a str> {
        class.objective_id.as_deref().or(self.objective_id.as_deref())
    }

    /// Check structural invariants: at least one class, unique class ids,
    /// and a datasource for every class.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.classes.is_empty() {
            return Err(ReportError::config(format!("metric group '{}' has no classes", self.metric_id)));
        }

        let mut seen = AHashSet::new();
        for class in &self.classes {
            if !seen.insert(class.class_id.as_str()) {
                return Err(ReportError::config(format!(
                    "metric group '{}' lists class '{}' more than once", self.metric_id, class.class_id
                )));
            }
            if self.class_datasource_id(class).is_none() {
                return Err(ReportError::config(format!(
                    "metric group '{}' has no datasource for class '{}'", self.metric_id, class.class_id
                )));
            }
        }

        Ok(())
    }
}
