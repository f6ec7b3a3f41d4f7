use std::path::Path;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::ReportError,
    geom::AreaMethod,
    metric::{DataClass, Metric, MetricGroup, MetricGroupType},
    objective::Objective,
    source::{DatasourceSource, DiskSource},
};

use super::{Datasource, Geography, DEFAULT_BOUNDARY_GROUP};

/// Project-wide settings from `basic.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicSettings {
    #[serde(default)]
    pub area_method: AreaMethod,
}

/// Static project configuration: datasources, metric groups, geographies,
/// objectives and precalculated totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    basic: BasicSettings,
    datasources: Vec<Datasource>,
    metric_groups: Vec<MetricGroup>,
    geographies: Vec<Geography>,
    objectives: Vec<Objective>,
    precalc: Vec<Metric>,
}

impl Project {
    pub fn new(basic: BasicSettings) -> Self {
        Self { basic, ..Self::default() }
    }

    pub fn with_datasource(mut self, datasource: Datasource) -> Self {
        self.datasources.push(datasource);
        self
    }

    pub fn with_metric_group(mut self, group: MetricGroup) -> Self {
        self.metric_groups.push(group);
        self
    }

    pub fn with_geography(mut self, geography: Geography) -> Self {
        self.geographies.push(geography);
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objectives.push(objective);
        self
    }

    pub fn with_precalc(mut self, precalc: impl IntoIterator<Item = Metric>) -> Self {
        self.precalc.extend(precalc);
        self
    }

    /// Load a project directory (`basic.json`, `datasources.json`,
    /// `metrics.json`, `geographies.json` and optionally `objectives.json`
    /// and `precalc.json`).
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::from_source(&DiskSource::new(path))
            .with_context(|| format!("load project from {}", path.display()))
    }

    /// Load the project files from `source`.
    pub fn from_source(source: &dyn DatasourceSource) -> Result<Self> {
        let project = Self {
            basic: read_json(source, "basic.json")?,
            datasources: read_json(source, "datasources.json")?,
            metric_groups: read_json(source, "metrics.json")?,
            geographies: read_json(source, "geographies.json")?,
            objectives: if source.has("objectives.json") { read_json(source, "objectives.json")? } else { Vec::new() },
            precalc: if source.has("precalc.json") { read_json(source, "precalc.json")? } else { Vec::new() },
        };

        for group in &project.metric_groups {
            group.validate()?;
            project.metric_group_objectives(group)?;
        }

        debug!(
            "Loaded project: {} datasources, {} metric groups, {} geographies, {} objectives, {} precalc metrics",
            project.datasources.len(), project.metric_groups.len(), project.geographies.len(),
            project.objectives.len(), project.precalc.len(),
        );
        Ok(project)
    }

    #[inline] pub fn basic(&self) -> &BasicSettings { &self.basic }

    #[inline] pub fn area_method(&self) -> AreaMethod { self.basic.area_method }

    #[inline] pub fn datasources(&self) -> &[Datasource] { &self.datasources }

    #[inline] pub fn metric_groups(&self) -> &[MetricGroup] { &self.metric_groups }

    #[inline] pub fn geographies(&self) -> &[Geography] { &self.geographies }

    #[inline] pub fn objectives(&self) -> &[Objective] { &self.objectives }

    #[inline] pub fn precalc(&self) -> &[Metric] { &self.precalc }

    pub fn metric_group(&self, metric_id: &str) -> Result<&MetricGroup, ReportError> {
        self.metric_groups.iter()
            .find(|g| g.metric_id == metric_id)
            .ok_or_else(|| ReportError::config(format!("unknown metric group '{metric_id}'")))
    }

    pub fn datasource(&self, datasource_id: &str) -> Result<&Datasource, ReportError> {
        self.datasources.iter()
            .find(|d| d.datasource_id == datasource_id)
            .ok_or_else(|| ReportError::config(format!("unknown datasource '{datasource_id}'")))
    }

    pub fn objective(&self, objective_id: &str) -> Result<&Objective, ReportError> {
        self.objectives.iter()
            .find(|o| o.objective_id == objective_id)
            .ok_or_else(|| ReportError::config(format!("unknown objective '{objective_id}'")))
    }

    /// Objectives referenced by `group` or its classes, in first-use order.
    pub fn metric_group_objectives(&self, group: &MetricGroup) -> Result<Vec<&Objective>, ReportError> {
        let mut objectives: Vec<&Objective> = Vec::new();
        for class in &group.classes {
            let Some(id) = group.class_objective_id(class) else { continue };
            if objectives.iter().any(|o| o.objective_id == id) { continue }
            objectives.push(self.objective(id)?);
        }
        Ok(objectives)
    }

    /// Datasource bound to `class` of `group`.
    pub fn class_datasource(&self, group: &MetricGroup, class: &DataClass) -> Result<&Datasource, ReportError> {
        let id = group.class_datasource_id(class).ok_or_else(|| ReportError::config(format!(
            "metric group '{}' has no datasource for class '{}'", group.metric_id, class.class_id
        )))?;
        self.datasource(id)
    }

    /// The geography with `geography_id`, or without one the first geography
    /// in `fallback_group` (default "default-boundary").
    pub fn geography_by_id(&self, geography_id: Option<&str>, fallback_group: Option<&str>) -> Result<&Geography, ReportError> {
        match geography_id {
            Some(id) => self.geographies.iter()
                .find(|g| g.geography_id == id)
                .ok_or_else(|| ReportError::config(format!("unknown geography '{id}'"))),
            None => {
                let group = fallback_group.unwrap_or(DEFAULT_BOUNDARY_GROUP);
                self.geographies.iter()
                    .find(|g| g.in_group(group))
                    .ok_or_else(|| ReportError::config(format!("no geography in group '{group}'")))
            }
        }
    }

    /// Regional totals for `group` in one geography, re-keyed onto the group's
    /// metric id and class ids. Classes without a total are left out.
    ///
    /// Totals are stored per datasource as `<datasourceId>-<classId>`, or
    /// `<datasourceId>-total` for classes that select no subset.
    pub fn precalc_metrics(&self, group: &MetricGroup, stat: Option<&str>, geography_id: &str) -> Vec<Metric> {
        let stat = stat.unwrap_or(group.precalc_stat());

        group.classes.iter()
            .filter_map(|class| {
                let datasource_id = group.class_datasource_id(class)?;
                let subset = if group.class_key(class).is_some() || group.ty == MetricGroupType::RasterClassOverlap {
                    class.class_id.as_str()
                } else {
                    "total"
                };
                let precalc_class_id = format!("{datasource_id}-{subset}");

                let total = self.precalc.iter().find(|m| {
                    m.metric_id == stat
                        && m.class_id() == Some(precalc_class_id.as_str())
                        && m.geography_id() == Some(geography_id)
                })?;

                Some(Metric::new(&group.metric_id, total.value)
                    .with_class_id(&class.class_id)
                    .with_geography_id(geography_id))
            })
            .collect()
    }
}

fn read_json<T: DeserializeOwned>(source: &dyn DatasourceSource, name: &str) -> Result<T> {
    let bytes = source.get(name)?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse {name}"))
}
