use std::sync::Arc;

use geo::{Coord, Intersects, Rect};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    algebra::{flatten_by_sketch_all_class, rekey_metrics, sort_metrics, SketchClassRow},
    error::ReportError,
    feature::Feature,
    metric::{DataClass, Metric, MetricGroup, MetricGroupType, ReportResult},
    objective::{evaluate_objectives, ObjectiveResult},
    overlap::{depth_stats, overlap_area, overlap_raster_class, overlap_raster_stats, overlap_sum, OverlapOptions, SumOptions},
    percent::{to_percent_metric, MissingTotalWarning},
    project::{Datasource, DatasourceKind, GeometryKind, Project},
    raster::{DepthStats, Raster},
    sketch::Sketch,
    source::{DatasourceCache, DatasourceSource},
};

/// How a group's raw values are computed.
#[derive(Debug, Clone, PartialEq)]
enum Mode {
    Area,
    Sum(SumOptions),
    RasterClass,
    RasterStats,
}

impl Mode {
    /// Area needs polygons, sums take any vector layer, raster modes need grids.
    fn accepts(&self, kind: DatasourceKind) -> bool {
        match (self, kind) {
            (Mode::Area, DatasourceKind::Vector { geometry_type }) => geometry_type == GeometryKind::Polygon,
            (Mode::Sum(_), DatasourceKind::Vector { .. }) => true,
            (Mode::RasterClass | Mode::RasterStats, DatasourceKind::Raster) => true,
            _ => false,
        }
    }
}

/// Computes one metric group's report for a sketch.
///
/// Each run fetches every datasource URL at most once, computes the classes
/// in parallel and returns the metrics rekeyed and sorted in class order.
pub struct Report<'a> {
    project: &'a Project,
    group: &'a MetricGroup,
    source: &'a dyn DatasourceSource,
    options: OverlapOptions,
}

impl<'a> Report<'a> {
    pub fn new(project: &'a Project, metric_id: &str, source: &'a dyn DatasourceSource) -> Result<Self, ReportError> {
        Ok(Self {
            project,
            group: project.metric_group(metric_id)?,
            source,
            options: OverlapOptions::new(project.area_method()),
        })
    }

    pub fn with_options(mut self, options: OverlapOptions) -> Self {
        self.options = options;
        self
    }

    #[inline] pub fn group(&self) -> &MetricGroup { self.group }

    #[inline] pub fn options(&self) -> &OverlapOptions { &self.options }

    /// Raw metrics for every class and sketch level.
    pub fn run(&self, sketch: &Sketch) -> Result<ReportResult, ReportError> {
        let metrics = self.raw_metrics(sketch)?;
        Ok(ReportResult::new(sort_metrics(rekey_metrics(metrics), Some(self.group))))
    }

    /// Raw metrics plus `<metricId>Perc` metrics against the totals of
    /// `geography_id` (or the default boundary). Classes without a total get
    /// an absent percent and a warning.
    pub fn run_with_percent(
        &self,
        sketch: &Sketch,
        geography_id: Option<&str>,
    ) -> Result<(ReportResult, Vec<MissingTotalWarning>), ReportError> {
        let geography = self.project.geography_by_id(geography_id, None)?;
        let totals = self.project.precalc_metrics(self.group, None, &geography.geography_id);

        let mut metrics = self.raw_metrics(sketch)?;
        let percent = to_percent_metric(&metrics, &totals, Some(self.group.perc_metric_id().as_str()));
        metrics.extend(percent.metrics);

        let result = ReportResult::new(sort_metrics(rekey_metrics(metrics), Some(self.group)));
        Ok((result, percent.warnings))
    }

    /// Objective status for the group's metrics in `metrics`, typically the
    /// output of [`Report::run_with_percent`].
    pub fn objectives(&self, metrics: &[Metric]) -> Result<Vec<ObjectiveResult>, ReportError> {
        let objectives = self.project.metric_group_objectives(self.group)?;
        evaluate_objectives(self.group, &objectives, metrics)
    }

    /// One row per child of a collection (or the sketch itself) with a value
    /// for every class of the group, taken from `metrics` with `metric_id`.
    pub fn child_table(&self, sketch: &Sketch, metrics: &[Metric], metric_id: &str) -> Vec<SketchClassRow> {
        let sketches = if sketch.is_collection() {
            sketch.child_properties()
        } else {
            vec![sketch.properties().clone()]
        };
        let selected = metrics.iter()
            .filter(|m| m.metric_id == metric_id)
            .cloned()
            .collect::<Vec<_>>();

        flatten_by_sketch_all_class(&selected, &self.group.classes, &sketches)
    }

    /// Depth summary per child and for the whole sketch. Requires a
    /// `rasterStats` group; the first class's datasource is used.
    pub fn depth(&self, sketch: &Sketch) -> Result<Vec<DepthStats>, ReportError> {
        if self.group.ty != MetricGroupType::RasterStats {
            return Err(ReportError::config(format!(
                "metric group '{}' is {}, depth needs rasterStats", self.group.metric_id, self.group.ty
            )));
        }
        let class = self.group.classes.first().ok_or_else(|| ReportError::config(format!(
            "metric group '{}' has no classes", self.group.metric_id
        )))?;

        let mut cache = DatasourceCache::new(self.source);
        let datasource = self.resolve(class, &Mode::RasterStats)?;
        let raster = fetch_raster(&mut cache, datasource, class)?;
        Ok(depth_stats(&raster, sketch))
    }

    fn mode(&self) -> Result<Mode, ReportError> {
        let within_distance = self.group.within_distance;
        Ok(match self.group.ty {
            MetricGroupType::AreaOverlap => Mode::Area,
            MetricGroupType::CountOverlap => Mode::Sum(SumOptions { sum_property: None, within_distance }),
            MetricGroupType::SumOverlap => {
                let property = self.group.sum_property.clone().ok_or_else(|| ReportError::config(format!(
                    "sumOverlap group '{}' has no sumProperty", self.group.metric_id
                )))?;
                Mode::Sum(SumOptions { sum_property: Some(property), within_distance })
            }
            MetricGroupType::RasterClassOverlap => Mode::RasterClass,
            MetricGroupType::RasterStats => Mode::RasterStats,
        })
    }

    /// Datasource of `class`, checked against the mode.
    fn resolve(&self, class: &DataClass, mode: &Mode) -> Result<&'a Datasource, ReportError> {
        let datasource = self.project.class_datasource(self.group, class)?;
        if !mode.accepts(datasource.kind) {
            return Err(ReportError::config(format!(
                "metric group '{}' ({}) cannot use {} datasource '{}' for class '{}'",
                self.group.metric_id,
                self.group.ty,
                datasource.kind,
                datasource.datasource_id,
                class.class_id,
            )));
        }
        Ok(datasource)
    }

    fn raw_metrics(&self, sketch: &Sketch) -> Result<Vec<Metric>, ReportError> {
        let mode = self.mode()?;
        info!("Computing {} ({}) for sketch '{}'", self.group.metric_id, self.group.ty, sketch.name());

        // Resolve every class before fetching so misconfiguration fails fast.
        let datasources = self.group.classes.iter()
            .map(|class| self.resolve(class, &mode).map(|ds| (class, ds)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut cache = DatasourceCache::new(self.source);
        let per_class = if self.group.ty.is_raster() {
            let rasters = datasources.into_iter()
                .map(|(class, ds)| fetch_raster(&mut cache, ds, class).map(|r| (class, r)))
                .collect::<Result<Vec<_>, _>>()?;
            debug!("Fetched {} datasources for {} classes", cache.fetch_count(), rasters.len());

            rasters.par_iter()
                .map(|(class, raster)| self.raster_class_metrics(class, raster, sketch, &mode))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let features = datasources.into_iter()
                .map(|(class, ds)| fetch_features(&mut cache, ds, class).map(|f| (class, f)))
                .collect::<Result<Vec<_>, _>>()?;
            debug!("Fetched {} datasources for {} classes", cache.fetch_count(), features.len());

            features.par_iter()
                .map(|(class, features)| self.vector_class_metrics(class, features, sketch, &mode))
                .collect::<Vec<_>>()
        };

        Ok(per_class.into_iter().flatten().collect())
    }

    fn vector_class_metrics(&self, class: &DataClass, features: &[Feature], sketch: &Sketch, mode: &Mode) -> Vec<Metric> {
        let class_key = self.group.class_key(class);
        let within = match mode {
            Mode::Sum(sum) => sum.within_distance.unwrap_or(0.0),
            _ => 0.0,
        };
        let search = sketch.bbox().map(|bbox| {
            let (dx, dy) = self.options.area_method.padding(&bbox, within);
            Rect::new(
                Coord { x: bbox.min().x - dx, y: bbox.min().y - dy },
                Coord { x: bbox.max().x + dx, y: bbox.max().y + dy },
            )
        });

        let members = features.iter()
            .filter(|f| match (search, f.bbox()) {
                (Some(search), Some(bbox)) => search.intersects(&bbox),
                _ => false,
            })
            .filter(|f| f.is_member(class_key, &class.class_id))
            .collect::<Vec<_>>();
        debug!(
            "Sketch '{}' class '{}': {} features, {} after class filter",
            sketch.name(), class.class_id, features.len(), members.len(),
        );

        let metric_id = &self.group.metric_id;
        match mode {
            Mode::Sum(sum) => overlap_sum(metric_id, Some(class.class_id.as_str()), &members, sketch, sum, &self.options),
            _ => overlap_area(metric_id, Some(class.class_id.as_str()), &members, sketch, &self.options),
        }
    }

    fn raster_class_metrics(&self, class: &DataClass, raster: &Raster, sketch: &Sketch, mode: &Mode) -> Result<Vec<Metric>, ReportError> {
        let metric_id = &self.group.metric_id;
        match mode {
            Mode::RasterClass => overlap_raster_class(metric_id, raster, sketch, std::slice::from_ref(class), &self.options),
            _ => Ok(overlap_raster_stats(metric_id, Some(class.class_id.as_str()), raster, sketch, &self.options)),
        }
    }
}

/// Features of `datasource`; an unreadable or empty document means no data.
fn fetch_features(cache: &mut DatasourceCache, datasource: &Datasource, class: &DataClass) -> Result<Arc<Vec<Feature>>, ReportError> {
    let features = cache.features(&datasource.url)
        .map_err(|e| ReportError::unavailable(&datasource.datasource_id, &class.class_id, format!("{e:#}")))?;
    if features.is_empty() {
        return Err(ReportError::unavailable(&datasource.datasource_id, &class.class_id, "datasource has no features"));
    }
    Ok(features)
}

fn fetch_raster(cache: &mut DatasourceCache, datasource: &Datasource, class: &DataClass) -> Result<Arc<Raster>, ReportError> {
    cache.raster(&datasource.url)
        .map_err(|e| ReportError::unavailable(&datasource.datasource_id, &class.class_id, format!("{e:#}")))
}
