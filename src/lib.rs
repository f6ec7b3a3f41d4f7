#![doc = "Overlap metrics for marine protected area sketches"]
mod error;
mod feature;
mod geom;
mod io;
mod metric;
mod objective;
mod percent;
mod project;
mod raster;
mod report;
mod sketch;
mod source;

pub mod algebra;
pub mod format;
pub mod overlap;

#[doc(inline)]
pub use error::ReportError;

#[doc(inline)]
pub use feature::Feature;

#[doc(inline)]
pub use geom::{union_all, AreaMethod};

#[doc(inline)]
pub use io::{read_features_from_geojson_bytes, read_raster_from_json_bytes, read_sketch_from_geojson_bytes};

#[doc(inline)]
pub use metric::{DataClass, Metric, MetricGroup, MetricGroupType, MetricKey, ReportResult};

#[doc(inline)]
pub use objective::{evaluate_objectives, Objective, ObjectiveMeasure, ObjectiveResult, ObjectiveStatus};

#[doc(inline)]
pub use percent::{to_percent_metric, MissingTotalWarning, PercentMetrics};

#[doc(inline)]
pub use project::{BasicSettings, Datasource, DatasourceKind, Geography, GeometryKind, Project, DEFAULT_BOUNDARY_GROUP};

#[doc(inline)]
pub use raster::{raster_stats, DepthStats, Raster, RasterStats};

#[doc(inline)]
pub use report::Report;

#[doc(inline)]
pub use sketch::{union_of_children, Sketch, SketchProperties};

#[doc(inline)]
pub use source::{DatasourceCache, DatasourceSource, DiskSource, MemSource};

#[cfg(feature = "download")]
#[doc(inline)]
pub use source::HttpSource;
