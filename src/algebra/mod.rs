//! Pure operations over metric collections: rekey, sort, nest and flatten.

mod flatten;
mod nest;
mod query;
mod rekey;
mod sort;

pub use flatten::{flatten_by_sketch_all_class, ClassValue, SketchClassRow};
pub use nest::{nest_metrics, MetricField, NestedMetrics, DEFAULT_NEST_PATH};
pub use query::{first_matching_metric, metrics_with_sketch_id};
pub use rekey::{rekey_metric, rekey_metrics};
pub use sort::{compare_metrics, sort_metrics};
