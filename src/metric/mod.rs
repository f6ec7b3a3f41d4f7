mod group;
mod metric;

pub use group::{DataClass, MetricGroup, MetricGroupType};
pub use metric::{Metric, MetricKey, ReportResult};
