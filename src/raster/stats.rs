use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

use super::Raster;

/// Summary statistics over raster cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterStats {
    pub count: usize,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl RasterStats {
    /// Accumulate statistics in iteration order.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut stats = Self::default();
        for value in values {
            stats.count += 1;
            stats.sum += value;
            stats.min = Some(stats.min.map_or(value, |m| m.min(value)));
            stats.max = Some(stats.max.map_or(value, |m| m.max(value)));
        }
        if stats.count > 0 { stats.mean = Some(stats.sum / stats.count as f64) }
        stats
    }
}

/// Statistics of the valid cells whose centers fall inside `shape`.
pub fn raster_stats(raster: &Raster, shape: &MultiPolygon<f64>) -> RasterStats {
    RasterStats::from_values(raster.values_within(shape))
}

/// Depth summary for one sketch level.
///
/// `min` and `max` are elevations: depths below sea level are negative, so
/// the deepest point is `min`. Conversion to positive depth happens only when
/// formatting, see [`DepthStats::display_range`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthStats {
    pub sketch_id: String,
    pub sketch_name: String,
    pub is_collection: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}
