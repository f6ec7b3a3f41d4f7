mod grid;
mod stats;

pub use grid::Raster;
pub use stats::{raster_stats, DepthStats, RasterStats};
