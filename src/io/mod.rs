//! Readers for sketch and datasource documents.
//!
//! - `geojson` - GeoJSON sketches and vector feature collections
//! - `raster` - JSON grid documents for raster datasources

mod geojson;
mod raster;

pub use geojson::{read_features_from_geojson_bytes, read_sketch_from_geojson_bytes};
pub use raster::read_raster_from_json_bytes;
