use anyhow::{bail, Context, Result};
use geo::Coord;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// JSON grid document for raster datasources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RasterDocument {
    width: usize,
    height: usize,
    /// Top-left corner `[xmin, ymax]`.
    origin: [f64; 2],
    /// Cell size `[dx, dy]`.
    cell_size: [f64; 2],
    #[serde(default)]
    no_data: Option<f64>,
    /// Row-major, top row first. `null` cells are no-data.
    values: Vec<Option<f64>>,
}

/// Read a raster grid from its JSON document.
pub fn read_raster_from_json_bytes(bytes: &[u8]) -> Result<Raster> {
    let doc: RasterDocument = serde_json::from_slice(bytes).context("Failed to parse raster JSON")?;

    if doc.cell_size[0] <= 0.0 || doc.cell_size[1] <= 0.0 {
        bail!("Raster cell size must be positive, got {:?}", doc.cell_size);
    }
    let Some(cells) = doc.width.checked_mul(doc.height) else {
        bail!("Raster size {}x{} is too large", doc.width, doc.height);
    };
    if doc.values.len() != cells {
        bail!("Raster has {} values but is {}x{}", doc.values.len(), doc.width, doc.height);
    }

    let values = doc.values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
    let grid = Array2::from_shape_vec((doc.height, doc.width), values)
        .context("Failed to shape raster values")?;

    Ok(Raster::new(
        grid,
        Coord { x: doc.origin[0], y: doc.origin[1] },
        (doc.cell_size[0], doc.cell_size[1]),
        doc.no_data,
    ))
}
