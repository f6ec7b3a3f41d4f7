use std::fmt;

use serde::{Deserialize, Serialize};

/// Geometry type of a vector datasource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Polygon,
    Point,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatasourceKind {
    Vector {
        #[serde(rename = "geometryType")]
        geometry_type: GeometryKind,
    },
    Raster,
}

/// A source of reference data: a feature collection or a raster grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datasource {
    pub datasource_id: String,
    #[serde(flatten)]
    pub kind: DatasourceKind,
    /// Absolute URL, or a path relative to the configured source.
    pub url: String,
}

impl Datasource {
    pub fn vector(datasource_id: impl Into<String>, geometry_type: GeometryKind, url: impl Into<String>) -> Self {
        Self { datasource_id: datasource_id.into(), kind: DatasourceKind::Vector { geometry_type }, url: url.into() }
    }

    pub fn raster(datasource_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self { datasource_id: datasource_id.into(), kind: DatasourceKind::Raster, url: url.into() }
    }

}

impl fmt::Display for DatasourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasourceKind::Vector { geometry_type: GeometryKind::Polygon } => write!(f, "polygon"),
            DatasourceKind::Vector { geometry_type: GeometryKind::Point } => write!(f, "point"),
            DatasourceKind::Vector { geometry_type: GeometryKind::Line } => write!(f, "line"),
            DatasourceKind::Raster => write!(f, "raster"),
        }
    }
}
