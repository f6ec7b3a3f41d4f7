use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::{
    feature::Feature,
    io::{read_features_from_geojson_bytes, read_raster_from_json_bytes},
    raster::Raster,
};

use super::DatasourceSource;

/// Request-scoped datasource cache: each URL is fetched and parsed at most
/// once for the lifetime of the cache. Create one per report computation.
pub struct DatasourceCache<'a> {
    source: &'a dyn DatasourceSource,
    features: AHashMap<String, Arc<Vec<Feature>>>,
    rasters: AHashMap<String, Arc<Raster>>,
    fetch_count: usize,
}

impl<'a> DatasourceCache<'a> {
    pub fn new(source: &'a dyn DatasourceSource) -> Self {
        Self { source, features: AHashMap::new(), rasters: AHashMap::new(), fetch_count: 0 }
    }

    /// Number of fetches made from the underlying source.
    #[inline] pub fn fetch_count(&self) -> usize { self.fetch_count }

    /// Vector features at `url`.
    pub fn features(&mut self, url: &str) -> Result<Arc<Vec<Feature>>> {
        if let Some(features) = self.features.get(url) {
            trace!("Datasource cache hit for {url}");
            return Ok(Arc::clone(features));
        }

        let bytes = self.fetch(url)?;
        let features = Arc::new(read_features_from_geojson_bytes(&bytes)
            .with_context(|| format!("parse features from {url}"))?);
        debug!("Loaded {} features from {url}", features.len());

        self.features.insert(url.to_string(), Arc::clone(&features));
        Ok(features)
    }

    /// Raster grid at `url`.
    pub fn raster(&mut self, url: &str) -> Result<Arc<Raster>> {
        if let Some(raster) = self.rasters.get(url) {
            trace!("Datasource cache hit for {url}");
            return Ok(Arc::clone(raster));
        }

        let bytes = self.fetch(url)?;
        let raster = Arc::new(read_raster_from_json_bytes(&bytes)
            .with_context(|| format!("parse raster from {url}"))?);
        debug!("Loaded {}x{} raster from {url}", raster.width(), raster.height());

        self.rasters.insert(url.to_string(), Arc::clone(&raster));
        Ok(raster)
    }

    fn fetch(&mut self, url: &str) -> Result<Arc<[u8]>> {
        debug!("Fetching datasource {url}");
        self.fetch_count += 1;
        self.source.get(url)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::source::MemSource;

    use super::*;

    fn nests() -> Vec<u8> {
        json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "properties": { "species": "tjeld" }, "geometry": { "type": "Point", "coordinates": [1, 1] } },
                { "type": "Feature", "properties": { "species": "svartbak" }, "geometry": { "type": "Point", "coordinates": [2, 2] } }
            ]
        }).to_string().into_bytes()
    }

    #[test]
    fn fetches_each_url_once() {
        let source = MemSource::default().with_file("nests.json", nests());
        let mut cache = DatasourceCache::new(&source);

        let first = cache.features("nests.json").unwrap();
        let second = cache.features("nests.json").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
        assert_eq!(cache.fetch_count(), 1);
    }

    #[test]
    fn missing_and_malformed_documents_fail() {
        let source = MemSource::default().with_file("broken.json", "{ nope");
        let mut cache = DatasourceCache::new(&source);

        assert!(cache.features("absent.json").is_err());
        assert!(cache.features("broken.json").is_err());
        assert!(cache.raster("broken.json").is_err());
    }
}
