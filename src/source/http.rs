use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use reqwest::{blocking::Client, redirect::Policy, StatusCode};

use super::DatasourceSource;

/// Datasources served over HTTP(S). Relative URLs resolve against `base`.
pub struct HttpSource {
    base: Option<String>,
    client: Client,
}

impl HttpSource {
    pub fn new(base: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("mpa-report/", env!("CARGO_PKG_VERSION")))
            .redirect(Policy::limited(10))
            .timeout(Duration::from_secs(60))
            .build()
            .context("build HTTP client")?;

        Ok(Self { base: base.map(|b| b.trim_end_matches('/').to_string()), client })
    }

    fn full(&self, url: &str) -> String {
        match &self.base {
            Some(base) if !url.contains("://") => format!("{base}/{}", url.trim_start_matches('/')),
            _ => url.to_string(),
        }
    }
}

impl DatasourceSource for HttpSource {
    fn get(&self, url: &str) -> Result<Arc<[u8]>> {
        let url = self.full(url);
        let bytes = self.client.get(&url).send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} returned error status"))?
            .bytes()
            .with_context(|| format!("read body of {url}"))?;
        Ok(Arc::from(bytes.as_ref()))
    }

    fn has(&self, url: &str) -> bool {
        self.client.head(self.full(url)).send()
            .is_ok_and(|resp| resp.status() == StatusCode::OK)
    }
}
