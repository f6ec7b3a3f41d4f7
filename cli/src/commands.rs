pub mod depth;
pub mod report;

use std::path::Path;

use anyhow::{Context, Result};
use mpa_report::{read_sketch_from_geojson_bytes, DatasourceSource, DiskSource, Project, Sketch};

use crate::cli::ProjectArgs;

/// Project, sketch and datasource access named by the shared arguments.
pub struct Inputs {
    pub project: Project,
    pub sketch: Sketch,
    pub source: Box<dyn DatasourceSource>,
}

pub fn load(args: &ProjectArgs) -> Result<Inputs> {
    let project = Project::from_dir(&args.project)?;

    let bytes = std::fs::read(&args.sketch)
        .with_context(|| format!("read sketch {}", args.sketch.display()))?;
    let sketch = read_sketch_from_geojson_bytes(&bytes)
        .with_context(|| format!("parse sketch {}", args.sketch.display()))?;

    let source = source(args.data.as_deref().unwrap_or(&args.project), args.base_url.clone())?;
    Ok(Inputs { project, sketch, source })
}

fn source(data: &Path, base_url: Option<String>) -> Result<Box<dyn DatasourceSource>> {
    match base_url {
        None => Ok(Box::new(DiskSource::new(data))),
        #[cfg(feature = "download")]
        Some(base) => Ok(Box::new(mpa_report::HttpSource::new(Some(base))?)),
        #[cfg(not(feature = "download"))]
        Some(_) => anyhow::bail!("--base-url needs the download feature"),
    }
}
