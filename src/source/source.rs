use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};

use anyhow::{anyhow, Context, Result};

/// Read-only access to datasource and project files by URL or relative path,
/// e.g. "nests.json", "file:///data/depth.json", "https://host/sand.json".
pub trait DatasourceSource: Send + Sync {
    fn get(&self, url: &str) -> Result<Arc<[u8]>>;
    fn has(&self, url: &str) -> bool;
}

/// Files under a root directory. `file://` URLs and absolute paths are read
/// as-is; anything else resolves against the root.
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    #[inline] pub fn root(&self) -> &Path { &self.root }

    fn full(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() { path.to_path_buf() } else { self.root.join(path) }
    }
}

impl DatasourceSource for DiskSource {
    fn get(&self, url: &str) -> Result<Arc<[u8]>> {
        let path = self.full(url);
        let bytes = std::fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        Ok(Arc::from(bytes))
    }

    fn has(&self, url: &str) -> bool { self.full(url).exists() }
}

/// In-memory files keyed by URL.
#[derive(Default, Clone)]
pub struct MemSource {
    files: HashMap<String, Arc<[u8]>>,
}

impl MemSource {
    pub fn new(files: HashMap<String, Arc<[u8]>>) -> Self { Self { files } }

    pub fn insert(&mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let bytes: Vec<u8> = bytes.into();
        self.files.insert(url.into(), Arc::from(bytes));
    }

    pub fn with_file(mut self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl DatasourceSource for MemSource {
    fn get(&self, url: &str) -> Result<Arc<[u8]>> {
        self.files.get(url).cloned()
            .ok_or_else(|| anyhow!("missing datasource file: {url}"))
    }

    fn has(&self, url: &str) -> bool { self.files.contains_key(url) }
}
