mod cache;
#[cfg(feature = "download")]
mod http;
mod source;

pub use cache::DatasourceCache;
#[cfg(feature = "download")]
pub use http::HttpSource;
pub use source::{DatasourceSource, DiskSource, MemSource};
