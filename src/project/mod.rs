mod datasource;
mod geography;
mod project;

pub use datasource::{Datasource, DatasourceKind, GeometryKind};
pub use geography::{Geography, DEFAULT_BOUNDARY_GROUP};
pub use project::{BasicSettings, Project};
