use thiserror::Error;

/// Errors that abort a report computation.
///
/// A missing precalculated total is not an error; see
/// [`MissingTotalWarning`](crate::MissingTotalWarning).
#[derive(Error, Debug)]
pub enum ReportError {
    /// The project configuration cannot serve the requested report,
    /// e.g. a raster datasource bound to an area overlap.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Feature data for a class could not be obtained.
    #[error("no data for class '{class_id}' from datasource '{datasource_id}': {reason}")]
    DataUnavailable {
        datasource_id: String,
        class_id: String,
        reason: String,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn unavailable(datasource_id: &str, class_id: &str, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            datasource_id: datasource_id.to_string(),
            class_id: class_id.to_string(),
            reason: reason.into(),
        }
    }
}
