use georef_transform::TransformError;

/// Error types for the georeferencing I/O module.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GeorefIoError {
    /// Error reading or writing file
    #[error("error reading or writing file")]
    Io(#[from] std::io::Error),

    /// The control point table has no header row.
    #[error("control point table is empty, expected a header row")]
    MissingHeader,

    /// Every data row of the control point table was rejected.
    #[error("control point table has no valid rows ({rejected} rejected)")]
    NoValidRows {
        /// Number of rejected rows.
        rejected: usize,
    },

    /// JSON serialization failed.
    #[error("serialization error")]
    Serialization(#[from] serde_json::Error),

    /// A transformation could not be used.
    #[error(transparent)]
    Transform(#[from] TransformError),
}
