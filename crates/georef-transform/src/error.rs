use thiserror::Error;

use crate::model::TransformModel;

/// Error types for the transformation estimators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    /// Fewer control points than the model needs.
    #[error("{model} transformation requires at least {required} control points, got {actual}")]
    InsufficientPoints {
        /// The model that was requested.
        model: TransformModel,
        /// Minimum number of control points required by the model.
        required: usize,
        /// Actual number of control points provided.
        actual: usize,
    },

    /// A control point has a NaN or infinite coordinate.
    #[error("control point '{name}' has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Name of the offending control point.
        name: String,
    },

    /// The linear system is singular or rank deficient.
    #[error("singular system: {0}")]
    SingularSystem(String),

    /// A matrix string could not be parsed.
    #[error("invalid matrix: {0}")]
    InvalidMatrix(String),

    /// The model name is not recognized.
    #[error("unknown transformation model: {0}")]
    UnknownModel(String),
}
