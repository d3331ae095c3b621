#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the transformation estimators.
pub mod error;

/// Linear algebra utilities on homogeneous 4x4 matrices.
pub mod linalg;

/// Transformation models and model dispatch.
pub mod model;

/// Control points and control point sets.
pub mod points;

/// Transformation results and residual statistics.
pub mod result;

mod affine;
pub use affine::*;

mod conformal;
pub use conformal::*;

mod translation;
pub use translation::*;

pub use error::TransformError;
pub use model::{estimate, estimate_all, estimate_with_params, EstimatorParams, TransformModel};
pub use points::{ControlPoint, ControlPointSet};
pub use result::{compute_residuals, Residuals, TransformResult};
