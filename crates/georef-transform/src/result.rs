use serde::{Deserialize, Serialize};

use crate::{
    linalg::{self, Matrix4},
    model::TransformModel,
    points::ControlPointSet,
};

/// Per-point residuals and summary error metrics of a transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Residuals {
    /// Raw offset `reference - source` for each point, in input order.
    pub before: Vec<[f64; 3]>,
    /// Offset `reference - M * source` for each point, in input order.
    pub after: Vec<[f64; 3]>,
    /// Euclidean norm of each `after` residual.
    pub total_errors: Vec<f64>,
    /// Root-mean-square of the vertical component of `after`.
    pub vertical_rmse: f64,
    /// Root-mean-square of `total_errors`.
    pub total_rmse: f64,
}

/// Compute the residuals of a transformation over a control point set.
///
/// The same computation backs every model, so recomputing the residuals from the
/// matrix of a [`TransformResult`] reproduces its embedded values exactly.
///
/// # Arguments
///
/// * `dst_m_src` - The transformation from the point cloud to the reference frame.
/// * `points` - The control points.
///
/// # Returns
///
/// The residuals before and after the transformation and their RMSE. Both RMSE
/// values are `NaN` for an empty set.
pub fn compute_residuals(dst_m_src: &Matrix4, points: &ControlPointSet) -> Residuals {
    let n = points.len();
    let mut before = Vec::with_capacity(n);
    let mut after = Vec::with_capacity(n);
    let mut total_errors = Vec::with_capacity(n);

    for p in points {
        before.push(p.delta());

        let transformed = linalg::transform_point(dst_m_src, &p.source);
        let d = [
            p.reference[0] - transformed[0],
            p.reference[1] - transformed[1],
            p.reference[2] - transformed[2],
        ];
        total_errors.push((d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt());
        after.push(d);
    }

    let vertical_rmse = (after.iter().map(|d| d[2] * d[2]).sum::<f64>() / n as f64).sqrt();
    let total_rmse = (total_errors.iter().map(|e| e * e).sum::<f64>() / n as f64).sqrt();

    Residuals {
        before,
        after,
        total_errors,
        vertical_rmse,
        total_rmse,
    }
}

/// The outcome of fitting a transformation model to control points.
///
/// A result is immutable: refitting after changing the point selection produces a
/// new result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    /// The model that produced this result.
    pub model: TransformModel,
    /// Row-major homogeneous matrix with `reference = M * [source, 1]`.
    pub matrix: Matrix4,
    /// Residuals and error metrics of the fit.
    pub residuals: Residuals,
}

impl TransformResult {
    /// Build a result from a fitted matrix, computing its residuals.
    pub fn new(model: TransformModel, matrix: Matrix4, points: &ControlPointSet) -> Self {
        let residuals = compute_residuals(&matrix, points);
        log::debug!(
            "{} fit over {} points: vrmse={:.4} trmse={:.4}",
            model,
            points.len(),
            residuals.vertical_rmse,
            residuals.total_rmse
        );
        Self {
            model,
            matrix,
            residuals,
        }
    }

    /// The matrix as 16 space-separated values in row-major order.
    pub fn matrix_string(&self) -> String {
        linalg::matrix_to_string(&self.matrix)
    }

    /// Raw `reference - source` residual per point.
    pub fn residuals_before(&self) -> &[[f64; 3]] {
        &self.residuals.before
    }

    /// `reference - transformed source` residual per point.
    pub fn residuals_after(&self) -> &[[f64; 3]] {
        &self.residuals.after
    }

    /// Euclidean norm of each post-transformation residual.
    pub fn total_errors(&self) -> &[f64] {
        &self.residuals.total_errors
    }

    /// RMS of the vertical post-transformation residuals.
    pub fn vertical_rmse(&self) -> f64 {
        self.residuals.vertical_rmse
    }

    /// RMS of the per-point total errors.
    pub fn total_rmse(&self) -> f64 {
        self.residuals.total_rmse
    }

    /// The translation column of the matrix.
    pub fn translation(&self) -> [f64; 3] {
        [self.matrix[0][3], self.matrix[1][3], self.matrix[2][3]]
    }
}
