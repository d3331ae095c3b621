use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    affine::estimate_affine_3d_with_params, conformal::estimate_conformal_2d_with_params,
    error::TransformError, points::ControlPointSet, result::TransformResult,
    translation::estimate_translation,
};

/// Enumeration of the transformation models available in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformModel {
    /// Mean offset between reference and source positions.
    #[serde(rename = "translation_only")]
    Translation,
    /// Plan similarity transform plus an independent vertical shift.
    #[serde(rename = "2d_conformal")]
    Conformal2d,
    /// Rotation, uniform scale and translation in 3D, without shear.
    #[serde(rename = "3d_affine")]
    Affine3d,
}

impl TransformModel {
    /// All models in presentation order.
    pub const ALL: [TransformModel; 3] = [
        TransformModel::Translation,
        TransformModel::Conformal2d,
        TransformModel::Affine3d,
    ];

    /// Minimum number of control points the model needs.
    pub fn min_points(&self) -> usize {
        match self {
            TransformModel::Translation => 1,
            TransformModel::Conformal2d => 2,
            TransformModel::Affine3d => 3,
        }
    }

    /// Stable identifier of the model.
    pub fn name(&self) -> &'static str {
        match self {
            TransformModel::Translation => "translation_only",
            TransformModel::Conformal2d => "2d_conformal",
            TransformModel::Affine3d => "3d_affine",
        }
    }

    /// Short form used as output filename suffix.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            TransformModel::Translation => "tr",
            TransformModel::Conformal2d => "2d",
            TransformModel::Affine3d => "3d",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            TransformModel::Translation => "Translation Only",
            TransformModel::Conformal2d => "2D Conformal",
            TransformModel::Affine3d => "3D Affine",
        }
    }

    /// Validate the points before fitting: enough of them, all coordinates finite.
    pub(crate) fn check_points(&self, points: &ControlPointSet) -> Result<(), TransformError> {
        let actual = points.len();
        if actual < self.min_points() {
            return Err(TransformError::InsufficientPoints {
                model: *self,
                required: self.min_points(),
                actual,
            });
        }
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(TransformError::NonFiniteCoordinate {
                name: p.name.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for TransformModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for TransformModel {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        TransformModel::ALL
            .into_iter()
            .find(|m| m.name() == needle || m.abbreviation() == needle)
            .ok_or_else(|| TransformError::UnknownModel(s.to_string()))
    }
}

/// Numeric tolerances used by the estimators.
#[derive(Debug, Clone)]
pub struct EstimatorParams {
    /// Relative threshold on the singular values below which a system is
    /// considered rank deficient.
    pub rank_tol: f64,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self { rank_tol: 1e-10 }
    }
}

/// Dispatch function that routes to the chosen estimator with default parameters.
///
/// Example:
///
/// ```
/// use georef_transform::{estimate, ControlPoint, ControlPointSet, TransformModel};
///
/// let points = ControlPointSet::new(vec![
///     ControlPoint::new("P1", [10.0, 20.0, 5.0], [0.0, 0.0, 0.0]),
///     ControlPoint::new("P2", [20.0, 20.0, 5.0], [10.0, 0.0, 0.0]),
/// ]);
/// let result = estimate(TransformModel::Conformal2d, &points).unwrap();
/// assert!(result.total_rmse() < 1e-9);
/// ```
pub fn estimate(
    model: TransformModel,
    points: &ControlPointSet,
) -> Result<TransformResult, TransformError> {
    estimate_with_params(model, points, &EstimatorParams::default())
}

/// Dispatch function that routes to the chosen estimator.
pub fn estimate_with_params(
    model: TransformModel,
    points: &ControlPointSet,
    params: &EstimatorParams,
) -> Result<TransformResult, TransformError> {
    match model {
        TransformModel::Translation => estimate_translation(points),
        TransformModel::Conformal2d => estimate_conformal_2d_with_params(points, params),
        TransformModel::Affine3d => estimate_affine_3d_with_params(points, params),
    }
}

/// Fit every model independently on the same control points.
///
/// A failing model does not prevent the others from being computed.
pub fn estimate_all(
    points: &ControlPointSet,
) -> Vec<(TransformModel, Result<TransformResult, TransformError>)> {
    TransformModel::ALL
        .into_iter()
        .map(|model| {
            let result = estimate(model, points);
            if let Err(e) = &result {
                log::debug!("{} estimation failed: {}", model, e);
            }
            (model, result)
        })
        .collect()
}
