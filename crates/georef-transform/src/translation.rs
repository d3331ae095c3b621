use crate::{
    error::TransformError,
    linalg::identity4,
    model::TransformModel,
    points::ControlPointSet,
    result::TransformResult,
};

/// Estimate a translation-only transformation from control points.
///
/// The translation is the per-axis mean of `reference - source`; rotation is the
/// identity and scale is one.
///
/// # Arguments
///
/// * `points` - The control points, at least one.
///
/// # Returns
///
/// The fitted transformation and its residuals.
///
/// Example:
///
/// ```
/// use georef_transform::{estimate_translation, ControlPoint, ControlPointSet};
///
/// let points = ControlPointSet::new(vec![
///     ControlPoint::new("A", [11.0, 22.0, 33.0], [1.0, 2.0, 3.0]),
/// ]);
/// let result = estimate_translation(&points).unwrap();
/// assert_eq!(result.translation(), [10.0, 20.0, 30.0]);
/// ```
pub fn estimate_translation(points: &ControlPointSet) -> Result<TransformResult, TransformError> {
    let model = TransformModel::Translation;
    model.check_points(points)?;

    let mut sum = [0.0; 3];
    for p in points {
        let d = p.delta();
        sum[0] += d[0];
        sum[1] += d[1];
        sum[2] += d[2];
    }
    let n = points.len() as f64;

    let mut matrix = identity4();
    matrix[0][3] = sum[0] / n;
    matrix[1][3] = sum[1] / n;
    matrix[2][3] = sum[2] / n;

    Ok(TransformResult::new(model, matrix, points))
}
