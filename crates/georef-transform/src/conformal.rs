use faer::prelude::SpSolverLstsq;

use crate::{
    error::TransformError,
    linalg,
    model::{EstimatorParams, TransformModel},
    points::ControlPointSet,
    result::TransformResult,
};

/// Estimate a 2D conformal transformation with an independent vertical shift.
///
/// See [`estimate_conformal_2d_with_params`].
pub fn estimate_conformal_2d(points: &ControlPointSet) -> Result<TransformResult, TransformError> {
    estimate_conformal_2d_with_params(points, &EstimatorParams::default())
}

/// Estimate a 2D conformal transformation with an independent vertical shift.
///
/// The horizontal mapping is the plan similarity
///
/// ```text
/// E = a * X - b * Y + Te
/// N = b * X + a * Y + Tn
/// ```
///
/// solved in the least-squares sense over `2 * N` equations using a QR
/// decomposition. The vertical shift `Tz` is the mean of `H - Z` and does not
/// take part in the horizontal fit.
///
/// # Arguments
///
/// * `points` - The control points, at least two.
/// * `params` - Numeric tolerances.
///
/// # Returns
///
/// The fitted transformation
/// `[[a, -b, 0, Te], [b, a, 0, Tn], [0, 0, 1, Tz], [0, 0, 0, 1]]` and its residuals.
///
/// # Errors
///
/// * [`TransformError::InsufficientPoints`] with fewer than two points.
/// * [`TransformError::NonFiniteCoordinate`] when a coordinate is NaN or infinite.
/// * [`TransformError::SingularSystem`] when the horizontal positions do not
///   determine scale and rotation, e.g. all points coincide.
pub fn estimate_conformal_2d_with_params(
    points: &ControlPointSet,
    params: &EstimatorParams,
) -> Result<TransformResult, TransformError> {
    let model = TransformModel::Conformal2d;
    model.check_points(points)?;

    let n = points.len();

    // work on centered coordinates, projected eastings and northings are large
    let src_centroid = linalg::centroid(&points.source_positions());
    let ref_centroid = linalg::centroid(&points.reference_positions());

    // construct the design matrix A and observations b
    let mut mat_a = faer::Mat::<f64>::zeros(2 * n, 4);
    let mut mat_b = faer::Mat::<f64>::zeros(2 * n, 1);

    for (i, p) in points.iter().enumerate() {
        let x = p.source[0] - src_centroid[0];
        let y = p.source[1] - src_centroid[1];
        let e = p.reference[0] - ref_centroid[0];
        let north = p.reference[1] - ref_centroid[1];

        mat_a.write(i, 0, x);
        mat_a.write(i, 1, -y);
        mat_a.write(i, 2, 1.0);
        mat_a.write(n + i, 0, y);
        mat_a.write(n + i, 1, x);
        mat_a.write(n + i, 3, 1.0);

        mat_b.write(i, 0, e);
        mat_b.write(n + i, 0, north);
    }

    // the QR solve does not report rank deficiency, check it from the singular values
    let svd = mat_a.svd();
    let s = svd.s_diagonal();
    let singular_values = (0..s.nrows()).map(|i| s.read(i)).collect::<Vec<_>>();
    check_full_rank(&singular_values, params.rank_tol)?;

    let sol = mat_a.qr().solve_lstsq(mat_b);
    let (a, b) = (sol.read(0, 0), sol.read(1, 0));

    // undo the centering
    let te = ref_centroid[0] + sol.read(2, 0) - (a * src_centroid[0] - b * src_centroid[1]);
    let tn = ref_centroid[1] + sol.read(3, 0) - (b * src_centroid[0] + a * src_centroid[1]);

    // vertical datum is handled separately from the plan fit
    let tz = points.iter().map(|p| p.reference[2] - p.source[2]).sum::<f64>() / n as f64;

    log::debug!(
        "2D conformal: scale={} rotation={} rad",
        (a * a + b * b).sqrt(),
        b.atan2(a)
    );

    let matrix = [
        [a, -b, 0.0, te],
        [b, a, 0.0, tn],
        [0.0, 0.0, 1.0, tz],
        [0.0, 0.0, 0.0, 1.0],
    ];

    Ok(TransformResult::new(model, matrix, points))
}

/// Fail unless every singular value is finite and above `rank_tol` times the largest.
fn check_full_rank(singular_values: &[f64], rank_tol: f64) -> Result<(), TransformError> {
    if singular_values.iter().any(|s| !s.is_finite()) {
        return Err(TransformError::SingularSystem(format!(
            "2D conformal design matrix has non-finite singular values {:?}",
            singular_values
        )));
    }
    let s_max = singular_values.iter().copied().fold(0.0, f64::max);
    let s_min = singular_values.iter().copied().fold(s_max, f64::min);
    if s_max <= 0.0 || s_min <= rank_tol * s_max {
        return Err(TransformError::SingularSystem(format!(
            "2D conformal design matrix is rank deficient (singular values {:e}..{:e})",
            s_min, s_max
        )));
    }
    Ok(())
}
