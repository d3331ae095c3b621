use crate::{
    error::TransformError,
    linalg,
    model::{EstimatorParams, TransformModel},
    points::ControlPointSet,
    result::TransformResult,
};

/// Estimate a 3D similarity transformation from control points.
///
/// See [`estimate_affine_3d_with_params`].
pub fn estimate_affine_3d(points: &ControlPointSet) -> Result<TransformResult, TransformError> {
    estimate_affine_3d_with_params(points, &EstimatorParams::default())
}

/// Estimate a 3D similarity transformation from control points.
///
/// The rotation `R` comes from the SVD of the cross-covariance as in Umeyama,
/// "Least-squares estimation of transformation parameters between two point
/// patterns" (1991). The uniform scale `c` is the ratio of the RMS spreads of
/// the reference and source points about their centroids, and the translation
/// is `t = mean(reference) - c * R * mean(source)`. No shear is estimated.
///
/// # Arguments
///
/// * `points` - The control points, at least three.
/// * `params` - Numeric tolerances.
///
/// # Returns
///
/// The fitted transformation `[[c * R, t], [0, 0, 0, 1]]` and its residuals.
///
/// # Errors
///
/// * [`TransformError::InsufficientPoints`] with fewer than three points.
/// * [`TransformError::NonFiniteCoordinate`] when a coordinate is NaN or infinite.
/// * [`TransformError::SingularSystem`] when the cross-covariance has rank below
///   two, i.e. the points coincide or lie on a line.
pub fn estimate_affine_3d_with_params(
    points: &ControlPointSet,
    params: &EstimatorParams,
) -> Result<TransformResult, TransformError> {
    let model = TransformModel::Affine3d;
    model.check_points(points)?;

    let points_in_src = points.source_positions();
    let points_in_dst = points.reference_positions();
    let n = points.len() as f64;

    // compute centroids
    let src_centroid = linalg::centroid(&points_in_src);
    let dst_centroid = linalg::centroid(&points_in_dst);

    // cross-covariance sigma = 1/n * sum[(dst - dst_mean) * (src - src_mean)^T]
    let mut cov = [[0.0; 3]; 3];
    let mut src_variance = 0.0;
    let mut dst_variance = 0.0;
    for (p_in_src, p_in_dst) in points_in_src.iter().zip(points_in_dst.iter()) {
        let src_centered = [
            p_in_src[0] - src_centroid[0],
            p_in_src[1] - src_centroid[1],
            p_in_src[2] - src_centroid[2],
        ];
        let dst_centered = [
            p_in_dst[0] - dst_centroid[0],
            p_in_dst[1] - dst_centroid[1],
            p_in_dst[2] - dst_centroid[2],
        ];
        for i in 0..3 {
            for j in 0..3 {
                cov[i][j] += dst_centered[i] * src_centered[j] / n;
            }
            src_variance += src_centered[i] * src_centered[i] / n;
            dst_variance += dst_centered[i] * dst_centered[i] / n;
        }
    }

    let sigma = faer::Mat::<f64>::from_fn(3, 3, |i, j| cov[i][j]);
    let svd = sigma.svd();
    let (u, v, s) = (svd.u(), svd.v(), svd.s_diagonal());

    let singular_values = [s.read(0), s.read(1), s.read(2)];
    let mut sorted = singular_values;
    sorted.sort_by(|a, b| b.total_cmp(a));

    log::debug!("3D affine: covariance singular values {:?}", sorted);

    if src_variance <= 0.0 || sorted[0] <= 0.0 || sorted[1] <= params.rank_tol * sorted[0] {
        return Err(TransformError::SingularSystem(format!(
            "3D affine cross-covariance has rank below 2 (singular values {:e}, {:e}, {:e})",
            sorted[0], sorted[1], sorted[2]
        )));
    }

    let mut u_arr = [[0.0; 3]; 3];
    let mut v_arr = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            u_arr[i][j] = u.read(i, j);
            v_arr[i][j] = v.read(i, j);
        }
    }

    // handle the reflection case, flip the direction of the smallest singular value
    let mut signs = [1.0; 3];
    if linalg::det_mat33(&u_arr) * linalg::det_mat33(&v_arr) < 0.0 {
        let k_min = (0..3)
            .min_by(|&a, &b| singular_values[a].total_cmp(&singular_values[b]))
            .unwrap_or(2);
        signs[k_min] = -1.0;
    }

    // R = U * S * V^T
    let mut rotation = [[0.0; 3]; 3];
    for (i, row) in rotation.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = (0..3).map(|k| u_arr[i][k] * signs[k] * v_arr[j][k]).sum();
        }
    }

    // c = sqrt(var(dst) / var(src))
    let scale = (dst_variance / src_variance).sqrt();

    log::debug!("3D affine: scale={}", scale);

    // t = dst_mean - c * R * src_mean
    let mut matrix = linalg::identity4();
    for i in 0..3 {
        let mut r_src = 0.0;
        for j in 0..3 {
            matrix[i][j] = scale * rotation[i][j];
            r_src += rotation[i][j] * src_centroid[j];
        }
        matrix[i][3] = dst_centroid[i] - scale * r_src;
    }

    Ok(TransformResult::new(model, matrix, points))
}
