use crate::error::TransformError;

/// A 4x4 homogeneous transformation matrix in row-major order.
pub type Matrix4 = [[f64; 4]; 4];

/// Return the 4x4 identity matrix.
pub fn identity4() -> Matrix4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Apply a homogeneous transformation to a single point.
///
/// The point is lifted to `[x, y, z, 1]`, multiplied by the matrix and the
/// homogeneous coordinate is dropped.
///
/// Example:
///
/// ```
/// use georef_transform::linalg::{identity4, transform_point};
///
/// let mut m = identity4();
/// m[0][3] = 10.0;
/// assert_eq!(transform_point(&m, &[1.0, 2.0, 3.0]), [11.0, 2.0, 3.0]);
/// ```
pub fn transform_point(dst_m_src: &Matrix4, point: &[f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (i, row) in dst_m_src.iter().take(3).enumerate() {
        out[i] = row[0] * point[0] + row[1] * point[1] + row[2] * point[2] + row[3];
    }
    out
}

/// Transform a set of points using a homogeneous transformation.
///
/// # Arguments
///
/// * `src_points` - A set of points to be transformed.
/// * `dst_m_src` - The 4x4 transformation from the source to the destination frame.
/// * `dst_points` - A pre-allocated vector to store the transformed points.
///
/// PRECONDITION: dst_points is a pre-allocated vector of the same size as source.
pub fn transform_points(src_points: &[[f64; 3]], dst_m_src: &Matrix4, dst_points: &mut [[f64; 3]]) {
    assert_eq!(src_points.len(), dst_points.len());
    for (dst, src) in dst_points.iter_mut().zip(src_points.iter()) {
        *dst = transform_point(dst_m_src, src);
    }
}

/// Compute the arithmetic mean of a set of points.
///
/// Returns the origin for an empty set.
pub fn centroid(points: &[[f64; 3]]) -> [f64; 3] {
    if points.is_empty() {
        return [0.0; 3];
    }
    let mut sum = [0.0; 3];
    for p in points {
        sum[0] += p[0];
        sum[1] += p[1];
        sum[2] += p[2];
    }
    let n = points.len() as f64;
    [sum[0] / n, sum[1] / n, sum[2] / n]
}

/// Compute the determinant of a 3x3 matrix.
pub fn det_mat33(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Serialize a matrix as 16 space-separated values in row-major order.
///
/// This is the literal format expected by the `matrix` option of PDAL's
/// `filters.transformation` stage.
///
/// Example:
///
/// ```
/// use georef_transform::linalg::{identity4, matrix_to_string};
///
/// assert_eq!(
///     matrix_to_string(&identity4()),
///     "1.0 0.0 0.0 0.0 0.0 1.0 0.0 0.0 0.0 0.0 1.0 0.0 0.0 0.0 0.0 1.0"
/// );
/// ```
pub fn matrix_to_string(m: &Matrix4) -> String {
    m.iter()
        .flat_map(|row| row.iter())
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a matrix from 16 whitespace-separated values in row-major order.
pub fn matrix_from_string(s: &str) -> Result<Matrix4, TransformError> {
    let values = s
        .split_whitespace()
        .map(|v| {
            v.parse::<f64>()
                .map_err(|e| TransformError::InvalidMatrix(format!("{}: {}", v, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() != 16 {
        return Err(TransformError::InvalidMatrix(format!(
            "expected 16 values, got {}",
            values.len()
        )));
    }

    let mut m = [[0.0; 4]; 4];
    for (i, v) in values.into_iter().enumerate() {
        m[i / 4][i % 4] = v;
    }
    Ok(m)
}
