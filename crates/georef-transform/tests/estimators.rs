use approx::assert_relative_eq;
use georef_transform::{
    compute_residuals, estimate, estimate_affine_3d, estimate_all, estimate_conformal_2d,
    estimate_translation, linalg, ControlPoint, ControlPointSet, TransformError, TransformModel,
};

fn create_random_points(num_points: usize, extent: f64) -> Vec<[f64; 3]> {
    (0..num_points)
        .map(|_| {
            [
                rand::random::<f64>() * extent,
                rand::random::<f64>() * extent,
                rand::random::<f64>() * extent * 0.1,
            ]
        })
        .collect()
}

fn rotation_from_axis_angle(axis: [f64; 3], angle: f64) -> [[f64; 3]; 3] {
    let norm = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
    let (x, y, z) = (axis[0] / norm, axis[1] / norm, axis[2] / norm);
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    [
        [c + x * x * t, x * y * t - z * s, x * z * t + y * s],
        [x * y * t + z * s, c + y * y * t, y * z * t - x * s],
        [x * z * t - y * s, y * z * t + x * s, c + z * z * t],
    ]
}

fn similarity(rotation: &[[f64; 3]; 3], scale: f64, t: [f64; 3]) -> linalg::Matrix4 {
    let mut m = linalg::identity4();
    for i in 0..3 {
        for j in 0..3 {
            m[i][j] = scale * rotation[i][j];
        }
        m[i][3] = t[i];
    }
    m
}

fn make_set(src: &[[f64; 3]], dst_m_src: &linalg::Matrix4) -> ControlPointSet {
    src.iter()
        .enumerate()
        .map(|(i, p)| {
            ControlPoint::new(
                format!("GCP{:02}", i),
                linalg::transform_point(dst_m_src, p),
                *p,
            )
        })
        .collect()
}

fn assert_matrix_eq(m: &linalg::Matrix4, expected: &linalg::Matrix4, epsilon: f64) {
    for (row, row_expected) in m.iter().zip(expected.iter()) {
        for (v, e) in row.iter().zip(row_expected.iter()) {
            assert_relative_eq!(v, e, epsilon = epsilon);
        }
    }
}

#[test]
fn test_identity_all_models() -> Result<(), Box<dyn std::error::Error>> {
    let src = create_random_points(10, 100.0);
    let points = make_set(&src, &linalg::identity4());

    for model in TransformModel::ALL {
        let result = estimate(model, &points)?;
        assert_eq!(result.model, model);
        assert_matrix_eq(&result.matrix, &linalg::identity4(), 1e-9);
        for (before, after) in result.residuals_before().iter().zip(result.residuals_after()) {
            for k in 0..3 {
                assert_relative_eq!(before[k], 0.0, epsilon = 1e-12);
                assert_relative_eq!(after[k], 0.0, epsilon = 1e-9);
            }
        }
        assert_relative_eq!(result.total_rmse(), 0.0, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn test_pure_translation_all_models() -> Result<(), Box<dyn std::error::Error>> {
    let src = vec![
        [0.0, 0.0, 0.0],
        [25.0, 3.0, 1.0],
        [5.0, 30.0, -2.0],
        [18.0, 22.0, 0.5],
    ];
    let shift = [1.25, -3.5, 0.75];
    let mut expected = linalg::identity4();
    expected[0][3] = shift[0];
    expected[1][3] = shift[1];
    expected[2][3] = shift[2];
    let points = make_set(&src, &expected);

    for model in TransformModel::ALL {
        let result = estimate(model, &points)?;
        assert_matrix_eq(&result.matrix, &expected, 1e-9);
        for before in result.residuals_before() {
            for k in 0..3 {
                assert_relative_eq!(before[k], shift[k], epsilon = 1e-12);
            }
        }
        assert_relative_eq!(result.vertical_rmse(), 0.0, epsilon = 1e-9);
        assert_relative_eq!(result.total_rmse(), 0.0, epsilon = 1e-9);
    }
    Ok(())
}

#[test]
fn test_affine_recovers_random_similarity() -> Result<(), Box<dyn std::error::Error>> {
    let num_test = 10;
    for _ in 0..num_test {
        let src = create_random_points(12, 50.0);
        let rotation = rotation_from_axis_angle(
            [
                rand::random::<f64>() + 0.1,
                rand::random::<f64>(),
                rand::random::<f64>(),
            ],
            rand::random::<f64>() * std::f64::consts::PI,
        );
        let scale = 0.5 + rand::random::<f64>();
        let t = [
            rand::random::<f64>() * 1000.0,
            rand::random::<f64>() * 1000.0,
            rand::random::<f64>() * 100.0,
        ];
        let expected = similarity(&rotation, scale, t);
        let points = make_set(&src, &expected);

        let result = estimate_affine_3d(&points)?;
        assert_matrix_eq(&result.matrix, &expected, 1e-6);
        assert!(result.total_rmse() < 1e-6);
    }
    Ok(())
}

#[test]
fn test_conformal_recovers_planar_similarity() -> Result<(), Box<dyn std::error::Error>> {
    let src = create_random_points(6, 80.0);
    let angle: f64 = 0.7;
    let scale = 1.0003;
    let rotation = [
        [angle.cos(), -angle.sin(), 0.0],
        [angle.sin(), angle.cos(), 0.0],
        [0.0, 0.0, 1.0],
    ];
    let mut expected = similarity(&rotation, scale, [431_000.0, 5_210_000.0, 0.0]);
    // unit vertical scale and a plain height shift
    expected[2][2] = 1.0;
    expected[2][3] = 96.5;
    let points = make_set(&src, &expected);

    let result = estimate_conformal_2d(&points)?;
    assert_matrix_eq(&result.matrix, &expected, 1e-6);
    assert!(result.total_rmse() < 1e-6);
    Ok(())
}

#[test]
fn test_minimum_point_counts() {
    let all = [
        ControlPoint::new("P1", [10.0, 20.0, 5.0], [0.0, 0.0, 0.0]),
        ControlPoint::new("P2", [20.0, 20.0, 5.0], [10.0, 0.0, 0.0]),
    ];

    // zero points
    let empty = ControlPointSet::default();
    for model in TransformModel::ALL {
        assert_eq!(
            estimate(model, &empty),
            Err(TransformError::InsufficientPoints {
                model,
                required: model.min_points(),
                actual: 0,
            })
        );
    }

    // one point
    let one = ControlPointSet::new(all[..1].to_vec());
    assert!(estimate_translation(&one).is_ok());
    assert!(matches!(
        estimate_conformal_2d(&one),
        Err(TransformError::InsufficientPoints { required: 2, actual: 1, .. })
    ));
    assert!(matches!(
        estimate_affine_3d(&one),
        Err(TransformError::InsufficientPoints { required: 3, actual: 1, .. })
    ));

    // two points
    let two = ControlPointSet::new(all.to_vec());
    assert!(estimate_translation(&two).is_ok());
    assert!(estimate_conformal_2d(&two).is_ok());
    assert!(matches!(
        estimate_affine_3d(&two),
        Err(TransformError::InsufficientPoints { required: 3, actual: 2, .. })
    ));
}

#[test]
fn test_coincident_points() -> Result<(), Box<dyn std::error::Error>> {
    let points = (0..4)
        .map(|i| ControlPoint::new(format!("P{}", i), [7.0, 8.0, 9.0], [1.0, 2.0, 3.0]))
        .collect::<ControlPointSet>();

    let translation = estimate_translation(&points)?;
    assert_eq!(translation.translation(), [6.0, 6.0, 6.0]);

    assert!(matches!(
        estimate_conformal_2d(&points),
        Err(TransformError::SingularSystem(_))
    ));
    assert!(matches!(
        estimate_affine_3d(&points),
        Err(TransformError::SingularSystem(_))
    ));
    Ok(())
}

#[test]
fn test_residuals_recomputed_from_matrix() -> Result<(), Box<dyn std::error::Error>> {
    // noisy observations so that residuals are not trivially zero
    let src = create_random_points(15, 60.0);
    let rotation = rotation_from_axis_angle([0.0, 0.0, 1.0], 0.2);
    let truth = similarity(&rotation, 1.01, [500.0, 800.0, 20.0]);
    let points = src
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut r = linalg::transform_point(&truth, p);
            for v in r.iter_mut() {
                *v += (rand::random::<f64>() - 0.5) * 0.1;
            }
            ControlPoint::new(format!("P{}", i), r, *p)
        })
        .collect::<ControlPointSet>();

    for (model, result) in estimate_all(&points) {
        let result = result?;
        assert_eq!(result.model, model);
        let recomputed = compute_residuals(&result.matrix, &points);
        assert_eq!(recomputed, result.residuals);

        let mut transformed = vec![[0.0; 3]; points.len()];
        linalg::transform_points(&points.source_positions(), &result.matrix, &mut transformed);
        for ((p, t), after) in points.iter().zip(transformed.iter()).zip(result.residuals_after()) {
            for k in 0..3 {
                assert_eq!(after[k], p.reference[k] - t[k]);
            }
        }
    }
    Ok(())
}

#[test]
fn test_three_point_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let points = ControlPointSet::new(vec![
        ControlPoint::new("P1", [10.0, 20.0, 5.0], [0.0, 0.0, 0.0]),
        ControlPoint::new("P2", [20.0, 20.0, 5.0], [10.0, 0.0, 0.0]),
        ControlPoint::new("P3", [10.0, 30.0, 5.0], [0.0, 10.0, 0.0]),
    ]);

    for (model, result) in estimate_all(&points) {
        let result = result?;
        let t = result.translation();
        assert_relative_eq!(t[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(t[1], 20.0, epsilon = 1e-9);
        assert_relative_eq!(t[2], 5.0, epsilon = 1e-9);
        assert!(result.vertical_rmse() < 1e-9, "{} vrmse", model);
        assert!(result.total_rmse() < 1e-9, "{} trmse", model);
    }
    Ok(())
}

#[test]
fn test_excluding_points_refits() -> Result<(), Box<dyn std::error::Error>> {
    let points = ControlPointSet::new(vec![
        ControlPoint::new("P1", [10.0, 20.0, 5.0], [0.0, 0.0, 0.0]),
        ControlPoint::new("P2", [20.0, 20.0, 5.0], [10.0, 0.0, 0.0]),
        ControlPoint::new("P3", [10.0, 30.0, 5.0], [0.0, 10.0, 0.0]),
        // blunder
        ControlPoint::new("BAD", [0.0, 0.0, 0.0], [5.0, 5.0, 0.0]),
    ]);

    let with_blunder = estimate_translation(&points)?;
    let without = estimate_translation(&points.excluding(&["BAD"]))?;

    assert!(with_blunder.total_rmse() > 1.0);
    assert_relative_eq!(without.total_rmse(), 0.0, epsilon = 1e-12);
    assert_eq!(without.residuals_after().len(), 3);
    // the first result is unaffected by the refit
    assert_eq!(with_blunder.residuals_after().len(), 4);
    Ok(())
}

#[test]
fn test_result_matrix_string_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let points = make_set(
        &create_random_points(5, 30.0),
        &similarity(&rotation_from_axis_angle([1.0, 2.0, 3.0], 0.4), 2.0, [1.0, 2.0, 3.0]),
    );
    let result = estimate_affine_3d(&points)?;
    let parsed = linalg::matrix_from_string(&result.matrix_string())?;
    assert_eq!(parsed, result.matrix);
    Ok(())
}
