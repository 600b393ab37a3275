//! Integration tests for meshless-solver.

use meshless_math::symmetric::determinant;
use meshless_math::{DMat3, DVec3, Mat3x9, Mat9, PolarMethod, Vec3};
use meshless_mesh::generators::{cube, lattice, tetrahedron, tetrahedron_points, uv_sphere};
use meshless_mesh::{VertexBuffer, VertexLayout};
use meshless_solver::{DeformationMode, ShapeMatchingSolver, SolverConfig};
use meshless_types::{MeshlessError, ParticleId};

const DT: f32 = 1.0 / 60.0;
const GRAVITY: Vec3 = Vec3::new(0.0, -9.8, 0.0);

fn max_pairwise_drift(a: &[Vec3], b: &[Vec3]) -> f32 {
    let mut drift = 0.0f32;
    for i in 0..a.len() {
        for j in (i + 1)..a.len() {
            let da = (a[i] - a[j]).length();
            let db = (b[i] - b[j]).length();
            drift = drift.max((da - db).abs());
        }
    }
    drift
}

/// Gives every particle a velocity that is a smooth function of its rest
/// offset, so the next step has something non-rigid to fit.
fn perturb(solver: &mut ShapeMatchingSolver) {
    let rel: Vec<Vec3> = solver.rest_shape().relative().to_vec();
    for (v, q) in solver.velocities_mut().iter_mut().zip(rel) {
        *v = Vec3::new(0.3 * q.y, -0.2 * q.x + 0.1 * q.z * q.x, 0.15 * q.z);
    }
}

// ─── Construction ─────────────────────────────────────────────

#[test]
fn soup_is_deduplicated() {
    let solver = ShapeMatchingSolver::from_vertex_buffer(&cube(2.0), SolverConfig::default()).unwrap();
    assert_eq!(solver.particle_count(), 8);
    assert_eq!(solver.duplicates().vertex_count(), 36);
    assert_eq!(solver.positions().len(), 8);
    assert_eq!(solver.velocities().len(), 8);
    assert!(solver.velocities().iter().all(|v| *v == Vec3::ZERO)); // Starts at rest
}

#[test]
fn rest_relative_sums_to_zero() {
    let solver =
        ShapeMatchingSolver::from_vertex_buffer(&uv_sphere(1.0, 8, 12), SolverConfig::default())
            .unwrap();
    let sum = solver
        .rest_shape()
        .relative()
        .iter()
        .fold(Vec3::ZERO, |acc, q| acc + *q);
    assert!(sum.length() < 1e-4, "Σ q = {sum:?}");
}

#[test]
fn rest_inverse_times_correlation_is_identity() {
    for buffer in [tetrahedron(1.0), lattice(3, 0.5), cube(1.0)] {
        let solver = ShapeMatchingSolver::from_vertex_buffer(&buffer, SolverConfig::default()).unwrap();
        let rest = solver.rest_shape();
        assert_eq!(rest.linear_rank(), 3);
        let product = rest.aqq_inv() * rest.aqq();
        assert!(
            product.abs_diff_eq(DMat3::IDENTITY, 1e-9),
            "Aqq⁻¹·Aqq = {product:?}"
        );
    }
}

#[test]
fn quadratic_inverse_times_correlation_is_identity() {
    let solver =
        ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), SolverConfig::default()).unwrap();
    let rest = solver.rest_shape();
    assert_eq!(rest.quadratic_rank(), 9);
    let product: Mat9 = rest.aqq_tilde_inv().mul_mat9(rest.aqq_tilde());
    assert!(
        product.max_identity_error() < 1e-8,
        "identity error = {}",
        product.max_identity_error()
    );
    assert_eq!(solver.deformation_mode(), DeformationMode::Quadratic);
}

#[test]
fn small_cloud_falls_back_to_linear() {
    let solver =
        ShapeMatchingSolver::from_vertex_buffer(&tetrahedron(1.0), SolverConfig::default()).unwrap();
    assert!(solver.rest_shape().quadratic_rank() < 9);
    assert_eq!(solver.deformation_mode(), DeformationMode::Linear);
}

#[test]
fn explicit_linear_mode_is_kept() {
    let config = SolverConfig {
        deformation: DeformationMode::Linear,
        ..Default::default()
    };
    let mut solver = ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), config).unwrap();
    assert_eq!(solver.deformation_mode(), DeformationMode::Linear);

    perturb(&mut solver);
    solver.update(DT, Vec3::ZERO).unwrap();
    let quadratic = solver.quadratic_deformation();
    for c in 3..9 {
        assert_eq!(quadratic.cols[c], meshless_math::DVec3::ZERO);
    }
    assert!(quadratic.left_block().abs_diff_eq(solver.linear_deformation(), 1e-12));
}

// ─── Construction Errors ──────────────────────────────────────

#[test]
fn empty_stream_rejected() {
    let empty = VertexBuffer::from_positions(&[]);
    let err = ShapeMatchingSolver::from_vertex_buffer(&empty, SolverConfig::default()).unwrap_err();
    assert!(matches!(err, MeshlessError::EmptyPointCloud));
}

#[test]
fn single_point_rejected() {
    let points = VertexBuffer::from_positions(&[Vec3::ONE, Vec3::ONE, Vec3::ONE]);
    let err = ShapeMatchingSolver::from_vertex_buffer(&points, SolverConfig::default()).unwrap_err();
    assert!(matches!(err, MeshlessError::DegenerateRestShape(_)));
}

#[test]
fn mixed_layout_rejected() {
    let buffer = VertexBuffer::from_interleaved(VertexLayout::PositionsNormals, vec![0.5; 12]).unwrap();
    let err = ShapeMatchingSolver::from_vertex_buffer(&buffer, SolverConfig::default()).unwrap_err();
    assert!(matches!(err, MeshlessError::InvalidVertexLayout(_)));
}

#[test]
fn non_finite_rejected() {
    let buffer = VertexBuffer::from_positions(&[Vec3::ZERO, Vec3::new(f32::NAN, 0.0, 0.0)]);
    let err = ShapeMatchingSolver::from_vertex_buffer(&buffer, SolverConfig::default()).unwrap_err();
    assert!(matches!(err, MeshlessError::NonFiniteCoordinate { index: 1 }));
}

#[test]
fn strict_mode_rejects_rank_deficient_rest_shape() {
    let config = SolverConfig {
        require_full_rank: true,
        ..Default::default()
    };
    let err = ShapeMatchingSolver::from_vertex_buffer(&tetrahedron(1.0), config.clone()).unwrap_err();
    assert!(matches!(err, MeshlessError::DegenerateRestShape(_)));

    // A 3×3×3 lattice supports the full quadratic model.
    assert!(ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), config).is_ok());
}

#[test]
fn zero_sqrt_iterations_rejected() {
    let config = SolverConfig {
        sqrt_iterations: 0,
        ..Default::default()
    };
    let err = ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), config).unwrap_err();
    assert!(matches!(err, MeshlessError::InvalidConfig(_)));
}

// ─── Update ───────────────────────────────────────────────────

#[test]
fn tetrahedron_free_fall() {
    let config = SolverConfig {
        alpha: 0.4,
        beta: 0.7,
        ..Default::default()
    };
    let mut solver = ShapeMatchingSolver::from_vertex_buffer(&tetrahedron(1.0), config).unwrap();
    let rest = solver.rest_shape().positions().to_vec();
    let start = solver.center_of_mass();

    for _ in 0..60 {
        let result = solver.update(DT, GRAVITY).unwrap();
        assert!(result.corrected);
    }

    // One second of free fall: ½·g·t² ≈ 4.9 m, plus the first-order
    // discretization excess of the integrator.
    let drop = start.y - solver.center_of_mass().y;
    assert!((drop - 4.95).abs() < 0.15, "COM drop = {drop}");

    let drift = max_pairwise_drift(solver.positions(), &rest);
    assert!(drift < 1e-3, "Pairwise distance drift = {drift}");

    // Horizontal COM does not move.
    assert!((solver.center_of_mass().x - start.x).abs() < 1e-4);
    assert!((solver.center_of_mass().z - start.z).abs() < 1e-4);
}

#[test]
fn two_points_stay_at_rest() {
    let buffer = VertexBuffer::from_positions(&[Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)]);
    let mut solver = ShapeMatchingSolver::from_vertex_buffer(&buffer, SolverConfig::default()).unwrap();
    assert_eq!(solver.rest_shape().linear_rank(), 1);

    for _ in 0..60 {
        let result = solver.update(DT, Vec3::ZERO).unwrap();
        assert!(result.corrected);
        assert_eq!(result.polar_method, Some(PolarMethod::Eigen));
    }

    assert!(solver.positions()[0].abs_diff_eq(Vec3::ZERO, 1e-5), "{:?}", solver.positions()[0]);
    assert!(
        solver.positions()[1].abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5),
        "{:?}",
        solver.positions()[1]
    );
    assert!(solver.kinetic_energy() < 1e-8);
}

#[test]
fn symmetric_pair_is_stable_after_reset() {
    let left = Vec3::new(-1.0, 0.0, 0.0);
    let right = Vec3::new(1.0, 0.0, 0.0);
    let buffer = VertexBuffer::from_positions(&[left, right]);
    let mut solver = ShapeMatchingSolver::from_vertex_buffer(&buffer, SolverConfig::default()).unwrap();

    solver.reset();
    let result = solver.update(DT, Vec3::ZERO).unwrap();
    assert!(result.corrected);
    assert_eq!(result.polar_method, Some(PolarMethod::Eigen));

    assert!(solver.positions()[0].abs_diff_eq(left, 1e-6), "{:?}", solver.positions()[0]);
    assert!(solver.positions()[1].abs_diff_eq(right, 1e-6), "{:?}", solver.positions()[1]);
    for v in solver.velocities() {
        assert!(v.length() < 1e-6, "velocity = {v:?}");
    }
}

#[test]
fn rigid_motion_is_preserved() {
    let mut solver =
        ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), SolverConfig::default()).unwrap();
    let rest = solver.rest_shape().positions().to_vec();
    let rotation = glam::Quat::from_euler(glam::EulerRot::XYZ, 0.4, -0.7, 1.1);
    let offset = Vec3::new(2.0, 5.0, -1.0);
    for p in solver.positions_mut() {
        *p = rotation * *p + offset;
    }
    let moved = solver.positions().to_vec();

    for step in 0..30 {
        let result = solver.update(DT, Vec3::ZERO).unwrap();
        assert_eq!(result.polar_method, Some(PolarMethod::DenmanBeavers));
        let drift = max_pairwise_drift(solver.positions(), &rest);
        assert!(drift < 1e-4, "Step {step}: pairwise distance drift = {drift}");
    }

    for (p, expected) in solver.positions().iter().zip(&moved) {
        assert!(p.abs_diff_eq(*expected, 1e-3), "{p:?} != {expected:?}");
    }
    let r = solver.rotation();
    let expected = glam::DMat3::from_quat(rotation.as_dquat());
    assert!(r.abs_diff_eq(expected, 1e-5), "R = {r:?}");
}

#[test]
fn normalized_determinants_are_unit() {
    let mut solver =
        ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), SolverConfig::default()).unwrap();
    perturb(&mut solver);

    for step in 0..20 {
        let result = solver.update(DT, GRAVITY).unwrap();
        assert!(
            (result.linear_determinant - 1.0).abs() < 1e-6,
            "Step {step}: det(A) = {}",
            result.linear_determinant
        );
        assert!((solver.linear_deformation().determinant() - 1.0).abs() < 1e-6);
    }
}

fn frobenius_dot(a: &Mat3x9, b: &Mat3x9) -> f64 {
    a.cols.iter().zip(b.cols.iter()).map(|(x, y)| x.dot(*y)).sum()
}

#[test]
fn quadratic_operator_is_uniformly_volume_normalized() {
    let mut solver =
        ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), SolverConfig::default()).unwrap();
    assert_eq!(solver.deformation_mode(), DeformationMode::Quadratic);

    // Stretch and bend the body. Zero velocity and zero force leave the
    // integrated positions equal to these, so the fit can be rebuilt here.
    let stretch = DMat3::from_cols_array(&[1.3, 0.1, 0.0, 0.0, 0.9, 0.2, 0.1, 0.0, 1.4]);
    let offset = DVec3::new(1.0, 4.0, -2.0);
    let rel = solver.rest_shape().relative().to_vec();
    for (p, q) in solver.positions_mut().iter_mut().zip(&rel) {
        let q = q.as_dvec3();
        *p = (stretch * q + DVec3::new(0.0, 0.2 * q.x * q.x, 0.0) + offset).as_vec3();
    }
    let deformed = solver.positions().to_vec();

    solver.update(DT, Vec3::ZERO).unwrap();

    let com = deformed.iter().fold(DVec3::ZERO, |acc, p| acc + p.as_dvec3()) / deformed.len() as f64;
    let mut apq = Mat3x9::ZERO;
    for (p, b) in deformed.iter().zip(solver.rest_shape().basis()) {
        apq.add_outer(p.as_dvec3() - com, b);
    }
    let raw = apq.mul_mat9(solver.rest_shape().aqq_tilde_inv());
    let scaled = solver.quadratic_deformation();

    // The stored operator is a uniform rescale of the raw fit.
    let k = frobenius_dot(&scaled, &raw) / frobenius_dot(&raw, &raw);
    for r in 0..3 {
        for c in 0..9 {
            let expected = k * raw.get(r, c);
            assert!(
                (scaled.get(r, c) - expected).abs() < 1e-4,
                "Ã[{r}][{c}] = {} != {expected}",
                scaled.get(r, c)
            );
        }
    }

    // Scaling the whole 9x9 embedding of the raw fit by that factor
    // gives unit volume.
    let mut flat = vec![0.0; 81];
    for r in 0..9 {
        for c in 0..9 {
            let entry = if r < 3 {
                raw.get(r, c)
            } else if r == c {
                1.0
            } else {
                0.0
            };
            flat[r * 9 + c] = k * entry;
        }
    }
    let det = determinant(&flat, 9);
    assert!((det - 1.0).abs() < 1e-3, "det of scaled embedding = {det}");
    assert!((raw.embedded_determinant() - 1.0).abs() > 0.5, "fit should start away from unit volume");
}

#[test]
fn rigid_preset_snaps_to_rotated_rest_shape() {
    let mut solver =
        ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 0.5), SolverConfig::rigid()).unwrap();
    let rest = solver.rest_shape().positions().to_vec();
    perturb(&mut solver);

    solver.update(DT, Vec3::ZERO).unwrap();
    let drift = max_pairwise_drift(solver.positions(), &rest);
    assert!(drift < 1e-4, "Pairwise distance drift = {drift}");
}

#[test]
fn slow_motion_with_matching_reference_is_identity() {
    let plain = SolverConfig::default();
    let scaled = SolverConfig {
        slow_motion_reference_dt: Some(DT),
        ..Default::default()
    };
    let mut a = ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), plain).unwrap();
    let mut b = ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), scaled).unwrap();
    perturb(&mut a);
    perturb(&mut b);

    for _ in 0..5 {
        a.update(DT, GRAVITY).unwrap();
        b.update(DT, GRAVITY).unwrap();
    }
    for (pa, pb) in a.positions().iter().zip(b.positions()) {
        assert!(pa.abs_diff_eq(*pb, 1e-5));
    }
}

#[test]
fn invalid_timestep_rejected() {
    let mut solver =
        ShapeMatchingSolver::from_vertex_buffer(&tetrahedron(1.0), SolverConfig::default()).unwrap();
    for dt in [0.0, -DT, f32::NAN, f32::INFINITY] {
        let err = solver.update(dt, GRAVITY).unwrap_err();
        assert!(matches!(err, MeshlessError::InvalidTimestep(_)));
    }
    // The rejected calls did not touch the state.
    assert_eq!(solver.positions(), solver.rest_shape().positions());
}

#[test]
fn non_finite_state_skips_correction() {
    let mut solver =
        ShapeMatchingSolver::from_vertex_buffer(&lattice(3, 1.0), SolverConfig::default()).unwrap();
    solver.velocities_mut()[0] = Vec3::splat(f32::INFINITY);

    let result = solver.update(DT, GRAVITY).unwrap();
    assert!(!result.corrected);
    assert_eq!(result.polar_method, None);

    // Reset recovers a usable body.
    solver.reset();
    assert!(solver.update(DT, GRAVITY).unwrap().corrected);
}

// ─── Reset ────────────────────────────────────────────────────

#[test]
fn reset_restores_rest_state_exactly() {
    let buffer = uv_sphere(1.0, 6, 8);
    let input: Vec<Vec3> = buffer.positions().collect();
    let mut solver = ShapeMatchingSolver::from_vertex_buffer(&buffer, SolverConfig::default()).unwrap();
    let rest_com = solver.center_of_mass();

    perturb(&mut solver);
    for _ in 0..30 {
        solver.update(DT, GRAVITY).unwrap();
    }
    assert!(solver.center_of_mass() != rest_com);

    solver.reset();
    assert_eq!(solver.positions(), solver.rest_shape().positions());
    assert!(solver.velocities().iter().all(|v| *v == Vec3::ZERO));
    assert_eq!(solver.center_of_mass(), rest_com);

    // Rest positions are the first-seen input positions, bit for bit.
    for (particle, slots) in solver.duplicates().iter() {
        assert_eq!(solver.positions()[particle.index()], input[slots[0].index()]);
    }
}

#[test]
fn reset_is_idempotent() {
    let mut solver =
        ShapeMatchingSolver::from_vertex_buffer(&cube(1.0), SolverConfig::default()).unwrap();
    for _ in 0..10 {
        solver.update(DT, GRAVITY).unwrap();
    }
    solver.reset();
    let once: Vec<Vec3> = solver.positions().to_vec();
    solver.reset();
    assert_eq!(solver.positions(), &once[..]);
    assert_eq!(solver.particle_count(), 8);
}

// ─── Tunables ─────────────────────────────────────────────────

#[test]
fn alpha_and_beta_are_clamped() {
    let mut solver =
        ShapeMatchingSolver::from_vertex_buffer(&tetrahedron(1.0), SolverConfig::default()).unwrap();
    solver.set_alpha(1.5);
    assert_eq!(solver.alpha(), 1.0);
    solver.set_alpha(-0.5);
    assert_eq!(solver.alpha(), 0.0);
    solver.set_beta(0.25);
    assert_eq!(solver.beta(), 0.25);
    solver.set_beta(7.0);
    assert_eq!(solver.beta(), 1.0);
    solver.set_beta(f32::NAN);
    assert_eq!(solver.beta(), 1.0); // NaN leaves the value unchanged
}

#[test]
fn config_values_clamped_at_construction() {
    let config = SolverConfig {
        alpha: 3.0,
        beta: -1.0,
        ..Default::default()
    };
    let solver = ShapeMatchingSolver::from_vertex_buffer(&tetrahedron(1.0), config).unwrap();
    assert_eq!(solver.alpha(), 1.0);
    assert_eq!(solver.beta(), 0.0);
}

// ─── Accessors & Mesh Sync ────────────────────────────────────

#[test]
fn particle_lookup() {
    let solver =
        ShapeMatchingSolver::from_vertex_buffer(&tetrahedron_points(2.0), SolverConfig::default())
            .unwrap();
    let (p, v) = solver.particle(ParticleId(1)).unwrap();
    assert_eq!(p, Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(v, Vec3::ZERO);

    let err = solver.particle(ParticleId(4)).unwrap_err();
    assert!(matches!(err, MeshlessError::ParticleOutOfBounds { index: 4, count: 4 }));
}

#[test]
fn sync_writes_every_duplicate_slot() {
    let mut buffer = cube(1.0);
    let mut solver = ShapeMatchingSolver::from_vertex_buffer(&buffer, SolverConfig::default()).unwrap();
    for _ in 0..5 {
        solver.update(DT, GRAVITY).unwrap();
    }
    solver.sync_to(&mut buffer).unwrap();

    for (particle, slots) in solver.duplicates().iter() {
        for v in slots {
            assert_eq!(buffer.position(v.index()), solver.positions()[particle.index()]);
        }
    }
}

#[test]
fn sync_rejects_mismatched_buffer() {
    let solver =
        ShapeMatchingSolver::from_vertex_buffer(&cube(1.0), SolverConfig::default()).unwrap();
    let mut wrong = tetrahedron(1.0);
    assert!(solver.sync_to(&mut wrong).is_err());
}

#[test]
fn impulse_adds_uniform_velocity() {
    let mut solver =
        ShapeMatchingSolver::from_vertex_buffer(&cube(1.0), SolverConfig::default()).unwrap();
    solver.apply_impulse(Vec3::new(0.0, 4.0, 0.0));
    assert!(solver.velocities().iter().all(|v| *v == Vec3::new(0.0, 4.0, 0.0)));
    assert!((solver.kinetic_energy() - 8.0 * 0.5 * 16.0).abs() < 1e-9);
}

// ─── Config ───────────────────────────────────────────────────

#[test]
fn config_toml_roundtrip() {
    let config = SolverConfig {
        alpha: 0.25,
        deformation: DeformationMode::Linear,
        slow_motion_reference_dt: Some(0.01),
        ..Default::default()
    };
    let text = toml::to_string(&config).unwrap();
    let back: SolverConfig = toml::from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn config_partial_toml_uses_defaults() {
    let config: SolverConfig = toml::from_str("beta = 0.2\ndeformation = \"linear\"\n").unwrap();
    assert_eq!(config.beta, 0.2);
    assert_eq!(config.deformation, DeformationMode::Linear);
    assert_eq!(config.alpha, SolverConfig::default().alpha);
    assert_eq!(config.sqrt_iterations, 100);
    assert_eq!(config.slow_motion_reference_dt, None);
}

#[test]
fn config_json_roundtrip() {
    let config = SolverConfig::soft();
    let json = serde_json::to_string(&config).unwrap();
    let back: SolverConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
