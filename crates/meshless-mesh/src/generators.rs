//! Procedural vertex streams for scenarios and testing.
//!
//! The triangle-soup generators emit three vertices per triangle with no
//! index buffer, the way an OBJ loader flattens faces for rendering, so
//! shared corners appear once per incident face and exercise
//! deduplication.

use meshless_math::Vec3;

use crate::mesh::VertexBuffer;

fn soup(triangles: &[[Vec3; 3]]) -> VertexBuffer {
    let points: Vec<Vec3> = triangles.iter().flat_map(|t| t.iter().copied()).collect();
    VertexBuffer::from_positions(&points)
}

/// The four corners of a right-angled unit tetrahedron scaled by `size`:
/// the origin and the three axis points. No duplicates.
pub fn tetrahedron_points(size: f32) -> VertexBuffer {
    VertexBuffer::from_positions(&[
        Vec3::ZERO,
        Vec3::X * size,
        Vec3::Y * size,
        Vec3::Z * size,
    ])
}

/// Triangle soup of a tetrahedron: 4 faces, 12 vertices, 4 unique.
pub fn tetrahedron(size: f32) -> VertexBuffer {
    let o = Vec3::ZERO;
    let x = Vec3::X * size;
    let y = Vec3::Y * size;
    let z = Vec3::Z * size;
    soup(&[[o, y, x], [o, x, z], [o, z, y], [x, y, z]])
}

/// Triangle soup of an axis-aligned cube centered at the origin:
/// 12 triangles, 36 vertices, 8 unique.
pub fn cube(size: f32) -> VertexBuffer {
    let h = size / 2.0;
    let c = |x: f32, y: f32, z: f32| Vec3::new(x * h, y * h, z * h);
    let quads = [
        [c(-1., -1., 1.), c(1., -1., 1.), c(1., 1., 1.), c(-1., 1., 1.)], // +Z
        [c(1., -1., -1.), c(-1., -1., -1.), c(-1., 1., -1.), c(1., 1., -1.)], // -Z
        [c(1., -1., 1.), c(1., -1., -1.), c(1., 1., -1.), c(1., 1., 1.)], // +X
        [c(-1., -1., -1.), c(-1., -1., 1.), c(-1., 1., 1.), c(-1., 1., -1.)], // -X
        [c(-1., 1., 1.), c(1., 1., 1.), c(1., 1., -1.), c(-1., 1., -1.)], // +Y
        [c(-1., -1., -1.), c(1., -1., -1.), c(1., -1., 1.), c(-1., -1., 1.)], // -Y
    ];
    let triangles: Vec<[Vec3; 3]> = quads
        .iter()
        .flat_map(|q| [[q[0], q[1], q[2]], [q[0], q[2], q[3]]])
        .collect();
    soup(&triangles)
}

/// Triangle soup of a UV sphere centered at the origin.
///
/// Pole and seam vertices are generated once per incident triangle, so the
/// stream deduplicates to `(stacks - 1) * slices + 2` particles.
///
/// # Arguments
/// - `radius`: Sphere radius in meters.
/// - `stacks`: Number of latitude divisions (at least 2).
/// - `slices`: Number of longitude divisions (at least 3).
pub fn uv_sphere(radius: f32, stacks: usize, slices: usize) -> VertexBuffer {
    let stacks = stacks.max(2);
    let slices = slices.max(3);

    let vertex = |i: usize, j: usize| -> Vec3 {
        // Poles and the seam are pinned to exact values so every duplicate
        // is bit-identical.
        if i == 0 {
            return Vec3::new(0.0, radius, 0.0);
        }
        if i == stacks {
            return Vec3::new(0.0, -radius, 0.0);
        }
        let j = j % slices;
        let phi = std::f32::consts::PI * i as f32 / stacks as f32;
        let theta = 2.0 * std::f32::consts::PI * j as f32 / slices as f32;
        Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.cos(),
            radius * phi.sin() * theta.sin(),
        )
    };

    let mut triangles = Vec::with_capacity(stacks * slices * 2);
    for i in 0..stacks {
        for j in 0..slices {
            let a = vertex(i, j);
            let b = vertex(i + 1, j);
            let a1 = vertex(i, j + 1);
            let b1 = vertex(i + 1, j + 1);

            // Skip degenerate triangles at poles
            if i != 0 {
                triangles.push([a, b, a1]);
            }
            if i != stacks - 1 {
                triangles.push([a1, b, b1]);
            }
        }
    }
    soup(&triangles)
}

/// A regular `n × n × n` lattice of points centered at the origin.
///
/// With `n >= 3` the quadratic basis is full rank, so both rest
/// correlation matrices are invertible.
pub fn lattice(n: usize, spacing: f32) -> VertexBuffer {
    let n = n.max(1);
    let offset = (n - 1) as f32 * spacing / 2.0;
    let mut points = Vec::with_capacity(n * n * n);
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                points.push(Vec3::new(
                    i as f32 * spacing - offset,
                    j as f32 * spacing - offset,
                    k as f32 * spacing - offset,
                ));
            }
        }
    }
    VertexBuffer::from_positions(&points)
}
