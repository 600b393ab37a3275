//! Exact deduplication of a vertex stream into unique particles.
//!
//! Triangle meshes repeat each shared corner once per incident face. The
//! shape-matching engine wants one particle per distinct position, and the
//! renderer wants every original slot updated each frame. [`PointCloud`]
//! produces both: the unique positions and a [`DuplicateMap`] back into
//! the stream.
//!
//! Matching is bit-exact (no epsilon merge). Lookup goes through an ordered
//! map keyed lexicographically by `(x, y, z)`; particles are numbered in
//! first-seen order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use meshless_math::Vec3;
use meshless_types::{MeshlessError, MeshlessResult, ParticleId, VertexId};
use serde::{Deserialize, Serialize};

use crate::mesh::VertexBuffer;

/// Orderable key for a 3D point.
///
/// Compares lexicographically by x, then y, then z. `-0.0` is folded into
/// `+0.0` so the two compare equal, as they do under `==`.
#[derive(Debug, Clone, Copy)]
pub struct PointKey([f32; 3]);

impl PointKey {
    /// Creates a key from a finite point.
    pub fn new(p: Vec3) -> Self {
        // Adding +0.0 maps -0.0 to +0.0 and leaves everything else alone.
        Self([p.x + 0.0, p.y + 0.0, p.z + 0.0])
    }

    /// The point this key was built from.
    pub fn point(&self) -> Vec3 {
        Vec3::from_array(self.0)
    }
}

impl PartialEq for PointKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PointKey {}

impl PartialOrd for PointKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PointKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0[0]
            .total_cmp(&other.0[0])
            .then_with(|| self.0[1].total_cmp(&other.0[1]))
            .then_with(|| self.0[2].total_cmp(&other.0[2]))
    }
}

/// Mapping from each unique particle to the vertex slots it occupies.
///
/// Every vertex index of the source stream appears in exactly one list.
/// Lists are in ascending vertex order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMap {
    slots: Vec<Vec<VertexId>>,
    vertex_count: usize,
}

impl DuplicateMap {
    /// Number of unique particles.
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of vertices in the source stream.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Vertex slots of a particle.
    pub fn duplicates_of(&self, id: ParticleId) -> &[VertexId] {
        self.slots.get(id.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates over `(particle, slots)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ParticleId, &[VertexId])> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (ParticleId(i as u32), s.as_slice()))
    }

    /// For every vertex slot, the particle that owns it.
    pub fn reverse_index(&self) -> Vec<ParticleId> {
        let mut owner = vec![ParticleId(0); self.vertex_count];
        for (particle, slots) in self.iter() {
            for v in slots {
                owner[v.index()] = particle;
            }
        }
        owner
    }

    /// Writes each particle position into every one of its vertex slots.
    ///
    /// Attributes other than position are left untouched.
    pub fn scatter(&self, positions: &[Vec3], target: &mut VertexBuffer) -> MeshlessResult<()> {
        if positions.len() != self.slots.len() {
            return Err(MeshlessError::InvalidMesh(format!(
                "Position count ({}) != particle count ({})",
                positions.len(),
                self.slots.len()
            )));
        }
        if target.vertex_count() != self.vertex_count {
            return Err(MeshlessError::InvalidMesh(format!(
                "Target vertex count ({}) != source vertex count ({})",
                target.vertex_count(),
                self.vertex_count
            )));
        }
        for (slots, &p) in self.slots.iter().zip(positions.iter()) {
            for &v in slots {
                target.set_position(v, p)?;
            }
        }
        Ok(())
    }
}

/// Unique particle positions plus their duplicate map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    positions: Vec<Vec3>,
    duplicates: DuplicateMap,
}

impl PointCloud {
    /// Deduplicates a position-only vertex stream.
    ///
    /// Fails if the stream carries attributes other than positions or
    /// contains non-finite coordinates. An empty stream yields an empty
    /// cloud.
    pub fn from_vertex_buffer(buffer: &VertexBuffer) -> MeshlessResult<Self> {
        buffer.validate_positions_only()?;
        let points: Vec<Vec3> = buffer.positions().collect();
        Ok(Self::from_points(&points))
    }

    /// Deduplicates a slice of finite points.
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut lookup: BTreeMap<PointKey, usize> = BTreeMap::new();
        let mut positions = Vec::new();
        let mut slots: Vec<Vec<VertexId>> = Vec::new();

        for (i, &p) in points.iter().enumerate() {
            let key = PointKey::new(p);
            let particle = *lookup.entry(key).or_insert_with(|| {
                positions.push(p);
                slots.push(Vec::new());
                positions.len() - 1
            });
            slots[particle].push(VertexId(i as u32));
        }

        tracing::debug!(
            vertices = points.len(),
            particles = positions.len(),
            "deduplicated point cloud"
        );

        Self {
            positions,
            duplicates: DuplicateMap {
                slots,
                vertex_count: points.len(),
            },
        }
    }

    /// Unique positions, in first-seen order.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// The duplicate map.
    #[inline]
    pub fn duplicates(&self) -> &DuplicateMap {
        &self.duplicates
    }

    /// Number of unique particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if there are no particles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Splits into positions and duplicate map.
    pub fn into_parts(self) -> (Vec<Vec3>, DuplicateMap) {
        (self.positions, self.duplicates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_zero_matches_positive_zero() {
        let a = PointKey::new(Vec3::new(-0.0, 1.0, 2.0));
        let b = PointKey::new(Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(a, b);
    }

    #[test]
    fn keys_order_lexicographically() {
        let a = PointKey::new(Vec3::new(0.0, 5.0, 5.0));
        let b = PointKey::new(Vec3::new(1.0, 0.0, 0.0));
        let c = PointKey::new(Vec3::new(1.0, 0.0, 1.0));
        assert!(a < b);
        assert!(b < c);
    }
}
