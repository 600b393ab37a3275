//! Flat vertex stream with a declared per-vertex layout.
//!
//! Vertices are stored interleaved, `[x0, y0, z0, (extra...), x1, ...]`,
//! the way they are uploaded to a vertex buffer object. The shape-matching
//! engine only accepts the [`VertexLayout::Positions`] layout; streams with
//! normals or texture coordinates must be stripped first with
//! [`VertexBuffer::positions_only`].

use meshless_math::Vec3;
use meshless_types::{MeshlessError, MeshlessResult, VertexId};
use serde::{Deserialize, Serialize};

/// Which attributes each vertex carries, in stream order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexLayout {
    /// `[x, y, z]`
    Positions,
    /// `[x, y, z, nx, ny, nz]`
    PositionsNormals,
    /// `[x, y, z, nx, ny, nz, u, v]`
    PositionsNormalsUvs,
}

impl VertexLayout {
    /// Number of floats per vertex.
    #[inline]
    pub fn stride(self) -> usize {
        match self {
            VertexLayout::Positions => 3,
            VertexLayout::PositionsNormals => 6,
            VertexLayout::PositionsNormalsUvs => 8,
        }
    }
}

/// An interleaved vertex stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexBuffer {
    layout: VertexLayout,
    data: Vec<f32>,
}

impl VertexBuffer {
    /// Wraps an interleaved stream, checking that its length matches the layout.
    pub fn from_interleaved(layout: VertexLayout, data: Vec<f32>) -> MeshlessResult<Self> {
        if data.len() % layout.stride() != 0 {
            return Err(MeshlessError::InvalidMesh(format!(
                "Stream length {} is not a multiple of the {:?} stride ({})",
                data.len(),
                layout,
                layout.stride()
            )));
        }
        Ok(Self { layout, data })
    }

    /// Builds a position-only stream from points.
    pub fn from_positions(points: &[Vec3]) -> Self {
        let mut data = Vec::with_capacity(points.len() * 3);
        for p in points {
            data.extend_from_slice(&[p.x, p.y, p.z]);
        }
        Self {
            layout: VertexLayout::Positions,
            data,
        }
    }

    /// Returns the vertex layout.
    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Returns the raw interleaved data.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.layout.stride()
    }

    /// Returns the position of vertex `i`.
    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        let base = i * self.layout.stride();
        Vec3::new(self.data[base], self.data[base + 1], self.data[base + 2])
    }

    /// Sets the position of vertex `id`, leaving other attributes untouched.
    pub fn set_position(&mut self, id: VertexId, p: Vec3) -> MeshlessResult<()> {
        let i = id.index();
        if i >= self.vertex_count() {
            return Err(MeshlessError::InvalidMesh(format!(
                "Vertex {} out of range (vertex count: {})",
                i,
                self.vertex_count()
            )));
        }
        let base = i * self.layout.stride();
        self.data[base] = p.x;
        self.data[base + 1] = p.y;
        self.data[base + 2] = p.z;
        Ok(())
    }

    /// Iterates over all vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        (0..self.vertex_count()).map(move |i| self.position(i))
    }

    /// Returns a copy of this stream with every attribute except the
    /// position removed.
    pub fn positions_only(&self) -> Self {
        if self.layout == VertexLayout::Positions {
            return self.clone();
        }
        let points: Vec<Vec3> = self.positions().collect();
        Self::from_positions(&points)
    }

    /// Translates every vertex.
    pub fn translate(&mut self, offset: Vec3) {
        let stride = self.layout.stride();
        for chunk in self.data.chunks_exact_mut(stride) {
            chunk[0] += offset.x;
            chunk[1] += offset.y;
            chunk[2] += offset.z;
        }
    }

    /// Validates the stream as input for the shape-matching engine.
    ///
    /// Checks:
    /// - The layout is position-only
    /// - Every coordinate is finite
    pub fn validate_positions_only(&self) -> MeshlessResult<()> {
        if self.layout != VertexLayout::Positions {
            return Err(MeshlessError::InvalidVertexLayout(format!(
                "Expected a position-only stream, got {:?}",
                self.layout
            )));
        }
        for (i, p) in self.positions().enumerate() {
            if !p.is_finite() {
                return Err(MeshlessError::NonFiniteCoordinate { index: i });
            }
        }
        Ok(())
    }
}
