//! # meshless-mesh
//!
//! Vertex streams and point-cloud preparation for shape matching.
//!
//! ## Key Types
//!
//! - [`VertexBuffer`]: Flat interleaved vertex stream with a declared layout.
//! - [`PointCloud`]: Unique particle positions after exact deduplication.
//! - [`DuplicateMap`]: For each particle, every vertex slot it came from.
//!   Used to scatter simulated positions back into the vertex stream.
//! - Procedural generators emitting triangle-soup streams (tetrahedron,
//!   cube, UV sphere) and full-rank lattices.

pub mod generators;
pub mod mesh;
pub mod point_cloud;

pub use mesh::{VertexBuffer, VertexLayout};
pub use point_cloud::{DuplicateMap, PointCloud, PointKey};
