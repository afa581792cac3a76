//! Triangle geometry: per-corner deduplication and the geometry block.
//!
//! Hosts hand over one attribute tuple per triangle corner. The
//! [`VertexDeduplicator`] collapses bit-identical tuples into a compact
//! indexed vertex buffer and fills a [`GeometryBlock`] with it.

pub mod block;
pub mod dedup;

pub use block::{GeometryBlock, Vertex};
pub use dedup::{DedupStats, RawVertexRecord, VertexDeduplicator};

use serde::{Deserialize, Serialize};

/// Flags byte bit for per-vertex normals.
pub const FLAG_HAS_NORMALS: u8 = 1 << 0;
/// Flags byte bit for per-vertex texture coordinates.
pub const FLAG_HAS_UV: u8 = 1 << 1;

/// Which optional vertex attributes are active.
///
/// Position is always present. Inactive attributes are neither compared
/// during deduplication nor written to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexAttributes {
    pub normals: bool,
    pub uv: bool,
}

impl VertexAttributes {
    pub const POSITION_ONLY: VertexAttributes = VertexAttributes {
        normals: false,
        uv: false,
    };

    pub const ALL: VertexAttributes = VertexAttributes {
        normals: true,
        uv: true,
    };

    pub fn new(normals: bool, uv: bool) -> Self {
        Self { normals, uv }
    }

    /// The flags byte written into geometry payloads.
    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.normals {
            flags |= FLAG_HAS_NORMALS;
        }
        if self.uv {
            flags |= FLAG_HAS_UV;
        }
        flags
    }

    pub fn from_flags(flags: u8) -> Self {
        Self {
            normals: flags & FLAG_HAS_NORMALS != 0,
            uv: flags & FLAG_HAS_UV != 0,
        }
    }

    /// Number of 4-byte floats in one vertex record.
    pub fn floats_per_vertex(&self) -> usize {
        3 + if self.normals { 3 } else { 0 } + if self.uv { 2 } else { 0 }
    }
}

impl Default for VertexAttributes {
    fn default() -> Self {
        Self::ALL
    }
}
