//! Per-corner vertex deduplication.

use super::block::{GeometryBlock, Vertex};
use super::VertexAttributes;
use crate::error::{ExportError, Result};
use crate::format::count_u32;
use std::collections::HashMap;

/// One vertex attribute tuple as supplied for a single triangle corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawVertexRecord {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl RawVertexRecord {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// A record with only a position.
    pub fn position(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// `{x, y, z, nx, ny, nz, u, v}`
impl From<[f32; 8]> for RawVertexRecord {
    fn from(v: [f32; 8]) -> Self {
        Self::new([v[0], v[1], v[2]], [v[3], v[4], v[5]], [v[6], v[7]])
    }
}

/// Exact bit pattern of the active fields of a record. Inactive fields are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey([u32; 8]);

impl VertexKey {
    fn new(vertex: &Vertex) -> Self {
        let mut bits = [0u32; 8];
        for (slot, value) in bits.iter_mut().zip(
            vertex
                .position
                .iter()
                .chain(vertex.normal.iter())
                .chain(vertex.uv.iter()),
        ) {
            *slot = value.to_bits();
        }
        Self(bits)
    }
}

/// Counts from one deduplication pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupStats {
    /// Corners appended.
    pub corners: usize,
    /// Distinct vertex records kept.
    pub unique_vertices: usize,
}

impl DedupStats {
    /// Corners that reused an existing vertex.
    pub fn shared_corners(&self) -> usize {
        self.corners - self.unique_vertices
    }
}

/// Collapses bit-identical corner records into an indexed vertex buffer.
///
/// Equality is exact over the active fields (position always, normal and UV
/// when enabled). There is no epsilon: `0.0` and `-0.0` are different
/// vertices, and two NaNs match only when their bits do. Vertices are numbered
/// in first-seen order starting at 0. Degenerate triangles pass through.
#[derive(Debug)]
pub struct VertexDeduplicator {
    attributes: VertexAttributes,
    lookup: HashMap<VertexKey, u32>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl VertexDeduplicator {
    pub fn new(attributes: VertexAttributes) -> Self {
        Self {
            attributes,
            lookup: HashMap::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Create a deduplicator sized for `corners` appends.
    pub fn with_capacity(attributes: VertexAttributes, corners: usize) -> Self {
        Self {
            attributes,
            lookup: HashMap::with_capacity(corners),
            vertices: Vec::with_capacity(corners),
            indices: Vec::with_capacity(corners),
        }
    }

    pub fn attributes(&self) -> VertexAttributes {
        self.attributes
    }

    /// Append one corner and return the vertex index it was assigned.
    pub fn append(&mut self, record: RawVertexRecord) -> Result<u32> {
        let vertex = Vertex::masked(&record, self.attributes);
        let key = VertexKey::new(&vertex);

        let index = match self.lookup.get(&key) {
            Some(&index) => index,
            None => {
                let index = count_u32(self.vertices.len(), "vertex index")?;
                self.vertices.push(vertex);
                self.lookup.insert(key, index);
                index
            }
        };
        self.indices.push(index);
        Ok(index)
    }

    /// Append every record from an iterator.
    pub fn extend<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = RawVertexRecord>,
    {
        for record in records {
            self.append(record)?;
        }
        Ok(())
    }

    /// Distinct vertices so far.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Corners appended so far.
    pub fn corner_count(&self) -> usize {
        self.indices.len()
    }

    pub fn stats(&self) -> DedupStats {
        DedupStats {
            corners: self.indices.len(),
            unique_vertices: self.vertices.len(),
        }
    }

    /// Move the vertex buffer (assignment order) and index buffer (append
    /// order) into `target`, replacing its attributes with ours.
    ///
    /// Fails if the corner count is not a whole number of triangles.
    pub fn build(self, target: &mut GeometryBlock) -> Result<DedupStats> {
        if self.indices.len() % 3 != 0 {
            return Err(ExportError::invalid_input(
                target.name(),
                format!(
                    "{} corners do not form whole triangles",
                    self.indices.len()
                ),
            ));
        }

        let stats = self.stats();
        log::debug!(
            "Deduplicated '{}': {} corners -> {} vertices",
            target.name(),
            stats.corners,
            stats.unique_vertices
        );
        target.set_buffers(self.attributes, self.vertices, self.indices);
        Ok(stats)
    }
}
