//! The geometry block: one deduplicated vertex/index buffer pair.

use super::dedup::RawVertexRecord;
use super::VertexAttributes;
use crate::error::Result;
use crate::format::{self, BlockType, IndexWidth};

/// A deduplicated vertex. Attributes that are not active are zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    /// Position in 3D space.
    pub position: [f32; 3],
    /// Normal vector.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Copy the fields of `record` selected by `attributes`.
    pub(crate) fn masked(record: &RawVertexRecord, attributes: VertexAttributes) -> Self {
        Self {
            position: record.position,
            normal: if attributes.normals {
                record.normal
            } else {
                [0.0; 3]
            },
            uv: if attributes.uv { record.uv } else { [0.0; 2] },
        }
    }
}

/// Triangle geometry ready to be written as a block.
///
/// Buffers are filled by [`VertexDeduplicator::build`](super::VertexDeduplicator::build);
/// a freshly constructed block is empty but valid.
#[derive(Debug, Clone, Default)]
pub struct GeometryBlock {
    name: String,
    namespace: Option<String>,
    attributes: VertexAttributes,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GeometryBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn attributes(&self) -> VertexAttributes {
        self.attributes
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Index buffer, 3 entries per triangle.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Width the index buffer will be written with.
    pub fn index_width(&self) -> Result<IndexWidth> {
        IndexWidth::for_vertex_count(self.vertices.len())
    }

    pub(crate) fn set_buffers(
        &mut self,
        attributes: VertexAttributes,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) {
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        self.attributes = attributes;
        self.vertices = vertices;
        self.indices = indices;
    }

    /// Bytes this block occupies on the wire.
    pub fn encoded_len(&self) -> Result<usize> {
        let name_len = format::qualified_name(&self.name, self.namespace()).len();
        let vertex_bytes = self.vertices.len() * self.attributes.floats_per_vertex() * 4;
        let index_bytes = self.indices.len() * self.index_width()?.byte_size();
        Ok(1 + 4 + 2 + name_len + 4 + 4 + 1 + vertex_bytes + index_bytes)
    }

    /// Append this block, with the given id, to `buf`.
    ///
    /// Capacity limits are checked before anything is written.
    pub(crate) fn encode(&self, id: u32, buf: &mut Vec<u8>) -> Result<()> {
        let width = self.index_width()?;
        let vertex_count = format::count_u32(self.vertices.len(), "vertex count")?;
        let index_count = format::count_u32(self.indices.len(), "index count")?;
        let name = format::qualified_name(&self.name, self.namespace());

        buf.reserve(self.encoded_len()?);
        format::write_block_header(buf, BlockType::Geometry, id, &name)?;
        format::write_u32(buf, vertex_count);
        format::write_u32(buf, index_count);
        format::write_u8(buf, self.attributes.flags());

        for vertex in &self.vertices {
            for &v in &vertex.position {
                format::write_f32(buf, v);
            }
            if self.attributes.normals {
                for &v in &vertex.normal {
                    format::write_f32(buf, v);
                }
            }
            if self.attributes.uv {
                for &v in &vertex.uv {
                    format::write_f32(buf, v);
                }
            }
        }

        match width {
            // Vertex count <= 65 536 so every index fits.
            IndexWidth::U16 => {
                for &index in &self.indices {
                    format::write_u16(buf, index as u16);
                }
            }
            IndexWidth::U32 => {
                for &index in &self.indices {
                    format::write_u32(buf, index);
                }
            }
        }

        Ok(())
    }
}
