//! The AWD container wire format.
//!
//! ```text
//! Header (6 bytes, never compressed):
//!   magic:         [u8; 3] = b"AWD"
//!   version_major: u8
//!   version_minor: u8
//!   compression:   u8      (0 = none, 1 = zlib)
//!
//! Body (zlib stream to end of file when compression = 1):
//!   block_count:   u32 LE
//!   blocks...
//!
//! Block:
//!   type_tag:      u8      (1 = geometry, 23 = scene node)
//!   id:            u32 LE  (1-based, insertion order)
//!   name_length:   u16 LE
//!   name:          [u8; name_length]  UTF-8, "namespace:name" when namespaced
//!   payload...
//! ```
//!
//! All multi-byte values are little-endian. Index width inside geometry
//! payloads follows [`IndexWidth::for_vertex_count`].

use crate::error::{ExportError, Result};
use serde::{Deserialize, Serialize};

/// File magic.
pub const MAGIC: &[u8; 3] = b"AWD";

/// Size of the uncompressed file header in bytes.
pub const HEADER_LEN: usize = 6;

/// Preferred file extension, without the dot.
pub const DEFAULT_EXTENSION: &str = "awd";

/// Largest vertex count that still uses 16-bit indices.
pub const MAX_U16_INDEXED_VERTICES: usize = u16::MAX as usize + 1;

/// Format version written into the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u8,
    pub minor: u8,
}

impl FormatVersion {
    pub const CURRENT: FormatVersion = FormatVersion { major: 1, minor: 0 };

    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// Body compression mode, recorded uncompressed in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Blocks are written as produced.
    #[default]
    None,
    /// The body is a single zlib stream.
    #[serde(alias = "zlib", alias = "deflate")]
    Compressed,
}

impl Compression {
    /// Header byte for this mode.
    pub fn to_byte(self) -> u8 {
        match self {
            Compression::None => 0,
            Compression::Compressed => 1,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Compression::None),
            1 => Some(Compression::Compressed),
            _ => None,
        }
    }
}

/// Block type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BlockType {
    /// Deduplicated triangle geometry.
    Geometry = 1,
    /// Named mesh instance referencing a geometry block.
    SceneNode = 23,
}

impl BlockType {
    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(BlockType::Geometry),
            23 => Some(BlockType::SceneNode),
            _ => None,
        }
    }
}

/// Width of each entry in a geometry block's index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    /// Pick the index width for a vertex buffer of `vertex_count` entries.
    ///
    /// Up to 65 536 vertices every index fits in a `u16`; past that indices
    /// are promoted to `u32`. A buffer that even `u32` cannot address is a
    /// capacity error.
    pub fn for_vertex_count(vertex_count: usize) -> Result<Self> {
        if vertex_count <= MAX_U16_INDEXED_VERTICES {
            Ok(IndexWidth::U16)
        } else if u32::try_from(vertex_count).is_ok() {
            Ok(IndexWidth::U32)
        } else {
            Err(ExportError::Capacity(format!(
                "{} vertices cannot be addressed by 32-bit indices",
                vertex_count
            )))
        }
    }

    /// Size of one index in bytes.
    pub fn byte_size(self) -> usize {
        match self {
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
        }
    }
}

/// Convert a count to the `u32` the format stores it as.
pub(crate) fn count_u32(count: usize, what: &str) -> Result<u32> {
    u32::try_from(count)
        .map_err(|_| ExportError::Capacity(format!("{} {} exceeds u32::MAX", what, count)))
}

// ─── Wire helpers ───────────────────────────────────────────────────────────

pub(crate) fn write_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub(crate) fn write_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn write_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// Write the common block header: type tag, id and length-prefixed name.
pub(crate) fn write_block_header(
    buf: &mut Vec<u8>,
    block_type: BlockType,
    id: u32,
    name: &[u8],
) -> Result<()> {
    let name_len = u16::try_from(name.len()).map_err(|_| {
        ExportError::Capacity(format!(
            "block name is {} bytes, limit is {}",
            name.len(),
            u16::MAX
        ))
    })?;
    write_u8(buf, block_type.tag());
    write_u32(buf, id);
    write_u16(buf, name_len);
    buf.extend_from_slice(name);
    Ok(())
}

/// Name bytes as they appear on the wire.
pub(crate) fn qualified_name(name: &str, namespace: Option<&str>) -> Vec<u8> {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{}:{}", ns, name).into_bytes(),
        _ => name.as_bytes().to_vec(),
    }
}
