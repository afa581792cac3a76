//! The top-level AWD writer.
//!
//! A [`Container`] collects blocks for one export, assigns them ids in
//! insertion order and writes the whole file in a single call.
//!
//! ```ignore
//! use awd_exporter::{Container, ContainerConfig, GeometryBlock, SceneNodeBlock};
//! use std::rc::Rc;
//!
//! let mut container = Container::new(ContainerConfig::default());
//! let geometry = Rc::new(GeometryBlock::new("cube_geom"));
//! container.add_mesh_data(geometry.clone())?;
//! container.add_scene_block(SceneNodeBlock::new("cube", geometry))?;
//! container.flush_to_path("scene.awd")?;
//! ```

use crate::error::{ExportError, Result};
use crate::format::{self, BlockType, Compression, FormatVersion};
use crate::geometry::GeometryBlock;
use crate::scene_node::SceneNodeBlock;
use flate2::write::ZlibEncoder;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Per-export container settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerConfig {
    /// Version written into the header.
    pub version: FormatVersion,
    /// Body compression.
    pub compression: Compression,
}

impl ContainerConfig {
    pub fn new(version: FormatVersion, compression: Compression) -> Self {
        Self {
            version,
            compression,
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

/// A block held by a container.
#[derive(Debug, Clone)]
pub enum Block {
    Geometry(Rc<GeometryBlock>),
    SceneNode(SceneNodeBlock),
}

impl Block {
    pub fn block_type(&self) -> BlockType {
        match self {
            Block::Geometry(_) => BlockType::Geometry,
            Block::SceneNode(_) => BlockType::SceneNode,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Block::Geometry(geometry) => geometry.name(),
            Block::SceneNode(node) => node.name(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Block::Geometry(geometry) => geometry.namespace(),
            Block::SceneNode(node) => node.namespace(),
        }
    }
}

/// Ordered block list plus the settings for one output file.
///
/// Block ids are 1-based: the first block added gets id 1, and a block's id
/// is always its position in the list plus one.
#[derive(Debug)]
pub struct Container {
    config: ContainerConfig,
    blocks: Vec<Block>,
    finalized: bool,
}

impl Container {
    pub fn new(config: ContainerConfig) -> Self {
        Self {
            config,
            blocks: Vec::new(),
            finalized: false,
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// True once [`flush`](Self::flush) or [`flush_to_path`](Self::flush_to_path) has been called.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Add a geometry block and return its id.
    pub fn add_mesh_data(&mut self, geometry: Rc<GeometryBlock>) -> Result<u32> {
        let id = self.next_id()?;
        log::debug!(
            "Block {}: geometry '{}' ({} vertices, {} triangles)",
            id,
            geometry.name(),
            geometry.vertex_count(),
            geometry.triangle_count()
        );
        self.blocks.push(Block::Geometry(geometry));
        Ok(id)
    }

    /// Add a scene node block and return its id.
    ///
    /// The node's geometry does not have to be in the container yet, but it
    /// must be by the time the container is flushed.
    pub fn add_scene_block(&mut self, node: SceneNodeBlock) -> Result<u32> {
        let id = self.next_id()?;
        log::debug!(
            "Block {}: scene node '{}' -> geometry '{}'",
            id,
            node.name(),
            node.geometry().name()
        );
        self.blocks.push(Block::SceneNode(node));
        Ok(id)
    }

    /// Id of the block that holds `geometry`, if it was added.
    ///
    /// If the same geometry was added more than once, the first id wins.
    pub fn geometry_id(&self, geometry: &Rc<GeometryBlock>) -> Option<u32> {
        self.blocks.iter().enumerate().find_map(|(i, block)| match block {
            Block::Geometry(g) if Rc::ptr_eq(g, geometry) => Some(i as u32 + 1),
            _ => None,
        })
    }

    fn next_id(&self) -> Result<u32> {
        if self.finalized {
            return Err(ExportError::Finalized);
        }
        format::count_u32(self.blocks.len() + 1, "block count")
    }

    /// Encode the complete file into memory without finalizing the container.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let body = self.encode_body()?;

        let mut file = Vec::with_capacity(format::HEADER_LEN + body.len());
        file.extend_from_slice(format::MAGIC);
        format::write_u8(&mut file, self.config.version.major);
        format::write_u8(&mut file, self.config.version.minor);
        format::write_u8(&mut file, self.config.compression.to_byte());

        match self.config.compression {
            Compression::None => file.extend_from_slice(&body),
            Compression::Compressed => {
                let mut encoder = ZlibEncoder::new(file, flate2::Compression::default());
                encoder.write_all(&body)?;
                file = encoder.finish()?;
                log::debug!(
                    "Compressed body {} -> {} bytes",
                    body.len(),
                    file.len() - format::HEADER_LEN
                );
            }
        }

        Ok(file)
    }

    /// Block count followed by every block in insertion order.
    fn encode_body(&self) -> Result<Vec<u8>> {
        let block_count = format::count_u32(self.blocks.len(), "block count")?;
        let geometry_ids = self.geometry_ids();

        let mut body = Vec::new();
        format::write_u32(&mut body, block_count);

        for (i, block) in self.blocks.iter().enumerate() {
            let id = i as u32 + 1;
            match block {
                Block::Geometry(geometry) => geometry.encode(id, &mut body)?,
                Block::SceneNode(node) => {
                    let key = Rc::as_ptr(node.geometry());
                    let geometry_id = *geometry_ids.get(&key).ok_or_else(|| {
                        ExportError::UnresolvedReference {
                            node: node.name().to_string(),
                            node_id: id,
                        }
                    })?;
                    node.encode(id, geometry_id, &mut body)?;
                }
            }
        }

        Ok(body)
    }

    /// Geometry identity to block id, first occurrence kept.
    fn geometry_ids(&self) -> HashMap<*const GeometryBlock, u32> {
        let mut ids = HashMap::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if let Block::Geometry(geometry) = block {
                ids.entry(Rc::as_ptr(geometry)).or_insert(i as u32 + 1);
            }
        }
        ids
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(ExportError::Finalized);
        }
        self.finalized = true;
        Ok(())
    }

    /// Write the file to `sink` and return the number of bytes written.
    ///
    /// The file is built in memory first and handed to the sink with a single
    /// `write_all`, so an encoding error never reaches the sink. A sink that
    /// fails part way through may still hold a prefix; use
    /// [`flush_to_path`](Self::flush_to_path) for all-or-nothing file output.
    ///
    /// The container is finalized even if this fails.
    pub fn flush<W: Write>(&mut self, sink: &mut W) -> Result<usize> {
        self.finalize()?;
        let data = self.encode()?;
        sink.write_all(&data)?;
        sink.flush()?;
        log::info!("Wrote {} blocks ({} bytes)", self.blocks.len(), data.len());
        Ok(data.len())
    }

    /// Write the file to `path` atomically and return the number of bytes written.
    ///
    /// Data goes to a temporary file next to `path` that is renamed over the
    /// target once complete. On any failure the temporary file is removed
    /// and the target is left as it was.
    pub fn flush_to_path<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        self.finalize()?;
        let data = self.encode()?;

        let tmp_path = temporary_path(path);
        if let Err(e) = write_and_sync(&tmp_path, &data).and_then(|_| fs::rename(&tmp_path, path)) {
            // Best effort; the write error is what the caller needs.
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        log::info!(
            "Wrote {} blocks ({} bytes) to {:?}",
            self.blocks.len(),
            data.len(),
            path
        );
        Ok(data.len())
    }
}

/// `dir/.name.tmp` for `dir/name`.
fn temporary_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("scene.{}", format::DEFAULT_EXTENSION));
    path.with_file_name(format!(".{}.tmp", file_name))
}

fn write_and_sync(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
