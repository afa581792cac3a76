//! Mesh instance blocks.

use crate::error::Result;
use crate::format::{self, BlockType};
use crate::geometry::GeometryBlock;
use std::rc::Rc;

/// A named instance of a geometry block in the scene.
///
/// The referenced geometry is held by handle; its block id is looked up in
/// the owning container when the file is written, so the geometry may be
/// added to the container before or after this node.
#[derive(Debug, Clone)]
pub struct SceneNodeBlock {
    name: String,
    namespace: Option<String>,
    geometry: Rc<GeometryBlock>,
}

impl SceneNodeBlock {
    pub fn new(name: impl Into<String>, geometry: Rc<GeometryBlock>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            geometry,
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

    pub fn geometry(&self) -> &Rc<GeometryBlock> {
        &self.geometry
    }

    /// Point this node at a different geometry block.
    pub fn set_geometry(&mut self, geometry: Rc<GeometryBlock>) {
        self.geometry = geometry;
    }

    /// Bytes this block occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        1 + 4 + 2 + format::qualified_name(&self.name, self.namespace()).len() + 4
    }

    /// Append this block to `buf`. `geometry_id` is the resolved id of
    /// [`geometry`](Self::geometry) in the same container.
    pub(crate) fn encode(&self, id: u32, geometry_id: u32, buf: &mut Vec<u8>) -> Result<()> {
        let name = format::qualified_name(&self.name, self.namespace());
        format::write_block_header(buf, BlockType::SceneNode, id, &name)?;
        format::write_u32(buf, geometry_id);
        Ok(())
    }
}
