//! Export options.

use crate::container::ContainerConfig;
use crate::error::Result;
use crate::format::{Compression, FormatVersion};
use crate::geometry::VertexAttributes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for one export. Every field has a default, so an options file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Body compression.
    pub compression: Compression,
    /// Format version written into the header.
    pub version: FormatVersion,
    /// Write per-vertex normals for meshes that have them.
    pub include_normals: bool,
    /// Write per-vertex UVs for meshes that have them.
    pub include_uv: bool,
    /// Appended to a mesh name to name its geometry block.
    pub geometry_suffix: String,
    /// Leave out meshes flagged as intermediate.
    pub skip_intermediate: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            compression: Compression::None,
            version: FormatVersion::CURRENT,
            include_normals: true,
            include_uv: true,
            geometry_suffix: "_geom".to_string(),
            skip_intermediate: true,
        }
    }
}

impl ExportOptions {
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_normals(mut self, include: bool) -> Self {
        self.include_normals = include;
        self
    }

    pub fn with_uv(mut self, include: bool) -> Self {
        self.include_uv = include;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Attributes requested for every mesh.
    pub fn attributes(&self) -> VertexAttributes {
        VertexAttributes::new(self.include_normals, self.include_uv)
    }

    pub fn container_config(&self) -> ContainerConfig {
        ContainerConfig::new(self.version, self.compression)
    }
}
