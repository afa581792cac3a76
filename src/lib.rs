//! # AWD Exporter
//!
//! A Rust library for writing 3D scenes to the block-structured AWD container format.
//!
//! ## Overview
//!
//! The host application (a DCC tool or asset pipeline) describes its scene as a
//! list of triangulated meshes with attributes given once per triangle corner.
//! This library deduplicates those corners into compact indexed vertex buffers
//! and writes one geometry block plus one mesh-instance block per mesh.
//! The file format is documented in [`format`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use awd_exporter::{Exporter, ExportOptions, MeshDescriptor, SceneDescription};
//!
//! let mesh = MeshDescriptor::new("pPlane1").with_corners(positions, normals, uvs);
//! let scene = SceneDescription::new(vec![mesh]);
//!
//! let summary = Exporter::new(ExportOptions::default())
//!     .export_to_path(&scene, "scene.awd")?;
//! println!("{} vertices", summary.unique_vertices);
//! ```
//!
//! ## Lower-level API
//!
//! Blocks can also be assembled by hand:
//!
//! ```ignore
//! use awd_exporter::{Container, ContainerConfig, GeometryBlock, SceneNodeBlock,
//!                    VertexAttributes, VertexDeduplicator};
//! use std::rc::Rc;
//!
//! let mut dedup = VertexDeduplicator::new(VertexAttributes::ALL);
//! for record in corners {
//!     dedup.append(record)?;
//! }
//! let mut geometry = GeometryBlock::new("pPlane1_geom");
//! dedup.build(&mut geometry)?;
//! let geometry = Rc::new(geometry);
//!
//! let mut container = Container::new(ContainerConfig::default());
//! container.add_mesh_data(geometry.clone())?;
//! container.add_scene_block(SceneNodeBlock::new("pPlane1", geometry))?;
//! container.flush(&mut std::io::stdout())?;
//! ```

pub mod error;
pub mod format;
pub mod types;
pub mod geometry;
pub mod scene_node;
pub mod container;
pub mod export;

// Re-export main types for convenience
pub use error::{ExportError, Result};
pub use format::{BlockType, Compression, FormatVersion, IndexWidth, DEFAULT_EXTENSION};
pub use types::{MeshDescriptor, SceneDescription, SceneSource};
pub use geometry::{
    DedupStats, GeometryBlock, RawVertexRecord, Vertex, VertexAttributes, VertexDeduplicator,
};
pub use scene_node::SceneNodeBlock;
pub use container::{Block, Container, ContainerConfig};
pub use export::{export_awd, ExportOptions, ExportSummary, Exporter};

/// Load a scene description from a JSON file.
pub fn load_scene<P: AsRef<std::path::Path>>(path: P) -> Result<SceneDescription> {
    SceneDescription::from_path(path)
}

/// Export a scene to a file with the given options.
pub fn export_scene_to_path<S, P>(scene: &S, path: P, options: ExportOptions) -> Result<ExportSummary>
where
    S: SceneSource + ?Sized,
    P: AsRef<std::path::Path>,
{
    Exporter::new(options).export_to_path(scene, path)
}
