//! AWD export pipeline.

use super::options::ExportOptions;
use crate::container::Container;
use crate::error::Result;
use crate::format::DEFAULT_EXTENSION;
use crate::geometry::{GeometryBlock, VertexDeduplicator};
use crate::scene_node::SceneNodeBlock;
use crate::types::{MeshDescriptor, SceneSource};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// What an export produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSummary {
    /// Meshes written (one geometry block and one scene node each).
    pub meshes_exported: usize,
    /// Intermediate meshes left out.
    pub meshes_skipped: usize,
    /// Blocks in the file.
    pub blocks: usize,
    /// Triangle corners received from the host.
    pub corners: usize,
    /// Vertices left after deduplication, over all meshes.
    pub unique_vertices: usize,
    /// File size in bytes. Zero until the file is written.
    pub bytes_written: usize,
}

/// Builds AWD containers from host scenes.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    options: ExportOptions,
}

impl Exporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Build a container holding every exported mesh of `source`.
    ///
    /// All meshes are validated before the first block is built, so invalid
    /// input never leaves a half-filled container behind.
    pub fn build_container<S: SceneSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<(Container, ExportSummary)> {
        let mut summary = ExportSummary::default();

        let mut selected: Vec<&MeshDescriptor> = Vec::new();
        for mesh in source.meshes() {
            if mesh.intermediate && self.options.skip_intermediate {
                log::debug!("Skipping intermediate mesh '{}'", mesh.name);
                summary.meshes_skipped += 1;
                continue;
            }
            selected.push(mesh);
        }

        for mesh in &selected {
            mesh.validate()?;
        }

        let mut container = Container::new(self.options.container_config());
        for mesh in selected {
            let attributes = mesh.attributes(self.options.attributes());
            let mut dedup = VertexDeduplicator::with_capacity(attributes, mesh.triangle_corner_count);
            dedup.extend(mesh.corners(attributes))?;

            let geometry_name = format!("{}{}", mesh.name, self.options.geometry_suffix);
            let mut geometry = GeometryBlock::new(geometry_name).with_namespace(mesh.namespace.clone());
            let stats = dedup.build(&mut geometry)?;

            let geometry = Rc::new(geometry);
            container.add_mesh_data(geometry.clone())?;
            container.add_scene_block(
                SceneNodeBlock::new(mesh.name.clone(), geometry).with_namespace(mesh.namespace.clone()),
            )?;

            summary.meshes_exported += 1;
            summary.corners += stats.corners;
            summary.unique_vertices += stats.unique_vertices;
        }

        summary.blocks = container.len();
        Ok((container, summary))
    }

    /// Export `source` to `sink`.
    pub fn export<S: SceneSource + ?Sized, W: Write>(
        &self,
        source: &S,
        sink: &mut W,
    ) -> Result<ExportSummary> {
        let (mut container, mut summary) = self.build_container(source)?;
        summary.bytes_written = container.flush(sink)?;
        Ok(summary)
    }

    /// Export `source` to a file, atomically. A path without an extension
    /// gets `.awd`.
    pub fn export_to_path<S: SceneSource + ?Sized, P: AsRef<Path>>(
        &self,
        source: &S,
        path: P,
    ) -> Result<ExportSummary> {
        let path = output_path(path.as_ref());
        let (mut container, mut summary) = self.build_container(source)?;
        summary.bytes_written = container.flush_to_path(&path)?;
        Ok(summary)
    }
}

/// Export a scene to AWD bytes in memory.
pub fn export_awd<S: SceneSource + ?Sized>(source: &S, options: &ExportOptions) -> Result<Vec<u8>> {
    let (container, _) = Exporter::new(options.clone()).build_container(source)?;
    container.encode()
}

/// `path`, with the default extension added if it has none.
pub fn output_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(DEFAULT_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::format::reader::{decode, DecodedPayload};
    use crate::format::{BlockType, Compression};
    use crate::types::SceneDescription;

    /// Two triangles sharing an edge, given per corner as a host triangulator would.
    fn quad_mesh(name: &str) -> MeshDescriptor {
        MeshDescriptor::new(name).with_corners(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
            ],
            vec![[0.0, 0.0, 1.0]; 6],
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]],
        )
    }

    #[test]
    fn test_export_quad_scene() {
        let scene = SceneDescription::new(vec![quad_mesh("pPlane1")]);
        let mut out = Vec::new();
        let summary = Exporter::default().export(&scene, &mut out).unwrap();

        assert_eq!(summary.meshes_exported, 1);
        assert_eq!(summary.blocks, 2);
        assert_eq!(summary.corners, 6);
        assert_eq!(summary.unique_vertices, 4);
        assert_eq!(summary.bytes_written, out.len());

        let decoded = decode(&out).unwrap();
        assert_eq!(decoded.blocks.len(), 2);

        let geometry = &decoded.blocks[0];
        assert_eq!(geometry.block_type, BlockType::Geometry);
        assert_eq!(geometry.id, 1);
        assert_eq!(geometry.name, "pPlane1_geom");
        match &geometry.payload {
            DecodedPayload::Geometry {
                vertex_count,
                flags,
                indices,
                ..
            } => {
                assert_eq!(*vertex_count, 4);
                assert_eq!(*flags, 0b11);
                assert_eq!(indices, &vec![0, 1, 2, 0, 1, 3]);
            }
            other => panic!("unexpected payload {:?}", other),
        }

        let node = &decoded.blocks[1];
        assert_eq!(node.block_type, BlockType::SceneNode);
        assert_eq!(node.id, 2);
        assert_eq!(node.name, "pPlane1");
        assert_eq!(node.payload, DecodedPayload::SceneNode { geometry_id: 1 });
    }

    #[test]
    fn test_intermediate_meshes_skipped() {
        let scene = SceneDescription::new(vec![
            quad_mesh("pPlane1ShapeOrig").intermediate(true),
            quad_mesh("pPlane1"),
        ]);
        let (container, summary) = Exporter::default().build_container(&scene).unwrap();
        assert_eq!(summary.meshes_skipped, 1);
        assert_eq!(container.len(), 2);
        assert_eq!(container.blocks()[1].name(), "pPlane1");

        let keep_all = ExportOptions {
            skip_intermediate: false,
            ..Default::default()
        };
        let (container, _) = Exporter::new(keep_all).build_container(&scene).unwrap();
        assert_eq!(container.len(), 4);
    }

    #[test]
    fn test_invalid_mesh_rejects_whole_export() {
        let mut broken = quad_mesh("broken");
        broken.uvs.truncate(5);
        let scene = SceneDescription::new(vec![quad_mesh("good"), broken]);

        let mut out = Vec::new();
        let result = Exporter::default().export(&scene, &mut out);
        match result {
            Err(ExportError::InvalidInput { mesh, .. }) => assert_eq!(mesh, "broken"),
            other => panic!("expected invalid input, got {:?}", other),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_options_drop_attributes() {
        let scene = SceneDescription::new(vec![quad_mesh("flat")]);
        let options = ExportOptions::default().with_normals(false).with_uv(false);
        let bytes = export_awd(&scene, &options).unwrap();
        let decoded = decode(&bytes).unwrap();
        match &decoded.blocks[0].payload {
            DecodedPayload::Geometry {
                flags,
                vertex_count,
                vertex_bytes,
                ..
            } => {
                assert_eq!(*flags, 0);
                assert_eq!(*vertex_count, 4);
                assert_eq!(vertex_bytes.len(), 4 * 12);
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_namespaced_mesh() {
        let scene = SceneDescription::new(vec![quad_mesh("body").with_namespace("hero")]);
        let decoded = decode(&export_awd(&scene, &ExportOptions::default()).unwrap()).unwrap();
        assert_eq!(decoded.blocks[0].name, "hero:body_geom");
        assert_eq!(decoded.blocks[1].name, "hero:body");
    }

    #[test]
    fn test_compressed_export() {
        let scene = SceneDescription::new(vec![quad_mesh("a"), quad_mesh("b")]);
        let plain = export_awd(&scene, &ExportOptions::default()).unwrap();
        let packed = export_awd(
            &scene,
            &ExportOptions::default().with_compression(Compression::Compressed),
        )
        .unwrap();

        assert_eq!(packed[5], 1);
        assert_eq!(
            decode(&packed).unwrap().body,
            plain[crate::format::HEADER_LEN..].to_vec()
        );
    }

    #[test]
    fn test_empty_scene() {
        let scene: &[MeshDescriptor] = &[];
        let bytes = export_awd(scene, &ExportOptions::default()).unwrap();
        assert_eq!(bytes.len(), crate::format::HEADER_LEN + 4);
    }

    #[test]
    fn test_output_path_extension() {
        assert_eq!(output_path(Path::new("out")), PathBuf::from("out.awd"));
        assert_eq!(output_path(Path::new("out.bin")), PathBuf::from("out.bin"));
    }
}
