//! File-level export behaviour: atomic writes and compressed output.

use awd_exporter::{
    export_scene_to_path, Compression, Container, ContainerConfig, ExportError, ExportOptions,
    GeometryBlock, MeshDescriptor, SceneDescription, SceneNodeBlock,
};
use flate2::read::ZlibDecoder;
use std::io::Read;
use std::rc::Rc;

fn triangle_scene() -> SceneDescription {
    SceneDescription::new(vec![MeshDescriptor::new("pTriangle1").with_corners(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![[0.0, 0.0, 1.0]; 3],
        vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
    )])
}

#[test]
fn test_export_writes_file_with_default_extension() {
    let dir = tempfile::tempdir().unwrap();
    let summary =
        export_scene_to_path(&triangle_scene(), dir.path().join("scene"), ExportOptions::default())
            .unwrap();

    let path = dir.path().join("scene.awd");
    let data = std::fs::read(&path).unwrap();
    assert_eq!(data.len(), summary.bytes_written);
    assert_eq!(&data[0..3], b"AWD");
    assert_eq!(&data[6..10], &2u32.to_le_bytes());

    // Only the target remains; the temporary file was renamed away.
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_compressed_file_inflates_to_plain_body() {
    let dir = tempfile::tempdir().unwrap();
    let plain_path = dir.path().join("plain.awd");
    let packed_path = dir.path().join("packed.awd");

    export_scene_to_path(&triangle_scene(), &plain_path, ExportOptions::default()).unwrap();
    export_scene_to_path(
        &triangle_scene(),
        &packed_path,
        ExportOptions::default().with_compression(Compression::Compressed),
    )
    .unwrap();

    let plain = std::fs::read(&plain_path).unwrap();
    let packed = std::fs::read(&packed_path).unwrap();
    assert_eq!(plain[5], 0);
    assert_eq!(packed[5], 1);
    assert_eq!(&plain[0..5], &packed[0..5]);

    let mut inflated = Vec::new();
    ZlibDecoder::new(&packed[6..])
        .read_to_end(&mut inflated)
        .unwrap();
    assert_eq!(inflated, plain[6..].to_vec());
}

#[test]
fn test_unresolved_reference_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.awd");

    let mut container = Container::new(ContainerConfig::default());
    let never_added = Rc::new(GeometryBlock::new("ghost_geom"));
    container
        .add_scene_block(SceneNodeBlock::new("ghost", never_added))
        .unwrap();

    let result = container.flush_to_path(&path);
    assert!(matches!(result, Err(ExportError::UnresolvedReference { .. })));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_failed_export_keeps_existing_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.awd");
    std::fs::write(&path, b"previous").unwrap();

    let mut scene = triangle_scene();
    scene.meshes[0].triangle_corner_count = 4;
    let result = export_scene_to_path(&scene, &path, ExportOptions::default());

    assert!(matches!(result, Err(ExportError::InvalidInput { .. })));
    assert_eq!(std::fs::read(&path).unwrap(), b"previous");
}

#[test]
fn test_unwritable_target_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing_dir").join("scene.awd");

    let result = export_scene_to_path(&triangle_scene(), &path, ExportOptions::default());
    assert!(matches!(result, Err(ExportError::Io(_))));
    assert!(!path.exists());
}
