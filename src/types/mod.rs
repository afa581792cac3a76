//! Scene description supplied by the host application.

use crate::error::{ExportError, Result};
use crate::geometry::{RawVertexRecord, VertexAttributes};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One host mesh, triangulated, with attributes given per triangle corner.
///
/// Positions are either one per corner, or a shared pool addressed through
/// `position_indices` (one entry per corner). Normals and UVs are always one
/// per corner; an empty array means the mesh has no such attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshDescriptor {
    /// Display name, e.g. "pCube1".
    pub name: String,
    /// Optional qualifier, written as "namespace:name".
    #[serde(default)]
    pub namespace: Option<String>,
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub position_indices: Option<Vec<u32>>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    #[serde(default)]
    pub uvs: Vec<[f32; 2]>,
    /// Number of triangle corners (3 per triangle).
    pub triangle_corner_count: usize,
    /// Construction-history object that should not be exported.
    #[serde(default)]
    pub intermediate: bool,
}

impl MeshDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set per-corner attributes; the corner count follows `positions`.
    pub fn with_corners(
        mut self,
        positions: Vec<[f32; 3]>,
        normals: Vec<[f32; 3]>,
        uvs: Vec<[f32; 2]>,
    ) -> Self {
        self.triangle_corner_count = positions.len();
        self.positions = positions;
        self.position_indices = None;
        self.normals = normals;
        self.uvs = uvs;
        self
    }

    /// Use `positions` as a shared pool addressed per corner by `indices`.
    pub fn with_indexed_positions(mut self, positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        self.triangle_corner_count = indices.len();
        self.positions = positions;
        self.position_indices = Some(indices);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn intermediate(mut self, intermediate: bool) -> Self {
        self.intermediate = intermediate;
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_corner_count / 3
    }

    /// Attributes this mesh can supply out of those `requested`.
    pub fn attributes(&self, requested: VertexAttributes) -> VertexAttributes {
        VertexAttributes {
            normals: requested.normals && !self.normals.is_empty(),
            uv: requested.uv && !self.uvs.is_empty(),
        }
    }

    /// Check array lengths and indices against the corner count.
    pub fn validate(&self) -> Result<()> {
        let corners = self.triangle_corner_count;
        if corners % 3 != 0 {
            return Err(ExportError::invalid_input(
                &self.name,
                format!("triangle corner count {} is not a multiple of 3", corners),
            ));
        }

        match &self.position_indices {
            Some(indices) => {
                if indices.len() != corners {
                    return Err(ExportError::invalid_input(
                        &self.name,
                        format!("{} position indices for {} corners", indices.len(), corners),
                    ));
                }
                if let Some(bad) = indices.iter().find(|&&i| i as usize >= self.positions.len()) {
                    return Err(ExportError::invalid_input(
                        &self.name,
                        format!(
                            "position index {} out of range ({} positions)",
                            bad,
                            self.positions.len()
                        ),
                    ));
                }
            }
            None => {
                if self.positions.len() != corners {
                    return Err(ExportError::invalid_input(
                        &self.name,
                        format!("{} positions for {} corners", self.positions.len(), corners),
                    ));
                }
            }
        }

        if !self.normals.is_empty() && self.normals.len() != corners {
            return Err(ExportError::invalid_input(
                &self.name,
                format!("{} normals for {} corners", self.normals.len(), corners),
            ));
        }
        if !self.uvs.is_empty() && self.uvs.len() != corners {
            return Err(ExportError::invalid_input(
                &self.name,
                format!("{} UVs for {} corners", self.uvs.len(), corners),
            ));
        }

        Ok(())
    }

    /// Per-corner records. Only meaningful after [`validate`](Self::validate) succeeds.
    pub fn corners(&self, attributes: VertexAttributes) -> impl Iterator<Item = RawVertexRecord> + '_ {
        (0..self.triangle_corner_count).map(move |corner| {
            let position = match &self.position_indices {
                Some(indices) => self.positions[indices[corner] as usize],
                None => self.positions[corner],
            };
            RawVertexRecord {
                position,
                normal: if attributes.normals {
                    self.normals[corner]
                } else {
                    [0.0; 3]
                },
                uv: if attributes.uv { self.uvs[corner] } else { [0.0; 2] },
            }
        })
    }
}

/// A whole scene: the meshes to export, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub meshes: Vec<MeshDescriptor>,
}

impl SceneDescription {
    pub fn new(meshes: Vec<MeshDescriptor>) -> Self {
        Self { meshes }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scene description from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Anything that can list meshes for export.
pub trait SceneSource {
    /// Meshes in export order.
    fn meshes(&self) -> Box<dyn Iterator<Item = &MeshDescriptor> + '_>;

    fn mesh_count(&self) -> usize {
        self.meshes().count()
    }
}

impl SceneSource for SceneDescription {
    fn meshes(&self) -> Box<dyn Iterator<Item = &MeshDescriptor> + '_> {
        Box::new(self.meshes.iter())
    }

    fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

impl SceneSource for [MeshDescriptor] {
    fn meshes(&self) -> Box<dyn Iterator<Item = &MeshDescriptor> + '_> {
        Box::new(self.iter())
    }

    fn mesh_count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshDescriptor {
        MeshDescriptor::new("tri").with_corners(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[0.0, 0.0, 1.0]; 3],
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        )
    }

    #[test]
    fn test_valid_triangle() {
        let mesh = triangle();
        mesh.validate().unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        let corners: Vec<_> = mesh.corners(VertexAttributes::ALL).collect();
        assert_eq!(corners.len(), 3);
        assert_eq!(corners[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(corners[2].uv, [0.0, 1.0]);
    }

    #[test]
    fn test_corner_count_not_multiple_of_three() {
        let mut mesh = triangle();
        mesh.positions.push([2.0, 2.0, 2.0]);
        mesh.triangle_corner_count = 4;
        let err = mesh.validate().unwrap_err();
        assert!(err.to_string().contains("not a multiple of 3"));
    }

    #[test]
    fn test_mismatched_normals() {
        let mut mesh = triangle();
        mesh.normals.pop();
        assert!(matches!(mesh.validate(), Err(ExportError::InvalidInput { .. })));
    }

    #[test]
    fn test_mismatched_positions() {
        let mut mesh = triangle();
        mesh.triangle_corner_count = 6;
        assert!(matches!(mesh.validate(), Err(ExportError::InvalidInput { .. })));
    }

    #[test]
    fn test_indexed_positions() {
        let mesh = MeshDescriptor::new("quad").with_indexed_positions(
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            vec![0, 1, 2, 0, 2, 3],
        );
        mesh.validate().unwrap();
        let positions: Vec<_> = mesh
            .corners(VertexAttributes::POSITION_ONLY)
            .map(|c| c.position)
            .collect();
        assert_eq!(positions[4], [1.0, 1.0, 0.0]);
        assert_eq!(positions[5], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_position_index_out_of_range() {
        let mesh = MeshDescriptor::new("bad")
            .with_indexed_positions(vec![[0.0, 0.0, 0.0]], vec![0, 0, 1]);
        let err = mesh.validate().unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_missing_attributes_are_dropped() {
        let mesh = MeshDescriptor::new("bare").with_corners(vec![[0.0; 3]; 3], vec![], vec![]);
        mesh.validate().unwrap();
        assert_eq!(
            mesh.attributes(VertexAttributes::ALL),
            VertexAttributes::POSITION_ONLY
        );
        assert_eq!(
            triangle().attributes(VertexAttributes::new(false, true)),
            VertexAttributes::new(false, true)
        );
    }

    #[test]
    fn test_scene_from_json() {
        let json = r#"{
            "meshes": [
                {
                    "name": "pPlane1",
                    "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                    "normals": [[0, 0, 1], [0, 0, 1], [0, 0, 1]],
                    "triangle_corner_count": 3
                },
                {
                    "name": "history",
                    "positions": [],
                    "triangle_corner_count": 0,
                    "intermediate": true
                }
            ]
        }"#;
        let scene = SceneDescription::from_json_str(json).unwrap();
        assert_eq!(scene.mesh_count(), 2);
        assert!(scene.meshes[0].uvs.is_empty());
        assert!(scene.meshes[1].intermediate);
        scene.meshes[0].validate().unwrap();
    }
}
