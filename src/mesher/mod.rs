//! Mesh generation from an assembled scene.
//!
//! This module converts a [`RenderList`] into triangle meshes grouped by material.

pub mod geometry;
pub mod tessellate;

pub use geometry::{Mesh, Vertex};

use crate::error::Result;
use crate::layout::Material;
use crate::scene::RenderList;
use crate::types::BoundingBox;

/// Main mesher configuration.
#[derive(Debug, Clone)]
pub struct MesherConfig {
    /// Share one batch between components with identical materials.
    pub merge_materials: bool,
    /// Bake the material color into vertex colors.
    pub vertex_colors: bool,
    /// Emit explicit back faces for double-sided materials.
    pub back_faces: bool,
}

impl Default for MesherConfig {
    fn default() -> Self {
        Self {
            merge_materials: true,
            vertex_colors: true,
            back_faces: false,
        }
    }
}

/// Geometry sharing one material.
#[derive(Debug, Clone)]
pub struct MeshBatch {
    /// Unique within one output.
    pub name: String,
    pub material: Material,
    pub mesh: Mesh,
}

/// Output from the mesher.
#[derive(Debug, Clone)]
pub struct MesherOutput {
    /// Batches in order of first appearance in the render list.
    pub batches: Vec<MeshBatch>,
    /// Bounding box of all vertices.
    pub bounds: BoundingBox,
    /// Vertex colors carry the material color (linear RGBA). Otherwise they are white.
    pub vertex_colors: bool,
}

impl MesherOutput {
    /// All batches merged into a single mesh.
    pub fn mesh(&self) -> Mesh {
        let mut combined = Mesh::new();
        for batch in &self.batches {
            combined.merge(&batch.mesh);
        }
        combined
    }

    pub fn is_empty(&self) -> bool {
        self.batches.iter().all(|b| b.mesh.is_empty())
    }

    /// Get total vertex count across all batches.
    pub fn total_vertices(&self) -> usize {
        self.batches.iter().map(|b| b.mesh.vertex_count()).sum()
    }

    /// Get total triangle count across all batches.
    pub fn total_triangles(&self) -> usize {
        self.batches.iter().map(|b| b.mesh.triangle_count()).sum()
    }
}

/// The main mesher struct.
#[derive(Debug, Clone, Default)]
pub struct Mesher {
    config: MesherConfig,
}

impl Mesher {
    /// Create a new mesher with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new mesher with custom configuration.
    pub fn with_config(config: MesherConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &MesherConfig {
        &self.config
    }

    /// Tessellate every item of a render list.
    pub fn mesh(&self, scene: &RenderList) -> Result<MesherOutput> {
        let mut batches: Vec<MeshBatch> = Vec::new();

        for item in scene {
            let mut mesh = tessellate::tessellate_placed(&item.shape, &item.transform());
            if self.config.back_faces && item.material.double_sided {
                tessellate::add_back_faces(&mut mesh);
            }
            if self.config.vertex_colors {
                mesh.paint(item.material.color.to_linear_rgba());
            }

            let existing = if self.config.merge_materials {
                batches.iter_mut().find(|b| b.material == item.material)
            } else {
                None
            };
            match existing {
                Some(batch) => batch.mesh.merge(&mesh),
                None => {
                    let base = if self.config.merge_materials {
                        item.material.color_source.to_string()
                    } else {
                        item.id.to_string()
                    };
                    let name = unique_name(&batches, base);
                    batches.push(MeshBatch {
                        name,
                        material: item.material,
                        mesh,
                    });
                }
            }
        }

        let bounds = BoundingBox::from_points(
            batches
                .iter()
                .flat_map(|b| b.mesh.vertices.iter().map(|v| v.position)),
        )
        .unwrap_or_else(|| BoundingBox::new([0.0; 3], [0.0; 3]));

        let output = MesherOutput {
            batches,
            bounds,
            vertex_colors: self.config.vertex_colors,
        };
        log::debug!(
            "Meshed {} items into {} batches: {} vertices, {} triangles",
            scene.len(),
            output.batches.len(),
            output.total_vertices(),
            output.total_triangles()
        );
        Ok(output)
    }
}

fn unique_name(batches: &[MeshBatch], base: String) -> String {
    if !batches.iter().any(|b| b.name == base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !batches.iter().any(|b| b.name == candidate) {
            return candidate;
        }
        n += 1;
    }
}
