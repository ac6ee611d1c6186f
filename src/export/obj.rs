//! Wavefront OBJ export.
//!
//! OBJ is a simple, widely-supported text-based 3D format.
//! Each batch becomes a `usemtl` group backed by an entry in the MTL file.

use crate::error::{BookError, Result};
use crate::mesher::MesherOutput;
use crate::types::linear_to_srgb;
use std::fmt::Write;

/// OBJ geometry and its companion material library.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjExport {
    pub obj: String,
    pub mtl: String,
}

impl ObjExport {
    pub fn from_output(output: &MesherOutput, name: &str) -> Result<Self> {
        let obj = write_obj(output, name).map_err(fmt_error)?;
        let mtl = write_mtl(output).map_err(fmt_error)?;
        Ok(Self { obj, mtl })
    }
}

/// Export meshed batches to OBJ format.
pub fn export_obj(output: &MesherOutput, name: &str) -> Result<ObjExport> {
    if output.is_empty() {
        return Err(BookError::Export("Cannot export empty mesh".to_string()));
    }
    ObjExport::from_output(output, name)
}

fn fmt_error(e: std::fmt::Error) -> BookError {
    BookError::Export(format!("Failed to format OBJ: {}", e))
}

fn write_obj(output: &MesherOutput, name: &str) -> std::result::Result<String, std::fmt::Error> {
    let total_verts = output.total_vertices();
    let total_tris = output.total_triangles();

    // ~60 bytes per v/vn line, ~40 per face
    let mut obj = String::with_capacity(256 + total_verts * 120 + total_tris * 40);

    writeln!(obj, "# Book Mesher OBJ Export")?;
    writeln!(obj, "# Vertices: {}", total_verts)?;
    writeln!(obj, "# Triangles: {}", total_tris)?;
    writeln!(obj)?;
    writeln!(obj, "mtllib {}.mtl", name)?;
    writeln!(obj, "o {}", name)?;
    writeln!(obj)?;

    // Global pools: positions (with sRGB vertex color extension), then normals
    for batch in &output.batches {
        for v in &batch.mesh.vertices {
            let [r, g, b] = [v.color[0], v.color[1], v.color[2]].map(linear_to_srgb);
            let [x, y, z] = v.position;
            writeln!(obj, "v {} {} {} {} {} {}", x, y, z, r, g, b)?;
        }
    }
    writeln!(obj)?;
    for batch in &output.batches {
        for v in &batch.mesh.vertices {
            writeln!(obj, "vn {} {} {}", v.normal[0], v.normal[1], v.normal[2])?;
        }
    }

    let mut vertex_offset: usize = 0;
    for batch in &output.batches {
        if batch.mesh.is_empty() {
            continue;
        }
        writeln!(obj)?;
        writeln!(obj, "g {}", batch.name)?;
        writeln!(obj, "usemtl {}", batch.name)?;
        for t in batch.mesh.indices.chunks_exact(3) {
            let [i0, i1, i2] = [t[0], t[1], t[2]].map(|i| i as usize + vertex_offset + 1);
            writeln!(obj, "f {}//{} {}//{} {}//{}", i0, i0, i1, i1, i2, i2)?;
        }
        vertex_offset += batch.mesh.vertex_count();
    }

    Ok(obj)
}

fn write_mtl(output: &MesherOutput) -> std::result::Result<String, std::fmt::Error> {
    let mut mtl = String::with_capacity(128 * (output.batches.len() + 1));
    writeln!(mtl, "# Book Mesher Materials")?;

    for batch in &output.batches {
        let material = &batch.material;
        let [r, g, b] = material.color.to_f32();
        // Phong exponent from roughness: rough surfaces get a wide, dim highlight
        let shininess = (1.0 - material.roughness).clamp(0.0, 1.0).powi(2) * 1000.0;
        let specular = 0.04 + material.metalness * 0.96;

        writeln!(mtl)?;
        writeln!(mtl, "newmtl {}", batch.name)?;
        writeln!(mtl, "Ka 0.0 0.0 0.0")?;
        writeln!(mtl, "Kd {:.6} {:.6} {:.6}", r, g, b)?;
        writeln!(mtl, "Ks {:.6} {:.6} {:.6}", specular, specular, specular)?;
        writeln!(mtl, "Ns {:.3}", shininess)?;
        writeln!(mtl, "d 1.0")?;
        writeln!(mtl, "illum 2")?;
        writeln!(mtl, "Pr {:.3}", material.roughness)?;
        writeln!(mtl, "Pm {:.3}", material.metalness)?;
    }

    Ok(mtl)
}
