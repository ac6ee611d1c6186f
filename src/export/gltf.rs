//! glTF/GLB export.

use crate::error::{BookError, Result};
use crate::layout::Material;
use crate::mesher::geometry::Mesh;
use crate::mesher::MesherOutput;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::mem;

/// Byte ranges of one mesh inside the binary buffer.
struct MeshOffsets {
    pos_offset: usize,
    pos_bytes: usize,
    norm_offset: usize,
    norm_bytes: usize,
    color_offset: usize,
    color_bytes: usize,
    idx_offset: usize,
    idx_bytes: usize,
    vertex_count: usize,
    index_count: usize,
    min: [f32; 3],
    max: [f32; 3],
}

fn write_mesh(buffer: &mut Vec<u8>, mesh: &Mesh) -> Option<MeshOffsets> {
    let (min, max) = mesh.extent()?;
    let positions = mesh.positions_flat();
    let normals = mesh.normals_flat();
    let colors = mesh.colors_flat();

    let pos_offset = buffer.len();
    buffer.extend_from_slice(cast_slice(&positions));
    let norm_offset = buffer.len();
    buffer.extend_from_slice(cast_slice(&normals));
    let color_offset = buffer.len();
    buffer.extend_from_slice(cast_slice(&colors));
    let idx_offset = buffer.len();
    buffer.extend_from_slice(cast_slice(&mesh.indices));
    let end = buffer.len();

    Some(MeshOffsets {
        pos_offset,
        pos_bytes: norm_offset - pos_offset,
        norm_offset,
        norm_bytes: color_offset - norm_offset,
        color_offset,
        color_bytes: idx_offset - color_offset,
        idx_offset,
        idx_bytes: end - idx_offset,
        vertex_count: mesh.vertex_count(),
        index_count: mesh.indices.len(),
        min,
        max,
    })
}

/// Export meshed batches to GLB format (binary glTF).
/// Each batch becomes one primitive with its own PBR material.
pub fn export_glb(output: &MesherOutput) -> Result<Vec<u8>> {
    if output.is_empty() {
        return Err(BookError::Export("Cannot export empty mesh".to_string()));
    }

    let mut buffer_data: Vec<u8> = Vec::new();
    let mut accessors = Vec::new();
    let mut buffer_views = Vec::new();
    let mut primitives = Vec::new();
    let mut materials = Vec::new();

    for batch in &output.batches {
        let Some(offsets) = write_mesh(&mut buffer_data, &batch.mesh) else {
            continue;
        };
        let material_idx = materials.len() as u32;
        materials.push(create_material(&batch.material, output.vertex_colors));

        let view_start = buffer_views.len() as u32;
        let array = Some(json::buffer::Target::ArrayBuffer);
        buffer_views.push(create_buffer_view(offsets.pos_offset, offsets.pos_bytes, array));
        buffer_views.push(create_buffer_view(offsets.norm_offset, offsets.norm_bytes, array));
        buffer_views.push(create_buffer_view(offsets.color_offset, offsets.color_bytes, array));
        buffer_views.push(create_buffer_view(
            offsets.idx_offset,
            offsets.idx_bytes,
            Some(json::buffer::Target::ElementArrayBuffer),
        ));

        let accessor_start = accessors.len() as u32;
        let f32_type = json::accessor::ComponentType::F32;
        let vec3 = json::accessor::Type::Vec3;
        let vertex_count = offsets.vertex_count;
        accessors.push(create_accessor(
            view_start,
            vertex_count,
            vec3,
            f32_type,
            Some(offsets.min),
            Some(offsets.max),
        ));
        accessors.push(create_accessor(view_start + 1, vertex_count, vec3, f32_type, None, None));
        accessors.push(create_accessor(
            view_start + 2,
            vertex_count,
            json::accessor::Type::Vec4,
            f32_type,
            None,
            None,
        ));
        accessors.push(create_accessor(
            view_start + 3,
            offsets.index_count,
            json::accessor::Type::Scalar,
            json::accessor::ComponentType::U32,
            None,
            None,
        ));

        primitives.push(create_primitive(accessor_start, material_idx));
    }

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(buffer_data.len() as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        materials,
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives,
            weights: None,
        }],
        nodes: vec![json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(0)),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        }],
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: vec![json::Index::new(0)],
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| BookError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    Ok(pack_glb(json_string.as_bytes(), &buffer_data))
}

/// Wrap a JSON chunk and a BIN chunk in a GLB container.
fn pack_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // JSON
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(0x20u8).take(json_padding));

    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // BIN
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat(0u8).take(buffer_padding));

    glb
}

fn create_buffer_view(
    offset: usize,
    size: usize,
    target: Option<json::buffer::Target>,
) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: target.map(Valid),
    }
}

fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// Primitive whose four accessors start at `first_accessor`:
/// positions, normals, colors, indices.
fn create_primitive(first_accessor: u32, material: u32) -> json::mesh::Primitive {
    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(first_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        json::Index::new(first_accessor + 1),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Colors(0)),
        json::Index::new(first_accessor + 2),
    );

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(first_accessor + 3)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// glTF multiplies the base color factor by COLOR_0, so exactly one of them
/// carries the material color.
fn create_material(material: &Material, vertex_colors: bool) -> json::Material {
    let base_color = if vertex_colors {
        [1.0; 4]
    } else {
        material.color.to_linear_rgba()
    };
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: None,
            base_color_factor: json::material::PbrBaseColorFactor(base_color),
            metallic_factor: json::material::StrengthFactor(material.metalness),
            roughness_factor: json::material::StrengthFactor(material.roughness),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(json::material::AlphaMode::Opaque),
        alpha_cutoff: None,
        double_sided: material.double_sided,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Cast a slice of plain numbers to bytes.
fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = slice.len() * mem::size_of::<T>();
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BookConfig, ViewVariant};
    use crate::mesher::{Mesher, MesherConfig, MesherOutput};
    use crate::scene::{BookScene, RenderList};
    use crate::types::BoundingBox;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn json_chunk(glb: &[u8]) -> serde_json::Value {
        let len = read_u32(glb, 12) as usize;
        serde_json::from_slice(&glb[20..20 + len]).unwrap()
    }

    #[test]
    fn test_export_closed_book() {
        let list = BookScene::new(BookConfig::default().with_page_count(4)).render_list();
        let output = Mesher::new().mesh(&list).unwrap();
        let glb = export_glb(&output).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);

        let gltf = json_chunk(&glb);
        assert_eq!(gltf["meshes"][0]["primitives"].as_array().unwrap().len(), output.batches.len());
        assert_eq!(gltf["materials"].as_array().unwrap().len(), output.batches.len());
    }

    #[test]
    fn test_material_factors() {
        let list = BookScene::new(
            BookConfig::default()
                .with_page_count(2)
                .with_view_variant(ViewVariant::Open),
        )
        .render_list();
        let output = Mesher::new().mesh(&list).unwrap();
        let gltf = json_chunk(&export_glb(&output).unwrap());
        let materials = gltf["materials"].as_array().unwrap();
        assert!(materials.iter().any(|m| m["doubleSided"] == true));

        let pages = &materials[0]["pbrMetallicRoughness"];
        let metallic = pages["metallicFactor"].as_f64().unwrap_or(1.0);
        assert_eq!(metallic, 0.0);
    }

    fn base_color_factor(material: &serde_json::Value) -> [f32; 4] {
        match material["pbrMetallicRoughness"]["baseColorFactor"].as_array() {
            Some(f) => [0, 1, 2, 3].map(|i| f[i].as_f64().unwrap() as f32),
            None => [1.0; 4],
        }
    }

    /// First COLOR_0 value of a primitive, read back from the BIN chunk.
    fn first_vertex_color(glb: &[u8], gltf: &serde_json::Value, primitive: usize) -> [f32; 4] {
        let accessor = gltf["meshes"][0]["primitives"][primitive]["attributes"]["COLOR_0"]
            .as_u64()
            .unwrap() as usize;
        let view = gltf["accessors"][accessor]["bufferView"].as_u64().unwrap() as usize;
        let offset = gltf["bufferViews"][view]["byteOffset"].as_u64().unwrap_or(0) as usize;
        let json_len = read_u32(glb, 12) as usize;
        let bin = 20 + json_len + 8;
        [0, 1, 2, 3].map(|i| f32::from_bits(read_u32(glb, bin + offset + i * 4)))
    }

    fn assert_effective_colors(output: &MesherOutput) {
        let glb = export_glb(output).unwrap();
        let gltf = json_chunk(&glb);
        for (i, batch) in output.batches.iter().enumerate() {
            let factor = base_color_factor(&gltf["materials"][i]);
            let vertex = first_vertex_color(&glb, &gltf, i);
            let expected = batch.material.color.to_linear();
            for c in 0..3 {
                let effective = factor[c] * vertex[c];
                assert!(
                    (effective - expected[c]).abs() < 1e-5,
                    "{} channel {}: {} vs {}",
                    batch.name,
                    c,
                    effective,
                    expected[c]
                );
            }
        }
    }

    #[test]
    fn test_color_applied_once_with_vertex_colors() {
        let list = BookScene::new(BookConfig::default().with_page_count(2)).render_list();
        let output = Mesher::new().mesh(&list).unwrap();
        assert_effective_colors(&output);

        // Default outer leather #722F37 in linear space
        let leather = output
            .batches
            .iter()
            .find(|b| b.name == "outer-leather")
            .unwrap();
        assert!((leather.material.color.to_linear()[0] - 0.1683).abs() < 1e-3);
    }

    #[test]
    fn test_color_in_factor_without_vertex_colors() {
        let list = BookScene::new(BookConfig::default().with_page_count(2)).render_list();
        let output = Mesher::with_config(MesherConfig {
            vertex_colors: false,
            ..Default::default()
        })
        .mesh(&list)
        .unwrap();
        assert_effective_colors(&output);
    }

    #[test]
    fn test_export_empty_mesh_fails() {
        let output = MesherOutput {
            batches: Vec::new(),
            bounds: BoundingBox::new([0.0; 3], [0.0; 3]),
            vertex_colors: true,
        };
        assert!(export_glb(&output).is_err());
        let meshed = Mesher::new().mesh(&RenderList::default()).unwrap();
        assert!(matches!(export_glb(&meshed), Err(BookError::Export(_))));
    }
}
