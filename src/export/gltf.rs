//! Binary glTF (GLB) mesh export.

use crate::error::{ExportError, Result};
use crate::types::MeshGeometry;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::collections::BTreeMap;
use std::mem;

/// Export a mesh to GLB format (binary glTF 2.0).
///
/// Emits POSITION plus whichever of NORMAL, TEXCOORD_0 and TEXCOORD_1 the
/// geometry carries a full channel for. The second UV set is what the
/// viewer samples baked lightmaps through.
pub fn export_glb(geometry: &MeshGeometry) -> Result<Vec<u8>> {
    if geometry.is_empty() {
        return Err(ExportError::MeshExport("Cannot export empty mesh".to_string()));
    }

    let vertex_count = geometry.vertex_count();
    let (min, max) = bounds(geometry);

    let mut buffer_data: Vec<u8> = Vec::new();
    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();
    let mut attributes = BTreeMap::new();
    let mut next_index = 0u32;

    // POSITION (min/max required by the format)
    let offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&geometry.positions));
    buffer_views.push(create_buffer_view(
        offset,
        buffer_data.len() - offset,
        Some(json::buffer::Target::ArrayBuffer),
    ));
    accessors.push(create_accessor(
        next_index,
        vertex_count,
        json::accessor::Type::Vec3,
        json::accessor::ComponentType::F32,
        Some(min),
        Some(max),
    ));
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(next_index),
    );
    next_index += 1;

    // NORMAL
    if geometry.normals.len() == vertex_count {
        let offset = buffer_data.len();
        buffer_data.extend_from_slice(cast_slice(&geometry.normals));
        buffer_views.push(create_buffer_view(
            offset,
            buffer_data.len() - offset,
            Some(json::buffer::Target::ArrayBuffer),
        ));
        accessors.push(create_accessor(
            next_index,
            vertex_count,
            json::accessor::Type::Vec3,
            json::accessor::ComponentType::F32,
            None,
            None,
        ));
        attributes.insert(
            Valid(json::mesh::Semantic::Normals),
            json::Index::new(next_index),
        );
        next_index += 1;
    }

    // TEXCOORD_0
    if geometry.uvs.len() == vertex_count {
        let offset = buffer_data.len();
        buffer_data.extend_from_slice(cast_slice(&geometry.uvs));
        buffer_views.push(create_buffer_view(
            offset,
            buffer_data.len() - offset,
            Some(json::buffer::Target::ArrayBuffer),
        ));
        accessors.push(create_accessor(
            next_index,
            vertex_count,
            json::accessor::Type::Vec2,
            json::accessor::ComponentType::F32,
            None,
            None,
        ));
        attributes.insert(
            Valid(json::mesh::Semantic::TexCoords(0)),
            json::Index::new(next_index),
        );
        next_index += 1;
    }

    // TEXCOORD_1 (lightmap channel)
    if geometry.lightmap_uvs.len() == vertex_count {
        let offset = buffer_data.len();
        buffer_data.extend_from_slice(cast_slice(&geometry.lightmap_uvs));
        buffer_views.push(create_buffer_view(
            offset,
            buffer_data.len() - offset,
            Some(json::buffer::Target::ArrayBuffer),
        ));
        accessors.push(create_accessor(
            next_index,
            vertex_count,
            json::accessor::Type::Vec2,
            json::accessor::ComponentType::F32,
            None,
            None,
        ));
        attributes.insert(
            Valid(json::mesh::Semantic::TexCoords(1)),
            json::Index::new(next_index),
        );
        next_index += 1;
    }

    // Indices
    let offset = buffer_data.len();
    buffer_data.extend_from_slice(cast_slice(&geometry.indices));
    buffer_views.push(create_buffer_view(
        offset,
        buffer_data.len() - offset,
        Some(json::buffer::Target::ElementArrayBuffer),
    ));
    accessors.push(create_accessor(
        next_index,
        geometry.indices.len(),
        json::accessor::Type::Scalar,
        json::accessor::ComponentType::U32,
        None,
        None,
    ));
    let indices_accessor = next_index;

    let primitive = json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: None,
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };

    let total_buffer_size = buffer_data.len();

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(total_buffer_size as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }],
        buffer_views,
        meshes: vec![json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives: vec![primitive],
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

    // Serialize JSON
    let json_string = json::serialize::to_string(&root)
        .map_err(|e| ExportError::MeshExport(format!("Failed to serialize glTF JSON: {}", e)))?;
    let json_bytes = json_string.as_bytes();

    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(b"glTF"); // magic
    glb.extend_from_slice(&2u32.to_le_bytes()); // version
    glb.extend_from_slice(&(total_size as u32).to_le_bytes()); // length

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes()); // chunk length
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // chunk type: JSON
    glb.extend_from_slice(json_bytes);
    glb.extend_from_slice(&vec![0x20u8; json_padding]); // padding (spaces)

    // BIN Chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes()); // chunk length
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // chunk type: BIN
    glb.extend_from_slice(&buffer_data);
    glb.extend_from_slice(&vec![0u8; buffer_padding]); // padding (zeros)

    Ok(glb)
}

/// Axis-aligned bounds of the vertex positions.
fn bounds(geometry: &MeshGeometry) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];

    for position in &geometry.positions {
        for i in 0..3 {
            min[i] = min[i].min(position[i]);
            max[i] = max[i].max(position[i]);
        }
    }

    (min, max)
}

/// Create a buffer view.
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

/// Create an accessor.
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

/// Cast a slice of T to a slice of bytes.
fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = slice.len() * mem::size_of::<T>();
    unsafe { std::slice::from_raw_parts(ptr, len) }
}
