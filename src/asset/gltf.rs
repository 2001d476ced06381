use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::asset::scene::{SceneGraph, SceneMaterial, SceneNode, SubMesh, TextureSlot};
use crate::error::{Result, ViewerError};

/// Imports a glTF 2.0 file (.gltf or .glb) into a [`SceneGraph`].
///
/// The node hierarchy is carried over as-is; each triangle-mode primitive
/// becomes one sub-mesh. The parser decodes all referenced images itself, so
/// texture slots arrive with their pixels already attached and the loader's
/// cache only deduplicates them.
pub fn import(path: &Path) -> Result<SceneGraph> {
    let (document, buffers, images) =
        gltf::import(path).map_err(|e| ViewerError::SceneImport {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| ViewerError::SceneImport {
            path: path.to_path_buf(),
            reason: "file contains no scene".to_string(),
        })?;

    let image_slots: Vec<TextureSlot> = document
        .images()
        .map(|img| {
            // External images keep their URI as identity; embedded ones get
            // a pseudo-path that is still unique per source image.
            let key = match img.source() {
                gltf::image::Source::Uri { uri, .. } => PathBuf::from(uri),
                gltf::image::Source::View { .. } => PathBuf::from(format!("#image{}", img.index())),
            };
            match convert_pixels(&images[img.index()]) {
                Some(pixels) => TextureSlot::with_pixels(key, pixels),
                None => {
                    log::warn!(
                        "[gltf] {}: unsupported pixel format {:?} for {}",
                        path.display(),
                        images[img.index()].format,
                        key.display()
                    );
                    TextureSlot::from_path(key)
                }
            }
        })
        .collect();

    let materials = document
        .materials()
        .map(|m| convert_material(&m, &image_slots))
        .collect();

    // Flatten primitives; remember which flat indices each document mesh
    // expanded to, for the node conversion below.
    let mut meshes = Vec::new();
    let mut flattened: Vec<Vec<usize>> = Vec::new();
    for mesh in document.meshes() {
        let mut flat_indices = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "[gltf] {}: skipping non-triangle primitive in mesh {}",
                    path.display(),
                    mesh.index()
                );
                continue;
            }
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let positions: Vec<[f32; 3]> = match reader.read_positions() {
                Some(positions) => positions.collect(),
                None => {
                    log::warn!(
                        "[gltf] {}: primitive without positions in mesh {}",
                        path.display(),
                        mesh.index()
                    );
                    continue;
                }
            };
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|n| n.collect())
                .unwrap_or_default();
            let texcoords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|t| t.into_f32().collect())
                .unwrap_or_default();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                // Non-indexed primitives draw vertices in order.
                None => (0..positions.len() as u32).collect(),
            };

            flat_indices.push(meshes.len());
            meshes.push(SubMesh {
                name: mesh.name().map(str::to_owned),
                positions,
                normals,
                texcoords,
                indices,
                material: primitive.material().index(),
            });
        }
        flattened.push(flat_indices);
    }

    let root = SceneNode {
        name: None,
        mesh_indices: Vec::new(),
        children: scene
            .nodes()
            .map(|node| convert_node(&node, &flattened))
            .collect(),
    };

    Ok(SceneGraph {
        root,
        meshes,
        materials,
        flip_textures: false,
    })
}

fn convert_node(node: &gltf::Node, flattened: &[Vec<usize>]) -> SceneNode {
    SceneNode {
        name: node.name().map(str::to_owned),
        mesh_indices: node
            .mesh()
            .map(|mesh| flattened[mesh.index()].clone())
            .unwrap_or_default(),
        children: node
            .children()
            .map(|child| convert_node(&child, flattened))
            .collect(),
    }
}

fn convert_material(material: &gltf::Material, image_slots: &[TextureSlot]) -> SceneMaterial {
    let pbr = material.pbr_metallic_roughness();
    let (diffuse, specular, ambient, shininess) = phong_from_pbr(
        pbr.base_color_factor(),
        pbr.metallic_factor(),
        pbr.roughness_factor(),
    );

    SceneMaterial {
        diffuse,
        specular,
        ambient,
        shininess,
        diffuse_textures: pbr
            .base_color_texture()
            .map(|info| image_slots[info.texture().source().index()].clone())
            .into_iter()
            .collect(),
        specular_textures: Vec::new(),
    }
}

/// Collapses metallic-roughness factors onto the Phong parameters the
/// shading mode understands. Lossy by nature.
pub(crate) fn phong_from_pbr(
    base_color: [f32; 4],
    metallic: f32,
    roughness: f32,
) -> ([f32; 3], [f32; 3], [f32; 3], f32) {
    let diffuse = [base_color[0], base_color[1], base_color[2]];
    let specular = [metallic; 3];
    let ambient = [0.0; 3];
    let shininess = ((1.0 - roughness) * 128.0).max(1.0);
    (diffuse, specular, ambient, shininess)
}

fn convert_pixels(data: &gltf::image::Data) -> Option<RgbaImage> {
    use gltf::image::Format;

    let pixels = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8 => data.pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        Format::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        _ => return None,
    };
    RgbaImage::from_raw(data.width, data.height, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phong_conversion_tracks_factors() {
        let (diffuse, specular, _ambient, shininess) =
            phong_from_pbr([0.5, 0.25, 1.0, 1.0], 1.0, 0.0);
        assert_eq!(diffuse, [0.5, 0.25, 1.0]);
        assert_eq!(specular, [1.0, 1.0, 1.0]);
        assert_eq!(shininess, 128.0);
    }

    #[test]
    fn fully_rough_material_keeps_a_usable_exponent() {
        let (_, _, _, shininess) = phong_from_pbr([1.0; 4], 0.0, 1.0);
        assert_eq!(shininess, 1.0);
    }
}
