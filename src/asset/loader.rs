use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::asset::material::{Material, TextureKind, TextureRef};
use crate::asset::scene::{SceneGraph, SceneNode, SubMesh, TextureSlot};
use crate::asset::{gltf, obj};
use crate::config::FailurePolicy;
use crate::error::{Result, ViewerError};
use crate::rendering::mesh::Vertex;

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub failure_policy: FailurePolicy,
}

/// One mesh as it will be uploaded: assembled vertices, validated triangle
/// indices, shading parameters, and kind-tagged references into the owning
/// model's shared texture list.
#[derive(Debug)]
pub struct MeshData {
    pub name: Option<String>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Option<Material>,
    pub texture_refs: Vec<TextureRef>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle-list invariants: index count divisible by 3, every index
    /// inside the vertex array.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            ));
        }
        let vertex_count = self.vertices.len() as u32;
        if let Some(&bad) = self.indices.iter().find(|&&i| i >= vertex_count) {
            return Err(format!(
                "index {} out of bounds for {} vertices",
                bad, vertex_count
            ));
        }
        Ok(())
    }
}

/// A texture as resolved by the cache: identity path, the kind it was first
/// requested as, and decoded pixels. `pixels` is `None` when decoding failed
/// under the lenient policy; the entry still occupies its slot so references
/// stay valid.
#[derive(Debug)]
pub struct TextureSource {
    pub path: PathBuf,
    pub kind: TextureKind,
    pub pixels: Option<RgbaImage>,
}

/// CPU-side model: everything the GPU upload needs, nothing it doesn't.
///
/// Meshes reference textures only through [`TextureRef`] indices, so a
/// texture used by several materials exists exactly once.
#[derive(Debug, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub textures: Vec<TextureSource>,
}

impl ModelData {
    /// Parses `path` with the importer matching its extension and flattens
    /// the scene graph: pre-order, depth-first, parent before children.
    /// Traversal order fixes the draw order, nothing more.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<ModelData> {
        let scene = import_scene(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut context = LoadContext {
            model_path: path,
            base_dir,
            flip_textures: scene.flip_textures,
            policy: options.failure_policy,
            textures: Vec::new(),
        };

        let mut meshes = Vec::new();
        visit_node(&scene.root, &scene, &mut context, &mut meshes)?;
        let textures = context.textures;

        let vertex_count: usize = meshes.iter().map(|m| m.vertices.len()).sum();
        let triangle_count: usize = meshes.iter().map(MeshData::triangle_count).sum();
        log::info!(
            "[model] {} loaded: {} meshes, {} vertices, {} triangles, {} textures",
            path.display(),
            meshes.len(),
            vertex_count,
            triangle_count,
            textures.len()
        );

        Ok(ModelData { meshes, textures })
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

fn import_scene(path: &Path) -> Result<SceneGraph> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "obj" => obj::import(path),
        "gltf" | "glb" => gltf::import(path),
        other => Err(ViewerError::UnsupportedFormat(format!(
            "{} ({})",
            other,
            path.display()
        ))),
    }
}

struct LoadContext<'a> {
    model_path: &'a Path,
    base_dir: &'a Path,
    flip_textures: bool,
    policy: FailurePolicy,
    textures: Vec<TextureSource>,
}

impl LoadContext<'_> {
    /// The texture cache. A slot whose identity path is already present
    /// resolves to the existing index without touching the decoder; a new
    /// one is decoded (or taken pre-decoded from the importer), appended,
    /// and its index returned.
    fn resolve(&mut self, slot: &TextureSlot, kind: TextureKind) -> Result<usize> {
        let path = self.base_dir.join(&slot.key);

        if let Some(index) = self.textures.iter().position(|t| t.path == path) {
            return Ok(index);
        }

        let pixels = match &slot.pixels {
            Some(pixels) => Some(self.oriented(pixels.clone())),
            None => match image::open(&path) {
                Ok(decoded) => Some(self.oriented(decoded.to_rgba8())),
                Err(e) => {
                    if self.policy == FailurePolicy::Strict {
                        return Err(ViewerError::AssetLoad {
                            path,
                            reason: e.to_string(),
                        });
                    }
                    log::error!("[texture] failed to open {}: {}", path.display(), e);
                    None
                }
            },
        };

        self.textures.push(TextureSource { path, kind, pixels });
        Ok(self.textures.len() - 1)
    }

    fn oriented(&self, pixels: RgbaImage) -> RgbaImage {
        if self.flip_textures {
            image::imageops::flip_vertical(&pixels)
        } else {
            pixels
        }
    }
}

fn visit_node(
    node: &SceneNode,
    scene: &SceneGraph,
    context: &mut LoadContext,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    for &mesh_index in &node.mesh_indices {
        match scene.meshes.get(mesh_index) {
            Some(sub_mesh) => {
                if let Some(mesh) = build_mesh(sub_mesh, scene, context)? {
                    meshes.push(mesh);
                }
            }
            None => log::warn!(
                "[model] {}: node references missing mesh {}",
                context.model_path.display(),
                mesh_index
            ),
        }
    }
    for child in &node.children {
        visit_node(child, scene, context, meshes)?;
    }
    Ok(())
}

fn build_mesh(
    sub_mesh: &SubMesh,
    scene: &SceneGraph,
    context: &mut LoadContext,
) -> Result<Option<MeshData>> {
    let vertices: Vec<Vertex> = sub_mesh
        .positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: sub_mesh.normals.get(i).copied().unwrap_or([0.0; 3]),
            texcoord: sub_mesh.texcoords.get(i).copied().unwrap_or([0.0; 2]),
        })
        .collect();

    let mut mesh = MeshData {
        name: sub_mesh.name.clone(),
        vertices,
        indices: sub_mesh.indices.clone(),
        material: None,
        texture_refs: Vec::new(),
    };

    if let Err(reason) = mesh.validate() {
        if context.policy == FailurePolicy::Strict {
            return Err(ViewerError::SceneImport {
                path: context.model_path.to_path_buf(),
                reason,
            });
        }
        log::warn!(
            "[model] {}: skipping mesh {:?}: {}",
            context.model_path.display(),
            mesh.name.as_deref().unwrap_or("<unnamed>"),
            reason
        );
        return Ok(None);
    }

    if let Some(material) = sub_mesh.material.and_then(|i| scene.materials.get(i)) {
        mesh.material = Some(Material {
            diffuse: material.diffuse,
            specular: material.specular,
            ambient: material.ambient,
            shininess: material.shininess,
        });

        // Diffuse slots first, then specular, mirroring the draw-time
        // per-kind unit numbering.
        for slot in &material.diffuse_textures {
            let index = context.resolve(slot, TextureKind::Diffuse)?;
            mesh.texture_refs.push(TextureRef {
                index,
                kind: TextureKind::Diffuse,
            });
        }
        for slot in &material.specular_textures {
            let index = context.resolve(slot, TextureKind::Specular)?;
            mesh.texture_refs.push(TextureRef {
                index,
                kind: TextureKind::Specular,
            });
        }
    }

    Ok(Some(mesh))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CHECKER_OBJ: &str = "\
mtllib scene.mtl
o front
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
usemtl checker
f 1/1 2/2 3/3
o back
v 0.0 0.0 1.0
v 1.0 0.0 1.0
v 0.0 1.0 1.0
usemtl plain
f 4 5 6
";

    const CHECKER_MTL: &str = "\
newmtl checker
Kd 0.9 0.9 0.9
Ks 0.4 0.4 0.4
Ns 16.0
map_Kd checker.png
map_Ks checker.png
newmtl plain
Kd 0.2 0.6 0.2
map_Kd missing.png
";

    fn write_scene(dir: &Path) -> PathBuf {
        fs::write(dir.join("scene.mtl"), CHECKER_MTL).unwrap();
        let checker = RgbaImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        });
        checker.save(dir.join("checker.png")).unwrap();

        let obj_path = dir.join("scene.obj");
        fs::write(&obj_path, CHECKER_OBJ).unwrap();
        obj_path
    }

    #[test]
    fn shared_path_is_loaded_once_and_referenced_per_kind() {
        let dir = tempdir().unwrap();
        let path = write_scene(dir.path());

        let model = ModelData::load(&path, &LoadOptions::default()).unwrap();

        let checker_entries: Vec<_> = model
            .textures
            .iter()
            .filter(|t| t.path.ends_with("checker.png"))
            .collect();
        assert_eq!(checker_entries.len(), 1);
        assert_eq!(checker_entries[0].kind, TextureKind::Diffuse);
        assert!(checker_entries[0].pixels.is_some());

        let front = &model.meshes[0];
        assert_eq!(front.texture_refs.len(), 2);
        assert_eq!(front.texture_refs[0].kind, TextureKind::Diffuse);
        assert_eq!(front.texture_refs[1].kind, TextureKind::Specular);
        assert_eq!(front.texture_refs[0].index, front.texture_refs[1].index);
    }

    #[test]
    fn texture_count_equals_distinct_paths_even_across_reloads() {
        let dir = tempdir().unwrap();
        let path = write_scene(dir.path());

        let first = ModelData::load(&path, &LoadOptions::default()).unwrap();
        let second = ModelData::load(&path, &LoadOptions::default()).unwrap();

        for model in [&first, &second] {
            // checker.png + missing.png, each exactly once.
            assert_eq!(model.textures.len(), 2);
            for (i, a) in model.textures.iter().enumerate() {
                for b in &model.textures[i + 1..] {
                    assert_ne!(a.path, b.path);
                }
            }
        }
    }

    #[test]
    fn unresolvable_texture_keeps_its_entry_and_loading_continues() {
        let dir = tempdir().unwrap();
        let path = write_scene(dir.path());

        let model = ModelData::load(&path, &LoadOptions::default()).unwrap();

        // Both meshes survived the missing file.
        assert_eq!(model.meshes.len(), 2);

        let missing = model
            .textures
            .iter()
            .find(|t| t.path.ends_with("missing.png"))
            .expect("entry for unresolvable path");
        assert_eq!(missing.kind, TextureKind::Diffuse);
        assert!(missing.pixels.is_none());
    }

    #[test]
    fn strict_policy_surfaces_decode_failures() {
        let dir = tempdir().unwrap();
        let path = write_scene(dir.path());

        let options = LoadOptions {
            failure_policy: FailurePolicy::Strict,
        };
        assert!(matches!(
            ModelData::load(&path, &options),
            Err(ViewerError::AssetLoad { .. })
        ));
    }

    #[test]
    fn mesh_invariants_hold_after_load() {
        let dir = tempdir().unwrap();
        let path = write_scene(dir.path());

        let model = ModelData::load(&path, &LoadOptions::default()).unwrap();
        for mesh in &model.meshes {
            mesh.validate().unwrap();
            assert_eq!(mesh.indices.len() % 3, 0);
            assert!(mesh
                .indices
                .iter()
                .all(|&i| (i as usize) < mesh.vertices.len()));
        }
    }

    #[test]
    fn absent_channels_are_zero_filled() {
        let dir = tempdir().unwrap();
        let path = write_scene(dir.path());

        let model = ModelData::load(&path, &LoadOptions::default()).unwrap();
        // The "back" mesh has neither normals nor texcoords in the source.
        let back = &model.meshes[1];
        assert!(back.vertices.iter().all(|v| v.normal == [0.0; 3]));
        assert!(back.vertices.iter().all(|v| v.texcoord == [0.0; 2]));
    }

    #[test]
    fn traversal_preserves_parser_order() {
        let dir = tempdir().unwrap();
        let path = write_scene(dir.path());

        let model = ModelData::load(&path, &LoadOptions::default()).unwrap();
        assert_eq!(model.meshes[0].name.as_deref(), Some("front"));
        assert_eq!(model.meshes[1].name.as_deref(), Some("back"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.fbx");
        fs::write(&path, b"not really").unwrap();

        assert!(matches!(
            ModelData::load(&path, &LoadOptions::default()),
            Err(ViewerError::UnsupportedFormat(_))
        ));
    }
}
