use std::path::Path;

use crate::asset::scene::{SceneGraph, SceneMaterial, SceneNode, SubMesh, TextureSlot};
use crate::error::{Result, ViewerError};

/// Imports a Wavefront OBJ file (and its MTL library) into a [`SceneGraph`].
///
/// OBJ has no node hierarchy, so every parsed model becomes one child of a
/// synthetic root. Ordering is the parser's model order, which is stable for
/// a given file.
pub fn import(path: &Path) -> Result<SceneGraph> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| ViewerError::SceneImport {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // A broken or absent MTL library degrades to untextured meshes.
    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            log::warn!("[obj] {}: material library not loaded: {}", path.display(), e);
            Vec::new()
        }
    };

    let mut scene = SceneGraph {
        materials: materials.iter().map(convert_material).collect(),
        flip_textures: true,
        ..Default::default()
    };

    for (index, model) in models.into_iter().enumerate() {
        let mesh = model.mesh;
        let positions = group_by_3(&mesh.positions);
        let normals = group_by_3(&mesh.normals);
        let texcoords = group_by_2(&mesh.texcoords);

        scene.meshes.push(SubMesh {
            name: Some(model.name.clone()),
            positions,
            normals,
            texcoords,
            indices: mesh.indices,
            material: mesh.material_id,
        });
        scene.root.children.push(SceneNode {
            name: Some(model.name),
            mesh_indices: vec![index],
            children: Vec::new(),
        });
    }

    Ok(scene)
}

fn convert_material(material: &tobj::Material) -> SceneMaterial {
    SceneMaterial {
        diffuse: material.diffuse.unwrap_or([1.0, 1.0, 1.0]),
        specular: material.specular.unwrap_or([0.0, 0.0, 0.0]),
        ambient: material.ambient.unwrap_or([0.0, 0.0, 0.0]),
        shininess: material.shininess.unwrap_or(32.0),
        diffuse_textures: material
            .diffuse_texture
            .iter()
            .map(|t| TextureSlot::from_path(t.into()))
            .collect(),
        specular_textures: material
            .specular_texture
            .iter()
            .map(|t| TextureSlot::from_path(t.into()))
            .collect(),
    }
}

fn group_by_3(flat: &[f32]) -> Vec<[f32; 3]> {
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

fn group_by_2(flat: &[f32]) -> Vec<[f32; 2]> {
    flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_fixture(dir: &Path, obj: &str, mtl: Option<&str>) -> std::path::PathBuf {
        let obj_path = dir.join("model.obj");
        fs::write(&obj_path, obj).unwrap();
        if let Some(mtl) = mtl {
            fs::write(dir.join("model.mtl"), mtl).unwrap();
        }
        obj_path
    }

    const TRIANGLE_OBJ: &str = "\
mtllib model.mtl
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
vn 0.0 0.0 1.0
vn 0.0 0.0 1.0
usemtl painted
f 1//1 2//2 3//3
";

    const PAINTED_MTL: &str = "\
newmtl painted
Kd 0.8 0.1 0.1
Ks 0.5 0.5 0.5
Ka 0.1 0.1 0.1
Ns 64.0
map_Kd base.png
map_Ks shine.png
";

    #[test]
    fn imports_geometry_and_materials() {
        let dir = tempdir().unwrap();
        let path = write_fixture(dir.path(), TRIANGLE_OBJ, Some(PAINTED_MTL));

        let scene = import(&path).unwrap();
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.root.children.len(), 1);
        assert_eq!(scene.root.children[0].mesh_indices, vec![0]);
        assert!(scene.flip_textures);

        let mesh = &scene.meshes[0];
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.normals.len(), 3);
        assert_eq!(mesh.indices.len(), 3);

        let material = &scene.materials[mesh.material.unwrap()];
        assert_eq!(material.diffuse, [0.8, 0.1, 0.1]);
        assert_eq!(material.shininess, 64.0);
        assert_eq!(material.diffuse_textures.len(), 1);
        assert_eq!(
            material.diffuse_textures[0].key,
            std::path::PathBuf::from("base.png")
        );
        assert_eq!(material.specular_textures.len(), 1);
    }

    #[test]
    fn missing_mtl_degrades_to_no_materials() {
        let dir = tempdir().unwrap();
        let path = write_fixture(dir.path(), TRIANGLE_OBJ, None);

        let scene = import(&path).unwrap();
        assert_eq!(scene.meshes.len(), 1);
        assert!(scene.materials.is_empty());
    }

    #[test]
    fn unreadable_file_is_an_import_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.obj");
        assert!(matches!(
            import(&missing),
            Err(ViewerError::SceneImport { .. })
        ));
    }
}
