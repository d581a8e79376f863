//! Resident render tiles and their JSON manifest.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::TILE_SIZE;
use crate::material::MaterialGraph;
use crate::mesh::{Modifier, TileMesh};
use crate::paths::TileCoordinate;

/// A finished render tile left in the scene.
#[derive(Debug)]
pub struct SceneObject {
    pub coordinate: TileCoordinate,
    pub heightmap: PathBuf,
    pub mesh: TileMesh,
}

#[derive(Default, Debug)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, coordinate: TileCoordinate) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.coordinate == coordinate)
    }

    pub fn manifest(&self) -> SceneManifest {
        SceneManifest {
            generated_at: chrono::Local::now().to_rfc3339(),
            tile_size: TILE_SIZE,
            objects: self.objects.iter().map(ObjectManifest::from_object).collect(),
        }
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn write_manifest(&self, path: &Path) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.manifest())?;
        writer.write_all(b"\n")?;
        writer.flush()
    }
}

#[derive(Debug, Serialize)]
pub struct SceneManifest {
    pub generated_at: String,
    pub tile_size: f32,
    pub objects: Vec<ObjectManifest>,
}

#[derive(Debug, Serialize)]
pub struct ObjectManifest {
    pub name: String,
    pub row: u32,
    pub col: u32,
    pub heightmap: PathBuf,
    pub location: [f32; 3],
    pub vertices: usize,
    pub faces: usize,
    pub modifiers: Vec<ModifierManifest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialGraph>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ModifierManifest {
    Subsurf { levels: u32 },
    Displace { image: PathBuf, strength: f32, mid_level: f32 },
}

impl ObjectManifest {
    fn from_object(object: &SceneObject) -> Self {
        let mesh = &object.mesh;
        Self {
            name: mesh.name.clone(),
            row: object.coordinate.row,
            col: object.coordinate.col,
            heightmap: object.heightmap.clone(),
            location: mesh.location.to_array(),
            vertices: mesh.vertex_count(),
            faces: mesh.face_count(),
            modifiers: mesh.modifiers.iter().map(ModifierManifest::from_modifier).collect(),
            material: mesh.material.clone(),
        }
    }
}

impl ModifierManifest {
    fn from_modifier(modifier: &Modifier) -> Self {
        match modifier {
            Modifier::SimpleSubdivision { levels } => ModifierManifest::Subsurf { levels: *levels },
            Modifier::Displace(d) => ModifierManifest::Displace {
                image: d.raster.path.clone(),
                strength: d.strength,
                mid_level: d.mid_level,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tempfile::tempdir;

    fn object(row: u32, col: u32) -> SceneObject {
        let mut mesh = TileMesh::plane(&format!("Tile_{}_{}", row, col), 1.0, Vec3::ZERO);
        mesh.add_modifier(Modifier::SimpleSubdivision { levels: 2 });
        mesh.location = Vec3::new(col as f32 * 10.0, -(row as f32) * 10.0, 0.0);
        SceneObject {
            coordinate: TileCoordinate::new(row, col),
            heightmap: PathBuf::from(format!("h_y{}_x{}.png", row, col)),
            mesh,
        }
    }

    #[test]
    fn test_lookup_by_coordinate() {
        let mut scene = Scene::new();
        assert!(scene.is_empty());
        scene.add(object(0, 0));
        scene.add(object(1, 2));
        assert_eq!(scene.len(), 2);
        let found = scene.get(TileCoordinate::new(1, 2)).unwrap();
        assert_eq!(found.mesh.name, "Tile_1_2");
        assert!(scene.get(TileCoordinate::new(2, 1)).is_none());
    }

    #[test]
    fn test_manifest_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let mut scene = Scene::new();
        scene.add(object(1, 2));
        scene.write_manifest(&path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let obj = &json["objects"][0];
        assert_eq!(obj["name"], "Tile_1_2");
        assert_eq!(obj["location"][0], 20.0);
        assert_eq!(obj["location"][1], -10.0);
        assert_eq!(obj["modifiers"][0]["type"], "Subsurf");
        assert_eq!(obj["modifiers"][0]["levels"], 2);
        assert!(obj.get("material").is_none());
        assert_eq!(json["tile_size"], 10.0);
    }
}
