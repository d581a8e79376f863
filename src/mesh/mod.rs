//! Quad meshes for terrain tiles.
//!
//! A `TileMesh` is an owned object: geometry in local space plus an object
//! transform (location and scale) and a stack of live modifiers. Every
//! operation takes the mesh explicitly, so there is no notion of a current or
//! selected object.

mod modifiers;
mod subdivide;
mod topology;

pub use modifiers::{Displace, Modifier};

use glam::{Vec2, Vec3};

use crate::material::MaterialGraph;

/// Four vertex indices, counter-clockwise when seen from the front.
pub type Quad = [u32; 4];

#[derive(Clone, Debug)]
pub struct TileMesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// One texture coordinate per vertex.
    pub uvs: Vec<Vec2>,
    pub faces: Vec<Quad>,
    pub location: Vec3,
    pub scale: Vec3,
    pub modifiers: Vec<Modifier>,
    pub material: Option<MaterialGraph>,
}

impl TileMesh {
    /// A square plane of edge length `size` in the XY plane, facing +Z.
    ///
    /// UV (0, 0) sits at the (-x, -y) corner and (1, 1) at (+x, +y).
    pub fn plane(name: &str, size: f32, location: Vec3) -> Self {
        let h = size * 0.5;
        Self {
            name: name.to_string(),
            positions: vec![
                Vec3::new(-h, -h, 0.0),
                Vec3::new(h, -h, 0.0),
                Vec3::new(h, h, 0.0),
                Vec3::new(-h, h, 0.0),
            ],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            faces: vec![[0, 1, 2, 3]],
            location,
            scale: Vec3::ONE,
            modifiers: Vec::new(),
            material: None,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Multiply the object scale.
    pub fn resize(&mut self, factor: Vec3) {
        self.scale *= factor;
    }

    /// Freeze parts of the object transform into the vertex positions,
    /// keeping every vertex where it is in world space.
    pub fn apply_transform(&mut self, location: bool, scale: bool) {
        if location {
            let offset = self.location / self.scale;
            for p in &mut self.positions {
                *p += offset;
            }
            self.location = Vec3::ZERO;
        }
        if scale {
            let s = self.scale;
            for p in &mut self.positions {
                *p *= s;
            }
            self.scale = Vec3::ONE;
        }
    }

    pub fn world_position(&self, index: usize) -> Vec3 {
        self.positions[index] * self.scale + self.location
    }

    /// World-space axis-aligned bounds, or None for an empty mesh.
    pub fn world_bounds(&self) -> Option<(Vec3, Vec3)> {
        if self.positions.is_empty() {
            return None;
        }
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for i in 0..self.positions.len() {
            let p = self.world_position(i);
            min = min.min(p);
            max = max.max(p);
        }
        Some((min, max))
    }

    /// Un-normalised face normal; its length is twice the quad's area.
    pub fn face_normal(&self, face: &Quad) -> Vec3 {
        let [a, b, c, d] = face.map(|i| self.positions[i as usize]);
        (c - a).cross(d - b)
    }

    /// Area-weighted vertex normals. Vertices with no faces get zero.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for face in &self.faces {
            let n = self.face_normal(face);
            for &i in face {
                normals[i as usize] += n;
            }
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        normals
    }

    /// Split every quad into two triangles sharing the first vertex.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.faces
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
    }
}
