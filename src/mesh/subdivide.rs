use std::collections::HashMap;

use glam::{Vec2, Vec3};

use super::{Quad, TileMesh};

impl TileMesh {
    /// Split every quad into `(cuts + 1)²` quads.
    ///
    /// New vertices are placed by linear interpolation (no smoothing), so a
    /// flat mesh stays flat. Vertices on shared edges are shared between the
    /// neighbouring faces. One cut is one level of simple subdivision.
    pub fn subdivide(&mut self, cuts: u32) {
        if cuts == 0 || self.faces.is_empty() {
            return;
        }
        let n = cuts as usize;
        let side = n + 2;

        // First new vertex of each edge, stored in (low, high) index order.
        let mut edge_start: HashMap<(u32, u32), u32> = HashMap::new();
        for face in &self.faces {
            for k in 0..4 {
                let (a, b) = (face[k], face[(k + 1) % 4]);
                let key = (a.min(b), a.max(b));
                if edge_start.contains_key(&key) {
                    continue;
                }
                let first = self.positions.len() as u32;
                for i in 1..=n {
                    let t = i as f32 / (n + 1) as f32;
                    let (p, uv) = self.lerp_vertex(key.0, key.1, t);
                    self.positions.push(p);
                    self.uvs.push(uv);
                }
                edge_start.insert(key, first);
            }
        }

        // Vertex on edge a->b at step k (1..=n), whichever way the edge is stored.
        let edge_vertex = |a: u32, b: u32, k: usize| -> u32 {
            let first = edge_start[&(a.min(b), a.max(b))];
            if a < b {
                first + (k - 1) as u32
            } else {
                first + (n - k) as u32
            }
        };

        let old_faces = std::mem::take(&mut self.faces);
        let mut faces = Vec::with_capacity(old_faces.len() * (n + 1) * (n + 1));
        let mut lattice = vec![0u32; side * side];

        for face in &old_faces {
            let [v0, v1, v2, v3] = *face;
            let corners_p = face.map(|i| self.positions[i as usize]);
            let corners_uv = face.map(|i| self.uvs[i as usize]);

            // lattice[j * side + i]: i runs v0->v1, j runs v0->v3.
            let last = n + 1;
            lattice[0] = v0;
            lattice[last] = v1;
            lattice[last * side + last] = v2;
            lattice[last * side] = v3;
            for k in 1..=n {
                lattice[k] = edge_vertex(v0, v1, k);
                lattice[k * side + last] = edge_vertex(v1, v2, k);
                lattice[last * side + k] = edge_vertex(v3, v2, k);
                lattice[k * side] = edge_vertex(v0, v3, k);
            }
            for j in 1..=n {
                for i in 1..=n {
                    let s = i as f32 / last as f32;
                    let t = j as f32 / last as f32;
                    lattice[j * side + i] = self.positions.len() as u32;
                    self.positions.push(bilerp(corners_p, s, t));
                    self.uvs.push(bilerp_uv(corners_uv, s, t));
                }
            }

            for j in 0..=n {
                for i in 0..=n {
                    let quad: Quad = [
                        lattice[j * side + i],
                        lattice[j * side + i + 1],
                        lattice[(j + 1) * side + i + 1],
                        lattice[(j + 1) * side + i],
                    ];
                    faces.push(quad);
                }
            }
        }

        self.faces = faces;
    }

    fn lerp_vertex(&self, a: u32, b: u32, t: f32) -> (Vec3, Vec2) {
        let (a, b) = (a as usize, b as usize);
        (
            self.positions[a].lerp(self.positions[b], t),
            self.uvs[a].lerp(self.uvs[b], t),
        )
    }
}

/// Corners in face order v0, v1, v2, v3; `s` runs v0->v1 and `t` runs v0->v3.
fn bilerp(c: [Vec3; 4], s: f32, t: f32) -> Vec3 {
    let bottom = c[0].lerp(c[1], s);
    let top = c[3].lerp(c[2], s);
    bottom.lerp(top, t)
}

fn bilerp_uv(c: [Vec2; 4], s: f32, t: f32) -> Vec2 {
    let bottom = c[0].lerp(c[1], s);
    let top = c[3].lerp(c[2], s);
    bottom.lerp(top, t)
}
