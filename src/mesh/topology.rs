use std::collections::VecDeque;

use glam::Vec3;

use super::{Quad, TileMesh};

/// One side of a face, keyed by its undirected edge.
#[derive(Clone, Copy, Debug)]
struct HalfEdge {
    key: (u32, u32),
    face: u32,
    /// True if the face walks the edge from `key.0` to `key.1`.
    forward: bool,
}

impl TileMesh {
    /// Half-edges of every face, sorted so the sides of one edge are adjacent.
    fn sorted_half_edges(&self) -> Vec<HalfEdge> {
        let mut half_edges = Vec::with_capacity(self.faces.len() * 4);
        for (f, face) in self.faces.iter().enumerate() {
            for k in 0..4 {
                let (a, b) = (face[k], face[(k + 1) % 4]);
                half_edges.push(HalfEdge {
                    key: (a.min(b), a.max(b)),
                    face: f as u32,
                    forward: a < b,
                });
            }
        }
        half_edges.sort_unstable_by_key(|h| (h.key, h.face));
        half_edges
    }

    /// Edges used by exactly one face, directed as that face walks them.
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let half_edges = self.sorted_half_edges();
        half_edges
            .chunk_by(|a, b| a.key == b.key)
            .filter(|group| group.len() == 1)
            .map(|group| {
                let h = group[0];
                if h.forward { h.key } else { (h.key.1, h.key.0) }
            })
            .collect()
    }

    /// Extrude the whole surface by `offset` into a closed shell.
    ///
    /// The original faces stay in place, a reversed copy is moved by `offset`,
    /// and every boundary edge gets a side wall joining the two.
    pub fn extrude_all(&mut self, offset: Vec3) {
        let boundary = self.boundary_edges();
        let n = self.positions.len() as u32;

        let moved: Vec<Vec3> = self.positions.iter().map(|p| *p + offset).collect();
        self.positions.extend(moved);
        self.uvs.extend_from_within(..);

        let copies: Vec<Quad> = self
            .faces
            .iter()
            .map(|&[a, b, c, d]| [a + n, d + n, c + n, b + n])
            .collect();
        self.faces.extend(copies);

        for (a, b) in boundary {
            self.faces.push([a, a + n, b + n, b]);
        }
    }

    /// Raise every vertex below `floor` onto it.
    pub fn clamp_z_below(&mut self, floor: f32) {
        for p in &mut self.positions {
            if p.z < floor {
                p.z = floor;
            }
        }
    }

    /// Give adjacent faces a consistent winding and make each closed part
    /// face outward. Returns the number of faces that were flipped.
    pub fn make_normals_consistent(&mut self) -> usize {
        let face_count = self.faces.len();
        let half_edges = self.sorted_half_edges();

        // (neighbour, same_direction) per face; edges shared by more than
        // two faces are left out.
        let mut neighbours: Vec<Vec<(u32, bool)>> = vec![Vec::with_capacity(4); face_count];
        for group in half_edges.chunk_by(|a, b| a.key == b.key) {
            if let [h1, h2] = group {
                let same = h1.forward == h2.forward;
                neighbours[h1.face as usize].push((h2.face, same));
                neighbours[h2.face as usize].push((h1.face, same));
            }
        }

        let mut flip = vec![false; face_count];
        let mut visited = vec![false; face_count];
        let mut queue = VecDeque::new();

        for start in 0..face_count {
            if visited[start] {
                continue;
            }
            let mut component = Vec::new();
            visited[start] = true;
            queue.push_back(start);

            while let Some(f) = queue.pop_front() {
                component.push(f);
                for &(g, same) in &neighbours[f] {
                    let g = g as usize;
                    if !visited[g] {
                        visited[g] = true;
                        flip[g] = flip[f] ^ same;
                        queue.push_back(g);
                    }
                }
            }

            if self.signed_volume(&component, &flip) < 0.0 {
                for &f in &component {
                    flip[f] = !flip[f];
                }
            }
        }

        let mut flipped = 0;
        for (face, &should_flip) in self.faces.iter_mut().zip(&flip) {
            if should_flip {
                let [a, b, c, d] = *face;
                *face = [a, d, c, b];
                flipped += 1;
            }
        }
        flipped
    }

    /// Signed volume enclosed by the given faces, with pending flips applied.
    fn signed_volume(&self, faces: &[usize], flip: &[bool]) -> f64 {
        let mut volume = 0.0f64;
        for &f in faces {
            let [a, b, c, d] = self.faces[f];
            let (b, d) = if flip[f] { (d, b) } else { (b, d) };
            let p = |i: u32| self.positions[i as usize].as_dvec3();
            volume += p(a).dot(p(b).cross(p(c)));
            volume += p(a).dot(p(c).cross(p(d)));
        }
        volume / 6.0
    }

    /// Number of edges not shared by exactly two faces.
    pub fn non_manifold_edges(&self) -> usize {
        self.sorted_half_edges()
            .chunk_by(|a, b| a.key == b.key)
            .filter(|group| group.len() != 2)
            .count()
    }
}
