use rayon::prelude::*;

use super::TileMesh;
use crate::raster::RasterHandle;

/// Height displacement driven by a raster.
///
/// Each vertex moves along its normal by `(intensity - mid_level) * strength`,
/// sampling the raster at the vertex UV with edge-extend outside [0, 1].
#[derive(Clone, Debug)]
pub struct Displace {
    pub raster: RasterHandle,
    pub strength: f32,
    pub mid_level: f32,
}

/// A live, re-evaluatable modifier on a mesh.
#[derive(Clone, Debug)]
pub enum Modifier {
    /// Linear (non-smoothing) subdivision, one cut per level.
    SimpleSubdivision { levels: u32 },
    Displace(Displace),
}

impl Modifier {
    pub fn name(&self) -> &'static str {
        match self {
            Modifier::SimpleSubdivision { .. } => "Subsurf",
            Modifier::Displace(_) => "Displace",
        }
    }
}

impl TileMesh {
    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// The mesh as a renderer would see it: the modifier stack applied to a
    /// copy, leaving this mesh and its stack untouched.
    pub fn evaluated(&self) -> TileMesh {
        let mut result = self.clone();
        result.apply_modifiers();
        result
    }

    /// Collapse the modifier stack into the geometry, in stack order.
    pub fn apply_modifiers(&mut self) {
        let stack = std::mem::take(&mut self.modifiers);
        for modifier in &stack {
            self.apply_modifier(modifier);
        }
    }

    fn apply_modifier(&mut self, modifier: &Modifier) {
        match modifier {
            Modifier::SimpleSubdivision { levels } => {
                for _ in 0..*levels {
                    self.subdivide(1);
                }
            }
            Modifier::Displace(displace) => self.displace(displace),
        }
    }

    fn displace(&mut self, displace: &Displace) {
        let normals = self.vertex_normals();
        let raster = &displace.raster;
        let (strength, mid_level) = (displace.strength, displace.mid_level);

        self.positions
            .par_iter_mut()
            .zip(self.uvs.par_iter())
            .zip(normals.par_iter())
            .for_each(|((p, uv), n)| {
                let height = (raster.sample_uv(uv.x, uv.y) - mid_level) * strength;
                *p += *n * height;
            });
    }
}
