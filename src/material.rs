//! Two-input shader graphs for render tiles.
//!
//! A graph is a list of nodes and socket-to-socket links around a single
//! principled BSDF output node. Image nodes keep a handle to their raster so
//! the image stays loaded for as long as the material exists.

use std::path::PathBuf;

use serde::Serialize;

use crate::paths::TileCoordinate;
use crate::raster::RasterHandle;

pub const BASE_COLOR: &str = "Base Color";
pub const ROUGHNESS: &str = "Roughness";
pub const COLOR: &str = "Color";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    PrincipledBsdf,
    ImageTexture { image: PathBuf },
    Invert,
}

#[derive(Clone, Debug, Serialize)]
pub struct ShaderNode {
    pub id: u32,
    pub name: String,
    pub kind: NodeKind,
    /// Editor layout position.
    pub location: [f32; 2],
    #[serde(skip)]
    pub raster: Option<RasterHandle>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeLink {
    pub from_node: u32,
    pub from_socket: String,
    pub to_node: u32,
    pub to_socket: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct MaterialGraph {
    pub name: String,
    pub nodes: Vec<ShaderNode>,
    pub links: Vec<NodeLink>,
}

impl MaterialGraph {
    /// A material with only its BSDF node; every input at its default.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: vec![ShaderNode {
                id: 0,
                name: "Principled BSDF".to_string(),
                kind: NodeKind::PrincipledBsdf,
                location: [0.0, 0.0],
                raster: None,
            }],
            links: Vec::new(),
        }
    }

    pub fn bsdf(&self) -> u32 {
        0
    }

    pub fn node(&self, id: u32) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn add_image(&mut self, raster: RasterHandle, location: [f32; 2]) -> u32 {
        let name = format!("Image Texture {}", self.nodes.len());
        let kind = NodeKind::ImageTexture { image: raster.path.clone() };
        self.push_node(name, kind, location, Some(raster))
    }

    pub fn add_invert(&mut self, location: [f32; 2]) -> u32 {
        self.push_node("Invert".to_string(), NodeKind::Invert, location, None)
    }

    fn push_node(
        &mut self,
        name: String,
        kind: NodeKind,
        location: [f32; 2],
        raster: Option<RasterHandle>,
    ) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(ShaderNode { id, name, kind, location, raster });
        id
    }

    /// Connect an output socket to an input socket, replacing any existing
    /// link into that input.
    pub fn link(&mut self, from_node: u32, from_socket: &str, to_node: u32, to_socket: &str) {
        self.links
            .retain(|l| !(l.to_node == to_node && l.to_socket == to_socket));
        self.links.push(NodeLink {
            from_node,
            from_socket: from_socket.to_string(),
            to_node,
            to_socket: to_socket.to_string(),
        });
    }

    /// The node feeding an input socket, if it is connected.
    pub fn input_source(&self, node: u32, socket: &str) -> Option<&ShaderNode> {
        self.links
            .iter()
            .find(|l| l.to_node == node && l.to_socket == socket)
            .and_then(|l| self.node(l.from_node))
    }
}

/// Build the material for one render tile.
///
/// The texture drives base color and the roughness map drives roughness,
/// optionally through an invert node. A missing raster leaves its input at
/// the BSDF default.
pub fn build_tile_material(
    coord: TileCoordinate,
    texture: Option<RasterHandle>,
    roughness: Option<RasterHandle>,
    invert_roughness: bool,
) -> MaterialGraph {
    let mut material = MaterialGraph::new(&format!("Material_{}_{}", coord.row, coord.col));
    let bsdf = material.bsdf();

    if let Some(raster) = texture {
        let image = material.add_image(raster, [-300.0, 200.0]);
        material.link(image, COLOR, bsdf, BASE_COLOR);
    }

    if let Some(raster) = roughness {
        let image = material.add_image(raster, [-300.0, 0.0]);
        if invert_roughness {
            let invert = material.add_invert([-100.0, 0.0]);
            material.link(image, COLOR, invert, COLOR);
            material.link(invert, COLOR, bsdf, ROUGHNESS);
        } else {
            material.link(image, COLOR, bsdf, ROUGHNESS);
        }
    }

    material
}
