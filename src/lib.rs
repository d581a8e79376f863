//! Heightmap tile generation library
//!
//! Turns a grid of `_y<Y>_x<X>` heightmap files into displaced terrain tiles,
//! either as printable STL solids or as textured render tiles.

pub mod builder;
pub mod config;
pub mod error;
pub mod material;
pub mod mesh;
pub mod paths;
pub mod pixel_grid;
pub mod planner;
pub mod preview;
pub mod raster;
pub mod render;
pub mod report;
pub mod scene;
pub mod solid;
pub mod stl;
