//! Preview tool for checking displacement settings visually
//! Builds one baked tile from a heightmap and saves a shaded top-down image

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use heightmap_tiles::builder::{build_displaced_plane, DisplacementSettings};
use heightmap_tiles::preview;
use heightmap_tiles::raster::{ImageLoader, RasterSource};

#[derive(Parser, Debug)]
#[command(name = "tile_preview")]
#[command(about = "Render a shaded top-down preview of one displaced tile")]
struct Args {
    /// Heightmap image to displace the tile with
    heightmap: PathBuf,

    /// Displacement strength
    #[arg(short, long, default_value = "1.0", allow_negative_numbers = true)]
    strength: f32,

    /// Simple subdivision levels applied before displacement
    #[arg(short, long, default_value = "0")]
    levels: u32,

    /// Preview image size in pixels
    #[arg(long, default_value = "256")]
    size: usize,

    /// Output image path
    #[arg(short, long, default_value = "tile_preview.png")]
    out: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("Building preview tile from {}", args.heightmap.display());
    let mut loader = ImageLoader::new();
    let heightmap = loader.load(&args.heightmap)?;
    println!("  Heightmap: {}x{}", heightmap.width(), heightmap.height());

    let settings = DisplacementSettings {
        strength: args.strength,
        subdivision_levels: args.levels,
    };
    let mesh = build_displaced_plane("Preview", heightmap, settings, 0.0, true);
    println!("  Mesh: {} vertices, {} faces", mesh.vertex_count(), mesh.face_count());

    if let Some((min, max)) = mesh.world_bounds() {
        println!("  Height range: {:.3} to {:.3}", min.z, max.z);
    }

    preview::export_preview(&mesh, args.size, &args.out)?;
    println!("Saved preview to: {}", args.out);
    Ok(())
}
