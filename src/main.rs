use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use heightmap_tiles::config::TileSettings;
use heightmap_tiles::planner::{self, GridOutcome};
use heightmap_tiles::raster::ImageLoader;
use heightmap_tiles::report::Reporter;
use heightmap_tiles::scene::Scene;

#[derive(Parser, Debug)]
#[command(name = "heightmap_tiles")]
#[command(about = "Generate 3D terrain tiles from a grid of _y<Y>_x<X> heightmaps")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate solid tiles and export one STL file per tile
    Stl(StlArgs),
    /// Generate textured tiles laid out on a 10-unit grid
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// JSON settings file; flags given on the command line override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of rows in the tile grid (1 for a single heightmap)
    #[arg(short, long)]
    rows: Option<u32>,

    /// Number of columns in the tile grid (1 for a single heightmap)
    #[arg(short, long)]
    cols: Option<u32>,

    /// Displacement strength applied to the heightmap
    #[arg(short, long, allow_negative_numbers = true)]
    strength: Option<f32>,

    /// Simple subdivision levels applied before displacement
    #[arg(short = 'l', long)]
    subdivision_levels: Option<u32>,

    /// Starting heightmap file, e.g. Height_y0_x0.png
    #[arg(short = 'H', long)]
    heightmap: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StlArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Minimum thickness of the solid tiles
    #[arg(short, long)]
    thickness: Option<f32>,

    /// Directory the STL files are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// First texture file of the set matching the heightmap tiles
    #[arg(long)]
    texture: Option<PathBuf>,

    /// First roughness file of the set matching the heightmap tiles
    #[arg(long)]
    roughness: Option<PathBuf>,

    /// Invert the roughness map of every tile (`--invert-roughness=false` turns it off)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    invert_roughness: Option<bool>,

    /// Write the generated scene as JSON
    #[arg(long)]
    manifest: Option<PathBuf>,
}

impl CommonArgs {
    fn settings(&self) -> Result<TileSettings, Box<dyn Error>> {
        let mut settings = match &self.config {
            Some(path) => TileSettings::load(path)?,
            None => TileSettings::default(),
        };
        if let Some(rows) = self.rows {
            settings.rows = rows;
        }
        if let Some(cols) = self.cols {
            settings.cols = cols;
        }
        if let Some(strength) = self.strength {
            settings.displacement_strength = strength;
        }
        if let Some(levels) = self.subdivision_levels {
            settings.subdivision_levels = levels;
        }
        if let Some(heightmap) = &self.heightmap {
            settings.heightmap = heightmap.clone();
        }
        Ok(settings)
    }
}

impl StlArgs {
    fn settings(&self) -> Result<TileSettings, Box<dyn Error>> {
        let mut settings = self.common.settings()?;
        if let Some(thickness) = self.thickness {
            settings.tile_thickness = thickness;
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        Ok(settings)
    }
}

impl RenderArgs {
    fn settings(&self) -> Result<TileSettings, Box<dyn Error>> {
        let mut settings = self.common.settings()?;
        if let Some(texture) = &self.texture {
            settings.texture = Some(texture.clone());
        }
        if let Some(roughness) = &self.roughness {
            settings.roughness = Some(roughness.clone());
        }
        if let Some(invert) = self.invert_roughness {
            settings.invert_roughness = invert;
        }
        Ok(settings)
    }
}

fn run_stl(args: &StlArgs) -> Result<GridOutcome, Box<dyn Error>> {
    let config = args.settings()?.solid_config()?;

    println!(
        "Generating {}x{} solid tiles from {}",
        config.grid.rows,
        config.grid.cols,
        config.grid.heightmap.display()
    );
    println!("  Output: {}", config.output_dir.display());

    let mut loader = ImageLoader::new();
    let mut reporter = Reporter::new();
    Ok(planner::generate_solid_tiles(&config, &mut loader, &mut reporter))
}

fn run_render(args: &RenderArgs) -> Result<GridOutcome, Box<dyn Error>> {
    let config = args.settings()?.render_config()?;

    println!(
        "Generating {}x{} render tiles from {}",
        config.grid.rows,
        config.grid.cols,
        config.grid.heightmap.display()
    );

    let mut loader = ImageLoader::new();
    let mut scene = Scene::new();
    let mut reporter = Reporter::new();
    let outcome = planner::generate_render_tiles(&config, &mut loader, &mut scene, &mut reporter);

    println!("Scene holds {} tiles", scene.len());
    if let Some(path) = &args.manifest {
        scene.write_manifest(path)?;
        println!("Scene manifest saved to: {}", path.display());
    }
    Ok(outcome)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Stl(args) => run_stl(args),
        Command::Render(args) => run_render(args),
    };

    match result {
        Ok(GridOutcome::Finished { tiles }) => {
            println!("Finished: {} tiles generated", tiles);
            ExitCode::SUCCESS
        }
        Ok(GridOutcome::Cancelled { tile, error, tiles_built }) => {
            eprintln!("Cancelled at tile {}: {}", tile, error);
            eprintln!("  {} tiles were generated before the failure", tiles_built);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
