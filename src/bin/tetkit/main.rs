//! tetkit CLI - tet mesh inspection and boundary extraction.
//!
//! Usage: tetkit [OPTIONS] <COMMAND> <INPUT> [OUTPUT]
//!
//! Run `tetkit --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use tetkit::io::{self, LoadOptions};
use tetkit::mesh::SurfaceMesh;
use tetkit::tet::TetMesh;

#[derive(Parser)]
#[command(name = "tetkit")]
#[command(author, version, about = "Tet mesh topology CLI", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Flags controlling how `.t` files are loaded.
#[derive(Args)]
struct LoadArgs {
    /// Keep tets in file order instead of repairing inverted ones
    #[arg(long)]
    no_orientation: bool,

    /// Do not check `Edge` records against the tets
    #[arg(long)]
    skip_edges: bool,

    /// Tolerate vertices that no tet uses
    #[arg(long)]
    allow_isolated: bool,

    /// Volume at or below which a tet counts as flat
    #[arg(long, default_value_t = tetkit::tet::DEFAULT_DEGENERATE_VOLUME)]
    min_volume: f64,
}

impl LoadArgs {
    fn options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_check_orientation(!self.no_orientation)
            .with_validate_edges(!self.skip_edges)
            .with_allow_isolated_vertices(self.allow_isolated)
            .with_degenerate_volume(self.min_volume)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Display tet mesh and boundary statistics
    Info {
        /// Input .t file
        input: PathBuf,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Extract the boundary surface
    Extract {
        /// Input .t file
        input: PathBuf,

        /// Output surface (.obj, .ply or .stl)
        output: PathBuf,

        #[command(flatten)]
        load: LoadArgs,
    },

    /// Check connectivity invariants of the tet mesh and its boundary
    Validate {
        /// Input .t file
        input: PathBuf,

        #[command(flatten)]
        load: LoadArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, load } => cmd_info(&input, &load.options())?,
        Commands::Extract {
            input,
            output,
            load,
        } => cmd_extract(&input, &output, &load.options())?,
        Commands::Validate { input, load } => cmd_validate(&input, &load.options())?,
    }
    Ok(())
}

fn load(input: &Path, options: &LoadOptions) -> Result<TetMesh, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mesh = io::tet::load(input, options)?;
    println!(
        "Loaded: {} vertices, {} tets ({:.2?})",
        mesh.num_vertices(),
        mesh.num_tets(),
        start.elapsed()
    );
    Ok(mesh)
}

fn cmd_info(input: &Path, options: &LoadOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load(input, options)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Edges: {}", mesh.num_edges());
    println!("Faces: {}", mesh.num_faces());
    println!("Tets: {}", mesh.num_tets());

    let boundary_faces = mesh.faces().filter(|(_, f)| f.boundary).count();
    let boundary_edges = mesh.edges().filter(|(_, e)| e.boundary).count();
    let boundary_vertices = mesh.boundary_vertices().count();
    println!(
        "Boundary: {} faces, {} edges, {} vertices",
        boundary_faces, boundary_edges, boundary_vertices
    );

    println!("Volume: {:.6}", mesh.total_volume());
    println!("Boundary area: {:.6}", mesh.boundary_area());

    let inverted = mesh.tet_ids().filter(|&t| mesh.tet_volume(t) <= 0.0).count();
    if inverted > 0 {
        println!("Inverted tets: {}", inverted);
    }

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: &Path,
    options: &LoadOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load(input, options)?;

    let start = Instant::now();
    let surface = SurfaceMesh::from_tet_mesh(&mesh)?;
    println!(
        "Extracted: {} vertices, {} faces ({:.2?})",
        surface.num_vertices(),
        surface.num_faces(),
        start.elapsed()
    );

    io::save(&surface, output)?;
    println!("Saved: {}", output.display());
    Ok(())
}

fn cmd_validate(input: &Path, options: &LoadOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load(input, options)?;

    let start = Instant::now();
    mesh.validate_with(options.allow_isolated_vertices)?;
    let surface = SurfaceMesh::from_tet_mesh(&mesh)?;
    surface.validate()?;

    let open_edges = surface.edges().filter(|(_, e)| e.boundary).count();
    println!("Tet mesh: OK");
    if open_edges == 0 {
        println!("Boundary surface: OK (closed)");
    } else {
        println!("Boundary surface: OK ({} open edges)", open_edges);
    }
    println!("Validated in {:.2?}", start.elapsed());
    Ok(())
}
