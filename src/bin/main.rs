//! AWD Exporter CLI
//!
//! Write AWD files from JSON scene descriptions.

use awd_exporter::export::awd::output_path;
use awd_exporter::{
    load_scene, Compression, ExportOptions, Exporter, SceneSource, VertexDeduplicator,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "awd-export")]
#[command(author, version, about = "Write AWD scene files from JSON mesh data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a scene description to an AWD file
    Export {
        /// Input JSON file containing the scene description
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (".awd" is added if there is no extension)
        #[arg(short, long)]
        output: PathBuf,

        /// JSON file with export options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Compress the file body with zlib
        #[arg(long)]
        compress: bool,

        /// Leave out vertex normals
        #[arg(long)]
        no_normals: bool,

        /// Leave out texture coordinates
        #[arg(long)]
        no_uv: bool,
    },

    /// Show per-mesh statistics for a scene description without writing anything
    Info {
        /// Input JSON file containing the scene description
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            output,
            config,
            compress,
            no_normals,
            no_uv,
        } => {
            let mut options = match &config {
                Some(path) => ExportOptions::from_path(path)?,
                None => ExportOptions::default(),
            };
            if compress {
                options = options.with_compression(Compression::Compressed);
            }
            if no_normals {
                options = options.with_normals(false);
            }
            if no_uv {
                options = options.with_uv(false);
            }
            export_scene(&input, &output, options)?;
        }
        Commands::Info { input } => {
            show_scene_info(&input)?;
        }
    }

    Ok(())
}

fn export_scene(
    input_path: &PathBuf,
    output_path_arg: &PathBuf,
    options: ExportOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading scene from {:?}...", input_path);
    let scene = load_scene(input_path)?;
    println!("  Found {} meshes", scene.mesh_count());

    println!("Exporting with options:");
    println!("  - Compression: {:?}", options.compression);
    println!("  - Normals: {}", options.include_normals);
    println!("  - UVs: {}", options.include_uv);

    let path = output_path(output_path_arg);
    let summary = Exporter::new(options).export_to_path(&scene, &path)?;

    println!(
        "  Exported {} meshes ({} skipped) as {} blocks",
        summary.meshes_exported, summary.meshes_skipped, summary.blocks
    );
    println!(
        "  {} corners -> {} vertices",
        summary.corners, summary.unique_vertices
    );
    println!("Exported AWD ({} bytes) to {:?}", summary.bytes_written, path);

    Ok(())
}

fn show_scene_info(input_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading scene from {:?}...", input_path);
    let scene = load_scene(input_path)?;
    let options = ExportOptions::default();

    println!("\nScene Info:");
    println!("  Meshes: {}", scene.mesh_count());

    for mesh in scene.meshes() {
        if mesh.intermediate {
            println!("  {} (intermediate, skipped)", mesh.name);
            continue;
        }
        if let Err(e) = mesh.validate() {
            println!("  {}: {}", mesh.name, e);
            continue;
        }

        let attributes = mesh.attributes(options.attributes());
        let mut dedup = VertexDeduplicator::new(attributes);
        dedup.extend(mesh.corners(attributes))?;
        let stats = dedup.stats();
        println!(
            "  {}: {} triangles, {} corners -> {} vertices (normals: {}, uv: {})",
            mesh.name,
            mesh.triangle_count(),
            stats.corners,
            stats.unique_vertices,
            attributes.normals,
            attributes.uv
        );
    }

    Ok(())
}
