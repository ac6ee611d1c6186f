//! Book Mesher CLI
//!
//! Lay out, animate and export the procedural book model.

use book_mesher::config::presets::random_palette;
use book_mesher::{
    export_glb, BookConfig, BookConfigInput, BookScene, ComponentId, LayoutEngine, Mesher,
    MesherConfig, ObjExport, Preset, SpringConfig,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "book-mesher")]
#[command(
    author,
    version,
    about = "Procedural 3D book model: layout, spring animation, export",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the component descriptors for a configuration as JSON
    Layout {
        #[command(flatten)]
        book: BookArgs,
    },

    /// Tessellate the book and write a GLB or OBJ file
    Export {
        #[command(flatten)]
        book: BookArgs,

        /// Output file path (extension added if missing)
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "glb")]
        format: OutputFormat,

        /// One batch per component instead of per material
        #[arg(long)]
        split: bool,

        /// Emit explicit back faces for double-sided parts
        #[arg(long)]
        back_faces: bool,
    },

    /// Run the spring simulation and print one JSON line per frame
    Animate {
        #[command(flatten)]
        book: BookArgs,

        /// Number of frames to simulate
        #[arg(long, default_value = "120")]
        frames: u32,

        /// Frame time in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,

        /// Toggle the exploded view before these frames
        #[arg(long, value_delimiter = ',', default_value = "0")]
        toggle_at: Vec<u32>,

        /// Spring tension
        #[arg(long)]
        tension: Option<f32>,

        /// Spring friction
        #[arg(long)]
        friction: Option<f32>,
    },

    /// List the named color presets
    Presets,
}

/// Configuration source shared by all book subcommands.
#[derive(Args)]
struct BookArgs {
    /// JSON configuration file (UI format); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Named color preset
    #[arg(short, long)]
    preset: Option<String>,

    /// Cover overhang: standard, half or full
    #[arg(short, long)]
    yap_size: Option<String>,

    /// Number of page slices
    #[arg(short = 'n', long)]
    pages: Option<i64>,

    /// closed or open
    #[arg(short, long)]
    variant: Option<String>,

    /// Start in the exploded view
    #[arg(short, long)]
    exploded: bool,

    /// Random palette from this seed
    #[arg(long)]
    random_colors: Option<u64>,

    /// Page jitter seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary glTF format
    Glb,
    /// Wavefront OBJ format
    Obj,
}

impl BookArgs {
    fn load(&self) -> Result<BookConfig, Box<dyn std::error::Error>> {
        let mut input = match &self.config {
            Some(path) => {
                log::info!("Loading configuration from {:?}", path);
                BookConfigInput::load(path)?
            }
            None => BookConfigInput {
                colors: Default::default(),
                ..Default::default()
            },
        };
        if let Some(preset) = &self.preset {
            input.preset = Some(preset.clone());
        }
        if let Some(yap) = &self.yap_size {
            input.yap_size = yap.clone();
        }
        if let Some(pages) = self.pages {
            input.page_count = pages;
        }
        if let Some(variant) = &self.variant {
            input.view_variant = variant.clone();
        }
        if self.exploded {
            input.is_exploded = true;
        }

        let mut config = input.validate()?;
        if let Some(seed) = self.random_colors {
            config = config.with_palette(random_palette(&mut StdRng::seed_from_u64(seed)));
        }
        log::debug!("Configuration: {:?}", config);
        Ok(config)
    }

    fn scene(&self, springs: SpringConfig) -> Result<BookScene, Box<dyn std::error::Error>> {
        let config = self.load()?;
        let layout = match self.seed {
            Some(seed) => LayoutEngine::with_seed(seed),
            None => LayoutEngine::new(),
        };
        Ok(BookScene::with_parts(layout, springs, config))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout { book } => {
            let scene = book.scene(SpringConfig::default())?;
            println!("{}", serde_json::to_string_pretty(scene.descriptors())?);
        }
        Commands::Export {
            book,
            output,
            format,
            split,
            back_faces,
        } => {
            let scene = book.scene(SpringConfig::default())?;
            let mesher = Mesher::with_config(MesherConfig {
                merge_materials: !split,
                back_faces,
                ..Default::default()
            });
            export_scene(&scene, &mesher, &output, format)?;
        }
        Commands::Animate {
            book,
            frames,
            dt,
            toggle_at,
            tension,
            friction,
        } => {
            let defaults = SpringConfig::default();
            let springs = SpringConfig::new(
                defaults.mass,
                tension.unwrap_or(defaults.tension),
                friction.unwrap_or(defaults.friction),
            );
            let mut scene = book.scene(springs)?;
            animate(&mut scene, frames, dt, &toggle_at)?;
        }
        Commands::Presets => show_presets(),
    }

    Ok(())
}

fn export_scene(
    scene: &BookScene,
    mesher: &Mesher,
    path: &Path,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let list = scene.render_list();
    let output = mesher.mesh(&list)?;
    println!(
        "Meshed {} components: {} vertices, {} triangles in {} batches",
        list.len(),
        output.total_vertices(),
        output.total_triangles(),
        output.batches.len()
    );

    match format {
        OutputFormat::Glb => {
            let glb_path = if path.extension().is_some() {
                path.to_path_buf()
            } else {
                path.with_extension("glb")
            };
            let glb_data = export_glb(&output)?;
            fs::write(&glb_path, &glb_data)?;
            println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), glb_path);
        }
        OutputFormat::Obj => {
            let obj_path = if path.extension().is_some() {
                path.to_path_buf()
            } else {
                path.with_extension("obj")
            };
            let name = obj_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("book")
                .to_string();
            let obj_export = ObjExport::from_output(&output, &name)?;
            let mtl_path = obj_path.with_extension("mtl");

            fs::write(&obj_path, &obj_export.obj)?;
            fs::write(&mtl_path, &obj_export.mtl)?;

            println!("Exported OBJ to {:?}", obj_path);
            println!("  Material: {:?}", mtl_path);
        }
    }

    Ok(())
}

fn animate(
    scene: &mut BookScene,
    frames: u32,
    dt: f32,
    toggle_at: &[u32],
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for frame in 0..frames {
        if toggle_at.contains(&frame) {
            scene.toggle_exploded();
            log::info!("Frame {}: exploded = {}", frame, scene.config().exploded);
        }
        scene.tick(dt);

        let positions: serde_json::Map<String, serde_json::Value> = scene
            .render_list()
            .iter()
            .filter(|item| item.animated)
            .map(|item| (item.id.to_string(), serde_json::json!(item.position)))
            .collect();
        let line = serde_json::json!({
            "frame": frame,
            "time": (frame + 1) as f32 * dt,
            "exploded": scene.config().exploded,
            "settled": scene.springs().is_settled(),
            "positions": positions,
        });
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}

fn show_presets() {
    println!("Presets:");
    for preset in Preset::ALL {
        let palette = preset.palette();
        let colors: Vec<String> = ComponentId::ALL
            .iter()
            .map(|id| format!("{}={}", id, palette.get(*id)))
            .collect();
        println!("  {:<8} {}", preset.name(), colors.join(" "));
    }
}
