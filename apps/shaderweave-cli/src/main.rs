use clap::{Parser, Subcommand};
use glam::Vec3;
use shaderweave_assemble::{ProgramTemplate, assemble};
use shaderweave_bind::{ProgramCacheKey, UniformSetKey, bind_uniforms, resolve_config};
use shaderweave_common::ObjectId;
use shaderweave_registry::standard_registry;
use shaderweave_runtime::{
    DynamicFrameData, EffectComposer, ObjectBinding, TrackedActor, WorldPositions,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shaderweave-cli", about = "CLI tool for shaderweave operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// List registered effects and their uniform schemas
    Effects,
    /// Assemble the standard program and print both stages
    Assemble {
        /// Print only diagnostics, not the source text
        #[arg(long)]
        diagnostics_only: bool,
    },
    /// Resolve and bind a stored object configuration, then run a few frames
    Preview {
        /// YAML file with the stored per-object configuration
        #[arg(short, long)]
        config: PathBuf,
        /// Number of frames to simulate
        #[arg(short, long, default_value = "3")]
        frames: u32,
    },
}

struct StaticScene;

impl WorldPositions for StaticScene {
    fn position_of(&self, _object: ObjectId) -> Option<Vec3> {
        Some(Vec3::new(0.0, 1.5, 0.0))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("shaderweave-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", shaderweave_common::crate_info());
            println!("registry: {}", shaderweave_registry::crate_info());
            println!("assemble: {}", shaderweave_assemble::crate_info());
            println!("bind: {}", shaderweave_bind::crate_info());
            println!("runtime: {}", shaderweave_runtime::crate_info());
        }
        Commands::Effects => {
            let registry = standard_registry();
            for effect in registry.reflect() {
                println!("{} ({})", effect.id, effect.title);
                for u in &effect.uniforms {
                    let range = match u.range {
                        Some((min, max)) => format!(" [{min}, {max}]"),
                        None => String::new(),
                    };
                    println!("  {}: {:?} = {:?}{}", u.name, u.ty, u.default, range);
                }
            }
        }
        Commands::Assemble { diagnostics_only } => {
            let registry = standard_registry();
            let program = assemble(&registry, &ProgramTemplate::standard());
            if program.diagnostics.is_empty() {
                println!("// no diagnostics");
            }
            for issue in &program.diagnostics {
                println!("// diagnostic: {issue}");
            }
            if !diagnostics_only {
                println!("// ===== vertex =====");
                println!("{}", program.vertex);
                println!("// ===== fragment =====");
                println!("{}", program.fragment);
            }
        }
        Commands::Preview { config, frames } => {
            let text = std::fs::read_to_string(&config)?;
            let stored: serde_json::Value = serde_yaml::from_str(&text)?;

            let registry = standard_registry();
            let resolved = resolve_config(&registry, Some(&stored));
            println!("enabled effects: {:?}", resolved.enabled_ids());
            println!("program cache key: {}", ProgramCacheKey::from_config(&resolved));
            println!("uniform set key:   {}", UniformSetKey::from_config(&resolved));

            let (block, requests) = bind_uniforms(&registry, &resolved);
            println!("bound uniforms ({}):", block.len());
            for (name, value) in block.iter() {
                println!("  {name} = {value:?}");
            }
            for request in &requests {
                println!("pending texture: {} <- {}", request.uniform, request.path);
            }

            let mut composer = EffectComposer::standard();
            let handle = composer.attach(
                &ObjectBinding {
                    object: ObjectId::new(),
                    position: Vec3::new(0.0, 1.5, 0.0),
                    size: Vec3::new(1.0, 2.0, 1.0),
                },
                Some(&stored),
            );
            for frame in 0..frames {
                let data = DynamicFrameData {
                    clock: frame as f32 / 60.0,
                    actors: vec![TrackedActor {
                        position: Vec3::new(frame as f32, 0.0, 0.0),
                        size: 1.0,
                    }],
                    audio: Vec3::new(0.5, 0.3, 0.1),
                };
                composer.update_all(&data, &StaticScene);
            }
            if let Some(h) = composer.handle(handle) {
                println!(
                    "after {} frames: time={:?} yPos={:?}",
                    frames,
                    h.uniforms.get("time"),
                    h.uniforms.get("yPos")
                );
            }
        }
    }

    Ok(())
}
