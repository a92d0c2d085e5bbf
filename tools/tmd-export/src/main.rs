//! tmd-export - TMD model export tool
//!
//! Converts scene snapshots (JSON written by the host tool) into .tmd files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Use modules from library
use tmd_export::{AxisPreset, ExportOptions, TMD_EXT, animation, export, manifest, scene};

#[derive(Parser)]
#[command(name = "tmd-export")]
#[command(about = "TMD model export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a single scene snapshot
    Export {
        /// Input scene snapshot (.json)
        input: PathBuf,

        /// Output .tmd file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Axis remap (y-up or identity)
        #[arg(long, default_value_t = AxisPreset::YUp)]
        axis: AxisPreset,
    },

    /// Build models from a manifest file
    Build {
        /// Path to tmd.toml manifest
        #[arg(default_value = manifest::DEFAULT_MANIFEST)]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to tmd.toml manifest
        #[arg(default_value = manifest::DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },

    /// List bones and actions of a scene snapshot
    List {
        /// Input scene snapshot (.json)
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            output,
            axis,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(TMD_EXT));
            tracing::info!("Exporting {:?} -> {:?}", input, output);
            let snapshot = scene::load_scene(&input)?;
            export::export_to_file(&snapshot, &ExportOptions::from(axis), &output)
                .with_context(|| format!("Failed to export {:?}", input))?;
            tracing::info!("Done!");
        }

        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building models from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::List { input } => {
            let snapshot = scene::load_scene(&input)?;
            list_snapshot(&snapshot);
        }
    }

    Ok(())
}

fn list_snapshot(snapshot: &scene::SceneSnapshot) {
    tracing::info!(
        "Object '{}' ({}): {} vertices, {} polygons, {} materials",
        snapshot.object.name,
        snapshot.object.kind,
        snapshot.mesh.vertices.len(),
        snapshot.mesh.polygons.len(),
        snapshot.mesh.materials.len()
    );

    match &snapshot.armature {
        Some(armature) => {
            tracing::info!("Armature: {} bones", armature.bones.len());
            for (i, bone) in armature.bones.iter().enumerate() {
                let parent = bone
                    .parent
                    .and_then(|p| armature.bones.get(p))
                    .map(|p| p.name.as_str())
                    .unwrap_or("-");
                tracing::info!("  [{}] '{}' parent: {}", i, bone.name, parent);
            }
        }
        None => tracing::info!("No armature"),
    }

    tracing::info!("Actions: {}", snapshot.actions.len());
    for action in &snapshot.actions {
        let (start, end) = action.frame_bounds();
        tracing::info!(
            "  '{}': frames {}..{}, {} pose channels",
            action.name,
            start,
            end,
            animation::pose_channel_count(action)
        );
    }
}
