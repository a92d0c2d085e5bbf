//! Manifest parsing and build orchestration
//!
//! Parses tmd.toml and exports every listed model. Relative paths in the
//! manifest are resolved against the directory that contains it.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::export::{ExportOptions, export_to_file};
use crate::formats::TMD_EXT;
use crate::scene::load_scene;
use crate::space::{AxisPreset, mat4_from_rows};

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "tmd.toml";

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub export: ExportConfig,
    /// Model name -> scene snapshot, exported in name order
    #[serde(default)]
    pub models: BTreeMap<String, ModelEntry>,
    /// Directory of the manifest file
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("models/")
}

/// Coordinate conversion shared by every model
#[derive(Debug, Deserialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub axis: Option<AxisPreset>,
    /// Explicit row-major axis remap, instead of `axis`
    #[serde(default)]
    pub matrix: Option<[[f32; 4]; 4]>,
}

impl ExportConfig {
    pub fn options(&self) -> Result<ExportOptions> {
        match (self.axis, &self.matrix) {
            (Some(_), Some(_)) => bail!("[export] sets both 'axis' and 'matrix', pick one"),
            (None, Some(rows)) => Ok(ExportOptions {
                axis_remap: mat4_from_rows(rows),
            }),
            (Some(preset), None) => Ok(preset.into()),
            (None, None) => Ok(ExportOptions::default()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ModelEntry {
    Simple(PathBuf),
    Detailed { path: PathBuf },
}

impl ModelEntry {
    pub fn path(&self) -> &Path {
        match self {
            ModelEntry::Simple(p) => p,
            ModelEntry::Detailed { path } => path,
        }
    }
}

impl Manifest {
    /// Source path of a model, resolved against the manifest directory
    pub fn source_path(&self, entry: &ModelEntry) -> PathBuf {
        self.base_dir.join(entry.path())
    }

    /// Output directory, resolved against the manifest directory
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.output.dir)
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: Manifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &Manifest) -> Result<()> {
    manifest.export.options()?;

    for (name, entry) in &manifest.models {
        if name.is_empty() || name.contains(['/', '\\']) {
            bail!("Model name {:?} cannot be used as a file name", name);
        }
        let source = manifest.source_path(entry);
        if !source.exists() {
            bail!("Model '{}' source not found: {:?}", name, source);
        }
    }
    Ok(())
}

/// Export every model of a manifest
pub fn build_all(manifest: &Manifest, output_override: Option<&Path>) -> Result<()> {
    validate(manifest)?;
    let options = manifest.export.options()?;

    let output_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => manifest.output_dir(),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    if manifest.models.is_empty() {
        tracing::warn!("Manifest lists no models");
    }

    for (name, entry) in &manifest.models {
        let source = manifest.source_path(entry);
        let output = output_dir.join(format!("{}.{}", name, TMD_EXT));
        tracing::info!("Exporting model: {} -> {:?}", name, output);

        let scene = load_scene(&source)?;
        export_to_file(&scene, &options, &output)
            .with_context(|| format!("Failed to export model '{}'", name))?;
    }

    Ok(())
}
