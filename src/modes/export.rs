//! Export mode: convert a trained model into the interchange format
//!
//! Loads a saved checkpoint, writes the portable weights + manifest pair,
//! and verifies that the exported policy picks the same actions as the
//! checkpoint it came from.

use anyhow::{Context, Result};
use burn::module::AutodiffModule;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::rl::{InferenceBackend, default_device, export_model, load_network};

/// Configuration for export mode
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Path to the trained model checkpoint
    pub model_path: PathBuf,

    /// Output path stem; `<stem>.weights.json` and `<stem>.manifest.json`
    /// are written
    pub output_stem: PathBuf,
}

impl ExportConfig {
    pub fn new(model_path: PathBuf, output_stem: PathBuf) -> Self {
        Self {
            model_path,
            output_stem,
        }
    }
}

/// Run the export
pub fn run(config: &ExportConfig) -> Result<()> {
    let device = default_device();

    use burn::backend::Autodiff;
    let (network, metadata) =
        load_network::<Autodiff<InferenceBackend>>(&config.model_path, &device)
            .with_context(|| format!("Failed to load model from {:?}", config.model_path))?;
    let network = network.valid();

    info!(
        path = ?config.model_path,
        training_steps = metadata.training_steps,
        episodes_trained = metadata.episodes_trained,
        "loaded checkpoint"
    );

    let report = export_model(&network, &metadata, &config.output_stem, &device)?;

    info!(
        weights = ?report.weights_path,
        manifest = ?report.manifest_path,
        verified_observations = report.verified_observations,
        "export complete and verified"
    );

    Ok(())
}

/// Convenience wrapper used by the CLI
pub fn run_with_paths(model_path: &Path, output_stem: &Path) -> Result<()> {
    run(&ExportConfig::new(
        model_path.to_path_buf(),
        output_stem.to_path_buf(),
    ))
}
