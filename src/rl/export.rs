//! Interchange export for trained policies
//!
//! Writes a trained actor-critic network into a portable, framework-neutral
//! pair of files that external runtimes can consume:
//!
//! - `<stem>.weights.json` - full-precision weights (Burn JSON record)
//! - `<stem>.manifest.json` - input/output signature and decision rule
//!
//! The manifest pins the contract: one `f32` input named `obs` with shape
//! `[1, 3]`, one output named `action_logits` with shape `[1, 3]`, and the
//! action is the argmax over the logits. After writing, the export is
//! verified by loading the weights back into a fresh network and checking
//! that both networks pick the same action on a probe batch of observations.

use anyhow::{Context, Result, bail};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, PrettyJsonFileRecorder, Recorder},
    tensor::{Tensor, backend::Backend},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::network::{ActorCriticConfig, ActorCriticNetwork};
use super::observation::OBS_DIM;
use super::persistence::ModelMetadata;
use crate::game::Action;

/// Tensor signature in the export manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
}

/// Manifest describing the exported policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportManifest {
    /// Manifest format identifier
    pub format: String,

    /// Crate version that produced the export
    pub version: String,

    /// Input tensor signature
    pub input: TensorSpec,

    /// Output tensor signature
    pub output: TensorSpec,

    /// How to turn the output into an action ("argmax")
    pub decision_rule: String,

    /// Action index meanings, in index order
    pub actions: Vec<String>,

    /// Network shape, so consumers can rebuild the MLP
    pub obs_dim: usize,
    pub num_actions: usize,
    pub hidden_dim: usize,

    /// Training provenance
    pub training_steps: usize,
    pub episodes_trained: usize,
}

impl ExportManifest {
    fn new(metadata: &ModelMetadata) -> Self {
        Self {
            format: "ml-drive-policy/1".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            input: TensorSpec {
                name: "obs".to_string(),
                shape: vec![1, metadata.obs_dim],
                dtype: "float32".to_string(),
            },
            output: TensorSpec {
                name: "action_logits".to_string(),
                shape: vec![1, metadata.num_actions],
                dtype: "float32".to_string(),
            },
            decision_rule: "argmax".to_string(),
            actions: vec![
                "move_left".to_string(),
                "stay".to_string(),
                "move_right".to_string(),
            ],
            obs_dim: metadata.obs_dim,
            num_actions: metadata.num_actions,
            hidden_dim: metadata.hidden_dim,
            training_steps: metadata.training_steps,
            episodes_trained: metadata.episodes_trained,
        }
    }
}

/// Paths produced by a successful export
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub weights_path: PathBuf,
    pub manifest_path: PathBuf,
    /// Number of probe observations checked during verification
    pub verified_observations: usize,
}

/// Export a trained network to the interchange format and verify it
///
/// `stem` is the output path without extension; `<stem>.weights.json` and
/// `<stem>.manifest.json` are written next to each other. Parent directories
/// are created as needed.
pub fn export_model<B: Backend>(
    network: &ActorCriticNetwork<B>,
    metadata: &ModelMetadata,
    stem: &Path,
    device: &B::Device,
) -> Result<ExportReport> {
    if let Some(parent) = stem.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let weights_path = stem.with_extension("weights.json");
    let manifest_path = stem.with_extension("manifest.json");

    // Weights as a full-precision JSON record
    let recorder = PrettyJsonFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(network.clone().into_record(), weights_path.clone())
        .context("Failed to write exported weights")?;

    let manifest = ExportManifest::new(metadata);
    let manifest_json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
    std::fs::write(&manifest_path, manifest_json)
        .with_context(|| format!("Failed to write manifest to {:?}", manifest_path))?;

    let verified = verify_export(network, metadata, &weights_path, device)?;

    Ok(ExportReport {
        weights_path,
        manifest_path,
        verified_observations: verified,
    })
}

/// Greedy action for a single observation: argmax over the actor logits
pub fn greedy_action<B: Backend>(
    network: &ActorCriticNetwork<B>,
    observation: Tensor<B, 1>,
) -> Action {
    let obs_batch = observation.unsqueeze_dim(0); // [1, 3]
    let (action_logits, _value) = network.forward(obs_batch);

    let data = action_logits.to_data();
    let logits = data
        .as_slice::<f32>()
        .expect("logits data should be f32");

    let mut best = 0;
    for (idx, &logit) in logits.iter().enumerate() {
        if logit > logits[best] {
            best = idx;
        }
    }
    Action::from_index(best)
}

/// Reload the exported weights and compare greedy actions on a probe batch
///
/// Probes a grid of observations spanning both lanes and the full vertical
/// progress range, matching the reachable observation space.
fn verify_export<B: Backend>(
    network: &ActorCriticNetwork<B>,
    metadata: &ModelMetadata,
    weights_path: &Path,
    device: &B::Device,
) -> Result<usize> {
    let recorder = PrettyJsonFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(weights_path.to_path_buf(), device)
        .context("Failed to reload exported weights for verification")?;
    let reloaded = metadata.network_config().init::<B>(device).load_record(record);

    let mut checked = 0;
    for player_lane in [0.0f32, 1.0] {
        for opponent_lane in [0.0f32, 1.0] {
            for step in 0..=20 {
                let progress = -0.5 + step as f32 * 0.1; // -0.5 ..= 1.5
                let obs = Tensor::<B, 1>::from_floats(
                    [player_lane, opponent_lane, progress],
                    device,
                );

                let expected = greedy_action(network, obs.clone());
                let actual = greedy_action(&reloaded, obs);

                if expected != actual {
                    bail!(
                        "exported policy diverges at obs [{}, {}, {:.2}]: {:?} vs {:?}",
                        player_lane,
                        opponent_lane,
                        progress,
                        expected,
                        actual
                    );
                }
                checked += 1;
            }
        }
    }

    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{InferenceBackend, PPOConfig, default_device};
    use tempfile::TempDir;

    fn test_metadata() -> ModelMetadata {
        ModelMetadata::new(PPOConfig::default(), &ActorCriticConfig::new(), 42, 7)
    }

    #[test]
    fn test_export_writes_both_files() {
        let device = default_device();
        let network = ActorCriticConfig::new().init::<InferenceBackend>(&device);

        let dir = TempDir::new().unwrap();
        let stem = dir.path().join("policy");

        let report = export_model(&network, &test_metadata(), &stem, &device).unwrap();

        assert!(report.weights_path.exists());
        assert!(report.manifest_path.exists());
        assert!(report.verified_observations > 0);
    }

    #[test]
    fn test_manifest_contents() {
        let device = default_device();
        let network = ActorCriticConfig::new().init::<InferenceBackend>(&device);

        let dir = TempDir::new().unwrap();
        let stem = dir.path().join("policy");

        let report = export_model(&network, &test_metadata(), &stem, &device).unwrap();

        let manifest_json = std::fs::read_to_string(&report.manifest_path).unwrap();
        let manifest: ExportManifest = serde_json::from_str(&manifest_json).unwrap();

        assert_eq!(manifest.input.name, "obs");
        assert_eq!(manifest.input.shape, vec![1, OBS_DIM]);
        assert_eq!(manifest.input.dtype, "float32");
        assert_eq!(manifest.output.name, "action_logits");
        assert_eq!(manifest.output.shape, vec![1, 3]);
        assert_eq!(manifest.decision_rule, "argmax");
        assert_eq!(manifest.actions.len(), 3);
        assert_eq!(manifest.training_steps, 42);
    }

    #[test]
    fn test_greedy_action_picks_argmax() {
        let device = default_device();
        let network = ActorCriticConfig::new().init::<InferenceBackend>(&device);

        // Whatever the untrained weights are, the greedy action must be
        // deterministic for a fixed observation
        let obs = Tensor::<InferenceBackend, 1>::from_floats([1.0, 0.0, 0.3], &device);
        let first = greedy_action(&network, obs.clone());
        let second = greedy_action(&network, obs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_into_nested_directory() {
        let device = default_device();
        let network = ActorCriticConfig::new().init::<InferenceBackend>(&device);

        let dir = TempDir::new().unwrap();
        let stem = dir.path().join("deep").join("nested").join("policy");

        let report = export_model(&network, &test_metadata(), &stem, &device).unwrap();
        assert!(report.weights_path.exists());
    }
}
