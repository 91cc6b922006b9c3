//! Model persistence for saving and loading trained agents
//!
//! Saves and loads trained PPO agents, both the network weights and training
//! metadata, using Burn's Record system.

use super::{ActorCriticConfig, ActorCriticNetwork, PPOAgent, PPOConfig};
use anyhow::{Context, Result};
use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata saved with the model
///
/// Contains the configuration and training information needed to reconstruct
/// and use the saved model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// PPO configuration used during training
    pub ppo_config: PPOConfig,

    /// Number of observation features
    pub obs_dim: usize,

    /// Number of discrete actions
    pub num_actions: usize,

    /// Hidden layer width
    pub hidden_dim: usize,

    /// Total training steps completed
    pub training_steps: usize,

    /// Number of episodes trained
    pub episodes_trained: usize,

    /// Version identifier for compatibility checking
    pub version: String,
}

impl ModelMetadata {
    pub fn new(
        ppo_config: PPOConfig,
        network_config: &ActorCriticConfig,
        training_steps: usize,
        episodes_trained: usize,
    ) -> Self {
        Self {
            ppo_config,
            obs_dim: network_config.obs_dim,
            num_actions: network_config.num_actions,
            hidden_dim: network_config.hidden_dim,
            training_steps,
            episodes_trained,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Network configuration described by this metadata
    pub fn network_config(&self) -> ActorCriticConfig {
        ActorCriticConfig {
            obs_dim: self.obs_dim,
            num_actions: self.num_actions,
            hidden_dim: self.hidden_dim,
        }
    }
}

/// Save a trained PPO agent to a file
///
/// The model is saved in two files:
/// - `<path>` - Network weights (Burn record format)
/// - `<path>.meta.json` - Metadata as JSON
///
/// Creates parent directories if they don't exist.
pub fn save_model<B: AutodiffBackend>(agent: &PPOAgent<B>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let network = agent.network();
    let record = network.clone().into_record();

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    recorder
        .record(record, path.to_path_buf())
        .context("Failed to save network weights")?;

    let metadata = ModelMetadata::new(
        agent.config().clone(),
        &ActorCriticConfig::new(),
        agent.training_step(),
        agent.episodes_trained(),
    );

    let meta_path = path.with_extension("meta.json");
    let meta_json =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    std::fs::write(&meta_path, meta_json)
        .with_context(|| format!("Failed to write metadata to {:?}", meta_path))?;

    Ok(())
}

/// Load a trained network from a file
///
/// Deserializes a previously saved model, returning both the network and its
/// metadata. `path` is the weights file path, without the .meta.json suffix.
pub fn load_network<B: AutodiffBackend>(
    path: &Path,
    device: &B::Device,
) -> Result<(ActorCriticNetwork<B>, ModelMetadata)> {
    let meta_path = path.with_extension("meta.json");
    let meta_json = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("Failed to read metadata from {:?}", meta_path))?;
    let metadata: ModelMetadata =
        serde_json::from_str(&meta_json).context("Failed to deserialize metadata")?;

    // Reconstruct network shape from metadata before loading weights
    let mut network = metadata.network_config().init::<B>(device);

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.to_path_buf(), device)
        .with_context(|| format!("Failed to load network weights from {:?}", path))?;

    network = network.load_record(record);

    Ok((network, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{PPOAgent, TrainingBackend, default_device};
    use tempfile::TempDir;

    #[test]
    fn test_metadata_creation() {
        let metadata = ModelMetadata::new(PPOConfig::default(), &ActorCriticConfig::new(), 1000, 100);

        assert_eq!(metadata.obs_dim, 3);
        assert_eq!(metadata.num_actions, 3);
        assert_eq!(metadata.hidden_dim, 64);
        assert_eq!(metadata.training_steps, 1000);
        assert_eq!(metadata.episodes_trained, 100);
    }

    #[test]
    fn test_metadata_serialization() {
        let metadata = ModelMetadata::new(PPOConfig::default(), &ActorCriticConfig::new(), 1000, 100);

        let json = serde_json::to_string(&metadata).unwrap();
        let deserialized: ModelMetadata = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.obs_dim, 3);
        assert_eq!(deserialized.num_actions, 3);
        assert_eq!(deserialized.training_steps, 1000);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let device = default_device();
        let network = ActorCriticConfig::new().init::<TrainingBackend>(&device);
        let agent = PPOAgent::new(network, PPOConfig::default(), device.clone());

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.mpk");

        save_model(&agent, &path).unwrap();
        assert!(path.with_extension("meta.json").exists());

        let (_network, metadata) = load_network::<TrainingBackend>(&path, &device).unwrap();
        assert_eq!(metadata.obs_dim, 3);
        assert_eq!(metadata.num_actions, 3);
    }

    #[test]
    fn test_load_missing_model_fails() {
        let device = default_device();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.mpk");

        let result = load_network::<TrainingBackend>(&path, &device);
        assert!(result.is_err());
    }
}
