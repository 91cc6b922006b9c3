//! Reinforcement learning environment for the driving game
//!
//! Provides:
//! - 3-feature vector observations (lanes and opponent progress)
//! - Burn-compatible RL environment interface
//! - Backend-agnostic tensor operations
//! - Actor-Critic MLP for PPO training
//! - PPO algorithm configuration and training
//! - Model persistence and interchange export

pub mod backend;
pub mod buffer;
pub mod config;
pub mod environment;
pub mod export;
pub mod network;
pub mod observation;
pub mod persistence;
pub mod ppo;

pub use backend::{InferenceBackend, TrainingBackend, default_device};
pub use buffer::RolloutBuffer;
pub use config::PPOConfig;
pub use environment::{CarEnvironment, EnvInfo};
pub use export::{ExportManifest, ExportReport, export_model, greedy_action};
pub use network::{ActorCriticConfig, ActorCriticNetwork};
pub use observation::{OBS_DIM, create_observation};
pub use persistence::{ModelMetadata, load_network, save_model};
pub use ppo::PPOAgent;
