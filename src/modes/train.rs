//! Training mode for the PPO agent
//!
//! Implements the training loop: collects experiences by running episodes in
//! the driving environment, updates the agent with PPO, and periodically saves
//! checkpoints.
//!
//! # Example
//!
//! ```rust,ignore
//! use ml_drive::modes::{TrainMode, TrainConfig};
//! use ml_drive::rl::{default_device, TrainingBackend};
//! use std::path::PathBuf;
//!
//! let config = TrainConfig::new(10000, PathBuf::from("models/driver.mpk"));
//! let device = default_device();
//! let mut train_mode = TrainMode::<TrainingBackend>::new(config, device);
//! train_mode.run()?;
//! ```

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::game::GameConfig;
use crate::metrics::TrainingStats;
use crate::rl::{ActorCriticConfig, CarEnvironment, PPOAgent, PPOConfig, save_model};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train
    pub num_episodes: usize,

    /// Path to save the final trained model
    pub save_path: PathBuf,

    /// Save a checkpoint every N episodes
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Step cap per episode; a well-trained driver would otherwise never crash
    pub max_episode_steps: usize,

    /// Optional seed for reproducible lane randomness
    pub seed: Option<u64>,

    /// Game configuration (geometry, rewards)
    pub game_config: GameConfig,

    /// PPO hyperparameters
    pub ppo_config: PPOConfig,
}

impl TrainConfig {
    pub fn new(num_episodes: usize, save_path: PathBuf) -> Self {
        Self {
            num_episodes,
            save_path,
            checkpoint_frequency: 1000,
            log_frequency: 100,
            max_episode_steps: 10_000,
            seed: None,
            game_config: GameConfig::default(),
            ppo_config: PPOConfig::default(),
        }
    }
}

/// Training mode for the PPO agent
///
/// Runs the training loop, collecting experiences and updating the agent.
/// Periodically logs progress and saves checkpoints.
pub struct TrainMode<B: AutodiffBackend> {
    /// PPO agent being trained
    agent: PPOAgent<B>,

    /// Driving environment for experience collection
    env: CarEnvironment<B::InnerBackend>,

    /// Training statistics tracker
    stats: TrainingStats,

    /// Training configuration
    config: TrainConfig,

    /// Current episode number
    current_episode: usize,

    /// Total steps across all episodes
    total_steps: usize,
}

impl<B: AutodiffBackend> TrainMode<B> {
    pub fn new(config: TrainConfig, device: B::Device) -> Self {
        let network = ActorCriticConfig::new().init::<B>(&device);
        let agent = PPOAgent::new(network, config.ppo_config.clone(), device.clone());

        let env = match config.seed {
            Some(seed) => CarEnvironment::with_seed(config.game_config.clone(), device, seed),
            None => CarEnvironment::new(config.game_config.clone(), device),
        };

        // 100-episode rolling window
        let stats = TrainingStats::new(100);

        Self {
            agent,
            env,
            stats,
            config,
            current_episode: 0,
            total_steps: 0,
        }
    }

    /// Run the training loop
    ///
    /// Trains the agent for the configured number of episodes, logging
    /// progress and saving checkpoints periodically.
    pub fn run(&mut self) -> Result<()> {
        self.log_header();

        for episode in 0..self.config.num_episodes {
            self.current_episode = episode;

            let (episode_reward, episode_steps, episode_score) = self.run_episode()?;

            self.stats
                .record_episode(episode_reward, episode_steps, episode_score);
            self.agent.increment_episode();

            if (episode + 1) % self.config.log_frequency == 0 {
                info!(
                    episode = episode + 1,
                    total = self.config.num_episodes,
                    "{}",
                    self.stats.format_summary()
                );
            }

            if (episode + 1) % self.config.checkpoint_frequency == 0 {
                self.save_checkpoint()?;
            }
        }

        self.save_final_model()?;

        info!(path = ?self.config.save_path, "training complete, final model saved");
        info!("final stats: {}", self.stats.format_summary());

        Ok(())
    }

    /// Run a single training episode
    ///
    /// Returns (total episode reward, steps, final dodge score).
    fn run_episode(&mut self) -> Result<(f32, usize, u32)> {
        let mut obs = self.env.reset();
        let mut episode_reward = 0.0;
        let mut episode_steps = 0;
        let mut done = false;

        while !done && episode_steps < self.config.max_episode_steps {
            let (action, log_prob, value) = self.agent.select_action(obs.clone());

            let (next_obs, reward, terminated, _info) = self.env.step(action);

            self.agent
                .store_transition(obs, action, log_prob, reward, value, terminated);

            episode_reward += reward;
            episode_steps += 1;
            self.total_steps += 1;
            done = terminated;
            obs = next_obs;

            // PPO update if buffer is full
            if self.agent.should_update() {
                let (_, _, last_value) = self.agent.select_action(obs.clone());
                let (policy_loss, value_loss, entropy, _total_loss) =
                    self.agent.update(last_value);

                self.stats.record_update(policy_loss, value_loss, entropy);
            }
        }

        let episode_score = self.env.state().score;

        Ok((episode_reward, episode_steps, episode_score))
    }

    /// Save a checkpoint of the current model
    fn save_checkpoint(&self) -> Result<()> {
        let checkpoint_path = self
            .config
            .save_path
            .parent()
            .unwrap_or(Path::new("."))
            .join(format!("checkpoint_ep{}.mpk", self.current_episode + 1));

        save_model(&self.agent, &checkpoint_path)
            .with_context(|| format!("Failed to save checkpoint to {:?}", checkpoint_path))?;

        info!(path = ?checkpoint_path, "checkpoint saved");

        Ok(())
    }

    /// Save the final trained model
    fn save_final_model(&self) -> Result<()> {
        save_model(&self.agent, &self.config.save_path).with_context(|| {
            format!("Failed to save final model to {:?}", self.config.save_path)
        })?;

        Ok(())
    }

    fn log_header(&self) {
        info!(
            episodes = self.config.num_episodes,
            screen = format!(
                "{}x{}",
                self.config.game_config.screen_width, self.config.game_config.screen_height
            ),
            "starting PPO training"
        );
        info!(
            learning_rate = self.config.ppo_config.learning_rate,
            gamma = self.config.ppo_config.gamma,
            gae_lambda = self.config.ppo_config.gae_lambda,
            clip_epsilon = self.config.ppo_config.clip_epsilon,
            update_frequency = self.config.ppo_config.update_frequency,
            batch_size = self.config.ppo_config.batch_size,
            n_epochs = self.config.ppo_config.n_epochs,
            "PPO hyperparameters"
        );
        info!(
            checkpoint_frequency = self.config.checkpoint_frequency,
            log_frequency = self.config.log_frequency,
            save_path = ?self.config.save_path,
            "output settings"
        );
    }
}
