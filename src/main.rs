use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use ml_drive::game::GameConfig;
use ml_drive::modes::{self, HumanMode, TrainConfig, TrainMode, VisualizeMode};
use ml_drive::rl::{InferenceBackend, TrainingBackend, default_device};

#[derive(Parser)]
#[command(name = "ml_drive")]
#[command(version, about = "Lane-dodging driving game with ML capabilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play the game with keyboard controls
    Human,

    /// Train a PPO agent
    Train {
        /// Number of episodes to train
        #[arg(long, default_value = "10000")]
        episodes: usize,

        /// Path to save the trained model
        #[arg(long, default_value = "models/driver.mpk")]
        output: PathBuf,

        /// Save a checkpoint every N episodes
        #[arg(long, default_value = "1000")]
        checkpoint_frequency: usize,

        /// Log progress every N episodes
        #[arg(long, default_value = "100")]
        log_frequency: usize,

        /// Seed for reproducible lane randomness
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Watch a trained agent drive
    Visualize {
        /// Path to the trained model
        #[arg(long, default_value = "models/driver.mpk")]
        model: PathBuf,

        /// Record pixel frames as PNGs into this directory
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Export a trained model to the interchange format
    Export {
        /// Path to the trained model
        #[arg(long, default_value = "models/driver.mpk")]
        model: PathBuf,

        /// Output path stem for .weights.json / .manifest.json
        #[arg(long, default_value = "models/policy")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let game_config = GameConfig::default();

    match cli.command {
        Command::Human => {
            let mut human_mode = HumanMode::new(game_config);
            human_mode.run().await?;
        }
        Command::Train {
            episodes,
            output,
            checkpoint_frequency,
            log_frequency,
            seed,
        } => {
            let mut config = TrainConfig::new(episodes, output);
            config.checkpoint_frequency = checkpoint_frequency;
            config.log_frequency = log_frequency;
            config.seed = seed;
            config.game_config = game_config;

            let device = default_device();
            let mut train_mode = TrainMode::<TrainingBackend>::new(config, device);
            train_mode.run()?;
        }
        Command::Visualize { model, record } => {
            let device = default_device();
            let mut visualize_mode =
                VisualizeMode::<InferenceBackend>::new(&model, game_config, device, record)?;
            visualize_mode.run().await?;
        }
        Command::Export { model, output } => {
            modes::export::run_with_paths(&model, &output)?;
        }
    }

    Ok(())
}
