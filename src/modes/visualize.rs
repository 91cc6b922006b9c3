//! Visualization mode for watching trained agents
//!
//! Loads a trained model and displays the agent driving, using the greedy
//! policy (argmax over the actor logits). Playback speed can be changed live,
//! and frames can optionally be recorded as PNG images.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Reset episode
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit
//!
//! # Example
//!
//! ```rust,ignore
//! use ml_drive::modes::VisualizeMode;
//! use ml_drive::game::GameConfig;
//! use ml_drive::rl::{default_device, InferenceBackend};
//! use std::path::Path;
//!
//! let device = default_device();
//! let mut mode = VisualizeMode::<InferenceBackend>::new(
//!     Path::new("models/driver.mpk"),
//!     GameConfig::default(),
//!     device,
//!     None,
//! )?;
//! mode.run().await?;
//! ```

use anyhow::{Context, Result};
use burn::module::AutodiffModule;
use burn::tensor::{Tensor, backend::Backend};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use image::RgbImage;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{Stderr, stderr},
    path::{Path, PathBuf},
    time::Duration,
};
use tokio::time::{Interval, interval};
use tracing::info;

use crate::game::GameConfig;
use crate::render::{CarSprites, FrameComposer, Renderer, ScoreFont};
use crate::rl::{ActorCriticNetwork, CarEnvironment, ModelMetadata, greedy_action, load_network};

/// Visualization speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationSpeed {
    /// Slow: 4 Hz (250ms per step)
    Slow,
    /// Normal: 16 Hz (62ms per step)
    Normal,
    /// Fast: 30 Hz (33ms per step)
    Fast,
    /// Very Fast: 60 Hz (16ms per step) - same as human mode
    VeryFast,
}

impl VisualizationSpeed {
    fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(250),
            Self::Normal => Duration::from_millis(62),
            Self::Fast => Duration::from_millis(33),
            Self::VeryFast => Duration::from_millis(16),
        }
    }
}

/// Visualization mode for watching trained agents
pub struct VisualizeMode<B: Backend> {
    /// Trained network (in inference mode)
    network: ActorCriticNetwork<B>,

    /// Driving environment
    env: CarEnvironment<B>,

    /// Renderer for TUI display
    renderer: Renderer,

    /// Pixel-frame recorder, present when recording is enabled
    recorder: Option<FrameRecorder>,

    /// Model metadata
    metadata: ModelMetadata,

    /// Whether to quit the visualization
    should_quit: bool,

    /// Whether playback is paused
    paused: bool,

    /// Reset requested from the keyboard, applied by the playback loop so it
    /// can refresh its observation
    reset_requested: bool,

    /// Current playback speed
    speed: VisualizationSpeed,

    /// Number of episodes completed
    episode_count: usize,
}

impl<B: Backend> VisualizeMode<B> {
    /// Create a new visualization mode
    ///
    /// Loads a trained model from `model_path`. When `record_dir` is set,
    /// every simulated step is also composed into a pixel frame and written
    /// there as a numbered PNG.
    pub fn new(
        model_path: &Path,
        config: GameConfig,
        device: B::Device,
        record_dir: Option<PathBuf>,
    ) -> Result<Self> {
        use burn::backend::Autodiff;
        let (network, metadata) = load_network::<Autodiff<B>>(model_path, &device)
            .with_context(|| format!("Failed to load model from {:?}", model_path))?;

        // Convert to inference mode
        let network = network.valid();

        info!(
            path = ?model_path,
            episodes_trained = metadata.episodes_trained,
            training_steps = metadata.training_steps,
            version = %metadata.version,
            "loaded model"
        );

        let recorder = match record_dir {
            Some(dir) => Some(FrameRecorder::new(dir, &config)?),
            None => None,
        };

        let renderer = Renderer::new(config.clone());
        let env = CarEnvironment::new(config, device);

        Ok(Self {
            network,
            env,
            renderer,
            recorder,
            metadata,
            should_quit: false,
            paused: false,
            reset_requested: false,
            speed: VisualizationSpeed::Normal,
            episode_count: 0,
        })
    }

    /// Run the visualization loop
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_visualization_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_visualization_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.speed.tick_interval());

        // Render at 30 FPS
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        let mut obs = self.env.reset();
        let mut done = false;

        loop {
            tokio::select! {
                // Handle keyboard input
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer)?;
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    if let Some(fresh) = self.take_pending_reset() {
                        obs = fresh;
                        done = false;
                    }
                    if !self.paused {
                        if done {
                            // Auto-restart
                            obs = self.env.reset();
                            done = false;
                            self.episode_count += 1;
                        } else {
                            obs = self.step_agent(obs)?;
                            done = !self.env.state().is_alive;
                        }
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    terminal.draw(|frame| {
                        self.render_frame(frame);
                    }).context("Failed to draw frame")?;
                }

                // Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Step the agent forward one action using the greedy policy
    fn step_agent(&mut self, obs: Tensor<B, 1>) -> Result<Tensor<B, 1>> {
        let action = greedy_action(&self.network, obs);
        let (next_obs, _reward, _done, _info) = self.env.step(action.index());

        if let Some(recorder) = &mut self.recorder {
            recorder.capture(self.env.state())?;
        }

        Ok(next_obs)
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.should_quit = true;
                }
                KeyCode::Char(' ') => {
                    self.paused = !self.paused;
                }
                KeyCode::Char('r') => {
                    // Deferred to the loop, which also has to drop its
                    // now-stale observation
                    self.reset_requested = true;
                }
                KeyCode::Char('1') => {
                    self.change_speed(VisualizationSpeed::Slow, tick_timer);
                }
                KeyCode::Char('2') => {
                    self.change_speed(VisualizationSpeed::Normal, tick_timer);
                }
                KeyCode::Char('3') => {
                    self.change_speed(VisualizationSpeed::Fast, tick_timer);
                }
                KeyCode::Char('4') => {
                    self.change_speed(VisualizationSpeed::VeryFast, tick_timer);
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Consume a keyboard-requested reset, returning the fresh observation
    fn take_pending_reset(&mut self) -> Option<Tensor<B, 1>> {
        if !self.reset_requested {
            return None;
        }
        self.reset_requested = false;
        self.episode_count += 1;
        Some(self.env.reset())
    }

    fn change_speed(&mut self, new_speed: VisualizationSpeed, tick_timer: &mut Interval) {
        self.speed = new_speed;
        tick_timer.reset_after(self.speed.tick_interval());
    }

    fn render_frame(&self, frame: &mut ratatui::Frame) {
        // Playback has no human-session stats to show
        use crate::metrics::GameMetrics;
        let dummy_metrics = GameMetrics::new();

        self.renderer
            .render(frame, self.env.state(), &dummy_metrics);
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Writes composed pixel frames as numbered PNGs
struct FrameRecorder {
    dir: PathBuf,
    composer: FrameComposer,
    frame_index: usize,
}

impl FrameRecorder {
    fn new(dir: PathBuf, config: &GameConfig) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create recording directory {:?}", dir))?;

        // Use shipped car sprites when present, silhouettes otherwise
        let sprites = CarSprites::load(Path::new("assets/cars"), config)
            .unwrap_or_else(|_| CarSprites::flat(config));
        let font = ScoreFont::load_or_builtin(Path::new("assets/score_font.png"));
        let composer = FrameComposer::new(config.clone(), sprites, font);

        Ok(Self {
            dir,
            composer,
            frame_index: 0,
        })
    }

    fn capture(&mut self, state: &crate::game::GameState) -> Result<()> {
        let frame = self.composer.compose(state);
        let img = RgbImage::from_raw(
            frame.width() as u32,
            frame.height() as u32,
            frame.as_bytes().to_vec(),
        )
        .context("Frame buffer size mismatch")?;

        let path = self.dir.join(format!("frame_{:05}.png", self.frame_index));
        img.save(&path)
            .with_context(|| format!("Failed to write frame to {:?}", path))?;
        self.frame_index += 1;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{InferenceBackend, TrainingBackend, default_device};
    use crate::rl::{ActorCriticConfig, PPOAgent, PPOConfig, save_model};
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    #[test]
    fn test_visualization_speed() {
        assert_eq!(
            VisualizationSpeed::Slow.tick_interval(),
            Duration::from_millis(250)
        );
        assert_eq!(
            VisualizationSpeed::VeryFast.tick_interval(),
            Duration::from_millis(16)
        );
    }

    fn save_test_model(path: &Path) {
        let device = default_device();
        let network = ActorCriticConfig::new().init::<TrainingBackend>(&device);
        let agent = PPOAgent::new(network, PPOConfig::default(), device);
        save_model(&agent, path).unwrap();
    }

    #[test]
    fn test_visualize_mode_creation() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("test_model.mpk");
        save_test_model(&model_path);

        let device = default_device();
        let mode = VisualizeMode::<InferenceBackend>::new(
            &model_path,
            GameConfig::default(),
            device,
            None,
        );

        assert!(mode.is_ok());
        let mode = mode.unwrap();
        assert_eq!(mode.episode_count, 0);
        assert!(!mode.paused);
        assert_eq!(mode.speed, VisualizationSpeed::Normal);
    }

    #[test]
    fn test_recording_writes_frames() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("test_model.mpk");
        save_test_model(&model_path);

        let record_dir = temp_dir.path().join("frames");
        let device = default_device();
        let mut mode = VisualizeMode::<InferenceBackend>::new(
            &model_path,
            GameConfig::default(),
            device,
            Some(record_dir.clone()),
        )
        .unwrap();

        let obs = mode.env.reset();
        mode.step_agent(obs).unwrap();
        mode.step_agent(mode.env.get_observation()).unwrap();

        assert!(record_dir.join("frame_00000.png").exists());
        assert!(record_dir.join("frame_00001.png").exists());
    }

    #[tokio::test]
    async fn test_reset_key_refreshes_loop_observation() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("test_model.mpk");
        save_test_model(&model_path);

        let device = default_device();
        let mut mode = VisualizeMode::<InferenceBackend>::new(
            &model_path,
            GameConfig::default(),
            device,
            None,
        )
        .unwrap();

        // Advance the episode so a reset visibly changes the state
        let obs = mode.env.reset();
        mode.step_agent(obs).unwrap();
        let advanced_y = mode.env.state().opponent.center_y;
        assert!(advanced_y > GameConfig::default().opponent_spawn_y());

        let mut tick_timer = interval(Duration::from_millis(10));
        let key = Event::Key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::empty()));
        mode.handle_event(key, &mut tick_timer).unwrap();

        // The key handler only flags the reset; the environment is untouched
        // until the loop picks it up and replaces its observation
        assert_eq!(mode.env.state().opponent.center_y, advanced_y);

        let fresh = mode.take_pending_reset().expect("reset should be pending");
        assert_eq!(
            mode.env.state().opponent.center_y,
            GameConfig::default().opponent_spawn_y()
        );
        assert_eq!(
            fresh.to_data().as_slice::<f32>().unwrap(),
            mode.env.get_observation().to_data().as_slice::<f32>().unwrap()
        );
        assert_eq!(mode.episode_count, 1);
        assert!(mode.take_pending_reset().is_none());
    }

    #[test]
    fn test_missing_model_fails() {
        let device = default_device();
        let result = VisualizeMode::<InferenceBackend>::new(
            Path::new("/nonexistent/model.mpk"),
            GameConfig::default(),
            device,
            None,
        );
        assert!(result.is_err());
    }
}
