use super::observation::create_observation;
use crate::game::{Action, GameConfig, GameEngine, GameState};
use burn::tensor::{Tensor, backend::Backend};

/// Episode bookkeeping returned alongside each step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvInfo {
    /// Cars dodged so far this episode
    pub score: u32,
    /// Current difficulty tier
    pub level: u32,
}

/// Driving environment for reinforcement learning
///
/// Wraps the game engine and provides a Burn-compatible RL interface with:
/// - Tensor observations (3-feature vector)
/// - Discrete action space (3 actions: MoveLeft, Stay, MoveRight)
/// - Standard RL interface (reset, step)
pub struct CarEnvironment<B: Backend> {
    engine: GameEngine,
    state: GameState,
    device: B::Device,
}

impl<B: Backend> CarEnvironment<B> {
    /// Create a new environment with entropy-seeded lane randomness
    pub fn new(config: GameConfig, device: B::Device) -> Self {
        let mut engine = GameEngine::new(config);
        let state = engine.reset();
        Self {
            engine,
            state,
            device,
        }
    }

    /// Create a new environment with a fixed seed for reproducible episodes
    pub fn with_seed(config: GameConfig, device: B::Device, seed: u64) -> Self {
        let mut engine = GameEngine::with_seed(config, seed);
        let state = engine.reset();
        Self {
            engine,
            state,
            device,
        }
    }

    /// Reset the environment and return the initial observation
    ///
    /// Returns: Tensor<B, 1> with shape [3]
    pub fn reset(&mut self) -> Tensor<B, 1> {
        self.state = self.engine.reset();
        create_observation(&self.state, self.engine.config(), &self.device)
    }

    /// Step the environment with a discrete action
    ///
    /// Actions:
    /// - 0: Move to the left lane
    /// - 1: Stay in the current lane
    /// - 2: Move to the right lane
    ///
    /// Returns: (observation, reward, done, info)
    /// - observation: Tensor<B, 1> with shape [3]
    /// - reward: f32 (dodge reward, alive reward, or crash penalty)
    /// - done: bool (true if the player crashed)
    /// - info: score and level after the step
    pub fn step(&mut self, action_idx: usize) -> (Tensor<B, 1>, f32, bool, EnvInfo) {
        let action = Action::from_index(action_idx);
        let step_result = self.engine.step(&mut self.state, action);

        let observation = create_observation(&self.state, self.engine.config(), &self.device);
        let info = EnvInfo {
            score: self.state.score,
            level: self.state.level,
        };

        (observation, step_result.reward, step_result.terminated, info)
    }

    /// Get the current observation without stepping
    pub fn get_observation(&self) -> Tensor<B, 1> {
        create_observation(&self.state, self.engine.config(), &self.device)
    }

    /// Get the device used by this environment
    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Get reference to current game state (for testing/debugging)
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable state access, used by tests to stage specific situations
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::observation::OBS_DIM;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    type TestBackend = NdArray<f32>;

    fn env() -> CarEnvironment<TestBackend> {
        CarEnvironment::with_seed(GameConfig::default(), NdArrayDevice::default(), 42)
    }

    #[test]
    fn test_environment_creation() {
        let env = env();

        assert!(env.state().is_alive);
        assert_eq!(env.state().score, 0);
        assert_eq!(env.state().level, 0);
    }

    #[test]
    fn test_reset_returns_valid_observation() {
        let mut env = env();

        let obs = env.reset();
        assert_eq!(obs.shape().dims, [OBS_DIM]);
    }

    #[test]
    fn test_step_with_stay_action() {
        let mut env = env();
        env.reset();

        let y_before = env.state().opponent.center_y;
        let (obs, reward, done, info) = env.step(1); // Stay

        assert_eq!(obs.shape().dims, [OBS_DIM]);
        assert!(reward.is_finite());
        assert!(!done); // opponent spawns off-screen, no crash possible yet
        assert_eq!(info.score, 0);
        assert!(env.state().opponent.center_y > y_before);
    }

    #[test]
    fn test_step_with_all_actions() {
        let mut env = env();

        for action_idx in 0..3 {
            env.reset();
            let (obs, _reward, _done, _info) = env.step(action_idx);
            assert_eq!(obs.shape().dims, [OBS_DIM]);
        }
    }

    #[test]
    fn test_invalid_action_is_stay() {
        let mut env = env();
        env.reset();

        let lane_before = env.state().player.lane;
        env.step(999);
        assert_eq!(env.state().player.lane, lane_before);
    }

    #[test]
    fn test_crash_terminates_episode() {
        let mut env = env();
        env.reset();

        // Park the opponent directly above the player in the same lane
        let player_lane = env.state().player.lane;
        let player_y = env.state().player.center_y;
        let speed = env.state().speed;
        let state = env.state_mut();
        state.opponent.lane = player_lane;
        state.opponent.center_y = player_y - speed;

        let (_obs, reward, done, _info) = env.step(1);

        assert!(done);
        assert!(!env.state().is_alive);
        assert!((reward - (-100.0)).abs() < 1e-5);
    }

    #[test]
    fn test_dodge_updates_info_score() {
        let mut env = env();
        env.reset();

        let player_lane = env.state().player.lane;
        let screen_height = 660.0;
        let state = env.state_mut();
        state.opponent.lane = player_lane.opposite();
        state.opponent.center_y = screen_height + 200.0;

        let (_obs, reward, done, info) = env.step(1);

        assert!(!done);
        assert_eq!(info.score, 1);
        assert!((reward - 15.1).abs() < 1e-5);
    }

    #[test]
    fn test_observation_changes_after_step() {
        let mut env = env();
        env.reset();

        let obs1 = env.get_observation();
        env.step(1);
        let obs2 = env.get_observation();

        // The opponent moved, so the progress feature must change
        let data1 = obs1.to_data();
        let data2 = obs2.to_data();
        assert_ne!(
            data1.as_slice::<f32>().unwrap(),
            data2.as_slice::<f32>().unwrap()
        );
    }

    #[test]
    fn test_multiple_episodes() {
        let mut env = env();

        for _ in 0..3 {
            env.reset();
            let mut steps = 0;
            let mut done = false;

            // Stay forever; crashes whenever the opponent shares the lane
            while !done && steps < 3000 {
                let (_obs, _reward, terminated, _info) = env.step(1);
                done = terminated;
                steps += 1;
            }

            assert!(done || steps == 3000);
        }
    }

    #[test]
    fn test_seeded_environments_match() {
        let device = NdArrayDevice::default();
        let mut a = CarEnvironment::<TestBackend>::with_seed(GameConfig::default(), device.clone(), 9);
        let mut b = CarEnvironment::<TestBackend>::with_seed(GameConfig::default(), device, 9);

        let obs_a = a.reset();
        let obs_b = b.reset();
        assert_eq!(
            obs_a.to_data().as_slice::<f32>().unwrap(),
            obs_b.to_data().as_slice::<f32>().unwrap()
        );

        for i in 0..100 {
            let (_, ra, da, ia) = a.step(i % 3);
            let (_, rb, db, ib) = b.step(i % 3);
            assert_eq!(ra, rb);
            assert_eq!(da, db);
            assert_eq!(ia, ib);
            if da {
                a.reset();
                b.reset();
            }
        }
    }

    #[test]
    fn test_device_access() {
        let env = env();
        let _env_device = env.device();
    }
}
