//! Experience buffer for PPO trajectory collection
//!
//! Stores transitions gathered during environment interaction and computes
//! advantages with Generalized Advantage Estimation (GAE).

use burn::tensor::{Int, Tensor, TensorData, backend::Backend};
use rand::seq::SliceRandom;

use crate::rl::observation::OBS_DIM;

/// Experience buffer for storing rollout data during PPO training
///
/// Transitions (observations, actions, rewards, log-probs, values, dones) are
/// pushed during environment interaction. Once full, the buffer computes
/// advantages with GAE and serves shuffled minibatches for PPO updates.
///
/// # Example
///
/// ```rust
/// use ml_drive::rl::RolloutBuffer;
/// use burn::backend::ndarray::{NdArray, NdArrayDevice};
/// use burn::tensor::Tensor;
///
/// type Backend = NdArray<f32>;
///
/// let device = NdArrayDevice::default();
/// let mut buffer = RolloutBuffer::<Backend>::new(128, device.clone());
///
/// let obs = Tensor::zeros([3], &device);
/// buffer.push(obs, 0, -1.0, 0.1, 0.5, false);
///
/// assert_eq!(buffer.len(), 1);
/// assert!(!buffer.is_full());
/// ```
pub struct RolloutBuffer<B: Backend> {
    /// Stored observations, each a [3] tensor
    observations: Vec<Tensor<B, 1>>,

    /// Action indices taken
    actions: Vec<usize>,

    /// Log probabilities of actions
    log_probs: Vec<f32>,

    /// Rewards received
    rewards: Vec<f32>,

    /// Value estimates
    values: Vec<f32>,

    /// Episode termination flags
    dones: Vec<bool>,

    /// Current position in buffer
    pos: usize,

    /// Maximum buffer capacity
    capacity: usize,

    /// Device for tensor operations
    device: B::Device,

    /// Computed advantages (populated after GAE)
    advantages: Option<Vec<f32>>,

    /// Computed returns (populated after GAE)
    returns: Option<Vec<f32>>,
}

impl<B: Backend> RolloutBuffer<B> {
    /// Create a new rollout buffer with the given capacity
    pub fn new(capacity: usize, device: B::Device) -> Self {
        Self {
            observations: Vec::with_capacity(capacity),
            actions: Vec::with_capacity(capacity),
            log_probs: Vec::with_capacity(capacity),
            rewards: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            dones: Vec::with_capacity(capacity),
            pos: 0,
            capacity,
            device,
            advantages: None,
            returns: None,
        }
    }

    /// Add a transition to the buffer
    ///
    /// Pushes past capacity are silently dropped.
    pub fn push(
        &mut self,
        observation: Tensor<B, 1>,
        action: usize,
        log_prob: f32,
        reward: f32,
        value: f32,
        done: bool,
    ) {
        if self.pos < self.capacity {
            self.observations.push(observation);
            self.actions.push(action);
            self.log_probs.push(log_prob);
            self.rewards.push(reward);
            self.values.push(value);
            self.dones.push(done);
            self.pos += 1;
        }
    }

    pub fn is_full(&self) -> bool {
        self.pos >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// Compute advantages and returns using Generalized Advantage Estimation
    ///
    /// ```text
    /// δ_t = r_t + γ * V(s_{t+1}) * (1 - done_t) - V(s_t)
    /// A_t = δ_t + γλ * A_{t+1} * (1 - done_t)
    /// R_t = A_t + V(s_t)
    /// ```
    ///
    /// `done_t` masks the transition's own terminal flag, so a terminal step
    /// never bootstraps the next episode's value and the step after a reset
    /// starts a fresh advantage chain. `last_value` bootstraps the state
    /// following the final stored transition when that transition is
    /// non-terminal.
    ///
    /// Advantages are normalized to zero mean and unit variance for training
    /// stability.
    pub fn compute_advantages(&mut self, gamma: f32, gae_lambda: f32, last_value: f32) {
        let n = self.len();
        if n == 0 {
            return;
        }

        let mut advantages = vec![0.0; n];
        let mut returns = vec![0.0; n];

        let mut next_value = last_value;
        let mut next_advantage = 0.0;

        for t in (0..n).rev() {
            // Mask: 0.0 when this transition ended its episode
            let mask = if self.dones[t] { 0.0 } else { 1.0 };

            let delta = self.rewards[t] + gamma * next_value * mask - self.values[t];
            advantages[t] = delta + gamma * gae_lambda * next_advantage * mask;
            returns[t] = advantages[t] + self.values[t];

            next_value = self.values[t];
            next_advantage = advantages[t];
        }

        // Normalize advantages: (A - mean(A)) / (std(A) + 1e-8)
        let mean = advantages.iter().sum::<f32>() / n as f32;
        let variance = advantages.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n as f32;
        let std = variance.sqrt();

        for a in &mut advantages {
            *a = (*a - mean) / (std + 1e-8);
        }

        self.advantages = Some(advantages);
        self.returns = Some(returns);
    }

    /// Get a batch of data for training
    ///
    /// # Returns
    ///
    /// A tuple of `TensorData`:
    /// - observations [batch, 3]
    /// - actions [batch] (Int type)
    /// - old_log_probs [batch]
    /// - advantages [batch]
    /// - returns [batch]
    ///
    /// # Panics
    ///
    /// Panics if advantages have not been computed yet.
    pub fn get_batch(
        &self,
        indices: &[usize],
    ) -> (TensorData, TensorData, TensorData, TensorData, TensorData) {
        let advantages = self
            .advantages
            .as_ref()
            .expect("Advantages must be computed before getting batches");
        let returns = self
            .returns
            .as_ref()
            .expect("Returns must be computed before getting batches");

        // Observations are tiny vectors, so the batch is assembled on the
        // host and handed back as one contiguous [batch, 3] block
        let mut obs_values: Vec<f32> = Vec::with_capacity(indices.len() * OBS_DIM);
        for &i in indices {
            let data = self.observations[i].to_data();
            obs_values.extend_from_slice(
                data.as_slice::<f32>()
                    .expect("observation data should be f32"),
            );
        }
        let obs_data = TensorData::new(obs_values, [indices.len(), OBS_DIM]);

        let actions_data: Vec<i32> = indices.iter().map(|&i| self.actions[i] as i32).collect();
        let actions_tensor = Tensor::<B, 1, Int>::from_ints(actions_data.as_slice(), &self.device);

        let log_probs_data: Vec<f32> = indices.iter().map(|&i| self.log_probs[i]).collect();
        let log_probs_tensor: Tensor<B, 1> =
            Tensor::from_floats(log_probs_data.as_slice(), &self.device);

        let advantages_data: Vec<f32> = indices.iter().map(|&i| advantages[i]).collect();
        let advantages_tensor: Tensor<B, 1> =
            Tensor::from_floats(advantages_data.as_slice(), &self.device);

        let returns_data: Vec<f32> = indices.iter().map(|&i| returns[i]).collect();
        let returns_tensor: Tensor<B, 1> =
            Tensor::from_floats(returns_data.as_slice(), &self.device);

        (
            obs_data,
            actions_tensor.into_data(),
            log_probs_tensor.into_data(),
            advantages_tensor.into_data(),
            returns_tensor.into_data(),
        )
    }

    /// Sample shuffled batch indices for minibatch training
    ///
    /// The last batch may be smaller if the buffer size is not evenly
    /// divisible by the batch size.
    pub fn sample_indices(&self, batch_size: usize) -> Vec<Vec<usize>> {
        let n = self.len();
        let mut indices: Vec<usize> = (0..n).collect();

        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);

        indices.chunks(batch_size).map(|c| c.to_vec()).collect()
    }

    /// Clear the buffer for the next rollout
    pub fn clear(&mut self) {
        self.observations.clear();
        self.actions.clear();
        self.log_probs.clear();
        self.rewards.clear();
        self.values.clear();
        self.dones.clear();
        self.pos = 0;
        self.advantages = None;
        self.returns = None;
    }
}
