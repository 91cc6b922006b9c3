//! PPO (Proximal Policy Optimization) agent implementation
//!
//! Implements the PPO algorithm for training the driving agent: action
//! selection, clipped-objective loss computation, and parameter updates.

use super::buffer::RolloutBuffer;
use super::config::PPOConfig;
use super::network::ActorCriticNetwork;
use burn::{
    module::AutodiffModule,
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{
        ElementConversion, Int, Tensor,
        activation::{log_softmax, softmax},
        backend::AutodiffBackend,
    },
};
use rand::Rng;

/// PPO agent for reinforcement learning
///
/// Combines an actor-critic network with the PPO training algorithm.
/// Manages experience collection, advantage estimation, and policy
/// optimization.
///
/// # Example
///
/// ```rust,ignore
/// use ml_drive::rl::{PPOAgent, PPOConfig, ActorCriticConfig};
/// use burn::backend::{Autodiff, ndarray::{NdArray, NdArrayDevice}};
///
/// type Backend = Autodiff<NdArray<f32>>;
///
/// let device = NdArrayDevice::default();
/// let network = ActorCriticConfig::new().init::<Backend>(&device);
/// let agent = PPOAgent::new(network, PPOConfig::default(), device);
/// ```
pub struct PPOAgent<B: AutodiffBackend> {
    /// Actor-Critic neural network
    network: ActorCriticNetwork<B>,

    /// Adam optimizer for network parameters
    optim: OptimizerAdaptor<Adam, ActorCriticNetwork<B>, B>,

    /// PPO hyperparameters
    config: PPOConfig,

    /// Experience buffer for rollout data
    buffer: RolloutBuffer<B::InnerBackend>,

    /// Training step counter
    training_step: usize,

    /// Episode counter
    episodes_trained: usize,

    /// Device for tensor operations
    device: B::Device,
}

impl<B: AutodiffBackend> PPOAgent<B> {
    /// Create a new PPO agent
    ///
    /// # Panics
    ///
    /// Panics if the PPO configuration fails validation.
    pub fn new(network: ActorCriticNetwork<B>, config: PPOConfig, device: B::Device) -> Self {
        config.validate().expect("Invalid PPO configuration");

        let optim = AdamConfig::new().init();
        let buffer = RolloutBuffer::new(config.update_frequency, device.clone());

        Self {
            network,
            optim,
            config,
            buffer,
            training_step: 0,
            episodes_trained: 0,
            device,
        }
    }

    /// Select an action from an observation during rollout
    ///
    /// Samples from the policy distribution and returns the action index, its
    /// log probability, and the value estimate V(s).
    pub fn select_action(&self, observation: Tensor<B::InnerBackend, 1>) -> (usize, f32, f32) {
        let device = observation.device();

        let obs_batch = observation.unsqueeze_dim(0); // [1, 3]

        // Forward pass in valid (no-grad) mode
        let network = self.network.clone().valid();
        let (action_logits, value) = network.forward(obs_batch);

        // Sample action from categorical distribution
        let action_probs = softmax(action_logits.clone(), 1); // [1, num_actions]
        let action_idx = sample_categorical(&action_probs);

        // Log probability of the selected action
        let log_probs = log_softmax(action_logits, 1);
        let action_tensor =
            Tensor::<B::InnerBackend, 1, Int>::from_ints([action_idx as i32], &device);
        let log_prob = log_probs
            .gather(1, action_tensor.unsqueeze_dim(1))
            .squeeze::<1>(1)
            .into_scalar()
            .elem::<f32>();

        let value_scalar = value.squeeze::<1>(1).into_scalar().elem::<f32>();

        (action_idx, log_prob, value_scalar)
    }

    /// Store a transition in the buffer
    pub fn store_transition(
        &mut self,
        observation: Tensor<B::InnerBackend, 1>,
        action: usize,
        log_prob: f32,
        reward: f32,
        value: f32,
        done: bool,
    ) {
        self.buffer
            .push(observation, action, log_prob, reward, value, done);
    }

    /// Check if the buffer is full and ready for update
    pub fn should_update(&self) -> bool {
        self.buffer.is_full()
    }

    /// Perform a PPO update
    ///
    /// Computes advantages using GAE, then runs multiple epochs of minibatch
    /// updates with the clipped PPO objective.
    ///
    /// # Returns
    ///
    /// A tuple of average (policy_loss, value_loss, entropy, total_loss).
    ///
    /// `last_value` bootstraps the state after the final stored transition;
    /// it is ignored by GAE when that transition was terminal.
    pub fn update(&mut self, last_value: f32) -> (f32, f32, f32, f32) {
        self.buffer
            .compute_advantages(self.config.gamma, self.config.gae_lambda, last_value);

        let mut total_policy_loss = 0.0;
        let mut total_value_loss = 0.0;
        let mut total_entropy = 0.0;
        let mut n_updates = 0;

        for _epoch in 0..self.config.n_epochs {
            let batch_indices = self.buffer.sample_indices(self.config.batch_size);

            for indices in batch_indices {
                let (obs_data, actions_data, old_log_probs_data, advantages_data, returns_data) =
                    self.buffer.get_batch(&indices);

                // Construct tensors directly on the autodiff backend
                let obs: Tensor<B, 2> = Tensor::from_data(obs_data, &self.device);
                let actions: Tensor<B, 1, Int> = Tensor::from_data(actions_data, &self.device);
                let old_log_probs: Tensor<B, 1> =
                    Tensor::from_data(old_log_probs_data, &self.device);
                let advantages: Tensor<B, 1> = Tensor::from_data(advantages_data, &self.device);
                let returns: Tensor<B, 1> = Tensor::from_data(returns_data, &self.device);

                let (action_logits, values) = self.network.forward(obs);

                let (policy_loss, entropy) =
                    self.compute_policy_loss(&action_logits, &actions, &old_log_probs, &advantages);
                let value_loss = self.compute_value_loss(&values, &returns);

                // Total loss: L_policy - c_entropy * H + c_value * L_value
                let total_loss = policy_loss.clone() - entropy.clone() * self.config.entropy_coef
                    + value_loss.clone() * self.config.value_coef;

                let grads = total_loss.backward();
                let grads = GradientsParams::from_grads(grads, &self.network);
                self.network =
                    self.optim
                        .step(self.config.learning_rate, self.network.clone(), grads);

                total_policy_loss += policy_loss.into_scalar().elem::<f32>();
                total_value_loss += value_loss.into_scalar().elem::<f32>();
                total_entropy += entropy.into_scalar().elem::<f32>();
                n_updates += 1;
            }
        }

        self.buffer.clear();
        self.training_step += 1;

        let n = n_updates as f32;
        (
            total_policy_loss / n,
            total_value_loss / n,
            total_entropy / n,
            (total_policy_loss + total_value_loss) / n,
        )
    }

    /// Compute the clipped PPO policy loss
    ///
    /// Implements the clipped surrogate objective:
    /// L = -E[min(r * A, clip(r, 1-ε, 1+ε) * A)]
    /// where r = π_new / π_old
    fn compute_policy_loss(
        &self,
        action_logits: &Tensor<B, 2>,
        actions: &Tensor<B, 1, Int>,
        old_log_probs: &Tensor<B, 1>,
        advantages: &Tensor<B, 1>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let log_probs = log_softmax(action_logits.clone(), 1);
        let new_log_probs = log_probs
            .gather(1, actions.clone().unsqueeze_dim(1))
            .squeeze(1);

        // Probability ratio: r = exp(log π_new - log π_old)
        let ratio = (new_log_probs.clone() - old_log_probs.clone()).exp();

        let surr1 = ratio.clone() * advantages.clone();
        let surr2 = ratio.clamp(
            1.0 - self.config.clip_epsilon,
            1.0 + self.config.clip_epsilon,
        ) * advantages.clone();

        let policy_loss = surr1.min_pair(surr2).neg().mean();

        // Entropy: -E[Σ π(a|s) * log π(a|s)]
        let probs = softmax(action_logits.clone(), 1);
        let log_probs_all = log_softmax(action_logits.clone(), 1);
        let entropy = (probs * log_probs_all).sum_dim(1).neg().mean();

        (policy_loss, entropy)
    }

    /// Compute the value function loss (MSE)
    fn compute_value_loss(&self, values: &Tensor<B, 2>, returns: &Tensor<B, 1>) -> Tensor<B, 1> {
        let values = values.clone().squeeze(1); // [batch]
        let diff = values - returns.clone();
        (diff.clone() * diff).mean()
    }

    pub fn training_step(&self) -> usize {
        self.training_step
    }

    pub fn network(&self) -> &ActorCriticNetwork<B> {
        &self.network
    }

    pub fn config(&self) -> &PPOConfig {
        &self.config
    }

    pub fn episodes_trained(&self) -> usize {
        self.episodes_trained
    }

    pub fn increment_episode(&mut self) {
        self.episodes_trained += 1;
    }
}

/// Sample an action index from a categorical distribution [1, num_actions]
fn sample_categorical<B: burn::tensor::backend::Backend>(probs: &Tensor<B, 2>) -> usize {
    let probs_data = probs.to_data();
    let probs_slice: Vec<f32> = probs_data.to_vec().expect("Failed to convert probs to vec");

    let mut rng = rand::thread_rng();
    let random_val: f32 = rng.sample(rand::distributions::Standard);
    let mut cumsum = 0.0;

    for (idx, &prob) in probs_slice.iter().enumerate() {
        cumsum += prob;
        if random_val < cumsum {
            return idx;
        }
    }

    // Fallback to last action
    probs_slice.len() - 1
}
