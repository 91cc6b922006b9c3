//! Actor-Critic neural network for the driving agent
//!
//! A small multilayer perceptron with two heads:
//! - **Actor head**: Outputs action logits for the policy (left / stay / right)
//! - **Critic head**: Outputs a value estimate for the state
//!
//! # Architecture
//!
//! ```text
//! Input: [batch, 3]
//!   ↓ Linear(3 → 64) + ReLU
//!   ↓ Linear(64 → 64) + ReLU
//!   ↓ Split
//!   ├─→ Actor: Linear(64 → 3) → Action logits
//!   └─→ Critic: Linear(64 → 1) → Value estimate
//! ```
//!
//! The three input features are the player lane bit, the opponent lane bit,
//! and the opponent's vertical progress down the screen. A compact MLP is
//! plenty for this observation; there is no spatial structure to convolve
//! over.
//!
//! # Example
//!
//! ```rust
//! use ml_drive::rl::{ActorCriticConfig, ActorCriticNetwork};
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let config = ActorCriticConfig::new();
//! let network = config.init::<Backend>(&device);
//!
//! let observation = Tensor::zeros([8, 3], &device);
//! let (action_logits, value) = network.forward(observation);
//!
//! assert_eq!(action_logits.dims(), [8, 3]); // [batch, num_actions]
//! assert_eq!(value.dims(), [8, 1]);         // [batch, 1]
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{Tensor, activation::relu, backend::Backend},
};

use crate::game::Action;
use crate::rl::observation::OBS_DIM;

/// Configuration for the Actor-Critic network
#[derive(Debug, Clone)]
pub struct ActorCriticConfig {
    /// Number of input features (default: 3)
    pub obs_dim: usize,

    /// Number of actions the policy can output (default: 3 for left/stay/right)
    pub num_actions: usize,

    /// Width of the two hidden layers (default: 64)
    pub hidden_dim: usize,
}

impl ActorCriticConfig {
    /// Create a new configuration with default hyperparameters
    pub fn new() -> Self {
        Self {
            obs_dim: OBS_DIM,
            num_actions: Action::COUNT,
            hidden_dim: 64,
        }
    }

    /// Initialize the Actor-Critic network from this configuration
    pub fn init<B: Backend>(&self, device: &B::Device) -> ActorCriticNetwork<B> {
        ActorCriticNetwork {
            fc1: LinearConfig::new(self.obs_dim, self.hidden_dim).init(device),
            fc2: LinearConfig::new(self.hidden_dim, self.hidden_dim).init(device),
            actor_head: LinearConfig::new(self.hidden_dim, self.num_actions).init(device),
            critic_head: LinearConfig::new(self.hidden_dim, 1).init(device),
        }
    }
}

impl Default for ActorCriticConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Actor-Critic multilayer perceptron
///
/// Processes feature-vector observations through a shared trunk and outputs
/// both action logits (policy) and value estimates (critic).
///
/// Generic over the Burn backend, so the same definition runs on plain
/// NdArray for inference and `Autodiff<NdArray>` for training.
#[derive(Module, Debug)]
pub struct ActorCriticNetwork<B: Backend> {
    /// First shared layer: obs_dim → hidden
    fc1: Linear<B>,
    /// Second shared layer: hidden → hidden
    fc2: Linear<B>,
    /// Actor head: outputs action logits
    actor_head: Linear<B>,
    /// Critic head: outputs value estimate
    critic_head: Linear<B>,
}

impl<B: Backend> ActorCriticNetwork<B> {
    /// Forward pass through the network
    ///
    /// # Arguments
    ///
    /// * `observation` - Tensor with shape `[batch, obs_dim]`
    ///
    /// # Returns
    ///
    /// A tuple of:
    /// - `action_logits`: Tensor with shape `[batch, num_actions]`
    /// - `value`: Tensor with shape `[batch, 1]`
    pub fn forward(&self, observation: Tensor<B, 2>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let x = relu(self.fc1.forward(observation));
        let x = relu(self.fc2.forward(x));

        let action_logits = self.actor_head.forward(x.clone());
        let value = self.critic_head.forward(x);

        (action_logits, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::Autodiff;
    use burn::backend::ndarray::{NdArray, NdArrayDevice};
    use burn::tensor::{Distribution, TensorData};

    type TestBackend = NdArray<f32>;
    type TestAutodiffBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_forward_pass_shapes() {
        let device = NdArrayDevice::default();
        let config = ActorCriticConfig::new();
        let network = config.init::<TestBackend>(&device);

        let observation = Tensor::zeros([2, 3], &device);
        let (action_logits, value) = network.forward(observation);

        assert_eq!(action_logits.dims(), [2, 3]);
        assert_eq!(value.dims(), [2, 1]);
    }

    #[test]
    fn test_different_batch_sizes() {
        let device = NdArrayDevice::default();
        let config = ActorCriticConfig::new();
        let network = config.init::<TestBackend>(&device);

        for batch_size in [1, 4, 16, 64] {
            let observation = Tensor::zeros([batch_size, 3], &device);
            let (action_logits, value) = network.forward(observation);

            assert_eq!(action_logits.dims(), [batch_size, 3]);
            assert_eq!(value.dims(), [batch_size, 1]);
        }
    }

    #[test]
    fn test_gradient_flow() {
        let device = NdArrayDevice::default();
        let config = ActorCriticConfig::new();
        let network = config.init::<TestAutodiffBackend>(&device);

        let observation = Tensor::ones([1, 3], &device).require_grad();

        let (action_logits, value) = network.forward(observation.clone());
        let loss = action_logits.sum() + value.sum();
        let gradients = loss.backward();

        let obs_grad = observation.grad(&gradients);
        assert!(
            obs_grad.is_some(),
            "Gradients should flow back to input observation"
        );

        let grad_tensor = obs_grad.unwrap();
        let grad_data: TensorData = grad_tensor.into_data();
        let grad_sum: f32 = grad_data.as_slice::<f32>().unwrap().iter().sum();
        assert!(
            grad_sum.abs() > 1e-6,
            "Gradients should be non-zero, got sum: {}",
            grad_sum
        );
    }

    #[test]
    fn test_batch_consistency() {
        let device = NdArrayDevice::default();
        let config = ActorCriticConfig::new();
        let network = config.init::<TestBackend>(&device);

        let single_obs = Tensor::<TestBackend, 2>::from_floats([[1.0, 0.0, 0.42]], &device);
        let (logits_single, value_single) = network.forward(single_obs.clone());

        let obs_batch = Tensor::cat(vec![single_obs.clone(), single_obs.clone(), single_obs], 0);
        let (logits_batch, value_batch) = network.forward(obs_batch);

        let single_vals: TensorData = logits_single.into_data();
        let batch_vals: TensorData = logits_batch.into_data();
        let single_slice = single_vals.as_slice::<f32>().unwrap();
        let batch_slice = batch_vals.as_slice::<f32>().unwrap();

        for j in 0..3 {
            let diff = (single_slice[j] - batch_slice[j]).abs();
            assert!(diff < 1e-5, "logit {} mismatch, diff: {}", j, diff);
        }

        let value_single_data: TensorData = value_single.into_data();
        let value_batch_data: TensorData = value_batch.into_data();
        let diff = (value_single_data.as_slice::<f32>().unwrap()[0]
            - value_batch_data.as_slice::<f32>().unwrap()[0])
            .abs();
        assert!(diff < 1e-5, "value mismatch, diff: {}", diff);
    }

    #[test]
    fn test_output_finite() {
        let device = NdArrayDevice::default();
        let config = ActorCriticConfig::new();
        let network = config.init::<TestBackend>(&device);

        // Observations sampled from the full reachable range
        let observation = Tensor::random([32, 3], Distribution::Uniform(-0.5, 1.5), &device);
        let (action_logits, value) = network.forward(observation);

        let logits_data: TensorData = action_logits.into_data();
        for &val in logits_data.as_slice::<f32>().unwrap() {
            assert!(val.is_finite(), "Logits should be finite, got: {}", val);
        }

        let value_data: TensorData = value.into_data();
        for &val in value_data.as_slice::<f32>().unwrap() {
            assert!(val.is_finite(), "Values should be finite, got: {}", val);
        }
    }

    #[test]
    fn test_with_real_observations() {
        use crate::game::GameConfig;
        use crate::rl::CarEnvironment;

        let device = NdArrayDevice::default();

        let mut env =
            CarEnvironment::<TestBackend>::with_seed(GameConfig::default(), device.clone(), 7);
        let obs = env.reset();

        let network = ActorCriticConfig::new().init::<TestBackend>(&device);

        let obs_batch = obs.unsqueeze_dim(0); // [1, 3]
        let (action_logits, value) = network.forward(obs_batch);

        assert_eq!(action_logits.dims(), [1, 3]);
        assert_eq!(value.dims(), [1, 1]);

        let logits_data: TensorData = action_logits.into_data();
        for &val in logits_data.as_slice::<f32>().unwrap() {
            assert!(val.is_finite());
        }
    }
}
