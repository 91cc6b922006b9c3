//! Training statistics tracking for PPO
//!
//! Tracks episode-level metrics (rewards, lengths, dodge scores) and
//! training-level metrics (policy loss, value loss, entropy) using rolling
//! windows for smoothed statistics.

use std::collections::VecDeque;

/// Training statistics tracker with rolling averages
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode rewards (rolling window)
    episode_rewards: VecDeque<f32>,

    /// Episode lengths in steps (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Episode scores (cars dodged) (rolling window)
    episode_scores: VecDeque<u32>,

    /// Policy losses (rolling window)
    policy_losses: VecDeque<f32>,

    /// Value losses (rolling window)
    value_losses: VecDeque<f32>,

    /// Entropy values (rolling window)
    entropies: VecDeque<f32>,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total number of environment steps taken
    total_steps: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker keeping the last `window_size` values of each metric
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            policy_losses: VecDeque::with_capacity(window_size),
            value_losses: VecDeque::with_capacity(window_size),
            entropies: VecDeque::with_capacity(window_size),
            total_episodes: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    pub fn record_episode(&mut self, reward: f32, length: usize, score: u32) {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.episode_scores, score, self.window_size);
        self.total_episodes += 1;
        self.total_steps += length;
    }

    /// Record a PPO update
    pub fn record_update(&mut self, policy_loss: f32, value_loss: f32, entropy: f32) {
        Self::push_deque(&mut self.policy_losses, policy_loss, self.window_size);
        Self::push_deque(&mut self.value_losses, value_loss, self.window_size);
        Self::push_deque(&mut self.entropies, entropy, self.window_size);
    }

    pub fn mean_episode_reward(&self) -> f32 {
        Self::mean_f32(&self.episode_rewards)
    }

    pub fn mean_episode_length(&self) -> f32 {
        if self.episode_lengths.is_empty() {
            return 0.0;
        }
        self.episode_lengths.iter().sum::<usize>() as f32 / self.episode_lengths.len() as f32
    }

    pub fn mean_episode_score(&self) -> f32 {
        if self.episode_scores.is_empty() {
            return 0.0;
        }
        self.episode_scores.iter().sum::<u32>() as f32 / self.episode_scores.len() as f32
    }

    pub fn max_episode_score(&self) -> u32 {
        self.episode_scores.iter().copied().max().unwrap_or(0)
    }

    pub fn mean_policy_loss(&self) -> f32 {
        Self::mean_f32(&self.policy_losses)
    }

    pub fn mean_value_loss(&self) -> f32 {
        Self::mean_f32(&self.value_losses)
    }

    pub fn mean_entropy(&self) -> f32 {
        Self::mean_f32(&self.entropies)
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// One-line summary for periodic progress logs
    pub fn format_summary(&self) -> String {
        format!(
            "reward: {:.2} | len: {:.1} | dodges: {:.2} (best {}) | p_loss: {:.4} | v_loss: {:.4} | entropy: {:.4}",
            self.mean_episode_reward(),
            self.mean_episode_length(),
            self.mean_episode_score(),
            self.max_episode_score(),
            self.mean_policy_loss(),
            self.mean_value_loss(),
            self.mean_entropy(),
        )
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window: usize) {
        if deque.len() >= window {
            deque.pop_front();
        }
        deque.push_back(value);
    }

    fn mean_f32(deque: &VecDeque<f32>) -> f32 {
        if deque.is_empty() {
            return 0.0;
        }
        deque.iter().sum::<f32>() / deque.len() as f32
    }
}
