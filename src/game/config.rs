use serde::{Deserialize, Serialize};

/// Configuration for the driving game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the playfield in pixels
    pub screen_width: f32,
    /// Height of the playfield in pixels
    pub screen_height: f32,
    /// Player car size (width, height) in pixels
    pub player_size: (f32, f32),
    /// Opponent car size (width, height) in pixels
    pub opponent_size: (f32, f32),
    /// Opponent speed at the start of an episode (pixels per step)
    pub initial_speed: f32,
    /// Speed added on each level-up
    pub speed_increment: f32,
    /// Score interval at which the level (and speed) increases
    pub level_interval: u32,

    // Rewards (for RL)
    /// Reward when the opponent passes fully below the playfield
    pub dodge_reward: f32,
    /// Reward for each surviving step
    pub alive_reward: f32,
    /// Penalty added when a lane change is applied (default 0, inert)
    pub lane_change_penalty: f32,
    /// Penalty for colliding with the opponent
    pub crash_penalty: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 660.0,
            player_size: (100.0, 200.0),
            opponent_size: (100.0, 200.0),
            initial_speed: 3.0,
            speed_increment: 0.5,
            level_interval: 5,
            dodge_reward: 15.0,
            alive_reward: 0.1,
            lane_change_penalty: 0.0,
            crash_penalty: -100.0,
        }
    }
}

impl GameConfig {
    /// Width of the road surface
    pub fn road_width(&self) -> f32 {
        (self.screen_width / 1.6).floor()
    }

    /// Width of a painted road marking
    pub fn roadmark_width(&self) -> f32 {
        (self.screen_width / 80.0).floor()
    }

    /// Center x of the left lane
    pub fn left_lane(&self) -> f32 {
        self.screen_width / 2.0 - self.road_width() / 4.0
    }

    /// Center x of the right lane
    pub fn right_lane(&self) -> f32 {
        self.screen_width / 2.0 + self.road_width() / 4.0
    }

    /// Vertical center of the player car (fixed near the bottom)
    pub fn player_y(&self) -> f32 {
        self.screen_height * 0.85
    }

    /// Spawn center y for the opponent, just above the visible top edge
    pub fn opponent_spawn_y(&self) -> f32 {
        -self.opponent_size.1
    }

    /// Length of one scrolling lane-dash segment
    pub fn dash_segment(&self) -> f32 {
        self.screen_height / 10.0
    }
}
