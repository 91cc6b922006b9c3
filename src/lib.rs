//! ML Drive - A lane-dodging driving game with reinforcement learning
//!
//! This library provides:
//! - Core game logic (game module)
//! - Pixel and TUI rendering (render module)
//! - Keyboard input mapping (input module)
//! - Session and training statistics (metrics module)
//! - RL training infrastructure (rl module)
//! - Execution modes: human, train, visualize, export (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;
