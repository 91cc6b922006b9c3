use burn::tensor::{Tensor, TensorData, backend::Backend};

use crate::game::{GameConfig, GameState};

/// Number of features in an observation vector
pub const OBS_DIM: usize = 3;

/// Create a 3-feature observation tensor from game state
///
/// Features:
/// - 0: Player lane (0.0 = left, 1.0 = right)
/// - 1: Opponent lane (0.0 = left, 1.0 = right)
/// - 2: Opponent vertical progress (center y / screen height)
///
/// The progress feature starts slightly negative at spawn (the opponent sits
/// above the visible top edge) and exceeds 1.0 just before the dodge is
/// registered. It stays within [-0.5, 1.5] for any screen at least as tall as
/// the opponent car, and is deliberately not clamped.
///
/// Returns: Tensor<B, 1> with shape [3]
pub fn create_observation<B: Backend>(
    state: &GameState,
    config: &GameConfig,
    device: &B::Device,
) -> Tensor<B, 1> {
    let data = vec![
        state.player.lane.bit(),
        state.opponent.lane.bit(),
        state.opponent.center_y / config.screen_height,
    ];

    Tensor::<B, 1>::from_data(TensorData::new(data, [OBS_DIM]), device)
}
