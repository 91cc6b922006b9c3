//! Frame production and display sinks
//!
//! Frame composition is shared between two independent consumers: a pure
//! pixel rasterizer (`FrameComposer`) for machine observation and recording,
//! and a ratatui renderer for the human-visible terminal modes.

pub mod font;
pub mod frame;
pub mod renderer;
pub mod sprites;

pub use font::ScoreFont;
pub use frame::{Frame, FrameComposer};
pub use renderer::Renderer;
pub use sprites::CarSprites;
