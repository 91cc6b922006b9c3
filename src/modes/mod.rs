pub mod export;
pub mod human;
pub mod train;
pub mod visualize;

pub use export::ExportConfig;
pub use human::HumanMode;
pub use train::{TrainConfig, TrainMode};
pub use visualize::VisualizeMode;
