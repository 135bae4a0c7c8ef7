pub mod cmd;
pub mod dataset;
pub mod params;
pub mod predict;
pub mod processevent;
pub mod stats;
pub mod train;

pub use dataset::Dataset;
pub use predict::estimate_price;
pub use stats::{LinearModel, Metrics, Scaler};
pub use train::{search_learning_rate, GradientDescent, SearchConfig, TrainConfig, TrainingRun};
