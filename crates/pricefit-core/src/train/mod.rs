pub mod schedule;
pub mod search;
pub mod trainer;
pub mod trainerror;

pub use schedule::Snapshot;
pub use search::{search_learning_rate, SearchConfig, SearchOutcome};
pub use trainer::{GradientDescent, TrainConfig, TrainingRun};
pub use trainerror::{TrainError, TrainResult};
