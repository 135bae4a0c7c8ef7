pub mod linreg;
pub mod metrics;
pub mod scaler;

pub use linreg::LinearModel;
pub use metrics::{Metrics, ModelQuality};
pub use scaler::Scaler;
