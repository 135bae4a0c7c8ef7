use std::fmt;
#[derive(Debug, Clone, PartialEq)]
pub enum TrainError {
    LengthMismatch { len_x: usize, len_y: usize },
    NotEnoughPoints { len: usize, needed: usize },
    InsufficientVariation { column: &'static str },
    ScaleOverflow { column: &'static str },
    InvalidLearningRate(f64),
    InvalidStepBound(f64),
    Divergence { iteration: usize, learning_rate: f64 },
    InfiniteCost { iteration: usize },
    UnscorableFit,
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainError::LengthMismatch { len_x, len_y } => {
                write!(f, "mileage and price have different lengths: {len_x} vs {len_y}")
            },
            TrainError::NotEnoughPoints { len, needed } => {
                write!(f, "not enough points: got {len}, need at least {needed}")
            },
            TrainError::InsufficientVariation { column } => {
                write!(f, "insufficient variation: {column} needs at least two distinct values")
            },
            TrainError::ScaleOverflow { column } => {
                write!(f, "{column} values are too spread out to normalize")
            },
            TrainError::InvalidLearningRate(lr) => {
                write!(f, "learning rate must be positive and finite, got {lr}")
            },
            TrainError::InvalidStepBound(bound) => {
                write!(f, "step bound must be positive, got {bound}")
            },
            TrainError::Divergence { iteration, learning_rate } => {
                write!(
                    f,
                    "numerical divergence at iteration {iteration}, learning rate {learning_rate} is too high"
                )
            },
            TrainError::InfiniteCost { iteration } => {
                write!(f, "infinite cost at iteration {iteration}")
            },
            TrainError::UnscorableFit => {
                write!(f, "fitted model has no finite R² on the training data")
            },
        }
    }
}

impl std::error::Error for TrainError {}

impl TrainError {
    /// True for errors raised before any iteration ran.
    pub fn is_precondition(&self) -> bool {
        !matches!(
            self,
            TrainError::Divergence { .. } | TrainError::InfiniteCost { .. } | TrainError::UnscorableFit
        )
    }
}

pub type TrainResult<T> = Result<T, TrainError>;
