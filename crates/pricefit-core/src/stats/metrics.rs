use std::fmt;

fn check(y: &[f64], y_hat: &[f64]) -> Option<usize> {
    if y.len() != y_hat.len() || y.is_empty() {
        return None;
    }
    Some(y.len())
}

pub fn mse(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    let n = check(y, y_hat)?;
    let sum_sq: f64 = y.iter().zip(y_hat.iter()).map(|(&yi, &yhi)| (yi - yhi).powi(2)).sum();

    Some(sum_sq / n as f64)
}

pub fn rmse(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    mse(y, y_hat).map(f64::sqrt)
}

pub fn mae(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    let n = check(y, y_hat)?;
    let sum_abs: f64 = y.iter().zip(y_hat.iter()).map(|(&yi, &yhi)| (yi - yhi).abs()).sum();

    Some(sum_abs / n as f64)
}

/// Coefficient of determination. Defined as 0 when every actual value is
/// identical (SS_total == 0).
pub fn r2_from_predictions(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    let n = check(y, y_hat)?;
    let y_mean = y.iter().sum::<f64>() / n as f64;

    let ss_res: f64 = y.iter().zip(y_hat).map(|(&yi, &yhi)| (yi - yhi).powi(2)).sum();
    let ss_tot: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Some(0.0);
    }

    Some(1.0 - ss_res / ss_tot)
}

/// Mean absolute percentage error, in percent.
///
/// `None` when any actual value is exactly zero, the percentage is undefined there.
pub fn mape(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    let n = check(y, y_hat)?;
    if y.iter().any(|&yi| yi == 0.0) {
        return None;
    }
    let sum: f64 = y.iter().zip(y_hat).map(|(&yi, &yhi)| ((yi - yhi) / yi).abs()).sum();

    Some(sum / n as f64 * 100.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub mape: Option<f64>,
    pub max_error: f64,
    pub min_error: f64,
    pub mean_actual: f64,
    pub len: usize,
}

impl Metrics {
    /// Scores `predicted` against `actual`. Returns `None` for empty or
    /// mismatched inputs.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Option<Self> {
        let len = check(actual, predicted)?;
        let mse = mse(actual, predicted)?;
        let abs_errors: Vec<f64> =
            actual.iter().zip(predicted).map(|(&yi, &yhi)| (yi - yhi).abs()).collect();

        let max_error = abs_errors.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min_error = abs_errors.iter().copied().fold(f64::INFINITY, f64::min);

        Some(Self {
            mse,
            rmse: mse.sqrt(),
            mae: mae(actual, predicted)?,
            r2: r2_from_predictions(actual, predicted)?,
            mape: mape(actual, predicted),
            max_error,
            min_error,
            mean_actual: actual.iter().sum::<f64>() / len as f64,
            len,
        })
    }

    pub fn quality(&self) -> ModelQuality {
        ModelQuality::from_r2(self.r2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ModelQuality {
    pub fn from_r2(r2: f64) -> Self {
        if r2 > 0.9 {
            ModelQuality::Excellent
        } else if r2 > 0.7 {
            ModelQuality::Good
        } else if r2 > 0.5 {
            ModelQuality::Fair
        } else {
            ModelQuality::Poor
        }
    }
}

impl fmt::Display for ModelQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelQuality::Excellent => write!(f, "Excellent"),
            ModelQuality::Good => write!(f, "Good"),
            ModelQuality::Fair => write!(f, "Fair"),
            ModelQuality::Poor => write!(f, "Poor"),
        }
    }
}
