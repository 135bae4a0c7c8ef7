use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictError {
    InvalidInput { name: &'static str, value: f64 },
    InvalidResult,
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::InvalidInput { name, value } => {
                write!(f, "invalid {name} value: {value}")
            },
            PredictError::InvalidResult => {
                write!(f, "price calculation resulted in an invalid value")
            },
        }
    }
}

impl std::error::Error for PredictError {}

fn finite(name: &'static str, value: f64) -> Result<f64, PredictError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PredictError::InvalidInput { name, value })
    }
}

/// price = theta0 + theta1 * mileage
pub fn estimate_price(mileage: f64, theta0: f64, theta1: f64) -> Result<f64, PredictError> {
    let mileage = finite("mileage", mileage)?;
    let theta0 = finite("theta0", theta0)?;
    let theta1 = finite("theta1", theta1)?;

    let price = theta0 + theta1 * mileage;
    if !price.is_finite() {
        return Err(PredictError::InvalidResult);
    }
    Ok(price)
}
