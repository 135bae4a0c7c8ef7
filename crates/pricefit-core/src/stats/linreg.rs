use serde::{Deserialize, Serialize};
use std::fmt;

/// price = theta0 + theta1 * mileage, in original units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub theta0: f64,
    pub theta1: f64,
}

impl fmt::Display for LinearModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "price = {:.2} + ({:.6} * mileage)", self.theta0, self.theta1)
    }
}

impl Default for LinearModel {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearModel {
    pub fn new() -> Self {
        Self { theta0: 0., theta1: 0. }
    }
    pub fn from_val(theta0: f64, theta1: f64) -> Self {
        Self { theta0, theta1 }
    }
    pub fn calculate(&self, x: f64) -> f64 {
        self.theta0 + self.theta1 * x
    }
    pub fn predict_all(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.calculate(xi)).collect()
    }
    pub fn is_finite(&self) -> bool {
        self.theta0.is_finite() && self.theta1.is_finite()
    }
}
