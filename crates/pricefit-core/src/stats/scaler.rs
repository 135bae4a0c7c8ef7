use statrs::statistics::Statistics;

/// Mean/standard-deviation normalizer fitted on one sequence.
///
/// A `Scaler` only exists after it has been fitted, so there is no way to
/// invert values with statistics that were never computed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaler {
    pub mean: f64,
    pub std: f64,
}

impl Scaler {
    /// Computes mean and population standard deviation of `values`.
    /// A zero deviation (all values identical) is replaced by 1.0.
    pub fn fit(values: &[f64]) -> Self {
        let mean = values.iter().mean();
        let std = values.iter().population_std_dev();
        let std = if std == 0.0 { 1.0 } else { std };
        Self { mean, std }
    }

    pub fn fit_transform(values: &[f64]) -> (Self, Vec<f64>) {
        let scaler = Self::fit(values);
        let scaled = scaler.transform(values);
        (scaler, scaled)
    }

    /// False when the spread of the fitted values overflowed.
    pub fn is_finite(&self) -> bool {
        self.mean.is_finite() && self.std.is_finite()
    }

    pub fn apply(&self, v: f64) -> f64 {
        (v - self.mean) / self.std
    }

    pub fn invert(&self, v: f64) -> f64 {
        v * self.std + self.mean
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.apply(v)).collect()
    }

    pub fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.invert(v)).collect()
    }
}
