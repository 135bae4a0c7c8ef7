use crate::processevent::{TrainEvent, TrainEventSink};
use crate::stats::{LinearModel, Scaler};
use crate::train::schedule::{is_checkpoint, Snapshot};
use crate::train::trainerror::{TrainError, TrainResult};

use std::num::NonZeroUsize;

pub const DEFAULT_LEARNING_RATE: f64 = 0.5;
pub const DEFAULT_MAX_ITERATIONS: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(n) => n,
    None => panic!("iteration default must be non-zero"),
};
pub const DEFAULT_TOLERANCE: f64 = 1e-6;
/// Default bound on a single parameter step in normalized space.
pub const MAX_STEP: f64 = 1e6;
/// Rates above this are accepted but reported.
pub const HIGH_LEARNING_RATE: f64 = 1.0;
/// A cost this many times above the starting cost counts as divergence.
pub const DIVERGENCE_FACTOR: f64 = 1e3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub max_iterations: NonZeroUsize,
    pub tolerance: f64,
    pub max_step: f64,
    pub record_snapshots: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            max_step: MAX_STEP,
            record_snapshots: true,
        }
    }
}

impl TrainConfig {
    pub fn with_learning_rate(learning_rate: f64) -> Self {
        Self { learning_rate, ..Self::default() }
    }
}

/// Outcome of one successful fit. Parameters are in original units.
#[derive(Debug, Clone)]
pub struct TrainingRun {
    pub model: LinearModel,
    pub iterations: usize,
    pub converged: bool,
    pub cost_history: Vec<f64>,
    pub snapshots: Vec<Snapshot>,
}

impl TrainingRun {
    pub fn final_cost(&self) -> Option<f64> {
        self.cost_history.last().copied()
    }
}

/// Batch gradient descent on z-score normalized mileage and price.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    config: TrainConfig,
}

impl GradientDescent {
    pub fn new(config: TrainConfig) -> TrainResult<Self> {
        let lr = config.learning_rate;
        if !lr.is_finite() || lr <= 0.0 {
            return Err(TrainError::InvalidLearningRate(lr));
        }
        if config.max_step.is_nan() || config.max_step <= 0.0 {
            return Err(TrainError::InvalidStepBound(config.max_step));
        }
        Ok(Self { config })
    }

    pub fn fit<S>(&self, mileage: &[f64], price: &[f64], sink: &mut S) -> TrainResult<TrainingRun>
    where
        S: TrainEventSink + ?Sized,
    {
        check_inputs(mileage, price)?;
        let (x_scaler, x) = Scaler::fit_transform(mileage);
        let (y_scaler, y) = Scaler::fit_transform(price);
        if !x_scaler.is_finite() {
            return Err(TrainError::ScaleOverflow { column: "mileage" });
        }
        if !y_scaler.is_finite() {
            return Err(TrainError::ScaleOverflow { column: "price" });
        }

        let lr = self.config.learning_rate;
        let max_iterations = self.config.max_iterations.get();
        let tolerance = self.config.tolerance;
        let max_step = self.config.max_step;

        if lr > HIGH_LEARNING_RATE {
            sink.on_train_event(&TrainEvent::HighLearningRate(lr));
        }
        sink.on_train_event(&TrainEvent::Started {
            samples: mileage.len(),
            learning_rate: lr,
            max_iterations,
        });

        let m = x.len() as f64;

        let mut theta0 = 0.0;
        let mut theta1 = 0.0;
        let mut prev_cost = f64::INFINITY;
        let mut cost_history: Vec<f64> = Vec::with_capacity(max_iterations);
        let mut snapshots = Vec::new();
        let mut converged = false;

        for i in 0..max_iterations {
            let errors: Vec<f64> =
                x.iter().zip(&y).map(|(&xi, &yi)| theta0 + theta1 * xi - yi).collect();

            let step0 = lr * errors.iter().sum::<f64>() / m;
            let step1 = lr * errors.iter().zip(&x).map(|(&e, &xi)| e * xi).sum::<f64>() / m;

            // simultaneous update, both steps come from the same errors
            theta0 -= step0.clamp(-max_step, max_step);
            theta1 -= step1.clamp(-max_step, max_step);

            if !theta0.is_finite() || !theta1.is_finite() {
                return Err(diverged(sink, i, lr));
            }

            // errors come from finite parameters on z-scored data, so this
            // only trips when their squares overflow
            let cost = match half_mse(&errors, i) {
                Ok(cost) => cost,
                Err(e) => {
                    sink.on_train_event(&TrainEvent::InfiniteCost { iteration: i });
                    return Err(e);
                },
            };
            // the step clamp keeps runaway parameters finite, catch them by their cost
            if cost_history.first().is_some_and(|&first| cost > first * DIVERGENCE_FACTOR) {
                return Err(diverged(sink, i, lr));
            }

            cost_history.push(cost);

            if self.config.record_snapshots && is_checkpoint(i) {
                let model = denormalize(theta0, theta1, &x_scaler, &y_scaler);
                let model = finite_model(model, i, lr, sink)?;
                snapshots.push(Snapshot { iteration: i, theta0: model.theta0, theta1: model.theta1 });
            }

            if (prev_cost - cost).abs() < tolerance {
                converged = true;
                break;
            }
            prev_cost = cost;
        }

        let iterations = cost_history.len();
        let final_iteration = iterations - 1;
        let model = denormalize(theta0, theta1, &x_scaler, &y_scaler);
        let model = finite_model(model, final_iteration, lr, sink)?;

        if converged {
            sink.on_train_event(&TrainEvent::Converged { iterations });
        } else {
            sink.on_train_event(&TrainEvent::Completed { iterations });
        }

        if self.config.record_snapshots
            && snapshots.last().map(|s| s.iteration) != Some(final_iteration)
        {
            snapshots.push(Snapshot {
                iteration: final_iteration,
                theta0: model.theta0,
                theta1: model.theta1,
            });
        }

        Ok(TrainingRun { model, iterations, converged, cost_history, snapshots })
    }
}

fn diverged<S>(sink: &mut S, iteration: usize, learning_rate: f64) -> TrainError
where
    S: TrainEventSink + ?Sized,
{
    sink.on_train_event(&TrainEvent::Diverged { iteration, learning_rate });
    TrainError::Divergence { iteration, learning_rate }
}

/// Denormalizing multiplies by std_y / std_x, which can overflow on its own.
fn finite_model<S>(
    model: LinearModel,
    iteration: usize,
    learning_rate: f64,
    sink: &mut S,
) -> TrainResult<LinearModel>
where
    S: TrainEventSink + ?Sized,
{
    if model.is_finite() {
        Ok(model)
    } else {
        Err(diverged(sink, iteration, learning_rate))
    }
}

fn half_mse(errors: &[f64], iteration: usize) -> TrainResult<f64> {
    let cost = errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64 / 2.0;
    if cost.is_finite() {
        Ok(cost)
    } else {
        Err(TrainError::InfiniteCost { iteration })
    }
}

fn check_inputs(mileage: &[f64], price: &[f64]) -> TrainResult<()> {
    if mileage.len() != price.len() {
        return Err(TrainError::LengthMismatch { len_x: mileage.len(), len_y: price.len() });
    }
    if mileage.len() < 2 {
        return Err(TrainError::NotEnoughPoints { len: mileage.len(), needed: 2 });
    }
    if !has_two_distinct(mileage) {
        return Err(TrainError::InsufficientVariation { column: "mileage" });
    }
    if !has_two_distinct(price) {
        return Err(TrainError::InsufficientVariation { column: "price" });
    }
    Ok(())
}

fn has_two_distinct(values: &[f64]) -> bool {
    values.iter().any(|&v| v != values[0])
}

/// Maps the normalized line back to original units.
///
/// The points (0, theta0) and (1, theta0 + theta1) are pushed through both
/// inverse transforms and the line through them is solved directly, which
/// composes the two independent affine normalizations.
fn denormalize(theta0: f64, theta1: f64, x_scaler: &Scaler, y_scaler: &Scaler) -> LinearModel {
    let x0 = x_scaler.invert(0.0);
    let x1 = x_scaler.invert(1.0);
    let y0 = y_scaler.invert(theta0);
    let y1 = y_scaler.invert(theta0 + theta1);

    let slope = (y1 - y0) / (x1 - x0);
    let intercept = y0 - slope * x0;
    LinearModel::from_val(intercept, slope)
}
