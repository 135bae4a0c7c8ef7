use crate::dataset::{DataError, Dataset};
use crate::params::{self, ParamsError};
use crate::predict::{estimate_price, PredictError};
use crate::processevent::{SearchEvent, TrainEvent, TrainEventSink};
use crate::stats::{LinearModel, Metrics};
use crate::train::search::{search_learning_rate, SearchConfig};
use crate::train::trainer::{GradientDescent, TrainConfig, TrainingRun};
use crate::train::trainerror::TrainError;

use log::{debug, error, info, warn};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

pub const EXAMPLE_MILEAGES: [f64; 4] = [50_000., 100_000., 150_000., 200_000.];

/* =================== Public configuration types =================== */

#[derive(Debug)]
pub struct Config {
    pub data_path: PathBuf,
    pub params_path: PathBuf,
    pub action: Action,
}

#[derive(Debug, Clone)]
pub enum Action {
    Train(Train),
    Predict(Predict),
    Evaluate,
}

#[derive(Debug, Clone)]
pub struct Train {
    pub learning_rate: Option<f64>,
    pub iterations: NonZeroUsize,
    pub parallel: bool,
    pub trajectory: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Predict {
    pub mileage: f64,
}

/* =================== Error type (no process::exit) =================== */

#[derive(thiserror::Error, Debug)]
pub enum CmdError {
    #[error("loading data failed: {0}")]
    Data(#[from] DataError),
    #[error("training failed: {0}")]
    Train(#[from] TrainError),
    #[error("{0}")]
    Params(#[from] ParamsError),
    #[error("prediction failed: {0}")]
    Predict(#[from] PredictError),
    #[error("writing trajectory failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Msg(String),
}

/* =================== Entry point =================== */

impl Config {
    pub fn run(&mut self) -> Result<(), CmdError> {
        match &self.action.clone() {
            Action::Train(t) => self.run_train(t),
            Action::Predict(p) => self.run_predict(p),
            Action::Evaluate => self.run_evaluate(),
        }
    }
}

/* =================== Actions =================== */

impl Config {
    fn run_train(&mut self, t: &Train) -> Result<(), CmdError> {
        let data = Dataset::from_file(&self.data_path)?;
        data.validate_for_training()?;
        info!("Data loaded: {} samples", data.len());

        let learning_rate = match t.learning_rate {
            Some(lr) => lr,
            None => {
                let search = SearchConfig {
                    iteration_budget: t.iterations,
                    parallel: t.parallel,
                    ..SearchConfig::default()
                };
                search_learning_rate(&data.mileage, &data.price, &search, self).learning_rate
            },
        };

        info!("Training model with learning rate {learning_rate}");
        let config = TrainConfig {
            learning_rate,
            max_iterations: t.iterations,
            ..TrainConfig::default()
        };
        let run = GradientDescent::new(config)?.fit(&data.mileage, &data.price, self)?;
        if let Some(cost) = run.final_cost() {
            info!("Final cost (normalized): {cost:.6e}");
        }

        params::save(&self.params_path, &run.model)?;
        info!("Model saved to {}", self.params_path.display());

        if let Some(path) = &t.trajectory {
            write_trajectory(path, &run)?;
            info!("Trajectory written to {}", path.display());
        }

        println!("Training successful!");
        println!("Model parameters: θ₀ = {:.6}, θ₁ = {:.6}", run.model.theta0, run.model.theta1);
        Ok(())
    }

    fn run_predict(&mut self, p: &Predict) -> Result<(), CmdError> {
        if p.mileage < 0.0 {
            return Err(CmdError::Msg("mileage cannot be negative".to_string()));
        }

        let model = match params::load(&self.params_path) {
            Ok(model) => {
                info!("Model loaded: θ₀ = {:.6}, θ₁ = {:.6}", model.theta0, model.theta1);
                model
            },
            Err(ParamsError::Missing(path)) => {
                warn!("No model parameters at {}, predicting with θ₀ = θ₁ = 0", path.display());
                LinearModel::default()
            },
            Err(e) => return Err(e.into()),
        };

        let price = estimate_price(p.mileage, model.theta0, model.theta1)?;
        println!("Estimated price for {:.0} km: {:.2}", p.mileage, price);
        Ok(())
    }

    fn run_evaluate(&mut self) -> Result<(), CmdError> {
        let model = params::load(&self.params_path)?;
        let data = Dataset::from_file(&self.data_path)?;
        info!("Evaluating {} on {} data points", model, data.len());

        let predictions = data
            .mileage
            .iter()
            .map(|&m| estimate_price(m, model.theta0, model.theta1))
            .collect::<Result<Vec<f64>, _>>()?;
        let metrics = Metrics::compute(&data.price, &predictions)
            .ok_or_else(|| CmdError::Msg("no data points to evaluate".to_string()))?;

        print_summary(&model, &metrics)?;
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct TrajectoryRow {
    iteration: usize,
    theta0: f64,
    theta1: f64,
    cost: f64,
}

fn write_trajectory(path: &Path, run: &TrainingRun) -> Result<(), CmdError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for s in &run.snapshots {
        wtr.serialize(TrajectoryRow {
            iteration: s.iteration,
            theta0: s.theta0,
            theta1: s.theta1,
            cost: run.cost_history[s.iteration],
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// RMSE as a percentage of the mean actual price.
pub fn normalized_rmse(metrics: &Metrics) -> Option<f64> {
    (metrics.mean_actual != 0.0).then(|| metrics.rmse / metrics.mean_actual * 100.0)
}

pub fn recommendation(r2: f64) -> &'static str {
    if r2 > 0.8 {
        "This model is sufficiently accurate for reliable predictions"
    } else if r2 > 0.6 {
        "This model provides reasonable estimates"
    } else {
        "This model needs improvement (more data, additional variables)"
    }
}

fn print_summary(model: &LinearModel, metrics: &Metrics) -> Result<(), CmdError> {
    let rule = "=".repeat(50);
    println!("{rule}");
    println!("MODEL EVALUATION SUMMARY");
    println!("{rule}");
    println!("Model quality:  {} (R² = {:.3})", metrics.quality(), metrics.r2);
    println!("MSE:            {:.2}", metrics.mse);
    println!("RMSE:           {:.2}", metrics.rmse);
    println!("MAE:            {:.2}", metrics.mae);
    match metrics.mape {
        Some(mape) => println!("MAPE:           {mape:.2}%"),
        None => println!("MAPE:           undefined (an actual price is 0)"),
    }
    match normalized_rmse(metrics) {
        Some(nrmse) => println!("Normalized RMSE: {nrmse:.2}% of the mean price"),
        None => println!("Normalized RMSE: undefined (mean price is 0)"),
    }
    println!("Max error:      {:.2}", metrics.max_error);
    println!("Min error:      {:.2}", metrics.min_error);
    println!("Data points:    {}", metrics.len);

    println!("\nPrediction examples:");
    for km in EXAMPLE_MILEAGES {
        let price = estimate_price(km, model.theta0, model.theta1)?;
        println!("   {km:>9.0} km -> {price:.0}");
    }
    println!("\nFormula: {model}");
    println!("* {}", recommendation(metrics.r2));
    println!("{rule}");
    Ok(())
}

impl TrainEventSink for Config {
    fn on_train_event(&mut self, ev: &TrainEvent) {
        match ev {
            TrainEvent::Started { samples, learning_rate, max_iterations } => {
                info!(
                    "Training on {samples} samples, learning rate {learning_rate}, at most {max_iterations} iterations"
                );
            },
            TrainEvent::HighLearningRate(lr) => {
                warn!("High learning rate ({lr}), risk of divergence");
            },
            TrainEvent::Converged { iterations } => {
                info!("Converged after {iterations} iterations");
            },
            TrainEvent::Completed { iterations } => {
                info!("Training completed: {iterations} iterations");
            },
            TrainEvent::Diverged { iteration, learning_rate } => {
                error!("Divergence detected at iteration {iteration}, learning rate too high: {learning_rate}");
            },
            TrainEvent::InfiniteCost { iteration } => {
                error!("Infinite cost detected at iteration {iteration}");
            },
        }
    }

    fn on_search_event(&mut self, ev: &SearchEvent) {
        match ev {
            SearchEvent::Started { candidates } => {
                info!("Optimizing hyperparameters over {candidates} learning rates...");
            },
            SearchEvent::CandidateScored { learning_rate, r2, iterations, score } => {
                debug!("lr {learning_rate}: R² = {r2:.6}, {iterations} iterations, score {score:.6}");
            },
            SearchEvent::CandidateFailed { learning_rate, reason } => {
                debug!("lr {learning_rate} skipped: {reason}");
            },
            SearchEvent::Selected { learning_rate, score } => {
                info!("Best learning rate found: {learning_rate} (score = {score:.4})");
            },
            SearchEvent::Fallback { learning_rate } => {
                warn!("Every learning rate candidate failed, falling back to {learning_rate}");
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DATA: &str = "km,price\n10,100\n20,90\n30,80\n40,70\n50,60\n";

    fn config(dir: &Path, action: Action) -> Config {
        let data_path = dir.join("data.csv");
        fs::write(&data_path, DATA).unwrap();
        Config { data_path, params_path: dir.join("model_params.json"), action }
    }

    fn train_action(learning_rate: Option<f64>, trajectory: Option<PathBuf>) -> Action {
        Action::Train(Train {
            learning_rate,
            iterations: NonZeroUsize::new(1000).unwrap(),
            parallel: false,
            trajectory,
        })
    }

    #[test]
    fn test_train_then_evaluate_and_predict() {
        let dir = tempfile::tempdir().unwrap();
        let trajectory = dir.path().join("trajectory.csv");

        let mut cfg = config(dir.path(), train_action(None, Some(trajectory.clone())));
        cfg.run().unwrap();

        let model = params::load(&cfg.params_path).unwrap();
        assert!((model.theta0 - 110.).abs() < 1e-2);
        assert!((model.theta1 + 1.).abs() < 1e-2);

        let text = fs::read_to_string(&trajectory).unwrap();
        assert!(text.starts_with("iteration,theta0,theta1,cost\n0,"));

        cfg.action = Action::Evaluate;
        cfg.run().unwrap();

        cfg.action = Action::Predict(Predict { mileage: 25. });
        cfg.run().unwrap();
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(recommendation(0.95), "This model is sufficiently accurate for reliable predictions");
        assert_eq!(recommendation(0.8), "This model provides reasonable estimates");
        assert_eq!(recommendation(0.61), "This model provides reasonable estimates");
        assert_eq!(recommendation(0.6), "This model needs improvement (more data, additional variables)");
    }

    #[test]
    fn test_normalized_rmse() {
        let metrics = Metrics::compute(&[100., 100.], &[90., 110.]).unwrap();
        assert!((normalized_rmse(&metrics).unwrap() - 10.0).abs() < 1e-12);

        let metrics = Metrics::compute(&[-1., 1.], &[0., 0.]).unwrap();
        assert_eq!(normalized_rmse(&metrics), None);
    }

    #[test]
    fn test_divergent_training_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), train_action(Some(1e10), None));

        let err = cfg.run().unwrap_err();
        assert!(matches!(err, CmdError::Train(TrainError::Divergence { .. })));
        assert!(err.to_string().starts_with("training failed"));
        assert!(!cfg.params_path.exists());
    }

    #[test]
    fn test_invalid_training_data() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), train_action(None, None));
        fs::write(&cfg.data_path, "km,price\n10,100\n20,-5\n").unwrap();

        let err = cfg.run().unwrap_err();
        assert!(matches!(err, CmdError::Data(DataError::NonPositivePrice { .. })));
        assert!(!cfg.params_path.exists());
    }

    #[test]
    fn test_predict_without_params_uses_zero_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), Action::Predict(Predict { mileage: 1000. }));
        assert!(cfg.run().is_ok());
    }

    #[test]
    fn test_predict_rejects_negative_mileage() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), Action::Predict(Predict { mileage: -1. }));
        assert!(matches!(cfg.run(), Err(CmdError::Msg(_))));
    }

    #[test]
    fn test_evaluate_without_params_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), Action::Evaluate);
        assert!(matches!(cfg.run(), Err(CmdError::Params(ParamsError::Missing(_)))));
    }

    #[test]
    fn test_malformed_params_is_an_error_for_predict() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config(dir.path(), Action::Predict(Predict { mileage: 1000. }));
        fs::write(&cfg.params_path, "[]").unwrap();
        assert!(matches!(cfg.run(), Err(CmdError::Params(ParamsError::Malformed { .. }))));
    }
}
