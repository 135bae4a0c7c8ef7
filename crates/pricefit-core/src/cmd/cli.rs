use clap::{Args, Parser, Subcommand, ValueHint};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::cmd::config::{Action, Config, Predict as PredictCfg, Train as TrainCfg};
use crate::params::DEFAULT_PARAMS_FILE;
use crate::train::trainer::DEFAULT_MAX_ITERATIONS;

#[derive(Debug, Parser)]
#[command(
    name = "pricefit",
    about = "Car price estimation from mileage with gradient-descent linear regression",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Path to the training data CSV (mileage,price with a header row)
    #[arg(long = "data", value_name = "PATH", default_value = "data.csv", global = true)]
    pub data_path: String,

    /// Path to the model parameters JSON
    #[arg(long = "params", value_name = "PATH", default_value = DEFAULT_PARAMS_FILE, global = true)]
    pub params_path: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fit the model and save its parameters
    Train(TrainArgs),

    /// Estimate the price for a mileage
    Predict(PredictArgs),

    /// Score the saved model against the data file
    Evaluate,
}

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// Learning rate, skips the automatic search when given
    #[arg(short = 'l', long = "learning-rate")]
    pub learning_rate: Option<f64>,

    /// Maximum gradient descent iterations
    #[arg(short = 'n', long = "iterations", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub iterations: NonZeroUsize,

    /// Evaluate the learning rate candidates in parallel
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Write the sampled parameter trajectory to this CSV file
    #[arg(long = "trajectory", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub trajectory: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    /// Mileage in km
    #[arg(short = 'm', long = "mileage", allow_negative_numbers = true)]
    pub mileage: f64,
}

impl Cli {
    pub fn into_config(self) -> Config {
        let data_path = PathBuf::from(self.data_path);
        let params_path = PathBuf::from(self.params_path);

        let action = match self.command {
            Commands::Train(args) => Action::Train(TrainCfg {
                learning_rate: args.learning_rate,
                iterations: args.iterations,
                parallel: args.parallel,
                trajectory: args.trajectory,
            }),
            Commands::Predict(args) => Action::Predict(PredictCfg { mileage: args.mileage }),
            Commands::Evaluate => Action::Evaluate,
        };

        Config { data_path, params_path, action }
    }
}
