use crate::processevent::{NullSink, SearchEvent, TrainEventSink};
use crate::stats::metrics::r2_from_predictions;
use crate::stats::LinearModel;
use crate::train::trainer::{GradientDescent, TrainConfig, DEFAULT_MAX_ITERATIONS};
use crate::train::trainerror::{TrainError, TrainResult};

use rayon::prelude::*;
use std::num::NonZeroUsize;

pub const DEFAULT_CANDIDATES: [f64; 6] = [0.001, 0.01, 0.05, 0.1, 0.2, 0.5];
pub const FALLBACK_LEARNING_RATE: f64 = 0.01;
/// Largest bonus a candidate gets for converging early.
pub const SPEED_BONUS: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub candidates: Vec<f64>,
    pub iteration_budget: NonZeroUsize,
    pub fallback: f64,
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.to_vec(),
            iteration_budget: DEFAULT_MAX_ITERATIONS,
            fallback: FALLBACK_LEARNING_RATE,
            parallel: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub r2: f64,
    pub iterations: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub learning_rate: f64,
    pub result: TrainResult<CandidateScore>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub learning_rate: f64,
    pub best_score: Option<f64>,
    pub fell_back: bool,
    pub candidates: Vec<Candidate>,
}

pub fn speed_bonus(iterations: usize, budget: usize) -> f64 {
    let budget = budget as f64;
    ((budget - iterations as f64) / budget * SPEED_BONUS).max(0.0)
}

fn evaluate(mileage: &[f64], price: &[f64], lr: f64, budget: NonZeroUsize) -> Candidate {
    let result = score_candidate(mileage, price, lr, budget);
    Candidate { learning_rate: lr, result }
}

fn score_candidate(
    mileage: &[f64],
    price: &[f64],
    lr: f64,
    budget: NonZeroUsize,
) -> TrainResult<CandidateScore> {
    let config = TrainConfig {
        max_iterations: budget,
        record_snapshots: false,
        ..TrainConfig::with_learning_rate(lr)
    };
    let run = GradientDescent::new(config)?.fit(mileage, price, &mut NullSink)?;

    let r2 = training_r2(&run.model, mileage, price)?;
    let score = r2 + speed_bonus(run.iterations, budget.get());

    Ok(CandidateScore { r2, iterations: run.iterations, score })
}

fn training_r2(model: &LinearModel, mileage: &[f64], price: &[f64]) -> TrainResult<f64> {
    let predictions = model.predict_all(mileage);
    r2_from_predictions(price, &predictions).filter(|r2| r2.is_finite()).ok_or(TrainError::UnscorableFit)
}

/// Grid search over `config.candidates`.
///
/// Every candidate gets a fresh trainer over the same borrowed data. Failing
/// candidates are skipped. The highest score wins and ties keep the earlier
/// candidate. When nothing succeeds the fallback rate is returned.
pub fn search_learning_rate<S>(
    mileage: &[f64],
    price: &[f64],
    config: &SearchConfig,
    sink: &mut S,
) -> SearchOutcome
where
    S: TrainEventSink + ?Sized,
{
    sink.on_search_event(&SearchEvent::Started { candidates: config.candidates.len() });

    let budget = config.iteration_budget;
    let candidates: Vec<Candidate> = if config.parallel {
        config.candidates.par_iter().map(|&lr| evaluate(mileage, price, lr, budget)).collect()
    } else {
        config.candidates.iter().map(|&lr| evaluate(mileage, price, lr, budget)).collect()
    };

    let mut best: Option<(f64, f64)> = None;
    for candidate in &candidates {
        let lr = candidate.learning_rate;
        match &candidate.result {
            Ok(s) => {
                sink.on_search_event(&SearchEvent::CandidateScored {
                    learning_rate: lr,
                    r2: s.r2,
                    iterations: s.iterations,
                    score: s.score,
                });
                if best.map_or(true, |(_, best_score)| s.score > best_score) {
                    best = Some((lr, s.score));
                }
            },
            Err(e) => {
                sink.on_search_event(&SearchEvent::CandidateFailed {
                    learning_rate: lr,
                    reason: e.to_string(),
                });
            },
        }
    }

    match best {
        Some((learning_rate, score)) => {
            sink.on_search_event(&SearchEvent::Selected { learning_rate, score });
            SearchOutcome { learning_rate, best_score: Some(score), fell_back: false, candidates }
        },
        None => {
            sink.on_search_event(&SearchEvent::Fallback { learning_rate: config.fallback });
            SearchOutcome {
                learning_rate: config.fallback,
                best_score: None,
                fell_back: true,
                candidates,
            }
        },
    }
}
