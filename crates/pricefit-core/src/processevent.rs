#[derive(Debug, Clone, PartialEq)]
pub enum TrainEvent {
    Started { samples: usize, learning_rate: f64, max_iterations: usize },
    HighLearningRate(f64),
    Converged { iterations: usize },
    Completed { iterations: usize },
    Diverged { iteration: usize, learning_rate: f64 },
    InfiniteCost { iteration: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Started { candidates: usize },
    CandidateScored { learning_rate: f64, r2: f64, iterations: usize, score: f64 },
    CandidateFailed { learning_rate: f64, reason: String },
    Selected { learning_rate: f64, score: f64 },
    Fallback { learning_rate: f64 },
}

/// Receives progress from the trainer and the learning-rate search.
pub trait TrainEventSink {
    fn on_train_event(&mut self, ev: &TrainEvent);
    fn on_search_event(&mut self, ev: &SearchEvent);
}

/// Discards everything. Used for the quiet candidate fits of the search.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TrainEventSink for NullSink {
    fn on_train_event(&mut self, _ev: &TrainEvent) {}
    fn on_search_event(&mut self, _ev: &SearchEvent) {}
}

/// Keeps every event in arrival order.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub train: Vec<TrainEvent>,
    pub search: Vec<SearchEvent>,
}

impl TrainEventSink for EventLog {
    fn on_train_event(&mut self, ev: &TrainEvent) {
        self.train.push(ev.clone());
    }
    fn on_search_event(&mut self, ev: &SearchEvent) {
        self.search.push(ev.clone());
    }
}
