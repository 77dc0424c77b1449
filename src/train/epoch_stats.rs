use serde::{Deserialize, Serialize};

/// Progress record emitted by `train_loop` at every report interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Cost over the full training set after this epoch's update.
    pub cost: f64,
    /// Wall-clock duration of this epoch's gradient step and update, in
    /// milliseconds.
    pub elapsed_ms: u64,
}

/// Why `train_loop` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// All requested epochs ran.
    Completed,
    /// A reported cost reached `cost_threshold`.
    Converged,
    /// The stop flag was raised or the progress receiver went away.
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainSummary {
    pub epochs_run: usize,
    pub final_cost: f64,
    pub stop: StopReason,
}
