use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use crate::grad::method::GradientMethod;
use crate::train::epoch_stats::EpochStats;

/// Serializable training hyperparameters, stored inside a
/// [`NetworkSpec`](crate::network::spec::NetworkSpec).
///
/// Missing fields fall back to [`TrainingSpec::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSpec {
    pub epochs: usize,
    pub learning_rate: f64,
    pub method: GradientMethod,
    /// Evaluate and report the cost every this many epochs; `0` reports only
    /// after the last epoch.
    pub report_every: usize,
    /// Stop as soon as a reported cost is at or below this value.
    pub cost_threshold: Option<f64>,
    /// Seed for parameter initialization; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for TrainingSpec {
    fn default() -> Self {
        TrainingSpec {
            epochs: 10_000,
            learning_rate: 1.0,
            method: GradientMethod::Backprop,
            report_every: 1_000,
            cost_threshold: None,
            seed: None,
        }
    }
}

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`         — number of full-batch gradient steps
/// - `method`         — gradient engine used on every step
/// - `report_every`   — cost evaluation / progress interval (`0` = end only)
/// - `cost_threshold` — optional early-stop target
/// - `progress_tx`    — optional channel sender; one `EpochStats` per report.
///                      If the receiver is dropped the loop stops.
/// - `stop_flag`      — optional atomic flag checked before every epoch.
pub struct TrainConfig {
    pub epochs: usize,
    pub method: GradientMethod,
    pub report_every: usize,
    pub cost_threshold: Option<f64>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig`: backprop, report at the end only, no
    /// channel, no stop flag.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            method: GradientMethod::Backprop,
            report_every: 0,
            cost_threshold: None,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn from_spec(spec: &TrainingSpec) -> Self {
        TrainConfig {
            epochs: spec.epochs,
            method: spec.method,
            report_every: spec.report_every,
            cost_threshold: spec.cost_threshold,
            progress_tx: None,
            stop_flag: None,
        }
    }
}
