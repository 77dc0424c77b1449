use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::loss::mse::{check_training_pair, cost};
use crate::math::view::MatrixView;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::{EpochStats, StopReason, TrainSummary};
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Runs full-batch gradient descent on `network` for up to `config.epochs`
/// epochs.
///
/// # Arguments
/// - `network`   — parameters being trained; modified in place
/// - `grad`      — scratch gradient, allocated from the same architecture
/// - `ti`, `to`  — row-aligned training inputs and targets
/// - `optimizer` — carries the learning rate
/// - `config`    — epochs, gradient engine, reporting and stop controls
///
/// # Early termination
/// The loop returns before `config.epochs` if:
/// - `config.stop_flag` is set (checked before every epoch), **or**
/// - the `progress_tx` receiver has been dropped, **or**
/// - a reported cost is at or below `config.cost_threshold`.
///
/// Each epoch is a complete gradient computation plus update, so stopping
/// between epochs always leaves a consistent network.
///
/// # Panics
/// Panics if `grad` does not share `network`'s architecture or the training
/// pair does not fit the network.
pub fn train_loop(
    network: &mut Network,
    grad: &mut Network,
    ti: MatrixView<'_>,
    to: MatrixView<'_>,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> TrainSummary {
    network.check_paired(grad);
    check_training_pair(network, &ti, &to);

    info!(
        architecture = ?network.architecture(),
        rows = ti.rows(),
        epochs = config.epochs,
        rate = optimizer.learning_rate,
        method = ?config.method,
        "training started"
    );

    let mut stop = StopReason::Completed;
    let mut epochs_run = 0;
    let mut reported: Option<(usize, f64)> = None;

    for epoch in 1..=config.epochs {
        if stop_requested(config) {
            warn!(epoch, "stop flag raised, stopping");
            stop = StopReason::Cancelled;
            break;
        }

        let t_start = Instant::now();
        config.method.compute(network, grad, ti, to);
        optimizer.step(network, grad);
        let elapsed_ms = t_start.elapsed().as_millis() as u64;
        epochs_run = epoch;

        if !should_report(epoch, config) {
            continue;
        }

        let c = cost(network, ti, to);
        reported = Some((epoch, c));
        debug!(epoch, cost = c, elapsed_ms, "epoch finished");

        if let Some(ref tx) = config.progress_tx {
            let stats = EpochStats { epoch, total_epochs: config.epochs, cost: c, elapsed_ms };
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                warn!(epoch, "progress receiver dropped, stopping");
                stop = StopReason::Cancelled;
                break;
            }
        }

        if let Some(threshold) = config.cost_threshold {
            if c <= threshold {
                stop = StopReason::Converged;
                break;
            }
        }
    }

    let final_cost = match reported {
        Some((epoch, c)) if epoch == epochs_run => c,
        _ => cost(network, ti, to),
    };

    info!(epochs_run, final_cost, ?stop, "training finished");
    TrainSummary { epochs_run, final_cost, stop }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map_or(false, |flag| flag.load(Ordering::Relaxed))
}

fn should_report(epoch: usize, config: &TrainConfig) -> bool {
    epoch == config.epochs || (config.report_every > 0 && epoch % config.report_every == 0)
}
