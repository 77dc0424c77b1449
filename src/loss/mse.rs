use crate::error::{contract, ContractViolation};
use crate::math::view::MatrixView;
use crate::network::network::Network;

pub struct MseLoss;

impl MseLoss {
    /// Squared error of one sample, summed over outputs (not averaged).
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum()
    }

    /// Per-output gradient of [`MseLoss::loss`]: `2·(predicted - expected)`.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| 2.0 * (a - b))
            .collect()
    }
}

/// Panics unless `ti`/`to` form a non-empty, row-aligned training set that
/// fits the network's input and output widths.
pub(crate) fn check_training_pair(net: &Network, ti: &MatrixView<'_>, to: &MatrixView<'_>) {
    contract!(
        ti.rows() == to.rows(),
        ContractViolation::ShapeMismatch { op: "training pair", left: ti.shape(), right: to.shape() }
    );
    contract!(ti.rows() > 0, ContractViolation::EmptyTrainingSet);
    contract!(
        ti.cols() == net.input_width(),
        ContractViolation::ShapeMismatch { op: "training inputs", left: ti.shape(), right: (ti.rows(), net.input_width()) }
    );
    contract!(
        to.cols() == net.output_width(),
        ContractViolation::ShapeMismatch { op: "training targets", left: to.shape(), right: (to.rows(), net.output_width()) }
    );
}

/// Mean over the `N` training rows of the summed squared output error.
///
/// The total is divided by `N` only, not by the output width; the output
/// delta used by backprop (`2·(a - y)`, then `/N`) assumes exactly this.
/// Every activation buffer of `net` is overwritten.
pub fn cost<'a, 'b>(
    net: &mut Network,
    ti: impl Into<MatrixView<'a>>,
    to: impl Into<MatrixView<'b>>,
) -> f64 {
    let (ti, to) = (ti.into(), to.into());
    check_training_pair(net, &ti, &to);

    let n = ti.rows();
    let mut total = 0.0;
    for i in 0..n {
        net.input_mut().copy_from(ti.row(i));
        net.forward();
        total += MseLoss::loss(net.output().row_slice(0), to.row_slice(i));
    }
    total / n as f64
}
