use serde::{Deserialize, Serialize};

use crate::loss::mse::{check_training_pair, cost};
use crate::math::view::MatrixView;
use crate::network::network::{Network, ParamKind};

/// How each parameter is perturbed when estimating its partial derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifferenceScheme {
    /// `(C(p + eps) - C(p)) / eps`, one extra cost evaluation per parameter.
    #[default]
    Forward,
    /// `(C(p + eps) - C(p - eps)) / (2·eps)`, two evaluations per parameter.
    Central,
}

/// Estimates the cost gradient by nudging every weight and bias in turn and
/// re-evaluating the full cost.
///
/// Parameters are visited layer by layer, weights before biases, row-major;
/// each one is restored before the next is touched, so `net` ends with its
/// original parameters. Costs `O(params · N · forward)`; meant as an oracle
/// for [`backprop`](crate::grad::backprop::backprop), not for training.
pub fn finite_difference<'a, 'b>(
    net: &mut Network,
    grad: &mut Network,
    eps: f64,
    scheme: DifferenceScheme,
    ti: impl Into<MatrixView<'a>>,
    to: impl Into<MatrixView<'b>>,
) {
    let (ti, to) = (ti.into(), to.into());
    net.check_paired(grad);
    check_training_pair(net, &ti, &to);

    let base = match scheme {
        DifferenceScheme::Forward => Some(cost(net, ti, to)),
        DifferenceScheme::Central => None,
    };

    for layer in 0..net.layer_count() {
        for kind in ParamKind::ALL {
            let (rows, cols) = net.params(layer, kind).shape();
            for j in 0..rows {
                for k in 0..cols {
                    let saved = net.params(layer, kind)[(j, k)];

                    net.params_mut(layer, kind)[(j, k)] = saved + eps;
                    let plus = cost(net, ti, to);

                    let slope = match base {
                        Some(c0) => (plus - c0) / eps,
                        None => {
                            net.params_mut(layer, kind)[(j, k)] = saved - eps;
                            let minus = cost(net, ti, to);
                            (plus - minus) / (2.0 * eps)
                        }
                    };

                    grad.params_mut(layer, kind)[(j, k)] = slope;
                    net.params_mut(layer, kind)[(j, k)] = saved;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::Matrix;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn restores_parameters() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut net = Network::alloc(&[2, 3, 1]);
        net.randomise(&mut rng, -1.0, 1.0);
        let before = net.clone();
        let mut grad = net.alloc_like();
        let t = Matrix::from_data(vec![vec![0.0, 1.0, 1.0], vec![1.0, 1.0, 0.0]]);
        finite_difference(&mut net, &mut grad, 1e-3, DifferenceScheme::Central, t.columns(0, 2), t.columns(2, 1));
        for layer in 0..net.layer_count() {
            for kind in ParamKind::ALL {
                assert_eq!(net.params(layer, kind), before.params(layer, kind));
            }
        }
    }

    #[test]
    fn single_bias_slope_matches_closed_form() {
        // One sigmoid unit with zero weight: a = σ(b), C = (a - y)², dC/db = 2(a - y)·a(1 - a).
        let mut net = Network::alloc(&[1, 1]);
        net.params_mut(0, ParamKind::Biases)[(0, 0)] = 0.3;
        let mut grad = net.alloc_like();
        let ti = Matrix::from_data(vec![vec![0.0]]);
        let to = Matrix::from_data(vec![vec![1.0]]);
        finite_difference(&mut net, &mut grad, 1e-5, DifferenceScheme::Central, &ti, &to);

        let a = 1.0 / (1.0 + (-0.3f64).exp());
        let expected = 2.0 * (a - 1.0) * a * (1.0 - a);
        assert_abs_diff_eq!(grad.biases(0)[(0, 0)], expected, epsilon = 1e-8);
        // Input is zero, so the weight has no effect on the cost.
        assert_abs_diff_eq!(grad.weights(0)[(0, 0)], 0.0, epsilon = 1e-12);
    }
}
