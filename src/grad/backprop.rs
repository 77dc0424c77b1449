use crate::activation::sigmoid::sigmoid_derivative;
use crate::loss::mse::{check_training_pair, MseLoss};
use crate::math::matrix::Matrix;
use crate::math::view::MatrixView;
use crate::network::network::{Network, ParamKind};

/// Computes the mean cost gradient over all training rows by reverse-mode
/// differentiation through the sigmoid layers, writing it into `grad`.
///
/// For each row the forward pass fills `net`'s activations, then error
/// signals (`∂C/∂z` per unit) are pushed from the output layer back to the
/// first hidden layer and accumulated into `grad`. The sum is divided by the
/// row count at the end, matching [`cost`](crate::loss::mse::cost).
pub fn backprop<'a, 'b>(
    net: &mut Network,
    grad: &mut Network,
    ti: impl Into<MatrixView<'a>>,
    to: impl Into<MatrixView<'b>>,
) {
    let (ti, to) = (ti.into(), to.into());
    net.check_paired(grad);
    check_training_pair(net, &ti, &to);

    let n = ti.rows();
    let layers = net.layer_count();
    grad.zero();

    // deltas[l] holds the error signal of activation l + 1.
    let mut deltas: Vec<Matrix> = (1..=layers)
        .map(|l| Matrix::zeros(1, net.activation(l).cols()))
        .collect();

    for ex in 0..n {
        net.input_mut().copy_from(ti.row(ex));
        net.forward();

        // Output layer: dC/da composed with the sigmoid derivative.
        {
            let out = net.output().row_slice(0);
            let dc_da = MseLoss::derivative(out, to.row_slice(ex));
            let delta = deltas[layers - 1].row_slice_mut(0);
            for ((d, g), &a) in delta.iter_mut().zip(dc_da).zip(out) {
                *d = g * sigmoid_derivative(a);
            }
        }

        // Hidden layers, last to first.
        for l in (1..layers).rev() {
            let (lower, upper) = deltas.split_at_mut(l);
            let next = upper[0].row_slice(0);
            let cur = lower[l - 1].row_slice_mut(0);
            let w = net.weights(l);
            let a_prev = net.activation(l).row_slice(0);
            for (j, d) in cur.iter_mut().enumerate() {
                let back: f64 = next.iter().enumerate().map(|(k, &dk)| dk * w[(j, k)]).sum();
                *d = back * sigmoid_derivative(a_prev[j]);
            }
        }

        for (l, delta) in deltas.iter().enumerate() {
            let a_prev = net.activation(l).row_slice(0);
            let delta = delta.row_slice(0);

            let gw = grad.params_mut(l, ParamKind::Weights);
            for (j, &a) in a_prev.iter().enumerate() {
                for (k, &d) in delta.iter().enumerate() {
                    gw[(j, k)] += a * d;
                }
            }

            let gb = grad.params_mut(l, ParamKind::Biases);
            for (k, &d) in delta.iter().enumerate() {
                gb[(0, k)] += d;
            }
        }
    }

    let inv_n = 1.0 / n as f64;
    for m in grad.param_matrices_mut() {
        m.scale(inv_n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grad::finite_difference::{finite_difference, DifferenceScheme};
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn assert_gradients_close(a: &Network, b: &Network, tol: f64) {
        for layer in 0..a.layer_count() {
            for kind in ParamKind::ALL {
                for (x, y) in a.params(layer, kind).values().zip(b.params(layer, kind).values()) {
                    assert_abs_diff_eq!(x, y, epsilon = tol);
                }
            }
        }
    }

    #[test]
    fn deep_network_matches_central_difference() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut net = Network::alloc(&[3, 5, 4, 2]);
        net.randomise(&mut rng, -1.0, 1.0);
        let mut t = Matrix::zeros(6, 5);
        t.randomise(&mut rng, 0.0, 1.0);
        let (ti, to) = (t.columns(0, 3), t.columns(3, 2));

        let mut analytic = net.alloc_like();
        let mut numeric = net.alloc_like();
        backprop(&mut net, &mut analytic, ti, to);
        finite_difference(&mut net, &mut numeric, 1e-5, DifferenceScheme::Central, ti, to);

        assert_gradients_close(&analytic, &numeric, 1e-7);
    }

    #[test]
    fn stale_gradient_is_cleared() {
        let mut net = Network::alloc(&[1, 1]);
        let mut grad = net.alloc_like();
        grad.params_mut(0, ParamKind::Weights).fill(42.0);
        let ti = Matrix::from_data(vec![vec![0.0]]);
        let to = Matrix::from_data(vec![vec![0.5]]);
        backprop(&mut net, &mut grad, &ti, &to);
        assert_eq!(grad.weights(0)[(0, 0)], 0.0);
        assert_eq!(grad.biases(0)[(0, 0)], 0.0);
    }

    #[test]
    fn owned_and_borrowed_training_data_agree() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut net = Network::alloc(&[2, 3, 1]);
        net.randomise(&mut rng, -1.0, 1.0);
        let ti = Matrix::from_data(vec![vec![0.0, 1.0], vec![1.0, 1.0]]);
        let to = Matrix::from_data(vec![vec![1.0], vec![0.0]]);
        let t = Matrix::from_data(vec![vec![0.0, 1.0, 1.0], vec![1.0, 1.0, 0.0]]);

        let mut from_owned = net.alloc_like();
        let mut from_views = net.alloc_like();
        backprop(&mut net, &mut from_owned, &ti, &to);
        backprop(&mut net, &mut from_views, t.columns(0, 2), t.columns(2, 1));
        assert_gradients_close(&from_owned, &from_views, 0.0);

        let mut numeric = net.alloc_like();
        finite_difference(&mut net, &mut numeric, 1e-5, DifferenceScheme::Central, &ti, &to);
        assert_gradients_close(&from_owned, &numeric, 1e-7);
    }

    #[test]
    #[should_panic(expected = "different architectures")]
    fn unpaired_gradient_is_fatal() {
        let mut net = Network::alloc(&[2, 2, 1]);
        let mut grad = Network::alloc(&[2, 3, 1]);
        let t = Matrix::zeros(1, 3);
        backprop(&mut net, &mut grad, t.columns(0, 2), t.columns(2, 1));
    }
}
