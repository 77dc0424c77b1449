use crate::network::network::Network;

/// Plain gradient descent: `p -= rate · g` for every weight and bias.
/// No momentum, no clipping, no schedule.
pub fn learn(net: &mut Network, grad: &Network, rate: f64) {
    net.check_paired(grad);
    for (p, g) in net.param_matrices_mut().zip(grad.param_matrices()) {
        p.add_scaled(g, -rate);
    }
}

pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update to `net` from a gradient of the same architecture.
    pub fn step(&self, net: &mut Network, grad: &Network) {
        learn(net, grad, self.learning_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::network::ParamKind;

    #[test]
    fn step_moves_against_the_gradient() {
        let mut net = Network::alloc(&[2, 1]);
        let mut grad = net.alloc_like();
        grad.params_mut(0, ParamKind::Weights)[(1, 0)] = 2.0;
        grad.params_mut(0, ParamKind::Biases)[(0, 0)] = -1.0;

        Sgd::new(0.5).step(&mut net, &grad);

        assert_eq!(net.weights(0)[(0, 0)], 0.0);
        assert_eq!(net.weights(0)[(1, 0)], -1.0);
        assert_eq!(net.biases(0)[(0, 0)], 0.5);
    }

    #[test]
    #[should_panic(expected = "different architectures")]
    fn learn_rejects_foreign_gradient() {
        let mut net = Network::alloc(&[2, 1]);
        let grad = Network::alloc(&[3, 1]);
        learn(&mut net, &grad, 0.1);
    }
}
