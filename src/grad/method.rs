use serde::{Deserialize, Serialize};

use crate::grad::backprop::backprop;
use crate::grad::finite_difference::{finite_difference, DifferenceScheme};
use crate::math::view::MatrixView;
use crate::network::network::Network;

/// Selects which engine fills the gradient network on every training step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradientMethod {
    #[default]
    Backprop,
    FiniteDifference {
        eps: f64,
        #[serde(default)]
        scheme: DifferenceScheme,
    },
}

impl GradientMethod {
    /// Overwrites `grad` with the cost gradient of `net` on `(ti, to)`.
    pub fn compute(&self, net: &mut Network, grad: &mut Network, ti: MatrixView<'_>, to: MatrixView<'_>) {
        match *self {
            GradientMethod::Backprop => backprop(net, grad, ti, to),
            GradientMethod::FiniteDifference { eps, scheme } => {
                finite_difference(net, grad, eps, scheme, ti, to)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_tagged() {
        let m: GradientMethod = serde_json::from_str(r#"{"type":"finite_difference","eps":0.01}"#).unwrap();
        assert_eq!(m, GradientMethod::FiniteDifference { eps: 0.01, scheme: DifferenceScheme::Forward });
        let b: GradientMethod = serde_json::from_str(r#"{"type":"backprop"}"#).unwrap();
        assert_eq!(b, GradientMethod::Backprop);
    }
}
