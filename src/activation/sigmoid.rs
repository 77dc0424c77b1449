/// Logistic sigmoid, `1 / (1 + e^-x)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Derivative of the sigmoid written in terms of its own output `a = σ(z)`:
/// `σ'(z) = a·(1 - a)`.
///
/// Backprop only keeps post-activation values, so this is the form it needs.
pub fn sigmoid_derivative(a: f64) -> f64 {
    a * (1.0 - a)
}
