pub mod backprop;
pub mod finite_difference;
pub mod method;

pub use backprop::backprop;
pub use finite_difference::{finite_difference, DifferenceScheme};
pub use method::GradientMethod;
