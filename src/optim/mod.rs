pub mod sgd;

pub use sgd::{learn, Sgd};
