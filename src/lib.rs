pub mod error;
pub mod math;
pub mod activation;
pub mod network;
pub mod loss;
pub mod grad;
pub mod optim;
pub mod train;
pub mod data;

// Convenience re-exports
pub use error::{ContractViolation, Error, Result};
pub use math::matrix::Matrix;
pub use math::view::MatrixView;
pub use network::architecture::Architecture;
pub use network::network::Network;
pub use network::spec::NetworkSpec;
pub use loss::mse::{cost, MseLoss};
pub use grad::{backprop, finite_difference, DifferenceScheme, GradientMethod};
pub use optim::sgd::{learn, Sgd};
pub use train::{train_loop, TrainConfig, TrainSummary};
pub use data::TrainingSet;
