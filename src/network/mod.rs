pub mod architecture;
pub mod network;
pub mod spec;

pub use architecture::Architecture;
pub use network::{Network, ParamKind};
pub use spec::{InitRange, NetworkSpec};
