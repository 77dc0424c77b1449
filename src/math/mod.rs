pub mod matrix;
pub mod view;

pub use matrix::Matrix;
pub use view::MatrixView;
