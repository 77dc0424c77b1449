pub mod generators;
pub mod image;
pub mod mat_file;
pub mod training_set;

pub use generators::{adder, bits_to_number, threshold, xor};
pub use self::image::{image_field, render_field, save_field_png};
pub use training_set::TrainingSet;
