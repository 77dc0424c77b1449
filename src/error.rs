use thiserror::Error;

/// Result type for operations that can fail because of the environment
/// (files, images, user-supplied configuration).
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable errors. Everything in here comes from outside the process:
/// a missing file, a truncated matrix dump, a malformed spec.
#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Caller misuse of the numeric core: mismatched shapes, zero-sized buffers,
/// an empty training set, use of a released network.
///
/// These are never returned as values. `raise` panics with the diagnostic,
/// since the shapes involved are fixed by the architecture and a mismatch
/// means the calling code is wrong.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractViolation {
    #[error("zero-sized matrix {rows}x{cols} (stride {stride})")]
    ZeroSized { rows: usize, cols: usize, stride: usize },

    #[error("stride {stride} is smaller than column count {cols}")]
    StrideTooSmall { cols: usize, stride: usize },

    #[error("{op}: shape {left:?} does not fit {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("{op}: index {index} out of bounds for {len}")]
    OutOfBounds { op: &'static str, index: usize, len: usize },

    #[error("randomise: empty range [{low}, {high})")]
    EmptyRange { low: f64, high: f64 },

    #[error("architecture needs at least two layers, got {0}")]
    ArchitectureTooShort(usize),

    #[error("architecture has a zero-width layer at position {0}")]
    ZeroWidthLayer(usize),

    #[error("network and gradient were allocated from different architectures: {net:?} vs {grad:?}")]
    ArchitectureMismatch { net: Vec<usize>, grad: Vec<usize> },

    #[error("training set has no rows")]
    EmptyTrainingSet,

    #[error("network has already been released")]
    Released,
}

impl ContractViolation {
    #[track_caller]
    pub fn raise(self) -> ! {
        panic!("contract violation: {self}")
    }
}

/// Raises `$violation` unless `$cond` holds.
macro_rules! contract {
    ($cond:expr, $violation:expr) => {
        if !$cond {
            $crate::error::ContractViolation::raise($violation);
        }
    };
}

pub(crate) use contract;
