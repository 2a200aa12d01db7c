use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    #[error("index ({row}, {col}) out of bounds for {n_row}x{n_col} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        n_row: usize,
        n_col: usize,
    },
    #[error("shape mismatch in {op}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },
    #[error("destination mismatch in {op}: expected {expected:?}, got {actual:?}")]
    DstMismatch {
        op: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("could not allocate a {n_row}x{n_col} matrix")]
    Allocation { n_row: usize, n_col: usize },

    #[error("bad checkpoint magic: expected {expected:#010x}, found {found:#010x}")]
    BadMagic { expected: u32, found: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
