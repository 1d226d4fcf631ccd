//! Errors for bin-edge construction and histogram inputs.

/// Result alias for binning operations that may produce [`BinningError`].
pub type BinningResult<T> = Result<T, BinningError>;

/// Error type for bin-edge validation and binned statistics.
#[derive(Debug, Clone, PartialEq)]
pub enum BinningError {
    /// Bin width must be finite and > 0.
    InvalidBinWidth { width: f64 },

    /// Range bounds must be finite with low < high.
    InvalidRange { low: f64, high: f64 },

    /// At least two edges are needed to define one bin.
    TooFewEdges { len: usize },

    /// Edges must be finite and strictly increasing.
    NonIncreasingEdges { index: usize, value: f64 },

    /// Paired inputs (x, y) must have equal length.
    LengthMismatch { x_len: usize, y_len: usize },
}

impl std::error::Error for BinningError {}

impl std::fmt::Display for BinningError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinningError::InvalidBinWidth { width } => {
                write!(f, "Bin width must be finite and > 0; got: {width}")
            }
            BinningError::InvalidRange { low, high } => {
                write!(f, "Bin range must be finite with low < high; got: [{low}, {high}]")
            }
            BinningError::TooFewEdges { len } => {
                write!(f, "At least two bin edges are required; got: {len}")
            }
            BinningError::NonIncreasingEdges { index, value } => {
                write!(
                    f,
                    "Bin edges must be finite and strictly increasing; edge {index} is {value}"
                )
            }
            BinningError::LengthMismatch { x_len, y_len } => {
                write!(f, "Paired inputs must have equal length: x has {x_len}, y has {y_len}")
            }
        }
    }
}
