//! Error types for replay buffers

use thiserror::Error;

use crate::RecordShape;

/// Core error type for replay buffer operations
#[derive(Error, Debug)]
pub enum BufferError {
    /// Buffer could not be constructed from the given settings
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Record shape differs from the shape fixed for this buffer
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Shape every record in the buffer must have
        expected: RecordShape,
        /// Shape of the offending record
        actual: RecordShape,
    },

    /// Sample requested with a count of zero
    #[error("Invalid sample size: {0} (must be at least 1)")]
    InvalidSampleSize(usize),

    /// Stack axis outside `0..=ndim`
    #[error("Invalid stack axis {axis} for records with {ndim} dimensions")]
    InvalidAxis {
        /// Requested axis
        axis: usize,
        /// Dimensionality of the stored records
        ndim: usize,
    },

    /// Stacking sampled records failed
    #[error("Stack error: {0}")]
    Stack(#[from] ndarray::ShapeError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for replay buffer operations
pub type Result<T> = std::result::Result<T, BufferError>;
