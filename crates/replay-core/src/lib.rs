//! Core types for bounded replay buffers
//!
//! This crate provides the pieces shared by every buffer implementation:
//! the error taxonomy, the fixed record shape, and the serializable
//! buffer configuration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod record;

// Re-export core types
pub use config::BufferConfig;
pub use error::{BufferError, Result};
pub use record::RecordShape;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{BufferConfig, BufferError, RecordShape, Result};
}
