//! Bounded experience buffer for decoupling producers from consumers
//!
//! This crate provides:
//! - [`BoundedSamplingBuffer`], a fixed-capacity FIFO store of
//!   fixed-shape `ndarray` records with uniform sampling
//! - [`Sampled`], the single-or-stacked result of a sample call
//! - [`SharedBuffer`], a mutex-guarded handle for multi-task use

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod sample;
pub mod shared;

pub use buffer::BoundedSamplingBuffer;
pub use sample::Sampled;
pub use shared::SharedBuffer;

// Re-export core types
pub use replay_core::{BufferConfig, BufferError, RecordShape, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{BoundedSamplingBuffer, Sampled, SharedBuffer};
    pub use replay_core::prelude::*;
}
