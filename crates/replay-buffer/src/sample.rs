//! Sample results

use ndarray::{Array, Axis, Dimension};

/// Records drawn from a buffer
///
/// A request for exactly one record yields `Single`; any larger request
/// yields `Batch`, with the drawn records stacked along the requested axis
/// (even if fewer than requested were available).
#[derive(Debug, Clone, PartialEq)]
pub enum Sampled<A, D: Dimension> {
    /// One record
    Single(Array<A, D>),
    /// Records stacked along a new axis
    Batch(Array<A, D::Larger>),
}

impl<A, D: Dimension> Sampled<A, D> {
    /// Number of records drawn
    ///
    /// For a batch this is the length of `stack_axis`.
    #[must_use]
    pub fn len(&self, stack_axis: Axis) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(batch) => batch.len_of(stack_axis),
        }
    }

    /// Whether this holds a single record
    #[must_use]
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// The record, if exactly one was requested
    #[must_use]
    pub fn into_single(self) -> Option<Array<A, D>> {
        match self {
            Self::Single(record) => Some(record),
            Self::Batch(_) => None,
        }
    }

    /// The stacked records, if more than one was requested
    #[must_use]
    pub fn into_batch(self) -> Option<Array<A, D::Larger>> {
        match self {
            Self::Single(_) => None,
            Self::Batch(batch) => Some(batch),
        }
    }
}
