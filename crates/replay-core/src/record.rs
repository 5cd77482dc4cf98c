//! Record shapes
//!
//! Records are opaque fixed-shape numeric blocks. The buffer never looks at
//! their contents, only at the extent of each axis.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BufferError, Result};

/// Extent of every axis of a record, outermost first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordShape(Vec<usize>);

impl RecordShape {
    /// Create a shape from axis lengths
    #[must_use]
    pub fn new(dims: Vec<usize>) -> Self {
        Self(dims)
    }

    /// Axis lengths
    #[must_use]
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of axes
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Number of scalar elements in one record
    #[must_use]
    pub fn num_elements(&self) -> usize {
        self.0.iter().product()
    }

    /// Whether a record with the given axis lengths fits this shape
    #[must_use]
    pub fn matches(&self, dims: &[usize]) -> bool {
        self.0 == dims
    }

    /// Fail with [`BufferError::ShapeMismatch`] unless `dims` fits this shape
    pub fn check(&self, dims: &[usize]) -> Result<()> {
        if self.matches(dims) {
            Ok(())
        } else {
            Err(BufferError::ShapeMismatch {
                expected: self.clone(),
                actual: RecordShape::from(dims),
            })
        }
    }

    /// Fail unless this shape has `ndim` axes. `None` accepts any rank.
    pub fn check_rank(&self, ndim: Option<usize>) -> Result<()> {
        match ndim {
            Some(n) if n != self.ndim() => Err(BufferError::InvalidConfiguration(format!(
                "record shape {self} has {} axes but records have {n}",
                self.ndim()
            ))),
            _ => Ok(()),
        }
    }
}

impl From<Vec<usize>> for RecordShape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl From<&[usize]> for RecordShape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for RecordShape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl fmt::Display for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}
