//! Shared buffer handle for producer and consumer tasks
//!
//! [`BoundedSamplingBuffer`] has no internal locking. `SharedBuffer` wraps it
//! in a mutex held for the whole of each operation, so a producer task and
//! any number of consumer tasks can use it concurrently.

use ndarray::{Array, Axis, Dimension, RemoveAxis};
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;

use replay_core::Result;

use crate::{BoundedSamplingBuffer, Sampled};

/// Cloneable, mutex-guarded handle to a [`BoundedSamplingBuffer`]
pub struct SharedBuffer<A, D: Dimension, R = StdRng> {
    inner: Arc<Mutex<BoundedSamplingBuffer<A, D, R>>>,
}

impl<A, D: Dimension, R> Clone for SharedBuffer<A, D, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, D: Dimension, R> From<BoundedSamplingBuffer<A, D, R>> for SharedBuffer<A, D, R> {
    fn from(buffer: BoundedSamplingBuffer<A, D, R>) -> Self {
        Self::new(buffer)
    }
}

impl<A, D: Dimension, R> SharedBuffer<A, D, R> {
    /// Take ownership of a buffer for shared use
    #[must_use]
    pub fn new(buffer: BoundedSamplingBuffer<A, D, R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    /// Current number of stored records
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Check if buffer is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Run `f` with exclusive access to the buffer
    pub async fn with_buffer<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut BoundedSamplingBuffer<A, D, R>) -> T,
    {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}

impl<A, D, R> SharedBuffer<A, D, R>
where
    A: Clone,
    D: Dimension,
    R: Rng,
{
    /// See [`BoundedSamplingBuffer::insert`]
    pub async fn insert(&self, records: &[Array<A, D>]) -> Result<bool> {
        self.inner.lock().await.insert(records)
    }

    /// See [`BoundedSamplingBuffer::insert_batch`]
    pub async fn insert_batch(&self, batch: &Array<A, D::Larger>) -> Result<bool>
    where
        D::Larger: RemoveAxis + Dimension<Smaller = D>,
    {
        self.inner.lock().await.insert_batch(batch)
    }

    /// See [`BoundedSamplingBuffer::sample`]
    pub async fn sample(&self, count: usize, remove: bool) -> Result<Option<Sampled<A, D>>> {
        self.inner.lock().await.sample(count, remove)
    }

    /// See [`BoundedSamplingBuffer::sample_along`]
    pub async fn sample_along(
        &self,
        count: usize,
        remove: bool,
        stack_axis: Axis,
    ) -> Result<Option<Sampled<A, D>>> {
        self.inner.lock().await.sample_along(count, remove, stack_axis)
    }
}
