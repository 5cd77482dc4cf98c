//! Bounded FIFO buffer with uniform random sampling

use ndarray::{Array, ArrayBase, ArrayView, Axis, Data, Dimension, RemoveAxis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{vec_deque, VecDeque};

use replay_core::{BufferConfig, BufferError, RecordShape, Result};

use crate::Sampled;

/// Fixed-capacity store of fixed-shape records
///
/// Records are kept in arrival order. Once `capacity` records are held,
/// every new record first evicts the oldest one. Stored records are owned
/// copies, and every sample returns fresh copies, so neither side can
/// observe the other's mutations.
#[derive(Debug, Clone)]
pub struct BoundedSamplingBuffer<A, D: Dimension, R = StdRng> {
    /// Buffer storage, oldest first
    records: VecDeque<Array<A, D>>,
    /// Maximum capacity
    capacity: usize,
    /// Shape shared by all records, once known
    record_shape: Option<RecordShape>,
    /// Source of sampling randomness
    rng: R,
}

impl<A, D: Dimension> BoundedSamplingBuffer<A, D, StdRng> {
    /// Create a buffer with an entropy-seeded RNG
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    /// Create a buffer whose sampling is reproducible from `seed`
    pub fn seeded(capacity: usize, seed: u64) -> Result<Self> {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }

    /// Create a buffer from a configuration
    ///
    /// A declared `record_shape` is enforced from the first insert on and
    /// must have as many axes as `D`.
    pub fn from_config(config: &BufferConfig) -> Result<Self> {
        config.validate()?;
        if let Some(shape) = &config.record_shape {
            shape.check_rank(D::NDIM)?;
        }

        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let mut buffer = Self::with_rng(config.capacity, rng)?;
        buffer.record_shape.clone_from(&config.record_shape);
        Ok(buffer)
    }
}

impl<A, D: Dimension, R> BoundedSamplingBuffer<A, D, R> {
    /// Create a buffer drawing samples from `rng`
    ///
    /// Fails with [`BufferError::InvalidConfiguration`] if `capacity` is zero.
    pub fn with_rng(capacity: usize, rng: R) -> Result<Self> {
        if capacity == 0 {
            return Err(BufferError::InvalidConfiguration(
                "capacity must be a positive integer".to_string(),
            ));
        }

        tracing::debug!(capacity, "created replay buffer");
        Ok(Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
            record_shape: None,
            rng,
        })
    }

    /// Get the current number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records held at once
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shape every record must have, once declared or first inserted
    #[must_use]
    pub fn record_shape(&self) -> Option<&RecordShape> {
        self.record_shape.as_ref()
    }

    /// Stored records, oldest first
    pub fn iter(&self) -> vec_deque::Iter<'_, Array<A, D>> {
        self.records.iter()
    }

    #[allow(clippy::cast_precision_loss)]
    fn publish_size(&self) {
        metrics::gauge!("replay_buffer.size", self.records.len() as f64);
    }
}

impl<A, D, R> BoundedSamplingBuffer<A, D, R>
where
    A: Clone,
    D: Dimension,
    R: Rng,
{
    /// Insert records in order, evicting the oldest when full
    ///
    /// Returns `true` if at least one record was evicted during this call.
    /// An empty input is a no-op returning `false`.
    ///
    /// All records are checked against the buffer's shape before any is
    /// stored; on [`BufferError::ShapeMismatch`] the buffer is unchanged.
    /// The first accepted record fixes the shape if none was declared.
    pub fn insert<'a, I>(&mut self, records: I) -> Result<bool>
    where
        A: 'a,
        I: IntoIterator,
        I::Item: Into<ArrayView<'a, A, D>>,
    {
        let views: Vec<ArrayView<'a, A, D>> = records.into_iter().map(Into::into).collect();
        let Some(first) = views.first() else {
            return Ok(false);
        };

        let expected = self
            .record_shape
            .clone()
            .unwrap_or_else(|| RecordShape::from(first.shape()));
        for view in &views {
            expected.check(view.shape())?;
        }
        if self.record_shape.is_none() {
            self.record_shape = Some(expected);
        }

        let inserted = views.len();
        let mut evicted = 0usize;
        for view in views {
            if self.records.len() >= self.capacity {
                self.records.pop_front();
                evicted += 1;
            }
            self.records.push_back(view.to_owned());
        }

        if evicted > 0 {
            tracing::debug!(evicted, size = self.records.len(), "evicted oldest records");
            metrics::counter!("replay_buffer.evicted", evicted as u64);
        }
        tracing::trace!(inserted, evicted, size = self.records.len(), "inserted records");
        metrics::counter!("replay_buffer.inserted", inserted as u64);
        self.publish_size();

        Ok(evicted > 0)
    }

    /// Insert every record of a stacked batch, split along axis 0
    pub fn insert_batch<S>(&mut self, batch: &ArrayBase<S, D::Larger>) -> Result<bool>
    where
        S: Data<Elem = A>,
        D::Larger: RemoveAxis + Dimension<Smaller = D>,
    {
        self.insert(batch.outer_iter())
    }

    /// Draw up to `count` distinct records, stacked along axis 0
    ///
    /// See [`sample_along`](Self::sample_along).
    pub fn sample(&mut self, count: usize, remove: bool) -> Result<Option<Sampled<A, D>>> {
        self.sample_along(count, remove, Axis(0))
    }

    /// Draw up to `count` distinct records uniformly at random
    ///
    /// Returns `Ok(None)` when the buffer is empty. Otherwise
    /// `min(count, len)` records are chosen without replacement. A request
    /// for exactly one record yields [`Sampled::Single`]; larger requests
    /// yield [`Sampled::Batch`] with the records stacked along `stack_axis`.
    ///
    /// With `remove` set, the chosen records are deleted from the buffer.
    /// Returned arrays are always fresh copies.
    ///
    /// Fails with [`BufferError::InvalidSampleSize`] if `count` is zero and
    /// [`BufferError::InvalidAxis`] if `stack_axis` exceeds the record rank;
    /// neither changes the buffer.
    pub fn sample_along(
        &mut self,
        count: usize,
        remove: bool,
        stack_axis: Axis,
    ) -> Result<Option<Sampled<A, D>>> {
        if count == 0 {
            return Err(BufferError::InvalidSampleSize(count));
        }

        let size = self.records.len();
        if size == 0 {
            tracing::trace!(requested = count, "sampled empty buffer");
            return Ok(None);
        }

        let ndim = self.records[0].ndim();
        if count > 1 && stack_axis.index() > ndim {
            return Err(BufferError::InvalidAxis {
                axis: stack_axis.index(),
                ndim,
            });
        }

        let amount = count.min(size);
        let indices = rand::seq::index::sample(&mut self.rng, size, amount).into_vec();

        let sampled = if count == 1 {
            Sampled::Single(self.records[indices[0]].clone())
        } else {
            let views: Vec<ArrayView<'_, A, D>> =
                indices.iter().map(|&i| self.records[i].view()).collect();
            Sampled::Batch(ndarray::stack(stack_axis, &views)?)
        };

        if remove {
            // descending so earlier removals don't shift later indices
            let mut descending = indices;
            descending.sort_unstable_by(|a, b| b.cmp(a));
            for index in descending {
                self.records.remove(index);
            }
            metrics::counter!("replay_buffer.removed", amount as u64);
            self.publish_size();
        }

        tracing::trace!(requested = count, returned = amount, remove, size = self.records.len(), "sampled records");
        metrics::counter!("replay_buffer.sampled", amount as u64);

        Ok(Some(sampled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array1, Ix1};

    type Buffer = BoundedSamplingBuffer<f32, Ix1>;

    fn record(v: f32) -> Array1<f32> {
        arr1(&[v, v * 10.0])
    }

    fn firsts(buffer: &Buffer) -> Vec<f32> {
        buffer.iter().map(|r| r[0]).collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            Buffer::seeded(0, 1),
            Err(BufferError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_single_inserts_evict_fifo() {
        let mut buffer = Buffer::seeded(3, 1).unwrap();

        assert!(!buffer.insert([&record(1.0)]).unwrap());
        assert!(!buffer.insert([&record(2.0)]).unwrap());
        assert!(!buffer.insert([&record(3.0)]).unwrap());
        assert!(buffer.insert([&record(4.0)]).unwrap());

        assert_eq!(buffer.len(), 3);
        assert_eq!(firsts(&buffer), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_oversized_batch_keeps_tail() {
        let mut buffer = Buffer::seeded(3, 1).unwrap();
        let batch: Vec<_> = (1..=5).map(|v| record(v as f32)).collect();

        assert!(buffer.insert(&batch).unwrap());
        assert_eq!(firsts(&buffer), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_empty_insert_is_noop() {
        let mut buffer = Buffer::seeded(3, 1).unwrap();
        let empty: Vec<Array1<f32>> = Vec::new();

        assert!(!buffer.insert(&empty).unwrap());
        assert!(buffer.is_empty());
        assert!(buffer.record_shape().is_none());
    }

    #[test]
    fn test_insert_batch_splits_outer_axis() {
        let mut buffer = Buffer::seeded(4, 1).unwrap();
        let batch = arr2(&[[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]]);

        assert!(!buffer.insert_batch(&batch).unwrap());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.iter().nth(1), Some(&record(2.0)));
        assert_eq!(buffer.record_shape(), Some(&RecordShape::from([2])));
    }

    #[test]
    fn test_shape_mismatch_rejects_whole_call() {
        let mut buffer = Buffer::seeded(4, 1).unwrap();
        buffer.insert([&record(1.0)]).unwrap();

        let err = buffer
            .insert([&record(2.0), &arr1(&[1.0_f32, 2.0, 3.0])])
            .unwrap_err();

        assert!(matches!(err, BufferError::ShapeMismatch { .. }));
        assert_eq!(firsts(&buffer), vec![1.0]);
    }

    #[test]
    fn test_shape_stays_locked_after_drain() {
        let mut buffer = Buffer::seeded(2, 1).unwrap();
        buffer.insert([&record(1.0)]).unwrap();
        buffer.sample(1, true).unwrap();
        assert!(buffer.is_empty());

        assert!(buffer.insert([&arr1(&[1.0_f32])]).is_err());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_declared_shape_from_config() {
        let config = BufferConfig::new(8).with_seed(3).with_record_shape([2]);
        let mut buffer = Buffer::from_config(&config).unwrap();

        assert_eq!(buffer.capacity(), 8);
        assert!(buffer.insert([&arr1(&[1.0_f32, 2.0, 3.0])]).is_err());
        assert!(buffer.insert([&record(1.0)]).is_ok());
    }

    #[test]
    fn test_config_rank_mismatch() {
        let config = BufferConfig::new(8).with_record_shape([2, 2]);

        assert!(matches!(
            Buffer::from_config(&config),
            Err(BufferError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_sample_empty_returns_none() {
        let mut buffer = Buffer::seeded(3, 1).unwrap();

        assert!(buffer.sample(1, false).unwrap().is_none());
        assert!(buffer.sample(4, true).unwrap().is_none());
    }

    #[test]
    fn test_sample_zero_rejected() {
        let mut buffer = Buffer::seeded(3, 1).unwrap();
        buffer.insert([&record(1.0)]).unwrap();

        assert!(matches!(
            buffer.sample(0, true),
            Err(BufferError::InvalidSampleSize(0))
        ));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_single_and_batch_shapes() {
        let mut buffer = Buffer::seeded(5, 9).unwrap();
        let batch: Vec<_> = (1..=5).map(|v| record(v as f32)).collect();
        buffer.insert(&batch).unwrap();

        let single = buffer.sample(1, false).unwrap().unwrap();
        assert_eq!(single.into_single().unwrap().shape(), &[2]);

        let stacked = buffer.sample(3, false).unwrap().unwrap();
        assert_eq!(stacked.into_batch().unwrap().shape(), &[3, 2]);

        let along_last = buffer.sample_along(3, false, Axis(1)).unwrap().unwrap();
        assert_eq!(along_last.into_batch().unwrap().shape(), &[2, 3]);

        // larger than stored: clamps, still a batch
        let all = buffer.sample(10, false).unwrap().unwrap();
        assert_eq!(all.into_batch().unwrap().shape(), &[5, 2]);
    }

    #[test]
    fn test_invalid_axis_leaves_buffer() {
        let mut buffer = Buffer::seeded(3, 1).unwrap();
        buffer.insert([&record(1.0), &record(2.0)]).unwrap();

        assert!(matches!(
            buffer.sample_along(2, true, Axis(2)),
            Err(BufferError::InvalidAxis { axis: 2, ndim: 1 })
        ));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_remove_deletes_sampled_record() {
        let mut buffer = Buffer::seeded(3, 5).unwrap();
        buffer
            .insert([&record(1.0), &record(2.0), &record(3.0)])
            .unwrap();

        let taken = buffer.sample(1, true).unwrap().unwrap().into_single().unwrap();

        assert_eq!(buffer.len(), 2);
        assert!(!buffer.iter().any(|r| r == &taken));
    }

    #[test]
    fn test_seeded_sampling_is_reproducible() {
        let batch: Vec<_> = (0..50).map(|v| record(v as f32)).collect();
        let mut left = Buffer::seeded(50, 11).unwrap();
        let mut right = Buffer::seeded(50, 11).unwrap();
        left.insert(&batch).unwrap();
        right.insert(&batch).unwrap();

        for _ in 0..5 {
            assert_eq!(left.sample(8, true).unwrap(), right.sample(8, true).unwrap());
        }
        assert_eq!(firsts(&left), firsts(&right));
    }

    #[test]
    fn test_caller_mutation_does_not_leak() {
        let mut buffer = Buffer::seeded(2, 1).unwrap();
        let mut original = record(1.0);
        buffer.insert([&original]).unwrap();

        original.fill(-1.0);
        assert_eq!(buffer.iter().next(), Some(&record(1.0)));

        let mut sampled = buffer.sample(1, false).unwrap().unwrap().into_single().unwrap();
        sampled.fill(-2.0);
        assert_eq!(buffer.iter().next(), Some(&record(1.0)));
    }
}
