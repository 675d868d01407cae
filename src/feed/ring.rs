//! # Module: Bounded Ring Buffer
//!
//! ## Responsibility
//! Fixed-capacity history of samples backing sparklines and per-channel
//! trend charts. Insertion order is the only order.
//!
//! ## Guarantees
//! - `len() <= capacity()` after every operation
//! - Pushing at capacity evicts exactly one element, the oldest
//! - `push` never fails and never panics

use std::collections::VecDeque;

use serde::Serialize;

/// Fixed-capacity FIFO history. The oldest sample is evicted on overflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingBuffer<T> {
    items: VecDeque<T>,
    #[serde(skip)]
    capacity: usize,
}

impl<T> RingBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` samples.
    ///
    /// A capacity of zero is normalised to one so that the most recent
    /// sample is always observable.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(value);
    }

    /// Iterates samples from oldest to newest.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        self.items.iter()
    }

    /// Most recent sample, if any.
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of samples retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every sample; capacity is unchanged.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Copies the samples into a `Vec`, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl RingBuffer<f64> {
    /// Smallest and largest sample, or `None` when empty.
    ///
    /// NaN samples are ignored.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.items
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

impl<T> Extend<T> for RingBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}
