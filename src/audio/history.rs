//! Grow-only sample history shared between the audio callback and the render loop.
//!
//! The buffer is always treated as full: every append shifts the oldest bytes
//! out of the front and writes the new block at the tail, so the most recent
//! samples always sit at the end of the store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::HistoryError;

/// Size of one stored sample (mono f32)
pub const SAMPLE_BYTES: usize = std::mem::size_of::<f32>();

/// Allocate `len` zeroed bytes, reporting failure instead of aborting.
fn zeroed_storage(len: usize) -> Result<Vec<u8>, HistoryError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| HistoryError::Allocation { requested: len })?;
    data.resize(len, 0);
    Ok(data)
}

/// Fixed-window byte store, overwritten from the tail
#[derive(Debug)]
pub struct HistoryBuffer {
    data: Vec<u8>,
}

impl HistoryBuffer {
    /// Create a zero-filled buffer of `capacity` bytes
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        Ok(Self {
            data: zeroed_storage(capacity)?,
        })
    }

    /// Capacity in bytes
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Capacity in whole samples
    pub fn capacity_samples(&self) -> usize {
        self.data.len() / SAMPLE_BYTES
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Grow to `capacity` bytes, keeping the newest content at the tail.
    ///
    /// Requests at or below the current capacity are ignored. Returns whether
    /// the buffer grew.
    pub fn resize(&mut self, capacity: usize) -> Result<bool, HistoryError> {
        let old = self.data.len();
        if capacity <= old {
            return Ok(false);
        }
        let grow = capacity - old;
        self.data
            .try_reserve_exact(grow)
            .map_err(|_| HistoryError::Allocation {
                requested: capacity,
            })?;
        self.data.resize(capacity, 0);
        self.data.copy_within(0..old, grow);
        self.data[..grow].fill(0);
        Ok(true)
    }

    /// Replace the store with a larger pre-zeroed one, copying the tail across.
    fn adopt(&mut self, mut storage: Vec<u8>) {
        let old = self.data.len();
        if storage.len() <= old {
            return;
        }
        let offset = storage.len() - old;
        storage[offset..].copy_from_slice(&self.data);
        self.data = storage;
    }

    /// Drop the oldest `len` bytes and return the freed tail region.
    fn shift_out(&mut self, len: usize) -> Result<&mut [u8], HistoryError> {
        let capacity = self.data.len();
        if len > capacity {
            return Err(HistoryError::Overflow {
                requested: len,
                capacity,
            });
        }
        self.data.copy_within(len.., 0);
        Ok(&mut self.data[capacity - len..])
    }

    /// Append raw bytes, evicting the same amount from the front
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), HistoryError> {
        let tail = self.shift_out(bytes.len())?;
        tail.copy_from_slice(bytes);
        Ok(())
    }

    /// Append samples without allocating.
    pub fn push_samples<I>(&mut self, samples: I) -> Result<(), HistoryError>
    where
        I: ExactSizeIterator<Item = f32>,
    {
        let tail = self.shift_out(samples.len() * SAMPLE_BYTES)?;
        for (slot, sample) in tail.chunks_exact_mut(SAMPLE_BYTES).zip(samples) {
            slot.copy_from_slice(&sample.to_ne_bytes());
        }
        Ok(())
    }

    /// Copy the most recent `dest.len()` bytes into `dest`
    pub fn snapshot_into(&self, dest: &mut [u8]) -> Result<(), HistoryError> {
        let capacity = self.data.len();
        if dest.len() > capacity {
            return Err(HistoryError::Overflow {
                requested: dest.len(),
                capacity,
            });
        }
        dest.copy_from_slice(&self.data[capacity - dest.len()..]);
        Ok(())
    }
}

/// Handle to the history shared by the producer and the consumer
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<HistoryBuffer>>,
}

impl SharedHistory {
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        Ok(Self {
            inner: Arc::new(Mutex::new(HistoryBuffer::new(capacity)?)),
        })
    }

    /// Lock the buffer for the lifetime of the returned guard.
    ///
    /// A producer that panicked while holding the lock leaves the data in a
    /// valid state (every write is a plain byte copy), so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, HistoryBuffer> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn capacity_samples(&self) -> usize {
        self.lock().capacity_samples()
    }

    pub fn append(&self, bytes: &[u8]) -> Result<(), HistoryError> {
        self.lock().append(bytes)
    }

    pub fn snapshot_into(&self, dest: &mut [u8]) -> Result<(), HistoryError> {
        self.lock().snapshot_into(dest)
    }

    /// Make sure the buffer holds at least `window_frames * quality` samples.
    ///
    /// New storage is allocated before the lock is taken, so the producer only
    /// ever waits for the tail copy. Must be called from a single thread (the
    /// render loop); returns whether the buffer grew.
    pub fn ensure_window(&self, window_frames: usize, quality: usize) -> Result<bool, HistoryError> {
        let required = window_frames
            .checked_mul(quality)
            .and_then(|samples| samples.checked_mul(SAMPLE_BYTES))
            .ok_or(HistoryError::Allocation {
                requested: usize::MAX,
            })?;
        if self.capacity() >= required {
            return Ok(false);
        }
        let storage = zeroed_storage(required)?;
        self.lock().adopt(storage);
        Ok(true)
    }
}
