use crate::error::TeetailError;
use crate::utils::reserve_bytes;
use std::io::{self, Write};

/// Fixed-capacity circular buffer holding the last `capacity` bytes of a stream.
///
/// The write cursor is always `total_written % capacity`. Until the first
/// overwrite the retained bytes sit at `storage[..total_written]`; after
/// that the oldest byte is the one under the cursor.
///
/// Storage is reserved up front but only grows to `capacity` as bytes
/// arrive, so untouched pages are never committed.
pub struct TailBuffer {
    storage: Vec<u8>,
    capacity: usize,
    total_written: u64,
}

impl TailBuffer {
    pub fn new(capacity: usize) -> Result<Self, TeetailError> {
        if capacity == 0 {
            return Err(TeetailError::ZeroCapacity);
        }
        Ok(Self {
            storage: reserve_bytes(capacity)?,
            capacity,
            total_written: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Offset the next appended byte lands on.
    pub fn cursor(&self) -> usize {
        (self.total_written % self.capacity as u64) as usize
    }

    /// Bytes that can be appended before the cursor wraps back to zero.
    pub fn room_before_wrap(&self) -> usize {
        self.capacity - self.cursor()
    }

    pub fn len(&self) -> usize {
        self.total_written.min(self.capacity as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.total_written == 0
    }

    pub fn is_wrapped(&self) -> bool {
        self.total_written > self.capacity as u64
    }

    /// Appends `chunk`, overwriting the oldest bytes once full.
    ///
    /// The chunk may straddle the end of storage or be longer than the whole
    /// buffer; only its last `capacity` bytes can survive in that case.
    pub fn append(&mut self, chunk: &[u8]) {
        let capacity = self.capacity;
        self.total_written += chunk.len() as u64;

        if chunk.len() >= capacity {
            // The whole window is replaced; lay it out around the new cursor.
            let window = &chunk[chunk.len() - capacity..];
            let (older, newer) = window.split_at(capacity - self.cursor());
            self.storage.clear();
            self.storage.extend_from_slice(newer);
            self.storage.extend_from_slice(older);
            return;
        }

        let cursor = ((self.total_written - chunk.len() as u64) % capacity as u64) as usize;
        let head = chunk.len().min(capacity - cursor);
        let (before_wrap, after_wrap) = chunk.split_at(head);
        self.write_at(cursor, before_wrap);
        self.write_at(0, after_wrap);
    }

    /// Before the first fill `offset` is always the filled length, so the
    /// write either extends storage or lands entirely inside it.
    fn write_at(&mut self, offset: usize, bytes: &[u8]) {
        if offset == self.storage.len() {
            self.storage.extend_from_slice(bytes);
        } else {
            self.storage[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
    }

    /// The retained window as two slices, oldest first. The second slice is
    /// empty unless the window wraps around the end of storage.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        if self.is_wrapped() {
            let (newer, older) = self.storage.split_at(self.cursor());
            (older, newer)
        } else {
            (&self.storage[..self.len()], &[])
        }
    }

    /// The retained window copied out in chronological order.
    pub fn linearize(&self) -> Vec<u8> {
        let (older, newer) = self.as_slices();
        let mut result = Vec::with_capacity(self.len());
        result.extend_from_slice(older);
        result.extend_from_slice(newer);
        result
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let (older, newer) = self.as_slices();
        writer.write_all(older)?;
        writer.write_all(newer)?;
        writer.flush()
    }
}
