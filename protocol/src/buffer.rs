//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::{ProtocolError, ProtocolResult};

/// Backing storage for a [`ConnectionBuffer`].
enum Storage {
    /// Buffer-owned storage; capacity may grow.
    Owned(Vec<u8>),
    /// Caller-provided storage; capacity is fixed.
    External(Box<[u8]>),
}

impl Storage {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Owned(vec) => vec,
            Storage::External(boxed) => boxed,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Storage::Owned(vec) => vec,
            Storage::External(boxed) => boxed,
        }
    }
}

/// A linear byte buffer with head and tail cursors.
///
/// Inbound wire bytes are appended at the tail with [`put`] and consumed
/// from the head with [`get`] as complete frames are dispatched. Backing
/// memory is either buffer-owned - in which case capacity grows to the
/// next power of two at or above `max(requested, 2 x current)` - or
/// caller-provided, in which case any operation that would need to grow
/// fails with [`ProtocolError::BufferNotOwned`].
///
/// [`put`]: ConnectionBuffer::put
/// [`get`]: ConnectionBuffer::get
pub struct ConnectionBuffer {
    storage: Storage,
    head: usize,
    size: usize,
}

impl ConnectionBuffer {
    /// Creates an empty buffer with buffer-owned storage.
    pub fn new() -> Self {
        Self {
            storage: Storage::Owned(Vec::new()),
            head: 0,
            size: 0,
        }
    }

    /// Creates a buffer with buffer-owned storage of the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Storage::Owned(vec![0; capacity]),
            head: 0,
            size: 0,
        }
    }

    /// Creates a buffer over caller-provided backing. Capacity is fixed at
    /// the backing length.
    pub fn with_external(backing: Box<[u8]>) -> Self {
        Self {
            storage: Storage::External(backing),
            head: 0,
            size: 0,
        }
    }

    /// Returns whether the backing storage is buffer-owned.
    pub fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Returns the current capacity.
    pub fn capacity(&self) -> usize {
        self.storage.as_slice().len()
    }

    /// Returns the number of unconsumed bytes between head and tail.
    pub fn len(&self) -> usize {
        self.size - self.head
    }

    /// Returns whether no unconsumed bytes remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the unconsumed bytes without advancing the head.
    pub fn peek(&self) -> &[u8] {
        &self.storage.as_slice()[self.head..self.size]
    }

    /// Appends `src` at the tail, growing owned storage as needed.
    pub fn put(&mut self, src: &[u8]) -> ProtocolResult<()> {
        let needed = self.size + src.len();
        if needed > self.capacity() {
            self.grow(needed)?;
        }

        self.storage.as_mut_slice()[self.size..needed].copy_from_slice(src);
        self.size = needed;

        Ok(())
    }

    /// Advances the head by `count` bytes, returning the consumed region.
    pub fn get(&mut self, count: usize) -> ProtocolResult<&[u8]> {
        if count > self.len() {
            return Err(ProtocolError::Underflow {
                requested: count,
                available: self.len(),
            });
        }

        let start = self.head;
        self.head += count;

        Ok(&self.storage.as_slice()[start..start + count])
    }

    /// Explicitly sets the buffered size (used when the caller has written
    /// into the backing directly). Fails when `size` exceeds capacity.
    pub fn set_size(&mut self, size: usize) -> ProtocolResult<()> {
        if size > self.capacity() {
            return Err(ProtocolError::NoSpace {
                requested: size,
                capacity: self.capacity(),
            });
        }

        self.size = size;
        self.head = self.head.min(size);

        Ok(())
    }

    /// Grows owned storage to hold at least `capacity` bytes, preserving
    /// contents. Caller-provided backing fails with `BufferNotOwned`.
    pub fn reserve(&mut self, capacity: usize) -> ProtocolResult<()> {
        if capacity > self.capacity() {
            self.grow(capacity)?;
        }
        Ok(())
    }

    /// Discards all buffered data, retaining capacity.
    pub fn flush(&mut self) {
        self.head = 0;
        self.size = 0;
    }

    /// Moves the unconsumed region to the front of the backing so the dead
    /// prefix can be reused by subsequent puts.
    pub fn compact(&mut self) {
        if self.head == 0 {
            return;
        }

        let len = self.len();
        self.storage.as_mut_slice().copy_within(self.head..self.size, 0);
        self.head = 0;
        self.size = len;
    }

    fn grow(&mut self, requested: usize) -> ProtocolResult<()> {
        let Storage::Owned(vec) = &mut self.storage else {
            return Err(ProtocolError::BufferNotOwned);
        };

        let target = requested.max(vec.len() * 2).next_power_of_two();
        vec.resize(target, 0);

        Ok(())
    }
}

impl Default for ConnectionBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionBuffer")
            .field("owned", &self.is_owned())
            .field("capacity", &self.capacity())
            .field("head", &self.head)
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let buffer = ConnectionBuffer::new();
        assert!(buffer.is_owned());
        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.len(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_put_get_fifo() {
        let mut buffer = ConnectionBuffer::new();
        buffer.put(b"abc").unwrap();
        buffer.put(b"def").unwrap();

        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.get(2).unwrap(), b"ab");
        assert_eq!(buffer.get(4).unwrap(), b"cdef");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_get_underflow() {
        let mut buffer = ConnectionBuffer::new();
        buffer.put(b"ab").unwrap();

        let err = buffer.get(3).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::Underflow {
                requested: 3,
                available: 2
            }
        );
        // The failed get consumed nothing.
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_growth_is_power_of_two() {
        let mut buffer = ConnectionBuffer::with_capacity(16);

        buffer.put(&[0u8; 17]).unwrap();
        assert_eq!(buffer.capacity(), 32);

        // A large put jumps straight to the covering power of two.
        buffer.put(&[0u8; 100]).unwrap();
        assert_eq!(buffer.capacity(), 128);
    }

    #[test]
    fn test_growth_bound_over_many_puts() {
        let mut buffer = ConnectionBuffer::with_capacity(8);
        let mut total = 0usize;

        for _ in 0..50 {
            buffer.put(&[0xA5; 13]).unwrap();
            total += 13;
            // Doubling growth never overshoots twice the data held.
            assert!(buffer.capacity() <= (2 * total).next_power_of_two());
            assert!(buffer.capacity().is_power_of_two());
        }

        assert_eq!(buffer.len(), total);
    }

    #[test]
    fn test_external_backing_cannot_grow() {
        let mut buffer = ConnectionBuffer::with_external(vec![0u8; 4].into_boxed_slice());
        assert!(!buffer.is_owned());

        buffer.put(b"abcd").unwrap();
        assert_eq!(buffer.put(b"e").unwrap_err(), ProtocolError::BufferNotOwned);
        assert_eq!(buffer.reserve(8).unwrap_err(), ProtocolError::BufferNotOwned);

        assert_eq!(buffer.get(4).unwrap(), b"abcd");
    }

    #[test]
    fn test_set_size_no_space() {
        let mut buffer = ConnectionBuffer::with_external(vec![0u8; 4].into_boxed_slice());
        assert_eq!(
            buffer.set_size(5).unwrap_err(),
            ProtocolError::NoSpace {
                requested: 5,
                capacity: 4
            }
        );
        buffer.set_size(3).unwrap();
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_flush_retains_capacity() {
        let mut buffer = ConnectionBuffer::with_capacity(32);
        buffer.put(b"hello").unwrap();
        buffer.flush();

        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 32);
    }

    #[test]
    fn test_reserve_preserves_contents() {
        let mut buffer = ConnectionBuffer::new();
        buffer.put(b"keep").unwrap();
        buffer.reserve(1000).unwrap();

        assert_eq!(buffer.capacity(), 1024);
        assert_eq!(buffer.peek(), b"keep");
    }

    #[test]
    fn test_compact_reclaims_consumed_prefix() {
        let mut buffer = ConnectionBuffer::with_capacity(8);
        buffer.put(b"abcdef").unwrap();
        buffer.get(4).unwrap();

        buffer.compact();
        assert_eq!(buffer.peek(), b"ef");

        // The freed prefix is reusable without growth.
        buffer.put(b"ghijkl").unwrap();
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.peek(), b"efghijkl");
    }
}
