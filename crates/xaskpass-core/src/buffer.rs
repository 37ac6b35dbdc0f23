//! Fixed-capacity secret buffer.
//!
//! This module provides the only place the passphrase lives while it is
//! being typed:
//! - Capacity fixed at construction; input beyond it is dropped
//! - Deletion only from the end
//! - Backing storage zeroed with `zeroize` on [`SecretBuffer::wipe`] and on drop
//! - Backing storage locked into RAM with `memsec::mlock` where permitted
//!
//! # Security
//!
//! The storage is allocated once at full capacity and never reallocated, so
//! no stale copy of the secret is left behind by growth. Read access goes
//! through [`secrecy::ExposeSecret`] to keep every exposure explicit.

use secrecy::ExposeSecret;
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A bounded, self-zeroing byte buffer for secret entry.
///
/// # Example
///
/// ```
/// use secrecy::ExposeSecret;
/// use xaskpass_core::buffer::SecretBuffer;
///
/// let mut buffer = SecretBuffer::with_capacity(4);
/// for byte in b"hunter2" {
///     buffer.push(*byte);
/// }
/// assert_eq!(buffer.expose_secret(), b"hunt");
///
/// buffer.wipe();
/// assert!(buffer.is_wiped());
/// ```
pub struct SecretBuffer {
    /// Backing storage, allocated at full capacity.
    storage: Box<[u8]>,
    /// Number of bytes entered so far.
    len: usize,
    /// Whether `storage` is locked into RAM.
    memory_locked: bool,
}

impl SecretBuffer {
    /// Create an empty buffer holding at most `capacity` bytes.
    ///
    /// This will attempt to lock the backing storage using `mlock`.
    /// If locking fails (e.g., due to RLIMIT_MEMLOCK), the buffer still works
    /// but its pages may be swapped to disk.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer = Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
            memory_locked: false,
        };
        buffer.try_lock_memory();
        buffer
    }

    fn try_lock_memory(&mut self) {
        if self.storage.is_empty() {
            return;
        }

        // Safety: the region is our own live allocation of exactly this length
        let locked = unsafe { memsec::mlock(self.storage.as_mut_ptr(), self.storage.len()) };

        if locked {
            self.memory_locked = true;
            debug!(capacity = self.storage.len(), "Secret buffer memory locked");
        } else {
            debug!(
                capacity = self.storage.len(),
                "mlock refused for secret buffer; it may be swapped"
            );
        }
    }

    /// Append a byte.
    ///
    /// Returns `false` and leaves the buffer unchanged if it is full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.is_full() {
            trace!(capacity = self.capacity(), "Secret buffer full, dropping input");
            return false;
        }
        self.storage[self.len] = byte;
        self.len += 1;
        true
    }

    /// Remove the last byte, clearing the slot it occupied.
    ///
    /// Returns `false` if the buffer was already empty.
    pub fn pop(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        self.len -= 1;
        self.storage[self.len].zeroize();
        true
    }

    /// Overwrite every byte of backing storage with zero and reset the length.
    pub fn wipe(&mut self) {
        self.storage[..].zeroize();
        self.len = 0;
    }

    /// Whether every byte of backing storage is zero.
    pub fn is_wiped(&self) -> bool {
        self.len == 0 && self.storage.iter().all(|&b| b == 0)
    }

    /// Number of bytes entered.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no bytes have been entered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of bytes the buffer holds.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Whether the buffer has reached its capacity.
    pub fn is_full(&self) -> bool {
        self.len == self.storage.len()
    }

    /// Check if memory locking is active.
    pub fn is_memory_locked(&self) -> bool {
        self.memory_locked
    }
}

impl ExposeSecret<[u8]> for SecretBuffer {
    fn expose_secret(&self) -> &[u8] {
        &self.storage[..self.len]
    }
}

impl Zeroize for SecretBuffer {
    fn zeroize(&mut self) {
        self.wipe();
    }
}

impl ZeroizeOnDrop for SecretBuffer {}

impl Drop for SecretBuffer {
    fn drop(&mut self) {
        self.wipe();

        if self.memory_locked {
            // Safety: unlocking the region locked in `try_lock_memory`
            unsafe {
                memsec::munlock(self.storage.as_mut_ptr(), self.storage.len());
            }
            debug!("Secret buffer memory unlocked");
        }
    }
}

// Content stays out of logs and panic messages
impl std::fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBuffer")
            .field("content", &"[REDACTED]")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Length never exceeds capacity and kept bytes are the prefix.
        #[test]
        fn push_keeps_prefix_up_to_capacity(
            capacity in 0usize..64,
            input in proptest::collection::vec(any::<u8>(), 0..128)
        ) {
            let mut buffer = SecretBuffer::with_capacity(capacity);
            for &b in &input {
                buffer.push(b);
                prop_assert!(buffer.len() <= buffer.capacity());
            }
            let kept = input.len().min(capacity);
            prop_assert_eq!(buffer.expose_secret(), &input[..kept]);
        }

        /// Wiping always leaves all-zero storage, whatever was entered.
        #[test]
        fn wipe_always_zeroes(input in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut buffer = SecretBuffer::with_capacity(32);
            for &b in &input {
                buffer.push(b);
            }
            buffer.wipe();
            prop_assert!(buffer.is_wiped());
        }
    }
}
