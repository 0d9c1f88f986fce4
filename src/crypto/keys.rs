//! Secret-holding buffers that wipe themselves.
//!
//! `Password` owns the raw bytes a user typed and `DerivedKey` owns the
//! 32-byte AES key produced from it.  Both are zero-filled when dropped,
//! so every exit path of an operation (including `?` early returns)
//! clears them without any caller discipline.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Length of a derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A user-supplied password, wiped from memory on drop.
///
/// Vault operations take `Password` by value: the buffer lives exactly as
/// long as the call that consumes it.
pub struct Password {
    bytes: Zeroizing<Vec<u8>>,
}

impl Password {
    /// Take ownership of raw password bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Zeroizing::new(bytes),
        }
    }

    /// Access the raw password bytes (e.g. to feed the KDF).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Overwrite the buffer with zeros right away instead of waiting for drop.
    pub fn clear(&mut self) {
        self.bytes.zeroize();
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Password {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl From<Zeroizing<String>> for Password {
    fn from(value: Zeroizing<String>) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// A 32-byte symmetric key that automatically zeroes its memory when
/// dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Create a new `DerivedKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build the cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DerivedKey(***)")
    }
}

/// Zero-fill a byte buffer owned by a UI layer (e.g. a password field).
pub fn clear_bytes(buf: &mut [u8]) {
    buf.zeroize();
}

/// Zero-fill and truncate a string owned by a UI layer.
pub fn clear_string(buf: &mut String) {
    buf.zeroize();
}
