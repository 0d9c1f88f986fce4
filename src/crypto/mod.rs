//! Cryptographic primitives for FileVault.
//!
//! This module provides:
//! - AES-256-GCM authenticated sealing and opening (`encryption`)
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - Zeroize-on-drop wrappers for passwords and derived keys (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive_key, Password, ...};
pub use encryption::{open, seal, ENVELOPE_OVERHEAD, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_key, derive_key_with_iterations, generate_salt, MIN_ITERATIONS, SALT_LEN};
pub use keys::{clear_bytes, clear_string, DerivedKey, Password, KEY_LEN};
