//! AES-256-GCM authenticated encryption.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `open` splits the nonce back out
//! before decrypting.
//!
//! Layout of an envelope:
//!   [ 12-byte nonce | ciphertext | 16-byte auth tag ]
//!
//! No associated data is bound in.

use aes_gcm::aead::{self, Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use super::keys::DerivedKey;
use crate::errors::{FileVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Bytes an envelope adds on top of the plaintext.
pub const ENVELOPE_OVERHEAD: usize = NONCE_LEN + TAG_LEN;

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// Returns the nonce prepended to the ciphertext and tag.
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    seal_inner(key, &nonce, plaintext)
}

/// Seal with a caller-chosen nonce.  Test builds only: reusing a nonce
/// under the same key breaks GCM.
#[cfg(test)]
pub(crate) fn seal_with_nonce(
    key: &DerivedKey,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    seal_inner(key, Nonce::from_slice(nonce), plaintext)
}

fn seal_inner(
    key: &DerivedKey,
    nonce: &aead::Nonce<Aes256Gcm>,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| FileVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| FileVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    // Prepend the nonce so the caller only needs to store one blob.
    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Authenticate and decrypt an envelope produced by `seal`.
///
/// A short envelope, a wrong key, and a failed tag check are all
/// reported as the same `AuthFailure`.
pub fn open(key: &DerivedKey, envelope: &[u8]) -> Result<Vec<u8>> {
    if envelope.len() < ENVELOPE_OVERHEAD {
        return Err(FileVaultError::AuthFailure);
    }

    let (nonce_bytes, ciphertext) = envelope.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| FileVaultError::AuthFailure)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| FileVaultError::AuthFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_nonce_output_is_reproducible() {
        let key = DerivedKey::new([0x42u8; 32]);
        let nonce = [9u8; NONCE_LEN];

        let a = seal_with_nonce(&key, &nonce, b"same input").unwrap();
        let b = seal_with_nonce(&key, &nonce, b"same input").unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[..NONCE_LEN], &nonce);
        assert_eq!(a.len(), b"same input".len() + ENVELOPE_OVERHEAD);
        assert_eq!(open(&key, &a).unwrap(), b"same input");
    }

    #[test]
    fn envelope_of_exactly_overhead_is_empty_plaintext() {
        let key = DerivedKey::new([0x01u8; 32]);
        let sealed = seal(&key, b"").unwrap();
        assert_eq!(sealed.len(), ENVELOPE_OVERHEAD);
        assert!(open(&key, &sealed).unwrap().is_empty());
    }

    #[test]
    fn envelope_shorter_than_overhead_fails() {
        let key = DerivedKey::new([0x01u8; 32]);
        let result = open(&key, &[0u8; ENVELOPE_OVERHEAD - 1]);
        assert!(matches!(result, Err(FileVaultError::AuthFailure)));
    }
}
