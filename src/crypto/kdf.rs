//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! Every vault entry gets its own random 16-byte salt, so the same
//! password on two files derives two unrelated keys.  The iteration
//! count is deliberately high (at least 100 000) to slow brute force.

use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroize;

use super::keys::{DerivedKey, KEY_LEN};
use crate::errors::{FileVaultError, Result};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Minimum (and default) PBKDF2 iteration count.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Derive a 32-byte key from a password and salt with the default
/// iteration count.
///
/// The same password + salt will always produce the same key.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN]) -> Result<DerivedKey> {
    derive_key_with_iterations(password, salt, MIN_ITERATIONS)
}

/// Derive a 32-byte key with an explicit iteration count.
///
/// Rejects empty passwords and iteration counts below `MIN_ITERATIONS`.
pub fn derive_key_with_iterations(
    password: &[u8],
    salt: &[u8; SALT_LEN],
    iterations: u32,
) -> Result<DerivedKey> {
    if password.is_empty() {
        return Err(FileVaultError::InvalidInput("password cannot be empty".into()));
    }
    if iterations < MIN_ITERATIONS {
        return Err(FileVaultError::InvalidInput(format!(
            "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {iterations})"
        )));
    }

    let mut okm = [0u8; KEY_LEN];
    pbkdf2_sha256(password, salt, iterations, &mut okm)?;

    // `DerivedKey::new` copies the array; wipe the stack copy.
    let key = DerivedKey::new(okm);
    okm.zeroize();
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

fn pbkdf2_sha256(password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) -> Result<()> {
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, rounds, out)
        .map_err(|e| FileVaultError::KeyDerivationFailed(format!("PBKDF2 failed: {e}")))
}
