//! FileVault — a local encrypted file vault.
//!
//! Files are sealed with AES-256-GCM under a key derived (PBKDF2-HMAC-SHA256)
//! from a per-file password and a per-file salt.  Originals are securely
//! erased after ingest, and exporting an entry retires it from the vault.
//! `vault::VaultCore` is the entry point for front ends.

pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod erase;
pub mod errors;
pub mod vault;
