//! Field-level encryption for the booking core.
//!
//! Sensitive order fields (venue name, description, tax id, phone) are
//! encrypted before they reach storage and decrypted on read. Encryption is
//! non-deterministic: every call draws a fresh nonce, so two encryptions of
//! the same plaintext produce different ciphertexts. Deterministic lookups
//! (tax-id uniqueness) go through [`fingerprint`] instead.

pub mod cipher;
pub mod config;
pub mod error;

pub use cipher::{AesFieldCipher, FieldCipher, fingerprint};
pub use config::CipherConfig;
pub use error::{CryptoError, Result};
