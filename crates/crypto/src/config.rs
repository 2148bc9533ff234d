//! Cipher configuration loaded from the environment.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{CryptoError, Result};

/// Environment variable holding the base64-encoded 32-byte key.
pub const KEY_ENV_VAR: &str = "FIELD_ENCRYPTION_KEY";

/// Process-wide field-encryption key material.
///
/// Loaded once at startup and injected into [`AesFieldCipher`]; never read
/// from ambient state inside the services. Compromise of this key
/// compromises every encrypted field; rotation is an external
/// key-management concern.
///
/// [`AesFieldCipher`]: crate::AesFieldCipher
#[derive(Clone)]
pub struct CipherConfig {
    key: [u8; 32],
}

impl CipherConfig {
    /// Wraps an already-decoded key.
    pub fn from_key(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Loads the key from `FIELD_ENCRYPTION_KEY` (base64, 32 bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] if the variable is unset, not
    /// valid base64, or does not decode to exactly 32 bytes.
    pub fn from_env() -> Result<Self> {
        let encoded = std::env::var(KEY_ENV_VAR)
            .map_err(|_| CryptoError::InvalidKey(format!("{KEY_ENV_VAR} is not set")))?;
        Self::from_base64(&encoded)
    }

    /// Decodes a base64-encoded 32-byte key.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("base64 decode: {e}")))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| CryptoError::InvalidKey(format!("expected 32 bytes, got {}", b.len())))?;
        Ok(Self { key })
    }

    /// Returns the raw key bytes.
    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }
}

impl std::fmt::Debug for CipherConfig {
    // Key material stays out of logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherConfig").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn from_base64_accepts_32_bytes() {
        let encoded = STANDARD.encode([7u8; 32]);
        let config = CipherConfig::from_base64(&encoded).unwrap();
        assert_eq!(config.key(), &[7u8; 32]);
    }

    #[test]
    fn from_base64_rejects_wrong_length() {
        let encoded = STANDARD.encode([7u8; 16]);
        assert!(matches!(
            CipherConfig::from_base64(&encoded),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn from_base64_rejects_garbage() {
        assert!(matches!(
            CipherConfig::from_base64("***"),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    #[serial]
    fn from_env_reads_key() {
        // SAFETY: serialised test, no concurrent env access.
        unsafe { std::env::set_var(KEY_ENV_VAR, STANDARD.encode([9u8; 32])) };
        let config = CipherConfig::from_env().unwrap();
        assert_eq!(config.key(), &[9u8; 32]);
        unsafe { std::env::remove_var(KEY_ENV_VAR) };
    }

    #[test]
    #[serial]
    fn from_env_fails_when_unset() {
        unsafe { std::env::remove_var(KEY_ENV_VAR) };
        assert!(matches!(
            CipherConfig::from_env(),
            Err(CryptoError::InvalidKey(_))
        ));
    }

    #[test]
    fn debug_hides_key_material() {
        let config = CipherConfig::from_key([1u8; 32]);
        assert!(!format!("{config:?}").contains('1'));
    }
}
