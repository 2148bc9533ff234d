//! AES-256-GCM field cipher and deterministic fingerprinting.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

use crate::config::CipherConfig;
use crate::error::{CryptoError, Result};

const NONCE_LEN: usize = 12;

/// Reversible string encryption for sensitive fields.
///
/// `decrypt(encrypt(s)) == s` for every valid `s`, and two calls to
/// `encrypt(s)` yield different ciphertexts. Implementations hold only
/// immutable key material and are safe for unlimited concurrent use.
///
/// A trait rather than a concrete type so the key stays injected (tests
/// substitute counting or failing doubles; production injects
/// [`AesFieldCipher`]).
pub trait FieldCipher: Send + Sync {
    /// Encrypts a plaintext string.
    fn encrypt(&self, plaintext: &str) -> Result<String>;

    /// Decrypts a ciphertext previously produced by [`encrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::CorruptCiphertext`] if the input is malformed
    /// or fails authentication.
    ///
    /// [`encrypt`]: FieldCipher::encrypt
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
}

/// AES-256-GCM cipher producing `base64(nonce ‖ ciphertext ‖ tag)`.
///
/// The nonce is drawn fresh from the OS RNG on every call and travels with
/// the ciphertext, so decryption needs no state beyond the shared key.
#[derive(Clone)]
pub struct AesFieldCipher {
    cipher: Aes256Gcm,
}

impl AesFieldCipher {
    /// Creates a cipher from a raw 32-byte key.
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Creates a cipher from loaded configuration.
    pub fn from_config(config: &CipherConfig) -> Self {
        Self::new(config.key())
    }
}

impl FieldCipher for AesFieldCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CryptoError::Encryption(format!("AES-GCM encrypt: {e}")))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(combined))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let combined = STANDARD
            .decode(ciphertext)
            .map_err(|e| CryptoError::corrupt(format!("base64 decode: {e}")))?;

        if combined.len() <= NONCE_LEN {
            return Err(CryptoError::corrupt("ciphertext too short"));
        }

        let (nonce_bytes, payload) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, payload)
            .map_err(|e| CryptoError::corrupt(format!("AES-GCM decrypt: {e}")))?;

        String::from_utf8(plaintext).map_err(|e| CryptoError::corrupt(format!("utf-8: {e}")))
    }
}

/// SHA-256 fingerprint of a plaintext value, hex-encoded.
///
/// Ciphertexts are non-deterministic, so equality lookups (tax-id
/// uniqueness) are done on this digest instead of on the encrypted column.
pub fn fingerprint(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> AesFieldCipher {
        AesFieldCipher::new(&[42u8; 32])
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let cipher = test_cipher();
        let plaintext = "Quadra Society Beira-Mar";
        let encrypted = cipher.encrypt(plaintext).unwrap();
        assert_ne!(encrypted, plaintext);
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn roundtrip_preserves_empty_and_unicode() {
        let cipher = test_cipher();
        for plaintext in ["", "ç é ã — 11.222.333/0001-44", "\u{1F3BE}"] {
            let encrypted = cipher.encrypt(plaintext).unwrap();
            assert_eq!(cipher.decrypt(&encrypted).unwrap(), plaintext);
        }
    }

    #[test]
    fn same_plaintext_yields_different_ciphertexts() {
        let cipher = test_cipher();
        let first = cipher.encrypt("repeatable").unwrap();
        let second = cipher.encrypt("repeatable").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn wrong_key_fails_decrypt() {
        let encrypted = test_cipher().encrypt("secret").unwrap();
        let other = AesFieldCipher::new(&[99u8; 32]);
        assert!(matches!(
            other.decrypt(&encrypted),
            Err(CryptoError::CorruptCiphertext { .. })
        ));
    }

    #[test]
    fn garbage_base64_is_corrupt() {
        let cipher = test_cipher();
        assert!(matches!(
            cipher.decrypt("not base64 at all!!"),
            Err(CryptoError::CorruptCiphertext { .. })
        ));
    }

    #[test]
    fn truncated_ciphertext_is_corrupt() {
        let cipher = test_cipher();
        let encrypted = cipher.encrypt("secret").unwrap();
        let truncated = STANDARD.encode(&STANDARD.decode(&encrypted).unwrap()[..NONCE_LEN]);
        assert!(matches!(
            cipher.decrypt(&truncated),
            Err(CryptoError::CorruptCiphertext { .. })
        ));
    }

    #[test]
    fn tampered_payload_fails_authentication() {
        let cipher = test_cipher();
        let mut raw = STANDARD.decode(cipher.encrypt("secret").unwrap()).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xFF;
        assert!(matches!(
            cipher.decrypt(&STANDARD.encode(raw)),
            Err(CryptoError::CorruptCiphertext { .. })
        ));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        assert_eq!(
            fingerprint("11.222.333/0001-44"),
            fingerprint("11.222.333/0001-44")
        );
        assert_ne!(
            fingerprint("11.222.333/0001-44"),
            fingerprint("11.222.333/0001-45")
        );
    }
}
