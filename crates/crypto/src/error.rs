use thiserror::Error;

/// Errors from field-level encryption.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Stored ciphertext could not be decoded or authenticated. Indicates a
    /// key mismatch or storage corruption; the enclosing read must abort
    /// rather than return partial plaintext.
    #[error("corrupt ciphertext: {reason}")]
    CorruptCiphertext { reason: String },

    /// Encryption itself failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The configured key is missing, not decodable, or not 32 bytes.
    #[error("invalid field-encryption key: {0}")]
    InvalidKey(String),
}

impl CryptoError {
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptCiphertext {
            reason: reason.into(),
        }
    }
}

/// Result type for encryption operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
