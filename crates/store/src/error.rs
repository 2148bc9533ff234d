use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A storage-level uniqueness constraint rejected a write.
    ///
    /// The domain pre-checks catch most duplicates first with a friendlier
    /// typed error; under concurrent writers this variant is the
    /// authoritative verdict.
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A stored value could not be mapped back to its Rust type.
    #[error("cannot decode {what} from stored value '{value}'")]
    Decode { what: &'static str, value: String },

    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub(crate) fn unique(constraint: impl Into<String>) -> Self {
        Self::UniqueViolation {
            constraint: constraint.into(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
