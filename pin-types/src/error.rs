//! Error types for assetpin data types.

use thiserror::Error;

/// Validation errors for identity types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    /// Asset id is not a plain directory name
    #[error("invalid asset id {0:?}: must be a non-empty directory name")]
    InvalidAssetId(String),

    /// Namespace is not usable as a directory name
    #[error("invalid namespace {0:?}: must be a non-empty directory name")]
    InvalidNamespace(String),

    /// Content address is empty
    #[error("content address must not be empty")]
    EmptyAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TypesError::InvalidNamespace("a/b".into());
        assert_eq!(
            err.to_string(),
            "invalid namespace \"a/b\": must be a non-empty directory name"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypesError>();
    }
}
