//! Error types for the MoviesHound application shell.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum HoundError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search, discovery or registry error.
    #[error(transparent)]
    Search(#[from] hound_search::SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HoundError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_errors_keep_their_message() {
        let err: HoundError = hound_search::SearchError::Sync("hub down".into()).into();
        assert_eq!(err.to_string(), "sync failed: hub down");
    }

    #[test]
    fn io_errors_convert() {
        let err: HoundError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, HoundError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }
}
