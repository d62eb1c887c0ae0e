//! Error types for the feed monitor.

use thiserror::Error;

/// Common error type for the feed monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// A feed could not be fetched or parsed.
    ///
    /// Recovered at the per-feed boundary: the feed reports no new item
    /// for the cycle and is tried again on the next one.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// An item could not be delivered.
    ///
    /// Caught at the same boundary as [`MonitorError::Fetch`]. The item
    /// stays marked as seen.
    #[error("publish error: {0}")]
    Publish(String),

    /// A tenant document could not be loaded or saved.
    #[error("store error: {0}")]
    Store(String),

    /// The chat connection was lost. Fatal.
    #[error("connection lost: {0}")]
    Connection(String),

    /// Login or setup failed before the monitor started. Fatal.
    #[error("initialization error: {0}")]
    Init(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for feed monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = MonitorError::Fetch("HTTP error: 404 Not Found".to_string());
        assert_eq!(err.to_string(), "fetch error: HTTP error: 404 Not Found");
    }

    #[test]
    fn test_publish_error_display() {
        let err = MonitorError::Publish("webhook rejected".to_string());
        assert_eq!(err.to_string(), "publish error: webhook rejected");
    }

    #[test]
    fn test_connection_error_display() {
        let err = MonitorError::Connection("gateway closed".to_string());
        assert_eq!(err.to_string(), "connection lost: gateway closed");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MonitorError = io_err.into();
        assert!(matches!(err, MonitorError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: MonitorError = json_err.into();
        assert!(matches!(err, MonitorError::Json(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(MonitorError::Store("test".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
