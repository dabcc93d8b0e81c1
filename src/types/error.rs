use thiserror::Error;

/// tokcount error types
#[derive(Error, Debug)]
pub enum TokcountError {
    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Pricing table could not be read
    #[error("pricing error: {0}")]
    Pricing(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl From<csv::Error> for TokcountError {
    fn from(err: csv::Error) -> Self {
        TokcountError::Pricing(err.to_string())
    }
}

/// Result type alias for tokcount
pub type Result<T> = std::result::Result<T, TokcountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TokcountError::Config("no executable directory".into());
        assert_eq!(err.to_string(), "config error: no executable directory");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TokcountError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn test_pricing_error_display() {
        let err = TokcountError::Pricing("bad header".into());
        assert_eq!(err.to_string(), "pricing error: bad header");
    }
}
