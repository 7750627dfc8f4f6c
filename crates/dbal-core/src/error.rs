//! Error types for driver operations.

use std::fmt;

/// The single error type surfaced by every driver operation.
#[derive(Debug)]
pub enum Error {
    /// Failure reported by the underlying client (connect, prepare, execute)
    Driver(DriverError),
    /// A declared parameter type tag outside the supported set
    UnknownParameterType(i32),
    /// A parameter key that cannot address a placeholder
    InvalidParameter(String),
    /// Operation deliberately not offered by this driver
    Unsupported(String),
    /// Malformed connection parameters
    Config(ConfigError),
    /// Type conversion errors when reading rows
    Type(TypeError),
    /// I/O errors outside the client (runtime startup)
    Io(std::io::Error),
}

/// A translated client failure: the client's message and code, nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub message: String,
    pub code: Option<i32>,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

impl DriverError {
    pub fn new(message: impl Into<String>, code: Option<i32>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

impl ConfigError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}

impl Error {
    /// Shorthand for a translated driver error.
    pub fn driver(message: impl Into<String>, code: Option<i32>) -> Self {
        Error::Driver(DriverError::new(message, code))
    }

    /// The client error code, if this error came from the client.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::Driver(e) => e.code,
            Error::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }

    /// Was this raised locally, before anything reached the client?
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::UnknownParameterType(_)
                | Error::InvalidParameter(_)
                | Error::Unsupported(_)
                | Error::Config(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Driver(e) => write!(f, "{}", e),
            Error::UnknownParameterType(tag) => write!(f, "Unknown parameter type: {}", tag),
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::Unsupported(msg) => write!(f, "{}", msg),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for DriverError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<DriverError> for Error {
    fn from(err: DriverError) -> Self {
        Error::Driver(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_error_keeps_message_and_code() {
        let err = Error::driver("Table 'test.nope' doesn't exist", Some(1146));
        assert_eq!(err.code(), Some(1146));
        assert_eq!(
            err.to_string(),
            "Table 'test.nope' doesn't exist (code 1146)"
        );
        assert!(!err.is_local());
    }

    #[test]
    fn driver_error_without_code() {
        let err = Error::driver("connection closed", None);
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "connection closed");
    }

    #[test]
    fn local_errors_are_flagged() {
        assert!(Error::UnknownParameterType(42).is_local());
        assert!(Error::InvalidParameter("0".to_string()).is_local());
        assert!(Error::Unsupported("quote".to_string()).is_local());
        assert!(Error::Config(ConfigError::new("bad port")).is_local());
        assert_eq!(
            Error::UnknownParameterType(42).to_string(),
            "Unknown parameter type: 42"
        );
    }

    #[test]
    fn io_error_exposes_source() {
        let err: Error = std::io::Error::other("no runtime").into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("I/O error"));
    }
}
