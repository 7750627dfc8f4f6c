//! Translation of client failures into driver errors.

use crate::client::ClientError;
use dbal_core::Error;
use std::io;

/// Re-wrap a client failure, keeping only its message and code.
pub fn translate<E: ClientError>(err: E) -> Error {
    let translated = Error::driver(err.message(), err.code());
    tracing::debug!(error = %translated, "client error");
    translated
}

impl ClientError for mysql_async::Error {
    fn code(&self) -> Option<i32> {
        match self {
            mysql_async::Error::Server(e) => Some(i32::from(e.code)),
            mysql_async::Error::Io(e) => io_error_of(e).and_then(io::Error::raw_os_error),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            mysql_async::Error::Server(e) => e.message.clone(),
            mysql_async::Error::Io(e) => {
                io_error_of(e).map_or_else(|| e.to_string(), |io| io.to_string())
            }
            other => other.to_string(),
        }
    }
}

fn io_error_of(err: &mysql_async::IoError) -> Option<&io::Error> {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<io::Error>() {
            return Some(io);
        }
        source = current.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use mysql_async::{DriverError, IoError, ServerError};

    #[test]
    fn server_errors_keep_message_and_number() {
        let err = mysql_async::Error::Server(ServerError {
            code: 1146,
            message: "Table 'test.missing' doesn't exist".to_string(),
            state: "42S02".to_string(),
        });
        let translated = translate(err);
        match translated {
            Error::Driver(e) => {
                assert_eq!(e.message, "Table 'test.missing' doesn't exist");
                assert_eq!(e.code, Some(1146));
            }
            other => panic!("expected driver error, got {other:?}"),
        }
    }

    #[test]
    fn io_errors_keep_os_code() {
        let io = io::Error::from_raw_os_error(111);
        let err = mysql_async::Error::Io(IoError::Io(io));
        let translated = translate(err);
        assert_eq!(translated.code(), Some(111));
    }

    #[test]
    fn driver_errors_have_no_code() {
        let err = mysql_async::Error::Driver(DriverError::ConnectionClosed);
        let translated = translate(err);
        assert_eq!(translated.code(), None);
        assert!(!translated.to_string().is_empty());
    }
}
