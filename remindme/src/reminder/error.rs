//! Error types for reminder parsing, transport, and delivery.

use std::path::PathBuf;

/// Errors produced while parsing a reminder time expression.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The relative form did not match `<integer><s|m|h>`.
    #[error("invalid duration '{input}': expected a number followed by s, m or h")]
    Duration { input: String },

    /// The absolute form did not match 24-hour `HH:MM`.
    #[error("invalid clock time '{input}': expected HH:MM")]
    Clock { input: String },
}

impl ParseError {
    pub fn duration(input: impl Into<String>) -> Self {
        ParseError::Duration {
            input: input.into(),
        }
    }

    pub fn clock(input: impl Into<String>) -> Self {
        ParseError::Clock {
            input: input.into(),
        }
    }
}

/// Errors raised while talking to the watcher daemon.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Could not reach the daemon socket. The one-shot client treats
    /// this as fatal; it never spawns a watcher on its own.
    #[error("failed to connect to watcher at {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Socket I/O failed mid-request.
    #[error("transport i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame could not be encoded or decoded.
    #[error("malformed frame: {0}")]
    Frame(#[from] serde_json::Error),

    /// The daemon sent a response frame longer than the allowed maximum.
    #[error("response frame exceeded {max_bytes} bytes")]
    FrameTooLarge { max_bytes: usize },

    /// The daemon closed the connection before responding.
    #[error("watcher closed the connection before responding")]
    ConnectionClosed,
}

/// Failure to hand a notice to the OS notification service.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The desktop notification service rejected or dropped the notice.
    #[error("desktop notification failed: {0}")]
    Desktop(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_names_the_input() {
        let err = ParseError::duration("25x");
        assert_eq!(
            err.to_string(),
            "invalid duration '25x': expected a number followed by s, m or h"
        );

        let err = ParseError::clock("25:99");
        assert_eq!(err.to_string(), "invalid clock time '25:99': expected HH:MM");
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::FrameTooLarge {
            max_bytes: 1024 * 1024,
        };
        assert_eq!(err.to_string(), "response frame exceeded 1048576 bytes");

        let err = TransportError::ConnectionClosed;
        assert!(err.to_string().contains("closed the connection"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: TransportError = io.into();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[test]
    fn errors_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ParseError>();
        assert_send_sync::<TransportError>();
        assert_send_sync::<NotifyError>();
    }
}
