//! uLCD Error Types
//!
//! Every operation returns a [`UlcdError`] on failure. Each error maps onto a
//! coarse [`ErrorKind`], and a [`Connection`](crate::Connection) keeps the
//! outcome of its most recent operation as an [`ErrorState`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum length in bytes of a recorded error message
pub const MAX_ERROR_MESSAGE: usize = 256;

/// Errors that can occur while talking to a display module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UlcdError {
    /// Device rejected the command
    #[error("Device sent NAK instead of ACK")]
    Nak,

    /// Reply byte was neither ACK nor NAK
    #[error("Device sent unknown reply {0:#04x} instead of ACK")]
    UnknownReply(u8),

    /// Underlying transport failure
    #[error("Transport error: {description}")]
    Transport {
        /// Native (OS) error code, when the transport reported one
        code: Option<i32>,
        description: String,
    },

    /// Baud-select code has no entry in the baud rate table
    #[error("Unknown baud rate code: {0}")]
    UnknownBaudCode(u8),

    /// Destination buffer cannot hold the packed values
    #[error("Buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },

    /// Command frame would exceed the maximum frame size
    #[error("Command frame of {size} bytes exceeds maximum of {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// Operation attempted on a connection without a transport
    #[error("Connection is not open")]
    NotOpen,

    /// Invalid or unloadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl UlcdError {
    /// Build a transport error from a native code and description
    pub fn transport(code: Option<i32>, description: impl Into<String>) -> Self {
        UlcdError::Transport {
            code,
            description: description.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            UlcdError::Nak => ErrorKind::ProtocolNak,
            UlcdError::UnknownReply(_) => ErrorKind::ProtocolUnknownReply,
            UlcdError::Transport { .. } => ErrorKind::TransportError,
            UlcdError::UnknownBaudCode(_)
            | UlcdError::BufferTooSmall { .. }
            | UlcdError::FrameTooLarge { .. }
            | UlcdError::NotOpen
            | UlcdError::Config(_) => ErrorKind::ConfigurationError,
        }
    }

    /// Native transport error code, if any
    pub fn native_code(&self) -> Option<i32> {
        match self {
            UlcdError::Transport { code, .. } => *code,
            _ => None,
        }
    }
}

impl From<std::io::Error> for UlcdError {
    fn from(err: std::io::Error) -> Self {
        UlcdError::transport(err.raw_os_error(), err.to_string())
    }
}

impl From<config::ConfigError> for UlcdError {
    fn from(err: config::ConfigError) -> Self {
        UlcdError::Config(err.to_string())
    }
}

/// Coarse classification of an operation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ErrorKind {
    #[default]
    Success = 0,
    ProtocolNak = 1,
    ProtocolUnknownReply = 2,
    TransportError = 3,
    ConfigurationError = 4,
}

impl ErrorKind {
    /// Numeric code of this kind (`Success` is 0)
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn is_success(&self) -> bool {
        *self == ErrorKind::Success
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Success => "success",
            ErrorKind::ProtocolNak => "protocol NAK",
            ErrorKind::ProtocolUnknownReply => "protocol unknown reply",
            ErrorKind::TransportError => "transport error",
            ErrorKind::ConfigurationError => "configuration error",
        };
        f.write_str(name)
    }
}

/// Outcome of the most recent operation on a connection
///
/// Overwritten by every operation, success included. Not a history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorState {
    kind: ErrorKind,
    message: String,
}

impl ErrorState {
    /// Replace the stored kind and message
    ///
    /// `None` clears the message. Messages longer than
    /// [`MAX_ERROR_MESSAGE`] bytes are cut at the nearest char boundary.
    pub fn set(&mut self, kind: ErrorKind, message: Option<&str>) {
        self.kind = kind;
        self.message.clear();
        if let Some(text) = message {
            let mut end = text.len().min(MAX_ERROR_MESSAGE);
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            self.message.push_str(&text[..end]);
        }
    }

    /// Record the outcome of an operation
    pub fn record<T>(&mut self, result: &Result<T, UlcdError>) {
        match result {
            Ok(_) => self.set(ErrorKind::Success, None),
            Err(e) => self.set(e.kind(), Some(&e.to_string())),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_success(&self) -> bool {
        self.kind.is_success()
    }
}
