// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Crate-wide error type.
//!
//! Variants are grouped by how callers are expected to react:
//! schema drift and structural gaps are hard failures, lifecycle
//! errors are API misuse, codec and runtime errors come from the
//! wire and the worker threads. Stale report delivery and dangling
//! references are recovered locally and never surface here.

use std::string::FromUtf8Error;

/// Errors returned by mapping, reporting and operation APIs.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Schema Drift Errors
    // ========================================================================
    /// A domain class or wire message type has no registered counterpart.
    UnregisteredType(String),
    /// A tagged union did not have exactly one populated branch.
    OneOfCount {
        /// Wire type name of the union message.
        message_type: String,
        /// Number of populated branches found.
        populated: usize,
    },
    /// A wire enum symbol does not match any member of the declared enum.
    UnknownEnum {
        /// Offending wire symbol.
        value: String,
        /// Field the value was read from.
        field: String,
        /// Declaring enum type.
        declaring_type: String,
    },
    /// A property name is not declared anywhere in the class chain.
    UnknownProperty {
        /// Domain class name.
        class: String,
        /// Property name.
        property: String,
    },
    /// A value of the wrong shape was found for a field.
    TypeMismatch {
        /// Expected shape.
        expected: String,
        /// Shape actually found.
        found: String,
    },
    /// A required wire field was absent.
    MissingField {
        /// Wire message type.
        message_type: String,
        /// Missing field name.
        field: String,
    },

    // ========================================================================
    // Structural Errors
    // ========================================================================
    /// Child kind under a known parent that the tree assembler has no slot for.
    NotImplemented(String),

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// `init_mdib` was called on an already initialized mirror.
    AlreadyInitialized,
    /// The mirror has not been initialized yet.
    NotInitialized,
    /// The operation worker is already running.
    WorkerRunning,

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// Input ended before a value was complete.
    BufferTooSmall {
        /// Bytes needed.
        need: usize,
        /// Bytes available.
        have: usize,
    },
    /// Input bytes do not form a valid message.
    InvalidData(String),
    /// String payload is not valid UTF-8.
    Utf8Error(FromUtf8Error),
    /// Numeric value does not fit the target representation.
    ValueOutOfRange(String),

    // ========================================================================
    // Runtime Errors
    // ========================================================================
    /// The peer or the stream is gone.
    Disconnected,
    /// A blocking call ran out of time.
    Timeout,
    /// A bounded queue refused the item.
    QueueFull,
    /// The caller cancelled the wait.
    Cancelled,
    /// Spawning a worker thread failed.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Schema drift
            Error::UnregisteredType(name) => write!(f, "no registered mapping for type {}", name),
            Error::OneOfCount {
                message_type,
                populated,
            } => write!(
                f,
                "p {} has {} fields, expect exactly one",
                message_type, populated
            ),
            Error::UnknownEnum {
                value,
                field,
                declaring_type,
            } => write!(
                f,
                "unknown enum \"{}\" for field {}, type={}",
                value, field, declaring_type
            ),
            Error::UnknownProperty { class, property } => {
                write!(f, "class {} has no property {}", class, property)
            }
            Error::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            Error::MissingField {
                message_type,
                field,
            } => write!(f, "{} is missing required field {}", message_type, field),
            // Structural
            Error::NotImplemented(what) => write!(f, "handling of {} not implemented", what),
            // Lifecycle
            Error::AlreadyInitialized => write!(f, "mdib is already initialized"),
            Error::NotInitialized => write!(f, "mdib is not initialized"),
            Error::WorkerRunning => write!(f, "operations worker is already running"),
            // Codec
            Error::BufferTooSmall { need, have } => {
                write!(f, "buffer too small: need {} bytes, have {}", need, have)
            }
            Error::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            Error::Utf8Error(e) => write!(f, "UTF-8 error: {}", e),
            Error::ValueOutOfRange(msg) => write!(f, "value out of range: {}", msg),
            // Runtime
            Error::Disconnected => write!(f, "stream disconnected"),
            Error::Timeout => write!(f, "timeout"),
            Error::QueueFull => write!(f, "queue full"),
            Error::Cancelled => write!(f, "cancelled"),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Utf8Error(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(e: FromUtf8Error) -> Self {
        Error::Utf8Error(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Convenient alias for API results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_diagnostic_wording() {
        let e = Error::OneOfCount {
            message_type: "AbstractStateOneOfMsg".into(),
            populated: 2,
        };
        assert_eq!(
            e.to_string(),
            "p AbstractStateOneOfMsg has 2 fields, expect exactly one"
        );
        let e = Error::NotImplemented("ClockDescriptor".into());
        assert_eq!(e.to_string(), "handling of ClockDescriptor not implemented");
        let e = Error::UnknownEnum {
            value: "FOO".into(),
            field: "metric_category".into(),
            declaring_type: "MetricCategory".into(),
        };
        assert_eq!(
            e.to_string(),
            "unknown enum \"FOO\" for field metric_category, type=MetricCategory"
        );
    }
}
