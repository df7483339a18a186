//! Error types for building a decoder and decoding logs.

use ethereum_types::H256;
use thiserror::Error;

use crate::Type;

/// Errors raised while building a [`LogDecoder`](crate::LogDecoder).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate event signature {signature} ({hash:#x})")]
    DuplicateSignature { signature: String, hash: H256 },

    #[error("event `{event}`: non-indexed parameter `{param}` has dynamic type {type_}")]
    UnsupportedParameter {
        event: String,
        param: String,
        type_: Type,
    },

    #[error("event `{event}`: parameter `{param}` has invalid type width {type_}")]
    InvalidType {
        event: String,
        param: String,
        type_: Type,
    },

    #[error("event `{event}`: parameter name `{param}` is used more than once")]
    DuplicateParameter { event: String, param: String },
}

/// A log matched a known event but its topics or data do not fit the
/// event's parameter layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedLog {
    #[error("`{event}` log has {actual} topics, expected {expected}")]
    TopicCount {
        event: String,
        expected: usize,
        actual: usize,
    },

    #[error("`{event}` log data is {len} bytes, not a multiple of 32")]
    DataAlignment { event: String, len: usize },

    #[error("`{event}` log data is {actual} bytes, expected at least {expected}")]
    DataTooShort {
        event: String,
        expected: usize,
        actual: usize,
    },

    #[error("`{event}` log parameter `{param}`: {reason}")]
    InvalidWord {
        event: String,
        param: String,
        reason: &'static str,
    },
}

impl MalformedLog {
    /// Name of the event the log was matched against.
    pub fn event(&self) -> &str {
        match self {
            MalformedLog::TopicCount { event, .. }
            | MalformedLog::DataAlignment { event, .. }
            | MalformedLog::DataTooShort { event, .. }
            | MalformedLog::InvalidWord { event, .. } => event,
        }
    }
}

/// Errors raised while encoding values into a log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("event `{event}` takes {expected} values, got {actual}")]
    Arity {
        event: String,
        expected: usize,
        actual: usize,
    },

    #[error("event `{event}`: value for `{param}` is not a valid {expected}")]
    TypeMismatch {
        event: String,
        param: String,
        expected: Type,
    },
}

/// A type or event declaration could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse `{input}`: {reason}")]
pub struct ParseError {
    pub input: String,
    pub reason: String,
}
