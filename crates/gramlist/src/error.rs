#![forbid(unsafe_code)]

//! Errors from grammar list operations.

use core::fmt;

use crate::sink::SinkError;

/// Result alias for grammar list operations.
pub type ListResult<T> = Result<T, ListError>;

/// Errors from grammar list operations.
#[derive(Debug)]
pub enum ListError {
    /// `end_batch` was called with no matching `begin_batch`.
    NotBatching {
        /// Name of the offending list.
        list: String,
    },
    /// The attached update sink rejected a change notification.
    ///
    /// The content change itself has already committed; only the
    /// notification failed.
    Sink {
        /// Name of the list whose notification failed.
        list: String,
        /// The error returned by the sink.
        source: SinkError,
    },
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotBatching { list } => {
                write!(f, "end_batch without matching begin_batch on list '{list}'")
            }
            Self::Sink { list, source } => {
                write!(f, "update sink failed for list '{list}': {source}")
            }
        }
    }
}

impl std::error::Error for ListError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotBatching { .. } => None,
            Self::Sink { source, .. } => Some(source.as_ref()),
        }
    }
}
