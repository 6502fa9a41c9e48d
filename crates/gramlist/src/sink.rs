#![forbid(unsafe_code)]

//! The update sink: how a grammar engine hears about list changes.
//!
//! A collection does not know anything about rule compilation or the
//! recognition backend. It only holds an [`UpdateSink`] and calls
//! [`UpdateSink::list_updated`] with its own name after a committed change
//! (or once per batch, see the crate docs). The engine side implements the
//! trait and does whatever refresh work it needs.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Sink returns `Err` | Engine rejected the refresh | Wrapped in `ListError::Sink`, propagated to the mutating caller |
//! | No sink attached | List not yet bound to an engine | Notification is skipped |

/// Error type an [`UpdateSink`] may return.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Receiver for list change notifications.
///
/// Implemented by the grammar engine (or a test double). The contract is
/// cardinality, not content: the sink is told *that* the named list changed,
/// exactly once per committed unbatched mutation and at most once per batch.
pub trait UpdateSink {
    /// The list called `name` has new contents.
    fn list_updated(&self, name: &str) -> Result<(), SinkError>;
}

/// Plain functions and closures can serve as sinks directly.
impl<F> UpdateSink for F
where
    F: Fn(&str) -> Result<(), SinkError>,
{
    fn list_updated(&self, name: &str) -> Result<(), SinkError> {
        self(name)
    }
}
