#![forbid(unsafe_code)]

//! Test harness for `gramlist`: sink doubles for asserting notification
//! cardinality and exercising failure paths.
//!
//! Used by `gramlist`'s integration tests; kept out of the library crate so
//! production builds never carry test scaffolding.

use std::cell::RefCell;
use std::rc::Rc;

use gramlist::{SinkError, UpdateSink};

/// Sink that records every notification in order.
///
/// # Example
///
/// ```
/// use gramlist::List;
/// use gramlist_harness::RecordingSink;
///
/// let sink = RecordingSink::shared();
/// let mut list = List::new("numbers");
/// list.attach(sink.clone());
/// list.append(1)?;
/// assert_eq!(sink.count(), 1);
/// assert_eq!(sink.updates(), vec!["numbers".to_string()]);
/// # Ok::<(), gramlist::ListError>(())
/// ```
#[derive(Default)]
pub struct RecordingSink {
    updates: RefCell<Vec<String>>,
}

impl RecordingSink {
    /// Create a sink ready to be attached (collections take `Rc` sinks).
    #[must_use]
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Every notified list name, in notification order.
    #[must_use]
    pub fn updates(&self) -> Vec<String> {
        self.updates.borrow().clone()
    }

    /// Total number of notifications.
    #[must_use]
    pub fn count(&self) -> usize {
        self.updates.borrow().len()
    }

    /// Number of notifications for one list name.
    #[must_use]
    pub fn count_for(&self, name: &str) -> usize {
        self.updates.borrow().iter().filter(|n| *n == name).count()
    }

    /// Forget everything recorded so far.
    pub fn reset(&self) {
        self.updates.borrow_mut().clear();
    }
}

impl UpdateSink for RecordingSink {
    fn list_updated(&self, name: &str) -> Result<(), SinkError> {
        self.updates.borrow_mut().push(name.to_string());
        Ok(())
    }
}

/// Sink that rejects every notification with a fixed message.
pub struct FailingSink {
    message: String,
}

impl FailingSink {
    /// Create a failing sink ready to be attached.
    #[must_use]
    pub fn shared(message: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            message: message.into(),
        })
    }
}

impl UpdateSink for FailingSink {
    fn list_updated(&self, _name: &str) -> Result<(), SinkError> {
        Err(self.message.clone().into())
    }
}
