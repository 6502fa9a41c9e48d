#![forbid(unsafe_code)]

//! Shared machinery behind every grammar list: the notify-once gate and the
//! base [`GrammarList`] contract.
//!
//! Each collection owns an [`UpdateGate`] (via `Rc`, so batch guards can
//! co-own it). Every mutator routes its "contents changed" signal through
//! [`UpdateGate::mutated`], which either fires the attached sink immediately
//! or, inside a batch, latches a dirty flag for the outermost close.
//!
//! # Invariants
//!
//! 1. With no batch open, every committed change fires the sink exactly once.
//! 2. Inside a batch, contents update immediately but notification is
//!    deferred; only the outermost `end` may fire, and it fires at most once.
//! 3. An outermost `end` with a clean dirty flag fires nothing (an empty
//!    batch is silent).
//! 4. Nested batches are a reference count; inner `end` calls never notify.
//! 5. `revision` increments exactly once per committed logical change,
//!    batched or not. Bulk operations count as one change.
//! 6. `end` below depth zero is an error, never a wraparound.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `end` at depth 0 | Unmatched `end_batch` | `ListError::NotBatching` |
//! | Sink error on fire | Engine rejected refresh | `ListError::Sink` to caller |
//! | Sink error during unwind | Panic escaped a `batch` closure | Logged at `warn`, not propagated |

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{ListError, ListResult};
use crate::sink::UpdateSink;

// ---------------------------------------------------------------------------
// UpdateGate — the notify-once gate
// ---------------------------------------------------------------------------

/// Per-collection notification state: name, sink slot, batch depth, dirty
/// flag, and revision counter.
///
/// Single-threaded by design (`Cell`/`RefCell`); the owning collection and
/// any live [`BatchCloser`] share it through `Rc`.
pub(crate) struct UpdateGate {
    name: String,
    sink: RefCell<Option<Rc<dyn UpdateSink>>>,
    depth: Cell<u32>,
    dirty: Cell<bool>,
    revision: Cell<u64>,
}

impl UpdateGate {
    pub(crate) fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            sink: RefCell::new(None),
            depth: Cell::new(0),
            dirty: Cell::new(false),
            revision: Cell::new(0),
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision.get()
    }

    pub(crate) fn is_batching(&self) -> bool {
        self.depth.get() > 0
    }

    pub(crate) fn attach(&self, sink: Rc<dyn UpdateSink>) {
        tracing::debug!(list = %self.name, "attaching update sink");
        *self.sink.borrow_mut() = Some(sink);
    }

    pub(crate) fn detach(&self) {
        tracing::debug!(list = %self.name, "detaching update sink");
        *self.sink.borrow_mut() = None;
    }

    /// Record one committed logical change.
    ///
    /// Bumps the revision, then either defers (inside a batch) or fires the
    /// sink. Callers must invoke this only when contents actually changed.
    pub(crate) fn mutated(&self) -> ListResult<()> {
        self.revision.set(self.revision.get() + 1);
        if self.depth.get() > 0 {
            self.dirty.set(true);
            tracing::trace!(list = %self.name, depth = self.depth.get(), "change deferred by batch");
            return Ok(());
        }
        self.fire()
    }

    pub(crate) fn begin(&self) {
        self.depth.set(self.depth.get() + 1);
    }

    /// Close one batch level. At the outermost level, fire the sink once if
    /// anything changed during the batch.
    pub(crate) fn end(&self) -> ListResult<()> {
        match self.depth.get() {
            0 => Err(ListError::NotBatching {
                list: self.name.clone(),
            }),
            1 => {
                self.depth.set(0);
                if self.dirty.replace(false) {
                    tracing::trace!(list = %self.name, "batch closed, flushing one notification");
                    self.fire()
                } else {
                    tracing::trace!(list = %self.name, "batch closed with no changes");
                    Ok(())
                }
            }
            deeper => {
                self.depth.set(deeper - 1);
                Ok(())
            }
        }
    }

    fn fire(&self) -> ListResult<()> {
        // Clone the sink handle out so the slot is not borrowed while the
        // engine runs.
        let sink = self.sink.borrow().clone();
        let Some(sink) = sink else {
            return Ok(());
        };
        tracing::trace!(list = %self.name, revision = self.revision.get(), "notifying update sink");
        sink.list_updated(&self.name).map_err(|source| ListError::Sink {
            list: self.name.clone(),
            source,
        })
    }
}

// ---------------------------------------------------------------------------
// BatchCloser — guaranteed close on every exit path
// ---------------------------------------------------------------------------

/// Guard backing the scoped `batch` methods.
///
/// `begin` opens a batch level; `finish` closes it and propagates any sink
/// error. If the guard is instead dropped (the closure panicked), the close
/// still runs so a deferred notification is attempted, but its error can
/// only be logged.
pub(crate) struct BatchCloser {
    gate: Rc<UpdateGate>,
    armed: bool,
}

impl BatchCloser {
    pub(crate) fn begin(gate: Rc<UpdateGate>) -> Self {
        gate.begin();
        Self { gate, armed: true }
    }

    pub(crate) fn finish(mut self) -> ListResult<()> {
        self.armed = false;
        self.gate.end()
    }
}

impl Drop for BatchCloser {
    fn drop(&mut self) {
        if self.armed {
            if let Err(error) = self.gate.end() {
                tracing::warn!(list = %self.gate.name(), %error, "update sink failed during batch unwind");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GrammarList — the base contract
// ---------------------------------------------------------------------------

/// Base contract shared by [`List`](crate::List) and
/// [`DictList`](crate::DictList).
///
/// Object-safe on purpose: engine-side code that loads and refreshes rules
/// can hold `&mut dyn GrammarList` without caring which concrete collection
/// backs a rule.
pub trait GrammarList {
    /// The name the engine knows this collection by.
    fn name(&self) -> &str;

    /// Number of elements or entries.
    fn len(&self) -> usize;

    /// Whether the collection has no contents.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Revision counter: bumped once per committed logical change.
    fn revision(&self) -> u64;

    /// Whether a batch is currently open.
    fn is_batching(&self) -> bool;

    /// Bind the collection to an engine sink. Does not notify.
    fn attach(&mut self, sink: Rc<dyn UpdateSink>);

    /// Unbind the sink. Later mutations still commit, silently.
    fn detach(&mut self);

    /// Open a batch level. Nesting is allowed; see [`Self::end_batch`].
    fn begin_batch(&mut self);

    /// Close one batch level. Only the outermost close may notify, and only
    /// if something changed. Fails with [`ListError::NotBatching`] when no
    /// batch is open.
    fn end_batch(&mut self) -> ListResult<()>;

    /// Remove all contents.
    fn clear(&mut self) -> ListResult<()>;
}
