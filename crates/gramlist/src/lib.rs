#![forbid(unsafe_code)]

//! Dynamic grammar lists with batched change notification.
//!
//! Speech-recognition grammars can reference named collections whose
//! contents change at runtime: a list of open buffer names, a mapping from
//! spoken shortcuts to actions. When such a collection changes, the engine
//! that compiled the referencing rule must refresh it. This crate provides
//! the collection side of that contract:
//!
//! - [`List<T>`]: a named, ordered sequence.
//! - [`DictList<K, V>`]: a named key→value mapping.
//! - [`GrammarList`]: the object-safe base contract both implement.
//! - [`UpdateSink`]: the hook the engine implements to hear about changes.
//!
//! # Update discipline
//!
//! Every mutator commits its change, then notifies the attached sink exactly
//! once. While a batch is open, notification is instead deferred and
//! coalesced into at most one call when the outermost batch closes. Bulk
//! operations (`extend`, `bulk_update`, `replace`, `retain`) are one logical
//! change and notify at most once even outside a batch. Operations that do
//! not change contents are silent.
//!
//! # Example
//!
//! ```
//! # fn main() -> Result<(), gramlist::ListError> {
//! use std::rc::Rc;
//! use gramlist::{List, SinkError};
//!
//! let mut buffers = List::from_items("buffer", ["main.rs"].map(String::from));
//! buffers.attach(Rc::new(|name: &str| -> Result<(), SinkError> {
//!     // A real engine would recompile the rule referencing `name` here.
//!     Ok(())
//! }));
//!
//! // One notification per mutation...
//! buffers.append("lib.rs".to_string())?;
//!
//! // ...or one for a whole batch.
//! buffers.batch(|list| {
//!     list.append("sink.rs".to_string())?;
//!     list.append("base.rs".to_string())
//! })??;
//!
//! assert_eq!(buffers.len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! Collections are single-threaded (`Rc`-based, not `Send`). The "exactly
//! one notification per logical change" contract relies on the single-owner
//! mutation model; a concurrent adaptation would need its own mutual
//! exclusion around mutation plus notification.

pub mod base;
pub mod dict;
pub mod error;
pub mod list;
pub mod sink;

pub use base::GrammarList;
pub use dict::DictList;
pub use error::{ListError, ListResult};
pub use list::List;
pub use sink::{SinkError, UpdateSink};
