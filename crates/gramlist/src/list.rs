#![forbid(unsafe_code)]

//! [`List<T>`]: a named, ordered sequence that tells its engine when it
//! changes.
//!
//! Grammar rules that match against dynamic vocabularies reference a `List`
//! by name. Every mutator commits its change to the underlying `Vec` and
//! then routes through the update gate, so the engine sees exactly one
//! notification per committed operation, or one per batch when batching
//! (see [`List::batch`]).
//!
//! # Invariants
//!
//! 1. Mutators notify iff the contents actually changed: removing an absent
//!    element, popping an empty list, or extending with an empty iterator is
//!    silent and does not bump the revision.
//! 2. Bulk mutators ([`List::extend`], [`List::retain`], [`List::replace`])
//!    notify at most once regardless of how many elements they touch.
//! 3. Read accessors never notify.
//! 4. A sink failure surfaces as [`ListError::Sink`] after the contents have
//!    already been updated; the change is not rolled back.
//!
//! [`ListError::Sink`]: crate::ListError::Sink

use core::fmt;
use core::ops::Index;
use std::rc::Rc;

use crate::base::{BatchCloser, GrammarList, UpdateGate};
use crate::error::ListResult;
use crate::sink::UpdateSink;

/// A named, ordered sequence backing a grammar rule.
///
/// # Example
///
/// ```
/// use gramlist::List;
///
/// let mut commands = List::from_items("command", ["open", "close"].map(String::from));
/// commands.append("save".to_string())?;
/// assert_eq!(commands.as_slice().len(), 3);
/// # Ok::<(), gramlist::ListError>(())
/// ```
pub struct List<T> {
    items: Vec<T>,
    gate: Rc<UpdateGate>,
}

impl<T> List<T> {
    /// Create an empty list. No notification fires on construction.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            gate: UpdateGate::new(name),
        }
    }

    /// Create a list with initial contents. No notification fires.
    #[must_use]
    pub fn from_items<I>(name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            items: items.into_iter().collect(),
            gate: UpdateGate::new(name),
        }
    }

    // -----------------------------------------------------------------------
    // Mutators — each commits, then notifies through the gate.
    // -----------------------------------------------------------------------

    /// Append one element to the end.
    pub fn append(&mut self, item: T) -> ListResult<()> {
        self.items.push(item);
        self.gate.mutated()
    }

    /// Insert one element at `index`, shifting later elements right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len` (programmer error, as with `Vec::insert`).
    pub fn insert(&mut self, index: usize, item: T) -> ListResult<()> {
        self.items.insert(index, item);
        self.gate.mutated()
    }

    /// Replace the element at `index` (item assignment).
    ///
    /// Always counts as a change; element equality is not consulted.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, item: T) -> ListResult<()> {
        self.items[index] = item;
        self.gate.mutated()
    }

    /// Remove the element at `index`, returning it.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove_at(&mut self, index: usize) -> ListResult<T> {
        let removed = self.items.remove(index);
        self.gate.mutated()?;
        Ok(removed)
    }

    /// Remove and return the last element. Empty list: `Ok(None)`, silent.
    pub fn pop(&mut self) -> ListResult<Option<T>> {
        match self.items.pop() {
            Some(item) => {
                self.gate.mutated()?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    /// Append every element of `items`. One notification for the whole bulk;
    /// an empty iterator is silent.
    pub fn extend<I>(&mut self, items: I) -> ListResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        let before = self.items.len();
        self.items.extend(items);
        if self.items.len() > before {
            self.gate.mutated()
        } else {
            Ok(())
        }
    }

    /// Keep only the elements for which `keep` returns true. One
    /// notification iff anything was dropped.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> ListResult<()> {
        let before = self.items.len();
        self.items.retain(keep);
        if self.items.len() < before {
            self.gate.mutated()
        } else {
            Ok(())
        }
    }

    /// Remove all elements. Silent when already empty.
    pub fn clear(&mut self) -> ListResult<()> {
        if self.items.is_empty() {
            return Ok(());
        }
        self.items.clear();
        self.gate.mutated()
    }

    /// Swap in entirely new contents. Silent only when both the old and the
    /// new contents are empty.
    pub fn replace<I>(&mut self, items: I) -> ListResult<()>
    where
        I: IntoIterator<Item = T>,
    {
        let fresh: Vec<T> = items.into_iter().collect();
        if self.items.is_empty() && fresh.is_empty() {
            return Ok(());
        }
        self.items = fresh;
        self.gate.mutated()
    }

    // -----------------------------------------------------------------------
    // Batching
    // -----------------------------------------------------------------------

    /// Run `f` with notifications deferred; flush at most one when the scope
    /// closes.
    ///
    /// The close runs on every exit path. If `f` panics, the unwind still
    /// closes the batch and attempts the deferred notification, logging (not
    /// returning) any sink error.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> ListResult<R> {
        let closer = BatchCloser::begin(Rc::clone(&self.gate));
        let value = f(self);
        closer.finish()?;
        Ok(value)
    }

    /// Open a batch level without a scope. Prefer [`List::batch`].
    pub fn begin_batch(&mut self) {
        self.gate.begin();
    }

    /// Close one batch level; see [`GrammarList::end_batch`].
    pub fn end_batch(&mut self) -> ListResult<()> {
        self.gate.end()
    }

    /// Whether a batch is currently open.
    #[must_use]
    pub fn is_batching(&self) -> bool {
        self.gate.is_batching()
    }

    // -----------------------------------------------------------------------
    // Engine binding
    // -----------------------------------------------------------------------

    /// Bind to an engine sink. Does not notify; the engine is expected to
    /// read the current contents when it loads the referencing rule.
    pub fn attach(&mut self, sink: Rc<dyn UpdateSink>) {
        self.gate.attach(sink);
    }

    /// Unbind the sink. Later mutations still commit, silently.
    pub fn detach(&mut self) {
        self.gate.detach();
    }

    // -----------------------------------------------------------------------
    // Read access — never notifies.
    // -----------------------------------------------------------------------

    /// The name the engine knows this list by.
    #[must_use]
    pub fn name(&self) -> &str {
        self.gate.name()
    }

    /// Revision counter: bumped once per committed logical change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.gate.revision()
    }

    /// Element at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// The contents as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate over the contents in order.
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: PartialEq> List<T> {
    /// Remove the first occurrence of `item`. Returns whether anything was
    /// removed; an absent element is silent.
    pub fn remove(&mut self, item: &T) -> ListResult<bool> {
        match self.items.iter().position(|existing| existing == item) {
            Some(index) => {
                self.items.remove(index);
                self.gate.mutated()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether the list contains `item`.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }
}

impl<T> GrammarList for List<T> {
    fn name(&self) -> &str {
        self.gate.name()
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn revision(&self) -> u64 {
        self.gate.revision()
    }

    fn is_batching(&self) -> bool {
        self.gate.is_batching()
    }

    fn attach(&mut self, sink: Rc<dyn UpdateSink>) {
        List::attach(self, sink);
    }

    fn detach(&mut self) {
        List::detach(self);
    }

    fn begin_batch(&mut self) {
        List::begin_batch(self);
    }

    fn end_batch(&mut self) -> ListResult<()> {
        List::end_batch(self)
    }

    fn clear(&mut self) -> ListResult<()> {
        List::clear(self)
    }
}

impl<T> Index<usize> for List<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("name", &self.gate.name())
            .field("items", &self.items)
            .finish()
    }
}
