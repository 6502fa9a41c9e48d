#![forbid(unsafe_code)]

//! [`DictList<K, V>`]: a named key→value mapping with the same update
//! discipline as [`List`](crate::List).
//!
//! Typical use pairs a spoken form (key) with the value a rule should
//! produce when that form is recognized. Iteration order is unspecified.
//!
//! There is no `get_mut`: mutating a value in place would bypass the update
//! gate. Re-[`insert`](DictList::insert) instead.

use core::borrow::Borrow;
use core::fmt;
use core::hash::Hash;
use std::rc::Rc;

use ahash::AHashMap;

use crate::base::{BatchCloser, GrammarList, UpdateGate};
use crate::error::ListResult;
use crate::sink::UpdateSink;

/// A named key→value mapping backing a grammar rule.
pub struct DictList<K, V> {
    entries: AHashMap<K, V>,
    gate: Rc<UpdateGate>,
}

impl<K: Eq + Hash, V> DictList<K, V> {
    /// Create an empty mapping. No notification fires on construction.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            entries: AHashMap::new(),
            gate: UpdateGate::new(name),
        }
    }

    /// Create a mapping with initial entries. No notification fires.
    #[must_use]
    pub fn from_entries<I>(name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            entries: entries.into_iter().collect(),
            gate: UpdateGate::new(name),
        }
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    /// Insert or overwrite one entry, returning the previous value.
    ///
    /// Always counts as a change; value equality is not consulted.
    pub fn insert(&mut self, key: K, value: V) -> ListResult<Option<V>> {
        let previous = self.entries.insert(key, value);
        self.gate.mutated()?;
        Ok(previous)
    }

    /// Remove one entry, returning its value. An absent key is silent.
    pub fn remove<Q>(&mut self, key: &Q) -> ListResult<Option<V>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self.entries.remove(key) {
            Some(value) => {
                self.gate.mutated()?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Insert or overwrite many entries as one logical change: at most one
    /// notification, an empty iterator is silent.
    pub fn bulk_update<I>(&mut self, entries: I) -> ListResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut changed = false;
        for (key, value) in entries {
            self.entries.insert(key, value);
            changed = true;
        }
        if changed {
            self.gate.mutated()
        } else {
            Ok(())
        }
    }

    /// Keep only the entries for which `keep` returns true. One notification
    /// iff anything was dropped.
    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) -> ListResult<()> {
        let before = self.entries.len();
        self.entries.retain(keep);
        if self.entries.len() < before {
            self.gate.mutated()
        } else {
            Ok(())
        }
    }

    /// Remove all entries. Silent when already empty.
    pub fn clear(&mut self) -> ListResult<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        self.entries.clear();
        self.gate.mutated()
    }

    /// Swap in entirely new contents. Silent only when both the old and the
    /// new contents are empty.
    pub fn replace<I>(&mut self, entries: I) -> ListResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let fresh: AHashMap<K, V> = entries.into_iter().collect();
        if self.entries.is_empty() && fresh.is_empty() {
            return Ok(());
        }
        self.entries = fresh;
        self.gate.mutated()
    }

    // -----------------------------------------------------------------------
    // Batching
    // -----------------------------------------------------------------------

    /// Run `f` with notifications deferred; flush at most one when the scope
    /// closes. Same unwind behavior as [`List::batch`](crate::List::batch).
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> ListResult<R> {
        let closer = BatchCloser::begin(Rc::clone(&self.gate));
        let value = f(self);
        closer.finish()?;
        Ok(value)
    }

    /// Open a batch level without a scope. Prefer [`DictList::batch`].
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

    /// Bind to an engine sink. Does not notify.
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

    /// The name the engine knows this mapping by.
    #[must_use]
    pub fn name(&self) -> &str {
        self.gate.name()
    }

    /// Revision counter: bumped once per committed logical change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.gate.revision()
    }

    /// Value for `key`, if any.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key)
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Iterate over keys (unspecified order).
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Iterate over values (unspecified order).
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    /// Iterate over entries (unspecified order).
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> GrammarList for DictList<K, V> {
    fn name(&self) -> &str {
        self.gate.name()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn revision(&self) -> u64 {
        self.gate.revision()
    }

    fn is_batching(&self) -> bool {
        self.gate.is_batching()
    }

    fn attach(&mut self, sink: Rc<dyn UpdateSink>) {
        DictList::attach(self, sink);
    }

    fn detach(&mut self) {
        DictList::detach(self);
    }

    fn begin_batch(&mut self) {
        DictList::begin_batch(self);
    }

    fn end_batch(&mut self) -> ListResult<()> {
        DictList::end_batch(self)
    }

    fn clear(&mut self) -> ListResult<()> {
        DictList::clear(self)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for DictList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictList")
            .field("name", &self.gate.name())
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SinkError;
    use std::cell::Cell;

    fn attached_dict() -> (DictList<String, i32>, Rc<Cell<usize>>) {
        let mut dict = DictList::new("spoken");
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        dict.attach(Rc::new(move |_: &str| -> Result<(), SinkError> {
            c.set(c.get() + 1);
            Ok(())
        }));
        (dict, count)
    }

    #[test]
    fn construction_does_not_notify() {
        let (dict, count) = attached_dict();
        assert_eq!(count.get(), 0);
        assert_eq!(dict.name(), "spoken");
    }

    #[test]
    fn insert_notifies_and_returns_previous() {
        let (mut dict, count) = attached_dict();
        assert_eq!(dict.insert("one".to_string(), 1).unwrap(), None);
        assert_eq!(dict.insert("one".to_string(), 10).unwrap(), Some(1));
        assert_eq!(count.get(), 2);
        assert_eq!(dict.get("one"), Some(&10));
    }

    #[test]
    fn remove_absent_is_silent() {
        let (mut dict, count) = attached_dict();
        assert_eq!(dict.remove("ghost").unwrap(), None);
        assert_eq!(count.get(), 0);
        assert_eq!(dict.revision(), 0);
    }

    #[test]
    fn remove_present_notifies() {
        let (mut dict, count) = attached_dict();
        dict.insert("one".to_string(), 1).unwrap();
        assert_eq!(dict.remove("one").unwrap(), Some(1));
        assert_eq!(count.get(), 2);
        assert!(dict.is_empty());
    }

    #[test]
    fn bulk_update_notifies_once() {
        let (mut dict, count) = attached_dict();
        dict.bulk_update((0..20).map(|n| (n.to_string(), n))).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(dict.len(), 20);
        assert_eq!(dict.revision(), 1);
    }

    #[test]
    fn bulk_update_empty_is_silent() {
        let (mut dict, count) = attached_dict();
        dict.bulk_update(std::iter::empty()).unwrap();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn retain_notifies_only_when_dropping() {
        let (mut dict, count) = attached_dict();
        dict.bulk_update([("a".to_string(), 1), ("b".to_string(), 2)])
            .unwrap();
        dict.retain(|_, v| *v > 1).unwrap();
        assert_eq!(count.get(), 2);
        assert_eq!(dict.len(), 1);

        dict.retain(|_, _| true).unwrap();
        assert_eq!(count.get(), 2, "no-op retain is silent");
    }

    #[test]
    fn clear_and_replace_policies() {
        let (mut dict, count) = attached_dict();
        dict.clear().unwrap();
        dict.replace(std::iter::empty()).unwrap();
        assert_eq!(count.get(), 0, "empty-to-empty transitions are silent");

        dict.insert("a".to_string(), 1).unwrap();
        dict.replace([("b".to_string(), 2)]).unwrap();
        dict.clear().unwrap();
        assert_eq!(count.get(), 3);
        assert!(dict.is_empty());
    }

    #[test]
    fn batch_coalesces_to_one() {
        let (mut dict, count) = attached_dict();
        dict.batch(|d| {
            d.insert("a".to_string(), 1)?;
            d.insert("b".to_string(), 2)?;
            d.remove("a").map(|_| ())
        })
        .unwrap()
        .unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn nested_batch_defers_to_outermost() {
        let (mut dict, count) = attached_dict();
        dict.begin_batch();
        dict.insert("a".to_string(), 1).unwrap();
        dict.begin_batch();
        dict.insert("b".to_string(), 2).unwrap();
        dict.end_batch().unwrap();
        assert_eq!(count.get(), 0);
        dict.end_batch().unwrap();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn end_batch_without_begin_fails() {
        let (mut dict, _count) = attached_dict();
        assert!(matches!(
            dict.end_batch(),
            Err(crate::ListError::NotBatching { .. })
        ));
    }

    #[test]
    fn sink_error_after_commit() {
        let mut dict: DictList<String, i32> = DictList::new("spoken");
        dict.attach(Rc::new(|_: &str| -> Result<(), SinkError> {
            Err("engine down".into())
        }));

        let err = dict.insert("a".to_string(), 1).expect_err("sink failure");
        assert!(matches!(err, crate::ListError::Sink { .. }));
        assert_eq!(dict.get("a"), Some(&1), "the change itself committed");
    }

    #[test]
    fn read_access_never_notifies() {
        let (mut dict, count) = attached_dict();
        dict.bulk_update([("a".to_string(), 1), ("b".to_string(), 2)])
            .unwrap();
        let fired = count.get();

        assert!(dict.contains_key("a"));
        assert_eq!(dict.keys().count(), 2);
        assert_eq!(dict.values().count(), 2);
        assert_eq!(dict.iter().count(), 2);
        let _ = format!("{dict:?}");
        assert_eq!(count.get(), fired);
    }

    #[test]
    fn trait_object_surface() {
        let (mut dict, count) = attached_dict();
        dict.insert("a".to_string(), 1).unwrap();
        let dyn_list: &mut dyn GrammarList = &mut dict;
        assert_eq!(dyn_list.len(), 1);
        dyn_list.clear().unwrap();
        assert_eq!(count.get(), 2);
    }
}
