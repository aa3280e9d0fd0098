//! Items stored alongside a [`Trie`] over their keys.

use super::trie::Trie;
use crate::factored::{FactoredError, PartialAssignment};

/// A vector of items, each keyed by a partial assignment, with trie lookup.
///
/// The item at position `i` is the one whose key received trie id `i`.
#[derive(Debug, Clone)]
pub struct FilterMap<T> {
    trie: Trie,
    items: Vec<T>,
}

impl<T> FilterMap<T> {
    pub fn new(space: Vec<usize>) -> Self {
        Self {
            trie: Trie::new(space),
            items: Vec::new(),
        }
    }

    /// Reuses an existing index for a matching items container.
    ///
    /// Ids the trie has erased keep their item slot.
    ///
    /// # Errors
    ///
    /// `SizeMismatch` if the trie has issued a different number of ids than
    /// there are items.
    pub fn from_parts(trie: Trie, items: Vec<T>) -> Result<Self, FactoredError> {
        if trie.next_id() != items.len() {
            return Err(FactoredError::SizeMismatch {
                expected: trie.next_id(),
                found: items.len(),
            });
        }
        Ok(Self { trie, items })
    }

    /// Stores `item` under `key` and returns its position.
    pub fn insert(&mut self, key: &PartialAssignment, item: T) -> usize {
        let id = self.trie.insert(key);
        debug_assert_eq!(id, self.items.len());
        self.items.push(item);
        id
    }

    /// Drops the entry at `id` from lookups. Returns false if it was not live.
    ///
    /// The item itself stays in place so later positions keep matching ids;
    /// [`items`](Self::items) still yields it.
    pub fn erase(&mut self, id: usize) -> bool {
        self.trie.erase(id)
    }

    /// Items whose key is consistent with a full assignment.
    pub fn filter<'a>(&'a self, full: &[usize]) -> impl Iterator<Item = &'a T> + 'a {
        let ids = self.trie.filter(full);
        ids.into_iter().map(move |id| &self.items[id])
    }

    /// Items whose key is consistent with a partial assignment.
    pub fn filter_partial<'a>(&'a self, query: &PartialAssignment) -> impl Iterator<Item = &'a T> + 'a {
        let ids = self.trie.filter_partial(query);
        ids.into_iter().map(move |id| &self.items[id])
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    pub fn into_parts(self) -> (Trie, Vec<T>) {
        (self.trie, self.items)
    }
}
