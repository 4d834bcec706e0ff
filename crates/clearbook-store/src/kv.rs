//! Host key-value store interface and the in-memory backend.
//!
//! The engine only needs an ordered byte store: point get/set/delete and
//! prefix iteration in both directions over lexicographic key order. Any
//! host store offering that can back an [`OrderStore`](crate::OrderStore).

use std::collections::BTreeMap;
use std::ops::Bound;

use clearbook_types::{ClearbookError, Result};

use crate::keys::prefix_end;

/// A key/value pair yielded by prefix iteration.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Boxed cursor over a key range. Dropping it releases the cursor.
pub type KvIter<'a> = Box<dyn Iterator<Item = Result<KvPair>> + 'a>;

/// Iteration direction over ascending key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Traversal {
    Forward,
    Reverse,
}

/// Ordered byte storage provided by the host.
///
/// Faults are reported as [`ClearbookError::Storage`](clearbook_types::ClearbookError::Storage)
/// and propagated unchanged; the engine never retries.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()>;

    /// Remove `key`. Removing an absent key succeeds.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Iterate all entries whose key starts with `prefix`.
    fn iter_prefix<'a>(&'a self, prefix: &[u8], traversal: Traversal) -> Result<KvIter<'a>>;

    fn has(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// `BTreeMap`-backed store. Keys sort lexicographically, as in the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.entries.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn iter_prefix<'a>(&'a self, prefix: &[u8], traversal: Traversal) -> Result<KvIter<'a>> {
        let upper = prefix_end(prefix).map_or(Bound::Unbounded, Bound::Excluded);
        let range = self
            .entries
            .range((Bound::Included(prefix.to_vec()), upper))
            .map(|(k, v)| Ok::<KvPair, ClearbookError>((k.clone(), v.clone())));

        let iter: KvIter<'a> = match traversal {
            Traversal::Forward => Box::new(range),
            Traversal::Reverse => Box::new(range.rev()),
        };
        Ok(iter)
    }
}
