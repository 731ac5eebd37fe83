//! §4.F.1 `HList<K>`: the key-only (set-like) specialization over
//! [`HashTable`], grounded on the same adapter file's `Key_T`-only
//! instantiation path.

use super::hash_table::HashTable;
use super::key::HashKey;
use crate::mem::Reserver;

pub struct HList<'r, K, const ALIGNMENT: usize, const BLOCK_SIZE: usize, const EXPANSION: usize = 2>
{
    table: HashTable<'r, K, (), ALIGNMENT, BLOCK_SIZE, EXPANSION>,
}

impl<'r, K, const ALIGNMENT: usize, const BLOCK_SIZE: usize, const EXPANSION: usize>
    HList<'r, K, ALIGNMENT, BLOCK_SIZE, EXPANSION>
{
    pub fn new(reserver: &'r Reserver<ALIGNMENT, BLOCK_SIZE>) -> Self {
        Self {
            table: HashTable::new(reserver),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns `true` if `key` was newly inserted, `false` if already present.
    pub fn insert(&mut self, key: K) -> bool
    where
        K: HashKey,
    {
        let before = self.table.len();
        self.table.get_or_insert_with(key, || ());
        self.table.len() != before
    }

    pub fn contains(&self, key: &K) -> bool
    where
        K: HashKey,
    {
        self.table.get(key).is_some()
    }

    pub fn remove(&mut self, key: &K) -> bool
    where
        K: HashKey,
    {
        self.table.remove(key)
    }

    pub fn compress(&mut self)
    where
        K: HashKey,
    {
        self.table.compress();
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.table.iter().map(|(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestReserver = Reserver<16, { 64 * 1024 }>;
    type TestHList<'r, K> = HList<'r, K, 16, { 64 * 1024 }>;

    #[test]
    fn insert_reports_novelty() {
        let r = TestReserver::new();
        let mut l: TestHList<u32> = HList::new(&r);
        assert!(l.insert(1));
        assert!(!l.insert(1));
        assert_eq!(l.len(), 1);
        assert!(l.contains(&1));
    }

    #[test]
    fn remove_then_contains_is_false() {
        let r = TestReserver::new();
        let mut l: TestHList<u32> = HList::new(&r);
        l.insert(5);
        assert!(l.remove(&5));
        assert!(!l.contains(&5));
    }
}
