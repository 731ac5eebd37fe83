//! §4.F.1 `HArray<K,V>`: the ordered hash-array public face over
//! [`HashTable`], grounded on `original_source/Include/Qentem/HArray.hpp`.

use super::hash_table::HashTable;
use super::key::HashKey;
use crate::mem::Reserver;

pub struct HArray<'r, K, V, const ALIGNMENT: usize, const BLOCK_SIZE: usize, const EXPANSION: usize = 2>
{
    table: HashTable<'r, K, V, ALIGNMENT, BLOCK_SIZE, EXPANSION>,
}

impl<'r, K, V, const ALIGNMENT: usize, const BLOCK_SIZE: usize, const EXPANSION: usize>
    HArray<'r, K, V, ALIGNMENT, BLOCK_SIZE, EXPANSION>
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

    /// Gets (or default-inserts) the value for `key` (§4.F `Get`/`operator[]`).
    pub fn get(&mut self, key: K) -> &mut V
    where
        K: HashKey,
        V: Default,
    {
        self.table.get_or_insert_with(key, V::default)
    }

    /// Inserts or overwrites the value for `key`.
    pub fn insert(&mut self, key: K, value: V)
    where
        K: HashKey,
    {
        self.table.insert(key, value);
    }

    pub fn get_value(&self, key: &K) -> Option<&V>
    where
        K: HashKey,
    {
        self.table.get(key)
    }

    pub fn get_value_mut(&mut self, key: &K) -> Option<&mut V>
    where
        K: HashKey,
    {
        self.table.get_mut(key)
    }

    /// Direct access by insertion-ordered position, not hash bucket (§4.F).
    pub fn get_value_at(&self, index: usize) -> Option<&V> {
        self.table.get_value_at(index)
    }

    pub fn get_key_at(&self, index: usize) -> Option<&K> {
        self.table.get_key_at(index)
    }

    pub fn remove(&mut self, key: &K) -> bool
    where
        K: HashKey,
    {
        self.table.remove(key)
    }

    pub fn rename(&mut self, old_key: &K, new_key: K) -> bool
    where
        K: HashKey,
    {
        self.table.rename(old_key, new_key)
    }

    pub fn compress(&mut self)
    where
        K: HashKey,
    {
        self.table.compress();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.table.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestReserver = Reserver<16, { 64 * 1024 }>;
    type TestHArray<'r, K, V> = HArray<'r, K, V, 16, { 64 * 1024 }>;

    #[test]
    fn get_auto_vivifies_default() {
        let r = TestReserver::new();
        let mut a: TestHArray<String, u32> = HArray::new(&r);
        *a.get("hits".to_string()) += 1;
        *a.get("hits".to_string()) += 1;
        assert_eq!(a.get_value(&"hits".to_string()), Some(&2));
    }

    #[test]
    fn insertion_order_survives_at_index_access() {
        let r = TestReserver::new();
        let mut a: TestHArray<u32, &'static str> = HArray::new(&r);
        a.insert(1, "first");
        a.insert(2, "second");
        assert_eq!(a.get_value_at(0), Some(&"first"));
        assert_eq!(a.get_value_at(1), Some(&"second"));
    }
}
