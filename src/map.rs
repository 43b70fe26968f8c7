// =====================================================================
// File: map.rs
//
// Description:
//   Unique-key ordered map. `insert` never overwrites an existing key
//   (mirroring `set`/`multiset`/`multimap`'s own `insert`); overwriting
//   is the separate `insert_or_assign`/`set` operations, matching the
//   reference implementation's distinction between the two. The
//   reference implementation's indexed access (`tree[key]`) inserts
//   `V::default()` on a miss rather than panicking; we keep that
//   behavior, but gate it behind a separate impl block bounded on
//   `V: Default` so a map over a value type with no sensible default
//   simply never offers the method, instead of panicking at runtime.
// =====================================================================
use crate::branching::BranchingFactor;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::OrderedResult;
use crate::tree::Cursor;
use crate::tree::engine::Tree;
use crate::views::{Items, Keys, Values};

/// An ordered collection of unique keys, each mapped to one value.
pub struct OrderedMap<K, V, C = NaturalOrder<K>> {
    tree: Tree<K, V, C>,
}

impl<K, V, C: Comparator<K> + Default> OrderedMap<K, V, C> {
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    pub fn with_branching_factor(branching_factor: usize) -> OrderedResult<Self> {
        let b = BranchingFactor::new(branching_factor)?;
        Ok(Self { tree: Tree::with_branching_factor(b) })
    }
}

impl<K, V, C: Comparator<K> + Default> Default for OrderedMap<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> OrderedMap<K, V, C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self { tree: Tree::with_branching(BranchingFactor::default(), comparator) }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.tree.contains(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.tree.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.tree.get_mut(key)
    }

    /// Inserts `key`/`value` only if no equivalent key is already present.
    /// Returns a cursor to the (possibly pre-existing) record and whether
    /// an insertion actually happened; on a hit, the existing value is
    /// left unmodified (spec §4.2's `insert(record)` contract).
    pub fn insert(&mut self, key: K, value: V) -> (Cursor, bool) {
        self.tree.insert_unique(key, value)
    }

    /// Inserts `key`/`value`, overwriting the value of an equivalent
    /// existing key in place instead of leaving it untouched. Returns a
    /// cursor to the record and whether a fresh record was added (`true`)
    /// or an existing one was overwritten (`false`).
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (Cursor, bool) {
        self.tree.insert_or_assign(key, value)
    }

    /// Indexed write: sets the value for `key`, inserting it if absent
    /// and overwriting it if present (`tree[key] = value`).
    pub fn set(&mut self, key: K, value: V) {
        self.tree.insert_or_assign(key, value);
    }

    /// Indexed delete: removes `key`, returning its value.
    ///
    /// # Errors
    /// Returns [`crate::error::OrderedContainerError::KeyNotFound`] if
    /// `key` is not present (spec §7's recoverable "no-such-key" signal
    /// on indexed delete); the map is left unchanged.
    pub fn delete(&mut self, key: &K) -> OrderedResult<V> {
        self.tree.erase_unique(key).map(|(_, v)| v)
    }

    /// Removes `key` if present. Returns `1` if a record was removed, `0`
    /// if `key` was not present (never fails: spec §6's `erase(k) -> int`
    /// is a non-failing operation on every facade).
    pub fn erase(&mut self, key: &K) -> usize {
        match self.tree.erase_unique(key) {
            Ok(_) => 1,
            Err(_) => 0,
        }
    }

    pub fn remove_at(&mut self, cursor: Cursor) -> ((K, V), Cursor) {
        self.tree.remove_at(cursor)
    }

    pub fn find(&self, key: &K) -> Cursor {
        self.tree.find(key)
    }

    pub fn lower_bound(&self, key: &K) -> Cursor {
        self.tree.lower_bound(key)
    }

    pub fn upper_bound(&self, key: &K) -> Cursor {
        self.tree.upper_bound(key)
    }

    pub fn begin(&self) -> Cursor {
        self.tree.begin()
    }

    pub fn end(&self) -> Cursor {
        self.tree.end()
    }

    /// Moves `cursor` to the successor position.
    pub fn advance(&self, cursor: Cursor) -> Cursor {
        cursor.advance(&self.tree)
    }

    /// Moves `cursor` to the predecessor position.
    pub fn retreat(&self, cursor: Cursor) -> Cursor {
        cursor.retreat(&self.tree)
    }

    pub fn get_at(&self, cursor: &Cursor) -> (&K, &V) {
        cursor.deref(&self.tree)
    }

    pub fn keys(&self) -> Keys<'_, K, V, C> {
        crate::views::keys(&self.tree)
    }

    pub fn values(&self) -> Values<'_, K, V, C> {
        crate::views::values(&self.tree)
    }

    pub fn iter(&self) -> Items<'_, K, V, C> {
        crate::views::items(&self.tree)
    }
}

/// Default-on-index access: only available when `V: Default`, matching
/// the reference implementation's `tree[missing_key]` behavior of
/// materializing a default value rather than panicking.
impl<K, V: Default, C: Comparator<K>> OrderedMap<K, V, C> {
    /// Returns the value for `key`, inserting `V::default()` first if it
    /// is not already present.
    pub fn get_or_default(&mut self, key: K) -> &mut V {
        self.tree.get_or_insert_with(key, V::default)
    }
}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a OrderedMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Items<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_does_not_overwrite_an_existing_key() {
        let mut map: OrderedMap<i32, &'static str> = OrderedMap::new();
        assert!(map.insert(1, "a").1);
        assert!(!map.insert(1, "b").1);
        assert_eq!(map.get(&1), Some(&"a"));
    }

    #[test]
    fn insert_or_assign_overwrites_an_existing_key() {
        let mut map: OrderedMap<i32, &'static str> = OrderedMap::new();
        assert!(map.insert_or_assign(1, "a").1);
        assert!(!map.insert_or_assign(1, "b").1);
        assert_eq!(map.get(&1), Some(&"b"));
    }

    #[test]
    fn set_is_indexed_write_and_overwrites() {
        let mut map: OrderedMap<i32, i32> = OrderedMap::new();
        map.set(1, 10);
        map.set(1, 20);
        assert_eq!(map.get(&1), Some(&20));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn default_on_index_materializes_default_value() {
        let mut map: OrderedMap<i32, i32> = OrderedMap::new();
        *map.get_or_default(1) += 5;
        assert_eq!(map.get(&1), Some(&5));
    }

    #[test]
    fn iterates_pairs_in_key_order() {
        let mut map: OrderedMap<i32, i32> = OrderedMap::new();
        map.insert(3, 30);
        map.insert(1, 10);
        map.insert(2, 20);
        let collected: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(collected, vec![(1, 10), (2, 20), (3, 30)]);
    }

    #[test]
    fn delete_missing_key_errors() {
        let mut map: OrderedMap<i32, i32> = OrderedMap::new();
        assert!(map.delete(&1).is_err());
    }

    #[test]
    fn erase_missing_key_is_a_no_op() {
        let mut map: OrderedMap<i32, i32> = OrderedMap::new();
        map.insert(1, 10);
        assert_eq!(map.erase(&2), 0);
        assert_eq!(map.erase(&1), 1);
        assert!(map.is_empty());
    }
}
