// =====================================================================
// File: multimap.rs
//
// Description:
//   Ordered multimap: like `OrderedMap`, but a key may appear more than
//   once, with duplicates kept in insertion order among themselves via
//   a right-of-equal tie-break on insert. No indexed access is exposed:
//   with more than one value possible per key, a single `get`/`get_mut`
//   has no unambiguous target.
// =====================================================================
use crate::branching::BranchingFactor;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::OrderedResult;
use crate::tree::Cursor;
use crate::tree::engine::Tree;
use crate::views::{Items, Keys, Values};

/// An ordered collection of key-value pairs that permits duplicate keys.
pub struct OrderedMultiMap<K, V, C = NaturalOrder<K>> {
    tree: Tree<K, V, C>,
}

impl<K, V, C: Comparator<K> + Default> OrderedMultiMap<K, V, C> {
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    pub fn with_branching_factor(branching_factor: usize) -> OrderedResult<Self> {
        let b = BranchingFactor::new(branching_factor)?;
        Ok(Self { tree: Tree::with_branching_factor(b) })
    }
}

impl<K, V, C: Comparator<K> + Default> Default for OrderedMultiMap<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> OrderedMultiMap<K, V, C> {
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

    /// Counts records equivalent to `key`.
    pub fn count(&self, key: &K) -> usize {
        let lo = self.tree.lower_bound(key);
        let hi = self.tree.upper_bound(key);
        let mut n = 0;
        let mut cur = lo;
        while cur != hi {
            n += 1;
            cur = cur.advance(&self.tree);
        }
        n
    }

    /// Inserts `key`/`value`, always, to the right of any equivalent keys
    /// already present. Returns a cursor to the newly-inserted record.
    pub fn insert(&mut self, key: K, value: V) -> Cursor {
        self.tree.insert_multi(key, value)
    }

    /// Removes every record equivalent to `key`, returning how many were
    /// removed.
    pub fn erase(&mut self, key: &K) -> usize {
        self.tree.erase_multi(key)
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

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a OrderedMultiMap<K, V, C> {
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
    fn allows_duplicate_keys_in_insertion_order() {
        let mut mm: OrderedMultiMap<i32, &'static str> = OrderedMultiMap::new();
        mm.insert(1, "a");
        mm.insert(1, "b");
        mm.insert(1, "c");
        let got: Vec<_> = mm.iter().map(|(_, v)| *v).collect();
        assert_eq!(got, vec!["a", "b", "c"]);
        assert_eq!(mm.count(&1), 3);
    }

    #[test]
    fn erase_removes_whole_equal_range() {
        let mut mm: OrderedMultiMap<i32, i32> = OrderedMultiMap::new();
        mm.insert(5, 1);
        mm.insert(5, 2);
        mm.insert(6, 3);
        assert_eq!(mm.erase(&5), 2);
        assert_eq!(mm.len(), 1);
        assert!(!mm.contains_key(&5));
    }

    #[test]
    fn bounds_delimit_the_equal_range() {
        let mut mm: OrderedMultiMap<i32, i32> = OrderedMultiMap::new();
        mm.insert(1, 10);
        mm.insert(2, 20);
        mm.insert(2, 21);
        mm.insert(3, 30);
        let lo = mm.lower_bound(&2);
        let hi = mm.upper_bound(&2);
        assert_eq!(mm.get_at(&lo).1, &20);
        assert_eq!(*mm.get_at(&hi).0, 3);
    }

    #[test]
    fn remove_at_returns_cursor_to_successor() {
        let mut mm: OrderedMultiMap<i32, i32> = OrderedMultiMap::new();
        mm.insert(1, 10);
        mm.insert(1, 11);
        mm.insert(2, 20);
        let cursor = mm.find(&1);
        let (removed, succ) = mm.remove_at(cursor);
        assert_eq!(removed, (1, 10));
        assert_eq!(mm.get_at(&succ), (&1, &11));
    }
}
