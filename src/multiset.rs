// =====================================================================
// File: multiset.rs
//
// Description:
//   Ordered multiset: like `OrderedSet`, but duplicate keys are allowed
//   and are kept in insertion order among themselves, via a right-of-
//   equal tie-break on insert.
// =====================================================================
use crate::branching::BranchingFactor;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::OrderedResult;
use crate::tree::Cursor;
use crate::tree::engine::Tree;
use crate::views::Keys;

/// An ordered collection that permits duplicate keys.
pub struct OrderedMultiSet<K, C = NaturalOrder<K>> {
    tree: Tree<K, (), C>,
}

impl<K, C: Comparator<K> + Default> OrderedMultiSet<K, C> {
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    pub fn with_branching_factor(branching_factor: usize) -> OrderedResult<Self> {
        let b = BranchingFactor::new(branching_factor)?;
        Ok(Self { tree: Tree::with_branching_factor(b) })
    }
}

impl<K, C: Comparator<K> + Default> Default for OrderedMultiSet<K, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C: Comparator<K>> OrderedMultiSet<K, C> {
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

    /// Inserts `key`, always, to the right of any equivalent keys already
    /// present. Returns a cursor to the newly-inserted record.
    pub fn insert(&mut self, key: K) -> Cursor {
        self.tree.insert_multi(key, ())
    }

    pub fn contains(&self, key: &K) -> bool {
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

    /// Removes every record equivalent to `key`, returning how many were
    /// removed.
    pub fn erase(&mut self, key: &K) -> usize {
        self.tree.erase_multi(key)
    }

    pub fn remove_at(&mut self, cursor: Cursor) -> (K, Cursor) {
        let ((key, ()), successor) = self.tree.remove_at(cursor);
        (key, successor)
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

    pub fn get_key(&self, cursor: &Cursor) -> &K {
        cursor.deref(&self.tree).0
    }

    pub fn iter(&self) -> Keys<'_, K, (), C> {
        crate::views::keys(&self.tree)
    }
}

impl<'a, K, C: Comparator<K>> IntoIterator for &'a OrderedMultiSet<K, C> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, (), C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_and_counts_duplicates() {
        let mut ms: OrderedMultiSet<i32> = OrderedMultiSet::new();
        for _ in 0..3 {
            ms.insert(7);
        }
        ms.insert(2);
        assert_eq!(ms.count(&7), 3);
        assert_eq!(ms.len(), 4);
    }

    #[test]
    fn keeps_equal_keys_in_insertion_order() {
        let mut ms: OrderedMultiSet<(i32, &'static str)> = OrderedMultiSet::new();
        ms.insert((1, "a"));
        ms.insert((1, "b"));
        ms.insert((1, "c"));
        let got: Vec<_> = ms.iter().map(|(_, tag)| *tag).collect();
        assert_eq!(got, vec!["a", "b", "c"]);
    }

    #[test]
    fn erase_removes_all_equivalent_keys() {
        let mut ms: OrderedMultiSet<i32> = OrderedMultiSet::new();
        for _ in 0..4 {
            ms.insert(1);
        }
        ms.insert(2);
        assert_eq!(ms.erase(&1), 4);
        assert_eq!(ms.len(), 1);
        assert_eq!(ms.count(&1), 0);
    }
}
