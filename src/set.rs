// =====================================================================
// File: set.rs
//
// Description:
//   Unique-key ordered set, built on the shared `Tree` engine with
//   value-less records -- the same `BTreeMap<T, ()>` encoding
//   `std::collections::BTreeSet` uses internally.
// =====================================================================
use crate::branching::BranchingFactor;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::OrderedResult;
use crate::tree::Cursor;
use crate::tree::engine::Tree;
use crate::views::Keys;

/// An ordered collection of unique keys.
///
/// ```
/// use ordered_containers::OrderedSet;
///
/// let mut set = OrderedSet::new();
/// assert!(set.insert(3));
/// assert!(!set.insert(3));
/// assert!(set.contains(&3));
/// ```
pub struct OrderedSet<K, C = NaturalOrder<K>> {
    tree: Tree<K, (), C>,
}

impl<K, C: Comparator<K> + Default> OrderedSet<K, C> {
    /// Builds an empty set with the default branching factor and comparator.
    pub fn new() -> Self {
        Self { tree: Tree::new() }
    }

    /// Builds an empty set with a caller-chosen branching factor.
    ///
    /// # Errors
    /// Returns [`crate::error::OrderedContainerError::InvalidBranchingFactor`]
    /// if `branching_factor < 4`.
    pub fn with_branching_factor(branching_factor: usize) -> OrderedResult<Self> {
        let b = BranchingFactor::new(branching_factor)?;
        Ok(Self { tree: Tree::with_branching_factor(b) })
    }
}

impl<K, C: Comparator<K> + Default> Default for OrderedSet<K, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C: Comparator<K>> OrderedSet<K, C> {
    /// Builds an empty set using a custom comparator in place of natural order.
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

    /// Inserts `key`, returning `true` if it was not already present.
    pub fn insert(&mut self, key: K) -> bool {
        self.tree.insert_unique(key, ()).1
    }

    pub fn contains(&self, key: &K) -> bool {
        self.tree.contains(key)
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

    /// Removes the record at `cursor`, returning the removed key and a
    /// cursor to its successor.
    pub fn remove_at(&mut self, cursor: Cursor) -> (K, Cursor) {
        let ((key, ()), successor) = self.tree.remove_at(cursor);
        (key, successor)
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

    pub fn get_key(&self, cursor: &Cursor) -> &K {
        cursor.deref(&self.tree).0
    }

    pub fn iter(&self) -> Keys<'_, K, (), C> {
        crate::views::keys(&self.tree)
    }
}

impl<'a, K, C: Comparator<K>> IntoIterator for &'a OrderedSet<K, C> {
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
    fn insert_reports_whether_key_was_new() {
        let mut set: OrderedSet<i32> = OrderedSet::new();
        assert!(set.insert(5));
        assert!(!set.insert(5));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn iterates_in_order() {
        let mut set: OrderedSet<i32> = OrderedSet::new();
        for k in [5, 1, 3, 2, 4] {
            set.insert(k);
        }
        let collected: Vec<_> = set.iter().copied().collect();
        assert_eq!(collected, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn erase_missing_key_is_a_no_op() {
        let mut set: OrderedSet<i32> = OrderedSet::new();
        set.insert(1);
        assert_eq!(set.erase(&2), 0);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_at_returns_successor() {
        let mut set: OrderedSet<i32> = OrderedSet::new();
        for k in [1, 2, 3] {
            set.insert(k);
        }
        let cursor = set.find(&2);
        let (removed, succ) = set.remove_at(cursor);
        assert_eq!(removed, 2);
        assert_eq!(*set.get_key(&succ), 3);
    }

    #[test]
    fn survives_many_insertions_and_removals() {
        let mut set: OrderedSet<i32> = OrderedSet::with_branching_factor(4).unwrap();
        for k in 0..500 {
            set.insert(k);
        }
        for k in (0..500).step_by(2) {
            assert_eq!(set.erase(&k), 1);
        }
        let remaining: Vec<_> = set.iter().copied().collect();
        let expected: Vec<_> = (1..500).step_by(2).collect();
        assert_eq!(remaining, expected);
    }
}
