// =====================================================================
// File: tree/engine.rs
//
// Description:
//   The shared B-tree engine every facade (set, multiset, map, multimap)
//   is built on: median-split-on-overflow insertion, borrow-then-merge
//   rebalancing on underflow, over a generic `Comparator<K>`-ordered
//   `BranchingFactor` rather than a fixed order and a single key type.
//   Nodes live in the arena defined in `tree::node` rather than behind
//   recursive `Box` ownership, so each one can carry a parent link.
// =====================================================================
use std::sync::atomic::{AtomicU64, Ordering as AtomicUse};

use tracing::{debug, trace};

use crate::branching::BranchingFactor;
use crate::comparator::Comparator;
use crate::error::{OrderedContainerError, OrderedResult};
use crate::tree::cursor::Cursor;
use crate::tree::node::{Node, NodeId, Slot, SlotEntry};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

fn next_tree_id() -> u64 {
    NEXT_TREE_ID.fetch_add(1, AtomicUse::Relaxed)
}

/// The arena-backed B-tree engine shared by every facade in this crate.
///
/// `Tree` is not exposed directly: [`crate::set`], [`crate::multiset`],
/// [`crate::map`] and [`crate::multimap`] each wrap one with the
/// uniqueness/value policy appropriate to that container.
pub(crate) struct Tree<K, V, C> {
    pub(crate) id: u64,
    arena: Vec<SlotEntry<K, V>>,
    free_head: Option<usize>,
    pub(crate) root: Option<NodeId>,
    len: usize,
    branching: BranchingFactor,
    comparator: C,
}

impl<K, V, C: Comparator<K> + Default> Tree<K, V, C> {
    /// Builds a tree with the default branching factor and comparator.
    pub(crate) fn new() -> Self {
        Self::with_branching(BranchingFactor::default(), C::default())
    }

    /// Builds a tree with a caller-chosen branching factor and the
    /// default comparator.
    pub(crate) fn with_branching_factor(branching: BranchingFactor) -> Self {
        Self::with_branching(branching, C::default())
    }
}

impl<K, V, C: Comparator<K>> Tree<K, V, C> {
    /// Builds a tree with a caller-chosen branching factor and comparator.
    pub(crate) fn with_branching(branching: BranchingFactor, comparator: C) -> Self {
        Tree {
            id: next_tree_id(),
            arena: Vec::new(),
            free_head: None,
            root: None,
            len: 0,
            branching,
            comparator,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.free_head = None;
        self.root = None;
        self.len = 0;
    }

    // -- arena bookkeeping -------------------------------------------------

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(free_idx) = self.free_head {
            let entry = &mut self.arena[free_idx];
            let generation = entry.generation;
            self.free_head = match entry.state {
                Slot::Vacant(next) => next,
                Slot::Occupied(_) => unreachable!("free list pointed at an occupied slot"),
            };
            entry.state = Slot::Occupied(node);
            NodeId { index: free_idx, generation }
        } else {
            self.arena.push(SlotEntry { generation: 0, state: Slot::Occupied(node) });
            NodeId { index: self.arena.len() - 1, generation: 0 }
        }
    }

    fn dealloc(&mut self, id: NodeId) {
        let _ = self.take_node(id);
    }

    /// Frees a slot and returns the node that was stored in it, so callers
    /// that absorb a node's contents elsewhere (merge) don't need to clone.
    fn take_node(&mut self, id: NodeId) -> Node<K, V> {
        let entry = &mut self.arena[id.index];
        if entry.generation != id.generation {
            panic!("stale NodeId: node has been freed and its slot reused");
        }
        entry.generation = entry.generation.wrapping_add(1);
        let old = std::mem::replace(&mut entry.state, Slot::Vacant(self.free_head));
        self.free_head = Some(id.index);
        match old {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => unreachable!("generation matched a vacant slot"),
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        let entry = &self.arena[id.index];
        if entry.generation != id.generation {
            panic!("stale NodeId: node has been freed and its slot reused");
        }
        entry.as_occupied()
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        let entry = &mut self.arena[id.index];
        if entry.generation != id.generation {
            panic!("stale NodeId: node has been freed and its slot reused");
        }
        entry.as_occupied_mut()
    }

    fn ensure_root(&mut self) -> NodeId {
        if let Some(root) = self.root {
            return root;
        }
        let id = self.alloc(Node::new_leaf());
        self.root = Some(id);
        id
    }

    fn leftmost_leaf_of(&self, mut id: NodeId) -> NodeId {
        loop {
            let node = self.node(id);
            if node.is_leaf {
                return id;
            }
            id = node.children[0];
        }
    }

    fn rightmost_leaf_of(&self, mut id: NodeId) -> NodeId {
        loop {
            let node = self.node(id);
            if node.is_leaf {
                return id;
            }
            id = *node.children.last().expect("internal node has children");
        }
    }

    // -- read paths ----------------------------------------------------

    /// Finds any node/slot whose key is equivalent to `key`.
    /// Internal nodes carry records too (this is a classic B-tree, not a
    /// B+tree), so a match can terminate the descent early.
    fn search(&self, key: &K) -> Option<(NodeId, usize)> {
        let mut current = self.root?;
        loop {
            let node = self.node(current);
            let slot = node.locate_lower(key, &self.comparator);
            if slot < node.len() && self.comparator.equiv(&node.keys[slot], key) {
                return Some((current, slot));
            }
            if node.is_leaf {
                return None;
            }
            current = node.children[slot];
        }
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    pub(crate) fn find(&self, key: &K) -> Cursor {
        match self.search(key) {
            Some((id, slot)) => Cursor::at(self.id, id, slot),
            None => Cursor::end(self.id),
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.search(key).map(|(id, slot)| &self.node(id).vals[slot])
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.search(key) {
            Some((id, slot)) => Some(&mut self.node_mut(id).vals[slot]),
            None => None,
        }
    }

    /// Leftmost position whose key is `>= key`.
    pub(crate) fn lower_bound(&self, key: &K) -> Cursor {
        let Some(root) = self.root else { return Cursor::end(self.id) };
        let mut candidate = None;
        let mut current = root;
        loop {
            let node = self.node(current);
            let slot = node.locate_lower(key, &self.comparator);
            if slot < node.len() {
                candidate = Some((current, slot));
            }
            if node.is_leaf {
                break;
            }
            current = node.children[slot];
        }
        match candidate {
            Some((id, slot)) => Cursor::at(self.id, id, slot),
            None => Cursor::end(self.id),
        }
    }

    /// Leftmost position whose key is `> key`.
    pub(crate) fn upper_bound(&self, key: &K) -> Cursor {
        let Some(root) = self.root else { return Cursor::end(self.id) };
        let mut candidate = None;
        let mut current = root;
        loop {
            let node = self.node(current);
            let slot = node.locate_upper(key, &self.comparator);
            if slot < node.len() {
                candidate = Some((current, slot));
            }
            if node.is_leaf {
                break;
            }
            current = node.children[slot];
        }
        match candidate {
            Some((id, slot)) => Cursor::at(self.id, id, slot),
            None => Cursor::end(self.id),
        }
    }

    pub(crate) fn begin(&self) -> Cursor {
        match self.root {
            None => Cursor::end(self.id),
            Some(root) => {
                let leaf = self.leftmost_leaf_of(root);
                if self.node(leaf).is_empty() {
                    Cursor::end(self.id)
                } else {
                    Cursor::at(self.id, leaf, 0)
                }
            }
        }
    }

    pub(crate) fn end(&self) -> Cursor {
        Cursor::end(self.id)
    }

    // -- insertion -------------------------------------------------------

    fn descend_to_leaf(&self, key: &K) -> NodeId {
        let mut current = self.root.expect("ensure_root must run before descent");
        loop {
            let node = self.node(current);
            if node.is_leaf {
                return current;
            }
            let slot = node.locate_lower(key, &self.comparator);
            current = node.children[slot];
        }
    }

    /// Like [`descend_to_leaf`](Self::descend_to_leaf), but routes past
    /// separators equal to `key` so a new duplicate always lands to the
    /// right of every existing occurrence (the right-of-equal
    /// tie-break, confirmed against the reference implementation).
    fn descend_to_leaf_right_of_equal(&self, key: &K) -> NodeId {
        let mut current = self.root.expect("ensure_root must run before descent");
        loop {
            let node = self.node(current);
            if node.is_leaf {
                return current;
            }
            let slot = node.locate_upper(key, &self.comparator);
            current = node.children[slot];
        }
    }

    /// Inserts `key` only if no equivalent key is already present.
    /// Returns a cursor to the (possibly pre-existing) record and whether
    /// an insertion actually happened.
    pub(crate) fn insert_unique(&mut self, key: K, val: V) -> (Cursor, bool) {
        if let Some((id, slot)) = self.search(&key) {
            return (Cursor::at(self.id, id, slot), false);
        }
        self.ensure_root();
        let leaf = self.descend_to_leaf(&key);
        let pos = self.node(leaf).locate_lower(&key, &self.comparator);
        self.node_mut(leaf).insert_at(pos, key, val);
        self.len += 1;
        let (id, slot) = self.split_and_propagate(leaf, (leaf, pos));
        (Cursor::at(self.id, id, slot), true)
    }

    /// Inserts `key`, replacing the value of an equivalent existing key
    /// instead of adding a second record. Returns whether a fresh record
    /// was added (`true`) or an existing one was overwritten (`false`).
    pub(crate) fn insert_or_assign(&mut self, key: K, val: V) -> (Cursor, bool) {
        if let Some((id, slot)) = self.search(&key) {
            self.node_mut(id).vals[slot] = val;
            return (Cursor::at(self.id, id, slot), false);
        }
        self.ensure_root();
        let leaf = self.descend_to_leaf(&key);
        let pos = self.node(leaf).locate_lower(&key, &self.comparator);
        self.node_mut(leaf).insert_at(pos, key, val);
        self.len += 1;
        let (id, slot) = self.split_and_propagate(leaf, (leaf, pos));
        (Cursor::at(self.id, id, slot), true)
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `default()`'s result first if no equivalent key is present (spec
    /// §4.4's default-on-index map contract). The closure only runs on a
    /// miss, so building the default value is never paid for on a hit.
    pub(crate) fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, default: F) -> &mut V {
        if let Some((id, slot)) = self.search(&key) {
            return &mut self.node_mut(id).vals[slot];
        }
        self.ensure_root();
        let leaf = self.descend_to_leaf(&key);
        let pos = self.node(leaf).locate_lower(&key, &self.comparator);
        self.node_mut(leaf).insert_at(pos, key, default());
        self.len += 1;
        let (id, slot) = self.split_and_propagate(leaf, (leaf, pos));
        &mut self.node_mut(id).vals[slot]
    }

    /// Always inserts, permitting duplicates, ordered after any existing
    /// equivalent keys (multiset/multimap facades).
    pub(crate) fn insert_multi(&mut self, key: K, val: V) -> Cursor {
        self.ensure_root();
        let leaf = self.descend_to_leaf_right_of_equal(&key);
        let pos = self.node(leaf).locate_upper(&key, &self.comparator);
        self.node_mut(leaf).insert_at(pos, key, val);
        self.len += 1;
        let (id, slot) = self.split_and_propagate(leaf, (leaf, pos));
        Cursor::at(self.id, id, slot)
    }

    /// Splits `node_id` and its ancestors while any are overflowing,
    /// returning the final position of the record originally inserted at
    /// `target` (which may migrate into a sibling or be promoted into an
    /// ancestor as splits cascade upward).
    fn split_and_propagate(&mut self, mut node_id: NodeId, target: (NodeId, usize)) -> (NodeId, usize) {
        let mut target = target;
        loop {
            if self.node(node_id).len() <= self.branching.max_keys() {
                return target;
            }
            let median = self.node(node_id).len() / 2;
            let target_here = target.0 == node_id;
            let target_slot = target.1;

            let (promoted_key, promoted_val, mut right_node) = self.node_mut(node_id).split_off(median);
            let right_children = std::mem::take(&mut right_node.children);
            let right_id = self.alloc(right_node);
            if !right_children.is_empty() {
                self.node_mut(right_id).children = right_children;
                let kids: Vec<NodeId> = self.node(right_id).children.clone();
                for c in kids {
                    self.node_mut(c).parent = Some(right_id);
                }
            }

            if target_here {
                if target_slot < median {
                    target = (node_id, target_slot);
                } else if target_slot > median {
                    target = (right_id, target_slot - median - 1);
                }
                // target_slot == median is resolved below, once we know
                // where the promoted record lands.
            }

            trace!(left = ?node_id, right = ?right_id, "split node");

            match self.node(node_id).parent {
                None => {
                    let mut new_root = Node::new_internal();
                    new_root.keys.push(promoted_key);
                    new_root.vals.push(promoted_val);
                    new_root.children.push(node_id);
                    new_root.children.push(right_id);
                    let new_root_id = self.alloc(new_root);
                    self.node_mut(node_id).parent = Some(new_root_id);
                    self.node_mut(right_id).parent = Some(new_root_id);
                    self.root = Some(new_root_id);
                    debug!(new_root = ?new_root_id, "grew a new root");
                    if target_here && target_slot == median {
                        target = (new_root_id, 0);
                    }
                    return target;
                }
                Some(parent_id) => {
                    self.node_mut(right_id).parent = Some(parent_id);
                    let child_slot = {
                        let parent = self.node(parent_id);
                        parent
                            .children
                            .iter()
                            .position(|&c| c == node_id)
                            .expect("parent link must reference an actual child")
                    };
                    self.node_mut(parent_id).keys.insert(child_slot, promoted_key);
                    self.node_mut(parent_id).vals.insert(child_slot, promoted_val);
                    self.node_mut(parent_id).children.insert(child_slot + 1, right_id);
                    if target_here && target_slot == median {
                        target = (parent_id, child_slot);
                    }
                    node_id = parent_id;
                }
            }
        }
    }

    // -- deletion ----------------------------------------------------------

    /// Removes a single key equivalent to `key`, returning its record.
    /// Errors if none is present.
    pub(crate) fn erase_unique(&mut self, key: &K) -> OrderedResult<(K, V)> {
        match self.search(key) {
            Some((id, slot)) => {
                let removed = self.delete_at(id, slot);
                self.len -= 1;
                Ok(removed)
            }
            None => Err(OrderedContainerError::KeyNotFound),
        }
    }

    /// Removes every record equivalent to `key`, returning how many were
    /// removed (multiset/multimap `erase(key)`).
    pub(crate) fn erase_multi(&mut self, key: &K) -> usize {
        let mut count = 0;
        while let Some((id, slot)) = self.search(key) {
            self.delete_at(id, slot);
            self.len -= 1;
            count += 1;
        }
        count
    }

    /// Removes the record at `cursor`, returning it along with a cursor
    /// to its successor (matching the reference
    /// implementation's remove-returns-next-position behavior).
    ///
    /// `upper_bound(key)` alone is not a correct way to re-derive the
    /// successor: in a multi-variant, if the removed record still has
    /// equal-key duplicates after it, `upper_bound` overshoots straight
    /// past them to the next *distinct* key. So before mutating, we check
    /// whether the in-order successor shares this record's key, and if
    /// so, remember its rank within the equal-key run (the number of
    /// `advance` steps from `lower_bound(key)`) and re-locate it by rank
    /// afterward instead.
    ///
    /// # Panics
    /// Panics on the usual cursor precondition violations: end cursor,
    /// cross-tree use, or a stale (freed) node id.
    pub(crate) fn remove_at(&mut self, cursor: Cursor) -> ((K, V), Cursor) {
        if cursor.tree_id != self.id {
            panic!("cursor used with a tree other than the one it was obtained from");
        }
        let (id, slot) = cursor
            .position
            .expect("removing via the end cursor is a precondition violation");
        let _ = self.node(id); // panics on a stale NodeId before we mutate anything

        let next = cursor.advance(self);
        let same_key_successor = match next.position {
            Some((next_id, next_slot)) => {
                self.comparator.equiv(&self.node(id).keys[slot], &self.node(next_id).keys[next_slot])
            }
            None => false,
        };
        let rank = if same_key_successor {
            let mut probe = self.lower_bound(&self.node(id).keys[slot]);
            let mut r = 0usize;
            while probe.position != Some((id, slot)) {
                probe = probe.advance(self);
                r += 1;
            }
            Some(r)
        } else {
            None
        };

        let removed = self.delete_at(id, slot);
        self.len -= 1;

        let successor = match rank {
            Some(r) => {
                let mut cur = self.lower_bound(&removed.0);
                for _ in 0..r {
                    cur = cur.advance(self);
                }
                cur
            }
            None => self.upper_bound(&removed.0),
        };
        (removed, successor)
    }

    fn delete_at(&mut self, node_id: NodeId, slot: usize) -> (K, V) {
        if self.node(node_id).is_leaf {
            let removed = self.node_mut(node_id).erase_at(slot);
            self.rebalance_from(node_id);
            return removed;
        }

        let left_child = self.node(node_id).children[slot];
        let right_child = self.node(node_id).children[slot + 1];

        if self.node(left_child).len() > self.branching.min_keys() {
            let pred_leaf = self.rightmost_leaf_of(left_child);
            let pred_slot = self.node(pred_leaf).len() - 1;
            let (pk, pv) = self.node_mut(pred_leaf).erase_at(pred_slot);
            let old_key = std::mem::replace(&mut self.node_mut(node_id).keys[slot], pk);
            let old_val = std::mem::replace(&mut self.node_mut(node_id).vals[slot], pv);
            self.rebalance_from(pred_leaf);
            return (old_key, old_val);
        }

        if self.node(right_child).len() > self.branching.min_keys() {
            let succ_leaf = self.leftmost_leaf_of(right_child);
            let (sk, sv) = self.node_mut(succ_leaf).erase_at(0);
            let old_key = std::mem::replace(&mut self.node_mut(node_id).keys[slot], sk);
            let old_val = std::mem::replace(&mut self.node_mut(node_id).vals[slot], sv);
            self.rebalance_from(succ_leaf);
            return (old_key, old_val);
        }

        // Both children are at minimum occupancy: merge them around the
        // separator being deleted, then recurse into the merged node.
        let left_len_before = self.node(left_child).len();
        self.merge_children(node_id, slot);
        self.delete_at(left_child, left_len_before)
    }

    fn rebalance_from(&mut self, mut node_id: NodeId) {
        loop {
            let (len, parent, is_leaf) = {
                let node = self.node(node_id);
                (node.len(), node.parent, node.is_leaf)
            };

            if parent.is_none() {
                if len == 0 {
                    if is_leaf {
                        self.dealloc(node_id);
                        self.root = None;
                    } else {
                        let only_child = self.node(node_id).children[0];
                        self.node_mut(only_child).parent = None;
                        self.root = Some(only_child);
                        self.dealloc(node_id);
                        debug!(new_root = ?only_child, "root demoted, height shrank");
                    }
                }
                return;
            }

            if len >= self.branching.min_keys() {
                return;
            }

            let parent_id = parent.unwrap();
            let child_slot = {
                let parent_node = self.node(parent_id);
                parent_node
                    .children
                    .iter()
                    .position(|&c| c == node_id)
                    .expect("parent link must reference an actual child")
            };

            if child_slot > 0 {
                let left_sib = self.node(parent_id).children[child_slot - 1];
                if self.node(left_sib).len() > self.branching.min_keys() {
                    self.borrow_from_left(parent_id, child_slot);
                    return;
                }
            }
            if child_slot + 1 < self.node(parent_id).children.len() {
                let right_sib = self.node(parent_id).children[child_slot + 1];
                if self.node(right_sib).len() > self.branching.min_keys() {
                    self.borrow_from_right(parent_id, child_slot);
                    return;
                }
            }

            if child_slot > 0 {
                self.merge_children(parent_id, child_slot - 1);
            } else {
                self.merge_children(parent_id, child_slot);
            }
            node_id = parent_id;
        }
    }

    fn borrow_from_left(&mut self, parent_id: NodeId, child_slot: usize) {
        let left_id = self.node(parent_id).children[child_slot - 1];
        let child_id = self.node(parent_id).children[child_slot];

        let left_last = self.node(left_id).len() - 1;
        let (borrowed_key, borrowed_val) = self.node_mut(left_id).erase_at(left_last);
        let sep_key = std::mem::replace(&mut self.node_mut(parent_id).keys[child_slot - 1], borrowed_key);
        let sep_val = std::mem::replace(&mut self.node_mut(parent_id).vals[child_slot - 1], borrowed_val);
        self.node_mut(child_id).insert_at(0, sep_key, sep_val);

        if !self.node(left_id).is_leaf {
            let moved_child = self.node_mut(left_id).children.pop().expect("internal node has children");
            self.node_mut(child_id).children.insert(0, moved_child);
            self.node_mut(moved_child).parent = Some(child_id);
        }
        trace!(parent = ?parent_id, "borrowed record from left sibling");
    }

    fn borrow_from_right(&mut self, parent_id: NodeId, child_slot: usize) {
        let right_id = self.node(parent_id).children[child_slot + 1];
        let child_id = self.node(parent_id).children[child_slot];

        let (borrowed_key, borrowed_val) = self.node_mut(right_id).erase_at(0);
        let sep_key = std::mem::replace(&mut self.node_mut(parent_id).keys[child_slot], borrowed_key);
        let sep_val = std::mem::replace(&mut self.node_mut(parent_id).vals[child_slot], borrowed_val);
        let insert_pos = self.node(child_id).len();
        self.node_mut(child_id).insert_at(insert_pos, sep_key, sep_val);

        if !self.node(right_id).is_leaf {
            let moved_child = self.node_mut(right_id).children.remove(0);
            self.node_mut(child_id).children.push(moved_child);
            self.node_mut(moved_child).parent = Some(child_id);
        }
        trace!(parent = ?parent_id, "borrowed record from right sibling");
    }

    fn merge_children(&mut self, parent_id: NodeId, left_slot: usize) {
        let left_id = self.node(parent_id).children[left_slot];
        let right_id = self.node(parent_id).children[left_slot + 1];

        let (sep_key, sep_val) = self.node_mut(parent_id).erase_at(left_slot);
        self.node_mut(parent_id).children.remove(left_slot + 1);

        let mut right_node = self.take_node(right_id);
        let right_children = std::mem::take(&mut right_node.children);
        {
            let left = self.node_mut(left_id);
            left.keys.push(sep_key);
            left.vals.push(sep_val);
            left.keys.append(&mut right_node.keys);
            left.vals.append(&mut right_node.vals);
            left.children.extend(right_children.iter().copied());
        }
        for child in right_children {
            self.node_mut(child).parent = Some(left_id);
        }
        trace!(into = ?left_id, "merged sibling nodes");
    }
}
