// =====================================================================
// File: tree/cursor.rs
//
// Description:
//   Bidirectional positional cursor. Modeled as a small `Copy` value
//   `(tree_id, Option<(NodeId, slot)>)` rather than an iterator object
//   that mutates itself and returns `self`: `advance`/`retreat` consume
//   and return a `Cursor` by value, and `deref`/`equals` borrow the tree
//   they were issued from. `position: None` is the end sentinel.
// =====================================================================
use crate::comparator::Comparator;
use crate::tree::engine::Tree;
use crate::tree::node::NodeId;

/// A position inside a [`Tree`]: either a `(node, slot)` pair, or the end
/// sentinel. Cheap to copy; two cursors compare equal iff both are end or
/// both refer to the same `(node, slot)` of the same tree.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub(crate) tree_id: u64,
    pub(crate) position: Option<(NodeId, usize)>,
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.tree_id == other.tree_id && self.position == other.position
    }
}
impl Eq for Cursor {}

impl Cursor {
    pub(crate) fn end(tree_id: u64) -> Self {
        Cursor { tree_id, position: None }
    }

    pub(crate) fn at(tree_id: u64, node: NodeId, slot: usize) -> Self {
        Cursor { tree_id, position: Some((node, slot)) }
    }

    /// Whether this cursor denotes the end sentinel.
    pub fn is_end(&self) -> bool {
        self.position.is_none()
    }

    fn check_tree<K, V, C: Comparator<K>>(&self, tree: &Tree<K, V, C>) {
        if self.tree_id != tree.id {
            panic!("cursor used with a tree other than the one it was obtained from");
        }
    }

    /// Dereferences this cursor, yielding a reference to its record's key
    /// and value.
    ///
    /// # Panics
    /// Panics if this cursor is the end sentinel, belongs to a different
    /// tree, or has been invalidated by a structural mutation since it was
    /// obtained: precondition violations diagnose rather than silently
    /// corrupt.
    pub fn deref<'a, K, V, C: Comparator<K>>(&self, tree: &'a Tree<K, V, C>) -> (&'a K, &'a V) {
        self.check_tree(tree);
        let (node_id, slot) = self
            .position
            .expect("dereferencing the end cursor is a precondition violation");
        let node = tree.node(node_id);
        (&node.keys[slot], &node.vals[slot])
    }

    /// Advances to the successor position.
    ///
    /// From a non-last slot in a leaf, moves to the next slot. From the
    /// last slot in a leaf, ascends to the nearest ancestor for which the
    /// current subtree is a left child of a separator, landing on that
    /// separator. From an internal-node position (only reachable
    /// transiently during erase), descends to the leftmost leaf of the
    /// right subtree. From the last record in the tree, advances to end.
    ///
    /// # Panics
    /// Same precondition-violation rules as [`deref`](Self::deref), except
    /// advancing from end is undefined upstream and not special-cased here
    /// (callers should not advance past the last record more than once
    /// without re-deriving a cursor).
    pub fn advance<K, V, C: Comparator<K>>(self, tree: &Tree<K, V, C>) -> Self {
        self.check_tree(tree);
        let Some((mut node_id, mut slot)) = self.position else {
            return self;
        };
        slot += 1;
        let mut node = tree.node(node_id);
        if !node.is_leaf {
            // Transient internal-node cursor: descend to leftmost leaf of
            // the right subtree of the record we just stepped past.
            node_id = node.children[slot];
            node = tree.node(node_id);
            while !node.is_leaf {
                node_id = node.children[0];
                node = tree.node(node_id);
            }
            return Cursor::at(self.tree_id, node_id, 0);
        }
        if slot < node.len() {
            return Cursor::at(self.tree_id, node_id, slot);
        }
        // Off the end of this leaf: ascend until we arrive via a left
        // child, landing on the separator that follows it.
        let mut child = node_id;
        let mut parent = node.parent;
        while let Some(parent_id) = parent {
            let parent_node = tree.node(parent_id);
            let child_slot = parent_node
                .children
                .iter()
                .position(|&c| c == child)
                .expect("parent link must reference an actual child");
            if child_slot < parent_node.len() {
                return Cursor::at(self.tree_id, parent_id, child_slot);
            }
            child = parent_id;
            parent = parent_node.parent;
        }
        Cursor::end(self.tree_id)
    }

    /// Retreats to the predecessor position. Symmetric to
    /// [`advance`](Self::advance): from end, retreats to the rightmost
    /// record; retreating from begin is undefined.
    pub fn retreat<K, V, C: Comparator<K>>(self, tree: &Tree<K, V, C>) -> Self {
        self.check_tree(tree);
        match self.position {
            None => {
                let Some(root) = tree.root else {
                    return self;
                };
                let mut node_id = root;
                let mut node = tree.node(node_id);
                loop {
                    if node.is_leaf {
                        return Cursor::at(self.tree_id, node_id, node.len() - 1);
                    }
                    node_id = *node.children.last().expect("internal node has children");
                    node = tree.node(node_id);
                }
            }
            Some((node_id, slot)) => {
                let node = tree.node(node_id);
                if !node.is_leaf {
                    let child_id = node.children[slot];
                    let mut cur = tree.node(child_id);
                    let mut cur_id = child_id;
                    while !cur.is_leaf {
                        cur_id = *cur.children.last().expect("internal node has children");
                        cur = tree.node(cur_id);
                    }
                    return Cursor::at(self.tree_id, cur_id, cur.len() - 1);
                }
                if slot > 0 {
                    return Cursor::at(self.tree_id, node_id, slot - 1);
                }
                let mut child = node_id;
                let mut parent = node.parent;
                while let Some(parent_id) = parent {
                    let parent_node = tree.node(parent_id);
                    let child_slot = parent_node
                        .children
                        .iter()
                        .position(|&c| c == child)
                        .expect("parent link must reference an actual child");
                    if child_slot > 0 {
                        return Cursor::at(self.tree_id, parent_id, child_slot - 1);
                    }
                    child = parent_id;
                    parent = parent_node.parent;
                }
                panic!("retreating from the begin cursor is a precondition violation");
            }
        }
    }
}
