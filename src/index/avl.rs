// Copyright 2026 Deepindex Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Arena-backed AVL map
//!
//! [`OrderedTree`] is a self-balancing binary search tree storing one value
//! per key. Nodes live in a slot vector addressed by `u32` id with a free
//! list for reuse, so parent back-references are plain indices rather than
//! owned pointers. In-order iteration walks parent links and needs no
//! auxiliary stack.
//!
//! A failed lookup returns a [`Location`] describing where the key would
//! attach, so find-or-insert paths pay for a single descent.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::core::{Error, Result};

/// Arena slot id of a tree node, as returned by [`OrderedTree::locate`]
pub type NodeId = u32;

/// Sentinel id for "no node"
const NIL: NodeId = u32::MAX;

struct Node<K, V> {
    key: K,
    value: V,
    left: NodeId,
    right: NodeId,
    parent: NodeId,
    /// Cached subtree height; a leaf is 0, an absent child counts as -1
    height: i32,
}

/// Attachment point produced by a failed [`OrderedTree::locate`]
///
/// Captures the last node visited during the descent and the side the key
/// fell on. Valid only against the tree that produced it, with no mutation
/// in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    parent: NodeId,
    go_right: bool,
}

/// A self-balancing ordered map over `K -> V`
///
/// Keys use their natural [`Ord`] unless a comparer is injected with
/// [`OrderedTree::with_comparer`].
pub struct OrderedTree<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
    root: NodeId,
    len: usize,
    comparer: Option<Arc<dyn Fn(&K, &K) -> Ordering>>,
}

impl<K: Ord, V> Default for OrderedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> OrderedTree<K, V> {
    /// Create an empty tree using the key type's natural order
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NIL,
            len: 0,
            comparer: None,
        }
    }

    /// Create an empty tree ordered by a custom comparer
    pub fn with_comparer(comparer: Arc<dyn Fn(&K, &K) -> Ordering>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NIL,
            len: 0,
            comparer: Some(comparer),
        }
    }

    /// Number of keys in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; -1 when empty, 0 for a single node
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    /// Remove every entry and release all arena slots
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.root = NIL;
        self.len = 0;
    }

    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        match &self.comparer {
            Some(cmp) => cmp(a, b),
            None => a.cmp(b),
        }
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id as usize].as_ref().expect("free arena slot")
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id as usize].as_mut().expect("free arena slot")
    }

    #[inline]
    fn height_of(&self, id: NodeId) -> i32 {
        if id == NIL {
            -1
        } else {
            self.node(id).height
        }
    }

    /// height(right) - height(left); in {-1, 0, 1} for a balanced node
    #[inline]
    fn balance(&self, id: NodeId) -> i32 {
        let n = self.node(id);
        self.height_of(n.right) - self.height_of(n.left)
    }

    fn update_height(&mut self, id: NodeId) {
        let n = self.node(id);
        let h = 1 + self.height_of(n.left).max(self.height_of(n.right));
        self.node_mut(id).height = h;
    }

    /// Descend to a key, returning its node id or the attachment point
    /// where it would be inserted
    pub fn locate(&self, key: &K) -> std::result::Result<NodeId, Location> {
        let mut cur = self.root;
        let mut loc = Location {
            parent: NIL,
            go_right: false,
        };
        while cur != NIL {
            let n = self.node(cur);
            match self.compare(key, &n.key) {
                Ordering::Equal => return Ok(cur),
                Ordering::Less => {
                    loc = Location {
                        parent: cur,
                        go_right: false,
                    };
                    cur = n.left;
                }
                Ordering::Greater => {
                    loc = Location {
                        parent: cur,
                        go_right: true,
                    };
                    cur = n.right;
                }
            }
        }
        Err(loc)
    }

    /// Get the value for a key
    pub fn get(&self, key: &K) -> Option<&V> {
        self.locate(key).ok().map(|id| &self.node(id).value)
    }

    /// Get a mutable reference to the value for a key
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.locate(key) {
            Ok(id) => Some(&mut self.node_mut(id).value),
            Err(_) => None,
        }
    }

    /// Value for a key, failing with [`Error::KeyNotFound`] when absent
    pub fn try_get(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Check whether a key is present
    pub fn contains_key(&self, key: &K) -> bool {
        self.locate(key).is_ok()
    }

    /// Value of the node a successful [`locate`] returned
    ///
    /// Panics if the id does not refer to a live node of this tree.
    ///
    /// [`locate`]: OrderedTree::locate
    pub fn value_at(&self, id: NodeId) -> &V {
        &self.node(id).value
    }

    /// Mutable counterpart of [`value_at`]
    ///
    /// [`value_at`]: OrderedTree::value_at
    pub fn value_at_mut(&mut self, id: NodeId) -> &mut V {
        &mut self.node_mut(id).value
    }

    /// Smallest entry in tree order
    pub fn first(&self) -> Option<(&K, &V)> {
        if self.root == NIL {
            return None;
        }
        let n = self.node(self.leftmost(self.root));
        Some((&n.key, &n.value))
    }

    /// Largest entry in tree order
    pub fn last(&self) -> Option<(&K, &V)> {
        if self.root == NIL {
            return None;
        }
        let mut cur = self.root;
        while self.node(cur).right != NIL {
            cur = self.node(cur).right;
        }
        let n = self.node(cur);
        Some((&n.key, &n.value))
    }

    /// Insert a new key, failing if it already exists
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        match self.locate(&key) {
            Ok(_) => Err(Error::DuplicateKey),
            Err(loc) => {
                self.insert_at(loc, key, value);
                Ok(())
            }
        }
    }

    /// Insert or replace; returns true when a new key was inserted
    pub fn insert_or_update(&mut self, key: K, value: V) -> bool {
        match self.locate(&key) {
            Ok(id) => {
                self.node_mut(id).value = value;
                false
            }
            Err(loc) => {
                self.insert_at(loc, key, value);
                true
            }
        }
    }

    /// Attach a key at a location produced by a failed [`locate`] on this
    /// tree, skipping the second descent; returns the new node's id
    ///
    /// [`locate`]: OrderedTree::locate
    pub fn insert_at(&mut self, loc: Location, key: K, value: V) -> NodeId {
        let id = self.alloc(Node {
            key,
            value,
            left: NIL,
            right: NIL,
            parent: loc.parent,
            height: 0,
        });
        if loc.parent == NIL {
            self.root = id;
        } else if loc.go_right {
            self.node_mut(loc.parent).right = id;
        } else {
            self.node_mut(loc.parent).left = id;
        }
        self.len += 1;
        self.retrace(loc.parent);
        id
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.locate(key).ok()?;
        Some(self.remove_node(id))
    }

    fn remove_node(&mut self, mut id: NodeId) -> V {
        // Two children: swap key/value (not node identity) with the in-order
        // predecessor, then delete that node, which has at most one child.
        let n = self.node(id);
        if n.left != NIL && n.right != NIL {
            let mut pred = n.left;
            while self.node(pred).right != NIL {
                pred = self.node(pred).right;
            }
            let mut pred_node = self.slots[pred as usize].take().expect("free arena slot");
            {
                let target = self.node_mut(id);
                std::mem::swap(&mut target.key, &mut pred_node.key);
                std::mem::swap(&mut target.value, &mut pred_node.value);
            }
            self.slots[pred as usize] = Some(pred_node);
            id = pred;
        }

        // Splice the single child (or nothing) into the parent's slot.
        let doomed = self.node(id);
        let child = if doomed.left != NIL {
            doomed.left
        } else {
            doomed.right
        };
        let parent = doomed.parent;
        if child != NIL {
            self.node_mut(child).parent = parent;
        }
        if parent == NIL {
            self.root = child;
        } else if self.node(parent).left == id {
            self.node_mut(parent).left = child;
        } else {
            self.node_mut(parent).right = child;
        }

        let node = self.release(id);
        self.len -= 1;
        self.retrace(parent);
        node.value
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id as usize] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                (self.slots.len() - 1) as NodeId
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id as usize].take().expect("free arena slot");
        self.free.push(id);
        node
    }

    /// Ascend from `cur` toward the root, restoring heights and balance.
    ///
    /// Stops as soon as a visited subtree's height is unchanged: after an
    /// insertion one rotation always restores balance, while a deletion may
    /// keep shrinking subtrees and rotate all the way up.
    fn retrace(&mut self, mut cur: NodeId) {
        while cur != NIL {
            let old_height = self.node(cur).height;
            self.update_height(cur);
            let bf = self.balance(cur);
            let subtree = if !(-1..=1).contains(&bf) {
                self.rebalance(cur)
            } else {
                cur
            };
            if self.node(subtree).height == old_height {
                break;
            }
            cur = self.node(subtree).parent;
        }
    }

    /// Fix a node whose balance factor reached +/-2; returns the subtree's
    /// new root
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        if self.balance(id) > 0 {
            let right = self.node(id).right;
            if self.balance(right) < 0 {
                self.rotate_right(right);
            }
            self.rotate_left(id)
        } else {
            let left = self.node(id).left;
            if self.balance(left) > 0 {
                self.rotate_left(left);
            }
            self.rotate_right(id)
        }
    }

    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let parent = self.node(x).parent;
        let y = self.node(x).right;
        let inner = self.node(y).left;

        self.node_mut(x).right = inner;
        if inner != NIL {
            self.node_mut(inner).parent = x;
        }
        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let parent = self.node(x).parent;
        let y = self.node(x).left;
        let inner = self.node(y).right;

        self.node_mut(x).left = inner;
        if inner != NIL {
            self.node_mut(inner).parent = x;
        }
        self.node_mut(y).right = x;
        self.node_mut(x).parent = y;
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent == NIL {
            self.root = new;
        } else if self.node(parent).left == old {
            self.node_mut(parent).left = new;
        } else {
            self.node_mut(parent).right = new;
        }
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while self.node(id).left != NIL {
            id = self.node(id).left;
        }
        id
    }

    /// In-order successor via parent back-references
    fn successor(&self, id: NodeId) -> NodeId {
        let n = self.node(id);
        if n.right != NIL {
            return self.leftmost(n.right);
        }
        let mut cur = id;
        let mut parent = n.parent;
        while parent != NIL && self.node(parent).right == cur {
            cur = parent;
            parent = self.node(parent).parent;
        }
        parent
    }

    /// First node whose key is >= `min`, remembering the best candidate
    /// while descending
    fn seek_ge(&self, min: &K) -> NodeId {
        let mut best = NIL;
        let mut cur = self.root;
        while cur != NIL {
            let n = self.node(cur);
            if self.compare(&n.key, min) == Ordering::Less {
                cur = n.right;
            } else {
                best = cur;
                cur = n.left;
            }
        }
        best
    }

    /// In-order iterator over all entries
    pub fn iter(&self) -> RangeIter<'_, K, V> {
        self.range(None, None)
    }

    /// In-order iterator bounded by inclusive `min` and `max`
    pub fn range(&self, min: Option<&K>, max: Option<K>) -> RangeIter<'_, K, V> {
        let start = match min {
            Some(min) => self.seek_ge(min),
            None if self.root != NIL => self.leftmost(self.root),
            None => NIL,
        };
        RangeIter {
            tree: self,
            current: start,
            max,
        }
    }
}

impl<K: Ord, V> fmt::Debug for OrderedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedTree")
            .field("len", &self.len)
            .field("height", &self.height())
            .finish()
    }
}

/// Bounded in-order iterator over an [`OrderedTree`]
///
/// The max bound is checked on every step; iteration ends the first time a
/// key exceeds it. The underlying tree must not be mutated while the
/// iterator is live.
pub struct RangeIter<'a, K, V> {
    tree: &'a OrderedTree<K, V>,
    current: NodeId,
    max: Option<K>,
}

impl<'a, K: Ord, V> Iterator for RangeIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NIL {
            return None;
        }
        let node = self.tree.node(self.current);
        if let Some(max) = &self.max {
            if self.tree.compare(&node.key, max) == Ordering::Greater {
                self.current = NIL;
                return None;
            }
        }
        self.current = self.tree.successor(self.current);
        Some((&node.key, &node.value))
    }
}

#[cfg(test)]
impl<K: Ord, V> OrderedTree<K, V> {
    /// Walk the whole tree checking BST order, AVL balance, cached heights
    /// and parent links; panics on the first violation.
    fn check_invariants(&self) {
        fn walk<K: Ord, V>(tree: &OrderedTree<K, V>, id: NodeId, parent: NodeId) -> (i32, usize) {
            if id == NIL {
                return (-1, 0);
            }
            let n = tree.node(id);
            assert_eq!(n.parent, parent, "parent back-reference mismatch");
            if n.left != NIL {
                assert_eq!(
                    tree.compare(&tree.node(n.left).key, &n.key),
                    Ordering::Less,
                    "left child not smaller"
                );
            }
            if n.right != NIL {
                assert_eq!(
                    tree.compare(&tree.node(n.right).key, &n.key),
                    Ordering::Greater,
                    "right child not greater"
                );
            }
            let (lh, lc) = walk(tree, n.left, id);
            let (rh, rc) = walk(tree, n.right, id);
            assert_eq!(n.height, 1 + lh.max(rh), "stale cached height");
            assert!((rh - lh).abs() <= 1, "AVL balance violated");
            (n.height, lc + rc + 1)
        }
        let (_, count) = walk(self, self.root, NIL);
        assert_eq!(count, self.len, "len out of sync with node count");
    }
}
