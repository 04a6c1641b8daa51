use std::cmp::{self, Ordering};
use std::fmt;
use std::marker::PhantomData;
use std::mem;

use crate::bound::KeyBound;
use crate::error::KeyNotFound;
use crate::node::{self, Link, LinkPtr, Node, NodePtr, NodeRef};

mod sealed {
    pub trait Sealed {}
}

/// Node metadata policy of a [`Tree`].
///
/// Implemented by [`Unbalanced`] (plain binary search tree) and [`Avl`].
pub trait Balance: sealed::Sealed {
    /// Whether nodes cache height and balance factor and the tree rotates to stay balanced.
    const TRACK_HEIGHT: bool;
}

/// Plain binary search tree policy: no height bookkeeping, no rotations.
#[derive(Debug)]
pub enum Unbalanced {}

/// AVL policy: every node keeps its height and balance factor, and every
/// insert or delete restores `balance_factor ∈ {-1, 0, 1}` on the way to the root.
#[derive(Debug)]
pub enum Avl {}

impl sealed::Sealed for Unbalanced {}
impl sealed::Sealed for Avl {}

impl Balance for Unbalanced {
    const TRACK_HEIGHT: bool = false;
}

impl Balance for Avl {
    const TRACK_HEIGHT: bool = true;
}

/// An unbalanced binary search tree.
pub type Bst<K, V> = Tree<K, V, Unbalanced>;

/// A self-balancing AVL tree.
pub type AvlTree<K, V> = Tree<K, V, Avl>;

/// Ordered key-value tree. The balancing behavior is chosen by `B`.
pub struct Tree<K, V, B = Avl> {
    root: Link<K, V>,
    num_nodes: usize,
    num_inserts: usize,
    marker: PhantomData<(Box<Node<K, V>>, B)>,
}

impl<K, V, B: Balance> Tree<K, V, B> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
            num_inserts: 0,
            marker: PhantomData,
        }
    }

    /// Returns true if the tree contains no entries.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns how often [`insert`](Self::insert) has been called, duplicates included.
    /// Never decreases on delete; only [`clear`](Self::clear) resets it.
    pub fn insert_count(&self) -> usize {
        self.num_inserts
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single entry.
    pub fn height(&self) -> usize {
        self.root().map_or(0, |root| root.height())
    }

    /// Returns the root node, or `None` for an empty tree.
    pub fn root(&self) -> Option<NodeRef<'_, K, V, B>> {
        self.root.map(NodeRef::new)
    }

    /// Clears the tree, deallocating all memory.
    pub fn clear(&mut self) {
        destroy_subtree(self.root);
        self.root = None;
        self.num_nodes = 0;
        self.num_inserts = 0;
    }

    /// Returns the largest key, or [`KeyBound::NegInfinity`] if the tree is empty.
    pub fn max_key(&self) -> KeyBound<'_, K> {
        match self.root {
            None => KeyBound::NegInfinity,
            Some(root_ptr) => KeyBound::Key(&unsafe { &*node::max_node(root_ptr).as_ptr() }.key),
        }
    }

    /// Returns the smallest key, or [`KeyBound::PosInfinity`] if the tree is empty.
    pub fn min_key(&self) -> KeyBound<'_, K> {
        match self.root {
            None => KeyBound::PosInfinity,
            Some(root_ptr) => KeyBound::Key(&unsafe { &*node::min_node(root_ptr).as_ptr() }.key),
        }
    }

    fn inorder<F: FnMut(NodePtr<K, V>)>(&self, mut f: F) {
        node::traverse(self.root, |_, _| {}, |node_ptr, _| f(node_ptr), |_, _| {});
    }

    // Walks from `start_from` up to the root, restoring heights, balance factors
    // and the AVL condition. Each step splices the new subtree root into the
    // slot of the old one.
    fn retrace(&mut self, start_from: Link<K, V>) {
        if !B::TRACK_HEIGHT {
            return;
        }
        let mut current = start_from;
        while let Some(node_ptr) = current {
            Self::refresh(node_ptr);
            let subtree_ptr = Self::rebalance(node_ptr);
            current = unsafe { subtree_ptr.as_ref().parent };
            if current.is_none() {
                self.root = Some(subtree_ptr);
            }
        }
    }

    fn refresh(mut node_ptr: NodePtr<K, V>) {
        unsafe {
            let left_height = node::link_height(node_ptr.as_ref().left);
            let right_height = node::link_height(node_ptr.as_ref().right);
            let node = node_ptr.as_mut();
            node.height = cmp::max(left_height, right_height) + 1;
            node.balance_factor = left_height as isize - right_height as isize;
        }
    }

    /// Restores the AVL condition at `node_ptr`, whose balance factor must be fresh.
    /// Returns the root of the resulting subtree.
    fn rebalance(node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        let (balance_factor, left, right) = unsafe {
            let node = node_ptr.as_ref();
            (node.balance_factor, node.left, node.right)
        };
        debug_assert!((-2..=2).contains(&balance_factor));
        match (balance_factor, left, right) {
            (2, Some(left_ptr), _) => {
                // Left-right case straightens the left child first
                if unsafe { left_ptr.as_ref().balance_factor } < 0 {
                    Self::rotate_left(left_ptr);
                }
                Self::rotate_right(node_ptr)
            }
            (-2, _, Some(right_ptr)) => {
                // Right-left case straightens the right child first
                if unsafe { right_ptr.as_ref().balance_factor } > 0 {
                    Self::rotate_right(right_ptr);
                }
                Self::rotate_left(node_ptr)
            }
            _ => node_ptr,
        }
    }

    fn rotate_left(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        unsafe {
            let Some(mut pivot_ptr) = node_ptr.as_ref().right else {
                return node_ptr;
            };

            node_ptr.as_mut().right = pivot_ptr.as_ref().left;
            if let Some(mut moved_ptr) = pivot_ptr.as_ref().left {
                moved_ptr.as_mut().parent = Some(node_ptr);
            }

            pivot_ptr.as_mut().parent = node_ptr.as_ref().parent;
            if let Some(mut parent_ptr) = node_ptr.as_ref().parent {
                if parent_ptr.as_ref().left == Some(node_ptr) {
                    parent_ptr.as_mut().left = Some(pivot_ptr);
                } else {
                    parent_ptr.as_mut().right = Some(pivot_ptr);
                }
            }

            pivot_ptr.as_mut().left = Some(node_ptr);
            node_ptr.as_mut().parent = Some(pivot_ptr);

            Self::refresh(node_ptr);
            Self::refresh(pivot_ptr);
            pivot_ptr
        }
    }

    fn rotate_right(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
        unsafe {
            let Some(mut pivot_ptr) = node_ptr.as_ref().left else {
                return node_ptr;
            };

            node_ptr.as_mut().left = pivot_ptr.as_ref().right;
            if let Some(mut moved_ptr) = pivot_ptr.as_ref().right {
                moved_ptr.as_mut().parent = Some(node_ptr);
            }

            pivot_ptr.as_mut().parent = node_ptr.as_ref().parent;
            if let Some(mut parent_ptr) = node_ptr.as_ref().parent {
                if parent_ptr.as_ref().left == Some(node_ptr) {
                    parent_ptr.as_mut().left = Some(pivot_ptr);
                } else {
                    parent_ptr.as_mut().right = Some(pivot_ptr);
                }
            }

            pivot_ptr.as_mut().right = Some(node_ptr);
            node_ptr.as_mut().parent = Some(pivot_ptr);

            Self::refresh(node_ptr);
            Self::refresh(pivot_ptr);
            pivot_ptr
        }
    }

    // Detaches a node with at most one child, which takes its place.
    // Returns the former parent.
    fn splice_out(&mut self, node_ptr: NodePtr<K, V>) -> Link<K, V> {
        unsafe {
            let (left, right, parent) = {
                let node = node_ptr.as_ref();
                (node.left, node.right, node.parent)
            };
            debug_assert!(left.is_none() || right.is_none());
            let child = left.or(right);
            if let Some(mut child_ptr) = child {
                child_ptr.as_mut().parent = parent;
            }
            match parent {
                None => self.root = child,
                Some(mut parent_ptr) => {
                    if parent_ptr.as_ref().left == Some(node_ptr) {
                        parent_ptr.as_mut().left = child;
                    } else {
                        parent_ptr.as_mut().right = child;
                    }
                }
            }
            parent
        }
    }
}

impl<K: Ord, V, B: Balance> Tree<K, V, B> {
    /// Builds a tree by inserting every item in order.
    pub fn burst_insert<I: IntoIterator<Item = (K, V)>>(items: I) -> Self {
        let mut tree = Self::new();
        tree.extend(items);
        tree
    }

    /// Returns the node holding `key`.
    pub fn get(&self, key: &K) -> Result<NodeRef<'_, K, V, B>, KeyNotFound> {
        self.find(key).map(NodeRef::new).ok_or(KeyNotFound)
    }

    /// Returns true if the tree holds `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Inserts a key-value pair.
    /// Returns false, leaving the stored value untouched, if the key was already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.num_inserts += 1;
        if let Some((parent, mut link_ptr)) = self.find_insert_pos(&key) {
            unsafe {
                *link_ptr.as_mut() = Some(Node::create(parent, key, value));
            }
            self.num_nodes += 1;
            self.retrace(parent);
            return true;
        }
        false
    }

    /// Inserts a key with a default value.
    pub fn insert_key(&mut self, key: K) -> bool
    where
        V: Default,
    {
        self.insert(key, V::default())
    }

    /// Removes a key from the tree.
    /// Returns the removed entry, or `None` (leaving the tree untouched) if the key was absent.
    pub fn delete(&mut self, key: &K) -> Option<(K, V)> {
        let node_ptr = self.find(key)?;
        debug_assert!(self.num_nodes >= 1);

        // A node with two children takes over the entry of its inorder successor,
        // the successor's original position is then unlinked instead.
        let unlink_ptr = match unsafe { (node_ptr.as_ref().left, node_ptr.as_ref().right) } {
            (Some(_), Some(right_ptr)) => {
                let successor_ptr = node::min_node(right_ptr);
                unsafe {
                    let node = &mut *node_ptr.as_ptr();
                    let successor = &mut *successor_ptr.as_ptr();
                    mem::swap(&mut node.key, &mut successor.key);
                    mem::swap(&mut node.value, &mut successor.value);
                }
                successor_ptr
            }
            _ => node_ptr,
        };

        let parent = self.splice_out(unlink_ptr);
        self.num_nodes -= 1;
        self.retrace(parent);

        let removed = unsafe { Node::destroy(unlink_ptr) };
        Some((removed.key, removed.value))
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        unsafe {
            // Check root link
            if let Some(root_ptr) = self.root {
                assert!(root_ptr.as_ref().parent.is_none());
            }

            // Check tree nodes
            let mut num_nodes = 0;
            node::traverse(
                self.root,
                |node_ptr, _| {
                    let node = node_ptr.as_ref();

                    // Check links of child nodes
                    if let Some(left_ptr) = node.left {
                        assert!(left_ptr.as_ref().parent == Some(node_ptr));
                    }
                    if let Some(right_ptr) = node.right {
                        assert!(right_ptr.as_ref().parent == Some(node_ptr));
                    }

                    if B::TRACK_HEIGHT {
                        let left_height = node::link_height(node.left);
                        let right_height = node::link_height(node.right);

                        // Check cached height and balance factor
                        assert_eq!(node.height, cmp::max(left_height, right_height) + 1);
                        assert_eq!(
                            node.balance_factor,
                            left_height as isize - right_height as isize
                        );

                        // Check AVL condition (nearly balance)
                        assert!((-1..=1).contains(&node.balance_factor));
                    }

                    num_nodes += 1;
                },
                |_, _| {},
                |_, _| {},
            );

            // Check number of nodes
            assert_eq!(num_nodes, self.num_nodes);
        }

        // Check key order
        let mut prev: Option<&K> = None;
        self.inorder(|node_ptr| {
            let key = &unsafe { &*node_ptr.as_ptr() }.key;
            if let Some(prev_key) = prev {
                assert!(prev_key < key);
            }
            prev = Some(key);
        });
    }

    fn find(&self, key: &K) -> Link<K, V> {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    fn find_insert_pos(&mut self, key: &K) -> Option<(Link<K, V>, LinkPtr<K, V>)> {
        let mut parent: Link<K, V> = None;
        let mut link_ptr: LinkPtr<K, V> = unsafe { LinkPtr::new_unchecked(&mut self.root) };
        unsafe {
            while let Some(mut node_ptr) = *link_ptr.as_ref() {
                parent = Some(node_ptr);
                link_ptr = match key.cmp(&node_ptr.as_ref().key) {
                    Ordering::Equal => return None,
                    Ordering::Less => LinkPtr::new_unchecked(&mut node_ptr.as_mut().left),
                    Ordering::Greater => LinkPtr::new_unchecked(&mut node_ptr.as_mut().right),
                };
            }
        }
        Some((parent, link_ptr))
    }
}

impl<K, V, B> Drop for Tree<K, V, B> {
    fn drop(&mut self) {
        destroy_subtree(self.root);
    }
}

fn destroy_subtree<K, V>(link: Link<K, V>) {
    node::traverse(
        link,
        |_, _| {},
        |_, _| {},
        |node_ptr, _| drop(unsafe { Node::destroy(node_ptr) }),
    );
}

impl<K, V, B: Balance> Default for Tree<K, V, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V, B: Balance> Extend<(K, V)> for Tree<K, V, B> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, B: Balance> FromIterator<(K, V)> for Tree<K, V, B> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::burst_insert(iter)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance> fmt::Debug for Tree<K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries = Vec::with_capacity(self.num_nodes);
        self.inorder(|node_ptr| {
            let node = unsafe { &*node_ptr.as_ptr() };
            entries.push((&node.key, &node.value));
        });
        f.debug_map().entries(entries).finish()
    }
}
