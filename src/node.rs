use std::cmp;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::tree::{Avl, Balance};

pub(crate) type NodePtr<K, V> = NonNull<Node<K, V>>;
pub(crate) type Link<K, V> = Option<NodePtr<K, V>>;
pub(crate) type LinkPtr<K, V> = NonNull<Link<K, V>>;

// Children are owned by their node, the parent link is a plain back pointer.
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
    pub(crate) parent: Link<K, V>,
    pub(crate) height: usize,
    pub(crate) balance_factor: isize,
}

impl<K, V> Node<K, V> {
    pub(crate) fn create(parent: Link<K, V>, key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 1,
            balance_factor: 0,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    /// Takes back ownership of a node created by [`Node::create`].
    /// The node must already be unreachable from the tree.
    pub(crate) unsafe fn destroy(node_ptr: NodePtr<K, V>) -> Box<Self> {
        Box::from_raw(node_ptr.as_ptr())
    }
}

pub(crate) fn link_height<K, V>(link: Link<K, V>) -> usize {
    match link {
        None => 0,
        Some(node_ptr) => unsafe { node_ptr.as_ref().height },
    }
}

/// Counts the levels below (and including) `link` without relying on cached heights.
pub(crate) fn subtree_height<K, V>(link: Link<K, V>) -> usize {
    let mut height = 0;
    traverse(link, |_, depth| height = cmp::max(height, depth), |_, _| {}, |_, _| {});
    height
}

pub(crate) fn min_node<K, V>(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
    while let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
        node_ptr = left_ptr;
    }
    node_ptr
}

pub(crate) fn max_node<K, V>(mut node_ptr: NodePtr<K, V>) -> NodePtr<K, V> {
    while let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
        node_ptr = right_ptr;
    }
    node_ptr
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

/// Walks the subtree below `start` using parent links instead of a call stack.
/// Every callback receives the node and its depth relative to `start` (which is 1).
pub(crate) fn traverse<K, V, Pre, In, Post>(
    start: Link<K, V>,
    mut preorder: Pre,
    mut inorder: In,
    mut postorder: Post,
) where
    Pre: FnMut(NodePtr<K, V>, usize),
    In: FnMut(NodePtr<K, V>, usize),
    Post: FnMut(NodePtr<K, V>, usize),
{
    if let Some(top_ptr) = start {
        let mut node_ptr = top_ptr;
        let mut depth = 1;
        let mut dir = Direction::FromParent;
        loop {
            match dir {
                Direction::FromParent => {
                    preorder(node_ptr, depth);
                    if let Some(left_ptr) = unsafe { node_ptr.as_ref().left } {
                        node_ptr = left_ptr;
                        depth += 1;
                    } else {
                        dir = Direction::FromLeft;
                    }
                }
                Direction::FromLeft => {
                    inorder(node_ptr, depth);
                    if let Some(right_ptr) = unsafe { node_ptr.as_ref().right } {
                        node_ptr = right_ptr;
                        depth += 1;
                        dir = Direction::FromParent;
                    } else {
                        dir = Direction::FromRight;
                    }
                }
                Direction::FromRight => {
                    // Post order traversal is used for node deletion,
                    // so make sure not to use node pointer after postorder call.
                    let parent = unsafe { node_ptr.as_ref().parent };
                    match parent {
                        Some(parent_ptr) if node_ptr != top_ptr => {
                            if Some(node_ptr) == unsafe { parent_ptr.as_ref().left } {
                                dir = Direction::FromLeft;
                            } else {
                                dir = Direction::FromRight;
                            }
                            postorder(node_ptr, depth);
                            node_ptr = parent_ptr;
                            depth -= 1;
                        }
                        _ => {
                            postorder(node_ptr, depth);
                            break;
                        }
                    }
                }
            }
        }
    }
}

/// Read-only view of a node, borrowed from its tree.
pub struct NodeRef<'a, K, V, B = Avl> {
    node_ptr: NodePtr<K, V>,
    marker: PhantomData<(&'a Node<K, V>, B)>,
}

impl<'a, K, V, B: Balance> NodeRef<'a, K, V, B> {
    pub(crate) fn new(node_ptr: NodePtr<K, V>) -> Self {
        Self {
            node_ptr,
            marker: PhantomData,
        }
    }

    fn node(&self) -> &'a Node<K, V> {
        unsafe { &*self.node_ptr.as_ptr() }
    }

    /// Returns the key stored in this node.
    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    /// Returns the value stored in this node.
    pub fn value(&self) -> &'a V {
        &self.node().value
    }

    /// Returns the root of the left subtree, if any.
    pub fn left(&self) -> Option<Self> {
        self.node().left.map(Self::new)
    }

    /// Returns the root of the right subtree, if any.
    pub fn right(&self) -> Option<Self> {
        self.node().right.map(Self::new)
    }

    /// Returns the structural parent, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(Self::new)
    }

    /// Height of the subtree rooted here, a leaf has height 1.
    /// Cached for AVL trees, computed in O(n) for plain BSTs.
    pub fn height(&self) -> usize {
        if B::TRACK_HEIGHT {
            self.node().height
        } else {
            subtree_height(Some(self.node_ptr))
        }
    }

    /// Height of the left subtree minus height of the right subtree.
    pub fn balance_factor(&self) -> isize {
        if B::TRACK_HEIGHT {
            self.node().balance_factor
        } else {
            subtree_height(self.node().left) as isize - subtree_height(self.node().right) as isize
        }
    }
}

impl<K, V, B> Clone for NodeRef<'_, K, V, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, B> Copy for NodeRef<'_, K, V, B> {}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance> fmt::Debug for NodeRef<'_, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key())
            .field("value", self.value())
            .finish()
    }
}
