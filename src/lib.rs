//! Ordered key-value trees built on one engine.
//!
//! [`Tree`] stores unique keys in binary search tree order. The node metadata policy
//! decides how it keeps its shape:
//!
//! * [`Bst`] (`Tree<K, V, Unbalanced>`) attaches new nodes where the descent ends and
//!   never restructures. Sorted input degrades it into a list.
//! * [`AvlTree`] (`Tree<K, V, Avl>`) caches height and balance factor per node and
//!   rotates after every insert and delete, so its height stays below ~1.44·log2(n + 2).
//!
//! ```
//! use avl_bst::{AvlTree, KeyBound, KeyNotFound};
//!
//! let mut tree = AvlTree::new();
//! tree.insert(10, "ten");
//! tree.insert(20, "twenty");
//! tree.insert(30, "thirty");
//!
//! let root = tree.root().unwrap();
//! assert_eq!(*root.key(), 20);
//! assert_eq!(tree.get(&30).map(|node| *node.value()), Ok("thirty"));
//!
//! assert_eq!(tree.delete(&20), Some((20, "twenty")));
//! assert_eq!(tree.get(&20).err(), Some(KeyNotFound));
//! assert_eq!(tree.min_key(), KeyBound::Key(&10));
//! ```
//!
//! None of the operations recurse: descents are loops and structural changes travel back
//! up through parent links, so stack usage does not depend on the tree height.

mod bound;
mod error;
mod node;
mod tree;

pub use bound::KeyBound;
pub use error::KeyNotFound;
pub use node::NodeRef;
pub use tree::{Avl, AvlTree, Balance, Bst, Tree, Unbalanced};
