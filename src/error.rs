use thiserror::Error;

/// Returned by [`Tree::get`](crate::Tree::get) when the key is not stored in the tree.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("key not found")]
pub struct KeyNotFound;
