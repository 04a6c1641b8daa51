/// Result of [`Tree::min_key`](crate::Tree::min_key) and [`Tree::max_key`](crate::Tree::max_key).
///
/// The infinities stand in for the missing extremum of an empty tree, so that comparing
/// against an empty tree behaves like comparing against an unbounded one:
/// `NegInfinity < Key(_) < PosInfinity`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyBound<'a, K> {
    NegInfinity,
    Key(&'a K),
    PosInfinity,
}

impl<'a, K> KeyBound<'a, K> {
    /// Returns the key, or `None` for either infinity.
    pub fn key(self) -> Option<&'a K> {
        match self {
            KeyBound::Key(key) => Some(key),
            _ => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        !matches!(self, KeyBound::Key(_))
    }
}

impl<K> Clone for KeyBound<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for KeyBound<'_, K> {}
