use super::MultiRankMap;
use crate::comparer::Comparer;
use crate::error::Result;
use crate::raw;

/// A cursor over a [`MultiRankMap`] that does not borrow it, and fails once
/// the map is modified.
///
/// Adjusting a count is a modification; replacing a value is not.
///
/// # Examples
///
/// ```
/// use rank_rbtree::{Error, MultiRankMap};
///
/// let mut bag = MultiRankMap::new();
/// bag.add('a', (), 2).unwrap();
/// bag.add('b', (), 1).unwrap();
///
/// let mut cursor = bag.fast_cursor();
/// assert_eq!(cursor.next(&bag), Some(Ok((&'a', &(), 0, 2))));
/// bag.adjust_count('a', 1).unwrap();
/// assert_eq!(cursor.next(&bag), Some(Err(Error::ConcurrentModification)));
/// ```
#[derive(Clone, Debug)]
pub struct FastCursor {
    inner: raw::FastCursor,
}

/// A cursor over a [`MultiRankMap`] that re-finds its place on every step, so
/// it keeps going through modification.
///
/// # Examples
///
/// ```
/// use rank_rbtree::MultiRankMap;
///
/// let mut bag = MultiRankMap::new();
/// bag.add('a', (), 2).unwrap();
/// bag.add('b', (), 1).unwrap();
///
/// let mut cursor = bag.robust_cursor();
/// assert_eq!(cursor.next(&bag), Some((&'a', &(), 0, 2)));
/// bag.adjust_count('a', 3).unwrap();
/// assert_eq!(cursor.next(&bag), Some((&'b', &(), 5, 1)));
/// assert_eq!(cursor.next(&bag), None);
/// ```
#[derive(Clone, Debug)]
pub struct RobustCursor<K> {
    inner: raw::RobustCursor<K>,
}

impl<K, V, C> MultiRankMap<K, V, C> {
    #[must_use]
    pub fn fast_cursor(&self) -> FastCursor {
        FastCursor {
            inner: raw::FastCursor::new(&self.raw),
        }
    }

    #[must_use]
    pub fn robust_cursor(&self) -> RobustCursor<K> {
        RobustCursor {
            inner: raw::RobustCursor::default(),
        }
    }
}

impl FastCursor {
    /// Yields the next `(key, value, rank, count)` in key order.
    pub fn next<'a, K, V, C>(
        &mut self,
        map: &'a MultiRankMap<K, V, C>,
    ) -> Option<Result<(&'a K, &'a V, isize, isize)>> {
        let tree = &map.raw;
        Some(self.inner.next(tree)?.map(|(handle, rank, count)| {
            let node = tree.node(handle);
            (&node.key, &node.value, rank, count)
        }))
    }
}

impl<K: Clone> RobustCursor<K> {
    /// Yields the next `(key, value, rank, count)` in key order.
    pub fn next<'a, V, C: Comparer<K>>(&mut self, map: &'a MultiRankMap<K, V, C>) -> Option<(&'a K, &'a V, isize, isize)> {
        let tree = &map.raw;
        self.inner.next(tree).map(|(handle, rank, count)| {
            let node = tree.node(handle);
            (&node.key, &node.value, rank, count)
        })
    }
}
