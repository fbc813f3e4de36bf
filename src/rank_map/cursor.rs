use super::RankMap;
use crate::comparer::Comparer;
use crate::error::Result;
use crate::raw;

/// A cursor over a [`RankMap`] that does not borrow it.
///
/// Each step takes the map again, so the map may be modified between steps;
/// the first step after any insertion or removal (including a failed one) yields
/// [`Error::ConcurrentModification`](crate::Error::ConcurrentModification),
/// and so does every step after that. Replacing values through
/// [`set`](RankMap::set) or [`get_mut`](RankMap::get_mut) is not a modification.
///
/// A cursor must be advanced with the map it was created from.
///
/// # Examples
///
/// ```
/// use rank_rbtree::{Error, RankMap};
///
/// let mut map: RankMap<_, _> = [(1, 'a'), (2, 'b')].into_iter().collect();
/// let mut cursor = map.fast_cursor();
///
/// assert_eq!(cursor.next(&map), Some(Ok((&1, &'a', 0))));
/// map.add(3, 'c').unwrap();
/// assert_eq!(cursor.next(&map), Some(Err(Error::ConcurrentModification)));
/// ```
#[derive(Clone, Debug)]
pub struct FastCursor {
    inner: raw::FastCursor,
}

/// A cursor over a [`RankMap`] that survives modification.
///
/// The cursor remembers only the last key it yielded and looks up its successor
/// on every step, in O(log n). Entries added after that key are picked up,
/// entries removed before being reached are skipped, and changes behind the
/// cursor have no effect. Once the cursor has reported the end it stays there.
///
/// # Examples
///
/// ```
/// use rank_rbtree::RankMap;
///
/// let mut map: RankMap<_, _> = [(1, 'a'), (3, 'c')].into_iter().collect();
/// let mut cursor = map.robust_cursor();
///
/// assert_eq!(cursor.next(&map), Some((&1, &'a', 0)));
/// map.add(2, 'b').unwrap();
/// assert_eq!(cursor.next(&map), Some((&2, &'b', 1)));
/// assert_eq!(cursor.next(&map), Some((&3, &'c', 2)));
/// assert_eq!(cursor.next(&map), None);
/// ```
#[derive(Clone, Debug)]
pub struct RobustCursor<K> {
    inner: raw::RobustCursor<K>,
}

impl<K, V, C> RankMap<K, V, C> {
    /// Returns a cursor positioned before the first entry that fails once the
    /// map is modified.
    #[must_use]
    pub fn fast_cursor(&self) -> FastCursor {
        FastCursor {
            inner: raw::FastCursor::new(&self.raw),
        }
    }

    /// Returns a cursor positioned before the first entry that tolerates
    /// modification.
    #[must_use]
    pub fn robust_cursor(&self) -> RobustCursor<K> {
        RobustCursor {
            inner: raw::RobustCursor::default(),
        }
    }
}

impl FastCursor {
    /// Yields the next `(key, value, rank)` in key order.
    ///
    /// # Complexity
    ///
    /// O(1) amortized.
    pub fn next<'a, K, V, C>(&mut self, map: &'a RankMap<K, V, C>) -> Option<Result<(&'a K, &'a V, isize)>> {
        let tree = &map.raw;
        Some(self.inner.next(tree)?.map(|(handle, rank, _)| {
            let node = tree.node(handle);
            (&node.key, &node.value, rank)
        }))
    }
}

impl<K: Clone> RobustCursor<K> {
    /// Yields the next `(key, value, rank)` in key order.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn next<'a, V, C: Comparer<K>>(&mut self, map: &'a RankMap<K, V, C>) -> Option<(&'a K, &'a V, isize)> {
        let tree = &map.raw;
        self.inner.next(tree).map(|(handle, rank, _)| {
            let node = tree.node(handle);
            (&node.key, &node.value, rank)
        })
    }
}
