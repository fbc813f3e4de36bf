use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::comparer::{Comparer, NaturalOrder};
use crate::error::{Error, Result};
use crate::inspect::Inspector;
use crate::nearest::Nearest;
use crate::raw::{AllocationMode, Multiplicity, RawRankTree, Spine};

mod capacity;
mod cursor;
mod order_statistic;

pub use crate::Rank;
pub use cursor::{FastCursor, RobustCursor};

/// An ordered map based on a red-black tree, with O(log n) rank queries.
///
/// Entries are kept in the order given by the map's [`Comparer`]; the rank of an
/// entry is its zero-based index in that order. Lookups, insertions, removals
/// and rank queries all take O(log n) time.
///
/// The map is single-threaded. Borrowing iteration through [`iter`](Self::iter)
/// is checked by the compiler; the detached [`FastCursor`] and [`RobustCursor`]
/// let the map change between steps and either report or tolerate it.
///
/// It is a logic error for a key to be modified in such a way that the key's
/// ordering relative to any other key, as determined by the comparer, changes
/// while it is in the map. The behavior resulting from such a logic error is not
/// specified, but will be encapsulated to the `RankMap` that observed the logic
/// error and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use rank_rbtree::RankMap;
///
/// let mut map = RankMap::new();
/// for key in [5, 3, 8, 1, 4, 7, 9] {
///     map.add(key, key * 10).unwrap();
/// }
///
/// assert_eq!(map.least(), Some((&1, &10)));
/// assert_eq!(map.greatest(), Some((&9, &90)));
/// assert_eq!(map.get_key_by_rank(3), Ok(&5));
///
/// let keys: Vec<_> = map.iter().map(|(k, _, _)| *k).collect();
/// assert_eq!(keys, [1, 3, 4, 5, 7, 8, 9]);
/// ```
pub struct RankMap<K, V, C = NaturalOrder> {
    raw: RawRankTree<K, V, C>,
}

/// An iterator over the entries of a `RankMap`, yielding `(key, value, rank)`.
///
/// This `struct` is created by the [`iter`] method on [`RankMap`].
///
/// [`iter`]: RankMap::iter
pub struct Iter<'a, K, V, C> {
    tree: &'a RawRankTree<K, V, C>,
    spine: Spine,
    remaining: usize,
}

impl<K, V> RankMap<K, V> {
    /// Makes a new, empty `RankMap` ordered by `K`'s [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let mut map = RankMap::new();
    /// map.add(1, "a").unwrap();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparer(NaturalOrder)
    }
}

impl<K, V, C> RankMap<K, V, C> {
    /// Makes a new, empty `RankMap` ordered by `comparer`.
    #[must_use]
    pub fn with_comparer(comparer: C) -> Self {
        Self::with_options(comparer, 0, AllocationMode::default())
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the number of ranks the entries cover, which for a `RankMap` is
    /// always its length.
    #[must_use]
    pub const fn extent(&self) -> isize {
        self.raw.extent()
    }

    /// Returns the map's comparer.
    #[must_use]
    pub const fn comparer(&self) -> &C {
        self.raw.comparer()
    }

    /// Clears the map, removing all entries.
    ///
    /// Clearing an empty map is a no-op.
    ///
    /// # Complexity
    ///
    /// O(1) for [`AllocationMode::DynamicDiscard`], otherwise O(capacity).
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let mut a = RankMap::new();
    /// a.add(1, "a").unwrap();
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the entry with the least key.
    #[must_use]
    pub fn least(&self) -> Option<(&K, &V)> {
        self.raw.least().map(|(handle, _)| {
            let node = self.raw.node(handle);
            (&node.key, &node.value)
        })
    }

    /// Returns the entry with the greatest key.
    #[must_use]
    pub fn greatest(&self) -> Option<(&K, &V)> {
        self.raw.greatest().map(|(handle, _)| {
            let node = self.raw.node(handle);
            (&node.key, &node.value)
        })
    }

    /// Gets an iterator over the entries of the map, sorted by key, as
    /// `(key, value, rank)`.
    ///
    /// # Complexity
    ///
    /// O(1) amortized per item.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let map: RankMap<_, _> = [(3, "c"), (1, "a"), (2, "b")].into_iter().collect();
    /// let mut iter = map.iter();
    /// assert_eq!(iter.next(), Some((&1, &"a", 0)));
    /// assert_eq!(iter.len(), 2);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            tree: &self.raw,
            spine: Spine::new(&self.raw),
            remaining: self.raw.len(),
        }
    }

    /// Returns a read-only view of the underlying tree for diagnostics.
    #[must_use]
    pub const fn inspect(&self) -> Inspector<'_, K, V, C> {
        Inspector::new(&self.raw)
    }
}

impl<K, V, C: Comparer<K>> RankMap<K, V, C> {
    /// Returns `true` if the map contains `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.find(key).is_some()
    }

    /// Returns a reference to the value corresponding to `key`, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let mut map = RankMap::new();
    /// map.add(1, "a").unwrap();
    /// assert_eq!(map.try_get(&1), Some(&"a"));
    /// assert_eq!(map.try_get(&2), None);
    /// ```
    #[must_use]
    pub fn try_get(&self, key: &K) -> Option<&V> {
        self.raw.get(key)
    }

    /// Returns a reference to the value corresponding to `key`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent.
    pub fn get(&self, key: &K) -> Result<&V> {
        self.try_get(key).ok_or(Error::NotFound)
    }

    /// Returns a mutable reference to the value corresponding to `key`, if any.
    #[must_use]
    pub fn try_get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.raw.get_mut(key)
    }

    /// Returns a mutable reference to the value corresponding to `key`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent.
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        self.try_get_mut(key).ok_or(Error::NotFound)
    }

    /// Replaces the value of an existing entry in place.
    ///
    /// Returns `false`, and drops `value`, if the key is absent. Neither the
    /// tree shape nor the ranks change, so cursors stay valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let mut map = RankMap::new();
    /// map.add("a", 1).unwrap();
    /// assert!(map.try_set(&"a", 2));
    /// assert!(!map.try_set(&"b", 3));
    /// assert_eq!(map.get(&"a"), Ok(&2));
    /// ```
    pub fn try_set(&mut self, key: &K, value: V) -> bool {
        self.try_get_mut(key).map(|slot| *slot = value).is_some()
    }

    /// Replaces the value of an existing entry in place.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent.
    pub fn set(&mut self, key: &K, value: V) -> Result<()> {
        if self.try_set(key, value) { Ok(()) } else { Err(Error::NotFound) }
    }

    /// Adds an entry if the key is absent.
    ///
    /// Returns `Ok(false)` and leaves the map unchanged if the key is present.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExhausted`] if a fixed-capacity map is full, and
    /// [`Error::ArithmeticOverflow`] if the map already covers `isize::MAX`
    /// ranks. The map is unchanged in both cases.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let mut map = RankMap::new();
    /// assert_eq!(map.try_add(37, "a"), Ok(true));
    /// assert_eq!(map.try_add(37, "b"), Ok(false));
    /// assert_eq!(map.get(&37), Ok(&"a"));
    /// ```
    pub fn try_add(&mut self, key: K, value: V) -> Result<bool> {
        self.raw.insert(key, value, 1)
    }

    /// Adds an entry whose key must be absent.
    ///
    /// # Errors
    ///
    /// [`Error::Duplicate`] if the key is present, plus the errors of
    /// [`try_add`](Self::try_add).
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        if self.try_add(key, value)? { Ok(()) } else { Err(Error::Duplicate) }
    }

    /// Removes `key`, returning its entry if it was present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let mut map = RankMap::new();
    /// map.add(1, "a").unwrap();
    /// assert_eq!(map.try_remove(&1), Some((1, "a")));
    /// assert_eq!(map.try_remove(&1), None);
    /// ```
    pub fn try_remove(&mut self, key: &K) -> Option<(K, V)> {
        self.raw.remove(key)
    }

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.try_remove(key).map(|(_, value)| value).ok_or(Error::NotFound)
    }

    /// Returns the entry with the greatest key strictly less than `key`.
    #[must_use]
    pub fn nearest_less(&self, key: &K) -> Nearest<'_, K, V> {
        Nearest::less(&self.raw, key, false)
    }

    /// Returns the entry with the greatest key less than or equal to `key`.
    #[must_use]
    pub fn nearest_less_or_equal(&self, key: &K) -> Nearest<'_, K, V> {
        Nearest::less(&self.raw, key, true)
    }

    /// Returns the entry with the least key strictly greater than `key`.
    #[must_use]
    pub fn nearest_greater(&self, key: &K) -> Nearest<'_, K, V> {
        Nearest::greater(&self.raw, key, false)
    }

    /// Returns the entry with the least key greater than or equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let map: RankMap<_, _> = [(10, 'a'), (20, 'b'), (30, 'c')].into_iter().collect();
    ///
    /// let found = map.nearest_greater_or_equal(&15);
    /// assert_eq!((found.key(), found.rank()), (Some(&20), 1));
    ///
    /// let exact = map.nearest_greater_or_equal(&30);
    /// assert_eq!((exact.key(), exact.rank()), (Some(&30), 2));
    /// ```
    #[must_use]
    pub fn nearest_greater_or_equal(&self, key: &K) -> Nearest<'_, K, V> {
        Nearest::greater(&self.raw, key, true)
    }

    /// Adds `delta` to the number of times `key` is present, which for a
    /// `RankMap` is 0 or 1.
    ///
    /// A `delta` of 1 on an absent key inserts it with `V::default()`; -1 on a
    /// present key removes it; 0 changes nothing. Returns the new count.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for any other adjustment, plus the errors of
    /// [`try_add`](Self::try_add) when inserting.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let mut map: RankMap<&str, u32> = RankMap::new();
    /// assert_eq!(map.adjust_count("a", 1), Ok(1));
    /// assert_eq!(map.get(&"a"), Ok(&0));
    /// assert!(map.adjust_count("a", 1).is_err());
    /// assert_eq!(map.adjust_count("a", -1), Ok(0));
    /// assert!(map.is_empty());
    /// ```
    pub fn adjust_count(&mut self, key: K, delta: isize) -> Result<isize>
    where
        V: Default,
    {
        self.raw.adjust_count(key, delta, Multiplicity::Single, V::default)
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RankMap<K, V, C> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RankMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter().map(|(k, v, _)| (k, v))).finish()
    }
}

impl<K, V, C: Default> Default for RankMap<K, V, C> {
    /// Creates an empty `RankMap`.
    fn default() -> Self {
        Self::with_comparer(C::default())
    }
}

/// Entries whose key is already present are skipped, keeping the first value.
///
/// # Panics
///
/// Panics if the map cannot allocate a node for a new entry.
impl<K, V, C: Comparer<K>> Extend<(K, V)> for RankMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            if let Err(error) = self.try_add(key, value) {
                panic!("`RankMap::extend()` - {error}");
            }
        }
    }
}

impl<K, V, C: Comparer<K> + Default> FromIterator<(K, V)> for RankMap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, C> IntoIterator for &'a RankMap<K, V, C> {
    type Item = (&'a K, &'a V, isize);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Iter<'a, K, V, C> {
        self.iter()
    }
}

/// Indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is negative or not less than the map's length.
impl<K, V, C> Index<Rank> for RankMap<K, V, C> {
    type Output = V;

    fn index(&self, rank: Rank) -> &V {
        match self.raw.find_by_rank(rank.0) {
            Ok(Some((handle, _))) => &self.raw.node(handle).value,
            _ => panic!("`RankMap::index()` - rank {} is out of bounds!", rank.0),
        }
    }
}

impl<'a, K: 'a, V: 'a, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V, isize);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let (handle, rank, _) = self.spine.next(tree)?;
        self.remaining -= 1;
        let node = tree.node(handle);
        Some((&node.key, &node.value, rank))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            spine: self.spine.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K, V, C> fmt::Debug for Iter<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparer::CompareFn;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    fn scenario() -> RankMap<i32, i32> {
        let mut map = RankMap::new();
        for key in [5, 3, 8, 1, 4, 7, 9] {
            map.add(key, key * 10).unwrap();
        }
        map
    }

    #[test]
    fn scenario_ordering_and_ranks() {
        let map = scenario();
        assert_eq!(map.least(), Some((&1, &10)));
        assert_eq!(map.greatest(), Some((&9, &90)));
        let keys: Vec<_> = map.iter().map(|(k, _, _)| *k).collect();
        assert_eq!(keys, [1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(map.get_key_by_rank(3), Ok(&5));
        map.inspect().validate().unwrap();
    }

    #[test]
    fn adjust_count_removes_and_shrinks_extent() {
        let mut map = scenario();
        assert_eq!(map.adjust_count(5, -1), Ok(0));
        assert!(!map.contains_key(&5));
        assert_eq!(map.extent(), 6);
        assert_eq!(map.get_rank(&7), Ok(3));
    }

    #[test]
    fn adjust_count_rejects_multiplicity() {
        let mut map = scenario();
        assert_eq!(map.adjust_count(5, 1), Err(Error::InvalidArgument("count must stay 0 or 1")));
        assert_eq!(map.adjust_count(6, 2), Err(Error::InvalidArgument("count must stay 0 or 1")));
        assert!(matches!(map.adjust_count(6, -1), Err(Error::InvalidArgument(_))));
        assert_eq!(map.adjust_count(6, 0), Ok(0));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn duplicate_add_is_reported() {
        let mut map = scenario();
        assert_eq!(map.try_add(4, 0), Ok(false));
        assert_eq!(map.add(4, 0), Err(Error::Duplicate));
        assert_eq!(map.len(), 7);
        assert_eq!(map.get(&4), Ok(&40));
    }

    #[test]
    fn rank_lookups_check_bounds() {
        let map = scenario();
        assert!(matches!(map.try_get_key_by_rank(-1), Err(Error::InvalidArgument(_))));
        assert_eq!(map.try_get_key_by_rank(7), Ok(None));
        assert_eq!(map.get_key_by_rank(7), Err(Error::NotFound));
        assert_eq!(map.try_get_key_value_by_rank(0), Ok(Some((&1, &10))));
        assert_eq!(map[Rank(6)], 90);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_past_end_panics() {
        let map = scenario();
        let _ = map[Rank(7)];
    }

    #[test]
    fn nearest_reports_fallback_ranks() {
        let map = scenario();
        let below = map.nearest_less(&1);
        assert!(!below.is_found());
        assert_eq!(below.rank(), 0);
        let above = map.nearest_greater_or_equal(&10);
        assert_eq!((above.key(), above.rank()), (None, 7));
        let exact = map.nearest_less_or_equal(&4);
        assert_eq!((exact.key_value(), exact.rank()), (Some((&4, &40)), 2));
        let strict = map.nearest_less(&4);
        assert_eq!((strict.key(), strict.rank()), (Some(&3), 1));
    }

    #[test]
    fn clear_is_idempotent() {
        let mut map = scenario();
        map.clear();
        let version = map.raw.version();
        map.clear();
        assert_eq!(map.raw.version(), version);
        assert!(map.is_empty());
        assert_eq!(map.extent(), 0);
        map.inspect().validate().unwrap();
    }

    #[test]
    fn set_updates_in_place() {
        let mut map = scenario();
        let mut cursor = map.fast_cursor();
        map.set(&3, 33).unwrap();
        assert_eq!(map.set(&2, 22), Err(Error::NotFound));
        assert_eq!(cursor.next(&map), Some(Ok((&1, &10, 0))));
        assert_eq!(map.get(&3), Ok(&33));
    }

    #[test]
    fn custom_comparer_orders_descending() {
        let mut map = RankMap::with_comparer(CompareFn(|a: &i32, b: &i32| b.cmp(a)));
        map.extend([(1, ()), (3, ()), (2, ())]);
        assert_eq!(map.get_rank(&3), Ok(0));
        assert_eq!(map.get_key_by_rank(2), Ok(&1));
    }

    #[test]
    fn debug_lists_entries() {
        let map: RankMap<_, _> = [(2, 'b'), (1, 'a')].into_iter().collect();
        assert_eq!(alloc::format!("{map:?}"), "{1: 'a', 2: 'b'}");
    }
}
