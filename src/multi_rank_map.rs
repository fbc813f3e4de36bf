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

/// An ordered map whose keys each occupy a positive number of ranks.
///
/// Every key carries a count. The entries are laid out in key order with each
/// key covering `count` consecutive ranks, so the rank of a key is the sum of
/// the counts of all smaller keys, and the map's [`extent`](Self::extent) is the
/// sum of all counts. Changing a count with [`adjust_count`](Self::adjust_count)
/// shifts the ranks of every greater key in O(log n).
///
/// # Examples
///
/// ```
/// use rank_rbtree::MultiRankMap;
///
/// let mut bag = MultiRankMap::new();
/// bag.add("apple", 1.25, 3).unwrap();
/// bag.add("pear", 0.5, 2).unwrap();
/// bag.add("fig", 2.0, 1).unwrap();
///
/// assert_eq!(bag.len(), 3);
/// assert_eq!(bag.extent(), 6);
/// assert_eq!(bag.get_rank(&"pear"), Ok(4));
/// assert_eq!(bag.get_key_by_rank(3), Ok(&"fig"));
///
/// bag.adjust_count("apple", -2).unwrap();
/// assert_eq!(bag.get_rank(&"pear"), Ok(2));
/// ```
pub struct MultiRankMap<K, V, C = NaturalOrder> {
    raw: RawRankTree<K, V, C>,
}

/// An iterator over the entries of a `MultiRankMap`, yielding
/// `(key, value, rank, count)`.
///
/// This `struct` is created by the [`iter`] method on [`MultiRankMap`].
///
/// [`iter`]: MultiRankMap::iter
pub struct Iter<'a, K, V, C> {
    tree: &'a RawRankTree<K, V, C>,
    spine: Spine,
    remaining: usize,
}

impl<K, V> MultiRankMap<K, V> {
    /// Makes a new, empty `MultiRankMap` ordered by `K`'s [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparer(NaturalOrder)
    }
}

impl<K, V, C> MultiRankMap<K, V, C> {
    /// Makes a new, empty `MultiRankMap` ordered by `comparer`.
    #[must_use]
    pub fn with_comparer(comparer: C) -> Self {
        Self::with_options(comparer, 0, AllocationMode::default())
    }

    /// Returns the number of distinct keys in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the sum of all counts.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn extent(&self) -> isize {
        self.raw.extent()
    }

    #[must_use]
    pub const fn comparer(&self) -> &C {
        self.raw.comparer()
    }

    /// Clears the map, removing all entries.
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
    /// `(key, value, rank, count)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::MultiRankMap;
    ///
    /// let mut bag = MultiRankMap::new();
    /// bag.add('b', (), 2).unwrap();
    /// bag.add('a', (), 3).unwrap();
    ///
    /// let entries: Vec<_> = bag.iter().map(|(k, _, rank, count)| (*k, rank, count)).collect();
    /// assert_eq!(entries, [('a', 0, 3), ('b', 3, 2)]);
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

impl<K, V, C: Comparer<K>> MultiRankMap<K, V, C> {
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.raw.find(key).is_some()
    }

    /// Returns a reference to the value corresponding to `key`, if any.
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

    /// Replaces the value of an existing entry in place, keeping its count.
    ///
    /// Returns `false`, and drops `value`, if the key is absent.
    pub fn try_set(&mut self, key: &K, value: V) -> bool {
        self.try_get_mut(key).map(|slot| *slot = value).is_some()
    }

    /// Replaces the value of an existing entry in place, keeping its count.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent.
    pub fn set(&mut self, key: &K, value: V) -> Result<()> {
        if self.try_set(key, value) { Ok(()) } else { Err(Error::NotFound) }
    }

    /// Adds an entry covering `count` ranks if the key is absent.
    ///
    /// Returns `Ok(false)` and leaves the map unchanged if the key is present.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `count` is not positive,
    /// [`Error::ArithmeticOverflow`] if the extent would pass `isize::MAX`, and
    /// [`Error::CapacityExhausted`] if a fixed-capacity map is full. The map is
    /// unchanged in every case.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::{Error, MultiRankMap};
    ///
    /// let mut bag = MultiRankMap::new();
    /// assert_eq!(bag.try_add(1, "a", 4), Ok(true));
    /// assert_eq!(bag.try_add(1, "b", 1), Ok(false));
    /// assert!(matches!(bag.try_add(2, "c", 0), Err(Error::InvalidArgument(_))));
    /// assert_eq!(bag.extent(), 4);
    /// ```
    pub fn try_add(&mut self, key: K, value: V, count: isize) -> Result<bool> {
        self.raw.insert(key, value, count)
    }

    /// Adds an entry covering `count` ranks; the key must be absent.
    ///
    /// # Errors
    ///
    /// [`Error::Duplicate`] if the key is present, plus the errors of
    /// [`try_add`](Self::try_add).
    pub fn add(&mut self, key: K, value: V, count: isize) -> Result<()> {
        if self.try_add(key, value, count)? { Ok(()) } else { Err(Error::Duplicate) }
    }

    /// Removes `key` whatever its count, returning its entry if it was present.
    pub fn try_remove(&mut self, key: &K) -> Option<(K, V)> {
        self.raw.remove(key)
    }

    /// Removes `key` whatever its count and returns its value.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        self.try_remove(key).map(|(_, value)| value).ok_or(Error::NotFound)
    }

    /// Returns the count of `key`, or `None` if it is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn try_get_count(&self, key: &K) -> Option<isize> {
        self.raw.find_span(key).map(|span| span.length)
    }

    /// Returns the count of `key`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent.
    pub fn get_count(&self, key: &K) -> Result<isize> {
        self.try_get_count(key).ok_or(Error::NotFound)
    }

    #[must_use]
    pub fn nearest_less(&self, key: &K) -> Nearest<'_, K, V> {
        Nearest::less(&self.raw, key, false)
    }

    #[must_use]
    pub fn nearest_less_or_equal(&self, key: &K) -> Nearest<'_, K, V> {
        Nearest::less(&self.raw, key, true)
    }

    #[must_use]
    pub fn nearest_greater(&self, key: &K) -> Nearest<'_, K, V> {
        Nearest::greater(&self.raw, key, false)
    }

    #[must_use]
    pub fn nearest_greater_or_equal(&self, key: &K) -> Nearest<'_, K, V> {
        Nearest::greater(&self.raw, key, true)
    }

    /// Adds `delta` to the count of `key` and returns the new count.
    ///
    /// A count reaching zero removes the entry. A positive `delta` on an absent
    /// key inserts it with `V::default()` and a count of `delta`; a zero
    /// `delta` on an absent key does nothing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the count would become negative,
    /// [`Error::ArithmeticOverflow`] if the count or the extent would pass
    /// `isize::MAX`, and [`Error::CapacityExhausted`] if inserting into a full
    /// fixed-capacity map. The map is unchanged in every case.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::MultiRankMap;
    ///
    /// let mut bag: MultiRankMap<char, ()> = MultiRankMap::new();
    /// assert_eq!(bag.adjust_count('x', 3), Ok(3));
    /// assert_eq!(bag.adjust_count('x', 2), Ok(5));
    /// assert!(bag.adjust_count('x', -6).is_err());
    /// assert_eq!(bag.adjust_count('x', -5), Ok(0));
    /// assert!(!bag.contains_key(&'x'));
    /// ```
    pub fn adjust_count(&mut self, key: K, delta: isize) -> Result<isize>
    where
        V: Default,
    {
        self.raw.adjust_count(key, delta, Multiplicity::Multiple, V::default)
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for MultiRankMap<K, V, C> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for MultiRankMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v, _, count)| (k, (v, count))))
            .finish()
    }
}

impl<K, V, C: Default> Default for MultiRankMap<K, V, C> {
    /// Creates an empty `MultiRankMap`.
    fn default() -> Self {
        Self::with_comparer(C::default())
    }
}

impl<'a, K, V, C> IntoIterator for &'a MultiRankMap<K, V, C> {
    type Item = (&'a K, &'a V, isize, isize);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Iter<'a, K, V, C> {
        self.iter()
    }
}

/// Indexes into the map by rank; every rank a key covers yields its value.
///
/// # Panics
///
/// Panics if `rank` is negative or not less than the map's extent.
impl<K, V, C> Index<Rank> for MultiRankMap<K, V, C> {
    type Output = V;

    fn index(&self, rank: Rank) -> &V {
        match self.raw.find_by_rank(rank.0) {
            Ok(Some((handle, _))) => &self.raw.node(handle).value,
            _ => panic!("`MultiRankMap::index()` - rank {} is out of bounds!", rank.0),
        }
    }
}

impl<'a, K: 'a, V: 'a, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V, isize, isize);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let (handle, rank, count) = self.spine.next(tree)?;
        self.remaining -= 1;
        let node = tree.node(handle);
        Some((&node.key, &node.value, rank, count))
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
