use super::RankMap;
use crate::comparer::Comparer;
use crate::error::{Error, Result};

impl<K, V, C> RankMap<K, V, C> {
    /// Returns the key at position `rank` in sorted order.
    ///
    /// The rank is zero-based; a rank at or past the end is simply absent.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `rank` is negative.
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
    /// let map: RankMap<_, _> = [("a", 10), ("c", 30), ("b", 20)].into_iter().collect();
    ///
    /// assert_eq!(map.try_get_key_by_rank(1), Ok(Some(&"b")));
    /// assert_eq!(map.try_get_key_by_rank(3), Ok(None));
    /// assert!(map.try_get_key_by_rank(-1).is_err());
    /// ```
    pub fn try_get_key_by_rank(&self, rank: isize) -> Result<Option<&K>> {
        Ok(self.try_get_key_value_by_rank(rank)?.map(|(key, _)| key))
    }

    /// Returns the key at position `rank` in sorted order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `rank` is negative, [`Error::NotFound`] if
    /// it is not less than the map's length.
    pub fn get_key_by_rank(&self, rank: isize) -> Result<&K> {
        self.try_get_key_by_rank(rank)?.ok_or(Error::NotFound)
    }

    /// Returns the entry at position `rank` in sorted order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `rank` is negative.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn try_get_key_value_by_rank(&self, rank: isize) -> Result<Option<(&K, &V)>> {
        Ok(self.raw.find_by_rank(rank)?.map(|(handle, _)| {
            let node = self.raw.node(handle);
            (&node.key, &node.value)
        }))
    }
}

impl<K, V, C: Comparer<K>> RankMap<K, V, C> {
    /// Returns the zero-based rank of `key`, or `None` if it is absent.
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
    /// let map: RankMap<_, _> = [(10, "a"), (20, "b")].into_iter().collect();
    ///
    /// assert_eq!(map.try_get_rank(&20), Some(1));
    /// assert_eq!(map.try_get_rank(&15), None);
    /// ```
    #[must_use]
    pub fn try_get_rank(&self, key: &K) -> Option<isize> {
        self.raw.find(key).map(|(_, rank)| rank)
    }

    /// Returns the zero-based rank of `key`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent.
    pub fn get_rank(&self, key: &K) -> Result<isize> {
        self.try_get_rank(key).ok_or(Error::NotFound)
    }
}
