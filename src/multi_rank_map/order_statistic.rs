use super::MultiRankMap;
use crate::comparer::Comparer;
use crate::error::{Error, Result};

impl<K, V, C> MultiRankMap<K, V, C> {
    /// Returns the key covering rank `rank`.
    ///
    /// A key with count `n` and rank `r` covers ranks `r..r + n`.
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
    /// use rank_rbtree::MultiRankMap;
    ///
    /// let mut bag = MultiRankMap::new();
    /// bag.add("a", (), 2).unwrap();
    /// bag.add("b", (), 1).unwrap();
    ///
    /// assert_eq!(bag.try_get_key_by_rank(1), Ok(Some(&"a")));
    /// assert_eq!(bag.try_get_key_by_rank(2), Ok(Some(&"b")));
    /// assert_eq!(bag.try_get_key_by_rank(3), Ok(None));
    /// ```
    pub fn try_get_key_by_rank(&self, rank: isize) -> Result<Option<&K>> {
        Ok(self.try_get_key_value_by_rank(rank)?.map(|(key, _)| key))
    }

    /// Returns the key covering rank `rank`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `rank` is negative, [`Error::NotFound`] if
    /// it is not less than the map's extent.
    pub fn get_key_by_rank(&self, rank: isize) -> Result<&K> {
        self.try_get_key_by_rank(rank)?.ok_or(Error::NotFound)
    }

    /// Returns the entry covering rank `rank`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `rank` is negative.
    pub fn try_get_key_value_by_rank(&self, rank: isize) -> Result<Option<(&K, &V)>> {
        Ok(self.raw.find_by_rank(rank)?.map(|(handle, _)| {
            let node = self.raw.node(handle);
            (&node.key, &node.value)
        }))
    }
}

impl<K, V, C: Comparer<K>> MultiRankMap<K, V, C> {
    /// Returns the first rank `key` covers, or `None` if it is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn try_get_rank(&self, key: &K) -> Option<isize> {
        self.raw.find(key).map(|(_, rank)| rank)
    }

    /// Returns the first rank `key` covers.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the key is absent.
    pub fn get_rank(&self, key: &K) -> Result<isize> {
        self.try_get_rank(key).ok_or(Error::NotFound)
    }
}
