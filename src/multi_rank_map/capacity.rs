use super::MultiRankMap;
use crate::comparer::NaturalOrder;
use crate::error::Result;
use crate::raw::{AllocationMode, RawRankTree};

impl<K, V> MultiRankMap<K, V> {
    /// Creates an empty map with room for at least `capacity` distinct keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::MultiRankMap;
    ///
    /// let bag: MultiRankMap<i32, i32> = MultiRankMap::with_capacity(32);
    /// assert!(bag.is_empty());
    /// assert!(bag.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_options(NaturalOrder, capacity, AllocationMode::default())
    }
}

impl<K, V, C> MultiRankMap<K, V, C> {
    /// Creates an empty map with every construction option spelled out.
    ///
    /// For [`AllocationMode::Fixed`], `capacity` is the most distinct keys the map
    /// will ever hold; for the dynamic modes it is only a starting size.
    ///
    /// # Panics
    ///
    /// Panics if a fixed `capacity` exceeds the number of nodes a map can address.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::{AllocationMode, Error, NaturalOrder, MultiRankMap};
    ///
    /// let mut bag = MultiRankMap::with_options(NaturalOrder, 2, AllocationMode::Fixed);
    /// bag.add(1, (), 10).unwrap();
    /// bag.add(2, (), 10).unwrap();
    /// assert_eq!(bag.add(3, (), 1), Err(Error::CapacityExhausted { capacity: 2 }));
    ///
    /// // Counts do not use nodes.
    /// assert_eq!(bag.adjust_count(1, 5), Ok(15));
    /// ```
    #[must_use]
    pub fn with_options(comparer: C, capacity: usize, mode: AllocationMode) -> Self {
        MultiRankMap {
            raw: RawRankTree::new(comparer, mode, capacity),
        }
    }

    /// Returns how many distinct keys the map can hold without allocating.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns how many released nodes are waiting to be reused.
    ///
    /// Always zero under [`AllocationMode::DynamicDiscard`].
    #[must_use]
    pub const fn free_nodes(&self) -> usize {
        self.raw.free_nodes()
    }

    #[must_use]
    pub const fn allocation_mode(&self) -> AllocationMode {
        self.raw.allocation_mode()
    }

    /// Makes room for at least `additional` more distinct keys.
    ///
    /// Under [`AllocationMode::DynamicRetain`] the new nodes go onto the free
    /// list.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) if a
    /// fixed-capacity map has fewer than `additional` free nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::{AllocationMode, NaturalOrder, MultiRankMap};
    ///
    /// let mut bag: MultiRankMap<u8, ()> = MultiRankMap::with_options(NaturalOrder, 0, AllocationMode::DynamicRetain);
    /// bag.reserve(16).unwrap();
    /// assert_eq!(bag.free_nodes(), 16);
    /// ```
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.raw.reserve(additional)
    }
}
