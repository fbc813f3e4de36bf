use super::RankMap;
use crate::comparer::NaturalOrder;
use crate::error::Result;
use crate::raw::{AllocationMode, RawRankTree};

impl<K, V> RankMap<K, V> {
    /// Creates an empty map with room for at least `capacity` entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::RankMap;
    ///
    /// let map: RankMap<i32, i32> = RankMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
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

impl<K, V, C> RankMap<K, V, C> {
    /// Creates an empty map with every construction option spelled out.
    ///
    /// For [`AllocationMode::Fixed`], `capacity` is the most entries the map
    /// will ever hold; for the dynamic modes it is only a starting size.
    ///
    /// # Panics
    ///
    /// Panics if a fixed `capacity` exceeds the number of nodes a map can address.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_rbtree::{AllocationMode, Error, NaturalOrder, RankMap};
    ///
    /// let mut map = RankMap::with_options(NaturalOrder, 2, AllocationMode::Fixed);
    /// map.add(1, ()).unwrap();
    /// map.add(2, ()).unwrap();
    /// assert_eq!(map.add(3, ()), Err(Error::CapacityExhausted { capacity: 2 }));
    /// ```
    #[must_use]
    pub fn with_options(comparer: C, capacity: usize, mode: AllocationMode) -> Self {
        RankMap {
            raw: RawRankTree::new(comparer, mode, capacity),
        }
    }

    /// Returns how many entries the map can hold without allocating.
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

    /// Makes room for at least `additional` more entries.
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
    /// use rank_rbtree::{AllocationMode, NaturalOrder, RankMap};
    ///
    /// let mut map: RankMap<u8, ()> = RankMap::with_options(NaturalOrder, 0, AllocationMode::DynamicRetain);
    /// map.reserve(16).unwrap();
    /// assert_eq!(map.free_nodes(), 16);
    /// ```
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.raw.reserve(additional)
    }
}
