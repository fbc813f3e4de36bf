//! Read-only access to the node graph, for tests and diagnostics.

use alloc::vec::Vec;
use core::fmt;

use crate::comparer::Comparer;
use crate::error::Result;
use crate::raw::{Handle, RawRankTree, Spine};

/// A read-only view of a map's red-black tree.
///
/// Created by `inspect()` on [`RankMap`](crate::RankMap) and
/// [`MultiRankMap`](crate::MultiRankMap). Nothing here is needed for normal use
/// of the maps.
///
/// # Examples
///
/// ```
/// use rank_rbtree::RankMap;
///
/// let map: RankMap<_, _> = (0..100).map(|k| (k, k * k)).collect();
/// let inspector = map.inspect();
///
/// assert!(inspector.validate().is_ok());
/// assert!(!inspector.root().unwrap().is_red());
/// assert_eq!(inspector.rank_dump()[3], (&3, &9, 3, 1));
/// ```
pub struct Inspector<'a, K, V, C> {
    tree: &'a RawRankTree<K, V, C>,
}

/// A node of the tree.
pub struct NodeView<'a, K, V, C> {
    tree: &'a RawRankTree<K, V, C>,
    handle: Handle,
}

impl<'a, K, V, C> Inspector<'a, K, V, C> {
    pub(crate) const fn new(tree: &'a RawRankTree<K, V, C>) -> Self {
        Self { tree }
    }

    /// Returns the root node, or `None` for an empty map.
    #[must_use]
    pub fn root(&self) -> Option<NodeView<'a, K, V, C>> {
        NodeView::wrap(self.tree, self.tree.root())
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Returns the number of nodes the node store currently has allocated.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.tree.live_nodes()
    }

    /// Returns every entry in key order as `(key, value, rank, count)`.
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn rank_dump(&self) -> Vec<(&'a K, &'a V, isize, isize)> {
        let tree = self.tree;
        let mut spine = Spine::new(tree);
        let mut dump = Vec::with_capacity(tree.len());
        while let Some((handle, rank, count)) = spine.next(tree) {
            let node = tree.node(handle);
            dump.push((&node.key, &node.value, rank, count));
        }
        dump
    }
}

impl<K, V, C: Comparer<K>> Inspector<'_, K, V, C> {
    /// Checks every structural invariant of the tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`](crate::Error::InvariantViolation)
    /// describing the first broken invariant found.
    ///
    /// # Complexity
    ///
    /// O(n log n)
    pub fn validate(&self) -> Result<()> {
        self.tree.validate()
    }
}

impl<'a, K, V, C> NodeView<'a, K, V, C> {
    fn wrap(tree: &'a RawRankTree<K, V, C>, handle: Option<Handle>) -> Option<Self> {
        handle.map(|handle| Self { tree, handle })
    }

    #[must_use]
    pub fn key(&self) -> &'a K {
        &self.tree.node(self.handle).key
    }

    #[must_use]
    pub fn value(&self) -> &'a V {
        &self.tree.node(self.handle).value
    }

    #[must_use]
    pub fn is_red(&self) -> bool {
        self.tree.node(self.handle).is_red()
    }

    /// Returns the node's position relative to its parent (for the root, its
    /// absolute position).
    #[must_use]
    pub fn offset(&self) -> isize {
        self.tree.node(self.handle).offset
    }

    #[must_use]
    pub fn left(&self) -> Option<Self> {
        Self::wrap(self.tree, self.tree.node(self.handle).left)
    }

    #[must_use]
    pub fn right(&self) -> Option<Self> {
        Self::wrap(self.tree, self.tree.node(self.handle).right)
    }
}

impl<K, V, C> Clone for NodeView<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for NodeView<'_, K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for NodeView<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeView")
            .field("key", self.key())
            .field("value", self.value())
            .field("red", &self.is_red())
            .field("offset", &self.offset())
            .finish_non_exhaustive()
    }
}

impl<K, V, C> fmt::Debug for Inspector<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspector").field("len", &self.tree.len()).finish()
    }
}
