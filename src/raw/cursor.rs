use smallvec::SmallVec;

use super::handle::Handle;
use super::raw_rank_tree::RawRankTree;
use crate::comparer::Comparer;
use crate::error::{Error, Result};

/// One step of an in-order walk: a node, its position and its length.
pub(crate) type Step = (Handle, isize, isize);

/// Explicit-stack in-order traversal.
///
/// The stack holds the nodes (with their positions) whose left subtree has
/// been entered but which have not been yielded yet; the top is always the
/// next entry in key order. The height of a red-black tree stays within
/// 2·log2(n + 1), so the inline buffer covers any tree that fits in memory
/// without spilling in practice.
#[derive(Clone, Debug, Default)]
pub(crate) struct Spine {
    stack: SmallVec<[(Handle, isize); 32]>,
}

impl Spine {
    pub(crate) fn new<K, V, C>(tree: &RawRankTree<K, V, C>) -> Self {
        let mut spine = Self::default();
        spine.descend_left(tree, tree.root(), 0);
        spine
    }

    fn descend_left<K, V, C>(&mut self, tree: &RawRankTree<K, V, C>, mut current: Option<Handle>, mut base: isize) {
        while let Some(handle) = current {
            let node = tree.node(handle);
            base += node.offset;
            self.stack.push((handle, base));
            current = node.left;
        }
    }

    pub(crate) fn next<K, V, C>(&mut self, tree: &RawRankTree<K, V, C>) -> Option<Step> {
        let (handle, position) = self.stack.pop()?;
        self.descend_left(tree, tree.node(handle).right, position);
        let end = self.stack.last().map_or(tree.extent(), |&(_, next)| next);
        Some((handle, position, end - position))
    }
}

/// Structure-driven cursor that refuses to continue after a mutation.
#[derive(Clone, Debug)]
pub(crate) struct FastCursor {
    spine: Spine,
    version: u64,
    invalidated: bool,
}

impl FastCursor {
    pub(crate) fn new<K, V, C>(tree: &RawRankTree<K, V, C>) -> Self {
        Self {
            spine: Spine::new(tree),
            version: tree.version(),
            invalidated: false,
        }
    }

    /// Advances the cursor.
    ///
    /// Once the tree has been mutated, this and every later call report
    /// [`Error::ConcurrentModification`].
    pub(crate) fn next<K, V, C>(&mut self, tree: &RawRankTree<K, V, C>) -> Option<Result<Step>> {
        if self.invalidated || self.version != tree.version() {
            self.invalidated = true;
            return Some(Err(Error::ConcurrentModification));
        }
        self.spine.next(tree).map(Ok)
    }
}

/// Query-driven cursor that re-finds its place on every step.
///
/// Only the last yielded key is kept, so entries inserted or removed ahead of
/// the cursor are seen or skipped, and changes behind it have no effect.
#[derive(Clone, Debug)]
pub(crate) struct RobustCursor<K> {
    last: Option<K>,
    done: bool,
}

impl<K> Default for RobustCursor<K> {
    fn default() -> Self {
        Self { last: None, done: false }
    }
}

impl<K: Clone> RobustCursor<K> {
    pub(crate) fn next<V, C: Comparer<K>>(&mut self, tree: &RawRankTree<K, V, C>) -> Option<Step> {
        if self.done {
            return None;
        }
        let found = match &self.last {
            None => tree.least(),
            Some(last) => tree.nearest_greater(last, false),
        };
        let Some((handle, position)) = found else {
            self.done = true;
            return None;
        };
        let key = &tree.node(handle).key;
        let end = tree.nearest_greater(key, false).map_or(tree.extent(), |(_, next)| next);
        self.last = Some(key.clone());
        Some((handle, position, end - position))
    }
}
