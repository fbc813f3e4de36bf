use alloc::collections::BTreeSet;
use alloc::format;
use core::cmp::Ordering;

use super::handle::Handle;
use super::raw_rank_tree::RawRankTree;
use crate::comparer::Comparer;
use crate::error::{Error, Result};

/// State threaded through the validating walk.
struct Walk {
    visited: BTreeSet<Handle>,
    previous: Option<isize>,
    nodes: usize,
    height: usize,
}

impl<K, V, C: Comparer<K>> RawRankTree<K, V, C> {
    /// Checks every structural invariant of the tree.
    ///
    /// Walks the whole tree, so it is meant for tests and diagnostics only.
    pub(crate) fn validate(&self) -> Result<()> {
        let result = self.check();
        if let Err(Error::InvariantViolation(message)) = &result {
            tracing::error!(%message, "tree invariant violated");
        }
        result
    }

    fn check(&self) -> Result<()> {
        if self.live_nodes() != self.len() {
            return Err(Error::invariant(format!(
                "{} live nodes for {} entries",
                self.live_nodes(),
                self.len()
            )));
        }
        let Some(root) = self.root() else {
            if self.len() != 0 || self.extent() != 0 {
                return Err(Error::invariant("empty tree with entries or extent"));
            }
            return Ok(());
        };
        if self.node(root).is_red() {
            return Err(Error::invariant("root is red"));
        }

        let mut walk = Walk {
            visited: BTreeSet::new(),
            previous: None,
            nodes: 0,
            height: 0,
        };
        self.check_subtree(root, 0, 1, None, None, &mut walk)?;

        if walk.nodes != self.len() {
            return Err(Error::invariant(format!(
                "reached {} nodes but the tree counts {}",
                walk.nodes,
                self.len()
            )));
        }
        if let Some(last) = walk.previous
            && last >= self.extent()
        {
            return Err(Error::invariant(format!(
                "last entry starts at {last}, not before the extent {}",
                self.extent()
            )));
        }

        // A red-black tree is at least as tall as a perfect tree and at most twice that.
        let shortest = (usize::BITS - self.len().leading_zeros()) as usize;
        if walk.height < shortest || walk.height > 2 * shortest {
            return Err(Error::invariant(format!(
                "height {} outside [{shortest}, {}] for {} entries",
                walk.height,
                2 * shortest,
                self.len()
            )));
        }
        Ok(())
    }

    /// Checks the subtree at `handle` and returns its black height.
    fn check_subtree(
        &self,
        handle: Handle,
        base: isize,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        walk: &mut Walk,
    ) -> Result<usize> {
        if !walk.visited.insert(handle) {
            return Err(Error::invariant(format!("node {} reached twice", handle.index())));
        }
        walk.height = walk.height.max(depth);

        let node = self.node(handle);
        let position = base
            .checked_add(node.offset)
            .ok_or_else(|| Error::invariant("position overflows"))?;

        if lower.is_some_and(|lower| self.comparer().compare(lower, &node.key) != Ordering::Less) {
            return Err(Error::invariant(format!("node {} is not above its lower bound", handle.index())));
        }
        if upper.is_some_and(|upper| self.comparer().compare(&node.key, upper) != Ordering::Less) {
            return Err(Error::invariant(format!("node {} is not below its upper bound", handle.index())));
        }

        let red_child = [node.left, node.right]
            .into_iter()
            .flatten()
            .any(|child| self.node(child).is_red());
        if node.is_red() && red_child {
            return Err(Error::invariant(format!("red node {} has a red child", handle.index())));
        }

        let left_height = match node.left {
            Some(left) => self.check_subtree(left, position, depth + 1, lower, Some(&node.key), walk)?,
            None => 0,
        };

        match walk.previous {
            None if position != 0 => {
                return Err(Error::invariant(format!("first entry starts at {position}, not 0")));
            }
            Some(previous) if position <= previous => {
                return Err(Error::invariant(format!(
                    "node {} at {position} does not follow its predecessor at {previous}",
                    handle.index()
                )));
            }
            _ => {}
        }
        walk.previous = Some(position);
        walk.nodes += 1;

        let right_height = match node.right {
            Some(right) => self.check_subtree(right, position, depth + 1, Some(&node.key), upper, walk)?,
            None => 0,
        };

        if left_height != right_height {
            return Err(Error::invariant(format!(
                "node {} has black heights {left_height} and {right_height}",
                handle.index()
            )));
        }
        Ok(left_height + usize::from(node.is_black()))
    }
}
