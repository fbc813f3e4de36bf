use core::cmp::Ordering;
use core::mem;

use super::handle::Handle;
use super::node::{Color, Node};
use super::store::{AllocationMode, NodeStore, Relocation};
use crate::comparer::Comparer;
use crate::error::{Error, Result};

/// How many consecutive ranks a single key may occupy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Multiplicity {
    /// Every entry spans exactly one rank.
    Single,
    /// An entry spans any positive number of ranks.
    Multiple,
}

/// The four restructurings used to turn a 2-node red during deletion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Rotation {
    Left,
    Right,
    LeftRight,
    RightLeft,
}

/// A located entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Span {
    pub(crate) handle: Handle,
    /// Absolute position of the entry's first rank.
    pub(crate) position: isize,
    /// Number of ranks the entry covers.
    pub(crate) length: isize,
}

/// The red-black engine backing `RankMap` and `MultiRankMap`.
///
/// Entries are ordered by key; each covers a positive number of consecutive
/// positions starting at its absolute position. Absolute positions are never
/// stored: a node keeps only its offset from its parent, and the position of a
/// node is the sum of the offsets on the path from the root. An entry's length
/// is the gap to the next entry's position (or to `extent` for the last one).
///
/// Insertion and deletion are both single top-down passes. Insertion splits
/// every 4-node it meets on the way down; deletion turns every 2-node it meets
/// red, so neither needs a bottom-up fix-up or parent pointers.
#[derive(Clone)]
pub(crate) struct RawRankTree<K, V, C> {
    store: NodeStore<Node<K, V>>,
    root: Option<Handle>,
    count: usize,
    extent: isize,
    /// Bumped by every structural mutation; fast cursors compare against it.
    version: u64,
    comparer: C,
}

impl<K, V, C> RawRankTree<K, V, C> {
    pub(crate) fn new(comparer: C, mode: AllocationMode, capacity: usize) -> Self {
        Self {
            store: NodeStore::new(mode, capacity),
            root: None,
            count: 0,
            extent: 0,
            version: 0,
            comparer,
        }
    }

    /// Returns the number of entries.
    pub(crate) const fn len(&self) -> usize {
        self.count
    }

    /// Returns the total span of all entries.
    pub(crate) const fn extent(&self) -> isize {
        self.extent
    }

    pub(crate) const fn version(&self) -> u64 {
        self.version
    }

    pub(crate) const fn comparer(&self) -> &C {
        &self.comparer
    }

    pub(crate) const fn allocation_mode(&self) -> AllocationMode {
        self.store.mode()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub(crate) const fn free_nodes(&self) -> usize {
        self.store.free_len()
    }

    pub(crate) const fn live_nodes(&self) -> usize {
        self.store.live()
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.store.slot_count()
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.store.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.store.get_mut(handle)
    }

    pub(crate) fn reserve(&mut self, additional: usize) -> Result<()> {
        self.store.reserve(additional)
    }

    /// Removes every entry. Calling it on an empty tree changes nothing.
    pub(crate) fn clear(&mut self) {
        if self.count == 0 {
            return;
        }
        tracing::debug!(count = self.count, extent = self.extent, "clearing tree");
        self.bump_version();
        self.store.clear();
        self.root = None;
        self.count = 0;
        self.extent = 0;
    }

    /// Returns the leftmost node and its position.
    pub(crate) fn least(&self) -> Option<(Handle, isize)> {
        self.spine_end(false)
    }

    /// Returns the rightmost node and its position.
    pub(crate) fn greatest(&self) -> Option<(Handle, isize)> {
        self.spine_end(true)
    }

    fn spine_end(&self, right: bool) -> Option<(Handle, isize)> {
        let mut handle = self.root?;
        let mut position = self.node(handle).offset;
        while let Some(child) = self.node(handle).child(right) {
            position += self.node(child).offset;
            handle = child;
        }
        Some((handle, position))
    }

    /// Returns the entry covering `position`, with the entry's own position.
    pub(crate) fn find_by_position(&self, position: isize) -> Option<(Handle, isize)> {
        if position < 0 || position >= self.extent {
            return None;
        }
        let mut current = self.root;
        let mut base = 0;
        let mut best = None;
        while let Some(handle) = current {
            let node = self.node(handle);
            let node_position = base + node.offset;
            base = node_position;
            if position < node_position {
                current = node.left;
            } else {
                best = Some((handle, node_position));
                if position == node_position {
                    break;
                }
                current = node.right;
            }
        }
        best
    }

    /// Like [`find_by_position`](Self::find_by_position), but a negative rank is an error.
    pub(crate) fn find_by_rank(&self, rank: isize) -> Result<Option<(Handle, isize)>> {
        if rank < 0 {
            return Err(Error::InvalidArgument("rank must not be negative"));
        }
        Ok(self.find_by_position(rank))
    }

    /// Returns the height of the tree (0 when empty).
    pub(crate) fn height(&self) -> usize {
        fn depth<K, V, C>(tree: &RawRankTree<K, V, C>, handle: Option<Handle>) -> usize {
            handle.map_or(0, |h| {
                let node = tree.node(h);
                1 + depth(tree, node.left).max(depth(tree, node.right))
            })
        }
        depth(self, self.root)
    }

    #[inline]
    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Adds `delta` to the position of every entry at or after `position`.
    ///
    /// Only the search path for `position` is touched: a node at or after the
    /// target takes the shift (carrying its right subtree along) and its left
    /// child takes the opposite shift, so the left subtree stays put until the
    /// walk descends into it.
    fn shift_right_of_path(&mut self, position: isize, delta: isize) {
        tracing::trace!(position, delta, "shifting positions");
        let mut current = self.root;
        let mut base = 0;
        while let Some(handle) = current {
            let node = self.node_mut(handle);
            let node_position = base + node.offset;
            if position <= node_position {
                node.offset += delta;
                let left = node.left;
                if let Some(left) = left {
                    self.node_mut(left).offset -= delta;
                }
                if position == node_position {
                    break;
                }
                base = node_position + delta;
                current = left;
            } else {
                base = node_position;
                current = node.right;
            }
        }
    }

    #[inline]
    fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.node(h).is_red())
    }

    fn is_2node(&self, handle: Handle) -> bool {
        let node = self.node(handle);
        node.is_black() && !self.is_red(node.left) && !self.is_red(node.right)
    }

    fn is_4node(&self, handle: Handle) -> bool {
        let node = self.node(handle);
        self.is_red(node.left) && self.is_red(node.right)
    }

    fn set_color(&mut self, handle: Option<Handle>, color: Color) {
        if let Some(handle) = handle {
            self.node_mut(handle).color = color;
        }
    }

    fn split_4node(&mut self, handle: Handle) {
        let node = self.node_mut(handle);
        node.color = Color::Red;
        let (left, right) = (node.left, node.right);
        self.set_color(left, Color::Black);
        self.set_color(right, Color::Black);
    }

    fn merge_2nodes(&mut self, handle: Handle) {
        let node = self.node_mut(handle);
        node.color = Color::Black;
        let (left, right) = (node.left, node.right);
        self.set_color(left, Color::Red);
        self.set_color(right, Color::Red);
    }

    fn color_root_black(&mut self) {
        self.set_color(self.root, Color::Black);
    }

    fn sibling(&self, parent: Handle, child: Handle) -> Handle {
        let node = self.node(parent);
        let sibling = if node.left == Some(child) { node.right } else { node.left };
        sibling.expect("`RawRankTree::sibling()` - 2-node without a sibling!")
    }

    fn replace_child_or_root(&mut self, parent: Option<Handle>, child: Handle, new_child: Option<Handle>) {
        match parent {
            Some(parent) => {
                let replaced = self.node_mut(parent).replace_child(child, new_child);
                debug_assert!(replaced, "`RawRankTree::replace_child_or_root()` - not a child!");
            }
            None => self.root = new_child,
        }
    }

    /// Rotates `handle` down to the left and returns the new subtree root.
    ///
    /// The right child moves up into `handle`'s place, so its offset absorbs
    /// `handle`'s; `handle` becomes relative to it; the right child's former
    /// left subtree changes parent and is re-based onto `handle`.
    fn rotate_left(&mut self, handle: Handle) -> Handle {
        let right = self.node(handle).right.expect("`RawRankTree::rotate_left()` - missing right child!");
        let offset = self.node(handle).offset;
        let right_offset = self.node(right).offset;
        let inner = self.node(right).left;

        let node = self.node_mut(handle);
        node.right = inner;
        node.offset = -right_offset;
        let up = self.node_mut(right);
        up.left = Some(handle);
        up.offset = right_offset + offset;
        if let Some(inner) = inner {
            self.node_mut(inner).offset += right_offset;
        }
        right
    }

    /// Mirror image of [`rotate_left`](Self::rotate_left).
    fn rotate_right(&mut self, handle: Handle) -> Handle {
        let left = self.node(handle).left.expect("`RawRankTree::rotate_right()` - missing left child!");
        let offset = self.node(handle).offset;
        let left_offset = self.node(left).offset;
        let inner = self.node(left).right;

        let node = self.node_mut(handle);
        node.left = inner;
        node.offset = -left_offset;
        let up = self.node_mut(left);
        up.right = Some(handle);
        up.offset = left_offset + offset;
        if let Some(inner) = inner {
            self.node_mut(inner).offset += left_offset;
        }
        left
    }

    /// Lifts the left child's right child to the top of the subtree.
    fn rotate_left_right(&mut self, handle: Handle) -> Handle {
        let left = self.node(handle).left.expect("`RawRankTree::rotate_left_right()` - missing left child!");
        let middle = self.rotate_left(left);
        self.node_mut(handle).left = Some(middle);
        self.rotate_right(handle)
    }

    /// Lifts the right child's left child to the top of the subtree.
    fn rotate_right_left(&mut self, handle: Handle) -> Handle {
        let right = self.node(handle).right.expect("`RawRankTree::rotate_right_left()` - missing right child!");
        let middle = self.rotate_right(right);
        self.node_mut(handle).right = Some(middle);
        self.rotate_left(handle)
    }

    /// Picks the rotation that borrows from a 3- or 4-node `sibling` of `current`.
    fn rotation_for(&self, parent: Handle, current: Handle, sibling: Handle) -> Rotation {
        let current_is_left = self.node(parent).left == Some(current);
        match (self.is_red(self.node(sibling).left), current_is_left) {
            (true, true) => Rotation::RightLeft,
            (true, false) => Rotation::Right,
            (false, true) => Rotation::Left,
            (false, false) => Rotation::LeftRight,
        }
    }

    fn rotate(&mut self, handle: Handle, rotation: Rotation) -> Handle {
        match rotation {
            Rotation::Right => {
                let left = self.node(handle).left;
                let outer = left.and_then(|l| self.node(l).left);
                self.set_color(outer, Color::Black);
                self.rotate_right(handle)
            }
            Rotation::Left => {
                let right = self.node(handle).right;
                let outer = right.and_then(|r| self.node(r).right);
                self.set_color(outer, Color::Black);
                self.rotate_left(handle)
            }
            Rotation::LeftRight => self.rotate_left_right(handle),
            Rotation::RightLeft => self.rotate_right_left(handle),
        }
    }

    /// Restores a red node with a red parent found during insertion.
    ///
    /// Returns the node that is now `current`'s parent.
    fn insertion_balance(
        &mut self,
        current: Handle,
        parent: Handle,
        grand_parent: Handle,
        great_grand_parent: Option<Handle>,
    ) -> Option<Handle> {
        let parent_on_right = self.node(grand_parent).right == Some(parent);
        let current_on_right = self.node(parent).right == Some(current);

        let (subtree, new_parent) = if parent_on_right == current_on_right {
            let subtree = if current_on_right {
                self.rotate_left(grand_parent)
            } else {
                self.rotate_right(grand_parent)
            };
            (subtree, Some(parent))
        } else {
            // `current` ends up on top, directly below the great grandparent.
            let subtree = if current_on_right {
                self.rotate_left_right(grand_parent)
            } else {
                self.rotate_right_left(grand_parent)
            };
            (subtree, great_grand_parent)
        };

        self.node_mut(grand_parent).color = Color::Red;
        self.node_mut(subtree).color = Color::Black;
        self.replace_child_or_root(great_grand_parent, grand_parent, Some(subtree));
        new_parent
    }
}

impl<K, V, C: Comparer<K>> RawRankTree<K, V, C> {
    /// Returns the node holding `key` and its position.
    pub(crate) fn find(&self, key: &K) -> Option<(Handle, isize)> {
        let mut current = self.root;
        let mut base = 0;
        while let Some(handle) = current {
            let node = self.node(handle);
            let position = base + node.offset;
            match self.comparer.compare(key, &node.key) {
                Ordering::Equal => return Some((handle, position)),
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
            base = position;
        }
        None
    }

    /// Returns the node holding `key` with its position and length.
    pub(crate) fn find_span(&self, key: &K) -> Option<Span> {
        let mut current = self.root;
        let mut base = 0;
        // Position of the nearest greater entry seen so far.
        let mut bound = self.extent;
        while let Some(handle) = current {
            let node = self.node(handle);
            let position = base + node.offset;
            base = position;
            match self.comparer.compare(key, &node.key) {
                Ordering::Less => {
                    bound = position;
                    current = node.left;
                }
                Ordering::Greater => current = node.right,
                Ordering::Equal => {
                    let mut next = node.right;
                    while let Some(successor) = next {
                        let successor = self.node(successor);
                        base += successor.offset;
                        bound = base;
                        next = successor.left;
                    }
                    return Some(Span {
                        handle,
                        position,
                        length: bound - position,
                    });
                }
            }
        }
        None
    }

    /// Returns the greatest entry below `key` (or equal to it, if `or_equal`).
    pub(crate) fn nearest_less(&self, key: &K, or_equal: bool) -> Option<(Handle, isize)> {
        let mut current = self.root;
        let mut base = 0;
        let mut best = None;
        while let Some(handle) = current {
            let node = self.node(handle);
            let position = base + node.offset;
            base = position;
            match self.comparer.compare(key, &node.key) {
                Ordering::Equal if or_equal => return Some((handle, position)),
                Ordering::Greater => {
                    best = Some((handle, position));
                    current = node.right;
                }
                Ordering::Less | Ordering::Equal => current = node.left,
            }
        }
        best
    }

    /// Returns the least entry above `key` (or equal to it, if `or_equal`).
    pub(crate) fn nearest_greater(&self, key: &K, or_equal: bool) -> Option<(Handle, isize)> {
        let mut current = self.root;
        let mut base = 0;
        let mut best = None;
        while let Some(handle) = current {
            let node = self.node(handle);
            let position = base + node.offset;
            base = position;
            match self.comparer.compare(key, &node.key) {
                Ordering::Equal if or_equal => return Some((handle, position)),
                Ordering::Less => {
                    best = Some((handle, position));
                    current = node.left;
                }
                Ordering::Greater | Ordering::Equal => current = node.right,
            }
        }
        best
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|(handle, _)| &self.node(handle).value)
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (handle, _) = self.find(key)?;
        Some(&mut self.node_mut(handle).value)
    }

    /// Inserts `key` covering `length` positions.
    ///
    /// Returns `Ok(false)` without touching the tree if the key is present.
    pub(crate) fn insert(&mut self, key: K, value: V, length: isize) -> Result<bool> {
        self.bump_version();
        if length <= 0 {
            return Err(Error::InvalidArgument("length must be positive"));
        }
        let Some(position) = self.insertion_position(&key) else {
            return Ok(false);
        };
        let Some(extent) = self.extent.checked_add(length) else {
            tracing::warn!(extent = self.extent, length, "insertion would overflow the extent");
            return Err(Error::ArithmeticOverflow);
        };
        let handle = self.store.alloc(Node::new(key, value))?;

        // Nothing below can fail.
        self.shift_right_of_path(position, length);
        self.link(handle, position);
        self.count += 1;
        self.extent = extent;
        debug_assert_eq!(self.store.live(), self.count, "live nodes diverged from the entry count");
        Ok(true)
    }

    /// Returns where `key` would start, or `None` if it is present.
    fn insertion_position(&self, key: &K) -> Option<isize> {
        let mut current = self.root;
        let mut base = 0;
        let mut bound = self.extent;
        while let Some(handle) = current {
            let node = self.node(handle);
            let position = base + node.offset;
            base = position;
            match self.comparer.compare(key, &node.key) {
                Ordering::Equal => return None,
                Ordering::Less => {
                    bound = position;
                    current = node.left;
                }
                Ordering::Greater => current = node.right,
            }
        }
        Some(bound)
    }

    /// Links a freshly allocated red node at `position`, splitting 4-nodes on the way down.
    fn link(&mut self, handle: Handle, position: isize) {
        let Some(root) = self.root else {
            let node = self.node_mut(handle);
            node.offset = position;
            node.color = Color::Black;
            self.root = Some(handle);
            return;
        };

        let mut current = Some(root);
        let mut base = 0;
        let mut parent = None;
        let mut grand_parent = None;
        let mut great_grand_parent = None;
        let mut order = Ordering::Equal;

        while let Some(cur) = current {
            // Rotations keep absolute positions, so this stays valid below.
            let cur_position = base + self.node(cur).offset;
            order = self.comparer.compare(&self.node(handle).key, &self.node(cur).key);

            if self.is_4node(cur) {
                self.split_4node(cur);
                if let (Some(p), Some(g)) = (parent, grand_parent)
                    && self.node(p).is_red()
                {
                    parent = self.insertion_balance(cur, p, g, great_grand_parent);
                }
            }

            great_grand_parent = grand_parent;
            grand_parent = parent;
            parent = Some(cur);
            base = cur_position;
            current = if order == Ordering::Less {
                self.node(cur).left
            } else {
                self.node(cur).right
            };
        }

        let parent = parent.expect("`RawRankTree::link()` - descent ended without a parent!");
        self.node_mut(handle).offset = position - base;
        if order == Ordering::Greater {
            self.node_mut(parent).right = Some(handle);
        } else {
            self.node_mut(parent).left = Some(handle);
        }
        if let Some(g) = grand_parent
            && self.node(parent).is_red()
        {
            self.insertion_balance(handle, parent, g, great_grand_parent);
        }
        self.color_root_black();
    }

    /// Removes `key` and returns its entry.
    pub(crate) fn remove(&mut self, key: &K) -> Option<(K, V)> {
        self.bump_version();
        let span = self.find_span(key)?;
        self.shift_right_of_path(span.position + span.length, -span.length);
        let entry = self.unlink(key);
        self.count -= 1;
        self.extent -= span.length;
        debug_assert_eq!(self.store.live(), self.count, "live nodes diverged from the entry count");
        Some(entry)
    }

    /// Top-down deletion of a key known to be present.
    ///
    /// Every 2-node on the search path is made red before the walk leaves it.
    /// Once the key is matched, the walk continues to its in-order successor;
    /// the successor's payload moves into the matched node and the successor's
    /// node is unlinked instead.
    fn unlink(&mut self, key: &K) -> (K, V) {
        let mut current = self.root;
        let mut parent: Option<Handle> = None;
        let mut grand_parent: Option<Handle> = None;
        let mut matched: Option<Handle> = None;
        let mut parent_of_match: Option<Handle> = None;

        while let Some(cur) = current {
            if self.is_2node(cur) {
                match parent {
                    None => self.node_mut(cur).color = Color::Red,
                    Some(p) => {
                        let mut sibling = self.sibling(p, cur);
                        if self.node(sibling).is_red() {
                            // `p` is a 3-node leaning the wrong way; flip it.
                            if self.node(p).right == Some(sibling) {
                                self.rotate_left(p);
                            } else {
                                self.rotate_right(p);
                            }
                            self.node_mut(p).color = Color::Red;
                            self.node_mut(sibling).color = Color::Black;
                            self.replace_child_or_root(grand_parent, p, Some(sibling));
                            grand_parent = Some(sibling);
                            if matched == Some(p) {
                                parent_of_match = Some(sibling);
                            }
                            sibling = self.sibling(p, cur);
                        }

                        if self.is_2node(sibling) {
                            self.merge_2nodes(p);
                        } else {
                            let rotation = self.rotation_for(p, cur, sibling);
                            let color = self.node(p).color;
                            let subtree = self.rotate(p, rotation);
                            self.node_mut(subtree).color = color;
                            self.node_mut(p).color = Color::Black;
                            self.node_mut(cur).color = Color::Red;
                            self.replace_child_or_root(grand_parent, p, Some(subtree));
                            if matched == Some(p) {
                                parent_of_match = Some(subtree);
                            }
                        }
                    }
                }
            }

            let order = if matched.is_some() {
                Ordering::Less
            } else {
                self.comparer.compare(key, &self.node(cur).key)
            };
            if order == Ordering::Equal {
                matched = Some(cur);
                parent_of_match = parent;
            }
            grand_parent = parent;
            parent = Some(cur);
            current = if order == Ordering::Less {
                self.node(cur).left
            } else {
                self.node(cur).right
            };
        }

        let matched = matched.expect("`RawRankTree::unlink()` - key vanished during descent!");
        let successor = parent.expect("`RawRankTree::unlink()` - descent ended without a node!");

        let entry = if successor == matched {
            // No right subtree: the left child (if any) takes the matched node's place.
            let replacement = self.node(matched).left;
            if let Some(replacement) = replacement {
                let (offset, color) = (self.node(matched).offset, self.node(matched).color);
                let node = self.node_mut(replacement);
                node.offset += offset;
                node.color = color;
            }
            self.replace_child_or_root(parent_of_match, matched, replacement);
            self.release(matched)
        } else {
            let successor_parent =
                grand_parent.expect("`RawRankTree::unlink()` - successor without a parent!");
            let successor_node = self.node(successor);
            let (orphan, offset) = (successor_node.right, successor_node.offset);
            if let Some(orphan) = orphan {
                let node = self.node_mut(orphan);
                node.color = Color::Black;
                node.offset += offset;
            }
            if successor_parent == matched {
                self.node_mut(matched).right = orphan;
            } else {
                self.node_mut(successor_parent).left = orphan;
            }
            let (target, source) = self.store.get2_mut(matched, successor);
            mem::swap(&mut target.key, &mut source.key);
            mem::swap(&mut target.value, &mut source.value);
            self.release(successor)
        };

        self.color_root_black();
        entry
    }

    /// Frees an unlinked node, fixing the link to any node the store moved.
    fn release(&mut self, handle: Handle) -> (K, V) {
        let (node, relocation) = self.store.free(handle);
        if let Some(relocation) = relocation {
            self.relink(relocation);
        }
        node.into_entry()
    }

    fn relink(&mut self, Relocation { from, to }: Relocation) {
        if self.root == Some(from) {
            self.root = Some(to);
            return;
        }
        let mut current = self.root;
        while let Some(cur) = current {
            let order = self.comparer.compare(&self.node(to).key, &self.node(cur).key);
            let node = self.node_mut(cur);
            let next = if order == Ordering::Less { &mut node.left } else { &mut node.right };
            if *next == Some(from) {
                *next = Some(to);
                return;
            }
            current = *next;
        }
        debug_assert!(false, "`RawRankTree::relink()` - moved node is unreachable!");
    }

    /// Changes the number of positions `key` covers by `delta`.
    ///
    /// A count reaching zero removes the entry; a positive `delta` on an absent
    /// key inserts it with `make_value()`. Returns the new count.
    pub(crate) fn adjust_count(
        &mut self,
        key: K,
        delta: isize,
        multiplicity: Multiplicity,
        make_value: impl FnOnce() -> V,
    ) -> Result<isize> {
        let Some(span) = self.find_span(&key) else {
            return match delta.cmp(&0) {
                Ordering::Less => Err(Error::InvalidArgument("cannot decrease the count of an absent key")),
                Ordering::Equal => Ok(0),
                Ordering::Greater => {
                    if multiplicity == Multiplicity::Single && delta > 1 {
                        return Err(Error::InvalidArgument("count must stay 0 or 1"));
                    }
                    self.insert(key, make_value(), delta)?;
                    Ok(delta)
                }
            };
        };

        let Some(count) = span.length.checked_add(delta) else {
            tracing::warn!(count = span.length, delta, "count adjustment overflows");
            return Err(Error::ArithmeticOverflow);
        };
        if count < 0 {
            return Err(Error::InvalidArgument("count cannot become negative"));
        }
        if multiplicity == Multiplicity::Single && count > 1 {
            return Err(Error::InvalidArgument("count must stay 0 or 1"));
        }
        if count == 0 {
            self.remove(&key);
            return Ok(0);
        }
        if delta != 0 {
            let Some(extent) = self.extent.checked_add(delta) else {
                tracing::warn!(extent = self.extent, delta, "count adjustment would overflow the extent");
                return Err(Error::ArithmeticOverflow);
            };
            self.bump_version();
            self.shift_right_of_path(span.position + span.length, delta);
            self.extent = extent;
        }
        Ok(count)
    }
}
