use super::handle::Handle;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// A red-black tree node.
///
/// The node does not know its absolute position. `offset` is its position
/// minus its parent's position (for the root: minus zero), so a rotation only
/// re-bases the few offsets whose parent changed.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) color: Color,
    pub(crate) offset: isize,
}

impl<K, V> Node<K, V> {
    /// Creates a detached red node; the caller links it and sets its offset.
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            color: Color::Red,
            offset: 0,
        }
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    #[inline]
    pub(crate) fn is_black(&self) -> bool {
        self.color == Color::Black
    }

    /// Returns the child on the given side.
    #[inline]
    pub(crate) fn child(&self, right: bool) -> Option<Handle> {
        if right { self.right } else { self.left }
    }

    /// Repoints whichever child link currently refers to `old`.
    ///
    /// Returns false if neither child is `old`.
    pub(crate) fn replace_child(&mut self, old: Handle, new: Option<Handle>) -> bool {
        if self.left == Some(old) {
            self.left = new;
            true
        } else if self.right == Some(old) {
            self.right = new;
            true
        } else {
            false
        }
    }

    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}
