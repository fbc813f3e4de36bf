use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Index of a node slot in a [`NodeStore`](super::store::NodeStore).
///
/// Stored off by one inside a `NonZero` so that `Option<Handle>`, the type of
/// every child link, is the same size as the handle itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// The largest slot index a handle can address.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    /// Returns the handle for slot `index`, or `None` past [`Handle::MAX`].
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn new(index: usize) -> Option<Self> {
        if index > Self::MAX {
            return None;
        }
        NonZero::new((index + 1) as RawHandle).map(Self)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
