use core::cmp::Ordering;
use core::fmt;

/// A total order over keys, injected into a tree at construction.
///
/// The tree never calls `Ord` on its keys directly; every comparison goes
/// through the comparer it was built with, and clones of the tree carry a clone
/// of it.
///
/// It is a logic error for a comparer to be inconsistent (for example, to
/// report `a < b` and `b < a`). The behavior resulting from such a logic error
/// is not specified, but will be encapsulated to the tree that observed it and
/// not result in undefined behavior.
pub trait Comparer<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparer<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders keys with a closure.
///
/// # Examples
///
/// ```
/// use rank_rbtree::{CompareFn, RankMap};
///
/// // Descending order.
/// let mut map = RankMap::with_comparer(CompareFn(|a: &i32, b: &i32| b.cmp(a)));
/// map.add(1, "one").unwrap();
/// map.add(2, "two").unwrap();
///
/// assert_eq!(map.least(), Some((&2, &"two")));
/// ```
#[derive(Clone, Copy, Default)]
pub struct CompareFn<F>(pub F);

impl<K: ?Sized, F> Comparer<K> for CompareFn<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for CompareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompareFn(..)")
    }
}
