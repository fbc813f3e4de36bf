use crate::comparer::Comparer;
use crate::raw::{Handle, RawRankTree};

/// The outcome of a nearest-neighbour query.
///
/// When no entry qualifies, [`rank`](Nearest::rank) still carries a useful
/// value: `0` for the `less` queries and the map's extent for the `greater`
/// queries, which is where the probe key would sort.
///
/// # Examples
///
/// ```
/// use rank_rbtree::RankMap;
///
/// let map: RankMap<_, _> = [(10, "ten"), (20, "twenty")].into_iter().collect();
///
/// let hit = map.nearest_greater(&10);
/// assert_eq!(hit.key_value(), Some((&20, &"twenty")));
/// assert_eq!(hit.rank(), 1);
///
/// let miss = map.nearest_greater(&20);
/// assert!(!miss.is_found());
/// assert_eq!(miss.rank(), 2);
/// ```
#[derive(Debug, Eq, PartialEq)]
pub struct Nearest<'a, K, V> {
    entry: Option<(&'a K, &'a V)>,
    rank: isize,
}

impl<K, V> Clone for Nearest<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Nearest<'_, K, V> {}

impl<'a, K, V> Nearest<'a, K, V> {
    pub(crate) fn less<C: Comparer<K>>(tree: &'a RawRankTree<K, V, C>, key: &K, or_equal: bool) -> Self {
        Self::from_search(tree, tree.nearest_less(key, or_equal), 0)
    }

    pub(crate) fn greater<C: Comparer<K>>(tree: &'a RawRankTree<K, V, C>, key: &K, or_equal: bool) -> Self {
        Self::from_search(tree, tree.nearest_greater(key, or_equal), tree.extent())
    }

    fn from_search<C>(
        tree: &'a RawRankTree<K, V, C>,
        found: Option<(Handle, isize)>,
        missing_rank: isize,
    ) -> Self {
        match found {
            Some((handle, rank)) => {
                let node = tree.node(handle);
                Self {
                    entry: Some((&node.key, &node.value)),
                    rank,
                }
            }
            None => Self {
                entry: None,
                rank: missing_rank,
            },
        }
    }

    /// Returns true if an entry qualified.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.entry.is_some()
    }

    /// Returns the key of the entry found.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.entry.map(|(key, _)| key)
    }

    /// Returns the value of the entry found.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.entry.map(|(_, value)| value)
    }

    /// Returns the key-value pair of the entry found.
    #[must_use]
    pub const fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.entry
    }

    /// Returns the rank of the entry found, or the fallback rank if none was.
    #[must_use]
    pub const fn rank(&self) -> isize {
        self.rank
    }
}
