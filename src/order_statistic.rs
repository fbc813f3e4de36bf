/// A zero-based rank into the sorted order of a map.
///
/// In a [`MultiRankMap`](crate::MultiRankMap) a key with count `n` covers `n`
/// consecutive ranks, and indexing by any of them yields that key's value.
///
/// # Examples
///
/// ```
/// use rank_rbtree::{RankMap, Rank};
///
/// let mut map = RankMap::new();
/// map.add("a", 10).unwrap();
/// map.add("b", 20).unwrap();
///
/// assert_eq!(map[Rank(1)], 20);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Rank(pub isize);
