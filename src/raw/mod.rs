mod cursor;
mod handle;
mod node;
mod raw_rank_tree;
mod store;
mod validate;

pub(crate) use cursor::{FastCursor, RobustCursor, Spine};
pub(crate) use handle::Handle;
pub(crate) use raw_rank_tree::{Multiplicity, RawRankTree};
pub use store::AllocationMode;
