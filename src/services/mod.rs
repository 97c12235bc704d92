//! Business logic: source library loading, merge, reorder, and the sync cycle
//! tying them together.

pub mod merge;
pub mod reorder;
pub mod source;
pub mod sync;

/// Destination catalog listing endpoints page at 50 items.
pub(crate) const DESTINATION_PAGE_SIZE: usize = 50;
