//! Page identifiers and their allocator.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(pub u64);

/// Monotonic allocator for PageId.
/// Never rewinds, so ids handed out before a re-initialization stay distinct.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_page: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_page(&mut self) -> PageId {
        let id = PageId(self.next_page);
        self.next_page += 1;
        id
    }
}
