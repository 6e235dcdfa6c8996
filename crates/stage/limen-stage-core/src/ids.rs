//! Identifiers and a simple allocator for stage nodes.

use serde::{Deserialize, Serialize};

/// Opaque handle to a node in a [`Stage`](crate::Stage) arena.
///
/// Ids are never reused within one stage, so a stale handle from a removed
/// subtree simply stops resolving instead of aliasing a new element.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Monotonic allocator for [`NodeId`]. Never rewinds: ids from a torn-down
/// view stay dead rather than pointing at whatever was created next.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_node: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node = self.next_node.wrapping_add(1);
        id
    }
}
