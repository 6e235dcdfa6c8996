//! Identifiers for live timelines.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimelineId(pub u32);

/// Monotonic allocator for [`TimelineId`]. Killed timelines never give their
/// id back, so completion events for a killed timeline cannot be mistaken for
/// a rebuilt one.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next_timeline: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_timeline(&mut self) -> TimelineId {
        let id = TimelineId(self.next_timeline);
        self.next_timeline = self.next_timeline.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn killed_ids_are_not_recycled() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_timeline(), TimelineId(0));
        assert_eq!(alloc.alloc_timeline(), TimelineId(1));
    }
}
