//! Play-once-per-view reveal scheduling.
//!
//! Ties each prepared element's paused timeline to its visibility watch.
//! An entry moves Armed -> Playing when the watch fires and Playing -> Done
//! when the conductor reports the timeline complete. Done entries stay in
//! the registry so an element never replays within one view; navigation
//! clears everything.

use indexmap::IndexMap;

use limen_motion_core::TimelineId;
use limen_stage_core::NodeId;

use crate::category::Category;
use crate::prepare::PreparedElement;
use crate::visibility::WatchId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPhase {
    Armed,
    Playing,
    Done,
}

#[derive(Clone, Debug)]
pub struct RevealEntry {
    pub element: NodeId,
    pub made: PreparedElement,
    pub timeline: TimelineId,
    pub watch: WatchId,
    pub phase: RevealPhase,
}

/// Registry of every reveal in the current view, grouped by category in
/// registration order.
#[derive(Debug, Default)]
pub struct PlaybackRegistry {
    entries: IndexMap<Category, Vec<RevealEntry>>,
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        category: Category,
        element: NodeId,
        made: PreparedElement,
        timeline: TimelineId,
        watch: WatchId,
    ) {
        self.entries.entry(category).or_default().push(RevealEntry {
            element,
            made,
            timeline,
            watch,
            phase: RevealPhase::Armed,
        });
    }

    /// An armed entry whose watch fired starts playing. Returns what to play.
    pub fn fire(&mut self, watch: WatchId) -> Option<(Category, NodeId, TimelineId)> {
        for (category, entries) in &mut self.entries {
            for entry in entries {
                if entry.watch == watch && entry.phase == RevealPhase::Armed {
                    entry.phase = RevealPhase::Playing;
                    return Some((*category, entry.element, entry.timeline));
                }
            }
        }
        None
    }

    /// A playing entry whose timeline completed is retired. Returns a copy
    /// of the entry so the caller can tear its scaffolding down.
    pub fn complete(&mut self, timeline: TimelineId) -> Option<(Category, RevealEntry)> {
        for (category, entries) in &mut self.entries {
            for entry in entries {
                if entry.timeline == timeline && entry.phase == RevealPhase::Playing {
                    entry.phase = RevealPhase::Done;
                    return Some((*category, entry.clone()));
                }
            }
        }
        None
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    pub fn in_phase(&self, phase: RevealPhase) -> usize {
        self.entries
            .values()
            .flatten()
            .filter(|e| e.phase == phase)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &RevealEntry)> {
        self.entries
            .iter()
            .flat_map(|(c, entries)| entries.iter().map(move |e| (*c, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_ids(n: u32) -> (NodeId, TimelineId, WatchId) {
        (NodeId(n), TimelineId(n), WatchId(n))
    }

    #[test]
    fn fire_promotes_armed_entries_once() {
        let mut registry = PlaybackRegistry::new();
        let (element, timeline, watch) = entry_ids(1);
        registry.register(
            Category::Heading,
            element,
            PreparedElement::Text,
            timeline,
            watch,
        );

        let fired = registry.fire(watch);
        assert_eq!(fired, Some((Category::Heading, element, timeline)));
        assert!(registry.fire(watch).is_none());
        assert_eq!(registry.in_phase(RevealPhase::Playing), 1);
    }

    #[test]
    fn complete_retires_playing_entries() {
        let mut registry = PlaybackRegistry::new();
        let (element, timeline, watch) = entry_ids(2);
        registry.register(
            Category::Separator,
            element,
            PreparedElement::Separator,
            timeline,
            watch,
        );

        // Completion of a never-fired entry is not a retirement.
        assert!(registry.complete(timeline).is_none());

        registry.fire(watch);
        let (category, entry) = registry.complete(timeline).unwrap();
        assert_eq!(category, Category::Separator);
        assert_eq!(entry.element, element);
        assert_eq!(registry.in_phase(RevealPhase::Done), 1);
        assert!(registry.complete(timeline).is_none());
    }

    #[test]
    fn clear_empties_every_category() {
        let mut registry = PlaybackRegistry::new();
        for n in 0..4 {
            let (element, timeline, watch) = entry_ids(n);
            registry.register(
                Category::Paragraph,
                element,
                PreparedElement::Text,
                timeline,
                watch,
            );
        }
        assert_eq!(registry.len(), 4);
        registry.clear();
        assert!(registry.is_empty());
    }
}
