//! Route-scoped widget loading.
//!
//! Certain routes depend on externally loaded widgets. Scripts are injected
//! at most once per process, keyed by script id; widgets that need an init
//! call get a bounded retry schedule instead of a fixed sleep, since the
//! host cannot say when a third-party runtime finishes loading.

use hashbrown::HashSet;
use tracing::{debug, warn};

use crate::events::EngineEvent;
use crate::host::{Widget, WidgetHost};

/// Widgets a route depends on. Paths arrive normalized.
pub fn widgets_for_route(path: &str) -> &'static [Widget] {
    match path {
        "/portfolio" | "/blog" => &[Widget::CmsFilter],
        "/contact" => &[Widget::Scheduler],
        _ => &[],
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingInit {
    widget: Widget,
    attempts_left: u32,
    due_at: f64,
}

/// Per-process widget load registry plus the retry queue for inits.
#[derive(Debug)]
pub struct ScriptEngine {
    injected: HashSet<&'static str>,
    pending: Vec<PendingInit>,
    clock: f64,
    retry_delay: f32,
    retry_attempts: u32,
}

impl ScriptEngine {
    pub fn new(retry_delay: f32, retry_attempts: u32) -> Self {
        Self {
            injected: HashSet::new(),
            pending: Vec::new(),
            clock: 0.0,
            retry_delay,
            retry_attempts,
        }
    }

    /// Bring a view's widgets up: inject scripts not yet loaded and queue
    /// init retries for widgets that want one on every visit.
    pub fn activate(
        &mut self,
        path: &str,
        host: &mut dyn WidgetHost,
        events: &mut Vec<EngineEvent>,
    ) {
        for widget in widgets_for_route(path) {
            if self.injected.insert(widget.script_id()) {
                debug!(widget = %widget, "injecting widget script");
                host.inject_script(*widget);
                events.push(EngineEvent::WidgetInjected { widget: *widget });
            }
            if widget.needs_init() {
                self.pending.retain(|p| p.widget != *widget);
                self.pending.push(PendingInit {
                    widget: *widget,
                    attempts_left: self.retry_attempts,
                    due_at: self.clock + f64::from(self.retry_delay),
                });
            }
        }
    }

    /// Advance the retry clock and run due init attempts.
    pub fn tick(&mut self, dt: f32, host: &mut dyn WidgetHost, events: &mut Vec<EngineEvent>) {
        self.clock += f64::from(dt);
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_at > self.clock {
                i += 1;
                continue;
            }
            let widget = self.pending[i].widget;
            if host.widget_ready(widget) {
                host.init_widget(widget);
                events.push(EngineEvent::WidgetInitialized { widget });
                self.pending.remove(i);
            } else if self.pending[i].attempts_left <= 1 {
                warn!(widget = %widget, "widget runtime never became ready; giving up");
                events.push(EngineEvent::WidgetInitFailed { widget });
                self.pending.remove(i);
            } else {
                self.pending[i].attempts_left -= 1;
                self.pending[i].due_at = self.clock + f64::from(self.retry_delay);
                i += 1;
            }
        }
    }

    /// Drop queued init retries. Called when navigation leaves the view the
    /// retries were meant for.
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
    }

    pub fn pending_inits(&self) -> usize {
        self.pending.len()
    }

    pub fn is_injected(&self, widget: Widget) -> bool {
        self.injected.contains(widget.script_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{PlayerKind, VideoPlayer};
    use std::cell::Cell;

    #[derive(Default)]
    struct FakeHost {
        injections: Vec<Widget>,
        inits: Vec<Widget>,
        ready_after_polls: u32,
        polls: Cell<u32>,
    }

    impl WidgetHost for FakeHost {
        fn inject_script(&mut self, widget: Widget) {
            self.injections.push(widget);
        }

        fn widget_ready(&self, _widget: Widget) -> bool {
            self.polls.set(self.polls.get() + 1);
            self.polls.get() > self.ready_after_polls
        }

        fn init_widget(&mut self, widget: Widget) {
            self.inits.push(widget);
        }

        fn rebind(&mut self, _page_id: &str) {}

        fn create_player(&mut self, _kind: PlayerKind, _url: &str) -> Option<Box<dyn VideoPlayer>> {
            None
        }
    }

    #[test]
    fn routes_map_to_their_widgets() {
        assert_eq!(widgets_for_route("/portfolio"), &[Widget::CmsFilter]);
        assert_eq!(widgets_for_route("/blog"), &[Widget::CmsFilter]);
        assert_eq!(widgets_for_route("/contact"), &[Widget::Scheduler]);
        assert!(widgets_for_route("/").is_empty());
        assert!(widgets_for_route("/about").is_empty());
    }

    #[test]
    fn scripts_inject_once_per_process() {
        let mut engine = ScriptEngine::new(0.5, 10);
        let mut host = FakeHost::default();
        let mut events = Vec::new();

        engine.activate("/portfolio", &mut host, &mut events);
        engine.activate("/portfolio", &mut host, &mut events);
        assert_eq!(host.injections, vec![Widget::CmsFilter]);
        assert!(engine.is_injected(Widget::CmsFilter));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, EngineEvent::WidgetInjected { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn scheduler_init_retries_until_ready() {
        let mut engine = ScriptEngine::new(0.5, 10);
        let mut host = FakeHost {
            ready_after_polls: 3,
            ..FakeHost::default()
        };
        let mut events = Vec::new();

        engine.activate("/contact", &mut host, &mut events);
        assert_eq!(engine.pending_inits(), 1);

        // Three unready polls, then the fourth succeeds.
        for _ in 0..4 {
            engine.tick(0.5, &mut host, &mut events);
        }
        assert_eq!(host.inits, vec![Widget::Scheduler]);
        assert_eq!(engine.pending_inits(), 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::WidgetInitialized { widget: Widget::Scheduler })));
    }

    #[test]
    fn retries_are_bounded() {
        let mut engine = ScriptEngine::new(0.5, 10);
        let mut host = FakeHost {
            ready_after_polls: u32::MAX,
            ..FakeHost::default()
        };
        let mut events = Vec::new();

        engine.activate("/contact", &mut host, &mut events);
        for _ in 0..40 {
            engine.tick(0.5, &mut host, &mut events);
        }
        assert_eq!(host.polls.get(), 10);
        assert!(host.inits.is_empty());
        assert_eq!(engine.pending_inits(), 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::WidgetInitFailed { widget: Widget::Scheduler })));
    }

    #[test]
    fn navigation_cancels_queued_inits() {
        let mut engine = ScriptEngine::new(0.5, 10);
        let mut host = FakeHost {
            ready_after_polls: u32::MAX,
            ..FakeHost::default()
        };
        let mut events = Vec::new();

        engine.activate("/contact", &mut host, &mut events);
        engine.cancel_pending();
        engine.tick(5.0, &mut host, &mut events);
        assert_eq!(host.polls.get(), 0);
        assert!(!events
            .iter()
            .any(|e| matches!(e, EngineEvent::WidgetInitFailed { .. })));
    }
}
