//! The orchestrator: owns the stage mirror, the conductor, and every layer,
//! and advances them all from one `update(dt, inputs)` entry point.
//!
//! Hosts mirror their DOM into a [`Stage`], feed input batches each frame,
//! and apply the returned events and stage property changes back to the real
//! page. All cross-layer sequencing lives here; the layers themselves never
//! call each other.

use tracing::{debug, warn};

use limen_motion_core::{Conductor, Ease, GlideScroll, MotionEvent, TimelineBuilder, TimelineId};
use limen_stage_core::{
    Display, NodeId, Prop, PropValue, SelectorList, SelectorSet, Stage, Viewport,
};

use crate::category::{compile_catalog, Category};
use crate::config::EngineConfig;
use crate::diagnostics::{Diagnostics, TickStats};
use crate::discovery::discover;
use crate::error::LimenError;
use crate::events::{EngineEvent, Outputs};
use crate::host::{FetchedDocument, HostBundle};
use crate::hover::{HoverLayer, HoverSelectors};
use crate::inputs::{Command, HostEvent, Inputs, Key};
use crate::interactions::{InteractionSelectors, InteractionsLayer};
use crate::overlay::{MenuOverlay, MenuSelectors, VideoOverlay, VideoSelectors};
use crate::playback::PlaybackRegistry;
use crate::prepare::{prepare, revert_element, PreparedSet, PrepareSelectors};
use crate::registrar::{build_reveal, trigger_node};
use crate::scripts::ScriptEngine;
use crate::transition::{normalize_path, TransitionPhase, TransitionSession};
use crate::visibility::WatchSet;

/// The navigation swap container. Markup outside it (navbar, overlays,
/// loading screen) survives transitions.
const VIEW_ROOT: &str = ".page-container";
const LOADING_SCREEN: &str = ".loading-screen-block";

/// Every selector the engine compiles, once, at construction.
struct Selectors {
    catalog: Vec<(Category, SelectorSet)>,
    prepare: PrepareSelectors,
    menu: MenuSelectors,
    video: VideoSelectors,
    hover: HoverSelectors,
    interactions: InteractionSelectors,
    view_root: SelectorList,
    loading_screen: SelectorList,
}

impl Selectors {
    fn compile() -> Result<Self, LimenError> {
        Ok(Self {
            catalog: compile_catalog()?,
            prepare: PrepareSelectors::compile()?,
            menu: MenuSelectors::compile()?,
            video: VideoSelectors::compile()?,
            hover: HoverSelectors::compile()?,
            interactions: InteractionSelectors::compile()?,
            view_root: SelectorList::parse(VIEW_ROOT)?,
            loading_screen: SelectorList::parse(LOADING_SCREEN)?,
        })
    }
}

pub struct Orchestrator {
    // Owned state
    stage: Stage,
    viewport: Viewport,
    conductor: Conductor,
    glide: GlideScroll,
    hosts: HostBundle,
    config: EngineConfig,
    selectors: Selectors,

    // Per-view registries, rebuilt on every activation
    prepared: PreparedSet,
    watches: WatchSet,
    registry: PlaybackRegistry,
    scripts: ScriptEngine,

    // Layers
    menu: MenuOverlay,
    video: VideoOverlay,
    hovers: HoverLayer,
    interactions: InteractionsLayer,

    // Transition machine
    phase: TransitionPhase,
    session: Option<TransitionSession>,
    path: String,

    // Per-tick state
    pointer: (f32, f32),
    resize_pending: Option<f32>,
    filter_pending: Option<f32>,
    tick: u64,
    events: Vec<EngineEvent>,
    outputs: Outputs,
    diagnostics: Diagnostics,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("path", &self.path)
            .field("phase", &self.phase)
            .field("tick", &self.tick)
            .field("timelines", &self.conductor.len())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Build the engine against an already-mirrored page and run the first
    /// view activation. Scroll restoration is manual: the view starts at the
    /// top regardless of what the viewport reported.
    pub fn new(
        stage: Stage,
        viewport: Viewport,
        path: &str,
        hosts: HostBundle,
        config: EngineConfig,
    ) -> Result<Self, LimenError> {
        let selectors = Selectors::compile()?;
        let mut viewport = viewport;
        viewport.scroll_y = 0.0;
        let page_height = stage
            .rect(stage.root())
            .map(|r| r.height)
            .unwrap_or(viewport.height);
        let glide = GlideScroll::new((page_height - viewport.height).max(0.0));
        let watches = WatchSet::new(config.reveal_fraction);
        let scripts = ScriptEngine::new(config.widget_retry_delay, config.widget_retry_attempts);

        let mut engine = Self {
            stage,
            viewport,
            conductor: Conductor::new(),
            glide,
            hosts,
            config,
            selectors,
            prepared: PreparedSet::new(),
            watches,
            registry: PlaybackRegistry::new(),
            scripts,
            menu: MenuOverlay::default(),
            video: VideoOverlay::default(),
            hovers: HoverLayer::default(),
            interactions: InteractionsLayer::default(),
            phase: TransitionPhase::Idle,
            session: None,
            path: normalize_path(path),
            pointer: (0.0, 0.0),
            resize_pending: None,
            filter_pending: None,
            tick: 0,
            events: Vec::new(),
            outputs: Outputs::default(),
            diagnostics: Diagnostics::default(),
        };
        engine.activate_view();
        let path = engine.path.clone();
        engine.events.push(EngineEvent::PageReady { path });
        Ok(engine)
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn scroll_y(&self) -> f32 {
        self.viewport.scroll_y
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu.is_open()
    }

    pub fn is_video_open(&self) -> bool {
        self.video.is_open()
    }

    pub fn reveal_count(&self) -> usize {
        self.registry.len()
    }

    pub fn stats(&self) -> &TickStats {
        self.diagnostics.last()
    }

    /// Advance everything by `dt` seconds.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        self.tick = self.tick.wrapping_add(1);

        // 1) Host inputs, in arrival order.
        for command in inputs.commands {
            self.apply_command(command);
        }
        for event in inputs.events {
            self.apply_event(event);
        }

        // 2) Scroll position for this tick.
        self.viewport.scroll_y = self.glide.update(dt);

        // 3) Deferred work: widget retries, debounced refreshes, player polls.
        self.scripts
            .tick(dt, self.hosts.widgets.as_mut(), &mut self.events);
        self.tick_debounce(dt);
        self.video.poll_player(&mut self.conductor);

        // 4) Timelines, then everything keyed off their completions.
        let settled = self.conductor.step(dt, &mut self.stage);
        for event in settled {
            self.apply_motion_event(event);
        }

        // 5) Scroll-coupled state: one-shot reveals, scrubs, theme bands,
        //    cursor-follow pins.
        self.sweep_watches();
        self.interactions.tick(
            &mut self.stage,
            &mut self.conductor,
            &self.viewport,
            &mut self.events,
        );
        self.hovers
            .scrolled(&mut self.stage, &self.viewport, self.pointer.0, self.pointer.1);

        self.outputs.events = std::mem::take(&mut self.events);
        self.diagnostics.record(TickStats {
            tick: self.tick,
            dt,
            scroll_y: self.viewport.scroll_y,
            active_timelines: self.conductor.active_count(),
            pending_watches: self.watches.pending(),
            phase: self.phase,
            events: self.outputs.events.len(),
        });
        &self.outputs
    }

    // ---- input dispatch --------------------------------------------------

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::Navigate { to } => self.begin_navigation(&to),
        }
    }

    fn apply_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Wheel { delta_y } => self.glide.wheel(delta_y),
            HostEvent::PointerMove { x, y } => {
                self.pointer = (x, y);
                self.hovers
                    .pointer_moved(&mut self.stage, &mut self.conductor, &self.viewport, x, y);
            }
            HostEvent::Click { node } => self.dispatch_click(node),
            HostEvent::KeyDown { key, focused } => self.handle_key(key, focused),
            HostEvent::Resize {
                width,
                height,
                page_height,
            } => {
                self.viewport.width = width;
                self.viewport.height = height;
                self.glide.set_max_scroll((page_height - height).max(0.0));
                self.resize_pending = Some(self.config.resize_debounce);
            }
            HostEvent::Relayout { rects, page_height } => {
                for (node, rect) in rects {
                    let _ = self.stage.set_rect(node, rect);
                }
                self.glide
                    .set_max_scroll((page_height - self.viewport.height).max(0.0));
            }
            HostEvent::FilterRendered => {
                self.filter_pending = Some(self.config.filter_refresh_delay);
            }
        }
    }

    /// Event-delegation click routing: the clicked node and then each
    /// ancestor is tried against every clickable pattern, innermost first.
    fn dispatch_click(&mut self, node: NodeId) {
        let mut chain = vec![node];
        chain.extend(self.stage.ancestors(node));
        for candidate in chain {
            if self.selectors.menu.button.matches(&self.stage, candidate) {
                self.toggle_menu();
                return;
            }
            if self.selectors.menu.links.matches(&self.stage, candidate)
                || self.selectors.menu.logo_link.matches(&self.stage, candidate)
            {
                // Navigation itself arrives as a separate command.
                if self.menu.is_open() {
                    self.close_menu();
                }
                return;
            }
            if self.video.close_button() == Some(candidate)
                || self.video.background() == Some(candidate)
            {
                self.close_video();
                return;
            }
            if self
                .selectors
                .video
                .click_block
                .matches(&self.stage, candidate)
            {
                self.open_video(candidate);
                return;
            }
            if self
                .selectors
                .interactions
                .dropdowns
                .matches(&self.stage, candidate)
                && self.interactions.dropdown_clicked(&mut self.conductor, candidate)
            {
                return;
            }
        }
    }

    fn handle_key(&mut self, key: Key, focused: Option<NodeId>) {
        match key {
            Key::Enter => {
                if let Some(node) = focused {
                    self.dispatch_click(node);
                }
            }
            Key::Space => {
                if let (Some(node), Some(close)) = (focused, self.video.close_button()) {
                    if node == close && self.video.is_open() {
                        self.close_video();
                    }
                }
            }
            Key::Escape => {
                if self.video.is_open() {
                    self.close_video();
                } else {
                    self.toggle_menu();
                }
            }
            // The glide refuses both while stopped, which is exactly the
            // overlay-open and mid-transition behavior.
            Key::ArrowDown => self.keyboard_scroll(1.0),
            Key::ArrowUp => self.keyboard_scroll(-1.0),
            Key::ArrowLeft => self.video.seek(-self.config.video_seek_step),
            Key::ArrowRight => self.video.seek(self.config.video_seek_step),
        }
    }

    fn keyboard_scroll(&mut self, direction: f32) {
        let to = self.glide.current() + direction * self.config.keyboard_scroll_px;
        self.glide.glide_to(
            to,
            self.config.keyboard_scroll_duration,
            Ease::OutPow(self.config.keyboard_scroll_power),
        );
    }

    // ---- overlays --------------------------------------------------------

    fn toggle_menu(&mut self) {
        if self.menu.is_open() {
            self.close_menu();
        } else {
            self.open_menu();
        }
    }

    fn open_menu(&mut self) {
        self.menu.open(
            &mut self.stage,
            &mut self.conductor,
            &mut self.glide,
            &self.selectors.menu,
            self.hosts.splitter.as_ref(),
            &mut self.events,
        );
    }

    fn close_menu(&mut self) {
        self.menu.close(
            &mut self.stage,
            &mut self.conductor,
            &mut self.glide,
            self.viewport.scroll_y,
            self.config.navbar_scroll_range,
            &mut self.events,
        );
    }

    fn open_video(&mut self, click_block: NodeId) {
        self.video.open(
            &mut self.stage,
            &mut self.conductor,
            &mut self.glide,
            self.hosts.widgets.as_mut(),
            &self.selectors.video,
            click_block,
            &mut self.events,
        );
    }

    fn close_video(&mut self) {
        self.video.close(
            &mut self.stage,
            &mut self.conductor,
            &mut self.glide,
            &mut self.events,
        );
    }

    // ---- motion completions ----------------------------------------------

    fn apply_motion_event(&mut self, event: MotionEvent) {
        match event {
            MotionEvent::Completed { id } => {
                if self.finish_fade_out(id) || self.finish_fade_in(id) {
                    return;
                }
                if self.menu.handle_completion(id, &mut self.stage) {
                    return;
                }
                if self.interactions.handle_dropdown_settled(
                    id,
                    true,
                    &mut self.stage,
                    &mut self.events,
                ) {
                    return;
                }
                if let Some((category, entry)) = self.registry.complete(id) {
                    revert_element(&mut self.stage, &mut self.prepared, entry.element, &entry.made);
                    self.events.push(EngineEvent::RevealCompleted {
                        category,
                        element: entry.element,
                    });
                }
            }
            MotionEvent::Reversed { id } => {
                if self.video.handle_reversed(id, &mut self.stage) {
                    return;
                }
                self.interactions
                    .handle_dropdown_settled(id, false, &mut self.stage, &mut self.events);
            }
            // `MotionEvent` is #[non_exhaustive]; no other variants exist today.
            _ => {}
        }
    }

    // ---- reveals ---------------------------------------------------------

    /// Discover, prepare, and register every reveal in the current tree.
    fn build_view(&mut self) {
        let scope = self.stage.root();
        let found = discover(&self.stage, &self.selectors.catalog, &self.prepared, scope);
        for (category, elements) in found {
            for element in elements {
                let made = match prepare(
                    &mut self.stage,
                    &self.selectors.prepare,
                    &mut self.prepared,
                    category,
                    element,
                    self.hosts.splitter.as_ref(),
                ) {
                    Ok(made) => made,
                    Err(err) => {
                        warn!(category = %category, error = %err, "prepare failed, element skipped");
                        continue;
                    }
                };
                let Some(timeline) =
                    build_reveal(&mut self.conductor, &self.prepared, category, element, &made)
                else {
                    continue;
                };
                let watch = self.watches.add(trigger_node(element, &made));
                self.registry
                    .register(category, element, made, timeline, watch);
            }
        }
        debug!(reveals = self.registry.len(), "view built");
    }

    fn sweep_watches(&mut self) {
        let fired = self.watches.sweep(&self.stage, &self.viewport);
        for watch in fired {
            if let Some((category, element, timeline)) = self.registry.fire(watch) {
                self.conductor.play(timeline);
                self.events
                    .push(EngineEvent::RevealStarted { category, element });
            }
        }
    }

    // ---- view lifecycle --------------------------------------------------

    /// Bind every layer against the current tree and run the start pass.
    /// Order mirrors a fresh page load: interactions, overlays, reveals,
    /// hovers, route scripts, then the first visibility sweep.
    fn activate_view(&mut self) {
        if let Some(screen) = self.selectors.loading_screen.first(&self.stage) {
            let _ = self
                .stage
                .set_prop(screen, Prop::Display, PropValue::Display(Display::None));
        }
        self.interactions.bind(
            &mut self.stage,
            &mut self.conductor,
            &self.selectors.interactions,
            self.config.navbar_scroll_range,
        );
        self.menu.resolve(&mut self.stage, &self.selectors.menu);
        self.video.resolve(&mut self.stage, &self.selectors.video);
        self.build_view();
        self.hovers.bind(
            &mut self.stage,
            &mut self.conductor,
            &self.selectors.hover,
            self.viewport.width,
            self.config.hover_min_width,
        );
        self.scripts
            .activate(&self.path, self.hosts.widgets.as_mut(), &mut self.events);
        self.sweep_watches();
    }

    /// Drop every per-view binding. Reveal timelines die with their view;
    /// prepared marks die with them so the next activation re-discovers.
    fn teardown_view(&mut self) {
        let ids: Vec<TimelineId> = self.registry.iter().map(|(_, entry)| entry.timeline).collect();
        for id in ids {
            self.conductor.kill(id);
        }
        self.registry.clear();
        self.watches.clear();
        self.prepared.clear();
        self.interactions.clear(&mut self.conductor);
        self.hovers.clear(&mut self.conductor);
        self.scripts.cancel_pending();
    }

    /// Re-run layout-coupled bindings after a debounced resize.
    fn refresh_layout(&mut self) {
        self.hovers.bind(
            &mut self.stage,
            &mut self.conductor,
            &self.selectors.hover,
            self.viewport.width,
            self.config.hover_min_width,
        );
        self.events.push(EngineEvent::RelayoutRequested);
    }

    fn tick_debounce(&mut self, dt: f32) {
        if let Some(left) = &mut self.resize_pending {
            *left -= dt;
            if *left <= 0.0 {
                self.resize_pending = None;
                self.refresh_layout();
            }
        }
        if let Some(left) = &mut self.filter_pending {
            *left -= dt;
            if *left <= 0.0 {
                self.filter_pending = None;
                self.events.push(EngineEvent::RelayoutRequested);
            }
        }
    }

    // ---- page transitions ------------------------------------------------

    fn set_phase(&mut self, phase: TransitionPhase) {
        if self.phase == phase {
            return;
        }
        debug!(from = %self.phase, to = %phase, "transition phase");
        self.phase = phase;
        self.events.push(EngineEvent::PhaseChanged { phase });
    }

    /// One transition at a time; a second navigation while one is in flight
    /// is reported and dropped, never queued.
    fn begin_navigation(&mut self, to: &str) {
        let to = normalize_path(to);
        if !self.phase.is_idle() || to == self.path {
            debug!(to = %to, phase = %self.phase, "navigation ignored");
            self.events.push(EngineEvent::NavigationIgnored { to });
            return;
        }
        let Some(container) = self.selectors.view_root.first(&self.stage) else {
            let err = LimenError::missing_view_root(VIEW_ROOT);
            warn!(to = %to, error = %err, "transition aborted");
            self.events.push(EngineEvent::TransitionFailed {
                to,
                reason: err.to_string(),
            });
            return;
        };

        self.menu
            .force_reset(&mut self.stage, &mut self.conductor, &mut self.glide);
        self.video
            .force_reset(&mut self.stage, &mut self.conductor, &mut self.glide);
        self.glide.stop();

        let tl = TimelineBuilder::new("transition:fade-out").to(
            container,
            Prop::Opacity,
            0.0,
            self.config.fade_duration,
            Ease::OutCubic,
            0.0,
        );
        let id = self.conductor.add(tl);
        self.conductor.play(id);
        let mut session = TransitionSession::new(to);
        session.fade = Some(id);
        self.session = Some(session);
        self.set_phase(TransitionPhase::FadingOut);
    }

    fn finish_fade_out(&mut self, id: TimelineId) -> bool {
        if self.phase != TransitionPhase::FadingOut {
            return false;
        }
        if self.session.as_ref().and_then(|s| s.fade) != Some(id) {
            return false;
        }
        self.conductor.kill(id);
        self.run_swap();
        true
    }

    fn finish_fade_in(&mut self, id: TimelineId) -> bool {
        if self.phase != TransitionPhase::FadingIn {
            return false;
        }
        if self.session.as_ref().and_then(|s| s.fade) != Some(id) {
            return false;
        }
        self.conductor.kill(id);
        self.session = None;
        self.set_phase(TransitionPhase::Idle);
        let path = self.path.clone();
        self.events.push(EngineEvent::PageReady { path });
        true
    }

    /// The fade-out has finished: fetch, splice, reinitialize, fade back in.
    /// Fetch and rebind are synchronous host calls; returning is the ready
    /// signal, so no settle delays are needed.
    fn run_swap(&mut self) {
        let Some(to) = self.session.as_ref().map(|s| s.to.clone()) else {
            return;
        };
        let doc = match self.hosts.fetcher.fetch(&to) {
            Ok(doc) => doc,
            Err(err) => {
                self.abort_transition(&err.to_string());
                return;
            }
        };

        self.set_phase(TransitionPhase::ContentSwapped);
        let container = match self.splice_document(&doc, &to) {
            Ok(container) => container,
            Err(err) => {
                self.abort_transition(&err.to_string());
                return;
            }
        };
        self.viewport.scroll_y = 0.0;

        self.set_phase(TransitionPhase::Reinitializing);
        self.path = to;
        self.teardown_view();
        self.hosts.widgets.rebind(&doc.page_id);
        let page_height = self
            .stage
            .rect(self.stage.root())
            .map(|r| r.height)
            .unwrap_or(self.viewport.height);
        // Destroy-before-create: the old scroller dies with the old view.
        self.glide = GlideScroll::new((page_height - self.viewport.height).max(0.0));
        self.activate_view();

        self.set_phase(TransitionPhase::FadingIn);
        let tl = TimelineBuilder::new("transition:fade-in").from_to(
            container,
            Prop::Opacity,
            0.0,
            1.0,
            self.config.fade_duration,
            Ease::OutCubic,
            0.0,
        );
        let id = self.conductor.add(tl);
        self.conductor.play(id);
        if let Some(session) = &mut self.session {
            session.fade = Some(id);
        }
    }

    /// Replace the view root's children with the fetched document's and carry
    /// over its page identity and height.
    fn splice_document(
        &mut self,
        doc: &FetchedDocument,
        url: &str,
    ) -> Result<NodeId, LimenError> {
        let container = self
            .selectors
            .view_root
            .first(&self.stage)
            .ok_or_else(|| LimenError::missing_view_root(VIEW_ROOT))?;
        let incoming = self
            .selectors
            .view_root
            .first(&doc.stage)
            .ok_or_else(|| LimenError::NotADocument {
                url: url.to_string(),
            })?;
        let children: Vec<NodeId> = doc
            .stage
            .children(incoming)
            .map(|c| c.to_vec())
            .unwrap_or_default();
        self.stage.clear_children(container)?;
        for child in children {
            self.stage.adopt_subtree(&doc.stage, child, container)?;
        }
        let root = self.stage.root();
        self.stage.set_attr(root, "data-page-id", &doc.page_id)?;
        if let Some(rect) = doc.stage.rect(doc.stage.root()) {
            self.stage.set_rect(root, rect)?;
        }
        // Incoming content stays invisible until the fade-in runs.
        self.stage
            .set_prop(container, Prop::Opacity, PropValue::Number(0.0))?;
        Ok(container)
    }

    /// Snap the previous view back: full opacity, scrolling live, idle
    /// phase. The host decides whether to retry or fall back to a full
    /// navigation.
    fn abort_transition(&mut self, reason: &str) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Some(fade) = session.fade {
            self.conductor.kill(fade);
        }
        if let Some(container) = self.selectors.view_root.first(&self.stage) {
            let _ = self
                .stage
                .set_prop(container, Prop::Opacity, PropValue::Number(1.0));
        }
        self.glide.start();
        warn!(to = %session.to, reason = %reason, "transition failed, previous view restored");
        self.set_phase(TransitionPhase::Idle);
        self.events.push(EngineEvent::TransitionFailed {
            to: session.to,
            reason: reason.to_string(),
        });
    }
}
