//! Menu and video overlays.
//!
//! Both overlays sit outside the swap container and survive navigation.
//! The menu owns a rebuilt timeline per direction (opening kills an
//! in-flight close and vice versa); the video overlay owns one timeline per
//! open that closing plays in reverse. While either is up, scrolling stops
//! and focus is trapped inside it.

use tracing::debug;

use limen_motion_core::{Conductor, Ease, GlideScroll, TimelineBuilder, TimelineId};
use limen_stage_core::{
    Display, NodeId, PointerEvents, Prop, PropValue, SelectorList, Stage, StageError,
};

use crate::events::EngineEvent;
use crate::host::{PlayerKind, VideoPlayer, WidgetHost};
use crate::prepare::{split_text, SplitText};
use crate::split::LineSplitter;

const FOCUSABLE: &str = "a, button, input, textarea, select, [tabindex=0]";

/// Saved tabindex state for one focus scope swap. Releasing restores every
/// saved value; elements that had no explicit tabindex go back to `0`, the
/// way the host primed them.
#[derive(Debug, Default)]
pub struct FocusTrap {
    saved: Vec<(NodeId, Option<String>)>,
    inside: Vec<NodeId>,
}

impl FocusTrap {
    pub fn engage(&mut self, stage: &mut Stage, outside: &[NodeId], inside: &[NodeId]) {
        self.saved.clear();
        for id in outside {
            let prev = stage.attr(*id, "tabindex").map(str::to_owned);
            self.saved.push((*id, prev));
            let _ = stage.set_attr(*id, "tabindex", "-1");
            let _ = stage.set_attr(*id, "aria-hidden", "true");
        }
        for id in inside {
            let _ = stage.set_attr(*id, "tabindex", "0");
            let _ = stage.remove_attr(*id, "aria-hidden");
        }
        self.inside = inside.to_vec();
    }

    pub fn release(&mut self, stage: &mut Stage) {
        for (id, prev) in self.saved.drain(..) {
            match prev {
                Some(value) => {
                    let _ = stage.set_attr(id, "tabindex", &value);
                }
                None => {
                    let _ = stage.set_attr(id, "tabindex", "0");
                }
            }
            let _ = stage.remove_attr(id, "aria-hidden");
        }
        for id in self.inside.drain(..) {
            let _ = stage.set_attr(id, "tabindex", "-1");
            let _ = stage.set_attr(id, "aria-hidden", "true");
        }
    }

    pub fn is_engaged(&self) -> bool {
        !self.saved.is_empty()
    }
}

fn under_any_class(stage: &Stage, id: NodeId, classes: &[&str]) -> bool {
    stage
        .ancestors(id)
        .into_iter()
        .any(|a| classes.iter().any(|c| stage.has_class(a, c)))
}

/// Focusable elements that belong to the page proper: under the swap
/// container or the footer, and not inside either overlay.
fn page_focusables(stage: &Stage, focusable: &SelectorList) -> Vec<NodeId> {
    focusable
        .select(stage)
        .into_iter()
        .filter(|id| {
            let scoped = under_any_class(stage, *id, &["main"])
                || stage
                    .ancestors(*id)
                    .into_iter()
                    .any(|a| stage.node(a).map(|n| n.tag == "footer").unwrap_or(false));
            scoped && !under_any_class(stage, *id, &["menu-overlay-block", "video-overlay-block"])
        })
        .collect()
}

/// Focusable elements anywhere outside the two overlay blocks.
fn outside_focusables(stage: &Stage, focusable: &SelectorList) -> Vec<NodeId> {
    focusable
        .select(stage)
        .into_iter()
        .filter(|id| !under_any_class(stage, *id, &["menu-overlay-block", "video-overlay-block"]))
        .collect()
}

#[derive(Clone, Debug)]
pub struct MenuSelectors {
    block: SelectorList,
    container: SelectorList,
    bg: SelectorList,
    button_lines: [SelectorList; 4],
    socials: SelectorList,
    showreel: SelectorList,
    play: SelectorList,
    texts: SelectorList,
    pub button: SelectorList,
    pub links: SelectorList,
    pub logo_link: SelectorList,
    logo_letters: [SelectorList; 3],
    inside_focusable: SelectorList,
    focusable: SelectorList,
}

impl MenuSelectors {
    pub fn compile() -> Result<Self, StageError> {
        Ok(Self {
            block: SelectorList::parse(".menu-overlay-block")?,
            container: SelectorList::parse(".menu-overlay-container")?,
            bg: SelectorList::parse(".menu-overlay-bg")?,
            button_lines: [
                SelectorList::parse(".menu-button-line._01 .menu-button-line-bg")?,
                SelectorList::parse(".menu-button-line._02 .menu-button-line-bg")?,
                SelectorList::parse(".menu-button-line._03 .menu-button-line-bg")?,
                SelectorList::parse(".menu-button-line._04 .menu-button-line-bg")?,
            ],
            socials: SelectorList::parse(".vector.social")?,
            showreel: SelectorList::parse(".showreel-lightbox-block")?,
            play: SelectorList::parse(".play-button")?,
            texts: SelectorList::parse(".text, .menu-overlay-links .button-block .text")?,
            button: SelectorList::parse(".nav-menu-button")?,
            links: SelectorList::parse(".menu-overlay-links .button-block")?,
            logo_link: SelectorList::parse(".brand.top")?,
            logo_letters: [
                SelectorList::parse(".logo_text._01")?,
                SelectorList::parse(".logo_text._02")?,
                SelectorList::parse(".logo_text._03")?,
            ],
            inside_focusable: SelectorList::parse("a, .social-link-block, .play-button")?,
            focusable: SelectorList::parse(FOCUSABLE)?,
        })
    }
}

#[derive(Debug)]
struct MenuNodes {
    block: NodeId,
    container: NodeId,
    bg: NodeId,
    button_lines: [Option<NodeId>; 4],
    socials: Vec<NodeId>,
    showreel: Option<NodeId>,
    play: Option<NodeId>,
    texts: Vec<NodeId>,
    logo_letters: Option<[NodeId; 3]>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MenuRole {
    Open,
    Close,
}

/// Full-viewport menu overlay.
#[derive(Debug, Default)]
pub struct MenuOverlay {
    nodes: Option<MenuNodes>,
    open: bool,
    timeline: Option<(TimelineId, MenuRole)>,
    splits: Vec<SplitText>,
    lines: Vec<NodeId>,
    placeholders: Vec<NodeId>,
    placeholders_removed: bool,
    trap: FocusTrap,
}

impl MenuOverlay {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Locate the overlay in the current tree and apply its resting state.
    /// A page without a menu leaves the whole surface inert.
    pub fn resolve(&mut self, stage: &mut Stage, sel: &MenuSelectors) {
        let Some(block) = sel.block.first(stage) else {
            self.nodes = None;
            return;
        };
        let Some(container) = sel.container.first_from(stage, block) else {
            self.nodes = None;
            return;
        };
        let Some(bg) = sel.bg.first_from(stage, block) else {
            self.nodes = None;
            return;
        };

        let button_lines =
            std::array::from_fn(|i| sel.button_lines[i].first(stage));
        let socials = sel.socials.select_from(stage, block);
        let showreel = sel.showreel.first_from(stage, block);
        let play = showreel.and_then(|s| sel.play.first_from(stage, s));
        let texts = sel.texts.select_from(stage, block);
        let letters: Vec<_> = sel
            .logo_letters
            .iter()
            .filter_map(|s| s.first(stage))
            .collect();
        let logo_letters = <[NodeId; 3]>::try_from(letters).ok();

        let _ = stage.set_prop(block, Prop::Display, PropValue::Display(Display::None));
        let _ = stage.set_prop(
            container,
            Prop::PointerEvents,
            PropValue::Pointer(PointerEvents::None),
        );
        let _ = stage.set_prop(bg, Prop::Opacity, PropValue::Number(0.0));
        for icon in &socials {
            let _ = stage.set_prop(*icon, Prop::Opacity, PropValue::Number(0.0));
            let _ = stage.set_prop(*icon, Prop::Scale, PropValue::Number(0.5));
        }
        if let Some(showreel) = showreel {
            let _ = stage.set_prop(showreel, Prop::Opacity, PropValue::Number(0.0));
            let _ = stage.set_prop(showreel, Prop::TranslateYPct, PropValue::Number(10.0));
        }
        if let Some(play) = play {
            let _ = stage.set_prop(play, Prop::Scale, PropValue::Number(0.5));
        }

        self.nodes = Some(MenuNodes {
            block,
            container,
            bg,
            button_lines,
            socials,
            showreel,
            play,
            texts,
            logo_letters,
        });
    }

    /// Split the menu texts. Runs once for the process; the splits are never
    /// reverted, only replayed.
    pub fn ensure_split(&mut self, stage: &mut Stage, splitter: &dyn LineSplitter) {
        if !self.splits.is_empty() {
            return;
        }
        let Some(nodes) = &self.nodes else {
            return;
        };
        for text in nodes.texts.clone() {
            if let Ok(split) = split_text(stage, text, splitter) {
                self.lines.extend(split.lines.iter().copied());
                self.placeholders.extend(split.placeholders.iter().copied());
                self.splits.push(split);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        glide: &mut GlideScroll,
        sel: &MenuSelectors,
        splitter: &dyn LineSplitter,
        events: &mut Vec<EngineEvent>,
    ) {
        self.ensure_split(stage, splitter);
        let Some(nodes) = &self.nodes else {
            return;
        };
        if let Some((id, _)) = self.timeline.take() {
            conductor.kill(id);
        }

        let _ = stage.set_prop(nodes.block, Prop::Display, PropValue::Display(Display::Flex));
        for line in &self.lines {
            let _ = stage.set_prop(*line, Prop::TranslateYPct, PropValue::Number(150.0));
        }
        for icon in &nodes.socials {
            let _ = stage.set_prop(*icon, Prop::Opacity, PropValue::Number(0.0));
            let _ = stage.set_prop(*icon, Prop::Scale, PropValue::Number(0.5));
        }
        if let Some(showreel) = nodes.showreel {
            let _ = stage.set_prop(showreel, Prop::Opacity, PropValue::Number(0.0));
            let _ = stage.set_prop(showreel, Prop::TranslateYPct, PropValue::Number(10.0));
        }
        if let Some(play) = nodes.play {
            let _ = stage.set_prop(play, Prop::Scale, PropValue::Number(0.5));
        }

        let mut tl = TimelineBuilder::new("menu:open").to(
            nodes.bg,
            Prop::Opacity,
            1.0,
            0.5,
            Ease::InOutQuad,
            0.0,
        );
        let widths = [(0.0, 0.0), (0.0, 0.1), (100.0, 0.4), (100.0, 0.5)];
        for (line, (to, at)) in nodes.button_lines.iter().zip(widths) {
            if let Some(line) = line {
                tl = tl.to(*line, Prop::WidthPct, to, 0.3, Ease::InOutCubic, at);
            }
        }
        tl = tl
            .stagger(&self.lines, Prop::TranslateYPct, 0.0, 0.8, Ease::OutQuint, 0.5, 0.1)
            .stagger(&nodes.socials, Prop::Opacity, 1.0, 0.8, Ease::OutCubic, 1.3, 0.08)
            .stagger(&nodes.socials, Prop::Scale, 1.0, 0.8, Ease::OutCubic, 1.3, 0.08);
        if let Some(showreel) = nodes.showreel {
            tl = tl
                .to(showreel, Prop::Opacity, 1.0, 0.8, Ease::OutCubic, 1.4)
                .to(showreel, Prop::TranslateYPct, 0.0, 0.8, Ease::OutCubic, 1.4);
        }
        if let Some(play) = nodes.play {
            tl = tl.to(play, Prop::Scale, 1.0, 0.8, Ease::OutCubic, 1.4);
        }
        tl = tl.set(
            nodes.container,
            Prop::PointerEvents,
            PropValue::Pointer(PointerEvents::Auto),
            1.5,
        );
        if let Some(letters) = nodes.logo_letters {
            tl = tl.stagger(
                &letters,
                Prop::TranslateXPct,
                0.0,
                0.5,
                Ease::InOutQuart,
                0.0,
                0.08,
            );
        }

        let id = conductor.add(tl);
        conductor.play(id);
        self.timeline = Some((id, MenuRole::Open));

        let outside = page_focusables(stage, &sel.focusable);
        let inside = sel.inside_focusable.select_from(stage, nodes.block);
        self.trap.engage(stage, &outside, &inside);

        glide.stop();
        self.open = true;
        debug!("menu opened");
        events.push(EngineEvent::MenuOpened);
    }

    pub fn close(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        glide: &mut GlideScroll,
        scroll_y: f32,
        logo_threshold: f32,
        events: &mut Vec<EngineEvent>,
    ) {
        let Some(nodes) = &self.nodes else {
            return;
        };
        if let Some((id, _)) = self.timeline.take() {
            conductor.kill(id);
        }

        let mut tl = TimelineBuilder::new("menu:close")
            .stagger(&self.lines, Prop::TranslateYPct, 150.0, 0.5, Ease::InQuint, 0.0, 0.0)
            .stagger(&nodes.socials, Prop::Opacity, 0.0, 0.5, Ease::InQuint, 0.0, 0.0)
            .stagger(&nodes.socials, Prop::Scale, 0.5, 0.5, Ease::InQuint, 0.0, 0.0);
        if let Some(showreel) = nodes.showreel {
            tl = tl
                .to(showreel, Prop::Opacity, 0.0, 0.5, Ease::InQuint, 0.0)
                .to(showreel, Prop::TranslateYPct, 10.0, 0.5, Ease::InQuint, 0.0);
        }
        if let Some(play) = nodes.play {
            tl = tl.to(play, Prop::Scale, 0.5, 0.5, Ease::InQuint, 0.0);
        }
        tl = tl.to(nodes.bg, Prop::Opacity, 0.0, 0.5, Ease::InOutQuad, 0.5);
        // Bar order flips on the way out.
        let widths = [(100.0, 0.4), (100.0, 0.5), (0.0, 0.0), (0.0, 0.1)];
        for (line, (to, at)) in nodes.button_lines.iter().zip(widths) {
            if let Some(line) = line {
                tl = tl.to(*line, Prop::WidthPct, to, 0.3, Ease::InOutCubic, at);
            }
        }
        tl = tl
            .set(nodes.block, Prop::Display, PropValue::Display(Display::None), 1.0)
            .set(
                nodes.container,
                Prop::PointerEvents,
                PropValue::Pointer(PointerEvents::None),
                0.0,
            );
        if let Some(letters) = nodes.logo_letters {
            if scroll_y >= logo_threshold {
                let reversed = [letters[2], letters[1], letters[0]];
                tl = tl.stagger(
                    &reversed,
                    Prop::TranslateXPct,
                    -120.0,
                    0.5,
                    Ease::InOutQuart,
                    0.0,
                    0.1,
                );
            }
        }

        let id = conductor.add(tl);
        conductor.play(id);
        self.timeline = Some((id, MenuRole::Close));

        glide.start();
        self.open = false;
        debug!("menu closed");
        events.push(EngineEvent::MenuClosed);
    }

    /// Consume a timeline completion if it belongs to the menu. First
    /// completion in either direction drops the split placeholders; a close
    /// completion also releases the focus trap.
    pub fn handle_completion(&mut self, id: TimelineId, stage: &mut Stage) -> bool {
        let Some((own, role)) = self.timeline else {
            return false;
        };
        if own != id {
            return false;
        }
        self.timeline = None;
        if !self.placeholders_removed {
            for row in self.placeholders.drain(..) {
                let _ = stage.remove_subtree(row);
            }
            self.placeholders_removed = true;
        }
        if role == MenuRole::Close {
            self.trap.release(stage);
        }
        true
    }

    /// Yank the overlay shut with no animation. Used when navigation starts
    /// while the menu is up.
    pub fn force_reset(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        glide: &mut GlideScroll,
    ) {
        if let Some((id, _)) = self.timeline.take() {
            conductor.kill(id);
        }
        if let Some(nodes) = &self.nodes {
            let _ = stage.set_prop(nodes.block, Prop::Display, PropValue::Display(Display::None));
            let _ = stage.set_prop(
                nodes.container,
                Prop::PointerEvents,
                PropValue::Pointer(PointerEvents::None),
            );
            let _ = stage.set_prop(nodes.bg, Prop::Opacity, PropValue::Number(0.0));
        }
        if self.trap.is_engaged() {
            self.trap.release(stage);
        }
        if self.open {
            glide.start();
        }
        self.open = false;
    }
}

#[derive(Clone, Debug)]
pub struct VideoSelectors {
    pub click_block: SelectorList,
    block: SelectorList,
    bg: SelectorList,
    container: SelectorList,
    close_button: SelectorList,
    close_lines: [SelectorList; 2],
    video_link: SelectorList,
    focusable: SelectorList,
}

impl VideoSelectors {
    pub fn compile() -> Result<Self, StageError> {
        Ok(Self {
            click_block: SelectorList::parse(".video-click-block")?,
            block: SelectorList::parse(".video-overlay-block")?,
            bg: SelectorList::parse(".video-overlay-bg")?,
            container: SelectorList::parse("[id=player]")?,
            close_button: SelectorList::parse(".video-overlay-close-button")?,
            close_lines: [
                SelectorList::parse(".close-button-line._01 .button-line-bg")?,
                SelectorList::parse(".close-button-line._02 .button-line-bg")?,
            ],
            video_link: SelectorList::parse("a[data-video-link]")?,
            focusable: SelectorList::parse(FOCUSABLE)?,
        })
    }
}

#[derive(Debug)]
struct VideoNodes {
    block: NodeId,
    bg: NodeId,
    container: NodeId,
    close_button: NodeId,
    close_lines: [Option<NodeId>; 2],
}

/// Full-viewport video overlay wrapping an embedded player.
#[derive(Default)]
pub struct VideoOverlay {
    nodes: Option<VideoNodes>,
    open: bool,
    timeline: Option<TimelineId>,
    player: Option<Box<dyn VideoPlayer>>,
    kind: Option<PlayerKind>,
    awaiting_player: bool,
    trap: FocusTrap,
}

impl std::fmt::Debug for VideoOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoOverlay")
            .field("open", &self.open)
            .field("kind", &self.kind)
            .field("awaiting_player", &self.awaiting_player)
            .finish_non_exhaustive()
    }
}

impl VideoOverlay {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close_button(&self) -> Option<NodeId> {
        self.nodes.as_ref().map(|n| n.close_button)
    }

    pub fn background(&self) -> Option<NodeId> {
        self.nodes.as_ref().map(|n| n.bg)
    }

    pub fn resolve(&mut self, stage: &mut Stage, sel: &VideoSelectors) {
        let (Some(block), Some(bg), Some(container), Some(close_button)) = (
            sel.block.first(stage),
            sel.bg.first(stage),
            sel.container.first(stage),
            sel.close_button.first(stage),
        ) else {
            self.nodes = None;
            return;
        };
        let close_lines = std::array::from_fn(|i| sel.close_lines[i].first(stage));
        for line in close_lines.into_iter().flatten() {
            let _ = stage.set_prop(line, Prop::WidthPct, PropValue::Number(0.0));
        }
        let _ = stage.set_prop(block, Prop::Display, PropValue::Display(Display::None));
        self.nodes = Some(VideoNodes {
            block,
            bg,
            container,
            close_button,
            close_lines,
        });
    }

    /// Open for one click block: overlay up immediately, player swapped in
    /// behind it once its runtime reports ready.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        glide: &mut GlideScroll,
        host: &mut dyn WidgetHost,
        sel: &VideoSelectors,
        click_block: NodeId,
        events: &mut Vec<EngineEvent>,
    ) {
        let Some(nodes) = &self.nodes else {
            return;
        };
        if let Some(id) = self.timeline.take() {
            conductor.kill(id);
        }

        let mut tl = TimelineBuilder::new("video:open")
            .set(nodes.block, Prop::Display, PropValue::Display(Display::Flex), 0.0)
            .from_to(nodes.block, Prop::Opacity, 0.0, 1.0, 0.3, Ease::OutQuad, 0.0)
            .to(nodes.bg, Prop::Opacity, 0.95, 0.3, Ease::OutQuad, 0.0);
        let line_ats = [0.4, 0.5];
        for (line, at) in nodes.close_lines.iter().zip(line_ats) {
            if let Some(line) = line {
                tl = tl.to(*line, Prop::WidthPct, 100.0, 0.3, Ease::InOutCubic, at);
            }
        }
        let id = conductor.add(tl);
        conductor.play(id);
        self.timeline = Some(id);

        glide.stop();
        self.open = true;
        let outside = outside_focusables(stage, &sel.focusable);
        self.trap.engage(stage, &outside, &[]);

        if let Some(player) = &mut self.player {
            player.destroy();
        }
        self.player = None;
        self.awaiting_player = false;
        let container = nodes.container;
        let _ = stage.clear_children(container);

        let kind = stage
            .attr(click_block, "data-overlay-type")
            .and_then(PlayerKind::from_attr);
        let url = sel
            .video_link
            .first_from(stage, click_block)
            .and_then(|link| stage.attr(link, "href"))
            .map(str::to_owned);
        self.kind = kind;
        if let (Some(kind), Some(url)) = (kind, url) {
            let _ = stage.set_prop(container, Prop::Opacity, PropValue::Number(0.0));
            self.player = host.create_player(kind, &url);
            self.awaiting_player = self.player.is_some();
            debug!(kind = kind.as_str(), "video overlay opened");
            events.push(EngineEvent::VideoOpened { kind });
        }
    }

    /// Fade the player in and start it the tick its runtime turns ready.
    pub fn poll_player(&mut self, conductor: &mut Conductor) {
        if !self.awaiting_player || !self.open {
            return;
        }
        let Some(nodes) = &self.nodes else {
            return;
        };
        let ready = self.player.as_ref().map(|p| p.is_ready()).unwrap_or(false);
        if !ready {
            return;
        }
        self.awaiting_player = false;
        let fade = TimelineBuilder::new("video:player-fade").from_to(
            nodes.container,
            Prop::Opacity,
            0.0,
            1.0,
            0.3,
            Ease::OutQuad,
            0.0,
        );
        let id = conductor.add(fade);
        conductor.play(id);
        if let Some(player) = &mut self.player {
            player.play();
        }
    }

    pub fn close(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        glide: &mut GlideScroll,
        events: &mut Vec<EngineEvent>,
    ) {
        if !self.open {
            return;
        }
        if let Some(id) = self.timeline {
            conductor.reverse(id);
        }
        if let Some(player) = &mut self.player {
            if player.is_ready() {
                player.pause();
            }
        }
        self.awaiting_player = false;
        self.open = false;
        glide.start();
        self.trap.release(stage);
        debug!("video overlay closed");
        events.push(EngineEvent::VideoClosed);
    }

    /// Consume a reverse completion if it belongs to the overlay timeline:
    /// hide the block and drop the player.
    pub fn handle_reversed(&mut self, id: TimelineId, stage: &mut Stage) -> bool {
        if self.timeline != Some(id) {
            return false;
        }
        self.timeline = None;
        if let Some(nodes) = &self.nodes {
            let _ = stage.set_prop(nodes.block, Prop::Display, PropValue::Display(Display::None));
            let _ = stage.clear_children(nodes.container);
        }
        if let Some(player) = &mut self.player {
            player.destroy();
        }
        self.player = None;
        true
    }

    /// Seek by `delta` seconds, clamped to the video's range. Ignored until
    /// the player is ready.
    pub fn seek(&mut self, delta: f32) {
        let Some(player) = &mut self.player else {
            return;
        };
        if !player.is_ready() {
            return;
        }
        let Some(current) = player.current_time() else {
            return;
        };
        let target = if delta >= 0.0 {
            match player.duration() {
                Some(duration) => (current + delta).min(duration),
                None => return,
            }
        } else {
            (current + delta).max(0.0)
        };
        player.seek_to(target);
    }

    pub fn force_reset(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        glide: &mut GlideScroll,
    ) {
        if let Some(id) = self.timeline.take() {
            conductor.kill(id);
        }
        if let Some(nodes) = &self.nodes {
            let _ = stage.set_prop(nodes.block, Prop::Display, PropValue::Display(Display::None));
            let _ = stage.clear_children(nodes.container);
        }
        if let Some(player) = &mut self.player {
            player.destroy();
        }
        self.player = None;
        self.awaiting_player = false;
        if self.trap.is_engaged() {
            self.trap.release(stage);
        }
        if self.open {
            glide.start();
        }
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_trap_round_trips_tabindex() {
        let mut stage = Stage::new();
        let root = stage.root();
        let main = stage.create_with(root, "main", &["main"]).unwrap();
        let plain = stage.create_in(main, "a").unwrap();
        let custom = stage.create_in(main, "button").unwrap();
        stage.set_attr(custom, "tabindex", "2").unwrap();
        let inner = stage.create_in(main, "a").unwrap();

        let mut trap = FocusTrap::default();
        trap.engage(&mut stage, &[plain, custom], &[inner]);
        assert!(trap.is_engaged());
        assert_eq!(stage.attr(plain, "tabindex"), Some("-1"));
        assert_eq!(stage.attr(custom, "tabindex"), Some("-1"));
        assert_eq!(stage.attr(plain, "aria-hidden"), Some("true"));
        assert_eq!(stage.attr(inner, "tabindex"), Some("0"));

        trap.release(&mut stage);
        assert!(!trap.is_engaged());
        assert_eq!(stage.attr(plain, "tabindex"), Some("0"));
        assert_eq!(stage.attr(custom, "tabindex"), Some("2"));
        assert_eq!(stage.attr(plain, "aria-hidden"), None);
        assert_eq!(stage.attr(inner, "tabindex"), Some("-1"));
        assert_eq!(stage.attr(inner, "aria-hidden"), Some("true"));
    }

    #[test]
    fn page_focusables_skip_overlay_content() {
        let mut stage = Stage::new();
        let root = stage.root();
        let main = stage.create_with(root, "main", &["main"]).unwrap();
        let in_main = stage.create_in(main, "a").unwrap();
        let footer = stage.create_in(root, "footer").unwrap();
        let in_footer = stage.create_in(footer, "button").unwrap();
        let menu = stage
            .create_with(main, "div", &["menu-overlay-block"])
            .unwrap();
        let in_menu = stage.create_in(menu, "a").unwrap();
        let navbar = stage.create_with(root, "div", &["navbar-block"]).unwrap();
        let in_navbar = stage.create_in(navbar, "a").unwrap();

        let focusable = SelectorList::parse(FOCUSABLE).unwrap();
        let found = page_focusables(&stage, &focusable);
        assert!(found.contains(&in_main));
        assert!(found.contains(&in_footer));
        assert!(!found.contains(&in_menu));
        assert!(!found.contains(&in_navbar));
    }

    #[test]
    fn missing_overlay_markup_is_inert() {
        let mut stage = Stage::new();
        let sel = MenuSelectors::compile().unwrap();
        let mut menu = MenuOverlay::default();
        menu.resolve(&mut stage, &sel);
        assert!(!menu.is_open());

        let mut conductor = Conductor::new();
        let mut glide = GlideScroll::new(1000.0);
        let mut events = Vec::new();
        let splitter = crate::split::GreedySplitter::default();
        menu.open(
            &mut stage,
            &mut conductor,
            &mut glide,
            &sel,
            &splitter,
            &mut events,
        );
        assert!(!menu.is_open());
        assert!(events.is_empty());
        assert!(conductor.is_empty());
    }
}
