//! Pointer hover behaviors, wide viewports only.
//!
//! Buttons carry a persistent paused timeline played on enter and reversed
//! on leave. Featured video blocks get a play button that chases the cursor
//! inside the block's fresh bounds, repositioned on every pointer move and
//! on scroll so a scrolling page never strands it.

use limen_motion_core::{Conductor, Ease, TimelineBuilder, TimelineId};
use limen_stage_core::{NodeId, Prop, PropValue, Rect, SelectorList, Stage, StageError, Viewport};

#[derive(Clone, Debug)]
pub struct HoverSelectors {
    pub buttons: SelectorList,
    line01: SelectorList,
    line02: SelectorList,
    line_container: SelectorList,
    arrow_mask: SelectorList,
    arrow01: SelectorList,
    arrow02: SelectorList,
    follow_blocks: SelectorList,
    follow_wrapper: SelectorList,
}

impl HoverSelectors {
    pub fn compile() -> Result<Self, StageError> {
        Ok(Self {
            buttons: SelectorList::parse(".button-block")?,
            line01: SelectorList::parse(".button-line._01")?,
            line02: SelectorList::parse(".button-line._02")?,
            line_container: SelectorList::parse(".button-line-container")?,
            arrow_mask: SelectorList::parse(".arrow-mask")?,
            arrow01: SelectorList::parse(".vector.arrow._01")?,
            arrow02: SelectorList::parse(".vector.arrow._02")?,
            follow_blocks: SelectorList::parse(
                ".video-block.featured, .video-block.portfolio-showreel",
            )?,
            follow_wrapper: SelectorList::parse(".play-button-wrapper")?,
        })
    }
}

#[derive(Debug)]
struct ButtonHover {
    block: NodeId,
    timeline: TimelineId,
    hovered: bool,
}

#[derive(Debug)]
struct CursorFollow {
    block: NodeId,
    wrapper: NodeId,
    over: bool,
    fade: Option<TimelineId>,
}

/// Offset of the cursor from a block's center, in viewport space, clamped
/// to the block's half extents.
fn follow_offset(rect: Rect, viewport: &Viewport, x: f32, y: f32) -> (f32, f32) {
    let center_y = viewport.top_of(rect) + rect.height * 0.5;
    let max_x = rect.width * 0.5;
    let max_y = rect.height * 0.5;
    (
        (x - rect.center_x()).clamp(-max_x, max_x),
        (y - center_y).clamp(-max_y, max_y),
    )
}

fn cursor_inside(rect: Rect, viewport: &Viewport, x: f32, y: f32) -> bool {
    let top = viewport.top_of(rect);
    x >= rect.x && x <= rect.right() && y >= top && y <= top + rect.height
}

/// All hover state for one view.
#[derive(Debug, Default)]
pub struct HoverLayer {
    enabled: bool,
    buttons: Vec<ButtonHover>,
    follows: Vec<CursorFollow>,
}

impl HoverLayer {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Rebuild hover bindings for the current tree. Below `min_width` the
    /// layer stays empty; pointer input falls through.
    pub fn bind(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        sel: &HoverSelectors,
        viewport_width: f32,
        min_width: f32,
    ) {
        self.clear(conductor);
        self.enabled = viewport_width >= min_width;
        if !self.enabled {
            return;
        }

        for block in sel.buttons.select(stage) {
            let mut tl = TimelineBuilder::new("hover:button");
            if sel.arrow_mask.first_from(stage, block).is_some() {
                if let Some(arrow) = sel.arrow01.first_from(stage, block) {
                    tl = tl
                        .to(arrow, Prop::WidthPct, 0.0, 0.5, Ease::InOutCubic, 0.0)
                        .to(arrow, Prop::HeightPct, 0.0, 0.5, Ease::InOutCubic, 0.0);
                }
                if let Some(arrow) = sel.arrow02.first_from(stage, block) {
                    tl = tl
                        .to(arrow, Prop::WidthPct, 100.0, 0.5, Ease::InOutCubic, 0.05)
                        .to(arrow, Prop::HeightPct, 100.0, 0.5, Ease::InOutCubic, 0.05);
                }
            }
            if sel.line_container.first_from(stage, block).is_some() {
                let line01 = sel.line01.first_from(stage, block);
                let line02 = sel.line02.first_from(stage, block);
                if let Some(line02) = line02 {
                    let _ = stage.set_prop(line02, Prop::WidthPct, PropValue::Number(0.0));
                }
                if let Some(line01) = line01 {
                    tl = tl.to(line01, Prop::WidthPct, 0.0, 0.4, Ease::OutQuart, 0.0);
                }
                if let Some(line02) = line02 {
                    tl = tl.to(line02, Prop::WidthPct, 100.0, 0.3, Ease::OutQuart, 0.2);
                }
            }
            if tl.is_empty() {
                continue;
            }
            let timeline = conductor.add(tl);
            self.buttons.push(ButtonHover {
                block,
                timeline,
                hovered: false,
            });
        }

        for block in sel.follow_blocks.select(stage) {
            let Some(wrapper) = sel.follow_wrapper.first_from(stage, block) else {
                continue;
            };
            let _ = stage.set_prop(wrapper, Prop::Opacity, PropValue::Number(0.0));
            let _ = stage.set_prop(wrapper, Prop::Scale, PropValue::Number(0.3));
            self.follows.push(CursorFollow {
                block,
                wrapper,
                over: false,
                fade: None,
            });
        }
    }

    /// Drop every binding and the timelines backing them.
    pub fn clear(&mut self, conductor: &mut Conductor) {
        for button in self.buttons.drain(..) {
            conductor.kill(button.timeline);
        }
        for follow in self.follows.drain(..) {
            if let Some(id) = follow.fade {
                conductor.kill(id);
            }
        }
        self.enabled = false;
    }

    /// Pointer moved; `x`/`y` are viewport coordinates.
    pub fn pointer_moved(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        viewport: &Viewport,
        x: f32,
        y: f32,
    ) {
        if !self.enabled {
            return;
        }
        for button in &mut self.buttons {
            let Some(rect) = stage.rect(button.block) else {
                continue;
            };
            let inside = cursor_inside(rect, viewport, x, y);
            if inside && !button.hovered {
                button.hovered = true;
                conductor.play(button.timeline);
            } else if !inside && button.hovered {
                button.hovered = false;
                conductor.reverse(button.timeline);
            }
        }
        for follow in &mut self.follows {
            let Some(rect) = stage.rect(follow.block) else {
                continue;
            };
            let inside = cursor_inside(rect, viewport, x, y);
            if inside && !follow.over {
                follow.over = true;
                if let Some(id) = follow.fade.take() {
                    conductor.kill(id);
                }
                let tl = TimelineBuilder::new("hover:follow-in")
                    .to(follow.wrapper, Prop::Opacity, 1.0, 0.5, Ease::OutCubic, 0.0)
                    .to(follow.wrapper, Prop::Scale, 1.0, 0.5, Ease::OutCubic, 0.0);
                let id = conductor.add(tl);
                conductor.play(id);
                follow.fade = Some(id);
            } else if !inside && follow.over {
                follow.over = false;
                if let Some(id) = follow.fade.take() {
                    conductor.kill(id);
                }
                let tl = TimelineBuilder::new("hover:follow-out")
                    .to(follow.wrapper, Prop::Opacity, 0.0, 0.2, Ease::InCubic, 0.0)
                    .to(follow.wrapper, Prop::Scale, 0.3, 0.2, Ease::InCubic, 0.0);
                let id = conductor.add(tl);
                conductor.play(id);
                follow.fade = Some(id);
            }
            if follow.over && inside {
                let (dx, dy) = follow_offset(rect, viewport, x, y);
                let _ = stage.set_prop(follow.wrapper, Prop::TranslateXPx, PropValue::Number(dx));
                let _ = stage.set_prop(follow.wrapper, Prop::TranslateYPx, PropValue::Number(dy));
            }
        }
    }

    /// Scroll moved the page under the cursor; keep chased buttons pinned
    /// inside their blocks without changing hover state.
    pub fn scrolled(&mut self, stage: &mut Stage, viewport: &Viewport, x: f32, y: f32) {
        if !self.enabled {
            return;
        }
        for follow in &self.follows {
            if !follow.over {
                continue;
            }
            let Some(rect) = stage.rect(follow.block) else {
                continue;
            };
            if !cursor_inside(rect, viewport, x, y) {
                continue;
            }
            let (dx, dy) = follow_offset(rect, viewport, x, y);
            let _ = stage.set_prop(follow.wrapper, Prop::TranslateXPx, PropValue::Number(dx));
            let _ = stage.set_prop(follow.wrapper, Prop::TranslateYPx, PropValue::Number(dy));
        }
    }
}
