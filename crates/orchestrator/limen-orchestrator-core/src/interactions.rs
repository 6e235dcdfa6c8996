//! Scroll-linked and click-driven page interactions.
//!
//! Everything here binds against the freshly activated view and is torn
//! down and rebuilt on navigation: the navbar backdrop scrub, the logo
//! letter toggle, CTA shape scrubs, theme bands, expanding dropdowns, and
//! the filter list fixups.

use tracing::debug;

use limen_motion_core::{
    Conductor, Ease, ScrubBinding, ScrubRange, TimelineBuilder, TimelineId, ToggleBinding,
};
use limen_stage_core::{
    Display, NodeId, Overflow, Prop, PropValue, SelectorList, Stage, StageError, Viewport,
};

use crate::events::EngineEvent;

#[derive(Clone, Debug)]
pub struct InteractionSelectors {
    navbar_wrapper: SelectorList,
    navbar_blur: SelectorList,
    logo_letters: [SelectorList; 3],
    main: SelectorList,
    theme_bands: SelectorList,
    cta_blocks: SelectorList,
    cta_shape: SelectorList,
    pub dropdowns: SelectorList,
    dropdown_list: SelectorList,
    arrow01: SelectorList,
    arrow02: SelectorList,
    checkbox_all: SelectorList,
    filter_list: SelectorList,
    dark_mode: SelectorList,
    light_mode: SelectorList,
}

impl InteractionSelectors {
    pub fn compile() -> Result<Self, StageError> {
        Ok(Self {
            navbar_wrapper: SelectorList::parse(".navbar-bg-wrapper")?,
            navbar_blur: SelectorList::parse(".navbar-blur")?,
            logo_letters: [
                SelectorList::parse(".logo_text._01")?,
                SelectorList::parse(".logo_text._02")?,
                SelectorList::parse(".logo_text._03")?,
            ],
            main: SelectorList::parse(".main")?,
            theme_bands: SelectorList::parse("[data-animate-theme-to]")?,
            cta_blocks: SelectorList::parse(".cta-block")?,
            cta_shape: SelectorList::parse(".image.cta-shape")?,
            dropdowns: SelectorList::parse(".dropdown-block")?,
            dropdown_list: SelectorList::parse(".dropdown-list")?,
            arrow01: SelectorList::parse(".vector.arrow._01")?,
            arrow02: SelectorList::parse(".vector.arrow._02")?,
            checkbox_all: SelectorList::parse("[id=chackbox-all]")?,
            filter_list: SelectorList::parse(".project-filter-list")?,
            dark_mode: SelectorList::parse(".dark-mode")?,
            light_mode: SelectorList::parse(".light-mode")?,
        })
    }
}

#[derive(Debug)]
struct ThemeBand {
    node: NodeId,
    theme: String,
    active: bool,
}

#[derive(Debug)]
struct Dropdown {
    block: NodeId,
    timeline: TimelineId,
    open: bool,
}

/// Per-view interaction bindings.
#[derive(Debug, Default)]
pub struct InteractionsLayer {
    scrubs: Vec<ScrubBinding>,
    logo: Option<ToggleBinding>,
    themes: Vec<ThemeBand>,
    dropdowns: Vec<Dropdown>,
}

impl InteractionsLayer {
    /// Rebuild every binding against the current tree.
    pub fn bind(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        sel: &InteractionSelectors,
        navbar_range: f32,
    ) {
        self.clear(conductor);

        // Stale palette classes from the previous page's editor state.
        for node in sel.dark_mode.select(stage) {
            let _ = stage.remove_class(node, "dark-mode");
        }
        for node in sel.light_mode.select(stage) {
            let _ = stage.remove_class(node, "light-mode");
        }

        // Secondary arrows start collapsed; hover and dropdown timelines
        // grow them back.
        for arrow in sel.arrow02.select(stage) {
            let _ = stage.set_prop(arrow, Prop::Display, PropValue::Display(Display::Flex));
            let _ = stage.set_prop(arrow, Prop::WidthPct, PropValue::Number(0.0));
            let _ = stage.set_prop(arrow, Prop::HeightPct, PropValue::Number(0.0));
        }

        self.themes = sel
            .theme_bands
            .select(stage)
            .into_iter()
            .filter_map(|node| {
                let theme = stage.attr(node, "data-animate-theme-to")?.to_owned();
                Some(ThemeBand {
                    node,
                    theme,
                    active: false,
                })
            })
            .collect();

        let main = sel.main.first(stage);
        if let (Some(main), Some(_), Some(blur)) = (
            main,
            sel.navbar_wrapper.first(stage),
            sel.navbar_blur.first(stage),
        ) {
            let tl = TimelineBuilder::new("navbar:blur").from_to(
                blur,
                Prop::BlurPx,
                0.0,
                10.0,
                0.5,
                Ease::Linear,
                0.0,
            );
            let timeline = conductor.add(tl);
            self.scrubs.push(ScrubBinding {
                timeline,
                trigger: main,
                range: ScrubRange::FromTop {
                    distance: navbar_range,
                },
            });
        }

        let letters: Vec<_> = sel
            .logo_letters
            .iter()
            .filter_map(|s| s.first(stage))
            .collect();
        if let Ok(letters) = <[NodeId; 3]>::try_from(letters) {
            for letter in letters {
                let _ = stage.set_prop(letter, Prop::TranslateXPct, PropValue::Number(0.0));
            }
            let outward = [letters[2], letters[1], letters[0]];
            let tl = TimelineBuilder::new("navbar:logo").stagger(
                &outward,
                Prop::TranslateXPct,
                -120.0,
                0.5,
                Ease::InOutQuart,
                0.0,
                0.08,
            );
            let timeline = conductor.add(tl);
            self.logo = Some(ToggleBinding::new(timeline, navbar_range));
        }

        for block in sel.cta_blocks.select(stage) {
            let Some(shape) = sel.cta_shape.first_from(stage, block) else {
                continue;
            };
            let tl = TimelineBuilder::new("cta:shape").from_to(
                shape,
                Prop::Scale,
                0.75,
                1.1,
                1.0,
                Ease::Linear,
                0.0,
            );
            let timeline = conductor.add(tl);
            self.scrubs.push(ScrubBinding {
                timeline,
                trigger: block,
                range: ScrubRange::ThroughViewport,
            });
        }

        for block in sel.dropdowns.select(stage) {
            let Some(list) = sel.dropdown_list.first_from(stage, block) else {
                continue;
            };
            let _ = stage.set_prop(list, Prop::HeightPct, PropValue::Number(0.0));
            let _ = stage.set_prop(list, Prop::Overflow, PropValue::Overflow(Overflow::Hidden));
            let mut tl = TimelineBuilder::new("dropdown:expand").to(
                list,
                Prop::HeightPct,
                100.0,
                0.5,
                Ease::InOutCubic,
                0.0,
            );
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
            let timeline = conductor.add(tl);
            self.dropdowns.push(Dropdown {
                block,
                timeline,
                open: false,
            });
        }

        // The catch-all filter checkbox renders last in the CMS list but
        // belongs first.
        if let (Some(checkbox), Some(list)) =
            (sel.checkbox_all.first(stage), sel.filter_list.first(stage))
        {
            let first = stage.children(list).and_then(|c| c.first().copied());
            match first {
                Some(anchor) if anchor != checkbox => {
                    let _ = stage.insert_before(list, checkbox, anchor);
                }
                None => {
                    let _ = stage.append(list, checkbox);
                }
                _ => {}
            }
        }
    }

    pub fn clear(&mut self, conductor: &mut Conductor) {
        for binding in self.scrubs.drain(..) {
            conductor.kill(binding.timeline);
        }
        if let Some(logo) = self.logo.take() {
            conductor.kill(logo.timeline);
        }
        for dropdown in self.dropdowns.drain(..) {
            conductor.kill(dropdown.timeline);
        }
        self.themes.clear();
    }

    /// Advance scroll-linked state for this tick.
    pub fn tick(
        &mut self,
        stage: &mut Stage,
        conductor: &mut Conductor,
        viewport: &Viewport,
        events: &mut Vec<EngineEvent>,
    ) {
        for binding in &self.scrubs {
            let Some(rect) = stage.rect(binding.trigger) else {
                continue;
            };
            let progress = binding.range.progress(rect, *viewport);
            conductor.scrub_to(binding.timeline, progress, stage);
        }

        if let Some(logo) = &mut self.logo {
            match logo.update(viewport.scroll_y) {
                Some(true) => {
                    conductor.play(logo.timeline);
                }
                Some(false) => {
                    conductor.reverse(logo.timeline);
                }
                None => {}
            }
        }

        let center = viewport.center_line();
        let root = stage.root();
        for band in &mut self.themes {
            let Some(rect) = stage.rect(band.node) else {
                continue;
            };
            let active = rect.y <= center && center <= rect.bottom();
            if active && !band.active {
                let _ = stage.set_attr(root, "data-theme", &band.theme);
                debug!(theme = %band.theme, "theme band entered");
                events.push(EngineEvent::ThemeChanged {
                    theme: band.theme.clone(),
                });
            }
            band.active = active;
        }
    }

    /// A click landed on a dropdown block. Directions follow the settled
    /// state; the class flips only when the toggle finishes.
    pub fn dropdown_clicked(&mut self, conductor: &mut Conductor, block: NodeId) -> bool {
        let Some(dropdown) = self.dropdowns.iter().find(|d| d.block == block) else {
            return false;
        };
        if dropdown.open {
            conductor.reverse(dropdown.timeline);
        } else {
            conductor.play(dropdown.timeline);
        }
        true
    }

    /// Consume a dropdown completion in either direction.
    pub fn handle_dropdown_settled(
        &mut self,
        id: TimelineId,
        opened: bool,
        stage: &mut Stage,
        events: &mut Vec<EngineEvent>,
    ) -> bool {
        let Some(dropdown) = self.dropdowns.iter_mut().find(|d| d.timeline == id) else {
            return false;
        };
        dropdown.open = opened;
        if opened {
            let _ = stage.add_class(dropdown.block, "is-open");
        } else {
            let _ = stage.remove_class(dropdown.block, "is-open");
        }
        events.push(EngineEvent::DropdownToggled {
            block: dropdown.block,
            open: opened,
        });
        events.push(EngineEvent::RelayoutRequested);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limen_stage_core::Rect;

    fn bound_layer(stage: &mut Stage, conductor: &mut Conductor) -> InteractionsLayer {
        let sel = InteractionSelectors::compile().unwrap();
        let mut layer = InteractionsLayer::default();
        layer.bind(stage, conductor, &sel, 400.0);
        layer
    }

    fn navbar_page(stage: &mut Stage) -> NodeId {
        let root = stage.root();
        let main = stage.create_with(root, "main", &["main"]).unwrap();
        stage
            .set_rect(main, Rect::new(0.0, 0.0, 1280.0, 4000.0))
            .unwrap();
        let navbar = stage.create_with(root, "div", &["navbar-block"]).unwrap();
        let wrapper = stage
            .create_with(navbar, "div", &["navbar-bg-wrapper"])
            .unwrap();
        stage.create_with(wrapper, "div", &["navbar-blur"]).unwrap();
        main
    }

    #[test]
    fn navbar_blur_follows_scroll() {
        let mut stage = Stage::new();
        navbar_page(&mut stage);
        let blur = SelectorList::parse(".navbar-blur")
            .unwrap()
            .first(&stage)
            .unwrap();
        let mut conductor = Conductor::new();
        let mut layer = bound_layer(&mut stage, &mut conductor);

        let mut vp = Viewport::new(1280.0, 800.0);
        let mut events = Vec::new();
        vp.scroll_y = 200.0;
        layer.tick(&mut stage, &mut conductor, &vp, &mut events);
        assert_eq!(stage.number(blur, Prop::BlurPx), 5.0);

        vp.scroll_y = 1200.0;
        layer.tick(&mut stage, &mut conductor, &vp, &mut events);
        assert_eq!(stage.number(blur, Prop::BlurPx), 10.0);
    }

    #[test]
    fn theme_bands_fire_on_entry_only() {
        let mut stage = Stage::new();
        let root = stage.root();
        let band = stage.create_with(root, "section", &["section"]).unwrap();
        stage
            .set_attr(band, "data-animate-theme-to", "dark")
            .unwrap();
        stage
            .set_rect(band, Rect::new(0.0, 2000.0, 1280.0, 900.0))
            .unwrap();
        let mut conductor = Conductor::new();
        let mut layer = bound_layer(&mut stage, &mut conductor);

        let mut vp = Viewport::new(1280.0, 800.0);
        let mut events = Vec::new();
        layer.tick(&mut stage, &mut conductor, &vp, &mut events);
        assert!(events.is_empty());

        // Center line (scroll + 400) reaches the band.
        vp.scroll_y = 1700.0;
        layer.tick(&mut stage, &mut conductor, &vp, &mut events);
        assert_eq!(
            events,
            vec![EngineEvent::ThemeChanged {
                theme: "dark".into()
            }]
        );
        assert_eq!(stage.attr(stage.root(), "data-theme"), Some("dark"));

        // Still inside: no repeat.
        vp.scroll_y = 1900.0;
        layer.tick(&mut stage, &mut conductor, &vp, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn dropdown_toggle_flips_class_on_completion() {
        let mut stage = Stage::new();
        let root = stage.root();
        let block = stage.create_with(root, "div", &["dropdown-block"]).unwrap();
        let list = stage.create_with(block, "div", &["dropdown-list"]).unwrap();
        let mut conductor = Conductor::new();
        let mut layer = bound_layer(&mut stage, &mut conductor);
        assert_eq!(stage.number(list, Prop::HeightPct), 0.0);

        assert!(layer.dropdown_clicked(&mut conductor, block));
        let mut settled = Vec::new();
        for _ in 0..60 {
            settled.extend(conductor.step(1.0 / 60.0, &mut stage));
        }
        assert_eq!(settled.len(), 1);
        let id = match &settled[0] {
            limen_motion_core::MotionEvent::Completed { id } => *id,
            other => panic!("expected completion, got {other:?}"),
        };

        let mut events = Vec::new();
        assert!(layer.handle_dropdown_settled(id, true, &mut stage, &mut events));
        assert!(stage.has_class(block, "is-open"));
        assert_eq!(stage.number(list, Prop::HeightPct), 100.0);
        assert!(events.contains(&EngineEvent::RelayoutRequested));
    }

    #[test]
    fn checkbox_all_moves_to_the_head_of_the_filter_list() {
        let mut stage = Stage::new();
        let root = stage.root();
        let list = stage
            .create_with(root, "div", &["project-filter-list"])
            .unwrap();
        let web = stage.create_with(list, "label", &["filter-checkbox-block"]).unwrap();
        let brand = stage
            .create_with(list, "label", &["filter-checkbox-block"])
            .unwrap();
        let all = stage
            .create_with(list, "label", &["filter-checkbox-block"])
            .unwrap();
        stage.set_attr(all, "id", "chackbox-all").unwrap();

        let mut conductor = Conductor::new();
        let _layer = bound_layer(&mut stage, &mut conductor);
        assert_eq!(stage.children(list).unwrap(), &[all, web, brand]);
    }
}
