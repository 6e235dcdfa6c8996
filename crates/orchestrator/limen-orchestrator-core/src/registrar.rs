//! Reveal choreography.
//!
//! One paused timeline per prepared element. Nothing here plays anything;
//! playback is owned by the visibility layer, which fires a timeline the
//! first time its trigger crosses into view.

use limen_motion_core::{Conductor, Ease, TimelineBuilder, TimelineId};
use limen_stage_core::{NodeId, Prop};

use crate::category::Category;
use crate::prepare::{PreparedElement, PreparedSet};

/// The node whose bounds gate the reveal. Media animates inside a wrapper,
/// so the wrapper is what gets watched.
pub fn trigger_node(element: NodeId, made: &PreparedElement) -> NodeId {
    match made {
        PreparedElement::Media(mask) => mask.wrapper,
        _ => element,
    }
}

/// Build the paused reveal timeline for one prepared element. Elements that
/// yielded nothing animatable get no timeline at all.
pub fn build_reveal(
    conductor: &mut Conductor,
    prepared: &PreparedSet,
    category: Category,
    element: NodeId,
    made: &PreparedElement,
) -> Option<TimelineId> {
    let label = format!("reveal:{category}");
    let mut tl = TimelineBuilder::new(label);

    match made {
        PreparedElement::Text => {
            let lines = prepared.lines_of(&[element]);
            tl = tl.stagger(&lines, Prop::TranslateYPct, 0.0, 0.8, Ease::OutQuint, 0.0, 0.12);
        }
        PreparedElement::Button {
            label,
            underline,
            arrow_mask,
        } => {
            if let Some(label) = label {
                let lines = prepared.lines_of(&[*label]);
                tl = tl.stagger(&lines, Prop::TranslateYPct, 0.0, 0.8, Ease::OutQuint, 0.0, 0.0);
            }
            if let Some(underline) = underline {
                tl = tl.to(*underline, Prop::ScaleX, 1.0, 0.7, Ease::OutQuart, 0.15);
            }
            if let Some(mask) = arrow_mask {
                tl = tl.to(*mask, Prop::Scale, 1.0, 0.7, Ease::OutQuint, 0.15);
            }
        }
        PreparedElement::Footer {
            free_texts,
            buttons,
            socials,
        } => {
            let free_lines = prepared.lines_of(free_texts);
            tl = tl.stagger(
                &free_lines,
                Prop::TranslateYPct,
                0.0,
                0.8,
                Ease::OutQuint,
                0.0,
                0.1,
            );
            for (i, button) in buttons.iter().enumerate() {
                let at = 0.3 + 0.1 * i as f32;
                let lines = prepared.lines_of(&button.texts);
                tl = tl.stagger(&lines, Prop::TranslateYPct, 0.0, 0.8, Ease::OutQuint, at, 0.0);
                if let Some(underline) = button.underline {
                    tl = tl.to(underline, Prop::ScaleX, 1.0, 0.5, Ease::OutQuart, at + 0.2);
                }
            }
            tl = tl
                .stagger(socials, Prop::Opacity, 1.0, 0.5, Ease::OutCubic, 1.0, 0.05)
                .stagger(socials, Prop::Scale, 1.0, 0.5, Ease::OutCubic, 1.0, 0.05);
        }
        PreparedElement::DropdownArrow { mask } => {
            if let Some(mask) = mask {
                tl = tl.to(*mask, Prop::Scale, 1.0, 0.8, Ease::OutQuint, 0.0);
            }
        }
        PreparedElement::Separator => {
            tl = tl.to(element, Prop::WidthPct, 100.0, 1.2, Ease::OutQuint, 0.0);
        }
        PreparedElement::Lightbox { block, play, texts } => {
            if let Some(block) = block {
                tl = tl
                    .to(*block, Prop::Opacity, 1.0, 0.8, Ease::OutCubic, 0.0)
                    .to(*block, Prop::TranslateYPct, 0.0, 0.8, Ease::OutCubic, 0.0);
            }
            if let Some(play) = play {
                tl = tl.to(*play, Prop::Scale, 1.0, 0.8, Ease::OutCubic, 0.0);
            }
            let lines = prepared.lines_of(texts);
            tl = tl.stagger(&lines, Prop::TranslateYPct, 0.0, 0.8, Ease::OutQuint, 0.2, 0.12);
        }
        PreparedElement::Media(mask) => {
            tl = tl.to(mask.path, Prop::DashOffset, 0.0, 1.5, Ease::InOutCubic, 0.0);
        }
        PreparedElement::SocialGroup { icons } => {
            tl = tl
                .stagger(icons, Prop::Opacity, 1.0, 0.8, Ease::OutCubic, 0.0, 0.08)
                .stagger(icons, Prop::Scale, 1.0, 0.8, Ease::OutCubic, 0.0, 0.08);
        }
    }

    if tl.is_empty() {
        return None;
    }
    Some(conductor.add(tl))
}
