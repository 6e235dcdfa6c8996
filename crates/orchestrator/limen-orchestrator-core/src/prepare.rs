//! Animation-state preparation.
//!
//! Before a reveal timeline can exist, its element is rewritten into an
//! animatable shape: text is split into masked line pairs, buttons get their
//! label wrapped and their underline/icon collapsed, media nodes grow a
//! perimeter-stroke overlay. Everything synthesized here is torn back down
//! by [`revert_split`]/[`remove_media_mask`] when the owning timeline
//! completes, leaving the original markup byte-for-byte.
//!
//! Preparation is idempotent per node: the [`PreparedSet`] records members
//! and a second pass over one is skipped by discovery.

use hashbrown::{HashMap, HashSet};
use uuid::Uuid;

use limen_stage_core::{
    NodeId, Overflow, Position, Prop, PropValue, SelectorList, Stage, StageError,
};

use crate::category::Category;
use crate::split::{segment, LineSplitter, Segment};

pub const MASK_CLASS: &str = "text-mask";
pub const LINE_CLASS: &str = "text-line";
pub const PLACEHOLDER_CLASS: &str = "empty-line";

/// Selector lists the preparer reuses, compiled once at engine construction.
#[derive(Clone, Debug)]
pub struct PrepareSelectors {
    pub button_label: SelectorList,
    pub underline: SelectorList,
    pub arrow_mask: SelectorList,
    pub footer_texts: SelectorList,
    pub footer_buttons: SelectorList,
    pub social_icons: SelectorList,
    pub lightbox_block: SelectorList,
    pub lightbox_play: SelectorList,
    pub lightbox_texts: SelectorList,
}

impl PrepareSelectors {
    pub fn compile() -> Result<Self, StageError> {
        Ok(Self {
            button_label: SelectorList::parse(".text")?,
            underline: SelectorList::parse(".button-line-container")?,
            arrow_mask: SelectorList::parse(".arrow-mask")?,
            footer_texts: SelectorList::parse(".text, .button-text .text, .text._14px")?,
            footer_buttons: SelectorList::parse(".button-block")?,
            social_icons: SelectorList::parse(".vector.social")?,
            lightbox_block: SelectorList::parse(".showreel-lightbox-block")?,
            lightbox_play: SelectorList::parse(".play-button")?,
            lightbox_texts: SelectorList::parse(".text")?,
        })
    }
}

/// Record of one split text node, kept until its reveal completes.
#[derive(Clone, Debug)]
pub struct SplitText {
    pub node: NodeId,
    original: Option<String>,
    pub lines: Vec<NodeId>,
    pub masks: Vec<NodeId>,
    pub placeholders: Vec<NodeId>,
}

/// Per-view registry of prepared nodes and their pending split records.
#[derive(Debug, Default)]
pub struct PreparedSet {
    members: HashSet<NodeId>,
    splits: HashMap<NodeId, SplitText>,
}

impl PreparedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    pub fn mark(&mut self, id: NodeId) {
        self.members.insert(id);
    }

    pub fn split(&self, node: NodeId) -> Option<&SplitText> {
        self.splits.get(&node)
    }

    pub fn insert_split(&mut self, split: SplitText) {
        self.members.insert(split.node);
        self.splits.insert(split.node, split);
    }

    pub fn take_split(&mut self, node: NodeId) -> Option<SplitText> {
        self.splits.remove(&node)
    }

    /// Line nodes of several split records, in the given order.
    pub fn lines_of(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        nodes
            .iter()
            .filter_map(|n| self.splits.get(n))
            .flat_map(|s| s.lines.iter().copied())
            .collect()
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.splits.clear();
    }
}

/// Parts handed to the registrar, per category.
#[derive(Clone, Debug)]
pub enum PreparedElement {
    /// Heading or paragraph; the split record lives in the [`PreparedSet`].
    Text,
    Button {
        label: Option<NodeId>,
        underline: Option<NodeId>,
        arrow_mask: Option<NodeId>,
    },
    Footer {
        free_texts: Vec<NodeId>,
        buttons: Vec<FooterButton>,
        socials: Vec<NodeId>,
    },
    DropdownArrow {
        mask: Option<NodeId>,
    },
    Separator,
    Lightbox {
        block: Option<NodeId>,
        play: Option<NodeId>,
        texts: Vec<NodeId>,
    },
    Media(MediaMask),
    SocialGroup {
        icons: Vec<NodeId>,
    },
}

#[derive(Clone, Debug)]
pub struct FooterButton {
    pub block: NodeId,
    pub texts: Vec<NodeId>,
    pub underline: Option<NodeId>,
}

#[derive(Clone, Copy, Debug)]
pub struct MediaMask {
    pub wrapper: NodeId,
    pub overlay: NodeId,
    pub path: NodeId,
    pub perimeter: f32,
}

fn mark_synthesized(stage: &mut Stage, id: NodeId) {
    if let Some(node) = stage.node_mut(id) {
        node.synthesized = true;
    }
}

/// Split `node`'s text into masked line pairs. Blank lines become exactly
/// one placeholder row each. The node's own text is moved into the lines.
pub fn split_text(
    stage: &mut Stage,
    node: NodeId,
    splitter: &dyn LineSplitter,
) -> Result<SplitText, StageError> {
    let width = stage
        .rect(node)
        .ok_or(StageError::UnknownNode(node))?
        .width;
    let original = stage.text(node).map(str::to_owned);
    stage.set_text(node, None)?;

    let mut lines = Vec::new();
    let mut masks = Vec::new();
    let mut placeholders = Vec::new();
    if let Some(text) = &original {
        for piece in segment(text) {
            match piece {
                Segment::Text(run) => {
                    for line_text in splitter.split(&run, width) {
                        let mask = stage.create_with(node, "div", &[MASK_CLASS])?;
                        mark_synthesized(stage, mask);
                        stage.set_prop(mask, Prop::Overflow, PropValue::Overflow(Overflow::Hidden))?;
                        let line = stage.create_with(mask, "div", &[LINE_CLASS])?;
                        mark_synthesized(stage, line);
                        stage.set_text(line, Some(line_text))?;
                        stage.set_prop(line, Prop::TranslateYPct, PropValue::Number(150.0))?;
                        masks.push(mask);
                        lines.push(line);
                    }
                }
                Segment::Gap => {
                    let row = stage.create_with(node, "div", &[PLACEHOLDER_CLASS])?;
                    mark_synthesized(stage, row);
                    placeholders.push(row);
                }
            }
        }
    }

    Ok(SplitText {
        node,
        original,
        lines,
        masks,
        placeholders,
    })
}

/// Wrap a button label's whole text in one mask/line pair, without line
/// splitting.
fn wrap_label(stage: &mut Stage, label: NodeId) -> Result<SplitText, StageError> {
    let original = stage.text(label).map(str::to_owned);
    stage.set_text(label, None)?;
    let mask = stage.create_with(label, "div", &[MASK_CLASS])?;
    mark_synthesized(stage, mask);
    stage.set_prop(mask, Prop::Overflow, PropValue::Overflow(Overflow::Hidden))?;
    let line = stage.create_with(mask, "div", &[LINE_CLASS])?;
    mark_synthesized(stage, line);
    stage.set_text(line, original.clone())?;
    stage.set_prop(line, Prop::TranslateYPct, PropValue::Number(150.0))?;
    Ok(SplitText {
        node: label,
        original,
        lines: vec![line],
        masks: vec![mask],
        placeholders: Vec::new(),
    })
}

/// Tear down a split: masks and placeholders removed, text restored.
/// Tolerates nodes that already left the stage.
pub fn revert_split(stage: &mut Stage, split: &SplitText) {
    for mask in &split.masks {
        let _ = stage.remove_subtree(*mask);
    }
    for row in &split.placeholders {
        let _ = stage.remove_subtree(*row);
    }
    let _ = stage.set_text(split.node, split.original.clone());
}

/// Undo everything `prepare` synthesized for one element, once its reveal
/// has played out. Membership marks stay, so the element is never picked up
/// again within the view.
pub fn revert_element(
    stage: &mut Stage,
    prepared: &mut PreparedSet,
    element: NodeId,
    made: &PreparedElement,
) {
    fn revert_node(stage: &mut Stage, prepared: &mut PreparedSet, node: NodeId) {
        if let Some(split) = prepared.take_split(node) {
            revert_split(stage, &split);
        }
    }
    match made {
        PreparedElement::Text => revert_node(stage, prepared, element),
        PreparedElement::Button { label, .. } => {
            if let Some(label) = label {
                revert_node(stage, prepared, *label);
            }
        }
        PreparedElement::Footer {
            free_texts,
            buttons,
            ..
        } => {
            for text in free_texts {
                revert_node(stage, prepared, *text);
            }
            for button in buttons {
                for text in &button.texts {
                    revert_node(stage, prepared, *text);
                }
            }
        }
        PreparedElement::Lightbox { texts, .. } => {
            for text in texts {
                revert_node(stage, prepared, *text);
            }
        }
        PreparedElement::Media(mask) => remove_media_mask(stage, element, mask),
        PreparedElement::DropdownArrow { .. }
        | PreparedElement::Separator
        | PreparedElement::SocialGroup { .. } => {}
    }
}

/// Remove a media overlay and its wrapper, restoring the original tree.
pub fn remove_media_mask(stage: &mut Stage, element: NodeId, mask: &MediaMask) {
    let _ = stage.remove_subtree(mask.overlay);
    if let Some(parent) = stage.parent(mask.wrapper) {
        let _ = stage.insert_before(parent, element, mask.wrapper);
        let _ = stage.remove_subtree(mask.wrapper);
    }
    let _ = stage.remove_attr(element, "mask");
}

fn set_collapsed_scale_x(stage: &mut Stage, node: NodeId, origin: &str) -> Result<(), StageError> {
    stage.set_prop(node, Prop::ScaleX, PropValue::Number(0.0))?;
    stage.set_attr(node, "transform-origin", origin)
}

fn set_collapsed_scale(stage: &mut Stage, node: NodeId, origin: &str) -> Result<(), StageError> {
    stage.set_prop(node, Prop::Scale, PropValue::Number(0.0))?;
    stage.set_attr(node, "transform-origin", origin)
}

fn set_hidden_icon(stage: &mut Stage, node: NodeId) -> Result<(), StageError> {
    stage.set_prop(node, Prop::Opacity, PropValue::Number(0.0))?;
    stage.set_prop(node, Prop::Scale, PropValue::Number(0.5))
}

fn build_media_mask(stage: &mut Stage, element: NodeId) -> Result<MediaMask, StageError> {
    let rect = stage.rect(element).ok_or(StageError::UnknownNode(element))?;
    let perimeter = rect.perimeter();
    let mask_id = format!("reveal-mask-{}", Uuid::new_v4());

    let wrapper = stage.wrap(element, "div", &["reveal-wrapper"])?;
    stage.set_prop(wrapper, Prop::Position, PropValue::Position(Position::Relative))?;
    stage.set_rect(wrapper, rect)?;

    let overlay = stage.create_in(wrapper, "svg")?;
    mark_synthesized(stage, overlay);
    stage.set_attr(overlay, "width", &format!("{}", rect.width))?;
    stage.set_attr(overlay, "height", &format!("{}", rect.height))?;

    let mask = stage.create_in(overlay, "mask")?;
    mark_synthesized(stage, mask);
    stage.set_attr(mask, "id", &mask_id)?;

    let backdrop = stage.create_in(mask, "rect")?;
    mark_synthesized(stage, backdrop);
    stage.set_attr(backdrop, "fill", "white")?;

    let path = stage.create_in(mask, "path")?;
    mark_synthesized(stage, path);
    stage.set_attr(
        path,
        "d",
        &format!("M0,0 H{} V{} H0 V0 Z", rect.width, rect.height),
    )?;
    stage.set_attr(path, "stroke-dasharray", &format!("{perimeter}"))?;
    stage.set_prop(path, Prop::DashOffset, PropValue::Number(perimeter))?;

    stage.set_attr(element, "mask", &format!("url(#{mask_id})"))?;
    stage.set_prop(element, Prop::Opacity, PropValue::Number(1.0))?;

    Ok(MediaMask {
        wrapper,
        overlay,
        path,
        perimeter,
    })
}

/// Rewrite `element` into its animatable shape and record what was made.
pub fn prepare(
    stage: &mut Stage,
    sel: &PrepareSelectors,
    prepared: &mut PreparedSet,
    category: Category,
    element: NodeId,
    splitter: &dyn LineSplitter,
) -> Result<PreparedElement, StageError> {
    let made = match category {
        Category::Heading | Category::Paragraph => {
            let split = split_text(stage, element, splitter)?;
            prepared.insert_split(split);
            PreparedElement::Text
        }
        Category::Button => {
            let label = sel.button_label.first_from(stage, element);
            if let Some(label) = label {
                let split = wrap_label(stage, label)?;
                prepared.insert_split(split);
            }
            let underline = sel.underline.first_from(stage, element);
            if let Some(underline) = underline {
                set_collapsed_scale_x(stage, underline, "left")?;
            }
            let arrow_mask = sel.arrow_mask.first_from(stage, element);
            if let Some(mask) = arrow_mask {
                set_collapsed_scale(stage, mask, "0% 100%")?;
            }
            PreparedElement::Button {
                label,
                underline,
                arrow_mask,
            }
        }
        Category::Footer => {
            let buttons: Vec<NodeId> = sel.footer_buttons.select_from(stage, element);
            let mut free_texts = Vec::new();
            let mut per_button: Vec<FooterButton> = buttons
                .iter()
                .map(|b| FooterButton {
                    block: *b,
                    texts: Vec::new(),
                    underline: None,
                })
                .collect();
            for text in sel.footer_texts.select_from(stage, element) {
                let split = split_text(stage, text, splitter)?;
                prepared.insert_split(split);
                let owner = stage
                    .ancestors(text)
                    .into_iter()
                    .find(|a| buttons.contains(a));
                match owner {
                    Some(block) => {
                        if let Some(button) = per_button.iter_mut().find(|b| b.block == block) {
                            button.texts.push(text);
                        }
                    }
                    None => free_texts.push(text),
                }
            }
            for button in &mut per_button {
                button.underline = sel.underline.first_from(stage, button.block);
                if let Some(underline) = button.underline {
                    set_collapsed_scale_x(stage, underline, "left")?;
                }
            }
            let socials = sel.social_icons.select_from(stage, element);
            for icon in &socials {
                set_hidden_icon(stage, *icon)?;
            }
            PreparedElement::Footer {
                free_texts,
                buttons: per_button,
                socials,
            }
        }
        Category::DropdownArrow => {
            let mask = sel.arrow_mask.first_from(stage, element);
            if let Some(mask) = mask {
                set_collapsed_scale(stage, mask, "100% 100%")?;
            }
            PreparedElement::DropdownArrow { mask }
        }
        Category::Separator => {
            stage.set_prop(element, Prop::WidthPct, PropValue::Number(0.0))?;
            PreparedElement::Separator
        }
        Category::Lightbox => {
            let block = sel.lightbox_block.first_from(stage, element);
            if let Some(block) = block {
                stage.set_prop(block, Prop::Opacity, PropValue::Number(0.0))?;
                stage.set_prop(block, Prop::TranslateYPct, PropValue::Number(10.0))?;
            }
            let play = sel.lightbox_play.first_from(stage, element);
            if let Some(play) = play {
                stage.set_prop(play, Prop::Scale, PropValue::Number(0.5))?;
            }
            let texts = sel.lightbox_texts.select_from(stage, element);
            for text in &texts {
                let split = split_text(stage, *text, splitter)?;
                prepared.insert_split(split);
            }
            PreparedElement::Lightbox { block, play, texts }
        }
        Category::MediaReveal => PreparedElement::Media(build_media_mask(stage, element)?),
        Category::SocialIconGroup => {
            let icons = sel.social_icons.select_from(stage, element);
            for icon in &icons {
                set_hidden_icon(stage, *icon)?;
            }
            PreparedElement::SocialGroup { icons }
        }
    };
    prepared.mark(element);
    Ok(made)
}
