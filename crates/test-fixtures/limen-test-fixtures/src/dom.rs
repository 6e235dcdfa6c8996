//! Declarative node trees for fixture pages.

use std::collections::HashMap;

use anyhow::Result;
use serde::Deserialize;

use limen_stage_core::{NodeId, Rect, Stage};

/// One node of a fixture page: tag, classes, attributes, optional text and
/// layout rect, then children. This is the shape a mirror layer would
/// capture from a rendered document.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    /// `[x, y, width, height]` in document coordinates.
    #[serde(default)]
    pub rect: Option<[f32; 4]>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

/// Build a stage from a spec. The spec's top node maps onto the stage root,
/// which keeps the tag the stage created it with.
pub fn build_stage(spec: &NodeSpec) -> Result<Stage> {
    let mut stage = Stage::new();
    let root = stage.root();
    apply(&mut stage, root, spec)?;
    Ok(stage)
}

fn apply(stage: &mut Stage, node: NodeId, spec: &NodeSpec) -> Result<()> {
    for class in &spec.classes {
        stage.add_class(node, class)?;
    }
    for (name, value) in &spec.attrs {
        stage.set_attr(node, name, value)?;
    }
    if let Some(text) = &spec.text {
        stage.set_text(node, Some(text.clone()))?;
    }
    if let Some([x, y, width, height]) = spec.rect {
        stage.set_rect(node, Rect::new(x, y, width, height))?;
    }
    for child in &spec.children {
        let id = stage.create_in(node, &child.tag)?;
        apply(stage, id, child)?;
    }
    Ok(())
}
