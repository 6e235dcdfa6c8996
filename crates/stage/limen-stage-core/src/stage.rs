//! Retained element tree.
//!
//! A [`Stage`] is the engine's view of the document: a single-rooted arena of
//! nodes carrying tag names, classes, attributes, optional text, inline style
//! and a layout rect. Hosts mirror their real element tree into a stage up
//! front and then feed events; the engine never touches a live document.
//!
//! Storage is a flat `Vec` with linear id lookup. Stages are small (hundreds
//! of nodes), mutation is bursty, and linear scans keep every operation
//! allocation-free on the read path.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::error::StageError;
use crate::geometry::Rect;
use crate::ids::{IdAllocator, NodeId};
use crate::style::{Prop, PropValue, StyleMap};

/// One element in the tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: HashMap<String, String>,
    /// Leaf text content. None for purely structural nodes.
    pub text: Option<String>,
    pub style: StyleMap,
    pub rect: Rect,
    /// True for nodes the engine created itself (line wrappers, reveal masks,
    /// placeholder rows). Synthesized nodes are fair game for teardown.
    pub synthesized: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Arena of nodes with a fixed root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stage {
    nodes: Vec<Node>,
    ids: IdAllocator,
    root: NodeId,
}

impl Stage {
    /// Empty stage with a `body` root.
    pub fn new() -> Self {
        let mut ids = IdAllocator::new();
        let root = ids.alloc_node();
        let root_node = Node {
            id: root,
            tag: "body".to_string(),
            classes: Vec::new(),
            attrs: HashMap::new(),
            text: None,
            style: StyleMap::new(),
            rect: Rect::ZERO,
            synthesized: false,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root_node],
            ids,
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn require(&self, id: NodeId) -> Result<&Node, StageError> {
        self.node(id).ok_or(StageError::UnknownNode(id))
    }

    fn require_mut(&mut self, id: NodeId) -> Result<&mut Node, StageError> {
        self.node_mut(id).ok_or(StageError::UnknownNode(id))
    }

    // ---- construction ----------------------------------------------------

    /// Allocate a detached node. Attach it with [`append`](Self::append) or
    /// [`insert_before`](Self::insert_before).
    pub fn create(&mut self, tag: impl Into<String>) -> NodeId {
        let id = self.ids.alloc_node();
        self.nodes.push(Node {
            id,
            tag: tag.into(),
            classes: Vec::new(),
            attrs: HashMap::new(),
            text: None,
            style: StyleMap::new(),
            rect: Rect::ZERO,
            synthesized: false,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a node and append it under `parent`.
    pub fn create_in(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, StageError> {
        let id = self.create(tag);
        self.append(parent, id)?;
        Ok(id)
    }

    /// Create a classed node and append it under `parent`.
    pub fn create_with(
        &mut self,
        parent: NodeId,
        tag: &str,
        classes: &[&str],
    ) -> Result<NodeId, StageError> {
        let id = self.create_in(parent, tag)?;
        if let Some(node) = self.node_mut(id) {
            node.classes = classes.iter().map(|c| c.to_string()).collect();
        }
        Ok(id)
    }

    // ---- tree surgery ----------------------------------------------------

    /// Move `child` to the end of `parent`'s child list, detaching it from its
    /// current parent first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), StageError> {
        if child == self.root {
            return Err(StageError::RootImmutable);
        }
        self.require(parent)?;
        self.require(child)?;
        if parent == child || self.walk(child).contains(&parent) {
            return Err(StageError::Cycle { parent, child });
        }
        self.unlink(child);
        self.require_mut(child)?.parent = Some(parent);
        self.require_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Move `child` directly before `anchor` in `parent`'s child list.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: NodeId,
    ) -> Result<(), StageError> {
        if child == anchor {
            return Err(StageError::NotAChild { parent, anchor });
        }
        self.append(parent, child)?;
        let siblings = &mut self.require_mut(parent)?.children;
        let anchor_at = siblings
            .iter()
            .position(|c| *c == anchor)
            .ok_or(StageError::NotAChild { parent, anchor })?;
        let last = siblings.pop().ok_or(StageError::NotAChild { parent, anchor })?;
        siblings.insert(anchor_at, last);
        Ok(())
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.retain(|c| *c != id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Detach `id` from its parent, keeping its subtree alive in the arena.
    pub fn detach(&mut self, id: NodeId) -> Result<(), StageError> {
        if id == self.root {
            return Err(StageError::RootImmutable);
        }
        self.require(id)?;
        self.unlink(id);
        Ok(())
    }

    /// Remove `id` and every descendant from the arena.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<(), StageError> {
        if id == self.root {
            return Err(StageError::RootImmutable);
        }
        self.require(id)?;
        self.unlink(id);
        let doomed: HashSet<NodeId> = self.walk(id).into_iter().collect();
        self.nodes.retain(|n| !doomed.contains(&n.id));
        Ok(())
    }

    /// Remove every child subtree of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) -> Result<(), StageError> {
        let children: Vec<NodeId> = self.require(parent)?.children.clone();
        for child in children {
            self.remove_subtree(child)?;
        }
        Ok(())
    }

    /// Insert a fresh synthesized wrapper between `target` and its parent.
    /// The wrapper takes `target`'s slot in the sibling order.
    pub fn wrap(
        &mut self,
        target: NodeId,
        tag: &str,
        classes: &[&str],
    ) -> Result<NodeId, StageError> {
        let parent = self
            .require(target)?
            .parent
            .ok_or(StageError::RootImmutable)?;
        let wrapper = self.create(tag);
        if let Some(node) = self.node_mut(wrapper) {
            node.classes = classes.iter().map(|c| c.to_string()).collect();
            node.synthesized = true;
            node.parent = Some(parent);
        }
        let siblings = &mut self.require_mut(parent)?.children;
        let slot = siblings
            .iter()
            .position(|c| *c == target)
            .ok_or(StageError::NotAChild {
                parent,
                anchor: target,
            })?;
        siblings[slot] = wrapper;
        self.require_mut(target)?.parent = Some(wrapper);
        self.require_mut(wrapper)?.children.push(target);
        Ok(wrapper)
    }

    /// Deep-copy a subtree from another stage under `parent`, allocating fresh
    /// local ids. Source ids never leak into this stage.
    pub fn adopt_subtree(
        &mut self,
        src: &Stage,
        src_node: NodeId,
        parent: NodeId,
    ) -> Result<NodeId, StageError> {
        self.require(parent)?;
        let copied = self.copy_from(src, src_node)?;
        self.append(parent, copied)?;
        Ok(copied)
    }

    fn copy_from(&mut self, src: &Stage, src_node: NodeId) -> Result<NodeId, StageError> {
        let from = src.node(src_node).ok_or(StageError::UnknownNode(src_node))?;
        let id = self.create(from.tag.clone());
        if let Some(node) = self.node_mut(id) {
            node.classes = from.classes.clone();
            node.attrs = from.attrs.clone();
            node.text = from.text.clone();
            node.style = from.style.clone();
            node.rect = from.rect;
            node.synthesized = from.synthesized;
        }
        let src_children: Vec<NodeId> = from.children.clone();
        for child in src_children {
            let copied = self.copy_from(src, child)?;
            self.append(id, copied)?;
        }
        Ok(id)
    }

    // ---- traversal -------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.node(id).map(|n| n.children.as_slice())
    }

    /// Preorder walk of `id`'s subtree, including `id` itself.
    pub fn walk(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(node) = self.node(cur) else { continue };
            out.push(cur);
            for child in node.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Ancestors of `id`, closest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.parent(id);
        while let Some(p) = cur {
            out.push(p);
            cur = self.parent(p);
        }
        out
    }

    // ---- content ---------------------------------------------------------

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| n.text.as_deref())
    }

    pub fn set_text(&mut self, id: NodeId, text: Option<String>) -> Result<(), StageError> {
        self.require_mut(id)?.text = text;
        Ok(())
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).map(|n| n.has_class(class)).unwrap_or(false)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), StageError> {
        let node = self.require_mut(id)?;
        if !node.has_class(class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), StageError> {
        self.require_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).and_then(|n| n.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), StageError> {
        self.require_mut(id)?
            .attrs
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<(), StageError> {
        self.require_mut(id)?.attrs.remove(name);
        Ok(())
    }

    // ---- style and geometry ----------------------------------------------

    pub fn prop(&self, id: NodeId, prop: Prop) -> Option<PropValue> {
        self.node(id).and_then(|n| n.style.get(prop))
    }

    /// Resolved numeric value of `prop`, with the prop's default when unset or
    /// the node is gone.
    pub fn number(&self, id: NodeId, prop: Prop) -> f32 {
        self.node(id)
            .map(|n| n.style.number(prop))
            .unwrap_or_else(|| prop.default_value().as_number().unwrap_or(0.0))
    }

    pub fn set_prop(
        &mut self,
        id: NodeId,
        prop: Prop,
        value: PropValue,
    ) -> Result<(), StageError> {
        self.require_mut(id)?.style.set(prop, value);
        Ok(())
    }

    pub fn clear_prop(&mut self, id: NodeId, prop: Prop) -> Result<(), StageError> {
        self.require_mut(id)?.style.clear(prop);
        Ok(())
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(|n| n.rect)
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect) -> Result<(), StageError> {
        self.require_mut(id)?.rect = rect;
        Ok(())
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> (Stage, NodeId, NodeId, NodeId) {
        let mut stage = Stage::new();
        let root = stage.root();
        let section = stage.create_with(root, "div", &["section"]).unwrap();
        let a = stage.create_with(section, "div", &["card"]).unwrap();
        let b = stage.create_with(section, "div", &["card"]).unwrap();
        (stage, section, a, b)
    }

    #[test]
    fn create_in_links_parent_and_child() {
        let (stage, section, a, _) = small_tree();
        assert_eq!(stage.parent(a), Some(section));
        assert!(stage.children(section).unwrap().contains(&a));
    }

    #[test]
    fn insert_before_orders_siblings() {
        let (mut stage, section, a, b) = small_tree();
        let c = stage.create("div");
        stage.insert_before(section, c, b).unwrap();
        assert_eq!(stage.children(section).unwrap(), &[a, c, b]);
    }

    #[test]
    fn wrap_takes_the_targets_slot() {
        let (mut stage, section, a, b) = small_tree();
        let wrapper = stage.wrap(a, "div", &["mask"]).unwrap();
        assert_eq!(stage.children(section).unwrap(), &[wrapper, b]);
        assert_eq!(stage.children(wrapper).unwrap(), &[a]);
        assert_eq!(stage.parent(a), Some(wrapper));
        assert!(stage.node(wrapper).unwrap().synthesized);
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let (mut stage, section, a, b) = small_tree();
        let inner = stage.create_in(a, "span").unwrap();
        stage.remove_subtree(a).unwrap();
        assert!(!stage.contains(a));
        assert!(!stage.contains(inner));
        assert!(stage.contains(b));
        assert_eq!(stage.children(section).unwrap(), &[b]);
    }

    #[test]
    fn append_rejects_cycles() {
        let (mut stage, section, a, _) = small_tree();
        let err = stage.append(a, section).unwrap_err();
        assert_eq!(
            err,
            StageError::Cycle {
                parent: a,
                child: section
            }
        );
    }

    #[test]
    fn root_cannot_be_removed() {
        let mut stage = Stage::new();
        let root = stage.root();
        assert_eq!(stage.remove_subtree(root), Err(StageError::RootImmutable));
        assert_eq!(stage.detach(root), Err(StageError::RootImmutable));
    }

    #[test]
    fn adopt_subtree_allocates_fresh_ids() {
        let (mut stage, _, _, _) = small_tree();
        let mut other = Stage::new();
        let other_root = other.root();
        let donor = other.create_with(other_root, "div", &["page"]).unwrap();
        let donor_child = other.create_in(donor, "p").unwrap();
        other
            .set_text(donor_child, Some("hello".to_string()))
            .unwrap();

        let adopted = stage.adopt_subtree(&other, donor, stage.root()).unwrap();
        assert_ne!(adopted, donor);
        assert!(stage.has_class(adopted, "page"));
        let copied_child = stage.children(adopted).unwrap()[0];
        assert_eq!(stage.text(copied_child), Some("hello"));
        assert!(other.contains(donor));
    }

    #[test]
    fn walk_is_preorder() {
        let (mut stage, section, a, b) = small_tree();
        let inner = stage.create_in(a, "span").unwrap();
        assert_eq!(stage.walk(section), vec![section, a, inner, b]);
    }

    #[test]
    fn style_defaults_apply_to_missing_nodes() {
        let stage = Stage::new();
        assert_eq!(stage.number(NodeId(999), Prop::Opacity), 1.0);
        assert_eq!(stage.prop(NodeId(999), Prop::Opacity), None);
    }
}
