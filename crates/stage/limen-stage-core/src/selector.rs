//! Minimal CSS-style selector engine.
//!
//! Supports exactly the surface the behavior layer queries with: tag names,
//! class compounds (`.section.hero`), attribute tests (`[data-video-id]`,
//! `[tabindex=0]`), descendant chains separated by whitespace, and
//! comma-separated lists. Anything fancier is a parse error rather than a
//! silent mismatch.

use serde::{Deserialize, Serialize};

use crate::error::StageError;
use crate::ids::NodeId;
use crate::stage::{Node, Stage};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct AttrTest {
    name: String,
    value: Option<String>,
}

/// One whitespace-free simple selector: optional tag plus class/attr tests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if node.tag != *tag {
                return false;
            }
        }
        if !self.classes.iter().all(|c| node.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|test| {
            match (node.attr(&test.name), test.value.as_deref()) {
                (Some(found), Some(want)) => found == want,
                (Some(_), None) => true,
                (None, _) => false,
            }
        })
    }
}

/// A descendant chain. The last compound is the subject.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    compounds: Vec<Compound>,
}

impl Selector {
    /// True when `id` matches the subject and every earlier compound matches
    /// some ancestor, in order.
    pub fn matches(&self, stage: &Stage, id: NodeId) -> bool {
        let Some(node) = stage.node(id) else {
            return false;
        };
        let mut rest = self.compounds.iter().rev();
        let Some(subject) = rest.next() else {
            return false;
        };
        if !subject.matches(node) {
            return false;
        }
        let mut cursor = stage.parent(id);
        'chain: for compound in rest {
            while let Some(cur) = cursor {
                cursor = stage.parent(cur);
                if let Some(n) = stage.node(cur) {
                    if compound.matches(n) {
                        continue 'chain;
                    }
                }
            }
            return false;
        }
        true
    }
}

/// Comma-separated list of selectors. A node matches when any member does.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorList {
    selectors: Vec<Selector>,
}

impl SelectorList {
    /// List that matches nothing. Used for "no exclusions".
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn parse(input: &str) -> Result<Self, StageError> {
        if input.trim().is_empty() {
            return Err(StageError::selector(input, "empty selector"));
        }
        let mut selectors = Vec::new();
        for piece in input.split(',') {
            let piece = piece.trim();
            if piece.is_empty() {
                return Err(StageError::selector(input, "empty list member"));
            }
            let compounds = piece
                .split_whitespace()
                .map(|token| parse_compound(token, input))
                .collect::<Result<Vec<_>, _>>()?;
            selectors.push(Selector { compounds });
        }
        Ok(Self { selectors })
    }

    /// Parse several selector strings into one list.
    pub fn parse_all(inputs: &[&str]) -> Result<Self, StageError> {
        let mut selectors = Vec::new();
        for input in inputs {
            selectors.extend(Self::parse(input)?.selectors);
        }
        Ok(Self { selectors })
    }

    pub fn matches(&self, stage: &Stage, id: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(stage, id))
    }

    /// All matching descendants of `scope`, in document (preorder) order.
    /// `scope` itself is never a candidate.
    pub fn select_from(&self, stage: &Stage, scope: NodeId) -> Vec<NodeId> {
        stage
            .walk(scope)
            .into_iter()
            .skip(1)
            .filter(|id| self.matches(stage, *id))
            .collect()
    }

    pub fn select(&self, stage: &Stage) -> Vec<NodeId> {
        self.select_from(stage, stage.root())
    }

    pub fn first_from(&self, stage: &Stage, scope: NodeId) -> Option<NodeId> {
        stage
            .walk(scope)
            .into_iter()
            .skip(1)
            .find(|id| self.matches(stage, *id))
    }

    pub fn first(&self, stage: &Stage) -> Option<NodeId> {
        self.first_from(stage, stage.root())
    }
}

/// Include/exclude selector pair. Exclusions always win.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSet {
    pub include: SelectorList,
    pub exclude: SelectorList,
}

impl SelectorSet {
    pub fn parse(include: &str, exclude: &[&str]) -> Result<Self, StageError> {
        let include = SelectorList::parse(include)?;
        let exclude = if exclude.is_empty() {
            SelectorList::empty()
        } else {
            SelectorList::parse_all(exclude)?
        };
        Ok(Self { include, exclude })
    }

    pub fn select_from(&self, stage: &Stage, scope: NodeId) -> Vec<NodeId> {
        self.include
            .select_from(stage, scope)
            .into_iter()
            .filter(|id| !self.exclude.matches(stage, *id))
            .collect()
    }

    pub fn select(&self, stage: &Stage) -> Vec<NodeId> {
        self.select_from(stage, stage.root())
    }
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(token: &str, input: &str) -> Result<Compound, StageError> {
    let chars: Vec<char> = token.chars().collect();
    let mut i = 0;
    let mut tag = None;
    let mut classes = Vec::new();
    let mut attrs = Vec::new();

    if i < chars.len() && chars[i] != '.' && chars[i] != '[' {
        let start = i;
        while i < chars.len() && is_ident(chars[i]) {
            i += 1;
        }
        if start == i {
            return Err(StageError::selector(
                input,
                format!("unexpected `{}`", chars[i]),
            ));
        }
        tag = Some(chars[start..i].iter().collect());
    }

    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                let start = i;
                while i < chars.len() && is_ident(chars[i]) {
                    i += 1;
                }
                if start == i {
                    return Err(StageError::selector(input, "empty class name"));
                }
                classes.push(chars[start..i].iter().collect());
            }
            '[' => {
                i += 1;
                let start = i;
                while i < chars.len() && chars[i] != '=' && chars[i] != ']' {
                    i += 1;
                }
                if i == chars.len() {
                    return Err(StageError::selector(input, "unclosed attribute test"));
                }
                let name: String = chars[start..i].iter().collect();
                if name.is_empty() {
                    return Err(StageError::selector(input, "empty attribute name"));
                }
                let value = if chars[i] == '=' {
                    i += 1;
                    let vstart = i;
                    while i < chars.len() && chars[i] != ']' {
                        i += 1;
                    }
                    if i == chars.len() {
                        return Err(StageError::selector(input, "unclosed attribute test"));
                    }
                    let raw: String = chars[vstart..i].iter().collect();
                    Some(raw.trim_matches(|c| c == '"' || c == '\'').to_string())
                } else {
                    None
                };
                i += 1; // consume ']'
                attrs.push(AttrTest { name, value });
            }
            other => {
                return Err(StageError::selector(input, format!("unexpected `{other}`")));
            }
        }
    }

    Ok(Compound { tag, classes, attrs })
}
