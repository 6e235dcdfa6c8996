//! Inline style model.
//!
//! Only the properties the motion layer actually drives are modeled. Numeric
//! properties are interpolated by tweens; the discrete ones (display, overflow,
//! pointer-events, position) step at tween boundaries instead.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// A style property a node can carry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Prop {
    /// 0.0 (transparent) to 1.0 (opaque).
    Opacity,
    /// Horizontal offset as a percentage of the node's own width.
    TranslateXPct,
    /// Vertical offset as a percentage of the node's own height.
    TranslateYPct,
    /// Horizontal offset in pixels.
    TranslateXPx,
    /// Vertical offset in pixels.
    TranslateYPx,
    /// Uniform scale factor.
    Scale,
    /// Horizontal-only scale factor.
    ScaleX,
    /// Width as a percentage of the layout width.
    WidthPct,
    /// Height as a percentage of the layout height.
    HeightPct,
    /// Stroke dash offset in pixels, for perimeter reveals.
    DashOffset,
    /// Backdrop blur radius in pixels.
    BlurPx,
    Display,
    Overflow,
    Position,
    PointerEvents,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Display {
    None,
    Block,
    Flex,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Overflow {
    Visible,
    Hidden,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Position {
    Static,
    Relative,
    Absolute,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PointerEvents {
    Auto,
    None,
}

/// Value carried by a [`Prop`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    Number(f32),
    Display(Display),
    Overflow(Overflow),
    Position(Position),
    Pointer(PointerEvents),
}

impl PropValue {
    #[inline]
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f32> for PropValue {
    fn from(v: f32) -> Self {
        PropValue::Number(v)
    }
}

impl Prop {
    /// The value a node is treated as having when the prop was never set.
    pub fn default_value(self) -> PropValue {
        match self {
            Prop::Opacity => PropValue::Number(1.0),
            Prop::TranslateXPct
            | Prop::TranslateYPct
            | Prop::TranslateXPx
            | Prop::TranslateYPx
            | Prop::DashOffset
            | Prop::BlurPx => PropValue::Number(0.0),
            Prop::Scale | Prop::ScaleX => PropValue::Number(1.0),
            Prop::WidthPct | Prop::HeightPct => PropValue::Number(100.0),
            Prop::Display => PropValue::Display(Display::Block),
            Prop::Overflow => PropValue::Overflow(Overflow::Visible),
            Prop::Position => PropValue::Position(Position::Static),
            Prop::PointerEvents => PropValue::Pointer(PointerEvents::Auto),
        }
    }
}

/// Sparse per-node style store. Unset props resolve to their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StyleMap {
    props: HashMap<Prop, PropValue>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, prop: Prop) -> Option<PropValue> {
        self.props.get(&prop).copied()
    }

    /// Resolved value, falling back to the prop's default.
    pub fn resolve(&self, prop: Prop) -> PropValue {
        self.get(prop).unwrap_or_else(|| prop.default_value())
    }

    /// Resolved numeric value. Zero for discrete props, which callers never
    /// tween.
    pub fn number(&self, prop: Prop) -> f32 {
        self.resolve(prop).as_number().unwrap_or(0.0)
    }

    pub fn set(&mut self, prop: Prop, value: PropValue) {
        self.props.insert(prop, value);
    }

    pub fn clear(&mut self, prop: Prop) {
        self.props.remove(&prop);
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Prop, PropValue)> + '_ {
        self.props.iter().map(|(p, v)| (*p, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_props_resolve_to_defaults() {
        let style = StyleMap::new();
        assert_eq!(style.number(Prop::Opacity), 1.0);
        assert_eq!(style.number(Prop::TranslateYPct), 0.0);
        assert_eq!(style.number(Prop::WidthPct), 100.0);
        assert_eq!(
            style.resolve(Prop::Display),
            PropValue::Display(Display::Block)
        );
    }

    #[test]
    fn set_then_resolve_round_trips() {
        let mut style = StyleMap::new();
        style.set(Prop::Opacity, PropValue::Number(0.25));
        style.set(Prop::Display, PropValue::Display(Display::Flex));
        assert_eq!(style.number(Prop::Opacity), 0.25);
        assert_eq!(
            style.resolve(Prop::Display),
            PropValue::Display(Display::Flex)
        );
        style.clear(Prop::Opacity);
        assert_eq!(style.number(Prop::Opacity), 1.0);
    }
}
