//! limen-stage-core: retained element stage (core, host-agnostic)

pub mod error;
pub mod geometry;
pub mod ids;
pub mod selector;
pub mod stage;
pub mod style;

pub use error::StageError;
pub use geometry::{Rect, Viewport};
pub use ids::{IdAllocator, NodeId};
pub use selector::{Selector, SelectorList, SelectorSet};
pub use stage::{Node, Stage};
pub use style::{Display, Overflow, PointerEvents, Position, Prop, PropValue, StyleMap};
