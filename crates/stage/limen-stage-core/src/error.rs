//! Error types for stage mutation and selector parsing.

use crate::ids::NodeId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StageError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("selector `{input}` is invalid: {reason}")]
    Selector { input: String, reason: String },

    #[error("appending {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    #[error("the stage root cannot be moved or removed")]
    RootImmutable,

    #[error("{anchor:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, anchor: NodeId },
}

impl StageError {
    pub fn selector(input: impl Into<String>, reason: impl Into<String>) -> Self {
        StageError::Selector {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
