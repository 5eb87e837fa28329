//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::forest::NodeId;
use crate::domain::store::Boundary;

/// Errors raised by the nesting engine, the position resolver and the stores.
///
/// Every error is local to the call that produced it. A cascade that fails
/// halfway is not rolled back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NestError {
    #[error("tried to use property `{0}` before value was set")]
    UnsetProperty(Boundary),

    #[error("left value can not equal the maximum boundary ({})", i64::MAX)]
    MaxBoundary,

    #[error("right value must be greater than left value (left {left}, right {right})")]
    InvalidRange { left: i64, right: i64 },

    #[error("unknown string value `{0}` given for position")]
    InvalidPosition(String),

    #[error("expected position to be a string or an integer but was given {0} instead")]
    InvalidArgumentKind(String),

    #[error("no descendant found at {0}")]
    NotFound(String),

    #[error("storage is not bound to an element")]
    UnboundStorage,

    #[error("nesting arithmetic overflowed")]
    Overflow,

    #[error("attribute `{name}` holds a non-integer value: {value:?}")]
    MalformedAttribute { name: String, value: String },

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("node already has an ancestor: {0}")]
    AlreadyAttached(NodeId),

    #[error("attempt to make a node the ancestor of itself")]
    AncestorDescendantLoop,

    #[error("node listed more than once in descendants: {0}")]
    DuplicateDescendant(NodeId),

    #[error("unknown sort order `{0}`, expected `asc` or `desc`")]
    InvalidSortOrder(String),

    #[error("nesting violation at {node}: {reason}")]
    Violation { node: NodeId, reason: String },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for nesting operations.
pub type NestResult<T> = Result<T, NestError>;
