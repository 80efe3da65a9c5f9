use folio_types::GeometryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Node handle {0} is stale or was never allocated.")]
    InvalidNode(NodeId),
    #[error("Node {0} is not a box.")]
    NotABox(NodeId),
    #[error("Node kind '{0}' cannot hold children.")]
    NotABoxKind(&'static str),
    #[error("Node {0} is not a logical page.")]
    NotALogicalPage(NodeId),
    #[error("Box {0} is closed and cannot accept new content.")]
    BoxClosed(NodeId),
    #[error("Box {0} has already been closed.")]
    DoubleClose(NodeId),
    #[error("Node {0} is frozen and cannot be modified.")]
    Frozen(NodeId),
    #[error("Node {child} is not a child of box {parent}.")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("Node {0} is already attached to a parent.")]
    AlreadyAttached(NodeId),
    #[error("Node {0} is still attached and cannot be discarded.")]
    StillAttached(NodeId),
    #[error("Adding {child} to {parent} would make a node its own ancestor.")]
    CycleDetected { parent: NodeId, child: NodeId },
    #[error("The {property} must not be negative, got {value}.")]
    NegativeDimension { property: &'static str, value: i64 },
    #[error("Height extension must not be negative, got {0}.")]
    NegativeExtension(i64),
    #[error("The {counter} of box {node} would drop below its floor.")]
    CounterUnderflow { node: NodeId, counter: &'static str },
    #[error("Counter drift on box {node}: recorded {recorded} descendants, counted {actual}.")]
    CounterDrift {
        node: NodeId,
        recorded: usize,
        actual: usize,
    },
    #[error("A {parent} box must not contain a {child} node directly; wrap it in a paragraph.")]
    InvalidNesting {
        parent: &'static str,
        child: &'static str,
    },
    #[error("Break position {position} is before the last recorded break {last}.")]
    NonMonotonicBreak { position: i64, last: i64 },
    #[error("Position {0} is not a recorded page boundary.")]
    NotAPageBoundary(i64),
    #[error("The page starting at {0} has no recorded end yet.")]
    OpenPage(i64),
    #[error("Logical page {0} has lost its content area.")]
    MissingContentArea(NodeId),
    #[error("Invalid page range: offset {offset} is after the end {end}.")]
    InvalidPageRange { offset: i64, end: i64 },
    #[error("Invalid page geometry: {0}")]
    Geometry(#[from] GeometryError),
}

impl LayoutError {
    /// Argument errors reject a bad input value; every other variant reports a tree whose
    /// state does not allow the operation.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            LayoutError::NegativeDimension { .. }
                | LayoutError::NegativeExtension(_)
                | LayoutError::NonMonotonicBreak { .. }
                | LayoutError::InvalidPageRange { .. }
                | LayoutError::Geometry(_)
        )
    }
}

pub mod algorithms;
pub mod box_definition;
pub mod config;
pub mod node_kind;
pub mod page;
pub mod tree;

pub use self::algorithms::page_breaks::PageBreakPositionList;
pub use self::box_definition::{BoxDefinition, Edges};
pub use self::config::{BreakListTuning, DebugOptions, LayoutConfig};
pub use self::node_kind::{ExtendPolicy, NodeKind, PageAreaKind};
pub use self::page::{LogicalPageData, PageAreas, PageGrid, PhysicalPageBox};
pub use self::tree::{
    Attachment, BoxSnapshot, CacheState, LeafContent, NodeId, RenderBox, RenderNode, RenderTree,
};

#[cfg(test)]
mod test_utils;
