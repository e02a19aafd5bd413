//! dQuery DOM - Document Object Model
//!
//! Arena-backed document tree with selector matching, inline style and
//! class token helpers, and the event types the selection wrapper binds to.

mod node;
mod tree;
mod document;
mod classlist;
mod style;
mod selectors;
mod features;
pub mod events;
pub mod shim;

pub use node::{Node, NodeData, NodeType, ElementData, Attribute};
pub use tree::{DomTree, Children, Descendants};
pub use document::Document;
pub use classlist::{DOMTokenList, ClassEditor};
pub use style::{StyleDeclaration, normalize_property_name};
pub use selectors::{SelectorList, NthExpression};
pub use features::PlatformFeatures;
pub use events::{Event, EventPhase};
pub use shim::AncestorLookup;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID (the document node)
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this ID refers to a node
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} not found")]
    NotFound(NodeId),

    #[error("node {0:?} has no parent")]
    NoParent(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("hierarchy request error: cannot insert {child:?} into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("'{0}' is not a valid selector")]
    InvalidSelector(String),

    #[error("selection is empty")]
    EmptySelection,
}
