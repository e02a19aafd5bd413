//! Ancestor lookup (`Element.closest`)
//!
//! When the platform has a native `closest` it is used as-is. Otherwise a
//! manual walk is installed that only searches elements attached to the
//! document and stops at the first non-element ancestor.

use crate::{DomResult, DomTree, NodeId, NodeType, PlatformFeatures, SelectorList};

/// Ancestor lookup strategy, chosen once per page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorLookup {
    /// Platform `Element.closest`
    Native,
    /// Parent walk used when `closest` is missing
    Walk,
}

impl AncestorLookup {
    /// Install the lookup for a platform, keeping the native one when present
    pub fn install(features: &PlatformFeatures) -> Self {
        let lookup = if features.native_closest {
            Self::Native
        } else {
            Self::Walk
        };
        tracing::debug!(?lookup, "ancestor lookup installed");
        lookup
    }

    /// `Element.matches`
    pub fn matches(&self, tree: &DomTree, element: NodeId, selector: &str) -> DomResult<bool> {
        tree.matches(element, selector)
    }

    /// First inclusive ancestor of `element` matching `selector`
    pub fn closest(
        &self,
        tree: &DomTree,
        element: NodeId,
        selector: &str,
    ) -> DomResult<Option<NodeId>> {
        match self {
            Self::Native => tree.closest(element, selector),
            Self::Walk => walk_closest(tree, element, selector),
        }
    }
}

/// Detached elements yield `None` before the selector is looked at, so an
/// invalid selector only errors for attached elements.
fn walk_closest(tree: &DomTree, element: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
    let attached = tree
        .document_element()
        .is_some_and(|root| tree.contains(root, element));
    if !attached {
        return Ok(None);
    }

    let list = SelectorList::parse(selector)?;

    let mut cursor = Some(element);
    while let Some(current) = cursor {
        if list.matches(tree, current) {
            return Ok(Some(current));
        }
        cursor = tree
            .parent_element(current)
            .or_else(|| tree.parent(current))
            .filter(|&p| tree.node_type(p) == Some(NodeType::Element));
    }
    Ok(None)
}
