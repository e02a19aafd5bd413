//! DOM Tree (arena-based allocation)
//!
//! Removed nodes are unlinked but keep their arena slot, so a `NodeId`
//! held by a caller stays resolvable after the node leaves the document.

use crate::{DomError, DomResult, ElementData, Node, NodeData, NodeId, NodeType, SelectorList};

/// Arena-based DOM tree
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn node(&self, id: NodeId) -> DomResult<&Node> {
        self.get(id).ok_or(DomError::NotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.get_mut(id).ok_or(DomError::NotFound(id))
    }

    /// Create a detached element
    pub fn create_element(&mut self, local_name: &str) -> NodeId {
        self.push(Node::element(local_name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    /// Create a detached doctype
    pub fn create_doctype(&mut self, name: &str) -> NodeId {
        self.push(Node::doctype(name))
    }

    /// Element data for a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    /// Mutable element data for a node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id)?.as_element_mut()
    }

    /// Element data, or `NotAnElement`
    pub fn require_element(&self, id: NodeId) -> DomResult<&ElementData> {
        self.node(id)?.as_element().ok_or(DomError::NotAnElement(id))
    }

    /// Mutable element data, or `NotAnElement`
    pub fn require_element_mut(&mut self, id: NodeId) -> DomResult<&mut ElementData> {
        self.node_mut(id)?.as_element_mut().ok_or(DomError::NotAnElement(id))
    }

    /// `nodeType` of a node
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.get(id).map(Node::node_type)
    }

    /// Parent node (`parentNode`)
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(NodeId::is_valid)
    }

    /// Parent element (`parentElement`)
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|p| self.element(*p).is_some())
    }

    /// Iterate over the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Element children of a node
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|(_, n)| n.is_element()).map(|(id, _)| id)
    }

    /// Iterate over ancestors, nearest first (exclusive)
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Pre-order iterator over the descendants of a node (exclusive)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Descendants { tree: self, root: id, next }
    }

    /// Inclusive containment check (`Node.contains`)
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether a node is attached to the document
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(NodeId::ROOT, id)
    }

    /// First element child of the document (`documentElement`)
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<()> {
        if !self.node(parent)?.can_have_children() || self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if self.node(child)?.node_type() == NodeType::Document {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child);

        let last = self.node(parent)?.last_child;
        {
            let node = self.node_mut(child)?;
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.node_mut(last)?.next_sibling = child;
        } else {
            self.node_mut(parent)?.first_child = child;
        }
        self.node_mut(parent)?.last_child = child;
        Ok(())
    }

    /// Remove `child` from `parent` (`removeChild`)
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.node(child)?.parent != parent {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(child)
    }

    /// Remove every child of a node
    pub fn remove_children(&mut self, id: NodeId) -> DomResult<()> {
        let children: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        for child in children {
            self.detach(child);
        }
        Ok(())
    }

    /// Unlink a node from its parent and siblings
    fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let node = &mut self.nodes[id.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// `textContent` getter
    ///
    /// Returns `None` for the document and doctype, like the DOM does.
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        let node = self.get(id)?;
        match &node.data {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text.clone()),
            NodeData::Element(_) => Some(
                self.descendants(id)
                    .filter_map(|d| self.get(d).and_then(Node::as_text))
                    .collect(),
            ),
            NodeData::Document | NodeData::Doctype { .. } => None,
        }
    }

    /// `textContent` setter
    ///
    /// Replaces all children with a single text node; markup in `text` is
    /// kept as literal characters.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> DomResult<()> {
        match self.node(id)?.node_type() {
            NodeType::Text | NodeType::Comment => {
                if let NodeData::Text(content) | NodeData::Comment(content) =
                    &mut self.node_mut(id)?.data
                {
                    *content = text.to_string();
                }
                Ok(())
            }
            NodeType::Element => {
                self.remove_children(id)?;
                if !text.is_empty() {
                    let text_node = self.create_text(text);
                    self.append_child(id, text_node)?;
                }
                Ok(())
            }
            NodeType::Document | NodeType::DocumentType => Ok(()),
        }
    }

    /// Elements under `root` matching `selector`, in document order (`querySelectorAll`)
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(root)
            .filter(|&id| list.matches(self, id))
            .collect())
    }

    /// First element under `root` matching `selector` (`querySelector`)
    pub fn query_selector(&self, root: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        Ok(self.descendants(root).find(|&id| list.matches(self, id)))
    }

    /// Element.matches
    pub fn matches(&self, id: NodeId, selector: &str) -> DomResult<bool> {
        let list = SelectorList::parse(selector)?;
        Ok(list.matches(self, id))
    }

    /// Native Element.closest: inclusive walk through parent elements
    ///
    /// Works on detached subtrees as well.
    pub fn closest(&self, id: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        let list = SelectorList::parse(selector)?;
        let mut cursor = self.element(id).map(|_| id);
        while let Some(current) = cursor {
            if list.matches(self, current) {
                return Ok(Some(current));
            }
            cursor = self.parent_element(current);
        }
        Ok(None)
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Child iterator, yielding `(id, node)` pairs
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order descendant iterator
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else {
                    break NodeId::NONE;
                };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
                if !cursor.is_valid() || cursor == self.root {
                    break NodeId::NONE;
                }
            }
        };

        Some(current)
    }
}
