//! HTML5 Parser implementation
//!
//! Uses html5ever's build-in RcDom and converts to our DOM format.
//! Fragments go through html5ever's fragment parser with the target element
//! as context, the way `innerHTML` does.

use dquery_dom::{Document, DomResult, DomTree, NodeId};
use html5ever::tendril::TendrilSink;
use html5ever::{Attribute, LocalName, QualName, ns, parse_document};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> DomResult<Document> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a base URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> DomResult<Document> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut document = Document::empty(url);
        self.convert_children(&dom.document, document.tree_mut(), NodeId::ROOT)?;

        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Parse markup as the children of `context` (`innerHTML` parsing)
    ///
    /// The context element's name and attributes select the insertion mode,
    /// so `<tr>` under a `<tbody>` survives and leading whitespace is kept.
    /// The returned nodes are detached and owned by `tree`.
    pub fn parse_fragment(&self, tree: &mut DomTree, context: NodeId, markup: &str) -> DomResult<Vec<NodeId>> {
        let elem = tree.require_element(context)?;
        let context_name = QualName::new(None, ns!(html), LocalName::from(elem.local_name.as_str()));
        let context_attrs = elem
            .attrs
            .iter()
            .map(|attr| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr.name.as_str())),
                value: attr.value.clone().into(),
            })
            .collect();

        let dom = html5ever::parse_fragment(
            RcDom::default(),
            Default::default(),
            context_name,
            context_attrs,
            false,
        )
        .one(markup);

        // The fragment's nodes hang off a synthetic <html> root
        let mut nodes = Vec::new();
        for root in dom.document.children.borrow().iter() {
            for child in root.children.borrow().iter() {
                if let Some(id) = self.convert_node(child, tree)? {
                    nodes.push(id);
                }
            }
        }

        tracing::trace!(count = nodes.len(), "parsed fragment");
        Ok(nodes)
    }

    fn convert_children(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> DomResult<()> {
        for child in handle.children.borrow().iter() {
            if let Some(id) = self.convert_node(child, tree)? {
                tree.append_child(parent, id)?;
            }
        }
        Ok(())
    }

    /// Convert an RcDom node (and its subtree) to a detached node in `tree`
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree) -> DomResult<Option<NodeId>> {
        let id = match &handle.data {
            RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return Ok(None),
            RcNodeData::Doctype { name, .. } => tree.create_doctype(name),
            RcNodeData::Text { contents } => tree.create_text(&contents.borrow()),
            RcNodeData::Comment { contents } => tree.create_comment(contents),
            RcNodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let id = tree.create_element(&name.local);
                if let Some(elem) = tree.element_mut(id) {
                    for attr in attrs.borrow().iter() {
                        elem.set_attr(&attr.name.local, attr.value.to_string());
                    }
                }

                // <template> keeps its children in a separate fragment
                let template = template_contents.borrow().clone();
                self.convert_children(template.as_ref().unwrap_or(handle), tree, id)?;
                id
            }
        };
        Ok(Some(id))
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html).unwrap();

        assert_eq!(doc.title(), "Test");
        assert!(doc.body().is_some());
    }

    fn context(tree: &mut DomTree, name: &str) -> NodeId {
        tree.create_element(name)
    }

    #[test]
    fn test_parse_fragment_is_detached() {
        let mut tree = DomTree::new();
        let div = context(&mut tree, "div");
        let nodes = HtmlParser::new()
            .parse_fragment(&mut tree, div, "<b>v</b> tail")
            .unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(tree.element(nodes[0]).unwrap().local_name, "b");
        assert_eq!(tree.get(nodes[1]).unwrap().as_text(), Some(" tail"));
        assert!(nodes.iter().all(|&n| tree.parent(n).is_none()));
    }

    #[test]
    fn test_parse_fragment_attributes() {
        let mut tree = DomTree::new();
        let div = context(&mut tree, "div");
        let nodes = HtmlParser::new()
            .parse_fragment(&mut tree, div, r#"<a href="/x" data-id="7">x</a>"#)
            .unwrap();

        let elem = tree.element(nodes[0]).unwrap();
        assert_eq!(elem.get_attr("href"), Some("/x"));
        assert_eq!(elem.get_attr("data-id"), Some("7"));
    }

    #[test]
    fn test_parse_fragment_uses_table_context() {
        let mut tree = DomTree::new();
        let tbody = context(&mut tree, "tbody");
        let nodes = HtmlParser::new()
            .parse_fragment(&mut tree, tbody, "<tr><td>x</td></tr>")
            .unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(tree.element(nodes[0]).unwrap().local_name, "tr");
        let td = tree.element_children(nodes[0]).next().unwrap();
        assert_eq!(tree.element(td).unwrap().local_name, "td");
    }

    #[test]
    fn test_parse_fragment_keeps_leading_whitespace() {
        let mut tree = DomTree::new();
        let p = context(&mut tree, "p");
        let nodes = HtmlParser::new()
            .parse_fragment(&mut tree, p, "  tail")
            .unwrap();

        assert_eq!(nodes.len(), 1);
        assert_eq!(tree.get(nodes[0]).unwrap().as_text(), Some("  tail"));
    }

    #[test]
    fn test_parse_fragment_needs_element_context() {
        let mut tree = DomTree::new();
        let text = tree.create_text("x");
        assert!(HtmlParser::new().parse_fragment(&mut tree, text, "<b>y</b>").is_err());
    }
}
