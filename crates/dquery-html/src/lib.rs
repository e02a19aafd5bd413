//! dQuery HTML Parser
//!
//! HTML5 parsing built on html5ever, plus the serializer behind
//! `innerHTML`/`outerHTML`.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::HtmlSerializer;

use dquery_dom::{Document, DomResult, DomTree, NodeId};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> DomResult<Document> {
    HtmlParser::new().parse(html)
}

/// `innerHTML` getter
pub fn inner_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node)
}

/// `outerHTML` getter
pub fn outer_html(tree: &DomTree, node: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node)
}

/// `innerHTML` setter: replace the children of `node` with parsed markup
pub fn set_inner_html(tree: &mut DomTree, node: NodeId, markup: &str) -> DomResult<()> {
    let nodes = HtmlParser::new().parse_fragment(tree, node, markup)?;
    tree.remove_children(node)?;
    for child in nodes {
        tree.append_child(node, child)?;
    }
    Ok(())
}

/// `insertAdjacentHTML("beforeend", markup)`: append parsed markup as last children
pub fn append_html(tree: &mut DomTree, node: NodeId, markup: &str) -> DomResult<()> {
    let nodes = HtmlParser::new().parse_fragment(tree, node, markup)?;
    for child in nodes {
        tree.append_child(node, child)?;
    }
    Ok(())
}
