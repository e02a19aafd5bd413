//! Comprehensive tests for dquery-dom
//!
//! Tree building, selector matching, inline style, class editing and the
//! ancestor lookup strategies.

use dquery_dom::{
    AncestorLookup, ClassEditor, DOMTokenList, Document, DomError, DomTree, NodeId, NodeType,
    NthExpression, PlatformFeatures, SelectorList, StyleDeclaration, normalize_property_name,
};

/// <html><body><nav id="nav" class="menu"><a class="btn primary">a</a><a class="btn">b</a></nav><p>t</p></body></html>
fn build_page() -> (Document, NodeId, NodeId, NodeId, NodeId) {
    let mut doc = Document::new("about:blank");
    let body = doc.body().unwrap();
    let tree = doc.tree_mut();

    let nav = tree.create_element("nav");
    tree.element_mut(nav).unwrap().set_attr("id", "nav");
    tree.element_mut(nav).unwrap().set_attr("class", "menu");
    tree.append_child(body, nav).unwrap();

    let a1 = tree.create_element("a");
    tree.element_mut(a1).unwrap().set_attr("class", "btn primary");
    tree.append_child(nav, a1).unwrap();
    let t1 = tree.create_text("a");
    tree.append_child(a1, t1).unwrap();

    let a2 = tree.create_element("a");
    tree.element_mut(a2).unwrap().set_attr("class", "btn");
    tree.append_child(nav, a2).unwrap();

    let p = tree.create_element("p");
    tree.append_child(body, p).unwrap();
    let t2 = tree.create_text("t");
    tree.append_child(p, t2).unwrap();

    (doc, nav, a1, a2, p)
}

// ============================================================================
// TREE
// ============================================================================

#[test]
fn test_document_skeleton() {
    let doc = Document::new("https://example.com/");
    let html = doc.document_element().unwrap();

    assert_eq!(doc.url(), "https://example.com/");
    assert_eq!(doc.tree().element(html).unwrap().local_name, "html");
    assert_eq!(doc.tree().parent(doc.head().unwrap()), Some(html));
    assert_eq!(doc.tree().parent(doc.body().unwrap()), Some(html));
    assert_eq!(doc.tree().node_type(NodeId::ROOT), Some(NodeType::Document));
}

#[test]
fn test_ancestors_reach_document() {
    let (doc, nav, a1, _, _) = build_page();
    let ancestors: Vec<_> = doc.tree().ancestors(a1).collect();

    assert_eq!(ancestors.first(), Some(&nav));
    assert_eq!(ancestors.last(), Some(&NodeId::ROOT));
    assert!(doc.tree().is_connected(a1));
}

#[test]
fn test_remove_detaches_subtree() {
    let (mut doc, nav, a1, _, _) = build_page();
    let body = doc.body().unwrap();

    doc.tree_mut().remove_child(body, nav).unwrap();
    assert!(!doc.tree().is_connected(nav));
    assert!(!doc.tree().is_connected(a1));
    assert_eq!(doc.tree().parent(a1), Some(nav));
}

#[test]
fn test_remove_child_wrong_parent() {
    let (mut doc, nav, _, _, p) = build_page();
    assert_eq!(
        doc.tree_mut().remove_child(nav, p),
        Err(DomError::NotAChild { parent: nav, child: p })
    );
}

#[test]
fn test_append_into_own_subtree_rejected() {
    let (mut doc, nav, a1, _, _) = build_page();
    assert_eq!(
        doc.tree_mut().append_child(a1, nav),
        Err(DomError::HierarchyRequest { parent: a1, child: nav })
    );
}

#[test]
fn test_text_content_concatenates() {
    let (mut doc, nav, ..) = build_page();
    assert_eq!(doc.tree().text_content(nav).as_deref(), Some("a"));

    doc.tree_mut().set_text_content(nav, "<b>x</b>").unwrap();
    assert_eq!(doc.tree().children(nav).count(), 1);
    assert_eq!(doc.tree().text_content(nav).as_deref(), Some("<b>x</b>"));
    assert_eq!(doc.tree().text_content(NodeId::ROOT), None);
}

#[test]
fn test_set_text_content_empty_clears() {
    let (mut doc, nav, ..) = build_page();
    doc.tree_mut().set_text_content(nav, "").unwrap();
    assert_eq!(doc.tree().children(nav).count(), 0);
}

// ============================================================================
// SELECTORS
// ============================================================================

#[test]
fn test_query_selector_all_document_order() {
    let (doc, nav, a1, a2, p) = build_page();
    let tree = doc.tree();

    assert_eq!(tree.query_selector_all(NodeId::ROOT, ".btn").unwrap(), vec![a1, a2]);
    assert_eq!(tree.query_selector_all(NodeId::ROOT, "p, #nav").unwrap(), vec![nav, p]);
    assert_eq!(tree.query_selector(NodeId::ROOT, "nav > .btn").unwrap(), Some(a1));
    assert!(tree.query_selector_all(NodeId::ROOT, ".missing").unwrap().is_empty());
}

#[test]
fn test_compound_and_combinators() {
    let (doc, nav, a1, a2, p) = build_page();
    let tree = doc.tree();

    assert!(tree.matches(a1, "a.btn.primary").unwrap());
    assert!(!tree.matches(a2, "a.btn.primary").unwrap());
    assert!(tree.matches(a2, ".primary + .btn").unwrap());
    assert!(tree.matches(a2, ".primary ~ a").unwrap());
    assert!(tree.matches(p, "nav ~ p").unwrap());
    assert!(tree.matches(a1, "body .menu a").unwrap());
    assert!(!tree.matches(a1, "p a").unwrap());
    assert!(tree.matches(nav, "NAV#nav").unwrap());
}

#[test]
fn test_attribute_and_pseudo() {
    let (doc, nav, a1, a2, p) = build_page();
    let tree = doc.tree();

    assert!(tree.matches(a1, "[class~=primary]").unwrap());
    assert!(tree.matches(a1, "[class^=btn]").unwrap());
    assert!(tree.matches(nav, "[id=NAV i]").unwrap());
    assert!(tree.matches(a1, "a:first-child").unwrap());
    assert!(tree.matches(a2, "a:last-of-type").unwrap());
    assert!(tree.matches(a2, ":nth-child(2n)").unwrap());
    assert!(tree.matches(p, ":not(nav, a)").unwrap());
    assert!(tree.matches(a2, ":empty").unwrap());
    assert!(!tree.matches(p, ":empty").unwrap());
    assert!(tree.matches(doc.document_element().unwrap(), ":root").unwrap());
}

#[test]
fn test_invalid_selector_reports_text() {
    let tree = DomTree::new();
    for bad in ["", "a >", "..x", "a::before", "[x", ":hover", "#"] {
        assert_eq!(
            tree.query_selector_all(NodeId::ROOT, bad),
            Err(DomError::InvalidSelector(bad.to_string())),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn test_selector_list_from_str() {
    let list: SelectorList = "nav a, p".parse().unwrap();
    assert_eq!(list.to_string(), "nav a, p");
    assert_eq!(list.as_str(), "nav a, p");
}

#[test]
fn test_nth_expression() {
    let expr = NthExpression::parse("-n+3").unwrap();
    assert!(expr.matches(1));
    assert!(expr.matches(3));
    assert!(!expr.matches(4));
    assert!(NthExpression::parse("nope").is_none());
}

// ============================================================================
// ANCESTOR LOOKUP
// ============================================================================

#[test]
fn test_closest_both_strategies_agree_when_attached() {
    let (doc, nav, a1, _, _) = build_page();
    for lookup in [AncestorLookup::Native, AncestorLookup::Walk] {
        assert_eq!(lookup.closest(doc.tree(), a1, ".menu").unwrap(), Some(nav));
        assert_eq!(lookup.closest(doc.tree(), a1, ".btn").unwrap(), Some(a1));
        assert_eq!(lookup.closest(doc.tree(), a1, "p").unwrap(), None);
        assert!(lookup.matches(doc.tree(), a1, "a").unwrap());
    }
}

#[test]
fn test_closest_detached() {
    let mut tree = DomTree::new();
    let div = tree.create_element("div");
    let span = tree.create_element("span");
    tree.append_child(div, span).unwrap();

    assert_eq!(AncestorLookup::Native.closest(&tree, span, "div").unwrap(), Some(div));
    assert_eq!(AncestorLookup::Walk.closest(&tree, span, "div").unwrap(), None);
}

#[test]
fn test_closest_invalid_selector_errors() {
    let (doc, _, a1, _, _) = build_page();
    for lookup in [AncestorLookup::Native, AncestorLookup::Walk] {
        assert!(matches!(
            lookup.closest(doc.tree(), a1, "a >"),
            Err(DomError::InvalidSelector(_))
        ));
    }
}

#[test]
fn test_install_strategy() {
    assert_eq!(AncestorLookup::install(&PlatformFeatures::default()), AncestorLookup::Native);
    assert_eq!(AncestorLookup::install(&PlatformFeatures::legacy()), AncestorLookup::Walk);
}

// ============================================================================
// CLASSES AND STYLE
// ============================================================================

#[test]
fn test_class_editor_token_list() {
    let (mut doc, _, a1, _, _) = build_page();
    let editor = ClassEditor::detect(&PlatformFeatures::default());
    let elem = doc.tree_mut().element_mut(a1).unwrap();

    editor.add(elem, "btn");
    assert_eq!(elem.class_name(), "btn primary");
    editor.add(elem, "open");
    editor.remove(elem, "primary");
    assert_eq!(elem.class_name(), "btn open");
}

#[test]
fn test_class_editor_class_name_fallback() {
    let (mut doc, nav, ..) = build_page();
    let editor = ClassEditor::detect(&PlatformFeatures::legacy());
    let elem = doc.tree_mut().element_mut(nav).unwrap();

    editor.add(elem, "menu");
    assert_eq!(elem.class_name(), "menu menu");
    editor.remove(elem, "menu");
    assert_eq!(elem.class_name(), "");
}

#[test]
fn test_token_list_edits() {
    let mut list = DOMTokenList::from_string("  a b  a ");
    assert_eq!(list.value(), "a b");
    list.remove(&["a"]);
    list.add(&["c", "b", ""]);
    assert_eq!(list.value(), "b c");
}

#[test]
fn test_style_declaration() {
    let mut style = StyleDeclaration::parse("color: red; ; broken; margin-top: 4px");
    assert_eq!(style.len(), 2);
    assert_eq!(style.get_property("marginTop"), Some("4px"));

    style.set_property("backgroundColor", "blue");
    style.set_property("color", "");
    assert_eq!(style.css_text(), "margin-top: 4px; background-color: blue;");
    assert_eq!(style.remove_property("margin-top").as_deref(), Some("4px"));
}

#[test]
fn test_normalize_property_name() {
    assert_eq!(normalize_property_name("fontSize"), "font-size");
    assert_eq!(normalize_property_name("cssFloat"), "float");
    assert_eq!(normalize_property_name("--main-color"), "--main-color");
    assert_eq!(normalize_property_name("webkitTransform"), "-webkit-transform");
    assert_eq!(normalize_property_name("display"), "display");
}

#[test]
fn test_element_style_writes_attribute() {
    let (mut doc, _, _, _, p) = build_page();
    let elem = doc.tree_mut().element_mut(p).unwrap();

    elem.set_style_property("display", "none");
    assert_eq!(elem.get_attr("style"), Some("display: none;"));
    elem.set_style_property("display", "");
    assert_eq!(elem.get_attr("style"), Some(""));
    assert!(elem.style().is_empty());
}
