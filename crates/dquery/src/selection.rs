//! Selection wrapper and chainable operations

use std::rc::Rc;

use dquery_dom::{Document, DomError, DomResult, Event, NodeId};

use crate::Page;

/// What a selection is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// CSS selector, evaluated against the whole document
    Selector(String),
    /// A single node
    Element(NodeId),
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<&String> for Target {
    fn from(selector: &String) -> Self {
        Self::Selector(selector.clone())
    }
}

impl From<NodeId> for Target {
    fn from(node: NodeId) -> Self {
        Self::Element(node)
    }
}

/// An ordered snapshot of nodes plus the selector that produced it
///
/// The item list is fixed at construction; only `parent` replaces it.
#[derive(Debug, Clone)]
pub struct Selection {
    page: Page,
    selector: Option<String>,
    items: Vec<NodeId>,
}

impl Selection {
    pub(crate) fn new(page: Page, selector: Option<String>, items: Vec<NodeId>) -> Self {
        Self {
            page,
            selector,
            items,
        }
    }

    /// Selector this selection was built from, `None` for a wrapped element
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.items.first().copied()
    }

    /// Owning page
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Apply `f` to every item that is an element, in order
    fn update_elements(&self, mut f: impl FnMut(&mut dquery_dom::ElementData)) {
        self.page.with_document_mut(|doc| {
            for &id in &self.items {
                if let Some(elem) = doc.tree_mut().element_mut(id) {
                    f(elem);
                }
            }
        });
    }

    fn require_first(&self) -> DomResult<NodeId> {
        self.first().ok_or(DomError::EmptySelection)
    }
}

/// Chainable selection operations
///
/// Iterating operations do nothing on an empty selection. Operations that
/// read the first item report `DomError::EmptySelection` instead.
pub trait SelectionOps {
    /// Call `f(index, node, document)` for each item in order
    ///
    /// The document is borrowed for the whole iteration, so `f` must not go
    /// back through the page.
    fn each<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(usize, NodeId, &mut Document);

    /// Set one inline style property on every element
    fn css(&mut self, property: &str, value: &str) -> &mut Self;

    /// `display: none` on every element
    fn hide(&mut self) -> &mut Self;

    /// `display: block` on every element, whatever it was before hiding
    fn show(&mut self) -> &mut Self;

    fn add_class(&mut self, class: &str) -> &mut Self;

    fn remove_class(&mut self, class: &str) -> &mut Self;

    /// Replace each element's children with parsed markup
    fn html(&mut self, markup: &str) -> DomResult<&mut Self>;

    /// Append parsed markup at the end of each element
    fn append(&mut self, markup: &str) -> DomResult<&mut Self>;

    /// Replace each item's children with literal text
    fn text(&mut self, value: &str) -> DomResult<&mut Self>;

    /// Detach every item from its parent
    fn remove(&mut self) -> DomResult<&mut Self>;

    /// Replace the items with the parent of the first item
    fn parent(&mut self) -> DomResult<&mut Self>;

    /// Attribute value of the first item
    fn attr(&self, name: &str) -> DomResult<Option<String>>;

    /// Bind `handler` directly to every item
    fn on<F>(&mut self, event_type: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Event) + 'static;

    /// Bind `handler` once at the document for targets inside `filter`
    ///
    /// Matches elements scoped under this selection's selector, including
    /// ones inserted later. A selection wrapping an element has no selector,
    /// so its filter is scoped under a `null` type selector and matches nothing
    /// outside a `<null>` element.
    fn on_delegated<F>(&mut self, event_type: &str, filter: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Event) + 'static;
}

impl SelectionOps for Selection {
    fn each<F>(&mut self, mut f: F) -> &mut Self
    where
        F: FnMut(usize, NodeId, &mut Document),
    {
        self.page.with_document_mut(|doc| {
            for (index, &id) in self.items.iter().enumerate() {
                f(index, id, doc);
            }
        });
        self
    }

    fn css(&mut self, property: &str, value: &str) -> &mut Self {
        self.update_elements(|elem| elem.set_style_property(property, value));
        self
    }

    fn hide(&mut self) -> &mut Self {
        self.css("display", "none")
    }

    fn show(&mut self) -> &mut Self {
        self.css("display", "block")
    }

    fn add_class(&mut self, class: &str) -> &mut Self {
        let editor = self.page.class_editor();
        self.update_elements(|elem| editor.add(elem, class));
        self
    }

    fn remove_class(&mut self, class: &str) -> &mut Self {
        let editor = self.page.class_editor();
        self.update_elements(|elem| editor.remove(elem, class));
        self
    }

    fn html(&mut self, markup: &str) -> DomResult<&mut Self> {
        self.page.with_document_mut(|doc| {
            self.items
                .iter()
                .try_for_each(|&id| dquery_html::set_inner_html(doc.tree_mut(), id, markup))
        })?;
        Ok(self)
    }

    fn append(&mut self, markup: &str) -> DomResult<&mut Self> {
        self.page.with_document_mut(|doc| {
            self.items
                .iter()
                .try_for_each(|&id| dquery_html::append_html(doc.tree_mut(), id, markup))
        })?;
        Ok(self)
    }

    fn text(&mut self, value: &str) -> DomResult<&mut Self> {
        self.page.with_document_mut(|doc| {
            self.items
                .iter()
                .try_for_each(|&id| doc.tree_mut().set_text_content(id, value))
        })?;
        Ok(self)
    }

    fn remove(&mut self) -> DomResult<&mut Self> {
        self.page.with_document_mut(|doc| {
            let tree = doc.tree_mut();
            self.items.iter().try_for_each(|&id| {
                let parent = tree.parent(id).ok_or(DomError::NoParent(id))?;
                tree.remove_child(parent, id).map(|_| ())
            })
        })?;
        tracing::debug!(count = self.items.len(), "removed");
        Ok(self)
    }

    fn parent(&mut self) -> DomResult<&mut Self> {
        let first = self.require_first()?;
        let parent = self
            .page
            .with_document(|doc| doc.tree().parent(first))
            .ok_or(DomError::NoParent(first))?;
        self.items = vec![parent];
        Ok(self)
    }

    fn attr(&self, name: &str) -> DomResult<Option<String>> {
        let first = self.require_first()?;
        self.page.with_document(|doc| {
            let elem = doc.tree().require_element(first)?;
            Ok(elem.get_attr(name).map(str::to_string))
        })
    }

    fn on<F>(&mut self, event_type: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Event) + 'static,
    {
        let handler = Rc::new(handler);
        for &id in &self.items {
            let handler = handler.clone();
            self.page.add_listener(
                id,
                event_type,
                Rc::new(move |event: &mut Event| {
                    handler(event);
                    event.stop_immediate_propagation();
                }),
            );
        }
        self
    }

    fn on_delegated<F>(&mut self, event_type: &str, filter: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Event) + 'static,
    {
        let composed = compose_filter(self.selector.as_deref(), filter);
        self.page.add_delegated(
            event_type,
            &composed,
            Rc::new(move |event: &mut Event| {
                handler(event);
                event.stop_immediate_propagation();
            }),
        );
        self
    }
}

/// `selector + " " + filter`, with a missing selector written as `null`
fn compose_filter(selector: Option<&str>, filter: &str) -> String {
    format!("{} {filter}", selector.unwrap_or("null"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PageConfig;
    use std::cell::Cell;

    const MARKUP: &str = r#"
        <ul id="list">
            <li class="item">one</li>
            <li class="item" data-k="2">two</li>
        </ul>
        <p id="note">note</p>
    "#;

    fn page(config: PageConfig) -> Page {
        Page::from_html(MARKUP, config).unwrap()
    }

    fn class_of(page: &Page, id: NodeId) -> String {
        page.with_document(|doc| doc.tree().element(id).unwrap().class_name().to_string())
    }

    fn style_of(page: &Page, id: NodeId) -> String {
        page.with_document(|doc| {
            doc.tree().element(id).unwrap().get_attr("style").unwrap_or("").to_string()
        })
    }

    #[test]
    fn test_target_conversions() {
        assert_eq!(Target::from(".a"), Target::Selector(".a".into()));
        assert_eq!(Target::from(String::from("p")), Target::Selector("p".into()));
        assert_eq!(Target::from(NodeId::ROOT), Target::Element(NodeId::ROOT));
    }

    #[test]
    fn test_each_visits_in_order() {
        let page = page(PageConfig::default());
        let mut seen = Vec::new();
        page.query("li").unwrap().each(|index, id, doc| {
            seen.push((index, doc.tree().text_content(id).unwrap()));
        });
        assert_eq!(seen, vec![(0, "one".to_string()), (1, "two".to_string())]);
    }

    #[test]
    fn test_chain_css_and_classes() {
        let page = page(PageConfig::default());
        let mut sel = page.query(".item").unwrap();
        sel.css("color", "red").add_class("open").hide();

        for &id in sel.items() {
            assert_eq!(style_of(&page, id), "color: red; display: none;");
            assert_eq!(class_of(&page, id), "item open");
        }

        sel.show().remove_class("open");
        for &id in sel.items() {
            assert_eq!(style_of(&page, id), "color: red; display: block;");
            assert_eq!(class_of(&page, id), "item");
        }
    }

    #[test]
    fn test_legacy_class_editing() {
        let page = page(PageConfig::legacy());
        let mut sel = page.query("#note").unwrap();
        sel.add_class("open");
        let note = sel.first().unwrap();
        assert_eq!(class_of(&page, note), " open");

        sel.remove_class("open");
        assert_eq!(class_of(&page, note), " ");
    }

    #[test]
    fn test_attr_first_item() {
        let page = page(PageConfig::default());
        let sel = page.query("li").unwrap();
        assert_eq!(sel.attr("class").unwrap().as_deref(), Some("item"));
        assert_eq!(sel.attr("data-k").unwrap(), None);

        let sel = page.query("[data-k]").unwrap();
        assert_eq!(sel.attr("data-k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_parent_replaces_items_keeps_selector() {
        let page = page(PageConfig::default());
        let mut sel = page.query("li").unwrap();
        sel.parent().unwrap();

        let list = page.with_document(|doc| doc.get_element_by_id("list")).unwrap();
        assert_eq!(sel.items(), &[list]);
        assert_eq!(sel.selector(), Some("li"));
    }

    #[test]
    fn test_empty_selection() {
        let page = page(PageConfig::default());
        let mut sel = page.query(".missing").unwrap();
        sel.css("color", "red").hide().show().add_class("x").remove_class("x");
        sel.text("t").unwrap().html("<b>b</b>").unwrap().remove().unwrap();

        assert!(sel.is_empty());
        assert_eq!(sel.attr("id"), Err(DomError::EmptySelection));
        assert!(matches!(sel.parent(), Err(DomError::EmptySelection)));
    }

    #[test]
    fn test_direct_listener_stops_immediately() {
        let page = page(PageConfig::default());
        let hits = Rc::new(Cell::new(0));
        let mut sel = page.query("#note").unwrap();

        let h = hits.clone();
        sel.on("click", move |_| h.set(h.get() + 1));
        let h = hits.clone();
        sel.on("click", move |_| h.set(h.get() + 10));

        let note = sel.first().unwrap();
        let event = page.dispatch("click", note);
        assert_eq!(hits.get(), 1);
        assert!(event.is_immediate_propagation_stopped());
    }

    #[test]
    fn test_compose_filter() {
        assert_eq!(compose_filter(Some("#list"), ".item"), "#list .item");
        assert_eq!(compose_filter(None, ".item"), "null .item");
    }

    #[test]
    fn test_delegated_filter_composition() {
        let page = page(PageConfig::default());
        let hits = Rc::new(Cell::new(0));

        let h = hits.clone();
        page.query("#list")
            .unwrap()
            .on_delegated("click", ".item", move |_| h.set(h.get() + 1));

        let items = page.query("li").unwrap();
        page.dispatch("click", items.items()[1]);
        assert_eq!(hits.get(), 1);

        let note = page.query("#note").unwrap().first().unwrap();
        page.dispatch("click", note);
        assert_eq!(hits.get(), 1);
    }
}
