//! Page - document, listener registry and dispatch coordinator
//!
//! A `Page` is a cheap cloneable handle. Listener callbacks may capture a
//! clone and mutate the document while an event is being dispatched, so no
//! borrow is held across a callback invocation.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use dquery_dom::events::{Callback, Listener, ListenerId, ListenerRegistry};
use dquery_dom::{
    AncestorLookup, ClassEditor, Document, DomResult, Event, EventPhase, NodeId, PlatformFeatures,
};

use crate::{PageConfig, Selection, Target};

/// A loaded document with its event plumbing
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageInner>,
}

struct PageInner {
    document: RefCell<Document>,
    listeners: RefCell<ListenerRegistry>,
    features: PlatformFeatures,
    lookup: AncestorLookup,
    class_editor: ClassEditor,
}

impl Page {
    /// Create a page holding an empty `<html><head><body>` document
    pub fn new(config: PageConfig) -> Self {
        let document = Document::new(&config.url);
        Self::with_document_and_config(document, config)
    }

    /// Create a page from HTML markup
    pub fn from_html(html: &str, config: PageConfig) -> DomResult<Self> {
        let document = dquery_html::HtmlParser::new().parse_with_url(html, &config.url)?;
        Ok(Self::with_document_and_config(document, config))
    }

    /// Wrap an existing document
    pub fn with_document_and_config(document: Document, config: PageConfig) -> Self {
        let features = config.features;
        // Capabilities are probed once; every call afterwards uses these.
        let lookup = AncestorLookup::install(&features);
        let class_editor = ClassEditor::detect(&features);
        tracing::debug!(url = %config.url, ?lookup, ?class_editor, "page created");

        Self {
            inner: Rc::new(PageInner {
                document: RefCell::new(document),
                listeners: RefCell::new(ListenerRegistry::new()),
                features,
                lookup,
                class_editor,
            }),
        }
    }

    /// Wrap a selector or an element (`$(...)`)
    ///
    /// A selector is evaluated against the whole document right away and the
    /// matches are kept as a fixed snapshot.
    pub fn query(&self, target: impl Into<Target>) -> DomResult<Selection> {
        match target.into() {
            Target::Selector(selector) => {
                let items = self.with_document(|doc| {
                    doc.tree().query_selector_all(NodeId::ROOT, &selector)
                })?;
                tracing::debug!(%selector, matches = items.len(), "query");
                Ok(Selection::new(self.clone(), Some(selector), items))
            }
            Target::Element(node) => Ok(Selection::new(self.clone(), None, vec![node])),
        }
    }

    /// Platform capabilities this page was created with
    pub fn features(&self) -> PlatformFeatures {
        self.inner.features
    }

    /// Ancestor lookup strategy in use
    pub fn ancestor_lookup(&self) -> AncestorLookup {
        self.inner.lookup
    }

    /// Class editing strategy in use
    pub fn class_editor(&self) -> ClassEditor {
        self.inner.class_editor
    }

    /// Run `f` with shared access to the document
    pub fn with_document<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.inner.document.borrow())
    }

    /// Run `f` with exclusive access to the document
    ///
    /// Panics if called from inside another `with_document*` closure.
    pub fn with_document_mut<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.inner.document.borrow_mut())
    }

    /// `Element.closest` through the installed lookup
    pub fn closest(&self, element: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        self.with_document(|doc| self.inner.lookup.closest(doc.tree(), element, selector))
    }

    pub(crate) fn add_listener(&self, target: NodeId, event_type: &str, callback: Callback) -> ListenerId {
        self.inner
            .listeners
            .borrow_mut()
            .add_listener(target, event_type, callback)
    }

    pub(crate) fn add_delegated(&self, event_type: &str, filter: &str, callback: Callback) -> ListenerId {
        tracing::debug!(event_type, filter, "delegated listener registered");
        self.inner
            .listeners
            .borrow_mut()
            .add_delegated(event_type, filter, callback)
    }

    /// Number of registered listeners, direct and delegated
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Fire a bubbling, cancelable event at `target`
    pub fn dispatch(&self, event_type: &str, target: NodeId) -> Event {
        self.dispatch_event(Event::new(event_type, target))
    }

    /// Dispatch an event along the target's ancestor path
    ///
    /// Listeners on each node run in registration order. Delegated listeners
    /// sit on the document node among its direct listeners and only run when
    /// their filter matches the target. The event is returned so callers can
    /// inspect `is_default_prevented`.
    pub fn dispatch_event(&self, mut event: Event) -> Event {
        let target = event.target;
        let path: Vec<NodeId> = self.with_document(|doc| {
            std::iter::once(target)
                .chain(doc.tree().ancestors(target))
                .collect()
        });
        tracing::trace!(event_type = event.event_type(), ?target, depth = path.len(), "dispatch");

        for (depth, &node) in path.iter().enumerate() {
            if depth > 0 && !event.bubbles {
                break;
            }
            event.current_target = Some(node);
            event.phase = if depth == 0 {
                EventPhase::AtTarget
            } else {
                EventPhase::Bubbling
            };

            let listeners = self.inner.listeners.borrow().listeners(node, event.event_type());
            for listener in listeners {
                if self.filter_accepts(&listener, event.target) {
                    (listener.callback)(&mut event);
                }
                if event.is_immediate_propagation_stopped() {
                    break;
                }
            }

            if event.is_propagation_stopped() {
                break;
            }
        }

        event.current_target = None;
        event.phase = EventPhase::None;
        event
    }

    /// Whether a delegated filter has an inclusive ancestor of `target`
    fn filter_accepts(&self, listener: &Listener, target: NodeId) -> bool {
        let Some(filter) = &listener.filter else {
            return true;
        };
        match self.closest(target, filter) {
            Ok(found) => found.is_some(),
            Err(err) => {
                tracing::warn!(%filter, %err, "delegated filter skipped");
                false
            }
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(PageConfig::default())
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("features", &self.inner.features)
            .field("lookup", &self.inner.lookup)
            .field("class_editor", &self.inner.class_editor)
            .field("listeners", &self.listener_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn page() -> Page {
        Page::from_html(
            r#"<div id="outer"><p id="inner"><span id="leaf">x</span></p></div>"#,
            PageConfig::default(),
        )
        .unwrap()
    }

    fn id(page: &Page, id: &str) -> NodeId {
        page.with_document(|doc| doc.get_element_by_id(id)).unwrap()
    }

    #[test]
    fn test_query_snapshot() {
        let page = page();
        let sel = page.query("p, span").unwrap();
        assert_eq!(sel.items(), &[id(&page, "inner"), id(&page, "leaf")]);
    }

    #[test]
    fn test_dispatch_bubbles_to_document() {
        let page = page();
        let order = Rc::new(RefCell::new(Vec::new()));

        for (name, node) in [("leaf", id(&page, "leaf")), ("outer", id(&page, "outer")), ("doc", NodeId::ROOT)] {
            let order = order.clone();
            page.add_listener(node, "click", Rc::new(move |_| order.borrow_mut().push(name)));
        }

        page.dispatch("click", id(&page, "leaf"));
        assert_eq!(*order.borrow(), vec!["leaf", "outer", "doc"]);
    }

    #[test]
    fn test_stop_propagation_keeps_same_node_listeners() {
        let page = page();
        let leaf = id(&page, "leaf");
        let hits = Rc::new(Cell::new(0));

        let h = hits.clone();
        page.add_listener(leaf, "click", Rc::new(move |e| {
            h.set(h.get() + 1);
            e.stop_propagation();
        }));
        let h = hits.clone();
        page.add_listener(leaf, "click", Rc::new(move |_| h.set(h.get() + 1)));
        let h = hits.clone();
        page.add_listener(NodeId::ROOT, "click", Rc::new(move |_| h.set(h.get() + 100)));

        page.dispatch("click", leaf);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_non_bubbling_stays_at_target() {
        let page = page();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        page.add_listener(NodeId::ROOT, "focus", Rc::new(move |_| h.set(h.get() + 1)));

        page.dispatch_event(Event::non_bubbling("focus", id(&page, "leaf")));
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_callback_can_mutate_document() {
        let page = page();
        let leaf = id(&page, "leaf");
        let handle = page.clone();
        page.add_listener(leaf, "click", Rc::new(move |e| {
            let target = e.target;
            handle.with_document_mut(|doc| {
                doc.tree_mut().set_text_content(target, "clicked").unwrap();
            });
        }));

        page.dispatch("click", leaf);
        let text = page.with_document(|doc| doc.tree().text_content(leaf));
        assert_eq!(text.as_deref(), Some("clicked"));
    }

    #[test]
    fn test_document_listeners_run_in_registration_order() {
        let page = page();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        page.add_delegated("click", "span", Rc::new(move |_| o.borrow_mut().push("delegated")));
        let o = order.clone();
        page.add_listener(NodeId::ROOT, "click", Rc::new(move |_| o.borrow_mut().push("direct")));
        let o = order.clone();
        page.add_delegated("click", "#outer", Rc::new(move |_| o.borrow_mut().push("outer")));
        let o = order.clone();
        page.add_delegated("click", "table", Rc::new(move |_| o.borrow_mut().push("table")));

        page.dispatch("click", id(&page, "leaf"));
        assert_eq!(*order.borrow(), vec!["delegated", "direct", "outer"]);
    }

    #[test]
    fn test_invalid_delegated_filter_is_skipped() {
        let page = page();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        page.add_delegated("click", "p >", Rc::new(|_| {}));
        page.add_delegated("click", "#inner span", Rc::new(move |_| h.set(h.get() + 1)));

        page.dispatch("click", id(&page, "leaf"));
        assert_eq!(hits.get(), 1);
    }
}
