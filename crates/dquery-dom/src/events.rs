//! DOM Events
//!
//! Event objects with the propagation flags listeners can set, and the
//! listener registry a dispatch coordinator walks. Listeners are keyed by
//! (event type, node); delegated listeners sit on the document node with a
//! selector filter.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::NodeId;

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    None,
    AtTarget,
    Bubbling,
}

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub phase: EventPhase,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl Event {
    /// Create a bubbling, cancelable event aimed at `target`
    pub fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: None,
            phase: EventPhase::None,
            bubbles: true,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// Create an event that does not bubble
    pub fn non_bubbling(event_type: &str, target: NodeId) -> Self {
        Self {
            bubbles: false,
            ..Self::new(event_type, target)
        }
    }

    /// Event type, e.g. `click`
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation to further nodes
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop propagation, including to the remaining listeners on the current node
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }
}

/// Listener callback
pub type Callback = Rc<dyn Fn(&mut Event)>;

/// Registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Listener bound to one node
///
/// Delegated listeners live on the document node and carry the selector the
/// event target's inclusive ancestors are tested against.
#[derive(Clone)]
pub struct Listener {
    pub id: ListenerId,
    pub filter: Option<String>,
    pub callback: Callback,
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// Listener table for one page
///
/// Listeners are kept per event type and node, in registration order, so
/// delegated and direct listeners on the document interleave the way they
/// were added.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: HashMap<String, HashMap<NodeId, Vec<Listener>>>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, target: NodeId, event_type: &str, filter: Option<String>, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .entry(target)
            .or_default()
            .push(Listener { id, filter, callback });
        id
    }

    /// Register a listener on `target`
    pub fn add_listener(&mut self, target: NodeId, event_type: &str, callback: Callback) -> ListenerId {
        self.push(target, event_type, None, callback)
    }

    /// Register a document-level listener filtered by `filter`
    pub fn add_delegated(&mut self, event_type: &str, filter: &str, callback: Callback) -> ListenerId {
        self.push(NodeId::ROOT, event_type, Some(filter.to_string()), callback)
    }

    /// Snapshot of the listeners on `target` for `event_type`
    pub fn listeners(&self, target: NodeId, event_type: &str) -> Vec<Listener> {
        self.listeners
            .get(event_type)
            .and_then(|by_target| by_target.get(&target))
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of registrations
    pub fn len(&self) -> usize {
        self.listeners
            .values()
            .flat_map(|by_target| by_target.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
