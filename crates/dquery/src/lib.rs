//! dQuery - a small chainable DOM selection wrapper
//!
//! ```no_run
//! use dquery::{Page, PageConfig, SelectionOps};
//!
//! # fn main() -> dquery::DomResult<()> {
//! let page = Page::from_html(r#"<nav class="menu"><a class="btn">Go</a></nav>"#, PageConfig::default())?;
//!
//! page.query(".menu")?
//!     .add_class("open")
//!     .css("color", "red")
//!     .on_delegated("click", ".btn", |event| event.prevent_default());
//! # Ok(())
//! # }
//! ```
//!
//! Capability fallbacks (`classList`, `Element.closest`) are chosen once per
//! page from [`PlatformFeatures`].

mod config;
mod page;
mod selection;

pub use config::PageConfig;
pub use page::Page;
pub use selection::{Selection, SelectionOps, Target};

pub use dquery_dom::{
    AncestorLookup, ClassEditor, Document, DomError, DomResult, Event, EventPhase, NodeId,
    PlatformFeatures,
};

/// Re-export of the DOM crate
pub use dquery_dom as dom;
/// Re-export of the HTML crate
pub use dquery_html as html;
