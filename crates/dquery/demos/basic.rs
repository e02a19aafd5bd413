//! Example: Basic usage of dQuery
//!
//! Run with `RUST_LOG=dquery=debug` to see query and dispatch logs.

use dquery::{Page, PageConfig, SelectionOps};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Menu</title></head>
<body>
    <nav class="menu">
        <button class="btn" id="save">Save</button>
        <button class="btn" id="load">Load</button>
    </nav>
    <div id="status"></div>
</body>
</html>"#;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let page = Page::from_html(PAGE, PageConfig::default())?;

    page.query(".menu")?
        .add_class("open")
        .css("backgroundColor", "#eee")
        .on_delegated("click", ".btn", {
            let page = page.clone();
            move |event| {
                let Ok(sel) = page.query(event.target) else {
                    return;
                };
                let name = sel.attr("id").ok().flatten().unwrap_or_default();
                if let Ok(mut status) = page.query("#status") {
                    let _ = status.text(&format!("clicked {name}"));
                }
            }
        });

    // Buttons added later are covered by the same delegated listener
    page.query(".menu")?
        .append(r#"<button class="btn" id="reset">Reset</button>"#)?;

    for id in ["save", "reset"] {
        let button = page.query(format!("#{id}"))?;
        if let Some(target) = button.first() {
            page.dispatch("click", target);
        }
        let status = page.with_document(|doc| {
            doc.get_element_by_id("status")
                .and_then(|s| doc.tree().text_content(s))
                .unwrap_or_default()
        });
        println!("{status}");
    }

    page.query("#status")?.hide();
    let markup = page.with_document(|doc| {
        let body = doc.body().unwrap_or(dquery::NodeId::ROOT);
        dquery::html::outer_html(doc.tree(), body)
    });
    println!("{markup}");

    Ok(())
}
