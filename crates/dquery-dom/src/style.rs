//! Inline style declarations (`element.style`)
//!
//! The `style` attribute is the storage; a declaration block is parsed from
//! it on each access and written back after a change.

use crate::ElementData;

/// Parsed inline style declaration block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleDeclaration {
    declarations: Vec<(String, String)>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `prop: value; prop2: value2`
    ///
    /// Uses lightningcss's style attribute parser with error recovery, so
    /// malformed declarations are skipped and values containing `;` or `:`
    /// (data URIs, quoted strings) survive intact.
    pub fn parse(css_text: &str) -> Self {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleAttribute};

        let mut style = Self::new();
        if css_text.trim().is_empty() {
            return style;
        }

        let options = ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        };
        let attribute = match StyleAttribute::parse(css_text, options) {
            Ok(attribute) => attribute,
            Err(err) => {
                tracing::warn!(%css_text, ?err, "unparsable inline style dropped");
                return style;
            }
        };

        let block = &attribute.declarations;
        let all = block
            .declarations
            .iter()
            .map(|prop| (prop, false))
            .chain(block.important_declarations.iter().map(|prop| (prop, true)));
        for (prop, important) in all {
            let Ok(text) = prop.to_css_string(important, PrinterOptions::default()) else {
                continue;
            };
            let Some((name, value)) = text.split_once(':') else {
                continue;
            };
            style.set_property(name, value);
        }
        style
    }

    /// Get a property value
    pub fn get_property(&self, name: &str) -> Option<&str> {
        let name = normalize_property_name(name);
        self.declarations
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a property; an empty value removes it
    pub fn set_property(&mut self, name: &str, value: &str) {
        let name = normalize_property_name(name);
        let value = value.trim();
        if value.is_empty() {
            self.declarations.retain(|(n, _)| *n != name);
            return;
        }
        match self.declarations.iter_mut().find(|(n, _)| *n == name) {
            Some(decl) => decl.1 = value.to_string(),
            None => self.declarations.push((name, value.to_string())),
        }
    }

    /// Remove a property, returning its old value
    pub fn remove_property(&mut self, name: &str) -> Option<String> {
        let name = normalize_property_name(name);
        let pos = self.declarations.iter().position(|(n, _)| *n == name)?;
        Some(self.declarations.remove(pos).1)
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Serialized form (`cssText`)
    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ElementData {
    /// Inline style parsed from the `style` attribute
    pub fn style(&self) -> StyleDeclaration {
        StyleDeclaration::parse(self.get_attr("style").unwrap_or(""))
    }

    /// `element.style[name] = value`
    pub fn set_style_property(&mut self, name: &str, value: &str) {
        let mut style = self.style();
        style.set_property(name, value);
        self.set_attr("style", style.css_text());
    }
}

/// Map a script-side property name to its CSS form
///
/// `backgroundColor` -> `background-color`, `cssFloat` -> `float`.
/// Names already in CSS form and custom properties pass through.
pub fn normalize_property_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        return name.to_string();
    }
    if name == "cssFloat" {
        return "float".to_string();
    }

    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    // webkitTransform -> -webkit-transform
    if ["webkit-", "moz-", "ms-"].iter().any(|p| out.starts_with(p)) {
        out.insert(0, '-');
    }
    out
}
