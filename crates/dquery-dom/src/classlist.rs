//! DOMTokenList (classList)
//!
//! Token list over the `class` attribute, plus the two class editing
//! strategies a page can use depending on whether `classList` is available.

use crate::{ElementData, PlatformFeatures};

/// DOMTokenList for managing space-separated tokens (e.g., classList)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMTokenList {
    tokens: Vec<String>,
}

impl DOMTokenList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string, dropping duplicates
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_ascii_whitespace() {
            list.add(&[token]);
        }
        list
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add token(s)
    pub fn add(&mut self, tokens: &[&str]) {
        for token in tokens {
            if !token.is_empty() && !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
    }

    /// Remove token(s)
    pub fn remove(&mut self, tokens: &[&str]) {
        self.tokens.retain(|t| !tokens.contains(&t.as_str()));
    }

    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }
}

/// How class tokens are added to and removed from an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassEditor {
    /// `classList.add` / `classList.remove`
    TokenList,
    /// String edits on `className`
    ClassName,
}

impl ClassEditor {
    /// Pick the strategy once for a platform
    pub fn detect(features: &PlatformFeatures) -> Self {
        if features.class_list {
            Self::TokenList
        } else {
            Self::ClassName
        }
    }

    /// Add a class token
    pub fn add(&self, elem: &mut ElementData, class: &str) {
        match self {
            Self::TokenList => {
                let mut list = DOMTokenList::from_string(elem.class_name());
                list.add(&[class]);
                elem.set_attr("class", list.value());
            }
            Self::ClassName => {
                let value = format!("{} {}", elem.class_name(), class);
                elem.set_attr("class", value);
            }
        }
    }

    /// Remove a class token
    ///
    /// `ClassName` deletes every occurrence of `class` together with the
    /// spaces that follow it, including occurrences inside longer tokens.
    pub fn remove(&self, elem: &mut ElementData, class: &str) {
        match self {
            Self::TokenList => {
                let mut list = DOMTokenList::from_string(elem.class_name());
                list.remove(&[class]);
                elem.set_attr("class", list.value());
            }
            Self::ClassName => {
                if class.is_empty() {
                    return;
                }
                let value = strip_occurrences(elem.class_name(), class);
                elem.set_attr("class", value);
            }
        }
    }
}

/// Remove each `needle` plus any run of spaces directly after it
///
/// `needle` is matched as a literal substring; characters such as `.` or `*`
/// in a class name carry no pattern meaning.
fn strip_occurrences(haystack: &str, needle: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = rest.find(needle) {
        out.push_str(&rest[..pos]);
        rest = rest[pos + needle.len()..].trim_start_matches(' ');
    }
    out.push_str(rest);
    out
}
