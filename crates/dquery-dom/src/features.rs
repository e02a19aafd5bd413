//! Platform feature flags
//!
//! Optional capabilities a host platform may or may not expose. Pages read
//! these once and pick fixed strategies from them.

use serde::Deserialize;

/// Optional DOM capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PlatformFeatures {
    /// `Element.classList` is available
    pub class_list: bool,
    /// `Element.closest` is available natively
    pub native_closest: bool,
}

impl PlatformFeatures {
    /// A platform lacking every optional capability
    pub fn legacy() -> Self {
        Self {
            class_list: false,
            native_closest: false,
        }
    }
}

impl Default for PlatformFeatures {
    fn default() -> Self {
        Self {
            class_list: true,
            native_closest: true,
        }
    }
}
