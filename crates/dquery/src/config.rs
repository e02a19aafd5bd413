//! Page configuration

use dquery_dom::PlatformFeatures;
use serde::Deserialize;

/// Page configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Document URL
    pub url: String,
    /// Optional platform capabilities to assume
    pub features: PlatformFeatures,
}

impl PageConfig {
    /// Config for a platform without `classList` or native `closest`
    pub fn legacy() -> Self {
        Self {
            features: PlatformFeatures::legacy(),
            ..Self::default()
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            url: "about:blank".into(),
            features: PlatformFeatures::default(),
        }
    }
}
