use crate::error::ConfigError;
use crate::utils::collapse_whitespace;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Built-in catalog describing the target site's overlay markup
const BUILTIN_CATALOG: &str = include_str!("../../config/overlays.json");

/// How an overlay's dismiss control is recognized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OverlayMatcher {
    /// The first visible element matching a CSS selector
    Selector { css: String },

    /// The first visible element within `scope` whose text is one of `labels`
    Text { scope: String, labels: Vec<String> },
}

impl OverlayMatcher {
    /// Locator used to collect candidate elements from the live page
    pub fn locator(&self) -> &str {
        match self {
            OverlayMatcher::Selector { css } => css,
            OverlayMatcher::Text { scope, .. } => scope,
        }
    }

    /// Whether candidates must be checked against their text content
    pub fn inspects_text(&self) -> bool {
        matches!(self, OverlayMatcher::Text { .. })
    }

    /// Whether an element with the given text is a dismiss control
    ///
    /// Labels match case-insensitively, either exactly or as the first word(s)
    /// of the element text.
    pub fn accepts_text(&self, text: &str) -> bool {
        match self {
            OverlayMatcher::Selector { .. } => true,
            OverlayMatcher::Text { labels, .. } => {
                let text = collapse_whitespace(text).to_lowercase();
                if text.is_empty() {
                    return false;
                }
                labels.iter().any(|label| {
                    let label = label.to_lowercase();
                    text == label || text.starts_with(&format!("{label} "))
                })
            }
        }
    }
}

impl std::fmt::Display for OverlayMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayMatcher::Selector { css } => write!(f, "selector `{css}`"),
            OverlayMatcher::Text { labels, .. } => write!(f, "text {labels:?}"),
        }
    }
}

/// One entry of the overlay catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayRule {
    /// Lower values are tried first
    pub priority: u32,
    pub matcher: OverlayMatcher,
}

/// Ordered, immutable set of overlay rules shared by every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayCatalog {
    #[serde(default)]
    version: u32,
    rules: Vec<OverlayRule>,
}

impl OverlayCatalog {
    /// Build an unversioned catalog from rules, ordering them by priority
    pub fn new(rules: Vec<OverlayRule>) -> Self {
        Self::sorted(Self { version: 0, rules })
    }

    /// The catalog shipped in `config/overlays.json`
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_CATALOG).expect("Built-in overlay catalog should be valid")
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: Self = serde_json::from_str(json)?;
        Ok(Self::sorted(catalog))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn rules(&self) -> &[OverlayRule] {
        &self.rules
    }

    // Stable sort keeps file order for equal priorities
    fn sorted(mut catalog: Self) -> Self {
        catalog.rules.sort_by_key(|rule| rule.priority);
        catalog
    }
}
