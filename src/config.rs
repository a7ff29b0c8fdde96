use crate::error::ConfigError;
use crate::overlay::catalog::{OverlayCatalog, OverlayRule};
use crate::utils::millis;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Top-level configuration for the scraper service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Deployment environment; production hides error details from clients
    #[serde(default)]
    pub environment: Environment,

    /// Socket address the HTTP server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Target site addressing
    #[serde(default)]
    pub site: SiteConfig,

    /// Maximum time a page navigation may take
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    #[serde(default)]
    pub dismissal: DismissalPolicy,

    #[serde(default)]
    pub readiness: RetryPolicy,

    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Inline overlay rules; replaces the built-in catalog when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlays: Option<Vec<OverlayRule>>,

    /// Path to an overlay catalog file; replaces the built-in catalog when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_catalog: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Where searches are sent and which origin relative links resolve against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Canonical origin used to absolutize relative links
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Search page template; `{query}` is replaced with the encoded query
    #[serde(default = "default_search_url")]
    pub search_url: String,
}

/// Timing of the overlay dismissal passes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DismissalPolicy {
    /// Number of dismissal passes per request
    #[serde(default = "default_dismiss_passes")]
    pub passes: u32,

    /// Pause between passes so late overlays can appear
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Pause after each click for closing animations
    #[serde(default = "default_click_pause_ms")]
    pub click_pause_ms: u64,
}

/// Bounded retry schedule for the readiness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-attempt wait for the results container
    #[serde(default = "default_container_timeout_ms")]
    pub container_timeout_ms: u64,

    /// Per-attempt wait for the first item inside the container
    #[serde(default = "default_item_timeout_ms")]
    pub item_timeout_ms: u64,

    /// Fixed delay after an attempt that found the container but no items
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Fixed delay after an attempt where the container never appeared
    #[serde(default = "default_container_retry_delay_ms")]
    pub container_retry_delay_ms: u64,
}

/// Locators describing the results markup
///
/// Every list is an ordered fallback chain: the first locator yielding a
/// usable value wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    #[serde(default = "default_container_selector")]
    pub container: String,

    #[serde(default = "default_item_selector")]
    pub item: String,

    /// Markers identifying sponsored items, on the item itself or a descendant
    #[serde(default = "default_sponsored_selectors")]
    pub sponsored: Vec<String>,

    #[serde(default = "default_title_selectors")]
    pub title: Vec<String>,

    /// Chain locating the element that holds the current price; both parts are read inside it
    #[serde(default = "default_price_selectors")]
    pub price: Vec<String>,

    #[serde(default = "default_price_integer_selector")]
    pub price_integer: String,

    #[serde(default = "default_price_fraction_selector")]
    pub price_fraction: String,

    #[serde(default = "default_permalink_selectors")]
    pub permalink: Vec<String>,

    #[serde(default = "default_thumbnail_selectors")]
    pub thumbnail: Vec<String>,

    /// Image attributes in preference order; deferred-load attributes first
    #[serde(default = "default_thumbnail_attributes")]
    pub thumbnail_attributes: Vec<String>,
}

impl ScraperConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `WEBDRIVER_URL` and `APP_ENV` overrides from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        if let Ok(env) = std::env::var("APP_ENV") {
            if env.eq_ignore_ascii_case("production") {
                self.environment = Environment::Production;
            }
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn navigation_timeout(&self) -> Duration {
        millis(self.navigation_timeout_ms)
    }

    /// Resolve the overlay catalog: inline rules, then a catalog file, then the built-in one
    pub fn overlay_catalog(&self) -> Result<OverlayCatalog, ConfigError> {
        if let Some(rules) = &self.overlays {
            return Ok(OverlayCatalog::new(rules.clone()));
        }
        if let Some(path) = &self.overlay_catalog {
            return OverlayCatalog::from_file(path);
        }
        Ok(OverlayCatalog::builtin())
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            environment: Environment::default(),
            listen_addr: default_listen_addr(),
            site: SiteConfig::default(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            dismissal: DismissalPolicy::default(),
            readiness: RetryPolicy::default(),
            selectors: SelectorConfig::default(),
            overlays: None,
            overlay_catalog: None,
        }
    }
}

impl SiteConfig {
    /// Build the search page URL for a query
    ///
    /// Inner whitespace becomes `-` (the site's slug form) before encoding.
    pub fn search_url(&self, query: &str) -> Result<Url, url::ParseError> {
        let slug = query.split_whitespace().collect::<Vec<_>>().join("-");
        let encoded: String = url::form_urlencoded::byte_serialize(slug.as_bytes()).collect();
        Url::parse(&self.search_url.replace("{query}", &encoded))
    }

    pub fn origin_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.origin)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            search_url: default_search_url(),
        }
    }
}

impl DismissalPolicy {
    pub fn settle_delay(&self) -> Duration {
        millis(self.settle_delay_ms)
    }

    pub fn click_pause(&self) -> Duration {
        millis(self.click_pause_ms)
    }
}

impl Default for DismissalPolicy {
    fn default() -> Self {
        Self {
            passes: default_dismiss_passes(),
            settle_delay_ms: default_settle_delay_ms(),
            click_pause_ms: default_click_pause_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn container_timeout(&self) -> Duration {
        millis(self.container_timeout_ms)
    }

    pub fn item_timeout(&self) -> Duration {
        millis(self.item_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        millis(self.retry_delay_ms)
    }

    pub fn container_retry_delay(&self) -> Duration {
        millis(self.container_retry_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            container_timeout_ms: default_container_timeout_ms(),
            item_timeout_ms: default_item_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            container_retry_delay_ms: default_container_retry_delay_ms(),
        }
    }
}

impl SelectorConfig {
    /// Locator for item nodes inside the results container
    pub fn scoped_item(&self) -> String {
        format!("{} {}", self.container, self.item)
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            container: default_container_selector(),
            item: default_item_selector(),
            sponsored: default_sponsored_selectors(),
            title: default_title_selectors(),
            price: default_price_selectors(),
            price_integer: default_price_integer_selector(),
            price_fraction: default_price_fraction_selector(),
            permalink: default_permalink_selectors(),
            thumbnail: default_thumbnail_selectors(),
            thumbnail_attributes: default_thumbnail_attributes(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_origin() -> String {
    "https://www.mercadolivre.com.br".to_string()
}

fn default_search_url() -> String {
    "https://lista.mercadolivre.com.br/{query}".to_string()
}

fn default_navigation_timeout_ms() -> u64 {
    60_000
}

fn default_dismiss_passes() -> u32 {
    2
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

fn default_click_pause_ms() -> u64 {
    500
}

fn default_max_attempts() -> u32 {
    3
}

fn default_container_timeout_ms() -> u64 {
    30_000
}

fn default_item_timeout_ms() -> u64 {
    10_000
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

fn default_container_retry_delay_ms() -> u64 {
    3_000
}

fn default_container_selector() -> String {
    "ol.ui-search-layout".to_string()
}

fn default_item_selector() -> String {
    "li.ui-search-layout__item".to_string()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_sponsored_selectors() -> Vec<String> {
    strings(&[
        ".poly-component__ads-promotions",
        ".ui-search-item__ad-label",
        "[data-testid='ad-label']",
        ".ui-search-layout__item--ad",
    ])
}

fn default_title_selectors() -> Vec<String> {
    strings(&[
        ".poly-component__title-wrapper a.poly-component__title",
        "a.poly-component__title",
        "h2.ui-search-item__title",
        ".ui-search-item__title",
        "h3 a",
        "h2 a",
    ])
}

// Struck-through previous prices reuse the same part classes, so the generic tier excludes them
fn default_price_selectors() -> Vec<String> {
    strings(&[
        ".poly-price__current",
        ".ui-search-price__second-line",
        ".andes-money-amount:not(.andes-money-amount--previous)",
    ])
}

fn default_price_integer_selector() -> String {
    ".andes-money-amount__fraction".to_string()
}

fn default_price_fraction_selector() -> String {
    ".andes-money-amount__cents".to_string()
}

fn default_permalink_selectors() -> Vec<String> {
    strings(&[
        "a.poly-component__title",
        ".ui-search-item__group__element a.ui-search-link",
        "a.ui-search-link",
        "h3 a",
        "h2 a",
        "a[href]",
    ])
}

fn default_thumbnail_selectors() -> Vec<String> {
    strings(&[
        "img.poly-component__picture",
        "img.ui-search-result-image__element",
        "img",
    ])
}

fn default_thumbnail_attributes() -> Vec<String> {
    strings(&["data-src", "data-lazy", "src"])
}
