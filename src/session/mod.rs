pub mod webdriver;

#[cfg(test)]
pub(crate) mod testing;

use crate::error::SessionError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// A node in the live page that overlay dismissal can interact with
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Whether the element is actually rendered, not merely present in the document
    async fn is_displayed(&self) -> Result<bool, SessionError>;

    async fn text(&self) -> Result<String, SessionError>;

    async fn click(&self) -> Result<(), SessionError>;
}

/// Capabilities the pipeline needs from a rendered-document session
///
/// Locators are CSS selectors. A session is owned by exactly one request.
#[async_trait]
pub trait PageSession: Send {
    type Element: PageElement;

    async fn navigate(&mut self, url: &Url) -> Result<(), SessionError>;

    /// Wait until at least one element matches, or fail with `SessionError::Timeout`
    async fn wait_for(&mut self, locator: &str, timeout: Duration) -> Result<(), SessionError>;

    async fn find_all(&mut self, locator: &str) -> Result<Vec<Self::Element>, SessionError>;

    /// The current rendered markup of the page
    async fn snapshot_markup(&mut self) -> Result<String, SessionError>;

    /// Release the session; safe to call more than once
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Opens a fresh session per request
#[async_trait]
pub trait SessionFactory: Send + Sync + 'static {
    type Session: PageSession + 'static;

    async fn open(&self) -> Result<Self::Session, SessionError>;
}
