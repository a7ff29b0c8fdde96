use crate::error::SessionError;
use crate::session::{PageElement, PageSession, SessionFactory};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use url::Url;

/// Common WebDriver endpoints tried when the configured one refuses connections
const FALLBACK_WEBDRIVER_URLS: [&str; 3] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // Selenium / geckodriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Opens one WebDriver session per request
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    webdriver_url: String,
}

impl WebDriverFactory {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    type Session = WebDriverSession;

    async fn open(&self) -> Result<WebDriverSession, SessionError> {
        let client = connect_to_webdriver(&self.webdriver_url).await?;
        Ok(WebDriverSession {
            client: Some(client),
        })
    }
}

/// Connects to the WebDriver instance, falling back to well-known local endpoints
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, SessionError> {
    let first_error = match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e.to_string()
        }
    };

    for url in FALLBACK_WEBDRIVER_URLS.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(SessionError::Connect {
        url: webdriver_url.to_string(),
        reason: first_error,
    })
}

/// A live browser tab driven over the WebDriver protocol
pub struct WebDriverSession {
    client: Option<Client>,
}

impl WebDriverSession {
    fn client(&self) -> Result<&Client, SessionError> {
        self.client.as_ref().ok_or(SessionError::Closed)
    }
}

fn command_error(error: CmdError) -> SessionError {
    if error.to_string().contains("Unable to find session") {
        return SessionError::Closed;
    }
    SessionError::Command(error.to_string())
}

#[async_trait]
impl PageSession for WebDriverSession {
    type Element = WebDriverElement;

    async fn navigate(&mut self, url: &Url) -> Result<(), SessionError> {
        self.client()?.goto(url.as_str()).await.map_err(command_error)
    }

    async fn wait_for(&mut self, locator: &str, timeout: Duration) -> Result<(), SessionError> {
        let result = self
            .client()?
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(locator))
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(SessionError::Timeout {
                locator: locator.to_string(),
                waited_ms: timeout.as_millis() as u64,
            }),
            Err(e) => Err(command_error(e)),
        }
    }

    async fn find_all(&mut self, locator: &str) -> Result<Vec<WebDriverElement>, SessionError> {
        let elements = self
            .client()?
            .find_all(Locator::Css(locator))
            .await
            .map_err(command_error)?;
        Ok(elements.into_iter().map(WebDriverElement).collect())
    }

    async fn snapshot_markup(&mut self) -> Result<String, SessionError> {
        self.client()?.source().await.map_err(command_error)
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        match self.client.take() {
            Some(client) => client.close().await.map_err(command_error),
            None => Ok(()),
        }
    }
}

// Requests abandoned mid-flight still release their browser session
impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = client.close().await {
                        ::log::warn!("Failed to close abandoned WebDriver session: {}", e);
                    }
                });
            }
        }
    }
}

/// Element handle bound to a WebDriver session
pub struct WebDriverElement(Element);

#[async_trait]
impl PageElement for WebDriverElement {
    async fn is_displayed(&self) -> Result<bool, SessionError> {
        self.0.is_displayed().await.map_err(command_error)
    }

    async fn text(&self) -> Result<String, SessionError> {
        self.0.text().await.map_err(command_error)
    }

    async fn click(&self) -> Result<(), SessionError> {
        self.0.click().await.map_err(command_error)
    }
}
