//! Scripted in-memory page session used by the pipeline tests.

use crate::error::SessionError;
use crate::session::{PageElement, PageSession, SessionFactory};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Clone)]
pub struct FakeElement {
    inner: Arc<ElementState>,
}

struct ElementState {
    text: String,
    displayed: AtomicBool,
    clicks: AtomicUsize,
    fail_click: bool,
}

impl FakeElement {
    fn build(text: &str, displayed: bool, fail_click: bool) -> Self {
        Self {
            inner: Arc::new(ElementState {
                text: text.to_string(),
                displayed: AtomicBool::new(displayed),
                clicks: AtomicUsize::new(0),
                fail_click,
            }),
        }
    }

    pub fn visible(text: &str) -> Self {
        Self::build(text, true, false)
    }

    pub fn hidden(text: &str) -> Self {
        Self::build(text, false, false)
    }

    /// Visible element whose click always fails
    pub fn broken(text: &str) -> Self {
        Self::build(text, true, true)
    }

    pub fn clicks(&self) -> usize {
        self.inner.clicks.load(Ordering::SeqCst)
    }

    pub fn displayed(&self) -> bool {
        self.inner.displayed.load(Ordering::SeqCst)
    }
}

pub fn items(count: usize) -> Vec<FakeElement> {
    (0..count).map(|i| FakeElement::visible(&format!("item {i}"))).collect()
}

#[async_trait]
impl PageElement for FakeElement {
    async fn is_displayed(&self) -> Result<bool, SessionError> {
        Ok(self.displayed())
    }

    async fn text(&self) -> Result<String, SessionError> {
        Ok(self.inner.text.clone())
    }

    // A successful click closes the overlay
    async fn click(&self) -> Result<(), SessionError> {
        if self.inner.fail_click {
            return Err(SessionError::Command("element click intercepted".to_string()));
        }
        self.inner.clicks.fetch_add(1, Ordering::SeqCst);
        self.inner.displayed.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct PageState {
    elements: HashMap<String, Vec<FakeElement>>,
    sequences: HashMap<String, VecDeque<Vec<FakeElement>>>,
    waits: HashMap<String, VecDeque<bool>>,
    markup: String,
    fail_navigation: bool,
    hang_navigation: bool,
    fail_close: bool,
    navigations: Vec<String>,
    calls: Vec<String>,
    snapshots: usize,
    close_calls: usize,
}

impl PageState {
    // The last scripted entry sticks once the script runs out
    fn next_in<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    fn peek_elements(&self, locator: &str) -> Vec<FakeElement> {
        if let Some(front) = self.sequences.get(locator).and_then(|q| q.front()) {
            return front.clone();
        }
        self.elements.get(locator).cloned().unwrap_or_default()
    }
}

/// Clones share the same page state, so tests keep a handle for assertions
#[derive(Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elements(self, locator: &str, elements: Vec<FakeElement>) -> Self {
        self.state
            .lock()
            .unwrap()
            .elements
            .insert(locator.to_string(), elements);
        self
    }

    /// Successive `find_all` calls for `locator` return successive entries
    pub fn with_sequence(self, locator: &str, sequence: Vec<Vec<FakeElement>>) -> Self {
        self.state
            .lock()
            .unwrap()
            .sequences
            .insert(locator.to_string(), sequence.into());
        self
    }

    /// Successive `wait_for` calls for `locator` succeed or time out per entry
    pub fn with_waits(self, locator: &str, waits: Vec<bool>) -> Self {
        self.state
            .lock()
            .unwrap()
            .waits
            .insert(locator.to_string(), waits.into());
        self
    }

    pub fn with_markup(self, markup: &str) -> Self {
        self.state.lock().unwrap().markup = markup.to_string();
        self
    }

    pub fn failing_navigation(self) -> Self {
        self.state.lock().unwrap().fail_navigation = true;
        self
    }

    /// Navigation never completes, leaving the caller's timeout to fire
    pub fn hanging_navigation(self) -> Self {
        self.state.lock().unwrap().hang_navigation = true;
        self
    }

    /// Close is recorded but reports a failure
    pub fn failing_close(self) -> Self {
        self.state.lock().unwrap().fail_close = true;
        self
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    /// Every session call in order, as `op:locator`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn snapshots(&self) -> usize {
        self.state.lock().unwrap().snapshots
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }
}

#[async_trait]
impl PageSession for FakePage {
    type Element = FakeElement;

    async fn navigate(&mut self, url: &Url) -> Result<(), SessionError> {
        let (fail, hang) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(format!("navigate:{url}"));
            state.navigations.push(url.to_string());
            (state.fail_navigation, state.hang_navigation)
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if fail {
            return Err(SessionError::Command("net::ERR_NAME_NOT_RESOLVED".to_string()));
        }
        Ok(())
    }

    async fn wait_for(&mut self, locator: &str, timeout: Duration) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("wait_for:{locator}"));
        let scripted = state
            .waits
            .get_mut(locator)
            .map(|queue| PageState::next_in(queue).unwrap_or(false));
        let present = match scripted {
            Some(present) => present,
            None => !state.peek_elements(locator).is_empty(),
        };
        if present {
            Ok(())
        } else {
            Err(SessionError::Timeout {
                locator: locator.to_string(),
                waited_ms: timeout.as_millis() as u64,
            })
        }
    }

    async fn find_all(&mut self, locator: &str) -> Result<Vec<FakeElement>, SessionError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("find_all:{locator}"));
        if let Some(queue) = state.sequences.get_mut(locator) {
            return Ok(PageState::next_in(queue).unwrap_or_default());
        }
        Ok(state.elements.get(locator).cloned().unwrap_or_default())
    }

    async fn snapshot_markup(&mut self) -> Result<String, SessionError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("snapshot".to_string());
        state.snapshots += 1;
        Ok(state.markup.clone())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("close".to_string());
        state.close_calls += 1;
        if state.fail_close {
            return Err(SessionError::Closed);
        }
        Ok(())
    }
}

/// Hands out the same scripted page for every request
#[derive(Clone, Default)]
pub struct FakeFactory {
    page: FakePage,
    opened: Arc<AtomicUsize>,
    fail_open: bool,
}

impl FakeFactory {
    pub fn new(page: FakePage) -> Self {
        Self {
            page,
            opened: Arc::new(AtomicUsize::new(0)),
            fail_open: false,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for FakeFactory {
    type Session = FakePage;

    async fn open(&self) -> Result<FakePage, SessionError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(SessionError::Connect {
                url: "http://localhost:4444".to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.page.clone())
    }
}

/// Default configuration with every delay and timeout zeroed
pub fn instant_config() -> crate::config::ScraperConfig {
    let mut config = crate::config::ScraperConfig::default();
    config.navigation_timeout_ms = 1_000;
    config.dismissal.settle_delay_ms = 0;
    config.dismissal.click_pause_ms = 0;
    config.readiness.container_timeout_ms = 0;
    config.readiness.item_timeout_ms = 0;
    config.readiness.retry_delay_ms = 0;
    config.readiness.container_retry_delay_ms = 0;
    config
}
