use crate::error::SessionError;
use crate::overlay::catalog::{OverlayCatalog, OverlayRule};
use crate::session::{PageElement, PageSession};
use std::time::Duration;

/// Scans the page against every catalog rule and clicks away matching overlays
///
/// Each rule dismisses at most one visible element. A failure while applying a
/// rule is logged and the scan moves on to the next rule. Returns the number of
/// overlays dismissed; a page without overlays yields 0 and is left untouched.
pub async fn dismiss_overlays<S: PageSession>(
    session: &mut S,
    catalog: &OverlayCatalog,
    click_pause: Duration,
) -> usize {
    let mut dismissed = 0;

    for rule in catalog.rules() {
        match apply_rule(session, rule).await {
            Ok(true) => {
                dismissed += 1;
                ::log::debug!("Dismissed overlay via {}", rule.matcher);
                // Let the closing animation and DOM mutation finish
                tokio::time::sleep(click_pause).await;
            }
            Ok(false) => {
                ::log::trace!("No visible overlay for {}", rule.matcher);
            }
            Err(e) => {
                ::log::warn!("Overlay rule {} could not be applied: {}", rule.matcher, e);
            }
        }
    }

    if dismissed > 0 {
        ::log::info!("Dismissed {} overlay(s)", dismissed);
    }
    dismissed
}

/// Clicks the first visible element matching the rule; returns whether one was clicked
async fn apply_rule<S: PageSession>(
    session: &mut S,
    rule: &OverlayRule,
) -> Result<bool, SessionError> {
    let candidates = session.find_all(rule.matcher.locator()).await?;

    for element in candidates {
        if !element.is_displayed().await? {
            continue;
        }
        if rule.matcher.inspects_text() {
            let text = element.text().await?;
            if !rule.matcher.accepts_text(&text) {
                continue;
            }
        }
        element.click().await?;
        return Ok(true);
    }

    Ok(false)
}
