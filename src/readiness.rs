use crate::config::{RetryPolicy, SelectorConfig};
use crate::error::PipelineError;
use crate::session::PageSession;
use std::time::Duration;

/// States of the readiness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// Waiting for the results container on the given attempt
    Waiting { attempt: u32 },
    /// Container found; checking that it holds item nodes
    CheckingPopulation { attempt: u32 },
    Ready { attempt: u32, items: usize },
    Failed { attempts: u32 },
}

/// Observation made when the page became ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    /// 1-based attempt on which items were seen
    pub attempt: u32,
    pub item_count: usize,
}

/// Polls the page until the results container holds at least one item
///
/// Every wait is bounded by the policy; after `max_attempts` unsuccessful
/// attempts the probe fails with `PipelineError::ReadinessTimeout`.
pub async fn probe<S: PageSession>(
    session: &mut S,
    selectors: &SelectorConfig,
    policy: &RetryPolicy,
) -> Result<Readiness, PipelineError> {
    let max_attempts = policy.max_attempts.max(1);
    let item_locator = selectors.scoped_item();
    let mut state = ProbeState::Waiting { attempt: 1 };

    loop {
        ::log::trace!("Readiness probe state: {:?}", state);

        state = match state {
            ProbeState::Waiting { attempt } if attempt > max_attempts => ProbeState::Failed {
                attempts: max_attempts,
            },
            ProbeState::Waiting { attempt } => {
                match session
                    .wait_for(&selectors.container, policy.container_timeout())
                    .await
                {
                    Ok(()) => ProbeState::CheckingPopulation { attempt },
                    Err(e) => {
                        ::log::warn!(
                            "Results container not found (attempt {}/{}): {}",
                            attempt,
                            max_attempts,
                            e
                        );
                        backoff(attempt, max_attempts, policy.container_retry_delay()).await;
                        ProbeState::Waiting {
                            attempt: attempt + 1,
                        }
                    }
                }
            }
            ProbeState::CheckingPopulation { attempt } => {
                if let Err(e) = session.wait_for(&item_locator, policy.item_timeout()).await {
                    ::log::debug!("No result items yet: {}", e);
                }

                let items = match session.find_all(&item_locator).await {
                    Ok(items) => items.len(),
                    Err(e) => {
                        ::log::warn!("Failed to count result items: {}", e);
                        0
                    }
                };

                if items > 0 {
                    ProbeState::Ready { attempt, items }
                } else {
                    ::log::warn!(
                        "Results container is empty (attempt {}/{})",
                        attempt,
                        max_attempts
                    );
                    backoff(attempt, max_attempts, policy.retry_delay()).await;
                    ProbeState::Waiting {
                        attempt: attempt + 1,
                    }
                }
            }
            ProbeState::Ready { attempt, items } => {
                ::log::debug!("Results ready with {} items on attempt {}", items, attempt);
                return Ok(Readiness {
                    attempt,
                    item_count: items,
                });
            }
            ProbeState::Failed { attempts } => {
                ::log::error!("Results never populated after {} attempts", attempts);
                return Err(PipelineError::ReadinessTimeout { attempts });
            }
        };
    }
}

// No delay after the final attempt
async fn backoff(attempt: u32, max_attempts: u32, delay: Duration) {
    if attempt < max_attempts {
        tokio::time::sleep(delay).await;
    }
}
