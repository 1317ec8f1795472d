//! Bounded waits: page loads and submit-until-advanced cycles.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;
use url::Url;

use crate::dom::DomAccessor;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::session::BrowsingSession;

/// Result of one submit-and-observe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The marker is still on the page.
    Pending,
    /// The marker disappeared; the page moved on.
    Advanced,
}

/// Re-submits a control until a marker element disappears.
///
/// The site acknowledges nothing: a submit may be swallowed by its own
/// validation or re-render, so the submit itself is repeated, not just the
/// check.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionWaiter {
    retry_interval: Duration,
    timeout: Duration,
}

impl SubmissionWaiter {
    pub fn new(retry_interval: Duration, timeout: Duration) -> Self {
        Self {
            retry_interval,
            timeout,
        }
    }

    /// Submits made before giving up on a page that never advances,
    /// engine latency aside.
    pub fn max_attempts(&self) -> u32 {
        let interval = self.retry_interval.as_nanos().max(1);
        let attempts = self.timeout.as_nanos().div_ceil(interval).max(1);
        u32::try_from(attempts).unwrap_or(u32::MAX)
    }

    /// Submit once, let the page react, then look for the marker.
    pub async fn attempt<E: Engine>(
        &self,
        session: &mut BrowsingSession<E>,
        page: &Url,
        submit: &str,
        marker: &str,
    ) -> Result<SubmissionOutcome> {
        DomAccessor::new(session).check(page).await?;
        session.submit(submit).await?;
        tokio::time::sleep(self.retry_interval).await;

        if DomAccessor::new(session).exists(page, marker).await? {
            Ok(SubmissionOutcome::Pending)
        } else {
            Ok(SubmissionOutcome::Advanced)
        }
    }

    /// Submit `submit` until `marker` is gone from `page`.
    ///
    /// Returns the number of submits it took.
    pub async fn wait_until_advanced<E: Engine>(
        &self,
        session: &mut BrowsingSession<E>,
        page: &Url,
        submit: &str,
        marker: &str,
    ) -> Result<u32> {
        let start = Instant::now();
        let mut attempts = 0;
        loop {
            attempts += 1;
            let outcome = self.attempt(session, page, submit, marker).await?;
            debug!(submit, marker, attempts, ?outcome, "submission attempt");
            match outcome {
                SubmissionOutcome::Advanced => return Ok(attempts),
                SubmissionOutcome::Pending if start.elapsed() < self.timeout => {}
                SubmissionOutcome::Pending => {
                    return Err(Error::SubmissionTimeout {
                        submit: submit.to_string(),
                        marker: marker.to_string(),
                        attempts,
                        elapsed: start.elapsed(),
                    })
                }
            }
        }
    }
}

/// Poll until `selector` is visible on `page`, or fail with `LoadingFailed`.
pub async fn wait_for_visible<E: Engine>(
    session: &BrowsingSession<E>,
    page: &Url,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let start = Instant::now();
    loop {
        if DomAccessor::new(session).is_visible(page, selector).await? {
            debug!(selector, waited = ?start.elapsed(), "element visible");
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(Error::LoadingFailed(format!(
                "{selector} did not appear on {page} within {timeout:?}"
            )));
        }
        tokio::time::sleep(interval).await;
    }
}

/// Poll until the checkbox `selector` on `page` reports checked.
pub async fn wait_for_checked<E: Engine>(
    session: &BrowsingSession<E>,
    page: &Url,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let start = Instant::now();
    loop {
        if DomAccessor::new(session).is_checked(page, selector).await? {
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(Error::LoadingFailed(format!(
                "{selector} on {page} did not become checked within {timeout:?}"
            )));
        }
        tokio::time::sleep(interval).await;
    }
}
