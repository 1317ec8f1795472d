//! Explicit browsing state: which context is active and what is loaded in it.

use std::path::Path;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::engine::{ContextTag, Engine};
use crate::error::{Error, Result};

/// The engine plus what the caller believes it is showing.
///
/// Every navigation and context switch goes through here so the believed
/// address stays in step with the engine. [`DomAccessor`](crate::dom::DomAccessor)
/// validates queries against it.
pub struct BrowsingSession<E: Engine> {
    engine: E,
    active: ContextTag,
    known: Vec<ContextTag>,
    address: Option<Url>,
}

impl<E: Engine> BrowsingSession<E> {
    pub async fn new(engine: E) -> Result<Self> {
        let known = engine.contexts().await?;
        let active = engine.active_context();
        Ok(Self {
            engine,
            active,
            known,
            address: None,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Hand the engine back, e.g. to close it or keep it open for inspection.
    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn active_context(&self) -> &ContextTag {
        &self.active
    }

    /// Every context this session has seen, in the order they appeared.
    pub fn known_contexts(&self) -> &[ContextTag] {
        &self.known
    }

    /// The address believed to be loaded in the active context.
    pub fn address(&self) -> Option<&Url> {
        self.address.as_ref()
    }

    pub async fn navigate(&mut self, url: &Url) -> Result<()> {
        debug!(%url, context = %self.active, "navigate");
        self.address = None;
        self.engine.navigate(url.as_str()).await?;
        self.address = Some(url.clone());
        Ok(())
    }

    /// Adopt whatever address the engine reports for the active context.
    ///
    /// Used after a context switch, where the page was loaded by the site and
    /// not by us. Polls until a real (non-`about:`) address appears; a
    /// context that reports no address yet is still loading.
    pub async fn sync_address(&mut self, timeout: Duration, interval: Duration) -> Result<Url> {
        let start = tokio::time::Instant::now();
        loop {
            let raw = self.engine.current_url().await?;
            let loaded = raw
                .as_deref()
                .and_then(|raw| Url::parse(raw).ok())
                .filter(|url| url.scheme() != "about");
            if let Some(url) = loaded {
                debug!(%url, context = %self.active, "address synced");
                self.address = Some(url.clone());
                return Ok(url);
            }
            if start.elapsed() >= timeout {
                return Err(Error::LoadingFailed(format!(
                    "context {} never left {}",
                    self.active,
                    raw.as_deref().unwrap_or("<no address>")
                )));
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Click `selector` and return the one browsing context the click opened.
    ///
    /// The set of open contexts is snapshotted before the click; afterwards
    /// the engine is polled until contexts unknown to the session appear.
    /// Zero new contexts after `timeout`, or more than one, is a protocol
    /// violation. The new context is recorded but not activated.
    pub async fn open_context_by_click(
        &mut self,
        selector: &str,
        timeout: Duration,
        interval: Duration,
    ) -> Result<ContextTag> {
        for tag in self.engine.contexts().await? {
            if !self.known.contains(&tag) {
                self.known.push(tag);
            }
        }

        debug!(selector, "click expecting a new context");
        self.engine.click(selector).await?;

        let start = tokio::time::Instant::now();
        loop {
            let fresh: Vec<ContextTag> = self
                .engine
                .contexts()
                .await?
                .into_iter()
                .filter(|tag| !self.known.contains(tag))
                .collect();

            match fresh.as_slice() {
                [] if start.elapsed() < timeout => tokio::time::sleep(interval).await,
                [] => {
                    return Err(Error::ContextProtocol(format!(
                        "clicking {selector} opened no new context within {timeout:?}"
                    )))
                }
                [tag] => {
                    debug!(context = %tag, "new context opened");
                    self.known.push(tag.clone());
                    return Ok(tag.clone());
                }
                many => {
                    return Err(Error::ContextProtocol(format!(
                        "clicking {selector} opened {} contexts, expected exactly one",
                        many.len()
                    )))
                }
            }
        }
    }

    pub async fn switch_to(&mut self, tag: &ContextTag) -> Result<()> {
        if !self.known.contains(tag) {
            return Err(Error::ContextProtocol(format!("context {tag} was never opened")));
        }
        debug!(from = %self.active, to = %tag, "switch context");
        self.engine.switch_context(tag).await?;
        self.active = tag.clone();
        self.address = None;
        Ok(())
    }

    pub async fn click(&mut self, selector: &str) -> Result<()> {
        debug!(selector, "click");
        self.engine.click(selector).await
    }

    pub async fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        debug!(selector, "type");
        self.engine.type_text(selector, text).await
    }

    pub async fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        debug!(selector, value, "select");
        self.engine.select_option(selector, value).await
    }

    pub async fn submit(&mut self, selector: &str) -> Result<()> {
        debug!(selector, "submit");
        self.engine.submit(selector).await
    }

    pub async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.engine.set_viewport(width, height).await
    }

    pub async fn screenshot(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "screenshot");
        self.engine.screenshot_to_file(path).await
    }
}
