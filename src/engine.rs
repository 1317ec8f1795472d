//! The browser automation seam.
//!
//! Everything the booking flow does to a browser goes through [`Engine`].
//! [`ChromeEngine`](crate::browser::ChromeEngine) drives a real Chrome over
//! CDP; tests plug in an in-memory implementation.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Stable identifier of one browsing context (tab or window).
///
/// Assigned by the engine when the context is opened and never reused
/// within one engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextTag(String);

impl ContextTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl fmt::Display for ContextTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A browser that can be driven one operation at a time.
///
/// All operations act on the active context. Selectors are CSS selectors.
/// Operations are awaited strictly in sequence, so implementations need not
/// be `Send`.
#[async_trait(?Send)]
pub trait Engine {
    /// The context operations currently act on.
    fn active_context(&self) -> ContextTag;

    /// All open contexts, in the order the engine reports them.
    async fn contexts(&self) -> Result<Vec<ContextTag>>;

    /// Make `tag` the active context.
    async fn switch_context(&mut self, tag: &ContextTag) -> Result<()>;

    /// Navigate the active context and wait for the load to finish.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// The address actually loaded in the active context, or `None` while a
    /// freshly opened context has not committed its first document.
    async fn current_url(&self) -> Result<Option<String>>;

    /// Serialized DOM of the active context.
    async fn page_source(&self) -> Result<String>;

    /// Whether an element matching `selector` exists and is rendered.
    async fn is_visible(&self, selector: &str) -> Result<bool>;

    /// Whether the checkbox or radio matching `selector` is checked.
    async fn is_checked(&self, selector: &str) -> Result<bool>;

    async fn click(&mut self, selector: &str) -> Result<()>;

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()>;

    /// Select the option with `value` in the `<select>` matching `selector`.
    async fn select_option(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Submit the form owned by the control matching `selector`, as if the
    /// control had been pressed.
    async fn submit(&mut self, selector: &str) -> Result<()>;

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()>;

    /// Write a PNG of the active context to `path`.
    async fn screenshot_to_file(&self, path: &Path) -> Result<()>;

    /// Shut the browser down.
    async fn close(&mut self) -> Result<()>;
}
