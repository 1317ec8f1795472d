use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tracing::debug;

use crate::config::{BrowserBuilder, BrowserConfig};
use crate::engine::{ContextTag, Engine};
use crate::error::{Error, Result};
use crate::page::Page;

/// Chrome flags that improve performance without affecting functionality.
/// Popups stay unblocked: the booking form opens in a new tab.
const PERF_ARGS: &[&str] = &[
    "disable-gpu",
    "disable-extensions",
    "metrics-recording-only",
    "mute-audio",
    "no-default-browser-check",
    "no-first-run",
    "disable-client-side-phishing-detection",
    "disable-popup-blocking",
    "disable-prompt-on-repost",
];

/// A Chrome instance driven over CDP.
pub struct ChromeEngine {
    browser: CrBrowser,
    active: Page,
    _handler_task: tokio::task::JoinHandle<()>,
}

impl ChromeEngine {
    /// Create a new BrowserBuilder for configuring and launching a browser.
    pub fn builder() -> BrowserBuilder {
        BrowserBuilder::new()
    }

    /// Launch a browser instance with the given configuration and open one
    /// blank tab as the active context.
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        for arg in PERF_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(path) = config.executable()? {
            builder = builder.chrome_executable(path);
        }

        builder = builder
            .request_timeout(config.default_timeout)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            });

        let cr_config = builder
            .build()
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let (browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let cr_page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;
        let active = Page::new(cr_page);
        debug!(context = %active.tag(), headless = config.headless, "browser launched");

        Ok(Self {
            browser,
            active,
            _handler_task: handler_task,
        })
    }

    async fn pages(&self) -> Result<Vec<Page>> {
        let cr_pages = self.browser.pages().await?;
        Ok(cr_pages.into_iter().map(Page::new).collect())
    }
}

#[async_trait(?Send)]
impl Engine for ChromeEngine {
    fn active_context(&self) -> ContextTag {
        self.active.tag()
    }

    async fn contexts(&self) -> Result<Vec<ContextTag>> {
        Ok(self.pages().await?.iter().map(Page::tag).collect())
    }

    async fn switch_context(&mut self, tag: &ContextTag) -> Result<()> {
        let page = self
            .pages()
            .await?
            .into_iter()
            .find(|p| &p.tag() == tag)
            .ok_or_else(|| Error::ContextProtocol(format!("no open context {tag}")))?;
        page.bring_to_front().await?;
        self.active = page;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.active.goto(url).await
    }

    async fn current_url(&self) -> Result<Option<String>> {
        self.active.url().await
    }

    async fn page_source(&self) -> Result<String> {
        self.active.html().await
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        self.active.is_visible(selector).await
    }

    async fn is_checked(&self, selector: &str) -> Result<bool> {
        self.active.is_checked(selector).await
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.active.click(selector).await
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        self.active.type_text(selector, text).await
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        self.active.select_option(selector, value).await
    }

    async fn submit(&mut self, selector: &str) -> Result<()> {
        self.active.submit(selector).await
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.active.set_viewport(width, height).await
    }

    async fn screenshot_to_file(&self, path: &Path) -> Result<()> {
        self.active.screenshot_to_file(path).await
    }

    async fn close(&mut self) -> Result<()> {
        self.browser.close().await?;
        self.browser.wait().await?;
        Ok(())
    }
}
