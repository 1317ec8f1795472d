use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::browser::ChromeEngine;
use crate::error::{Error, Result};

/// Default listing page of the Hochschulsport booking system.
pub const DEFAULT_LISTING_URL: &str =
    "https://buchung.hsp.uni-tuebingen.de/angebote/aktueller_zeitraum/kurssuche.html";

/// Which Chromium-family browser to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserKind {
    /// Google Chrome, located by chromiumoxide's own lookup.
    #[default]
    Chrome,
    /// A `chromium` / `chromium-browser` binary found on `PATH`.
    Chromium,
}

pub struct BrowserConfig {
    pub kind: BrowserKind,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Explicit browser executable. Takes precedence over `kind`.
    pub browser_path: Option<PathBuf>,
    /// Default timeout for individual CDP requests (default: 30s).
    pub default_timeout: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chrome,
            headless: true,
            viewport_width: 1280,
            viewport_height: 1024,
            browser_path: None,
            default_timeout: Duration::from_secs(30),
        }
    }
}

impl BrowserConfig {
    /// Resolve the executable to launch, if one has to be passed explicitly.
    pub fn executable(&self) -> Result<Option<PathBuf>> {
        if let Some(ref path) = self.browser_path {
            return Ok(Some(path.clone()));
        }
        match self.kind {
            BrowserKind::Chrome => Ok(None),
            BrowserKind::Chromium => ["chromium", "chromium-browser"]
                .iter()
                .find_map(|name| which::which(name).ok())
                .map(Some)
                .ok_or_else(|| Error::LaunchError("no chromium executable found on PATH".into())),
        }
    }
}

pub struct BrowserBuilder {
    config: BrowserConfig,
}

impl BrowserBuilder {
    pub fn new() -> Self {
        Self {
            config: BrowserConfig::default(),
        }
    }

    pub fn kind(mut self, kind: BrowserKind) -> Self {
        self.config.kind = kind;
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser_path = Some(path.into());
        self
    }

    pub async fn build(self) -> Result<ChromeEngine> {
        ChromeEngine::launch(self.config).await
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Where the booking site lives.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub listing_url: Url,
}

impl SiteConfig {
    pub fn new(listing_url: &str) -> Result<Self> {
        let listing_url = Url::parse(listing_url)
            .map_err(|e| Error::NavigationError(format!("invalid listing url {listing_url}: {e}")))?;
        Ok(Self { listing_url })
    }

    /// Resolve a link found on the listing page.
    pub fn resolve(&self, href: &str) -> Result<Url> {
        self.listing_url
            .join(href)
            .map_err(|e| Error::NavigationError(format!("invalid course link {href}: {e}")))
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_url: Url::parse(DEFAULT_LISTING_URL).expect("default listing url is valid"),
        }
    }
}

/// Bounds for every wait the booking flow performs.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// How long a page may take to show its first expected element.
    pub page_load: Duration,
    /// Poll interval for visibility and context waits.
    pub poll_interval: Duration,
    /// How long a click may take to open a new browsing context.
    pub new_context: Duration,
    /// Upper bound for one submit-until-advanced cycle.
    pub submission: Duration,
    /// Pause between a submit and the marker check.
    pub submission_retry: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(10),
            poll_interval: Duration::from_millis(100),
            new_context: Duration::from_secs(10),
            submission: Duration::from_secs(30),
            submission_retry: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookingConfig {
    pub site: SiteConfig,
    pub timeouts: Timeouts,
}
