//! Page-guarded DOM reads.
//!
//! A [`DomAccessor`] answers questions about the active context only after
//! checking that both the session's believed address and the engine's actual
//! address are the page the caller expects. That catches redirects and
//! context mix-ups before they turn into wrong answers.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::session::BrowsingSession;

/// Owned copy of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    /// Text content with surrounding whitespace trimmed.
    pub text: String,
}

impl Node {
    pub fn from_element(el: ElementRef<'_>) -> Self {
        let value = el.value();
        Self {
            tag: value.name().to_ascii_lowercase(),
            attrs: value
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: text_of(el),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}

/// Text content of an element, trimmed.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::InvalidSelector(format!("{selector}: {e}")))
}

/// A parsed copy of the page, taken after the address check passed.
pub struct PageSnapshot {
    url: Url,
    html: Html,
}

impl PageSnapshot {
    pub fn select_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).collect())
    }

    pub fn first(&self, selector: &str) -> Result<ElementRef<'_>> {
        let sel = parse_selector(selector)?;
        self.html
            .select(&sel)
            .next()
            .ok_or_else(|| Error::ElementNotFound(format!("{selector} on {}", self.url)))
    }

    pub fn exists(&self, selector: &str) -> Result<bool> {
        let sel = parse_selector(selector)?;
        Ok(self.html.select(&sel).next().is_some())
    }
}

/// Two addresses name the same page if they agree on everything but the
/// query string and fragment.
pub fn same_page(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
        && a.path() == b.path()
}

pub struct DomAccessor<'s, E: Engine> {
    session: &'s BrowsingSession<E>,
}

impl<'s, E: Engine> DomAccessor<'s, E> {
    pub fn new(session: &'s BrowsingSession<E>) -> Self {
        Self { session }
    }

    /// Fail with `NavigationMismatch` unless the session is on `expected`.
    pub async fn check(&self, expected: &Url) -> Result<()> {
        let believed = self.session.address().ok_or_else(|| Error::NavigationMismatch {
            expected: expected.to_string(),
            actual: "<nothing loaded>".into(),
        })?;
        if !same_page(believed, expected) {
            return Err(Error::NavigationMismatch {
                expected: expected.to_string(),
                actual: believed.to_string(),
            });
        }

        let raw = self
            .session
            .engine()
            .current_url()
            .await?
            .ok_or_else(|| Error::NavigationMismatch {
                expected: expected.to_string(),
                actual: "<no address>".into(),
            })?;
        let actual = Url::parse(&raw).map_err(|_| Error::NavigationMismatch {
            expected: expected.to_string(),
            actual: raw.clone(),
        })?;
        if !same_page(&actual, expected) {
            return Err(Error::NavigationMismatch {
                expected: expected.to_string(),
                actual: raw,
            });
        }
        Ok(())
    }

    pub async fn snapshot(&self, expected: &Url) -> Result<PageSnapshot> {
        self.check(expected).await?;
        let source = self.session.engine().page_source().await?;
        Ok(PageSnapshot {
            url: expected.clone(),
            html: Html::parse_document(&source),
        })
    }

    /// First element matching `selector` on the expected page.
    pub async fn query(&self, expected: &Url, selector: &str) -> Result<Node> {
        let snapshot = self.snapshot(expected).await?;
        let el = snapshot.first(selector)?;
        Ok(Node::from_element(el))
    }

    pub async fn exists(&self, expected: &Url, selector: &str) -> Result<bool> {
        self.snapshot(expected).await?.exists(selector)
    }

    pub async fn is_visible(&self, expected: &Url, selector: &str) -> Result<bool> {
        self.check(expected).await?;
        self.session.engine().is_visible(selector).await
    }

    pub async fn is_checked(&self, expected: &Url, selector: &str) -> Result<bool> {
        self.check(expected).await?;
        self.session.engine().is_checked(selector).await
    }
}
