use std::path::Path;

use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CrPage;
use chromiumoxide::page::ScreenshotParams;

use crate::engine::ContextTag;
use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Page exposing what the booking flow needs.
#[derive(Clone)]
pub struct Page {
    inner: CrPage,
}

impl Page {
    pub(crate) fn new(inner: CrPage) -> Self {
        Self { inner }
    }

    /// The CDP target id, used as the context tag.
    pub fn tag(&self) -> ContextTag {
        ContextTag::new(self.inner.target_id().inner().clone())
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate to the given URL and wait for the page to load.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    /// Get the current page URL. `None` until the main frame is known.
    pub async fn url(&self) -> Result<Option<String>> {
        self.inner
            .url()
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))
    }

    pub async fn bring_to_front(&self) -> Result<()> {
        self.inner.bring_to_front().await?;
        Ok(())
    }

    // ── Actions ─────────────────────────────────────────────────────

    /// Click on an element matching the given CSS selector.
    pub async fn click(&self, selector: &str) -> Result<()> {
        let el = self.find_element(selector).await?;
        el.click().await?;
        Ok(())
    }

    /// Type text into an element matching the given CSS selector.
    pub async fn type_text(&self, selector: &str, text: &str) -> Result<()> {
        let el = self.find_element(selector).await?;
        el.click().await?;
        el.type_str(text).await?;
        Ok(())
    }

    /// Select an option in a `<select>` element by its value attribute.
    pub async fn select_option(&self, selector: &str, value: &str) -> Result<()> {
        let selector_js = js_string(selector)?;
        let value_js = js_string(value)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) throw new Error('Element not found: ' + {selector_js});
                el.value = {value_js};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            }})()
            "#,
        );
        self.evaluate_void(&js).await
    }

    /// Submit the form of the control matching `selector`, naming the
    /// control as submitter so its value is posted.
    pub async fn submit(&self, selector: &str) -> Result<()> {
        let selector_js = js_string(selector)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) throw new Error('Element not found: ' + {selector_js});
                if (el.form && el.form.requestSubmit) {{
                    el.form.requestSubmit(el);
                }} else {{
                    el.click();
                }}
            }})()
            "#,
        );
        self.evaluate_void(&js).await
    }

    /// Override the device metrics so the whole form fits the viewport.
    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<()> {
        let params = SetDeviceMetricsOverrideParams::new(i64::from(width), i64::from(height), 1.0, false);
        self.inner.execute(params).await?;
        Ok(())
    }

    // ── Observations ────────────────────────────────────────────────

    /// Take a full-page screenshot and save it to a file (PNG format).
    pub async fn screenshot_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.inner
            .save_screenshot(params, path)
            .await
            .map_err(|e| Error::ScreenshotError(e.to_string()))?;
        Ok(())
    }

    /// Get the full HTML content of the page.
    pub async fn html(&self) -> Result<String> {
        self.inner
            .content()
            .await
            .map_err(|e| Error::JsError(e.to_string()))
    }

    /// Whether the element exists and takes up space in the layout.
    pub async fn is_visible(&self, selector: &str) -> Result<bool> {
        let selector_js = js_string(selector)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) return false;
                const style = window.getComputedStyle(el);
                return style.display !== 'none'
                    && style.visibility !== 'hidden'
                    && el.getClientRects().length > 0;
            }})()
            "#,
        );
        self.evaluate_bool(&js).await
    }

    pub async fn is_checked(&self, selector: &str) -> Result<bool> {
        let selector_js = js_string(selector)?;
        let js = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector_js});
                if (!el) throw new Error('Element not found: ' + {selector_js});
                return !!el.checked;
            }})()
            "#,
        );
        self.evaluate_bool(&js).await
    }

    async fn evaluate_bool(&self, expression: &str) -> Result<bool> {
        let result = self
            .inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        result
            .into_value::<bool>()
            .map_err(|e| Error::JsError(e.to_string()))
    }

    async fn evaluate_void(&self, expression: &str) -> Result<()> {
        self.inner
            .evaluate(expression)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(())
    }

    async fn find_element(&self, selector: &str) -> Result<Element> {
        self.inner
            .find_element(selector)
            .await
            .map_err(|e| Error::ElementNotFound(format!("{selector}: {e}")))
    }
}

fn js_string(value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::JsError(e.to_string()))
}
