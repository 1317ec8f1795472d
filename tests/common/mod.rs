//! In-memory engine serving fixture pages of the booking site.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use hsp::config::{BookingConfig, SiteConfig, Timeouts};
use hsp::site;
use hsp::{BrowsingSession, ContextTag, Credentials, Engine, Error, Gender, RegistrationStatus, Result};
use scraper::{Html, Selector};

pub const LISTING: &str = "https://hsp.test/angebote/aktueller_zeitraum/kurssuche.html";
pub const FORM: &str = "https://hsp.test/cgi/anmeldung.fcgi";

pub fn detail_url(slug: &str) -> String {
    format!("https://hsp.test/angebote/aktueller_zeitraum/{slug}")
}

pub fn config() -> BookingConfig {
    BookingConfig {
        site: SiteConfig::new(LISTING).unwrap(),
        timeouts: Timeouts {
            page_load: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            new_context: Duration::from_secs(2),
            submission: Duration::from_secs(1),
            submission_retry: Duration::from_millis(100),
        },
    }
}

pub fn student() -> Credentials {
    Credentials {
        name: "Erika".into(),
        surname: "Mustermann".into(),
        gender: Gender::W,
        street: "Wilhelmstraße".into(),
        number: "5".into(),
        zipcode: "72074".into(),
        city: "Tübingen".into(),
        status: RegistrationStatus::StudentUnit,
        pid: Some("4012345".into()),
        email: "erika@example.org".into(),
    }
}

// ── Fixture pages ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Row {
    pub id: String,
    pub time: String,
    pub weekday: String,
    pub location: String,
    pub level: String,
    pub href: String,
    /// Filter checkbox that must be checked for the row to render.
    pub hidden_by: Option<&'static str>,
}

impl Row {
    pub fn new(id: &str, href: &str) -> Self {
        Self {
            id: id.into(),
            time: "18:00-19:30".into(),
            weekday: "Mo".into(),
            location: "Halle 1".into(),
            level: "Anfänger".into(),
            href: href.into(),
            hidden_by: None,
        }
    }

    pub fn hidden_by(mut self, filter: &'static str) -> Self {
        self.hidden_by = Some(filter);
        self
    }

    pub fn at(mut self, time: &str, weekday: &str, location: &str, level: &str) -> Self {
        self.time = time.into();
        self.weekday = weekday.into();
        self.location = location.into();
        self.level = level.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct Listing {
    /// Visibility probes of the filter toggle that fail before it shows.
    pub toggle_delay: Option<u32>,
    pub rows: Vec<Row>,
    pub checked: HashMap<&'static str, bool>,
}

impl Listing {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            toggle_delay: Some(0),
            rows,
            checked: site::LISTING_FILTERS.iter().map(|f| (*f, false)).collect(),
        }
    }

    pub fn never_loads(mut self) -> Self {
        self.toggle_delay = None;
        self
    }

    pub fn loads_after(mut self, probes: u32) -> Self {
        self.toggle_delay = Some(probes);
        self
    }

    pub fn with_checked(mut self, filter: &'static str) -> Self {
        self.checked.insert(filter, true);
        self
    }

    fn render(&self, toggle_shown: bool) -> String {
        let mut html = String::from("<html><body>");
        if toggle_shown {
            html.push_str(r#"<div id="bs_filter_toggle">Filter</div>"#);
        }
        for filter in site::LISTING_FILTERS {
            let id = filter.trim_start_matches('#');
            let checked = if self.checked[filter] { " checked" } else { "" };
            html.push_str(&format!(r#"<input type="checkbox" id="{id}"{checked}>"#));
        }
        html.push_str("<table>");
        for row in &self.rows {
            if let Some(filter) = row.hidden_by {
                if !self.checked[filter] {
                    continue;
                }
            }
            html.push_str(&format!(
                concat!(
                    r#"<tr><td class="bs_sknr">{}</td><td class="bs_sdet">{}</td>"#,
                    r#"<td class="bs_stag">{}</td><td class="bs_szeit">{}</td>"#,
                    r#"<td class="bs_sort"><a href="/orte/1.html">{}</a></td>"#,
                    r#"<td class="bs_sbuch"><a href="{}">Details</a></td></tr>"#,
                ),
                row.id, row.level, row.weekday, row.time, row.location, row.href
            ));
        }
        html.push_str("</table></body></html>");
        html
    }
}

pub fn detail_page(course_id: &str, name: &str, marker: &str) -> String {
    format!(
        r#"<html><body><div class="bs_head">{name}</div>
        <table><tr><td class="bs_sknr">{course_id}</td><td class="bs_sbuch">
        <a id="K{course_id}"></a>{marker}</td></tr></table></body></html>"#
    )
}

pub const BOOKABLE: &str =
    r#"<input type="submit" value="buchen" class="bs_btn_buchen" name="BS_Kursid_1">"#;
pub const WAITLIST: &str =
    r#"<input type="submit" value="Warteliste" class="bs_btn_buchen bs_btn_warteliste">"#;
pub const CLOSED: &str = r#"<span class="bs_btn_buchen">ausgebucht</span>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStage {
    Details,
    Review,
    Done,
}

/// The booking form. Each step advances after a number of submits, or
/// never when `None`.
#[derive(Debug, Clone)]
pub struct FormFlow {
    pub stage: FormStage,
    pub details_submits: Option<u32>,
    pub confirm_submits: Option<u32>,
    pub submits_in_stage: u32,
    pub eula_checked: bool,
}

impl FormFlow {
    pub fn new(details_submits: Option<u32>, confirm_submits: Option<u32>) -> Self {
        Self {
            stage: FormStage::Details,
            details_submits,
            confirm_submits,
            submits_in_stage: 0,
            eula_checked: false,
        }
    }

    fn render(&self) -> String {
        match self.stage {
            FormStage::Details => {
                let checked = if self.eula_checked { " checked" } else { "" };
                format!(
                    r#"<html><body><form method="post">
                    <input type="radio" name="sex" value="M"><input type="radio" name="sex" value="W">
                    <input id="BS_F1100" name="vorname"><input id="BS_F1200" name="name">
                    <input id="BS_F1300" name="strasse"><input id="BS_F1400" name="ort">
                    <select id="BS_F1600"><option value="S-UNIT">S-UNIT</option>
                    <option value="B-UNIT">B-UNIT</option><option value="Extern">Extern</option></select>
                    <input id="BS_F1700" name="matnr"><input id="BS_F1700" name="mitnr">
                    <input id="BS_F2000" name="email">
                    <input type="checkbox" name="tnbed"{checked}>
                    <input type="submit" value="weiter zur Buchung">
                    </form></body></html>"#
                )
            }
            FormStage::Review => r#"<html><body><form method="post">
                <div class="bs_text_red bs_text_big">Bitte überprüfen Sie Ihre Angaben</div>
                <input type="submit" value="verbindlich buchen">
                </form></body></html>"#
                .to_string(),
            FormStage::Done => {
                r#"<html><body><div class="bs_text_big">Buchung bestätigt</div></body></html>"#
                    .to_string()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum FixturePage {
    Static(String),
    Listing(Listing),
    Form(FormFlow),
}

// ── Engine ──────────────────────────────────────────────────────────

#[derive(Debug)]
struct Context {
    tag: ContextTag,
    url: String,
    /// Address probes answered with `None` before `url` is reported.
    unresolved: Cell<u32>,
}

#[derive(Debug)]
pub struct FixtureEngine {
    pages: HashMap<String, FixturePage>,
    redirects: HashMap<String, String>,
    popups: HashMap<String, Vec<String>>,
    contexts: Vec<Context>,
    active: usize,
    next_tag: u32,
    popup_unresolved: u32,
    toggle_probes: Cell<u32>,

    pub navigations: Vec<String>,
    pub clicks: Vec<String>,
    pub typed: Vec<(String, String)>,
    pub selected: Vec<(String, String)>,
    pub submits: Vec<String>,
    pub screenshots: RefCell<Vec<PathBuf>>,
    pub viewport: Option<(u32, u32)>,
    pub closed: bool,
}

impl FixtureEngine {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            redirects: HashMap::new(),
            popups: HashMap::new(),
            contexts: vec![Context {
                tag: ContextTag::new("ctx-0"),
                url: "about:blank".into(),
                unresolved: Cell::new(0),
            }],
            active: 0,
            next_tag: 1,
            popup_unresolved: 0,
            toggle_probes: Cell::new(0),
            navigations: Vec::new(),
            clicks: Vec::new(),
            typed: Vec::new(),
            selected: Vec::new(),
            submits: Vec::new(),
            screenshots: RefCell::new(Vec::new()),
            viewport: None,
            closed: false,
        }
    }

    pub fn page(mut self, url: &str, page: FixturePage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    pub fn listing(self, listing: Listing) -> Self {
        self.page(LISTING, FixturePage::Listing(listing))
    }

    pub fn redirect(mut self, from: &str, to: &str) -> Self {
        self.redirects.insert(from.into(), to.into());
        self
    }

    /// Clicking `selector` opens one new context per url.
    pub fn popup(mut self, selector: &str, urls: &[&str]) -> Self {
        self.popups
            .insert(selector.into(), urls.iter().map(|u| u.to_string()).collect());
        self
    }

    /// Popup contexts report no address for their first `probes` lookups.
    pub fn popups_unresolved_for(mut self, probes: u32) -> Self {
        self.popup_unresolved = probes;
        self
    }

    pub async fn session(self) -> BrowsingSession<Self> {
        BrowsingSession::new(self).await.unwrap()
    }

    pub fn form(&self) -> Option<&FormFlow> {
        self.pages.get(FORM).and_then(|p| match p {
            FixturePage::Form(flow) => Some(flow),
            _ => None,
        })
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }

    fn url(&self) -> &str {
        &self.contexts[self.active].url
    }

    fn current(&self) -> Result<&FixturePage> {
        self.pages
            .get(self.url())
            .ok_or_else(|| Error::NavigationError(format!("404 {}", self.url())))
    }

    fn current_mut(&mut self) -> Result<&mut FixturePage> {
        let url = self.contexts[self.active].url.clone();
        self.pages
            .get_mut(&url)
            .ok_or_else(|| Error::NavigationError(format!("404 {url}")))
    }

    fn toggle_shown(&self) -> bool {
        match self.current() {
            Ok(FixturePage::Listing(listing)) => {
                listing.toggle_delay.is_some_and(|d| self.toggle_probes.get() >= d)
            }
            _ => false,
        }
    }

    fn render(&self) -> Result<String> {
        Ok(match self.current()? {
            FixturePage::Static(html) => html.clone(),
            FixturePage::Listing(listing) => listing.render(self.toggle_shown()),
            FixturePage::Form(flow) => flow.render(),
        })
    }

    fn exists(&self, selector: &str) -> Result<bool> {
        let sel = Selector::parse(selector).map_err(|e| Error::InvalidSelector(e.to_string()))?;
        let html = Html::parse_document(&self.render()?);
        let found = html.select(&sel).next().is_some();
        Ok(found)
    }

    fn require(&self, selector: &str) -> Result<()> {
        if self.exists(selector)? {
            Ok(())
        } else {
            Err(Error::ElementNotFound(selector.to_string()))
        }
    }
}

#[async_trait(?Send)]
impl Engine for FixtureEngine {
    fn active_context(&self) -> ContextTag {
        self.contexts[self.active].tag.clone()
    }

    async fn contexts(&self) -> Result<Vec<ContextTag>> {
        Ok(self.contexts.iter().map(|c| c.tag.clone()).collect())
    }

    async fn switch_context(&mut self, tag: &ContextTag) -> Result<()> {
        self.active = self
            .contexts
            .iter()
            .position(|c| &c.tag == tag)
            .ok_or_else(|| Error::ContextProtocol(format!("no context {tag}")))?;
        Ok(())
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.navigations.push(url.to_string());
        let target = self.redirects.get(url).cloned().unwrap_or_else(|| url.to_string());
        self.contexts[self.active].url = target;
        self.current()?;
        Ok(())
    }

    async fn current_url(&self) -> Result<Option<String>> {
        let context = &self.contexts[self.active];
        let pending = context.unresolved.get();
        if pending > 0 {
            context.unresolved.set(pending - 1);
            return Ok(None);
        }
        Ok(Some(context.url.clone()))
    }

    async fn page_source(&self) -> Result<String> {
        self.render()
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        if selector == site::FILTER_TOGGLE {
            let shown = self.toggle_shown();
            self.toggle_probes.set(self.toggle_probes.get() + 1);
            return Ok(shown);
        }
        self.exists(selector)
    }

    async fn is_checked(&self, selector: &str) -> Result<bool> {
        self.require(selector)?;
        Ok(match self.current()? {
            FixturePage::Listing(listing) => listing.checked.get(selector).copied().unwrap_or(false),
            FixturePage::Form(flow) if selector == site::EULA_CHECKBOX => flow.eula_checked,
            _ => false,
        })
    }

    async fn click(&mut self, selector: &str) -> Result<()> {
        self.require(selector)?;
        self.clicks.push(selector.to_string());

        match self.current_mut()? {
            FixturePage::Listing(listing) => {
                if let Some(checked) = listing.checked.get_mut(selector) {
                    *checked = !*checked;
                }
            }
            FixturePage::Form(flow) if selector == site::EULA_CHECKBOX => {
                flow.eula_checked = !flow.eula_checked;
            }
            _ => {}
        }

        if let Some(urls) = self.popups.get(selector).cloned() {
            for url in urls {
                let tag = ContextTag::new(format!("ctx-{}", self.next_tag));
                self.next_tag += 1;
                self.contexts.push(Context {
                    tag,
                    url,
                    unresolved: Cell::new(self.popup_unresolved),
                });
            }
        }
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        self.require(selector)?;
        self.typed.push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        self.require(&format!("{selector} option[value=\"{value}\"]"))?;
        self.selected.push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn submit(&mut self, selector: &str) -> Result<()> {
        self.require(selector)?;
        self.submits.push(selector.to_string());

        if let FixturePage::Form(flow) = self.current_mut()? {
            let (needed, next) = match flow.stage {
                FormStage::Details if selector == site::SUBMIT_PROCEED && flow.eula_checked => {
                    (flow.details_submits, FormStage::Review)
                }
                FormStage::Review if selector == site::SUBMIT_CONFIRM => {
                    (flow.confirm_submits, FormStage::Done)
                }
                _ => return Ok(()),
            };
            flow.submits_in_stage += 1;
            if needed.is_some_and(|n| flow.submits_in_stage >= n) {
                flow.stage = next;
                flow.submits_in_stage = 0;
            }
        }
        Ok(())
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.viewport = Some((width, height));
        Ok(())
    }

    async fn screenshot_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, [0x89, b'P', b'N', b'G'])?;
        self.screenshots.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
