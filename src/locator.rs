//! Finding a course on the listing page.

use scraper::ElementRef;
use tracing::{debug, info};

use crate::config::{SiteConfig, Timeouts};
use crate::course::{BookingStatus, Course};
use crate::dom::{parse_selector, text_of, DomAccessor, PageSnapshot};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::session::BrowsingSession;
use crate::site;
use crate::waiter::{wait_for_checked, wait_for_visible};

pub struct CourseLocator<'a> {
    site: &'a SiteConfig,
    timeouts: &'a Timeouts,
}

impl<'a> CourseLocator<'a> {
    pub fn new(site: &'a SiteConfig, timeouts: &'a Timeouts) -> Self {
        Self { site, timeouts }
    }

    /// Load the listing, reveal hidden rows and read the row of `course_id`.
    ///
    /// Filters must be applied before the row lookup: rows of non-bookable
    /// and booked-out courses are not rendered until then.
    pub async fn locate<E: Engine>(
        &self,
        session: &mut BrowsingSession<E>,
        course_id: &str,
    ) -> Result<Course> {
        let listing = &self.site.listing_url;
        session.navigate(listing).await?;

        wait_for_visible(
            session,
            listing,
            site::FILTER_TOGGLE,
            self.timeouts.page_load,
            self.timeouts.poll_interval,
        )
        .await?;

        self.enable_filters(session).await?;

        let snapshot = DomAccessor::new(session).snapshot(listing).await?;
        let course = self.read_row(&snapshot, course_id)?;
        info!(course_id, detail = %course.detail_url, "course located");
        Ok(course)
    }

    /// Check both visibility filters, leaving already checked ones alone.
    async fn enable_filters<E: Engine>(&self, session: &mut BrowsingSession<E>) -> Result<()> {
        let listing = &self.site.listing_url;
        for filter in site::LISTING_FILTERS {
            if DomAccessor::new(session).is_checked(listing, filter).await? {
                debug!(filter, "filter already enabled");
                continue;
            }
            session.click(filter).await?;
            wait_for_checked(
                session,
                listing,
                filter,
                self.timeouts.page_load,
                self.timeouts.poll_interval,
            )
            .await?;
        }
        Ok(())
    }

    fn read_row(&self, snapshot: &PageSnapshot, course_id: &str) -> Result<Course> {
        let wanted = course_id.trim();
        let mut matches = snapshot
            .select_all(site::CELL_COURSE_ID)?
            .into_iter()
            .filter(|cell| text_of(*cell) == wanted);

        let cell = matches
            .next()
            .ok_or_else(|| Error::CourseIdNotListed(wanted.to_string()))?;
        if matches.next().is_some() {
            return Err(Error::CourseIdAmbiguous(wanted.to_string()));
        }

        let row = cell
            .parent()
            .and_then(ElementRef::wrap)
            .ok_or_else(|| Error::ElementNotFound(format!("row of course {wanted}")))?;

        let href = row_cell(row, site::CELL_DETAIL_LINK, wanted)?
            .value()
            .attr("href")
            .ok_or_else(|| Error::ElementNotFound(format!("detail link of course {wanted}")))?
            .to_string();

        Ok(Course {
            id: wanted.to_string(),
            time: text_of(row_cell(row, site::CELL_TIME, wanted)?),
            weekday: text_of(row_cell(row, site::CELL_WEEKDAY, wanted)?),
            location: text_of(row_cell(row, site::CELL_LOCATION, wanted)?),
            level: text_of(row_cell(row, site::CELL_LEVEL, wanted)?),
            detail_url: self.site.resolve(&href)?,
            name: None,
            status: BookingStatus::Unknown,
            status_reason: None,
        })
    }
}

fn row_cell<'r>(row: ElementRef<'r>, selector: &str, course_id: &str) -> Result<ElementRef<'r>> {
    let sel = parse_selector(selector)?;
    row.select(&sel)
        .next()
        .ok_or_else(|| Error::ElementNotFound(format!("{selector} in row of course {course_id}")))
}
