//! The booking protocol: detail page → form in a new tab → review → done.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;
use url::Url;

use crate::classifier::StatusClassifier;
use crate::config::BookingConfig;
use crate::course::Course;
use crate::credentials::Credentials;
use crate::dom::DomAccessor;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::locator::CourseLocator;
use crate::session::BrowsingSession;
use crate::site;
use crate::waiter::{wait_for_visible, SubmissionWaiter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    Idle,
    DetailsEntered,
    FormSubmitted,
    Confirmed,
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Proof that a booking went through.
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    pub course_id: String,
    /// Screenshot of the final page.
    pub artifact: PathBuf,
    pub details_attempts: u32,
    pub confirm_attempts: u32,
}

/// Owns the browsing session and walks one course through the booking
/// form.
///
/// Steps must run in order. A failed step leaves the session where it
/// stopped; nothing is rolled back.
pub struct BookingOrchestrator<E: Engine> {
    session: BrowsingSession<E>,
    config: BookingConfig,
    state: BookingState,
    form_url: Option<Url>,
    details_attempts: u32,
    confirm_attempts: u32,
}

impl<E: Engine> BookingOrchestrator<E> {
    pub fn new(session: BrowsingSession<E>, config: BookingConfig) -> Self {
        Self {
            session,
            config,
            state: BookingState::Idle,
            form_url: None,
            details_attempts: 0,
            confirm_attempts: 0,
        }
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn session(&self) -> &BrowsingSession<E> {
        &self.session
    }

    /// Give the session back. Closing the browser is the caller's call.
    pub fn into_session(self) -> BrowsingSession<E> {
        self.session
    }

    /// Locate `course_id` on the listing and classify it.
    pub async fn lookup(&mut self, course_id: &str) -> Result<Course> {
        let mut course = CourseLocator::new(&self.config.site, &self.config.timeouts)
            .locate(&mut self.session, course_id)
            .await?;
        self.classify(&mut course).await?;
        Ok(course)
    }

    /// Re-run the status classification of `course`.
    pub async fn classify(&mut self, course: &mut Course) -> Result<()> {
        StatusClassifier::new()
            .classify(&mut self.session, course)
            .await?;
        Ok(())
    }

    /// Run every step and capture the confirmation page.
    pub async fn book(
        &mut self,
        course: &Course,
        credentials: &Credentials,
        destination: Option<&Path>,
    ) -> Result<BookingReceipt> {
        self.enter_details(course, credentials).await?;
        self.submit_details().await?;
        self.confirm().await?;
        let destination = destination.unwrap_or_else(|| Path::new(site::DEFAULT_CONFIRMATION_FILE));
        let artifact = self.capture_confirmation(destination).await?;
        Ok(BookingReceipt {
            course_id: course.id().to_string(),
            artifact,
            details_attempts: self.details_attempts,
            confirm_attempts: self.confirm_attempts,
        })
    }

    /// `Idle → DetailsEntered`: open the form in its new tab and fill it in.
    pub async fn enter_details(&mut self, course: &Course, credentials: &Credentials) -> Result<()> {
        self.expect_state("enter details", BookingState::Idle)?;
        if !course.is_bookable() {
            return Err(Error::CourseNotBookable {
                course_id: course.id().to_string(),
                status: course.status(),
            });
        }
        credentials.validate()?;

        let timeouts = self.config.timeouts;
        let detail = course.detail_url().clone();
        self.session.navigate(&detail).await?;

        let control = site::booking_control(course.id());
        // Missing control is ElementNotFound, not a click into nothing.
        DomAccessor::new(&self.session).query(&detail, &control).await?;

        let tab = self
            .session
            .open_context_by_click(&control, timeouts.new_context, timeouts.poll_interval)
            .await?;
        self.session.switch_to(&tab).await?;
        let form = self
            .session
            .sync_address(timeouts.page_load, timeouts.poll_interval)
            .await?;

        let (width, height) = site::FORM_VIEWPORT;
        self.session.set_viewport(width, height).await?;

        wait_for_visible(
            &self.session,
            &form,
            site::EULA_CHECKBOX,
            timeouts.page_load,
            timeouts.poll_interval,
        )
        .await?;

        self.fill_form(&form, credentials).await?;
        info!(course_id = course.id(), form = %form, "booking details entered");
        self.form_url = Some(form);
        self.state = BookingState::DetailsEntered;
        Ok(())
    }

    async fn fill_form(&mut self, form: &Url, credentials: &Credentials) -> Result<()> {
        DomAccessor::new(&self.session).check(form).await?;

        self.session
            .click(&site::gender_radio(credentials.gender.form_value()))
            .await?;
        self.session.type_text(site::FIELD_NAME, &credentials.name).await?;
        self.session
            .type_text(site::FIELD_SURNAME, &credentials.surname)
            .await?;
        self.session
            .type_text(site::FIELD_STREET, &credentials.street_line())
            .await?;
        self.session
            .type_text(site::FIELD_CITY, &credentials.city_line())
            .await?;
        self.session
            .select_option(site::FIELD_STATUS, credentials.status.form_value())
            .await?;

        if let (Some(field), Some(pid)) = (credentials.status.pid_field(), &credentials.pid) {
            self.session.type_text(&site::pid_field(field), pid).await?;
        }

        self.session
            .type_text(site::FIELD_EMAIL, &credentials.email)
            .await?;

        if !DomAccessor::new(&self.session)
            .is_checked(form, site::EULA_CHECKBOX)
            .await?
        {
            self.session.click(site::EULA_CHECKBOX).await?;
        }
        Ok(())
    }

    /// `DetailsEntered → FormSubmitted`: proceed until the terms checkbox
    /// is gone.
    pub async fn submit_details(&mut self) -> Result<()> {
        self.expect_state("submit details", BookingState::DetailsEntered)?;
        let form = self.form()?;
        self.details_attempts = self
            .waiter()
            .wait_until_advanced(&mut self.session, &form, site::SUBMIT_PROCEED, site::EULA_CHECKBOX)
            .await?;
        info!(attempts = self.details_attempts, "booking form submitted");
        self.state = BookingState::FormSubmitted;
        Ok(())
    }

    /// `FormSubmitted → Confirmed`: confirm until the review banner is gone.
    pub async fn confirm(&mut self) -> Result<()> {
        self.expect_state("confirm", BookingState::FormSubmitted)?;
        let form = self.form()?;
        self.confirm_attempts = self
            .waiter()
            .wait_until_advanced(
                &mut self.session,
                &form,
                site::SUBMIT_CONFIRM,
                site::CONFIRMATION_BANNER,
            )
            .await?;
        info!(attempts = self.confirm_attempts, "booking confirmed");
        self.state = BookingState::Confirmed;
        Ok(())
    }

    /// Screenshot the confirmed page to `destination`.
    pub async fn capture_confirmation(&mut self, destination: &Path) -> Result<PathBuf> {
        self.expect_state("capture confirmation", BookingState::Confirmed)?;
        self.session.screenshot(destination).await?;
        Ok(destination.to_path_buf())
    }

    fn waiter(&self) -> SubmissionWaiter {
        SubmissionWaiter::new(
            self.config.timeouts.submission_retry,
            self.config.timeouts.submission,
        )
    }

    fn form(&self) -> Result<Url> {
        self.form_url.clone().ok_or(Error::OutOfOrder {
            step: "submit",
            state: self.state.to_string(),
        })
    }

    fn expect_state(&self, step: &'static str, expected: BookingState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::OutOfOrder {
                step,
                state: self.state.to_string(),
            })
        }
    }
}
