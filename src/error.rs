use std::time::Duration;

use thiserror::Error;

use crate::course::BookingStatus;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Browser launch failed: {0}")]
    LaunchError(String),

    #[error("Navigation failed: {0}")]
    NavigationError(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("Screenshot failed: {0}")]
    ScreenshotError(String),

    #[error("Loading the page failed: {0}")]
    LoadingFailed(String),

    #[error("Course with ID {0} not found")]
    CourseIdNotListed(String),

    #[error("Course with ID {0} is listed more than once")]
    CourseIdAmbiguous(String),

    #[error("Course with ID {course_id} has non-bookable status: {status}")]
    CourseNotBookable {
        course_id: String,
        status: BookingStatus,
    },

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Submitting '{submit}' did not remove '{marker}' after {attempts} attempts ({elapsed:?})")]
    SubmissionTimeout {
        submit: String,
        marker: String,
        attempts: u32,
        elapsed: Duration,
    },

    #[error("Expected page {expected}, but the session is on {actual}")]
    NavigationMismatch { expected: String, actual: String },

    #[error("Browsing context protocol violated: {0}")]
    ContextProtocol(String),

    #[error("Booking step '{step}' is not allowed in state {state}")]
    OutOfOrder { step: &'static str, state: String },

    #[error("CDP error: {0}")]
    CdpError(#[from] chromiumoxide::error::CdpError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
