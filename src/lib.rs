pub mod booking;
pub mod browser;
pub mod classifier;
pub mod config;
pub mod course;
pub mod credentials;
pub mod dom;
pub mod engine;
pub mod error;
pub mod locator;
pub mod page;
pub mod session;
pub mod site;
pub mod waiter;

pub use booking::{BookingOrchestrator, BookingReceipt, BookingState};
pub use browser::ChromeEngine;
pub use classifier::StatusClassifier;
pub use config::{BookingConfig, BrowserConfig, BrowserKind, SiteConfig, Timeouts};
pub use course::{BookingStatus, Course};
pub use credentials::{Credentials, Gender, RegistrationStatus};
pub use dom::DomAccessor;
pub use engine::{ContextTag, Engine};
pub use error::{Error, Result};
pub use locator::CourseLocator;
pub use session::BrowsingSession;
pub use waiter::{SubmissionOutcome, SubmissionWaiter};
