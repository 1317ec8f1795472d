use std::fmt;

use url::Url;

/// Whether a course can be booked right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingStatus {
    Bookable,
    WaitlistOnly,
    Closed,
    /// Not classified yet, or the detail page showed something unrecognized.
    #[default]
    Unknown,
}

impl BookingStatus {
    pub fn allows_booking(self) -> bool {
        self == BookingStatus::Bookable
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Bookable => "bookable",
            BookingStatus::WaitlistOnly => "waitlist only",
            BookingStatus::Closed => "closed",
            BookingStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One course offering as scraped from the listing and detail pages.
#[derive(Debug, Clone)]
pub struct Course {
    pub(crate) id: String,
    pub(crate) time: String,
    pub(crate) weekday: String,
    pub(crate) location: String,
    pub(crate) level: String,
    pub(crate) detail_url: Url,
    pub(crate) name: Option<String>,
    pub(crate) status: BookingStatus,
    pub(crate) status_reason: Option<String>,
}

impl Course {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn weekday(&self) -> &str {
        &self.weekday
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn detail_url(&self) -> &Url {
        &self.detail_url
    }

    /// Display name from the detail page, once classified.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// Label text shown for a closed course.
    pub fn status_reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }

    pub fn is_bookable(&self) -> bool {
        self.status.allows_booking()
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}: {} {}, {} {}, {}",
            self.id,
            self.name.as_deref().unwrap_or(""),
            self.level,
            self.weekday,
            self.time,
            self.location
        )
    }
}
