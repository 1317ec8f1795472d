//! Deriving a course's booking status from its detail page.

use scraper::ElementRef;
use tracing::info;

use crate::course::{BookingStatus, Course};
use crate::dom::{DomAccessor, Node};
use crate::engine::Engine;
use crate::error::Result;
use crate::session::BrowsingSession;
use crate::site;

/// Structural shape of the element after the booking anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Plain text container, e.g. `<span>ausgebucht</span>`.
    Label,
    /// Something that can be activated.
    Control,
    Other,
}

impl ElementKind {
    pub fn of(tag: &str) -> Self {
        match tag {
            "span" | "label" | "div" | "p" | "strong" | "em" => ElementKind::Label,
            "input" | "button" | "a" => ElementKind::Control,
            _ => ElementKind::Other,
        }
    }
}

/// Status derived from the element following the booking anchor.
///
/// The site reuses its button classes on plain labels, so the element kind
/// is decided before any class is looked at. Anything unrecognized is
/// `Unknown`, never `Bookable`.
pub fn classify_marker(marker: Option<&Node>) -> (BookingStatus, Option<String>) {
    let Some(node) = marker else {
        return (BookingStatus::Unknown, None);
    };
    match ElementKind::of(&node.tag) {
        ElementKind::Label => (BookingStatus::Closed, Some(node.text.clone())),
        _ if node.has_class(site::WAITLIST_CLASS) => (BookingStatus::WaitlistOnly, None),
        _ if node.has_class(site::BOOKING_CLASS) => (BookingStatus::Bookable, None),
        _ => (BookingStatus::Unknown, None),
    }
}

#[derive(Debug, Default)]
pub struct StatusClassifier;

impl StatusClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Load the detail page, record the course name and (re)classify.
    pub async fn classify<E: Engine>(
        &self,
        session: &mut BrowsingSession<E>,
        course: &mut Course,
    ) -> Result<BookingStatus> {
        let detail = course.detail_url.clone();
        session.navigate(&detail).await?;

        let snapshot = DomAccessor::new(session).snapshot(&detail).await?;
        let name = snapshot.first(site::TITLE_BLOCK)?;
        course.name = Some(crate::dom::text_of(name));

        let anchor = snapshot.first(&site::booking_anchor(&course.id))?;
        let marker = anchor
            .next_siblings()
            .find_map(ElementRef::wrap)
            .map(Node::from_element);

        let (status, reason) = classify_marker(marker.as_ref());
        course.status = status;
        course.status_reason = reason;
        info!(course_id = %course.id, %status, "course classified");
        Ok(status)
    }
}
