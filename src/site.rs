//! Selectors describing the booking site's fixed page structure.

// ── Listing page ────────────────────────────────────────────────────

/// Control that only becomes visible once the listing has rendered.
pub const FILTER_TOGGLE: &str = "#bs_filter_toggle";
/// "Show non-bookable courses" filter checkbox.
pub const FILTER_NON_BOOKABLE: &str = "#bs_flt_nichtbuchbar";
/// "Show booked-out courses" filter checkbox.
pub const FILTER_BOOKED_OUT: &str = "#bs_flt_ausgebucht";

pub const LISTING_FILTERS: [&str; 2] = [FILTER_NON_BOOKABLE, FILTER_BOOKED_OUT];

pub const CELL_COURSE_ID: &str = "td.bs_sknr";
pub const CELL_TIME: &str = "td.bs_szeit";
pub const CELL_WEEKDAY: &str = "td.bs_stag";
pub const CELL_LOCATION: &str = "td.bs_sort";
pub const CELL_LEVEL: &str = "td.bs_sdet";
pub const CELL_DETAIL_LINK: &str = "td.bs_sbuch a[href]";

// ── Detail page ─────────────────────────────────────────────────────

pub const TITLE_BLOCK: &str = "div.bs_head";
pub const WAITLIST_CLASS: &str = "bs_btn_warteliste";
pub const BOOKING_CLASS: &str = "bs_btn_buchen";

/// Id of the anchor placed right before a course's booking control.
pub fn booking_anchor_id(course_id: &str) -> String {
    format!("K{course_id}")
}

pub fn booking_anchor(course_id: &str) -> String {
    format!("a[id=\"{}\"]", booking_anchor_id(course_id))
}

/// The element right after the booking anchor: a button or a status label.
pub fn booking_control(course_id: &str) -> String {
    format!("{} + *", booking_anchor(course_id))
}

// ── Booking form ────────────────────────────────────────────────────

pub fn gender_radio(value: &str) -> String {
    format!("input[name=\"sex\"][value=\"{value}\"]")
}

pub const FIELD_NAME: &str = "input#BS_F1100[name=\"vorname\"]";
pub const FIELD_SURNAME: &str = "input#BS_F1200[name=\"name\"]";
pub const FIELD_STREET: &str = "input#BS_F1300[name=\"strasse\"]";
pub const FIELD_CITY: &str = "input#BS_F1400[name=\"ort\"]";
pub const FIELD_STATUS: &str = "select#BS_F1600";
pub const FIELD_EMAIL: &str = "input#BS_F2000[name=\"email\"]";

pub fn pid_field(name: &str) -> String {
    format!("input#BS_F1700[name=\"{name}\"]")
}

/// Terms agreement checkbox. Only present on the details step.
pub const EULA_CHECKBOX: &str = "input[name=\"tnbed\"]";

pub const SUBMIT_PROCEED: &str = "input[type=\"submit\"][value=\"weiter zur Buchung\"]";
pub const SUBMIT_CONFIRM: &str = "input[type=\"submit\"][value=\"verbindlich buchen\"]";

/// Banner shown while the booking awaits final confirmation.
pub const CONFIRMATION_BANNER: &str = "div.bs_text_red.bs_text_big";

/// Viewport used on the booking form so no field is clipped.
pub const FORM_VIEWPORT: (u32, u32) = (1000, 1500);

pub const DEFAULT_CONFIRMATION_FILE: &str = "confirmation.png";
