//! Embedded Google Calendar view.
//!
//! The calendar itself is Google's hosted embed widget; this module only
//! builds the widget URL for the signed-in user and tracks when the view
//! should be reloaded.

use thiserror::Error;

/// Base URL of Google's embeddable calendar widget.
const EMBED_BASE_URL: &str = "https://calendar.google.com/calendar/embed";

/// Timezone the embedded calendar is rendered in.
pub const CALENDAR_TIMEZONE: &str = "Asia/Kolkata";

/// Default widget size in pixels.
const DEFAULT_WIDTH: u32 = 800;
const DEFAULT_HEIGHT: u32 = 600;

/// Errors building a calendar view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// No calendar identifier (the user's email) was available.
    #[error("a calendar id (the signed-in user's email) is required")]
    MissingCalendarId,
}

/// The calendar panel shown next to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarView {
    calendar_id: String,
    width: u32,
    height: u32,
    generation: u64,
    visible: bool,
}

impl CalendarView {
    /// Creates a view of the calendar identified by `calendar_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::MissingCalendarId`] if the id is blank.
    pub fn new(calendar_id: impl Into<String>) -> Result<Self, CalendarError> {
        let calendar_id = calendar_id.into();
        let calendar_id = calendar_id.trim();
        if calendar_id.is_empty() {
            return Err(CalendarError::MissingCalendarId);
        }

        Ok(Self {
            calendar_id: calendar_id.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            generation: 0,
            visible: true,
        })
    }

    /// Returns the calendar id the view embeds.
    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Returns the embed widget URL.
    pub fn embed_url(&self) -> String {
        format!(
            "{}?src={}&ctz={}",
            EMBED_BASE_URL,
            urlencoding::encode(&self.calendar_id),
            CALENDAR_TIMEZONE,
        )
    }

    /// Returns iframe markup embedding the widget.
    pub fn iframe_html(&self) -> String {
        format!(
            r#"<iframe src="{}" style="border: 0" width="{}" height="{}" frameborder="0" scrolling="no" title="Google Calendar"></iframe>"#,
            self.embed_url().replace('&', "&amp;"),
            self.width,
            self.height,
        )
    }

    /// Asks the view to reload the widget.
    ///
    /// Each call bumps the generation, so a renderer comparing generations
    /// knows the embed must be fetched again.
    pub fn refresh(&mut self) {
        self.generation += 1;
        tracing::debug!(generation = self.generation, "calendar refresh requested");
    }

    /// Returns how many refreshes were requested so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns whether the panel is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Shows or hides the panel, returning the new visibility.
    pub fn toggle(&mut self) -> bool {
        self.visible = !self.visible;
        self.visible
    }

    /// Returns the widget size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_url_encodes_email_and_fixes_timezone() {
        let view = CalendarView::new("ada.lovelace+work@example.com").unwrap();
        assert_eq!(
            view.embed_url(),
            "https://calendar.google.com/calendar/embed?src=ada.lovelace%2Bwork%40example.com&ctz=Asia/Kolkata"
        );
    }

    #[test]
    fn blank_calendar_id_is_rejected() {
        assert_eq!(
            CalendarView::new("").unwrap_err(),
            CalendarError::MissingCalendarId
        );
        assert_eq!(
            CalendarView::new("  \t").unwrap_err(),
            CalendarError::MissingCalendarId
        );
    }

    #[test]
    fn refresh_increments_generation() {
        let mut view = CalendarView::new("ada@example.com").unwrap();
        assert_eq!(view.generation(), 0);
        view.refresh();
        view.refresh();
        assert_eq!(view.generation(), 2);
    }

    #[test]
    fn toggle_flips_visibility() {
        let mut view = CalendarView::new("ada@example.com").unwrap();
        assert!(view.is_visible());
        assert!(!view.toggle());
        assert!(view.toggle());
    }

    #[test]
    fn iframe_markup() {
        let view = CalendarView::new("ada@example.com").unwrap();
        insta::assert_snapshot!(
            view.iframe_html(),
            @r#"<iframe src="https://calendar.google.com/calendar/embed?src=ada%40example.com&amp;ctz=Asia/Kolkata" style="border: 0" width="800" height="600" frameborder="0" scrolling="no" title="Google Calendar"></iframe>"#
        );
    }
}
