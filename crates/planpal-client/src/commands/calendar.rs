//! Calendar command.

use planpal_core::{CalendarView, Session};

use crate::bootstrap::Bootstrap;
use crate::error::{ClientError, ClientResult};
use crate::store::SessionRepository;

/// Prints (or opens) the embedded calendar of the signed-in user.
pub fn show(bootstrap: &Bootstrap, open: bool, html: bool) -> ClientResult<()> {
    let session = bootstrap.session_store().load()?.ok_or_else(|| {
        ClientError::AuthRequired("run `planpal auth login` first".to_string())
    })?;
    let view = view_for(&session)?;

    if open {
        super::open_in_browser(&view.embed_url())
    } else {
        println!("{}", render(&view, html));
        Ok(())
    }
}

fn view_for(session: &Session) -> ClientResult<CalendarView> {
    Ok(CalendarView::new(session.user().email.as_str())?)
}

fn render(view: &CalendarView, html: bool) -> String {
    if html {
        view.iframe_html()
    } else {
        view.embed_url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planpal_core::{CalendarError, User};

    #[test]
    fn renders_url_for_user() {
        let session = Session::new("t", User::new("Ada", "ada+work@example.com"));
        let view = view_for(&session).unwrap();
        assert_eq!(
            render(&view, false),
            "https://calendar.google.com/calendar/embed?src=ada%2Bwork%40example.com&ctz=Asia/Kolkata"
        );
        assert!(render(&view, true).starts_with("<iframe"));
    }

    #[test]
    fn user_without_email_has_no_calendar() {
        let session = Session::new("t", User::new("Ada", " "));
        assert!(matches!(
            view_for(&session),
            Err(ClientError::Calendar(CalendarError::MissingCalendarId))
        ));
    }
}
