//! Terminal rendering of the PlanPal screens.

use std::fmt::Write as _;

use planpal_core::{CalendarView, Message, PrivacyPolicy, Role, Transcript};

use crate::app::INPUT_PLACEHOLDER;

/// Display name of the assistant.
const BOT_NAME: &str = "PlanPal";

/// Line shown under the transcript while the agent is working.
pub const LOADING_INDICATOR: &str = "PlanPal: . . .";

/// Renders the sign-in screen.
pub fn login_screen() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Welcome to {}", BOT_NAME);
    let _ = writeln!(
        out,
        "Your intelligent calendar assistant. Log in to continue."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "[ Sign in with Google ]  press Enter, or /quit to leave");
    out
}

/// Renders the chat header.
pub fn chat_header() -> String {
    format!("{} · Online\n", BOT_NAME)
}

/// Renders the input prompt.
pub fn prompt() -> String {
    format!("({}) > ", INPUT_PLACEHOLDER)
}

/// Renders one message.
///
/// Continuation lines are indented under the first so multi-line replies
/// stay readable.
pub fn message(message: &Message) -> String {
    let label = match message.role {
        Role::User => "You",
        Role::Assistant => BOT_NAME,
    };
    let indent = " ".repeat(label.len() + 2);

    let mut out = String::new();
    let mut lines = message.content.lines();
    let _ = writeln!(out, "{}: {}", label, lines.next().unwrap_or_default());
    for line in lines {
        let _ = writeln!(out, "{}{}", indent, line);
    }
    out
}

/// Renders the calendar panel, or nothing when it is hidden.
pub fn calendar_panel(calendar: &CalendarView) -> String {
    if !calendar.is_visible() {
        return String::new();
    }
    format!(
        "[calendar #{}] {}\n",
        calendar.generation(),
        calendar.embed_url()
    )
}

/// Renders the privacy policy page.
pub fn privacy_page(policy: &PrivacyPolicy) -> String {
    let mut out = policy.render_text();
    let _ = writeln!(out);
    let _ = writeln!(out, "Back to the app: planpal open /");
    out
}

/// Help text for the chat slash commands.
pub fn chat_help() -> String {
    [
        "/calendar  show or hide the calendar panel",
        "/open      open the calendar in the browser",
        "/logout    sign out and forget the session",
        "/quit      leave",
    ]
    .iter()
    .fold(String::new(), |mut out, line| {
        let _ = writeln!(out, "{}", line);
        out
    })
}

/// Scroll state of the message list.
///
/// The terminal only ever appends, so "scrolling to the newest message"
/// means emitting whatever was appended since the last render.
#[derive(Debug, Default)]
pub struct ChatView {
    rendered: usize,
}

impl ChatView {
    /// Creates a view that has not rendered anything yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets what was rendered, e.g. after a logout replaced the transcript.
    pub fn reset(&mut self) {
        self.rendered = 0;
    }

    /// Returns the rendering of every message not shown yet and marks them
    /// as shown.
    pub fn scroll_to_latest(&mut self, transcript: &Transcript) -> String {
        if self.rendered > transcript.len() {
            self.rendered = 0;
        }
        let out = transcript.since(self.rendered).iter().map(message).collect();
        self.rendered = transcript.len();
        out
    }

    /// Renders a message that is about to be appended and counts it as shown.
    pub fn echo(&mut self, pending: &Message) -> String {
        self.rendered += 1;
        message(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_login_screen() {
        insta::assert_snapshot!(login_screen(), @r"
        Welcome to PlanPal
        Your intelligent calendar assistant. Log in to continue.

        [ Sign in with Google ]  press Enter, or /quit to leave
        ");
    }

    #[test]
    fn renders_multiline_message() {
        let rendered = message(&Message::assistant("Booked:\n- Lunch 12:00\n- Sync 15:00"));
        insta::assert_snapshot!(rendered, @r"
        PlanPal: Booked:
                 - Lunch 12:00
                 - Sync 15:00
        ");
    }

    #[test]
    fn renders_user_message() {
        assert_eq!(message(&Message::user("hi")), "You: hi\n");
        assert_eq!(message(&Message::user("")), "You: \n");
    }

    #[test]
    fn calendar_panel_respects_visibility() {
        let mut calendar = CalendarView::new("ada@example.com").unwrap();
        calendar.refresh();
        assert_eq!(
            calendar_panel(&calendar),
            "[calendar #1] https://calendar.google.com/calendar/embed?src=ada%40example.com&ctz=Asia/Kolkata\n"
        );

        calendar.toggle();
        assert_eq!(calendar_panel(&calendar), "");
    }

    #[test]
    fn chat_view_emits_only_new_messages() {
        let mut transcript = Transcript::new();
        let mut view = ChatView::new();

        transcript.push(Message::assistant("Hello Ada!"));
        assert_eq!(view.scroll_to_latest(&transcript), "PlanPal: Hello Ada!\n");
        assert_eq!(view.scroll_to_latest(&transcript), "");

        transcript.push(Message::user("hi"));
        transcript.push(Message::assistant("hey"));
        assert_eq!(
            view.scroll_to_latest(&transcript),
            "You: hi\nPlanPal: hey\n"
        );
    }

    #[test]
    fn echoed_message_is_not_rendered_twice() {
        let mut transcript = Transcript::new();
        let mut view = ChatView::new();

        let pending = Message::user("book lunch");
        assert_eq!(view.echo(&pending), "You: book lunch\n");
        transcript.push(pending);
        transcript.push(Message::assistant("Booked."));
        assert_eq!(view.scroll_to_latest(&transcript), "PlanPal: Booked.\n");
    }

    #[test]
    fn chat_view_restarts_after_transcript_shrinks() {
        let mut long = Transcript::new();
        long.push(Message::user("a"));
        long.push(Message::user("b"));
        let mut view = ChatView::new();
        view.scroll_to_latest(&long);

        let mut fresh = Transcript::new();
        fresh.push(Message::assistant("Hello again"));
        assert_eq!(view.scroll_to_latest(&fresh), "PlanPal: Hello again\n");
    }

    #[test]
    fn privacy_page_links_back_home() {
        let page = privacy_page(&PrivacyPolicy::current());
        assert!(page.starts_with("Privacy Policy for PlanPal\n"));
        assert!(page.ends_with("Back to the app: planpal open /\n"));
    }
}
