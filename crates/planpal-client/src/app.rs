//! Session and conversation controller.
//!
//! [`App`] owns everything the chat screen shows: the session, the
//! transcript, the input line, the loading flag and the calendar panel. It
//! is either signed out ([`Screen::Login`]) or signed in ([`Screen::Chat`]);
//! the initial state comes straight from the session repository.

use planpal_backend::AgentApi;
use planpal_core::{AuthPayload, CalendarView, Message, Session, Transcript, User};
use tracing::{debug, error, info, warn};

use crate::store::{SessionRepository, StoreError};

/// Assistant reply appended when the agent cannot be reached or fails.
pub const CONNECTION_FALLBACK: &str =
    "I'm having trouble connecting. Please check your connection and try again.";

/// Assistant reply appended when the agent answered without text.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, something went wrong.";

/// Placeholder of the message input.
pub const INPUT_PLACEHOLDER: &str = "Book a meeting for tomorrow...";

/// Builds the greeting shown when a signed-in user opens an empty chat.
pub fn welcome_message(first_name: &str) -> String {
    format!(
        "Hello {}! I'm PlanPal. How can I help you with your calendar today?",
        first_name
    )
}

/// Which top-level screen the home route shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// No session: show the sign-in screen.
    Login,
    /// Signed in: show chat and calendar.
    Chat,
}

/// Result of a send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was appended or sent.
    Ignored,
    /// Not signed in; nothing was appended or sent.
    NotSignedIn,
    /// A request is already in flight; nothing was appended or sent.
    Busy,
    /// The agent replied and its answer was appended.
    Replied,
    /// The agent call failed and the fallback reply was appended.
    Failed,
}

/// The chat application state machine.
pub struct App<R, A> {
    store: R,
    agent: A,
    session: Option<Session>,
    transcript: Transcript,
    input: String,
    loading: bool,
    calendar: Option<CalendarView>,
    refreshes: u64,
}

impl<R: SessionRepository, A: AgentApi> App<R, A> {
    /// Creates the app, restoring a stored session if there is one.
    ///
    /// A store that cannot be read is treated as empty.
    pub fn mount(store: R, agent: A) -> Self {
        let stored = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to read stored session");
            None
        });

        let mut app = Self {
            store,
            agent,
            session: None,
            transcript: Transcript::new(),
            input: String::new(),
            loading: false,
            calendar: None,
            refreshes: 0,
        };

        if let Some(session) = stored {
            debug!(email = %session.user().email, "restored session");
            app.enter_session(session);
        }

        app
    }

    /// Returns the screen to show.
    pub fn screen(&self) -> Screen {
        if self.session.is_some() {
            Screen::Chat
        } else {
            Screen::Login
        }
    }

    /// Returns the active session.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Returns the signed-in user.
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(Session::user)
    }

    /// Signs in with the payload of a successful code exchange.
    ///
    /// The session becomes active even if persisting it fails; the storage
    /// error is returned so the caller can tell the user it will not survive
    /// a restart.
    pub fn login_succeeded(&mut self, payload: AuthPayload) -> Result<(), StoreError> {
        let session = Session::from(payload);
        let saved = self.store.save(&session);
        if let Err(ref e) = saved {
            error!(error = %e, "failed to persist session");
        }

        if self.session.is_some() {
            self.reset_conversation();
        }
        info!(email = %session.user().email, "session started");
        self.enter_session(session);
        saved
    }

    /// Signs out, clearing both the in-memory state and the store.
    ///
    /// In-memory state is always cleared; a storage failure is returned.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.session = None;
        self.reset_conversation();
        info!("session ended");

        self.store.clear().inspect_err(|e| {
            error!(error = %e, "failed to clear stored session");
        })
    }

    /// Returns the transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the current input line.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replaces the input line.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Returns true while an agent request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns true if the send affordance is enabled.
    pub fn can_submit(&self) -> bool {
        !self.loading && self.session.is_some() && !self.input.trim().is_empty()
    }

    /// Returns the calendar panel, if signed in.
    pub fn calendar(&self) -> Option<&CalendarView> {
        self.calendar.as_ref()
    }

    /// Returns how many exchanges have asked the calendar to refresh.
    ///
    /// Counts every finished send, with or without a calendar to refresh.
    pub fn calendar_generation(&self) -> u64 {
        self.refreshes
    }

    /// Shows or hides the calendar panel. Returns the new visibility, or
    /// `None` when there is no calendar to show.
    pub fn toggle_calendar(&mut self) -> Option<bool> {
        self.calendar.as_mut().map(CalendarView::toggle)
    }

    /// Sends the current input line.
    ///
    /// Blank input is left untouched and nothing happens. Otherwise the
    /// input is cleared and sent as in [`App::send_message`].
    pub async fn submit(&mut self) -> SendOutcome {
        if self.input.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        if self.loading {
            return SendOutcome::Busy;
        }
        if self.session.is_none() {
            return SendOutcome::NotSignedIn;
        }
        let text = std::mem::take(&mut self.input);
        self.send_message(text).await
    }

    /// Sends `text` to the agent and appends the exchange to the transcript.
    ///
    /// The user message is appended first, verbatim. Whatever the agent call
    /// does, exactly one assistant message follows, the loading flag ends up
    /// false and the calendar is refreshed once.
    pub async fn send_message(&mut self, text: impl Into<String>) -> SendOutcome {
        let text = text.into();
        if text.trim().is_empty() {
            return SendOutcome::Ignored;
        }
        if self.loading {
            return SendOutcome::Busy;
        }
        let Some(token) = self.session.as_ref().map(|s| s.token().to_string()) else {
            warn!("dropping message sent without a session");
            return SendOutcome::NotSignedIn;
        };

        self.transcript.push(Message::user(text.as_str()));
        self.loading = true;

        let result = self.agent.send(&token, &text).await;

        let outcome = match result {
            Ok(reply) => {
                let content = reply
                    .response
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());
                self.transcript.push(Message::assistant(content));
                SendOutcome::Replied
            }
            Err(e) => {
                error!(error = %e, "failed to fetch from agent");
                self.transcript.push(Message::assistant(CONNECTION_FALLBACK));
                SendOutcome::Failed
            }
        };

        self.finish_exchange();
        outcome
    }

    fn finish_exchange(&mut self) {
        self.loading = false;
        self.refreshes += 1;
        if let Some(calendar) = self.calendar.as_mut() {
            calendar.refresh();
        }
    }

    fn enter_session(&mut self, session: Session) {
        self.calendar = match CalendarView::new(session.user().email.as_str()) {
            Ok(view) => Some(view),
            Err(e) => {
                warn!(error = %e, "signed-in user has no calendar to show");
                None
            }
        };

        if self.transcript.is_empty()
            && let Some(first_name) = session.user().first_name()
        {
            self.transcript
                .push(Message::assistant(welcome_message(first_name)));
        }

        self.session = Some(session);
    }

    fn reset_conversation(&mut self) {
        self.transcript = Transcript::new();
        self.input.clear();
        self.loading = false;
        self.calendar = None;
    }
}
