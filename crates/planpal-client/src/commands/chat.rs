//! Interactive chat.
//!
//! The loop shows the sign-in screen while there is no session and the
//! chat once there is one. Input is read one line at a time and never
//! while a request is in flight.

use std::io::Write;

use planpal_backend::{AgentApi, AuthExchange, Authorizer, Login};
use planpal_core::Message;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::app::{App, Screen, SendOutcome};
use crate::bootstrap::Bootstrap;
use crate::error::ClientResult;
use crate::render::{self, ChatView};
use crate::store::SessionRepository;

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Quit,
    Help,
    ToggleCalendar,
    OpenCalendar,
    Logout,
    Unknown(&'a str),
    Say(&'a str),
}

impl<'a> ChatCommand<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('/') {
            return Self::Say(line);
        }
        match trimmed {
            "/quit" | "/exit" => Self::Quit,
            "/help" => Self::Help,
            "/calendar" => Self::ToggleCalendar,
            "/open" => Self::OpenCalendar,
            "/logout" => Self::Logout,
            other => Self::Unknown(other),
        }
    }
}

/// Runs the chat on the terminal.
pub async fn run(bootstrap: &Bootstrap) -> ClientResult<()> {
    let mut app = bootstrap.mount_app()?;
    let input = BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    run_loop(&mut app, || bootstrap.login(), input, &mut output).await
}

/// Drives `app` from `input` until EOF or `/quit`.
///
/// `login` builds the sign-in flow when one is needed; a failure to build it
/// (e.g. no client id) ends the loop with that error.
pub async fn run_loop<R, A, P, E, F, I, O>(
    app: &mut App<R, A>,
    login: F,
    mut input: I,
    output: &mut O,
) -> ClientResult<()>
where
    R: SessionRepository,
    A: AgentApi,
    P: Authorizer,
    E: AuthExchange,
    F: Fn() -> ClientResult<Login<P, E>>,
    I: AsyncBufRead + Unpin,
    O: Write,
{
    let mut view = ChatView::new();
    let mut shown: Option<Screen> = None;

    loop {
        let screen = app.screen();
        if shown != Some(screen) {
            enter_screen(app, &mut view, output)?;
            shown = Some(screen);
        }

        if screen == Screen::Chat {
            write!(output, "{}", render::prompt())?;
        }
        output.flush()?;

        let Some(line) = next_line(&mut input).await? else {
            debug!("input closed");
            break;
        };

        match screen {
            Screen::Login => {
                if matches!(ChatCommand::parse(&line), ChatCommand::Quit) {
                    break;
                }
                let flow = login()?;
                writeln!(output, "Opening Google sign-in in your browser...")?;
                output.flush()?;
                match flow.sign_in().await {
                    Ok(payload) => {
                        if let Err(e) = app.login_succeeded(payload) {
                            warn!(error = %e, "session could not be stored");
                            writeln!(output, "Signed in, but the session was not saved: {}", e)?;
                        }
                    }
                    Err(_) => writeln!(output, "Sign-in did not complete.")?,
                }
            }
            Screen::Chat => match ChatCommand::parse(&line) {
                ChatCommand::Quit => break,
                ChatCommand::Help => write!(output, "{}", render::chat_help())?,
                ChatCommand::ToggleCalendar => match app.toggle_calendar() {
                    Some(true) => {
                        if let Some(calendar) = app.calendar() {
                            write!(output, "{}", render::calendar_panel(calendar))?;
                        }
                    }
                    Some(false) => writeln!(output, "Calendar hidden.")?,
                    None => writeln!(output, "No calendar available for this account.")?,
                },
                ChatCommand::OpenCalendar => match app.calendar() {
                    Some(calendar) => {
                        if let Err(e) = super::open_in_browser(&calendar.embed_url()) {
                            writeln!(output, "{}", e)?;
                        }
                    }
                    None => writeln!(output, "No calendar available for this account.")?,
                },
                ChatCommand::Logout => {
                    if let Err(e) = app.logout() {
                        writeln!(output, "Signed out, but the stored session could not be removed: {}", e)?;
                    }
                    view.reset();
                }
                ChatCommand::Unknown(command) => {
                    writeln!(output, "Unknown command `{}`. Type /help.", command)?
                }
                ChatCommand::Say(text) => {
                    app.set_input(text);
                    if !app.can_submit() {
                        continue;
                    }
                    write!(output, "{}", view.echo(&Message::user(app.input())))?;
                    writeln!(output, "{}", render::LOADING_INDICATOR)?;
                    output.flush()?;

                    let outcome = app.submit().await;
                    debug!(?outcome, "message handled");
                    write!(output, "{}", view.scroll_to_latest(app.transcript()))?;
                    if matches!(outcome, SendOutcome::Replied | SendOutcome::Failed)
                        && let Some(calendar) = app.calendar()
                    {
                        write!(output, "{}", render::calendar_panel(calendar))?;
                    }
                }
            },
        }
    }

    output.flush()?;
    Ok(())
}

fn enter_screen<R, A, O>(app: &App<R, A>, view: &mut ChatView, output: &mut O) -> ClientResult<()>
where
    R: SessionRepository,
    A: AgentApi,
    O: Write,
{
    match app.screen() {
        Screen::Login => write!(output, "{}", render::login_screen())?,
        Screen::Chat => {
            write!(output, "{}", render::chat_header())?;
            if let Some(calendar) = app.calendar() {
                write!(output, "{}", render::calendar_panel(calendar))?;
            }
            write!(output, "{}", view.scroll_to_latest(app.transcript()))?;
        }
    }
    Ok(())
}

async fn next_line<I: AsyncBufRead + Unpin>(input: &mut I) -> ClientResult<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
