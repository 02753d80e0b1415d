//! One-shot message.

use std::io::Write;

use planpal_backend::AgentApi;

use crate::app::{App, Screen, SendOutcome};
use crate::bootstrap::Bootstrap;
use crate::error::{ClientError, ClientResult};
use crate::store::SessionRepository;

/// Sends `message` with the stored session and prints the reply.
pub async fn run(bootstrap: &Bootstrap, message: &str) -> ClientResult<()> {
    let mut app = bootstrap.mount_app()?;
    send_one(&mut app, message, &mut std::io::stdout()).await
}

/// Sends one message through `app` and writes the assistant reply.
///
/// Agent failures are not errors: the fallback reply is printed like any
/// other answer.
pub async fn send_one<R, A, O>(app: &mut App<R, A>, message: &str, out: &mut O) -> ClientResult<()>
where
    R: SessionRepository,
    A: AgentApi,
    O: Write,
{
    if app.screen() == Screen::Login {
        return Err(ClientError::AuthRequired(
            "run `planpal auth login` first".to_string(),
        ));
    }

    match app.send_message(message).await {
        SendOutcome::Replied | SendOutcome::Failed => {
            if let Some(reply) = app.transcript().last() {
                writeln!(out, "{}", reply.content)?;
            }
            Ok(())
        }
        SendOutcome::Ignored => Err(ClientError::Action("message is blank".to_string())),
        SendOutcome::NotSignedIn => Err(ClientError::AuthRequired(
            "run `planpal auth login` first".to_string(),
        )),
        SendOutcome::Busy => Err(ClientError::Action("a request is already in flight".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CONNECTION_FALLBACK;
    use crate::store::MemorySessionStore;
    use planpal_backend::{AgentReply, BackendError, BackendResult, BoxFuture};
    use planpal_core::{Session, User};

    struct FixedAgent(Option<&'static str>);

    impl AgentApi for FixedAgent {
        fn send<'a>(
            &'a self,
            _token: &'a str,
            _message: &'a str,
        ) -> BoxFuture<'a, BackendResult<AgentReply>> {
            let result = match self.0 {
                Some(text) => Ok(AgentReply {
                    response: Some(text.to_string()),
                }),
                None => Err(BackendError::server(500, "Internal Server Error")),
            };
            Box::pin(async move { result })
        }
    }

    fn signed_in(agent: FixedAgent) -> App<MemorySessionStore, FixedAgent> {
        let store = MemorySessionStore::with_session(Session::new(
            "t",
            User::new("Ada Lovelace", "ada@example.com"),
        ));
        App::mount(store, agent)
    }

    #[tokio::test]
    async fn prints_reply() {
        let mut app = signed_in(FixedAgent(Some("Meeting booked")));
        let mut out = Vec::new();
        send_one(&mut app, "book it", &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Meeting booked\n");
    }

    #[tokio::test]
    async fn prints_fallback_on_failure() {
        let mut app = signed_in(FixedAgent(None));
        let mut out = Vec::new();
        send_one(&mut app, "book it", &mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("{}\n", CONNECTION_FALLBACK)
        );
    }

    #[tokio::test]
    async fn requires_session() {
        let mut app = App::mount(MemorySessionStore::new(), FixedAgent(Some("x")));
        let err = send_one(&mut app, "hi", &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::AuthRequired(_)));
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let mut app = signed_in(FixedAgent(Some("x")));
        let err = send_one(&mut app, "   ", &mut Vec::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::Action(_)));
        assert_eq!(app.transcript().len(), 1);
    }
}
