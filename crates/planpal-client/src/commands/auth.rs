//! Authentication commands.

use std::io::Write;

use planpal_core::Session;
use tracing::info;

use crate::bootstrap::Bootstrap;
use crate::error::ClientResult;
use crate::store::SessionRepository;

/// Signs in with Google and stores the session.
///
/// An existing session is kept unless `force` is set.
pub async fn login(bootstrap: &Bootstrap, force: bool) -> ClientResult<()> {
    let mut app = bootstrap.mount_app()?;
    if let Some(session) = app.session()
        && !force
    {
        println!("Already signed in as {}.", describe(session));
        println!("Use --force to sign in again.");
        return Ok(());
    }

    let flow = bootstrap.login()?;

    println!("Starting Google sign-in...");
    println!();
    println!("A browser window will open for you to grant calendar access.");
    println!("If the browser doesn't open, copy the URL printed below.");
    println!();

    let payload = flow.sign_in().await?;
    app.login_succeeded(payload)?;

    info!("Google sign-in successful");
    if let Some(session) = app.session() {
        println!("Signed in as {}.", describe(session));
    }
    Ok(())
}

/// Forgets the stored session.
pub fn logout<R: SessionRepository>(store: &R, out: &mut impl Write) -> ClientResult<()> {
    let had_session = store.load().ok().flatten().is_some();
    store.clear()?;
    if had_session {
        writeln!(out, "Signed out.")?;
    } else {
        writeln!(out, "Not signed in.")?;
    }
    Ok(())
}

/// Reports who is signed in.
pub fn status<R: SessionRepository>(store: &R, out: &mut impl Write) -> ClientResult<()> {
    match store.load()? {
        Some(session) => writeln!(out, "Signed in as {}.", describe(&session))?,
        None => writeln!(out, "Not signed in. Run `planpal auth login`.")?,
    }
    Ok(())
}

fn describe(session: &Session) -> String {
    let user = session.user();
    if user.name.trim().is_empty() {
        user.email.clone()
    } else {
        format!("{} <{}>", user.name, user.email)
    }
}
