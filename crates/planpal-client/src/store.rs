//! Durable session storage.
//!
//! The session is kept under two fixed keys: `auth_token` holds the opaque
//! token, `user` the serialized user profile. Both must be present and
//! readable for a session to load.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use planpal_core::{Session, User};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Key under which the auth token is stored.
pub const TOKEN_KEY: &str = "auth_token";

/// Key under which the serialized user is stored.
pub const USER_KEY: &str = "user";

/// Errors from a session repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a stored entry failed.
    #[error("session storage I/O error on {path}: {source}")]
    Io {
        /// Entry that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The user profile could not be serialized.
    #[error("failed to serialize user: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The repository lock was poisoned by a panicking writer.
    #[error("session storage is unavailable")]
    Poisoned,
}

/// Loads, saves and clears the persisted session.
pub trait SessionRepository {
    /// Returns the stored session, or `None` if there is no usable one.
    fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Persists `session`, replacing any previous one.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Removes the stored session. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<T: SessionRepository + ?Sized> SessionRepository for &T {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        (**self).load()
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        (**self).save(session)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// File-backed repository: one file per key inside a session directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at `dir`. The directory is created on save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the session directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn read_entry(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.entry(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write_entry(&self, key: &str, content: &str) -> Result<(), StoreError> {
        let path = self.entry(key);

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(|source| StoreError::Io {
            path: temp_path.clone(),
            source,
        })?;

        // Restrict permissions before the entry becomes visible
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600));
        }

        fs::rename(&temp_path, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })
    }

    fn remove_entry(&self, key: &str) -> Result<(), StoreError> {
        let path = self.entry(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

impl SessionRepository for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        let token = self.read_entry(TOKEN_KEY)?;
        let user = self.read_entry(USER_KEY)?;

        let (token, user) = match (token, user) {
            (None, None) => {
                debug!(dir = %self.dir.display(), "no stored session");
                return Ok(None);
            }
            (Some(token), Some(user)) => (token, user),
            (token, _) => {
                warn!(
                    has_token = token.is_some(),
                    "stored session is incomplete, ignoring it"
                );
                return Ok(None);
            }
        };

        let token = token.trim();
        if token.is_empty() {
            warn!("stored auth token is empty, ignoring session");
            return Ok(None);
        }

        let user: User = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "stored user is unreadable, ignoring session");
                return Ok(None);
            }
        };

        debug!(email = %user.email, "loaded stored session");
        Ok(Some(Session::new(token, user)))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let user = serde_json::to_string(session.user())?;
        self.write_entry(TOKEN_KEY, session.token())?;
        self.write_entry(USER_KEY, &user)?;

        info!(dir = %self.dir.display(), "saved session");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.remove_entry(TOKEN_KEY)?;
        self.remove_entry(USER_KEY)?;
        info!(dir = %self.dir.display(), "cleared session");
        Ok(())
    }
}

/// In-process repository.
///
/// Clones share the same slot, so a test can keep a handle while the app
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }
}

impl SessionRepository for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.slot.lock().map_err(|_| StoreError::Poisoned)?.clone())
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.slot.lock().map_err(|_| StoreError::Poisoned)? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().map_err(|_| StoreError::Poisoned)? = None;
        Ok(())
    }
}
