//! Session management. A session is a small JSON file in one of two scopes:
//! the durable scope (XDG data dir) when the user asked to be remembered, or
//! the ephemeral scope (runtime dir, cleared by the OS) when not. Reads try
//! the ephemeral scope first and fall back to the durable one.

use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::db::Database;
use crate::error::Error;
use crate::models::{AccountType, Session};

pub struct SessionStore {
    durable: PathBuf,
    ephemeral: PathBuf,
}

impl SessionStore {
    pub fn open() -> Result<Self> {
        let proj_dirs = directories::ProjectDirs::from("", "", "verihire");
        let durable = match &proj_dirs {
            Some(dirs) => dirs.data_dir().join("session.json"),
            None => PathBuf::from("session.json"),
        };
        let ephemeral = proj_dirs
            .as_ref()
            .and_then(|dirs| dirs.runtime_dir())
            .map(|dir| dir.join("session.json"))
            .unwrap_or_else(|| std::env::temp_dir().join("verihire").join("session.json"));
        Ok(Self { durable, ephemeral })
    }

    /// Explicit scope paths, used by tests.
    #[cfg(test)]
    pub fn at(durable: PathBuf, ephemeral: PathBuf) -> Self {
        Self { durable, ephemeral }
    }

    /// Exact email+password match against the users table. `remember` picks
    /// the durable scope, otherwise the session lives in the ephemeral one.
    pub fn login(
        &self,
        db: &Database,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<Session> {
        debug!(%email, remember, "login attempt");
        let user = db.get_user(email)?.ok_or(Error::InvalidCredentials)?;
        if user.password != password {
            return Err(Error::InvalidCredentials.into());
        }

        let session = Session {
            email: user.email,
            full_name: user.full_name,
            account_type: user.account_type,
            company_name: user.company_name,
            login_time: Utc::now().to_rfc3339(),
        };

        let path = if remember { &self.durable } else { &self.ephemeral };
        write_session(path, &session)?;
        debug!(account_type = %session.account_type, "login succeeded");
        Ok(session)
    }

    /// Ephemeral scope first, durable as fallback. A file that exists but
    /// does not parse is a fatal auth error, never silently ignored.
    pub fn current(&self) -> Result<Option<Session>> {
        for path in [&self.ephemeral, &self.durable] {
            match std::fs::read_to_string(path) {
                Ok(raw) => {
                    let session =
                        serde_json::from_str(&raw).map_err(|_| Error::SessionCorrupt)?;
                    return Ok(Some(session));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e).context("Failed to read session"),
            }
        }
        Ok(None)
    }

    /// `current()` that treats a missing session as an error.
    pub fn require_login(&self) -> Result<Session> {
        self.current()?.ok_or_else(|| Error::NotLoggedIn.into())
    }

    /// Rewrites the session in whichever scopes currently hold one, after
    /// profile edits change the display identity.
    pub fn refresh(&self, session: &Session) -> Result<()> {
        for path in [&self.ephemeral, &self.durable] {
            if path.exists() {
                write_session(path, session)?;
            }
        }
        Ok(())
    }

    /// Clears both scopes unconditionally.
    pub fn logout(&self) -> Result<()> {
        for path in [&self.ephemeral, &self.durable] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e).context("Failed to clear session"),
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn durable_exists(&self) -> bool {
        self.durable.exists()
    }

    #[cfg(test)]
    fn ephemeral_exists(&self) -> bool {
        self.ephemeral.exists()
    }
}

pub fn require_role(session: &Session, role: AccountType) -> Result<()> {
    if session.account_type != role {
        return Err(Error::RoleDenied { required: role }.into());
    }
    Ok(())
}

fn write_session(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let raw = serde_json::to_string(session)?;
    std::fs::write(path, raw)
        .with_context(|| format!("Failed to write session to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Registration;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir) -> (Database, SessionStore) {
        let db = Database::open_at(&dir.path().join("verihire.db")).unwrap();
        db.init().unwrap();
        db.create_user(&Registration {
            full_name: "Wren Doe".into(),
            email: "w@example.test".into(),
            password: "hunter2hunter2".into(),
            account_type: AccountType::Worker,
            skills: Some("Rust".into()),
            experience: Some("5 years".into()),
            company_name: None,
            company_size: None,
            industry: None,
        })
        .unwrap();
        let store = SessionStore::at(
            dir.path().join("durable/session.json"),
            dir.path().join("ephemeral/session.json"),
        );
        (db, store)
    }

    #[test]
    fn login_rejects_wrong_password_and_unknown_email() {
        let dir = TempDir::new().unwrap();
        let (db, store) = fixture(&dir);

        let err = store
            .login(&db, "w@example.test", "wrong", false)
            .unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::InvalidCredentials));
        let err = store
            .login(&db, "nobody@example.test", "hunter2hunter2", false)
            .unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::InvalidCredentials));
        assert!(store.current().unwrap().is_none());
    }

    #[test]
    fn remember_picks_the_durable_scope() {
        let dir = TempDir::new().unwrap();
        let (db, store) = fixture(&dir);

        store
            .login(&db, "w@example.test", "hunter2hunter2", true)
            .unwrap();
        assert!(store.durable_exists());
        assert!(!store.ephemeral_exists());

        store.logout().unwrap();
        store
            .login(&db, "w@example.test", "hunter2hunter2", false)
            .unwrap();
        assert!(!store.durable_exists());
        assert!(store.ephemeral_exists());
    }

    #[test]
    fn current_prefers_the_ephemeral_scope() {
        let dir = TempDir::new().unwrap();
        let (db, store) = fixture(&dir);

        store
            .login(&db, "w@example.test", "hunter2hunter2", true)
            .unwrap();
        let mut other = store
            .login(&db, "w@example.test", "hunter2hunter2", false)
            .unwrap();
        other.full_name = "Ephemeral Copy".into();
        write_session(&dir.path().join("ephemeral/session.json"), &other).unwrap();

        let current = store.current().unwrap().unwrap();
        assert_eq!(current.full_name, "Ephemeral Copy");
    }

    #[test]
    fn corrupt_session_is_a_fatal_auth_error() {
        let dir = TempDir::new().unwrap();
        let (_db, store) = fixture(&dir);

        let path = dir.path().join("ephemeral/session.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let err = store.current().unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::SessionCorrupt));
    }

    #[test]
    fn logout_clears_both_scopes() {
        let dir = TempDir::new().unwrap();
        let (db, store) = fixture(&dir);

        store
            .login(&db, "w@example.test", "hunter2hunter2", true)
            .unwrap();
        store
            .login(&db, "w@example.test", "hunter2hunter2", false)
            .unwrap();
        store.logout().unwrap();
        assert!(!store.durable_exists());
        assert!(!store.ephemeral_exists());
        assert!(store.current().unwrap().is_none());

        // logging out twice is fine
        store.logout().unwrap();
    }

    #[test]
    fn require_login_and_role_gate() {
        let dir = TempDir::new().unwrap();
        let (db, store) = fixture(&dir);

        let err = store.require_login().unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::NotLoggedIn));

        let session = store
            .login(&db, "w@example.test", "hunter2hunter2", false)
            .unwrap();
        assert!(require_role(&session, AccountType::Worker).is_ok());
        let err = require_role(&session, AccountType::Employer).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::RoleDenied {
                required: AccountType::Employer
            })
        );
    }

    #[test]
    fn refresh_updates_whichever_scope_holds_the_session() {
        let dir = TempDir::new().unwrap();
        let (db, store) = fixture(&dir);

        let mut session = store
            .login(&db, "w@example.test", "hunter2hunter2", true)
            .unwrap();
        session.full_name = "Wren Renamed".into();
        store.refresh(&session).unwrap();

        let current = store.current().unwrap().unwrap();
        assert_eq!(current.full_name, "Wren Renamed");
        assert!(!store.ephemeral_exists());
    }
}
