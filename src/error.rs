use thiserror::Error;

use crate::models::AccountType;

/// Domain errors. Everything else bubbles up through `anyhow`.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("not logged in; run 'verihire login' first")]
    NotLoggedIn,

    #[error("access denied: this action is for {required} accounts")]
    RoleDenied { required: AccountType },

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("session data is corrupt; log in again")]
    SessionCorrupt,

    #[error("job '{0}' not found")]
    JobNotFound(String),

    #[error("application '{0}' not found")]
    ApplicationNotFound(String),

    #[error("project '{0}' not found")]
    ProjectNotFound(String),

    #[error("you have already applied to this job")]
    AlreadyApplied,

    #[error("cannot change {entity} status from '{from}' to '{to}'")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("{0}")]
    Validation(String),
}
