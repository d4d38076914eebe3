//! Session gate and logout, built on an opaque session service
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Body of a successful session check
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct SessionStatus {
    pub(crate) is_logged_in: bool,
    #[serde(default)]
    pub(crate) username: Option<String>,
    #[serde(default)]
    pub(crate) role: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum SessionReply {
    Authenticated(SessionStatus),
    /// The service answered with a non-success status
    Rejected,
}

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("failed to read session from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode session reply")]
    Decode(#[from] serde_json::Error),
    #[error("session service unavailable")]
    Unavailable,
}

pub(crate) trait SessionService: fmt::Debug {
    fn check_session(&mut self) -> Result<SessionReply, SessionError>;

    fn logout(&mut self) -> Result<(), SessionError>;
}

/// A session service whose replies are read from a JSON file holding the
/// body a session check would return
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct FileSession {
    path: PathBuf,
    logged_out: bool,
}

impl FileSession {
    pub(crate) fn new(path: PathBuf) -> FileSession {
        FileSession {
            path,
            logged_out: false,
        }
    }
}

impl SessionService for FileSession {
    fn check_session(&mut self) -> Result<SessionReply, SessionError> {
        if self.logged_out {
            return Ok(SessionReply::Rejected);
        }
        let src = fs::read_to_string(&self.path).map_err(|source| SessionError::Read {
            path: self.path.clone(),
            source,
        })?;
        let status = serde_json::from_str::<SessionStatus>(&src)?;
        if status.is_logged_in {
            Ok(SessionReply::Authenticated(status))
        } else {
            Ok(SessionReply::Rejected)
        }
    }

    fn logout(&mut self) -> Result<(), SessionError> {
        if !self.path.exists() {
            return Err(SessionError::Unavailable);
        }
        self.logged_out = true;
        Ok(())
    }
}

/// The user the session check reported
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CurrentUser {
    pub(crate) username: String,
    pub(crate) role: String,
}

/// What the host screen should do after the session check
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum GateOutcome {
    Proceed(CurrentUser),
    /// Not logged in; go to the login view without further notice
    LoginRequired,
    /// The service could not be reached; tell the user, then go to the login
    /// view
    Unreachable,
    /// Logged in without the required role; tell the user, then go home
    AccessDenied(CurrentUser),
}

pub(crate) fn check_login<S: SessionService + ?Sized>(
    service: &mut S,
    required_role: Option<&str>,
) -> GateOutcome {
    match service.check_session() {
        Ok(SessionReply::Authenticated(status)) => {
            let user = CurrentUser {
                username: status.username.unwrap_or_default(),
                role: status.role.unwrap_or_default(),
            };
            match required_role {
                Some(role) if role != user.role => {
                    log::warn!(
                        "User {:?} has role {:?} but {role:?} is required",
                        user.username,
                        user.role
                    );
                    GateOutcome::AccessDenied(user)
                }
                _ => {
                    log::info!("Logged in as {:?} ({})", user.username, user.role);
                    GateOutcome::Proceed(user)
                }
            }
        }
        Ok(SessionReply::Rejected) => {
            log::info!("Session check rejected; login required");
            GateOutcome::LoginRequired
        }
        Err(e) => {
            log::error!("Session check failed: {e:#}");
            GateOutcome::Unreachable
        }
    }
}

/// Locally cached copy of the logged-in user's role
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct RoleHint(Option<String>);

impl RoleHint {
    pub(crate) fn set(&mut self, role: String) {
        self.0 = Some(role);
    }

    pub(crate) fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub(crate) fn clear(&mut self) {
        self.0 = None;
    }
}

#[derive(Debug)]
pub(crate) enum LogoutOutcome {
    LoggedOut,
    /// The service could not be reached; the session is left as it was
    Failed(SessionError),
}

/// Log out of the session.  The cached role is discarded first, whether or
/// not the service can be reached.
pub(crate) fn logout<S: SessionService + ?Sized>(
    service: &mut S,
    hint: &mut RoleHint,
) -> LogoutOutcome {
    hint.clear();
    match service.logout() {
        Ok(()) => {
            log::info!("Logged out");
            LogoutOutcome::LoggedOut
        }
        Err(e) => {
            log::error!("Logout failed: {e:#}");
            LogoutOutcome::Failed(e)
        }
    }
}
