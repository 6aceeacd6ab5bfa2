use super::session::Session;

/// Resolution status of the current visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// A resolution is in flight, no decision yet.
    Pending,
    /// Session present, role record found, role recognized.
    Authorized,
    /// No session, or the role check denied access.
    Unauthorized,
    /// The session fetch failed; treated as unauthorized for rendering,
    /// kept distinct for diagnostics.
    Error,
}

/// The resolved authorization decision for the current visitor. Replaced
/// wholesale on every resolution, never partially mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub status: AuthStatus,
    pub subject_id: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// The identity returned to a successful login caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub subject_id: String,
    pub email: String,
    pub role: String,
}

impl AuthState {
    pub fn pending() -> Self {
        Self {
            status: AuthStatus::Pending,
            subject_id: None,
            email: None,
            role: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: AuthStatus::Unauthorized,
            subject_id: None,
            email: None,
            role: None,
        }
    }

    pub fn error() -> Self {
        Self {
            status: AuthStatus::Error,
            subject_id: None,
            email: None,
            role: None,
        }
    }

    pub fn authorized(session: &Session, role: &str) -> Self {
        Self {
            status: AuthStatus::Authorized,
            subject_id: Some(session.subject_id.clone()),
            email: Some(session.email.clone()),
            role: Some(role.to_string()),
        }
    }

    /// A terminal state is anything that is not pending.
    pub fn is_terminal(&self) -> bool {
        self.status != AuthStatus::Pending
    }

    pub fn identity(&self) -> Option<Identity> {
        if self.status != AuthStatus::Authorized {
            return None;
        }
        Some(Identity {
            subject_id: self.subject_id.clone()?,
            email: self.email.clone()?,
            role: self.role.clone()?,
        })
    }
}
