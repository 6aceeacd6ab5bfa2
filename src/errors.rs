use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the authorization gate and its remote collaborators.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Network error: {0}")]
    Transport(#[from] anyhow::Error),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No role record found for subject '{0}'")]
    RoleNotFound(String),

    #[error("Role '{0}' is not permitted to use the admin surface")]
    RoleNotPermitted(String),

    #[error("Authorization did not complete within {0:?}")]
    Timeout(Duration),

    #[error("Server error: code {code}, {message}")]
    Server { code: u16, message: String },

    #[error("Server returned invalid json: {0:?}")]
    InvalidJson(String),
}

impl AuthError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuthError::Server { code, .. } if *code == 404)
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AuthError::Server { code, .. } if *code == 401)
    }
}
