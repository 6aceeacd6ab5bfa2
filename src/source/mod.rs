pub mod persist;
pub mod restful;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::errors::AuthError;
use crate::types::session::Session;

/// Auth lifecycle notifications issued by a session source. Kinds outside
/// the recognized set deserialize to [`AuthEvent::Unknown`] and are ignored
/// by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    InitialSessionRestored,

    #[serde(other)]
    Unknown,
}

/// The remote service that issues and validates sessions.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Returns the current session, or `None` when the visitor is signed
    /// out. Fails only on transport problems.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Exchanges credentials for a session. Fails with
    /// [`AuthError::InvalidCredentials`] on a bad login.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Terminates the current session. Terminating an already absent
    /// session is not an error.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribes to auth events. Dropping the stream unsubscribes.
    fn subscribe(&self) -> EventStream;
}

pub struct EventStream {
    rx: broadcast::Receiver<AuthEvent>,
}

impl EventStream {
    pub fn new(rx: broadcast::Receiver<AuthEvent>) -> Self {
        Self { rx }
    }

    /// Next event, or `None` once the source is gone. A slow consumer that
    /// misses events just skips them; every event triggers the same
    /// re-resolution, so dropped duplicates are harmless.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!("Auth event stream lagged, skipped {count} events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
