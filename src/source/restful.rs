use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Method;
use tokio::sync::broadcast;

use crate::errors::AuthError;
use crate::rest::RestClient;
use crate::types::session::{LoginRequest, Session};

use super::persist::SessionFile;
use super::{AuthEvent, EventStream, SessionSource};

const EVENTS_BUFFER_SIZE: usize = 16;

/// Session source backed by the hosted service's auth endpoints. Sign-in,
/// sign-out and restore performed through this source announce themselves on
/// the event channel, which is what drives re-resolution.
pub struct RestfulSessionSource {
    rest: Arc<RestClient>,
    file: Option<SessionFile>,
    session: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthEvent>,
}

impl RestfulSessionSource {
    pub fn new(rest: Arc<RestClient>, file: Option<SessionFile>) -> Self {
        let (events, _) = broadcast::channel(EVENTS_BUFFER_SIZE);
        Self {
            rest,
            file,
            session: RwLock::new(None),
            events,
        }
    }

    /// Restores a persisted session, if one is present and still valid, and
    /// announces it. Call once at startup, after subscribers are attached.
    pub fn restore(&self) -> anyhow::Result<()> {
        let file = match self.file.as_ref() {
            Some(file) => file,
            None => return Ok(()),
        };

        let session = match file.read()? {
            Some(session) => session,
            None => return Ok(()),
        };

        info!("Restored persisted session for '{}'", session.email);
        self.rest.set_token(&session.access_token);
        *self.session.write().unwrap() = Some(session);
        self.emit(AuthEvent::InitialSessionRestored);
        Ok(())
    }

    fn emit(&self, event: AuthEvent) {
        // No receiver just means nobody is watching yet.
        let _ = self.events.send(event);
    }

    fn clear_local(&self) {
        self.session.write().unwrap().take();
        self.rest.clear_token();
        if let Some(file) = self.file.as_ref() {
            if let Err(err) = file.clear() {
                warn!("Clear session file error: {err:#}");
            }
        }
    }

    fn store_local(&self, session: &Session) {
        self.rest.set_token(&session.access_token);
        *self.session.write().unwrap() = Some(session.clone());
        if let Some(file) = self.file.as_ref() {
            if let Err(err) = file.write(session) {
                warn!("Write session file error: {err:#}");
            }
        }
    }
}

#[async_trait]
impl SessionSource for RestfulSessionSource {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        // No local session means nothing to validate against the server.
        if self.session.read().unwrap().is_none() {
            return Ok(None);
        }

        match self
            .rest
            .request_data::<Session>(Method::GET, "auth/session", None)
            .await
        {
            Ok(session) => {
                self.store_local(&session);
                Ok(Some(session))
            }
            Err(err) if err.is_unauthenticated() || err.is_not_found() => {
                info!("Server no longer recognizes the held session");
                self.clear_local();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = serde_json::to_string(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .unwrap();

        match self
            .rest
            .request_data::<Session>(Method::POST, "auth/login", Some(body))
            .await
        {
            Ok(session) => {
                self.store_local(&session);
                self.emit(AuthEvent::SignedIn);
                Ok(session)
            }
            Err(err) if err.is_unauthenticated() => Err(AuthError::InvalidCredentials),
            Err(err) => Err(err),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let had_session = self.session.read().unwrap().is_some();
        if !had_session {
            // Nothing held locally; announce and return, the server has
            // nothing to terminate for us.
            self.emit(AuthEvent::SignedOut);
            return Ok(());
        }

        let result = self
            .rest
            .request_operation(Method::POST, "auth/logout", None)
            .await;

        self.clear_local();
        self.emit(AuthEvent::SignedOut);

        match result {
            Ok(()) => Ok(()),
            // The server already considers the session gone.
            Err(err) if err.is_unauthenticated() => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }
}
