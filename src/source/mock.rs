use std::collections::VecDeque;
use std::future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::errors::AuthError;
use crate::types::session::Session;

use super::{AuthEvent, EventStream, SessionSource};

/// Scripted session source for tests. Each knob controls one behavior of the
/// next calls; delays are consumed one per `current_session` call.
pub struct MockSessionSource {
    session: RwLock<Option<Session>>,
    account: RwLock<Option<(String, String, Session)>>,
    fail_session: AtomicBool,
    hang_session: AtomicBool,
    delays: Mutex<VecDeque<Duration>>,
    sign_out_calls: AtomicUsize,
    events: broadcast::Sender<AuthEvent>,
}

impl MockSessionSource {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            session: RwLock::new(None),
            account: RwLock::new(None),
            fail_session: AtomicBool::new(false),
            hang_session: AtomicBool::new(false),
            delays: Mutex::new(VecDeque::new()),
            sign_out_calls: AtomicUsize::new(0),
            events,
        }
    }

    pub fn with_session(session: Session) -> Self {
        let mock = Self::new();
        mock.set_session(Some(session));
        mock
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.session.write().unwrap() = session;
    }

    /// Registers the one account `sign_in` accepts; the session is what a
    /// successful login issues.
    pub fn set_account(&self, email: &str, password: &str, session: Session) {
        *self.account.write().unwrap() =
            Some((email.to_string(), password.to_string(), session));
    }

    pub fn set_fail_session(&self, fail: bool) {
        self.fail_session.store(fail, Ordering::SeqCst);
    }

    pub fn set_hang_session(&self, hang: bool) {
        self.hang_session.store(hang, Ordering::SeqCst);
    }

    pub fn push_session_delay(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    pub fn emit(&self, event: AuthEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl SessionSource for MockSessionSource {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            sleep(delay).await;
        }

        if self.hang_session.load(Ordering::SeqCst) {
            future::pending::<()>().await;
        }

        if self.fail_session.load(Ordering::SeqCst) {
            return Err(AuthError::Transport(anyhow::anyhow!(
                "mock session source is down"
            )));
        }

        Ok(self.session.read().unwrap().clone())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let account = self.account.read().unwrap().clone();
        match account {
            Some((known_email, known_password, session))
                if known_email == email && known_password == password =>
            {
                self.set_session(Some(session.clone()));
                self.emit(AuthEvent::SignedIn);
                Ok(session)
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.set_session(None);
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }
}
