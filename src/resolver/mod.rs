
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};
use tokio::time;

use crate::cache::{StateCell, StateWatcher};
use crate::directory::RoleDirectory;
use crate::errors::AuthError;
use crate::policy;
use crate::source::SessionSource;
use crate::types::role::RoleRecord;
use crate::types::session::Session;
use crate::types::state::{AuthState, Identity};

/// Produces the authoritative [`AuthState`] for the current visitor and
/// keeps it current.
///
/// All authorization flows go through this one type: passive resolution,
/// explicit login, and logout. Each resolution takes a sequence number; a
/// completion that is no longer the latest issued is discarded, so a slow
/// request can never overwrite the result of a newer one.
pub struct Resolver {
    source: Arc<dyn SessionSource>,
    directory: Arc<dyn RoleDirectory>,
    cache: StateCell,
    seq: AtomicU64,
    ceiling: Duration,
}

impl Resolver {
    pub fn new(
        source: Arc<dyn SessionSource>,
        directory: Arc<dyn RoleDirectory>,
        ceiling: Duration,
    ) -> Self {
        Self {
            source,
            directory,
            cache: StateCell::new(),
            seq: AtomicU64::new(0),
            ceiling,
        }
    }

    pub fn state(&self) -> AuthState {
        self.cache.current()
    }

    pub fn watch(&self) -> StateWatcher {
        self.cache.watch()
    }

    /// Resolves the current visitor: session fetch, role lookup, policy
    /// check. Always commits a terminal state within the configured
    /// ceiling; on expiry access is denied rather than left hanging.
    pub async fn resolve(&self) -> AuthState {
        let seq = self.begin();

        let state = match time::timeout(self.ceiling, self.resolve_session()).await {
            Ok(state) => state,
            Err(_) => {
                warn!(
                    "Authorization timed out after {:?}, denying access; this was not an explicit denial",
                    self.ceiling
                );
                AuthState::unauthorized()
            }
        };

        self.commit(seq, state.clone());
        state
    }

    /// Exchanges credentials for an authorized identity. Credential and
    /// transport failures leave the cached state untouched; a recognized
    /// session with a missing or unpermitted role is terminated and the
    /// cache set to unauthorized.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        match time::timeout(self.ceiling, self.login_flow(email, password)).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout(self.ceiling)),
        }
    }

    /// Terminates the session and publishes an unauthorized state. Never
    /// raises; a double logout is a no-op on the server side and still
    /// lands on unauthorized here.
    pub async fn logout(&self) {
        if let Err(err) = self.source.sign_out().await {
            warn!("Sign out error: {err}");
        }

        let seq = self.next_seq();
        self.commit(seq, AuthState::unauthorized());
    }

    async fn resolve_session(&self) -> AuthState {
        let session = match self.source.current_session().await {
            Ok(Some(session)) => session,
            Ok(None) => return AuthState::unauthorized(),
            Err(err) => {
                error!("Fetch current session error: {err}");
                return AuthState::error();
            }
        };

        match self.lookup_role(&session).await {
            Ok(record) => AuthState::authorized(&session, &record.role),
            Err(err) => {
                if let AuthError::Transport(_) = err {
                    error!("Role lookup error: {err}");
                }
                AuthState::unauthorized()
            }
        }
    }

    async fn login_flow(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let session = self.source.sign_in(email, password).await?;

        match self.lookup_role(&session).await {
            Ok(record) => {
                let state = AuthState::authorized(&session, &record.role);
                let seq = self.next_seq();
                self.commit(seq, state);
                Ok(Identity {
                    subject_id: session.subject_id,
                    email: session.email,
                    role: record.role,
                })
            }
            Err(err) => {
                if matches!(
                    err,
                    AuthError::RoleNotFound(_) | AuthError::RoleNotPermitted(_)
                ) {
                    let seq = self.next_seq();
                    self.commit(seq, AuthState::unauthorized());
                }
                Err(err)
            }
        }
    }

    /// Maps a session to its role record, enforcing the role policy. A
    /// session whose subject has no role record, or a role outside the
    /// recognized set, is terminated before the denial is returned.
    async fn lookup_role(&self, session: &Session) -> Result<RoleRecord, AuthError> {
        let record = match self.directory.role_of(&session.subject_id).await? {
            Some(record) => record,
            None => {
                error!(
                    "Subject '{}' is authenticated but has no role record, terminating the session",
                    session.subject_id
                );
                self.terminate_session().await;
                return Err(AuthError::RoleNotFound(session.subject_id.clone()));
            }
        };

        if !policy::is_authorized_role(&record.role) {
            warn!(
                "Subject '{}' has unrecognized role '{}', terminating the session",
                session.subject_id, record.role
            );
            self.terminate_session().await;
            return Err(AuthError::RoleNotPermitted(record.role));
        }

        Ok(record)
    }

    async fn terminate_session(&self) {
        if let Err(err) = self.source.sign_out().await {
            warn!("Sign out after denial error: {err}");
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Issues a new sequence number and publishes pending for it.
    fn begin(&self) -> u64 {
        let seq = self.next_seq();
        self.cache.replace(AuthState::pending());
        seq
    }

    /// Commits a result only if its sequence number is still the latest
    /// issued; anything older is a stale completion and is dropped.
    fn commit(&self, seq: u64, state: AuthState) {
        if self.seq.load(Ordering::SeqCst) != seq {
            debug!("Discarding stale authorization result of seq {seq}");
            return;
        }
        self.cache.replace(state);
    }
}
