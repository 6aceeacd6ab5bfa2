use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;

use crate::cache::StateWatcher;
use crate::directory::RoleDirectory;
use crate::errors::AuthError;
use crate::gate::Gate;
use crate::resolver::Resolver;
use crate::source::{AuthEvent, EventStream, SessionSource};
use crate::types::state::{AuthState, Identity};

/// The authorization surface handed to the application: current state,
/// login/logout, state subscription, and gate construction.
///
/// Owns the event pump that re-resolves on auth events from the session
/// source. The pump is subscribed exactly once, here; dropping the context
/// aborts it.
pub struct AuthContext {
    resolver: Arc<Resolver>,
    public_path: String,
    pump: JoinHandle<()>,
}

impl AuthContext {
    pub fn new(
        source: Arc<dyn SessionSource>,
        directory: Arc<dyn RoleDirectory>,
        ceiling: Duration,
        public_path: String,
    ) -> Self {
        let events = source.subscribe();
        let resolver = Arc::new(Resolver::new(source, directory, ceiling));
        let pump = spawn_pump(resolver.clone(), events);
        Self {
            resolver,
            public_path,
            pump,
        }
    }

    pub fn state(&self) -> AuthState {
        self.resolver.state()
    }

    pub fn watch(&self) -> StateWatcher {
        self.resolver.watch()
    }

    /// A gate around a protected subtree, redirecting to the configured
    /// public path on denial.
    pub fn gate(&self) -> Gate {
        Gate::new(self.resolver.clone(), self.public_path.clone())
    }

    pub async fn resolve(&self) -> AuthState {
        self.resolver.resolve().await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.resolver.login(email, password).await
    }

    pub async fn logout(&self) {
        self.resolver.logout().await
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

fn spawn_pump(resolver: Arc<Resolver>, mut events: EventStream) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                AuthEvent::SignedIn | AuthEvent::SignedOut | AuthEvent::InitialSessionRestored => {
                    debug!("Auth event {event:?}, running a fresh resolution");
                    resolver.resolve().await;
                }
                AuthEvent::Unknown => {
                    debug!("Ignoring unrecognized auth event");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use crate::directory::mock::MockRoleDirectory;
    use crate::source::mock::MockSessionSource;
    use crate::types::session::Session;
    use crate::types::state::AuthStatus;

    use super::*;

    fn test_session(subject: &str) -> Session {
        Session {
            subject_id: subject.to_string(),
            email: format!("{subject}@example.com"),
            access_token: String::new(),
            expire_at: 0,
        }
    }

    fn new_context(
        source: &Arc<MockSessionSource>,
        directory: &Arc<MockRoleDirectory>,
    ) -> AuthContext {
        AuthContext::new(
            source.clone(),
            directory.clone(),
            Duration::from_millis(500),
            "/".to_string(),
        )
    }

    #[tokio::test]
    async fn test_sign_out_event_triggers_resolution() {
        let source = Arc::new(MockSessionSource::with_session(test_session("u1")));
        let directory = Arc::new(MockRoleDirectory::new());
        directory.set_role("u1", "editor");
        let ctx = new_context(&source, &directory);

        let state = ctx.resolve().await;
        assert_eq!(state.status, AuthStatus::Authorized);

        // An external sign-out lands as an event; the pump must refresh the
        // cached decision without anyone asking.
        let mut watcher = ctx.watch();
        source.set_session(None);
        source.emit(AuthEvent::SignedOut);

        let mut state = watcher.changed().await.unwrap();
        while !state.is_terminal() {
            state = watcher.changed().await.unwrap();
        }
        assert_eq!(state.status, AuthStatus::Unauthorized);
    }

    #[tokio::test]
    async fn test_unknown_event_ignored() {
        let source = Arc::new(MockSessionSource::with_session(test_session("u1")));
        let directory = Arc::new(MockRoleDirectory::new());
        directory.set_role("u1", "editor");
        let ctx = new_context(&source, &directory);

        ctx.resolve().await;
        let lookups = directory.lookups();

        source.emit(AuthEvent::Unknown);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(directory.lookups(), lookups);
    }

    #[tokio::test]
    async fn test_login_emits_event_and_refreshes() {
        let source = Arc::new(MockSessionSource::new());
        source.set_account("a@x.com", "secret", test_session("u1"));
        let directory = Arc::new(MockRoleDirectory::new());
        directory.set_role("u1", "admin");
        let ctx = new_context(&source, &directory);

        let identity = ctx.login("a@x.com", "secret").await.unwrap();
        assert_eq!(identity.role, "admin");

        // Give the pump time to consume the signed-in event it also got.
        sleep(Duration::from_millis(100)).await;
        assert_eq!(ctx.state().status, AuthStatus::Authorized);
    }

    #[tokio::test]
    async fn test_dropped_context_stops_pump() {
        let source = Arc::new(MockSessionSource::with_session(test_session("u1")));
        let directory = Arc::new(MockRoleDirectory::new());
        directory.set_role("u1", "editor");
        let ctx = new_context(&source, &directory);

        ctx.resolve().await;
        let lookups = directory.lookups();
        drop(ctx);

        source.emit(AuthEvent::SignedOut);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(directory.lookups(), lookups);
    }
}
