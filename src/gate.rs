use std::sync::Arc;

use crate::cache::StateWatcher;
use crate::resolver::Resolver;
use crate::types::state::{AuthState, AuthStatus};

/// What the application should render for a protected subtree. Exactly one
/// of these holds at any time; protected content is never shown while a
/// decision is pending or errored.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// A resolution is in flight, show a placeholder.
    Pending,
    /// The visitor is an authorized administrator.
    Allow,
    /// Denied; send the visitor to the public entry point.
    Redirect(String),
}

/// The requires-authorization boundary around a protected subtree.
///
/// Holds its own subscription to state replacements; dropping the gate
/// releases it, so a resolution finishing after teardown notifies nobody.
pub struct Gate {
    resolver: Arc<Resolver>,
    watcher: StateWatcher,
    public_path: String,
}

impl Gate {
    pub fn new(resolver: Arc<Resolver>, public_path: String) -> Self {
        let watcher = resolver.watch();
        Self {
            resolver,
            watcher,
            public_path,
        }
    }

    /// Decision for the current activation. Reuses the cached state when it
    /// is already terminal; otherwise runs a resolution first.
    pub async fn evaluate(&mut self) -> GateDecision {
        let state = self.resolver.state();
        let state = if state.is_terminal() {
            state
        } else {
            self.resolver.resolve().await
        };
        self.decide(&state)
    }

    /// Waits for the next state replacement and returns the new decision.
    /// Returns `None` once the resolver is gone.
    pub async fn changed(&mut self) -> Option<GateDecision> {
        let state = self.watcher.changed().await?;
        Some(self.decide(&state))
    }

    fn decide(&self, state: &AuthState) -> GateDecision {
        match state.status {
            AuthStatus::Pending => GateDecision::Pending,
            AuthStatus::Authorized => GateDecision::Allow,
            AuthStatus::Unauthorized | AuthStatus::Error => {
                GateDecision::Redirect(self.public_path.clone())
            }
        }
    }
}
