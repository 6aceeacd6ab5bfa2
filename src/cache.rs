use std::sync::Arc;

use tokio::sync::watch;

use crate::types::state::AuthState;

/// Process-local cache of the last resolved [`AuthState`].
///
/// Single writer (the resolver), any number of readers. The state is always
/// replaced wholesale, so readers never observe a half-updated value. Every
/// replacement is published to all live watchers.
#[derive(Clone)]
pub struct StateCell {
    tx: Arc<watch::Sender<AuthState>>,
}

impl StateCell {
    /// Creates a new cell initialized to the pending state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthState::pending());
        Self { tx: Arc::new(tx) }
    }

    pub fn replace(&self, state: AuthState) {
        self.tx.send_replace(state);
    }

    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    pub fn watch(&self) -> StateWatcher {
        StateWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// A subscription to cache replacements. Dropping the watcher releases the
/// subscription; a replacement arriving afterwards is simply not delivered.
pub struct StateWatcher {
    rx: watch::Receiver<AuthState>,
}

impl StateWatcher {
    pub fn current(&mut self) -> AuthState {
        self.rx.borrow_and_update().clone()
    }

    /// Waits for the next replacement and returns it. Returns `None` when
    /// the cell itself has been dropped.
    pub async fn changed(&mut self) -> Option<AuthState> {
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::state::AuthStatus;

    use super::*;

    #[tokio::test]
    async fn test_replace_and_read() {
        let cell = StateCell::new();
        assert_eq!(cell.current().status, AuthStatus::Pending);

        cell.replace(AuthState::unauthorized());
        assert_eq!(cell.current().status, AuthStatus::Unauthorized);

        cell.replace(AuthState::error());
        assert_eq!(cell.current().status, AuthStatus::Error);
    }

    #[tokio::test]
    async fn test_watch() {
        let cell = StateCell::new();
        let mut watcher = cell.watch();
        assert_eq!(watcher.current().status, AuthStatus::Pending);

        cell.replace(AuthState::unauthorized());
        let state = watcher.changed().await.unwrap();
        assert_eq!(state.status, AuthStatus::Unauthorized);
    }

    #[tokio::test]
    async fn test_watch_after_drop() {
        let cell = StateCell::new();
        let mut watcher = cell.watch();
        drop(cell);
        assert!(watcher.changed().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_watcher_does_not_block_writer() {
        let cell = StateCell::new();
        let watcher = cell.watch();
        drop(watcher);
        cell.replace(AuthState::unauthorized());
        assert_eq!(cell.current().status, AuthStatus::Unauthorized);
    }
}
