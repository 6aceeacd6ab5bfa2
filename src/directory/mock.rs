use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::errors::AuthError;
use crate::types::role::RoleRecord;

use super::RoleDirectory;

/// Scripted role directory for tests.
pub struct MockRoleDirectory {
    roles: Mutex<HashMap<String, String>>,
    fail: AtomicBool,
    delays: Mutex<VecDeque<Duration>>,
    lookups: AtomicUsize,
}

impl MockRoleDirectory {
    pub fn new() -> Self {
        Self {
            roles: Mutex::new(HashMap::new()),
            fail: AtomicBool::new(false),
            delays: Mutex::new(VecDeque::new()),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn set_role(&self, subject_id: &str, role: &str) {
        self.roles
            .lock()
            .unwrap()
            .insert(subject_id.to_string(), role.to_string());
    }

    pub fn remove_role(&self, subject_id: &str) {
        self.roles.lock().unwrap().remove(subject_id);
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn push_delay(&self, delay: Duration) {
        self.delays.lock().unwrap().push_back(delay);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleDirectory for MockRoleDirectory {
    async fn role_of(&self, subject_id: &str) -> Result<Option<RoleRecord>, AuthError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            sleep(delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(AuthError::Transport(anyhow::anyhow!(
                "mock role directory is down"
            )));
        }

        Ok(self
            .roles
            .lock()
            .unwrap()
            .get(subject_id)
            .map(|role| RoleRecord {
                subject_id: subject_id.to_string(),
                role: role.clone(),
                update_time: 0,
            }))
    }
}
