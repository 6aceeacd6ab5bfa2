use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;

use crate::errors::AuthError;
use crate::rest::RestClient;
use crate::types::role::RoleRecord;

use super::RoleDirectory;

/// Role directory backed by the hosted service's role records.
pub struct RestfulRoleDirectory {
    rest: Arc<RestClient>,
}

impl RestfulRoleDirectory {
    pub fn new(rest: Arc<RestClient>) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl RoleDirectory for RestfulRoleDirectory {
    async fn role_of(&self, subject_id: &str) -> Result<Option<RoleRecord>, AuthError> {
        let path = format!("api/roles/{subject_id}");
        match self.rest.request_data(Method::GET, &path, None).await {
            Ok(record) => Ok(Some(record)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}
