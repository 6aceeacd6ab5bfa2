use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::context::AuthContext;
use crate::directory::restful::RestfulRoleDirectory;
use crate::rest::RestClient;
use crate::source::persist::SessionFile;
use crate::source::restful::RestfulSessionSource;

/// Builds the authorization context from configuration: restful session
/// source and role directory over one shared client, with optional session
/// persistence.
pub struct AuthFactory {
    cfg: Config,
}

impl AuthFactory {
    pub fn new(cfg: Config) -> Self {
        Self { cfg }
    }

    pub async fn build_context(&self) -> Result<AuthContext> {
        let rest = RestClient::connect(&self.cfg.server, &self.cfg.cert_path)
            .await
            .context("connect to auth server")?;
        let rest = Arc::new(rest);

        let file = if self.cfg.session_path.is_empty() {
            None
        } else {
            if let Some(dir) = Path::new(&self.cfg.session_path).parent() {
                fs::create_dir_all(dir).context("ensure session dir")?;
            }
            Some(SessionFile::new(self.cfg.session_path.clone()))
        };

        let source = Arc::new(RestfulSessionSource::new(rest.clone(), file));
        let directory = Arc::new(RestfulRoleDirectory::new(rest));

        let ctx = AuthContext::new(
            source.clone(),
            directory,
            self.cfg.resolve_timeout(),
            self.cfg.public_path.clone(),
        );

        // Restore after the context exists, so its pump observes the
        // initial-session event and resolves the restored session.
        source.restore().context("restore persisted session")?;

        Ok(ctx)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }
}
