use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

mod defaults;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Base url of the hosted auth/database service.
    #[serde(default = "defaults::server")]
    pub server: String,

    /// Optional pem file for self-hosted deployments with a self-signed
    /// certificate. Empty means the system roots are enough.
    #[serde(default = "defaults::empty_string")]
    pub cert_path: String,

    /// Where denied visitors are redirected.
    #[serde(default = "defaults::public_path")]
    pub public_path: String,

    /// Ceiling for a single resolve/login round-trip. A resolution that
    /// exceeds it is denied rather than left pending.
    #[serde(default = "defaults::resolve_timeout_millis")]
    pub resolve_timeout_millis: u64,

    /// File the session envelope is persisted to across restarts. Empty
    /// disables persistence.
    #[serde(default = "defaults::session_path")]
    pub session_path: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut cfg = Self::_load(path)?;
        cfg.validate().context("validate config")?;
        Ok(cfg)
    }

    fn _load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = match path {
            Some(path) => PathBuf::from(path.as_ref()),
            None => PathBuf::from(shellexpand::tilde("~/.config/backgate.toml").into_owned()),
        };

        match fs::read(&path) {
            Ok(data) => {
                let toml_str = String::from_utf8(data).with_context(|| {
                    format!("decode config file '{}' into utf-8", path.display())
                })?;

                let cfg: Config = toml::from_str(&toml_str)
                    .with_context(|| format!("parse config file '{}' toml", path.display()))?;

                Ok(cfg)
            }

            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),

            Err(err) => Err(err).with_context(|| format!("read config file '{}'", path.display())),
        }
    }

    #[inline]
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_millis)
    }

    fn default() -> Self {
        Self {
            server: defaults::server(),
            cert_path: defaults::empty_string(),
            public_path: defaults::public_path(),
            resolve_timeout_millis: defaults::resolve_timeout_millis(),
            session_path: defaults::session_path(),
        }
    }

    fn validate(&mut self) -> Result<()> {
        if self.server.is_empty() {
            bail!("config server cannot be empty");
        }

        if self.public_path.is_empty() {
            bail!("config public_path cannot be empty");
        }

        if self.resolve_timeout_millis < 100 || self.resolve_timeout_millis > 60_000 {
            bail!(
                "config resolve_timeout_millis should be in range [100,60000], found {}",
                self.resolve_timeout_millis
            );
        }

        if !self.session_path.is_empty() {
            self.session_path = shellexpand::full(&self.session_path)
                .context("expand env for session_path")?
                .into_owned();
        }

        Ok(())
    }
}
