use std::sync::RwLock;
use std::{fs, io};

use anyhow::{bail, Context, Result};
use log::info;
use reqwest::{Certificate, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::AuthError;
use crate::time::current_timestamp;
use crate::types::response::{CommonResponse, HealthzResponse, ResourceResponse, MIME_JSON};

/// Thin json client for the hosted service. Holds the current bearer token;
/// the session source swaps it on sign-in/sign-out.
pub struct RestClient {
    url: String,
    client: reqwest::Client,
    token: RwLock<Option<String>>,
}

impl RestClient {
    /// Maximum tolerated clock skew between client and server. Session
    /// expiry arithmetic is meaningless across a larger difference.
    pub const MAX_TIME_DELTA_WITH_SERVER: u64 = 30;

    pub async fn connect(url: &str, cert_path: &str) -> Result<Self> {
        let url = url.trim_end_matches('/');
        let parsed = match Url::parse(url) {
            Ok(url) => url,
            Err(_) => bail!("invalid server url '{url}'"),
        };
        match parsed.scheme() {
            "http" | "https" => {}
            _ => bail!(
                "invalid url scheme, expect 'http' or 'https', not '{}'",
                parsed.scheme()
            ),
        }

        if parsed.path() != "/" {
            bail!(
                "invalid server url, path should be '/', not '{}'",
                parsed.path()
            );
        }

        let client = if cert_path.is_empty() || parsed.scheme() == "http" {
            reqwest::Client::new()
        } else {
            match fs::read(cert_path) {
                Ok(data) => {
                    let cert = Certificate::from_pem(&data).context("load cert file")?;
                    reqwest::Client::builder()
                        .add_root_certificate(cert)
                        .build()
                        .context("build server client")?
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => reqwest::Client::new(),
                Err(err) => return Err(err).context("read cert file"),
            }
        };

        let client = RestClient {
            url: url.to_string(),
            client,
            token: RwLock::new(None),
        };
        client.check_health().await?;

        Ok(client)
    }

    pub fn set_token(&self, token: &str) {
        *self.token.write().unwrap() = Some(token.to_string());
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap() = None;
    }

    pub async fn healthz(&self) -> Result<HealthzResponse, AuthError> {
        self.request_data(Method::GET, "healthz", None).await
    }

    async fn check_health(&self) -> Result<()> {
        let resp = self.healthz().await.context("check server health")?;

        let now = current_timestamp();
        let delta = if now > resp.now {
            now - resp.now
        } else {
            resp.now - now
        };
        if delta > Self::MAX_TIME_DELTA_WITH_SERVER {
            bail!(
                "system time differs too much from server time: difference: {delta}s, maximum tolerance: {}s",
                Self::MAX_TIME_DELTA_WITH_SERVER
            );
        }

        info!("Connected to server '{}'", self.url);
        Ok(())
    }

    pub async fn request_data<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<T, AuthError>
    where
        T: Serialize + DeserializeOwned,
    {
        let resp: ResourceResponse<T> = self.request_json(method, path, body).await?;
        if resp.code != 200 {
            return Err(AuthError::Server {
                code: resp.code,
                message: resp.message.unwrap_or_default(),
            });
        }
        match resp.data {
            Some(data) => Ok(data),
            None => Err(AuthError::Transport(anyhow::anyhow!(
                "server didn't return data in json"
            ))),
        }
    }

    pub async fn request_operation(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<(), AuthError> {
        let resp: CommonResponse = self.request_json(method, path, body).await?;

        if resp.code != 200 {
            Err(AuthError::Server {
                code: resp.code,
                message: resp.message.unwrap_or_default(),
            })
        } else {
            Ok(())
        }
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<T, AuthError> {
        let url = format!("{}/{}", self.url, path);
        let mut req = self.client.request(method, &url);

        if let Some(json) = body {
            req = req.header("Content-Type", MIME_JSON).body(json);
        }

        if let Some(token) = self.token.read().unwrap().as_deref() {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req = req.header("Accept", MIME_JSON);

        let req = match req.build() {
            Ok(req) => req,
            Err(e) => {
                return Err(AuthError::Transport(anyhow::anyhow!(
                    "build request failed: {e:#}"
                )))
            }
        };

        let resp = match self.client.execute(req).await {
            Ok(resp) => resp,
            Err(e) => return Err(AuthError::Transport(e.into())),
        };

        let data = match resp.text().await {
            Ok(data) => data,
            Err(e) => return Err(AuthError::Transport(e.into())),
        };

        let data: T = match serde_json::from_str(&data) {
            Ok(data) => data,
            Err(_) => return Err(AuthError::InvalidJson(data)),
        };

        Ok(data)
    }
}
