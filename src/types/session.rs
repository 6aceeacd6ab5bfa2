use serde::{Deserialize, Serialize};

/// A read-only view of an externally issued session. The remote service owns
/// the session lifecycle; this struct is only the client's time-bounded copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub subject_id: String,

    pub email: String,

    #[serde(default = "default_string")]
    pub access_token: String,

    /// Unix timestamp after which the session is no longer trusted locally.
    #[serde(default = "default_time")]
    pub expire_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn default_time() -> u64 {
    0
}

fn default_string() -> String {
    String::new()
}
