use serde::{Deserialize, Serialize};

/// A subject's role assignment as stored in the role directory. Looked up,
/// never mutated, by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub subject_id: String,

    pub role: String,

    #[serde(default = "default_time")]
    pub update_time: u64,
}

fn default_time() -> u64 {
    0
}
