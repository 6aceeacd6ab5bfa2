use std::io::{self, Read, Write};

use anyhow::Result;
use file_lock::{FileLock, FileOptions};
use log::{info, warn};

use crate::time::current_timestamp;
use crate::types::session::Session;

/// Lock-guarded file holding the last issued session envelope, so a restart
/// can restore the session without asking the visitor to sign in again.
pub struct SessionFile {
    path: String,
}

impl SessionFile {
    pub fn new(path: String) -> Self {
        Self { path }
    }

    /// Reads the persisted session. Invalid or expired content is discarded
    /// rather than surfaced as an error.
    pub fn read(&self) -> Result<Option<Session>> {
        let data = match read_file_lock(&self.path)? {
            Some(data) => data,
            None => return Ok(None),
        };

        let session: Session = match serde_json::from_slice(&data) {
            Ok(session) => session,
            Err(_) => {
                warn!("Session file has invalid data, we will ignore it");
                return Ok(None);
            }
        };

        if session.access_token.is_empty() {
            warn!("Session file has no access token, we will ignore it");
            return Ok(None);
        }

        if current_timestamp() >= session.expire_at {
            info!("Session file has expired, the visitor needs to sign in again");
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub fn write(&self, session: &Session) -> Result<()> {
        let data = serde_json::to_vec(session)?;
        write_file_lock(&self.path, &data)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn read_file_lock(path: &str) -> Result<Option<Vec<u8>>> {
    let lock_opts = FileOptions::new().read(true);
    let mut file = match FileLock::lock(path, true, lock_opts) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let mut data = Vec::new();
    file.file.read_to_end(&mut data)?;
    Ok(Some(data))
}

fn write_file_lock(path: &str, data: &[u8]) -> Result<()> {
    let lock_opts = FileOptions::new().write(true).truncate(true).create(true);
    let mut file = FileLock::lock(path, true, lock_opts)?;
    file.file.write_all(data)?;
    Ok(())
}
