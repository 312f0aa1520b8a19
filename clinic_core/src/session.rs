//! Durable session token storage with file locking.
//!
//! The session is one opaque token held in a small JSON file under the data
//! directory, mirrored in memory for cheap reads. Created on successful
//! login, destroyed on explicit logout or when the backend rejects the
//! token. At most one session exists per client instance.

use crate::Result;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tempfile::NamedTempFile;

/// On-disk session format
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
struct SessionFile {
    token: Option<String>,
}

/// Owner of the session token; the sole reader/writer of durable session
/// storage. Shared across components behind an `Arc`.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    token: RwLock<Option<String>>,
}

impl SessionStore {
    /// Initialize the store by reading durable storage.
    ///
    /// A missing file means no prior session. A corrupt or unreadable file
    /// is treated the same way: log a warning and start unauthenticated.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let token = read_session_file(&path);
        Self {
            path,
            token: RwLock::new(token),
        }
    }

    /// Current token, or `None` when unauthenticated. Pure in-memory read.
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store a token, superseding any prior one, and persist it.
    pub fn set(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        self.persist(&SessionFile {
            token: Some(token.clone()),
        })?;
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        tracing::debug!("Stored session token at {:?}", self.path);
        Ok(())
    }

    /// Remove the token from memory and durable storage. Idempotent.
    pub fn clear(&self) -> Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            tracing::debug!("Cleared session file at {:?}", self.path);
        }
        Ok(())
    }

    /// Atomically write the session file:
    /// 1. Write to a temp file in the same directory
    /// 2. Sync to disk
    /// 3. Rename over the original
    fn persist(&self, contents: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "session path missing parent")
        })?)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let json = serde_json::to_string(contents)?;
            writer.write_all(json.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| crate::Error::Io(e.error))?;
        Ok(())
    }
}

/// Read the token from durable storage with shared locking.
fn read_session_file(path: &Path) -> Option<String> {
    if !path.exists() {
        tracing::debug!("No session file at {:?}, starting unauthenticated", path);
        return None;
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(
                "Unable to open session file {:?}: {}. Starting unauthenticated.",
                path,
                e
            );
            return None;
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!(
            "Unable to lock session file {:?}: {}. Starting unauthenticated.",
            path,
            e
        );
        return None;
    }

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    if let Err(e) = reader.read_to_string(&mut contents) {
        let _ = file.unlock();
        tracing::warn!(
            "Failed to read session file {:?}: {}. Starting unauthenticated.",
            path,
            e
        );
        return None;
    }

    let _ = file.unlock();

    match serde_json::from_str::<SessionFile>(&contents) {
        Ok(session) => session.token,
        Err(e) => {
            tracing::warn!(
                "Failed to parse session file {:?}: {}. Starting unauthenticated.",
                path,
                e
            );
            None
        }
    }
}
