//! Persisted session credential.
//!
//! The token lives in a single file under the config directory with
//! user-only permissions. Discarding the session removes the file.

use secrecy::{ExposeSecret, SecretString};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Session tokens are short opaque strings; anything bigger is not ours.
const MAX_SESSION_FILE_SIZE: u64 = 4096;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Session file '{0}' is not a valid session token")]
    Malformed(PathBuf),
    #[error("Session token must not be empty")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join("session"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no session has been stored.
    pub fn load(&self) -> Result<Option<SecretString>, SessionError> {
        match std::fs::metadata(&self.path) {
            Ok(meta) if meta.len() > MAX_SESSION_FILE_SIZE => {
                return Err(SessionError::Malformed(self.path.clone()));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        }

        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(SessionError::Malformed(self.path.clone()));
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let token = raw.trim();
        if token.is_empty() {
            return Ok(None);
        }
        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SessionError::Malformed(self.path.clone()));
        }
        Ok(Some(SecretString::from(token.to_string())))
    }

    /// Replace the stored token. The file is written under a temporary name
    /// and renamed into place, so a crash never leaves a partial token.
    pub fn store(&self, token: &SecretString) -> Result<(), SessionError> {
        let token = token.expose_secret().trim();
        if token.is_empty() {
            return Err(SessionError::Empty);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        use std::time::{SystemTime, UNIX_EPOCH};
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let temp_path = self.path.with_extension(format!("tmp.{:016x}", suffix));

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let write = || -> std::io::Result<()> {
            let mut file = options.open(&temp_path)?;
            file.write_all(token.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
            drop(file);

            #[cfg(windows)]
            if self.path.exists() {
                std::fs::remove_file(&self.path)?;
            }
            std::fs::rename(&temp_path, &self.path)
        };

        write().map_err(|e| {
            let _ = std::fs::remove_file(&temp_path);
            self.io_error(e)
        })?;

        tracing::info!(path = %self.path.display(), "Stored session token");
        Ok(())
    }

    /// Discard the stored token. Clearing an absent session succeeds.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Cleared session token");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> (PathBuf, SessionStore) {
        let dir = std::env::temp_dir().join(format!("tgrss_dash_session_{}", name));
        std::fs::remove_dir_all(&dir).ok();
        let store = SessionStore::in_dir(&dir);
        (dir, store)
    }

    #[test]
    fn test_missing_session_is_none() {
        let (dir, store) = temp_store("missing");
        assert!(store.load().unwrap().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_store_then_load() {
        let (dir, store) = temp_store("roundtrip");
        store.store(&SecretString::from("  abc123  ")).unwrap();
        let token = store.load().unwrap().unwrap();
        assert_eq!(token.expose_secret(), "abc123");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_store_replaces_existing() {
        let (dir, store) = temp_store("replace");
        store.store(&SecretString::from("first")).unwrap();
        store.store(&SecretString::from("second")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().expose_secret(), "second");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_token_rejected() {
        let (dir, store) = temp_store("empty");
        assert!(matches!(
            store.store(&SecretString::from("   ")),
            Err(SessionError::Empty)
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (dir, store) = temp_store("clear");
        store.store(&SecretString::from("abc")).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_token_with_inner_whitespace_is_malformed() {
        let (dir, store) = temp_store("malformed");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(store.path(), "abc def\n").unwrap();
        assert!(matches!(store.load(), Err(SessionError::Malformed(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_user_only() {
        use std::os::unix::fs::PermissionsExt;
        let (dir, store) = temp_store("perms");
        store.store(&SecretString::from("abc")).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        std::fs::remove_dir_all(&dir).ok();
    }
}
