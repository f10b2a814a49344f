//! Local credential persistence.
//!
//! The credential file is read fresh on every invocation; nothing is cached
//! in memory between commands. A missing file is the normal initial state
//! and loads as an empty record.

use crate::error::{Error, Result};
use crate::types::CredentialRecord;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File-backed store for the single credential record of this user profile.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted record, or an empty one when no file exists.
    pub fn load(&self) -> Result<CredentialRecord> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No credential file at {}", self.path.display());
                return Ok(CredentialRecord::default());
            }
            Err(e) => {
                return Err(Error::Storage(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&data).map_err(|e| {
            Error::Storage(format!("failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Stamp `last_used_at` and write the record.
    ///
    /// The data goes to a sibling temporary file which is then renamed over
    /// the target, so an interrupted write never leaves a truncated file.
    pub fn save(&self, record: &mut CredentialRecord) -> Result<()> {
        record.last_used_at = Utc::now();

        let data = serde_json::to_string_pretty(record)
            .map_err(|e| Error::Storage(format!("failed to serialize credentials: {}", e)))?;

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let written = open_private(&tmp)
            .and_then(|mut file| {
                file.write_all(data.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!("Saved credentials to {}", self.path.display());
        Ok(())
    }

    /// Remove the persisted record. Clearing an absent file is a no-op.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed credentials at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A record is usable when it holds a token that has not yet expired.
pub fn is_valid(record: &CredentialRecord, now: DateTime<Utc>) -> bool {
    !record.api_token.is_empty() && now < record.expires_at
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn record(token: &str, expires_at: DateTime<Utc>) -> CredentialRecord {
        CredentialRecord {
            api_token: token.to_string(),
            api_url: "http://localhost:3000".to_string(),
            user_id: "user-1".to_string(),
            expires_at,
            ..Default::default()
        }
    }

    #[test]
    fn load_missing_file_returns_empty_record() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), CredentialRecord::default());
    }

    #[test]
    fn load_corrupt_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let err = SessionStore::new(&path).load().unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn save_then_load_round_trips_and_stamps_last_used() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join("config.json"));
        let mut rec = record("tok", Utc::now() + Duration::days(30));

        let before = Utc::now();
        store.save(&mut rec).unwrap();
        assert!(rec.last_used_at >= before);

        let loaded = store.load().unwrap();
        assert_eq!(loaded, rec);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        // A non-empty directory at the target makes the rename fail.
        fs::create_dir_all(path.join("occupied")).unwrap();

        let err = SessionStore::new(&path)
            .save(&mut record("tok", Utc::now()))
            .unwrap_err();

        assert!(err.is_storage());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("config.json"));
        store.save(&mut CredentialRecord::default()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("config.json"));
        store.clear().unwrap();

        store.save(&mut record("tok", Utc::now())).unwrap();
        assert!(store.path().exists());
        store.clear().unwrap();
        assert!(!store.path().exists());
        store.clear().unwrap();
    }

    #[test]
    fn validity_depends_only_on_token_and_expiry() {
        let now = Utc::now();
        let expires = now + Duration::hours(1);

        assert!(is_valid(&record("tok", expires), now));
        assert!(!is_valid(&record("tok", expires), expires));
        assert!(!is_valid(&record("tok", expires), expires + Duration::seconds(1)));
        assert!(!is_valid(&record("", expires), now));
        assert!(!is_valid(&CredentialRecord::default(), now));
    }
}
