//! Advisory lock on the shared catalog file.
//!
//! The lock is a sentinel file next to the catalog (`<file>.lock`) holding
//! two lines:
//!
//! ```text
//! user=<host>\<account>
//! time=<YYYY-MM-DD HH:MM:SS>
//! ```
//!
//! Creation uses create-if-absent semantics, so two sessions racing to
//! acquire cannot both succeed. There is no lease: a lock lives until its
//! holder releases it or an operator breaks it with [`break_lock`].

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::Local;
use serde::Serialize;

use classync_core::HolderIdentity;

/// Sentinel path for a data file.
pub use classync_core::session::lock_path_for as lock_path;

use crate::error::{io_err, SyncError};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const USER_KEY: &str = "user=";
const TIME_KEY: &str = "time=";

/// Snapshot of the sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LockInfo {
    pub locked: bool,
    pub holder: Option<String>,
    pub time: Option<String>,
}

impl LockInfo {
    fn held_by(&self, identity: &HolderIdentity) -> bool {
        self.locked && self.holder.as_deref() == Some(identity.as_str())
    }
}

/// Take the lock on `data_file` for `identity`.
///
/// Fails with [`SyncError::AlreadyLocked`] whenever a sentinel exists, even
/// one written by `identity` itself.
pub fn acquire(data_file: &Path, identity: &HolderIdentity) -> Result<LockInfo, SyncError> {
    let path = lock_path(data_file);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let current = status(data_file)?;
            tracing::debug!(
                "lock on {} refused: held by {:?}",
                data_file.display(),
                current.holder
            );
            return Err(SyncError::AlreadyLocked {
                holder: current.holder.unwrap_or_default(),
                time: current.time.unwrap_or_default(),
            });
        }
        Err(e) => return Err(io_err(&path, e)),
    };

    let time = Local::now().format(TIME_FORMAT).to_string();
    let body = format!("{USER_KEY}{identity}\n{TIME_KEY}{time}\n");
    if let Err(e) = file.write_all(body.as_bytes()).and_then(|()| file.flush()) {
        drop(file);
        let _ = fs::remove_file(&path);
        return Err(io_err(&path, e));
    }

    tracing::info!("locked {} as {identity}", data_file.display());
    Ok(LockInfo {
        locked: true,
        holder: Some(identity.to_string()),
        time: Some(time),
    })
}

/// Drop the lock if `identity` holds it. Returns whether a sentinel was
/// removed; releasing someone else's lock, or no lock, is a no-op.
pub fn release(data_file: &Path, identity: &HolderIdentity) -> Result<bool, SyncError> {
    let current = status(data_file)?;
    if !current.held_by(identity) {
        tracing::debug!(
            "not releasing {}: holder is {:?}, not {identity}",
            data_file.display(),
            current.holder
        );
        return Ok(false);
    }

    let removed = remove_sentinel(data_file)?;
    if removed {
        tracing::info!("released {}", data_file.display());
    }
    Ok(removed)
}

/// Read the sentinel. A missing sentinel means unlocked.
pub fn status(data_file: &Path) -> Result<LockInfo, SyncError> {
    let path = lock_path(data_file);
    match fs::read_to_string(&path) {
        Ok(content) => Ok(parse_sentinel(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(LockInfo::default()),
        Err(e) => Err(io_err(&path, e)),
    }
}

/// True when the sentinel names `identity`. Unreadable sentinels count as
/// not held.
pub fn is_held_by(data_file: &Path, identity: &HolderIdentity) -> bool {
    status(data_file)
        .map(|info| info.held_by(identity))
        .unwrap_or(false)
}

/// Remove the sentinel regardless of its holder.
///
/// Operator action for locks left behind by crashed sessions. Returns the
/// evicted lock, or `None` when there was nothing to break.
pub fn break_lock(data_file: &Path) -> Result<Option<LockInfo>, SyncError> {
    let current = status(data_file)?;
    if !current.locked || !remove_sentinel(data_file)? {
        return Ok(None);
    }
    tracing::warn!(
        "broke lock on {} held by {} since {}",
        data_file.display(),
        current.holder.as_deref().unwrap_or("<unknown>"),
        current.time.as_deref().unwrap_or("<unknown>")
    );
    Ok(Some(current))
}

fn remove_sentinel(data_file: &Path) -> Result<bool, SyncError> {
    let path = lock_path(data_file);
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_err(&path, e)),
    }
}

fn parse_sentinel(content: &str) -> LockInfo {
    let mut info = LockInfo {
        locked: true,
        ..LockInfo::default()
    };
    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(holder) = line.strip_prefix(USER_KEY) {
            info.holder = Some(holder.to_string());
        } else if let Some(time) = line.strip_prefix(TIME_KEY) {
            info.time = Some(time.to_string());
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::NaiveDateTime;
    use tempfile::TempDir;

    fn alice() -> HolderIdentity {
        HolderIdentity::from_parts("WS-01", "alice")
    }

    fn bob() -> HolderIdentity {
        HolderIdentity::from_parts("WS-02", "bob")
    }

    #[test]
    fn sentinel_sits_next_to_data_file() {
        assert_eq!(
            lock_path(Path::new("/share/catalog.xml")),
            PathBuf::from("/share/catalog.xml.lock")
        );
    }

    #[test]
    fn acquire_writes_holder_and_timestamp() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("catalog.xml");

        let info = acquire(&data, &alice()).unwrap();
        assert!(info.locked);
        assert_eq!(info.holder.as_deref(), Some("WS-01\\alice"));

        let raw = fs::read_to_string(lock_path(&data)).unwrap();
        let mut lines = raw.lines();
        assert_eq!(lines.next(), Some("user=WS-01\\alice"));
        let time = lines.next().unwrap().strip_prefix("time=").unwrap();
        NaiveDateTime::parse_from_str(time, TIME_FORMAT).unwrap();
        assert_eq!(status(&data).unwrap(), info);
    }

    #[test]
    fn two_sessions_contend() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("catalog.xml");

        acquire(&data, &alice()).unwrap();
        let err = acquire(&data, &bob()).unwrap_err();
        match err {
            SyncError::AlreadyLocked { holder, time } => {
                assert_eq!(holder, "WS-01\\alice");
                assert!(!time.is_empty());
            }
            other => panic!("expected AlreadyLocked, got {other}"),
        }

        assert!(!release(&data, &bob()).unwrap());
        assert!(lock_path(&data).exists());
        assert!(is_held_by(&data, &alice()));
        assert!(!is_held_by(&data, &bob()));

        assert!(release(&data, &alice()).unwrap());
        assert!(!lock_path(&data).exists());
        assert!(!status(&data).unwrap().locked);
    }

    #[test]
    fn reacquire_by_holder_is_refused() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("catalog.xml");
        acquire(&data, &alice()).unwrap();
        assert!(matches!(
            acquire(&data, &alice()),
            Err(SyncError::AlreadyLocked { .. })
        ));
    }

    #[test]
    fn release_without_sentinel_is_noop() {
        let dir = TempDir::new().unwrap();
        assert!(!release(&dir.path().join("catalog.xml"), &alice()).unwrap());
    }

    #[test]
    fn status_tolerates_crlf_sentinel() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("catalog.xml");
        fs::write(
            lock_path(&data),
            "user=HOST\\carol\r\ntime=2024-03-01 08:15:00\r\n",
        )
        .unwrap();

        let info = status(&data).unwrap();
        assert_eq!(info.holder.as_deref(), Some("HOST\\carol"));
        assert_eq!(info.time.as_deref(), Some("2024-03-01 08:15:00"));
        assert!(is_held_by(&data, &HolderIdentity::from("HOST\\carol")));
    }

    #[test]
    fn break_lock_evicts_any_holder() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("catalog.xml");
        assert_eq!(break_lock(&data).unwrap(), None);

        acquire(&data, &alice()).unwrap();
        let evicted = break_lock(&data).unwrap().expect("evicted");
        assert_eq!(evicted.holder.as_deref(), Some("WS-01\\alice"));
        assert!(!lock_path(&data).exists());

        acquire(&data, &bob()).unwrap();
        assert!(is_held_by(&data, &bob()));
    }

    #[test]
    fn acquire_in_missing_directory_is_io_error() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("no-such-dir").join("catalog.xml");
        assert!(matches!(acquire(&data, &alice()), Err(SyncError::Io { .. })));
    }
}
