//! Explicit session context: which shared file is active and who we are.
//!
//! Passed into reader/writer/lock calls instead of ambient global state.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Suffix appended to the shared file name to form the lock sentinel.
pub const LOCK_SUFFIX: &str = ".lock";

/// Lock holder identity, formatted `<host>\<account>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolderIdentity(pub String);

impl HolderIdentity {
    /// Builds the identity of the current process owner from the environment.
    ///
    /// Missing parts are left empty, so the separator is always present.
    pub fn current() -> Self {
        let host = env_first(&["COMPUTERNAME", "HOSTNAME"]);
        let account = env_first(&["USERNAME", "USER"]);
        Self::from_parts(&host, &account)
    }

    pub fn from_parts(host: &str, account: &str) -> Self {
        Self(format!("{host}\\{account}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for HolderIdentity {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for HolderIdentity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

fn env_first(keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
        .unwrap_or_default()
}

/// The active shared catalog file and the identity acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub data_file: PathBuf,
    pub identity: HolderIdentity,
    /// When set, writer-bound operations require holding the lock.
    pub require_lock: bool,
}

impl Session {
    pub fn new(data_file: impl Into<PathBuf>, identity: HolderIdentity) -> Self {
        Self {
            data_file: data_file.into(),
            identity,
            require_lock: false,
        }
    }

    pub fn requiring_lock(mut self, require_lock: bool) -> Self {
        self.require_lock = require_lock;
        self
    }

    pub fn lock_path(&self) -> PathBuf {
        lock_path_for(&self.data_file)
    }
}

/// `<path>.lock`: the suffix is appended to the full file name.
pub fn lock_path_for(data_file: &Path) -> PathBuf {
    let mut os = data_file.as_os_str().to_owned();
    os.push(LOCK_SUFFIX);
    PathBuf::from(os)
}
