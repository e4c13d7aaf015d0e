pub mod diff;
pub mod insert;
pub mod lock;
pub mod rename;
pub mod resolve;
pub mod tree;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use classync_core::{HolderIdentity, ProjectCatalog, Session};
use classync_sync::{lock as file_lock, WriteResult};

/// Shared-file selection common to every command.
#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Shared catalog file.
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: PathBuf,

    /// Lock identity, `<host>\<account>`. Defaults to the current machine and user.
    #[arg(long, value_name = "ID")]
    pub identity: Option<String>,
}

impl FileArgs {
    pub fn session(&self, require_lock: bool) -> Session {
        let identity = self
            .identity
            .clone()
            .map(HolderIdentity::from)
            .unwrap_or_else(HolderIdentity::current);
        Session::new(self.file.clone(), identity).requiring_lock(require_lock)
    }
}

pub fn load_project(path: &Path) -> Result<ProjectCatalog> {
    ProjectCatalog::load_at(path)
        .with_context(|| format!("failed to load project catalog {}", path.display()))
}

/// Fails unless the session may write the shared file.
pub fn ensure_writable(session: &Session) -> Result<()> {
    if session.require_lock && !file_lock::is_held_by(&session.data_file, &session.identity) {
        bail!(
            "{} is not locked by {}; run `classync lock acquire` first",
            session.data_file.display(),
            session.identity
        );
    }
    Ok(())
}

pub fn print_preview(diff: &str) {
    if diff.is_empty() {
        println!("[dry-run] no changes");
        return;
    }
    print!("{diff}");
    if !diff.ends_with('\n') {
        println!();
    }
}

pub fn print_write(result: &WriteResult, action: &str) {
    match result {
        WriteResult::Written { path, digest } => {
            let short = digest.get(..12).unwrap_or(digest);
            println!("✎  {action}: {} (sha256 {short})", path.display());
        }
        WriteResult::Unchanged { path } => {
            println!("·  {action}: {} already up to date", path.display());
        }
    }
}
