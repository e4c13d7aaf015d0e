//! `classync rename <ID> <NAME>`: rename an item in the shared file.

use anyhow::{Context, Result};
use clap::Args;

use classync_sync::writer::{self, Edit};

use super::{ensure_writable, print_preview, print_write, FileArgs};

/// Arguments for `classync rename`.
#[derive(Args, Debug)]
pub struct RenameArgs {
    #[command(flatten)]
    pub target: FileArgs,

    /// Id of the item to rename.
    pub id: String,

    /// New display name.
    pub name: String,

    /// Print the unified diff instead of writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Refuse to write unless this identity holds the lock.
    #[arg(long)]
    pub require_lock: bool,
}

impl RenameArgs {
    pub fn run(self) -> Result<()> {
        let session = self.target.session(self.require_lock);
        let edit = Edit::Rename {
            id: self.id.clone(),
            new_name: self.name.clone(),
        };

        if self.dry_run {
            let diff = writer::preview(&session.data_file, &edit)
                .with_context(|| format!("cannot {edit}"))?;
            print_preview(&diff);
            return Ok(());
        }

        ensure_writable(&session)?;
        let result =
            writer::apply(&session.data_file, &edit).with_context(|| format!("cannot {edit}"))?;
        print_write(&result, &edit.to_string());
        Ok(())
    }
}
