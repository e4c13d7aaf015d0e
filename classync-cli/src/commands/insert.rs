//! `classync insert`: add one item to the shared file.

use anyhow::{Context, Result};
use clap::Args;

use classync_core::ClassificationNode;
use classync_sync::writer::{self, Edit, InsertParent};

use super::{ensure_writable, print_preview, print_write, FileArgs};

/// Arguments for `classync insert`.
#[derive(Args, Debug)]
pub struct InsertArgs {
    #[command(flatten)]
    pub target: FileArgs,

    /// Id of the new item.
    #[arg(long)]
    pub id: String,

    /// Display name of the new item.
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,

    /// Insert as the last child of this item.
    #[arg(long, conflicts_with = "system")]
    pub parent: Option<String>,

    /// Insert as a root of this system. Without --parent or --system the
    /// item becomes a root of the last system in the file.
    #[arg(long)]
    pub system: Option<String>,

    /// Print the unified diff instead of writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Refuse to write unless this identity holds the lock.
    #[arg(long)]
    pub require_lock: bool,
}

impl InsertArgs {
    pub fn run(self) -> Result<()> {
        let session = self.target.session(self.require_lock);

        let mut node = ClassificationNode::new(self.id, self.name);
        if let Some(description) = self.description {
            node = node.with_description(description);
        }
        let parent = match self.parent {
            Some(id) => InsertParent::Item(id),
            None => InsertParent::Root {
                system: self.system,
            },
        };
        let edit = Edit::Insert { parent, node };

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
