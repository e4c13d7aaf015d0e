//! `classync resolve <ID> --use <RESOLUTION>`: act on one diff entry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use classync_sync::{reconcile, resolve, Resolution, Resolved};

use super::{load_project, print_write, FileArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolutionArg {
    /// Insert the project item into the shared file.
    Export,
    /// Rename the shared item to the project name.
    ProjectName,
    /// Rename the project item to the shared name.
    ServerName,
    /// Change the project item's id to the shared id.
    ServerId,
    /// Create the shared item in the project.
    Import,
}

impl From<ResolutionArg> for Resolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Export => Resolution::ExportToServer,
            ResolutionArg::ProjectName => Resolution::UseProjectName,
            ResolutionArg::ServerName => Resolution::UseServerName,
            ResolutionArg::ServerId => Resolution::UseServerId,
            ResolutionArg::Import => Resolution::ImportFromServer,
        }
    }
}

/// Arguments for `classync resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: FileArgs,

    /// Project catalog (YAML). Saved in place when the resolution changes it.
    #[arg(long, short = 'p', value_name = "PATH")]
    pub project: PathBuf,

    /// Id of the diff entry to resolve.
    pub id: String,

    #[arg(long = "use", value_enum, value_name = "RESOLUTION")]
    pub resolution: ResolutionArg,

    /// Refuse to write the shared file unless this identity holds the lock.
    #[arg(long)]
    pub require_lock: bool,
}

impl ResolveArgs {
    pub fn run(self) -> Result<()> {
        let mut project = load_project(&self.project)?;
        let session = self.target.session(self.require_lock);
        let resolution = Resolution::from(self.resolution);

        let recon = reconcile(&project, &session).with_context(|| {
            format!("failed to reconcile against {}", session.data_file.display())
        })?;
        let entry = recon
            .entry(&self.id)
            .with_context(|| format!("no diff entry for '{}'", self.id))?
            .clone();

        let resolved = resolve(&recon, &entry, resolution, &mut project, &session)
            .with_context(|| format!("cannot {resolution} '{}'", self.id))?;

        match resolved {
            Resolved::Server(result) => print_write(&result, &format!("{resolution} '{}'", self.id)),
            Resolved::Project { item } => {
                project
                    .save_at(&self.project)
                    .with_context(|| format!("failed to save {}", self.project.display()))?;
                println!(
                    "✎  {resolution} '{}': project item {item} updated in {}",
                    self.id,
                    self.project.display()
                );
            }
        }
        Ok(())
    }
}
