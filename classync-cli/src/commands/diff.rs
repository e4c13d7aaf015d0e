//! `classync diff`: classify project items against the shared file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::{ColoredString, Colorize};
use tabled::{settings::Style, Table, Tabled};

use classync_core::{DiffEntry, DiffStatus};
use classync_sync::{reconcile, summarize, DiffSummary};

use super::{load_project, FileArgs};

/// Arguments for `classync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub target: FileArgs,

    /// Project catalog (YAML).
    #[arg(long, short = 'p', value_name = "PATH")]
    pub project: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Include matching items.
    #[arg(long)]
    pub all: bool,
}

#[derive(Tabled)]
struct DiffRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "project name")]
    project_name: String,
    #[tabled(rename = "server name")]
    server_name: String,
    #[tabled(rename = "server id")]
    server_id: String,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let project = load_project(&self.project)?;
        let session = self.target.session(false);
        let recon = reconcile(&project, &session).with_context(|| {
            format!("failed to reconcile against {}", session.data_file.display())
        })?;

        let summary = summarize(&recon.entries);
        let shown: Vec<&DiffEntry> = recon
            .entries
            .iter()
            .filter(|e| self.all || e.status != DiffStatus::Match)
            .collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&shown).context("failed to serialize diff JSON")?
            );
            return Ok(());
        }

        print_table(&shown, &summary);
        Ok(())
    }
}

fn print_table(entries: &[&DiffEntry], summary: &DiffSummary) {
    if entries.is_empty() {
        println!("{} everything matches ({} items)", "✓".green(), summary.total());
        return;
    }

    let rows: Vec<DiffRow> = entries
        .iter()
        .map(|e| DiffRow {
            id: e.id.clone(),
            status: status_label(e),
            project_name: e.project_name.clone(),
            server_name: e.server_name.clone(),
            server_id: e.server_id.clone().unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let counts: Vec<String> = summary
        .counts
        .iter()
        .map(|(status, n)| format!("{} {n}", paint(*status, &status.to_string())))
        .collect();
    println!(
        "{} items, {} need attention | {}",
        summary.total(),
        summary.needs_attention(),
        counts.join("  ")
    );
}

fn status_label(entry: &DiffEntry) -> String {
    match entry.status {
        DiffStatus::IdMismatch if entry.cascade_child_count > 0 => {
            format!("id_mismatch (+{} cascaded)", entry.cascade_child_count)
        }
        status => status.to_string(),
    }
}

fn paint(status: DiffStatus, text: &str) -> ColoredString {
    match status {
        DiffStatus::Match => text.green(),
        DiffStatus::IdCollision | DiffStatus::DoubleConflict => text.red(),
        DiffStatus::IdMismatch | DiffStatus::IdCascade => text.yellow(),
        DiffStatus::OnlyInProject => text.cyan(),
        DiffStatus::OnlyInServer => text.magenta(),
    }
}
