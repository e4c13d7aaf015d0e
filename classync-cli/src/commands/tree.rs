//! `classync tree`: print the shared file as an indented tree.

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Args;
use colored::Colorize;

use classync_core::ClassificationNode;
use classync_sync::reader;

/// Arguments for `classync tree`.
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Shared catalog file.
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: PathBuf,
}

impl TreeArgs {
    pub fn run(self) -> Result<()> {
        ensure!(self.file.exists(), "{} does not exist", self.file.display());

        let systems = reader::read_file(&self.file);
        if systems.is_empty() {
            println!("No systems in {}.", self.file.display());
            return Ok(());
        }

        for system in &systems {
            println!(
                "{} {} ({} items)",
                system.system_name.bold(),
                format!("v{}", system.version).bright_black(),
                system.item_count()
            );
            print_nodes(&system.roots, 1);
        }
        Ok(())
    }
}

fn print_nodes(nodes: &[ClassificationNode], depth: usize) {
    for node in nodes {
        println!("{}{}  {}", "  ".repeat(depth), node.id.cyan(), node.name);
        print_nodes(&node.children, depth + 1);
    }
}
