//! classync: reconcile a project's classification catalog with a shared
//! catalog file.
//!
//! # Usage
//!
//! ```text
//! classync diff    --file <XML> --project <YAML> [--json] [--all]
//! classync tree    --file <XML>
//! classync rename  --file <XML> <ID> <NAME> [--dry-run] [--require-lock]
//! classync insert  --file <XML> --id <ID> --name <NAME> [--description <D>]
//!                  [--parent <ID> | --system <NAME>] [--dry-run] [--require-lock]
//! classync lock    acquire|release|status|break --file <XML> [--json]
//! classync resolve --file <XML> --project <YAML> <ID> --use <RESOLUTION> [--require-lock]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, insert::InsertArgs, lock::LockCommand, rename::RenameArgs,
    resolve::ResolveArgs, tree::TreeArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "classync",
    version,
    about = "Reconcile classification systems with a shared catalog file",
    long_about = None,
)]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify project items against the shared file.
    Diff(DiffArgs),

    /// Print the shared file as an indented tree.
    Tree(TreeArgs),

    /// Rename an item in the shared file.
    Rename(RenameArgs),

    /// Insert an item into the shared file.
    Insert(InsertArgs),

    /// Acquire, release, inspect or break the shared file's lock.
    Lock {
        #[command(subcommand)]
        command: LockCommand,
    },

    /// Apply one resolution to one diff entry.
    Resolve(ResolveArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.parse_filters("debug");
    }
    logger.init();

    match cli.command {
        Commands::Diff(args) => args.run(),
        Commands::Tree(args) => args.run(),
        Commands::Rename(args) => args.run(),
        Commands::Insert(args) => args.run(),
        Commands::Lock { command } => commands::lock::run(command),
        Commands::Resolve(args) => args.run(),
    }
}
