//! `classync lock acquire|release|status|break`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use classync_sync::{lock, LockInfo};

use super::FileArgs;

/// Advisory lock on the shared file.
#[derive(Subcommand, Debug)]
pub enum LockCommand {
    /// Take the lock. Fails if anyone, including you, already holds it.
    Acquire(LockArgs),

    /// Drop the lock if you hold it.
    Release(LockArgs),

    /// Show who holds the lock.
    Status(LockArgs),

    /// Remove the lock whoever holds it.
    Break(LockArgs),
}

#[derive(Args, Debug)]
pub struct LockArgs {
    #[command(flatten)]
    pub target: FileArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: LockCommand) -> Result<()> {
    match cmd {
        LockCommand::Acquire(args) => acquire(args),
        LockCommand::Release(args) => release(args),
        LockCommand::Status(args) => status(args),
        LockCommand::Break(args) => break_lock(args),
    }
}

fn acquire(args: LockArgs) -> Result<()> {
    let session = args.target.session(false);
    let info = lock::acquire(&session.data_file, &session.identity)
        .with_context(|| format!("cannot lock {}", session.data_file.display()))?;
    if args.json {
        return print_json(&info);
    }
    println!(
        "{} locked {} as {}",
        "✓".green(),
        session.data_file.display(),
        session.identity
    );
    Ok(())
}

fn release(args: LockArgs) -> Result<()> {
    let session = args.target.session(false);
    let released = lock::release(&session.data_file, &session.identity)
        .with_context(|| format!("cannot release {}", session.data_file.display()))?;
    if args.json {
        println!("{}", serde_json::json!({ "released": released }));
        return Ok(());
    }
    if released {
        println!("{} released {}", "✓".green(), session.data_file.display());
    } else {
        println!(
            "{} is not locked by {}; nothing released",
            session.data_file.display(),
            session.identity
        );
    }
    Ok(())
}

fn status(args: LockArgs) -> Result<()> {
    let info = lock::status(&args.target.file)
        .with_context(|| format!("cannot read lock of {}", args.target.file.display()))?;
    if args.json {
        return print_json(&info);
    }
    print_info(&info);
    Ok(())
}

fn break_lock(args: LockArgs) -> Result<()> {
    let evicted = lock::break_lock(&args.target.file)
        .with_context(|| format!("cannot break lock of {}", args.target.file.display()))?;
    if args.json {
        println!("{}", serde_json::json!({ "evicted": evicted }));
        return Ok(());
    }
    match evicted {
        Some(info) => println!(
            "{} broke lock held by {} since {}",
            "!".yellow(),
            info.holder.as_deref().unwrap_or("?"),
            info.time.as_deref().unwrap_or("?")
        ),
        None => println!("{} was not locked", args.target.file.display()),
    }
    Ok(())
}

fn print_info(info: &LockInfo) {
    if !info.locked {
        println!("{}", "unlocked".green());
        return;
    }
    println!(
        "{} by {} since {}",
        "locked".red(),
        info.holder.as_deref().unwrap_or("?"),
        info.time.as_deref().unwrap_or("?")
    );
}

fn print_json(info: &LockInfo) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(info).context("failed to serialize lock JSON")?
    );
    Ok(())
}
