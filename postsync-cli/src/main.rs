//! postsync — aggregate member research posts into the group site.
//!
//! # Usage
//!
//! ```text
//! postsync [--config members.yml] [--posts-dir publications/posts]
//!          [--dry-run] [--verbose] [--member <username>] [--force] [--json]
//! postsync members [--json]
//! postsync diff [--member <username>]
//! ```
//!
//! Exits nonzero only when the roster cannot be loaded or no member matches.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{diff::DiffArgs, members::MembersArgs, sync::SyncArgs};
use postsync_core::roster::DEFAULT_ROSTER_PATH;

pub const DEFAULT_POSTS_DIR: &str = "publications/posts";

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "postsync",
    version,
    about = "Sync research posts from members' sites into the group publications directory",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    /// Options for the default sync run (ignored by subcommands).
    #[command(flatten)]
    sync: SyncArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Arguments shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to the member roster.
    #[arg(long, global = true, default_value = DEFAULT_ROSTER_PATH)]
    pub config: PathBuf,

    /// Directory the synced posts are written to.
    #[arg(long, global = true, default_value = DEFAULT_POSTS_DIR)]
    pub posts_dir: PathBuf,

    /// Log every per-post decision.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the full roster, inactive members included.
    Members(MembersArgs),

    /// Show unified diffs of what a sync would write. Writes nothing.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    match cli.command {
        Some(Commands::Members(args)) => args.run(&cli.global),
        Some(Commands::Diff(args)) => args.run(&cli.global),
        None => cli.sync.run(&cli.global),
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug for postsync crates
/// with `--verbose`.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "warn,postsync_core=debug,postsync_fetch=debug,postsync_sync=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
