//! `postsync` — the default sync run.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use postsync_sync::{pipeline, MemberReport, PostOutcome, PostStatus, RunSummary, SyncOptions};

use crate::commands::{http_client, load_roster};
use crate::GlobalArgs;

/// Arguments for a sync run.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Report what would be written without touching the publications directory.
    #[arg(long)]
    pub dry_run: bool,

    /// Sync only this member.
    #[arg(long, value_name = "USERNAME")]
    pub member: Option<String>,

    /// Overwrite synced posts that were edited locally.
    #[arg(long)]
    pub force: bool,

    /// Emit the run summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let roster = load_roster(global)?;
        let http = http_client(&roster);
        let options = SyncOptions {
            member: self.member.clone(),
            dry_run: self.dry_run,
            force: self.force,
            ..SyncOptions::default()
        };

        let summary = pipeline::run(&roster, &global.posts_dir, &options, &http)
            .context("sync failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
            );
        } else {
            print_summary(&summary, global.verbose);
        }
        Ok(())
    }
}

pub(crate) fn print_summary(summary: &RunSummary, verbose: bool) {
    let prefix = if summary.dry_run { "[dry-run] " } else { "" };

    for report in &summary.members {
        print_member(prefix, report, verbose);
    }

    println!(
        "{prefix}{} members, {} synced, {} skipped, {} errors",
        summary.members_processed,
        summary.synced,
        summary.skipped,
        if summary.errors > 0 {
            summary.errors.to_string().red().to_string()
        } else {
            summary.errors.to_string()
        },
    );
}

fn print_member(prefix: &str, report: &MemberReport, verbose: bool) {
    if let Some(error) = &report.error {
        println!("{prefix}{} '{}' — {error}", "✗".red(), report.username);
        return;
    }

    let errors = report.count(PostStatus::is_error);
    if verbose || errors > 0 {
        println!(
            "{prefix}{} '{}' ({} synced, {} skipped, {} errors)",
            if errors > 0 { "!".yellow() } else { "✓".green() },
            report.username,
            report.count(PostStatus::is_synced),
            report.count(PostStatus::is_skipped),
            errors,
        );
    }

    for outcome in &report.outcomes {
        if verbose || outcome.status.is_error() {
            println!("  {}", outcome_line(outcome));
        }
    }
}

fn outcome_line(outcome: &PostOutcome) -> String {
    let target = outcome
        .target
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| outcome.filename.clone());
    match outcome.status {
        PostStatus::Written => format!("✎  {target}"),
        PostStatus::WouldWrite => format!("~  {target}"),
        PostStatus::Unchanged => format!("·  {target}"),
        PostStatus::LocallyModified => format!("{}  {target} (edited locally, kept)", "≠".yellow()),
        PostStatus::FetchFailed | PostStatus::ParseFailed | PostStatus::WriteFailed => format!(
            "{}  {target}: {}",
            "✗".red(),
            outcome.detail.as_deref().unwrap_or("failed")
        ),
    }
}
