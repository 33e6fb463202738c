//! Sync orchestrator shared by every `postsync` entry point.
//!
//! Per post: `Fetched → Parsed → (Unchanged | Transformed) → (Written |
//! DryRunReported)`, with `FetchFailed` / `ParseFailed` / `WriteFailed`
//! exits. Failures are counted in the [`RunSummary`], never raised; only an
//! unloadable roster or an empty member selection fails the run.

use std::path::Path;

use chrono::{Local, NaiveDate};

use postsync_core::{MemberRecord, Roster, SyncConfig};
use postsync_fetch::{Fetcher, HttpGet};

use crate::diff;
use crate::error::SyncError;
use crate::summary::{MemberReport, PostOutcome, PostStatus, RunSummary};
use crate::transform::{transform, Decision, TransformContext};
use crate::writer;

/// Knobs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Restrict the run to this username.
    pub member: Option<String>,
    pub dry_run: bool,
    /// Overwrite synced copies that were edited locally.
    pub force: bool,
    /// Attach unified diffs to written / would-write outcomes.
    pub collect_diffs: bool,
    /// Date used for `synced_date` and stamped `date` fields.
    pub today: NaiveDate,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            member: None,
            dry_run: false,
            force: false,
            collect_diffs: false,
            today: Local::now().date_naive(),
        }
    }
}

/// Sync every selected member of `roster` into `posts_dir`.
pub fn run(
    roster: &Roster,
    posts_dir: &Path,
    options: &SyncOptions,
    http: &dyn HttpGet,
) -> Result<RunSummary, SyncError> {
    let selected = roster.select(options.member.as_deref());
    if selected.is_empty() {
        if let Some(member) = options.member.as_deref().and_then(|f| roster.find(f)) {
            tracing::warn!(member = %member.username, "member is inactive");
        }
        return Err(SyncError::NoMembers {
            filter: options.member.clone(),
        });
    }
    for member in &roster.members {
        if !selected.iter().any(|m| m.username == member.username) {
            let reason = if member.active { "filtered out" } else { "inactive" };
            tracing::debug!(member = %member.username, reason, "skipping member");
        }
    }

    tracing::info!(count = selected.len(), dry_run = options.dry_run, "syncing members");
    let fetcher = Fetcher::new(http, &roster.sync_config);
    let mut summary = RunSummary::new(options.dry_run);
    for member in selected {
        let report = sync_member(member, &fetcher, &roster.sync_config, posts_dir, options);
        summary.push(report);
    }

    tracing::info!(
        members = summary.members_processed,
        synced = summary.synced,
        skipped = summary.skipped,
        errors = summary.errors,
        "sync finished"
    );
    Ok(summary)
}

fn sync_member(
    member: &MemberRecord,
    fetcher: &Fetcher<'_>,
    config: &SyncConfig,
    posts_dir: &Path,
    options: &SyncOptions,
) -> MemberReport {
    let mut report = MemberReport::new(member.username.0.clone());
    tracing::info!(member = %member.username, "syncing posts");

    let stream = match fetcher.posts(member, config.post_limit()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::error!(member = %member.username, error = %err, "could not fetch posts");
            report.error = Some(err.to_string());
            return report;
        }
    };

    let ctx = TransformContext {
        member,
        config,
        posts_dir,
        today: options.today,
        force: options.force,
    };

    for item in stream {
        let post = match item {
            Ok(post) => post,
            Err(err) => {
                tracing::warn!(member = %member.username, error = %err, "skipping post");
                report
                    .outcomes
                    .push(PostOutcome::failed(&err.filename, PostStatus::FetchFailed, &err));
                continue;
            }
        };
        tracing::debug!(member = %member.username, file = %post.filename, "fetched");

        let decision = match transform(&post, &ctx) {
            Ok(decision) => decision,
            Err(err) => {
                let status = match err {
                    SyncError::Io { .. } => PostStatus::WriteFailed,
                    _ => PostStatus::ParseFailed,
                };
                tracing::warn!(member = %member.username, file = %post.filename, error = %err, "skipping post");
                report
                    .outcomes
                    .push(PostOutcome::failed(&post.filename, status, &err));
                continue;
            }
        };

        tracing::debug!(
            member = %member.username,
            file = %post.filename,
            target = %decision.path().display(),
            "transformed"
        );
        let diff = match &decision {
            Decision::Write {
                path,
                content,
                previous,
            } if options.collect_diffs => Some(diff::unified(path, previous.as_deref(), content)),
            _ => None,
        };

        match writer::apply(decision, options.dry_run) {
            Ok(result) => {
                let mut outcome = PostOutcome::from_write(&post.filename, &result);
                tracing::debug!(
                    member = %member.username,
                    file = %post.filename,
                    status = ?outcome.status,
                    "post resolved"
                );
                outcome.diff = diff;
                report.outcomes.push(outcome);
            }
            Err(err) => {
                tracing::error!(member = %member.username, file = %post.filename, error = %err, "write failed");
                report
                    .outcomes
                    .push(PostOutcome::failed(&post.filename, PostStatus::WriteFailed, &err));
            }
        }
    }

    tracing::info!(
        member = %member.username,
        synced = report.count(PostStatus::is_synced),
        skipped = report.count(PostStatus::is_skipped),
        errors = report.count(PostStatus::is_error),
        "member done"
    );
    report
}
