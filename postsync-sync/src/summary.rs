//! Run summary: per-post outcomes rolled up per member and per run.

use std::path::PathBuf;

use serde::Serialize;

use crate::writer::WriteResult;

/// Terminal state of one post in the per-post state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Written,
    WouldWrite,
    Unchanged,
    LocallyModified,
    FetchFailed,
    ParseFailed,
    WriteFailed,
}

impl PostStatus {
    pub fn is_synced(self) -> bool {
        matches!(self, PostStatus::Written | PostStatus::WouldWrite)
    }

    pub fn is_skipped(self) -> bool {
        matches!(self, PostStatus::Unchanged | PostStatus::LocallyModified)
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            PostStatus::FetchFailed | PostStatus::ParseFailed | PostStatus::WriteFailed
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostOutcome {
    /// Filename on the member's site.
    pub filename: String,
    /// Local target, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Unified diff against the local copy, when diffs were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl PostOutcome {
    pub fn from_write(filename: &str, result: &WriteResult) -> Self {
        let status = match result {
            WriteResult::Written { .. } => PostStatus::Written,
            WriteResult::WouldWrite { .. } => PostStatus::WouldWrite,
            WriteResult::Unchanged { .. } => PostStatus::Unchanged,
            WriteResult::LocallyModified { .. } => PostStatus::LocallyModified,
        };
        Self {
            filename: filename.to_string(),
            target: Some(result.path().to_path_buf()),
            status,
            detail: None,
            diff: None,
        }
    }

    pub fn failed(filename: &str, status: PostStatus, detail: impl ToString) -> Self {
        Self {
            filename: filename.to_string(),
            target: None,
            status,
            detail: Some(detail.to_string()),
            diff: None,
        }
    }
}

/// Everything that happened for one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberReport {
    pub username: String,
    pub outcomes: Vec<PostOutcome>,
    /// Member-level failure (host unreachable); no outcomes when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MemberReport {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            outcomes: Vec::new(),
            error: None,
        }
    }

    pub fn count(&self, pred: impl Fn(PostStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o.status)).count()
    }
}

/// Counts for a whole run. Only used for reporting and exit status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub members_processed: usize,
    pub synced: usize,
    pub skipped: usize,
    pub errors: usize,
    pub members: Vec<MemberReport>,
}

impl RunSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn push(&mut self, report: MemberReport) {
        self.members_processed += 1;
        self.synced += report.count(PostStatus::is_synced);
        self.skipped += report.count(PostStatus::is_skipped);
        self.errors += report.count(PostStatus::is_error) + usize::from(report.error.is_some());
        self.members.push(report);
    }

    /// Files actually written to disk.
    pub fn written(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.count(|s| s == PostStatus::Written))
            .sum()
    }

    pub fn member(&self, username: &str) -> Option<&MemberReport> {
        self.members
            .iter()
            .find(|m| m.username.eq_ignore_ascii_case(username))
    }
}
