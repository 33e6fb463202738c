//! Domain types for the member roster.
//!
//! All types are immutable for the duration of a run. [`SyncConfig`] fields
//! carry serde defaults so a roster may omit any of them.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed member username (the roster's unique key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(pub String);

impl Username {
    /// Case-folded form used for every username comparison and for the
    /// synced filename prefix `<key>-<original filename>`.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn file_prefix(&self) -> String {
        self.key()
    }

    /// Usernames on the hosted source are case-insensitive.
    pub fn matches(&self, other: &str) -> bool {
        self.key() == other.to_lowercase()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One affiliated member whose posts are synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    pub username: Username,
    pub name: String,
    pub role: String,
    pub profile_url: String,
    /// Directory inside the member's hosted repository, e.g. `/research/posts`.
    pub posts_path: String,
    pub active: bool,
    /// Hosted repository name; `<username>.github.io` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

impl MemberRecord {
    pub fn repo_name(&self) -> String {
        self.repo
            .clone()
            .unwrap_or_else(|| format!("{}.github.io", self.username))
    }

    /// `posts_path` without leading/trailing slashes.
    pub fn posts_dir(&self) -> &str {
        self.posts_path.trim_matches('/')
    }
}

/// Global sync settings (`sync_config` in the roster).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// 0 means unlimited.
    pub max_posts_per_member: usize,
    pub preserve_dates: bool,
    pub add_attribution: bool,
    /// Site name quoted in the attribution footer.
    pub site_name: String,
    pub api_base: String,
    pub raw_base: String,
    pub html_base: String,
    pub branch: String,
    pub post_extension: String,
    /// Conventional filenames probed when the directory listing is unavailable.
    pub fallback_filenames: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_posts_per_member: 0,
            preserve_dates: true,
            add_attribution: true,
            site_name: "McPherson Group".to_string(),
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            html_base: "https://github.com".to_string(),
            branch: "main".to_string(),
            post_extension: ".qmd".to_string(),
            fallback_filenames: vec!["index.qmd".to_string(), "test-post.qmd".to_string()],
            timeout_secs: 30,
        }
    }
}

impl SyncConfig {
    /// `None` when posts per member are unlimited.
    pub fn post_limit(&self) -> Option<usize> {
        match self.max_posts_per_member {
            0 => None,
            n => Some(n),
        }
    }
}

/// The loaded roster: every member (inactive ones included) plus settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Roster {
    pub members: Vec<MemberRecord>,
    pub sync_config: SyncConfig,
}

impl Roster {
    /// Members a run processes: active ones, restricted to `filter` if given.
    pub fn select(&self, filter: Option<&str>) -> Vec<&MemberRecord> {
        self.members
            .iter()
            .filter(|m| m.active)
            .filter(|m| filter.map_or(true, |f| m.username.matches(f)))
            .collect()
    }

    pub fn find(&self, username: &str) -> Option<&MemberRecord> {
        self.members.iter().find(|m| m.username.matches(username))
    }

    pub fn active_count(&self) -> usize {
        self.members.iter().filter(|m| m.active).count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
