//! Member roster loading.
//!
//! # File layout
//!
//! ```yaml
//! members:
//!   - username: JacobKMcPherson
//!     name: Jacob K. McPherson
//!     role: PI
//!     profile_url: https://jacobkmcpherson.github.io
//!     posts_path: /research/posts
//!     active: true
//! sync_config:
//!   max_posts_per_member: 50
//!   preserve_dates: true
//!   add_attribution: true
//! ```
//!
//! Unknown fields are ignored. Inactive members are kept in the returned
//! [`Roster`]; callers skip them through [`Roster::select`].

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{MemberRecord, Roster, SyncConfig, Username};

/// Roster path used when none is given on the command line.
pub const DEFAULT_ROSTER_PATH: &str = "members.yml";

#[derive(Debug, Deserialize)]
struct RosterFile {
    members: Option<Vec<MemberEntry>>,
    sync_config: Option<SyncConfig>,
}

#[derive(Debug, Deserialize)]
struct MemberEntry {
    username: Option<String>,
    name: Option<String>,
    role: Option<String>,
    profile_url: Option<String>,
    posts_path: Option<String>,
    active: Option<bool>,
    repo: Option<String>,
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load the roster at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with path
/// and line context) if malformed, and `MissingField` / `DuplicateUsername`
/// for records that fail validation.
pub fn load_at(path: &Path) -> Result<Roster, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, path)
}

/// Parse roster YAML; `path` is only used for error context.
pub fn parse(contents: &str, path: &Path) -> Result<Roster, ConfigError> {
    let file: RosterFile = serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = file.members.unwrap_or_default();
    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let member = validate(index, entry)?;
        if !seen.insert(member.username.key()) {
            return Err(ConfigError::DuplicateUsername {
                username: member.username.0,
            });
        }
        members.push(member);
    }

    Ok(Roster {
        members,
        sync_config: file.sync_config.unwrap_or_default(),
    })
}

fn validate(index: usize, entry: MemberEntry) -> Result<MemberRecord, ConfigError> {
    let username = non_empty(entry.username).ok_or(ConfigError::MissingField {
        index,
        field: "username",
    })?;
    let posts_path = non_empty(entry.posts_path).ok_or(ConfigError::MissingField {
        index,
        field: "posts_path",
    })?;

    Ok(MemberRecord {
        name: entry.name.unwrap_or_else(|| username.clone()),
        role: entry.role.unwrap_or_default(),
        profile_url: entry
            .profile_url
            .unwrap_or_else(|| format!("https://{}.github.io", username.to_lowercase())),
        posts_path,
        active: entry.active.unwrap_or(true),
        repo: non_empty(entry.repo),
        username: Username::from(username),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
