//! Error types for postsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use postsync_core::ConfigError;
use postsync_fetch::TransportError;

/// All errors that can arise from sync operations.
///
/// Only [`SyncError::Config`] and [`SyncError::NoMembers`] abort a run; the
/// others are counted against a member or a post.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The roster could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A listing or body fetch failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A fetched post had no usable front-matter or an unsafe filename.
    #[error("format error in {file}: {message}")]
    Format { file: String, message: String },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The member filter matched no active member.
    #[error("{}", no_members_message(.filter))]
    NoMembers { filter: Option<String> },
}

fn no_members_message(filter: &Option<String>) -> String {
    match filter {
        Some(name) => format!("no active member named '{name}' in the roster"),
        None => "no active members in the roster".to_string(),
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Format`].
pub(crate) fn format_err(file: &str, message: impl ToString) -> SyncError {
    SyncError::Format {
        file: file.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_members_message_names_filter() {
        let err = SyncError::NoMembers {
            filter: Some("ghost".to_string()),
        };
        assert!(err.to_string().contains("ghost"));
        let err = SyncError::NoMembers { filter: None };
        assert_eq!(err.to_string(), "no active members in the roster");
    }
}
