//! Error types for postsync-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading the member roster.
///
/// Every variant is fatal to a sync run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The roster file did not exist at the expected path.
    #[error("roster not found at {path}")]
    NotFound { path: PathBuf },

    /// Underlying I/O failure reading the roster.
    #[error("I/O error reading roster at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error — includes file path and line context from serde_yaml.
    #[error("failed to parse roster at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A member record lacks a required field.
    #[error("member #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// Two member records share a username.
    #[error("duplicate member username '{username}'")]
    DuplicateUsername { username: String },
}
