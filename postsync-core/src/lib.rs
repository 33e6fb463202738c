//! postsync core library — roster types, roster loading, errors.
//!
//! - [`types`] — member records, sync settings, the loaded [`Roster`]
//! - [`error`] — [`ConfigError`]
//! - [`roster`] — load / select

pub mod error;
pub mod roster;
pub mod types;

pub use error::ConfigError;
pub use types::{MemberRecord, Roster, SyncConfig, Username};
