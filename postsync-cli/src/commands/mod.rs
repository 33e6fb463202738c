pub mod diff;
pub mod members;
pub mod sync;

use std::time::Duration;

use anyhow::{Context, Result};

use postsync_core::{roster, Roster};
use postsync_fetch::UreqClient;

use crate::GlobalArgs;

/// Environment variable holding an optional API token for the post host.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

pub(crate) fn load_roster(global: &GlobalArgs) -> Result<Roster> {
    roster::load_at(&global.config)
        .with_context(|| format!("failed to load roster from {}", global.config.display()))
}

pub(crate) fn http_client(roster: &Roster) -> UreqClient {
    UreqClient::new(
        Duration::from_secs(roster.sync_config.timeout_secs),
        std::env::var(TOKEN_ENV).ok(),
    )
}
