//! `postsync members` — show the full roster.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use postsync_core::Roster;

use crate::commands::load_roster;
use crate::GlobalArgs;

/// Arguments for `postsync members`.
#[derive(Args, Debug)]
pub struct MembersArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "username")]
    username: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "role")]
    role: String,
    #[tabled(rename = "posts")]
    posts: String,
    #[tabled(rename = "active")]
    active: &'static str,
}

#[derive(Serialize)]
struct MembersJson<'a> {
    active: usize,
    #[serde(flatten)]
    roster: &'a Roster,
}

impl MembersArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let roster = load_roster(global)?;

        if self.json {
            let payload = MembersJson {
                active: roster.active_count(),
                roster: &roster,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize roster JSON")?
            );
            return Ok(());
        }

        println!(
            "{} members ({} active) in {}",
            roster.members.len(),
            roster.active_count(),
            global.config.display()
        );
        if roster.members.is_empty() {
            return Ok(());
        }

        let rows: Vec<MemberRow> = roster
            .members
            .iter()
            .map(|m| MemberRow {
                username: m.username.to_string(),
                name: m.name.clone(),
                role: m.role.clone(),
                posts: format!("{}/{}", m.repo_name(), m.posts_dir()),
                active: if m.active { "yes" } else { "no" },
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
