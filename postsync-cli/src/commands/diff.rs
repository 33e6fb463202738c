//! `postsync diff` — show unified diffs for what sync would write.

use anyhow::{Context, Result};
use clap::Args;

use postsync_sync::{pipeline, SyncOptions};

use crate::commands::{http_client, load_roster, sync::print_summary};
use crate::GlobalArgs;

/// Arguments for `postsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Diff only this member's posts.
    #[arg(long, value_name = "USERNAME")]
    pub member: Option<String>,
}

impl DiffArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let roster = load_roster(global)?;
        let http = http_client(&roster);
        let options = SyncOptions {
            member: self.member,
            dry_run: true,
            collect_diffs: true,
            ..SyncOptions::default()
        };

        let summary =
            pipeline::run(&roster, &global.posts_dir, &options, &http).context("diff failed")?;

        let mut printed = 0;
        for outcome in summary.members.iter().flat_map(|m| m.outcomes.iter()) {
            if let Some(diff) = &outcome.diff {
                print!("{diff}");
                if !diff.ends_with('\n') {
                    println!();
                }
                printed += 1;
            }
        }
        if printed == 0 {
            println!("No differences.");
        }
        if summary.errors > 0 || global.verbose {
            print_summary(&summary, global.verbose);
        }
        Ok(())
    }
}
