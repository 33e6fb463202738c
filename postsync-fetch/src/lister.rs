//! Candidate discovery strategies.
//!
//! Both strategies answer the same question ("which post files does this
//! member publish?") behind [`PostLister`]; [`crate::Fetcher`] picks between
//! them.

use serde::Deserialize;

use postsync_core::{MemberRecord, SyncConfig};

use crate::error::TransportError;
use crate::http::HttpGet;

/// Files shorter than this named `index`/`readme` are directory stubs.
const INDEX_STUB_LEN: usize = 100;

/// One post file a member publishes, before its body is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub filename: String,
    /// URL serving the raw file content.
    pub raw_url: String,
    /// Human-facing URL recorded as `source_url` in the synced post.
    pub source_url: String,
    /// Content already downloaded during discovery, if any.
    pub prefetched: Option<String>,
}

/// "List candidate posts for a member."
pub trait PostLister {
    fn name(&self) -> &'static str;

    /// Candidates in a stable order, at most `limit` of them when given.
    fn list(
        &self,
        member: &MemberRecord,
        limit: Option<usize>,
    ) -> Result<Vec<Candidate>, TransportError>;
}

fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

fn join_path(dir: &str, file: &str) -> String {
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

pub(crate) fn raw_url(config: &SyncConfig, member: &MemberRecord, filename: &str) -> String {
    format!(
        "{}/{}/{}/{}/{}",
        trim_base(&config.raw_base),
        member.username,
        member.repo_name(),
        config.branch,
        join_path(member.posts_dir(), filename)
    )
}

pub(crate) fn html_url(config: &SyncConfig, member: &MemberRecord, filename: &str) -> String {
    format!(
        "{}/{}/{}/blob/{}/{}",
        trim_base(&config.html_base),
        member.username,
        member.repo_name(),
        config.branch,
        join_path(member.posts_dir(), filename)
    )
}

// ---------------------------------------------------------------------------
// Structured listing
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    download_url: Option<String>,
    html_url: Option<String>,
}

/// Primary strategy: the hosted repository's contents API.
pub struct ContentsApiLister<'a> {
    http: &'a dyn HttpGet,
    config: &'a SyncConfig,
}

impl<'a> ContentsApiLister<'a> {
    pub fn new(http: &'a dyn HttpGet, config: &'a SyncConfig) -> Self {
        Self { http, config }
    }

    pub fn listing_url(&self, member: &MemberRecord) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            trim_base(&self.config.api_base),
            member.username,
            member.repo_name(),
            member.posts_dir()
        )
    }
}

impl PostLister for ContentsApiLister<'_> {
    fn name(&self) -> &'static str {
        "contents-api"
    }

    fn list(
        &self,
        member: &MemberRecord,
        limit: Option<usize>,
    ) -> Result<Vec<Candidate>, TransportError> {
        let url = self.listing_url(member);
        tracing::debug!(member = %member.username, url = %url, "listing posts");

        let response = self.http.get(&url)?;
        if !response.is_ok() {
            return Err(TransportError::from_status(&url, response.status));
        }
        let entries: Vec<ContentsEntry> = serde_json::from_str(&response.body)
            .map_err(|source| TransportError::Listing { url: url.clone(), source })?;

        let mut candidates: Vec<Candidate> = entries
            .into_iter()
            .filter(|e| e.kind == "file" && e.name.ends_with(&self.config.post_extension))
            .map(|e| Candidate {
                raw_url: e
                    .download_url
                    .unwrap_or_else(|| raw_url(self.config, member, &e.name)),
                source_url: e
                    .html_url
                    .unwrap_or_else(|| html_url(self.config, member, &e.name)),
                filename: e.name,
                prefetched: None,
            })
            .collect();
        if let Some(limit) = limit {
            candidates.truncate(limit);
        }
        Ok(candidates)
    }
}

// ---------------------------------------------------------------------------
// Raw-URL probing
// ---------------------------------------------------------------------------

/// Fallback strategy: probe conventional filenames on the raw file host.
///
/// Best-effort. Missing files are skipped silently; the only error is every
/// probe failing at the transport level.
pub struct RawGuessLister<'a> {
    http: &'a dyn HttpGet,
    config: &'a SyncConfig,
}

impl<'a> RawGuessLister<'a> {
    pub fn new(http: &'a dyn HttpGet, config: &'a SyncConfig) -> Self {
        Self { http, config }
    }

    fn probe_names(&self) -> Vec<String> {
        let mut names = self.config.fallback_filenames.clone();
        names.sort();
        names.dedup();
        names
    }
}

fn is_index_stub(filename: &str, content: &str) -> bool {
    let stem = filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _)| stem)
        .to_ascii_lowercase();
    (stem == "index" || stem == "readme") && content.trim().len() < INDEX_STUB_LEN
}

impl PostLister for RawGuessLister<'_> {
    fn name(&self) -> &'static str {
        "raw-guess"
    }

    fn list(
        &self,
        member: &MemberRecord,
        limit: Option<usize>,
    ) -> Result<Vec<Candidate>, TransportError> {
        let mut found = Vec::new();
        let mut probes = 0usize;
        let mut failures = 0usize;
        let mut last_transport_error = None;

        for filename in self.probe_names() {
            if limit.is_some_and(|l| found.len() >= l) {
                break;
            }
            probes += 1;
            let url = raw_url(self.config, member, &filename);
            match self.http.get(&url) {
                Ok(response) if response.is_ok() => {
                    if is_index_stub(&filename, &response.body) {
                        tracing::debug!(file = %filename, "skipping directory index stub");
                        continue;
                    }
                    found.push(Candidate {
                        source_url: html_url(self.config, member, &filename),
                        raw_url: url,
                        filename,
                        prefetched: Some(response.body),
                    });
                }
                Ok(response) => {
                    tracing::debug!(url = %url, status = response.status, "no post at conventional path");
                }
                Err(err) => {
                    tracing::debug!(url = %url, error = %err, "raw probe failed");
                    failures += 1;
                    last_transport_error = Some(err);
                }
            }
        }

        match last_transport_error {
            Some(err) if failures == probes => Err(err),
            _ => Ok(found),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MemoryHttp;
    use postsync_core::Username;

    fn member() -> MemberRecord {
        MemberRecord {
            username: Username::from("alice"),
            name: "Alice".to_string(),
            role: String::new(),
            profile_url: "https://alice.github.io".to_string(),
            posts_path: "/research/posts".to_string(),
            active: true,
            repo: None,
        }
    }

    const LISTING: &str = r#"[
        {"name": "b-post.qmd", "type": "file", "download_url": "https://raw.test/b", "html_url": "https://html.test/b"},
        {"name": "notes.md", "type": "file", "download_url": "https://raw.test/n", "html_url": null},
        {"name": "drafts", "type": "dir", "download_url": null, "html_url": null},
        {"name": "a-post.qmd", "type": "file", "download_url": null, "html_url": null}
    ]"#;

    #[test]
    fn contents_listing_filters_and_keeps_order() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new().ok(
            "https://api.github.com/repos/alice/alice.github.io/contents/research/posts",
            LISTING,
        );
        let lister = ContentsApiLister::new(&http, &config);
        let candidates = lister.list(&member(), None).expect("list");

        let names: Vec<_> = candidates.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(names, vec!["b-post.qmd", "a-post.qmd"]);
        assert_eq!(candidates[0].raw_url, "https://raw.test/b");
        assert_eq!(
            candidates[1].raw_url,
            "https://raw.githubusercontent.com/alice/alice.github.io/main/research/posts/a-post.qmd"
        );
        assert_eq!(
            candidates[1].source_url,
            "https://github.com/alice/alice.github.io/blob/main/research/posts/a-post.qmd"
        );
        assert!(candidates.iter().all(|c| c.prefetched.is_none()));
    }

    #[test]
    fn contents_listing_truncates_before_fetching() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new().ok(
            "https://api.github.com/repos/alice/alice.github.io/contents/research/posts",
            LISTING,
        );
        let candidates = ContentsApiLister::new(&http, &config)
            .list(&member(), Some(1))
            .expect("list");
        assert_eq!(candidates.len(), 1);
        assert_eq!(http.requests().len(), 1, "listing only, no bodies");
    }

    #[test]
    fn contents_listing_maps_statuses() {
        let config = SyncConfig::default();
        let url = "https://api.github.com/repos/alice/alice.github.io/contents/research/posts";
        let http = MemoryHttp::new().respond(url, 403, "rate limit exceeded");
        let err = ContentsApiLister::new(&http, &config)
            .list(&member(), None)
            .unwrap_err();
        assert!(matches!(err, TransportError::RateLimited { status: 403, .. }));

        let http = MemoryHttp::new().ok(url, r#"{"message": "a file, not a dir"}"#);
        let err = ContentsApiLister::new(&http, &config)
            .list(&member(), None)
            .unwrap_err();
        assert!(matches!(err, TransportError::Listing { .. }));
    }

    #[test]
    fn raw_guess_probes_alphabetically_and_skips_stubs() {
        let config = SyncConfig {
            fallback_filenames: vec!["test-post.qmd".into(), "index.qmd".into(), "about.qmd".into()],
            ..SyncConfig::default()
        };
        let base = "https://raw.githubusercontent.com/alice/alice.github.io/main/research/posts";
        let http = MemoryHttp::new()
            .ok(format!("{base}/index.qmd"), "# posts")
            .ok(format!("{base}/test-post.qmd"), "---\ntitle: T\n---\nbody");

        let candidates = RawGuessLister::new(&http, &config)
            .list(&member(), None)
            .expect("list");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].filename, "test-post.qmd");
        assert!(candidates[0].prefetched.is_some());

        let probed: Vec<_> = http
            .requests()
            .iter()
            .map(|u| u.rsplit('/').next().unwrap_or_default().to_string())
            .collect();
        assert_eq!(probed, vec!["about.qmd", "index.qmd", "test-post.qmd"]);
    }

    #[test]
    fn raw_guess_stops_at_limit() {
        let config = SyncConfig {
            fallback_filenames: vec!["a.qmd".into(), "b.qmd".into(), "c.qmd".into()],
            ..SyncConfig::default()
        };
        let base = "https://raw.githubusercontent.com/alice/alice.github.io/main/research/posts";
        let http = MemoryHttp::new()
            .ok(format!("{base}/a.qmd"), "a")
            .ok(format!("{base}/b.qmd"), "b")
            .ok(format!("{base}/c.qmd"), "c");
        let candidates = RawGuessLister::new(&http, &config)
            .list(&member(), Some(2))
            .expect("list");
        assert_eq!(candidates.len(), 2);
        assert_eq!(http.requests().len(), 2);
    }

    #[test]
    fn raw_guess_empty_is_not_an_error() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new();
        let candidates = RawGuessLister::new(&http, &config)
            .list(&member(), None)
            .expect("list");
        assert!(candidates.is_empty());
    }

    #[test]
    fn raw_guess_all_unreachable_is_an_error() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new().unreachable("https://raw.githubusercontent.com");
        let err = RawGuessLister::new(&http, &config)
            .list(&member(), None)
            .unwrap_err();
        assert!(err.is_unreachable());
    }
}
