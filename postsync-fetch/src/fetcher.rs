//! Per-member post retrieval: primary listing, fallback, lazy bodies.

use std::vec::IntoIter;

use postsync_core::{MemberRecord, SyncConfig};

use crate::error::{PostFetchError, TransportError};
use crate::http::HttpGet;
use crate::lister::{Candidate, ContentsApiLister, PostLister, RawGuessLister};

/// One fetched post file. Lives for a single fetch-transform cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePost {
    pub filename: String,
    pub raw_content: String,
    pub source_url: String,
}

/// Lists candidates with a primary strategy and falls back on failure.
pub struct Fetcher<'a> {
    http: &'a dyn HttpGet,
    primary: Box<dyn PostLister + 'a>,
    fallback: Box<dyn PostLister + 'a>,
}

impl<'a> Fetcher<'a> {
    /// Contents-API listing with raw-URL probing as the fallback.
    pub fn new(http: &'a dyn HttpGet, config: &'a SyncConfig) -> Self {
        Self::with_listers(
            http,
            Box::new(ContentsApiLister::new(http, config)),
            Box::new(RawGuessLister::new(http, config)),
        )
    }

    pub fn with_listers(
        http: &'a dyn HttpGet,
        primary: Box<dyn PostLister + 'a>,
        fallback: Box<dyn PostLister + 'a>,
    ) -> Self {
        Self {
            http,
            primary,
            fallback,
        }
    }

    /// Discover candidates, truncated to `limit`.
    ///
    /// `Err` means the listing host could not be reached and the fallback
    /// found nothing to make up for it. Any other listing failure degrades
    /// to the fallback, which may legitimately find nothing.
    pub fn list_candidates(
        &self,
        member: &MemberRecord,
        limit: Option<usize>,
    ) -> Result<Vec<Candidate>, TransportError> {
        let mut candidates = match self.primary.list(member, limit) {
            Ok(candidates) => candidates,
            Err(primary_err) => {
                tracing::info!(
                    member = %member.username,
                    error = %primary_err,
                    strategy = self.fallback.name(),
                    "listing failed, falling back"
                );
                match self.fallback.list(member, limit) {
                    Ok(candidates) if candidates.is_empty() && primary_err.is_unreachable() => {
                        tracing::debug!(member = %member.username, "fallback found nothing");
                        return Err(primary_err);
                    }
                    Ok(candidates) => candidates,
                    Err(fallback_err) if primary_err.is_unreachable() => {
                        tracing::debug!(error = %fallback_err, "fallback unreachable too");
                        return Err(primary_err);
                    }
                    Err(fallback_err) => {
                        tracing::warn!(
                            member = %member.username,
                            error = %fallback_err,
                            "fallback discovery failed"
                        );
                        Vec::new()
                    }
                }
            }
        };

        if let Some(limit) = limit {
            candidates.truncate(limit);
        }
        tracing::debug!(member = %member.username, count = candidates.len(), "candidates found");
        Ok(candidates)
    }

    /// Lazy sequence of the member's posts. Each call performs fresh requests.
    pub fn posts(
        &self,
        member: &MemberRecord,
        limit: Option<usize>,
    ) -> Result<PostStream<'a>, TransportError> {
        let candidates = self.list_candidates(member, limit)?;
        Ok(PostStream {
            http: self.http,
            candidates: candidates.into_iter(),
        })
    }
}

/// Finite, non-restartable iterator fetching one post body per `next()`.
///
/// A failed body fetch yields `Err` for that file only; iteration continues.
pub struct PostStream<'a> {
    http: &'a dyn HttpGet,
    candidates: IntoIter<Candidate>,
}

impl PostStream<'_> {
    pub fn remaining(&self) -> usize {
        self.candidates.len()
    }

    fn fetch(&self, candidate: Candidate) -> Result<RemotePost, PostFetchError> {
        let raw_content = match candidate.prefetched {
            Some(content) => content,
            None => self
                .fetch_body(&candidate.raw_url)
                .map_err(|source| PostFetchError {
                    filename: candidate.filename.clone(),
                    source,
                })?,
        };
        Ok(RemotePost {
            filename: candidate.filename,
            raw_content,
            source_url: candidate.source_url,
        })
    }

    fn fetch_body(&self, url: &str) -> Result<String, TransportError> {
        let response = self.http.get(url)?;
        if !response.is_ok() {
            return Err(TransportError::from_status(url, response.status));
        }
        Ok(response.body)
    }
}

impl Iterator for PostStream<'_> {
    type Item = Result<RemotePost, PostFetchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let candidate = self.candidates.next()?;
        Some(self.fetch(candidate))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.candidates.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MemoryHttp;
    use postsync_core::Username;

    const API: &str = "https://api.github.com/repos/alice/alice.github.io/contents/posts";
    const RAW: &str = "https://raw.githubusercontent.com/alice/alice.github.io/main/posts";

    fn member() -> MemberRecord {
        MemberRecord {
            username: Username::from("alice"),
            name: "Alice".to_string(),
            role: String::new(),
            profile_url: "https://alice.github.io".to_string(),
            posts_path: "posts".to_string(),
            active: true,
            repo: None,
        }
    }

    fn listing(names: &[&str]) -> String {
        let entries: Vec<String> = names
            .iter()
            .map(|n| {
                format!(
                    r#"{{"name":"{n}","type":"file","download_url":"{RAW}/{n}","html_url":null}}"#
                )
            })
            .collect();
        format!("[{}]", entries.join(","))
    }

    #[test]
    fn bodies_are_fetched_lazily() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new()
            .ok(API, listing(&["one.qmd", "two.qmd"]))
            .ok(format!("{RAW}/one.qmd"), "1")
            .ok(format!("{RAW}/two.qmd"), "2");
        let fetcher = Fetcher::new(&http, &config);

        let mut stream = fetcher.posts(&member(), None).expect("posts");
        assert_eq!(http.requests().len(), 1, "only the listing so far");
        assert_eq!(stream.remaining(), 2);

        let first = stream.next().expect("item").expect("ok");
        assert_eq!(first.raw_content, "1");
        assert_eq!(http.requests().len(), 2);
        assert_eq!(stream.count(), 1);
    }

    #[test]
    fn per_file_failure_does_not_stop_the_stream() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new()
            .ok(API, listing(&["gone.qmd", "ok.qmd"]))
            .ok(format!("{RAW}/ok.qmd"), "fine");
        let fetcher = Fetcher::new(&http, &config);

        let results: Vec<_> = fetcher.posts(&member(), None).expect("posts").collect();
        match &results[0] {
            Err(err) => {
                assert_eq!(err.filename, "gone.qmd");
                assert!(matches!(err.source, TransportError::NotFound { .. }));
            }
            Ok(post) => panic!("expected failure, got {post:?}"),
        }
        assert_eq!(results[1].as_ref().expect("ok").raw_content, "fine");
    }

    #[test]
    fn limit_applies_before_body_fetch() {
        let config = SyncConfig::default();
        let names = ["a.qmd", "b.qmd", "c.qmd", "d.qmd", "e.qmd"];
        let mut http = MemoryHttp::new().ok(API, listing(&names));
        for n in names {
            http = http.ok(format!("{RAW}/{n}"), n);
        }
        let fetcher = Fetcher::new(&http, &config);
        let posts: Vec<_> = fetcher.posts(&member(), Some(2)).expect("posts").collect();
        assert_eq!(posts.len(), 2);
        assert_eq!(http.count_requests(RAW), 2);
    }

    #[test]
    fn rate_limited_listing_falls_back_to_raw_probe() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new()
            .respond(API, 403, "API rate limit exceeded")
            .ok(format!("{RAW}/test-post.qmd"), "---\ntitle: T\n---\nbody");
        let fetcher = Fetcher::new(&http, &config);
        let posts: Vec<_> = fetcher
            .posts(&member(), None)
            .expect("posts")
            .collect::<Result<_, _>>()
            .expect("all ok");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].filename, "test-post.qmd");
        assert_eq!(
            posts[0].source_url,
            "https://github.com/alice/alice.github.io/blob/main/posts/test-post.qmd"
        );
        assert_eq!(http.count_requests("test-post.qmd"), 1, "prefetched body reused");
    }

    #[test]
    fn not_found_listing_with_empty_fallback_is_empty() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new();
        let fetcher = Fetcher::new(&http, &config);
        let stream = fetcher.posts(&member(), None).expect("posts");
        assert_eq!(stream.remaining(), 0);
    }

    #[test]
    fn unreachable_host_is_one_member_error() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new()
            .unreachable("https://api.github.com")
            .unreachable("https://raw.githubusercontent.com");
        let fetcher = Fetcher::new(&http, &config);
        let err = fetcher.posts(&member(), None).err().expect("member error");
        assert!(err.is_unreachable());
    }

    #[test]
    fn unreachable_listing_with_missing_fallback_files_is_member_error() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new().unreachable("https://api.github.com");
        let fetcher = Fetcher::new(&http, &config);
        let err = fetcher.posts(&member(), None).err().expect("member error");
        assert!(err.is_unreachable());
        assert_eq!(http.count_requests(RAW), 2, "both fallback names probed");
    }

    #[test]
    fn unreachable_listing_without_fallback_names_is_member_error() {
        let config = SyncConfig {
            fallback_filenames: Vec::new(),
            ..SyncConfig::default()
        };
        let http = MemoryHttp::new()
            .unreachable("https://api.github.com")
            .unreachable("https://raw.githubusercontent.com");
        let fetcher = Fetcher::new(&http, &config);
        let err = fetcher.posts(&member(), None).err().expect("member error");
        assert!(err.is_unreachable());
        assert_eq!(http.requests().len(), 1);
    }

    #[test]
    fn unreachable_listing_recovers_through_fallback() {
        let config = SyncConfig::default();
        let http = MemoryHttp::new()
            .unreachable("https://api.github.com")
            .ok(format!("{RAW}/test-post.qmd"), "---\ntitle: T\n---\nbody");
        let fetcher = Fetcher::new(&http, &config);
        assert_eq!(fetcher.posts(&member(), None).expect("posts").remaining(), 1);
    }
}
