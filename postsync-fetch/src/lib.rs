//! # postsync-fetch
//!
//! Lists and retrieves candidate post files from a member's hosted site.
//!
//! [`Fetcher::posts`] tries the structured directory listing
//! ([`ContentsApiLister`]) and falls back to probing conventional raw URLs
//! ([`RawGuessLister`]). Bodies are fetched lazily by the returned
//! [`PostStream`].

pub mod error;
pub mod fetcher;
pub mod http;
pub mod lister;

pub use error::{PostFetchError, TransportError};
pub use fetcher::{Fetcher, PostStream, RemotePost};
pub use http::{HttpGet, HttpResponse, UreqClient};
pub use lister::{Candidate, ContentsApiLister, PostLister, RawGuessLister};

#[cfg(any(test, feature = "test-support"))]
pub use http::MemoryHttp;
