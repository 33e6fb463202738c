//! Blocking HTTP seam.
//!
//! Everything in this crate talks to the network through [`HttpGet`], so the
//! orchestrator can be driven by [`UreqClient`] in production and by
//! `MemoryHttp` in tests.

use std::time::Duration;

use crate::error::TransportError;

pub const USER_AGENT: &str = "McPhersonGroup-PostSync/1.0";

/// A completed HTTP exchange. Non-2xx statuses are responses, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Minimal GET capability.
pub trait HttpGet {
    /// `Err` only when no response was received (transport failure, timeout).
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

// ---------------------------------------------------------------------------
// ureq
// ---------------------------------------------------------------------------

/// Production client: one ureq agent, shared timeout, optional bearer token.
pub struct UreqClient {
    agent: ureq::Agent,
    token: Option<String>,
}

impl UreqClient {
    pub fn new(timeout: Duration, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            token: token.filter(|t| !t.is_empty()),
        }
    }
}

impl HttpGet for UreqClient {
    fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let mut request = self.agent.get(url);
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        match request.call() {
            Ok(response) => {
                let status = response.status();
                let body = response.into_string().map_err(|source| TransportError::Body {
                    url: url.to_string(),
                    source,
                })?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, response)) => Ok(HttpResponse {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(TransportError::Unreachable {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory client
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryHttp;

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::{HttpGet, HttpResponse};
    use crate::error::TransportError;

    /// Serves canned responses keyed by exact URL and records every request.
    ///
    /// Unknown URLs answer 404. URLs under a prefix registered with
    /// [`MemoryHttp::unreachable`] fail with a transport error.
    #[derive(Debug, Default)]
    pub struct MemoryHttp {
        routes: HashMap<String, HttpResponse>,
        unreachable: Vec<String>,
        requests: RefCell<Vec<String>>,
    }

    impl MemoryHttp {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
            self.routes.insert(
                url.into(),
                HttpResponse {
                    status,
                    body: body.into(),
                },
            );
            self
        }

        pub fn ok(self, url: impl Into<String>, body: impl Into<String>) -> Self {
            self.respond(url, 200, body)
        }

        pub fn unreachable(mut self, prefix: impl Into<String>) -> Self {
            self.unreachable.push(prefix.into());
            self
        }

        /// Every URL requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }

        pub fn count_requests(&self, needle: &str) -> usize {
            self.requests
                .borrow()
                .iter()
                .filter(|url| url.contains(needle))
                .count()
        }
    }

    impl HttpGet for MemoryHttp {
        fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            self.requests.borrow_mut().push(url.to_string());
            if self.unreachable.iter().any(|p| url.starts_with(p.as_str())) {
                return Err(TransportError::Unreachable {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(self.routes.get(url).cloned().unwrap_or(HttpResponse {
                status: 404,
                body: "Not Found".to_string(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_http_defaults_to_404_and_records_requests() {
        let http = MemoryHttp::new()
            .ok("https://a.test/x", "hello")
            .unreachable("https://down.test");

        assert_eq!(http.get("https://a.test/x").unwrap().body, "hello");
        assert_eq!(http.get("https://a.test/y").unwrap().status, 404);
        assert!(http.get("https://down.test/z").unwrap_err().is_unreachable());
        assert_eq!(http.requests().len(), 3);
        assert_eq!(http.count_requests("a.test"), 2);
    }

    #[test]
    fn ureq_client_reports_unreachable_host() {
        // Nothing listens on the loopback discard port.
        let client = UreqClient::new(Duration::from_secs(2), None);
        let err = client.get("http://127.0.0.1:9/listing").unwrap_err();
        assert!(err.is_unreachable(), "got: {err}");
    }
}
