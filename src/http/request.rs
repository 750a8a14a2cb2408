use std::path::{Path, PathBuf};

/// A parsed HTTP request, one per accepted connection.
///
/// Populated incrementally: the parser fills the protocol fields, the path
/// sandbox fills `resolved_path`, and the handlers consume it read-only.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method token, e.g. "GET".
    pub method: String,
    /// Request-target as sent, before the query split and path resolution.
    pub uri: String,
    /// Portion of the request-target after the first `?`, undecoded.
    pub query: Option<String>,
    /// Header name/value pairs in arrival order.
    pub headers: Vec<(String, String)>,
    /// Canonical filesystem path once sandbox resolution succeeds.
    pub resolved_path: Option<PathBuf>,
    /// Peer address captured at accept time.
    pub client_host: String,
    pub client_port: String,
}

impl Request {
    /// Value of the first header with the given name, or `None`. Duplicate
    /// headers keep first-wins semantics; names compare exactly.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn resolved_path(&self) -> Option<&Path> {
        self.resolved_path.as_deref()
    }
}
