use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::handler;
use crate::http::connection::Connection;
use crate::http::parser::parse_request;
use crate::http::request::Request;
use crate::http::status::HttpStatus;
use crate::resource::classify::{Resource, classify};
use crate::server::Server;

/// Per-request pipeline state. `Errored` is reachable from every step and
/// always renders one terminal error response before completing.
enum Step {
    Accepted,
    Parsed(Request),
    Resolved(Request),
    Classified(Request, PathBuf, Resource),
    Errored(HttpStatus),
    Completed(HttpStatus),
}

/// Drives one request/response cycle over one connection.
///
/// ```text
/// Accepted ──parse──► Parsed ──resolve──► Resolved ──classify──► Classified
///     │                  │                   │                       │ dispatch
///     │ parse error      │ sandbox error     │ Bad resource          ▼
///     └──────────────────┴───────────────────┴───────────────► Errored(status)
///                                                                    │ error response
///                        handler ok ◄── Classified                   ▼
///                              └──────────────────────────────► Completed
/// ```
pub struct RequestEngine<'a, S> {
    conn: &'a mut Connection<S>,
    server: &'a Server,
}

impl<'a, S: AsyncRead + AsyncWrite + Unpin> RequestEngine<'a, S> {
    pub fn new(conn: &'a mut Connection<S>, server: &'a Server) -> Self {
        Self { conn, server }
    }

    /// Runs the request to completion. Every terminal path has written
    /// exactly one complete response and returns its final status.
    pub async fn run(self) -> HttpStatus {
        let mut method: Option<String> = None;
        let mut step = Step::Accepted;

        loop {
            step = match step {
                Step::Accepted => match parse_request(self.conn).await {
                    Ok(req) => {
                        debug!(method = %req.method, uri = %req.uri, query = req.query.as_deref(), "parsed request");
                        method = Some(req.method.clone());
                        Step::Parsed(req)
                    }
                    Err(e) => {
                        debug!("parse failed: {e}");
                        Step::Errored(HttpStatus::BadRequest)
                    }
                },

                Step::Parsed(mut req) => match self.server.sandbox.resolve(&req.uri).await {
                    Ok(path) => {
                        debug!(path = %path.display(), "resolved request path");
                        req.resolved_path = Some(path);
                        Step::Resolved(req)
                    }
                    // Both sandbox failures collapse to 404 so the client
                    // cannot distinguish missing from forbidden.
                    Err(e) => {
                        debug!("path resolution failed: {e}");
                        Step::Errored(HttpStatus::NotFound)
                    }
                },

                Step::Resolved(req) => match req.resolved_path.clone() {
                    Some(path) => {
                        let resource = classify(&path).await;
                        debug!(resource = ?resource, "classified request");
                        match resource {
                            Resource::Bad => Step::Errored(HttpStatus::NotFound),
                            resource => Step::Classified(req, path, resource),
                        }
                    }
                    None => Step::Errored(HttpStatus::NotFound),
                },

                Step::Classified(req, path, resource) => {
                    let result = match resource {
                        Resource::Browse => handler::browse::handle(&req, &path, self.conn).await,
                        Resource::File => {
                            handler::file::handle(&path, self.conn, &self.server.mime).await
                        }
                        Resource::Cgi => {
                            handler::cgi::handle(&req, &path, self.conn, self.server).await
                        }
                        Resource::Bad => Err(HttpStatus::NotFound),
                    };
                    match result {
                        Ok(()) => Step::Completed(HttpStatus::Ok),
                        Err(status) => Step::Errored(status),
                    }
                }

                Step::Errored(status) => {
                    respond_error(self.conn, status).await;
                    Step::Completed(status)
                }

                Step::Completed(status) => {
                    info!(
                        method = method.as_deref().unwrap_or("-"),
                        status = status.as_u16(),
                        "request complete"
                    );
                    return status;
                }
            };
        }
    }
}

/// Writes a minimal HTML error response for the given status.
///
/// Never fails the connection further: if the write itself fails the
/// failure is logged and swallowed, and the caller tears the connection
/// down.
pub async fn respond_error<S>(conn: &mut Connection<S>, status: HttpStatus)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let head = format!("HTTP/1.0 {status}\r\nContent-Type: text/html\r\n\r\n");
    let body = format!("<html>\r\n<body>\r\n<h1>{status}</h1>\r\n</body>\r\n</html>\r\n");

    let write = async {
        conn.write_all(head.as_bytes()).await?;
        conn.write_all(body.as_bytes()).await?;
        conn.flush().await
    };
    if let Err(e) = write.await {
        debug!("error response write failed: {e}");
    }
}
