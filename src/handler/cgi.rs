use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::process::Command;
use tracing::debug;

use crate::handler::CHUNK_SIZE;
use crate::http::connection::Connection;
use crate::http::request::Request;
use crate::http::status::HttpStatus;
use crate::server::Server;

/// Request headers forwarded to the child, mapped to their CGI
/// environment-variable names.
const FORWARDED_HEADERS: [(&str, &str); 6] = [
    ("Host", "HTTP_HOST"),
    ("Accept", "HTTP_ACCEPT"),
    ("Accept-Language", "HTTP_ACCEPT_LANGUAGE"),
    ("Accept-Encoding", "HTTP_ACCEPT_ENCODING"),
    ("Connection", "HTTP_CONNECTION"),
    ("User-Agent", "HTTP_USER_AGENT"),
];

/// Runs the resolved path as a CGI script and copies its output to the
/// connection verbatim; the script owns its own response framing.
///
/// The path is spawned directly, never through a shell. The child is
/// always reaped before this returns, whether the copy succeeded or not.
pub async fn handle<S>(
    req: &Request,
    path: &Path,
    conn: &mut Connection<S>,
    server: &Server,
) -> Result<(), HttpStatus>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut cmd = Command::new(path);
    cmd.env("QUERY_STRING", req.query.as_deref().unwrap_or(""))
        .env("DOCUMENT_ROOT", server.sandbox.root())
        .env("REQUEST_URI", &req.uri)
        .env("REMOTE_PORT", &req.client_port)
        .env("REQUEST_METHOD", &req.method)
        .env("REMOTE_ADDRESS", &req.client_host)
        .env("SCRIPT_FILENAME", path)
        .env("SERVER_PORT", server.config.server_port());

    for (header, var) in FORWARDED_HEADERS {
        if let Some(value) = req.header(header) {
            cmd.env(var, value);
        }
    }

    cmd.stdin(Stdio::null()).stdout(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| {
        debug!("unable to spawn {}: {}", path.display(), e);
        HttpStatus::BadRequest
    })?;

    let Some(mut stdout) = child.stdout.take() else {
        let _ = child.wait().await;
        return Err(HttpStatus::InternalServerError);
    };

    let mut copied = Ok(());
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if let Err(e) = conn.write_all(&buf[..n]).await {
                    debug!("cgi copy failed: {e}");
                    copied = Err(HttpStatus::InternalServerError);
                    break;
                }
            }
            Err(e) => {
                debug!("cgi read failed: {e}");
                copied = Err(HttpStatus::InternalServerError);
                break;
            }
        }
    }

    // Closing our end of the pipe unblocks a child still writing, then the
    // wait reaps it on success and failure alike.
    drop(stdout);
    if let Err(e) = child.wait().await {
        debug!("cgi reap failed: {e}");
    }

    copied?;
    conn.flush()
        .await
        .map_err(|_| HttpStatus::InternalServerError)
}
