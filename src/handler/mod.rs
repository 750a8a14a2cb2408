//! Response handlers
//!
//! One handler per resource classification. Each receives a request with a
//! resolved path and a writable connection, and either writes one complete
//! framed response or returns a failure status for the error responder —
//! never a half-written connection with no terminal response.

pub mod browse;
pub mod cgi;
pub mod file;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::http::connection::Connection;
use crate::http::status::HttpStatus;

/// Chunk size for streaming file and subprocess output.
pub(crate) const CHUNK_SIZE: usize = 8192;

pub(crate) async fn write_head<S>(
    conn: &mut Connection<S>,
    status: HttpStatus,
    content_type: &str,
) -> std::io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let head = format!("HTTP/1.0 {status}\r\nContent-Type: {content_type}\r\n\r\n");
    conn.write_all(head.as_bytes()).await
}
