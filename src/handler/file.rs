use std::path::Path;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::debug;

use crate::handler::{CHUNK_SIZE, write_head};
use crate::http::connection::Connection;
use crate::http::status::HttpStatus;
use crate::resource::mime::MimeTable;

/// Streams the resolved file to the connection in fixed-size chunks.
///
/// The Content-Type comes from the MIME table with its configured
/// fallback. Open and stream failures are internal server errors; the
/// file handle is released on every path.
pub async fn handle<S>(
    path: &Path,
    conn: &mut Connection<S>,
    mime: &MimeTable,
) -> Result<(), HttpStatus>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut file = tokio::fs::File::open(path).await.map_err(|e| {
        debug!("unable to open {}: {}", path.display(), e);
        HttpStatus::InternalServerError
    })?;

    let mimetype = mime.lookup(path);
    debug!(mimetype, "serving file");

    let stream = async {
        write_head(conn, HttpStatus::Ok, mimetype).await?;

        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = file.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            conn.write_all(&buf[..n]).await?;
        }
        conn.flush().await
    };
    stream.await.map_err(|e| {
        debug!("file stream failed: {e}");
        HttpStatus::InternalServerError
    })
}
