use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

/// Upper bound on one request or header line. A line still unterminated
/// past this many bytes fails the read instead of growing the buffer
/// without limit.
pub const MAX_LINE_LEN: usize = 8192;

#[derive(Debug, Error)]
pub enum LineError {
    #[error("line exceeds {MAX_LINE_LEN} bytes")]
    TooLong,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One accepted client connection: a bidirectional byte stream with
/// line-oriented reads and buffered writes.
///
/// Generic over the stream so tests can substitute an in-memory duplex
/// pipe for a `TcpStream`.
pub struct Connection<S = TcpStream> {
    stream: S,
    buffer: BytesMut,
    peer_host: String,
    peer_port: String,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, peer_host: impl Into<String>, peer_port: impl Into<String>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            peer_host: peer_host.into(),
            peer_port: peer_port.into(),
        }
    }

    pub fn peer_host(&self) -> &str {
        &self.peer_host
    }

    pub fn peer_port(&self) -> &str {
        &self.peer_port
    }

    /// Reads one line, without its terminator. Returns `None` at end of
    /// stream. A final line with no terminator is still returned.
    pub async fn read_line(&mut self) -> Result<Option<String>, LineError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let line = self.buffer.split_to(pos + 1);
                return Ok(Some(decode_line(&line)));
            }

            if self.buffer.len() >= MAX_LINE_LEN {
                return Err(LineError::TooLong);
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let line = self.buffer.split_to(self.buffer.len());
                return Ok(Some(decode_line(&line)));
            }
        }
    }

    pub async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(buf).await
    }

    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush().await
    }

    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.stream.shutdown().await
    }
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}
