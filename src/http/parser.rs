use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::http::connection::{Connection, LineError};
use crate::http::request::Request;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request")]
    Malformed,
    #[error("request line exceeds maximum length")]
    LineTooLong,
}

/// Parses one HTTP request off the connection.
///
/// Requests come in the form
///
/// ```text
/// <METHOD> <URI>[?QUERY] HTTP/<VERSION>
/// <NAME>: <VALUE>
/// ...
/// <blank line>
/// ```
///
/// The request line must carry a method and a target; header lines without
/// a `:` are skipped; a stream that closes before the request line is a
/// malformed request, not a crash.
pub async fn parse_request<S>(conn: &mut Connection<S>) -> Result<Request, ParseError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let line = read_parse_line(conn).await?.ok_or(ParseError::Malformed)?;

    let mut parts = line.split_whitespace();
    let method = parts.next().ok_or(ParseError::Malformed)?;
    let target = parts.next().ok_or(ParseError::Malformed)?;

    let (uri, query) = match target.split_once('?') {
        Some((uri, query)) => (uri.to_string(), Some(query.to_string())),
        None => (target.to_string(), None),
    };

    let mut headers = Vec::new();
    while let Some(line) = read_parse_line(conn).await? {
        if line.trim().is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(Request {
        method: method.to_string(),
        uri,
        query,
        headers,
        resolved_path: None,
        client_host: conn.peer_host().to_string(),
        client_port: conn.peer_port().to_string(),
    })
}

async fn read_parse_line<S>(conn: &mut Connection<S>) -> Result<Option<String>, ParseError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match conn.read_line().await {
        Ok(line) => Ok(line),
        Err(LineError::TooLong) => Err(ParseError::LineTooLong),
        Err(LineError::Io(_)) => Err(ParseError::Malformed),
    }
}
