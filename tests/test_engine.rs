use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use weaver::config::{Concurrency, Config};
use weaver::http::connection::Connection;
use weaver::http::engine::RequestEngine;
use weaver::http::status::HttpStatus;
use weaver::server::Server;

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

fn scratch_root() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "weaver-engine-{}-{}",
        std::process::id(),
        NEXT_DIR.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn test_server(root: &Path) -> Server {
    let config = Config {
        listen_addr: "127.0.0.1:9898".to_string(),
        root: root.to_path_buf(),
        mime_types_path: root.join("mime.types"),
        default_mime_type: "text/plain".to_string(),
        concurrency: Concurrency::Serial,
    };
    Server::new(config).unwrap()
}

/// Runs one request through the engine over an in-memory stream and
/// returns the final status plus everything written to the client.
async fn roundtrip(server: &Server, request: &[u8]) -> (HttpStatus, String) {
    let (mut client, io) = tokio::io::duplex(1 << 20);
    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();

    let mut conn = Connection::new(io, "127.0.0.1", "49152");
    let status = RequestEngine::new(&mut conn, server).run().await;
    drop(conn);

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    (status, String::from_utf8_lossy(&out).into_owned())
}

fn response_count(body: &str) -> usize {
    body.matches("HTTP/1.0 ").count()
}

#[tokio::test]
async fn test_engine_browses_empty_root() {
    let root = scratch_root();
    let server = test_server(&root);

    let (status, out) = roundtrip(&server, b"GET / HTTP/1.0\r\n\r\n").await;

    assert_eq!(status, HttpStatus::Ok);
    assert!(out.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(out.contains("<ul>"));
    // Nothing listed besides the parent link.
    assert_eq!(out.matches("<li>").count(), 1);
    assert!(out.contains(">..<"));
    assert_eq!(response_count(&out), 1);
}

#[tokio::test]
async fn test_engine_serves_file_bytes() {
    let root = scratch_root();
    std::fs::write(root.join("hello.txt"), "hello, weaver\n").unwrap();
    let server = test_server(&root);

    let (status, out) = roundtrip(&server, b"GET /hello.txt HTTP/1.0\r\n\r\n").await;

    assert_eq!(status, HttpStatus::Ok);
    assert!(out.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(out.contains("Content-Type: text/plain"));
    assert!(out.ends_with("hello, weaver\n"));
}

#[tokio::test]
async fn test_engine_traversal_is_not_found() {
    let root = scratch_root();
    std::fs::write(root.parent().unwrap().join("weaver-outside.txt"), "secret").unwrap();
    let server = test_server(&root);

    let (status, out) = roundtrip(&server, b"GET /../weaver-outside.txt HTTP/1.0\r\n\r\n").await;

    assert_eq!(status, HttpStatus::NotFound);
    assert!(out.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert!(!out.contains("secret"));
    // The sandbox refusal must not leak filesystem details.
    assert!(!out.contains("weaver-outside"));
    assert_eq!(response_count(&out), 1);
}

#[tokio::test]
async fn test_engine_missing_file_is_not_found() {
    let root = scratch_root();
    let server = test_server(&root);

    let (status, out) = roundtrip(&server, b"GET /missing.html HTTP/1.0\r\n\r\n").await;

    assert_eq!(status, HttpStatus::NotFound);
    assert!(out.contains("404 Not Found"));
}

#[tokio::test]
async fn test_engine_unreadable_file_is_not_found() {
    let root = scratch_root();
    let path = root.join("locked.txt");
    std::fs::write(&path, "locked").unwrap();
    std::fs::set_permissions(&path, Permissions::from_mode(0o000)).unwrap();
    let server = test_server(&root);

    let (status, _out) = roundtrip(&server, b"GET /locked.txt HTTP/1.0\r\n\r\n").await;

    assert_eq!(status, HttpStatus::NotFound);
}

#[tokio::test]
async fn test_engine_malformed_request_is_bad_request() {
    let root = scratch_root();
    let server = test_server(&root);

    let (status, out) = roundtrip(&server, b"GET\r\n\r\n").await;

    assert_eq!(status, HttpStatus::BadRequest);
    assert!(out.starts_with("HTTP/1.0 400 Bad Request\r\n"));
    assert!(out.contains("Content-Type: text/html"));
    assert_eq!(response_count(&out), 1);
}

#[tokio::test]
async fn test_engine_closed_stream_is_bad_request() {
    let root = scratch_root();
    let server = test_server(&root);

    let (status, out) = roundtrip(&server, b"").await;

    assert_eq!(status, HttpStatus::BadRequest);
    assert!(out.contains("400 Bad Request"));
}

#[tokio::test]
async fn test_engine_runs_cgi_end_to_end() {
    let root = scratch_root();
    let script = root.join("hello.cgi");
    std::fs::write(
        &script,
        "#!/bin/sh\n\
         printf 'HTTP/1.0 200 OK\\r\\nContent-Type: text/plain\\r\\n\\r\\n'\n\
         printf 'root=%s\\n' \"$DOCUMENT_ROOT\"\n\
         printf 'remote=%s:%s\\n' \"$REMOTE_ADDRESS\" \"$REMOTE_PORT\"\n\
         printf 'script=%s\\n' \"$SCRIPT_FILENAME\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, Permissions::from_mode(0o755)).unwrap();
    let server = test_server(&root);

    let (status, out) = roundtrip(&server, b"GET /hello.cgi?a=b HTTP/1.0\r\n\r\n").await;

    assert_eq!(status, HttpStatus::Ok);
    assert!(out.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(out.contains(&format!("root={}", server.sandbox.root().display())));
    assert!(out.contains("remote=127.0.0.1:49152"));
    assert!(out.contains("script="));
}

#[tokio::test]
async fn test_engine_directory_listing_links_entries() {
    let root = scratch_root();
    std::fs::create_dir(root.join("docs")).unwrap();
    std::fs::write(root.join("docs/readme.txt"), "docs").unwrap();
    let server = test_server(&root);

    let (status, out) = roundtrip(&server, b"GET /docs HTTP/1.0\r\n\r\n").await;

    assert_eq!(status, HttpStatus::Ok);
    assert!(out.contains("href=\"/docs/readme.txt\""));
}
