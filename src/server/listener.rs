use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::config::{Concurrency, Config};
use crate::http::connection::Connection;
use crate::http::engine::RequestEngine;
use crate::server::Server;

/// Binds the listener and runs the accept loop.
///
/// Bind failure is fatal and propagates to `main`; accept failures are
/// logged and the loop continues. Each accepted connection is processed
/// either on its own task or inline, per the configured discipline.
pub async fn run(cfg: Config) -> anyhow::Result<()> {
    let server = Arc::new(Server::new(cfg)?);

    let listener = TcpListener::bind(&server.config.listen_addr)
        .await
        .with_context(|| format!("unable to listen on {}", server.config.listen_addr))?;
    info!("Listening on {}", server.config.listen_addr);
    debug!(
        root = %server.sandbox.root().display(),
        mime_types = %server.config.mime_types_path.display(),
        default_mime_type = %server.config.default_mime_type,
        concurrency = ?server.config.concurrency,
        "server context ready"
    );

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };
        debug!("Accepted connection from {}", peer);

        match server.config.concurrency {
            Concurrency::Spawned => {
                let server = server.clone();
                tokio::spawn(async move {
                    serve(socket, peer, &server).await;
                });
            }
            Concurrency::Serial => serve(socket, peer, &server).await,
        }
    }
}

/// Processes one connection fully: exactly one request/response cycle,
/// then one close.
async fn serve(socket: TcpStream, peer: SocketAddr, server: &Server) {
    let mut conn = Connection::new(socket, peer.ip().to_string(), peer.port().to_string());

    RequestEngine::new(&mut conn, server).run().await;

    if let Err(e) = conn.shutdown().await {
        debug!("connection shutdown for {} failed: {}", peer, e);
    }
}
