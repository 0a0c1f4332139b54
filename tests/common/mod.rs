//! Shared utilities for integration testing.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};

use tracecontext::config::ServerConfig;
use tracecontext::lifecycle::Shutdown;
use tracecontext::HttpServer;

/// A request observed by a capture backend.
#[derive(Debug)]
#[allow(dead_code)]
pub struct Captured {
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Start a backend that records every request to `/` and replies 200.
pub async fn start_capture_backend() -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route("/", post(capture))
        .with_state(tx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, rx)
}

async fn capture(
    State(tx): State<mpsc::UnboundedSender<Captured>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let _ = tx.send(Captured { headers, body });
    StatusCode::OK
}

/// Start the forwarding server on an ephemeral port.
pub async fn start_server(config: ServerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx: broadcast::Receiver<()> = shutdown.subscribe();
    let server = HttpServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Client that never pools or proxies, so every call hits the server fresh.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
