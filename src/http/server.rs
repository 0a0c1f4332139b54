//! HTTP server setup and the `/test` handler.
//!
//! # Responsibilities
//! - Create the Axum Router with the `/test` handler
//! - Wire up middleware (tracing, request timeout)
//! - Read the inbound trace context, originating one when it is invalid
//! - Forward each test item with a fresh span id

use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::context::TraceContext;
use crate::http::forward::{Forwarder, TestRequest};
use crate::lifecycle::shutdown;
use crate::traceparent::TraceParent;
use crate::tracestate::TraceState;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
}

/// Forwarding test server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState {
            forwarder: Forwarder::new(Duration::from_secs(config.timeouts.upstream_secs)),
        };
        let router = Self::build_router(&config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/test", post(test_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Read the inbound context, or originate a new trace if it is unusable.
fn inbound_context(headers: &HeaderMap) -> TraceContext {
    match TraceContext::from_headers(headers) {
        Ok(context) => context,
        Err(e) => {
            let context = TraceContext::new(TraceParent::random(false), TraceState::default());
            tracing::debug!(
                error = %e,
                trace_id = %context.trace_parent.trace_id,
                "Inbound trace context rejected, starting a new trace"
            );
            context
        }
    }
}

/// `POST /test`: forward each item in order, each as a new child span.
async fn test_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(items): Json<Vec<TestRequest>>,
) -> Response {
    let mut context = inbound_context(&headers);

    for item in &items {
        context.trace_parent.regenerate_span_id();

        match state.forwarder.forward(&context, item).await {
            Ok(status) => {
                tracing::debug!(url = %item.url, status = %status, "Forwarded");
            }
            Err(e) => {
                tracing::warn!(url = %item.url, error = %e, "Forwarding failed");
                return (e.status(), e.to_string()).into_response();
            }
        }
    }

    StatusCode::OK.into_response()
}
