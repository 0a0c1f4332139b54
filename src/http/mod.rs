//! HTTP subsystem: the forwarding test server.
//!
//! # Data Flow
//! ```text
//! POST /test  [{"url": ..., "arguments": [...]}, ...]
//!     → server.rs (TraceContext::from_headers, or a new random trace)
//!     → for each item: regenerate span id
//!     → forward.rs (set traceparent / tracestate, POST arguments to url)
//!     → 200, or the first forwarding error
//! ```

pub mod forward;
pub mod server;

pub use forward::{ForwardError, Forwarder, TestRequest};
pub use server::HttpServer;
