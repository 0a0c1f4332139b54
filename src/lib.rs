//! W3C Trace Context propagation library.
//!
//! Parses, validates and serializes the `traceparent` and `tracestate`
//! headers, and pairs them into a [`TraceContext`] that can be read from and
//! written to any [`HeaderCarrier`].

pub mod config;
pub mod context;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod traceparent;
pub mod tracestate;

pub use config::schema::ServerConfig;
pub use context::{ContextError, HeaderCarrier, TraceContext};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use traceparent::{ParentError, TraceParent};
pub use tracestate::{Member, StateError, TraceState};
