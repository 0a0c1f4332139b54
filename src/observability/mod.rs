//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! server, forwarder, combinator
//!     → tracing events (structured fields: address, url, trace_id)
//!     → logging.rs (EnvFilter + fmt layer)
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - The codecs never log; callers decide how to report errors
//! - Inbound requests are traced by tower-http's TraceLayer

pub mod logging;

pub use logging::init_logging;
