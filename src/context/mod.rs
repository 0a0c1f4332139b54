//! Trace context combinator.
//!
//! # Data Flow
//! ```text
//! Read:
//!     carrier.get_all("traceparent")  → exactly one allowed → TraceParent::parse
//!     carrier.get_all("tracestate")   → joined with ","     → TraceState::parse
//!     → TraceContext
//!
//! Write:
//!     TraceContext → Display → carrier.set("traceparent" / "tracestate")
//! ```
//!
//! # Design Decisions
//! - A bad `traceparent` is fatal; a bad `tracestate` degrades to empty
//! - Multiple `traceparent` headers are rejected before any parsing
//! - Writes always emit both headers, even with an empty state

pub mod carrier;
pub mod propagation;

pub use carrier::HeaderCarrier;
pub use propagation::{ContextError, TraceContext, TRACEPARENT_HEADER, TRACESTATE_HEADER};
