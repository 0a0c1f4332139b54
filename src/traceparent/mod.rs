//! Trace parent codec.
//!
//! # Data Flow
//! ```text
//! header bytes
//!     → parser.rs (fixed-width grammar, hex decode)
//!     → semantic checks (reserved version, zero ids)
//!     → TraceParent (normalized to VERSION)
//!     → Display (fixed-width lowercase hex, no extension)
//! ```
//!
//! # Design Decisions
//! - Ids are fixed-size arrays, so length is structural
//! - Higher versions are parsed optimistically; their extensions are dropped
//! - Every invalid input maps to exactly one `ParentError`

pub mod parser;
pub mod types;

pub use types::{ParentError, SpanId, TraceFlags, TraceId, TraceParent, MAX_VERSION, VERSION};
