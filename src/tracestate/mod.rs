//! Trace state codec.
//!
//! # Data Flow
//! ```text
//! header bytes (repeated headers joined with ",")
//!     → split on "," (empty segments skipped)
//!     → parser.rs (member grammar per segment)
//!     → uniqueness + capacity checks, in encounter order
//!     → TraceState (ordered, ≤ 32 members)
//! ```
//!
//! # Design Decisions
//! - Parsing is all-or-nothing: one bad segment fails the list
//! - Order is preserved exactly; the first member is the latest mutator
//! - Keys are compared as (vendor, tenant) pairs

pub mod parser;
pub mod types;

pub use types::{Member, StateError, TraceState, MAX_MEMBERS};
