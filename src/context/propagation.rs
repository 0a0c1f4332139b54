//! Paired `traceparent` / `tracestate` propagation.

use thiserror::Error;

use crate::context::carrier::HeaderCarrier;
use crate::traceparent::{ParentError, TraceParent};
use crate::tracestate::TraceState;

/// Header carrying the trace parent.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Header carrying the trace state.
pub const TRACESTATE_HEADER: &str = "tracestate";

/// Errors raised while reading a [`TraceContext`] from headers.
///
/// Trace state problems never show up here; an unparseable `tracestate`
/// degrades to an empty list.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("multiple traceparent headers")]
    MultipleTraceParent,

    #[error(transparent)]
    Parent(#[from] ParentError),
}

/// A trace parent and trace state propagated together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceContext {
    pub trace_parent: TraceParent,
    pub trace_state: TraceState,
}

impl TraceContext {
    /// Pair a parent with a state.
    pub fn new(trace_parent: TraceParent, trace_state: TraceState) -> Self {
        Self {
            trace_parent,
            trace_state,
        }
    }

    /// Read the context from `headers`.
    ///
    /// On error the caller must treat the parent as absent; nothing usable
    /// beyond `TraceContext::default()` is recoverable.
    pub fn from_headers<C>(headers: &C) -> Result<Self, ContextError>
    where
        C: HeaderCarrier + ?Sized,
    {
        let parents = headers.get_all(TRACEPARENT_HEADER);
        if parents.len() > 1 {
            return Err(ContextError::MultipleTraceParent);
        }
        let trace_parent = TraceParent::parse(parents.first().copied().unwrap_or_default())?;

        let states = headers.get_all(TRACESTATE_HEADER);
        let trace_state = match TraceState::parse(&states.join(&b","[..])) {
            Ok(state) => state,
            Err(e) => {
                tracing::debug!(
                    trace_id = %trace_parent.trace_id,
                    error = %e,
                    "Discarding invalid tracestate"
                );
                TraceState::default()
            }
        };

        Ok(Self {
            trace_parent,
            trace_state,
        })
    }

    /// Write both headers, replacing any previous values. An empty trace
    /// state is written as an empty header rather than omitted.
    pub fn set_headers<C>(&self, headers: &mut C)
    where
        C: HeaderCarrier + ?Sized,
    {
        headers.set(TRACEPARENT_HEADER, self.trace_parent.to_string());
        headers.set(TRACESTATE_HEADER, self.trace_state.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    const PARENT: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn headers(entries: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_read_valid() {
        let map = headers(&[
            ("traceparent", PARENT),
            ("tracestate", "vendor1=value1,vendor2@tenant=value2"),
        ]);
        let tc = TraceContext::from_headers(&map).unwrap();
        assert_eq!(tc.trace_parent.to_string(), PARENT);
        assert_eq!(tc.trace_state.len(), 2);
    }

    #[test]
    fn test_multiple_traceparent_checked_before_parsing() {
        let map = headers(&[("traceparent", "garbage"), ("traceparent", "garbage")]);
        assert_eq!(
            TraceContext::from_headers(&map),
            Err(ContextError::MultipleTraceParent)
        );
    }

    #[test]
    fn test_missing_traceparent_is_invalid_format() {
        let map = headers(&[("tracestate", "a=1")]);
        assert_eq!(
            TraceContext::from_headers(&map),
            Err(ContextError::Parent(ParentError::InvalidFormat))
        );
    }

    #[test]
    fn test_parent_error_propagates() {
        let map = headers(&[(
            "traceparent",
            "00-00000000000000000000000000000000-00f067aa0ba902b7-01",
        )]);
        assert_eq!(
            TraceContext::from_headers(&map),
            Err(ContextError::Parent(ParentError::InvalidTraceId))
        );
    }

    #[test]
    fn test_tracestate_headers_concatenated_in_order() {
        let map = headers(&[
            ("traceparent", PARENT),
            ("tracestate", "a=1"),
            ("tracestate", "b=2,c=3"),
        ]);
        let tc = TraceContext::from_headers(&map).unwrap();
        assert_eq!(tc.trace_state.to_string(), "a=1,b=2,c=3");
    }

    #[test]
    fn test_duplicate_across_tracestate_headers_discards_state() {
        let map = headers(&[
            ("traceparent", PARENT),
            ("tracestate", "a=1"),
            ("tracestate", "a=2"),
        ]);
        let tc = TraceContext::from_headers(&map).unwrap();
        assert!(tc.trace_state.is_empty());
    }

    #[test]
    fn test_invalid_tracestate_is_not_fatal() {
        let map = headers(&[
            ("traceparent", PARENT),
            ("tracestate", "a=1,bad value with space and no closing"),
        ]);
        let tc = TraceContext::from_headers(&map).unwrap();
        assert_eq!(tc.trace_parent.to_string(), PARENT);
        assert!(tc.trace_state.is_empty());
    }

    #[test]
    fn test_write_replaces_and_keeps_empty_state() {
        let mut map = headers(&[
            ("traceparent", "stale"),
            ("tracestate", "x=1"),
            ("tracestate", "y=2"),
        ]);
        let tc = TraceContext::new(PARENT.parse().unwrap(), TraceState::default());
        tc.set_headers(&mut map);

        assert_eq!(map.get_all("traceparent").iter().count(), 1);
        assert_eq!(map["traceparent"], PARENT);
        assert_eq!(map.get_all("tracestate").iter().count(), 1);
        assert_eq!(map["tracestate"], "");
    }

    #[test]
    fn test_write_then_read() {
        let tc = TraceContext::new(
            TraceParent::random(true),
            "vendor1=value1,vendor2@tenant=value2".parse().unwrap(),
        );
        let mut map = HeaderMap::new();
        tc.set_headers(&mut map);
        assert_eq!(TraceContext::from_headers(&map).unwrap(), tc);
    }
}
