//! Trace parent types and error definitions.

use std::fmt;

use rand::Rng;
use thiserror::Error;

/// Highest `traceparent` version this codec understands.
///
/// Higher versions are accepted optimistically: their four leading fields are
/// parsed and any trailing fields are dropped.
pub const VERSION: u8 = 0;

/// Highest version byte that is not reserved.
pub const MAX_VERSION: u8 = 254;

/// Errors raised while parsing a `traceparent` header value.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParentError {
    /// Field lengths, hex digits, delimiters or a trailing extension do not
    /// fit the grammar.
    #[error("invalid traceparent format")]
    InvalidFormat,

    /// Version byte is the reserved value `ff`.
    #[error("invalid traceparent version")]
    InvalidVersion,

    #[error("invalid traceparent trace ID")]
    InvalidTraceId,

    #[error("invalid traceparent span ID")]
    InvalidSpanId,
}

/// 16-byte trace identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TraceId(pub [u8; 16]);

impl TraceId {
    /// The all-zero id, which never appears in a valid header.
    pub const INVALID: TraceId = TraceId([0; 16]);

    /// Generate a random, non-zero trace id.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 16];
            rng.fill(&mut bytes);
            if bytes != Self::INVALID.0 {
                return Self(bytes);
            }
        }
    }

    /// Whether the id is non-zero.
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl From<[u8; 16]> for TraceId {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// 8-byte span identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpanId(pub [u8; 8]);

impl SpanId {
    /// The all-zero id, which never appears in a valid header.
    pub const INVALID: SpanId = SpanId([0; 8]);

    /// Generate a random, non-zero span id.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 8];
            rng.fill(&mut bytes);
            if bytes != Self::INVALID.0 {
                return Self(bytes);
            }
        }
    }

    /// Whether the id is non-zero.
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl From<[u8; 8]> for SpanId {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Trace flags. Only the `recorded` bit is defined; other bits are dropped
/// on parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TraceFlags {
    pub recorded: bool,
}

impl TraceFlags {
    const RECORDED_BIT: u8 = 0x01;

    /// Decode the flags byte of a header.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            recorded: byte & Self::RECORDED_BIT == Self::RECORDED_BIT,
        }
    }

    /// Encode as the flags byte of a header.
    pub fn to_byte(self) -> u8 {
        if self.recorded {
            Self::RECORDED_BIT
        } else {
            0
        }
    }
}

impl fmt::Display for TraceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}", self.to_byte())
    }
}

/// Parsed `traceparent` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TraceParent {
    pub version: u8,
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub flags: TraceFlags,
}

impl TraceParent {
    /// Originate a new trace with random ids.
    pub fn random(recorded: bool) -> Self {
        Self {
            version: VERSION,
            trace_id: TraceId::random(),
            span_id: SpanId::random(),
            flags: TraceFlags { recorded },
        }
    }

    /// Replace the span id, keeping the trace id. Used before each outgoing
    /// call so that the callee sees this process as its parent.
    pub fn regenerate_span_id(&mut self) {
        self.span_id = SpanId::random();
    }

    /// Whether the parent could be serialized and parsed back.
    pub fn is_valid(&self) -> bool {
        self.version <= MAX_VERSION && self.trace_id.is_valid() && self.span_id.is_valid()
    }
}

impl fmt::Display for TraceParent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}-{}-{}-{}",
            self.version, self.trace_id, self.span_id, self.flags
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_fixed_width() {
        let tp = TraceParent {
            version: 0,
            trace_id: TraceId([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]),
            span_id: SpanId([0, 0, 0, 0, 0, 0, 0, 2]),
            flags: TraceFlags::default(),
        };
        assert_eq!(
            tp.to_string(),
            "00-00000000000000000000000000000001-0000000000000002-00"
        );
    }

    #[test]
    fn test_display_keeps_version_and_lowercase() {
        let tp = TraceParent {
            version: 0xab,
            trace_id: TraceId([0xff; 16]),
            span_id: SpanId([0xab; 8]),
            flags: TraceFlags { recorded: true },
        };
        assert_eq!(
            tp.to_string(),
            "ab-ffffffffffffffffffffffffffffffff-abababababababab-01"
        );
    }

    #[test]
    fn test_flags_keep_only_recorded_bit() {
        assert!(TraceFlags::from_byte(0x01).recorded);
        assert!(TraceFlags::from_byte(0xff).recorded);
        assert!(!TraceFlags::from_byte(0xfe).recorded);
        assert_eq!(TraceFlags::from_byte(0x09).to_byte(), 0x01);
    }

    #[test]
    fn test_random_ids_are_valid() {
        for _ in 0..64 {
            let tp = TraceParent::random(false);
            assert!(tp.is_valid());
            assert_eq!(tp.version, VERSION);
        }
    }

    #[test]
    fn test_regenerate_span_id_keeps_trace() {
        let mut tp = TraceParent::random(true);
        let before = tp;
        tp.regenerate_span_id();
        assert_eq!(tp.trace_id, before.trace_id);
        assert_eq!(tp.flags, before.flags);
        assert!(tp.span_id.is_valid());
    }
}
