//! `traceparent` grammar.
//!
//! ```text
//! version "-" trace-id "-" span-id "-" flags [ "-" extension ]
//!   2 hex      32 hex       16 hex      2 hex
//! ```
//!
//! All hex is lowercase. The extension is any run of bytes other than `\n`
//! and is only tolerated for versions above [`VERSION`].

use std::str::FromStr;

use super::types::{ParentError, SpanId, TraceFlags, TraceId, TraceParent, VERSION};

const VERSION_LEN: usize = 2;
const TRACE_ID_LEN: usize = 32;
const SPAN_ID_LEN: usize = 16;
const FLAGS_LEN: usize = 2;

const TRACE_ID_START: usize = VERSION_LEN + 1;
const SPAN_ID_START: usize = TRACE_ID_START + TRACE_ID_LEN + 1;
const FLAGS_START: usize = SPAN_ID_START + SPAN_ID_LEN + 1;

/// Length of a header value without an extension.
pub const HEADER_LEN: usize = FLAGS_START + FLAGS_LEN;

const DELIMITER: u8 = b'-';

/// Byte-level split of a header value that matched the grammar.
struct Segments<'a> {
    version: &'a [u8],
    trace_id: &'a [u8],
    span_id: &'a [u8],
    flags: &'a [u8],
    extension: &'a [u8],
}

impl TraceParent {
    /// Parse a raw `traceparent` header value.
    ///
    /// A successfully parsed value always carries [`VERSION`], even when the
    /// input declared a higher one.
    pub fn parse(input: &[u8]) -> Result<Self, ParentError> {
        let segments = split(input)?;

        // Every field must fit the grammar before any value is judged.
        let [version] = decode_segment::<1>(segments.version)?;
        let trace_id = TraceId(decode_segment(segments.trace_id)?);
        let span_id = SpanId(decode_segment(segments.span_id)?);
        let [flags] = decode_segment::<1>(segments.flags)?;

        if version == u8::MAX {
            return Err(ParentError::InvalidVersion);
        }
        if version == VERSION && !segments.extension.is_empty() {
            return Err(ParentError::InvalidFormat);
        }
        if !trace_id.is_valid() {
            return Err(ParentError::InvalidTraceId);
        }
        if !span_id.is_valid() {
            return Err(ParentError::InvalidSpanId);
        }

        Ok(Self {
            version: VERSION,
            trace_id,
            span_id,
            flags: TraceFlags::from_byte(flags),
        })
    }
}

impl FromStr for TraceParent {
    type Err = ParentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

fn split(input: &[u8]) -> Result<Segments<'_>, ParentError> {
    if input.len() < HEADER_LEN {
        return Err(ParentError::InvalidFormat);
    }
    let (head, extension) = input.split_at(HEADER_LEN);

    for pos in [TRACE_ID_START - 1, SPAN_ID_START - 1, FLAGS_START - 1] {
        if head[pos] != DELIMITER {
            return Err(ParentError::InvalidFormat);
        }
    }

    if let Some((&first, rest)) = extension.split_first() {
        if first != DELIMITER || rest.contains(&b'\n') {
            return Err(ParentError::InvalidFormat);
        }
    }

    Ok(Segments {
        version: &head[..VERSION_LEN],
        trace_id: &head[TRACE_ID_START..TRACE_ID_START + TRACE_ID_LEN],
        span_id: &head[SPAN_ID_START..SPAN_ID_START + SPAN_ID_LEN],
        flags: &head[FLAGS_START..],
        extension,
    })
}

/// Decode a fixed-width lowercase hex segment into `N` bytes.
fn decode_segment<const N: usize>(segment: &[u8]) -> Result<[u8; N], ParentError> {
    if segment.len() != N * 2 || !segment.iter().all(is_lower_hex) {
        return Err(ParentError::InvalidFormat);
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(segment, &mut out).map_err(|_| ParentError::InvalidFormat)?;
    Ok(out)
}

fn is_lower_hex(b: &u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'f')
}
