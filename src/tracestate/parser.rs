//! `tracestate` grammar.
//!
//! ```text
//! list   = member *( "," member )        ; empty members are skipped
//! member = OWS key "=" value OWS
//! key    = vendor / vendor "@" tenant
//! ```
//!
//! A bare vendor may be up to 256 characters; a tenant-qualified vendor up to
//! 241 with a tenant of up to 14. Keys use `[a-z0-9_\-*/]`. Values are
//! printable ASCII without `,` or `=`, and must not end in a space.

use std::collections::HashSet;
use std::str::FromStr;

use super::types::{Member, StateError, TraceState, MAX_MEMBERS};

const DELIMITER: u8 = b',';

const MAX_VENDOR_LEN: usize = 256;
const MAX_TENANT_VENDOR_LEN: usize = 241;
const MAX_TENANT_LEN: usize = 14;
const MAX_VALUE_LEN: usize = 256;

impl TraceState {
    /// Parse a raw `tracestate` value. Repeated headers should be joined with
    /// `,` before calling this.
    pub fn parse(input: &[u8]) -> Result<Self, StateError> {
        let mut members = Vec::new();
        let mut seen: HashSet<(String, Option<String>)> = HashSet::new();

        for segment in input.split(|&b| b == DELIMITER) {
            if segment.is_empty() {
                continue;
            }

            let member = parse_member(segment)?;
            if !seen.insert((member.vendor.clone(), member.tenant.clone())) {
                return Err(StateError::DuplicateListMemberKey);
            }
            members.push(member);

            if members.len() > MAX_MEMBERS {
                return Err(StateError::TooManyListMembers);
            }
        }

        Ok(Self { members })
    }
}

impl FromStr for TraceState {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

fn parse_member(segment: &[u8]) -> Result<Member, StateError> {
    let segment = trim_start(segment);
    let eq = segment
        .iter()
        .position(|&b| b == b'=')
        .ok_or(StateError::InvalidListMember)?;
    let key = &segment[..eq];
    let value = trim_end(&segment[eq + 1..]);

    let (vendor, tenant) = match key.iter().position(|&b| b == b'@') {
        Some(at) => (&key[..at], Some(&key[at + 1..])),
        None => (key, None),
    };
    validate_key(vendor, tenant)?;
    validate_value(value)?;

    Ok(Member {
        vendor: ascii_string(vendor)?,
        tenant: tenant.map(ascii_string).transpose()?,
        value: ascii_string(value)?,
    })
}

pub(crate) fn validate_key(vendor: &[u8], tenant: Option<&[u8]>) -> Result<(), StateError> {
    let valid = match tenant {
        Some(tenant) => {
            is_key(vendor, MAX_TENANT_VENDOR_LEN) && is_key(tenant, MAX_TENANT_LEN)
        }
        None => is_key(vendor, MAX_VENDOR_LEN),
    };
    if valid {
        Ok(())
    } else {
        Err(StateError::InvalidListMember)
    }
}

pub(crate) fn validate_value(value: &[u8]) -> Result<(), StateError> {
    match value.last() {
        Some(&last)
            if value.len() <= MAX_VALUE_LEN
                && last != b' '
                && value.iter().all(|&b| is_value_char(b)) =>
        {
            Ok(())
        }
        _ => Err(StateError::InvalidListMember),
    }
}

fn is_key(key: &[u8], max_len: usize) -> bool {
    (1..=max_len).contains(&key.len()) && key.iter().all(|&b| is_key_char(b))
}

fn is_key_char(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'*' | b'/')
}

fn is_value_char(b: u8) -> bool {
    matches!(b, 0x20..=0x7e) && b != b',' && b != b'='
}

/// Optional whitespace around a member: space, tab, CR, LF and form feed.
fn is_ows(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c)
}

fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| !is_ows(b)).unwrap_or(bytes.len());
    &bytes[start..]
}

fn trim_end(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| !is_ows(b)).map_or(0, |i| i + 1);
    &bytes[..end]
}

fn ascii_string(bytes: &[u8]) -> Result<String, StateError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| StateError::InvalidListMember)
}
