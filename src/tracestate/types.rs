//! Trace state types and error definitions.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use super::parser;

/// Maximum number of members in a `tracestate` list.
pub const MAX_MEMBERS: usize = 32;

/// Errors raised while parsing or building a `tracestate` list.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// A non-empty list segment does not match the member grammar.
    #[error("invalid tracestate list member")]
    InvalidListMember,

    /// Two members share the same vendor and tenant.
    #[error("duplicate list member key in tracestate")]
    DuplicateListMemberKey,

    #[error("too many list members in tracestate")]
    TooManyListMembers,
}

/// One `vendor[@tenant]=value` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    pub(crate) vendor: String,
    pub(crate) tenant: Option<String>,
    pub(crate) value: String,
}

impl Member {
    /// Build a member, validating each part against the member grammar.
    pub fn new(vendor: &str, tenant: Option<&str>, value: &str) -> Result<Self, StateError> {
        parser::validate_key(vendor.as_bytes(), tenant.map(str::as_bytes))?;
        parser::validate_value(value.as_bytes())?;
        Ok(Self {
            vendor: vendor.to_owned(),
            tenant: tenant.map(str::to_owned),
            value: value.to_owned(),
        })
    }

    /// Vendor part of the key.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Tenant part of the key, if any.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Opaque member value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Composite key that must be unique within a list.
    pub fn key(&self) -> (&str, Option<&str>) {
        (&self.vendor, self.tenant.as_deref())
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tenant {
            Some(tenant) => write!(f, "{}@{}={}", self.vendor, tenant, self.value),
            None => write!(f, "{}={}", self.vendor, self.value),
        }
    }
}

/// Ordered `tracestate` list. The first member is the most recent mutator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceState {
    pub(crate) members: Vec<Member>,
}

impl TraceState {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Members in header order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Iterate over members in header order.
    pub fn iter(&self) -> std::slice::Iter<'_, Member> {
        self.members.iter()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the list has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Look up the value stored under `vendor[@tenant]`.
    pub fn get(&self, vendor: &str, tenant: Option<&str>) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.key() == (vendor, tenant))
            .map(Member::value)
    }
}

impl TryFrom<Vec<Member>> for TraceState {
    type Error = StateError;

    fn try_from(members: Vec<Member>) -> Result<Self, Self::Error> {
        if members.len() > MAX_MEMBERS {
            return Err(StateError::TooManyListMembers);
        }
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(member.key()) {
                return Err(StateError::DuplicateListMemberKey);
            }
        }
        Ok(Self { members })
    }
}

impl<'a> IntoIterator for &'a TraceState {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl fmt::Display for TraceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", member)?;
        }
        Ok(())
    }
}
